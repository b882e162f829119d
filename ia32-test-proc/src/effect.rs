use proc_macro2::TokenStream;
use quote::quote;
use syn::{
	Ident, Result, Token,
	parse::{Parse, ParseStream},
};

/// `kind` or `kind = target`.
struct EffectAttr {
	kind:   Ident,
	target: Option<(Token![=], Ident)>,
}

impl Parse for EffectAttr {
	fn parse(input: ParseStream<'_>) -> Result<Self> {
		let kind = input.parse()?;
		let target = if input.peek(Token![=]) {
			Some((input.parse()?, input.parse()?))
		} else {
			None
		};

		if !input.is_empty() {
			return Err(input.error("expected `kind` or `kind = target`"));
		}

		Ok(Self { kind, target })
	}
}

impl quote::ToTokens for EffectAttr {
	fn to_tokens(&self, tokens: &mut TokenStream) {
		let kind = &self.kind;
		tokens.extend(quote!(#kind));
		if let Some((eq, target)) = &self.target {
			tokens.extend(quote!(#eq #target));
		}
	}
}

pub fn effect(attr: TokenStream, input: TokenStream) -> Result<TokenStream> {
	let attr: EffectAttr = syn::parse2(attr)?;
	let fn_item: syn::ItemFn = syn::parse2(input)?;
	let fn_name = fn_item.sig.ident.to_string();

	let attrs = &fn_item.attrs;
	let vis = &fn_item.vis;
	let sig = &fn_item.sig;
	let block = &fn_item.block;

	Ok(quote! {
		#(#attrs)*
		#vis #sig {
			::ia32_test::annotate_effect_fn! {
				start @ #fn_name => {
					#attr
				}
			}

			let effect_return_value = #block;

			::ia32_test::annotate_effect_fn! {
				end @ #fn_name => {
					#attr
				}
			}

			effect_return_value
		}
	})
}
