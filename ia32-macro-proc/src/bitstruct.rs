//! Provides the `bitstruct!{}` proc macro.
#![allow(clippy::used_underscore_binding)]

use std::collections::BTreeSet;

use convert_case::{Case, Casing};
use proc_macro2::{Literal, Span, TokenStream};
use quote::{format_ident, quote};
use syn::{
	Attribute, Error, Expr, ExprLit, Fields, Ident, Lit, LitInt, Result, Token, Type, Variant,
	Visibility, braced, bracketed, parenthesized,
	parse::{Parse, ParseStream},
	punctuated::Punctuated,
	spanned::Spanned,
	token::{Brace, Bracket, Paren},
};

#[derive(Debug)]
struct Bitstruct {
	attributes:     Vec<Attribute>,
	vis:            Visibility,
	_struct:        Token![struct],
	name:           Ident,
	_parens:        Paren,
	primitive_type: Type,
	_braces:        Brace,
	body:           Vec<BitstructDef>,
}

impl Parse for Bitstruct {
	fn parse(input: ParseStream<'_>) -> Result<Self> {
		let mut content;
		Ok(Self {
			attributes:     input.call(Attribute::parse_outer)?,
			vis:            input.parse()?,
			_struct:        input.parse()?,
			name:           input.parse()?,
			_parens:        parenthesized!(content in input),
			primitive_type: content.parse()?,
			_braces:        braced!(content in input),
			body:           content.call(parse_optionally_separated::<_, Token![,]>)?,
		})
	}
}

fn parse_optionally_separated<P: Parse, S: Parse>(input: ParseStream<'_>) -> Result<Vec<P>> {
	let mut items = Vec::new();
	while !input.is_empty() {
		while input.parse::<S>().is_ok() {}
		if input.is_empty() {
			break;
		}
		items.push(input.parse()?);
	}
	Ok(items)
}

#[derive(Debug)]
struct BitstructDef {
	attributes:   Vec<Attribute>,
	vis:          Visibility,
	field_name:   FieldName,
	_brackets:    Bracket,
	bit_range:    BitRange,
	_thick_arrow: Token![=>],
	field_body:   FieldBody,
	_semi:        Option<Token![;]>,
}

impl Parse for BitstructDef {
	fn parse(input: ParseStream<'_>) -> Result<Self> {
		let bit_range;
		Ok(Self {
			attributes:   input.call(Attribute::parse_outer)?,
			vis:          input.parse()?,
			field_name:   input.parse()?,
			_brackets:    bracketed!(bit_range in input),
			bit_range:    bit_range.parse()?,
			_thick_arrow: input.parse()?,
			field_body:   input.parse()?,
			_semi:        input.parse()?,
		})
	}
}

#[derive(Debug)]
enum FieldBody {
	Const(LitInt),
	As(AsConversion),
	Enum(EnumField),
}

impl Parse for FieldBody {
	fn parse(input: ParseStream<'_>) -> Result<Self> {
		let lookahead = input.lookahead1();
		if lookahead.peek(LitInt) {
			Ok(Self::Const(input.parse()?))
		} else if lookahead.peek(Token![enum]) {
			Ok(Self::Enum(input.parse()?))
		} else if lookahead.peek(Token![as]) {
			Ok(Self::As(input.parse()?))
		} else {
			Err(lookahead.error())
		}
	}
}

#[derive(Debug)]
struct AsConversion {
	_as: Token![as],
	ty:  Type,
}

impl Parse for AsConversion {
	fn parse(input: ParseStream<'_>) -> Result<Self> {
		Ok(Self {
			_as: input.parse()?,
			ty:  input.parse()?,
		})
	}
}

#[derive(Debug)]
struct EnumField {
	_enum:     Token![enum],
	name:      Ident,
	_parens:   Paren,
	repr_type: Type,
	_braces:   Brace,
	variants:  Punctuated<Variant, Token![,]>,
}

impl Parse for EnumField {
	fn parse(input: ParseStream<'_>) -> Result<Self> {
		let type_content;
		let variant_content;
		Ok(Self {
			_enum:     input.parse()?,
			name:      input.parse()?,
			_parens:   parenthesized!(type_content in input),
			repr_type: type_content.parse()?,
			_braces:   braced!(variant_content in input),
			variants:  variant_content.parse_terminated(Variant::parse, Token![,])?,
		})
	}
}

#[derive(Debug)]
enum FieldName {
	/// `_`
	Ignored(Span),
	/// A custom field name.
	Ident(Ident),
}

impl FieldName {
	fn span(&self) -> Span {
		match self {
			Self::Ignored(span) => *span,
			Self::Ident(ident) => ident.span(),
		}
	}

	fn is_ignored(&self) -> bool {
		match self {
			Self::Ignored(_) => true,
			Self::Ident(i) => i.to_string().starts_with('_'),
		}
	}
}

impl std::fmt::Display for FieldName {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Ignored(_) => "_".fmt(f),
			Self::Ident(ident) => ident.fmt(f),
		}
	}
}

impl Parse for FieldName {
	fn parse(input: ParseStream<'_>) -> Result<Self> {
		input
			.parse::<Token![_]>()
			.map(|t| Self::Ignored(t.span()))
			.or_else(|_| input.parse().map(Self::Ident))
	}
}

#[derive(Debug)]
struct BitRange {
	high_lit: LitInt,
	high:     u8,
	_colon:   Option<Token![:]>,
	low:      Option<u8>,
}

impl BitRange {
	fn high(&self) -> u8 {
		self.high
	}

	fn low(&self) -> u8 {
		self.low.unwrap_or(self.high)
	}

	fn count(&self) -> u32 {
		u32::from(self.high() - self.low()) + 1
	}

	/// The mask of the field's width, not shifted.
	fn low_mask(&self) -> u128 {
		if self.count() >= 128 {
			u128::MAX
		} else {
			(1_u128 << self.count()) - 1
		}
	}

	/// The mask of the field, shifted into position.
	fn mask(&self) -> u128 {
		self.low_mask() << self.low()
	}

	fn span(&self) -> Span {
		self.high_lit.span()
	}
}

impl Parse for BitRange {
	fn parse(input: ParseStream<'_>) -> Result<Self> {
		let high_lit = input.parse::<LitInt>()?;
		let high = high_lit.base10_parse::<u8>()?;
		let colon = input.parse::<Option<Token![:]>>()?;
		let low = if colon.is_some() {
			Some(input.parse::<LitInt>()?.base10_parse::<u8>()?)
		} else {
			None
		};
		Ok(Self {
			high_lit,
			high,
			_colon: colon,
			low,
		})
	}
}

trait TypeEx {
	fn last_ident(&self) -> Option<String>;

	fn get_unsigned_bit_width(&self) -> Option<u8> {
		match self.last_ident()?.as_str() {
			"u8" => Some(8),
			"u16" => Some(16),
			"u32" => Some(32),
			"u64" => Some(64),
			"u128" => Some(128),
			_ => None,
		}
	}

	fn is_bool(&self) -> bool {
		self.last_ident().is_some_and(|i| i == "bool")
	}

	fn is_same_as(&self, other: &Type) -> bool;
}

impl TypeEx for Type {
	fn last_ident(&self) -> Option<String> {
		if let Type::Path(p) = self {
			if let Some(segment) = p.path.segments.last() {
				return Some(segment.ident.to_string());
			}
		}

		None
	}

	fn is_same_as(&self, other: &Type) -> bool {
		let this = self;
		quote!(#this).to_string() == quote!(#other).to_string()
	}
}

/// Accumulates errors such that all of them are reported at once.
#[derive(Default)]
struct Errors(Option<Error>);

impl Errors {
	fn push(&mut self, err: Error) {
		match &mut self.0 {
			Some(existing) => existing.combine(err),
			None => self.0 = Some(err),
		}
	}

	fn finish(self) -> Result<()> {
		self.0.map_or(Ok(()), Err)
	}
}

/// Field names whose accessors or constants would collide with the
/// record-level items the macro emits.
const COLLIDING_FIELD_NAMES: &[&str] =
	&["bits", "defined", "from_bits", "new", "reserved", "reserved_bits"];

/// Emits an unsuffixed integer literal; the surrounding code
/// always gives it a concrete type.
fn lit(value: u128) -> Literal {
	Literal::u128_unsuffixed(value)
}

/// Converts a `snake_case` field name into its `CONST_CASE` prefix.
///
/// Only underscores are treated as word boundaries, so names such
/// as `pml4e_address` become `PML4E_ADDRESS`.
fn const_name(ident: &Ident) -> String {
	ident
		.to_string()
		.from_case(Case::Snake)
		.to_case(Case::ScreamingSnake)
}

/// Defines a register (or register-like) wrapper type around a primitive integer type.
///
/// See [`crate::bitstruct`] for more information.
pub fn bitstruct(input: TokenStream) -> Result<TokenStream> {
	let Bitstruct {
		attributes,
		vis,
		name,
		primitive_type,
		body,
		..
	} = syn::parse2(input)?;

	let Some(width) = primitive_type.get_unsigned_bit_width() else {
		return Err(Error::new_spanned(
			&primitive_type,
			"bitstruct repr type must be an unsigned integer",
		));
	};

	let full_mask: u128 = if width == 128 {
		u128::MAX
	} else {
		(1_u128 << width) - 1
	};

	let mut errors = Errors::default();

	let mut hit_bits: u128 = 0;
	let mut bit_owners: Vec<Option<String>> = vec![None; 128];

	let mut const_bits_mask: u128 = 0;
	let mut const_bits: u128 = 0;

	let mut members = vec![];
	let mut enum_defs = vec![];

	for def in body {
		let vis = &def.vis;

		if def.bit_range.high() < def.bit_range.low() {
			errors.push(Error::new(
				def.bit_range.span(),
				format!(
					"field '{}' high bit cannot be lower than low bit",
					def.field_name
				),
			));
			continue;
		}

		if def.bit_range.high() >= width {
			errors.push(Error::new(
				def.bit_range.span(),
				format!(
					"field '{}' high bit cannot be greater than or equal to the repr type bit \
					 width ({width})",
					def.field_name,
				),
			));
			continue;
		}

		let field_mask = def.bit_range.mask();

		if hit_bits & field_mask != 0 {
			let mut conflicts = BTreeSet::new();
			let mut mask_bits = hit_bits & field_mask;
			while mask_bits != 0 {
				let bit = mask_bits.trailing_zeros();
				mask_bits &= !(1 << bit);
				if let Some(owner) = &bit_owners[bit as usize] {
					conflicts.insert(owner.clone());
				}
			}

			for owner in conflicts {
				errors.push(Error::new(
					def.bit_range.span(),
					format!(
						"bit field '{}' overlaps with field '{owner}'",
						def.field_name
					),
				));
			}

			continue;
		}

		{
			let mut mask_bits = field_mask;
			while mask_bits != 0 {
				let bit = mask_bits.trailing_zeros();
				mask_bits &= !(1 << bit);
				bit_owners[bit as usize] = Some(def.field_name.to_string());
			}
		}

		hit_bits |= field_mask;

		let low = def.bit_range.low();
		let low_mask = def.bit_range.low_mask();

		let get_name = match (&def.field_name, &def.field_body) {
			(FieldName::Ident(ident), FieldBody::As(_) | FieldBody::Enum(_))
				if !def.field_name.is_ignored() =>
			{
				ident.clone()
			}
			(_, FieldBody::Const(lit_val)) => {
				if !def.field_name.is_ignored() {
					errors.push(Error::new(
						def.field_name.span(),
						format!(
							"bit field '{}' is a constant and must be unnamed (prefix it with \
							 '_')",
							def.field_name
						),
					));
					continue;
				}

				let Ok(value) = lit_val.base10_parse::<u128>() else {
					errors.push(Error::new(
						lit_val.span(),
						"bit field constant must be an integer that fits within 128 bits",
					));
					continue;
				};

				if value & !low_mask != 0 {
					errors.push(Error::new(
						lit_val.span(),
						format!(
							"bit field constant value {value:b} is too large for {} bits",
							def.bit_range.count()
						),
					));
					continue;
				}

				const_bits |= value << low;
				const_bits_mask |= field_mask;
				continue;
			}
			_ => {
				errors.push(Error::new(
					def.field_name.span(),
					"ignored bit fields must be given a constant value",
				));
				continue;
			}
		};

		if COLLIDING_FIELD_NAMES.contains(&get_name.to_string().as_str()) {
			errors.push(Error::new(
				get_name.span(),
				format!(
					"bit field name '{get_name}' collides with an item generated for the record"
				),
			));
			continue;
		}

		let attrs = &def.attributes;
		let upper = const_name(&get_name);
		let set_name = format_ident!("set_{}", get_name);
		let with_name = format_ident!("with_{}", get_name);
		let bit_const = format_ident!("{}_BIT", upper);
		let mask_const = format_ident!("{}_MASK", upper);
		let flag_const = format_ident!("{}_FLAG", upper);

		let low_lit = lit(u128::from(low));
		let low_mask_lit = lit(low_mask);
		let flag_lit = lit(field_mask);

		let bit_doc = format!("Index of the lowest bit of [`Self::{get_name}()`].");
		let mask_doc = format!("Unshifted mask of the width of [`Self::{get_name}()`].");
		let flag_doc = format!("Mask of [`Self::{get_name}()`], shifted into position.");
		let see_message =
			format!("See [`Self::{get_name}()`] for more information about this field.");

		members.push(quote! {
			#[doc = #bit_doc]
			#vis const #bit_const: u32 = #low_lit;
			#[doc = #mask_doc]
			#vis const #mask_const: #primitive_type = #low_mask_lit;
			#[doc = #flag_doc]
			#vis const #flag_const: #primitive_type = #flag_lit;
		});

		match &def.field_body {
			FieldBody::Const(_) => unreachable!(),
			FieldBody::As(as_conv) if as_conv.ty.is_bool() => {
				if def.bit_range.count() != 1 {
					errors.push(Error::new_spanned(
						&as_conv.ty,
						format!(
							"boolean bit field must be exactly 1 bit wide (field is {} bits \
							 wide)",
							def.bit_range.count()
						),
					));
					continue;
				}

				members.push(quote! {
					#(#attrs)*
					#[inline]
					#[must_use]
					#vis const fn #get_name(self) -> bool {
						(self.0 & Self::#flag_const) != 0
					}

					#[doc = "Sets the bit field, returning the new value as a copy."]
					#[doc = #see_message]
					#[inline]
					#[must_use]
					#vis const fn #with_name(self, val: bool) -> Self {
						if val {
							Self(self.0 | Self::#flag_const)
						} else {
							Self(self.0 & !Self::#flag_const)
						}
					}

					#[doc = "Sets the bit field in place. Returns `self`."]
					#[doc = #see_message]
					#[inline]
					#vis fn #set_name(&mut self, val: bool) -> &mut Self {
						if val {
							self.0 |= Self::#flag_const;
						} else {
							self.0 &= !Self::#flag_const;
						}
						self
					}
				});
			}
			FieldBody::As(as_conv) => {
				let ty = &as_conv.ty;

				let (to_ty, from_ty) = if ty.is_same_as(&primitive_type) {
					(quote!(), quote!(val))
				} else {
					(quote!(as #ty), quote!((val as #primitive_type)))
				};

				members.push(quote! {
					#(#attrs)*
					#[inline]
					#[must_use]
					#vis const fn #get_name(self) -> #ty {
						((self.0 >> Self::#bit_const) & Self::#mask_const) #to_ty
					}

					#[doc = "Sets the bit field, returning the new value as a copy."]
					#[doc = #see_message]
					#[inline]
					#[must_use]
					#vis const fn #with_name(self, val: #ty) -> Self {
						Self((self.0 & !Self::#flag_const) | ((#from_ty & Self::#mask_const) << Self::#bit_const))
					}

					#[doc = "Sets the bit field in place. Returns `self`."]
					#[doc = #see_message]
					#[inline]
					#vis fn #set_name(&mut self, val: #ty) -> &mut Self {
						self.0 = (self.0 & !Self::#flag_const) | ((#from_ty & Self::#mask_const) << Self::#bit_const);
						self
					}
				});
			}
			FieldBody::Enum(enum_field) => {
				match enum_field.repr_type.get_unsigned_bit_width() {
					None => {
						errors.push(Error::new_spanned(
							&enum_field.repr_type,
							"enum repr type must be an unsigned integer",
						));
						continue;
					}
					Some(repr_width) => {
						if u32::from(repr_width) < def.bit_range.count() {
							errors.push(Error::new_spanned(
								&enum_field.repr_type,
								format!(
									"enum repr type is too small for bit field '{}'",
									def.field_name
								),
							));
							continue;
						}
					}
				}

				let mut variant_ok = true;
				let mut match_arms = vec![];

				for variant in &enum_field.variants {
					let Some((_, discrim_expr)) = &variant.discriminant else {
						errors.push(Error::new_spanned(
							&variant.ident,
							"bitstruct enum variant must have a discriminant",
						));
						variant_ok = false;
						continue;
					};

					let Expr::Lit(ExprLit {
						lit: Lit::Int(discrim_lit),
						..
					}) = discrim_expr
					else {
						errors.push(Error::new_spanned(
							&variant.ident,
							"bitstruct enum variant discriminant must be a literal integer",
						));
						variant_ok = false;
						continue;
					};

					let Ok(discrim_val) = discrim_lit.base10_parse::<u128>() else {
						errors.push(Error::new_spanned(
							&variant.ident,
							"bitstruct enum variant discriminant doesn't fit into 128 bits",
						));
						variant_ok = false;
						continue;
					};

					if discrim_val & !low_mask != 0 {
						errors.push(Error::new_spanned(
							&variant.ident,
							format!(
								"bitstruct enum variant discriminant is too large for bit field \
								 '{}' ({} bits wide)",
								def.field_name,
								def.bit_range.count()
							),
						));
						variant_ok = false;
						continue;
					}

					if variant.fields != Fields::Unit {
						errors.push(Error::new_spanned(
							&variant.ident,
							"bitstruct enum variant must be a unit variant",
						));
						variant_ok = false;
						continue;
					}

					let ident = &variant.ident;
					let discrim = lit(discrim_val);
					match_arms.push(quote!(#discrim => ::core::option::Option::Some(Self::#ident),));
				}

				if !variant_ok {
					continue;
				}

				let enum_name = &enum_field.name;
				let variants = &enum_field.variants;
				let repr_type = &enum_field.repr_type;
				let raw_name = format_ident!("{}_raw", get_name);

				let get_message = format!("Returns this field's [`{enum_name}`] value.");
				let get_partial_message = format!(
					"Returns this field's [`{enum_name}`] value, or `None` if the field holds a \
					 value with no corresponding variant."
				);
				let raw_message = format!(
					"Returns the raw value of [`Self::{get_name}()`], regardless of whether it \
					 maps to a [`{enum_name}`] variant."
				);
				let set_message = format!("Sets this field's [`{enum_name}`] value.");
				let with_message =
					format!("Returns a copy of this field with the [`{enum_name}`] value set.");

				// The compiler rejects duplicate discriminants, so the variant
				// count alone determines whether every bit pattern is covered.
				let is_exhaustive = def.bit_range.count() < 32
					&& enum_field.variants.len() as u128 == (1_u128 << def.bit_range.count());

				let (non_exhaustive_attr, getter) = if is_exhaustive {
					(
						None,
						quote! {
							#[doc = #get_message]
							#[inline]
							#[must_use]
							#vis const fn #get_name(self) -> #enum_name {
								// SAFETY: Every bit pattern of the field maps to a variant
								// SAFETY: and the value is masked to the field width.
								unsafe { ::core::mem::transmute::<#repr_type, #enum_name>(self.#raw_name()) }
							}
						},
					)
				} else {
					(
						Some(quote!(#[non_exhaustive])),
						quote! {
							#[doc = #get_partial_message]
							#[inline]
							#[must_use]
							#vis const fn #get_name(self) -> ::core::option::Option<#enum_name> {
								#enum_name::from_raw(self.#raw_name())
							}
						},
					)
				};

				let raw_cast = if repr_type.is_same_as(&primitive_type) {
					quote!()
				} else {
					quote!(as #repr_type)
				};

				enum_defs.push(quote! {
					#(#attrs)*
					#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd)]
					#[repr(#repr_type)]
					#non_exhaustive_attr
					#vis enum #enum_name {
						#variants
					}

					#[automatically_derived]
					impl #enum_name {
						/// Converts a raw field value into its variant, if one exists.
						#[inline]
						#[must_use]
						#vis const fn from_raw(value: #repr_type) -> ::core::option::Option<Self> {
							match value {
								#(#match_arms)*
								_ => ::core::option::Option::None,
							}
						}
					}
				});

				members.push(quote! {
					#getter

					#[doc = #raw_message]
					#[inline]
					#[must_use]
					#vis const fn #raw_name(self) -> #repr_type {
						((self.0 >> Self::#bit_const) & Self::#mask_const) #raw_cast
					}

					#[doc = #set_message]
					#[inline]
					#vis fn #set_name(&mut self, val: #enum_name) -> &mut Self {
						let val = val as #primitive_type;
						self.0 = (self.0 & !Self::#flag_const) | ((val & Self::#mask_const) << Self::#bit_const);
						self
					}

					#[doc = #with_message]
					#[inline]
					#[must_use]
					#vis const fn #with_name(self, val: #enum_name) -> Self {
						let val = val as #primitive_type;
						Self((self.0 & !Self::#flag_const) | ((val & Self::#mask_const) << Self::#bit_const))
					}
				});
			}
		}
	}

	errors.finish()?;

	let width_lit = lit(u128::from(width));
	let defined_lit = lit(hit_bits);
	let reserved_lit = lit(full_mask & !hit_bits);
	let const_bits_lit = lit(const_bits);
	let const_mask_lit = lit(const_bits_mask);

	Ok(quote! {
		#(#attributes)*
		#[repr(transparent)]
		#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
		#vis struct #name(#primitive_type);

		#[automatically_derived]
		#[allow(dead_code)]
		impl #name {
			/// The width of the register, in bits.
			#vis const WIDTH: u32 = #width_lit;
			/// The union of the masks of all defined (named or constant) fields.
			#vis const DEFINED_MASK: #primitive_type = #defined_lit;
			/// The mask of all reserved bits; the complement of [`Self::DEFINED_MASK`].
			#vis const RESERVED_MASK: #primitive_type = #reserved_lit;
			/// The mask of all constant fields, which hold a fixed architectural value.
			#vis const CONST_MASK: #primitive_type = #const_mask_lit;
			/// The values of the bits in [`Self::CONST_MASK`].
			#vis const CONST_BITS: #primitive_type = #const_bits_lit;

			/// Returns the default value, with all fields zeroed
			/// and fixed bits set to their architectural values.
			#[inline]
			#[must_use]
			#vis const fn new() -> Self {
				Self(Self::CONST_BITS)
			}

			/// Wraps a raw value without validating fixed bits.
			#[inline]
			#[must_use]
			#vis const fn from_bits(bits: #primitive_type) -> Self {
				Self(bits)
			}

			/// Returns the raw value.
			#[inline]
			#[must_use]
			#vis const fn bits(self) -> #primitive_type {
				self.0
			}

			/// Returns only the reserved bits of the raw value.
			#[inline]
			#[must_use]
			#vis const fn reserved_bits(self) -> #primitive_type {
				self.0 & Self::RESERVED_MASK
			}

			#(#members)*
		}

		#[automatically_derived]
		impl ::core::default::Default for #name {
			#[inline]
			fn default() -> Self {
				Self::new()
			}
		}

		#[automatically_derived]
		impl ::core::convert::From<#name> for #primitive_type {
			#[inline]
			fn from(value: #name) -> Self {
				value.0
			}
		}

		#[automatically_derived]
		impl ::core::convert::TryFrom<#primitive_type> for #name {
			type Error = #primitive_type;

			#[inline]
			fn try_from(value: #primitive_type) -> ::core::result::Result<Self, Self::Error> {
				if (value & Self::CONST_MASK) != Self::CONST_BITS {
					return ::core::result::Result::Err(value);
				}
				::core::result::Result::Ok(Self(value))
			}
		}

		#[automatically_derived]
		impl ::core::fmt::LowerHex for #name {
			fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
				::core::fmt::LowerHex::fmt(&self.0, f)
			}
		}

		#(#enum_defs)*
	})
}
