#![cfg_attr(
	not(doc),
	expect(missing_docs, reason = "docs are enabled only under `doc` cfg")
)]
#![cfg_attr(doc, doc = include_str!("../README.md"))]
#![cfg_attr(doc, feature(doc_cfg))]

extern crate proc_macro;

mod effect;

use proc_macro::TokenStream;

/// Declares the architectural side effect of a function.
///
/// The attribute wraps the function body in a pair of start/end
/// annotations. With the `ia32-test/emit` feature disabled (the
/// default) the annotations expand to nothing.
///
/// ```ignore
/// #[effect(write_reg = cr3)]
/// pub unsafe fn write_cr3(value: u64) { /* ... */ }
/// ```
#[proc_macro_attribute]
pub fn effect(attr: TokenStream, input: TokenStream) -> TokenStream {
	match effect::effect(attr.into(), input.into()) {
		Ok(ts) => ts.into(),
		Err(err) => err.to_compile_error().into(),
	}
}
