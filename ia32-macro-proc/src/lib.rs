#![cfg_attr(
	not(doc),
	expect(missing_docs, reason = "docs are enabled only under `doc` cfg")
)]
#![cfg_attr(doc, doc = include_str!("../README.md"))]
#![expect(
	clippy::single_call_fn,
	reason = "most macro entry points are single-call for code organization"
)]
#![allow(
	clippy::arithmetic_side_effects,
	clippy::unwrap_used,
	clippy::unwrap_in_result,
	clippy::indexing_slicing,
	clippy::unreachable,
	reason = "panics during proc macro expansion are acceptable"
)]
#![allow(
	clippy::missing_docs_in_private_items,
	reason = "macros are typically self-documenting through public interface"
)]
#![allow(
	clippy::needless_pass_by_value,
	reason = "consistent ownership semantics for proc macro inputs"
)]
#![allow(
	clippy::mixed_read_write_in_expression,
	reason = "common pattern when `syn`-parsing braces or other containers"
)]

extern crate proc_macro;

mod bitstruct;

use proc_macro::TokenStream;

/// Defines a bit structure wrapper type around a primitive integer type,
/// along with a set of field accessors, associated constants, and other utility functionality.
///
/// ```ignore
/// bitstruct! {
/// 	/// Some register.
/// 	pub struct SomeRegister(u64) {
/// 		/// A single-bit flag.
/// 		pub enable[0] => as bool,
/// 		/// A multi-bit field.
/// 		pub count[7:4] => as u8,
/// 		/// An enumerated field.
/// 		pub mode[9:8] => enum Mode(u8) {
/// 			/// Off.
/// 			Off = 0,
/// 			/// On.
/// 			On = 1,
/// 		},
/// 		/// A bit that always reads as one.
/// 		_[12] => 1,
/// 	}
/// }
/// ```
///
/// For every named field `foo`, the following are generated:
///
/// - `FOO_BIT` - the index of the lowest bit of the field.
/// - `FOO_MASK` - the mask of the field's width, not shifted.
/// - `FOO_FLAG` - the mask of the field, shifted into position.
/// - `foo()` - extracts the field (`(bits >> FOO_BIT) & FOO_MASK`).
/// - `with_foo(v)` - returns a copy with the field replaced.
/// - `set_foo(v)` - replaces the field in place.
///
/// Bits not covered by any field are reserved and are collected into
/// `RESERVED_MASK`; `DEFINED_MASK | RESERVED_MASK` always covers the full
/// width of the repr type. Overlapping fields are a compile error.
#[proc_macro]
pub fn bitstruct(input: TokenStream) -> TokenStream {
	match bitstruct::bitstruct(input.into()) {
		Ok(ts) => ts.into(),
		Err(err) => err.to_compile_error().into(),
	}
}
