//! Implements the CPUID 0D:0 lookup structure, _Processor Extended State Enumeration Main Leaf_.

use ia32_macro::bitstruct;

use super::cpuid_leaf;

bitstruct! {
	/// Gets the `eax` register values for the CPUID `eax=0D, ecx=0` leaf.
	///
	/// Reports the bits of `XCR0` that may be set (lower half).
	pub struct Eax(u32) {
		/// Supported `XCR0` bits `[31:0]`.
		pub xcr0_supported_low[31:0] => as u32,
	}
}

bitstruct! {
	/// Gets the `ebx` register values for the CPUID `eax=0D, ecx=0` leaf.
	pub struct Ebx(u32) {
		/// Size, in bytes, of the XSAVE area required by the features
		/// currently enabled in `XCR0`.
		pub enabled_size[31:0] => as u32,
	}
}

bitstruct! {
	/// Gets the `ecx` register values for the CPUID `eax=0D, ecx=0` leaf.
	pub struct Ecx(u32) {
		/// Size, in bytes, of the XSAVE area required by every
		/// supported `XCR0` feature.
		pub max_size[31:0] => as u32,
	}
}

bitstruct! {
	/// Gets the `edx` register values for the CPUID `eax=0D, ecx=0` leaf.
	pub struct Edx(u32) {
		/// Supported `XCR0` bits `[63:32]`.
		pub xcr0_supported_high[31:0] => as u32,
	}
}

cpuid_leaf! {
	/// Processor Extended State Enumeration, main leaf.
	CpuidA0DC0 = (0x0D, 0x00)
}

impl CpuidA0DC0 {
	/// Returns the full 64-bit mask of supported `XCR0` bits.
	#[must_use]
	pub const fn xcr0_supported(&self) -> u64 {
		((self.edx.xcr0_supported_high() as u64) << 32) | self.eax.xcr0_supported_low() as u64
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::cpuid::{CpuidLeaf, CpuidResult};

	#[test]
	fn supported_mask_spans_both_halves() {
		let leaf = CpuidA0DC0::from_result(CpuidResult {
			eax: 0x0000_02E7,
			ebx: 0x0000_0A88,
			ecx: 0x0000_0A88,
			edx: 0x0000_0001,
		});
		assert_eq!(leaf.xcr0_supported(), 0x1_0000_02E7);
		assert_eq!(leaf.ebx.enabled_size(), 2696);
	}
}
