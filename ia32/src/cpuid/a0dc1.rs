//! Implements the CPUID 0D:1 lookup structure, _Processor Extended State Enumeration Sub-leaf 1_.

use ia32_macro::bitstruct;

use super::cpuid_leaf;

bitstruct! {
	/// Gets the `eax` register values for the CPUID `eax=0D, ecx=1` leaf.
	pub struct Eax(u32) {
		/// `XSAVEOPT`.
		pub xsaveopt[0] => as bool,
		/// `XSAVEC` and the compacted form of `XRSTOR`.
		pub xsavec[1] => as bool,
		/// `XGETBV` with `ecx = 1`.
		pub xgetbv_ecx1[2] => as bool,
		/// `XSAVES`/`XRSTORS` and `IA32_XSS`.
		pub xsaves[3] => as bool,
		/// Extended feature disable (`IA32_XFD`).
		pub xfd[4] => as bool,
	}
}

bitstruct! {
	/// Gets the `ebx` register values for the CPUID `eax=0D, ecx=1` leaf.
	pub struct Ebx(u32) {
		/// Size, in bytes, of the XSAVE area for the features enabled
		/// in `XCR0 | IA32_XSS`.
		pub enabled_size[31:0] => as u32,
	}
}

bitstruct! {
	/// Gets the `ecx` register values for the CPUID `eax=0D, ecx=1` leaf.
	pub struct Ecx(u32) {
		/// Supported `IA32_XSS` bits `[31:0]`.
		pub xss_supported_low[31:0] => as u32,
	}
}

bitstruct! {
	/// Gets the `edx` register values for the CPUID `eax=0D, ecx=1` leaf.
	pub struct Edx(u32) {
		/// Supported `IA32_XSS` bits `[63:32]`.
		pub xss_supported_high[31:0] => as u32,
	}
}

cpuid_leaf! {
	/// Processor Extended State Enumeration, subleaf 1.
	CpuidA0DC1 = (0x0D, 0x01)
}

impl CpuidA0DC1 {
	/// Returns the full 64-bit mask of supported `IA32_XSS` bits.
	#[must_use]
	pub const fn xss_supported(&self) -> u64 {
		((self.edx.xss_supported_high() as u64) << 32) | self.ecx.xss_supported_low() as u64
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::cpuid::{CpuidLeaf, CpuidResult};

	#[test]
	fn supervisor_state_mask() {
		let leaf = CpuidA0DC1::from_result(CpuidResult {
			eax: 0x0000_000F,
			ebx: 0x0000_0988,
			ecx: 0x0001_9900,
			edx: 0x0000_0000,
		});
		assert!(leaf.eax.xsaves());
		assert!(!leaf.eax.xfd());
		assert_eq!(leaf.xss_supported(), 0x1_9900);
	}
}
