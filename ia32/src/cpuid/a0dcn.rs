//! Implements the CPUID 0D:n lookup structure (`n >= 2`), _Extended State Component Enumeration_.

use ia32_macro::bitstruct;

use super::cpuid_leaf;

bitstruct! {
	/// Gets the `eax` register values for the CPUID `eax=0D, ecx=n` leaf.
	pub struct Eax(u32) {
		/// Size, in bytes, of the state component.
		pub size[31:0] => as u32,
	}
}

bitstruct! {
	/// Gets the `ebx` register values for the CPUID `eax=0D, ecx=n` leaf.
	pub struct Ebx(u32) {
		/// Offset of the component from the start of a standard-format
		/// XSAVE area. Zero for supervisor components.
		pub offset[31:0] => as u32,
	}
}

bitstruct! {
	/// Gets the `ecx` register values for the CPUID `eax=0D, ecx=n` leaf.
	pub struct Ecx(u32) {
		/// The component is managed through `IA32_XSS` rather than `XCR0`.
		pub supervisor[0] => as bool,
		/// The component is 64-byte aligned in the compacted format.
		pub aligned_64[1] => as bool,
		/// The component is subject to extended feature disable.
		pub xfd_faulting[2] => as bool,
	}
}

bitstruct! {
	/// Gets the `edx` register values for the CPUID `eax=0D, ecx=n` leaf.
	pub struct Edx(u32) {}
}

cpuid_leaf! {
	/// Extended State Component Enumeration. The subleaf is the
	/// state-component index (2 and up).
	CpuidA0DCn = (0x0D, n)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::cpuid::{CpuidResult, IndexedCpuidLeaf};

	#[test]
	fn avx_component() {
		let leaf = CpuidA0DCn::from_result(CpuidResult {
			eax: 256,
			ebx: 576,
			ecx: 0,
			edx: 0,
		});
		assert_eq!(leaf.eax.size(), 256);
		assert_eq!(leaf.ebx.offset(), 576);
		assert!(!leaf.ecx.supervisor());
	}
}
