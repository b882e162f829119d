//! Implements the CPUID 16:0 lookup structure, _Processor Frequency Information_.

use ia32_macro::bitstruct;

use super::cpuid_leaf;

bitstruct! {
	/// Gets the `eax` register values for the CPUID `eax=16` leaf.
	pub struct Eax(u32) {
		/// Processor base frequency, in MHz.
		pub base_mhz[15:0] => as u16,
	}
}

bitstruct! {
	/// Gets the `ebx` register values for the CPUID `eax=16` leaf.
	pub struct Ebx(u32) {
		/// Maximum frequency, in MHz.
		pub max_mhz[15:0] => as u16,
	}
}

bitstruct! {
	/// Gets the `ecx` register values for the CPUID `eax=16` leaf.
	pub struct Ecx(u32) {
		/// Bus (reference) frequency, in MHz.
		pub bus_mhz[15:0] => as u16,
	}
}

bitstruct! {
	/// Gets the `edx` register values for the CPUID `eax=16` leaf.
	pub struct Edx(u32) {}
}

cpuid_leaf! {
	/// Processor Frequency Information.
	CpuidA16C0 = (0x16, 0x00)
}
