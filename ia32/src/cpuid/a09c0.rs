//! Implements the CPUID 09:0 lookup structure, _Direct Cache Access_.

use ia32_macro::bitstruct;

use super::cpuid_leaf;

bitstruct! {
	/// Gets the `eax` register values for the CPUID `eax=09` leaf.
	pub struct Eax(u32) {
		/// Value of bits `[31:0]` of `IA32_PLATFORM_DCA_CAP`.
		pub platform_dca_cap[31:0] => as u32,
	}
}

bitstruct! {
	/// Gets the `ebx` register values for the CPUID `eax=09` leaf.
	pub struct Ebx(u32) {}
}

bitstruct! {
	/// Gets the `ecx` register values for the CPUID `eax=09` leaf.
	pub struct Ecx(u32) {}
}

bitstruct! {
	/// Gets the `edx` register values for the CPUID `eax=09` leaf.
	pub struct Edx(u32) {}
}

cpuid_leaf! {
	/// Direct Cache Access parameters.
	CpuidA09C0 = (0x09, 0x00)
}
