//! Implements the CPUID 0B:n lookup structure, _Extended Topology Enumeration_.

use ia32_macro::bitstruct;

use super::cpuid_leaf;

bitstruct! {
	/// Gets the `eax` register values for the CPUID `eax=0B` leaf.
	pub struct Eax(u32) {
		/// Right-shift applied to the x2APIC ID to get a unique
		/// topology ID of the next level type.
		pub shift[4:0] => as u8,
	}
}

bitstruct! {
	/// Gets the `ebx` register values for the CPUID `eax=0B` leaf.
	pub struct Ebx(u32) {
		/// Number of logical processors at this level type.
		pub logical_processors[15:0] => as u16,
	}
}

bitstruct! {
	/// Gets the `ecx` register values for the CPUID `eax=0B` leaf.
	pub struct Ecx(u32) {
		/// The input subleaf.
		pub level_number[7:0] => as u8,
		/// The level type.
		pub level_type[15:8] => enum TopologyLevelType(u8) {
			/// No more levels.
			Invalid = 0,
			/// Simultaneous multithreading.
			Smt = 1,
			/// Core.
			Core = 2,
		},
	}
}

bitstruct! {
	/// Gets the `edx` register values for the CPUID `eax=0B` leaf.
	pub struct Edx(u32) {
		/// x2APIC ID of the current logical processor.
		pub x2apic_id[31:0] => as u32,
	}
}

cpuid_leaf! {
	/// Extended Topology Enumeration. Subleaves are enumerated until
	/// the level type is [`TopologyLevelType::Invalid`].
	CpuidA0B = (0x0B, n)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::cpuid::{CpuidResult, IndexedCpuidLeaf};

	#[test]
	fn decodes_core_level() {
		let leaf = CpuidA0B::from_result(CpuidResult {
			eax: 4,
			ebx: 16,
			ecx: 0x0201,
			edx: 0x0E,
		});
		assert_eq!(leaf.eax.shift(), 4);
		assert_eq!(leaf.ebx.logical_processors(), 16);
		assert_eq!(leaf.ecx.level_number(), 1);
		assert_eq!(leaf.ecx.level_type(), Some(TopologyLevelType::Core));
		assert_eq!(leaf.edx.x2apic_id(), 0x0E);
	}

	#[test]
	fn unknown_level_type() {
		assert_eq!(Ecx::from_bits(0x0500).level_type(), None);
		assert_eq!(Ecx::from_bits(0x0500).level_type_raw(), 5);
	}
}
