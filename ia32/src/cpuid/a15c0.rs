//! Implements the CPUID 15:0 lookup structure, _Time Stamp Counter and Nominal Core Crystal Clock_.

use ia32_macro::bitstruct;

use super::cpuid_leaf;

bitstruct! {
	/// Gets the `eax` register values for the CPUID `eax=15` leaf.
	pub struct Eax(u32) {
		/// Denominator of the TSC/core crystal clock ratio.
		pub denominator[31:0] => as u32,
	}
}

bitstruct! {
	/// Gets the `ebx` register values for the CPUID `eax=15` leaf.
	pub struct Ebx(u32) {
		/// Numerator of the TSC/core crystal clock ratio.
		pub numerator[31:0] => as u32,
	}
}

bitstruct! {
	/// Gets the `ecx` register values for the CPUID `eax=15` leaf.
	pub struct Ecx(u32) {
		/// Nominal frequency of the core crystal clock, in Hz.
		pub crystal_hz[31:0] => as u32,
	}
}

bitstruct! {
	/// Gets the `edx` register values for the CPUID `eax=15` leaf.
	pub struct Edx(u32) {}
}

cpuid_leaf! {
	/// TSC and nominal core crystal clock information.
	CpuidA15C0 = (0x15, 0x00)
}

impl CpuidA15C0 {
	/// Returns the TSC frequency in Hz, or `None` if the ratio or the
	/// crystal frequency is not enumerated.
	#[must_use]
	pub const fn tsc_frequency(&self) -> Option<u64> {
		let denominator = self.eax.denominator() as u64;
		let numerator = self.ebx.numerator() as u64;
		let crystal = self.ecx.crystal_hz() as u64;
		if denominator == 0 || numerator == 0 || crystal == 0 {
			return None;
		}
		Some(crystal * numerator / denominator)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::cpuid::{CpuidLeaf, CpuidResult};

	#[test]
	fn tsc_frequency() {
		let leaf = CpuidA15C0::from_result(CpuidResult {
			eax: 2,
			ebx: 176,
			ecx: 38_400_000,
			edx: 0,
		});
		assert_eq!(leaf.tsc_frequency(), Some(3_379_200_000));
	}

	#[test]
	fn missing_crystal_frequency() {
		let leaf = CpuidA15C0::from_result(CpuidResult {
			eax: 2,
			ebx: 176,
			ecx: 0,
			edx: 0,
		});
		assert_eq!(leaf.tsc_frequency(), None);
	}
}
