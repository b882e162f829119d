//! Implements the extended CPUID leaves (`8000_0000H` and up).

pub use self::{
	e0::CpuidA80000000, e1::CpuidA80000001, e6::CpuidA80000006, e7::CpuidA80000007,
	e8::CpuidA80000008,
};
use super::CpuidResult;

mod e0 {
	use ia32_macro::bitstruct;

	use super::super::cpuid_leaf;

	bitstruct! {
		/// Gets the `eax` register values for the CPUID `eax=8000_0000` leaf.
		pub struct Eax(u32) {
			/// The highest supported extended leaf.
			pub max_extended_leaf[31:0] => as u32,
		}
	}

	bitstruct! {
		/// Gets the `ebx` register values for the CPUID `eax=8000_0000` leaf.
		pub struct Ebx(u32) {}
	}

	bitstruct! {
		/// Gets the `ecx` register values for the CPUID `eax=8000_0000` leaf.
		pub struct Ecx(u32) {}
	}

	bitstruct! {
		/// Gets the `edx` register values for the CPUID `eax=8000_0000` leaf.
		pub struct Edx(u32) {}
	}

	cpuid_leaf! {
		/// Maximum extended function.
		CpuidA80000000 = (0x8000_0000, 0x00)
	}
}

mod e1 {
	use ia32_macro::bitstruct;

	use super::super::cpuid_leaf;

	bitstruct! {
		/// Gets the `eax` register values for the CPUID `eax=8000_0001` leaf.
		pub struct Eax(u32) {
			/// Extended processor signature.
			pub signature[31:0] => as u32,
		}
	}

	bitstruct! {
		/// Gets the `ebx` register values for the CPUID `eax=8000_0001` leaf.
		pub struct Ebx(u32) {}
	}

	bitstruct! {
		/// Gets the `ecx` register values for the CPUID `eax=8000_0001` leaf.
		pub struct Ecx(u32) {
			/// `LAHF`/`SAHF` in 64-bit mode.
			pub lahf_lm[0] => as bool,
			/// `LZCNT`.
			pub lzcnt[5] => as bool,
			/// `PREFETCHW`.
			pub prefetchw[8] => as bool,
		}
	}

	bitstruct! {
		/// Gets the `edx` register values for the CPUID `eax=8000_0001` leaf.
		pub struct Edx(u32) {
			/// `SYSCALL`/`SYSRET` in 64-bit mode.
			pub syscall[11] => as bool,
			/// Execute-disable bit.
			pub nx[20] => as bool,
			/// 1-GByte pages.
			pub page_1gb[26] => as bool,
			/// `RDTSCP` and `IA32_TSC_AUX`.
			pub rdtscp[27] => as bool,
			/// Intel 64 architecture (long mode).
			pub lm[29] => as bool,
		}
	}

	cpuid_leaf! {
		/// Extended processor signature and feature bits.
		CpuidA80000001 = (0x8000_0001, 0x00)
	}
}

mod e6 {
	use ia32_macro::bitstruct;

	use super::super::cpuid_leaf;

	bitstruct! {
		/// Gets the `eax` register values for the CPUID `eax=8000_0006` leaf.
		pub struct Eax(u32) {}
	}

	bitstruct! {
		/// Gets the `ebx` register values for the CPUID `eax=8000_0006` leaf.
		pub struct Ebx(u32) {}
	}

	bitstruct! {
		/// Gets the `ecx` register values for the CPUID `eax=8000_0006` leaf.
		pub struct Ecx(u32) {
			/// Cache line size, in bytes.
			pub line_size[7:0] => as u8,
			/// L2 associativity field (an encoded value, see leaf 04H for the exact count).
			pub associativity[15:12] => as u8,
			/// Cache size, in 1K units.
			pub size_kb[31:16] => as u16,
		}
	}

	bitstruct! {
		/// Gets the `edx` register values for the CPUID `eax=8000_0006` leaf.
		pub struct Edx(u32) {}
	}

	cpuid_leaf! {
		/// L2 cache parameters.
		CpuidA80000006 = (0x8000_0006, 0x00)
	}
}

mod e7 {
	use ia32_macro::bitstruct;

	use super::super::cpuid_leaf;

	bitstruct! {
		/// Gets the `eax` register values for the CPUID `eax=8000_0007` leaf.
		pub struct Eax(u32) {}
	}

	bitstruct! {
		/// Gets the `ebx` register values for the CPUID `eax=8000_0007` leaf.
		pub struct Ebx(u32) {}
	}

	bitstruct! {
		/// Gets the `ecx` register values for the CPUID `eax=8000_0007` leaf.
		pub struct Ecx(u32) {}
	}

	bitstruct! {
		/// Gets the `edx` register values for the CPUID `eax=8000_0007` leaf.
		pub struct Edx(u32) {
			/// The TSC runs at a constant rate in all ACPI P-, C- and T-states.
			pub invariant_tsc[8] => as bool,
		}
	}

	cpuid_leaf! {
		/// Advanced power management.
		CpuidA80000007 = (0x8000_0007, 0x00)
	}
}

mod e8 {
	use ia32_macro::bitstruct;

	use super::super::cpuid_leaf;

	bitstruct! {
		/// Gets the `eax` register values for the CPUID `eax=8000_0008` leaf.
		pub struct Eax(u32) {
			/// Physical address width, in bits.
			pub physical_address_bits[7:0] => as u8,
			/// Linear address width, in bits.
			pub linear_address_bits[15:8] => as u8,
		}
	}

	bitstruct! {
		/// Gets the `ebx` register values for the CPUID `eax=8000_0008` leaf.
		pub struct Ebx(u32) {
			/// `WBNOINVD`.
			pub wbnoinvd[9] => as bool,
		}
	}

	bitstruct! {
		/// Gets the `ecx` register values for the CPUID `eax=8000_0008` leaf.
		pub struct Ecx(u32) {}
	}

	bitstruct! {
		/// Gets the `edx` register values for the CPUID `eax=8000_0008` leaf.
		pub struct Edx(u32) {}
	}

	cpuid_leaf! {
		/// Address sizes.
		CpuidA80000008 = (0x8000_0008, 0x00)
	}
}

/// The 48-byte processor brand string, from leaves `8000_0002H`
/// through `8000_0004H`.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct BrandString([u8; 48]);

impl BrandString {
	/// The first of the three brand string leaves.
	pub const FIRST_LEAF: u32 = 0x8000_0002;

	/// Assembles the brand string from the three leaf results, in order.
	#[must_use]
	pub fn from_results(results: [CpuidResult; 3]) -> Self {
		let mut bytes = [0; 48];
		let words = results
			.iter()
			.flat_map(|r| [r.eax, r.ebx, r.ecx, r.edx]);
		for (chunk, word) in bytes.chunks_exact_mut(4).zip(words) {
			chunk.copy_from_slice(&word.to_le_bytes());
		}
		Self(bytes)
	}

	/// Returns the raw bytes, including the NUL padding.
	#[must_use]
	pub const fn as_bytes(&self) -> &[u8; 48] {
		&self.0
	}

	/// Returns the string up to the first NUL with surrounding
	/// whitespace removed, or `None` if it is not valid UTF-8.
	#[must_use]
	pub fn as_str(&self) -> Option<&str> {
		let len = self.0.iter().position(|&b| b == 0).unwrap_or(self.0.len());
		core::str::from_utf8(&self.0[..len]).ok().map(str::trim)
	}

	/// Reads the brand string from the processor.
	///
	/// Returns an error if leaf `8000_0004H` is not available.
	#[cfg(target_arch = "x86_64")]
	pub fn get() -> Result<Self, super::CpuidError> {
		Ok(Self::from_results([
			super::cpuid_checked(Self::FIRST_LEAF, 0)?,
			super::cpuid_checked(Self::FIRST_LEAF + 1, 0)?,
			super::cpuid_checked(Self::FIRST_LEAF + 2, 0)?,
		]))
	}
}

impl core::fmt::Debug for BrandString {
	fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
		f.debug_tuple("BrandString").field(&self.as_str()).finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::cpuid::CpuidLeaf;

	fn words(s: &[u8; 16]) -> CpuidResult {
		let w = |i: usize| u32::from_le_bytes([s[i], s[i + 1], s[i + 2], s[i + 3]]);
		CpuidResult {
			eax: w(0),
			ebx: w(4),
			ecx: w(8),
			edx: w(12),
		}
	}

	#[test]
	fn brand_string_is_trimmed() {
		let brand = BrandString::from_results([
			words(b"      Intel(R) C"),
			words(b"ore(TM) i7 CPU\0\0"),
			words(&[0; 16]),
		]);
		assert_eq!(brand.as_str(), Some("Intel(R) Core(TM) i7 CPU"));
		assert_eq!(brand.as_bytes()[6], b'I');
	}

	#[test]
	fn address_sizes() {
		let leaf = CpuidA80000008::from_result(CpuidResult {
			eax: 0x3930,
			ebx: 1 << 9,
			ecx: 0,
			edx: 0,
		});
		assert_eq!(leaf.eax.physical_address_bits(), 48);
		assert_eq!(leaf.eax.linear_address_bits(), 57);
		assert!(leaf.ebx.wbnoinvd());
	}

	#[test]
	fn extended_features() {
		let leaf = CpuidA80000001::from_result(CpuidResult {
			eax: 0,
			ebx: 0,
			ecx: 0x121,
			edx: 0x2C10_0800,
		});
		assert!(leaf.ecx.lahf_lm());
		assert!(leaf.ecx.lzcnt());
		assert!(leaf.ecx.prefetchw());
		assert!(leaf.edx.syscall());
		assert!(leaf.edx.nx());
		assert!(leaf.edx.page_1gb());
		assert!(leaf.edx.rdtscp());
		assert!(leaf.edx.lm());
	}
}
