//! Implements the CPUID 17 lookup structures, _System-On-Chip Vendor Attribute Enumeration_.

pub use self::{c0::CpuidA17C0, cn::CpuidA17Cn};

mod c0 {
	use ia32_macro::bitstruct;

	use super::super::cpuid_leaf;

	bitstruct! {
		/// Gets the `eax` register values for the CPUID `eax=17, ecx=0` leaf.
		pub struct Eax(u32) {
			/// The highest supported subleaf of leaf 17H.
			pub max_subleaf[31:0] => as u32,
		}
	}

	bitstruct! {
		/// Gets the `ebx` register values for the CPUID `eax=17, ecx=0` leaf.
		pub struct Ebx(u32) {
			/// SoC vendor ID.
			pub vendor_id[15:0] => as u16,
			/// The vendor ID is assigned by an industry standard scheme.
			pub is_vendor_scheme[16] => as bool,
		}
	}

	bitstruct! {
		/// Gets the `ecx` register values for the CPUID `eax=17, ecx=0` leaf.
		pub struct Ecx(u32) {
			/// Project ID assigned by the vendor.
			pub project_id[31:0] => as u32,
		}
	}

	bitstruct! {
		/// Gets the `edx` register values for the CPUID `eax=17, ecx=0` leaf.
		pub struct Edx(u32) {
			/// Stepping ID assigned by the vendor.
			pub stepping_id[31:0] => as u32,
		}
	}

	cpuid_leaf! {
		/// SoC vendor attributes, main leaf.
		CpuidA17C0 = (0x17, 0x00)
	}
}

mod cn {
	use ia32_macro::bitstruct;

	use super::super::cpuid_leaf;

	bitstruct! {
		/// Gets the `eax` register values for the CPUID `eax=17, ecx=1..=3` leaves.
		pub struct Eax(u32) {
			/// Brand string bytes.
			pub chars[31:0] => as u32,
		}
	}

	bitstruct! {
		/// Gets the `ebx` register values for the CPUID `eax=17, ecx=1..=3` leaves.
		pub struct Ebx(u32) {
			/// Brand string bytes.
			pub chars[31:0] => as u32,
		}
	}

	bitstruct! {
		/// Gets the `ecx` register values for the CPUID `eax=17, ecx=1..=3` leaves.
		pub struct Ecx(u32) {
			/// Brand string bytes.
			pub chars[31:0] => as u32,
		}
	}

	bitstruct! {
		/// Gets the `edx` register values for the CPUID `eax=17, ecx=1..=3` leaves.
		pub struct Edx(u32) {
			/// Brand string bytes.
			pub chars[31:0] => as u32,
		}
	}

	cpuid_leaf! {
		/// SoC vendor brand string. Subleaves 1 through 3 each hold
		/// 16 bytes of the string.
		CpuidA17Cn = (0x17, n)
	}

	impl CpuidA17Cn {
		/// Returns the 16 brand string bytes of this subleaf.
		#[must_use]
		pub const fn bytes(&self) -> [u8; 16] {
			let words = [
				self.eax.chars(),
				self.ebx.chars(),
				self.ecx.chars(),
				self.edx.chars(),
			];
			let mut out = [0; 16];
			let mut i = 0;
			while i < 16 {
				out[i] = words[i / 4].to_le_bytes()[i % 4];
				i += 1;
			}
			out
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::cpuid::{CpuidResult, IndexedCpuidLeaf};

	#[test]
	fn brand_bytes_are_little_endian() {
		let leaf = CpuidA17Cn::from_result(CpuidResult {
			eax: u32::from_le_bytes(*b"Acme"),
			ebx: u32::from_le_bytes(*b" SoC"),
			ecx: u32::from_le_bytes(*b" 900"),
			edx: 0,
		});
		assert_eq!(&leaf.bytes(), b"Acme SoC 900\0\0\0\0");
	}
}
