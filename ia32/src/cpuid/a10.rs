//! Implements the CPUID 10 lookup structures, _Intel RDT Allocation Enumeration_.

pub use self::{c0::CpuidA10C0, c1::CpuidA10C1, c2::CpuidA10C2, c3::CpuidA10C3};

mod c0 {
	use ia32_macro::bitstruct;

	use super::super::cpuid_leaf;

	bitstruct! {
		/// Gets the `eax` register values for the CPUID `eax=10, ecx=0` leaf.
		pub struct Eax(u32) {}
	}

	bitstruct! {
		/// Gets the `ebx` register values for the CPUID `eax=10, ecx=0` leaf.
		pub struct Ebx(u32) {
			/// L3 cache allocation technology.
			pub l3_cat[1] => as bool,
			/// L2 cache allocation technology.
			pub l2_cat[2] => as bool,
			/// Memory bandwidth allocation.
			pub mba[3] => as bool,
		}
	}

	bitstruct! {
		/// Gets the `ecx` register values for the CPUID `eax=10, ecx=0` leaf.
		pub struct Ecx(u32) {}
	}

	bitstruct! {
		/// Gets the `edx` register values for the CPUID `eax=10, ecx=0` leaf.
		pub struct Edx(u32) {}
	}

	cpuid_leaf! {
		/// RDT allocation, resource types.
		CpuidA10C0 = (0x10, 0x00)
	}
}

/// Defines the L3/L2 CAT subleaves, which share a layout.
macro_rules! cat_subleaf {
	($module:ident, $name:ident, $subleaf:literal, $doc:literal) => {
		mod $module {
			use ia32_macro::bitstruct;

			use super::super::cpuid_leaf;

			bitstruct! {
				/// Gets the `eax` register values for a CAT subleaf.
				pub struct Eax(u32) {
					/// Length of the capacity bit mask, minus one.
					pub cbm_length[4:0] => as u8,
				}
			}

			bitstruct! {
				/// Gets the `ebx` register values for a CAT subleaf.
				pub struct Ebx(u32) {
					/// Bit-granular map of isolation/contention of allocation units.
					pub shareable_units[31:0] => as u32,
				}
			}

			bitstruct! {
				/// Gets the `ecx` register values for a CAT subleaf.
				pub struct Ecx(u32) {
					/// Non-contiguous capacity bitmasks.
					pub noncontiguous_cbm[3] => as bool,
					/// Code and data prioritization.
					pub cdp[2] => as bool,
				}
			}

			bitstruct! {
				/// Gets the `edx` register values for a CAT subleaf.
				pub struct Edx(u32) {
					/// Highest class-of-service number supported.
					pub max_cos[15:0] => as u16,
				}
			}

			cpuid_leaf! {
				#[doc = $doc]
				$name = (0x10, $subleaf)
			}
		}
	};
}

cat_subleaf!(c1, CpuidA10C1, 0x01, "RDT allocation, L3 cache allocation technology.");
cat_subleaf!(c2, CpuidA10C2, 0x02, "RDT allocation, L2 cache allocation technology.");

mod c3 {
	use ia32_macro::bitstruct;

	use super::super::cpuid_leaf;

	bitstruct! {
		/// Gets the `eax` register values for the CPUID `eax=10, ecx=3` leaf.
		pub struct Eax(u32) {
			/// Maximum MBA throttling value, minus one.
			pub max_throttling[11:0] => as u16,
		}
	}

	bitstruct! {
		/// Gets the `ebx` register values for the CPUID `eax=10, ecx=3` leaf.
		pub struct Ebx(u32) {}
	}

	bitstruct! {
		/// Gets the `ecx` register values for the CPUID `eax=10, ecx=3` leaf.
		pub struct Ecx(u32) {
			/// Per-thread MBA controls.
			pub per_thread[0] => as bool,
			/// The response of the delay values is linear.
			pub linear_response[2] => as bool,
		}
	}

	bitstruct! {
		/// Gets the `edx` register values for the CPUID `eax=10, ecx=3` leaf.
		pub struct Edx(u32) {
			/// Highest class-of-service number supported.
			pub max_cos[15:0] => as u16,
		}
	}

	cpuid_leaf! {
		/// RDT allocation, memory bandwidth allocation.
		CpuidA10C3 = (0x10, 0x03)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::cpuid::{CpuidLeaf, CpuidResult};

	#[test]
	fn cat_subleaves_share_layout() {
		let raw = CpuidResult {
			eax: 0x0A,
			ebx: 0x600,
			ecx: 0x04,
			edx: 0x0F,
		};
		let l3 = CpuidA10C1::from_result(raw);
		let l2 = CpuidA10C2::from_result(raw);
		assert_eq!(l3.eax.cbm_length(), 10);
		assert!(l3.ecx.cdp());
		assert_eq!(l3.edx.max_cos(), 15);
		assert_eq!(l2.to_result(), raw);
		assert_eq!(<CpuidA10C2 as CpuidLeaf>::SUBLEAF, 2);
	}
}
