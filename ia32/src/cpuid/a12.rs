//! Implements the CPUID 12 lookup structures, _Intel SGX Resource Enumeration_.

pub use self::{
	c0::CpuidA12C0,
	c1::CpuidA12C1,
	cn::{CpuidA12Cn, SgxSubleafType},
};

mod c0 {
	use ia32_macro::bitstruct;

	use super::super::cpuid_leaf;

	bitstruct! {
		/// Gets the `eax` register values for the CPUID `eax=12, ecx=0` leaf.
		pub struct Eax(u32) {
			/// SGX1 leaf functions.
			pub sgx1[0] => as bool,
			/// SGX2 leaf functions.
			pub sgx2[1] => as bool,
			/// `ENCLV` oversubscription leaves (`EINCVIRTCHILD`, `EDECVIRTCHILD`, `ESETCONTEXT`).
			pub enclv_oversub[5] => as bool,
			/// `ENCLS` oversubscription leaves (`ETRACKC`, `ERDINFO`, `ELDBC`, `ELDUC`).
			pub encls_oversub[6] => as bool,
			/// `ENCLU[EVERIFYREPORT2]`.
			pub everifyreport2[7] => as bool,
			/// `ENCLS[EUPDATESVN]`.
			pub eupdatesvn[10] => as bool,
			/// `ENCLU[EDECCSSA]`.
			pub edeccssa[11] => as bool,
		}
	}

	bitstruct! {
		/// Gets the `ebx` register values for the CPUID `eax=12, ecx=0` leaf.
		pub struct Ebx(u32) {
			/// Bit vector of supported extended SGX features (`MISCSELECT`).
			pub miscselect[31:0] => as u32,
		}
	}

	bitstruct! {
		/// Gets the `ecx` register values for the CPUID `eax=12, ecx=0` leaf.
		pub struct Ecx(u32) {}
	}

	bitstruct! {
		/// Gets the `edx` register values for the CPUID `eax=12, ecx=0` leaf.
		pub struct Edx(u32) {
			/// Log2 of the maximum enclave size outside 64-bit mode.
			pub max_enclave_size_not64[7:0] => as u8,
			/// Log2 of the maximum enclave size in 64-bit mode.
			pub max_enclave_size_64[15:8] => as u8,
		}
	}

	cpuid_leaf! {
		/// SGX capability enumeration.
		CpuidA12C0 = (0x12, 0x00)
	}
}

mod c1 {
	use ia32_macro::bitstruct;

	use super::super::cpuid_leaf;

	bitstruct! {
		/// Gets the `eax` register values for the CPUID `eax=12, ecx=1` leaf.
		///
		/// Together with `ebx`, `ecx` and `edx` this is the 128-bit mask of
		/// `SECS.ATTRIBUTES` bits software may set.
		pub struct Eax(u32) {
			/// Bits `[31:0]` of the valid attributes mask.
			pub attributes_0[31:0] => as u32,
		}
	}

	bitstruct! {
		/// Gets the `ebx` register values for the CPUID `eax=12, ecx=1` leaf.
		pub struct Ebx(u32) {
			/// Bits `[63:32]` of the valid attributes mask.
			pub attributes_1[31:0] => as u32,
		}
	}

	bitstruct! {
		/// Gets the `ecx` register values for the CPUID `eax=12, ecx=1` leaf.
		pub struct Ecx(u32) {
			/// Bits `[95:64]` of the valid attributes mask.
			pub attributes_2[31:0] => as u32,
		}
	}

	bitstruct! {
		/// Gets the `edx` register values for the CPUID `eax=12, ecx=1` leaf.
		pub struct Edx(u32) {
			/// Bits `[127:96]` of the valid attributes mask.
			pub attributes_3[31:0] => as u32,
		}
	}

	cpuid_leaf! {
		/// SGX attributes enumeration.
		CpuidA12C1 = (0x12, 0x01)
	}

	impl CpuidA12C1 {
		/// Returns the 128-bit valid `SECS.ATTRIBUTES` mask.
		#[must_use]
		pub const fn attributes(&self) -> u128 {
			(self.eax.attributes_0() as u128)
				| ((self.ebx.attributes_1() as u128) << 32)
				| ((self.ecx.attributes_2() as u128) << 64)
				| ((self.edx.attributes_3() as u128) << 96)
		}
	}
}

mod cn {
	use ia32_macro::bitstruct;

	use super::super::cpuid_leaf;

	bitstruct! {
		/// Gets the `eax` register values for the CPUID `eax=12, ecx=n` leaf (`n >= 2`).
		pub struct Eax(u32) {
			/// What this subleaf describes.
			pub subleaf_type[3:0] => enum SgxSubleafType(u8) {
				/// No more EPC sections.
				Invalid = 0,
				/// An EPC section.
				Epc = 1,
			},
			/// Bits `[31:12]` of the EPC section's physical base address.
			pub base_low[31:12] => as u32,
		}
	}

	bitstruct! {
		/// Gets the `ebx` register values for the CPUID `eax=12, ecx=n` leaf (`n >= 2`).
		pub struct Ebx(u32) {
			/// Bits `[51:32]` of the EPC section's physical base address.
			pub base_high[19:0] => as u32,
		}
	}

	bitstruct! {
		/// Gets the `ecx` register values for the CPUID `eax=12, ecx=n` leaf (`n >= 2`).
		pub struct Ecx(u32) {
			/// EPC section properties.
			pub properties[3:0] => as u8,
			/// Bits `[31:12]` of the EPC section's size.
			pub size_low[31:12] => as u32,
		}
	}

	bitstruct! {
		/// Gets the `edx` register values for the CPUID `eax=12, ecx=n` leaf (`n >= 2`).
		pub struct Edx(u32) {
			/// Bits `[51:32]` of the EPC section's size.
			pub size_high[19:0] => as u32,
		}
	}

	cpuid_leaf! {
		/// SGX EPC section enumeration. Subleaves from 2 are enumerated
		/// until the subleaf type is [`SgxSubleafType::Invalid`].
		CpuidA12Cn = (0x12, n)
	}

	impl CpuidA12Cn {
		/// Returns the physical base address of the EPC section.
		#[must_use]
		pub const fn base(&self) -> u64 {
			((self.ebx.base_high() as u64) << 32) | ((self.eax.base_low() as u64) << 12)
		}

		/// Returns the size, in bytes, of the EPC section.
		#[must_use]
		pub const fn size(&self) -> u64 {
			((self.edx.size_high() as u64) << 32) | ((self.ecx.size_low() as u64) << 12)
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::cpuid::{CpuidLeaf, CpuidResult, IndexedCpuidLeaf};

	#[test]
	fn epc_section() {
		let leaf = CpuidA12Cn::from_result(CpuidResult {
			eax: 0x7000_0001,
			ebx: 0x0000_0000,
			ecx: 0x0F80_0001,
			edx: 0x0000_0000,
		});
		assert_eq!(leaf.eax.subleaf_type(), Some(SgxSubleafType::Epc));
		assert_eq!(leaf.base(), 0x7000_0000);
		assert_eq!(leaf.size(), 0x0F80_0000);
	}

	#[test]
	fn epc_section_above_4g() {
		let leaf = CpuidA12Cn::from_result(CpuidResult {
			eax: 0x0000_1001,
			ebx: 0x0000_0004,
			ecx: 0x0000_0001,
			edx: 0x0000_0002,
		});
		assert_eq!(leaf.base(), 0x4_0000_1000);
		assert_eq!(leaf.size(), 0x2_0000_0000);
	}

	#[test]
	fn attributes_mask() {
		let leaf = CpuidA12C1::from_result(CpuidResult {
			eax: 0x36,
			ebx: 0,
			ecx: 0x1F,
			edx: 0,
		});
		assert_eq!(leaf.attributes(), 0x36 | (0x1F_u128 << 64));
	}
}
