//! MTRR and PAT records.

use ia32_macro::bitstruct;

use super::{IA32_MTRR_DEF_TYPE, IA32_MTRRCAP, IA32_PAT, msr_value};
use crate::memtype::MemoryType;

bitstruct! {
	/// `IA32_MTRRCAP`: MTRR capabilities (read-only).
	pub struct MtrrCap(u64) {
		/// Number of variable-range MTRR pairs.
		pub variable_range_count[7:0] => as u8,
		/// Fixed-range MTRRs are supported.
		pub fixed_range_supported[8] => as bool,
		/// The write-combining memory type is supported.
		pub wc_supported[10] => as bool,
		/// The SMRR interface is supported.
		pub smrr_supported[11] => as bool,
		/// `SMRR_PHYSMASK` lock (PRMRR) is supported.
		pub prmrr_supported[12] => as bool,
	}
}

bitstruct! {
	/// `IA32_MTRR_DEF_TYPE`: default memory type and MTRR enables.
	pub struct MtrrDefType(u64) {
		/// Memory type of physical memory not covered by an MTRR.
		pub default_memory_type[2:0] => as u8,
		/// Fixed-range MTRRs enable.
		pub fixed_range_enable[10] => as bool,
		/// MTRRs enable.
		pub mtrr_enable[11] => as bool,
	}
}

bitstruct! {
	/// `IA32_MTRR_PHYSBASEn`: base of a variable-range MTRR.
	pub struct MtrrPhysBase(u64) {
		/// Memory type of the range.
		pub memory_type[7:0] => as u8,
		/// Page frame number of the range base.
		pub page_frame_number[51:12] => as u64,
	}
}

bitstruct! {
	/// `IA32_MTRR_PHYSMASKn`: mask of a variable-range MTRR.
	///
	/// An address `a` is in the range if
	/// `a & mask == base & mask` (both page aligned).
	pub struct MtrrPhysMask(u64) {
		/// The pair is enabled.
		pub valid[11] => as bool,
		/// Page frame number of the mask.
		pub page_frame_number[51:12] => as u64,
	}
}

impl MtrrPhysBase {
	/// Returns the decoded memory type, if valid.
	#[must_use]
	pub const fn memory_type_kind(self) -> Option<MemoryType> {
		MemoryType::from_raw(self.memory_type())
	}

	/// Returns the physical base address of the range.
	#[must_use]
	pub const fn base_address(self) -> u64 {
		self.page_frame_number() << 12
	}
}

impl MtrrPhysMask {
	/// Returns the physical mask of the range.
	#[must_use]
	pub const fn mask(self) -> u64 {
		self.page_frame_number() << 12
	}

	/// Returns whether `address` falls in the range described by
	/// `base` and this mask. Always `false` when the pair is disabled.
	#[must_use]
	pub const fn contains(self, base: MtrrPhysBase, address: u64) -> bool {
		self.valid() && (address & self.mask()) == (base.base_address() & self.mask())
	}

	/// Returns the size of the range, given the processor's physical
	/// address width (`CPUID.80000008H:EAX[7:0]`).
	#[must_use]
	pub const fn size(self, physical_address_bits: u8) -> u64 {
		let address_mask = (1_u64 << physical_address_bits) - 1;
		(!self.mask() & address_mask) + 1
	}
}

bitstruct! {
	/// `IA32_PAT`: the page attribute table.
	///
	/// Each entry is a [`MemoryType`] encoding; the entry used by a
	/// translation is selected by the `PAT`, `PCD` and `PWT` bits of the
	/// entry that maps the page (see [`crate::memtype::pat_index`]).
	pub struct Pat(u64) {
		/// Entry 0.
		pub pa0[2:0] => as u8,
		/// Entry 1.
		pub pa1[10:8] => as u8,
		/// Entry 2.
		pub pa2[18:16] => as u8,
		/// Entry 3.
		pub pa3[26:24] => as u8,
		/// Entry 4.
		pub pa4[34:32] => as u8,
		/// Entry 5.
		pub pa5[42:40] => as u8,
		/// Entry 6.
		pub pa6[50:48] => as u8,
		/// Entry 7.
		pub pa7[58:56] => as u8,
	}
}

impl Pat {
	/// Returns entry `index` (0-7), or `None` if it is out of range or
	/// holds a reserved encoding.
	#[must_use]
	pub const fn entry(self, index: u8) -> Option<MemoryType> {
		if index > 7 {
			return None;
		}
		MemoryType::from_raw(((self.0 >> (index * 8)) & 0x7) as u8)
	}

	/// Returns a copy with entry `index` (0-7) set to `ty`.
	#[must_use]
	pub const fn with_entry(self, index: u8, ty: MemoryType) -> Self {
		let shift = (index & 7) * 8;
		Self((self.0 & !(0x7 << shift)) | ((ty as u64) << shift))
	}
}

msr_value! {
	MtrrCap = IA32_MTRRCAP,
	MtrrDefType = IA32_MTRR_DEF_TYPE,
	MtrrPhysBase,
	MtrrPhysMask,
	Pat = IA32_PAT,
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::memtype::PAT_DEFAULT;

	#[test]
	fn mtrrcap() {
		let cap = MtrrCap::from_bits(0xD0A);
		assert_eq!(cap.variable_range_count(), 10);
		assert!(cap.fixed_range_supported());
		assert!(cap.wc_supported());
		assert!(cap.smrr_supported());
	}

	#[test]
	fn variable_range() {
		// 256 MiB write-combining range at 3 GiB.
		let base = MtrrPhysBase::new()
			.with_page_frame_number(0xC000_0000 >> 12)
			.with_memory_type(MemoryType::WriteCombining.raw());
		let mask = MtrrPhysMask::new()
			.with_valid(true)
			.with_page_frame_number(0xF_F000_0000 >> 12);
		assert_eq!(base.bits(), 0xC000_0001);
		assert_eq!(base.memory_type_kind(), Some(MemoryType::WriteCombining));
		assert!(mask.contains(base, 0xC800_0000));
		assert!(!mask.contains(base, 0xD000_0000));
		assert_eq!(mask.size(36), 0x1000_0000);
		assert!(!mask.with_valid(false).contains(base, 0xC800_0000));
	}

	#[test]
	fn pat_entries() {
		let pat = Pat::from_bits(PAT_DEFAULT);
		assert_eq!(pat.entry(0), Some(MemoryType::WriteBack));
		assert_eq!(pat.entry(2), Some(MemoryType::UcMinus));
		assert_eq!(pat.entry(8), None);
		assert_eq!(pat.pa3(), 0);

		let pat = pat.with_entry(1, MemoryType::WriteCombining);
		assert_eq!(pat.entry(1), Some(MemoryType::WriteCombining));
		assert_eq!(pat.bits(), 0x0007_0406_0007_0106);
	}
}
