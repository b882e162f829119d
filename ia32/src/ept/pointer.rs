//! The EPT pointer.

use ia32_macro::bitstruct;

use crate::{
	consts::{BITS_PER_LEVEL, PAGE_SHIFT},
	memtype::MemoryType,
	msr::EptVpidCap,
	paging::frame_address,
};

bitstruct! {
	/// The EPT pointer (`EPT_POINTER`).
	pub struct Eptp(u64) {
		/// Memory type of the EPT paging structures. Only uncacheable
		/// and write-back are allowed.
		pub memory_type[2:0] => as u8,
		/// The number of EPT levels, minus one.
		pub page_walk_length[5:3] => as u8,
		/// Enable the accessed and dirty flags in EPT entries.
		pub enable_ad[6] => as bool,
		/// Enforce access rights for supervisor shadow-stack pages.
		pub enable_sss[7] => as bool,
		/// Page frame number of the root EPT table.
		pub page_frame_number[51:12] => as u64,
	}
}

frame_address!(Eptp => PAGE_SHIFT);

impl Eptp {
	/// Creates a pointer to a root table at `address`, walked with
	/// `levels` levels (4 or 5).
	///
	/// A `levels` of 0 is stored as a one-level walk, which
	/// [`Eptp::is_valid`] rejects.
	#[must_use]
	pub const fn for_root(address: u64, levels: u8, memory_type: MemoryType) -> Self {
		Self::new()
			.with_address(address)
			.with_page_walk_length(levels.saturating_sub(1))
			.with_memory_type(memory_type.raw())
	}

	/// Returns the memory type, if it is a recognized one.
	#[must_use]
	pub const fn memory_type_kind(self) -> Option<MemoryType> {
		MemoryType::from_raw(self.memory_type())
	}

	/// Returns the number of levels in the EPT hierarchy.
	#[inline(always)]
	#[must_use]
	pub const fn levels(self) -> u32 {
		self.page_walk_length() as u32 + 1
	}

	/// Returns the number of guest-physical address bits translated.
	#[inline(always)]
	#[must_use]
	pub const fn translated_bits(self) -> u32 {
		BITS_PER_LEVEL * self.levels() + PAGE_SHIFT
	}

	/// Returns whether the pointer may be loaded on a processor
	/// reporting `cap`.
	#[must_use]
	pub const fn is_valid(self, cap: EptVpidCap) -> bool {
		if self.reserved_bits() != 0 {
			return false;
		}

		let memory_type = match self.memory_type_kind() {
			Some(MemoryType::Uncacheable) => cap.memory_type_uc(),
			Some(MemoryType::WriteBack) => cap.memory_type_wb(),
			_ => false,
		};

		let walk = match self.levels() {
			4 => cap.page_walk_length_4(),
			5 => cap.page_walk_length_5(),
			_ => false,
		};

		memory_type
			&& walk
			&& (!self.enable_ad() || cap.ad_flags())
			&& (!self.enable_sss() || cap.supervisor_shadow_stack())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn write_back_four_level_with_ad() {
		let pfn = 0x12_3456_u64;
		let eptp = Eptp::new()
			.with_memory_type(6)
			.with_page_walk_length(3)
			.with_enable_ad(true)
			.with_page_frame_number(pfn);
		assert_eq!(eptp.bits(), (pfn << 12) | 0x5E);
		assert_eq!(eptp.bits() & 0xF80, 0);
		assert_eq!(eptp.bits() >> 48, 0);
		assert_eq!(eptp.reserved_bits(), 0);
		assert_eq!(eptp.memory_type_kind(), Some(MemoryType::WriteBack));
		assert_eq!(eptp.levels(), 4);
	}

	#[test]
	fn translated_bits() {
		for n in 0..8_u8 {
			let eptp = Eptp::new().with_page_walk_length(n);
			assert_eq!(eptp.translated_bits(), 9 * (u32::from(n) + 1) + 12);
		}
		assert_eq!(Eptp::new().with_page_walk_length(3).translated_bits(), 48);
		assert_eq!(Eptp::new().with_page_walk_length(4).translated_bits(), 57);
	}

	#[test]
	fn for_root() {
		let eptp = Eptp::for_root(0x0012_3000, 4, MemoryType::WriteBack);
		assert_eq!(eptp.bits(), 0x0012_301E);
		assert_eq!(eptp.address(), 0x0012_3000);

		let degenerate = Eptp::for_root(0x1000, 0, MemoryType::WriteBack);
		assert_eq!(degenerate.levels(), 1);
		assert!(!degenerate.is_valid(EptVpidCap::new().with_page_walk_length_4(true)));
	}

	#[test]
	fn validity() {
		let cap = EptVpidCap::new()
			.with_page_walk_length_4(true)
			.with_memory_type_wb(true);
		let eptp = Eptp::for_root(0x1000, 4, MemoryType::WriteBack);
		assert!(eptp.is_valid(cap));
		assert!(!eptp.with_enable_ad(true).is_valid(cap));
		assert!(eptp.with_enable_ad(true).is_valid(cap.with_ad_flags(true)));
		assert!(!Eptp::for_root(0x1000, 4, MemoryType::Uncacheable).is_valid(cap));
		assert!(!Eptp::for_root(0x1000, 5, MemoryType::WriteBack).is_valid(cap));
		assert!(!Eptp::for_root(0x1000, 4, MemoryType::WriteThrough).is_valid(cap));
		assert!(!Eptp::from_bits(eptp.bits() | 0x100).is_valid(cap));
	}
}
