//! 4-level versus 5-level paging.

use crate::{
	consts::{BITS_PER_LEVEL, PAGE_SHIFT},
	reg::Cr4,
};

/// The number of levels in the IA-32e paging hierarchy, selected by
/// `CR4.LA57`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum PagingLevel {
	/// 4-level paging: 48-bit linear addresses.
	Level4 = 4,
	/// 5-level paging: 57-bit linear addresses.
	Level5 = 5,
}

impl PagingLevel {
	/// Returns the number of levels.
	#[inline(always)]
	#[must_use]
	pub const fn levels(self) -> u32 {
		self as u32
	}

	/// Returns the paging level a given `CR4` value selects.
	#[inline]
	#[must_use]
	pub const fn from_cr4(cr4: Cr4) -> Self {
		if cr4.la57() { Self::Level5 } else { Self::Level4 }
	}

	/// Returns the paging level currently in effect.
	#[cfg(target_arch = "x86_64")]
	#[inline]
	#[cold]
	#[must_use]
	pub fn current_from_cpu() -> Self {
		Self::from_cr4(Cr4::load())
	}

	/// Returns the width of a linear address, in bits.
	#[inline(always)]
	#[must_use]
	pub const fn linear_address_bits(self) -> u32 {
		PAGE_SHIFT + BITS_PER_LEVEL * self.levels()
	}

	/// Returns whether `address` is canonical: bits above the
	/// implemented width all equal its most significant bit.
	#[must_use]
	pub const fn is_canonical(self, address: u64) -> bool {
		let shift = 64 - self.linear_address_bits();
		(((address << shift) as i64) >> shift) as u64 == address
	}

	/// Returns the index into the table at `level` (1 = page table,
	/// 5 = PML5) that translates `address`.
	#[must_use]
	pub const fn table_index(address: u64, level: u32) -> usize {
		((address >> (PAGE_SHIFT + BITS_PER_LEVEL * (level - 1))) & 0x1FF) as usize
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn address_bits() {
		assert_eq!(PagingLevel::Level4.linear_address_bits(), 48);
		assert_eq!(PagingLevel::Level5.linear_address_bits(), 57);
		assert_eq!(PagingLevel::from_cr4(Cr4::new().with_la57(true)), PagingLevel::Level5);
		assert_eq!(PagingLevel::from_cr4(Cr4::new()), PagingLevel::Level4);
	}

	#[test]
	fn canonical() {
		let l4 = PagingLevel::Level4;
		assert!(l4.is_canonical(0x0000_7FFF_FFFF_FFFF));
		assert!(l4.is_canonical(0xFFFF_8000_0000_0000));
		assert!(!l4.is_canonical(0x0000_8000_0000_0000));
		assert!(PagingLevel::Level5.is_canonical(0x0000_8000_0000_0000));
	}

	#[test]
	fn indices() {
		let addr = 0xFFFF_8000_0020_1000_u64;
		assert_eq!(PagingLevel::table_index(addr, 4), 256);
		assert_eq!(PagingLevel::table_index(addr, 3), 0);
		assert_eq!(PagingLevel::table_index(addr, 2), 1);
		assert_eq!(PagingLevel::table_index(addr, 1), 1);
	}
}
