//! Page-aligned paging structures.

use core::ops::{Index, IndexMut};

use crate::consts::ENTRIES_PER_TABLE;

/// A 4 KiB paging structure of 512 eight-byte entries.
///
/// `E` is any of the entry records in [`super::long`] (or a raw `u64`);
/// the same layout serves EPT tables.
#[derive(Debug, Clone)]
#[repr(C, align(4096))]
pub struct PageTable<E> {
	entries: [E; ENTRIES_PER_TABLE],
}

static_assertions::const_assert_eq!(::core::mem::size_of::<PageTable<u64>>(), 4096);
static_assertions::const_assert_eq!(::core::mem::align_of::<PageTable<u64>>(), 4096);

impl<E: Copy + Default> PageTable<E> {
	/// Creates a table with every entry zeroed (not present).
	#[must_use]
	pub fn new() -> Self {
		Self {
			entries: [E::default(); ENTRIES_PER_TABLE],
		}
	}

	/// Clears every entry.
	#[inline]
	pub fn reset(&mut self) {
		self.entries.fill(E::default());
	}
}

impl<E: Copy + Default> Default for PageTable<E> {
	fn default() -> Self {
		Self::new()
	}
}

impl<E> PageTable<E> {
	/// Iterates over the entries.
	pub fn iter(&self) -> impl Iterator<Item = &E> {
		self.entries.iter()
	}
}

impl<E> Index<usize> for PageTable<E> {
	type Output = E;

	#[inline]
	fn index(&self, index: usize) -> &Self::Output {
		debug_assert!(index < ENTRIES_PER_TABLE, "index out of bounds (max 511)");
		&self.entries[index]
	}
}

impl<E> IndexMut<usize> for PageTable<E> {
	#[inline]
	fn index_mut(&mut self, index: usize) -> &mut Self::Output {
		debug_assert!(index < ENTRIES_PER_TABLE, "index out of bounds (max 511)");
		&mut self.entries[index]
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::paging::Pte;

	#[test]
	fn index_and_reset() {
		let mut table: PageTable<Pte> = PageTable::new();
		table[3] = Pte::new().with_present(true).with_address(0x3000);
		assert!(table[3].present());
		assert_eq!(table.iter().filter(|e| e.present()).count(), 1);
		table.reset();
		assert!(!table[3].present());
		assert_eq!(core::mem::size_of::<PageTable<Pte>>(), 4096);
	}
}
