//! EPT paging-structure entries.

use ia32_macro::bitstruct;

use crate::{
	consts::{PAGE_1G_SHIFT, PAGE_2M_SHIFT, PAGE_SHIFT},
	memtype::MemoryType,
	paging::frame_address,
};

bitstruct! {
	/// The fields every EPT entry shares.
	///
	/// `memory_type`, `ignore_pat`, `dirty` and `suppress_ve` are only
	/// meaningful on entries that map a page. `accessed` and `dirty` are
	/// only maintained when [`Eptp::enable_ad()`](super::Eptp::enable_ad)
	/// is set; `user_execute` only with mode-based execute control.
	pub struct EptEntry(u64) {
		/// Reads are allowed.
		pub read[0] => as bool,
		/// Writes are allowed.
		pub write[1] => as bool,
		/// Instruction fetches are allowed (supervisor-mode linear
		/// addresses under mode-based execute control).
		pub execute[2] => as bool,
		/// Memory type of the mapped page.
		pub memory_type[5:3] => as u8,
		/// Ignore the guest PAT memory type.
		pub ignore_pat[6] => as bool,
		/// The entry maps a page rather than referencing a table.
		pub large_page[7] => as bool,
		/// The entry has been used for translation.
		pub accessed[8] => as bool,
		/// The page has been written to.
		pub dirty[9] => as bool,
		/// Instruction fetches from user-mode linear addresses are allowed.
		pub user_execute[10] => as bool,
		/// Ignored by the processor; available to software.
		pub available[11] => as bool,
		/// Page frame number, in 4 KiB units.
		pub page_frame_number[51:12] => as u64,
		/// Verify guest paging (HLAT).
		pub verify_guest_paging[57] => as bool,
		/// Paging-write access (HLAT).
		pub paging_write_access[58] => as bool,
		/// The page is a supervisor shadow-stack page.
		pub supervisor_shadow_stack[60] => as bool,
		/// Writes are governed by sub-page permissions.
		pub sub_page_write[61] => as bool,
		/// EPT violations are not converted to `#VE`.
		pub suppress_ve[63] => as bool,
	}
}

bitstruct! {
	/// EPT PML5 entry: references an EPT PML4 table.
	pub struct Pml5e(u64) {
		/// Reads are allowed within the 256 TiB region.
		pub read[0] => as bool,
		/// Writes are allowed within the 256 TiB region.
		pub write[1] => as bool,
		/// Instruction fetches are allowed within the 256 TiB region.
		pub execute[2] => as bool,
		/// The entry has been used for translation.
		pub accessed[8] => as bool,
		/// User-mode instruction fetches are allowed.
		pub user_execute[10] => as bool,
		/// Page frame number of the EPT PML4 table.
		pub page_frame_number[51:12] => as u64,
	}
}

bitstruct! {
	/// EPT PML4 entry: references an EPT page-directory-pointer table.
	pub struct Pml4e(u64) {
		/// Reads are allowed within the 512 GiB region.
		pub read[0] => as bool,
		/// Writes are allowed within the 512 GiB region.
		pub write[1] => as bool,
		/// Instruction fetches are allowed within the 512 GiB region.
		pub execute[2] => as bool,
		/// The entry has been used for translation.
		pub accessed[8] => as bool,
		/// User-mode instruction fetches are allowed.
		pub user_execute[10] => as bool,
		/// Page frame number of the page-directory-pointer table.
		pub page_frame_number[51:12] => as u64,
	}
}

bitstruct! {
	/// EPT page-directory-pointer-table entry referencing a page directory.
	pub struct Pdpte(u64) {
		/// Reads are allowed within the 1 GiB region.
		pub read[0] => as bool,
		/// Writes are allowed within the 1 GiB region.
		pub write[1] => as bool,
		/// Instruction fetches are allowed within the 1 GiB region.
		pub execute[2] => as bool,
		/// Must be 0 for this layout.
		pub large_page[7] => as bool,
		/// The entry has been used for translation.
		pub accessed[8] => as bool,
		/// User-mode instruction fetches are allowed.
		pub user_execute[10] => as bool,
		/// Page frame number of the page directory.
		pub page_frame_number[51:12] => as u64,
	}
}

bitstruct! {
	/// EPT page-directory-pointer-table entry mapping a 1 GiB page.
	pub struct Pdpte1g(u64) {
		/// Reads are allowed.
		pub read[0] => as bool,
		/// Writes are allowed.
		pub write[1] => as bool,
		/// Instruction fetches are allowed.
		pub execute[2] => as bool,
		/// Memory type of the page.
		pub memory_type[5:3] => as u8,
		/// Ignore the guest PAT memory type.
		pub ignore_pat[6] => as bool,
		/// Must be 1 for this layout.
		pub large_page[7] => as bool,
		/// The page has been accessed.
		pub accessed[8] => as bool,
		/// The page has been written to.
		pub dirty[9] => as bool,
		/// User-mode instruction fetches are allowed.
		pub user_execute[10] => as bool,
		/// Page frame number of the 1 GiB page.
		pub page_frame_number[51:30] => as u64,
		/// Verify guest paging.
		pub verify_guest_paging[57] => as bool,
		/// Paging-write access.
		pub paging_write_access[58] => as bool,
		/// The page is a supervisor shadow-stack page.
		pub supervisor_shadow_stack[60] => as bool,
		/// EPT violations are not converted to `#VE`.
		pub suppress_ve[63] => as bool,
	}
}

bitstruct! {
	/// EPT page-directory entry referencing a page table.
	pub struct Pde(u64) {
		/// Reads are allowed within the 2 MiB region.
		pub read[0] => as bool,
		/// Writes are allowed within the 2 MiB region.
		pub write[1] => as bool,
		/// Instruction fetches are allowed within the 2 MiB region.
		pub execute[2] => as bool,
		/// Must be 0 for this layout.
		pub large_page[7] => as bool,
		/// The entry has been used for translation.
		pub accessed[8] => as bool,
		/// User-mode instruction fetches are allowed.
		pub user_execute[10] => as bool,
		/// Page frame number of the page table.
		pub page_frame_number[51:12] => as u64,
	}
}

bitstruct! {
	/// EPT page-directory entry mapping a 2 MiB page.
	pub struct Pde2m(u64) {
		/// Reads are allowed.
		pub read[0] => as bool,
		/// Writes are allowed.
		pub write[1] => as bool,
		/// Instruction fetches are allowed.
		pub execute[2] => as bool,
		/// Memory type of the page.
		pub memory_type[5:3] => as u8,
		/// Ignore the guest PAT memory type.
		pub ignore_pat[6] => as bool,
		/// Must be 1 for this layout.
		pub large_page[7] => as bool,
		/// The page has been accessed.
		pub accessed[8] => as bool,
		/// The page has been written to.
		pub dirty[9] => as bool,
		/// User-mode instruction fetches are allowed.
		pub user_execute[10] => as bool,
		/// Page frame number of the 2 MiB page.
		pub page_frame_number[51:21] => as u64,
		/// Verify guest paging.
		pub verify_guest_paging[57] => as bool,
		/// Paging-write access.
		pub paging_write_access[58] => as bool,
		/// The page is a supervisor shadow-stack page.
		pub supervisor_shadow_stack[60] => as bool,
		/// EPT violations are not converted to `#VE`.
		pub suppress_ve[63] => as bool,
	}
}

bitstruct! {
	/// EPT page-table entry mapping a 4 KiB page.
	pub struct Pte(u64) {
		/// Reads are allowed.
		pub read[0] => as bool,
		/// Writes are allowed.
		pub write[1] => as bool,
		/// Instruction fetches are allowed.
		pub execute[2] => as bool,
		/// Memory type of the page.
		pub memory_type[5:3] => as u8,
		/// Ignore the guest PAT memory type.
		pub ignore_pat[6] => as bool,
		/// The page has been accessed.
		pub accessed[8] => as bool,
		/// The page has been written to.
		pub dirty[9] => as bool,
		/// User-mode instruction fetches are allowed.
		pub user_execute[10] => as bool,
		/// Page frame number of the 4 KiB page.
		pub page_frame_number[51:12] => as u64,
		/// Verify guest paging.
		pub verify_guest_paging[57] => as bool,
		/// Paging-write access.
		pub paging_write_access[58] => as bool,
		/// The page is a supervisor shadow-stack page.
		pub supervisor_shadow_stack[60] => as bool,
		/// Writes are governed by sub-page permissions.
		pub sub_page_write[61] => as bool,
		/// EPT violations are not converted to `#VE`.
		pub suppress_ve[63] => as bool,
	}
}

frame_address! {
	EptEntry => PAGE_SHIFT,
	Pml5e => PAGE_SHIFT,
	Pml4e => PAGE_SHIFT,
	Pdpte => PAGE_SHIFT,
	Pdpte1g => PAGE_1G_SHIFT,
	Pde => PAGE_SHIFT,
	Pde2m => PAGE_2M_SHIFT,
	Pte => PAGE_SHIFT,
}

/// Generates the access-right helpers shared by every EPT entry.
macro_rules! access_rights {
	($($ty:ty),* $(,)?) => {
		$(
			impl $ty {
				/// Returns whether the entry is present: any of read,
				/// write or execute access is allowed.
				#[inline(always)]
				#[must_use]
				pub const fn is_present(self) -> bool {
					self.bits() & 0b111 != 0
				}

				/// Returns a copy with the given read, write and execute rights.
				#[inline]
				#[must_use]
				pub const fn with_access(self, read: bool, write: bool, execute: bool) -> Self {
					self.with_read(read).with_write(write).with_execute(execute)
				}
			}
		)*
	};
}

access_rights!(EptEntry, Pml5e, Pml4e, Pdpte, Pdpte1g, Pde, Pde2m, Pte);

/// Generates `memory_type_kind()` for the entries that map a page.
macro_rules! leaf_memory_type {
	($($ty:ty),* $(,)?) => {
		$(
			impl $ty {
				/// Returns the memory type, if it is a recognized one.
				#[must_use]
				pub const fn memory_type_kind(self) -> Option<MemoryType> {
					MemoryType::from_raw(self.memory_type())
				}
			}
		)*
	};
}

leaf_memory_type!(EptEntry, Pdpte1g, Pde2m, Pte);

/// A decoded EPT page-directory-pointer-table entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PdptEntry {
	/// References a page directory.
	Table(Pdpte),
	/// Maps a 1 GiB page.
	Page1g(Pdpte1g),
}

impl PdptEntry {
	/// Decodes a raw entry according to its `large_page` bit.
	#[inline(always)]
	#[must_use]
	pub const fn from_bits(raw: u64) -> Self {
		if EptEntry::from_bits(raw).large_page() {
			Self::Page1g(Pdpte1g::from_bits(raw))
		} else {
			Self::Table(Pdpte::from_bits(raw))
		}
	}

	/// Returns the raw entry.
	#[inline(always)]
	#[must_use]
	pub const fn bits(self) -> u64 {
		match self {
			Self::Table(e) => e.bits(),
			Self::Page1g(e) => e.bits(),
		}
	}
}

/// A decoded EPT page-directory entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PdEntry {
	/// References a page table.
	Table(Pde),
	/// Maps a 2 MiB page.
	Page2m(Pde2m),
}

impl PdEntry {
	/// Decodes a raw entry according to its `large_page` bit.
	#[inline(always)]
	#[must_use]
	pub const fn from_bits(raw: u64) -> Self {
		if EptEntry::from_bits(raw).large_page() {
			Self::Page2m(Pde2m::from_bits(raw))
		} else {
			Self::Table(Pde::from_bits(raw))
		}
	}

	/// Returns the raw entry.
	#[inline(always)]
	#[must_use]
	pub const fn bits(self) -> u64 {
		match self {
			Self::Table(e) => e.bits(),
			Self::Page2m(e) => e.bits(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::ept::EptTable;

	#[test]
	fn rwx_zero_is_not_present() {
		let pte = Pte::new()
			.with_memory_type(MemoryType::WriteBack.raw())
			.with_address(0x1000);
		assert!(!pte.is_present());
		assert!(pte.with_execute(true).is_present());
		assert!(Pml4e::new().with_access(true, false, false).is_present());
		assert!(!EptEntry::from_bits(!0b111).is_present());
	}

	#[test]
	fn leaf_layout() {
		let pte = Pte::new()
			.with_access(true, true, true)
			.with_memory_type(6)
			.with_ignore_pat(true)
			.with_suppress_ve(true)
			.with_address(0xABCD_E000);
		assert_eq!(pte.bits(), 0x8000_0000_ABCD_E077);
		assert_eq!(pte.memory_type_kind(), Some(MemoryType::WriteBack));
		assert_eq!(pte.reserved_bits(), 0);

		let view = EptEntry::from_bits(pte.bits());
		assert!(view.suppress_ve());
		assert!(view.ignore_pat());
		assert_eq!(view.address(), 0xABCD_E000);
	}

	#[test]
	fn large_page_dispatch() {
		let huge = Pdpte1g::new()
			.with_access(true, true, true)
			.with_large_page(true)
			.with_address(0x8000_0000);
		assert_eq!(huge.page_frame_number(), 2);
		assert!(matches!(PdptEntry::from_bits(huge.bits()), PdptEntry::Page1g(e) if e.address() == 0x8000_0000));

		let table = Pde::new().with_read(true).with_address(0x7000);
		assert_eq!(PdEntry::from_bits(table.bits()), PdEntry::Table(table));

		let big = Pde2m::new().with_read(true).with_large_page(true).with_address(0x40_0000);
		let decoded = PdEntry::from_bits(big.bits());
		assert_eq!(decoded, PdEntry::Page2m(big));
		assert_eq!(decoded.bits(), big.bits());
	}

	#[test]
	fn table_bit_7_is_reserved() {
		assert_eq!(Pml4e::RESERVED_MASK & 0xF8, 0xF8);
		assert_eq!(Pte::RESERVED_MASK & 0x80, 0x80);
		assert_eq!(Pde2m::RESERVED_MASK & 0x001F_F000, 0x001F_F000);
	}

	#[test]
	fn tables() {
		let mut pml4: EptTable<Pml4e> = EptTable::new();
		pml4[0] = Pml4e::new().with_access(true, true, true).with_address(0x2000);
		assert_eq!(pml4.iter().filter(|e| e.is_present()).count(), 1);
		assert_eq!(core::mem::size_of::<EptTable<Pte>>(), 4096);
	}
}
