//! 4-level and 5-level paging structures.

use ia32_macro::bitstruct;

use super::frame_address;
use crate::consts::{PAGE_1G_SHIFT, PAGE_2M_SHIFT, PAGE_SHIFT};

bitstruct! {
	/// The fields every 4-level and 5-level entry shares.
	///
	/// `large_page`, `dirty`, `global` and `protection_key` are only
	/// meaningful on entries that map a page. `page_frame_number` is
	/// in 4 KiB units regardless of the level; large-page frame numbers
	/// have their low bits occupied by `PAT` and reserved bits.
	pub struct PagingEntry(u64) {
		/// The entry is present.
		pub present[0] => as bool,
		/// Writes are allowed.
		pub write[1] => as bool,
		/// User-mode accesses are allowed.
		pub user[2] => as bool,
		/// Page-level write-through.
		pub pwt[3] => as bool,
		/// Page-level cache disable.
		pub pcd[4] => as bool,
		/// The entry has been used for translation.
		pub accessed[5] => as bool,
		/// The page has been written to.
		pub dirty[6] => as bool,
		/// The entry maps a page rather than referencing a table.
		pub large_page[7] => as bool,
		/// The translation is global.
		pub global[8] => as bool,
		/// Ignored by the processor; available to software.
		pub available[11:9] => as u8,
		/// Page frame number.
		pub page_frame_number[51:12] => as u64,
		/// Ignored by the processor; available to software.
		pub available_high[58:52] => as u8,
		/// Protection key (`CR4.PKE` or `CR4.PKS`).
		pub protection_key[62:59] => as u8,
		/// Execute-disable (`IA32_EFER.NXE`).
		pub execute_disable[63] => as bool,
	}
}

frame_address!(PagingEntry => PAGE_SHIFT);

bitstruct! {
	/// PML5 entry: references a PML4 table.
	pub struct Pml5e(u64) {
		/// The entry is present.
		pub present[0] => as bool,
		/// Writes are allowed within the 256 TiB region.
		pub write[1] => as bool,
		/// User-mode accesses are allowed.
		pub user[2] => as bool,
		/// Page-level write-through.
		pub pwt[3] => as bool,
		/// Page-level cache disable.
		pub pcd[4] => as bool,
		/// The entry has been used for translation.
		pub accessed[5] => as bool,
		/// Reserved; must be zero (there is no large page at this level).
		pub must_be_zero[7] => as bool,
		/// Restart HLAT paging (ignored otherwise).
		pub restart[11] => as bool,
		/// Page frame number of the PML4 table.
		pub page_frame_number[51:12] => as u64,
		/// Execute-disable.
		pub execute_disable[63] => as bool,
	}
}

bitstruct! {
	/// PML4 entry: references a page-directory-pointer table.
	pub struct Pml4e(u64) {
		/// The entry is present.
		pub present[0] => as bool,
		/// Writes are allowed within the 512 GiB region.
		pub write[1] => as bool,
		/// User-mode accesses are allowed.
		pub user[2] => as bool,
		/// Page-level write-through.
		pub pwt[3] => as bool,
		/// Page-level cache disable.
		pub pcd[4] => as bool,
		/// The entry has been used for translation.
		pub accessed[5] => as bool,
		/// Reserved; must be zero (there is no large page at this level).
		pub must_be_zero[7] => as bool,
		/// Restart HLAT paging (ignored otherwise).
		pub restart[11] => as bool,
		/// Page frame number of the page-directory-pointer table.
		pub page_frame_number[51:12] => as u64,
		/// Execute-disable.
		pub execute_disable[63] => as bool,
	}
}

bitstruct! {
	/// Page-directory-pointer-table entry referencing a page directory.
	pub struct Pdpte(u64) {
		/// The entry is present.
		pub present[0] => as bool,
		/// Writes are allowed within the 1 GiB region.
		pub write[1] => as bool,
		/// User-mode accesses are allowed.
		pub user[2] => as bool,
		/// Page-level write-through.
		pub pwt[3] => as bool,
		/// Page-level cache disable.
		pub pcd[4] => as bool,
		/// The entry has been used for translation.
		pub accessed[5] => as bool,
		/// Must be 0 for this layout.
		pub large_page[7] => as bool,
		/// Restart HLAT paging.
		pub restart[11] => as bool,
		/// Page frame number of the page directory.
		pub page_frame_number[51:12] => as u64,
		/// Execute-disable.
		pub execute_disable[63] => as bool,
	}
}

bitstruct! {
	/// Page-directory-pointer-table entry mapping a 1 GiB page.
	pub struct Pdpte1g(u64) {
		/// The entry is present.
		pub present[0] => as bool,
		/// Writes are allowed.
		pub write[1] => as bool,
		/// User-mode accesses are allowed.
		pub user[2] => as bool,
		/// Page-level write-through.
		pub pwt[3] => as bool,
		/// Page-level cache disable.
		pub pcd[4] => as bool,
		/// The page has been accessed.
		pub accessed[5] => as bool,
		/// The page has been written to.
		pub dirty[6] => as bool,
		/// Must be 1 for this layout.
		pub large_page[7] => as bool,
		/// The translation is global (`CR4.PGE`).
		pub global[8] => as bool,
		/// Restart HLAT paging.
		pub restart[11] => as bool,
		/// PAT index high bit.
		pub pat[12] => as bool,
		/// Page frame number of the 1 GiB page.
		pub page_frame_number[51:30] => as u64,
		/// Protection key.
		pub protection_key[62:59] => as u8,
		/// Execute-disable.
		pub execute_disable[63] => as bool,
	}
}

bitstruct! {
	/// Page-directory entry referencing a page table.
	pub struct Pde(u64) {
		/// The entry is present.
		pub present[0] => as bool,
		/// Writes are allowed within the 2 MiB region.
		pub write[1] => as bool,
		/// User-mode accesses are allowed.
		pub user[2] => as bool,
		/// Page-level write-through.
		pub pwt[3] => as bool,
		/// Page-level cache disable.
		pub pcd[4] => as bool,
		/// The entry has been used for translation.
		pub accessed[5] => as bool,
		/// Must be 0 for this layout.
		pub large_page[7] => as bool,
		/// Restart HLAT paging.
		pub restart[11] => as bool,
		/// Page frame number of the page table.
		pub page_frame_number[51:12] => as u64,
		/// Execute-disable.
		pub execute_disable[63] => as bool,
	}
}

bitstruct! {
	/// Page-directory entry mapping a 2 MiB page.
	pub struct Pde2m(u64) {
		/// The entry is present.
		pub present[0] => as bool,
		/// Writes are allowed.
		pub write[1] => as bool,
		/// User-mode accesses are allowed.
		pub user[2] => as bool,
		/// Page-level write-through.
		pub pwt[3] => as bool,
		/// Page-level cache disable.
		pub pcd[4] => as bool,
		/// The page has been accessed.
		pub accessed[5] => as bool,
		/// The page has been written to.
		pub dirty[6] => as bool,
		/// Must be 1 for this layout.
		pub large_page[7] => as bool,
		/// The translation is global.
		pub global[8] => as bool,
		/// Restart HLAT paging.
		pub restart[11] => as bool,
		/// PAT index high bit.
		pub pat[12] => as bool,
		/// Page frame number of the 2 MiB page.
		pub page_frame_number[51:21] => as u64,
		/// Protection key.
		pub protection_key[62:59] => as u8,
		/// Execute-disable.
		pub execute_disable[63] => as bool,
	}
}

bitstruct! {
	/// Page-table entry mapping a 4 KiB page.
	pub struct Pte(u64) {
		/// The entry is present.
		pub present[0] => as bool,
		/// Writes are allowed.
		pub write[1] => as bool,
		/// User-mode accesses are allowed.
		pub user[2] => as bool,
		/// Page-level write-through.
		pub pwt[3] => as bool,
		/// Page-level cache disable.
		pub pcd[4] => as bool,
		/// The page has been accessed.
		pub accessed[5] => as bool,
		/// The page has been written to.
		pub dirty[6] => as bool,
		/// PAT index high bit.
		pub pat[7] => as bool,
		/// The translation is global.
		pub global[8] => as bool,
		/// Restart HLAT paging.
		pub restart[11] => as bool,
		/// Page frame number of the 4 KiB page.
		pub page_frame_number[51:12] => as u64,
		/// Protection key.
		pub protection_key[62:59] => as u8,
		/// Execute-disable.
		pub execute_disable[63] => as bool,
	}
}

frame_address! {
	Pml5e => PAGE_SHIFT,
	Pml4e => PAGE_SHIFT,
	Pdpte => PAGE_SHIFT,
	Pdpte1g => PAGE_1G_SHIFT,
	Pde => PAGE_SHIFT,
	Pde2m => PAGE_2M_SHIFT,
	Pte => PAGE_SHIFT,
}

impl Pdpte1g {
	/// Returns the `(PAT, PCD, PWT)` index into `IA32_PAT`.
	#[must_use]
	pub const fn pat_index(self) -> u8 {
		crate::memtype::pat_index(self.pat(), self.pcd(), self.pwt())
	}
}

impl Pde2m {
	/// Returns the `(PAT, PCD, PWT)` index into `IA32_PAT`.
	#[must_use]
	pub const fn pat_index(self) -> u8 {
		crate::memtype::pat_index(self.pat(), self.pcd(), self.pwt())
	}
}

impl Pte {
	/// Returns the `(PAT, PCD, PWT)` index into `IA32_PAT`.
	#[must_use]
	pub const fn pat_index(self) -> u8 {
		crate::memtype::pat_index(self.pat(), self.pcd(), self.pwt())
	}
}

/// A decoded page-directory-pointer-table entry.
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
		if PagingEntry::from_bits(raw).large_page() {
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

/// A decoded page-directory entry.
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
		if PagingEntry::from_bits(raw).large_page() {
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

	#[test]
	fn pml4e_decode() {
		let e = Pml4e::new()
			.with_present(true)
			.with_write(true)
			.with_user(false)
			.with_page_frame_number(0x12345);
		assert_eq!(e.bits(), 0x0000_0000_1234_5003);
		assert_eq!(e.reserved_bits(), 0);
		assert!(!e.must_be_zero());
		assert_eq!(e.address(), 0x1234_5000);
		assert!(Pml4e::from_bits(e.bits() | 0x80).must_be_zero());
	}

	#[test]
	fn large_page_dispatch() {
		let huge = Pdpte1g::new()
			.with_present(true)
			.with_large_page(true)
			.with_address(0x4000_0000);
		assert_eq!(huge.page_frame_number(), 1);
		assert!(matches!(PdptEntry::from_bits(huge.bits()), PdptEntry::Page1g(e) if e.address() == 0x4000_0000));

		let table = Pdpte::new().with_present(true).with_address(0x5000);
		assert!(matches!(PdptEntry::from_bits(table.bits()), PdptEntry::Table(e) if e.address() == 0x5000));

		let big = Pde2m::new().with_present(true).with_large_page(true).with_address(0x60_0000);
		let decoded = PdEntry::from_bits(big.bits());
		assert_eq!(decoded, PdEntry::Page2m(big));
		assert_eq!(decoded.bits(), big.bits());
	}

	#[test]
	fn address_masks_low_bits() {
		let pte = Pte::new().with_address(0xDEAD_BEEF);
		assert_eq!(pte.address(), 0xDEAD_B000);
		let pde = Pde2m::new().with_address(0x1234_5678);
		assert_eq!(pde.address(), 0x1220_0000);
		assert!(!pde.pat());
	}

	#[test]
	fn pat_index() {
		let pte = Pte::new().with_pat(true).with_pwt(true);
		assert_eq!(pte.pat_index(), 0b101);
		let pde = Pde2m::new().with_pat(true).with_pcd(true);
		assert_eq!(pde.pat_index(), 0b110);
	}

	#[test]
	fn common_view() {
		let pte = Pte::new()
			.with_present(true)
			.with_dirty(true)
			.with_global(true)
			.with_execute_disable(true)
			.with_page_frame_number(0xABC);
		let view = PagingEntry::from_bits(pte.bits());
		assert!(view.present());
		assert!(view.dirty());
		assert!(view.global());
		assert!(view.execute_disable());
		assert_eq!(view.address(), 0x00AB_C000);
		assert_eq!(PagingEntry::DEFINED_MASK, u64::MAX);
	}
}
