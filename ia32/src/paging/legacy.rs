//! 32-bit (non-PAE) paging structures.
//!
//! Tables hold 1024 four-byte entries. With `CR4.PSE = 1` a directory
//! entry may map a 4 MiB page; PSE-36 extends its frame with address
//! bits `[39:32]` carried in entry bits `[20:13]`.

use ia32_macro::bitstruct;

use crate::consts::{PAGE_4M_SHIFT, PAGE_SHIFT};

bitstruct! {
	/// 32-bit page-directory entry referencing a page table.
	pub struct Pde32(u32) {
		/// The entry is present.
		pub present[0] => as bool,
		/// Writes are allowed within the 4 MiB region.
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
		/// Ignored by the processor; available to software.
		pub available[11:8] => as u8,
		/// Page frame number of the page table.
		pub page_frame_number[31:12] => as u32,
	}
}

bitstruct! {
	/// 32-bit page-directory entry mapping a 4 MiB page.
	pub struct Pde4m32(u32) {
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
		/// Ignored by the processor; available to software.
		pub available[11:9] => as u8,
		/// PAT index high bit.
		pub pat[12] => as bool,
		/// Physical address bits `[39:32]` (PSE-36).
		pub page_frame_number_high[20:13] => as u8,
		/// Physical address bits `[31:22]`.
		pub page_frame_number[31:22] => as u16,
	}
}

bitstruct! {
	/// 32-bit page-table entry mapping a 4 KiB page.
	pub struct Pte32(u32) {
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
		/// Ignored by the processor; available to software.
		pub available[11:9] => as u8,
		/// Page frame number of the 4 KiB page.
		pub page_frame_number[31:12] => as u32,
	}
}

impl Pde32 {
	/// Returns the physical address of the page table.
	#[must_use]
	pub const fn address(self) -> u32 {
		self.page_frame_number() << PAGE_SHIFT
	}

	/// Returns a copy referencing the page table at `address`.
	#[must_use]
	pub const fn with_address(self, address: u32) -> Self {
		self.with_page_frame_number(address >> PAGE_SHIFT)
	}
}

impl Pte32 {
	/// Returns the physical address of the page.
	#[must_use]
	pub const fn address(self) -> u32 {
		self.page_frame_number() << PAGE_SHIFT
	}

	/// Returns a copy mapping the page at `address`.
	#[must_use]
	pub const fn with_address(self, address: u32) -> Self {
		self.with_page_frame_number(address >> PAGE_SHIFT)
	}
}

impl Pde4m32 {
	/// Returns the (up to 40-bit) physical address of the page.
	#[must_use]
	pub const fn address(self) -> u64 {
		((self.page_frame_number_high() as u64) << 32)
			| ((self.page_frame_number() as u64) << PAGE_4M_SHIFT)
	}

	/// Returns a copy mapping the 4 MiB page at `address`.
	#[must_use]
	pub const fn with_address(self, address: u64) -> Self {
		self.with_page_frame_number((address >> PAGE_4M_SHIFT) as u16)
			.with_page_frame_number_high((address >> 32) as u8)
	}
}

/// A decoded 32-bit page-directory entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PdEntry32 {
	/// References a page table.
	Table(Pde32),
	/// Maps a 4 MiB page.
	Page4m(Pde4m32),
}

impl PdEntry32 {
	/// Decodes a raw entry according to its `large_page` bit.
	///
	/// Only meaningful with `CR4.PSE = 1`; otherwise bit 7 is ignored
	/// and every entry references a table.
	#[must_use]
	pub const fn from_bits(raw: u32) -> Self {
		if Pde32::from_bits(raw).large_page() {
			Self::Page4m(Pde4m32::from_bits(raw))
		} else {
			Self::Table(Pde32::from_bits(raw))
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn pse36_address() {
		let pde = Pde4m32::new()
			.with_present(true)
			.with_large_page(true)
			.with_address(0x12_3440_0000);
		assert_eq!(pde.page_frame_number_high(), 0x12);
		assert_eq!(pde.page_frame_number(), 0xD1);
		assert_eq!(pde.address(), 0x12_3440_0000);
		assert_eq!(pde.bits(), 0x3442_4081);
		assert!(matches!(PdEntry32::from_bits(pde.bits()), PdEntry32::Page4m(_)));
	}

	#[test]
	fn table_entries() {
		let pde = Pde32::new().with_present(true).with_write(true).with_address(0x0010_3000);
		assert_eq!(pde.bits(), 0x0010_3003);
		assert_eq!(PdEntry32::from_bits(pde.bits()), PdEntry32::Table(pde));

		let pte = Pte32::new().with_present(true).with_pat(true).with_address(0xFFFF_F000);
		assert_eq!(pte.bits(), 0xFFFF_F081);
		assert_eq!(pte.address(), 0xFFFF_F000);
		assert_eq!(Pte32::DEFINED_MASK, u32::MAX);
	}
}
