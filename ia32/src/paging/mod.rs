//! Paging-structure entries.
//!
//! [`long`] holds the 4-level and 5-level (IA-32e) formats, [`legacy`]
//! the 32-bit non-PAE formats. Address fields always hold a page frame
//! number: the physical address shifted right by the page-size exponent
//! of the entry's level. Use the `address()` helpers rather than
//! shifting by hand.
//!
//! At levels that can map a large page, the entry's `large_page` bit
//! chooses between two layouts; [`PdptEntry`], [`PdEntry`] and
//! [`legacy::PdEntry32`] decode a raw value into the right one.
#![expect(clippy::inline_always)]

pub mod legacy;
pub mod long;

mod level;
mod table;

pub use self::{
	level::PagingLevel,
	long::{PagingEntry, PdEntry, Pde, Pde2m, PdptEntry, Pdpte, Pdpte1g, Pml4e, Pml5e, Pte},
	table::PageTable,
};

/// Generates `address()`/`with_address()` for a record whose page frame
/// number field is `page_frame_number` and is shifted by `$shift`.
macro_rules! frame_address {
	($($ty:ty => $shift:expr),* $(,)?) => {
		$(
			impl $ty {
				/// Returns the physical address held in the entry.
				#[inline]
				#[must_use]
				pub const fn address(self) -> u64 {
					self.page_frame_number() << $shift
				}

				/// Returns a copy holding `address`, which must be aligned
				/// to the entry's page size; lower bits are discarded.
				#[inline]
				#[must_use]
				pub const fn with_address(self, address: u64) -> Self {
					self.with_page_frame_number(address >> $shift)
				}
			}
		)*
	};
}

pub(crate) use frame_address;
