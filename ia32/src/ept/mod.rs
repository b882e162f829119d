//! Extended page tables.
//!
//! EPT structures translate guest-physical addresses with the same
//! 512-entry, 9-bits-per-level shape as IA-32e paging; any
//! [`PageTable`] can hold them. An entry is present when any of its
//! read, write or execute bits is set; there is no separate present bit.
//!
//! After changing entries that may be cached, invalidate with
//! [`invept`] using an [`InveptDescriptor`].
#![expect(clippy::inline_always)]

mod entry;
mod invalidate;
mod pointer;

#[cfg(target_arch = "x86_64")]
mod instr;

#[cfg(target_arch = "x86_64")]
pub use self::instr::{invept, invvpid};
pub use self::{
	entry::{EptEntry, PdEntry, Pde, Pde2m, PdptEntry, Pdpte, Pdpte1g, Pml4e, Pml5e, Pte},
	invalidate::{InveptDescriptor, InveptType, InvvpidDescriptor, InvvpidType},
	pointer::Eptp,
};
use crate::paging::PageTable;

/// A 4 KiB EPT paging structure.
pub type EptTable<E> = PageTable<E>;
