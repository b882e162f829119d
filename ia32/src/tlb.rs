//! TLB invalidation.

#![expect(clippy::inline_always)]

use core::arch::asm;

use ia32_test::effect;

use crate::{consts::PAGE_SIZE, unroll::for_each_stride};

/// Invalidates the TLB entries for the page containing `address`
/// (`INVLPG`), for the current PCID, including global entries.
///
/// # Safety
/// Must be executed in ring 0.
#[inline(always)]
#[effect(invalidate_tlb)]
pub unsafe fn invlpg(address: usize) {
	// SAFETY: Offloaded to the caller.
	unsafe { invlpg_unannotated(address) };
}

/// Invalidates `count` pages at `start + i * stride`, for every `i` in
/// `0..count`.
///
/// Equivalent to `count` calls to [`invlpg`]. `stride` is normally the
/// page size of the mapping (4 KiB, 2 MiB or 1 GiB); `start` is not
/// aligned.
///
/// # Safety
/// Must be executed in ring 0.
#[effect(invalidate_tlb)]
pub unsafe fn invlpg_range(start: usize, count: usize, stride: usize) {
	for_each_stride(start, count, stride, |page| {
		// SAFETY: Offloaded to the caller.
		unsafe { invlpg_unannotated(page) };
	});
}

/// `INVLPG` without an effect record.
///
/// # Safety
/// See [`invlpg`].
#[inline(always)]
unsafe fn invlpg_unannotated(address: usize) {
	// SAFETY: Offloaded to the caller; `INVLPG` does not access memory.
	unsafe {
		asm!("invlpg [{}]", in(reg) address, options(nostack, preserves_flags));
	}
}

/// The `INVPCID` invalidation type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u64)]
pub enum InvpcidType {
	/// One linear address, tagged with one PCID (global entries excluded).
	IndividualAddress  = 0,
	/// All addresses tagged with one PCID (global entries excluded).
	SingleContext      = 1,
	/// All addresses and PCIDs, including global entries.
	AllIncludingGlobal = 2,
	/// All addresses and PCIDs, excluding global entries.
	AllNonGlobal       = 3,
}

/// The 128-bit memory operand of `INVPCID`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(C, align(16))]
pub struct InvpcidDescriptor {
	/// The PCID in bits 11:0; the rest must be zero.
	pcid:           u64,
	/// The linear address, for individual-address invalidations.
	linear_address: u64,
}

static_assertions::const_assert_eq!(core::mem::size_of::<InvpcidDescriptor>(), 16);

impl InvpcidDescriptor {
	/// Creates a descriptor; `pcid` is truncated to 12 bits.
	#[must_use]
	pub const fn new(pcid: u16, linear_address: u64) -> Self {
		Self {
			pcid: (pcid & 0xFFF) as u64,
			linear_address,
		}
	}

	/// Returns the PCID.
	#[must_use]
	pub const fn pcid(&self) -> u16 {
		self.pcid as u16
	}

	/// Returns the linear address.
	#[must_use]
	pub const fn linear_address(&self) -> u64 {
		self.linear_address
	}
}

/// Invalidates PCID-tagged TLB entries (`INVPCID`).
///
/// # Safety
/// Must be executed in ring 0 with `CPUID.(EAX=07H,ECX=0):EBX.INVPCID`.
/// For [`InvpcidType::IndividualAddress`] the address must be canonical;
/// for the first two types the PCID must be 0 unless `CR4.PCIDE` is set.
#[inline(always)]
#[effect(invalidate_tlb)]
pub unsafe fn invpcid(kind: InvpcidType, descriptor: &InvpcidDescriptor) {
	// SAFETY: Offloaded to the caller.
	unsafe { invpcid_unannotated(kind, descriptor) };
}

/// Invalidates `count` 4 KiB pages starting at `start` for `pcid`.
///
/// # Safety
/// See [`invpcid`].
#[effect(invalidate_tlb)]
pub unsafe fn invpcid_range(pcid: u16, start: u64, count: usize) {
	for_each_stride(start as usize, count, PAGE_SIZE, |page| {
		let descriptor = InvpcidDescriptor::new(pcid, page as u64);
		// SAFETY: Offloaded to the caller.
		unsafe { invpcid_unannotated(InvpcidType::IndividualAddress, &descriptor) };
	});
}

/// `INVPCID` without an effect record.
///
/// # Safety
/// See [`invpcid`].
#[inline(always)]
unsafe fn invpcid_unannotated(kind: InvpcidType, descriptor: &InvpcidDescriptor) {
	// SAFETY: Offloaded to the caller.
	unsafe {
		asm!(
			"invpcid {kind}, [{desc}]",
			kind = in(reg) kind as u64,
			desc = in(reg) descriptor,
			options(nostack, readonly, preserves_flags),
		);
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn descriptor() {
		let desc = InvpcidDescriptor::new(0x1FFF, 0xFFFF_8000_0000_1000);
		assert_eq!(desc.pcid(), 0xFFF);
		assert_eq!(desc.linear_address(), 0xFFFF_8000_0000_1000);
		assert_eq!(align_of::<InvpcidDescriptor>(), 16);
		assert_eq!(InvpcidType::AllNonGlobal as u64, 3);
	}

	/// Collects the addresses `invlpg_range` invalidates.
	fn issued(start: usize, count: usize, stride: usize) -> std::vec::Vec<usize> {
		let mut pages = std::vec::Vec::new();
		for_each_stride(start, count, stride, |page| pages.push(page));
		pages
	}

	#[test]
	fn range_issues_exactly_count_pages() {
		assert!(issued(0x7000, 0, PAGE_SIZE).is_empty());
		assert_eq!(issued(0x7000, 1, PAGE_SIZE), [0x7000]);
		// Unaligned starts are not rounded down.
		assert_eq!(issued(0x7123, 3, PAGE_SIZE), [0x7123, 0x8123, 0x9123]);
		assert_eq!(
			issued(0x4000_0000, 2, 0x20_0000),
			[0x4000_0000, 0x4020_0000]
		);

		let pages = issued(0, 19, PAGE_SIZE);
		assert_eq!(pages.len(), 19);
		assert!(pages.iter().enumerate().all(|(i, &page)| page == i * PAGE_SIZE));
	}
}
