//! Control, debug and flags registers.
//!
//! Every record is usable on any host; the `load()`/`store()` methods
//! that move them to and from the processor exist only on `x86_64`.
#![expect(clippy::inline_always)]

mod cr0;
mod cr3;
mod cr4;
mod cr8;
mod dr;
mod rflags;
mod xcr0;

#[cfg(target_arch = "x86_64")]
pub use self::{
	cr0::{clts, lmsw, smsw},
	dr::{read_dr, write_dr},
	xcr0::{xgetbv, xsetbv},
};
pub use self::{
	cr0::Cr0,
	cr3::{Cr3, Cr3Pcid},
	cr4::Cr4,
	cr8::Cr8,
	dr::{BreakCondition, BreakLength, Dr6, Dr7},
	rflags::Rflags,
	xcr0::Xcr0,
};

/// Reads CR2, the linear address that caused the most recent page fault.
#[cfg(target_arch = "x86_64")]
#[inline(always)]
#[must_use]
pub fn read_cr2() -> u64 {
	let cr2: u64;
	// SAFETY: Reading CR2 has no side effects; it faults outside of ring 0.
	unsafe {
		core::arch::asm!("mov {}, cr2", out(reg) cr2, options(nostack, nomem, preserves_flags));
	}
	cr2
}

/// Writes CR2.
///
/// # Safety
/// Must be executed in ring 0. Typically only used when restoring
/// a guest's CR2 before resuming it.
#[cfg(target_arch = "x86_64")]
#[inline(always)]
pub unsafe fn write_cr2(value: u64) {
	// SAFETY: Caller guarantees ring 0.
	unsafe {
		core::arch::asm!("mov cr2, {}", in(reg) value, options(nostack, preserves_flags));
	}
}
