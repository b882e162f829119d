//! Miscellaneous instruction stubs: interrupt flag control, halting,
//! software interrupts and memory fences.

#![expect(clippy::inline_always)]

use core::arch::asm;

use ia32_test::effect;

/// Enables maskable interrupts (`STI`).
///
/// Interrupts are recognized after the instruction following `STI`.
///
/// # Safety
/// Must be executed at `CPL <= IOPL`. Interrupt handlers must be ready.
#[inline(always)]
#[effect(write_reg = rflags)]
pub unsafe fn sti() {
	// SAFETY: Offloaded to the caller.
	unsafe {
		asm!("sti", options(nostack));
	}
}

/// Disables maskable interrupts (`CLI`).
///
/// # Safety
/// Must be executed at `CPL <= IOPL`. The caller is responsible for
/// re-enabling interrupts.
#[inline(always)]
#[effect(write_reg = rflags)]
pub unsafe fn cli() {
	// SAFETY: Offloaded to the caller.
	unsafe {
		asm!("cli", options(nostack));
	}
}

/// Halts until the next interrupt (`HLT`).
///
/// # Safety
/// Must be executed in ring 0. If interrupts are disabled, the core
/// only wakes on NMI, SMI, INIT or reset.
#[inline(always)]
pub unsafe fn hlt() {
	// SAFETY: Offloaded to the caller.
	unsafe {
		asm!("hlt", options(nostack, preserves_flags));
	}
}

/// Enables interrupts and halts with no window between the two
/// (`STI; HLT`).
///
/// # Safety
/// See [`sti`] and [`hlt`].
#[inline(always)]
#[effect(write_reg = rflags)]
pub unsafe fn sti_hlt() {
	// SAFETY: Offloaded to the caller.
	unsafe {
		asm!("sti", "hlt", options(nostack));
	}
}

/// Hints to the processor that the caller is in a spin-wait loop (`PAUSE`).
#[inline(always)]
pub fn pause() {
	// SAFETY: `PAUSE` has no architectural effect.
	unsafe {
		asm!("pause", options(nostack, nomem, preserves_flags));
	}
}

/// Arms address monitoring hardware on the cache line containing
/// `address` (`MONITOR`).
///
/// # Safety
/// Requires `CPUID.01H:ECX.MONITOR`; faults outside of ring 0 unless
/// the OS enables ring 3 use.
#[inline(always)]
pub unsafe fn monitor(address: *const u8, extensions: u32, hints: u32) {
	// SAFETY: Offloaded to the caller.
	unsafe {
		asm!(
			"monitor",
			in("rax") address,
			in("ecx") extensions,
			in("edx") hints,
			options(nostack, readonly, preserves_flags),
		);
	}
}

/// Waits for a write to the monitored range, or an interrupt (`MWAIT`).
///
/// `hints` selects the target C-state; `extensions` bit 0 treats
/// masked interrupts as break events.
///
/// # Safety
/// Requires `CPUID.01H:ECX.MONITOR`; faults outside of ring 0 unless
/// the OS enables ring 3 use.
#[inline(always)]
pub unsafe fn mwait(hints: u32, extensions: u32) {
	// SAFETY: Offloaded to the caller.
	unsafe {
		asm!(
			"mwait",
			in("eax") hints,
			in("ecx") extensions,
			options(nostack, preserves_flags),
		);
	}
}

/// Raises a breakpoint exception (`INT3`).
///
/// # Safety
/// A `#BP` handler must be installed (or a debugger attached).
#[inline(always)]
pub unsafe fn int3() {
	// SAFETY: Offloaded to the caller.
	unsafe {
		asm!("int3", options(nostack));
	}
}

/// Raises the software interrupt `VECTOR` (`INT n`).
///
/// # Safety
/// The IDT gate for `VECTOR` must be present with a DPL allowing the
/// current privilege level, and its handler must return.
#[inline(always)]
pub unsafe fn int<const VECTOR: u8>() {
	// SAFETY: Offloaded to the caller.
	unsafe {
		asm!("int {v}", v = const VECTOR, options(nostack));
	}
}

/// Raises a debug exception through the single-byte `INT1` (`ICEBP`) opcode.
///
/// # Safety
/// A `#DB` handler must be installed.
#[inline(always)]
pub unsafe fn icebp() {
	// SAFETY: Offloaded to the caller.
	unsafe {
		asm!(".byte 0xF1", options(nostack));
	}
}

/// Initializes the x87 FPU without checking for pending exceptions
/// (`FNINIT`).
#[inline(always)]
pub fn fninit() {
	// SAFETY: Only resets x87 state, which this code does not rely on.
	unsafe {
		asm!("fninit", options(nostack, nomem, preserves_flags));
	}
}

/// Orders all prior loads before all later instructions (`LFENCE`).
///
/// On Intel processors `LFENCE` also waits for all prior instructions
/// to complete locally.
#[inline(always)]
pub fn lfence() {
	// SAFETY: Fences have no effect beyond ordering.
	unsafe {
		asm!("lfence", options(nostack, preserves_flags));
	}
}

/// Orders all prior stores before all later stores (`SFENCE`).
#[inline(always)]
pub fn sfence() {
	// SAFETY: Fences have no effect beyond ordering.
	unsafe {
		asm!("sfence", options(nostack, preserves_flags));
	}
}

/// Orders all prior loads and stores before all later ones (`MFENCE`).
#[inline(always)]
pub fn mfence() {
	// SAFETY: Fences have no effect beyond ordering.
	unsafe {
		asm!("mfence", options(nostack, preserves_flags));
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn unprivileged() {
		pause();
		lfence();
		sfence();
		mfence();
		fninit();
	}
}
