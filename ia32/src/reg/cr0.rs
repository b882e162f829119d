//! The CR0 control register.

use ia32_macro::bitstruct;
#[cfg(target_arch = "x86_64")]
use ia32_test::effect;

bitstruct! {
	/// CR0: system control flags governing operating mode and processor state.
	pub struct Cr0(u64) {
		/// Protection Enable. Enables protected mode when set.
		pub pe[0] => as bool,
		/// Monitor Coprocessor. Controls whether `WAIT`/`FWAIT` raises `#NM` when `TS` is set.
		pub mp[1] => as bool,
		/// Emulation. When set, x87 instructions raise `#NM` so they can be emulated.
		pub em[2] => as bool,
		/// Task Switched. Set on every task switch; causes `#NM` on the next x87/SSE use.
		pub ts[3] => as bool,
		/// Extension Type. Hardwired to 1 on Intel 64 processors.
		pub et[4] => as bool,
		/// Numeric Error. Enables native (internal) reporting of x87 errors.
		pub ne[5] => as bool,
		/// Write Protect. Prevents supervisor writes to read-only pages.
		pub wp[16] => as bool,
		/// Alignment Mask. Enables alignment checking when `RFLAGS.AC` is also set at CPL 3.
		pub am[18] => as bool,
		/// Not Write-through. Globally disables write-through caching.
		pub nw[29] => as bool,
		/// Cache Disable. Globally disables memory caching.
		pub cd[30] => as bool,
		/// Paging. Enables paging; requires `PE`.
		pub pg[31] => as bool,
	}
}

#[cfg(target_arch = "x86_64")]
impl Cr0 {
	/// Reads CR0.
	#[inline(always)]
	#[must_use]
	pub fn load() -> Self {
		let cr0: u64;
		// SAFETY: Reading CR0 has no side effects.
		unsafe {
			core::arch::asm!("mov {}, cr0", out(reg) cr0, options(nostack, nomem, preserves_flags));
		}
		Self(cr0)
	}

	/// Writes CR0.
	///
	/// # Safety
	/// Must be executed in ring 0. Changing `PG`, `PE`, `WP`, `CD` or `NW`
	/// changes how every subsequent memory access behaves; the caller is
	/// responsible for the consequences.
	#[inline(always)]
	#[effect(write_reg = cr0)]
	pub unsafe fn store(self) {
		// SAFETY: Caller guarantees ring 0 and a coherent configuration.
		unsafe {
			core::arch::asm!("mov cr0, {}", in(reg) self.0, options(nostack, preserves_flags));
		}
	}
}

/// Clears `CR0.TS`.
///
/// # Safety
/// Must be executed in ring 0.
#[cfg(target_arch = "x86_64")]
#[inline(always)]
#[effect(write_reg = cr0)]
pub unsafe fn clts() {
	// SAFETY: Caller guarantees ring 0.
	unsafe {
		core::arch::asm!("clts", options(nostack, preserves_flags));
	}
}

/// Stores the machine status word (the low 16 bits of CR0).
///
/// Unlike `MOV from CR0`, this is permitted at any privilege level
/// unless `CR4.UMIP` is set.
#[cfg(target_arch = "x86_64")]
#[inline(always)]
#[must_use]
pub fn smsw() -> u16 {
	let msw: u16;
	// SAFETY: SMSW has no side effects.
	unsafe {
		core::arch::asm!("smsw {:x}", out(reg) msw, options(nostack, nomem, preserves_flags));
	}
	msw
}

/// Loads the machine status word.
///
/// Only `PE`, `MP`, `EM` and `TS` (bits 3:0) are affected; `PE`
/// can be set but not cleared.
///
/// # Safety
/// Must be executed in ring 0.
#[cfg(target_arch = "x86_64")]
#[inline(always)]
#[effect(write_reg = cr0)]
pub unsafe fn lmsw(msw: u16) {
	// SAFETY: Caller guarantees ring 0.
	unsafe {
		core::arch::asm!("lmsw {:x}", in(reg) msw, options(nostack, preserves_flags));
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn layout() {
		assert_eq!(Cr0::PE_FLAG, 1 << 0);
		assert_eq!(Cr0::TS_FLAG, 1 << 3);
		assert_eq!(Cr0::WP_FLAG, 1 << 16);
		assert_eq!(Cr0::PG_FLAG, 1 << 31);
		assert_eq!(Cr0::DEFINED_MASK | Cr0::RESERVED_MASK, u64::MAX);
	}

	#[test]
	fn typical_long_mode_value() {
		let cr0 = Cr0::new()
			.with_pe(true)
			.with_mp(true)
			.with_et(true)
			.with_ne(true)
			.with_wp(true)
			.with_am(true)
			.with_pg(true);
		assert_eq!(cr0.bits(), 0x8005_0033);
	}
}
