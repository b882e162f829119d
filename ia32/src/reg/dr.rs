//! Debug registers DR0-DR7.

use ia32_macro::bitstruct;
#[cfg(target_arch = "x86_64")]
use ia32_test::effect;

bitstruct! {
	/// DR6: debug status.
	pub struct Dr6(u64) {
		/// Breakpoint 0 condition detected.
		pub b0[0] => as bool,
		/// Breakpoint 1 condition detected.
		pub b1[1] => as bool,
		/// Breakpoint 2 condition detected.
		pub b2[2] => as bool,
		/// Breakpoint 3 condition detected.
		pub b3[3] => as bool,
		/// Bus-lock detected. Active low: cleared by the processor on a bus-lock `#DB`.
		pub bld[11] => as bool,
		/// Debug register access detected (`DR7.GD`).
		pub bd[13] => as bool,
		/// Single step.
		pub bs[14] => as bool,
		/// Task switch to a task with the T flag set.
		pub bt[15] => as bool,
		/// RTM debug exception. Active low: cleared inside a transaction.
		pub rtm[16] => as bool,
	}
}

impl Dr6 {
	/// The value DR6 holds after reset, and the value software should
	/// write back after handling a `#DB`.
	pub const INIT: Self = Self(0xFFFF_0FF0);
}

bitstruct! {
	/// DR7: debug control.
	///
	/// The per-breakpoint condition and length fields are also reachable
	/// by index through [`Dr7::condition`] and [`Dr7::length`].
	pub struct Dr7(u64) {
		/// Local enable, breakpoint 0.
		pub l0[0] => as bool,
		/// Global enable, breakpoint 0.
		pub g0[1] => as bool,
		/// Local enable, breakpoint 1.
		pub l1[2] => as bool,
		/// Global enable, breakpoint 1.
		pub g1[3] => as bool,
		/// Local enable, breakpoint 2.
		pub l2[4] => as bool,
		/// Global enable, breakpoint 2.
		pub g2[5] => as bool,
		/// Local enable, breakpoint 3.
		pub l3[6] => as bool,
		/// Global enable, breakpoint 3.
		pub g3[7] => as bool,
		/// Local exact breakpoint enable.
		pub le[8] => as bool,
		/// Global exact breakpoint enable.
		pub ge[9] => as bool,
		_[10] => 1,
		/// Restricted Transactional Memory debugging.
		pub rtm[11] => as bool,
		/// General detect: any `MOV DRx` raises `#DB`.
		pub gd[13] => as bool,
		/// Condition of breakpoint 0; see [`BreakCondition`].
		pub rw0[17:16] => as u8,
		/// Length of breakpoint 0; see [`BreakLength`].
		pub len0[19:18] => as u8,
		/// Condition of breakpoint 1.
		pub rw1[21:20] => as u8,
		/// Length of breakpoint 1.
		pub len1[23:22] => as u8,
		/// Condition of breakpoint 2.
		pub rw2[25:24] => as u8,
		/// Length of breakpoint 2.
		pub len2[27:26] => as u8,
		/// Condition of breakpoint 3.
		pub rw3[29:28] => as u8,
		/// Length of breakpoint 3.
		pub len3[31:30] => as u8,
	}
}

/// The access that triggers a hardware breakpoint (`DR7.R/Wn`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum BreakCondition {
	/// Instruction execution.
	Execute   = 0,
	/// Data writes.
	Write     = 1,
	/// I/O reads or writes (requires `CR4.DE`).
	Io        = 2,
	/// Data reads or writes, but not instruction fetches.
	ReadWrite = 3,
}

/// The size of the breakpoint's address range (`DR7.LENn`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum BreakLength {
	/// One byte. Required for execution breakpoints.
	Byte  = 0,
	/// Two bytes.
	Word  = 1,
	/// Eight bytes.
	Qword = 2,
	/// Four bytes.
	Dword = 3,
}

impl Dr7 {
	/// Returns the condition of breakpoint `index` (0-3).
	///
	/// # Panics
	/// Panics if `index > 3`.
	#[must_use]
	pub const fn condition(self, index: usize) -> BreakCondition {
		assert!(index < 4, "debug breakpoint index out of range");
		match (self.0 >> (16 + index * 4)) & 0b11 {
			0 => BreakCondition::Execute,
			1 => BreakCondition::Write,
			2 => BreakCondition::Io,
			_ => BreakCondition::ReadWrite,
		}
	}

	/// Returns the length of breakpoint `index` (0-3).
	///
	/// # Panics
	/// Panics if `index > 3`.
	#[must_use]
	pub const fn length(self, index: usize) -> BreakLength {
		assert!(index < 4, "debug breakpoint index out of range");
		match (self.0 >> (18 + index * 4)) & 0b11 {
			0 => BreakLength::Byte,
			1 => BreakLength::Word,
			2 => BreakLength::Qword,
			_ => BreakLength::Dword,
		}
	}

	/// Configures breakpoint `index` (0-3) with the given condition and length,
	/// and sets its local and global enables.
	///
	/// # Panics
	/// Panics if `index > 3`.
	#[must_use]
	pub const fn with_breakpoint(
		self,
		index: usize,
		condition: BreakCondition,
		length: BreakLength,
		local: bool,
		global: bool,
	) -> Self {
		assert!(index < 4, "debug breakpoint index out of range");
		let shift = 16 + index * 4;
		let enable_shift = index * 2;
		let mut bits = self.0 & !(0b1111 << shift) & !(0b11 << enable_shift);
		bits |= ((condition as u64) | ((length as u64) << 2)) << shift;
		bits |= ((local as u64) | ((global as u64) << 1)) << enable_shift;
		Self(bits)
	}
}

#[cfg(target_arch = "x86_64")]
impl Dr6 {
	/// Reads DR6.
	///
	/// # Safety
	/// Must be executed in ring 0.
	#[inline(always)]
	#[must_use]
	pub unsafe fn load() -> Self {
		// SAFETY: Caller guarantees ring 0.
		Self(unsafe { read_dr::<6>() })
	}

	/// Writes DR6.
	///
	/// # Safety
	/// Must be executed in ring 0.
	#[inline(always)]
	pub unsafe fn store(self) {
		// SAFETY: Caller guarantees ring 0.
		unsafe { write_dr::<6>(self.0) }
	}
}

#[cfg(target_arch = "x86_64")]
impl Dr7 {
	/// Reads DR7.
	///
	/// # Safety
	/// Must be executed in ring 0.
	#[inline(always)]
	#[must_use]
	pub unsafe fn load() -> Self {
		// SAFETY: Caller guarantees ring 0.
		Self(unsafe { read_dr::<7>() })
	}

	/// Writes DR7, arming or disarming hardware breakpoints.
	///
	/// # Safety
	/// Must be executed in ring 0, and DR0-DR3 must already hold
	/// the addresses of any breakpoints being enabled.
	#[inline(always)]
	#[effect(write_reg = dr7)]
	pub unsafe fn store(self) {
		// SAFETY: Caller guarantees ring 0.
		unsafe { write_dr::<7>(self.0) }
	}
}

/// Reads debug register `N` (0-3, 6 or 7).
///
/// # Safety
/// Must be executed in ring 0.
#[cfg(target_arch = "x86_64")]
#[inline(always)]
#[must_use]
pub unsafe fn read_dr<const N: u8>() -> u64 {
	const {
		assert!(N < 4 || N == 6 || N == 7, "invalid debug register");
	}

	let value: u64;
	// SAFETY: Caller guarantees ring 0; the register number is checked above.
	unsafe {
		match N {
			0 => core::arch::asm!("mov {}, dr0", out(reg) value, options(nostack, nomem, preserves_flags)),
			1 => core::arch::asm!("mov {}, dr1", out(reg) value, options(nostack, nomem, preserves_flags)),
			2 => core::arch::asm!("mov {}, dr2", out(reg) value, options(nostack, nomem, preserves_flags)),
			3 => core::arch::asm!("mov {}, dr3", out(reg) value, options(nostack, nomem, preserves_flags)),
			6 => core::arch::asm!("mov {}, dr6", out(reg) value, options(nostack, nomem, preserves_flags)),
			_ => core::arch::asm!("mov {}, dr7", out(reg) value, options(nostack, nomem, preserves_flags)),
		}
	}
	value
}

/// Writes debug register `N` (0-3, 6 or 7).
///
/// # Safety
/// Must be executed in ring 0.
#[cfg(target_arch = "x86_64")]
#[inline(always)]
pub unsafe fn write_dr<const N: u8>(value: u64) {
	const {
		assert!(N < 4 || N == 6 || N == 7, "invalid debug register");
	}

	// SAFETY: Caller guarantees ring 0; the register number is checked above.
	unsafe {
		match N {
			0 => core::arch::asm!("mov dr0, {}", in(reg) value, options(nostack, preserves_flags)),
			1 => core::arch::asm!("mov dr1, {}", in(reg) value, options(nostack, preserves_flags)),
			2 => core::arch::asm!("mov dr2, {}", in(reg) value, options(nostack, preserves_flags)),
			3 => core::arch::asm!("mov dr3, {}", in(reg) value, options(nostack, preserves_flags)),
			6 => core::arch::asm!("mov dr6, {}", in(reg) value, options(nostack, preserves_flags)),
			_ => core::arch::asm!("mov dr7, {}", in(reg) value, options(nostack, preserves_flags)),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn dr7_fixed_bit() {
		assert_eq!(Dr7::new().bits(), 0x400);
		assert_eq!(Dr7::CONST_MASK, 0x400);
		assert!(Dr7::try_from(0_u64).is_err());
	}

	#[test]
	fn dr7_breakpoints() {
		let dr7 = Dr7::new()
			.with_breakpoint(1, BreakCondition::Write, BreakLength::Dword, true, false)
			.with_breakpoint(3, BreakCondition::ReadWrite, BreakLength::Qword, false, true);

		assert!(dr7.l1());
		assert!(!dr7.g1());
		assert!(dr7.g3());
		assert_eq!(dr7.rw1(), 1);
		assert_eq!(dr7.len1(), 3);
		assert_eq!(dr7.condition(1), BreakCondition::Write);
		assert_eq!(dr7.length(1), BreakLength::Dword);
		assert_eq!(dr7.condition(3), BreakCondition::ReadWrite);
		assert_eq!(dr7.length(3), BreakLength::Qword);
		assert_eq!(dr7.condition(0), BreakCondition::Execute);
		assert_eq!(dr7.bits(), 0x400 | 0b0100 | 0b1000_0000 | (0b1101 << 20) | (0b1011 << 28));
	}

	#[test]
	fn dr6_init() {
		assert!(Dr6::INIT.rtm());
		assert!(Dr6::INIT.bld());
		assert!(!Dr6::INIT.bs());
		assert!(!Dr6::INIT.b0());
	}
}
