//! The RFLAGS register.

use ia32_macro::bitstruct;
#[cfg(target_arch = "x86_64")]
use ia32_test::effect;

bitstruct! {
	/// RFLAGS: status, control and system flags.
	pub struct Rflags(u64) {
		/// Carry flag.
		pub carry[0] => as bool,
		_[1] => 1,
		/// Parity flag.
		pub parity[2] => as bool,
		/// Auxiliary carry flag.
		pub auxiliary_carry[4] => as bool,
		/// Zero flag.
		pub zero[6] => as bool,
		/// Sign flag.
		pub sign[7] => as bool,
		/// Trap flag (single-step).
		pub trap[8] => as bool,
		/// Interrupt enable flag (`IF`).
		pub interrupt_enable[9] => as bool,
		/// Direction flag (`DF`).
		pub direction[10] => as bool,
		/// Overflow flag.
		pub overflow[11] => as bool,
		/// I/O privilege level.
		pub iopl[13:12] => as u8,
		/// Nested task.
		pub nested_task[14] => as bool,
		/// Resume flag; suppresses instruction breakpoints for one instruction.
		pub resume[16] => as bool,
		/// Virtual-8086 mode.
		pub virtual_8086[17] => as bool,
		/// Alignment check / access control (SMAP override).
		pub alignment_check[18] => as bool,
		/// Virtual interrupt flag.
		pub virtual_interrupt[19] => as bool,
		/// Virtual interrupt pending.
		pub virtual_interrupt_pending[20] => as bool,
		/// Identification; software can toggle it iff `CPUID` is supported.
		pub id[21] => as bool,
	}
}

#[cfg(target_arch = "x86_64")]
impl Rflags {
	/// Reads RFLAGS.
	#[inline(always)]
	#[must_use]
	pub fn load() -> Self {
		let rflags: u64;
		// SAFETY: PUSHFQ/POP only touch the stack slot they allocate.
		unsafe {
			core::arch::asm!("pushfq", "pop {}", out(reg) rflags, options(nomem, preserves_flags));
		}
		Self(rflags)
	}

	/// Writes RFLAGS.
	///
	/// # Safety
	/// Changing `IF`, `TF`, `AC` or `DF` alters interrupt delivery, single
	/// stepping, SMAP enforcement and string instruction direction for all
	/// subsequent code. `IOPL` and `IF` are only writable at sufficient
	/// privilege; at lower privilege they are silently unchanged.
	#[inline(always)]
	#[effect(write_reg = rflags)]
	pub unsafe fn store(self) {
		// SAFETY: Caller takes responsibility for the new flags.
		unsafe {
			core::arch::asm!("push {}", "popfq", in(reg) self.0);
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn layout() {
		assert_eq!(Rflags::new().bits(), 0x2);
		assert_eq!(Rflags::INTERRUPT_ENABLE_FLAG, 0x200);
		assert_eq!(Rflags::DIRECTION_FLAG, 0x400);
		assert_eq!(Rflags::IOPL_FLAG, 0x3000);
		assert_eq!(Rflags::ID_FLAG, 0x20_0000);
	}

	#[test]
	#[cfg(target_arch = "x86_64")]
	fn load_reflects_user_mode() {
		let flags = Rflags::load();
		assert_eq!(flags.bits() & 0x2, 0x2);
		assert!(flags.interrupt_enable());
		assert!(!flags.direction());
		assert!(Rflags::try_from(flags.bits()).is_ok());
	}

	#[test]
	#[cfg(target_arch = "x86_64")]
	fn store_round_trips_in_user_mode() {
		let flags = Rflags::load();
		// SAFETY: Writes back the flags just read; IF and IOPL are unchanged.
		unsafe { flags.with_carry(false).store() };
		assert_eq!(Rflags::load().interrupt_enable(), flags.interrupt_enable());
	}
}
