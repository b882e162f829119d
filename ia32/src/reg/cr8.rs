//! The CR8 (task priority) register.

use ia32_macro::bitstruct;
#[cfg(target_arch = "x86_64")]
use ia32_test::effect;

bitstruct! {
	/// CR8: the task-priority register.
	///
	/// Interrupts whose priority class (vector bits 7:4) is less than
	/// or equal to `tpr` are held pending.
	pub struct Cr8(u64) {
		/// The task-priority threshold, 0 (lowest) to 15 (highest).
		pub tpr[3:0] => as u8,
	}
}

#[cfg(target_arch = "x86_64")]
impl Cr8 {
	/// Reads CR8.
	#[inline(always)]
	#[must_use]
	pub fn load() -> Self {
		let cr8: u64;
		// SAFETY: Reading CR8 has no side effects.
		unsafe {
			core::arch::asm!("mov {}, cr8", out(reg) cr8, options(nostack, nomem, preserves_flags));
		}
		Self(cr8)
	}

	/// Writes CR8.
	///
	/// # Safety
	/// Must be executed in ring 0. Lowering the priority may immediately
	/// deliver pending interrupts.
	#[inline(always)]
	#[effect(write_reg = cr8)]
	pub unsafe fn store(self) {
		// SAFETY: Caller guarantees ring 0.
		unsafe {
			core::arch::asm!("mov cr8, {}", in(reg) self.0, options(nostack, preserves_flags));
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn tpr_is_four_bits() {
		assert_eq!(Cr8::TPR_MASK, 0xF);
		assert_eq!(Cr8::new().with_tpr(15).bits(), 15);
		assert_eq!(Cr8::new().with_tpr(0x1F).tpr(), 0xF);
		assert_eq!(Cr8::RESERVED_MASK, !0xF);
	}
}
