//! Long mode and fast system call records.

use ia32_macro::bitstruct;

use super::{IA32_EFER, IA32_STAR, msr_value};

bitstruct! {
	/// `IA32_EFER`: extended feature enables.
	pub struct Efer(u64) {
		/// `SYSCALL`/`SYSRET` enable.
		pub sce[0] => as bool,
		/// Long mode enable.
		pub lme[8] => as bool,
		/// Long mode active (read-only).
		pub lma[10] => as bool,
		/// No-execute enable.
		pub nxe[11] => as bool,
		/// Secure virtual machine enable (AMD).
		pub svme[12] => as bool,
		/// Long mode segment limit enable (AMD).
		pub lmsle[13] => as bool,
		/// Fast `FXSAVE`/`FXRSTOR` (AMD).
		pub ffxsr[14] => as bool,
		/// Translation cache extension (AMD).
		pub tce[15] => as bool,
	}
}

bitstruct! {
	/// `IA32_STAR`: `SYSCALL`/`SYSRET` segment bases.
	///
	/// `SYSCALL` loads `CS` from `syscall_cs` and `SS` from `syscall_cs + 8`.
	/// 64-bit `SYSRET` loads `CS` from `sysret_cs + 16` and `SS` from
	/// `sysret_cs + 8`, both with RPL forced to 3.
	pub struct Star(u64) {
		/// Legacy-mode `SYSCALL` target EIP.
		pub syscall_eip[31:0] => as u32,
		/// Kernel code selector.
		pub syscall_cs[47:32] => as u16,
		/// User selector base.
		pub sysret_cs[63:48] => as u16,
	}
}

impl Star {
	/// Builds a `STAR` value from the kernel code selector and the
	/// selector base `SYSRET` offsets from.
	#[must_use]
	pub const fn from_selectors(kernel_cs: u16, user_base: u16) -> Self {
		Self::new()
			.with_syscall_cs(kernel_cs)
			.with_sysret_cs(user_base)
	}
}

msr_value! {
	Efer = IA32_EFER,
	Star = IA32_STAR,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn efer_long_mode() {
		let efer = Efer::new().with_sce(true).with_lme(true).with_nxe(true);
		assert_eq!(efer.bits(), 0x901);
		assert!(!efer.lma());
		assert!(Efer::from_bits(0xD01).lma());
	}

	#[test]
	fn star_selectors() {
		let star = Star::from_selectors(0x08, 0x1B);
		assert_eq!(star.bits(), 0x001B_0008_0000_0000);
	}
}
