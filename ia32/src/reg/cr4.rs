//! The CR4 control register.

use ia32_macro::bitstruct;
#[cfg(target_arch = "x86_64")]
use ia32_test::effect;

bitstruct! {
	/// CR4: architectural extension enables.
	pub struct Cr4(u64) {
		/// Virtual-8086 Mode Extensions.
		pub vme[0] => as bool,
		/// Protected-Mode Virtual Interrupts.
		pub pvi[1] => as bool,
		/// Time Stamp Disable. Restricts `RDTSC`/`RDTSCP` to ring 0.
		pub tsd[2] => as bool,
		/// Debugging Extensions. References to DR4/DR5 raise `#UD`.
		pub de[3] => as bool,
		/// Page Size Extensions (4 MiB pages under 32-bit paging).
		pub pse[4] => as bool,
		/// Physical Address Extension. Required for 4- and 5-level paging.
		pub pae[5] => as bool,
		/// Machine-Check Enable.
		pub mce[6] => as bool,
		/// Page Global Enable.
		pub pge[7] => as bool,
		/// Performance-Monitoring Counter Enable. Allows `RDPMC` at any CPL.
		pub pce[8] => as bool,
		/// OS support for `FXSAVE`/`FXRSTOR`.
		pub osfxsr[9] => as bool,
		/// OS support for unmasked SIMD floating-point exceptions.
		pub osxmmexcpt[10] => as bool,
		/// User-Mode Instruction Prevention (`SGDT`, `SIDT`, `SLDT`, `SMSW`, `STR` at CPL > 0).
		pub umip[11] => as bool,
		/// 57-bit linear addresses (5-level paging).
		pub la57[12] => as bool,
		/// VMX Enable.
		pub vmxe[13] => as bool,
		/// SMX Enable.
		pub smxe[14] => as bool,
		/// Enables `RDFSBASE`, `RDGSBASE`, `WRFSBASE` and `WRGSBASE`.
		pub fsgsbase[16] => as bool,
		/// PCID Enable.
		pub pcide[17] => as bool,
		/// `XSAVE` and processor extended states enable.
		pub osxsave[18] => as bool,
		/// Key Locker Enable.
		pub kl[19] => as bool,
		/// Supervisor-Mode Execution Prevention.
		pub smep[20] => as bool,
		/// Supervisor-Mode Access Prevention.
		pub smap[21] => as bool,
		/// Protection keys for user-mode pages.
		pub pke[22] => as bool,
		/// Control-flow Enforcement Technology.
		pub cet[23] => as bool,
		/// Protection keys for supervisor-mode pages.
		pub pks[24] => as bool,
		/// User Interrupts Enable.
		pub uintr[25] => as bool,
		/// Linear Address Space Separation.
		pub lass[27] => as bool,
		/// Linear Address Masking for supervisor pointers.
		pub lam_sup[28] => as bool,
		/// Flexible Return and Event Delivery.
		pub fred[32] => as bool,
	}
}

#[cfg(target_arch = "x86_64")]
impl Cr4 {
	/// Reads CR4.
	#[inline(always)]
	#[must_use]
	pub fn load() -> Self {
		let cr4: u64;
		// SAFETY: Reading CR4 has no side effects.
		unsafe {
			core::arch::asm!("mov {}, cr4", out(reg) cr4, options(nostack, nomem, preserves_flags));
		}
		Self(cr4)
	}

	/// Writes CR4.
	///
	/// # Safety
	/// Must be executed in ring 0. Toggling `PGE`, `PCIDE` or `LA57` flushes or
	/// reinterprets translations; toggling `SMEP`/`SMAP` changes which accesses
	/// fault. The caller must ensure the new configuration is coherent.
	#[inline(always)]
	#[effect(write_reg = cr4)]
	pub unsafe fn store(self) {
		// SAFETY: Caller guarantees ring 0 and a coherent configuration.
		unsafe {
			core::arch::asm!("mov cr4, {}", in(reg) self.0, options(nostack, preserves_flags));
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn layout() {
		assert_eq!(Cr4::PAE_FLAG, 1 << 5);
		assert_eq!(Cr4::LA57_FLAG, 1 << 12);
		assert_eq!(Cr4::VMXE_FLAG, 1 << 13);
		assert_eq!(Cr4::PCIDE_FLAG, 1 << 17);
		assert_eq!(Cr4::PKE_FLAG, 1 << 22);
		assert_eq!(Cr4::FRED_FLAG, 1 << 32);
		assert_ne!(Cr4::RESERVED_MASK & (1 << 15), 0);
		assert_ne!(Cr4::RESERVED_MASK & (1 << 26), 0);
	}

	#[test]
	fn vmxe_preserves_reserved() {
		let cr4 = Cr4::from_bits(0x8000 | Cr4::PAE_FLAG).with_vmxe(true);
		assert!(cr4.vmxe());
		assert!(cr4.pae());
		assert_eq!(cr4.reserved_bits(), 0x8000);
	}
}
