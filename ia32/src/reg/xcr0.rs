//! The XCR0 extended control register and `XGETBV`/`XSETBV`.

use ia32_macro::bitstruct;
#[cfg(target_arch = "x86_64")]
use ia32_test::effect;

bitstruct! {
	/// XCR0: the user state components enabled for `XSAVE`.
	///
	/// Supervisor state components (PT, CET, HDC, ...) are enabled
	/// through `IA32_XSS` using the same bit positions.
	pub struct Xcr0(u64) {
		/// x87 FPU state. Must always be set.
		pub x87[0] => as bool,
		/// SSE state (XMM registers and `MXCSR`).
		pub sse[1] => as bool,
		/// AVX state (upper halves of YMM0-15).
		pub avx[2] => as bool,
		/// MPX bound registers.
		pub bndreg[3] => as bool,
		/// MPX bound configuration and status.
		pub bndcsr[4] => as bool,
		/// AVX-512 opmask registers.
		pub opmask[5] => as bool,
		/// Upper halves of ZMM0-15.
		pub zmm_hi256[6] => as bool,
		/// ZMM16-31.
		pub hi16_zmm[7] => as bool,
		/// Processor Trace state (`IA32_XSS` only).
		pub pt[8] => as bool,
		/// Protection-key rights register.
		pub pkru[9] => as bool,
		/// PASID state (`IA32_XSS` only).
		pub pasid[10] => as bool,
		/// CET user state (`IA32_XSS` only).
		pub cet_u[11] => as bool,
		/// CET supervisor state (`IA32_XSS` only).
		pub cet_s[12] => as bool,
		/// Hardware duty cycling state (`IA32_XSS` only).
		pub hdc[13] => as bool,
		/// User interrupt state (`IA32_XSS` only).
		pub uintr[14] => as bool,
		/// Architectural LBR state (`IA32_XSS` only).
		pub lbr[15] => as bool,
		/// HWP request state (`IA32_XSS` only).
		pub hwp[16] => as bool,
		/// AMX tile configuration.
		pub xtilecfg[17] => as bool,
		/// AMX tile data.
		pub xtiledata[18] => as bool,
		/// APX extended general-purpose registers.
		pub apx[19] => as bool,
	}
}

#[cfg(target_arch = "x86_64")]
impl Xcr0 {
	/// Reads XCR0.
	///
	/// Requires `CR4.OSXSAVE`; raises `#UD` otherwise.
	#[inline(always)]
	#[must_use]
	pub fn load() -> Self {
		// SAFETY: XGETBV(0) has no side effects.
		Self(unsafe { xgetbv(0) })
	}

	/// Writes XCR0.
	///
	/// # Safety
	/// Must be executed in ring 0 with `CR4.OSXSAVE` set. The value must
	/// have `x87` set, must not set `avx` without `sse`, and must only
	/// enable components reported by `CPUID.(EAX=0DH,ECX=0)`.
	#[inline(always)]
	#[effect(write_reg = xcr0)]
	pub unsafe fn store(self) {
		// SAFETY: Caller upholds the requirements.
		unsafe { xsetbv(0, self.0) }
	}
}

/// Reads extended control register `index` (`XGETBV`).
///
/// # Safety
/// `CR4.OSXSAVE` must be set and `index` must name a supported XCR
/// (0, or 1 when `CPUID.(EAX=0DH,ECX=1):EAX[2]` is set).
#[cfg(target_arch = "x86_64")]
#[inline(always)]
#[must_use]
pub unsafe fn xgetbv(index: u32) -> u64 {
	let lo: u32;
	let hi: u32;
	// SAFETY: Caller upholds the requirements.
	unsafe {
		core::arch::asm!(
			"xgetbv",
			in("ecx") index,
			out("eax") lo,
			out("edx") hi,
			options(nostack, nomem, preserves_flags),
		);
	}
	(u64::from(hi) << 32) | u64::from(lo)
}

/// Writes extended control register `index` (`XSETBV`).
///
/// # Safety
/// Must be executed in ring 0; see [`Xcr0::store`].
#[cfg(target_arch = "x86_64")]
#[inline(always)]
pub unsafe fn xsetbv(index: u32, value: u64) {
	// SAFETY: Caller upholds the requirements.
	unsafe {
		core::arch::asm!(
			"xsetbv",
			in("ecx") index,
			in("eax") value as u32,
			in("edx") (value >> 32) as u32,
			options(nostack, preserves_flags),
		);
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn layout() {
		assert_eq!(Xcr0::new().with_x87(true).with_sse(true).with_avx(true).bits(), 0x7);
		assert_eq!(Xcr0::OPMASK_FLAG | Xcr0::ZMM_HI256_FLAG | Xcr0::HI16_ZMM_FLAG, 0xE0);
		assert_eq!(Xcr0::XTILEDATA_FLAG, 1 << 18);
	}

	#[test]
	#[cfg(target_arch = "x86_64")]
	fn load_has_x87() {
		if std::arch::is_x86_feature_detected!("xsave") {
			let xcr0 = Xcr0::load();
			assert!(xcr0.x87());
			assert!(xcr0.sse());
		}
	}
}
