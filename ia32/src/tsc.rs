//! Time-stamp and performance counters.

#![expect(clippy::inline_always)]

use core::arch::asm;

use ia32_macro::bitstruct;

/// Reads the time-stamp counter (`RDTSC`).
///
/// Not ordered with respect to surrounding instructions; fence with
/// `LFENCE` where ordering matters.
#[inline(always)]
#[must_use]
pub fn rdtsc() -> u64 {
	let (lo, hi): (u32, u32);
	// SAFETY: `RDTSC` only reads the counter.
	unsafe {
		asm!("rdtsc", out("eax") lo, out("edx") hi, options(nostack, nomem, preserves_flags));
	}
	(u64::from(hi) << 32) | u64::from(lo)
}

/// Reads the time-stamp counter and `IA32_TSC_AUX` (`RDTSCP`).
///
/// Waits for all prior instructions to execute before reading the
/// counter. `IA32_TSC_AUX` typically holds the processor number.
///
/// # Safety
/// Requires `CPUID.80000001H:EDX.RDTSCP`.
#[inline(always)]
#[must_use]
pub unsafe fn rdtscp() -> (u64, u32) {
	let (lo, hi, aux): (u32, u32, u32);
	// SAFETY: Offloaded to the caller.
	unsafe {
		asm!(
			"rdtscp",
			out("eax") lo,
			out("edx") hi,
			out("ecx") aux,
			options(nostack, nomem, preserves_flags),
		);
	}
	((u64::from(hi) << 32) | u64::from(lo), aux)
}

bitstruct! {
	/// The `ECX` operand of `RDPMC`.
	pub struct PmcSelector(u32) {
		/// The counter index within its class.
		pub index[29:0] => as u32,
		/// Read a fixed-function counter rather than a general-purpose one.
		pub fixed[30] => as bool,
		/// Read only the low 32 bits (legacy fast read).
		pub fast[31] => as bool,
	}
}

impl PmcSelector {
	/// Selects general-purpose counter `index` (`IA32_PMCx`).
	#[must_use]
	pub const fn general(index: u32) -> Self {
		Self::new().with_index(index)
	}

	/// Selects fixed-function counter `index` (`IA32_FIXED_CTRx`).
	#[must_use]
	pub const fn fixed_function(index: u32) -> Self {
		Self::new().with_index(index).with_fixed(true)
	}
}

/// Reads a performance-monitoring counter (`RDPMC`).
///
/// # Safety
/// Requires ring 0 or `CR4.PCE`, and `counter` must name an existing
/// counter; raises `#GP` otherwise.
#[inline(always)]
#[must_use]
pub unsafe fn rdpmc(counter: PmcSelector) -> u64 {
	let (lo, hi): (u32, u32);
	// SAFETY: Offloaded to the caller.
	unsafe {
		asm!(
			"rdpmc",
			in("ecx") counter.bits(),
			out("eax") lo,
			out("edx") hi,
			options(nostack, nomem, preserves_flags),
		);
	}
	(u64::from(hi) << 32) | u64::from(lo)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::cpuid::CpuFeatures;

	#[test]
	fn tsc_advances() {
		let a = rdtsc();
		let b = rdtsc();
		assert!(b >= a);
	}

	#[test]
	fn rdtscp_when_supported() {
		if !CpuFeatures::detect().has_rdtscp() {
			return;
		}
		let before = rdtsc();
		// SAFETY: Support was just checked.
		let (after, _aux) = unsafe { rdtscp() };
		assert!(after >= before);
	}

	#[test]
	fn pmc_selector() {
		assert_eq!(PmcSelector::fixed_function(1).bits(), 0x4000_0001);
		assert_eq!(PmcSelector::general(3).with_fast(true).bits(), 0x8000_0003);
	}
}
