//! Model-specific registers: the address catalog, bit-layout records
//! and the `RDMSR`/`WRMSR` wrappers.
//!
//! Addresses are plain `u32` constants named as in the Intel SDM
//! (`IA32_*` architectural, `MSR_*` model-specific). Records whose
//! address is fixed implement [`ArchitecturalMsr`]; records shared by a
//! bank of MSRs (MTRR pairs, machine-check banks, event selectors)
//! implement only [`MsrValue`] and are used with [`read_msr`]/[`write_msr`]
//! and the bank address helpers.
//!
//! AMD-only registers live in [`amd`].
#![expect(clippy::inline_always)]

#[cfg(target_arch = "x86_64")]
use ia32_test::effect;

pub mod amd;

mod addr;
mod hwp;
mod mca;
mod misc;
mod mtrr;
mod perf;
mod rtit;
mod syscall;
mod thermal;
mod vmx;

pub use self::{
	addr::*,
	hwp::{HwpCapabilities, HwpInterrupt, HwpRequest, HwpStatus},
	mca::{McCtl2, McStatus, McgCap, McgStatus},
	misc::{ApicBase, FeatureControl, MiscEnable, PlatformInfo, SpecCtrl},
	mtrr::{MtrrCap, MtrrDefType, MtrrPhysBase, MtrrPhysMask, Pat},
	perf::{
		DebugCtl, FixedCtrCtrl, PerfCapabilities, PerfCtl, PerfEvtSel, PerfGlobalCtrl,
		PerfGlobalStatus, PerfStatus,
	},
	rtit::{RtitCtl, RtitOutputMaskPtrs, RtitStatus},
	syscall::{Efer, Star},
	thermal::{
		ClockModulation, PackageThermInterrupt, PackageThermStatus, ThermInterrupt, ThermStatus,
	},
	vmx::{
		ControlCapability, ControlsError, EptVpidCap, FixedBits, VmxBasic, VmxMisc, VmxVmfunc,
	},
};

/// A value that can be moved through `RDMSR`/`WRMSR`.
///
/// Implemented for `u64`, for `u32` (the low half; `WRMSR` zeroes the
/// upper half) and for every MSR record.
pub trait MsrValue: Copy {
	/// Converts the raw `edx:eax` value.
	fn from_msr(raw: u64) -> Self;

	/// Converts to the raw `edx:eax` value.
	fn to_msr(self) -> u64;
}

impl MsrValue for u64 {
	#[inline(always)]
	fn from_msr(raw: u64) -> Self {
		raw
	}

	#[inline(always)]
	fn to_msr(self) -> u64 {
		self
	}
}

impl MsrValue for u32 {
	#[inline(always)]
	fn from_msr(raw: u64) -> Self {
		raw as u32
	}

	#[inline(always)]
	fn to_msr(self) -> u64 {
		u64::from(self)
	}
}

/// A record bound to a single MSR address.
pub trait ArchitecturalMsr: MsrValue {
	/// The MSR address.
	const ADDRESS: u32;

	/// Reads the MSR.
	///
	/// Faults (`#GP`) outside of ring 0 or if the MSR is not implemented.
	#[cfg(target_arch = "x86_64")]
	#[inline(always)]
	#[must_use]
	fn load() -> Self {
		read_msr(Self::ADDRESS)
	}

	/// Writes the MSR.
	///
	/// # Safety
	/// Must be executed in ring 0 on a processor implementing the MSR,
	/// and the value must be one the caller is prepared for the processor
	/// to act on (e.g. `IA32_EFER.LME`, `IA32_LSTAR`).
	#[cfg(target_arch = "x86_64")]
	#[inline(always)]
	unsafe fn store(self) {
		// SAFETY: Offloaded to the caller.
		unsafe { write_msr(Self::ADDRESS, self) }
	}
}

/// Implements [`MsrValue`] (and optionally [`ArchitecturalMsr`]) for
/// 64-bit bitstruct records.
macro_rules! msr_value {
	($($ty:ty $(= $addr:expr)?),* $(,)?) => {
		$(
			impl $crate::msr::MsrValue for $ty {
				#[inline(always)]
				fn from_msr(raw: u64) -> Self {
					Self::from_bits(raw)
				}

				#[inline(always)]
				fn to_msr(self) -> u64 {
					self.bits()
				}
			}

			$(
				impl $crate::msr::ArchitecturalMsr for $ty {
					const ADDRESS: u32 = $addr;
				}
			)?
		)*
	};
}

pub(crate) use msr_value;

/// Reads an MSR.
///
/// The asm block is not `nomem`; the compiler will not move memory
/// accesses across it.
///
/// Faults (`#GP`) outside of ring 0 or if the MSR is not implemented.
#[cfg(target_arch = "x86_64")]
#[inline(always)]
#[must_use]
pub fn read_msr<T: MsrValue>(msr: u32) -> T {
	let lo: u32;
	let hi: u32;
	// SAFETY: RDMSR has no memory side effects. Privilege and
	// SAFETY: support violations fault rather than misbehave.
	unsafe {
		core::arch::asm!(
			"rdmsr",
			in("ecx") msr,
			out("eax") lo,
			out("edx") hi,
			options(nostack, preserves_flags),
		);
	}
	T::from_msr((u64::from(hi) << 32) | u64::from(lo))
}

/// Writes an MSR.
///
/// # Safety
/// Must be executed in ring 0 on a processor implementing the MSR.
/// Many MSRs change how the processor executes code (paging, system
/// call entry points, segment bases); the caller is responsible for
/// the consequences of the written value.
#[cfg(target_arch = "x86_64")]
#[inline(always)]
#[effect(write_msr)]
pub unsafe fn write_msr<T: MsrValue>(msr: u32, value: T) {
	let raw = value.to_msr();
	let lo = raw as u32;
	let hi = (raw >> 32) as u32;
	// SAFETY: Offloaded to the caller.
	unsafe {
		core::arch::asm!(
			"wrmsr",
			in("ecx") msr,
			in("eax") lo,
			in("edx") hi,
			options(nostack, preserves_flags),
		);
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn primitive_values() {
		assert_eq!(u64::from_msr(0x1234_5678_9ABC_DEF0), 0x1234_5678_9ABC_DEF0);
		assert_eq!(u32::from_msr(0x1234_5678_9ABC_DEF0), 0x9ABC_DEF0);
		assert_eq!(0xFFFF_FFFF_u32.to_msr(), 0xFFFF_FFFF);
	}

	#[test]
	fn records_carry_addresses() {
		assert_eq!(Efer::ADDRESS, IA32_EFER);
		assert_eq!(ApicBase::ADDRESS, 0x1B);
		assert_eq!(FeatureControl::ADDRESS, 0x3A);
		assert_eq!(VmxBasic::ADDRESS, 0x480);
		assert_eq!(Pat::ADDRESS, 0x277);
		assert_eq!(Efer::from_msr(0xD01).to_msr(), 0xD01);
	}
}
