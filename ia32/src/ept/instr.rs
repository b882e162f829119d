//! `INVEPT` and `INVVPID`.

use ia32_test::effect;

use super::{InveptDescriptor, InveptType, InvvpidDescriptor, InvvpidType};
use crate::vmx::{VmxError, status};

/// Invalidates cached EPT-derived translations (`INVEPT`).
///
/// # Safety
/// Must be executed in VMX root operation at CPL 0, with `kind`
/// supported by the processor.
#[inline(always)]
#[effect(invalidate_ept)]
pub unsafe fn invept(kind: InveptType, descriptor: &InveptDescriptor) -> Result<(), VmxError> {
	let cf: u8;
	let zf: u8;
	// SAFETY: Offloaded to the caller.
	unsafe {
		core::arch::asm!(
			"invept {kind}, [{desc}]",
			"setc {cf}",
			"setz {zf}",
			kind = in(reg) kind as u64,
			desc = in(reg) descriptor,
			cf = lateout(reg_byte) cf,
			zf = lateout(reg_byte) zf,
			options(nostack),
		);
	}
	status(cf, zf)
}

/// Invalidates cached VPID-tagged translations (`INVVPID`).
///
/// # Safety
/// Must be executed in VMX root operation at CPL 0, with `kind`
/// supported by the processor.
#[inline(always)]
#[effect(invalidate_vpid)]
pub unsafe fn invvpid(kind: InvvpidType, descriptor: &InvvpidDescriptor) -> Result<(), VmxError> {
	let cf: u8;
	let zf: u8;
	// SAFETY: Offloaded to the caller.
	unsafe {
		core::arch::asm!(
			"invvpid {kind}, [{desc}]",
			"setc {cf}",
			"setz {zf}",
			kind = in(reg) kind as u64,
			desc = in(reg) descriptor,
			cf = lateout(reg_byte) cf,
			zf = lateout(reg_byte) zf,
			options(nostack),
		);
	}
	status(cf, zf)
}
