//! The VMX instructions.
//!
//! Every instruction reports failure through `RFLAGS`: `CF=1` is
//! `VMfailInvalid`, `ZF=1` is `VMfailValid` with the error number in
//! the current VMCS. All of them require VMX root operation at CPL 0
//! (`VMXON` additionally requires `CR4.VMXE` and a locked, enabled
//! `IA32_FEATURE_CONTROL`), and raise `#UD`/`#GP` otherwise.
#![expect(clippy::inline_always)]

use ia32_test::effect;

use super::{VmxError, fields};

/// Converts the `CF`/`ZF` outcome of a VMX instruction.
#[inline(always)]
pub(crate) fn status(cf: u8, zf: u8) -> Result<(), VmxError> {
	if cf != 0 {
		Err(VmxError::FailInvalid)
	} else if zf != 0 {
		Err(VmxError::FailValid {
			number: instruction_error(),
		})
	} else {
		Ok(())
	}
}

/// Reads `VM_INSTRUCTION_ERROR` after a `VMfailValid`.
#[inline(always)]
fn instruction_error() -> u32 {
	let value: u64;
	// SAFETY: Only called after `VMfailValid`, which implies a current VMCS.
	unsafe {
		core::arch::asm!(
			"vmread {value}, {field}",
			field = in(reg) u64::from(fields::VM_INSTRUCTION_ERROR),
			value = lateout(reg) value,
			options(nostack, nomem),
		);
	}
	value as u32
}

/// Enters VMX root operation (`VMXON`).
///
/// # Safety
/// `region` must be the 4 KiB-aligned physical address of a
/// [`VmxonRegion`](super::VmxonRegion) stamped with the processor's
/// revision identifier, which must stay allocated until `VMXOFF`.
#[inline(always)]
#[effect(vmx_state)]
pub unsafe fn vmxon(region: u64) -> Result<(), VmxError> {
	let cf: u8;
	let zf: u8;
	// SAFETY: Offloaded to the caller.
	unsafe {
		core::arch::asm!(
			"vmxon qword ptr [{region}]",
			"setc {cf}",
			"setz {zf}",
			region = in(reg) &raw const region,
			cf = lateout(reg_byte) cf,
			zf = lateout(reg_byte) zf,
			options(nostack),
		);
	}
	status(cf, zf)
}

/// Leaves VMX root operation (`VMXOFF`).
///
/// # Safety
/// No guest may depend on the current VMX state afterwards.
#[inline(always)]
#[effect(vmx_state)]
pub unsafe fn vmxoff() -> Result<(), VmxError> {
	let cf: u8;
	let zf: u8;
	// SAFETY: Offloaded to the caller.
	unsafe {
		core::arch::asm!(
			"vmxoff",
			"setc {cf}",
			"setz {zf}",
			cf = lateout(reg_byte) cf,
			zf = lateout(reg_byte) zf,
			options(nostack),
		);
	}
	status(cf, zf)
}

/// Flushes and deactivates a VMCS, making its launch state clear (`VMCLEAR`).
///
/// # Safety
/// `vmcs` must be the 4 KiB-aligned physical address of a VMCS region.
#[inline(always)]
#[effect(vmx_state)]
pub unsafe fn vmclear(vmcs: u64) -> Result<(), VmxError> {
	let cf: u8;
	let zf: u8;
	// SAFETY: Offloaded to the caller.
	unsafe {
		core::arch::asm!(
			"vmclear qword ptr [{vmcs}]",
			"setc {cf}",
			"setz {zf}",
			vmcs = in(reg) &raw const vmcs,
			cf = lateout(reg_byte) cf,
			zf = lateout(reg_byte) zf,
			options(nostack),
		);
	}
	status(cf, zf)
}

/// Makes a VMCS current and active (`VMPTRLD`).
///
/// # Safety
/// `vmcs` must be the 4 KiB-aligned physical address of a VMCS region
/// stamped with the processor's revision identifier.
#[inline(always)]
#[effect(vmx_state)]
pub unsafe fn vmptrld(vmcs: u64) -> Result<(), VmxError> {
	let cf: u8;
	let zf: u8;
	// SAFETY: Offloaded to the caller.
	unsafe {
		core::arch::asm!(
			"vmptrld qword ptr [{vmcs}]",
			"setc {cf}",
			"setz {zf}",
			vmcs = in(reg) &raw const vmcs,
			cf = lateout(reg_byte) cf,
			zf = lateout(reg_byte) zf,
			options(nostack),
		);
	}
	status(cf, zf)
}

/// Returns the physical address of the current VMCS (`VMPTRST`);
/// `u64::MAX` if there is none.
///
/// # Safety
/// Must be executed in VMX root operation at CPL 0.
#[inline(always)]
#[must_use]
pub unsafe fn vmptrst() -> u64 {
	let mut vmcs = 0_u64;
	// SAFETY: Offloaded to the caller.
	unsafe {
		core::arch::asm!(
			"vmptrst qword ptr [{vmcs}]",
			vmcs = in(reg) &raw mut vmcs,
			options(nostack, preserves_flags),
		);
	}
	vmcs
}

/// Reads a field of the current VMCS (`VMREAD`).
///
/// # Safety
/// Must be executed in VMX root operation at CPL 0.
#[inline(always)]
pub unsafe fn vmread(field: u32) -> Result<u64, VmxError> {
	let value: u64;
	let cf: u8;
	let zf: u8;
	// SAFETY: Offloaded to the caller.
	unsafe {
		core::arch::asm!(
			"vmread {value}, {field}",
			"setc {cf}",
			"setz {zf}",
			field = in(reg) u64::from(field),
			value = lateout(reg) value,
			cf = lateout(reg_byte) cf,
			zf = lateout(reg_byte) zf,
			options(nostack, nomem),
		);
	}
	status(cf, zf).map(|()| value)
}

/// Writes a field of the current VMCS (`VMWRITE`).
///
/// # Safety
/// Must be executed in VMX root operation at CPL 0. The value takes
/// effect on the next VM entry; the caller is responsible for the
/// resulting guest and host state.
#[inline(always)]
#[effect(vmx_state)]
pub unsafe fn vmwrite(field: u32, value: u64) -> Result<(), VmxError> {
	let cf: u8;
	let zf: u8;
	// SAFETY: Offloaded to the caller.
	unsafe {
		core::arch::asm!(
			"vmwrite {field}, {value}",
			"setc {cf}",
			"setz {zf}",
			field = in(reg) u64::from(field),
			value = in(reg) value,
			cf = lateout(reg_byte) cf,
			zf = lateout(reg_byte) zf,
			options(nostack),
		);
	}
	status(cf, zf)
}
