//! Intel VMX: VMCS field encodings, VM-exit information, the control
//! fields, the VMCS/VMXON region layouts and the VMX instructions.
//!
//! The capability MSRs (`IA32_VMX_*`) live in [`crate::msr`]; EPT lives
//! in [`crate::ept`].

pub mod fields;

mod controls;
mod encoding;
mod error;
mod exit;
mod instr_info;
mod interrupt;
mod qualification;
mod region;

#[cfg(target_arch = "x86_64")]
mod instr;

#[cfg(target_arch = "x86_64")]
pub(crate) use self::instr::status;
#[cfg(target_arch = "x86_64")]
pub use self::instr::{vmclear, vmptrld, vmptrst, vmread, vmwrite, vmxoff, vmxon};
pub use self::{
	controls::{
		EntryControls, ExitControls, PinBasedControls, ProcessorControls, SecondaryControls,
		TertiaryControls,
	},
	encoding::{AccessType, FieldType, FieldWidth, VmcsEncodingError, VmcsFieldEncoding},
	error::{VmInstructionError, VmxError},
	exit::{BasicExitReason, ExitReason},
	instr_info::{
		AddressSize, GdtrIdtrInformation, GdtrIdtrInstruction, InsOutsInformation,
		InstructionInformation, InvalidationInformation, LdtrTrInformation, LdtrTrInstruction,
		MemoryOperandInformation, RandomInformation, RandomOperandSize, SegmentRegister,
		VmreadVmwriteInformation,
	},
	interrupt::{
		ActivityState, EntryInterruptionInfo, ExitInterruptionInfo, IdtVectoringInfo,
		InterruptionType, Interruptibility, PendingDebugExceptions, VirtualizationExceptionInfo,
	},
	qualification::{
		ApicAccessQualification, ApicAccessType, CrAccessQualification, CrAccessType,
		DebugQualification, DrAccessDirection, DrAccessQualification, EptViolationQualification,
		ExitQualification, IoDirection, IoOperandEncoding, IoQualification, LmswOperandType,
		TaskSwitchQualification, TaskSwitchSource,
	},
	region::{VmcsHeader, VmcsRegion, VmxAbort, VmxonRegion},
};
