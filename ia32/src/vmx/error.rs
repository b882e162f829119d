//! VMX instruction failures.

/// The VM-instruction error numbers reported in `VM_INSTRUCTION_ERROR`
/// after a `VMfailValid`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
#[repr(u32)]
pub enum VmInstructionError {
	/// `VMCALL` executed in VMX root operation.
	#[error("VMCALL executed in VMX root operation")]
	VmcallInVmxRoot = 1,
	/// `VMCLEAR` with an invalid physical address.
	#[error("VMCLEAR with invalid physical address")]
	VmclearInvalidAddress = 2,
	/// `VMCLEAR` with the VMXON pointer.
	#[error("VMCLEAR with VMXON pointer")]
	VmclearVmxonPointer = 3,
	/// `VMLAUNCH` with a non-clear VMCS.
	#[error("VMLAUNCH with non-clear VMCS")]
	VmlaunchNonClearVmcs = 4,
	/// `VMRESUME` with a non-launched VMCS.
	#[error("VMRESUME with non-launched VMCS")]
	VmresumeNonLaunchedVmcs = 5,
	/// `VMRESUME` after `VMXOFF`.
	#[error("VMRESUME after VMXOFF")]
	VmresumeAfterVmxoff = 6,
	/// VM entry with invalid control fields.
	#[error("VM entry with invalid control field(s)")]
	EntryInvalidControlFields = 7,
	/// VM entry with invalid host-state fields.
	#[error("VM entry with invalid host-state field(s)")]
	EntryInvalidHostState = 8,
	/// `VMPTRLD` with an invalid physical address.
	#[error("VMPTRLD with invalid physical address")]
	VmptrldInvalidAddress = 9,
	/// `VMPTRLD` with the VMXON pointer.
	#[error("VMPTRLD with VMXON pointer")]
	VmptrldVmxonPointer = 10,
	/// `VMPTRLD` with an incorrect VMCS revision identifier.
	#[error("VMPTRLD with incorrect VMCS revision identifier")]
	VmptrldIncorrectRevision = 11,
	/// `VMREAD`/`VMWRITE` of an unsupported VMCS component.
	#[error("VMREAD/VMWRITE from/to unsupported VMCS component")]
	UnsupportedVmcsComponent = 12,
	/// `VMWRITE` to a read-only VMCS component.
	#[error("VMWRITE to read-only VMCS component")]
	VmwriteReadOnlyComponent = 13,
	/// `VMXON` executed in VMX root operation.
	#[error("VMXON executed in VMX root operation")]
	VmxonInVmxRoot = 15,
	/// VM entry with an invalid executive-VMCS pointer.
	#[error("VM entry with invalid executive-VMCS pointer")]
	EntryInvalidExecutiveVmcsPointer = 16,
	/// VM entry with a non-launched executive VMCS.
	#[error("VM entry with non-launched executive VMCS")]
	EntryNonLaunchedExecutiveVmcs = 17,
	/// VM entry with an executive-VMCS pointer that is not the VMXON pointer.
	#[error("VM entry with executive-VMCS pointer not VMXON pointer")]
	EntryExecutiveVmcsPointerNotVmxon = 18,
	/// `VMCALL` with a non-clear VMCS.
	#[error("VMCALL with non-clear VMCS")]
	VmcallNonClearVmcs = 19,
	/// `VMCALL` with invalid VM-exit control fields.
	#[error("VMCALL with invalid VM-exit control fields")]
	VmcallInvalidExitControls = 20,
	/// `VMCALL` with an incorrect MSEG revision identifier.
	#[error("VMCALL with incorrect MSEG revision identifier")]
	VmcallIncorrectMsegRevision = 22,
	/// `VMXOFF` under dual-monitor treatment of SMIs and SMM.
	#[error("VMXOFF under dual-monitor treatment of SMIs and SMM")]
	VmxoffUnderDualMonitor = 23,
	/// `VMCALL` with invalid SMM-monitor features.
	#[error("VMCALL with invalid SMM-monitor features")]
	VmcallInvalidSmmMonitorFeatures = 24,
	/// VM entry with invalid VM-execution controls in the executive VMCS.
	#[error("VM entry with invalid VM-execution control fields in executive VMCS")]
	EntryInvalidExecutiveControls = 25,
	/// VM entry with events blocked by `MOV SS`.
	#[error("VM entry with events blocked by MOV SS")]
	EntryEventsBlockedByMovSs = 26,
	/// Invalid operand to `INVEPT`/`INVVPID`.
	#[error("invalid operand to INVEPT/INVVPID")]
	InvalidInveptInvvpidOperand = 28,
}

impl VmInstructionError {
	/// Decodes a raw error number.
	#[must_use]
	pub const fn from_raw(value: u32) -> Option<Self> {
		Some(match value {
			1 => Self::VmcallInVmxRoot,
			2 => Self::VmclearInvalidAddress,
			3 => Self::VmclearVmxonPointer,
			4 => Self::VmlaunchNonClearVmcs,
			5 => Self::VmresumeNonLaunchedVmcs,
			6 => Self::VmresumeAfterVmxoff,
			7 => Self::EntryInvalidControlFields,
			8 => Self::EntryInvalidHostState,
			9 => Self::VmptrldInvalidAddress,
			10 => Self::VmptrldVmxonPointer,
			11 => Self::VmptrldIncorrectRevision,
			12 => Self::UnsupportedVmcsComponent,
			13 => Self::VmwriteReadOnlyComponent,
			15 => Self::VmxonInVmxRoot,
			16 => Self::EntryInvalidExecutiveVmcsPointer,
			17 => Self::EntryNonLaunchedExecutiveVmcs,
			18 => Self::EntryExecutiveVmcsPointerNotVmxon,
			19 => Self::VmcallNonClearVmcs,
			20 => Self::VmcallInvalidExitControls,
			22 => Self::VmcallIncorrectMsegRevision,
			23 => Self::VmxoffUnderDualMonitor,
			24 => Self::VmcallInvalidSmmMonitorFeatures,
			25 => Self::EntryInvalidExecutiveControls,
			26 => Self::EntryEventsBlockedByMovSs,
			28 => Self::InvalidInveptInvvpidOperand,
			_ => return None,
		})
	}
}

/// The failure conventions of the VMX instructions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum VmxError {
	/// `VMfailInvalid` (`CF=1`): there is no current VMCS to hold an
	/// error number.
	#[error("VMfailInvalid")]
	FailInvalid,
	/// `VMfailValid` (`ZF=1`): the error number was stored in the
	/// current VMCS.
	#[error("VMfailValid: VM-instruction error {number}")]
	FailValid {
		/// The raw `VM_INSTRUCTION_ERROR` value.
		number: u32,
	},
}

impl VmxError {
	/// Returns the decoded VM-instruction error of a `VMfailValid`.
	#[must_use]
	pub const fn instruction_error(self) -> Option<VmInstructionError> {
		match self {
			Self::FailInvalid => None,
			Self::FailValid { number } => VmInstructionError::from_raw(number),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn decode() {
		for raw in 0..64 {
			if let Some(err) = VmInstructionError::from_raw(raw) {
				assert_eq!(err as u32, raw);
			}
		}
		assert_eq!(VmInstructionError::from_raw(14), None);
		assert_eq!(VmInstructionError::from_raw(27), None);
		assert_eq!(
			VmxError::FailValid { number: 7 }.instruction_error(),
			Some(VmInstructionError::EntryInvalidControlFields)
		);
		assert_eq!(VmxError::FailInvalid.instruction_error(), None);
	}

	#[test]
	fn messages() {
		assert_eq!(
			VmInstructionError::VmptrldIncorrectRevision.to_string(),
			"VMPTRLD with incorrect VMCS revision identifier"
		);
		assert_eq!(
			VmxError::FailValid { number: 12 }.to_string(),
			"VMfailValid: VM-instruction error 12"
		);
	}
}
