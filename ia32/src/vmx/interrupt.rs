//! Event injection, event reporting and guest interruptibility.

use ia32_macro::bitstruct;

bitstruct! {
	/// VM-entry interruption-information field
	/// (`VMENTRY_INTERRUPTION_INFORMATION`): the event injected on entry.
	pub struct EntryInterruptionInfo(u32) {
		/// The interrupt or exception vector.
		pub vector[7:0] => as u8,
		/// The kind of event.
		pub interruption_type[10:8] => enum InterruptionType(u8) {
			/// External interrupt.
			ExternalInterrupt = 0,
			/// Non-maskable interrupt.
			Nmi = 2,
			/// Hardware exception (faults, traps and aborts other than `#BP`/`#OF`).
			HardwareException = 3,
			/// Software interrupt (`INT n`).
			SoftwareInterrupt = 4,
			/// Privileged software exception (`INT1`).
			PrivilegedSoftwareException = 5,
			/// Software exception (`INT3` or `INTO`).
			SoftwareException = 6,
			/// Other event (pending MTF VM exit).
			Other = 7,
		},
		/// Push `VMENTRY_EXCEPTION_ERROR_CODE` on delivery.
		pub deliver_error_code[11] => as bool,
		/// The field is valid; clear to inject nothing.
		pub valid[31] => as bool,
	}
}

impl EntryInterruptionInfo {
	/// Builds a valid injection of `vector` as `ty`.
	#[must_use]
	pub const fn inject(vector: u8, ty: InterruptionType, deliver_error_code: bool) -> Self {
		Self::new()
			.with_vector(vector)
			.with_interruption_type(ty)
			.with_deliver_error_code(deliver_error_code)
			.with_valid(true)
	}
}

bitstruct! {
	/// VM-exit interruption-information field
	/// (`VMEXIT_INTERRUPTION_INFORMATION`): the event that caused the exit.
	pub struct ExitInterruptionInfo(u32) {
		/// The interrupt or exception vector.
		pub vector[7:0] => as u8,
		/// The raw [`InterruptionType`].
		pub interruption_type_raw[10:8] => as u8,
		/// `VMEXIT_INTERRUPTION_ERROR_CODE` holds an error code.
		pub error_code_valid[11] => as bool,
		/// The exit occurred during an `IRET` that unblocked NMIs.
		pub nmi_unblocking[12] => as bool,
		/// The field is valid.
		pub valid[31] => as bool,
	}
}

bitstruct! {
	/// IDT-vectoring information field (`IDT_VECTORING_INFORMATION`):
	/// the event whose delivery the exit interrupted.
	pub struct IdtVectoringInfo(u32) {
		/// The interrupt or exception vector.
		pub vector[7:0] => as u8,
		/// The raw [`InterruptionType`].
		pub interruption_type_raw[10:8] => as u8,
		/// `IDT_VECTORING_ERROR_CODE` holds an error code.
		pub error_code_valid[11] => as bool,
		/// The field is valid.
		pub valid[31] => as bool,
	}
}

impl ExitInterruptionInfo {
	/// Returns the kind of event, if it is a defined one.
	#[must_use]
	pub const fn interruption_type(self) -> Option<InterruptionType> {
		InterruptionType::from_raw(self.interruption_type_raw())
	}
}

impl IdtVectoringInfo {
	/// Returns the kind of event, if it is a defined one.
	#[must_use]
	pub const fn interruption_type(self) -> Option<InterruptionType> {
		InterruptionType::from_raw(self.interruption_type_raw())
	}

	/// Converts the interrupted event into an injection that redelivers it.
	#[must_use]
	pub const fn reinject(self) -> EntryInterruptionInfo {
		EntryInterruptionInfo::from_bits(self.bits() & Self::DEFINED_MASK)
	}
}

bitstruct! {
	/// Guest interruptibility state (`GUEST_INTERRUPTIBILITY_STATE`).
	pub struct Interruptibility(u32) {
		/// Blocking by `STI`.
		pub blocking_by_sti[0] => as bool,
		/// Blocking by `MOV SS` or `POP SS`.
		pub blocking_by_mov_ss[1] => as bool,
		/// Blocking by SMI.
		pub blocking_by_smi[2] => as bool,
		/// Blocking by NMI.
		pub blocking_by_nmi[3] => as bool,
		/// A VM exit saved this state while in enclave mode.
		pub enclave_interruption[4] => as bool,
	}
}

/// Guest activity state (`GUEST_ACTIVITY_STATE`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum ActivityState {
	/// Executing instructions normally.
	Active      = 0,
	/// Halted after `HLT`.
	Hlt         = 1,
	/// Shut down after a triple fault.
	Shutdown    = 2,
	/// Waiting for a start-up IPI.
	WaitForSipi = 3,
}

impl ActivityState {
	/// Decodes a raw activity state.
	#[must_use]
	pub const fn from_raw(value: u32) -> Option<Self> {
		match value {
			0 => Some(Self::Active),
			1 => Some(Self::Hlt),
			2 => Some(Self::Shutdown),
			3 => Some(Self::WaitForSipi),
			_ => None,
		}
	}
}

bitstruct! {
	/// Pending debug exceptions (`GUEST_PENDING_DEBUG_EXCEPTIONS`).
	pub struct PendingDebugExceptions(u64) {
		/// Breakpoint conditions `B3`-`B0` that were met.
		pub breakpoints[3:0] => as u8,
		/// At least one enabled breakpoint condition was met.
		pub enabled_breakpoint[12] => as bool,
		/// A pending single-step trap.
		pub bs[14] => as bool,
		/// A debug exception occurred inside an RTM region.
		pub rtm[16] => as bool,
	}
}

/// The virtualization-exception information area written by the
/// processor when it delivers `#VE`.
///
/// Lives at `VIRTUALIZATION_EXCEPTION_INFORMATION_ADDRESS`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(C)]
pub struct VirtualizationExceptionInfo {
	/// The exit reason of the EPT violation that was converted.
	pub exit_reason:            u32,
	/// `0xFFFF_FFFF` after delivery; software must clear it to allow
	/// another `#VE`.
	pub busy:                   u32,
	/// The exit qualification of the EPT violation.
	pub exit_qualification:     u64,
	/// The guest-linear address.
	pub guest_linear_address:   u64,
	/// The guest-physical address.
	pub guest_physical_address: u64,
	/// The current EPTP index.
	pub eptp_index:             u16,
	/// Reserved.
	pub reserved:               [u8; 6],
}

static_assertions::const_assert_eq!(core::mem::size_of::<VirtualizationExceptionInfo>(), 40);

impl VirtualizationExceptionInfo {
	/// The value of [`Self::busy`] after the processor delivers `#VE`.
	pub const BUSY: u32 = 0xFFFF_FFFF;

	/// Returns whether another `#VE` would be converted to an EPT
	/// violation exit instead of being delivered.
	#[must_use]
	pub const fn is_busy(&self) -> bool {
		self.busy == Self::BUSY
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn inject_page_fault() {
		let pf = EntryInterruptionInfo::inject(14, InterruptionType::HardwareException, true);
		assert_eq!(pf.bits(), 0x8000_0B0E);
		assert_eq!(pf.interruption_type(), Some(InterruptionType::HardwareException));
		assert_eq!(EntryInterruptionInfo::from_bits(0x100).interruption_type(), None);
	}

	#[test]
	fn exit_info() {
		let nmi = ExitInterruptionInfo::from_bits(0x8000_1202);
		assert!(nmi.valid());
		assert!(nmi.nmi_unblocking());
		assert!(!nmi.error_code_valid());
		assert_eq!(nmi.vector(), 2);
		assert_eq!(nmi.interruption_type(), Some(InterruptionType::Nmi));
	}

	#[test]
	fn reinject_vectoring() {
		let gp = IdtVectoringInfo::from_bits(0x8000_0B0D);
		assert_eq!(gp.interruption_type(), Some(InterruptionType::HardwareException));
		let entry = gp.reinject();
		assert_eq!(entry.vector(), 13);
		assert!(entry.deliver_error_code());
		assert!(entry.valid());
		// Bit 12 is undefined in the vectoring field and must not leak.
		assert_eq!(IdtVectoringInfo::from_bits(0x8000_1B0D).reinject(), entry);
	}

	#[test]
	fn interruptibility() {
		let s = Interruptibility::new().with_blocking_by_sti(true).with_blocking_by_nmi(true);
		assert_eq!(s.bits(), 0b1001);
		assert_eq!(ActivityState::from_raw(1), Some(ActivityState::Hlt));
		assert_eq!(ActivityState::from_raw(4), None);
	}

	#[test]
	fn ve_info() {
		let mut info = VirtualizationExceptionInfo::default();
		assert!(!info.is_busy());
		info.busy = VirtualizationExceptionInfo::BUSY;
		assert!(info.is_busy());
		assert_eq!(core::mem::offset_of!(VirtualizationExceptionInfo, eptp_index), 32);
	}
}
