//! Exit qualifications.
//!
//! The layout of `EXIT_QUALIFICATION` depends on the basic exit reason;
//! [`ExitQualification::parse`] selects it.

use ia32_macro::bitstruct;

use super::{BasicExitReason, ExitReason};

bitstruct! {
	/// Exit qualification for debug exceptions.
	pub struct DebugQualification(u64) {
		/// Breakpoint conditions `B3`-`B0` that were met.
		pub breakpoints[3:0] => as u8,
		/// A bus lock was asserted (`BLD`).
		pub bus_lock[11] => as bool,
		/// A debug-register access was detected (`BD`).
		pub bd[13] => as bool,
		/// A single-step trap (`BS`).
		pub bs[14] => as bool,
		/// A task switch with the TSS `T` flag set (`BT`).
		pub bt[15] => as bool,
		/// The exception occurred inside an RTM region.
		pub rtm[16] => as bool,
	}
}

bitstruct! {
	/// Exit qualification for task switches.
	pub struct TaskSwitchQualification(u64) {
		/// Selector of the new task's TSS.
		pub selector[15:0] => as u16,
		/// The instruction or event that initiated the switch.
		pub source[31:30] => enum TaskSwitchSource(u8) {
			/// `CALL`.
			Call = 0,
			/// `IRET`.
			Iret = 1,
			/// `JMP`.
			Jmp = 2,
			/// A task gate in the IDT.
			TaskGate = 3,
		},
	}
}

bitstruct! {
	/// Exit qualification for control-register accesses.
	pub struct CrAccessQualification(u64) {
		/// The control register (0 for `CLTS`/`LMSW`).
		pub cr[3:0] => as u8,
		/// The kind of access.
		pub access_type[5:4] => enum CrAccessType(u8) {
			/// `MOV` to the control register.
			MovToCr = 0,
			/// `MOV` from the control register.
			MovFromCr = 1,
			/// `CLTS`.
			Clts = 2,
			/// `LMSW`.
			Lmsw = 3,
		},
		/// The operand type of `LMSW`.
		pub lmsw_operand[6] => enum LmswOperandType(u8) {
			/// A register.
			Register = 0,
			/// Memory.
			Memory = 1,
		},
		/// The general-purpose register of a `MOV CR` (`RAX` = 0 ... `R15` = 15).
		pub gpr[11:8] => as u8,
		/// The source data of `LMSW`.
		pub lmsw_source_data[31:16] => as u16,
	}
}

bitstruct! {
	/// Exit qualification for debug-register accesses.
	pub struct DrAccessQualification(u64) {
		/// The debug register.
		pub dr[2:0] => as u8,
		/// The direction of the `MOV`.
		pub direction[4] => enum DrAccessDirection(u8) {
			/// `MOV` to the debug register.
			MovToDr = 0,
			/// `MOV` from the debug register.
			MovFromDr = 1,
		},
		/// The general-purpose register.
		pub gpr[11:8] => as u8,
	}
}

bitstruct! {
	/// Exit qualification for I/O instructions.
	pub struct IoQualification(u64) {
		/// Size of the access minus one (0, 1 or 3).
		pub size[2:0] => as u8,
		/// The direction of the access.
		pub direction[3] => enum IoDirection(u8) {
			/// `OUT`/`OUTS`.
			Out = 0,
			/// `IN`/`INS`.
			In = 1,
		},
		/// `INS`/`OUTS`.
		pub string[4] => as bool,
		/// `REP`-prefixed.
		pub rep[5] => as bool,
		/// How the port was specified.
		pub operand_encoding[6] => enum IoOperandEncoding(u8) {
			/// In `DX`.
			Dx = 0,
			/// As an immediate.
			Immediate = 1,
		},
		/// The port number.
		pub port[31:16] => as u16,
	}
}

impl IoQualification {
	/// Returns the size of the access in bytes, if it is a defined one.
	#[must_use]
	pub const fn size_bytes(self) -> Option<u8> {
		match self.size() {
			0 => Some(1),
			1 => Some(2),
			3 => Some(4),
			_ => None,
		}
	}
}

bitstruct! {
	/// Exit qualification for APIC-access VM exits.
	pub struct ApicAccessQualification(u64) {
		/// Offset of the access within the APIC page (linear accesses only).
		pub offset[11:0] => as u16,
		/// The kind of access.
		pub access_type[15:12] => enum ApicAccessType(u8) {
			/// Linear access for a data read during instruction execution.
			LinearRead = 0,
			/// Linear access for a data write during instruction execution.
			LinearWrite = 1,
			/// Linear access for an instruction fetch.
			LinearFetch = 2,
			/// Linear access during event delivery.
			LinearEventDelivery = 3,
			/// Guest-physical access during event delivery.
			PhysicalEventDelivery = 10,
			/// Guest-physical access for an instruction fetch or during
			/// instruction execution.
			PhysicalInstruction = 15,
		},
		/// The access was asynchronous to instruction execution.
		pub asynchronous[16] => as bool,
	}
}

bitstruct! {
	/// Exit qualification for EPT violations.
	pub struct EptViolationQualification(u64) {
		/// The access was a data read.
		pub read[0] => as bool,
		/// The access was a data write.
		pub write[1] => as bool,
		/// The access was an instruction fetch.
		pub execute[2] => as bool,
		/// The guest-physical address was readable.
		pub readable[3] => as bool,
		/// The guest-physical address was writable.
		pub writable[4] => as bool,
		/// The guest-physical address was executable (supervisor-mode
		/// when mode-based execute control is enabled).
		pub executable[5] => as bool,
		/// The guest-physical address was user-mode executable.
		pub user_executable[6] => as bool,
		/// `GUEST_LINEAR_ADDRESS` is valid.
		pub guest_linear_address_valid[7] => as bool,
		/// The access was to the translated linear address, rather than
		/// to a paging-structure entry.
		pub caused_by_translation[8] => as bool,
		/// The linear address was a user-mode address.
		pub user_mode_linear_address[9] => as bool,
		/// The page was read/write in the guest paging structures.
		pub readable_writable_page[10] => as bool,
		/// The page was execute-disable in the guest paging structures.
		pub execute_disable_page[11] => as bool,
		/// The violation occurred during an `IRET` that unblocked NMIs.
		pub nmi_unblocking[12] => as bool,
		/// The access was a shadow-stack access.
		pub shadow_stack[13] => as bool,
		/// The guest-physical address was a supervisor shadow-stack page.
		pub supervisor_shadow_stack[14] => as bool,
		/// The access was to a paging-structure entry under guest-paging verification.
		pub guest_paging_verification[15] => as bool,
		/// The access was asynchronous to instruction execution.
		pub asynchronous[16] => as bool,
	}
}

impl EptViolationQualification {
	/// Returns whether the guest-physical address was mapped at all.
	#[must_use]
	pub const fn was_present(self) -> bool {
		self.readable() || self.writable() || self.executable() || self.user_executable()
	}
}

/// An exit qualification decoded according to its exit reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitQualification {
	/// A debug exception (`#DB`).
	Debug(DebugQualification),
	/// The faulting linear address of a page fault (`#PF`).
	PageFault(u64),
	/// A task switch.
	TaskSwitch(TaskSwitchQualification),
	/// A control-register access.
	ControlRegister(CrAccessQualification),
	/// A debug-register access.
	DebugRegister(DrAccessQualification),
	/// An I/O instruction.
	Io(IoQualification),
	/// An APIC access.
	ApicAccess(ApicAccessQualification),
	/// An EPT violation.
	EptViolation(EptViolationQualification),
	/// The linear address operand of `INVLPG`/`INVPCID`, or the
	/// displacement of a memory operand of other instructions.
	Address(u64),
	/// Any other exit; the raw value.
	Other(u64),
}

impl ExitQualification {
	/// Decodes `qualification` for the given exit reason.
	///
	/// Exception exits are returned as [`Self::Other`]; use
	/// [`Self::parse_exception`] with the vector from the exit
	/// interruption information to decode those.
	#[must_use]
	pub const fn parse(reason: ExitReason, qualification: u64) -> Self {
		let Some(basic) = reason.basic() else {
			return Self::Other(qualification);
		};

		match basic {
			BasicExitReason::TaskSwitch => {
				Self::TaskSwitch(TaskSwitchQualification::from_bits(qualification))
			}
			BasicExitReason::ControlRegisterAccess => {
				Self::ControlRegister(CrAccessQualification::from_bits(qualification))
			}
			BasicExitReason::MovDr => {
				Self::DebugRegister(DrAccessQualification::from_bits(qualification))
			}
			BasicExitReason::IoInstruction => Self::Io(IoQualification::from_bits(qualification)),
			BasicExitReason::ApicAccess => {
				Self::ApicAccess(ApicAccessQualification::from_bits(qualification))
			}
			BasicExitReason::EptViolation => {
				Self::EptViolation(EptViolationQualification::from_bits(qualification))
			}
			BasicExitReason::Invlpg
			| BasicExitReason::Invpcid
			| BasicExitReason::Invept
			| BasicExitReason::Invvpid
			| BasicExitReason::GdtrIdtrAccess
			| BasicExitReason::LdtrTrAccess
			| BasicExitReason::Vmclear
			| BasicExitReason::Vmptrld
			| BasicExitReason::Vmptrst
			| BasicExitReason::Vmread
			| BasicExitReason::Vmwrite
			| BasicExitReason::Vmxon
			| BasicExitReason::Xrstors
			| BasicExitReason::Xsaves => Self::Address(qualification),
			_ => Self::Other(qualification),
		}
	}

	/// Decodes the qualification of an exception exit with the given vector.
	#[must_use]
	pub const fn parse_exception(vector: u8, qualification: u64) -> Self {
		match vector {
			1 => Self::Debug(DebugQualification::from_bits(qualification)),
			14 => Self::PageFault(qualification),
			_ => Self::Other(qualification),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn reason(basic: BasicExitReason) -> ExitReason {
		ExitReason::new().with_basic(basic)
	}

	#[test]
	fn cr_access() {
		// mov cr3, rbx
		let q = ExitQualification::parse(reason(BasicExitReason::ControlRegisterAccess), 0x303);
		let ExitQualification::ControlRegister(cr) = q else {
			panic!("{q:?}");
		};
		assert_eq!(cr.cr(), 3);
		assert_eq!(cr.access_type(), CrAccessType::MovToCr);
		assert_eq!(cr.gpr(), 3);

		let lmsw = CrAccessQualification::from_bits(0x0001_0070);
		assert_eq!(lmsw.access_type(), CrAccessType::Lmsw);
		assert_eq!(lmsw.lmsw_operand(), LmswOperandType::Memory);
		assert_eq!(lmsw.lmsw_source_data(), 1);
	}

	#[test]
	fn io() {
		// in al, 0x60
		let q = ExitQualification::parse(reason(BasicExitReason::IoInstruction), 0x0060_0048);
		let ExitQualification::Io(io) = q else {
			panic!("{q:?}");
		};
		assert_eq!(io.size_bytes(), Some(1));
		assert_eq!(io.direction(), IoDirection::In);
		assert_eq!(io.operand_encoding(), IoOperandEncoding::Immediate);
		assert!(!io.string());
		assert_eq!(io.port(), 0x60);

		assert_eq!(IoQualification::from_bits(3).size_bytes(), Some(4));
		assert_eq!(IoQualification::from_bits(2).size_bytes(), None);
	}

	#[test]
	fn ept_violation() {
		let q = ExitQualification::parse(reason(BasicExitReason::EptViolation), 0x182);
		let ExitQualification::EptViolation(v) = q else {
			panic!("{q:?}");
		};
		assert!(v.write());
		assert!(!v.read());
		assert!(v.guest_linear_address_valid());
		assert!(v.caused_by_translation());
		assert!(!v.was_present());
		assert!(EptViolationQualification::from_bits(0x8).was_present());
	}

	#[test]
	fn other_reasons() {
		assert_eq!(
			ExitQualification::parse(reason(BasicExitReason::Cpuid), 7),
			ExitQualification::Other(7)
		);
		assert_eq!(
			ExitQualification::parse(reason(BasicExitReason::Invlpg), 0xFFFF_8000_0000_1000),
			ExitQualification::Address(0xFFFF_8000_0000_1000)
		);
		assert_eq!(
			ExitQualification::parse(ExitReason::from_bits(0xFFFF), 1),
			ExitQualification::Other(1)
		);
	}

	#[test]
	fn exceptions() {
		assert_eq!(
			ExitQualification::parse_exception(14, 0xDEAD_0000),
			ExitQualification::PageFault(0xDEAD_0000)
		);
		let ExitQualification::Debug(db) = ExitQualification::parse_exception(1, 0x4001) else {
			panic!();
		};
		assert!(db.bs());
		assert!(!db.bt());
		assert_eq!(db.breakpoints(), 1);
		assert!(DebugQualification::from_bits(0x8000).bt());
	}

	#[test]
	fn task_switch_and_apic() {
		let ts = TaskSwitchQualification::from_bits(0xC000_0028);
		assert_eq!(ts.selector(), 0x28);
		assert_eq!(ts.source(), TaskSwitchSource::TaskGate);

		let apic = ApicAccessQualification::from_bits(0x10B0);
		assert_eq!(apic.offset(), 0xB0);
		assert_eq!(apic.access_type(), Some(ApicAccessType::LinearWrite));
		assert_eq!(ApicAccessQualification::from_bits(0x4000).access_type(), None);

		let dr = DrAccessQualification::from_bits(0x0217);
		assert_eq!(dr.dr(), 7);
		assert_eq!(dr.direction(), DrAccessDirection::MovFromDr);
		assert_eq!(dr.gpr(), 2);
	}
}
