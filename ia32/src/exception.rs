//! Architectural exception vectors and error codes.

use ia32_macro::bitstruct;

/// The architecturally defined exception vectors.
///
/// Vector 15 and vectors 22-31 are reserved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Exception {
	/// Divide error.
	DivideError               = 0,
	/// Debug exception.
	Debug                     = 1,
	/// Non-maskable interrupt.
	Nmi                       = 2,
	/// Breakpoint (`INT3`).
	Breakpoint                = 3,
	/// Overflow (`INTO`).
	Overflow                  = 4,
	/// `BOUND` range exceeded.
	BoundRange                = 5,
	/// Invalid opcode.
	InvalidOpcode             = 6,
	/// Device not available (no math coprocessor).
	DeviceNotAvailable        = 7,
	/// Double fault.
	DoubleFault               = 8,
	/// Coprocessor segment overrun (not raised after the i386).
	CoprocessorSegmentOverrun = 9,
	/// Invalid TSS.
	InvalidTss                = 10,
	/// Segment not present.
	SegmentNotPresent         = 11,
	/// Stack-segment fault.
	StackSegmentFault         = 12,
	/// General protection.
	GeneralProtection         = 13,
	/// Page fault.
	PageFault                 = 14,
	/// x87 floating-point error.
	X87FloatingPoint          = 16,
	/// Alignment check.
	AlignmentCheck            = 17,
	/// Machine check.
	MachineCheck              = 18,
	/// SIMD floating-point exception.
	SimdFloatingPoint         = 19,
	/// Virtualization exception.
	Virtualization            = 20,
	/// Control-protection exception.
	ControlProtection         = 21,
}

/// How an exception is reported relative to the faulting instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExceptionClass {
	/// Reported before the instruction; the saved `RIP` points at it.
	Fault,
	/// Reported after the instruction; the saved `RIP` points past it.
	Trap,
	/// No reliable restart point.
	Abort,
	/// An external interrupt.
	Interrupt,
}

impl Exception {
	/// Decodes a vector.
	#[must_use]
	pub const fn from_vector(vector: u8) -> Option<Self> {
		Some(match vector {
			0 => Self::DivideError,
			1 => Self::Debug,
			2 => Self::Nmi,
			3 => Self::Breakpoint,
			4 => Self::Overflow,
			5 => Self::BoundRange,
			6 => Self::InvalidOpcode,
			7 => Self::DeviceNotAvailable,
			8 => Self::DoubleFault,
			9 => Self::CoprocessorSegmentOverrun,
			10 => Self::InvalidTss,
			11 => Self::SegmentNotPresent,
			12 => Self::StackSegmentFault,
			13 => Self::GeneralProtection,
			14 => Self::PageFault,
			16 => Self::X87FloatingPoint,
			17 => Self::AlignmentCheck,
			18 => Self::MachineCheck,
			19 => Self::SimdFloatingPoint,
			20 => Self::Virtualization,
			21 => Self::ControlProtection,
			_ => return None,
		})
	}

	/// Returns the vector.
	#[must_use]
	pub const fn vector(self) -> u8 {
		self as u8
	}

	/// Returns the SDM mnemonic (e.g. `#GP`).
	#[must_use]
	pub const fn mnemonic(self) -> &'static str {
		match self {
			Self::DivideError => "#DE",
			Self::Debug => "#DB",
			Self::Nmi => "NMI",
			Self::Breakpoint => "#BP",
			Self::Overflow => "#OF",
			Self::BoundRange => "#BR",
			Self::InvalidOpcode => "#UD",
			Self::DeviceNotAvailable => "#NM",
			Self::DoubleFault => "#DF",
			Self::CoprocessorSegmentOverrun => "#CSO",
			Self::InvalidTss => "#TS",
			Self::SegmentNotPresent => "#NP",
			Self::StackSegmentFault => "#SS",
			Self::GeneralProtection => "#GP",
			Self::PageFault => "#PF",
			Self::X87FloatingPoint => "#MF",
			Self::AlignmentCheck => "#AC",
			Self::MachineCheck => "#MC",
			Self::SimdFloatingPoint => "#XM",
			Self::Virtualization => "#VE",
			Self::ControlProtection => "#CP",
		}
	}

	/// Returns whether the processor pushes an error code.
	#[must_use]
	pub const fn has_error_code(self) -> bool {
		matches!(
			self,
			Self::DoubleFault
				| Self::InvalidTss
				| Self::SegmentNotPresent
				| Self::StackSegmentFault
				| Self::GeneralProtection
				| Self::PageFault
				| Self::AlignmentCheck
				| Self::ControlProtection
		)
	}

	/// Returns how the exception is reported.
	///
	/// `#DB` is a fault for instruction breakpoints and a trap otherwise;
	/// it is reported here as a trap.
	#[must_use]
	pub const fn class(self) -> ExceptionClass {
		match self {
			Self::Nmi => ExceptionClass::Interrupt,
			Self::Debug | Self::Breakpoint | Self::Overflow => ExceptionClass::Trap,
			Self::DoubleFault | Self::MachineCheck => ExceptionClass::Abort,
			_ => ExceptionClass::Fault,
		}
	}
}

bitstruct! {
	/// The error code pushed by `#PF`.
	pub struct PageFaultError(u32) {
		/// The fault was a protection violation rather than a non-present page.
		pub present[0] => as bool,
		/// The access was a write.
		pub write[1] => as bool,
		/// The access was made in user mode.
		pub user[2] => as bool,
		/// A reserved bit was set in a paging-structure entry.
		pub reserved_write[3] => as bool,
		/// The access was an instruction fetch.
		pub instruction_fetch[4] => as bool,
		/// The access violated a protection key.
		pub protection_key[5] => as bool,
		/// The access was a shadow-stack access.
		pub shadow_stack[6] => as bool,
		/// The fault occurred during HLAT paging.
		pub hlat[7] => as bool,
		/// The fault resulted from a violation of SGX access-control requirements.
		pub sgx[15] => as bool,
	}
}

bitstruct! {
	/// The error code pushed by exceptions that relate to a segment
	/// selector or IDT vector (`#TS`, `#NP`, `#SS`, `#GP`).
	pub struct SelectorErrorCode(u32) {
		/// The exception occurred while delivering an external event.
		pub external[0] => as bool,
		/// `index` refers to an IDT gate.
		pub idt[1] => as bool,
		/// `index` refers to the LDT rather than the GDT (only if `idt` is clear).
		pub table_indicator[2] => as bool,
		/// The selector or vector index.
		pub index[15:3] => as u16,
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn vectors_round_trip() {
		for vector in 0..=255_u8 {
			match Exception::from_vector(vector) {
				Some(e) => assert_eq!(e.vector(), vector),
				None => assert!(vector == 15 || vector > 21),
			}
		}
	}

	#[test]
	fn mnemonics() {
		assert_eq!(Exception::GeneralProtection.mnemonic(), "#GP");
		assert_eq!(Exception::from_vector(14).map(Exception::mnemonic), Some("#PF"));
		assert_eq!(Exception::from_vector(20).map(Exception::mnemonic), Some("#VE"));
	}

	#[test]
	fn error_codes_and_classes() {
		assert!(Exception::PageFault.has_error_code());
		assert!(Exception::DoubleFault.has_error_code());
		assert!(!Exception::InvalidOpcode.has_error_code());
		assert_eq!(Exception::Breakpoint.class(), ExceptionClass::Trap);
		assert_eq!(Exception::DoubleFault.class(), ExceptionClass::Abort);
		assert_eq!(Exception::PageFault.class(), ExceptionClass::Fault);
		assert_eq!(Exception::Nmi.class(), ExceptionClass::Interrupt);
	}

	#[test]
	fn page_fault_error() {
		let err = PageFaultError::from_bits(0x0000_8007);
		assert!(err.present());
		assert!(err.write());
		assert!(err.user());
		assert!(!err.instruction_fetch());
		assert!(err.sgx());
		assert_eq!(PageFaultError::new().with_instruction_fetch(true).bits(), 0x10);
	}

	#[test]
	fn selector_error() {
		let err = SelectorErrorCode::from_bits(0x0000_0102);
		assert!(err.idt());
		assert!(!err.external());
		assert_eq!(err.index(), 0x20);
		let gdt = SelectorErrorCode::new().with_index(5);
		assert_eq!(gdt.bits(), 0x28);
	}
}
