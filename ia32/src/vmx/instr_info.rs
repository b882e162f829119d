//! VM-exit instruction information (`VMEXIT_INSTRUCTION_INFORMATION`).
//!
//! Like the exit qualification, the layout depends on the exit reason;
//! [`InstructionInformation::parse`] selects it. Register numbers use
//! the `RAX` = 0 ... `R15` = 15 encoding.

use ia32_macro::bitstruct;

use super::{BasicExitReason, ExitReason};

/// The address size of a memory operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum AddressSize {
	/// 16-bit.
	Bits16 = 0,
	/// 32-bit.
	Bits32 = 1,
	/// 64-bit.
	Bits64 = 2,
}

impl AddressSize {
	/// Decodes a raw address size.
	#[must_use]
	pub const fn from_raw(value: u8) -> Option<Self> {
		match value {
			0 => Some(Self::Bits16),
			1 => Some(Self::Bits32),
			2 => Some(Self::Bits64),
			_ => None,
		}
	}
}

/// The segment register of a memory operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum SegmentRegister {
	/// `ES`.
	Es = 0,
	/// `CS`.
	Cs = 1,
	/// `SS`.
	Ss = 2,
	/// `DS`.
	Ds = 3,
	/// `FS`.
	Fs = 4,
	/// `GS`.
	Gs = 5,
}

impl SegmentRegister {
	/// Decodes a raw segment register number.
	#[must_use]
	pub const fn from_raw(value: u8) -> Option<Self> {
		match value {
			0 => Some(Self::Es),
			1 => Some(Self::Cs),
			2 => Some(Self::Ss),
			3 => Some(Self::Ds),
			4 => Some(Self::Fs),
			5 => Some(Self::Gs),
			_ => None,
		}
	}
}

/// Adds the decoded accessors shared by every record with a memory operand.
macro_rules! memory_operand {
	($($ty:ty),* $(,)?) => {
		$(
			impl $ty {
				/// Returns the address size, if it is a defined one.
				#[must_use]
				pub const fn address_size_kind(self) -> Option<AddressSize> {
					AddressSize::from_raw(self.address_size())
				}

				/// Returns the segment register, if it is a defined one.
				#[must_use]
				pub const fn segment_register(self) -> Option<SegmentRegister> {
					SegmentRegister::from_raw(self.segment())
				}
			}
		)*
	};
}

/// Adds the index/base/scale accessors of a full memory operand.
macro_rules! scaled_operand {
	($($ty:ty),* $(,)?) => {
		$(
			impl $ty {
				/// Returns the scale factor applied to the index register (1, 2, 4 or 8).
				#[must_use]
				pub const fn scale(self) -> u8 {
					1 << self.scaling()
				}

				/// Returns the index register, if one is used.
				#[must_use]
				pub const fn index(self) -> Option<u8> {
					if self.index_invalid() { None } else { Some(self.index_reg()) }
				}

				/// Returns the base register, if one is used.
				#[must_use]
				pub const fn base(self) -> Option<u8> {
					if self.base_invalid() { None } else { Some(self.base_reg()) }
				}
			}
		)*
	};
}

bitstruct! {
	/// Instruction information for `INS` and `OUTS`.
	pub struct InsOutsInformation(u32) {
		/// Address size of the string operand.
		pub address_size[9:7] => as u8,
		/// Segment register of the string operand (`OUTS` only).
		pub segment[17:15] => as u8,
	}
}

bitstruct! {
	/// Instruction information for `INVEPT`, `INVPCID` and `INVVPID`.
	pub struct InvalidationInformation(u32) {
		/// Scaling of the index register.
		pub scaling[1:0] => as u8,
		/// Address size.
		pub address_size[9:7] => as u8,
		/// Segment register.
		pub segment[17:15] => as u8,
		/// Index register.
		pub index_reg[21:18] => as u8,
		/// No index register.
		pub index_invalid[22] => as bool,
		/// Base register.
		pub base_reg[26:23] => as u8,
		/// No base register.
		pub base_invalid[27] => as bool,
		/// The register holding the invalidation type.
		pub type_reg[31:28] => as u8,
	}
}

bitstruct! {
	/// Instruction information for `LGDT`, `LIDT`, `SGDT` and `SIDT`.
	pub struct GdtrIdtrInformation(u32) {
		/// Scaling of the index register.
		pub scaling[1:0] => as u8,
		/// Address size.
		pub address_size[9:7] => as u8,
		/// Operand size: clear for 16-bit, set for 32-bit.
		pub operand_size_32[11] => as bool,
		/// Segment register.
		pub segment[17:15] => as u8,
		/// Index register.
		pub index_reg[21:18] => as u8,
		/// No index register.
		pub index_invalid[22] => as bool,
		/// Base register.
		pub base_reg[26:23] => as u8,
		/// No base register.
		pub base_invalid[27] => as bool,
		/// The instruction.
		pub instruction[29:28] => enum GdtrIdtrInstruction(u8) {
			/// `SGDT`.
			Sgdt = 0,
			/// `SIDT`.
			Sidt = 1,
			/// `LGDT`.
			Lgdt = 2,
			/// `LIDT`.
			Lidt = 3,
		},
	}
}

bitstruct! {
	/// Instruction information for `LLDT`, `LTR`, `SLDT` and `STR`.
	pub struct LdtrTrInformation(u32) {
		/// Scaling of the index register.
		pub scaling[1:0] => as u8,
		/// The register operand, when [`Self::register_operand()`] is set.
		pub reg1[6:3] => as u8,
		/// Address size.
		pub address_size[9:7] => as u8,
		/// The operand is a register rather than memory.
		pub register_operand[10] => as bool,
		/// Segment register.
		pub segment[17:15] => as u8,
		/// Index register.
		pub index_reg[21:18] => as u8,
		/// No index register.
		pub index_invalid[22] => as bool,
		/// Base register.
		pub base_reg[26:23] => as u8,
		/// No base register.
		pub base_invalid[27] => as bool,
		/// The instruction.
		pub instruction[29:28] => enum LdtrTrInstruction(u8) {
			/// `SLDT`.
			Sldt = 0,
			/// `STR`.
			Str = 1,
			/// `LLDT`.
			Lldt = 2,
			/// `LTR`.
			Ltr = 3,
		},
	}
}

bitstruct! {
	/// Instruction information for `RDRAND` and `RDSEED`.
	pub struct RandomInformation(u32) {
		/// The destination register.
		pub destination[6:3] => as u8,
		/// The operand size.
		pub operand_size[12:11] => enum RandomOperandSize(u8) {
			/// 16-bit.
			Bits16 = 0,
			/// 32-bit.
			Bits32 = 1,
			/// 64-bit.
			Bits64 = 2,
		},
	}
}

bitstruct! {
	/// Instruction information for `VMCLEAR`, `VMPTRLD`, `VMPTRST`,
	/// `VMXON`, `XRSTORS` and `XSAVES`.
	pub struct MemoryOperandInformation(u32) {
		/// Scaling of the index register.
		pub scaling[1:0] => as u8,
		/// Address size.
		pub address_size[9:7] => as u8,
		/// Segment register.
		pub segment[17:15] => as u8,
		/// Index register.
		pub index_reg[21:18] => as u8,
		/// No index register.
		pub index_invalid[22] => as bool,
		/// Base register.
		pub base_reg[26:23] => as u8,
		/// No base register.
		pub base_invalid[27] => as bool,
	}
}

bitstruct! {
	/// Instruction information for `VMREAD` and `VMWRITE`.
	pub struct VmreadVmwriteInformation(u32) {
		/// Scaling of the index register.
		pub scaling[1:0] => as u8,
		/// The register operand, when [`Self::register_operand()`] is set:
		/// the destination of `VMREAD` or the source of `VMWRITE`.
		pub reg1[6:3] => as u8,
		/// Address size.
		pub address_size[9:7] => as u8,
		/// The value operand is a register rather than memory.
		pub register_operand[10] => as bool,
		/// Segment register.
		pub segment[17:15] => as u8,
		/// Index register.
		pub index_reg[21:18] => as u8,
		/// No index register.
		pub index_invalid[22] => as bool,
		/// Base register.
		pub base_reg[26:23] => as u8,
		/// No base register.
		pub base_invalid[27] => as bool,
		/// The register holding the field encoding.
		pub reg2[31:28] => as u8,
	}
}

memory_operand!(
	InsOutsInformation,
	InvalidationInformation,
	GdtrIdtrInformation,
	LdtrTrInformation,
	MemoryOperandInformation,
	VmreadVmwriteInformation,
);

scaled_operand!(
	InvalidationInformation,
	GdtrIdtrInformation,
	LdtrTrInformation,
	MemoryOperandInformation,
	VmreadVmwriteInformation,
);

/// VM-exit instruction information decoded according to its exit reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstructionInformation {
	/// `INS`/`OUTS`.
	InsOuts(InsOutsInformation),
	/// `INVEPT`/`INVPCID`/`INVVPID`.
	Invalidation(InvalidationInformation),
	/// `LGDT`/`LIDT`/`SGDT`/`SIDT`.
	GdtrIdtr(GdtrIdtrInformation),
	/// `LLDT`/`LTR`/`SLDT`/`STR`.
	LdtrTr(LdtrTrInformation),
	/// `RDRAND`/`RDSEED`.
	Random(RandomInformation),
	/// `VMCLEAR`/`VMPTRLD`/`VMPTRST`/`VMXON`/`XRSTORS`/`XSAVES`.
	MemoryOperand(MemoryOperandInformation),
	/// `VMREAD`/`VMWRITE`.
	VmreadVmwrite(VmreadVmwriteInformation),
	/// Any other exit; the field is undefined.
	Other(u32),
}

impl InstructionInformation {
	/// Decodes `info` for the given exit reason.
	///
	/// For I/O exits the field is only defined for string instructions.
	#[must_use]
	pub const fn parse(reason: ExitReason, info: u32) -> Self {
		let Some(basic) = reason.basic() else {
			return Self::Other(info);
		};

		match basic {
			BasicExitReason::IoInstruction => Self::InsOuts(InsOutsInformation::from_bits(info)),
			BasicExitReason::Invept | BasicExitReason::Invpcid | BasicExitReason::Invvpid => {
				Self::Invalidation(InvalidationInformation::from_bits(info))
			}
			BasicExitReason::GdtrIdtrAccess => Self::GdtrIdtr(GdtrIdtrInformation::from_bits(info)),
			BasicExitReason::LdtrTrAccess => Self::LdtrTr(LdtrTrInformation::from_bits(info)),
			BasicExitReason::Rdrand | BasicExitReason::Rdseed => {
				Self::Random(RandomInformation::from_bits(info))
			}
			BasicExitReason::Vmclear
			| BasicExitReason::Vmptrld
			| BasicExitReason::Vmptrst
			| BasicExitReason::Vmxon
			| BasicExitReason::Xrstors
			| BasicExitReason::Xsaves => Self::MemoryOperand(MemoryOperandInformation::from_bits(info)),
			BasicExitReason::Vmread | BasicExitReason::Vmwrite => {
				Self::VmreadVmwrite(VmreadVmwriteInformation::from_bits(info))
			}
			_ => Self::Other(info),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn parse(basic: BasicExitReason, info: u32) -> InstructionInformation {
		InstructionInformation::parse(ExitReason::new().with_basic(basic), info)
	}

	#[test]
	fn invept_register_operands() {
		// invept rcx, [rax + rdx*4]
		let info = 0x1000_0000 | (2 << 18) | (3 << 15) | (2 << 7) | 2;
		let InstructionInformation::Invalidation(inv) = parse(BasicExitReason::Invept, info) else {
			panic!();
		};
		assert_eq!(inv.scale(), 4);
		assert_eq!(inv.address_size_kind(), Some(AddressSize::Bits64));
		assert_eq!(inv.segment_register(), Some(SegmentRegister::Ds));
		assert_eq!(inv.index(), Some(2));
		assert_eq!(inv.base(), Some(0));
		assert_eq!(inv.type_reg(), 1);
	}

	#[test]
	fn lidt() {
		let info = GdtrIdtrInformation::new()
			.with_instruction(GdtrIdtrInstruction::Lidt)
			.with_index_invalid(true)
			.with_base_reg(5)
			.with_address_size(2)
			.with_segment(2);
		let InstructionInformation::GdtrIdtr(g) = parse(BasicExitReason::GdtrIdtrAccess, info.bits())
		else {
			panic!();
		};
		assert_eq!(g.instruction(), GdtrIdtrInstruction::Lidt);
		assert_eq!(g.index(), None);
		assert_eq!(g.base(), Some(5));
		assert_eq!(g.segment_register(), Some(SegmentRegister::Ss));
	}

	#[test]
	fn vmread_register_form() {
		// vmread rbx, rax
		let info = VmreadVmwriteInformation::new()
			.with_register_operand(true)
			.with_reg1(3)
			.with_reg2(0);
		let InstructionInformation::VmreadVmwrite(v) = parse(BasicExitReason::Vmread, info.bits())
		else {
			panic!();
		};
		assert!(v.register_operand());
		assert_eq!(v.reg1(), 3);
		assert_eq!(v.reg2(), 0);
	}

	#[test]
	fn rdrand() {
		let InstructionInformation::Random(r) = parse(BasicExitReason::Rdrand, 0x1008) else {
			panic!();
		};
		assert_eq!(r.destination(), 1);
		assert_eq!(r.operand_size(), Some(RandomOperandSize::Bits64));
	}

	#[test]
	fn others() {
		assert_eq!(parse(BasicExitReason::Hlt, 5), InstructionInformation::Other(5));
		assert!(matches!(
			parse(BasicExitReason::Xsaves, 0),
			InstructionInformation::MemoryOperand(_)
		));
		assert_eq!(AddressSize::from_raw(3), None);
		assert_eq!(SegmentRegister::from_raw(6), None);
	}
}
