use ia32_macro::bitstruct;

use super::{SegmentSelector, SystemType};

bitstruct! {
	/// A 16-byte IA-32e interrupt or trap gate.
	///
	/// The handler address is split across three fields; use
	/// [`Self::offset`] and [`Self::with_offset`].
	pub struct IdtGate(u128) {
		/// Handler offset `[15:0]`.
		pub offset_low[15:0] => as u16,
		/// Code segment selector of the handler.
		pub selector[31:16] => as u16,
		/// Interrupt stack table index (0 = do not switch stacks).
		pub ist[34:32] => as u8,
		/// Gate type; see [`SystemType`].
		pub gate_type[43:40] => as u8,
		_[44] => 0,
		/// Descriptor privilege level required to invoke the gate with `INT n`.
		pub dpl[46:45] => as u8,
		/// Gate present.
		pub present[47] => as bool,
		/// Handler offset `[31:16]`.
		pub offset_middle[63:48] => as u16,
		/// Handler offset `[63:32]`.
		pub offset_high[95:64] => as u32,
	}
}

impl IdtGate {
	/// A present interrupt gate (clears `RFLAGS.IF` on entry).
	#[must_use]
	pub const fn interrupt(offset: u64, selector: SegmentSelector) -> Self {
		Self::new()
			.with_offset(offset)
			.with_selector(selector.bits())
			.with_gate_type(SystemType::InterruptGate as u8)
			.with_present(true)
	}

	/// A present trap gate (leaves `RFLAGS.IF` unchanged).
	#[must_use]
	pub const fn trap(offset: u64, selector: SegmentSelector) -> Self {
		Self::new()
			.with_offset(offset)
			.with_selector(selector.bits())
			.with_gate_type(SystemType::TrapGate as u8)
			.with_present(true)
	}

	/// Returns the handler address.
	#[must_use]
	pub const fn offset(self) -> u64 {
		self.offset_low() as u64
			| ((self.offset_middle() as u64) << 16)
			| ((self.offset_high() as u64) << 32)
	}

	/// Returns a copy with the handler address set.
	#[must_use]
	pub const fn with_offset(self, offset: u64) -> Self {
		self.with_offset_low(offset as u16)
			.with_offset_middle((offset >> 16) as u16)
			.with_offset_high((offset >> 32) as u32)
	}

	/// Sets the handler address in place.
	pub fn set_offset(&mut self, offset: u64) -> &mut Self {
		*self = self.with_offset(offset);
		self
	}
}

static_assertions::const_assert_eq!(core::mem::size_of::<IdtGate>(), 16);

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn offset_split() {
		let gate = IdtGate::interrupt(0xFFFF_FFFF_8012_3456, SegmentSelector::gdt(1, 0)).with_ist(2);
		assert_eq!(gate.offset_low(), 0x3456);
		assert_eq!(gate.offset_middle(), 0x8012);
		assert_eq!(gate.offset_high(), 0xFFFF_FFFF);
		assert_eq!(gate.offset(), 0xFFFF_FFFF_8012_3456);
		assert_eq!(gate.selector(), 0x08);
		assert_eq!(gate.bits() as u64, 0x8012_8E02_0008_3456);

		let mut trap = IdtGate::trap(0, SegmentSelector::gdt(1, 0)).with_dpl(3);
		trap.set_offset(0x1234);
		assert_eq!(trap.offset(), 0x1234);
		assert_eq!(SystemType::from_raw(trap.gate_type()), Some(SystemType::TrapGate));
		assert_eq!((trap.bits() >> 40) as u8, 0xEF);
	}
}
