use ia32_macro::bitstruct;

bitstruct! {
	/// A segment selector, as loaded into a segment register.
	pub struct SegmentSelector(u16) {
		/// Requested privilege level.
		pub rpl[1:0] => as u8,
		/// The descriptor table the index refers to.
		pub table[2] => enum TableIndicator(u8) {
			/// Global descriptor table.
			Gdt = 0,
			/// Local descriptor table.
			Ldt = 1,
		},
		/// Index of the descriptor within the table.
		pub index[15:3] => as u16,
	}
}

impl SegmentSelector {
	/// The null selector.
	pub const NULL: Self = Self::new();

	/// Builds a GDT selector from a descriptor index and RPL.
	#[inline]
	#[must_use]
	pub const fn gdt(index: u16, rpl: u8) -> Self {
		Self::new().with_index(index).with_rpl(rpl)
	}

	/// Returns the byte offset of the descriptor within its table.
	#[inline]
	#[must_use]
	pub const fn offset(self) -> usize {
		self.index() as usize * 8
	}

	/// Returns whether this is a null selector (index 0 in the GDT),
	/// regardless of RPL.
	#[inline]
	#[must_use]
	pub const fn is_null(self) -> bool {
		self.bits() & !Self::RPL_FLAG == 0
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn decode() {
		let user_code = SegmentSelector::from_bits(0x2B);
		assert_eq!(user_code.rpl(), 3);
		assert_eq!(user_code.table(), TableIndicator::Gdt);
		assert_eq!(user_code.index(), 5);
		assert_eq!(user_code.offset(), 0x28);
		assert_eq!(SegmentSelector::gdt(5, 3), user_code);

		let ldt = SegmentSelector::new().with_table(TableIndicator::Ldt).with_index(1);
		assert_eq!(ldt.bits(), 0x0C);
		assert!(SegmentSelector::from_bits(3).is_null());
		assert!(!ldt.is_null());
		assert_eq!(SegmentSelector::DEFINED_MASK, u16::MAX);
	}
}
