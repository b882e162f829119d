use ia32_macro::bitstruct;

use super::SegmentType;

bitstruct! {
	/// Segment access rights.
	///
	/// This is the layout of the VMCS guest access-rights fields; `LAR`
	/// returns the same bits shifted left by 8 (see [`Self::from_lar`]).
	pub struct AccessRights(u32) {
		/// Segment type.
		pub segment_type[3:0] => as u8,
		/// Set for code and data segments.
		pub descriptor_type[4] => as bool,
		/// Descriptor privilege level.
		pub dpl[6:5] => as u8,
		/// Segment present.
		pub present[7] => as bool,
		/// Available for system software.
		pub available[12] => as bool,
		/// 64-bit code segment.
		pub long_mode[13] => as bool,
		/// Default operation size.
		pub default_big[14] => as bool,
		/// Limit granularity.
		pub granularity[15] => as bool,
		/// The segment register is unusable (VMCS only).
		pub unusable[16] => as bool,
	}
}

impl AccessRights {
	/// The access rights of an unusable segment register.
	pub const UNUSABLE: Self = Self::new().with_unusable(true);

	/// Converts the value `LAR` writes to its destination.
	#[must_use]
	pub const fn from_lar(raw: u32) -> Self {
		Self::from_bits((raw >> 8) & 0xF0FF)
	}

	/// Returns the code/data type, or `None` for a system segment.
	#[must_use]
	pub const fn code_data_type(self) -> Option<SegmentType> {
		if self.descriptor_type() {
			Some(SegmentType::from_raw(self.segment_type()))
		} else {
			None
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn from_lar() {
		// Flat 64-bit ring 3 code segment.
		let ar = AccessRights::from_lar(0x0020_FB00);
		assert!(ar.present());
		assert!(ar.long_mode());
		assert_eq!(ar.dpl(), 3);
		assert_eq!(ar.code_data_type(), Some(SegmentType::CodeExecuteReadAccessed));
		assert!(!ar.unusable());
		assert_eq!(AccessRights::UNUSABLE.bits(), 0x1_0000);
	}
}
