//! The VMCS component encoding passed to `VMREAD`/`VMWRITE`.

use ia32_macro::bitstruct;

bitstruct! {
	/// A 32-bit VMCS component encoding.
	///
	/// Bit 12 and bits 31:15 are reserved and must be zero; use
	/// [`VmcsFieldEncoding::parse`] to validate an untrusted value.
	pub struct VmcsFieldEncoding(u32) {
		/// Selects the full field or the high 32 bits of a 64-bit field.
		pub access_type[0] => enum AccessType(u8) {
			/// The full field.
			Full = 0,
			/// The high 32 bits of a 64-bit field.
			High = 1,
		},
		/// Index of the field within its width/type group.
		pub index[9:1] => as u16,
		/// The VMCS area holding the field.
		pub field_type[11:10] => enum FieldType(u8) {
			/// VM-execution, VM-exit and VM-entry control fields.
			Control = 0,
			/// VM-exit information fields (read-only unless the
			/// processor allows writing them).
			ReadOnly = 1,
			/// Guest-state area.
			GuestState = 2,
			/// Host-state area.
			HostState = 3,
		},
		/// The width of the field.
		pub width[14:13] => enum FieldWidth(u8) {
			/// 16-bit.
			Word = 0,
			/// 64-bit.
			Qword = 1,
			/// 32-bit.
			Dword = 2,
			/// Natural width: 64 bits on processors supporting Intel 64.
			Natural = 3,
		},
	}
}

impl FieldWidth {
	/// Returns the width of a field, in bytes, on an Intel 64 processor.
	#[must_use]
	pub const fn bytes(self) -> usize {
		match self {
			Self::Word => 2,
			Self::Dword => 4,
			Self::Qword | Self::Natural => 8,
		}
	}
}

/// Error returned when a value is not a well-formed VMCS component encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum VmcsEncodingError {
	/// Reserved bits (bit 12 or bits 31:15) are set.
	#[error("VMCS field encoding has reserved bits {bits:#x} set")]
	ReservedBits {
		/// The offending bits.
		bits: u32,
	},
	/// High access was requested on a field that is not 64 bits wide.
	#[error("high access is only defined for 64-bit VMCS fields")]
	HighAccessNotQword,
}

impl VmcsFieldEncoding {
	/// Builds an encoding from its components.
	#[must_use]
	pub const fn encode(
		access_type: AccessType,
		index: u16,
		field_type: FieldType,
		width: FieldWidth,
	) -> Self {
		Self::new()
			.with_access_type(access_type)
			.with_index(index)
			.with_field_type(field_type)
			.with_width(width)
	}

	/// Validates a raw encoding.
	///
	/// # Errors
	/// Fails if reserved bits are set, or if the high half of a field
	/// that is not 64 bits wide is requested.
	pub const fn parse(raw: u32) -> Result<Self, VmcsEncodingError> {
		let this = Self::from_bits(raw);

		let bits = this.reserved_bits();
		if bits != 0 {
			return Err(VmcsEncodingError::ReservedBits { bits });
		}

		if matches!(this.access_type(), AccessType::High)
			&& !matches!(this.width(), FieldWidth::Qword)
		{
			return Err(VmcsEncodingError::HighAccessNotQword);
		}

		Ok(this)
	}

	/// Returns the encoding of the high 32 bits of this 64-bit field.
	#[must_use]
	pub const fn high(self) -> Self {
		self.with_access_type(AccessType::High)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn guest_rip() {
		let rip = VmcsFieldEncoding::parse(0x681E).unwrap();
		assert_eq!(rip.access_type(), AccessType::Full);
		assert_eq!(rip.index(), 15);
		assert_eq!(rip.field_type(), FieldType::GuestState);
		assert_eq!(rip.width(), FieldWidth::Natural);
		assert_eq!(rip.width_raw(), 3);
		assert_eq!(rip.field_type_raw(), 2);

		let again =
			VmcsFieldEncoding::encode(AccessType::Full, 15, FieldType::GuestState, FieldWidth::Natural);
		assert_eq!(again.bits(), 0x681E);
	}

	#[test]
	fn high_access() {
		let tsc_offset = VmcsFieldEncoding::parse(0x2010).unwrap();
		assert_eq!(tsc_offset.width(), FieldWidth::Qword);
		assert_eq!(tsc_offset.high().bits(), 0x2011);
		assert!(VmcsFieldEncoding::parse(0x2011).is_ok());

		assert_eq!(
			VmcsFieldEncoding::parse(0x4003),
			Err(VmcsEncodingError::HighAccessNotQword)
		);
	}

	#[test]
	fn reserved_bits() {
		assert_eq!(VmcsFieldEncoding::RESERVED_MASK, 0xFFFF_9000);
		assert_eq!(
			VmcsFieldEncoding::parse(0x1000),
			Err(VmcsEncodingError::ReservedBits { bits: 0x1000 })
		);
		assert_eq!(
			VmcsFieldEncoding::parse(0xFF00_6000),
			Err(VmcsEncodingError::ReservedBits { bits: 0xFF00_0000 })
		);
	}

	#[test]
	fn widths() {
		assert_eq!(FieldWidth::Word.bytes(), 2);
		assert_eq!(FieldWidth::Dword.bytes(), 4);
		assert_eq!(FieldWidth::Qword.bytes(), 8);
		assert_eq!(FieldWidth::Natural.bytes(), 8);
	}
}
