//! Code, data and system segment descriptors.

use ia32_macro::bitstruct;

/// Code and data segment types (descriptor `S` flag set).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum SegmentType {
	/// Read-only data.
	DataReadOnly = 0,
	/// Read-only data, accessed.
	DataReadOnlyAccessed = 1,
	/// Read/write data.
	DataReadWrite = 2,
	/// Read/write data, accessed.
	DataReadWriteAccessed = 3,
	/// Read-only expand-down data.
	DataReadOnlyExpandDown = 4,
	/// Read-only expand-down data, accessed.
	DataReadOnlyExpandDownAccessed = 5,
	/// Read/write expand-down data.
	DataReadWriteExpandDown = 6,
	/// Read/write expand-down data, accessed.
	DataReadWriteExpandDownAccessed = 7,
	/// Execute-only code.
	CodeExecuteOnly = 8,
	/// Execute-only code, accessed.
	CodeExecuteOnlyAccessed = 9,
	/// Execute/read code.
	CodeExecuteRead = 10,
	/// Execute/read code, accessed.
	CodeExecuteReadAccessed = 11,
	/// Execute-only conforming code.
	CodeExecuteOnlyConforming = 12,
	/// Execute-only conforming code, accessed.
	CodeExecuteOnlyConformingAccessed = 13,
	/// Execute/read conforming code.
	CodeExecuteReadConforming = 14,
	/// Execute/read conforming code, accessed.
	CodeExecuteReadConformingAccessed = 15,
}

impl SegmentType {
	/// Converts a 4-bit type value.
	#[must_use]
	pub const fn from_raw(raw: u8) -> Self {
		// SAFETY: Every 4-bit value is a variant.
		unsafe { core::mem::transmute::<u8, Self>(raw & 0xF) }
	}

	/// Returns whether this is a code segment type.
	#[must_use]
	pub const fn is_code(self) -> bool {
		(self as u8) & 0b1000 != 0
	}
}

/// System segment and gate types (descriptor `S` flag clear).
///
/// Values are as interpreted in IA-32e mode, except for the 16-bit and
/// task-gate types that only exist in legacy mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum SystemType {
	/// 16-bit TSS, available (legacy only).
	Tss16Available = 1,
	/// LDT.
	Ldt = 2,
	/// 16-bit TSS, busy (legacy only).
	Tss16Busy = 3,
	/// 16-bit call gate (legacy only).
	CallGate16 = 4,
	/// Task gate (legacy only).
	TaskGate = 5,
	/// 16-bit interrupt gate (legacy only).
	InterruptGate16 = 6,
	/// 16-bit trap gate (legacy only).
	TrapGate16 = 7,
	/// 32/64-bit TSS, available.
	TssAvailable = 9,
	/// 32/64-bit TSS, busy.
	TssBusy = 11,
	/// 32/64-bit call gate.
	CallGate = 12,
	/// 32/64-bit interrupt gate.
	InterruptGate = 14,
	/// 32/64-bit trap gate.
	TrapGate = 15,
}

impl SystemType {
	/// Converts a 4-bit type value; reserved values return `None`.
	#[must_use]
	pub const fn from_raw(raw: u8) -> Option<Self> {
		Some(match raw {
			1 => Self::Tss16Available,
			2 => Self::Ldt,
			3 => Self::Tss16Busy,
			4 => Self::CallGate16,
			5 => Self::TaskGate,
			6 => Self::InterruptGate16,
			7 => Self::TrapGate16,
			9 => Self::TssAvailable,
			11 => Self::TssBusy,
			12 => Self::CallGate,
			14 => Self::InterruptGate,
			15 => Self::TrapGate,
			_ => return None,
		})
	}
}

/// The largest limit that can be expressed with byte granularity.
const BYTE_GRANULAR_MAX: u32 = 0xF_FFFF;

bitstruct! {
	/// An 8-byte code, data or (legacy) system segment descriptor.
	pub struct Descriptor32(u64) {
		/// Segment limit `[15:0]`.
		pub limit_low[15:0] => as u16,
		/// Base address `[15:0]`.
		pub base_low[31:16] => as u16,
		/// Base address `[23:16]`.
		pub base_middle[39:32] => as u8,
		/// Segment type; see [`SegmentType`] and [`SystemType`].
		pub segment_type[43:40] => as u8,
		/// Set for code and data segments, clear for system segments.
		pub descriptor_type[44] => as bool,
		/// Descriptor privilege level.
		pub dpl[46:45] => as u8,
		/// Segment present.
		pub present[47] => as bool,
		/// Segment limit `[19:16]`.
		pub limit_high[51:48] => as u8,
		/// Available for system software.
		pub available[52] => as bool,
		/// 64-bit code segment.
		pub long_mode[53] => as bool,
		/// Default operation size (0 = 16-bit, 1 = 32-bit).
		pub default_big[54] => as bool,
		/// The limit is scaled by 4 KiB.
		pub granularity[55] => as bool,
		/// Base address `[31:24]`.
		pub base_high[63:56] => as u8,
	}
}

impl Descriptor32 {
	/// A 64-bit code segment at the given privilege level.
	#[must_use]
	pub const fn code64(dpl: u8) -> Self {
		Self::new()
			.with_segment_type(SegmentType::CodeExecuteReadAccessed as u8)
			.with_descriptor_type(true)
			.with_dpl(dpl)
			.with_present(true)
			.with_long_mode(true)
	}

	/// A flat read/write data segment at the given privilege level.
	#[must_use]
	pub const fn data(dpl: u8) -> Self {
		Self::new()
			.with_segment_type(SegmentType::DataReadWriteAccessed as u8)
			.with_descriptor_type(true)
			.with_dpl(dpl)
			.with_present(true)
			.with_default_big(true)
			.with_limit(u32::MAX)
	}

	/// Returns the 32-bit base address.
	#[must_use]
	pub const fn base(self) -> u32 {
		self.base_low() as u32 | ((self.base_middle() as u32) << 16) | ((self.base_high() as u32) << 24)
	}

	/// Returns a copy with the base address set.
	#[must_use]
	pub const fn with_base(self, base: u32) -> Self {
		self.with_base_low(base as u16)
			.with_base_middle((base >> 16) as u8)
			.with_base_high((base >> 24) as u8)
	}

	/// Returns the segment limit in bytes, taking granularity into account.
	#[must_use]
	pub const fn limit(self) -> u32 {
		let raw = self.limit_low() as u32 | ((self.limit_high() as u32) << 16);
		if self.granularity() {
			(raw << 12) | 0xFFF
		} else {
			raw
		}
	}

	/// Returns a copy with the limit set to `limit` bytes.
	///
	/// Limits above `0xFFFFF` set the granularity bit and are stored in
	/// 4 KiB units; their low 12 bits are implied to be all ones.
	#[must_use]
	pub const fn with_limit(self, limit: u32) -> Self {
		let (raw, granular) = if limit > BYTE_GRANULAR_MAX {
			(limit >> 12, true)
		} else {
			(limit, false)
		};

		self.with_limit_low(raw as u16)
			.with_limit_high((raw >> 16) as u8)
			.with_granularity(granular)
	}

	/// Sets the limit in place; see [`Self::with_limit`].
	pub fn set_limit(&mut self, limit: u32) -> &mut Self {
		*self = self.with_limit(limit);
		self
	}

	/// Returns the code/data type, or `None` for a system descriptor.
	#[must_use]
	pub const fn code_data_type(self) -> Option<SegmentType> {
		if self.descriptor_type() {
			Some(SegmentType::from_raw(self.segment_type()))
		} else {
			None
		}
	}

	/// Returns the system type, or `None` for a code/data descriptor
	/// or a reserved type value.
	#[must_use]
	pub const fn system_type(self) -> Option<SystemType> {
		if self.descriptor_type() {
			None
		} else {
			SystemType::from_raw(self.segment_type())
		}
	}
}

bitstruct! {
	/// A 16-byte system descriptor (TSS or LDT) in IA-32e mode.
	pub struct SystemDescriptor(u128) {
		/// Segment limit `[15:0]`.
		pub limit_low[15:0] => as u16,
		/// Base address `[15:0]`.
		pub base_low[31:16] => as u16,
		/// Base address `[23:16]`.
		pub base_middle[39:32] => as u8,
		/// System type; see [`SystemType`].
		pub segment_type[43:40] => as u8,
		_[44] => 0,
		/// Descriptor privilege level.
		pub dpl[46:45] => as u8,
		/// Segment present.
		pub present[47] => as bool,
		/// Segment limit `[19:16]`.
		pub limit_high[51:48] => as u8,
		/// Available for system software.
		pub available[52] => as bool,
		/// The limit is scaled by 4 KiB.
		pub granularity[55] => as bool,
		/// Base address `[31:24]`.
		pub base_high[63:56] => as u8,
		/// Base address `[63:32]`.
		pub base_upper[95:64] => as u32,
	}
}

impl SystemDescriptor {
	/// An available 64-bit TSS descriptor covering `size` bytes at `base`.
	///
	/// The limit is `size - 1`; a `size` of 0 yields a limit of 0.
	#[must_use]
	pub const fn tss(base: u64, size: u32) -> Self {
		let limit = size.saturating_sub(1);
		Self::new()
			.with_segment_type(SystemType::TssAvailable as u8)
			.with_present(true)
			.with_base(base)
			.with_limit_low(limit as u16)
			.with_limit_high((limit >> 16) as u8)
	}

	/// Returns the 64-bit base address.
	#[must_use]
	pub const fn base(self) -> u64 {
		self.base_low() as u64
			| ((self.base_middle() as u64) << 16)
			| ((self.base_high() as u64) << 24)
			| ((self.base_upper() as u64) << 32)
	}

	/// Returns a copy with the base address set.
	#[must_use]
	pub const fn with_base(self, base: u64) -> Self {
		self.with_base_low(base as u16)
			.with_base_middle((base >> 16) as u8)
			.with_base_high((base >> 24) as u8)
			.with_base_upper((base >> 32) as u32)
	}

	/// Sets the base address in place.
	pub fn set_base(&mut self, base: u64) -> &mut Self {
		*self = self.with_base(base);
		self
	}

	/// Returns the two GDT slots this descriptor occupies, low first.
	#[must_use]
	pub const fn to_slots(self) -> [u64; 2] {
		[self.0 as u64, (self.0 >> 64) as u64]
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn flat_segments() {
		assert_eq!(Descriptor32::code64(0).bits(), 0x0020_9B00_0000_0000);
		assert_eq!(Descriptor32::code64(3).bits(), 0x0020_FB00_0000_0000);
		assert_eq!(Descriptor32::data(0).bits(), 0x00CF_9300_0000_FFFF);
		assert_eq!(
			Descriptor32::code64(0).code_data_type(),
			Some(SegmentType::CodeExecuteReadAccessed)
		);
		assert!(SegmentType::CodeExecuteOnly.is_code());
		assert!(!SegmentType::DataReadWrite.is_code());
	}

	#[test]
	fn limit_granularity() {
		let mut d = Descriptor32::new();
		d.set_limit(0xF_FFFF);
		assert!(!d.granularity());
		assert_eq!(d.limit(), 0xF_FFFF);

		d.set_limit(0x10_0FFF);
		assert!(d.granularity());
		assert_eq!(d.limit(), 0x10_0FFF);

		d.set_limit(0xFFFF_FFFF);
		assert_eq!(d.limit(), 0xFFFF_FFFF);

		d.set_limit(0x1234);
		assert!(!d.granularity());
		assert_eq!(d.limit(), 0x1234);
	}

	#[test]
	fn base_split() {
		let d = Descriptor32::new().with_base(0x1234_5678);
		assert_eq!(d.base_low(), 0x5678);
		assert_eq!(d.base_middle(), 0x34);
		assert_eq!(d.base_high(), 0x12);
		assert_eq!(d.base(), 0x1234_5678);
	}

	#[test]
	fn tss_descriptor() {
		let mut tss = SystemDescriptor::tss(0xFFFF_8000_1234_5678, 104);
		assert_eq!(tss.base(), 0xFFFF_8000_1234_5678);
		assert_eq!(tss.limit_low(), 103);
		assert_eq!(tss.segment_type(), SystemType::TssAvailable as u8);
		let [low, high] = tss.to_slots();
		assert_eq!(high, 0xFFFF_8000);
		let low = Descriptor32::from_bits(low);
		assert_eq!(low.system_type(), Some(SystemType::TssAvailable));
		assert_eq!(low.base(), 0x1234_5678);

		tss.set_base(0x1000);
		assert_eq!(tss.base_upper(), 0);
		assert_eq!(tss.base(), 0x1000);
		assert_eq!(SystemType::from_raw(8), None);
	}

	#[test]
	fn tss_descriptor_limits() {
		let empty = SystemDescriptor::tss(0x1000, 0);
		assert_eq!(empty.limit_low(), 0);
		assert_eq!(empty.limit_high(), 0);

		let large = SystemDescriptor::tss(0x1000, 0x2_0000);
		assert_eq!(large.limit_low(), 0xFFFF);
		assert_eq!(large.limit_high(), 0x1);
	}
}
