//! Memory types, as used by the PAT, MTRRs, EPT entries and the VMCS.

/// An architectural memory type encoding.
///
/// `UcMinus` is only valid in the PAT; EPT entries and MTRRs use the
/// remaining encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum MemoryType {
	/// Uncacheable.
	Uncacheable    = 0,
	/// Write combining.
	WriteCombining = 1,
	/// Write through.
	WriteThrough   = 4,
	/// Write protected.
	WriteProtected = 5,
	/// Write back.
	WriteBack      = 6,
	/// Uncached; can be overridden by an MTRR write-combining range.
	UcMinus        = 7,
}

impl MemoryType {
	/// Decodes a raw memory-type value.
	#[must_use]
	pub const fn from_raw(value: u8) -> Option<Self> {
		match value {
			0 => Some(Self::Uncacheable),
			1 => Some(Self::WriteCombining),
			4 => Some(Self::WriteThrough),
			5 => Some(Self::WriteProtected),
			6 => Some(Self::WriteBack),
			7 => Some(Self::UcMinus),
			_ => None,
		}
	}

	/// Returns the raw encoding.
	#[must_use]
	pub const fn raw(self) -> u8 {
		self as u8
	}
}

/// The PAT encoding of uncacheable memory.
pub const PAT_UC: u8 = MemoryType::Uncacheable as u8;
/// The PAT encoding of write-combining memory.
pub const PAT_WC: u8 = MemoryType::WriteCombining as u8;
/// The PAT encoding of write-through memory.
pub const PAT_WT: u8 = MemoryType::WriteThrough as u8;
/// The PAT encoding of write-protected memory.
pub const PAT_WP: u8 = MemoryType::WriteProtected as u8;
/// The PAT encoding of write-back memory.
pub const PAT_WB: u8 = MemoryType::WriteBack as u8;
/// The PAT encoding of UC- memory.
pub const PAT_UC_MINUS: u8 = MemoryType::UcMinus as u8;

/// The power-on value of `IA32_PAT`: `WB, WT, UC-, UC` repeated.
pub const PAT_DEFAULT: u64 = 0x0007_0406_0007_0406;

/// Returns the PAT index (0-7) selected by the `PAT`, `PCD` and `PWT`
/// bits of a paging-structure entry.
#[must_use]
pub const fn pat_index(pat: bool, pcd: bool, pwt: bool) -> u8 {
	((pat as u8) << 2) | ((pcd as u8) << 1) | pwt as u8
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn encodings() {
		assert_eq!(PAT_UC, 0);
		assert_eq!(PAT_WC, 1);
		assert_eq!(PAT_WT, 4);
		assert_eq!(PAT_WP, 5);
		assert_eq!(PAT_WB, 6);
		assert_eq!(PAT_UC_MINUS, 7);
		assert_eq!(MemoryType::from_raw(2), None);
		assert_eq!(MemoryType::from_raw(6), Some(MemoryType::WriteBack));
	}

	#[test]
	fn default_pat_entries() {
		let entry = |i: u8| ((PAT_DEFAULT >> (i * 8)) & 0x7) as u8;
		assert_eq!(entry(pat_index(false, false, false)), PAT_WB);
		assert_eq!(entry(pat_index(false, false, true)), PAT_WT);
		assert_eq!(entry(pat_index(false, true, false)), PAT_UC_MINUS);
		assert_eq!(entry(pat_index(false, true, true)), PAT_UC);
		assert_eq!(entry(pat_index(true, false, false)), PAT_WB);
	}
}
