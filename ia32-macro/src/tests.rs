#![expect(clippy::missing_docs_in_private_items)]

use crate::bitstruct;

bitstruct! {
	/// A register exercising every field kind.
	struct Sample(u32) {
		/// Single flag.
		enable[0] => as bool,
		/// Unshifted-at-zero multi-bit field.
		count[7:4] => as u8,
		/// Exhaustive enum (all four patterns named).
		mode[9:8] => enum Mode(u8) {
			Off = 0,
			Low = 1,
			High = 2,
			Max = 3,
		},
		/// Partial enum.
		kind[13:11] => enum Kind(u8) {
			Alpha = 0,
			Beta = 5,
		},
		_[15] => 1,
		/// Field sharing the repr type.
		upper[31:20] => as u32,
	}
}

bitstruct! {
	/// A 128-bit record, to check wide masks.
	struct Wide(u128) {
		lo[63:0] => as u64,
		hi[127:64] => as u64,
	}
}

bitstruct! {
	/// Snake case names with digits.
	struct Digits(u64) {
		pml4e_address[51:12] => as u64,
		pcd[4] => as bool,
	}
}

bitstruct! {
	/// Field names that share a prefix with record-level constants.
	struct Selector(u32) {
		index[29:0] => as u32,
		fixed[30] => as bool,
		fast[31] => as bool,
	}
}

#[test]
fn field_constants() {
	assert_eq!(Sample::ENABLE_BIT, 0);
	assert_eq!(Sample::ENABLE_MASK, 1);
	assert_eq!(Sample::ENABLE_FLAG, 1);
	assert_eq!(Sample::COUNT_BIT, 4);
	assert_eq!(Sample::COUNT_MASK, 0xF);
	assert_eq!(Sample::COUNT_FLAG, 0xF0);
	assert_eq!(Sample::UPPER_BIT, 20);
	assert_eq!(Sample::UPPER_MASK, 0xFFF);
	assert_eq!(Sample::UPPER_FLAG, 0xFFF0_0000);
	assert_eq!(Digits::PML4E_ADDRESS_BIT, 12);
	assert_eq!(Digits::PCD_FLAG, 1 << 4);
}

#[test]
fn defined_and_reserved_cover_width() {
	assert_eq!(Sample::DEFINED_MASK & Sample::RESERVED_MASK, 0);
	assert_eq!(Sample::DEFINED_MASK | Sample::RESERVED_MASK, u32::MAX);
	assert_eq!(Sample::RESERVED_MASK, 0x000F_440E);
	assert_eq!(Wide::RESERVED_MASK, 0);
	assert_eq!(Wide::WIDTH, 128);
}

#[test]
fn field_masks_are_disjoint() {
	let flags = [
		Sample::ENABLE_FLAG,
		Sample::COUNT_FLAG,
		Sample::MODE_FLAG,
		Sample::KIND_FLAG,
		Sample::UPPER_FLAG,
		Sample::CONST_MASK,
	];
	let union = flags.iter().fold(0, |acc, flag| acc | flag);
	let total: u32 = flags.iter().map(|flag| flag.count_ones()).sum();
	assert_eq!(union, Sample::DEFINED_MASK);
	assert_eq!(total, Sample::DEFINED_MASK.count_ones());
}

#[test]
fn field_named_fixed() {
	assert_eq!(Selector::FIXED_BIT, 30);
	assert_eq!(Selector::FIXED_MASK, 1);
	assert_eq!(Selector::FIXED_FLAG, 1 << 30);
	assert_eq!(Selector::CONST_MASK, 0);
	assert_eq!(Selector::CONST_BITS, 0);
	assert_eq!(Selector::RESERVED_MASK, 0);

	let v = Selector::new().with_index(1).with_fixed(true);
	assert!(v.fixed());
	assert!(!v.fast());
	assert_eq!(v.bits(), 0x4000_0001);
}

#[test]
fn const_fields() {
	assert_eq!(Sample::CONST_MASK, 1 << 15);
	assert_eq!(Sample::CONST_BITS, 1 << 15);
	assert_eq!(Sample::new().bits(), 1 << 15);
	assert_eq!(Sample::default(), Sample::new());
	assert!(Sample::try_from(0_u32).is_err());
	assert_eq!(Sample::try_from(0x8001_u32).map(Sample::enable), Ok(true));
}

#[test]
fn bool_accessors() {
	let v = Sample::new().with_enable(true);
	assert!(v.enable());
	assert!(!v.with_enable(false).enable());

	let mut v = Sample::new();
	v.set_enable(true).set_count(3);
	assert!(v.enable());
	assert_eq!(v.count(), 3);
}

#[test]
fn setters_mask_input() {
	let v = Sample::new().with_count(0xFF);
	assert_eq!(v.count(), 0xF);
	assert!(!v.enable());
	assert_eq!(v.mode(), Mode::Off);

	let v = Sample::new().with_upper(0xFFFF_FFFF);
	assert_eq!(v.upper(), 0xFFF);
	assert_eq!(v.bits() & Sample::RESERVED_MASK, 0);
}

#[test]
fn exhaustive_enum_field() {
	let v = Sample::new().with_mode(Mode::High);
	assert_eq!(v.mode(), Mode::High);
	assert_eq!(v.mode_raw(), 2);
	assert_eq!(v.bits() & Sample::MODE_FLAG, 2 << 8);
	assert_eq!(Mode::from_raw(3), Some(Mode::Max));
	assert_eq!(Mode::from_raw(4), None);
}

#[test]
fn partial_enum_field() {
	let v = Sample::new().with_kind(Kind::Beta);
	assert_eq!(v.kind(), Some(Kind::Beta));
	assert_eq!(v.kind_raw(), 5);

	let v = Sample::from_bits(3 << Sample::KIND_BIT);
	assert_eq!(v.kind(), None);
	assert_eq!(v.kind_raw(), 3);
}

#[test]
fn wide_fields() {
	let v = Wide::new().with_hi(0xDEAD_BEEF).with_lo(u64::MAX);
	assert_eq!(v.hi(), 0xDEAD_BEEF);
	assert_eq!(v.lo(), u64::MAX);
	assert_eq!(u128::from(v) >> 64, 0xDEAD_BEEF);
}

#[test]
fn reserved_bits_are_preserved() {
	let v = Sample::from_bits(0xFFFF_FFFF).with_count(0);
	assert_eq!(v.reserved_bits(), Sample::RESERVED_MASK);
	assert_eq!(format!("{v:x}"), "ffffff0f");
}
