//! SSE4.2 packed string comparisons (`PCMPESTRI`, `PCMPESTRM`,
//! `PCMPISTRI`, `PCMPISTRM`).
//!
//! The instructions are controlled by an immediate [`PcmpMode`] byte,
//! passed to the wrappers as a const generic so it is encoded into the
//! instruction:
//!
//! ```ignore
//! const FIND_ANY: u8 = PcmpMode::new()
//! 	.with_format(DataFormat::UnsignedBytes)
//! 	.with_operation(Comparison::EqualAny)
//! 	.bits();
//! let (index, flags) = unsafe { pcmpistri::<FIND_ANY>(&set, &haystack) };
//! ```
//!
//! The `A`/`C`/`O`/`S`/`Z` forms of the intrinsics correspond to the
//! predicates of [`CompareFlags`] returned alongside every result.

use ia32_macro::bitstruct;

bitstruct! {
	/// The immediate control byte of the `PCMPxSTRx` instructions.
	pub struct PcmpMode(u8) {
		/// The element type of both operands.
		pub format[1:0] => enum DataFormat(u8) {
			/// 16 unsigned bytes.
			UnsignedBytes = 0,
			/// 8 unsigned words.
			UnsignedWords = 1,
			/// 16 signed bytes.
			SignedBytes = 2,
			/// 8 signed words.
			SignedWords = 3,
		},
		/// How elements of the two operands are compared (aggregation).
		pub operation[3:2] => enum Comparison(u8) {
			/// Each element of the second operand is tested against
			/// every element of the first (a character set).
			EqualAny = 0,
			/// Each element of the second operand is tested against
			/// the inclusive ranges given by pairs in the first.
			Ranges = 1,
			/// Elements at the same position are compared (`strcmp`).
			EqualEach = 2,
			/// The first operand is searched for as a substring of the
			/// second (`strstr`).
			EqualOrdered = 3,
		},
		/// How the intermediate result is negated.
		pub polarity[5:4] => enum Polarity(u8) {
			/// Keep the result.
			Positive = 0,
			/// Negate every bit.
			Negative = 1,
			/// Keep the result.
			MaskedPositive = 2,
			/// Negate only bits for valid elements of the second operand.
			MaskedNegative = 3,
		},
		/// For the index forms, which set bit is reported; for the mask
		/// forms, whether the mask is expanded to whole elements.
		pub output[6] => enum OutputSelection(u8) {
			/// Index: least significant set bit. Mask: bit mask in the low bits.
			Least = 0,
			/// Index: most significant set bit. Mask: element-wide mask.
			Most = 1,
		},
	}
}

impl DataFormat {
	/// Returns the number of elements per 128-bit operand.
	#[must_use]
	pub const fn elements(self) -> u32 {
		match self {
			Self::UnsignedBytes | Self::SignedBytes => 16,
			Self::UnsignedWords | Self::SignedWords => 8,
		}
	}
}

/// The flags set by a `PCMPxSTRx` instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CompareFlags {
	/// `CF`: the result is non-zero (`*STRC`).
	pub carry:    bool,
	/// `ZF`: the second operand ends within the 16 bytes (`*STRZ`).
	pub zero:     bool,
	/// `SF`: the first operand ends within the 16 bytes (`*STRS`).
	pub sign:     bool,
	/// `OF`: bit 0 of the result (`*STRO`).
	pub overflow: bool,
}

impl CompareFlags {
	/// `CF = 0 && ZF = 0` (`*STRA`): no match, and the second operand
	/// continues past this block.
	#[must_use]
	pub const fn above(self) -> bool {
		!self.carry && !self.zero
	}
}

#[cfg(target_arch = "x86_64")]
pub use self::instr::{pcmpestri, pcmpestrm, pcmpistri, pcmpistrm};

#[cfg(target_arch = "x86_64")]
mod instr {
	#![expect(clippy::inline_always)]

	use core::arch::asm;

	use super::CompareFlags;

	/// Builds the flags from their `SETcc` outputs.
	#[inline(always)]
	fn flags(cf: u8, zf: u8, sf: u8, of: u8) -> CompareFlags {
		CompareFlags {
			carry:    cf != 0,
			zero:     zf != 0,
			sign:     sf != 0,
			overflow: of != 0,
		}
	}

	/// Compares null-terminated operands and returns an index
	/// (`PCMPISTRI`).
	///
	/// The index is the number of elements (16 or 8) if the result is zero.
	///
	/// # Safety
	/// Requires SSE4.2.
	#[inline(always)]
	#[must_use]
	pub unsafe fn pcmpistri<const MODE: u8>(a: &[u8; 16], b: &[u8; 16]) -> (u32, CompareFlags) {
		let index: u32;
		let (cf, zf, sf, of): (u8, u8, u8, u8);
		// SAFETY: Offloaded to the caller; both operands are 16 readable bytes.
		unsafe {
			asm!(
				"movdqu {xa}, xmmword ptr [{a}]",
				"pcmpistri {xa}, xmmword ptr [{b}], {mode}",
				"setc {cf}",
				"setz {zf}",
				"sets {sf}",
				"seto {of}",
				a = in(reg) a.as_ptr(),
				b = in(reg) b.as_ptr(),
				mode = const MODE,
				xa = out(xmm_reg) _,
				out("ecx") index,
				cf = out(reg_byte) cf,
				zf = out(reg_byte) zf,
				sf = out(reg_byte) sf,
				of = out(reg_byte) of,
				options(nostack, readonly),
			);
		}
		(index, flags(cf, zf, sf, of))
	}

	/// Compares null-terminated operands and returns a mask
	/// (`PCMPISTRM`).
	///
	/// # Safety
	/// Requires SSE4.2.
	#[inline(always)]
	#[must_use]
	pub unsafe fn pcmpistrm<const MODE: u8>(a: &[u8; 16], b: &[u8; 16]) -> ([u8; 16], CompareFlags) {
		let mut mask = [0_u8; 16];
		let (cf, zf, sf, of): (u8, u8, u8, u8);
		// SAFETY: Offloaded to the caller; all three buffers are 16 bytes.
		unsafe {
			asm!(
				"movdqu {xa}, xmmword ptr [{a}]",
				"pcmpistrm {xa}, xmmword ptr [{b}], {mode}",
				"setc {cf}",
				"setz {zf}",
				"sets {sf}",
				"seto {of}",
				"movdqu xmmword ptr [{mask}], xmm0",
				a = in(reg) a.as_ptr(),
				b = in(reg) b.as_ptr(),
				mask = in(reg) mask.as_mut_ptr(),
				mode = const MODE,
				xa = out(xmm_reg) _,
				out("xmm0") _,
				cf = out(reg_byte) cf,
				zf = out(reg_byte) zf,
				sf = out(reg_byte) sf,
				of = out(reg_byte) of,
				options(nostack),
			);
		}
		(mask, flags(cf, zf, sf, of))
	}

	/// Compares explicit-length operands and returns an index
	/// (`PCMPESTRI`).
	///
	/// Lengths are in elements; their absolute values saturate at the
	/// element count.
	///
	/// # Safety
	/// Requires SSE4.2.
	#[inline(always)]
	#[must_use]
	pub unsafe fn pcmpestri<const MODE: u8>(
		a: &[u8; 16],
		a_len: i32,
		b: &[u8; 16],
		b_len: i32,
	) -> (u32, CompareFlags) {
		let index: u32;
		let (cf, zf, sf, of): (u8, u8, u8, u8);
		// SAFETY: Offloaded to the caller; both operands are 16 readable bytes.
		unsafe {
			asm!(
				"movdqu {xa}, xmmword ptr [{a}]",
				"pcmpestri {xa}, xmmword ptr [{b}], {mode}",
				"setc {cf}",
				"setz {zf}",
				"sets {sf}",
				"seto {of}",
				a = in(reg) a.as_ptr(),
				b = in(reg) b.as_ptr(),
				mode = const MODE,
				xa = out(xmm_reg) _,
				in("eax") a_len,
				in("edx") b_len,
				out("ecx") index,
				cf = out(reg_byte) cf,
				zf = out(reg_byte) zf,
				sf = out(reg_byte) sf,
				of = out(reg_byte) of,
				options(nostack, readonly),
			);
		}
		(index, flags(cf, zf, sf, of))
	}

	/// Compares explicit-length operands and returns a mask
	/// (`PCMPESTRM`).
	///
	/// # Safety
	/// Requires SSE4.2.
	#[inline(always)]
	#[must_use]
	pub unsafe fn pcmpestrm<const MODE: u8>(
		a: &[u8; 16],
		a_len: i32,
		b: &[u8; 16],
		b_len: i32,
	) -> ([u8; 16], CompareFlags) {
		let mut mask = [0_u8; 16];
		let (cf, zf, sf, of): (u8, u8, u8, u8);
		// SAFETY: Offloaded to the caller; all three buffers are 16 bytes.
		unsafe {
			asm!(
				"movdqu {xa}, xmmword ptr [{a}]",
				"pcmpestrm {xa}, xmmword ptr [{b}], {mode}",
				"setc {cf}",
				"setz {zf}",
				"sets {sf}",
				"seto {of}",
				"movdqu xmmword ptr [{mask}], xmm0",
				a = in(reg) a.as_ptr(),
				b = in(reg) b.as_ptr(),
				mask = in(reg) mask.as_mut_ptr(),
				mode = const MODE,
				xa = out(xmm_reg) _,
				in("eax") a_len,
				in("edx") b_len,
				out("xmm0") _,
				cf = out(reg_byte) cf,
				zf = out(reg_byte) zf,
				sf = out(reg_byte) sf,
				of = out(reg_byte) of,
				options(nostack),
			);
		}
		(mask, flags(cf, zf, sf, of))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const EQUAL_ANY: u8 = PcmpMode::new()
		.with_format(DataFormat::UnsignedBytes)
		.with_operation(Comparison::EqualAny)
		.bits();
	const RANGES: u8 = PcmpMode::new().with_operation(Comparison::Ranges).bits();
	const EXPANDED_ANY: u8 = PcmpMode::new()
		.with_operation(Comparison::EqualAny)
		.with_output(OutputSelection::Most)
		.bits();
	const STRCMP: u8 = PcmpMode::new()
		.with_operation(Comparison::EqualEach)
		.with_polarity(Polarity::MaskedNegative)
		.bits();

	/// Copies `s` into a zero-padded operand.
	fn operand(s: &[u8]) -> [u8; 16] {
		let mut op = [0; 16];
		op[..s.len()].copy_from_slice(s);
		op
	}

	#[test]
	fn mode_byte() {
		assert_eq!(EQUAL_ANY, 0x00);
		assert_eq!(RANGES, 0x04);
		assert_eq!(STRCMP, 0x38);
		assert_eq!(PcmpMode::RESERVED_MASK, 0x80);
		let mode = PcmpMode::from_bits(0x4D);
		assert_eq!(mode.format(), DataFormat::UnsignedWords);
		assert_eq!(mode.operation(), Comparison::EqualOrdered);
		assert_eq!(mode.polarity(), Polarity::Positive);
		assert_eq!(mode.output(), OutputSelection::Most);
		assert_eq!(mode.format().elements(), 8);
	}

	#[test]
	fn above() {
		assert!(CompareFlags::default().above());
		let matched = CompareFlags {
			carry: true,
			..CompareFlags::default()
		};
		assert!(!matched.above());
	}

	#[test]
	#[cfg(target_arch = "x86_64")]
	fn implicit_length() {
		if !std::arch::is_x86_feature_detected!("sse4.2") {
			return;
		}

		// SAFETY: SSE4.2 support was just checked.
		unsafe {
			let (index, flags) = pcmpistri::<EQUAL_ANY>(&operand(b"o"), &operand(b"hello world"));
			assert_eq!(index, 4);
			assert!(flags.carry);
			assert!(flags.zero);
			assert!(flags.sign);

			let (index, flags) = pcmpistri::<RANGES>(&operand(b"az"), &operand(b"HELLO world"));
			assert_eq!(index, 6);
			assert!(!flags.above());

			let (index, flags) = pcmpistri::<EQUAL_ANY>(&operand(b"q"), &operand(b"hello"));
			assert_eq!(index, 16);
			assert!(!flags.carry);

			let (index, _) = pcmpistri::<STRCMP>(&operand(b"abc"), &operand(b"abd"));
			assert_eq!(index, 2);

			let (mask, _) = pcmpistrm::<EQUAL_ANY>(&operand(b"lo"), &operand(b"hello"));
			assert_eq!(u16::from_le_bytes([mask[0], mask[1]]), 0b1_1100);
			assert!(mask[2..].iter().all(|&b| b == 0));

			let (mask, _) = pcmpistrm::<EXPANDED_ANY>(&operand(b"lo"), &operand(b"hello"));
			assert_eq!(&mask[..6], &[0, 0, 0xFF, 0xFF, 0xFF, 0]);
		}
	}

	#[test]
	#[cfg(target_arch = "x86_64")]
	fn explicit_length() {
		if !std::arch::is_x86_feature_detected!("sse4.2") {
			return;
		}

		let haystack = *b"hello, xxxxxxxxx";
		// SAFETY: SSE4.2 support was just checked.
		unsafe {
			let (index, flags) = pcmpestri::<EQUAL_ANY>(&operand(b"lo"), 2, &haystack, 5);
			assert_eq!(index, 2);
			assert!(flags.zero);

			let (index, flags) = pcmpestri::<EQUAL_ANY>(&operand(b"x"), 1, &haystack, 5);
			assert_eq!(index, 16);
			assert!(!flags.carry);

			let (mask, flags) = pcmpestrm::<EQUAL_ANY>(&operand(b"x"), 1, &haystack, 16);
			assert_eq!(u16::from_le_bytes([mask[0], mask[1]]), 0xFF80);
			assert!(!flags.zero);
		}
	}
}
