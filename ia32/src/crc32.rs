//! CRC-32C (Castagnoli) through the SSE4.2 `CRC32` instruction, with a
//! bitwise software fallback.
//!
//! The `crc32c*` functions are raw update steps, exactly like the
//! instruction: no initial or final inversion is applied. The common
//! CRC-32C checksum is `!crc32c(data, !0)`, which [`checksum`] computes.

use crate::cpuid::CpuFeatures;

/// The CRC-32C polynomial, bit-reflected.
pub const POLYNOMIAL: u32 = 0x82F6_3B78;

/// Updates `seed` with `data`, one bit at a time.
///
/// Produces the same result as the hardware range operation.
#[must_use]
pub const fn crc32c_software(data: &[u8], seed: u32) -> u32 {
	let mut crc = seed;
	let mut i = 0;
	while i < data.len() {
		crc ^= data[i] as u32;
		let mut bit = 0;
		while bit < 8 {
			crc = if crc & 1 == 0 {
				crc >> 1
			} else {
				(crc >> 1) ^ POLYNOMIAL
			};
			bit += 1;
		}
		i += 1;
	}
	crc
}

/// Computes the standard CRC-32C checksum of `data`, using the
/// `CRC32` instruction if `features` reports SSE4.2.
#[must_use]
pub fn checksum(features: &CpuFeatures, data: &[u8]) -> u32 {
	#[cfg(target_arch = "x86_64")]
	if features.has_sse42() {
		// SAFETY: SSE4.2 support was just checked.
		return !unsafe { hw::crc32c(data, !0) };
	}
	#[cfg(not(target_arch = "x86_64"))]
	let _ = features;
	!crc32c_software(data, !0)
}

#[cfg(target_arch = "x86_64")]
pub use self::hw::{crc32c, crc32c_u8, crc32c_u16, crc32c_u32, crc32c_u64};

#[cfg(target_arch = "x86_64")]
mod hw {
	#![expect(clippy::inline_always)]

	use core::arch::asm;

	use crate::unroll::unroll_by_8;

	/// Updates `crc` with one byte (`CRC32 r32, r/m8`).
	///
	/// # Safety
	/// Requires SSE4.2.
	#[inline(always)]
	#[must_use]
	pub unsafe fn crc32c_u8(crc: u32, value: u8) -> u32 {
		let mut crc = crc;
		// SAFETY: Offloaded to the caller.
		unsafe {
			asm!(
				"crc32 {crc:e}, {value}",
				crc = inout(reg) crc,
				value = in(reg_byte) value,
				options(pure, nomem, nostack),
			);
		}
		crc
	}

	/// Updates `crc` with one word (`CRC32 r32, r/m16`).
	///
	/// # Safety
	/// Requires SSE4.2.
	#[inline(always)]
	#[must_use]
	pub unsafe fn crc32c_u16(crc: u32, value: u16) -> u32 {
		let mut crc = crc;
		// SAFETY: Offloaded to the caller.
		unsafe {
			asm!(
				"crc32 {crc:e}, {value:x}",
				crc = inout(reg) crc,
				value = in(reg) value,
				options(pure, nomem, nostack),
			);
		}
		crc
	}

	/// Updates `crc` with one doubleword (`CRC32 r32, r/m32`).
	///
	/// # Safety
	/// Requires SSE4.2.
	#[inline(always)]
	#[must_use]
	pub unsafe fn crc32c_u32(crc: u32, value: u32) -> u32 {
		let mut crc = crc;
		// SAFETY: Offloaded to the caller.
		unsafe {
			asm!(
				"crc32 {crc:e}, {value:e}",
				crc = inout(reg) crc,
				value = in(reg) value,
				options(pure, nomem, nostack),
			);
		}
		crc
	}

	/// Updates `crc` with one quadword (`CRC32 r64, r/m64`).
	///
	/// # Safety
	/// Requires SSE4.2.
	#[inline(always)]
	#[must_use]
	pub unsafe fn crc32c_u64(crc: u32, value: u64) -> u32 {
		let mut crc = u64::from(crc);
		// SAFETY: Offloaded to the caller.
		unsafe {
			asm!(
				"crc32 {crc}, {value}",
				crc = inout(reg) crc,
				value = in(reg) value,
				options(pure, nomem, nostack),
			);
		}
		// The 64-bit form zero-extends its 32-bit result.
		crc as u32
	}

	/// Updates `seed` with `data`.
	///
	/// Quadwords are folded eight at a time; the remaining
	/// 4/2/1-byte tail is folded with the narrower forms.
	///
	/// # Safety
	/// Requires SSE4.2.
	#[must_use]
	pub unsafe fn crc32c(data: &[u8], seed: u32) -> u32 {
		let quads = data.len() / 8;
		let mut crc = seed;

		unroll_by_8(quads, |i| {
			let offset = i * 8;
			let mut word = [0; 8];
			word.copy_from_slice(&data[offset..offset + 8]);
			// SAFETY: Offloaded to the caller.
			crc = unsafe { crc32c_u64(crc, u64::from_le_bytes(word)) };
		});

		let mut tail = &data[quads * 8..];
		if tail.len() >= 4 {
			let mut word = [0; 4];
			word.copy_from_slice(&tail[..4]);
			// SAFETY: Offloaded to the caller.
			crc = unsafe { crc32c_u32(crc, u32::from_le_bytes(word)) };
			tail = &tail[4..];
		}
		if tail.len() >= 2 {
			// SAFETY: Offloaded to the caller.
			crc = unsafe { crc32c_u16(crc, u16::from_le_bytes([tail[0], tail[1]])) };
			tail = &tail[2..];
		}
		if let Some(&byte) = tail.first() {
			// SAFETY: Offloaded to the caller.
			crc = unsafe { crc32c_u8(crc, byte) };
		}

		crc
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const CHECK: &[u8] = b"123456789";

	#[test]
	fn software_check_value() {
		assert_eq!(!crc32c_software(CHECK, !0), 0xE306_9283);
		assert_eq!(crc32c_software(&[], 0x1234_5678), 0x1234_5678);
	}

	#[test]
	fn software_concatenates() {
		let (a, b) = CHECK.split_at(4);
		assert_eq!(
			crc32c_software(b, crc32c_software(a, !0)),
			crc32c_software(CHECK, !0)
		);
	}

	#[test]
	fn checksum_without_sse42() {
		assert_eq!(checksum(&CpuFeatures::default(), CHECK), 0xE306_9283);
	}

	#[test]
	#[cfg(target_arch = "x86_64")]
	fn hardware_matches_software() {
		if !std::arch::is_x86_feature_detected!("sse4.2") {
			return;
		}

		let data: std::vec::Vec<u8> = (0..=200_u8).map(|b| b.wrapping_mul(31)).collect();
		// SAFETY: SSE4.2 support was just checked.
		unsafe {
			assert_eq!(!crc32c(CHECK, !0), 0xE306_9283);
			for len in [0, 1, 2, 3, 4, 7, 8, 9, 63, 64, 65, 127, 201] {
				assert_eq!(crc32c(&data[..len], !0), crc32c_software(&data[..len], !0));
			}
			let (a, b) = data.split_at(77);
			assert_eq!(crc32c(b, crc32c(a, 7)), crc32c(&data, 7));
			assert_eq!(crc32c_u8(0, 0x31), crc32c_software(&[0x31], 0));
		}
		assert_eq!(checksum(&CpuFeatures::detect(), CHECK), 0xE306_9283);
	}
}
