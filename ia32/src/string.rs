//! `REP`-prefixed string instructions.
//!
//! Every wrapper clears the direction flag first, so strings are always
//! processed in ascending address order. Counts are in elements, not
//! bytes.

#![expect(clippy::inline_always)]

use core::arch::asm;

/// Declares the string wrappers for one element width.
macro_rules! string_ops {
	(
		$ty:ty, $acc:tt,
		$movs:ident = $movs_insn:literal,
		$stos:ident = $stos_insn:literal,
		$lods:ident = $lods_insn:literal,
		$scas:ident = $scas_insn:literal,
		$cmps:ident = $cmps_insn:literal $(,)?
	) => {
		#[doc = concat!("Copies `count` elements from `src` to `dst` (`REP ", $movs_insn, "`).")]
		///
		/// # Safety
		/// `src` must be readable and `dst` writable for `count`
		/// elements, and the ranges must not overlap.
		#[inline(always)]
		pub unsafe fn $movs(dst: *mut $ty, src: *const $ty, count: usize) {
			// SAFETY: Offloaded to the caller.
			unsafe {
				asm!(
					"cld",
					concat!("rep ", $movs_insn),
					inout("rdi") dst => _,
					inout("rsi") src => _,
					inout("rcx") count => _,
					options(nostack),
				);
			}
		}

		#[doc = concat!("Fills `count` elements at `dst` with `value` (`REP ", $stos_insn, "`).")]
		///
		/// # Safety
		/// `dst` must be writable for `count` elements.
		#[inline(always)]
		pub unsafe fn $stos(dst: *mut $ty, value: $ty, count: usize) {
			// SAFETY: Offloaded to the caller.
			unsafe {
				asm!(
					"cld",
					concat!("rep ", $stos_insn),
					inout("rdi") dst => _,
					inout("rcx") count => _,
					in($acc) value,
					options(nostack),
				);
			}
		}

		#[doc = concat!("Loads `count` elements from `src` in turn (`REP ", $lods_insn, "`),")]
		/// returning the last one, or `None` if `count` is zero.
		///
		/// # Safety
		/// `src` must be readable for `count` elements.
		#[inline(always)]
		#[must_use]
		pub unsafe fn $lods(src: *const $ty, count: usize) -> Option<$ty> {
			if count == 0 {
				return None;
			}
			let value: $ty;
			// SAFETY: Offloaded to the caller.
			unsafe {
				asm!(
					"cld",
					concat!("rep ", $lods_insn),
					inout("rsi") src => _,
					inout("rcx") count => _,
					out($acc) value,
					options(nostack, readonly),
				);
			}
			Some(value)
		}

		#[doc = concat!("Returns the index of the first of `count` elements at `ptr` equal to `value` (`REPNE ", $scas_insn, "`).")]
		///
		/// # Safety
		/// `ptr` must be readable for `count` elements.
		#[inline(always)]
		#[must_use]
		pub unsafe fn $scas(ptr: *const $ty, value: $ty, count: usize) -> Option<usize> {
			if count == 0 {
				return None;
			}
			let remaining: usize;
			let found: u8;
			// SAFETY: Offloaded to the caller.
			unsafe {
				asm!(
					"cld",
					concat!("repne ", $scas_insn),
					"setz {found}",
					inout("rdi") ptr => _,
					inout("rcx") count => remaining,
					in($acc) value,
					found = out(reg_byte) found,
					options(nostack, readonly),
				);
			}
			// ZF set: stopped on a match. Clear: the count ran out.
			(found != 0).then(|| count - remaining - 1)
		}

		#[doc = concat!("Returns the index of the first position where `count` elements at `a` and `b` differ (`REPE ", $cmps_insn, "`).")]
		///
		/// # Safety
		/// `a` and `b` must be readable for `count` elements.
		#[inline(always)]
		#[must_use]
		pub unsafe fn $cmps(a: *const $ty, b: *const $ty, count: usize) -> Option<usize> {
			if count == 0 {
				return None;
			}
			let remaining: usize;
			let equal: u8;
			// SAFETY: Offloaded to the caller.
			unsafe {
				asm!(
					"cld",
					concat!("repe ", $cmps_insn),
					"setz {equal}",
					inout("rsi") a => _,
					inout("rdi") b => _,
					inout("rcx") count => remaining,
					equal = out(reg_byte) equal,
					options(nostack, readonly),
				);
			}
			// ZF clear: stopped on a difference. Set: all elements matched.
			(equal == 0).then(|| count - remaining - 1)
		}
	};
}

string_ops! {
	u8, "al",
	rep_movsb = "movsb",
	rep_stosb = "stosb",
	rep_lodsb = "lodsb",
	repne_scasb = "scasb",
	repe_cmpsb = "cmpsb",
}

string_ops! {
	u16, "ax",
	rep_movsw = "movsw",
	rep_stosw = "stosw",
	rep_lodsw = "lodsw",
	repne_scasw = "scasw",
	repe_cmpsw = "cmpsw",
}

string_ops! {
	u32, "eax",
	rep_movsd = "movsd",
	rep_stosd = "stosd",
	rep_lodsd = "lodsd",
	repne_scasd = "scasd",
	repe_cmpsd = "cmpsd",
}

string_ops! {
	u64, "rax",
	rep_movsq = "movsq",
	rep_stosq = "stosq",
	rep_lodsq = "lodsq",
	repne_scasq = "scasq",
	repe_cmpsq = "cmpsq",
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn move_and_store() {
		let src = [1_u32, 2, 3, 4, 5];
		let mut dst = [0_u32; 5];
		// SAFETY: Both arrays hold five elements.
		unsafe { rep_movsd(dst.as_mut_ptr(), src.as_ptr(), 5) };
		assert_eq!(dst, src);

		let mut bytes = [0_u8; 9];
		// SAFETY: Only the first eight bytes are written.
		unsafe { rep_stosb(bytes.as_mut_ptr(), 0xAA, 8) };
		assert_eq!(bytes, [0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0]);

		let mut quads = [0_u64; 3];
		// SAFETY: The array holds three elements.
		unsafe { rep_stosq(quads.as_mut_ptr(), u64::MAX, 3) };
		assert_eq!(quads, [u64::MAX; 3]);
	}

	#[test]
	fn load_returns_last() {
		let words = [7_u16, 8, 9];
		// SAFETY: The array holds three elements.
		unsafe {
			assert_eq!(rep_lodsw(words.as_ptr(), 3), Some(9));
			assert_eq!(rep_lodsw(words.as_ptr(), 0), None);
		}
	}

	#[test]
	fn scan() {
		let haystack = b"hello, world";
		// SAFETY: Counts never exceed the array.
		unsafe {
			assert_eq!(repne_scasb(haystack.as_ptr(), b'o', haystack.len()), Some(4));
			assert_eq!(repne_scasb(haystack.as_ptr(), b'h', haystack.len()), Some(0));
			assert_eq!(repne_scasb(haystack.as_ptr(), b'd', haystack.len()), Some(11));
			assert_eq!(repne_scasb(haystack.as_ptr(), b'z', haystack.len()), None);
			assert_eq!(repne_scasb(haystack.as_ptr(), b'h', 0), None);
		}
		let quads = [3_u64, 5, 8];
		// SAFETY: The array holds three elements.
		unsafe {
			assert_eq!(repne_scasq(quads.as_ptr(), 8, 3), Some(2));
		}
	}

	#[test]
	fn compare() {
		let a = b"abcdef";
		let b = b"abcxef";
		// SAFETY: Both arrays hold six bytes.
		unsafe {
			assert_eq!(repe_cmpsb(a.as_ptr(), b.as_ptr(), 6), Some(3));
			assert_eq!(repe_cmpsb(a.as_ptr(), a.as_ptr(), 6), None);
			assert_eq!(repe_cmpsb(a.as_ptr(), b.as_ptr(), 3), None);
			assert_eq!(repe_cmpsb(a.as_ptr(), b.as_ptr(), 0), None);
		}
		let x = [1_u32, 2, 3];
		let y = [9_u32, 2, 3];
		// SAFETY: Both arrays hold three elements.
		unsafe {
			assert_eq!(repe_cmpsd(x.as_ptr(), y.as_ptr(), 3), Some(0));
		}
	}
}
