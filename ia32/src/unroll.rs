//! Manually unrolled iteration for the range forms of the cache, TLB
//! and CRC wrappers.

#![expect(clippy::inline_always)]

/// Calls `f` with every index in `0..count`, in order.
///
/// The body is expanded eight times per iteration while at least
/// eight indices remain; the remainder is iterated one at a time.
#[inline(always)]
pub fn unroll_by_8(count: usize, mut f: impl FnMut(usize)) {
	let mut i = 0;
	while count - i >= 8 {
		f(i);
		f(i + 1);
		f(i + 2);
		f(i + 3);
		f(i + 4);
		f(i + 5);
		f(i + 6);
		f(i + 7);
		i += 8;
	}
	while i < count {
		f(i);
		i += 1;
	}
}

/// Calls `f` with `start + i * stride` for every `i` in `0..count`, in
/// order.
///
/// Addresses wrap on overflow.
#[inline(always)]
pub fn for_each_stride(start: usize, count: usize, stride: usize, mut f: impl FnMut(usize)) {
	unroll_by_8(count, |i| f(start.wrapping_add(i.wrapping_mul(stride))));
}

/// Calls `f` with the address of every `stride`-aligned block that
/// overlaps `start..start + len`, in ascending order.
///
/// `stride` must be a power of two. Nothing is called if `len` or
/// `stride` is zero.
#[inline(always)]
pub fn for_each_block(start: usize, len: usize, stride: usize, f: impl FnMut(usize)) {
	if len == 0 || stride == 0 {
		return;
	}
	debug_assert!(stride.is_power_of_two(), "stride must be a power of two");
	let first = start & !(stride - 1);
	let end = start.saturating_add(len);
	let count = (end - first).div_ceil(stride);
	for_each_stride(first, count, stride, f);
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn visits_every_index_once() {
		for count in [0, 1, 7, 8, 9, 16, 23] {
			let mut seen = std::vec::Vec::new();
			unroll_by_8(count, |i| seen.push(i));
			assert_eq!(seen, (0..count).collect::<std::vec::Vec<_>>());
		}
	}

	#[test]
	fn blocks_cover_unaligned_range() {
		let mut seen = std::vec::Vec::new();
		for_each_block(0x3F, 2, 64, |a| seen.push(a));
		assert_eq!(seen, [0x0, 0x40]);

		seen.clear();
		for_each_block(0x1000, 0x1000, 0x1000, |a| seen.push(a));
		assert_eq!(seen, [0x1000]);

		seen.clear();
		for_each_block(0x1000, 0, 0x1000, |a| seen.push(a));
		assert!(seen.is_empty());

		seen.clear();
		for_each_block(0, 10 * 64, 64, |a| seen.push(a));
		assert_eq!(seen.len(), 10);
		assert_eq!(seen[9], 9 * 64);
	}

	#[test]
	fn block_boundaries() {
		let mut seen = std::vec::Vec::new();

		// Exactly one block, aligned.
		for_each_block(0x2000, 64, 64, |a| seen.push(a));
		assert_eq!(seen, [0x2000]);

		// One stride's worth of bytes from an unaligned start spans two blocks.
		seen.clear();
		for_each_block(0x2010, 64, 64, |a| seen.push(a));
		assert_eq!(seen, [0x2000, 0x2040]);

		// The last byte of a block.
		seen.clear();
		for_each_block(0x203F, 1, 64, |a| seen.push(a));
		assert_eq!(seen, [0x2000]);

		seen.clear();
		for_each_block(0x2010, 0, 64, |a| seen.push(a));
		for_each_block(0x2010, 64, 0, |a| seen.push(a));
		assert!(seen.is_empty());
	}

	#[test]
	fn strides_are_exact() {
		let mut seen = std::vec::Vec::new();
		for_each_stride(0x1234, 3, 0x1000, |a| seen.push(a));
		assert_eq!(seen, [0x1234, 0x2234, 0x3234]);

		seen.clear();
		for_each_stride(0x1234, 0, 0x1000, |a| seen.push(a));
		assert!(seen.is_empty());

		seen.clear();
		for_each_stride(0x40, 1, 0x1000, |a| seen.push(a));
		assert_eq!(seen, [0x40]);

		seen.clear();
		for_each_stride(0, 17, 64, |a| seen.push(a));
		assert_eq!(seen, (0..17).map(|i| i * 64).collect::<std::vec::Vec<_>>());
	}
}
