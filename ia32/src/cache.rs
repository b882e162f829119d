//! Cache-line management and whole-cache writeback.

#![expect(clippy::inline_always)]

use core::arch::asm;

use ia32_test::effect;

use crate::{consts::CACHE_LINE_SIZE, cpuid::CpuFeatures, unroll::for_each_block};

/// Declares a single-line cache instruction wrapper.
macro_rules! line_op {
	($(#[$meta:meta])* $name:ident, $insn:literal) => {
		$(#[$meta])*
		///
		/// # Safety
		/// `line` must be mapped; the instruction faults like a byte load.
		#[inline(always)]
		pub unsafe fn $name(line: *const u8) {
			// SAFETY: Offloaded to the caller.
			unsafe {
				asm!(concat!($insn, " byte ptr [{}]"), in(reg) line, options(nostack, preserves_flags));
			}
		}
	};
}

line_op! {
	/// Writes back and invalidates the cache line containing `line` in
	/// every cache level of the coherence domain (`CLFLUSH`).
	///
	/// Ordered with respect to other `CLFLUSH`es and stores.
	clflush, "clflush"
}
line_op! {
	/// Writes back and invalidates the cache line containing `line`
	/// (`CLFLUSHOPT`).
	///
	/// Only ordered by fences; issue [`crate::asm::sfence`] after a batch.
	/// Requires `CPUID.(EAX=07H,ECX=0):EBX.CLFLUSHOPT`.
	clflushopt, "clflushopt"
}
line_op! {
	/// Writes back the cache line containing `line`, possibly keeping it
	/// cached (`CLWB`).
	///
	/// Only ordered by fences. Requires `CPUID.(EAX=07H,ECX=0):EBX.CLWB`.
	clwb, "clwb"
}
line_op! {
	/// Hints that the cache line containing `line` should be moved to a
	/// more distant cache level (`CLDEMOTE`).
	///
	/// Executes as a no-op on processors without `CLDEMOTE`.
	cldemote, "cldemote"
}
line_op! {
	/// Prefetches the line containing `line` into all cache levels (`PREFETCHT0`).
	prefetch_t0, "prefetcht0"
}
line_op! {
	/// Prefetches the line containing `line` into L2 and above (`PREFETCHT1`).
	prefetch_t1, "prefetcht1"
}
line_op! {
	/// Prefetches the line containing `line` into L3 and above (`PREFETCHT2`).
	prefetch_t2, "prefetcht2"
}
line_op! {
	/// Prefetches the line containing `line` with minimal cache
	/// pollution (`PREFETCHNTA`).
	prefetch_nta, "prefetchnta"
}

/// Applies `op` to every `stride`-aligned line overlapping
/// `start..start + len`.
///
/// # Safety
/// Every line in the range must be mapped, and `op` must be safe to
/// call on each. `stride` must be a power of two.
#[inline]
pub unsafe fn for_each_line(
	start: *const u8,
	len: usize,
	stride: usize,
	op: unsafe fn(*const u8),
) {
	for_each_block(start.addr(), len, stride, |line| {
		// SAFETY: Offloaded to the caller.
		unsafe { op(start.with_addr(line)) };
	});
}

/// Writes back and invalidates all caches, including those of other
/// processors' (`WBINVD`).
///
/// # Safety
/// Must be executed in ring 0. Can take milliseconds, during which
/// interrupts are not serviced.
#[inline(always)]
#[effect(cache_writeback)]
pub unsafe fn wbinvd() {
	// SAFETY: Offloaded to the caller.
	unsafe {
		asm!("wbinvd", options(nostack, preserves_flags));
	}
}

/// Invalidates all caches without writing them back (`INVD`).
///
/// # Safety
/// Must be executed in ring 0. All modified data not yet written back
/// is lost.
#[inline(always)]
#[effect(cache_writeback)]
pub unsafe fn invd() {
	// SAFETY: Offloaded to the caller.
	unsafe {
		asm!("invd", options(nostack, preserves_flags));
	}
}

/// The flush strategy for the current processor.
///
/// Chooses `CLFLUSHOPT` and `CLWB` when available, falling back to
/// `CLFLUSH`. Build it once with [`CacheFlusher::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheFlusher {
	/// `CLFLUSHOPT` is available.
	clflushopt: bool,
	/// `CLWB` is available.
	clwb:       bool,
	/// The flush granularity, in bytes.
	line_size:  usize,
}

impl CacheFlusher {
	/// Builds the strategy from a feature snapshot.
	///
	/// The line size comes from `CPUID.01H:EBX[15:8]`, defaulting to
	/// [`CACHE_LINE_SIZE`] if it is not reported or not a power of two.
	#[must_use]
	pub const fn new(features: &CpuFeatures) -> Self {
		let reported = features.version.ebx.clflush_line_size() as usize * 8;
		let line_size = if reported.is_power_of_two() {
			reported
		} else {
			CACHE_LINE_SIZE
		};
		Self {
			clflushopt: features.has_clflushopt(),
			clwb: features.has_clwb(),
			line_size,
		}
	}

	/// Returns the flush granularity.
	#[must_use]
	pub const fn line_size(&self) -> usize {
		self.line_size
	}

	/// Writes back and invalidates every line overlapping `start..start + len`.
	///
	/// Completes (is fenced) before returning.
	///
	/// # Safety
	/// Every line in the range must be mapped.
	#[effect(cache_writeback)]
	pub unsafe fn flush(&self, start: *const u8, len: usize) {
		let op = if self.clflushopt { clflushopt } else { clflush };
		// SAFETY: Offloaded to the caller; `op` was chosen from supported instructions.
		unsafe { for_each_line(start, len, self.line_size, op) };
		crate::asm::sfence();
	}

	/// Writes back every line overlapping `start..start + len`, without
	/// necessarily evicting them.
	///
	/// Falls back to [`CacheFlusher::flush`] without `CLWB`.
	///
	/// # Safety
	/// Every line in the range must be mapped.
	#[effect(cache_writeback)]
	pub unsafe fn writeback(&self, start: *const u8, len: usize) {
		if self.clwb {
			// SAFETY: Offloaded to the caller; `CLWB` is supported.
			unsafe { for_each_line(start, len, self.line_size, clwb) };
			crate::asm::sfence();
		} else {
			// SAFETY: Offloaded to the caller.
			unsafe { self.flush(start, len) };
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn flusher_falls_back() {
		let flusher = CacheFlusher::new(&CpuFeatures::default());
		assert_eq!(flusher.line_size(), CACHE_LINE_SIZE);
		assert!(!flusher.clflushopt);
		assert!(!flusher.clwb);
	}

	#[test]
	fn flush_and_prefetch_user_memory() {
		let buffer = [0x5A_u8; 1000];
		let flusher = CacheFlusher::new(&CpuFeatures::detect());
		// SAFETY: The buffer is mapped, and only supported instructions are used.
		unsafe {
			flusher.flush(buffer.as_ptr(), buffer.len());
			flusher.writeback(buffer.as_ptr(), buffer.len());
			for_each_line(buffer.as_ptr(), buffer.len(), CACHE_LINE_SIZE, prefetch_t0);
			prefetch_nta(buffer.as_ptr());
			cldemote(buffer.as_ptr());
		}
		assert!(buffer.iter().all(|&b| b == 0x5A));
	}
}
