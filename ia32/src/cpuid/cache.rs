//! A fixed-capacity memo table for CPUID results.

use core::sync::atomic::{
	AtomicBool, AtomicU32, AtomicU64,
	Ordering::{AcqRel, Acquire, Relaxed, Release},
};

use super::{CpuidResult, range_base};

/// The key of an unclaimed slot.
///
/// `(0xFFFF_FFFF, 0xFFFF_FFFF)` is therefore never cached.
const VACANT: u64 = u64::MAX;

/// One cached `(leaf, subleaf)` result.
///
/// A slot is claimed by swapping its key from [`VACANT`]; the registers
/// are valid once `ready` is set.
struct Slot {
	/// `leaf << 32 | subleaf`, or [`VACANT`].
	key:   AtomicU64,
	/// The registers have been stored.
	ready: AtomicBool,
	/// `eax`, `ebx`, `ecx`, `edx`.
	regs:  [AtomicU32; 4],
}

impl Slot {
	/// Creates an empty slot.
	const fn new() -> Self {
		Self {
			key:   AtomicU64::new(VACANT),
			ready: AtomicBool::new(false),
			regs:  [const { AtomicU32::new(0) }; 4],
		}
	}

	/// Reads the stored result, if it has been published.
	fn read(&self) -> Option<CpuidResult> {
		self.ready.load(Acquire).then(|| {
			CpuidResult {
				eax: self.regs[0].load(Relaxed),
				ebx: self.regs[1].load(Relaxed),
				ecx: self.regs[2].load(Relaxed),
				edx: self.regs[3].load(Relaxed),
			}
		})
	}

	/// Stores and publishes `result`.
	fn publish(&self, result: CpuidResult) {
		self.regs[0].store(result.eax, Relaxed);
		self.regs[1].store(result.ebx, Relaxed);
		self.regs[2].store(result.ecx, Relaxed);
		self.regs[3].store(result.edx, Relaxed);
		self.ready.store(true, Release);
	}
}

/// Memoizes CPUID results per `(leaf, subleaf)`.
///
/// The first lookup of a pair executes CPUID; later lookups return the
/// stored registers. The table is lock-free and may be shared between
/// cores. Each pair occupies at most one slot: a lookup that finds its
/// pair still being filled by another caller executes CPUID itself
/// without storing the result. If the query of the filling caller
/// panics, the pair is never cached and every later lookup of it
/// executes CPUID.
///
/// Leaves whose output is per-core (the initial APIC ID in leaf 01H,
/// the x2APIC ID in leaf 0BH) are cached as seen by the first core to
/// query them.
///
/// When all `N` slots are in use, lookups of new pairs execute CPUID
/// every time without caching.
pub struct CpuidCache<const N: usize = 32> {
	/// The memo slots, filled in order.
	slots: [Slot; N],
}

impl<const N: usize> CpuidCache<N> {
	/// Creates an empty cache.
	#[must_use]
	pub const fn new() -> Self {
		Self {
			slots: [const { Slot::new() }; N],
		}
	}

	/// Returns the number of cached results.
	#[must_use]
	pub fn len(&self) -> usize {
		self.slots
			.iter()
			.filter(|s| s.ready.load(Acquire))
			.count()
	}

	/// Returns `true` if nothing has been cached yet.
	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Returns the cached result for `(leaf, subleaf)`, calling `query`
	/// and storing its result on the first lookup.
	pub fn get_or_insert_with(
		&self,
		leaf: u32,
		subleaf: u32,
		query: impl FnOnce() -> CpuidResult,
	) -> CpuidResult {
		let key = (u64::from(leaf) << 32) | u64::from(subleaf);
		if key == VACANT {
			return query();
		}

		for slot in &self.slots {
			let mut found = slot.key.load(Acquire);
			if found == VACANT {
				match slot.key.compare_exchange(VACANT, key, AcqRel, Acquire) {
					Ok(_) => {
						let result = query();
						slot.publish(result);
						return result;
					}
					Err(current) => found = current,
				}
			}

			if found == key {
				return slot.read().unwrap_or_else(query);
			}
		}

		query()
	}

	/// Like [`Self::get_or_insert_with`], but first checks (through the
	/// same cache) that `leaf` is within the maximum reported for its
	/// range. Unavailable leaves yield [`CpuidResult::ZERO`] without
	/// calling `query` for them.
	pub fn get_checked_with(
		&self,
		leaf: u32,
		subleaf: u32,
		mut query: impl FnMut(u32, u32) -> CpuidResult,
	) -> CpuidResult {
		let base = range_base(leaf);
		let max = self.get_or_insert_with(base, 0, || query(base, 0)).eax;
		if leaf > max {
			return CpuidResult::ZERO;
		}
		self.get_or_insert_with(leaf, subleaf, || query(leaf, subleaf))
	}
}

#[cfg(target_arch = "x86_64")]
impl<const N: usize> CpuidCache<N> {
	/// Executes (or recalls) CPUID for `(leaf, subleaf)`.
	pub fn query(&self, leaf: u32, subleaf: u32) -> CpuidResult {
		self.get_or_insert_with(leaf, subleaf, || super::cpuid(leaf, subleaf))
	}

	/// Executes (or recalls) CPUID for `(leaf, subleaf)`, returning all
	/// zeroes if the leaf is above the reported maximum.
	pub fn query_checked(&self, leaf: u32, subleaf: u32) -> CpuidResult {
		self.get_checked_with(leaf, subleaf, super::cpuid)
	}

	/// Returns the cached typed leaf.
	pub fn get<L: super::CpuidLeaf>(&self) -> L {
		L::from_result(self.query(L::LEAF, L::SUBLEAF))
	}

	/// Returns the cached typed leaf, or an all-zero record if the
	/// processor does not report it.
	pub fn get_checked<L: super::CpuidLeaf>(&self) -> L {
		L::from_result(self.query_checked(L::LEAF, L::SUBLEAF))
	}

	/// Returns the cached typed subleaf of an indexed leaf, or an
	/// all-zero record if the processor does not report the leaf.
	pub fn get_indexed<L: super::IndexedCpuidLeaf>(&self, subleaf: u32) -> L {
		L::from_result(self.query_checked(L::LEAF, subleaf))
	}
}

impl<const N: usize> Default for CpuidCache<N> {
	fn default() -> Self {
		Self::new()
	}
}

impl<const N: usize> core::fmt::Debug for CpuidCache<N> {
	fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
		f.debug_struct("CpuidCache")
			.field("capacity", &N)
			.field("len", &self.len())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use core::cell::Cell;

	use super::*;

	/// A processor reporting leaves `0..=0x0D` and `8000_0000..=8000_0008`.
	fn fake(leaf: u32, subleaf: u32) -> CpuidResult {
		match leaf {
			0 => CpuidResult {
				eax: 0x0D,
				..CpuidResult::ZERO
			},
			0x8000_0000 => CpuidResult {
				eax: 0x8000_0008,
				..CpuidResult::ZERO
			},
			_ => CpuidResult {
				eax: leaf,
				ebx: subleaf,
				ecx: 0xC0FF_EE00,
				edx: 1,
			},
		}
	}

	#[test]
	fn first_lookup_queries_once() {
		let cache = CpuidCache::<4>::new();
		let calls = Cell::new(0);
		let query = || {
			calls.set(calls.get() + 1);
			fake(1, 0)
		};

		let a = cache.get_or_insert_with(1, 0, query);
		let b = cache.get_or_insert_with(1, 0, query);
		assert_eq!(a, b);
		assert_eq!(calls.get(), 1);
		assert_eq!(cache.len(), 1);
	}

	#[test]
	fn subleaves_are_distinct() {
		let cache = CpuidCache::<4>::new();
		let a = cache.get_or_insert_with(4, 0, || fake(4, 0));
		let b = cache.get_or_insert_with(4, 1, || fake(4, 1));
		assert_ne!(a, b);
		assert_eq!(cache.get_or_insert_with(4, 1, || CpuidResult::ZERO), b);
	}

	#[test]
	fn full_cache_still_answers() {
		let cache = CpuidCache::<1>::new();
		cache.get_or_insert_with(1, 0, || fake(1, 0));
		let calls = Cell::new(0);
		for _ in 0..3 {
			let r = cache.get_or_insert_with(2, 0, || {
				calls.set(calls.get() + 1);
				fake(2, 0)
			});
			assert_eq!(r, fake(2, 0));
		}
		assert_eq!(calls.get(), 3);
		assert_eq!(cache.len(), 1);
	}

	#[test]
	fn checked_lookup_zeroes_unavailable_leaves() {
		let cache = CpuidCache::<8>::new();
		assert_eq!(cache.get_checked_with(0x0D, 1, fake), fake(0x0D, 1));
		assert_eq!(cache.get_checked_with(0x0E, 0, fake), CpuidResult::ZERO);
		assert_eq!(cache.get_checked_with(0x8000_0008, 0, fake), fake(0x8000_0008, 0));
		assert_eq!(cache.get_checked_with(0x8000_0009, 0, fake), CpuidResult::ZERO);
	}

	#[test]
	fn checked_lookup_never_queries_unavailable_leaves() {
		let cache = CpuidCache::<8>::new();
		let r = cache.get_checked_with(0x20, 0, |leaf, subleaf| {
			assert_eq!(leaf, 0, "queried an unavailable leaf");
			fake(leaf, subleaf)
		});
		assert_eq!(r, CpuidResult::ZERO);
	}

	#[test]
	fn pair_being_filled_is_not_duplicated() {
		let cache = CpuidCache::<4>::new();
		let outer = cache.get_or_insert_with(7, 0, || {
			let inner = cache.get_or_insert_with(7, 0, || fake(7, 0));
			assert_eq!(cache.len(), 0);
			inner
		});
		assert_eq!(outer, fake(7, 0));
		assert_eq!(cache.len(), 1);

		// The remaining slots are still free for other pairs.
		for leaf in 1..=3 {
			cache.get_or_insert_with(leaf, 0, || fake(leaf, 0));
		}
		assert_eq!(cache.len(), 4);
	}

	#[test]
	fn panicking_query_leaves_pair_uncached() {
		let cache = CpuidCache::<2>::new();
		let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
			cache.get_or_insert_with(1, 0, || panic!("query failed"))
		}));
		assert!(result.is_err());

		let calls = Cell::new(0);
		for _ in 0..2 {
			let r = cache.get_or_insert_with(1, 0, || {
				calls.set(calls.get() + 1);
				fake(1, 0)
			});
			assert_eq!(r, fake(1, 0));
		}
		assert_eq!(calls.get(), 2);
		assert_eq!(cache.len(), 0);

		cache.get_or_insert_with(2, 0, || fake(2, 0));
		assert_eq!(cache.len(), 1);
	}

	#[test]
	fn shared_between_threads() {
		let cache = CpuidCache::<8>::new();
		std::thread::scope(|s| {
			for _ in 0..4 {
				s.spawn(|| {
					for leaf in 1..=4 {
						assert_eq!(cache.get_or_insert_with(leaf, 0, || fake(leaf, 0)), fake(leaf, 0));
					}
				});
			}
		});
		assert_eq!(cache.len(), 4);
	}

	#[test]
	#[cfg(target_arch = "x86_64")]
	fn memoized_leaf_is_stable() {
		let cache = CpuidCache::<8>::new();
		let a: crate::cpuid::CpuidA01C0 = cache.get_checked();
		let b: crate::cpuid::CpuidA01C0 = cache.get_checked();
		assert_eq!(a, b);
		assert!(cache.len() >= 2);
	}
}
