//! Implements the CPUID 04:n lookup structure, _Deterministic Cache Parameters_.

use ia32_macro::bitstruct;

use super::cpuid_leaf;

bitstruct! {
	/// Gets the `eax` register values for the CPUID `eax=04` leaf.
	pub struct Eax(u32) {
		/// The type of cache described by this subleaf.
		pub cache_type[4:0] => enum CacheType(u8) {
			/// No more caches; enumeration stops at this subleaf.
			Null = 0,
			/// Data cache.
			Data = 1,
			/// Instruction cache.
			Instruction = 2,
			/// Unified cache.
			Unified = 3,
		},
		/// Cache level, starting at 1.
		pub cache_level[7:5] => as u8,
		/// Self-initializing cache level (does not need software initialization).
		pub self_initializing[8] => as bool,
		/// Fully associative cache.
		pub fully_associative[9] => as bool,
		/// Maximum number of logical processors sharing this cache, minus one.
		pub max_logical_sharing[25:14] => as u16,
		/// Maximum number of addressable core IDs in the package, minus one.
		pub max_core_ids[31:26] => as u8,
	}
}

bitstruct! {
	/// Gets the `ebx` register values for the CPUID `eax=04` leaf.
	pub struct Ebx(u32) {
		/// System coherency line size, minus one.
		pub line_size[11:0] => as u16,
		/// Physical line partitions, minus one.
		pub partitions[21:12] => as u16,
		/// Ways of associativity, minus one.
		pub ways[31:22] => as u16,
	}
}

bitstruct! {
	/// Gets the `ecx` register values for the CPUID `eax=04` leaf.
	pub struct Ecx(u32) {
		/// Number of sets, minus one.
		pub sets[31:0] => as u32,
	}
}

bitstruct! {
	/// Gets the `edx` register values for the CPUID `eax=04` leaf.
	pub struct Edx(u32) {
		/// `WBINVD`/`INVD` is not guaranteed to act on lower-level caches
		/// of non-originating threads sharing this cache.
		pub wbinvd_not_inclusive[0] => as bool,
		/// The cache is inclusive of lower cache levels.
		pub inclusive[1] => as bool,
		/// A complex function is used to index the cache.
		pub complex_indexing[2] => as bool,
	}
}

cpuid_leaf! {
	/// Deterministic Cache Parameters. Subleaves are enumerated
	/// until `cache_type` is [`CacheType::Null`].
	CpuidA04 = (0x04, n)
}

impl CpuidA04 {
	/// Returns the total size of the cache, in bytes.
	#[must_use]
	pub const fn size(&self) -> u64 {
		(self.ebx.ways() as u64 + 1)
			* (self.ebx.partitions() as u64 + 1)
			* (self.ebx.line_size() as u64 + 1)
			* (self.ecx.sets() as u64 + 1)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::cpuid::{CpuidResult, IndexedCpuidLeaf};

	#[test]
	fn decodes_l1d() {
		// 48 KiB, 12-way, 64-byte lines, 64 sets.
		let leaf = CpuidA04::from_result(CpuidResult {
			eax: 0x1C00_4121,
			ebx: 0x02C0_003F,
			ecx: 0x0000_003F,
			edx: 0,
		});
		assert_eq!(leaf.eax.cache_type(), Some(CacheType::Data));
		assert_eq!(leaf.eax.cache_level(), 1);
		assert!(leaf.eax.self_initializing());
		assert_eq!(leaf.eax.max_logical_sharing(), 1);
		assert_eq!(leaf.ebx.ways(), 11);
		assert_eq!(leaf.size(), 48 * 1024);
	}

	#[test]
	fn unknown_cache_type_is_none() {
		assert_eq!(CacheType::from_raw(3), Some(CacheType::Unified));
		assert_eq!(CacheType::from_raw(4), None);
		assert_eq!(Eax::from_bits(7).cache_type_raw(), 7);
		assert_eq!(Eax::from_bits(7).cache_type(), None);
	}
}
