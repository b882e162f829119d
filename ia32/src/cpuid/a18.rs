//! Implements the CPUID 18:n lookup structure, _Deterministic Address Translation Parameters_.

use ia32_macro::bitstruct;

use super::cpuid_leaf;

bitstruct! {
	/// Gets the `eax` register values for the CPUID `eax=18` leaf.
	pub struct Eax(u32) {
		/// For subleaf 0, the highest supported subleaf.
		pub max_subleaf[31:0] => as u32,
	}
}

bitstruct! {
	/// Gets the `ebx` register values for the CPUID `eax=18` leaf.
	pub struct Ebx(u32) {
		/// 4K page size entries.
		pub page_4k[0] => as bool,
		/// 2M page size entries.
		pub page_2m[1] => as bool,
		/// 4M page size entries.
		pub page_4m[2] => as bool,
		/// 1G page size entries.
		pub page_1g[3] => as bool,
		/// Partitioning (0 means soft partitioning between the logical
		/// processors sharing this structure).
		pub partitioning[10:8] => as u8,
		/// Ways of associativity.
		pub ways[31:16] => as u16,
	}
}

bitstruct! {
	/// Gets the `ecx` register values for the CPUID `eax=18` leaf.
	pub struct Ecx(u32) {
		/// Number of sets.
		pub sets[31:0] => as u32,
	}
}

bitstruct! {
	/// Gets the `edx` register values for the CPUID `eax=18` leaf.
	pub struct Edx(u32) {
		/// The kind of translation cache described by this subleaf.
		pub cache_type[4:0] => enum TranslationCacheType(u8) {
			/// Invalid subleaf.
			Null = 0,
			/// Data TLB.
			Data = 1,
			/// Instruction TLB.
			Instruction = 2,
			/// Unified TLB.
			Unified = 3,
			/// Load-only TLB.
			LoadOnly = 4,
			/// Store-only TLB.
			StoreOnly = 5,
		},
		/// Translation cache level, starting at 1.
		pub level[7:5] => as u8,
		/// Fully associative structure.
		pub fully_associative[8] => as bool,
		/// Maximum number of addressable IDs for logical processors
		/// sharing this translation cache, minus one.
		pub max_sharing[25:14] => as u16,
	}
}

cpuid_leaf! {
	/// Deterministic Address Translation Parameters. Subleaves with a
	/// [`TranslationCacheType::Null`] type are invalid and skipped.
	CpuidA18 = (0x18, n)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::cpuid::{CpuidResult, IndexedCpuidLeaf};

	#[test]
	fn decodes_stlb() {
		let leaf = CpuidA18::from_result(CpuidResult {
			eax: 0,
			ebx: 0x0008_000F,
			ecx: 0x0000_0100,
			edx: 0x0000_4143,
		});
		assert!(leaf.ebx.page_4k());
		assert!(leaf.ebx.page_1g());
		assert_eq!(leaf.ebx.ways(), 8);
		assert_eq!(leaf.ecx.sets(), 256);
		assert_eq!(leaf.edx.cache_type(), Some(TranslationCacheType::Unified));
		assert_eq!(leaf.edx.level(), 2);
		assert!(leaf.edx.fully_associative());
		assert_eq!(leaf.edx.max_sharing(), 1);
	}
}
