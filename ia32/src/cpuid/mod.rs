//! CPUID leaf records and the `CPUID` instruction.
//!
//! Every leaf is a `#[repr(C)]` record of four bitstructs (`eax`, `ebx`,
//! `ecx`, `edx`), 128 bits in total. Leaves with a fixed subleaf implement
//! [`CpuidLeaf`] and can be fetched through a [`CpuidCache`]; leaves
//! indexed by an arbitrary subleaf (cache parameters, topology, XSAVE
//! components, ...) implement [`IndexedCpuidLeaf`].
#![expect(clippy::similar_names)]

mod a00c0;
mod a01c0;
mod a04;
mod a05c0;
mod a06c0;
mod a07c0;
mod a07c1;
mod a09c0;
mod a0ac0;
mod a0b;
mod a0dc0;
mod a0dc1;
mod a0dcn;
mod a0f;
mod a10;
mod a12;
mod a14c0;
mod a15c0;
mod a16c0;
mod a17;
mod a18;
mod cache;
mod ext;
mod features;

pub use self::{
	a0ac0::CpuidA0AC0,
	a0b::{CpuidA0B, TopologyLevelType},
	a0dc0::CpuidA0DC0,
	a0dc1::CpuidA0DC1,
	a0dcn::CpuidA0DCn,
	a0f::{CpuidA0FC0, CpuidA0FC1},
	a00c0::{CpuidA00C0, Vendor},
	a01c0::CpuidA01C0,
	a04::{CacheType, CpuidA04},
	a05c0::CpuidA05C0,
	a06c0::CpuidA06C0,
	a07c0::CpuidA07C0,
	a07c1::CpuidA07C1,
	a09c0::CpuidA09C0,
	a10::{CpuidA10C0, CpuidA10C1, CpuidA10C2, CpuidA10C3},
	a12::{CpuidA12C0, CpuidA12C1, CpuidA12Cn, SgxSubleafType},
	a14c0::CpuidA14C0,
	a15c0::CpuidA15C0,
	a16c0::CpuidA16C0,
	a17::{CpuidA17C0, CpuidA17Cn},
	a18::{CpuidA18, TranslationCacheType},
	cache::CpuidCache,
	ext::{
		BrandString, CpuidA80000000, CpuidA80000001, CpuidA80000006, CpuidA80000007,
		CpuidA80000008,
	},
	features::CpuFeatures,
};

/// The first leaf of the extended function range.
pub const EXTENDED_BASE: u32 = 0x8000_0000;

/// The raw output of a single `CPUID` execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(C)]
pub struct CpuidResult {
	/// The `eax` register after the CPUID call.
	pub eax: u32,
	/// The `ebx` register after the CPUID call.
	pub ebx: u32,
	/// The `ecx` register after the CPUID call.
	pub ecx: u32,
	/// The `edx` register after the CPUID call.
	pub edx: u32,
}

impl CpuidResult {
	/// The all-zero result returned for unavailable leaves.
	pub const ZERO: Self = Self {
		eax: 0,
		ebx: 0,
		ecx: 0,
		edx: 0,
	};
}

/// Errors returned by the checked CPUID accessors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CpuidError {
	/// The requested leaf is above the maximum the processor reports
	/// for its range (leaf 0 for standard leaves, leaf `8000_0000H`
	/// for extended leaves).
	#[error("CPUID leaf {leaf:#x} is above the reported maximum {max:#x}")]
	LeafUnavailable {
		/// The requested leaf.
		leaf: u32,
		/// The maximum leaf the processor reports for that range.
		max:  u32,
	},
}

/// A CPUID leaf with a fixed `(eax, ecx)` input.
pub trait CpuidLeaf: Sized + Copy {
	/// The `eax` input.
	const LEAF: u32;
	/// The `ecx` input.
	const SUBLEAF: u32;

	/// Decodes the raw output.
	fn from_result(result: CpuidResult) -> Self;

	/// Re-encodes the record as raw output.
	fn to_result(self) -> CpuidResult;
}

/// A CPUID leaf whose `ecx` input is an index chosen by the caller.
pub trait IndexedCpuidLeaf: Sized + Copy {
	/// The `eax` input.
	const LEAF: u32;

	/// Decodes the raw output.
	fn from_result(result: CpuidResult) -> Self;

	/// Re-encodes the record as raw output.
	fn to_result(self) -> CpuidResult;
}

/// Returns the leaf whose `eax` output reports the maximum leaf
/// of the range that `leaf` belongs to.
#[inline]
#[must_use]
pub const fn range_base(leaf: u32) -> u32 {
	if leaf >= EXTENDED_BASE { EXTENDED_BASE } else { 0 }
}

/// Defines a leaf record from the module-local `Eax`/`Ebx`/`Ecx`/`Edx`
/// bitstructs.
macro_rules! cpuid_leaf {
	(
		$(#[$meta:meta])*
		$name:ident = ($leaf:expr, n)
	) => {
		$(#[$meta])*
		#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
		#[repr(C)]
		pub struct $name {
			/// The `eax` register of the cpuid call.
			pub eax: Eax,
			/// The `ebx` register of the cpuid call.
			pub ebx: Ebx,
			/// The `ecx` register of the cpuid call.
			pub ecx: Ecx,
			/// The `edx` register of the cpuid call.
			pub edx: Edx,
		}

		impl $crate::cpuid::IndexedCpuidLeaf for $name {
			const LEAF: u32 = $leaf;

			#[inline]
			fn from_result(r: $crate::cpuid::CpuidResult) -> Self {
				Self {
					eax: Eax::from_bits(r.eax),
					ebx: Ebx::from_bits(r.ebx),
					ecx: Ecx::from_bits(r.ecx),
					edx: Edx::from_bits(r.edx),
				}
			}

			#[inline]
			fn to_result(self) -> $crate::cpuid::CpuidResult {
				$crate::cpuid::CpuidResult {
					eax: self.eax.bits(),
					ebx: self.ebx.bits(),
					ecx: self.ecx.bits(),
					edx: self.edx.bits(),
				}
			}
		}

		#[cfg(target_arch = "x86_64")]
		impl $name {
			/// Executes CPUID for this leaf with `ecx = subleaf`.
			///
			/// Returns an error if the leaf is above the maximum reported
			/// for its range.
			#[inline]
			pub fn get(subleaf: u32) -> ::core::result::Result<Self, $crate::cpuid::CpuidError> {
				$crate::cpuid::cpuid_checked($leaf, subleaf)
					.map(<Self as $crate::cpuid::IndexedCpuidLeaf>::from_result)
			}
		}

		::static_assertions::const_assert_eq!(::core::mem::size_of::<$name>(), 16);
	};
	(
		$(#[$meta:meta])*
		$name:ident = ($leaf:expr, $subleaf:expr)
	) => {
		$(#[$meta])*
		#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
		#[repr(C)]
		pub struct $name {
			/// The `eax` register of the cpuid call.
			pub eax: Eax,
			/// The `ebx` register of the cpuid call.
			pub ebx: Ebx,
			/// The `ecx` register of the cpuid call.
			pub ecx: Ecx,
			/// The `edx` register of the cpuid call.
			pub edx: Edx,
		}

		impl $crate::cpuid::CpuidLeaf for $name {
			const LEAF: u32 = $leaf;
			const SUBLEAF: u32 = $subleaf;

			#[inline]
			fn from_result(r: $crate::cpuid::CpuidResult) -> Self {
				Self {
					eax: Eax::from_bits(r.eax),
					ebx: Ebx::from_bits(r.ebx),
					ecx: Ecx::from_bits(r.ecx),
					edx: Edx::from_bits(r.edx),
				}
			}

			#[inline]
			fn to_result(self) -> $crate::cpuid::CpuidResult {
				$crate::cpuid::CpuidResult {
					eax: self.eax.bits(),
					ebx: self.ebx.bits(),
					ecx: self.ecx.bits(),
					edx: self.edx.bits(),
				}
			}
		}

		#[cfg(target_arch = "x86_64")]
		impl $name {
			/// Executes CPUID for this leaf.
			///
			/// Returns an error if the leaf is above the maximum reported
			/// for its range.
			///
			/// # Performance
			/// CPUID is slow and **serializing**; cache the result
			/// (see [`crate::cpuid::CpuidCache`]) if it is used often.
			#[inline]
			pub fn get() -> ::core::result::Result<Self, $crate::cpuid::CpuidError> {
				$crate::cpuid::cpuid_checked($leaf, $subleaf)
					.map(<Self as $crate::cpuid::CpuidLeaf>::from_result)
			}
		}

		::static_assertions::const_assert_eq!(::core::mem::size_of::<$name>(), 16);
	};
}

pub(crate) use cpuid_leaf;

/// Executes `CPUID` with the given `eax` and `ecx` inputs.
///
/// No availability check is performed; leaves above the reported
/// maximum return processor-specific data (typically the contents
/// of the highest basic leaf). Use [`cpuid_checked`] or a
/// [`CpuidCache`] for a guarded query.
///
/// The instruction is not marked `nomem`, so the compiler treats it as
/// a barrier and will not move memory accesses across it.
#[cfg(target_arch = "x86_64")]
#[inline]
#[must_use]
pub fn cpuid(leaf: u32, subleaf: u32) -> CpuidResult {
	let eax: u32;
	let ebx: u32;
	let ecx: u32;
	let edx: u32;
	// SAFETY: CPUID is available on every x86_64 processor and has no
	// SAFETY: side effects beyond serializing the instruction stream.
	unsafe {
		core::arch::asm!(
			// NOTE: LLVM reserves `rbx`, so it is swapped through a scratch register
			// NOTE: instead of being named as an operand.
			"mov {ebx_tmp:r}, rbx",
			"cpuid",
			"xchg {ebx_tmp:r}, rbx",
			ebx_tmp = out(reg) ebx,
			inlateout("eax") leaf => eax,
			inlateout("ecx") subleaf => ecx,
			lateout("edx") edx,
			options(nostack, preserves_flags),
		);
	}
	CpuidResult { eax, ebx, ecx, edx }
}

/// Returns the maximum leaf the processor reports for the range
/// (standard or extended) that `leaf` belongs to.
#[cfg(target_arch = "x86_64")]
#[inline]
#[must_use]
pub fn max_leaf_for(leaf: u32) -> u32 {
	cpuid(range_base(leaf), 0).eax
}

/// Executes `CPUID` after checking that `leaf` is within the reported
/// maximum of its range.
#[cfg(target_arch = "x86_64")]
#[inline]
pub fn cpuid_checked(leaf: u32, subleaf: u32) -> Result<CpuidResult, CpuidError> {
	let max = max_leaf_for(leaf);
	if leaf > max {
		return Err(CpuidError::LeafUnavailable { leaf, max });
	}
	Ok(cpuid(leaf, subleaf))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn range_base_splits_ranges() {
		assert_eq!(range_base(0), 0);
		assert_eq!(range_base(0x1F), 0);
		assert_eq!(range_base(0x8000_0000), 0x8000_0000);
		assert_eq!(range_base(0x8000_0008), 0x8000_0000);
	}

	#[test]
	fn leaf_records_are_128_bits() {
		assert_eq!(size_of::<CpuidResult>(), 16);
		assert_eq!(size_of::<CpuidA01C0>(), 16);
		assert_eq!(size_of::<CpuidA07C0>(), 16);
		assert_eq!(size_of::<CpuidA0DCn>(), 16);
		assert_eq!(size_of::<CpuidA80000001>(), 16);
	}

	#[test]
	fn result_round_trip() {
		let raw = CpuidResult {
			eax: 0x000B_06A2,
			ebx: 0x0010_0800,
			ecx: 0x7FFA_FBFF,
			edx: 0xBFEB_FBFF,
		};
		let leaf = CpuidA01C0::from_result(raw);
		assert_eq!(leaf.to_result(), raw);
	}

	#[test]
	#[cfg(target_arch = "x86_64")]
	fn leaf_zero_is_available() {
		let max = max_leaf_for(0);
		assert!(max >= 1);
		assert!(cpuid_checked(0, 0).is_ok());
		assert_eq!(
			cpuid_checked(max + 1, 0),
			Err(CpuidError::LeafUnavailable { leaf: max + 1, max })
		);
	}

	#[test]
	#[cfg(target_arch = "x86_64")]
	fn cpuid_is_stable() {
		let a = cpuid(1, 0);
		let b = cpuid(1, 0);
		// EBX[31:24] (initial APIC ID) may differ if the thread
		// migrates between the two calls.
		assert_eq!(a.eax, b.eax);
		assert_eq!(a.ecx, b.ecx);
		assert_eq!(a.edx, b.edx);
	}
}
