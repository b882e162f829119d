//! A snapshot of the processor's feature leaves.

use super::{
	CpuidA00C0, CpuidA01C0, CpuidA07C0, CpuidA07C1, CpuidA0DC0, CpuidA0DC1, CpuidA80000000,
	CpuidA80000001, CpuidA80000007, CpuidA80000008, CpuidLeaf, CpuidResult, EXTENDED_BASE, Vendor,
};

/// The feature-relevant CPUID leaves, read once.
///
/// Build it at startup with [`CpuFeatures::detect`] (or from any query
/// function with [`CpuFeatures::from_query`]) and pass it by reference
/// to code that needs to branch on processor support. Leaves above the
/// reported maximum of their range are stored as all zeroes, so every
/// predicate on them reads as "unsupported".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CpuFeatures {
	/// Leaf 00H.
	pub basic:     CpuidA00C0,
	/// Leaf 01H.
	pub version:   CpuidA01C0,
	/// Leaf 07H, subleaf 0.
	pub extended:  CpuidA07C0,
	/// Leaf 07H, subleaf 1.
	pub extended1: CpuidA07C1,
	/// Leaf 0DH, subleaf 0.
	pub xsave:     CpuidA0DC0,
	/// Leaf 0DH, subleaf 1.
	pub xsave1:    CpuidA0DC1,
	/// Leaf `8000_0000H`.
	pub ext_max:   CpuidA80000000,
	/// Leaf `8000_0001H`.
	pub ext:       CpuidA80000001,
	/// Leaf `8000_0007H`.
	pub ext_power: CpuidA80000007,
	/// Leaf `8000_0008H`.
	pub ext_addr:  CpuidA80000008,
}

impl CpuFeatures {
	/// Builds the snapshot from a `(leaf, subleaf)` query function.
	///
	/// Only leaves within the maximum reported by leaf 0 (or leaf
	/// `8000_0000H` for the extended range) are queried.
	pub fn from_query(mut query: impl FnMut(u32, u32) -> CpuidResult) -> Self {
		let basic = CpuidA00C0::from_result(query(0, 0));
		let ext_max = CpuidA80000000::from_result(query(EXTENDED_BASE, 0));

		let max_basic = basic.eax.max_cpuid_input_value();
		// Some processors without extended leaves echo unrelated data here.
		let max_ext = match ext_max.eax.max_extended_leaf() {
			max if max >= EXTENDED_BASE => max,
			_ => 0,
		};

		let mut fetch = |leaf: u32, subleaf: u32| {
			let max = if leaf >= EXTENDED_BASE { max_ext } else { max_basic };
			if leaf <= max {
				query(leaf, subleaf)
			} else {
				CpuidResult::ZERO
			}
		};

		Self {
			basic,
			version: read(&mut fetch),
			extended: read(&mut fetch),
			extended1: read(&mut fetch),
			xsave: read(&mut fetch),
			xsave1: read(&mut fetch),
			ext_max,
			ext: read(&mut fetch),
			ext_power: read(&mut fetch),
			ext_addr: read(&mut fetch),
		}
	}

	/// Reads the snapshot from the current processor.
	#[cfg(target_arch = "x86_64")]
	#[must_use]
	pub fn detect() -> Self {
		Self::from_query(super::cpuid)
	}

	/// Returns the processor vendor.
	#[must_use]
	pub fn vendor(&self) -> Vendor {
		self.basic.vendor()
	}

	/// VMX (`CPUID.01H:ECX.VMX`).
	#[must_use]
	pub const fn has_vmx(&self) -> bool {
		self.version.ecx.virtual_machine_extensions()
	}

	/// `CLFLUSHOPT`.
	#[must_use]
	pub const fn has_clflushopt(&self) -> bool {
		self.extended.ebx.clflushopt()
	}

	/// `CLWB`.
	#[must_use]
	pub const fn has_clwb(&self) -> bool {
		self.extended.ebx.clwb()
	}

	/// `CLDEMOTE`.
	#[must_use]
	pub const fn has_cldemote(&self) -> bool {
		self.extended.ecx.cldemote()
	}

	/// SSE4.2 (`CRC32`, `PCMPxSTRx`).
	#[must_use]
	pub const fn has_sse42(&self) -> bool {
		self.version.ecx.sse42()
	}

	/// `RDRAND`.
	#[must_use]
	pub const fn has_rdrand(&self) -> bool {
		self.version.ecx.rdrand()
	}

	/// `RDSEED`.
	#[must_use]
	pub const fn has_rdseed(&self) -> bool {
		self.extended.ebx.rdseed()
	}

	/// `XSAVE` family and `XCR0`.
	#[must_use]
	pub const fn has_xsave(&self) -> bool {
		self.version.ecx.xsave()
	}

	/// `XSAVEOPT`.
	#[must_use]
	pub const fn has_xsaveopt(&self) -> bool {
		self.xsave1.eax.xsaveopt()
	}

	/// `XSAVEC`.
	#[must_use]
	pub const fn has_xsavec(&self) -> bool {
		self.xsave1.eax.xsavec()
	}

	/// `XSAVES`/`XRSTORS`.
	#[must_use]
	pub const fn has_xsaves(&self) -> bool {
		self.xsave1.eax.xsaves()
	}

	/// x2APIC mode.
	#[must_use]
	pub const fn has_x2apic(&self) -> bool {
		self.version.ecx.x2apic()
	}

	/// Process-context identifiers (`CR4.PCIDE`).
	#[must_use]
	pub const fn has_pcid(&self) -> bool {
		self.version.ecx.pcid()
	}

	/// `INVPCID`.
	#[must_use]
	pub const fn has_invpcid(&self) -> bool {
		self.extended.ebx.invpcid()
	}

	/// `RDFSBASE` and friends.
	#[must_use]
	pub const fn has_fsgsbase(&self) -> bool {
		self.extended.ebx.fsgsbase()
	}

	/// 5-level paging.
	#[must_use]
	pub const fn has_la57(&self) -> bool {
		self.extended.ecx.la57()
	}

	/// Protection keys for user pages.
	#[must_use]
	pub const fn has_pku(&self) -> bool {
		self.extended.ecx.pku()
	}

	/// `SERIALIZE`.
	#[must_use]
	pub const fn has_serialize(&self) -> bool {
		self.extended.edx.serialize()
	}

	/// Flexible Return and Event Delivery.
	#[must_use]
	pub const fn has_fred(&self) -> bool {
		self.extended1.eax.fred()
	}

	/// 1-GByte pages.
	#[must_use]
	pub const fn has_page_1gb(&self) -> bool {
		self.ext.edx.page_1gb()
	}

	/// Execute-disable.
	#[must_use]
	pub const fn has_nx(&self) -> bool {
		self.ext.edx.nx()
	}

	/// `RDTSCP`.
	#[must_use]
	pub const fn has_rdtscp(&self) -> bool {
		self.ext.edx.rdtscp()
	}

	/// The TSC is invariant across power states.
	#[must_use]
	pub const fn has_invariant_tsc(&self) -> bool {
		self.ext_power.edx.invariant_tsc()
	}

	/// Returns the physical address width, defaulting to 36 bits if
	/// leaf `8000_0008H` is unavailable.
	#[must_use]
	pub const fn physical_address_bits(&self) -> u8 {
		match self.ext_addr.eax.physical_address_bits() {
			0 => 36,
			bits => bits,
		}
	}

	/// Returns the linear address width, defaulting to 48 bits if
	/// leaf `8000_0008H` is unavailable.
	#[must_use]
	pub const fn linear_address_bits(&self) -> u8 {
		match self.ext_addr.eax.linear_address_bits() {
			0 => 48,
			bits => bits,
		}
	}
}

/// Fetches a fixed leaf through `fetch`.
fn read<L: CpuidLeaf>(fetch: &mut impl FnMut(u32, u32) -> CpuidResult) -> L {
	L::from_result(fetch(L::LEAF, L::SUBLEAF))
}

#[cfg(test)]
mod tests {
	use super::*;

	/// An Intel part reporting basic leaves up to 0DH and extended
	/// leaves up to `8000_0008H`, with VMX, SSE4.2, CLFLUSHOPT and 1G pages.
	fn fake(leaf: u32, subleaf: u32) -> CpuidResult {
		match (leaf, subleaf) {
			(0, _) => CpuidResult {
				eax: 0x0D,
				ebx: u32::from_le_bytes(*b"Genu"),
				ecx: u32::from_le_bytes(*b"ntel"),
				edx: u32::from_le_bytes(*b"ineI"),
			},
			(1, _) => CpuidResult {
				eax: 0x0009_06EA,
				ebx: 0,
				ecx: (1 << 5) | (1 << 20),
				edx: 0,
			},
			(7, 0) => CpuidResult {
				ebx: 1 << 23,
				..CpuidResult::ZERO
			},
			(0x8000_0000, _) => CpuidResult {
				eax: 0x8000_0008,
				..CpuidResult::ZERO
			},
			(0x8000_0001, _) => CpuidResult {
				edx: 1 << 26,
				..CpuidResult::ZERO
			},
			(0x8000_0008, _) => CpuidResult {
				eax: 0x3027,
				..CpuidResult::ZERO
			},
			_ => CpuidResult::ZERO,
		}
	}

	#[test]
	fn predicates_follow_leaves() {
		let f = CpuFeatures::from_query(fake);
		assert_eq!(f.vendor(), Vendor::Intel);
		assert!(f.has_vmx());
		assert!(f.has_sse42());
		assert!(f.has_clflushopt());
		assert!(!f.has_clwb());
		assert!(f.has_page_1gb());
		assert!(!f.has_nx());
		assert_eq!(f.physical_address_bits(), 39);
		assert_eq!(f.linear_address_bits(), 48);
		assert_eq!(f.version.display_family(), 6);
		assert_eq!(f.version.display_model(), 0x9E);
	}

	#[test]
	fn leaves_above_maximum_are_not_queried() {
		let f = CpuFeatures::from_query(|leaf, subleaf| {
			match leaf {
				0 => CpuidResult {
					eax: 1,
					..CpuidResult::ZERO
				},
				0x8000_0000 => CpuidResult::ZERO,
				1 => fake(1, 0),
				_ => panic!("queried unavailable leaf {leaf:#x}:{subleaf}"),
			}
		});
		assert!(f.has_vmx());
		assert!(!f.has_clflushopt());
		assert!(!f.has_page_1gb());
		assert_eq!(f.physical_address_bits(), 36);
		assert_eq!(f.xsave, CpuidA0DC0::default());
	}

	#[test]
	#[cfg(target_arch = "x86_64")]
	fn detect_matches_direct_query() {
		let f = CpuFeatures::detect();
		assert!(f.basic.eax.max_cpuid_input_value() >= 1);
		assert_eq!(f.has_sse42(), std::arch::is_x86_feature_detected!("sse4.2"));
	}
}
