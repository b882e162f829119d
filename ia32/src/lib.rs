#![cfg_attr(
	not(doc),
	expect(missing_docs, reason = "docs are enabled only under `doc` cfg")
)]
#![cfg_attr(doc, doc = include_str!("../README.md"))]
#![cfg_attr(not(test), no_std)]
#![cfg_attr(doc, feature(doc_cfg))]

#[cfg(all(feature = "serialize-lfence", feature = "serialize-clts"))]
compile_error!("'serialize-lfence' and 'serialize-clts' are mutually exclusive");

pub mod apic;
pub mod consts;
pub mod cpuid;
pub mod crc32;
pub mod ept;
pub mod exception;
pub mod irql;
pub mod memtype;
pub mod msr;
pub mod paging;
pub mod pcmpstr;
pub mod reg;
pub mod segment;
pub mod serialize;
pub mod sgx;
pub mod unroll;
pub mod vmx;
pub mod xsave;

#[cfg(target_arch = "x86_64")]
pub mod asm;
#[cfg(target_arch = "x86_64")]
pub mod cache;
#[cfg(target_arch = "x86_64")]
pub mod port;
#[cfg(target_arch = "x86_64")]
pub mod random;
#[cfg(target_arch = "x86_64")]
pub mod string;
#[cfg(target_arch = "x86_64")]
pub mod tlb;
#[cfg(target_arch = "x86_64")]
pub mod tsc;

#[cfg(test)]
mod tests {
	/// Checks that the defined and reserved masks of each record
	/// partition its full width.
	macro_rules! assert_partitions_width {
		($($ty:ty => $prim:ty),* $(,)?) => {$(
			assert_eq!(<$ty>::WIDTH, <$prim>::BITS, stringify!($ty));
			assert_eq!(<$ty>::DEFINED_MASK & <$ty>::RESERVED_MASK, 0, stringify!($ty));
			assert_eq!(<$ty>::DEFINED_MASK | <$ty>::RESERVED_MASK, <$prim>::MAX, stringify!($ty));
			assert_eq!(<$ty>::CONST_MASK & !<$ty>::DEFINED_MASK, 0, stringify!($ty));
			assert_eq!(<$ty>::new().bits() & !<$ty>::CONST_MASK, 0, stringify!($ty));
		)*};
	}

	#[test]
	fn records_partition_their_width() {
		assert_partitions_width! {
			crate::reg::Cr0 => u64,
			crate::reg::Cr3 => u64,
			crate::reg::Cr4 => u64,
			crate::reg::Cr8 => u64,
			crate::reg::Dr6 => u64,
			crate::reg::Dr7 => u64,
			crate::reg::Rflags => u64,
			crate::reg::Xcr0 => u64,
			crate::paging::Pml4e => u64,
			crate::paging::Pde2m => u64,
			crate::paging::Pte => u64,
			crate::ept::Eptp => u64,
			crate::ept::Pte => u64,
			crate::msr::ApicBase => u64,
			crate::msr::Efer => u64,
			crate::msr::MiscEnable => u64,
			crate::msr::PerfEvtSel => u64,
			crate::msr::VmxBasic => u64,
			crate::segment::SegmentSelector => u16,
			crate::segment::AccessRights => u32,
			crate::segment::Descriptor32 => u64,
			crate::segment::SystemDescriptor => u128,
			crate::apic::Icr => u64,
			crate::vmx::ExitReason => u32,
			crate::vmx::PinBasedControls => u32,
			crate::vmx::EntryInterruptionInfo => u32,
			crate::vmx::Interruptibility => u32,
			crate::exception::PageFaultError => u32,
			crate::xsave::Mxcsr => u32,
			crate::pcmpstr::PcmpMode => u8,
		}
	}

	#[test]
	#[cfg(target_arch = "x86_64")]
	fn pmc_selector_partitions_width() {
		assert_partitions_width! {
			crate::tsc::PmcSelector => u32,
		}
		assert_eq!(crate::tsc::PmcSelector::FIXED_FLAG, 1 << 30);
	}
}
