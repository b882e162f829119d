//! Implements the CPUID 0F lookup structures, _Intel RDT Monitoring Enumeration_.

pub use self::{c0::CpuidA0FC0, c1::CpuidA0FC1};

mod c0 {
	use ia32_macro::bitstruct;

	use super::super::cpuid_leaf;

	bitstruct! {
		/// Gets the `eax` register values for the CPUID `eax=0F, ecx=0` leaf.
		pub struct Eax(u32) {}
	}

	bitstruct! {
		/// Gets the `ebx` register values for the CPUID `eax=0F, ecx=0` leaf.
		pub struct Ebx(u32) {
			/// Maximum RMID, across all resource types, minus one.
			pub max_rmid[31:0] => as u32,
		}
	}

	bitstruct! {
		/// Gets the `ecx` register values for the CPUID `eax=0F, ecx=0` leaf.
		pub struct Ecx(u32) {}
	}

	bitstruct! {
		/// Gets the `edx` register values for the CPUID `eax=0F, ecx=0` leaf.
		pub struct Edx(u32) {
			/// L3 cache RDT monitoring.
			pub l3_monitoring[1] => as bool,
		}
	}

	cpuid_leaf! {
		/// RDT monitoring, resource types.
		CpuidA0FC0 = (0x0F, 0x00)
	}
}

mod c1 {
	use ia32_macro::bitstruct;

	use super::super::cpuid_leaf;

	bitstruct! {
		/// Gets the `eax` register values for the CPUID `eax=0F, ecx=1` leaf.
		pub struct Eax(u32) {
			/// Width offset of the monitoring counters, minus 24.
			pub counter_width_offset[7:0] => as u8,
			/// Overflow bit in `IA32_QM_CTR`.
			pub overflow_bit[8] => as bool,
			/// Non-CPU agent RDT CMT.
			pub non_cpu_cmt[9] => as bool,
			/// Non-CPU agent RDT MBM.
			pub non_cpu_mbm[10] => as bool,
		}
	}

	bitstruct! {
		/// Gets the `ebx` register values for the CPUID `eax=0F, ecx=1` leaf.
		pub struct Ebx(u32) {
			/// Conversion factor from `IA32_QM_CTR` to bytes.
			pub upscaling_factor[31:0] => as u32,
		}
	}

	bitstruct! {
		/// Gets the `ecx` register values for the CPUID `eax=0F, ecx=1` leaf.
		pub struct Ecx(u32) {
			/// Maximum L3 RMID, minus one.
			pub max_rmid[31:0] => as u32,
		}
	}

	bitstruct! {
		/// Gets the `edx` register values for the CPUID `eax=0F, ecx=1` leaf.
		pub struct Edx(u32) {
			/// L3 occupancy monitoring.
			pub l3_occupancy[0] => as bool,
			/// L3 total bandwidth monitoring.
			pub l3_total_bandwidth[1] => as bool,
			/// L3 local bandwidth monitoring.
			pub l3_local_bandwidth[2] => as bool,
		}
	}

	cpuid_leaf! {
		/// RDT monitoring, L3 cache capability.
		CpuidA0FC1 = (0x0F, 0x01)
	}

	impl CpuidA0FC1 {
		/// Returns the width, in bits, of the monitoring counters.
		#[must_use]
		pub const fn counter_width(&self) -> u32 {
			self.eax.counter_width_offset() as u32 + 24
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::cpuid::{CpuidLeaf, CpuidResult};

	#[test]
	fn counter_width_is_offset_from_24() {
		let leaf = CpuidA0FC1::from_result(CpuidResult {
			eax: 0x0000_0120,
			ebx: 0x0001_0000,
			ecx: 0x0000_00FF,
			edx: 0x0000_0007,
		});
		assert_eq!(leaf.counter_width(), 56);
		assert!(leaf.eax.overflow_bit());
		assert!(leaf.edx.l3_local_bandwidth());
		assert_eq!(leaf.ecx.max_rmid(), 0xFF);
	}
}
