//! Implements the CPUID 0A:0 lookup structure, _Architectural Performance Monitoring_.

use ia32_macro::bitstruct;

use super::cpuid_leaf;

bitstruct! {
	/// Gets the `eax` register values for the CPUID `eax=0A` leaf.
	pub struct Eax(u32) {
		/// Architectural performance monitoring version.
		pub version_id[7:0] => as u8,
		/// Number of general-purpose counters per logical processor.
		pub gp_counters[15:8] => as u8,
		/// Bit width of the general-purpose counters.
		pub gp_counter_width[23:16] => as u8,
		/// Length of the `ebx` event-availability bit vector.
		pub ebx_vector_length[31:24] => as u8,
	}
}

bitstruct! {
	/// Gets the `ebx` register values for the CPUID `eax=0A` leaf.
	///
	/// A set bit means the event is **not** available.
	pub struct Ebx(u32) {
		/// Core cycles.
		pub core_cycles_unavailable[0] => as bool,
		/// Instructions retired.
		pub instructions_retired_unavailable[1] => as bool,
		/// Reference cycles.
		pub reference_cycles_unavailable[2] => as bool,
		/// Last-level cache references.
		pub llc_references_unavailable[3] => as bool,
		/// Last-level cache misses.
		pub llc_misses_unavailable[4] => as bool,
		/// Branch instructions retired.
		pub branches_retired_unavailable[5] => as bool,
		/// Branch mispredicts retired.
		pub branch_mispredicts_unavailable[6] => as bool,
		/// Top-down slots.
		pub topdown_slots_unavailable[7] => as bool,
	}
}

bitstruct! {
	/// Gets the `ecx` register values for the CPUID `eax=0A` leaf.
	pub struct Ecx(u32) {
		/// Supported fixed-function counters bit mask.
		pub fixed_counter_mask[31:0] => as u32,
	}
}

bitstruct! {
	/// Gets the `edx` register values for the CPUID `eax=0A` leaf.
	pub struct Edx(u32) {
		/// Number of contiguous fixed-function counters.
		pub fixed_counters[4:0] => as u8,
		/// Bit width of the fixed-function counters.
		pub fixed_counter_width[12:5] => as u8,
		/// `AnyThread` deprecation.
		pub any_thread_deprecation[15] => as bool,
	}
}

cpuid_leaf! {
	/// Architectural Performance Monitoring.
	CpuidA0AC0 = (0x0A, 0x00)
}

impl CpuidA0AC0 {
	/// Returns whether fixed-function counter `index` is supported.
	#[must_use]
	pub const fn has_fixed_counter(&self, index: u32) -> bool {
		index < 32
			&& ((self.ecx.fixed_counter_mask() >> index) & 1 == 1
				|| index < self.edx.fixed_counters() as u32)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::cpuid::{CpuidLeaf, CpuidResult};

	#[test]
	fn decodes_pmu() {
		let leaf = CpuidA0AC0::from_result(CpuidResult {
			eax: 0x0730_0805,
			ebx: 0,
			ecx: 0,
			edx: 0x0000_8603,
		});
		assert_eq!(leaf.eax.version_id(), 5);
		assert_eq!(leaf.eax.gp_counters(), 8);
		assert_eq!(leaf.eax.gp_counter_width(), 48);
		assert_eq!(leaf.edx.fixed_counters(), 3);
		assert_eq!(leaf.edx.fixed_counter_width(), 48);
		assert!(leaf.edx.any_thread_deprecation());
		assert!(leaf.has_fixed_counter(2));
		assert!(!leaf.has_fixed_counter(3));
	}
}
