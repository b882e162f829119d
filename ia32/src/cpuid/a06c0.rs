//! Implements the CPUID 06:0 lookup structure, _Thermal and Power Management_.

use ia32_macro::bitstruct;

use super::cpuid_leaf;

bitstruct! {
	/// Gets the `eax` register values for the CPUID `eax=06` leaf.
	pub struct Eax(u32) {
		/// Digital temperature sensor.
		pub digital_temperature_sensor[0] => as bool,
		/// Intel Turbo Boost technology.
		pub turbo_boost[1] => as bool,
		/// APIC timer always running (not stopped in deep C-states).
		pub arat[2] => as bool,
		/// Power limit notification controls.
		pub pln[4] => as bool,
		/// Clock modulation duty cycle extension.
		pub ecmd[5] => as bool,
		/// Package thermal management.
		pub ptm[6] => as bool,
		/// HWP base registers (`IA32_PM_ENABLE`, `IA32_HWP_CAPABILITIES`, ...).
		pub hwp[7] => as bool,
		/// `IA32_HWP_INTERRUPT`.
		pub hwp_notification[8] => as bool,
		/// `IA32_HWP_REQUEST[41:32]` activity window.
		pub hwp_activity_window[9] => as bool,
		/// `IA32_HWP_REQUEST[31:24]` energy/performance preference.
		pub hwp_energy_performance_preference[10] => as bool,
		/// `IA32_HWP_REQUEST_PKG`.
		pub hwp_package_level_request[11] => as bool,
		/// Hardware duty cycling.
		pub hdc[13] => as bool,
		/// Intel Turbo Boost Max technology 3.0.
		pub turbo_boost_max[14] => as bool,
		/// Interrupts on highest-performance changes.
		pub hwp_highest_performance_change[15] => as bool,
		/// HWP PECI override.
		pub hwp_peci_override[16] => as bool,
		/// Flexible HWP.
		pub flexible_hwp[17] => as bool,
		/// Fast access mode for `IA32_HWP_REQUEST`.
		pub fast_hwp_request[18] => as bool,
		/// Hardware feedback interface.
		pub hw_feedback[19] => as bool,
		/// Ignoring idle logical processor HWP request.
		pub ignore_idle_hwp_request[20] => as bool,
		/// Intel Thread Director.
		pub thread_director[23] => as bool,
		/// `IA32_THERM_INTERRUPT` bit 25.
		pub therm_interrupt_bit25[24] => as bool,
	}
}

bitstruct! {
	/// Gets the `ebx` register values for the CPUID `eax=06` leaf.
	pub struct Ebx(u32) {
		/// Number of interrupt thresholds in the digital thermal sensor.
		pub interrupt_thresholds[3:0] => as u8,
	}
}

bitstruct! {
	/// Gets the `ecx` register values for the CPUID `eax=06` leaf.
	pub struct Ecx(u32) {
		/// Hardware coordination feedback (`IA32_MPERF`/`IA32_APERF`).
		pub hardware_coordination_feedback[0] => as bool,
		/// Performance-energy bias preference (`IA32_ENERGY_PERF_BIAS`).
		pub energy_performance_bias[3] => as bool,
		/// Number of Intel Thread Director classes.
		pub thread_director_classes[15:8] => as u8,
	}
}

bitstruct! {
	/// Gets the `edx` register values for the CPUID `eax=06` leaf.
	pub struct Edx(u32) {
		/// Performance capability reporting.
		pub performance_capability_reporting[0] => as bool,
		/// Energy efficiency capability reporting.
		pub energy_efficiency_capability_reporting[1] => as bool,
		/// Size of the feedback interface structure, in 4 KiB pages, minus one.
		pub feedback_interface_size[11:8] => as u8,
		/// Index of this processor's row in the feedback structure.
		pub this_processor_index[31:16] => as u16,
	}
}

cpuid_leaf! {
	/// Thermal and Power Management.
	CpuidA06C0 = (0x06, 0x00)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn hwp_bits() {
		assert_eq!(Eax::ARAT_FLAG, 1 << 2);
		assert_eq!(Eax::HWP_BIT, 7);
		assert_eq!(Eax::THREAD_DIRECTOR_BIT, 23);
		assert_eq!(Edx::THIS_PROCESSOR_INDEX_FLAG, 0xFFFF_0000);
		assert_eq!(Eax::RESERVED_MASK & (1 << 3), 1 << 3);
	}
}
