//! Thermal monitoring records.

use ia32_macro::bitstruct;

use super::{
	IA32_CLOCK_MODULATION, IA32_PACKAGE_THERM_INTERRUPT, IA32_PACKAGE_THERM_STATUS,
	IA32_THERM_INTERRUPT, IA32_THERM_STATUS, msr_value,
};

bitstruct! {
	/// `IA32_CLOCK_MODULATION`: on-demand clock modulation.
	pub struct ClockModulation(u64) {
		/// Extended duty cycle (bit 0, with extended modulation).
		pub extended_duty_cycle[0] => as bool,
		/// Duty cycle in 12.5% steps.
		pub duty_cycle[3:1] => as u8,
		/// On-demand clock modulation enable.
		pub enable[4] => as bool,
	}
}

bitstruct! {
	/// `IA32_THERM_INTERRUPT`: core thermal interrupt enables.
	pub struct ThermInterrupt(u64) {
		/// High-temperature interrupt enable.
		pub high_temp[0] => as bool,
		/// Low-temperature interrupt enable.
		pub low_temp[1] => as bool,
		/// PROCHOT# interrupt enable.
		pub prochot[2] => as bool,
		/// FORCEPR# interrupt enable.
		pub forcepr[3] => as bool,
		/// Critical temperature interrupt enable.
		pub critical_temp[4] => as bool,
		/// Threshold #1 value, in degrees below TCC activation.
		pub threshold1_value[14:8] => as u8,
		/// Threshold #1 interrupt enable.
		pub threshold1_enable[15] => as bool,
		/// Threshold #2 value.
		pub threshold2_value[22:16] => as u8,
		/// Threshold #2 interrupt enable.
		pub threshold2_enable[23] => as bool,
		/// Power limit notification enable.
		pub power_limit_notification[24] => as bool,
	}
}

bitstruct! {
	/// `IA32_THERM_STATUS`: core thermal status.
	///
	/// `*_log` bits are sticky and cleared by writing zero.
	pub struct ThermStatus(u64) {
		/// Thermal status.
		pub status[0] => as bool,
		/// Thermal status log.
		pub status_log[1] => as bool,
		/// PROCHOT# or FORCEPR# event.
		pub prochot[2] => as bool,
		/// PROCHOT# or FORCEPR# log.
		pub prochot_log[3] => as bool,
		/// Critical temperature status.
		pub critical_temp[4] => as bool,
		/// Critical temperature status log.
		pub critical_temp_log[5] => as bool,
		/// Thermal threshold #1 status.
		pub threshold1[6] => as bool,
		/// Thermal threshold #1 log.
		pub threshold1_log[7] => as bool,
		/// Thermal threshold #2 status.
		pub threshold2[8] => as bool,
		/// Thermal threshold #2 log.
		pub threshold2_log[9] => as bool,
		/// Power limitation status.
		pub power_limit[10] => as bool,
		/// Power limitation log.
		pub power_limit_log[11] => as bool,
		/// Current limit status.
		pub current_limit[12] => as bool,
		/// Current limit log.
		pub current_limit_log[13] => as bool,
		/// Cross-domain limit status.
		pub cross_domain_limit[14] => as bool,
		/// Cross-domain limit log.
		pub cross_domain_limit_log[15] => as bool,
		/// Digital readout: degrees below TCC activation.
		pub digital_readout[22:16] => as u8,
		/// Resolution of the readout, in degrees Celsius.
		pub resolution[30:27] => as u8,
		/// The digital readout is valid.
		pub reading_valid[31] => as bool,
	}
}

bitstruct! {
	/// `IA32_PACKAGE_THERM_STATUS`: package thermal status.
	pub struct PackageThermStatus(u64) {
		/// Package thermal status.
		pub status[0] => as bool,
		/// Package thermal status log.
		pub status_log[1] => as bool,
		/// Package PROCHOT# event.
		pub prochot[2] => as bool,
		/// Package PROCHOT# log.
		pub prochot_log[3] => as bool,
		/// Package critical temperature status.
		pub critical_temp[4] => as bool,
		/// Package critical temperature log.
		pub critical_temp_log[5] => as bool,
		/// Package threshold #1 status.
		pub threshold1[6] => as bool,
		/// Package threshold #1 log.
		pub threshold1_log[7] => as bool,
		/// Package threshold #2 status.
		pub threshold2[8] => as bool,
		/// Package threshold #2 log.
		pub threshold2_log[9] => as bool,
		/// Package power limitation log.
		pub power_limit_log[11] => as bool,
		/// Package digital readout.
		pub digital_readout[22:16] => as u8,
		/// HWP feedback interface structure updated.
		pub hfi_updated[26] => as bool,
	}
}

bitstruct! {
	/// `IA32_PACKAGE_THERM_INTERRUPT`: package thermal interrupt enables.
	pub struct PackageThermInterrupt(u64) {
		/// High-temperature interrupt enable.
		pub high_temp[0] => as bool,
		/// Low-temperature interrupt enable.
		pub low_temp[1] => as bool,
		/// PROCHOT# interrupt enable.
		pub prochot[2] => as bool,
		/// Overheat interrupt enable.
		pub overheat[4] => as bool,
		/// Threshold #1 value.
		pub threshold1_value[14:8] => as u8,
		/// Threshold #1 interrupt enable.
		pub threshold1_enable[15] => as bool,
		/// Threshold #2 value.
		pub threshold2_value[22:16] => as u8,
		/// Threshold #2 interrupt enable.
		pub threshold2_enable[23] => as bool,
		/// Power limit notification enable.
		pub power_limit_notification[24] => as bool,
		/// HWP feedback interface notification enable.
		pub hfi_enable[25] => as bool,
	}
}

msr_value! {
	ClockModulation = IA32_CLOCK_MODULATION,
	ThermInterrupt = IA32_THERM_INTERRUPT,
	ThermStatus = IA32_THERM_STATUS,
	PackageThermStatus = IA32_PACKAGE_THERM_STATUS,
	PackageThermInterrupt = IA32_PACKAGE_THERM_INTERRUPT,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn therm_status_readout() {
		let status = ThermStatus::from_bits(0x8834_0000);
		assert!(status.reading_valid());
		assert_eq!(status.resolution(), 1);
		assert_eq!(status.digital_readout(), 0x34);
		assert!(!status.status());
	}
}
