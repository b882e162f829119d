//! Hardware-controlled performance state (HWP) records.

use ia32_macro::bitstruct;

use super::{IA32_HWP_CAPABILITIES, IA32_HWP_INTERRUPT, IA32_HWP_REQUEST, IA32_HWP_STATUS, msr_value};

bitstruct! {
	/// `IA32_HWP_CAPABILITIES`: performance levels reported by the hardware.
	pub struct HwpCapabilities(u64) {
		/// Highest performance level.
		pub highest_performance[7:0] => as u8,
		/// Guaranteed performance level.
		pub guaranteed_performance[15:8] => as u8,
		/// Most efficient performance level.
		pub most_efficient_performance[23:16] => as u8,
		/// Lowest performance level.
		pub lowest_performance[31:24] => as u8,
	}
}

bitstruct! {
	/// `IA32_HWP_REQUEST` (also the layout of `IA32_HWP_REQUEST_PKG`).
	pub struct HwpRequest(u64) {
		/// Minimum performance hint.
		pub minimum_performance[7:0] => as u8,
		/// Maximum performance hint.
		pub maximum_performance[15:8] => as u8,
		/// Desired performance; zero leaves selection to the hardware.
		pub desired_performance[23:16] => as u8,
		/// Energy/performance preference: 0 favors performance, 255 energy.
		pub energy_performance_preference[31:24] => as u8,
		/// Activity window.
		pub activity_window[41:32] => as u16,
		/// Take fields from `IA32_HWP_REQUEST_PKG`.
		pub package_control[42] => as bool,
		/// Activity window is valid.
		pub activity_window_valid[59] => as bool,
		/// EPP is valid.
		pub epp_valid[60] => as bool,
		/// Desired performance is valid.
		pub desired_valid[61] => as bool,
		/// Maximum performance is valid.
		pub maximum_valid[62] => as bool,
		/// Minimum performance is valid.
		pub minimum_valid[63] => as bool,
	}
}

bitstruct! {
	/// `IA32_HWP_INTERRUPT`.
	pub struct HwpInterrupt(u64) {
		/// Notify on guaranteed performance change.
		pub guaranteed_change[0] => as bool,
		/// Notify on excursion below minimum.
		pub excursion_to_minimum[1] => as bool,
		/// Notify on highest performance change.
		pub highest_change[2] => as bool,
	}
}

bitstruct! {
	/// `IA32_HWP_STATUS`. Bits are sticky; clear by writing zero.
	pub struct HwpStatus(u64) {
		/// Guaranteed performance changed.
		pub guaranteed_change[0] => as bool,
		/// Excursion to minimum occurred.
		pub excursion_to_minimum[2] => as bool,
		/// Highest performance changed.
		pub highest_change[3] => as bool,
	}
}

msr_value! {
	HwpCapabilities = IA32_HWP_CAPABILITIES,
	HwpRequest = IA32_HWP_REQUEST,
	HwpInterrupt = IA32_HWP_INTERRUPT,
	HwpStatus = IA32_HWP_STATUS,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn capabilities() {
		let caps = HwpCapabilities::from_bits(0x0108_2A30);
		assert_eq!(caps.highest_performance(), 0x30);
		assert_eq!(caps.guaranteed_performance(), 0x2A);
		assert_eq!(caps.most_efficient_performance(), 0x08);
		assert_eq!(caps.lowest_performance(), 0x01);
	}

	#[test]
	fn request() {
		let req = HwpRequest::new()
			.with_minimum_performance(0x01)
			.with_maximum_performance(0x30)
			.with_energy_performance_preference(0x80);
		assert_eq!(req.bits(), 0x8000_3001);
	}
}
