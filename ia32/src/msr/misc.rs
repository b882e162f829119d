//! Platform-level MSR records.

use ia32_macro::bitstruct;

use super::{
	IA32_APIC_BASE, IA32_FEATURE_CONTROL, IA32_MISC_ENABLE, IA32_SPEC_CTRL, MSR_PLATFORM_INFO,
	msr_value,
};

bitstruct! {
	/// `IA32_APIC_BASE`: local APIC base address and mode.
	pub struct ApicBase(u64) {
		/// This processor is the bootstrap processor.
		pub bsp[8] => as bool,
		/// x2APIC mode. Requires [`Self::enable()`].
		pub x2apic_enable[10] => as bool,
		/// The local APIC is globally enabled.
		pub enable[11] => as bool,
		/// Page frame number of the APIC register page.
		pub page_frame_number[47:12] => as u64,
	}
}

impl ApicBase {
	/// Returns the physical base address of the APIC register page.
	#[must_use]
	pub const fn base_address(self) -> u64 {
		self.page_frame_number() << 12
	}

	/// Returns a copy with the base set to `address`, which must be
	/// page aligned; lower bits are discarded.
	#[must_use]
	pub const fn with_base_address(self, address: u64) -> Self {
		self.with_page_frame_number(address >> 12)
	}
}

bitstruct! {
	/// `IA32_FEATURE_CONTROL`.
	///
	/// Once [`Self::lock()`] is set, further writes fault until reset.
	pub struct FeatureControl(u64) {
		/// Write-once lock.
		pub lock[0] => as bool,
		/// VMXON is allowed inside SMX operation.
		pub enable_vmx_inside_smx[1] => as bool,
		/// VMXON is allowed outside SMX operation.
		pub enable_vmx_outside_smx[2] => as bool,
		/// Enabled `SENTER` local functions (bits `[14:8]`).
		pub senter_local_function_enables[14:8] => as u8,
		/// `SENTER` global enable.
		pub senter_global_enable[15] => as bool,
		/// SGX launch control (`IA32_SGXLEPUBKEYHASHn` writable).
		pub sgx_launch_control_enable[17] => as bool,
		/// SGX global enable.
		pub sgx_global_enable[18] => as bool,
		/// Local machine-check exceptions.
		pub lmce_on[20] => as bool,
	}
}

bitstruct! {
	/// `IA32_MISC_ENABLE`.
	pub struct MiscEnable(u64) {
		/// Fast-strings enable.
		pub fast_strings[0] => as bool,
		/// Automatic thermal control circuit enable.
		pub automatic_thermal_control[3] => as bool,
		/// Performance monitoring available (read-only).
		pub performance_monitoring_available[7] => as bool,
		/// Branch trace storage unavailable (read-only).
		pub bts_unavailable[11] => as bool,
		/// PEBS unavailable (read-only).
		pub pebs_unavailable[12] => as bool,
		/// Enhanced Intel SpeedStep enable.
		pub eist_enable[16] => as bool,
		/// `MONITOR`/`MWAIT` enable.
		pub enable_monitor_fsm[18] => as bool,
		/// Limit `CPUID.00H:EAX` to 2.
		pub limit_cpuid_maxval[22] => as bool,
		/// xTPR messages disabled.
		pub xtpr_message_disable[23] => as bool,
		/// Execute-disable bit feature disabled.
		pub xd_bit_disable[34] => as bool,
	}
}

bitstruct! {
	/// `MSR_PLATFORM_INFO` (model-specific, present on most Intel cores
	/// since Nehalem).
	pub struct PlatformInfo(u64) {
		/// Maximum non-turbo ratio (base clock multiplier).
		pub max_non_turbo_ratio[15:8] => as u8,
		/// Programmable turbo ratio limits.
		pub programmable_ratio_limit[28] => as bool,
		/// Programmable TDP limits.
		pub programmable_tdp_limit[29] => as bool,
		/// Programmable TCC activation offset.
		pub programmable_tj_offset[30] => as bool,
		/// CPUID faulting is supported (`MSR_MISC_FEATURES_ENABLES[0]`).
		pub cpuid_faulting[32] => as bool,
		/// Maximum efficiency ratio.
		pub max_efficiency_ratio[47:40] => as u8,
		/// Minimum operating ratio.
		pub min_operating_ratio[55:48] => as u8,
	}
}

bitstruct! {
	/// `IA32_SPEC_CTRL`.
	pub struct SpecCtrl(u64) {
		/// Indirect branch restricted speculation.
		pub ibrs[0] => as bool,
		/// Single thread indirect branch predictors.
		pub stibp[1] => as bool,
		/// Speculative store bypass disable.
		pub ssbd[2] => as bool,
		/// Indirect predictor disable (user mode).
		pub ipred_dis_u[3] => as bool,
		/// Indirect predictor disable (supervisor mode).
		pub ipred_dis_s[4] => as bool,
		/// Return stack buffer alternate behaviour disable.
		pub rrsba_dis_u[5] => as bool,
		/// Return stack buffer alternate behaviour disable (supervisor).
		pub rrsba_dis_s[6] => as bool,
		/// Pointer-chasing data dependent prefetcher disable.
		pub psfd[7] => as bool,
		/// Branch history injection disable (supervisor).
		pub bhi_dis_s[10] => as bool,
	}
}

msr_value! {
	ApicBase = IA32_APIC_BASE,
	FeatureControl = IA32_FEATURE_CONTROL,
	MiscEnable = IA32_MISC_ENABLE,
	PlatformInfo = MSR_PLATFORM_INFO,
	SpecCtrl = IA32_SPEC_CTRL,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn apic_base_default_bsp() {
		let base = ApicBase::from_bits(0xFEE0_0900);
		assert!(base.bsp());
		assert!(base.enable());
		assert!(!base.x2apic_enable());
		assert_eq!(base.base_address(), 0xFEE0_0000);
		assert_eq!(ApicBase::PAGE_FRAME_NUMBER_FLAG, 0x0000_FFFF_FFFF_F000);
	}

	#[test]
	fn apic_base_relocation_keeps_flags() {
		let base = ApicBase::from_bits(0xFEE0_0900).with_base_address(0x1_2345_6789);
		assert_eq!(base.base_address(), 0x1_2345_6000);
		assert!(base.bsp());
		assert!(base.enable());
	}

	#[test]
	fn feature_control_vmx_locked() {
		let fc = FeatureControl::new()
			.with_lock(true)
			.with_enable_vmx_outside_smx(true);
		assert_eq!(fc.bits(), 0x5);
		assert!(!FeatureControl::from_bits(0x5).enable_vmx_inside_smx());
	}

	#[test]
	fn platform_info_ratios() {
		let info = PlatformInfo::from_bits(0x0008_0839_F301_2400);
		assert_eq!(info.max_non_turbo_ratio(), 0x24);
		assert!(info.cpuid_faulting());
		assert_eq!(info.max_efficiency_ratio(), 0x08);
		assert_eq!(info.min_operating_ratio(), 0x08);
	}
}
