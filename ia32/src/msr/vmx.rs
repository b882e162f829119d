//! VMX capability reporting MSRs (`IA32_VMX_*`).

use ia32_macro::bitstruct;

use super::{
	IA32_VMX_BASIC, IA32_VMX_ENTRY_CTLS, IA32_VMX_EPT_VPID_CAP, IA32_VMX_EXIT_CTLS, IA32_VMX_MISC,
	IA32_VMX_PINBASED_CTLS, IA32_VMX_PROCBASED_CTLS, IA32_VMX_TRUE_ENTRY_CTLS,
	IA32_VMX_TRUE_EXIT_CTLS, IA32_VMX_TRUE_PINBASED_CTLS, IA32_VMX_TRUE_PROCBASED_CTLS,
	IA32_VMX_VMFUNC, msr_value,
};
use crate::memtype::MemoryType;

bitstruct! {
	/// `IA32_VMX_BASIC`: basic VMX information.
	pub struct VmxBasic(u64) {
		/// VMCS revision identifier. Must be written to the first
		/// 31 bits of every VMCS and VMXON region.
		pub revision_id[30:0] => as u32,
		/// Number of bytes to allocate for VMCS and VMXON regions (at most 4096).
		pub region_size[44:32] => as u16,
		/// Region addresses are limited to 32 bits.
		pub physical_address_32bit[48] => as bool,
		/// Dual-monitor treatment of SMIs and SMM is supported.
		pub dual_monitor[49] => as bool,
		/// Memory type of the VMCS and related structures.
		pub memory_type[53:50] => as u8,
		/// VM exits due to `INS`/`OUTS` report instruction information.
		pub ins_outs_reporting[54] => as bool,
		/// The `IA32_VMX_TRUE_*` control MSRs are implemented.
		pub true_controls[55] => as bool,
		/// Hardware exceptions may be injected without regard to
		/// the deliver-error-code consistency rules.
		pub no_error_code_requirement[56] => as bool,
	}
}

impl VmxBasic {
	/// Returns the VMCS memory type, if it is a recognized one.
	#[must_use]
	pub const fn memory_type_kind(self) -> Option<MemoryType> {
		MemoryType::from_raw(self.memory_type())
	}

	/// Maps a default control capability MSR to the one that should be
	/// consulted, taking [`Self::true_controls()`] into account.
	///
	/// Addresses without a `TRUE_*` counterpart (e.g. the secondary
	/// processor-based controls) are returned unchanged.
	#[must_use]
	pub const fn control_msr(self, default: u32) -> u32 {
		if !self.true_controls() {
			return default;
		}

		match default {
			IA32_VMX_PINBASED_CTLS => IA32_VMX_TRUE_PINBASED_CTLS,
			IA32_VMX_PROCBASED_CTLS => IA32_VMX_TRUE_PROCBASED_CTLS,
			IA32_VMX_EXIT_CTLS => IA32_VMX_TRUE_EXIT_CTLS,
			IA32_VMX_ENTRY_CTLS => IA32_VMX_TRUE_ENTRY_CTLS,
			other => other,
		}
	}
}

/// Error returned when a requested VMX control value cannot be
/// represented under a [`ControlCapability`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ControlsError {
	/// The request sets controls the processor does not allow to be 1.
	#[error("VMX controls {unsupported:#010x} are not supported by the processor")]
	Unsupported {
		/// The requested bits that must be 0.
		unsupported: u32,
	},
}

bitstruct! {
	/// An allowed-0/allowed-1 VMX control capability pair
	/// (`IA32_VMX_*_CTLS` and `IA32_VMX_TRUE_*_CTLS`).
	///
	/// A control value `C` is valid when every bit set in
	/// [`Self::allowed0()`] is set in `C` and no bit clear in
	/// [`Self::allowed1()`] is set in `C`.
	pub struct ControlCapability(u64) {
		/// Controls that must be 1.
		pub allowed0[31:0] => as u32,
		/// Controls that may be 1.
		pub allowed1[63:32] => as u32,
	}
}

impl ControlCapability {
	/// Returns whether `value` satisfies the capability pair.
	#[must_use]
	pub const fn is_valid(self, value: u32) -> bool {
		(value & self.allowed0()) == self.allowed0() && (value & !self.allowed1()) == 0
	}

	/// Returns whether the given control bits may be set.
	#[must_use]
	pub const fn supports(self, bits: u32) -> bool {
		(bits & !self.allowed1()) == 0
	}

	/// Sets the mandatory controls on `requested`.
	///
	/// # Errors
	/// Returns [`ControlsError::Unsupported`] if `requested` sets any
	/// control the processor requires to be 0.
	pub const fn adjust(self, requested: u32) -> Result<u32, ControlsError> {
		let unsupported = requested & !self.allowed1();
		if unsupported != 0 {
			return Err(ControlsError::Unsupported { unsupported });
		}

		Ok(requested | self.allowed0())
	}

	/// Like [`Self::adjust`], but silently drops unsupported controls.
	#[must_use]
	pub const fn adjust_lossy(self, requested: u32) -> u32 {
		(requested | self.allowed0()) & self.allowed1()
	}
}

/// The `IA32_VMX_CRn_FIXED0`/`IA32_VMX_CRn_FIXED1` pair for `CR0` or
/// `CR4` in VMX operation.
///
/// Bits set in `fixed0` must be 1; bits clear in `fixed1` must be 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedBits {
	/// Bits that must be 1.
	pub fixed0: u64,
	/// Bits that may be 1.
	pub fixed1: u64,
}

impl FixedBits {
	/// Forces `value` into conformance.
	#[must_use]
	pub const fn apply(self, value: u64) -> u64 {
		(value | self.fixed0) & self.fixed1
	}

	/// Returns whether `value` already conforms.
	#[must_use]
	pub const fn is_valid(self, value: u64) -> bool {
		self.apply(value) == value
	}

	/// Reads the `CR0` pair.
	#[cfg(target_arch = "x86_64")]
	#[must_use]
	pub fn cr0() -> Self {
		Self {
			fixed0: super::read_msr(super::IA32_VMX_CR0_FIXED0),
			fixed1: super::read_msr(super::IA32_VMX_CR0_FIXED1),
		}
	}

	/// Reads the `CR4` pair.
	#[cfg(target_arch = "x86_64")]
	#[must_use]
	pub fn cr4() -> Self {
		Self {
			fixed0: super::read_msr(super::IA32_VMX_CR4_FIXED0),
			fixed1: super::read_msr(super::IA32_VMX_CR4_FIXED1),
		}
	}
}

bitstruct! {
	/// `IA32_VMX_MISC`: miscellaneous VMX capabilities.
	pub struct VmxMisc(u64) {
		/// The preemption timer counts down once every `2^rate` TSC ticks.
		pub preemption_timer_rate[4:0] => as u8,
		/// VM exits store `IA32_EFER.LMA` into the "IA-32e mode guest" entry control.
		pub store_efer_lma[5] => as bool,
		/// The HLT activity state is supported.
		pub activity_hlt[6] => as bool,
		/// The shutdown activity state is supported.
		pub activity_shutdown[7] => as bool,
		/// The wait-for-SIPI activity state is supported.
		pub activity_wait_for_sipi[8] => as bool,
		/// Intel PT may be used in VMX operation.
		pub intel_pt_in_vmx[14] => as bool,
		/// `RDMSR` can read `IA32_SMBASE` in SMM.
		pub rdmsr_smbase_in_smm[15] => as bool,
		/// Number of CR3-target values supported.
		pub cr3_target_count[24:16] => as u16,
		/// Recommended maximum MSR list size: `512 * (N + 1)`.
		pub max_msr_list[27:25] => as u8,
		/// `IA32_SMM_MONITOR_CTL` bit 2 may be set.
		pub smm_monitor_ctl_bit2[28] => as bool,
		/// `VMWRITE` may write read-only exit information fields.
		pub vmwrite_any_field[29] => as bool,
		/// Zero-length instruction injection is allowed.
		pub inject_zero_length[30] => as bool,
		/// MSEG revision identifier.
		pub mseg_revision[63:32] => as u32,
	}
}

impl VmxMisc {
	/// Returns the recommended maximum number of MSRs in each of the
	/// VM-exit/VM-entry MSR lists.
	#[must_use]
	pub const fn max_msr_list_entries(self) -> u32 {
		512 * (self.max_msr_list() as u32 + 1)
	}
}

bitstruct! {
	/// `IA32_VMX_EPT_VPID_CAP`: EPT and VPID capabilities.
	pub struct EptVpidCap(u64) {
		/// Execute-only EPT translations.
		pub execute_only[0] => as bool,
		/// 4-level page walk.
		pub page_walk_length_4[6] => as bool,
		/// 5-level page walk.
		pub page_walk_length_5[7] => as bool,
		/// EPT paging structures may be uncacheable.
		pub memory_type_uc[8] => as bool,
		/// EPT paging structures may be write-back.
		pub memory_type_wb[14] => as bool,
		/// 2 MiB EPT pages.
		pub pde_2mb[16] => as bool,
		/// 1 GiB EPT pages.
		pub pdpte_1gb[17] => as bool,
		/// `INVEPT` is supported.
		pub invept[20] => as bool,
		/// EPT accessed and dirty flags.
		pub ad_flags[21] => as bool,
		/// Advanced VM-exit information for EPT violations.
		pub advanced_vmexit_info[22] => as bool,
		/// Supervisor shadow-stack control.
		pub supervisor_shadow_stack[23] => as bool,
		/// Single-context `INVEPT`.
		pub invept_single_context[25] => as bool,
		/// All-context `INVEPT`.
		pub invept_all_context[26] => as bool,
		/// `INVVPID` is supported.
		pub invvpid[32] => as bool,
		/// Individual-address `INVVPID`.
		pub invvpid_individual_address[40] => as bool,
		/// Single-context `INVVPID`.
		pub invvpid_single_context[41] => as bool,
		/// All-context `INVVPID`.
		pub invvpid_all_context[42] => as bool,
		/// Single-context-retaining-globals `INVVPID`.
		pub invvpid_single_context_retaining_globals[43] => as bool,
		/// Maximum HLAT prefix size.
		pub max_hlat_prefix_size[53:48] => as u8,
	}
}

bitstruct! {
	/// `IA32_VMX_VMFUNC`: allowed VM functions.
	pub struct VmxVmfunc(u64) {
		/// EPTP switching (VM function 0).
		pub eptp_switching[0] => as bool,
	}
}

msr_value! {
	VmxBasic = IA32_VMX_BASIC,
	ControlCapability,
	VmxMisc = IA32_VMX_MISC,
	EptVpidCap = IA32_VMX_EPT_VPID_CAP,
	VmxVmfunc = IA32_VMX_VMFUNC,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn basic_decode() {
		let basic = VmxBasic::from_bits(0x00DA_1000_0000_0004);
		assert_eq!(basic.revision_id(), 4);
		assert_eq!(basic.region_size(), 0x1000);
		assert!(!basic.physical_address_32bit());
		assert_eq!(basic.memory_type_kind(), Some(MemoryType::WriteBack));
		assert!(basic.ins_outs_reporting());
		assert!(basic.true_controls());
		assert!(!basic.no_error_code_requirement());
	}

	#[test]
	fn control_msr_selection() {
		let legacy = VmxBasic::new();
		let true_ctls = VmxBasic::new().with_true_controls(true);
		assert_eq!(legacy.control_msr(IA32_VMX_PINBASED_CTLS), IA32_VMX_PINBASED_CTLS);
		assert_eq!(true_ctls.control_msr(IA32_VMX_PINBASED_CTLS), IA32_VMX_TRUE_PINBASED_CTLS);
		assert_eq!(true_ctls.control_msr(IA32_VMX_ENTRY_CTLS), IA32_VMX_TRUE_ENTRY_CTLS);
		assert_eq!(
			true_ctls.control_msr(super::super::IA32_VMX_PROCBASED_CTLS2),
			super::super::IA32_VMX_PROCBASED_CTLS2
		);
	}

	#[test]
	fn adjust_controls() {
		// Bits 1, 2 and 4 must be 1; bits 0-7 may be 1.
		let cap = ControlCapability::new().with_allowed0(0x16).with_allowed1(0xFF);
		assert_eq!(cap.adjust(0x01), Ok(0x17));
		assert_eq!(
			cap.adjust(0x101),
			Err(ControlsError::Unsupported { unsupported: 0x100 })
		);
		assert_eq!(cap.adjust_lossy(0x101), 0x17);
		assert!(cap.is_valid(0x17));
		assert!(!cap.is_valid(0x01));
		assert!(!cap.is_valid(0x117));
		assert!(cap.supports(0x80));
		assert!(!cap.supports(0x100));
	}

	#[test]
	fn fixed_bits() {
		let fixed = FixedBits {
			fixed0: 0x8000_0021,
			fixed1: 0xFFFF_FFFF,
		};
		assert_eq!(fixed.apply(0x11), 0x8000_0031);
		assert!(fixed.is_valid(0x8000_0031));
		assert!(!fixed.is_valid(0x11));
	}

	#[test]
	fn ept_vpid_cap() {
		let cap = EptVpidCap::from_bits(0x0000_0F01_0673_4141);
		assert!(cap.execute_only());
		assert!(cap.page_walk_length_4());
		assert!(!cap.page_walk_length_5());
		assert!(cap.memory_type_uc());
		assert!(cap.memory_type_wb());
		assert!(cap.pde_2mb());
		assert!(cap.pdpte_1gb());
		assert!(cap.invept());
		assert!(cap.ad_flags());
		assert!(cap.advanced_vmexit_info());
		assert!(cap.invept_single_context());
		assert!(cap.invept_all_context());
		assert!(cap.invvpid());
		assert!(cap.invvpid_single_context_retaining_globals());
	}

	#[test]
	fn misc_msr_list() {
		let misc = VmxMisc::new().with_cr3_target_count(4).with_max_msr_list(2);
		assert_eq!(misc.bits(), 0x0404_0000);
		assert_eq!(misc.max_msr_list(), 2);
		assert_eq!(misc.max_msr_list_entries(), 1536);
	}
}
