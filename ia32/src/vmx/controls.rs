//! VM-execution, VM-exit and VM-entry control fields.
//!
//! Every value written to the VMCS must first be passed through the
//! matching [`ControlCapability`](crate::msr::ControlCapability) so that
//! reserved controls hold the values the processor requires.

use ia32_macro::bitstruct;

bitstruct! {
	/// Pin-based VM-execution controls (`PIN_BASED_VM_EXECUTION_CONTROLS`).
	pub struct PinBasedControls(u32) {
		/// External interrupts cause VM exits.
		pub external_interrupt_exiting[0] => as bool,
		/// NMIs cause VM exits.
		pub nmi_exiting[3] => as bool,
		/// NMIs are never blocked and virtual-NMI blocking is tracked.
		pub virtual_nmis[5] => as bool,
		/// Activate the VMX-preemption timer.
		pub preemption_timer[6] => as bool,
		/// Process posted interrupts.
		pub posted_interrupts[7] => as bool,
	}
}

bitstruct! {
	/// Primary processor-based VM-execution controls
	/// (`PRIMARY_PROCESSOR_BASED_VM_EXECUTION_CONTROLS`).
	pub struct ProcessorControls(u32) {
		/// Exit at the start of any instruction with `RFLAGS.IF=1` and no blocking.
		pub interrupt_window_exiting[2] => as bool,
		/// Apply `TSC_OFFSET` to guest TSC reads.
		pub use_tsc_offsetting[3] => as bool,
		/// `HLT` exits.
		pub hlt_exiting[7] => as bool,
		/// `INVLPG` exits.
		pub invlpg_exiting[9] => as bool,
		/// `MWAIT` exits.
		pub mwait_exiting[10] => as bool,
		/// `RDPMC` exits.
		pub rdpmc_exiting[11] => as bool,
		/// `RDTSC`/`RDTSCP` exit.
		pub rdtsc_exiting[12] => as bool,
		/// `MOV` to `CR3` exits unless the value is a CR3 target.
		pub cr3_load_exiting[15] => as bool,
		/// `MOV` from `CR3` exits.
		pub cr3_store_exiting[16] => as bool,
		/// Use the tertiary processor-based controls.
		pub activate_tertiary_controls[17] => as bool,
		/// `MOV` to `CR8` exits.
		pub cr8_load_exiting[19] => as bool,
		/// `MOV` from `CR8` exits.
		pub cr8_store_exiting[20] => as bool,
		/// Virtualize the TPR through the virtual-APIC page.
		pub use_tpr_shadow[21] => as bool,
		/// Exit when there is no virtual-NMI blocking.
		pub nmi_window_exiting[22] => as bool,
		/// `MOV DR` exits.
		pub mov_dr_exiting[23] => as bool,
		/// Every I/O instruction exits (ignored when I/O bitmaps are used).
		pub unconditional_io_exiting[24] => as bool,
		/// Use the I/O bitmaps.
		pub use_io_bitmaps[25] => as bool,
		/// Set the monitor trap flag.
		pub monitor_trap_flag[27] => as bool,
		/// Use the MSR bitmaps.
		pub use_msr_bitmaps[28] => as bool,
		/// `MONITOR` exits.
		pub monitor_exiting[29] => as bool,
		/// `PAUSE` exits.
		pub pause_exiting[30] => as bool,
		/// Use the secondary processor-based controls.
		pub activate_secondary_controls[31] => as bool,
	}
}

bitstruct! {
	/// Secondary processor-based VM-execution controls
	/// (`SECONDARY_PROCESSOR_BASED_VM_EXECUTION_CONTROLS`).
	pub struct SecondaryControls(u32) {
		/// Treat accesses to the APIC-access page specially.
		pub virtualize_apic_accesses[0] => as bool,
		/// Enable EPT.
		pub enable_ept[1] => as bool,
		/// Descriptor-table instructions exit.
		pub descriptor_table_exiting[2] => as bool,
		/// `RDTSCP` does not raise `#UD`.
		pub enable_rdtscp[3] => as bool,
		/// Virtualize x2APIC MSR accesses.
		pub virtualize_x2apic_mode[4] => as bool,
		/// Tag guest TLB entries with a VPID.
		pub enable_vpid[5] => as bool,
		/// `WBINVD`/`WBNOINVD` exit.
		pub wbinvd_exiting[6] => as bool,
		/// The guest may run unpaged or in real mode.
		pub unrestricted_guest[7] => as bool,
		/// Virtualize APIC register reads.
		pub apic_register_virtualization[8] => as bool,
		/// Evaluate and deliver pending virtual interrupts.
		pub virtual_interrupt_delivery[9] => as bool,
		/// Exit on a series of closely spaced `PAUSE` loops.
		pub pause_loop_exiting[10] => as bool,
		/// `RDRAND` exits.
		pub rdrand_exiting[11] => as bool,
		/// `INVPCID` does not raise `#UD`.
		pub enable_invpcid[12] => as bool,
		/// `VMFUNC` is enabled.
		pub enable_vm_functions[13] => as bool,
		/// `VMREAD`/`VMWRITE` in the guest may access a shadow VMCS.
		pub vmcs_shadowing[14] => as bool,
		/// `ENCLS` consults the ENCLS-exiting bitmap.
		pub enable_encls_exiting[15] => as bool,
		/// `RDSEED` exits.
		pub rdseed_exiting[16] => as bool,
		/// Log guest-physical addresses of written pages.
		pub enable_pml[17] => as bool,
		/// EPT violations may be converted to `#VE`.
		pub ept_violation_ve[18] => as bool,
		/// Hide VMX non-root operation from Intel PT.
		pub conceal_vmx_from_pt[19] => as bool,
		/// `XSAVES`/`XRSTORS` do not raise `#UD`.
		pub enable_xsaves[20] => as bool,
		/// PASID translation for `ENQCMD`/`ENQCMDS`.
		pub pasid_translation[21] => as bool,
		/// EPT execute permissions distinguish supervisor and user linear addresses.
		pub mode_based_execute_control[22] => as bool,
		/// EPT write permissions may be specified per 128-byte sub-page.
		pub sub_page_write_permissions[23] => as bool,
		/// Intel PT output addresses are guest-physical.
		pub pt_uses_guest_physical_addresses[24] => as bool,
		/// Apply `TSC_MULTIPLIER` to guest TSC reads.
		pub use_tsc_scaling[25] => as bool,
		/// `UMWAIT`/`UMONITOR`/`TPAUSE` do not raise `#UD`.
		pub enable_user_wait_pause[26] => as bool,
		/// `PCONFIG` does not raise `#UD`.
		pub enable_pconfig[27] => as bool,
		/// `ENCLV` consults the ENCLV-exiting bitmap.
		pub enable_enclv_exiting[28] => as bool,
		/// Bus locks cause VM exits.
		pub vmm_bus_lock_detection[30] => as bool,
		/// Exit when an instruction takes too long.
		pub instruction_timeout[31] => as bool,
	}
}

bitstruct! {
	/// Tertiary processor-based VM-execution controls
	/// (`TERTIARY_PROCESSOR_BASED_VM_EXECUTION_CONTROLS`).
	pub struct TertiaryControls(u64) {
		/// `LOADIWKEY` exits.
		pub loadiwkey_exiting[0] => as bool,
		/// Enable hypervisor-managed linear-address translation.
		pub enable_hlat[1] => as bool,
		/// EPT paging-write control.
		pub ept_paging_write_control[2] => as bool,
		/// Guest-paging verification.
		pub guest_paging_verification[3] => as bool,
		/// IPI virtualization.
		pub ipi_virtualization[4] => as bool,
		/// Virtualize `IA32_SPEC_CTRL`.
		pub virtualize_spec_ctrl[7] => as bool,
	}
}

bitstruct! {
	/// Primary VM-exit controls (`PRIMARY_VMEXIT_CONTROLS`).
	pub struct ExitControls(u32) {
		/// Save `DR7` and `IA32_DEBUGCTL`.
		pub save_debug_controls[2] => as bool,
		/// Return to a 64-bit host.
		pub host_address_space_size[9] => as bool,
		/// Load `IA32_PERF_GLOBAL_CTRL`.
		pub load_perf_global_ctrl[12] => as bool,
		/// Acknowledge the interrupt controller on external-interrupt exits.
		pub acknowledge_interrupt_on_exit[15] => as bool,
		/// Save `IA32_PAT`.
		pub save_pat[18] => as bool,
		/// Load `IA32_PAT`.
		pub load_pat[19] => as bool,
		/// Save `IA32_EFER`.
		pub save_efer[20] => as bool,
		/// Load `IA32_EFER`.
		pub load_efer[21] => as bool,
		/// Save the VMX-preemption timer value.
		pub save_preemption_timer[22] => as bool,
		/// Clear `IA32_BNDCFGS`.
		pub clear_bndcfgs[23] => as bool,
		/// Hide VM exits from Intel PT.
		pub conceal_vmx_from_pt[24] => as bool,
		/// Clear `IA32_RTIT_CTL`.
		pub clear_rtit_ctl[25] => as bool,
		/// Clear `IA32_LBR_CTL`.
		pub clear_lbr_ctl[26] => as bool,
		/// Clear `UINV`.
		pub clear_uinv[27] => as bool,
		/// Load CET state.
		pub load_cet_state[28] => as bool,
		/// Load `IA32_PKRS`.
		pub load_pkrs[29] => as bool,
		/// Save `IA32_PERF_GLOBAL_CTRL`.
		pub save_perf_global_ctrl[30] => as bool,
		/// Use the secondary VM-exit controls.
		pub activate_secondary_controls[31] => as bool,
	}
}

bitstruct! {
	/// VM-entry controls (`VMENTRY_CONTROLS`).
	pub struct EntryControls(u32) {
		/// Load `DR7` and `IA32_DEBUGCTL`.
		pub load_debug_controls[2] => as bool,
		/// The guest runs in IA-32e mode.
		pub ia32e_mode_guest[9] => as bool,
		/// Enter SMM.
		pub entry_to_smm[10] => as bool,
		/// Deactivate dual-monitor treatment.
		pub deactivate_dual_monitor[11] => as bool,
		/// Load `IA32_PERF_GLOBAL_CTRL`.
		pub load_perf_global_ctrl[13] => as bool,
		/// Load `IA32_PAT`.
		pub load_pat[14] => as bool,
		/// Load `IA32_EFER`.
		pub load_efer[15] => as bool,
		/// Load `IA32_BNDCFGS`.
		pub load_bndcfgs[16] => as bool,
		/// Hide VM entries from Intel PT.
		pub conceal_vmx_from_pt[17] => as bool,
		/// Load `IA32_RTIT_CTL`.
		pub load_rtit_ctl[18] => as bool,
		/// Load `UINV`.
		pub load_uinv[19] => as bool,
		/// Load CET state.
		pub load_cet_state[20] => as bool,
		/// Load `IA32_LBR_CTL`.
		pub load_lbr_ctl[21] => as bool,
		/// Load `IA32_PKRS`.
		pub load_pkrs[22] => as bool,
	}
}

impl PinBasedControls {
	/// Reserved controls that are 1 in the default (non-`TRUE`) capability MSR.
	pub const DEFAULT1: u32 = 0x0000_0016;
}

impl ProcessorControls {
	/// Reserved controls that are 1 in the default (non-`TRUE`) capability MSR.
	pub const DEFAULT1: u32 = 0x0401_E172;
}

impl ExitControls {
	/// Reserved controls that are 1 in the default (non-`TRUE`) capability MSR.
	pub const DEFAULT1: u32 = 0x0003_6DFF;
}

impl EntryControls {
	/// Reserved controls that are 1 in the default (non-`TRUE`) capability MSR.
	pub const DEFAULT1: u32 = 0x0000_11FF;
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::msr::ControlCapability;

	#[test]
	fn default1_classes_are_undefined_bits() {
		assert_eq!(PinBasedControls::DEFAULT1 & PinBasedControls::DEFINED_MASK, 0);
		assert_eq!(ExitControls::DEFAULT1 & ExitControls::DEFINED_MASK, 0x0000_0004);
		assert_eq!(EntryControls::DEFAULT1 & EntryControls::DEFINED_MASK, 0x0000_0004);
		// CR3 load/store exiting are default1 but defined.
		assert_eq!(
			ProcessorControls::DEFAULT1 & ProcessorControls::DEFINED_MASK,
			ProcessorControls::CR3_LOAD_EXITING_FLAG | ProcessorControls::CR3_STORE_EXITING_FLAG
		);
	}

	#[test]
	fn adjust_against_capability() {
		// Pin-based: default1 must be set, posted interrupts unavailable.
		let cap = ControlCapability::new()
			.with_allowed0(PinBasedControls::DEFAULT1)
			.with_allowed1(0x0000_007F);
		let requested = PinBasedControls::new()
			.with_external_interrupt_exiting(true)
			.with_nmi_exiting(true);
		let adjusted = PinBasedControls::from_bits(cap.adjust(requested.bits()).unwrap());
		assert!(adjusted.external_interrupt_exiting());
		assert!(adjusted.nmi_exiting());
		assert_eq!(adjusted.reserved_bits(), 0x16 & !PinBasedControls::DEFINED_MASK);
		assert!(cap.is_valid(adjusted.bits()));

		let too_much = requested.with_posted_interrupts(true);
		assert!(cap.adjust(too_much.bits()).is_err());
	}

	#[test]
	fn secondary_layout() {
		let s = SecondaryControls::new()
			.with_enable_ept(true)
			.with_enable_rdtscp(true)
			.with_enable_vpid(true)
			.with_unrestricted_guest(true)
			.with_enable_invpcid(true)
			.with_enable_xsaves(true);
		assert_eq!(s.bits(), 0x0010_10AA);
	}

	#[test]
	fn long_mode_entry() {
		let entry = EntryControls::from_bits(EntryControls::DEFAULT1)
			.with_ia32e_mode_guest(true)
			.with_load_efer(true);
		assert_eq!(entry.bits(), 0x0000_93FF);
		let exit = ExitControls::from_bits(ExitControls::DEFAULT1).with_host_address_space_size(true);
		assert_eq!(exit.bits(), 0x0003_6FFF);
	}
}
