//! AMD-specific model-specific registers.
//!
//! Kept apart from the architectural catalog; none of these exist on
//! Intel processors.

use ia32_macro::bitstruct;

use super::msr_value;

/// Patch level of the loaded microcode.
pub const MSR_PATCH_LEVEL: u32 = 0x0000_008B;
/// Maximum-performance frequency clock count, read-only alias.
pub const MSR_MPERF_RO: u32 = 0xC000_00E7;
/// Actual-performance frequency clock count, read-only alias.
pub const MSR_APERF_RO: u32 = 0xC000_00E8;
/// Instructions-retired counter.
pub const MSR_IRPERF: u32 = 0xC000_00E9;
/// TSC ratio applied to guest `RDTSC`.
pub const MSR_TSC_RATIO: u32 = 0xC000_0104;
/// Legacy performance event select 0 (`PERF_CTL0` through `PERF_CTL3`).
pub const MSR_K7_PERF_CTL0: u32 = 0xC001_0000;
/// Legacy performance counter 0 (`PERF_CTR0` through `PERF_CTR3`).
pub const MSR_K7_PERF_CTR0: u32 = 0xC001_0004;
/// System configuration.
pub const MSR_SYSCFG: u32 = 0xC001_0010;
/// Hardware configuration.
pub const MSR_HWCR: u32 = 0xC001_0015;
/// Top of memory.
pub const MSR_TOP_MEM: u32 = 0xC001_001A;
/// Top of memory 2 (above 4 GiB).
pub const MSR_TOP_MEM2: u32 = 0xC001_001D;
/// Instruction-based sampling fetch control.
pub const MSR_IBS_FETCH_CTL: u32 = 0xC001_1030;
/// Instruction-based sampling fetch linear address.
pub const MSR_IBS_FETCH_LINADDR: u32 = 0xC001_1031;
/// Instruction-based sampling fetch physical address.
pub const MSR_IBS_FETCH_PHYSADDR: u32 = 0xC001_1032;
/// Instruction-based sampling op control.
pub const MSR_IBS_OP_CTL: u32 = 0xC001_1033;
/// Instruction-based sampling op RIP.
pub const MSR_IBS_OP_RIP: u32 = 0xC001_1034;
/// Decode configuration.
pub const MSR_DE_CFG: u32 = 0xC001_1029;
/// SVM VM control.
pub const MSR_VM_CR: u32 = 0xC001_0114;
/// SVM host save area physical address.
pub const MSR_VM_HSAVE_PA: u32 = 0xC001_0117;

/// Returns the address of core performance event select `n` (0-5).
#[must_use]
pub const fn msr_perf_ctl(n: u32) -> u32 {
	0xC001_0200 + 2 * n
}

/// Returns the address of core performance counter `n` (0-5).
#[must_use]
pub const fn msr_perf_ctr(n: u32) -> u32 {
	0xC001_0201 + 2 * n
}

bitstruct! {
	/// `HWCR`: hardware configuration.
	pub struct Hwcr(u64) {
		/// SMM code lock.
		pub smm_lock[0] => as bool,
		/// Disable the `INVLPGB`/TLB flush filter.
		pub tlb_cache_dis[3] => as bool,
		/// `INVD` behaves like `WBINVD`.
		pub invd_wbinvd[4] => as bool,
		/// Ignore `FERR#` (legacy numeric error emulation).
		pub ignne_em[8] => as bool,
		/// `MONITOR`/`MWAIT` are disabled.
		pub monitor_mwait_dis[9] => as bool,
		/// `MONITOR`/`MWAIT` are allowed in user mode.
		pub monitor_mwait_user_en[10] => as bool,
		/// `MCi_STATUS` registers are writable.
		pub mc_status_wr_en[18] => as bool,
		/// Lock the TSC to the current P0 frequency.
		pub lock_tsc_to_current_p0[21] => as bool,
		/// Core performance boost disable.
		pub cpb_dis[25] => as bool,
		/// `MPERF`/`APERF` are read-only.
		pub eff_freq_read_only_lock[27] => as bool,
		/// `IRPERF` counts instructions retired.
		pub ir_perf_en[30] => as bool,
		/// CPUID user-mode faulting enable.
		pub cpuid_user_dis[35] => as bool,
	}
}

bitstruct! {
	/// `VM_CR`: SVM control.
	pub struct VmCr(u64) {
		/// Debug port disable.
		pub dpd[0] => as bool,
		/// Intercept `INIT`.
		pub r_init[1] => as bool,
		/// Disable A20 masking.
		pub dis_a20m[2] => as bool,
		/// `SVMDIS` and `LOCK` are read-only.
		pub lock[3] => as bool,
		/// `EFER.SVME` may not be set.
		pub svmdis[4] => as bool,
	}
}

bitstruct! {
	/// `SYSCFG`: system configuration.
	pub struct Syscfg(u64) {
		/// MTRR fixed RdDram attribute enable.
		pub mtrr_fix_dram_en[18] => as bool,
		/// MTRR fixed RdDram modification enable.
		pub mtrr_fix_dram_mod_en[19] => as bool,
		/// `TOP_MEM`/`TOP_MEM2` variable MTRR enable.
		pub mtrr_var_dram_en[20] => as bool,
		/// `TOP_MEM2` enable.
		pub mtrr_tom2_en[21] => as bool,
		/// Secure memory encryption enable.
		pub mem_encryption_mode_en[23] => as bool,
		/// Secure nested paging enable.
		pub snp_en[24] => as bool,
	}
}

bitstruct! {
	/// `PERF_CTLn`: core performance event select.
	///
	/// The 12-bit event select is split across bits `[7:0]` and `[35:32]`.
	pub struct AmdPerfCtl(u64) {
		/// Event select, bits `[7:0]`.
		pub event_select_low[7:0] => as u8,
		/// Unit mask.
		pub unit_mask[15:8] => as u8,
		/// Count in user mode.
		pub usr[16] => as bool,
		/// Count in ring 0.
		pub os[17] => as bool,
		/// Edge detect.
		pub edge[18] => as bool,
		/// Interrupt on overflow.
		pub int[20] => as bool,
		/// Counter enable.
		pub en[22] => as bool,
		/// Invert the counter mask comparison.
		pub inv[23] => as bool,
		/// Counter mask.
		pub cnt_mask[31:24] => as u8,
		/// Event select, bits `[11:8]`.
		pub event_select_high[35:32] => as u8,
		/// Count only in guest mode.
		pub guest_only[40] => as bool,
		/// Count only in host mode.
		pub host_only[41] => as bool,
	}
}

impl AmdPerfCtl {
	/// Returns the full 12-bit event select.
	#[must_use]
	pub const fn event_select(self) -> u16 {
		((self.event_select_high() as u16) << 8) | self.event_select_low() as u16
	}

	/// Returns a copy with the full 12-bit event select set.
	#[must_use]
	pub const fn with_event_select(self, event: u16) -> Self {
		self.with_event_select_low(event as u8)
			.with_event_select_high((event >> 8) as u8)
	}
}

msr_value! {
	Hwcr = MSR_HWCR,
	VmCr = MSR_VM_CR,
	Syscfg = MSR_SYSCFG,
	AmdPerfCtl,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn perf_ctl_split_event() {
		let ctl = AmdPerfCtl::new().with_event_select(0x1C0).with_en(true);
		assert_eq!(ctl.bits(), 0x1_0040_00C0);
		assert_eq!(ctl.event_select(), 0x1C0);
		assert_eq!(msr_perf_ctl(5), 0xC001_020A);
		assert_eq!(msr_perf_ctr(0), 0xC001_0201);
	}

	#[test]
	fn vm_cr() {
		let vm_cr = VmCr::from_bits(0x18);
		assert!(vm_cr.lock());
		assert!(vm_cr.svmdis());
	}
}
