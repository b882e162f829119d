//! Performance monitoring and debug control records.

use ia32_macro::bitstruct;

use super::{
	IA32_DEBUGCTL, IA32_FIXED_CTR_CTRL, IA32_PERF_CAPABILITIES, IA32_PERF_CTL,
	IA32_PERF_GLOBAL_CTRL, IA32_PERF_GLOBAL_STATUS, IA32_PERF_STATUS, msr_value,
};

bitstruct! {
	/// `IA32_PERFEVTSELn`: general-purpose counter event select.
	pub struct PerfEvtSel(u64) {
		/// Event select.
		pub event_select[7:0] => as u8,
		/// Unit mask.
		pub umask[15:8] => as u8,
		/// Count while CPL != 0.
		pub usr[16] => as bool,
		/// Count while CPL == 0.
		pub os[17] => as bool,
		/// Edge detect.
		pub edge[18] => as bool,
		/// Pin control.
		pub pc[19] => as bool,
		/// Raise a PMI on overflow.
		pub int[20] => as bool,
		/// Count events of any thread on the core.
		pub any_thread[21] => as bool,
		/// Counter enable.
		pub en[22] => as bool,
		/// Invert the counter mask comparison.
		pub inv[23] => as bool,
		/// Counter mask.
		pub cmask[31:24] => as u8,
	}
}

bitstruct! {
	/// `IA32_FIXED_CTR_CTRL`: four bits of control per fixed counter.
	pub struct FixedCtrCtrl(u64) {
		/// Counter 0 ring enables (bit 0: OS, bit 1: user).
		pub en0[1:0] => as u8,
		/// Counter 0 any-thread.
		pub any_thread0[2] => as bool,
		/// Counter 0 PMI on overflow.
		pub pmi0[3] => as bool,
		/// Counter 1 ring enables.
		pub en1[5:4] => as u8,
		/// Counter 1 any-thread.
		pub any_thread1[6] => as bool,
		/// Counter 1 PMI on overflow.
		pub pmi1[7] => as bool,
		/// Counter 2 ring enables.
		pub en2[9:8] => as u8,
		/// Counter 2 any-thread.
		pub any_thread2[10] => as bool,
		/// Counter 2 PMI on overflow.
		pub pmi2[11] => as bool,
		/// Counter 3 ring enables.
		pub en3[13:12] => as u8,
		/// Counter 3 any-thread.
		pub any_thread3[14] => as bool,
		/// Counter 3 PMI on overflow.
		pub pmi3[15] => as bool,
	}
}

impl FixedCtrCtrl {
	/// Count in ring 0.
	pub const EN_OS: u8 = 0b01;
	/// Count in rings 1-3.
	pub const EN_USR: u8 = 0b10;

	/// Returns a copy with counter `index` (0-3) set to count in the
	/// given rings (a combination of [`Self::EN_OS`] and [`Self::EN_USR`]),
	/// optionally raising a PMI on overflow.
	#[must_use]
	pub const fn with_counter(self, index: u32, rings: u8, pmi: bool) -> Self {
		let shift = (index & 3) * 4;
		let nibble = (rings as u64 & 0b11) | ((pmi as u64) << 3);
		Self((self.0 & !(0xF << shift)) | (nibble << shift))
	}
}

bitstruct! {
	/// `IA32_PERF_GLOBAL_CTRL`.
	pub struct PerfGlobalCtrl(u64) {
		/// Enables of the general-purpose counters (one bit each).
		pub pmc_enable[31:0] => as u32,
		/// Enables of the fixed-function counters (one bit each).
		pub fixed_enable[35:32] => as u8,
		/// Top-down performance metrics enable.
		pub perf_metrics_enable[48] => as bool,
	}
}

bitstruct! {
	/// `IA32_PERF_GLOBAL_STATUS`.
	pub struct PerfGlobalStatus(u64) {
		/// Overflow of the general-purpose counters (one bit each).
		pub pmc_overflow[31:0] => as u32,
		/// Overflow of the fixed-function counters (one bit each).
		pub fixed_overflow[35:32] => as u8,
		/// Top-down metrics overflow.
		pub perf_metrics_overflow[48] => as bool,
		/// Processor trace ToPA PMI.
		pub trace_topa_pmi[55] => as bool,
		/// LBR frozen.
		pub lbr_frz[58] => as bool,
		/// Counters frozen.
		pub ctr_frz[59] => as bool,
		/// ASCI.
		pub asci[60] => as bool,
		/// Uncore counter overflow.
		pub ovf_uncore[61] => as bool,
		/// DS buffer overflow.
		pub ovf_buf[62] => as bool,
		/// Condition changed.
		pub cond_chgd[63] => as bool,
	}
}

bitstruct! {
	/// `IA32_PERF_CAPABILITIES`.
	pub struct PerfCapabilities(u64) {
		/// LBR format.
		pub lbr_format[5:0] => as u8,
		/// PEBS trap.
		pub pebs_trap[6] => as bool,
		/// PEBS saves architectural registers.
		pub pebs_arch_reg[7] => as bool,
		/// PEBS record format.
		pub pebs_record_format[11:8] => as u8,
		/// Freeze while SMM is supported.
		pub smm_freeze[12] => as bool,
		/// Full-width counter writes (`IA32_A_PMCx`).
		pub full_width_write[13] => as bool,
		/// Top-down performance metrics.
		pub perf_metrics_available[15] => as bool,
	}
}

bitstruct! {
	/// `IA32_DEBUGCTL`.
	pub struct DebugCtl(u64) {
		/// Last branch record stack.
		pub lbr[0] => as bool,
		/// Single-step on branches.
		pub btf[1] => as bool,
		/// Bus-lock detection.
		pub bld[2] => as bool,
		/// Branch trace messages.
		pub tr[6] => as bool,
		/// Branch trace store.
		pub bts[7] => as bool,
		/// BTS circular buffer interrupt.
		pub btint[8] => as bool,
		/// BTS off in ring 0.
		pub bts_off_os[9] => as bool,
		/// BTS off outside ring 0.
		pub bts_off_usr[10] => as bool,
		/// Freeze LBRs on PMI.
		pub freeze_lbrs_on_pmi[11] => as bool,
		/// Freeze performance counters on PMI.
		pub freeze_perfmon_on_pmi[12] => as bool,
		/// Uncore PMI enable.
		pub enable_uncore_pmi[13] => as bool,
		/// Freeze while in SMM.
		pub freeze_while_smm[14] => as bool,
		/// RTM debugging.
		pub rtm_debug[15] => as bool,
	}
}

bitstruct! {
	/// `IA32_PERF_STATUS`: the current performance state (read-only).
	pub struct PerfStatus(u64) {
		/// Current performance state value.
		pub current_state[15:0] => as u16,
	}
}

bitstruct! {
	/// `IA32_PERF_CTL`: the requested performance state.
	pub struct PerfCtl(u64) {
		/// Target performance state value.
		pub target_state[15:0] => as u16,
		/// Disengage IDA/turbo.
		pub ida_disengage[32] => as bool,
	}
}

msr_value! {
	PerfEvtSel,
	FixedCtrCtrl = IA32_FIXED_CTR_CTRL,
	PerfGlobalCtrl = IA32_PERF_GLOBAL_CTRL,
	PerfGlobalStatus = IA32_PERF_GLOBAL_STATUS,
	PerfCapabilities = IA32_PERF_CAPABILITIES,
	DebugCtl = IA32_DEBUGCTL,
	PerfStatus = IA32_PERF_STATUS,
	PerfCtl = IA32_PERF_CTL,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn evtsel_unhalted_core_cycles() {
		let sel = PerfEvtSel::new()
			.with_event_select(0x3C)
			.with_usr(true)
			.with_os(true)
			.with_en(true);
		assert_eq!(sel.bits(), 0x0043_003C);
	}

	#[test]
	fn fixed_counter_nibbles() {
		let ctrl = FixedCtrCtrl::new()
			.with_counter(0, FixedCtrCtrl::EN_OS | FixedCtrCtrl::EN_USR, false)
			.with_counter(2, FixedCtrCtrl::EN_OS, true);
		assert_eq!(ctrl.bits(), 0x0903);
		assert_eq!(ctrl.en2(), 1);
		assert!(ctrl.pmi2());
		assert_eq!(ctrl.with_counter(0, 0, false).bits(), 0x0900);
	}

	#[test]
	fn global_ctrl() {
		let ctrl = PerfGlobalCtrl::new().with_pmc_enable(0xF).with_fixed_enable(0x7);
		assert_eq!(ctrl.bits(), 0x7_0000_000F);
	}
}
