//! Intel Processor Trace records.

use ia32_macro::bitstruct;

use super::{IA32_RTIT_CTL, IA32_RTIT_OUTPUT_MASK_PTRS, IA32_RTIT_STATUS, msr_value};

bitstruct! {
	/// `IA32_RTIT_CTL`: trace packet generation control.
	pub struct RtitCtl(u64) {
		/// Tracing enabled.
		pub trace_en[0] => as bool,
		/// Cycle-accurate mode.
		pub cyc_en[1] => as bool,
		/// Trace while CPL == 0.
		pub os[2] => as bool,
		/// Trace while CPL > 0.
		pub user[3] => as bool,
		/// Power event trace.
		pub pwr_evt_en[4] => as bool,
		/// FUP on PTWRITE.
		pub fup_on_ptw[5] => as bool,
		/// Single-range output scheme.
		pub fabric_en[6] => as bool,
		/// CR3 filtering.
		pub cr3_filter[7] => as bool,
		/// Table of physical addresses (ToPA) output.
		pub topa[8] => as bool,
		/// MTC packets.
		pub mtc_en[9] => as bool,
		/// TSC packets.
		pub tsc_en[10] => as bool,
		/// Disable return compression.
		pub dis_retc[11] => as bool,
		/// PTWRITE packets.
		pub ptw_en[12] => as bool,
		/// Branch packets.
		pub branch_en[13] => as bool,
		/// MTC frequency.
		pub mtc_freq[17:14] => as u8,
		/// Cycle threshold.
		pub cyc_thresh[22:19] => as u8,
		/// PSB frequency.
		pub psb_freq[27:24] => as u8,
		/// Address range 0 configuration.
		pub addr0_cfg[35:32] => as u8,
		/// Address range 1 configuration.
		pub addr1_cfg[39:36] => as u8,
		/// Address range 2 configuration.
		pub addr2_cfg[43:40] => as u8,
		/// Address range 3 configuration.
		pub addr3_cfg[47:44] => as u8,
		/// Inject PSB+ on the next enable.
		pub inject_psb_pmi_on_enable[56] => as bool,
	}
}

bitstruct! {
	/// `IA32_RTIT_STATUS`.
	pub struct RtitStatus(u64) {
		/// Filtering enabled by the IP filters.
		pub filter_en[0] => as bool,
		/// Packet generation enabled by context.
		pub context_en[1] => as bool,
		/// Tracing was triggered into a stop.
		pub trigger_en[2] => as bool,
		/// Operational error.
		pub error[4] => as bool,
		/// A ToPA STOP entry was reached.
		pub stopped[5] => as bool,
		/// PSB+ pending for a PMI.
		pub pend_psb[6] => as bool,
		/// PMI pending on ToPA.
		pub pend_topa_pmi[7] => as bool,
		/// Bytes remaining in the current packet.
		pub packet_byte_cnt[48:32] => as u32,
	}
}

bitstruct! {
	/// `IA32_RTIT_OUTPUT_MASK_PTRS`: ToPA output position.
	pub struct RtitOutputMaskPtrs(u64) {
		/// Low mask bits; always `0x7F` when read.
		pub lower_mask[6:0] => as u8,
		/// Index of the current ToPA table entry.
		pub mask_or_table_offset[31:7] => as u32,
		/// Offset within the current output region.
		pub output_offset[63:32] => as u32,
	}
}

msr_value! {
	RtitCtl = IA32_RTIT_CTL,
	RtitStatus = IA32_RTIT_STATUS,
	RtitOutputMaskPtrs = IA32_RTIT_OUTPUT_MASK_PTRS,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn ctl_layout() {
		let ctl = RtitCtl::new()
			.with_trace_en(true)
			.with_os(true)
			.with_topa(true)
			.with_branch_en(true)
			.with_addr0_cfg(1);
		assert_eq!(ctl.bits(), 0x1_0000_2105);
	}
}
