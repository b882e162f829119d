//! Implements the CPUID 14:0 lookup structure, _Intel Processor Trace Enumeration_.

use ia32_macro::bitstruct;

use super::cpuid_leaf;

bitstruct! {
	/// Gets the `eax` register values for the CPUID `eax=14, ecx=0` leaf.
	pub struct Eax(u32) {
		/// The highest supported subleaf of leaf 14H.
		pub max_subleaf[31:0] => as u32,
	}
}

bitstruct! {
	/// Gets the `ebx` register values for the CPUID `eax=14, ecx=0` leaf.
	pub struct Ebx(u32) {
		/// `IA32_RTIT_CTL.CR3Filter` and `IA32_RTIT_CR3_MATCH`.
		pub cr3_filtering[0] => as bool,
		/// Configurable PSB and cycle-accurate mode.
		pub psb_cyc[1] => as bool,
		/// IP filtering, TraceStop filtering and preservation of PT MSRs across warm reset.
		pub ip_filtering[2] => as bool,
		/// MTC timing packets and suppression of COFI-based packets.
		pub mtc[3] => as bool,
		/// `PTWRITE`.
		pub ptwrite[4] => as bool,
		/// Power event trace.
		pub power_event_trace[5] => as bool,
		/// PSB and PMI preservation.
		pub psb_pmi_preservation[6] => as bool,
		/// `IA32_RTIT_CTL.EventEn`.
		pub event_trace[7] => as bool,
		/// `IA32_RTIT_CTL.DisTNT`.
		pub tnt_disable[8] => as bool,
	}
}

bitstruct! {
	/// Gets the `ecx` register values for the CPUID `eax=14, ecx=0` leaf.
	pub struct Ecx(u32) {
		/// ToPA output scheme.
		pub topa[0] => as bool,
		/// ToPA tables can hold any number of output entries.
		pub topa_multiple_entries[1] => as bool,
		/// Single-range output scheme.
		pub single_range_output[2] => as bool,
		/// Output to trace transport subsystem.
		pub trace_transport[3] => as bool,
		/// Generated packets that contain IP payloads have LIP values.
		pub lip[31] => as bool,
	}
}

bitstruct! {
	/// Gets the `edx` register values for the CPUID `eax=14, ecx=0` leaf.
	pub struct Edx(u32) {}
}

cpuid_leaf! {
	/// Intel Processor Trace, main leaf.
	CpuidA14C0 = (0x14, 0x00)
}
