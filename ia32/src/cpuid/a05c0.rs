//! Implements the CPUID 05:0 lookup structure, _MONITOR/MWAIT_.

use ia32_macro::bitstruct;

use super::cpuid_leaf;

bitstruct! {
	/// Gets the `eax` register values for the CPUID `eax=05` leaf.
	pub struct Eax(u32) {
		/// Smallest monitor-line size, in bytes.
		pub smallest_monitor_line_size[15:0] => as u16,
	}
}

bitstruct! {
	/// Gets the `ebx` register values for the CPUID `eax=05` leaf.
	pub struct Ebx(u32) {
		/// Largest monitor-line size, in bytes.
		pub largest_monitor_line_size[15:0] => as u16,
	}
}

bitstruct! {
	/// Gets the `ecx` register values for the CPUID `eax=05` leaf.
	pub struct Ecx(u32) {
		/// Enumeration of MONITOR/MWAIT extensions is supported.
		pub mwait_enumeration[0] => as bool,
		/// Interrupts are treated as break events for `MWAIT` even when disabled.
		pub interrupts_as_break_event[1] => as bool,
		/// Monitorless `MWAIT`.
		pub monitorless_mwait[3] => as bool,
	}
}

bitstruct! {
	/// Gets the `edx` register values for the CPUID `eax=05` leaf.
	///
	/// Each field is the number of sub C-states supported by `MWAIT`
	/// for that C-state.
	pub struct Edx(u32) {
		/// C0 sub-states.
		pub c0_substates[3:0] => as u8,
		/// C1 sub-states.
		pub c1_substates[7:4] => as u8,
		/// C2 sub-states.
		pub c2_substates[11:8] => as u8,
		/// C3 sub-states.
		pub c3_substates[15:12] => as u8,
		/// C4 sub-states.
		pub c4_substates[19:16] => as u8,
		/// C5 sub-states.
		pub c5_substates[23:20] => as u8,
		/// C6 sub-states.
		pub c6_substates[27:24] => as u8,
		/// C7 sub-states.
		pub c7_substates[31:28] => as u8,
	}
}

cpuid_leaf! {
	/// MONITOR/MWAIT parameters.
	CpuidA05C0 = (0x05, 0x00)
}
