//! The VM-exit reason.

use ia32_macro::bitstruct;

bitstruct! {
	/// The 32-bit exit reason field (`EXIT_REASON`).
	pub struct ExitReason(u32) {
		/// The basic exit reason.
		pub basic[15:0] => enum BasicExitReason(u16) {
			/// An exception or NMI occurred.
			ExceptionOrNmi = 0,
			/// An external interrupt arrived.
			ExternalInterrupt = 1,
			/// A triple fault occurred.
			TripleFault = 2,
			/// An INIT signal arrived.
			InitSignal = 3,
			/// A start-up IPI arrived.
			StartupIpi = 4,
			/// An SMI arrived immediately after retirement of an I/O instruction.
			IoSmi = 5,
			/// An SMI arrived and was not an I/O SMI.
			OtherSmi = 6,
			/// The guest became interruptible with interrupt-window exiting set.
			InterruptWindow = 7,
			/// Virtual-NMI blocking ended with NMI-window exiting set.
			NmiWindow = 8,
			/// A task switch was attempted.
			TaskSwitch = 9,
			/// `CPUID`.
			Cpuid = 10,
			/// `GETSEC`.
			Getsec = 11,
			/// `HLT`.
			Hlt = 12,
			/// `INVD`.
			Invd = 13,
			/// `INVLPG`.
			Invlpg = 14,
			/// `RDPMC`.
			Rdpmc = 15,
			/// `RDTSC`.
			Rdtsc = 16,
			/// `RSM` in SMM.
			Rsm = 17,
			/// `VMCALL`.
			Vmcall = 18,
			/// `VMCLEAR`.
			Vmclear = 19,
			/// `VMLAUNCH`.
			Vmlaunch = 20,
			/// `VMPTRLD`.
			Vmptrld = 21,
			/// `VMPTRST`.
			Vmptrst = 22,
			/// `VMREAD`.
			Vmread = 23,
			/// `VMRESUME`.
			Vmresume = 24,
			/// `VMWRITE`.
			Vmwrite = 25,
			/// `VMXOFF`.
			Vmxoff = 26,
			/// `VMXON`.
			Vmxon = 27,
			/// `MOV` to or from a control register, `CLTS` or `LMSW`.
			ControlRegisterAccess = 28,
			/// `MOV` to or from a debug register.
			MovDr = 29,
			/// `IN`, `INS`, `OUT` or `OUTS`.
			IoInstruction = 30,
			/// `RDMSR`.
			Rdmsr = 31,
			/// `WRMSR`.
			Wrmsr = 32,
			/// VM entry failed due to invalid guest state.
			InvalidGuestState = 33,
			/// VM entry failed while loading MSRs.
			MsrLoading = 34,
			/// `MWAIT`.
			Mwait = 36,
			/// The monitor trap flag fired.
			MonitorTrapFlag = 37,
			/// `MONITOR`.
			Monitor = 39,
			/// `PAUSE`.
			Pause = 40,
			/// VM entry failed due to a machine-check event.
			MachineCheckDuringEntry = 41,
			/// The virtual TPR dropped below the TPR threshold.
			TprBelowThreshold = 43,
			/// The guest accessed the APIC-access page.
			ApicAccess = 44,
			/// EOI virtualization was performed for a vector in the EOI-exit bitmap.
			VirtualizedEoi = 45,
			/// `LGDT`, `LIDT`, `SGDT` or `SIDT`.
			GdtrIdtrAccess = 46,
			/// `LLDT`, `LTR`, `SLDT` or `STR`.
			LdtrTrAccess = 47,
			/// An EPT violation.
			EptViolation = 48,
			/// An EPT misconfiguration.
			EptMisconfiguration = 49,
			/// `INVEPT`.
			Invept = 50,
			/// `RDTSCP`.
			Rdtscp = 51,
			/// The VMX-preemption timer counted down to zero.
			PreemptionTimer = 52,
			/// `INVVPID`.
			Invvpid = 53,
			/// `WBINVD` or `WBNOINVD`.
			Wbinvd = 54,
			/// `XSETBV`.
			Xsetbv = 55,
			/// A write to the APIC-access page completed (trap-like).
			ApicWrite = 56,
			/// `RDRAND`.
			Rdrand = 57,
			/// `INVPCID`.
			Invpcid = 58,
			/// `VMFUNC` failed or was not enabled.
			Vmfunc = 59,
			/// `ENCLS`.
			Encls = 60,
			/// `RDSEED`.
			Rdseed = 61,
			/// The page-modification log is full.
			PmlFull = 62,
			/// `XSAVES`.
			Xsaves = 63,
			/// `XRSTORS`.
			Xrstors = 64,
			/// `PCONFIG`.
			Pconfig = 65,
			/// Sub-page permission violation or misconfiguration.
			SppEvent = 66,
			/// `UMWAIT`.
			Umwait = 67,
			/// `TPAUSE`.
			Tpause = 68,
			/// `LOADIWKEY`.
			Loadiwkey = 69,
			/// `ENCLV`.
			Enclv = 70,
			/// `ENQCMD` PASID translation failure.
			EnqcmdPasidTranslationFailure = 72,
			/// `ENQCMDS` PASID translation failure.
			EnqcmdsPasidTranslationFailure = 73,
			/// A bus lock was asserted with VMM bus-lock detection enabled.
			BusLock = 74,
			/// The instruction timeout fired.
			InstructionTimeout = 75,
			/// `SEAMCALL`.
			Seamcall = 76,
			/// `TDCALL`.
			Tdcall = 77,
		},
		/// The exit was incident to enclave mode.
		pub enclave_mode[27] => as bool,
		/// A pending MTF VM exit.
		pub pending_mtf[28] => as bool,
		/// The exit came from VMX root operation (SMM dual-monitor treatment).
		pub from_root[29] => as bool,
		/// VM entry failed; the exit did not come from a running guest.
		pub entry_failure[31] => as bool,
	}
}

impl ExitReason {
	/// Returns whether the basic reason equals `reason`.
	#[must_use]
	pub const fn is(self, reason: BasicExitReason) -> bool {
		self.basic_raw() == reason as u16
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn invalid_guest_state_entry_failure() {
		let reason = ExitReason::from_bits(0x8000_0021);
		assert_eq!(reason.basic_raw(), 0x21);
		assert_eq!(reason.basic(), Some(BasicExitReason::InvalidGuestState));
		assert!(reason.entry_failure());
		assert!(!reason.enclave_mode());
		assert!(!reason.pending_mtf());
		assert!(!reason.from_root());
		assert_eq!(reason.reserved_bits(), 0);
		assert!(reason.is(BasicExitReason::InvalidGuestState));
	}

	#[test]
	fn unassigned_reasons() {
		assert_eq!(BasicExitReason::from_raw(35), None);
		assert_eq!(BasicExitReason::from_raw(38), None);
		assert_eq!(BasicExitReason::from_raw(42), None);
		assert_eq!(BasicExitReason::from_raw(71), None);
		assert_eq!(ExitReason::from_bits(0xFFFF).basic(), None);
	}

	#[test]
	fn build() {
		let reason = ExitReason::new()
			.with_basic(BasicExitReason::EptViolation)
			.with_pending_mtf(true);
		assert_eq!(reason.bits(), 0x1000_0030);
	}
}
