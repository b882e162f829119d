//! MSR addresses.

/// Physical address of the last machine-check (P5 compatibility).
pub const IA32_P5_MC_ADDR: u32 = 0x0000;
/// Type of the last machine-check (P5 compatibility).
pub const IA32_P5_MC_TYPE: u32 = 0x0001;
/// Smallest/largest monitor-line size for `MONITOR`.
pub const IA32_MONITOR_FILTER_SIZE: u32 = 0x0006;
/// The time-stamp counter.
pub const IA32_TIME_STAMP_COUNTER: u32 = 0x0010;
/// Platform ID.
pub const IA32_PLATFORM_ID: u32 = 0x0017;
/// Local APIC base and enables. See [`super::ApicBase`].
pub const IA32_APIC_BASE: u32 = 0x001B;
/// VMX/SMX/SGX enables and lock. See [`super::FeatureControl`].
pub const IA32_FEATURE_CONTROL: u32 = 0x003A;
/// Per-core TSC adjustment.
pub const IA32_TSC_ADJUST: u32 = 0x003B;
/// Speculation control. See [`super::SpecCtrl`].
pub const IA32_SPEC_CTRL: u32 = 0x0048;
/// Prediction command (IBPB).
pub const IA32_PRED_CMD: u32 = 0x0049;
/// BIOS update trigger.
pub const IA32_BIOS_UPDT_TRIG: u32 = 0x0079;
/// BIOS update signature (microcode revision in the upper half).
pub const IA32_BIOS_SIGN_ID: u32 = 0x008B;
/// SGX launch enclave public key hash, bits `[63:0]`.
pub const IA32_SGXLEPUBKEYHASH0: u32 = 0x008C;
/// SGX launch enclave public key hash, bits `[127:64]`.
pub const IA32_SGXLEPUBKEYHASH1: u32 = 0x008D;
/// SGX launch enclave public key hash, bits `[191:128]`.
pub const IA32_SGXLEPUBKEYHASH2: u32 = 0x008E;
/// SGX launch enclave public key hash, bits `[255:192]`.
pub const IA32_SGXLEPUBKEYHASH3: u32 = 0x008F;
/// SMM monitor configuration.
pub const IA32_SMM_MONITOR_CTL: u32 = 0x009B;
/// SMRAM base address (readable only in SMM).
pub const IA32_SMBASE: u32 = 0x009E;
/// General-purpose performance counter 0; see [`ia32_pmc`].
pub const IA32_PMC0: u32 = 0x00C1;
/// Platform information. See [`super::PlatformInfo`].
pub const MSR_PLATFORM_INFO: u32 = 0x00CE;
/// Core capabilities.
pub const IA32_CORE_CAPABILITIES: u32 = 0x00CF;
/// `UMWAIT` control.
pub const IA32_UMWAIT_CONTROL: u32 = 0x00E1;
/// Maximum-performance frequency clock count.
pub const IA32_MPERF: u32 = 0x00E7;
/// Actual-performance frequency clock count.
pub const IA32_APERF: u32 = 0x00E8;
/// MTRR capabilities. See [`super::MtrrCap`].
pub const IA32_MTRRCAP: u32 = 0x00FE;
/// Speculative-execution vulnerability enumeration.
pub const IA32_ARCH_CAPABILITIES: u32 = 0x010A;
/// L1D flush command.
pub const IA32_FLUSH_CMD: u32 = 0x010B;
/// TSX control.
pub const IA32_TSX_CTRL: u32 = 0x0122;
/// Miscellaneous feature enables (CPUID faulting).
pub const MSR_MISC_FEATURES_ENABLES: u32 = 0x0140;
/// `SYSENTER` code segment.
pub const IA32_SYSENTER_CS: u32 = 0x0174;
/// `SYSENTER` stack pointer.
pub const IA32_SYSENTER_ESP: u32 = 0x0175;
/// `SYSENTER` instruction pointer.
pub const IA32_SYSENTER_EIP: u32 = 0x0176;
/// Machine-check global capabilities. See [`super::McgCap`].
pub const IA32_MCG_CAP: u32 = 0x0179;
/// Machine-check global status. See [`super::McgStatus`].
pub const IA32_MCG_STATUS: u32 = 0x017A;
/// Machine-check global control.
pub const IA32_MCG_CTL: u32 = 0x017B;
/// Performance event select 0; see [`ia32_perfevtsel`].
pub const IA32_PERFEVTSEL0: u32 = 0x0186;
/// Current performance state. See [`super::PerfStatus`].
pub const IA32_PERF_STATUS: u32 = 0x0198;
/// Performance state control. See [`super::PerfCtl`].
pub const IA32_PERF_CTL: u32 = 0x0199;
/// Clock modulation. See [`super::ClockModulation`].
pub const IA32_CLOCK_MODULATION: u32 = 0x019A;
/// Thermal interrupt control. See [`super::ThermInterrupt`].
pub const IA32_THERM_INTERRUPT: u32 = 0x019B;
/// Thermal status. See [`super::ThermStatus`].
pub const IA32_THERM_STATUS: u32 = 0x019C;
/// Miscellaneous enables. See [`super::MiscEnable`].
pub const IA32_MISC_ENABLE: u32 = 0x01A0;
/// Energy/performance bias hint.
pub const IA32_ENERGY_PERF_BIAS: u32 = 0x01B0;
/// Package thermal status. See [`super::PackageThermStatus`].
pub const IA32_PACKAGE_THERM_STATUS: u32 = 0x01B1;
/// Package thermal interrupt control. See [`super::PackageThermInterrupt`].
pub const IA32_PACKAGE_THERM_INTERRUPT: u32 = 0x01B2;
/// Debug control. See [`super::DebugCtl`].
pub const IA32_DEBUGCTL: u32 = 0x01D9;
/// SMRR base address.
pub const IA32_SMRR_PHYSBASE: u32 = 0x01F2;
/// SMRR range mask.
pub const IA32_SMRR_PHYSMASK: u32 = 0x01F3;
/// Platform DCA capability.
pub const IA32_PLATFORM_DCA_CAP: u32 = 0x01F8;
/// CPU DCA capability.
pub const IA32_CPU_DCA_CAP: u32 = 0x01F9;
/// DCA type 0 configuration.
pub const IA32_DCA_0_CAP: u32 = 0x01FA;
/// Variable-range MTRR base 0; see [`ia32_mtrr_physbase`].
pub const IA32_MTRR_PHYSBASE0: u32 = 0x0200;
/// Variable-range MTRR mask 0; see [`ia32_mtrr_physmask`].
pub const IA32_MTRR_PHYSMASK0: u32 = 0x0201;
/// Fixed-range MTRR covering `00000H`-`7FFFFH`.
pub const IA32_MTRR_FIX64K_00000: u32 = 0x0250;
/// Fixed-range MTRR covering `80000H`-`9FFFFH`.
pub const IA32_MTRR_FIX16K_80000: u32 = 0x0258;
/// Fixed-range MTRR covering `A0000H`-`BFFFFH`.
pub const IA32_MTRR_FIX16K_A0000: u32 = 0x0259;
/// Fixed-range MTRR covering `C0000H`-`C7FFFH`.
pub const IA32_MTRR_FIX4K_C0000: u32 = 0x0268;
/// Fixed-range MTRR covering `C8000H`-`CFFFFH`.
pub const IA32_MTRR_FIX4K_C8000: u32 = 0x0269;
/// Fixed-range MTRR covering `D0000H`-`D7FFFH`.
pub const IA32_MTRR_FIX4K_D0000: u32 = 0x026A;
/// Fixed-range MTRR covering `D8000H`-`DFFFFH`.
pub const IA32_MTRR_FIX4K_D8000: u32 = 0x026B;
/// Fixed-range MTRR covering `E0000H`-`E7FFFH`.
pub const IA32_MTRR_FIX4K_E0000: u32 = 0x026C;
/// Fixed-range MTRR covering `E8000H`-`EFFFFH`.
pub const IA32_MTRR_FIX4K_E8000: u32 = 0x026D;
/// Fixed-range MTRR covering `F0000H`-`F7FFFH`.
pub const IA32_MTRR_FIX4K_F0000: u32 = 0x026E;
/// Fixed-range MTRR covering `F8000H`-`FFFFFH`.
pub const IA32_MTRR_FIX4K_F8000: u32 = 0x026F;
/// Page attribute table. See [`super::Pat`].
pub const IA32_PAT: u32 = 0x0277;
/// Machine-check bank 0 CMCI control; see [`ia32_mc_ctl2`].
pub const IA32_MC0_CTL2: u32 = 0x0280;
/// Default memory type and MTRR enables. See [`super::MtrrDefType`].
pub const IA32_MTRR_DEF_TYPE: u32 = 0x02FF;
/// Fixed-function counter 0 (instructions retired).
pub const IA32_FIXED_CTR0: u32 = 0x0309;
/// Fixed-function counter 1 (core cycles).
pub const IA32_FIXED_CTR1: u32 = 0x030A;
/// Fixed-function counter 2 (reference cycles).
pub const IA32_FIXED_CTR2: u32 = 0x030B;
/// Fixed-function counter 3 (top-down slots).
pub const IA32_FIXED_CTR3: u32 = 0x030C;
/// Performance monitoring capabilities. See [`super::PerfCapabilities`].
pub const IA32_PERF_CAPABILITIES: u32 = 0x0345;
/// Fixed-function counter control. See [`super::FixedCtrCtrl`].
pub const IA32_FIXED_CTR_CTRL: u32 = 0x038D;
/// Global performance counter status. See [`super::PerfGlobalStatus`].
pub const IA32_PERF_GLOBAL_STATUS: u32 = 0x038E;
/// Global performance counter control. See [`super::PerfGlobalCtrl`].
pub const IA32_PERF_GLOBAL_CTRL: u32 = 0x038F;
/// Global performance counter overflow reset.
pub const IA32_PERF_GLOBAL_OVF_CTRL: u32 = 0x0390;
/// PEBS enables.
pub const IA32_PEBS_ENABLE: u32 = 0x03F1;
/// Machine-check bank 0 control; see [`ia32_mc_ctl`].
pub const IA32_MC0_CTL: u32 = 0x0400;
/// Machine-check bank 0 status; see [`ia32_mc_status`].
pub const IA32_MC0_STATUS: u32 = 0x0401;
/// Machine-check bank 0 address; see [`ia32_mc_addr`].
pub const IA32_MC0_ADDR: u32 = 0x0402;
/// Machine-check bank 0 miscellaneous; see [`ia32_mc_misc`].
pub const IA32_MC0_MISC: u32 = 0x0403;
/// VMX basic information. See [`super::VmxBasic`].
pub const IA32_VMX_BASIC: u32 = 0x0480;
/// Pin-based VM-execution control capabilities.
pub const IA32_VMX_PINBASED_CTLS: u32 = 0x0481;
/// Primary processor-based VM-execution control capabilities.
pub const IA32_VMX_PROCBASED_CTLS: u32 = 0x0482;
/// VM-exit control capabilities.
pub const IA32_VMX_EXIT_CTLS: u32 = 0x0483;
/// VM-entry control capabilities.
pub const IA32_VMX_ENTRY_CTLS: u32 = 0x0484;
/// Miscellaneous VMX data. See [`super::VmxMisc`].
pub const IA32_VMX_MISC: u32 = 0x0485;
/// CR0 bits fixed to 1 in VMX operation.
pub const IA32_VMX_CR0_FIXED0: u32 = 0x0486;
/// CR0 bits allowed to be 1 in VMX operation.
pub const IA32_VMX_CR0_FIXED1: u32 = 0x0487;
/// CR4 bits fixed to 1 in VMX operation.
pub const IA32_VMX_CR4_FIXED0: u32 = 0x0488;
/// CR4 bits allowed to be 1 in VMX operation.
pub const IA32_VMX_CR4_FIXED1: u32 = 0x0489;
/// Highest VMCS field index.
pub const IA32_VMX_VMCS_ENUM: u32 = 0x048A;
/// Secondary processor-based VM-execution control capabilities.
pub const IA32_VMX_PROCBASED_CTLS2: u32 = 0x048B;
/// EPT and VPID capabilities. See [`super::EptVpidCap`].
pub const IA32_VMX_EPT_VPID_CAP: u32 = 0x048C;
/// Pin-based controls, relaxed default1 class.
pub const IA32_VMX_TRUE_PINBASED_CTLS: u32 = 0x048D;
/// Primary processor-based controls, relaxed default1 class.
pub const IA32_VMX_TRUE_PROCBASED_CTLS: u32 = 0x048E;
/// VM-exit controls, relaxed default1 class.
pub const IA32_VMX_TRUE_EXIT_CTLS: u32 = 0x048F;
/// VM-entry controls, relaxed default1 class.
pub const IA32_VMX_TRUE_ENTRY_CTLS: u32 = 0x0490;
/// Supported VM functions. See [`super::VmxVmfunc`].
pub const IA32_VMX_VMFUNC: u32 = 0x0491;
/// Tertiary processor-based VM-execution control capabilities (allowed-1 only).
pub const IA32_VMX_PROCBASED_CTLS3: u32 = 0x0492;
/// Secondary VM-exit control capabilities (allowed-1 only).
pub const IA32_VMX_EXIT_CTLS2: u32 = 0x0493;
/// Full-width writable alias of `IA32_PMC0`.
pub const IA32_A_PMC0: u32 = 0x04C1;
/// Local machine-check exception enables.
pub const IA32_MCG_EXT_CTL: u32 = 0x04D0;
/// SGX SVN status.
pub const IA32_SGX_SVN_STATUS: u32 = 0x0500;
/// Processor trace output base.
pub const IA32_RTIT_OUTPUT_BASE: u32 = 0x0560;
/// Processor trace output mask pointers. See [`super::RtitOutputMaskPtrs`].
pub const IA32_RTIT_OUTPUT_MASK_PTRS: u32 = 0x0561;
/// Processor trace control. See [`super::RtitCtl`].
pub const IA32_RTIT_CTL: u32 = 0x0570;
/// Processor trace status. See [`super::RtitStatus`].
pub const IA32_RTIT_STATUS: u32 = 0x0571;
/// Processor trace CR3 filter.
pub const IA32_RTIT_CR3_MATCH: u32 = 0x0572;
/// Processor trace address range 0 start.
pub const IA32_RTIT_ADDR0_A: u32 = 0x0580;
/// Processor trace address range 0 end.
pub const IA32_RTIT_ADDR0_B: u32 = 0x0581;
/// Processor trace address range 1 start.
pub const IA32_RTIT_ADDR1_A: u32 = 0x0582;
/// Processor trace address range 1 end.
pub const IA32_RTIT_ADDR1_B: u32 = 0x0583;
/// DS save area linear address.
pub const IA32_DS_AREA: u32 = 0x0600;
/// User-mode CET configuration.
pub const IA32_U_CET: u32 = 0x06A0;
/// Supervisor-mode CET configuration.
pub const IA32_S_CET: u32 = 0x06A2;
/// Ring 0 shadow stack pointer.
pub const IA32_PL0_SSP: u32 = 0x06A4;
/// Ring 1 shadow stack pointer.
pub const IA32_PL1_SSP: u32 = 0x06A5;
/// Ring 2 shadow stack pointer.
pub const IA32_PL2_SSP: u32 = 0x06A6;
/// Ring 3 shadow stack pointer.
pub const IA32_PL3_SSP: u32 = 0x06A7;
/// Interrupt shadow stack table address.
pub const IA32_INTERRUPT_SSP_TABLE_ADDR: u32 = 0x06A8;
/// TSC-deadline target for the local APIC timer.
pub const IA32_TSC_DEADLINE: u32 = 0x06E0;
/// Supervisor protection-key rights.
pub const IA32_PKRS: u32 = 0x06E1;
/// HWP enable.
pub const IA32_PM_ENABLE: u32 = 0x0770;
/// HWP performance range enumeration. See [`super::HwpCapabilities`].
pub const IA32_HWP_CAPABILITIES: u32 = 0x0771;
/// HWP package-level request.
pub const IA32_HWP_REQUEST_PKG: u32 = 0x0772;
/// HWP notification control. See [`super::HwpInterrupt`].
pub const IA32_HWP_INTERRUPT: u32 = 0x0773;
/// HWP logical processor request. See [`super::HwpRequest`].
pub const IA32_HWP_REQUEST: u32 = 0x0774;
/// HWP status. See [`super::HwpStatus`].
pub const IA32_HWP_STATUS: u32 = 0x0777;
/// x2APIC ID.
pub const IA32_X2APIC_APICID: u32 = 0x0802;
/// x2APIC version.
pub const IA32_X2APIC_VERSION: u32 = 0x0803;
/// x2APIC task priority.
pub const IA32_X2APIC_TPR: u32 = 0x0808;
/// x2APIC processor priority.
pub const IA32_X2APIC_PPR: u32 = 0x080A;
/// x2APIC end of interrupt (write-only).
pub const IA32_X2APIC_EOI: u32 = 0x080B;
/// x2APIC logical destination (read-only).
pub const IA32_X2APIC_LDR: u32 = 0x080D;
/// x2APIC spurious interrupt vector.
pub const IA32_X2APIC_SIVR: u32 = 0x080F;
/// x2APIC in-service bits `[31:0]`; `ISR1`-`ISR7` follow.
pub const IA32_X2APIC_ISR0: u32 = 0x0810;
/// x2APIC trigger mode bits `[31:0]`; `TMR1`-`TMR7` follow.
pub const IA32_X2APIC_TMR0: u32 = 0x0818;
/// x2APIC interrupt request bits `[31:0]`; `IRR1`-`IRR7` follow.
pub const IA32_X2APIC_IRR0: u32 = 0x0820;
/// x2APIC error status.
pub const IA32_X2APIC_ESR: u32 = 0x0828;
/// x2APIC LVT corrected machine-check interrupt.
pub const IA32_X2APIC_LVT_CMCI: u32 = 0x082F;
/// x2APIC interrupt command (64-bit).
pub const IA32_X2APIC_ICR: u32 = 0x0830;
/// x2APIC LVT timer.
pub const IA32_X2APIC_LVT_TIMER: u32 = 0x0832;
/// x2APIC LVT thermal sensor.
pub const IA32_X2APIC_LVT_THERMAL: u32 = 0x0833;
/// x2APIC LVT performance monitoring.
pub const IA32_X2APIC_LVT_PMI: u32 = 0x0834;
/// x2APIC LVT LINT0.
pub const IA32_X2APIC_LVT_LINT0: u32 = 0x0835;
/// x2APIC LVT LINT1.
pub const IA32_X2APIC_LVT_LINT1: u32 = 0x0836;
/// x2APIC LVT error.
pub const IA32_X2APIC_LVT_ERROR: u32 = 0x0837;
/// x2APIC timer initial count.
pub const IA32_X2APIC_INIT_COUNT: u32 = 0x0838;
/// x2APIC timer current count (read-only).
pub const IA32_X2APIC_CUR_COUNT: u32 = 0x0839;
/// x2APIC timer divide configuration.
pub const IA32_X2APIC_DIV_CONF: u32 = 0x083E;
/// x2APIC self IPI (write-only).
pub const IA32_X2APIC_SELF_IPI: u32 = 0x083F;
/// Debug interface control.
pub const IA32_DEBUG_INTERFACE: u32 = 0x0C80;
/// L3 QoS configuration.
pub const IA32_L3_QOS_CFG: u32 = 0x0C81;
/// L2 QoS configuration.
pub const IA32_L2_QOS_CFG: u32 = 0x0C82;
/// QoS monitoring event select.
pub const IA32_QM_EVTSEL: u32 = 0x0C8D;
/// QoS monitoring counter.
pub const IA32_QM_CTR: u32 = 0x0C8E;
/// RMID and class-of-service association.
pub const IA32_PQR_ASSOC: u32 = 0x0C8F;
/// Supervisor MPX configuration.
pub const IA32_BNDCFGS: u32 = 0x0D90;
/// Extended supervisor state mask for `XSAVES`/`XRSTORS`.
pub const IA32_XSS: u32 = 0x0DA0;
/// Package HDC enable.
pub const IA32_PKG_HDC_CTL: u32 = 0x0DB0;
/// Extended feature enables. See [`super::Efer`].
pub const IA32_EFER: u32 = 0xC000_0080;
/// `SYSCALL`/`SYSRET` segment selectors. See [`super::Star`].
pub const IA32_STAR: u32 = 0xC000_0081;
/// 64-bit `SYSCALL` target.
pub const IA32_LSTAR: u32 = 0xC000_0082;
/// Compatibility-mode `SYSCALL` target.
pub const IA32_CSTAR: u32 = 0xC000_0083;
/// RFLAGS mask applied on `SYSCALL`.
pub const IA32_FMASK: u32 = 0xC000_0084;
/// FS base address.
pub const IA32_FS_BASE: u32 = 0xC000_0100;
/// GS base address.
pub const IA32_GS_BASE: u32 = 0xC000_0101;
/// The GS base swapped in by `SWAPGS`.
pub const IA32_KERNEL_GS_BASE: u32 = 0xC000_0102;
/// Auxiliary TSC value returned by `RDTSCP`/`RDPID`.
pub const IA32_TSC_AUX: u32 = 0xC000_0103;

/// Returns the address of general-purpose performance counter `n`.
#[must_use]
pub const fn ia32_pmc(n: u32) -> u32 {
	IA32_PMC0 + n
}

/// Returns the address of the full-width alias of performance counter `n`.
#[must_use]
pub const fn ia32_a_pmc(n: u32) -> u32 {
	IA32_A_PMC0 + n
}

/// Returns the address of performance event select `n`.
#[must_use]
pub const fn ia32_perfevtsel(n: u32) -> u32 {
	IA32_PERFEVTSEL0 + n
}

/// Returns the address of fixed-function counter `n`.
#[must_use]
pub const fn ia32_fixed_ctr(n: u32) -> u32 {
	IA32_FIXED_CTR0 + n
}

/// Returns the address of the base register of variable MTRR pair `n`.
#[must_use]
pub const fn ia32_mtrr_physbase(n: u32) -> u32 {
	IA32_MTRR_PHYSBASE0 + 2 * n
}

/// Returns the address of the mask register of variable MTRR pair `n`.
#[must_use]
pub const fn ia32_mtrr_physmask(n: u32) -> u32 {
	IA32_MTRR_PHYSMASK0 + 2 * n
}

/// Returns the address of `IA32_MCi_CTL` for bank `n`.
#[must_use]
pub const fn ia32_mc_ctl(n: u32) -> u32 {
	IA32_MC0_CTL + 4 * n
}

/// Returns the address of `IA32_MCi_STATUS` for bank `n`.
#[must_use]
pub const fn ia32_mc_status(n: u32) -> u32 {
	IA32_MC0_STATUS + 4 * n
}

/// Returns the address of `IA32_MCi_ADDR` for bank `n`.
#[must_use]
pub const fn ia32_mc_addr(n: u32) -> u32 {
	IA32_MC0_ADDR + 4 * n
}

/// Returns the address of `IA32_MCi_MISC` for bank `n`.
#[must_use]
pub const fn ia32_mc_misc(n: u32) -> u32 {
	IA32_MC0_MISC + 4 * n
}

/// Returns the address of `IA32_MCi_CTL2` for bank `n`.
#[must_use]
pub const fn ia32_mc_ctl2(n: u32) -> u32 {
	IA32_MC0_CTL2 + n
}

/// Returns the address of processor trace address range `n`'s start
/// (`A`) register; the end (`B`) register follows it.
#[must_use]
pub const fn ia32_rtit_addr_a(n: u32) -> u32 {
	IA32_RTIT_ADDR0_A + 2 * n
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn banks() {
		assert_eq!(ia32_mtrr_physbase(0), 0x200);
		assert_eq!(ia32_mtrr_physmask(0), 0x201);
		assert_eq!(ia32_mtrr_physbase(9), 0x212);
		assert_eq!(ia32_mtrr_physmask(9), 0x213);
		assert_eq!(ia32_mc_status(3), 0x40D);
		assert_eq!(ia32_mc_ctl2(3), 0x283);
		assert_eq!(ia32_perfevtsel(7), 0x18D);
		assert_eq!(ia32_pmc(1), 0xC2);
		assert_eq!(ia32_fixed_ctr(2), IA32_FIXED_CTR2);
		assert_eq!(ia32_rtit_addr_a(1), IA32_RTIT_ADDR1_A);
	}
}
