//! Implements the CPUID 07:0 lookup structure, _Structured Extended Feature Flags_.

use ia32_macro::bitstruct;

use super::cpuid_leaf;

bitstruct! {
	/// Gets the `eax` register values for the CPUID `eax=07, ecx=0` leaf.
	pub struct Eax(u32) {
		/// The highest supported subleaf of leaf 07H.
		pub max_subleaf[31:0] => as u32,
	}
}

bitstruct! {
	/// Gets the `ebx` register values for the CPUID `eax=07, ecx=0` leaf.
	pub struct Ebx(u32) {
		/// `RDFSBASE`/`RDGSBASE`/`WRFSBASE`/`WRGSBASE`.
		pub fsgsbase[0] => as bool,
		/// `IA32_TSC_ADJUST` MSR.
		pub tsc_adjust[1] => as bool,
		/// Software Guard Extensions.
		pub sgx[2] => as bool,
		/// BMI1.
		pub bmi1[3] => as bool,
		/// Hardware Lock Elision.
		pub hle[4] => as bool,
		/// AVX2.
		pub avx2[5] => as bool,
		/// x87 FPU data pointer updated only on exceptions.
		pub fdp_excptn_only[6] => as bool,
		/// Supervisor-Mode Execution Prevention.
		pub smep[7] => as bool,
		/// BMI2.
		pub bmi2[8] => as bool,
		/// Enhanced `REP MOVSB`/`STOSB`.
		pub erms[9] => as bool,
		/// `INVPCID`.
		pub invpcid[10] => as bool,
		/// Restricted Transactional Memory.
		pub rtm[11] => as bool,
		/// RDT monitoring.
		pub rdt_m[12] => as bool,
		/// FPU CS and DS values deprecated.
		pub fpu_csds_deprecated[13] => as bool,
		/// Memory Protection Extensions.
		pub mpx[14] => as bool,
		/// RDT allocation.
		pub rdt_a[15] => as bool,
		/// AVX-512 Foundation.
		pub avx512f[16] => as bool,
		/// AVX-512 Doubleword and Quadword.
		pub avx512dq[17] => as bool,
		/// `RDSEED`.
		pub rdseed[18] => as bool,
		/// `ADCX`/`ADOX`.
		pub adx[19] => as bool,
		/// Supervisor-Mode Access Prevention.
		pub smap[20] => as bool,
		/// AVX-512 Integer FMA.
		pub avx512_ifma[21] => as bool,
		/// `CLFLUSHOPT`.
		pub clflushopt[23] => as bool,
		/// `CLWB`.
		pub clwb[24] => as bool,
		/// Intel Processor Trace.
		pub intel_pt[25] => as bool,
		/// AVX-512 Prefetch.
		pub avx512pf[26] => as bool,
		/// AVX-512 Exponential and Reciprocal.
		pub avx512er[27] => as bool,
		/// AVX-512 Conflict Detection.
		pub avx512cd[28] => as bool,
		/// SHA extensions.
		pub sha[29] => as bool,
		/// AVX-512 Byte and Word.
		pub avx512bw[30] => as bool,
		/// AVX-512 Vector Length.
		pub avx512vl[31] => as bool,
	}
}

bitstruct! {
	/// Gets the `ecx` register values for the CPUID `eax=07, ecx=0` leaf.
	pub struct Ecx(u32) {
		/// `PREFETCHWT1`.
		pub prefetchwt1[0] => as bool,
		/// AVX-512 Vector Byte Manipulation.
		pub avx512_vbmi[1] => as bool,
		/// User-Mode Instruction Prevention.
		pub umip[2] => as bool,
		/// Protection keys for user-mode pages.
		pub pku[3] => as bool,
		/// The OS has set `CR4.PKE`.
		pub ospke[4] => as bool,
		/// `TPAUSE`, `UMONITOR` and `UMWAIT`.
		pub waitpkg[5] => as bool,
		/// AVX-512 Vector Byte Manipulation 2.
		pub avx512_vbmi2[6] => as bool,
		/// CET shadow stacks.
		pub cet_ss[7] => as bool,
		/// Galois Field instructions.
		pub gfni[8] => as bool,
		/// Vector AES.
		pub vaes[9] => as bool,
		/// Vector `PCLMULQDQ`.
		pub vpclmulqdq[10] => as bool,
		/// AVX-512 Vector Neural Network Instructions.
		pub avx512_vnni[11] => as bool,
		/// AVX-512 `BITALG`.
		pub avx512_bitalg[12] => as bool,
		/// Total Memory Encryption.
		pub tme_en[13] => as bool,
		/// AVX-512 `VPOPCNTDQ`.
		pub avx512_vpopcntdq[14] => as bool,
		/// 57-bit linear addresses and 5-level paging.
		pub la57[16] => as bool,
		/// The value of MAWAU used by `BNDLDX`/`BNDSTX` in 64-bit mode.
		pub mawau[21:17] => as u8,
		/// `RDPID` and `IA32_TSC_AUX`.
		pub rdpid[22] => as bool,
		/// Key Locker.
		pub kl[23] => as bool,
		/// OS bus-lock detection.
		pub bus_lock_detect[24] => as bool,
		/// `CLDEMOTE`.
		pub cldemote[25] => as bool,
		/// `MOVDIRI`.
		pub movdiri[27] => as bool,
		/// `MOVDIR64B`.
		pub movdir64b[28] => as bool,
		/// Enqueue stores.
		pub enqcmd[29] => as bool,
		/// SGX launch configuration.
		pub sgx_lc[30] => as bool,
		/// Protection keys for supervisor-mode pages.
		pub pks[31] => as bool,
	}
}

bitstruct! {
	/// Gets the `edx` register values for the CPUID `eax=07, ecx=0` leaf.
	pub struct Edx(u32) {
		/// SGX attestation services (`SGX-KEYS`).
		pub sgx_keys[1] => as bool,
		/// AVX-512 4-iteration VNNI.
		pub avx512_4vnniw[2] => as bool,
		/// AVX-512 4-iteration FMA.
		pub avx512_4fmaps[3] => as bool,
		/// Fast short `REP MOV`.
		pub fsrm[4] => as bool,
		/// User interrupts.
		pub uintr[5] => as bool,
		/// AVX-512 `VP2INTERSECT`.
		pub avx512_vp2intersect[8] => as bool,
		/// `IA32_MCU_OPT_CTRL` SRBDS mitigation.
		pub srbds_ctrl[9] => as bool,
		/// `VERW` clears CPU buffers.
		pub md_clear[10] => as bool,
		/// All RTM transactions abort.
		pub rtm_always_abort[11] => as bool,
		/// `RTM_FORCE_ABORT` in `IA32_TSX_FORCE_ABORT`.
		pub rtm_force_abort[13] => as bool,
		/// `SERIALIZE`.
		pub serialize[14] => as bool,
		/// Hybrid part (more than one core type).
		pub hybrid[15] => as bool,
		/// TSX suspend load address tracking.
		pub tsxldtrk[16] => as bool,
		/// Platform configuration (`PCONFIG`).
		pub pconfig[18] => as bool,
		/// Architectural LBRs.
		pub arch_lbr[19] => as bool,
		/// CET indirect branch tracking.
		pub cet_ibt[20] => as bool,
		/// AMX bfloat16.
		pub amx_bf16[22] => as bool,
		/// AVX-512 FP16.
		pub avx512_fp16[23] => as bool,
		/// AMX tile architecture.
		pub amx_tile[24] => as bool,
		/// AMX 8-bit integer.
		pub amx_int8[25] => as bool,
		/// IBRS and IBPB.
		pub ibrs_ibpb[26] => as bool,
		/// Single thread indirect branch predictors.
		pub stibp[27] => as bool,
		/// `IA32_FLUSH_CMD`.
		pub l1d_flush[28] => as bool,
		/// `IA32_ARCH_CAPABILITIES`.
		pub arch_capabilities[29] => as bool,
		/// `IA32_CORE_CAPABILITIES`.
		pub core_capabilities[30] => as bool,
		/// Speculative Store Bypass Disable.
		pub ssbd[31] => as bool,
	}
}

cpuid_leaf! {
	/// Structured Extended Feature Flags (`ecx=0`).
	CpuidA07C0 = (0x07, 0x00)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn layout() {
		assert_eq!(Ebx::INVPCID_BIT, 10);
		assert_eq!(Ebx::CLFLUSHOPT_BIT, 23);
		assert_eq!(Ebx::CLWB_BIT, 24);
		assert_eq!(Ecx::LA57_BIT, 16);
		assert_eq!(Ecx::MAWAU_MASK, 0x1F);
		assert_eq!(Ecx::CLDEMOTE_BIT, 25);
		assert_eq!(Edx::SERIALIZE_BIT, 14);
	}
}
