//! Implements the CPUID 07:1 lookup structure, _Structured Extended Feature Flags (`ecx=1`)_.

use ia32_macro::bitstruct;

use super::cpuid_leaf;

bitstruct! {
	/// Gets the `eax` register values for the CPUID `eax=07, ecx=1` leaf.
	pub struct Eax(u32) {
		/// `VSHA512` instructions.
		pub sha512[0] => as bool,
		/// `VSM3` instructions.
		pub sm3[1] => as bool,
		/// `VSM4` instructions.
		pub sm4[2] => as bool,
		/// Remote atomic operations on integers (`AADD`, `AAND`, `AOR`, `AXOR`).
		pub rao_int[3] => as bool,
		/// VEX-encoded AVX VNNI.
		pub avx_vnni[4] => as bool,
		/// AVX-512 bfloat16.
		pub avx512_bf16[5] => as bool,
		/// Linear Address Space Separation (`CR4.LASS`).
		pub lass[6] => as bool,
		/// `CMPccXADD`.
		pub cmpccxadd[7] => as bool,
		/// Architectural performance monitoring extended leaf (23H).
		pub archperf_monext[8] => as bool,
		/// Fast zero-length `REP MOVSB`.
		pub fzrm[10] => as bool,
		/// Fast short `REP STOSB`.
		pub fsrs[11] => as bool,
		/// Fast short `REP CMPSB` and `REP SCASB`.
		pub rsrcs[12] => as bool,
		/// Flexible Return and Event Delivery.
		pub fred[17] => as bool,
		/// `LKGS`.
		pub lkgs[18] => as bool,
		/// `WRMSRNS` (non-serializing MSR write).
		pub wrmsrns[19] => as bool,
		/// NMI source reporting.
		pub nmi_src[20] => as bool,
		/// AMX FP16.
		pub amx_fp16[21] => as bool,
		/// `HRESET`, `IA32_HRESET_ENABLE` and leaf 20H.
		pub hreset[22] => as bool,
		/// AVX IFMA.
		pub avx_ifma[23] => as bool,
		/// Linear Address Masking.
		pub lam[26] => as bool,
		/// `RDMSRLIST`/`WRMSRLIST` and `IA32_BARRIER`.
		pub msrlist[27] => as bool,
		/// `INVD` can be disabled after BIOS done.
		pub invd_disable_post_bios_done[30] => as bool,
		/// `MOVRS` and `PREFETCHRST2`.
		pub movrs[31] => as bool,
	}
}

bitstruct! {
	/// Gets the `ebx` register values for the CPUID `eax=07, ecx=1` leaf.
	pub struct Ebx(u32) {
		/// `PBNDKB` and `TSE_CAPABILITY`.
		pub pbndkb[1] => as bool,
		/// `IA32_MISC_ENABLE[22]` (CPUID max-value limit) is removed.
		pub cpuid_maxval_lim_rmv[3] => as bool,
	}
}

bitstruct! {
	/// Gets the `ecx` register values for the CPUID `eax=07, ecx=1` leaf.
	pub struct Ecx(u32) {
		/// Legacy-reduced ISA.
		pub legacy_reduced_isa[2] => as bool,
		/// 64-bit SIPI.
		pub sipi64[4] => as bool,
		/// Immediate forms of `RDMSR` and `WRMSRNS`.
		pub msr_imm[5] => as bool,
	}
}

bitstruct! {
	/// Gets the `edx` register values for the CPUID `eax=07, ecx=1` leaf.
	pub struct Edx(u32) {
		/// AVX VNNI INT8.
		pub avx_vnni_int8[4] => as bool,
		/// AVX no-exception FP conversions.
		pub avx_ne_convert[5] => as bool,
		/// AMX complex tiles.
		pub amx_complex[8] => as bool,
		/// AVX VNNI INT16.
		pub avx_vnni_int16[10] => as bool,
		/// User timer events (`IA32_UINTR_TIMER`).
		pub utmr[13] => as bool,
		/// `PREFETCHIT0`/`PREFETCHIT1`.
		pub prefetchi[14] => as bool,
		/// `URDMSR`/`UWRMSR`.
		pub user_msr[15] => as bool,
		/// `UIRET` sets UIF from `RFLAGS[1]`.
		pub uiret_uif_from_rflags[17] => as bool,
		/// CET supervisor shadow stacks are not prematurely busy.
		pub cet_sss[18] => as bool,
		/// AVX10 converged vector ISA (leaf 24H).
		pub avx10[19] => as bool,
		/// Advanced Performance Extensions foundation (32 GPRs).
		pub apx_f[21] => as bool,
		/// `MWAIT` in leaf 07H enumeration.
		pub mwait[23] => as bool,
	}
}

cpuid_leaf! {
	/// Structured Extended Feature Flags (`ecx=1`).
	CpuidA07C1 = (0x07, 0x01)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn layout() {
		assert_eq!(Eax::FRED_BIT, 17);
		assert_eq!(Eax::LAM_BIT, 26);
		assert_eq!(Edx::APX_F_BIT, 21);
	}
}
