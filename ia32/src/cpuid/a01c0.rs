//! Implements the CPUID 01:0 lookup structure, _Version Information and Feature Information_.

use ia32_macro::bitstruct;

use super::cpuid_leaf;

bitstruct! {
	/// Gets the `eax` register values for the CPUID `eax=01` leaf.
	pub struct Eax(u32) {
		/// Stepping ID.
		pub stepping_id[3:0] => as u8,
		/// Model.
		pub model[7:4] => as u8,
		/// Family ID.
		pub family_id[11:8] => as u8,
		/// Processor type (0 = original OEM, 1 = OverDrive, 2 = dual processor).
		pub processor_type[13:12] => as u8,
		/// Extended model ID; only meaningful for family 06H and 0FH.
		pub extended_model_id[19:16] => as u8,
		/// Extended family ID; only meaningful for family 0FH.
		pub extended_family_id[27:20] => as u8,
	}
}

bitstruct! {
	/// Gets the `ebx` register values for the CPUID `eax=01` leaf.
	pub struct Ebx(u32) {
		/// Brand index.
		pub brand_index[7:0] => as u8,
		/// `CLFLUSH` line size, in 8-byte units.
		pub clflush_line_size[15:8] => as u8,
		/// Maximum number of addressable IDs for logical processors in the package.
		pub max_addressable_ids[23:16] => as u8,
		/// Initial APIC ID of the executing logical processor.
		pub initial_apic_id[31:24] => as u8,
	}
}

bitstruct! {
	/// Gets the `ecx` register values for the CPUID `eax=01` leaf.
	pub struct Ecx(u32) {
		/// SSE3 extensions.
		pub sse3[0] => as bool,
		/// `PCLMULQDQ` instruction.
		pub pclmulqdq[1] => as bool,
		/// 64-bit DS area.
		pub dtes64[2] => as bool,
		/// `MONITOR`/`MWAIT`.
		pub monitor[3] => as bool,
		/// CPL qualified debug store.
		pub ds_cpl[4] => as bool,
		/// Virtual Machine Extensions (VMX).
		pub virtual_machine_extensions[5] => as bool,
		/// Safer Mode Extensions (SMX).
		pub safer_mode_extensions[6] => as bool,
		/// Enhanced Intel SpeedStep technology.
		pub eist[7] => as bool,
		/// Thermal Monitor 2.
		pub tm2[8] => as bool,
		/// SSSE3 extensions.
		pub ssse3[9] => as bool,
		/// L1 context ID.
		pub cnxt_id[10] => as bool,
		/// `IA32_DEBUG_INTERFACE` MSR for silicon debug.
		pub sdbg[11] => as bool,
		/// FMA extensions using YMM state.
		pub fma[12] => as bool,
		/// `CMPXCHG16B`.
		pub cmpxchg16b[13] => as bool,
		/// xTPR update control (`IA32_MISC_ENABLE[23]`).
		pub xtpr_update_control[14] => as bool,
		/// Perfmon and debug capability (`IA32_PERF_CAPABILITIES`).
		pub pdcm[15] => as bool,
		/// Process-context identifiers.
		pub pcid[17] => as bool,
		/// Prefetch from a memory-mapped device.
		pub dca[18] => as bool,
		/// SSE4.1.
		pub sse41[19] => as bool,
		/// SSE4.2.
		pub sse42[20] => as bool,
		/// x2APIC.
		pub x2apic[21] => as bool,
		/// `MOVBE`.
		pub movbe[22] => as bool,
		/// `POPCNT`.
		pub popcnt[23] => as bool,
		/// Local APIC timer supports TSC-deadline mode.
		pub tsc_deadline[24] => as bool,
		/// AES-NI.
		pub aesni[25] => as bool,
		/// `XSAVE`/`XRSTOR`, `XSETBV`/`XGETBV` and XCR0.
		pub xsave[26] => as bool,
		/// The OS has set `CR4.OSXSAVE`.
		pub osxsave[27] => as bool,
		/// AVX.
		pub avx[28] => as bool,
		/// 16-bit floating-point conversion instructions.
		pub f16c[29] => as bool,
		/// `RDRAND`.
		pub rdrand[30] => as bool,
		/// Running under a hypervisor. Always zero on bare metal.
		pub hypervisor[31] => as bool,
	}
}

bitstruct! {
	/// Gets the `edx` register values for the CPUID `eax=01` leaf.
	pub struct Edx(u32) {
		/// x87 FPU on chip.
		pub fpu[0] => as bool,
		/// Virtual-8086 mode enhancements.
		pub vme[1] => as bool,
		/// Debugging extensions.
		pub de[2] => as bool,
		/// Page size extension (4 MiB pages).
		pub pse[3] => as bool,
		/// Time stamp counter.
		pub tsc[4] => as bool,
		/// `RDMSR`/`WRMSR`.
		pub msr[5] => as bool,
		/// Physical address extension.
		pub pae[6] => as bool,
		/// Machine check exception.
		pub mce[7] => as bool,
		/// `CMPXCHG8B`.
		pub cx8[8] => as bool,
		/// On-chip APIC.
		pub apic[9] => as bool,
		/// `SYSENTER`/`SYSEXIT`.
		pub sep[11] => as bool,
		/// Memory type range registers.
		pub mtrr[12] => as bool,
		/// Page global bit.
		pub pge[13] => as bool,
		/// Machine check architecture.
		pub mca[14] => as bool,
		/// Conditional move instructions.
		pub cmov[15] => as bool,
		/// Page attribute table.
		pub pat[16] => as bool,
		/// 36-bit page size extension.
		pub pse36[17] => as bool,
		/// Processor serial number.
		pub psn[18] => as bool,
		/// `CLFLUSH`.
		pub clfsh[19] => as bool,
		/// Debug store.
		pub ds[21] => as bool,
		/// Thermal monitor and software-controlled clock facilities.
		pub acpi[22] => as bool,
		/// MMX.
		pub mmx[23] => as bool,
		/// `FXSAVE`/`FXRSTOR`.
		pub fxsr[24] => as bool,
		/// SSE.
		pub sse[25] => as bool,
		/// SSE2.
		pub sse2[26] => as bool,
		/// Self snoop.
		pub ss[27] => as bool,
		/// Max APIC IDs reserved field is valid.
		pub htt[28] => as bool,
		/// Thermal monitor.
		pub tm[29] => as bool,
		/// Pending break enable.
		pub pbe[31] => as bool,
	}
}

cpuid_leaf! {
	/// Version Information and Feature Information.
	CpuidA01C0 = (0x01, 0x00)
}

impl CpuidA01C0 {
	/// Returns the display family (family ID plus extended family ID for family 0FH).
	#[must_use]
	pub const fn display_family(&self) -> u16 {
		let family = self.eax.family_id() as u16;
		if family == 0x0F {
			family + self.eax.extended_family_id() as u16
		} else {
			family
		}
	}

	/// Returns the display model (model with the extended model ID prepended
	/// for families 06H and 0FH).
	#[must_use]
	pub const fn display_model(&self) -> u8 {
		let family = self.eax.family_id();
		let model = self.eax.model();
		if family == 0x06 || family == 0x0F {
			(self.eax.extended_model_id() << 4) | model
		} else {
			model
		}
	}

	/// Returns the `CLFLUSH` line size, in bytes.
	#[must_use]
	pub const fn clflush_line_bytes(&self) -> usize {
		self.ebx.clflush_line_size() as usize * 8
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::cpuid::{CpuidLeaf, CpuidResult};

	#[test]
	fn decodes_alder_lake_signature() {
		let leaf = CpuidA01C0::from_result(CpuidResult {
			eax: 0x0009_0672,
			ebx: 0x0080_0800,
			ecx: 0x7FFA_FBFF,
			edx: 0xBFEB_FBFF,
		});
		assert_eq!(leaf.eax.family_id(), 6);
		assert_eq!(leaf.eax.model(), 7);
		assert_eq!(leaf.eax.extended_model_id(), 9);
		assert_eq!(leaf.eax.stepping_id(), 2);
		assert_eq!(leaf.display_family(), 6);
		assert_eq!(leaf.display_model(), 0x97);
		assert_eq!(leaf.clflush_line_bytes(), 64);
		assert!(leaf.ecx.virtual_machine_extensions());
		assert!(leaf.ecx.sse42());
		assert!(leaf.edx.clfsh());
	}

	#[test]
	fn vmx_is_bit_five() {
		assert_eq!(Ecx::VIRTUAL_MACHINE_EXTENSIONS_BIT, 5);
		assert_eq!(Ecx::VIRTUAL_MACHINE_EXTENSIONS_FLAG, 0x20);
		assert_eq!(Ecx::HYPERVISOR_FLAG, 1 << 31);
		assert_eq!(Edx::RESERVED_MASK, (1 << 10) | (1 << 20) | (1 << 30));
	}

	#[test]
	#[cfg(target_arch = "x86_64")]
	fn host_feature_probe() {
		let leaf = CpuidA01C0::get().unwrap();
		let raw = crate::cpuid::cpuid(1, 0);
		assert_eq!(leaf.eax.family_id(), ((raw.eax >> 8) & 0xF) as u8);
		assert_eq!(leaf.ecx.virtual_machine_extensions(), raw.ecx & (1 << 5) != 0);
		assert!(leaf.edx.tsc());
		assert!(leaf.edx.sse2());
	}
}
