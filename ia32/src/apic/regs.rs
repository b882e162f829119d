//! Local APIC register offsets.
//!
//! Offsets are in bytes from the xAPIC MMIO base. Every register is
//! 32 bits wide and 16-byte aligned.

/// The architectural power-on local APIC base, before any relocation
/// through `IA32_APIC_BASE`.
pub const DEFAULT_BASE: u64 = 0xFEE0_0000;

/// Local APIC ID.
pub const ID: u32 = 0x020;
/// Local APIC version. See [`super::ApicVersion`].
pub const VERSION: u32 = 0x030;
/// Task priority. See [`super::TaskPriority`].
pub const TPR: u32 = 0x080;
/// Arbitration priority.
pub const APR: u32 = 0x090;
/// Processor priority (read-only).
pub const PPR: u32 = 0x0A0;
/// End of interrupt (write-only).
pub const EOI: u32 = 0x0B0;
/// Remote read.
pub const RRD: u32 = 0x0C0;
/// Logical destination.
pub const LDR: u32 = 0x0D0;
/// Destination format.
pub const DFR: u32 = 0x0E0;
/// Spurious interrupt vector. See [`super::SpuriousVector`].
pub const SIVR: u32 = 0x0F0;
/// In-service bank 0; the eight banks are 16 bytes apart.
pub const ISR: u32 = 0x100;
/// Trigger-mode bank 0; the eight banks are 16 bytes apart.
pub const TMR: u32 = 0x180;
/// Interrupt-request bank 0; the eight banks are 16 bytes apart.
pub const IRR: u32 = 0x200;
/// Error status. See [`super::ErrorStatus`].
pub const ESR: u32 = 0x280;
/// LVT corrected machine-check interrupt.
pub const LVT_CMCI: u32 = 0x2F0;
/// Interrupt command, bits `[31:0]`.
pub const ICR_LOW: u32 = 0x300;
/// Interrupt command, bits `[63:32]`.
pub const ICR_HIGH: u32 = 0x310;
/// LVT timer.
pub const LVT_TIMER: u32 = 0x320;
/// LVT thermal sensor.
pub const LVT_THERMAL: u32 = 0x330;
/// LVT performance monitoring counters.
pub const LVT_PMC: u32 = 0x340;
/// LVT LINT0.
pub const LVT_LINT0: u32 = 0x350;
/// LVT LINT1.
pub const LVT_LINT1: u32 = 0x360;
/// LVT error.
pub const LVT_ERROR: u32 = 0x370;
/// Timer initial count.
pub const TIMER_INITIAL_COUNT: u32 = 0x380;
/// Timer current count (read-only).
pub const TIMER_CURRENT_COUNT: u32 = 0x390;
/// Timer divide configuration. See [`super::TimerDivide`].
pub const TIMER_DIVIDE_CONFIGURATION: u32 = 0x3E0;
/// Self IPI (x2APIC mode only).
pub const SELF_IPI: u32 = 0x3F0;

/// The number of 32-bit banks in the ISR, TMR and IRR.
pub const VECTOR_BANKS: u32 = 8;

/// Returns the x2APIC MSR that aliases the xAPIC register at `offset`.
#[must_use]
pub const fn x2apic_msr(offset: u32) -> u32 {
	0x800 + (offset >> 4)
}

/// Returns the offset of the bank of `base` (one of [`ISR`], [`TMR`]
/// or [`IRR`]) holding `vector`, and the bit within it.
#[must_use]
pub const fn vector_bank(base: u32, vector: u8) -> (u32, u32) {
	(base + (vector >> 5) as u32 * 0x10, (vector & 0x1F) as u32)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::msr;

	#[test]
	fn x2apic_aliases() {
		assert_eq!(x2apic_msr(ID), msr::IA32_X2APIC_APICID);
		assert_eq!(x2apic_msr(VERSION), msr::IA32_X2APIC_VERSION);
		assert_eq!(x2apic_msr(TPR), msr::IA32_X2APIC_TPR);
		assert_eq!(x2apic_msr(EOI), msr::IA32_X2APIC_EOI);
		assert_eq!(x2apic_msr(SIVR), msr::IA32_X2APIC_SIVR);
		assert_eq!(x2apic_msr(ISR), msr::IA32_X2APIC_ISR0);
		assert_eq!(x2apic_msr(TMR), msr::IA32_X2APIC_TMR0);
		assert_eq!(x2apic_msr(IRR), msr::IA32_X2APIC_IRR0);
		assert_eq!(x2apic_msr(ESR), msr::IA32_X2APIC_ESR);
		assert_eq!(x2apic_msr(ICR_LOW), msr::IA32_X2APIC_ICR);
		assert_eq!(x2apic_msr(LVT_TIMER), msr::IA32_X2APIC_LVT_TIMER);
		assert_eq!(x2apic_msr(LVT_ERROR), msr::IA32_X2APIC_LVT_ERROR);
		assert_eq!(x2apic_msr(TIMER_DIVIDE_CONFIGURATION), msr::IA32_X2APIC_DIV_CONF);
		assert_eq!(x2apic_msr(SELF_IPI), msr::IA32_X2APIC_SELF_IPI);
	}

	#[test]
	fn vector_banks() {
		assert_eq!(vector_bank(ISR, 0x00), (0x100, 0));
		assert_eq!(vector_bank(ISR, 0x21), (0x110, 1));
		assert_eq!(vector_bank(IRR, 0xFF), (0x270, 31));
	}
}
