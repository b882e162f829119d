//! x2APIC access through MSRs.
//!
//! Requires `IA32_APIC_BASE.EXTD` (and `EN`). All accesses fault
//! (`#GP`) outside of ring 0 or in xAPIC mode.

use super::{Icr, regs};
use crate::msr::{self, IA32_X2APIC_APICID, IA32_X2APIC_EOI, IA32_X2APIC_ICR, IA32_X2APIC_SELF_IPI};

/// Reads the x2APIC register aliasing the xAPIC register at `offset`.
#[must_use]
pub fn read(offset: u32) -> u64 {
	msr::read_msr(regs::x2apic_msr(offset))
}

/// Writes the x2APIC register aliasing the xAPIC register at `offset`.
///
/// # Safety
/// Must be executed in ring 0 in x2APIC mode. The caller is
/// responsible for the effect of the written value on interrupt delivery.
pub unsafe fn write(offset: u32, value: u64) {
	// SAFETY: Offloaded to the caller.
	unsafe { msr::write_msr(regs::x2apic_msr(offset), value) }
}

/// Returns the 32-bit x2APIC ID.
#[must_use]
pub fn id() -> u32 {
	msr::read_msr(IA32_X2APIC_APICID)
}

/// Signals the end of the interrupt currently being serviced.
///
/// # Safety
/// Must be executed in ring 0 in x2APIC mode, from the handler of an
/// in-service interrupt.
pub unsafe fn eoi() {
	// SAFETY: Offloaded to the caller.
	unsafe { msr::write_msr(IA32_X2APIC_EOI, 0_u64) }
}

/// Sends an inter-processor interrupt with a single write.
///
/// # Safety
/// Must be executed in ring 0 in x2APIC mode. INIT and start-up IPIs
/// reset and start other processors.
pub unsafe fn send_ipi(icr: Icr) {
	// SAFETY: Offloaded to the caller.
	unsafe { msr::write_msr(IA32_X2APIC_ICR, icr.bits()) }
}

/// Sends a fixed interrupt of `vector` to the issuing processor.
///
/// # Safety
/// Must be executed in ring 0 in x2APIC mode.
pub unsafe fn self_ipi(vector: u8) {
	// SAFETY: Offloaded to the caller.
	unsafe { msr::write_msr(IA32_X2APIC_SELF_IPI, u64::from(vector)) }
}
