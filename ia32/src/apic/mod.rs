//! The local APIC.
//!
//! [`LocalApic`] accesses the xAPIC register page through volatile
//! loads and stores; [`x2apic`] accesses the same registers as MSRs.
//! Both use the offsets in [`regs`] and the records below.

pub mod regs;

mod icr;
mod local;
mod lvt;

#[cfg(target_arch = "x86_64")]
pub mod x2apic;

pub use self::{
	icr::{DeliveryMode, DestinationShorthand, Icr},
	local::LocalApic,
	lvt::{
		ApicVersion, ErrorStatus, Lvt, LvtEntry, SpuriousVector, TaskPriority, TimerDivide,
		TimerMode,
	},
};
