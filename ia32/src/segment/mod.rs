//! Segmentation: selectors, descriptors, gates, descriptor-table
//! registers and the 64-bit task-state segment.
//!
//! Most of segmentation is vestigial in 64-bit mode, but the GDT, IDT
//! and TSS must still be built, and VMX guest state carries every
//! segment register's selector, base, limit and access rights.
#![expect(clippy::inline_always)]

mod access;
mod descriptor;
mod dtr;
mod gate;
mod selector;
mod tss;

#[cfg(target_arch = "x86_64")]
mod instr;

#[cfg(target_arch = "x86_64")]
pub use self::{
	dtr::{read_gdtr, read_idtr, read_ldtr, read_tr, write_gdtr, write_idtr, write_ldtr, write_tr},
	instr::*,
};
pub use self::{
	access::AccessRights,
	descriptor::{Descriptor32, SegmentType, SystemDescriptor, SystemType},
	dtr::DescriptorTableRegister,
	gate::IdtGate,
	selector::{SegmentSelector, TableIndicator},
	tss::{Tss64, TssPtr},
};
