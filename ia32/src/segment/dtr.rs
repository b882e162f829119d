//! `GDTR`/`IDTR` pseudo-descriptors and the descriptor-table register
//! instructions.

#[cfg(target_arch = "x86_64")]
use ia32_test::effect;

#[cfg(target_arch = "x86_64")]
use super::SegmentSelector;

/// The 10-byte operand of `LGDT`/`LIDT`/`SGDT`/`SIDT`.
///
/// Must be packed; the base immediately follows the limit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(C, packed(2))]
pub struct DescriptorTableRegister {
	/// Size of the table in bytes, minus one.
	pub limit: u16,
	/// Linear address of the table.
	pub base:  u64,
}

static_assertions::const_assert_eq!(core::mem::size_of::<DescriptorTableRegister>(), 10);

impl DescriptorTableRegister {
	/// Creates a pseudo-descriptor.
	#[inline]
	#[must_use]
	pub const fn new(base: u64, limit: u16) -> Self {
		Self { limit, base }
	}

	/// Creates a pseudo-descriptor describing `table`.
	///
	/// Tables larger than 64 KiB are truncated to the first 64 KiB.
	#[must_use]
	pub fn from_slice<T>(table: &[T]) -> Self {
		let size = core::mem::size_of_val(table).clamp(1, 0x1_0000);
		Self {
			limit: (size - 1) as u16,
			base:  table.as_ptr() as u64,
		}
	}

	/// Returns the number of `T`-sized entries the table holds.
	#[must_use]
	pub const fn entries<T>(self) -> usize {
		(self.limit as usize + 1) / core::mem::size_of::<T>()
	}
}

/// Reads `GDTR` (`SGDT`).
#[cfg(target_arch = "x86_64")]
#[inline(always)]
#[must_use]
pub fn read_gdtr() -> DescriptorTableRegister {
	let mut dtr = DescriptorTableRegister::default();
	// SAFETY: SGDT only writes the 10-byte operand.
	unsafe {
		core::arch::asm!("sgdt [{}]", in(reg) &raw mut dtr, options(nostack, preserves_flags));
	}
	dtr
}

/// Reads `IDTR` (`SIDT`).
#[cfg(target_arch = "x86_64")]
#[inline(always)]
#[must_use]
pub fn read_idtr() -> DescriptorTableRegister {
	let mut dtr = DescriptorTableRegister::default();
	// SAFETY: SIDT only writes the 10-byte operand.
	unsafe {
		core::arch::asm!("sidt [{}]", in(reg) &raw mut dtr, options(nostack, preserves_flags));
	}
	dtr
}

/// Loads `GDTR` (`LGDT`).
///
/// Segment registers keep their cached descriptors until reloaded.
///
/// # Safety
/// Must be executed in ring 0. The table must stay valid and mapped at
/// `base` for as long as it is loaded, and must contain descriptors
/// matching every selector currently in use.
#[cfg(target_arch = "x86_64")]
#[inline(always)]
#[effect(load_descriptor_table)]
pub unsafe fn write_gdtr(dtr: &DescriptorTableRegister) {
	// SAFETY: Offloaded to the caller.
	unsafe {
		core::arch::asm!("lgdt [{}]", in(reg) dtr, options(nostack, preserves_flags));
	}
}

/// Loads `IDTR` (`LIDT`).
///
/// # Safety
/// Must be executed in ring 0. The table must stay valid and mapped at
/// `base` for as long as it is loaded; any interrupt arriving afterwards
/// is delivered through it.
#[cfg(target_arch = "x86_64")]
#[inline(always)]
#[effect(load_descriptor_table)]
pub unsafe fn write_idtr(dtr: &DescriptorTableRegister) {
	// SAFETY: Offloaded to the caller.
	unsafe {
		core::arch::asm!("lidt [{}]", in(reg) dtr, options(nostack, preserves_flags));
	}
}

/// Reads the LDT selector (`SLDT`).
#[cfg(target_arch = "x86_64")]
#[inline(always)]
#[must_use]
pub fn read_ldtr() -> SegmentSelector {
	let sel: u16;
	// SAFETY: SLDT has no side effects.
	unsafe {
		core::arch::asm!("sldt {:x}", out(reg) sel, options(nostack, nomem, preserves_flags));
	}
	SegmentSelector::from_bits(sel)
}

/// Reads the task register selector (`STR`).
#[cfg(target_arch = "x86_64")]
#[inline(always)]
#[must_use]
pub fn read_tr() -> SegmentSelector {
	let sel: u16;
	// SAFETY: STR has no side effects.
	unsafe {
		core::arch::asm!("str {:x}", out(reg) sel, options(nostack, nomem, preserves_flags));
	}
	SegmentSelector::from_bits(sel)
}

/// Loads the LDT register (`LLDT`).
///
/// # Safety
/// Must be executed in ring 0. The selector must be null or reference
/// an LDT descriptor in the GDT.
#[cfg(target_arch = "x86_64")]
#[inline(always)]
#[effect(load_descriptor_table)]
pub unsafe fn write_ldtr(selector: SegmentSelector) {
	// SAFETY: Offloaded to the caller.
	unsafe {
		core::arch::asm!("lldt {:x}", in(reg) selector.bits(), options(nostack, preserves_flags));
	}
}

/// Loads the task register (`LTR`), marking the TSS descriptor busy.
///
/// # Safety
/// Must be executed in ring 0. The selector must reference an available
/// TSS descriptor in the GDT whose TSS stays valid while loaded.
#[cfg(target_arch = "x86_64")]
#[inline(always)]
#[effect(load_descriptor_table)]
pub unsafe fn write_tr(selector: SegmentSelector) {
	// SAFETY: Offloaded to the caller.
	unsafe {
		core::arch::asm!("ltr {:x}", in(reg) selector.bits(), options(nostack, preserves_flags));
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn pseudo_descriptor_layout() {
		let table = [0_u64; 5];
		let dtr = DescriptorTableRegister::from_slice(&table);
		assert_eq!({ dtr.limit }, 39);
		assert_eq!({ dtr.base }, table.as_ptr() as u64);
		assert_eq!(dtr.entries::<u64>(), 5);
		assert_eq!(core::mem::align_of::<DescriptorTableRegister>(), 2);
	}
}
