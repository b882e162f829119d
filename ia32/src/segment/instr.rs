//! Segment register access and descriptor introspection.

use ia32_test::effect;

use super::{AccessRights, SegmentSelector};

macro_rules! segment_register {
	($($reg:literal => $read:ident, $write:ident;)*) => {
		$(
			#[doc = concat!("Reads the `", $reg, "` selector.")]
			#[inline(always)]
			#[must_use]
			pub fn $read() -> SegmentSelector {
				let sel: u16;
				// SAFETY: Reading a segment register has no side effects.
				unsafe {
					core::arch::asm!(
						concat!("mov {:x}, ", $reg),
						out(reg) sel,
						options(nostack, nomem, preserves_flags),
					);
				}
				SegmentSelector::from_bits(sel)
			}

			#[doc = concat!("Loads `", $reg, "`.")]
			///
			/// # Safety
			/// The selector must be null (where permitted) or reference a
			/// descriptor valid for the register at the current privilege
			/// level. Loading `FS`/`GS` clears the hidden base on some
			/// processors.
			#[inline(always)]
			#[effect(load_segment)]
			pub unsafe fn $write(selector: SegmentSelector) {
				// SAFETY: Offloaded to the caller.
				unsafe {
					core::arch::asm!(
						concat!("mov ", $reg, ", {:x}"),
						in(reg) selector.bits(),
						options(nostack, preserves_flags),
					);
				}
			}
		)*
	};
}

segment_register! {
	"ss" => read_ss, write_ss;
	"ds" => read_ds, write_ds;
	"es" => read_es, write_es;
	"fs" => read_fs, write_fs;
	"gs" => read_gs, write_gs;
}

/// Reads the `cs` selector.
#[inline(always)]
#[must_use]
pub fn read_cs() -> SegmentSelector {
	let sel: u16;
	// SAFETY: Reading CS has no side effects.
	unsafe {
		core::arch::asm!("mov {:x}, cs", out(reg) sel, options(nostack, nomem, preserves_flags));
	}
	SegmentSelector::from_bits(sel)
}

/// Loads `cs` with a far return to the next instruction.
///
/// # Safety
/// The selector must reference a 64-bit code segment at the current
/// privilege level.
#[inline(always)]
#[effect(load_segment)]
pub unsafe fn write_cs(selector: SegmentSelector) {
	// SAFETY: Offloaded to the caller.
	unsafe {
		core::arch::asm!(
			"push {sel}",
			"lea {tmp}, [rip + 2f]",
			"push {tmp}",
			"retfq",
			"2:",
			sel = in(reg) u64::from(selector.bits()),
			tmp = lateout(reg) _,
			options(preserves_flags),
		);
	}
}

/// Exchanges `GS.base` with `IA32_KERNEL_GS_BASE`.
///
/// # Safety
/// Must be executed in ring 0, and paired so that kernel and user
/// bases are never confused.
#[inline(always)]
#[effect(load_segment)]
pub unsafe fn swapgs() {
	// SAFETY: Offloaded to the caller.
	unsafe {
		core::arch::asm!("swapgs", options(nostack, preserves_flags));
	}
}

/// Reads `FS.base` (`RDFSBASE`). Requires `CR4.FSGSBASE`.
#[inline(always)]
#[must_use]
pub fn read_fs_base() -> u64 {
	let base: u64;
	// SAFETY: Faults with #UD if not enabled; no other side effects.
	unsafe {
		core::arch::asm!("rdfsbase {}", out(reg) base, options(nostack, nomem, preserves_flags));
	}
	base
}

/// Reads `GS.base` (`RDGSBASE`). Requires `CR4.FSGSBASE`.
#[inline(always)]
#[must_use]
pub fn read_gs_base() -> u64 {
	let base: u64;
	// SAFETY: Faults with #UD if not enabled; no other side effects.
	unsafe {
		core::arch::asm!("rdgsbase {}", out(reg) base, options(nostack, nomem, preserves_flags));
	}
	base
}

/// Reads the low 32 bits of `FS.base`.
#[inline(always)]
#[must_use]
pub fn read_fs_base32() -> u32 {
	let base: u32;
	// SAFETY: Faults with #UD if not enabled; no other side effects.
	unsafe {
		core::arch::asm!("rdfsbase {:e}", out(reg) base, options(nostack, nomem, preserves_flags));
	}
	base
}

/// Reads the low 32 bits of `GS.base`.
#[inline(always)]
#[must_use]
pub fn read_gs_base32() -> u32 {
	let base: u32;
	// SAFETY: Faults with #UD if not enabled; no other side effects.
	unsafe {
		core::arch::asm!("rdgsbase {:e}", out(reg) base, options(nostack, nomem, preserves_flags));
	}
	base
}

/// Writes `FS.base` (`WRFSBASE`). Requires `CR4.FSGSBASE`.
///
/// # Safety
/// Code relying on `FS`-relative addressing (thread-local storage)
/// observes the new base immediately.
#[inline(always)]
#[effect(load_segment)]
pub unsafe fn write_fs_base(base: u64) {
	// SAFETY: Offloaded to the caller.
	unsafe {
		core::arch::asm!("wrfsbase {}", in(reg) base, options(nostack, preserves_flags));
	}
}

/// Writes `GS.base` (`WRGSBASE`). Requires `CR4.FSGSBASE`.
///
/// # Safety
/// Code relying on `GS`-relative addressing (per-CPU data) observes
/// the new base immediately.
#[inline(always)]
#[effect(load_segment)]
pub unsafe fn write_gs_base(base: u64) {
	// SAFETY: Offloaded to the caller.
	unsafe {
		core::arch::asm!("wrgsbase {}", in(reg) base, options(nostack, preserves_flags));
	}
}

/// Writes `FS.base` from a 32-bit value; the upper half is zeroed.
///
/// # Safety
/// See [`write_fs_base`].
#[inline(always)]
#[effect(load_segment)]
pub unsafe fn write_fs_base32(base: u32) {
	// SAFETY: Offloaded to the caller.
	unsafe {
		core::arch::asm!("wrfsbase {:e}", in(reg) base, options(nostack, preserves_flags));
	}
}

/// Writes `GS.base` from a 32-bit value; the upper half is zeroed.
///
/// # Safety
/// See [`write_gs_base`].
#[inline(always)]
#[effect(load_segment)]
pub unsafe fn write_gs_base32(base: u32) {
	// SAFETY: Offloaded to the caller.
	unsafe {
		core::arch::asm!("wrgsbase {:e}", in(reg) base, options(nostack, preserves_flags));
	}
}

/// Loads the segment limit of `selector` (`LSL`).
///
/// Returns `None` if the descriptor is not visible at the current
/// privilege level or has no limit.
#[inline(always)]
#[must_use]
pub fn load_segment_limit(selector: SegmentSelector) -> Option<u32> {
	let limit: u32;
	let ok: u8;
	// SAFETY: LSL reports failure through ZF rather than faulting.
	unsafe {
		core::arch::asm!(
			"lsl {limit:e}, {sel:e}",
			"setz {ok}",
			sel = in(reg) u32::from(selector.bits()),
			limit = lateout(reg) limit,
			ok = lateout(reg_byte) ok,
			options(nostack, nomem),
		);
	}
	(ok != 0).then_some(limit)
}

/// Loads the access rights of `selector` (`LAR`).
///
/// Returns `None` if the descriptor is not visible at the current
/// privilege level or is of a type `LAR` does not report.
#[inline(always)]
#[must_use]
pub fn load_access_rights(selector: SegmentSelector) -> Option<AccessRights> {
	let raw: u32;
	let ok: u8;
	// SAFETY: LAR reports failure through ZF rather than faulting.
	unsafe {
		core::arch::asm!(
			"lar {raw:e}, {sel:e}",
			"setz {ok}",
			sel = in(reg) u32::from(selector.bits()),
			raw = lateout(reg) raw,
			ok = lateout(reg_byte) ok,
			options(nostack, nomem),
		);
	}
	(ok != 0).then(|| AccessRights::from_lar(raw))
}

/// Returns whether `selector` is readable at the current privilege
/// level (`VERR`).
#[inline(always)]
#[must_use]
pub fn verify_segment_read(selector: SegmentSelector) -> bool {
	let ok: u8;
	// SAFETY: VERR reports through ZF only.
	unsafe {
		core::arch::asm!(
			"verr {sel:x}",
			"setz {ok}",
			sel = in(reg) selector.bits(),
			ok = lateout(reg_byte) ok,
			options(nostack, nomem),
		);
	}
	ok != 0
}

/// Returns whether `selector` is writable at the current privilege
/// level (`VERW`).
#[inline(always)]
#[must_use]
pub fn verify_segment_write(selector: SegmentSelector) -> bool {
	let ok: u8;
	// SAFETY: VERW reports through ZF only.
	unsafe {
		core::arch::asm!(
			"verw {sel:x}",
			"setz {ok}",
			sel = in(reg) selector.bits(),
			ok = lateout(reg_byte) ok,
			options(nostack, nomem),
		);
	}
	ok != 0
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::segment::SegmentType;

	#[test]
	fn current_code_segment() {
		let cs = read_cs();
		assert_eq!(cs.rpl(), 3);
		assert!(!cs.is_null());

		let ar = load_access_rights(cs).expect("LAR on CS");
		assert!(ar.present());
		assert!(ar.long_mode());
		assert_eq!(ar.dpl(), 3);
		assert!(ar.code_data_type().is_some_and(SegmentType::is_code));

		assert!(load_segment_limit(cs).is_some());
		assert!(verify_segment_read(cs));
		assert!(!verify_segment_write(cs));
	}

	#[test]
	fn null_selector_fails() {
		assert_eq!(load_access_rights(SegmentSelector::NULL), None);
		assert_eq!(load_segment_limit(SegmentSelector::NULL), None);
		assert!(!verify_segment_read(SegmentSelector::NULL));
		assert!(!verify_segment_write(SegmentSelector::NULL));
	}

	#[test]
	fn data_segment_is_writable() {
		let ss = read_ss();
		assert_eq!(ss.rpl(), 3);
		assert!(verify_segment_write(ss));
	}
}
