//! Processor extended state save areas.
//!
//! The first 512 bytes of every XSAVE area are the FXSAVE legacy
//! region ([`FxsaveArea`]); the next 64 bytes are the [`XsaveHeader`].
//! Component bitmaps use the [`Xcr0`] layout for both user (XCR0)
//! and supervisor (`IA32_XSS`) components.

use ia32_macro::bitstruct;

use crate::reg::Xcr0;

bitstruct! {
	/// MXCSR: SSE control and status.
	pub struct Mxcsr(u32) {
		/// Invalid operation (sticky).
		pub invalid_operation[0] => as bool,
		/// Denormal operand (sticky).
		pub denormal[1] => as bool,
		/// Divide by zero (sticky).
		pub divide_by_zero[2] => as bool,
		/// Overflow (sticky).
		pub overflow[3] => as bool,
		/// Underflow (sticky).
		pub underflow[4] => as bool,
		/// Precision (sticky).
		pub precision[5] => as bool,
		/// Denormal operands are treated as zero.
		pub denormals_are_zero[6] => as bool,
		/// Invalid operation is masked.
		pub invalid_operation_mask[7] => as bool,
		/// Denormal operand is masked.
		pub denormal_mask[8] => as bool,
		/// Divide by zero is masked.
		pub divide_by_zero_mask[9] => as bool,
		/// Overflow is masked.
		pub overflow_mask[10] => as bool,
		/// Underflow is masked.
		pub underflow_mask[11] => as bool,
		/// Precision is masked.
		pub precision_mask[12] => as bool,
		/// The rounding mode.
		pub rounding[14:13] => enum Rounding(u8) {
			/// Round to nearest (even).
			Nearest = 0,
			/// Round toward negative infinity.
			Down = 1,
			/// Round toward positive infinity.
			Up = 2,
			/// Round toward zero.
			TowardZero = 3,
		},
		/// Underflowing results are flushed to zero.
		pub flush_to_zero[15] => as bool,
	}
}

impl Mxcsr {
	/// The value after reset and `FNINIT`-style initialization: all
	/// exceptions masked, round to nearest.
	pub const DEFAULT: Self = Self::from_bits(0x1F80);
}

bitstruct! {
	/// `XCOMP_BV`: the components laid out by `XSAVEC`/`XSAVES`.
	pub struct XcompBv(u64) {
		/// The component bitmap, in [`Xcr0`] layout.
		pub components[62:0] => as u64,
		/// The area uses the compacted format.
		pub compacted[63] => as bool,
	}
}

/// The 512-byte legacy region written by `FXSAVE64` (and the first
/// part of every XSAVE area).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(C, align(16))]
pub struct FxsaveArea {
	/// x87 control word.
	pub fcw:        u16,
	/// x87 status word.
	pub fsw:        u16,
	/// Abridged x87 tag word (one bit per register, set if valid).
	pub ftw:        u8,
	/// Reserved.
	pub _reserved0: u8,
	/// The last x87 opcode.
	pub fop:        u16,
	/// The last x87 instruction pointer.
	pub fip:        u64,
	/// The last x87 data pointer.
	pub fdp:        u64,
	/// SSE control and status.
	pub mxcsr:      Mxcsr,
	/// The writable bits of MXCSR; zero means `0xFFBF`.
	pub mxcsr_mask: u32,
	/// ST0-ST7 (or MM0-MM7), 10 bytes each in 16-byte slots.
	pub st:         [[u8; 16]; 8],
	/// XMM0-XMM15.
	pub xmm:        [[u8; 16]; 16],
	/// Reserved.
	pub _reserved1: [u8; 48],
	/// Available to software; not written by the processor.
	pub available:  [u8; 48],
}

static_assertions::const_assert_eq!(core::mem::size_of::<FxsaveArea>(), 512);

impl FxsaveArea {
	/// Returns an all-zero area.
	#[must_use]
	pub const fn zeroed() -> Self {
		Self {
			fcw:        0,
			fsw:        0,
			ftw:        0,
			_reserved0: 0,
			fop:        0,
			fip:        0,
			fdp:        0,
			mxcsr:      Mxcsr::new(),
			mxcsr_mask: 0,
			st:         [[0; 16]; 8],
			xmm:        [[0; 16]; 16],
			_reserved1: [0; 48],
			available:  [0; 48],
		}
	}

	/// Returns the effective MXCSR write mask.
	#[must_use]
	pub const fn effective_mxcsr_mask(&self) -> u32 {
		match self.mxcsr_mask {
			0 => 0xFFBF,
			mask => mask,
		}
	}
}

impl Default for FxsaveArea {
	fn default() -> Self {
		Self::zeroed()
	}
}

/// The 64-byte XSAVE header, following the legacy region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(C)]
pub struct XsaveHeader {
	/// The components whose state is not in their initial configuration.
	pub xstate_bv: Xcr0,
	/// The format and components of a compacted area.
	pub xcomp_bv:  XcompBv,
	/// Reserved; must be zero for `XRSTOR`.
	pub _reserved: [u64; 6],
}

static_assertions::const_assert_eq!(core::mem::size_of::<XsaveHeader>(), 64);

/// An XSAVE area large enough for the x87 and SSE components only.
///
/// Larger areas (sized from `CPUID.(EAX=0DH,ECX=0):EBX` or `ECX`) must
/// be allocated by the caller with 64-byte alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(C, align(64))]
pub struct XsaveLegacyArea {
	/// The legacy region.
	pub legacy: FxsaveArea,
	/// The header.
	pub header: XsaveHeader,
}

static_assertions::const_assert_eq!(core::mem::size_of::<XsaveLegacyArea>(), 576);

/// The offset of the header within an XSAVE area.
pub const HEADER_OFFSET: usize = 512;
/// The offset of the first extended component in a standard-format area.
pub const EXTENDED_OFFSET: usize = 576;

#[cfg(target_arch = "x86_64")]
pub use self::instr::{
	fxrstor64, fxsave64, xrstor64, xrstors64, xsave64, xsavec64, xsaveopt64, xsaves64,
};

#[cfg(target_arch = "x86_64")]
mod instr {
	#![expect(clippy::inline_always)]

	use core::arch::asm;

	use super::{FxsaveArea, Xcr0};

	/// Saves x87, MMX and SSE state (`FXSAVE64`).
	#[inline(always)]
	pub fn fxsave64(area: &mut FxsaveArea) {
		// SAFETY: `area` is a writable, 16-byte aligned 512-byte region.
		unsafe {
			asm!("fxsave64 [{}]", in(reg) core::ptr::from_mut(area), options(nostack, preserves_flags));
		}
	}

	/// Restores x87, MMX and SSE state (`FXRSTOR64`).
	///
	/// # Safety
	/// Reserved MXCSR bits in `area` must be clear; the restored state
	/// replaces the current thread's floating-point state.
	#[inline(always)]
	pub unsafe fn fxrstor64(area: &FxsaveArea) {
		// SAFETY: Offloaded to the caller.
		unsafe {
			asm!("fxrstor64 [{}]", in(reg) core::ptr::from_ref(area), options(nostack, readonly, preserves_flags));
		}
	}

	macro_rules! xsave_fn {
		($(#[$meta:meta])* $name:ident, $insn:literal) => {
			$(#[$meta])*
			///
			/// # Safety
			/// `area` must be 64-byte aligned and large enough for every
			/// requested component (see `CPUID.(EAX=0DH)`). Requires
			/// `CR4.OSXSAVE` and support for the instruction.
			#[inline(always)]
			pub unsafe fn $name(area: *mut u8, components: Xcr0) {
				let mask = components.bits();
				// SAFETY: Offloaded to the caller.
				unsafe {
					asm!(
						concat!($insn, " [{}]"),
						in(reg) area,
						in("eax") mask as u32,
						in("edx") (mask >> 32) as u32,
						options(nostack, preserves_flags),
					);
				}
			}
		};
	}

	macro_rules! xrstor_fn {
		($(#[$meta:meta])* $name:ident, $insn:literal) => {
			$(#[$meta])*
			///
			/// # Safety
			/// `area` must be 64-byte aligned and hold a valid XSAVE image
			/// for the requested components. Requires `CR4.OSXSAVE` and
			/// support for the instruction.
			#[inline(always)]
			pub unsafe fn $name(area: *const u8, components: Xcr0) {
				let mask = components.bits();
				// SAFETY: Offloaded to the caller.
				unsafe {
					asm!(
						concat!($insn, " [{}]"),
						in(reg) area,
						in("eax") mask as u32,
						in("edx") (mask >> 32) as u32,
						options(nostack, readonly, preserves_flags),
					);
				}
			}
		};
	}

	xsave_fn! {
		/// Saves the requested components enabled in XCR0 (`XSAVE64`).
		xsave64, "xsave64"
	}
	xsave_fn! {
		/// Saves the requested components, skipping those unmodified
		/// since the last `XRSTOR` (`XSAVEOPT64`).
		xsaveopt64, "xsaveopt64"
	}
	xsave_fn! {
		/// Saves the requested components in compacted format (`XSAVEC64`).
		xsavec64, "xsavec64"
	}
	xsave_fn! {
		/// Saves user and supervisor components in compacted format
		/// (`XSAVES64`). Ring 0 only.
		xsaves64, "xsaves64"
	}
	xrstor_fn! {
		/// Restores the requested components (`XRSTOR64`).
		xrstor64, "xrstor64"
	}
	xrstor_fn! {
		/// Restores user and supervisor components from a compacted
		/// area (`XRSTORS64`). Ring 0 only.
		xrstors64, "xrstors64"
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn layout() {
		assert_eq!(core::mem::offset_of!(FxsaveArea, mxcsr), 24);
		assert_eq!(core::mem::offset_of!(FxsaveArea, st), 32);
		assert_eq!(core::mem::offset_of!(FxsaveArea, xmm), 160);
		assert_eq!(core::mem::offset_of!(XsaveLegacyArea, header), HEADER_OFFSET);
		assert_eq!(core::mem::size_of::<XsaveLegacyArea>(), EXTENDED_OFFSET);
	}

	#[test]
	fn mxcsr() {
		let mxcsr = Mxcsr::DEFAULT;
		assert!(mxcsr.precision_mask());
		assert!(mxcsr.invalid_operation_mask());
		assert!(!mxcsr.flush_to_zero());
		assert_eq!(mxcsr.rounding(), Rounding::Nearest);
		assert_eq!(mxcsr.with_rounding(Rounding::TowardZero).bits(), 0x7F80);
		assert_eq!(FxsaveArea::zeroed().effective_mxcsr_mask(), 0xFFBF);
	}

	#[test]
	fn xcomp_bv() {
		let xcomp = XcompBv::new().with_components(0b111).with_compacted(true);
		assert_eq!(xcomp.bits(), 0x8000_0000_0000_0007);
	}

	#[test]
	#[cfg(target_arch = "x86_64")]
	fn fxsave_captures_defaults() {
		let mut area = FxsaveArea::zeroed();
		fxsave64(&mut area);
		assert_eq!(area.fcw, 0x037F);
		assert_eq!(area.mxcsr, Mxcsr::DEFAULT);
		assert_ne!(area.effective_mxcsr_mask(), 0);
		// SAFETY: Restores exactly the state that was saved.
		unsafe { fxrstor64(&area) };
	}

	#[test]
	#[cfg(target_arch = "x86_64")]
	fn xsave_legacy_components() {
		if !std::arch::is_x86_feature_detected!("xsave") {
			return;
		}

		let components = Xcr0::new().with_x87(true).with_sse(true);
		let mut area = XsaveLegacyArea::default();
		// SAFETY: The area is 64-byte aligned and holds x87 and SSE state.
		unsafe { xsave64(core::ptr::from_mut(&mut area).cast(), components) };
		assert_eq!(area.legacy.mxcsr, Mxcsr::DEFAULT);
		assert_eq!(area.header.xstate_bv.bits() & !components.bits(), 0);
		assert!(!area.header.xcomp_bv.compacted());
		// SAFETY: Restores exactly the state that was saved.
		unsafe { xrstor64(core::ptr::from_ref(&area).cast(), components) };
	}
}
