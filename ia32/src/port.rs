//! Port I/O.
//!
//! All functions fault (`#GP`) unless `CPL <= IOPL` or the TSS I/O
//! permission bitmap grants the port.

#![expect(clippy::inline_always)]

use core::arch::asm;

use ia32_test::effect;

/// Reads a byte from `port` (`IN AL, DX`).
///
/// # Safety
/// Reading a device register may have side effects on the device.
#[inline(always)]
#[must_use]
#[effect(port_io)]
pub unsafe fn inb(port: u16) -> u8 {
	let value: u8;
	// SAFETY: Offloaded to the caller.
	unsafe {
		asm!("in al, dx", in("dx") port, out("al") value, options(nostack, preserves_flags));
	}
	value
}

/// Reads a word from `port` (`IN AX, DX`).
///
/// # Safety
/// Reading a device register may have side effects on the device.
#[inline(always)]
#[must_use]
#[effect(port_io)]
pub unsafe fn inw(port: u16) -> u16 {
	let value: u16;
	// SAFETY: Offloaded to the caller.
	unsafe {
		asm!("in ax, dx", in("dx") port, out("ax") value, options(nostack, preserves_flags));
	}
	value
}

/// Reads a doubleword from `port` (`IN EAX, DX`).
///
/// # Safety
/// Reading a device register may have side effects on the device.
#[inline(always)]
#[must_use]
#[effect(port_io)]
pub unsafe fn inl(port: u16) -> u32 {
	let value: u32;
	// SAFETY: Offloaded to the caller.
	unsafe {
		asm!("in eax, dx", in("dx") port, out("eax") value, options(nostack, preserves_flags));
	}
	value
}

/// Writes a byte to `port` (`OUT DX, AL`).
///
/// # Safety
/// The caller is responsible for the effect on the device.
#[inline(always)]
#[effect(port_io)]
pub unsafe fn outb(port: u16, value: u8) {
	// SAFETY: Offloaded to the caller.
	unsafe {
		asm!("out dx, al", in("dx") port, in("al") value, options(nostack, preserves_flags));
	}
}

/// Writes a word to `port` (`OUT DX, AX`).
///
/// # Safety
/// The caller is responsible for the effect on the device.
#[inline(always)]
#[effect(port_io)]
pub unsafe fn outw(port: u16, value: u16) {
	// SAFETY: Offloaded to the caller.
	unsafe {
		asm!("out dx, ax", in("dx") port, in("ax") value, options(nostack, preserves_flags));
	}
}

/// Writes a doubleword to `port` (`OUT DX, EAX`).
///
/// # Safety
/// The caller is responsible for the effect on the device.
#[inline(always)]
#[effect(port_io)]
pub unsafe fn outl(port: u16, value: u32) {
	// SAFETY: Offloaded to the caller.
	unsafe {
		asm!("out dx, eax", in("dx") port, in("eax") value, options(nostack, preserves_flags));
	}
}

/// Declares a `REP INS` wrapper.
macro_rules! rep_ins {
	($(#[$meta:meta])* $name:ident, $ty:ty, $insn:literal) => {
		$(#[$meta])*
		///
		/// The direction flag is cleared first.
		///
		/// # Safety
		/// Reading a device register may have side effects on the device.
		#[inline(always)]
		#[effect(port_io)]
		pub unsafe fn $name(port: u16, buffer: &mut [$ty]) {
			// SAFETY: Offloaded to the caller; `buffer` is writable for its length.
			unsafe {
				asm!(
					"cld",
					concat!("rep ", $insn),
					in("dx") port,
					inout("rdi") buffer.as_mut_ptr() => _,
					inout("rcx") buffer.len() => _,
					options(nostack),
				);
			}
		}
	};
}

/// Declares a `REP OUTS` wrapper.
macro_rules! rep_outs {
	($(#[$meta:meta])* $name:ident, $ty:ty, $insn:literal) => {
		$(#[$meta])*
		///
		/// The direction flag is cleared first.
		///
		/// # Safety
		/// The caller is responsible for the effect on the device.
		#[inline(always)]
		#[effect(port_io)]
		pub unsafe fn $name(port: u16, buffer: &[$ty]) {
			// SAFETY: Offloaded to the caller; `buffer` is readable for its length.
			unsafe {
				asm!(
					"cld",
					concat!("rep ", $insn),
					in("dx") port,
					inout("rsi") buffer.as_ptr() => _,
					inout("rcx") buffer.len() => _,
					options(nostack, readonly),
				);
			}
		}
	};
}

rep_ins! {
	/// Reads bytes from `port` into `buffer` (`REP INSB`).
	insb, u8, "insb"
}
rep_ins! {
	/// Reads words from `port` into `buffer` (`REP INSW`).
	insw, u16, "insw"
}
rep_ins! {
	/// Reads doublewords from `port` into `buffer` (`REP INSD`).
	insl, u32, "insd"
}
rep_outs! {
	/// Writes the bytes of `buffer` to `port` (`REP OUTSB`).
	outsb, u8, "outsb"
}
rep_outs! {
	/// Writes the words of `buffer` to `port` (`REP OUTSW`).
	outsw, u16, "outsw"
}
rep_outs! {
	/// Writes the doublewords of `buffer` to `port` (`REP OUTSD`).
	outsl, u32, "outsd"
}

#[cfg(test)]
mod tests {
	use super::*;

	// Port access faults outside of ring 0 unless the OS grants the port,
	// so only the shapes of the wrappers are checked here.
	#[test]
	fn wrapper_signatures() {
		let _: unsafe fn(u16) -> u8 = inb;
		let _: unsafe fn(u16) -> u16 = inw;
		let _: unsafe fn(u16) -> u32 = inl;
		let _: unsafe fn(u16, u8) = outb;
		let _: unsafe fn(u16, u16) = outw;
		let _: unsafe fn(u16, u32) = outl;
		let _: unsafe fn(u16, &mut [u8]) = insb;
		let _: unsafe fn(u16, &mut [u16]) = insw;
		let _: unsafe fn(u16, &mut [u32]) = insl;
		let _: unsafe fn(u16, &[u8]) = outsb;
		let _: unsafe fn(u16, &[u16]) = outsw;
		let _: unsafe fn(u16, &[u32]) = outsl;
	}
}
