//! The 64-bit task-state segment.

/// A stack pointer slot in the TSS.
///
/// The TSS places 8-byte pointers on 4-byte boundaries, so each is
/// stored as two halves.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[repr(C, align(4))]
pub struct TssPtr {
	/// Low 32 bits.
	pub low:  u32,
	/// High 32 bits.
	pub high: u32,
}

impl TssPtr {
	/// Returns the pointer value.
	#[must_use]
	pub const fn get(self) -> u64 {
		((self.high as u64) << 32) | self.low as u64
	}
}

impl From<u64> for TssPtr {
	fn from(value: u64) -> Self {
		Self {
			low:  value as u32,
			high: (value >> 32) as u32,
		}
	}
}

/// The IA-32e mode task-state segment.
///
/// In 64-bit mode the TSS holds no task state, only the stack pointers
/// loaded on privilege changes and IST switches, and the I/O permission
/// bitmap offset.
#[derive(Debug, Clone, PartialEq, Eq)]
#[repr(C)]
pub struct Tss64 {
	reserved0:       u32,
	/// Stack pointers loaded on a transition to rings 0-2.
	pub rsp:         [TssPtr; 3],
	reserved1:       [u32; 2],
	/// Interrupt stack table entries 1-7 (index 0 is IST1).
	pub ist:         [TssPtr; 7],
	reserved2:       [u32; 2],
	reserved3:       u16,
	/// Offset of the I/O permission bitmap from the TSS base. A value at
	/// or beyond the TSS limit means no bitmap.
	pub iopb_offset: u16,
}

static_assertions::const_assert_eq!(core::mem::size_of::<Tss64>(), 104);

impl Default for Tss64 {
	fn default() -> Self {
		Self::new()
	}
}

impl Tss64 {
	/// The size of the TSS without an I/O permission bitmap.
	pub const SIZE: u16 = 104;

	/// Creates an empty TSS with no I/O permission bitmap.
	#[must_use]
	pub const fn new() -> Self {
		Self {
			reserved0:   0,
			rsp:         [TssPtr { low: 0, high: 0 }; 3],
			reserved1:   [0; 2],
			ist:         [TssPtr { low: 0, high: 0 }; 7],
			reserved2:   [0; 2],
			reserved3:   0,
			iopb_offset: Self::SIZE,
		}
	}

	/// Sets the stack pointer used when entering ring `ring` (0-2).
	///
	/// # Panics
	/// Panics if `ring` is above 2.
	pub fn set_rsp(&mut self, ring: usize, rsp: u64) {
		self.rsp[ring] = TssPtr::from(rsp);
	}

	/// Sets interrupt stack table entry `index` (1-7).
	///
	/// # Panics
	/// Panics if `index` is 0 or above 7.
	pub fn set_ist(&mut self, index: usize, rsp: u64) {
		assert!((1..=7).contains(&index), "IST index must be 1-7");
		self.ist[index - 1] = TssPtr::from(rsp);
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn field_offsets() {
		assert_eq!(core::mem::offset_of!(Tss64, rsp), 4);
		assert_eq!(core::mem::offset_of!(Tss64, ist), 0x24);
		assert_eq!(core::mem::offset_of!(Tss64, iopb_offset), 0x66);
	}

	#[test]
	fn set_stacks() {
		let mut tss = Tss64::new();
		tss.set_rsp(0, 0xFFFF_8000_0000_1000);
		tss.set_ist(1, 0xFFFF_8000_0000_2000);
		assert_eq!(tss.rsp[0].get(), 0xFFFF_8000_0000_1000);
		assert_eq!(tss.ist[0].low, 0x2000);
		assert_eq!(tss.ist[0].high, 0xFFFF_8000);
		assert_eq!(tss.iopb_offset, 104);
	}
}
