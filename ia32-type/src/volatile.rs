//! Volatile cells for memory-mapped register blocks.

use core::cell::UnsafeCell;

/// A read-write volatile cell.
///
/// Every access compiles to exactly one load or store of `T`,
/// which is what device registers (e.g. the local APIC page) require.
#[repr(transparent)]
pub struct Volatile<T> {
	/// The underlying value.
	///
	/// `UnsafeCell` opts the value out of the compiler's
	/// immutability assumptions for shared references.
	value: UnsafeCell<T>,
}

impl<T> Volatile<T>
where
	T: Copy,
{
	/// Creates a new volatile cell.
	///
	/// # Discouraged
	/// Register blocks are normally obtained by casting a pointer
	/// with [`Volatile::try_cast`]; constructing one directly is
	/// mostly useful for tests.
	#[inline(always)]
	#[must_use]
	pub const fn new(value: T) -> Self {
		Self {
			value: UnsafeCell::new(value),
		}
	}

	/// Attempts to cast the given pointer to a volatile cell.
	///
	/// Returns `None` if the pointer is null or unaligned.
	///
	/// # Safety
	/// The pointed-to value must be valid for reads and writes
	/// for the lifetime `'a`.
	#[inline(always)]
	#[must_use]
	pub unsafe fn try_cast<'a>(ptr: *mut T) -> Option<&'a Self> {
		if ptr.is_aligned() {
			// SAFETY: Validity for `'a` is guaranteed by the caller;
			// SAFETY: `as_ref` handles the null case.
			unsafe { ptr.cast::<Self>().as_ref() }
		} else {
			None
		}
	}

	/// Reads the value.
	#[inline(always)]
	#[must_use]
	pub fn get(&self) -> T {
		// SAFETY: A live reference to `self` means the cell is valid for reads.
		unsafe { self.value.get().read_volatile() }
	}

	/// Writes the value.
	#[inline(always)]
	pub fn set(&self, value: T) {
		// SAFETY: A live reference to `self` means the cell is valid for writes.
		unsafe { self.value.get().write_volatile(value) }
	}

	/// Reads the value, transforms it and writes it back.
	///
	/// This is two separate accesses; it is not atomic with respect
	/// to other agents observing the location.
	#[inline(always)]
	pub fn update(&self, f: impl FnOnce(T) -> T) {
		self.set(f(self.get()));
	}

	/// Returns the raw pointer to the underlying location.
	#[inline(always)]
	#[must_use]
	pub const fn as_ptr(&self) -> *mut T {
		self.value.get()
	}
}

/// A read-only volatile cell.
///
/// Used for registers where writes are undefined or ignored.
#[repr(transparent)]
pub struct ReadOnly<T>(Volatile<T>);

impl<T> ReadOnly<T>
where
	T: Copy,
{
	/// Creates a new read-only cell.
	#[inline(always)]
	#[must_use]
	pub const fn new(value: T) -> Self {
		Self(Volatile::new(value))
	}

	/// Reads the value.
	#[inline(always)]
	#[must_use]
	pub fn get(&self) -> T {
		self.0.get()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn get_set_update() {
		let v = Volatile::new(5_u32);
		assert_eq!(v.get(), 5);
		v.set(7);
		assert_eq!(v.get(), 7);
		v.update(|x| x | 0x100);
		assert_eq!(v.get(), 0x107);
	}

	#[test]
	fn try_cast_rejects_null_and_misaligned() {
		let mut backing = [0_u32; 2];
		let base = backing.as_mut_ptr();

		// SAFETY: Testing only; the pointer is null.
		assert!(unsafe { Volatile::<u32>::try_cast(core::ptr::null_mut()) }.is_none());

		// SAFETY: Testing only; the pointer is misaligned and never dereferenced.
		let misaligned = unsafe { base.cast::<u8>().add(1).cast::<u32>() };
		// SAFETY: Testing only; rejected before any access.
		assert!(unsafe { Volatile::<u32>::try_cast(misaligned) }.is_none());

		// SAFETY: `backing` outlives the returned reference.
		let cell = unsafe { Volatile::try_cast(base) }.unwrap();
		cell.set(0xAA55);
		assert_eq!(backing[0], 0xAA55);
	}

	#[test]
	fn read_only() {
		let r = ReadOnly::new(0x1234_u16);
		assert_eq!(r.get(), 0x1234);
	}
}
