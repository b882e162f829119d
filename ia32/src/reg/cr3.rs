//! The CR3 control register.
//!
//! CR3 has two layouts depending on `CR4.PCIDE`. Both share the page
//! directory base; with PCIDs enabled the low twelve bits hold the
//! current PCID instead of the `PWT`/`PCD` cache controls.

use ia32_macro::bitstruct;
#[cfg(target_arch = "x86_64")]
use ia32_test::effect;

bitstruct! {
	/// CR3 with `CR4.PCIDE = 0`.
	pub struct Cr3(u64) {
		/// Page-level Write-Through for the top-level paging structure.
		pub pwt[3] => as bool,
		/// Page-level Cache Disable for the top-level paging structure.
		pub pcd[4] => as bool,
		/// Page frame number of the top-level paging structure (PML4 or PML5).
		///
		/// The physical address is this value shifted left by 12.
		pub address_of_page_directory[51:12] => as u64,
		/// Linear Address Masking for user pointers, 57-bit mode.
		pub lam_u57[61] => as bool,
		/// Linear Address Masking for user pointers, 48-bit mode.
		pub lam_u48[62] => as bool,
	}
}

bitstruct! {
	/// CR3 with `CR4.PCIDE = 1`.
	pub struct Cr3Pcid(u64) {
		/// The current process-context identifier.
		pub pcid[11:0] => as u16,
		/// Page frame number of the top-level paging structure.
		pub address_of_page_directory[51:12] => as u64,
		/// Linear Address Masking for user pointers, 57-bit mode.
		pub lam_u57[61] => as bool,
		/// Linear Address Masking for user pointers, 48-bit mode.
		pub lam_u48[62] => as bool,
		/// On `MOV to CR3` only: when set, TLB entries tagged with the new
		/// PCID are not invalidated. Never set on reads.
		pub no_invalidate[63] => as bool,
	}
}

impl Cr3 {
	/// Returns the physical address of the top-level paging structure.
	#[inline]
	#[must_use]
	pub const fn page_directory_address(self) -> u64 {
		self.address_of_page_directory() << 12
	}
}

impl Cr3Pcid {
	/// Returns the physical address of the top-level paging structure.
	#[inline]
	#[must_use]
	pub const fn page_directory_address(self) -> u64 {
		self.address_of_page_directory() << 12
	}
}

#[cfg(target_arch = "x86_64")]
impl Cr3 {
	/// Reads CR3.
	#[inline(always)]
	#[must_use]
	pub fn load() -> Self {
		Self(read_raw())
	}

	/// Writes CR3, switching the address space.
	///
	/// # Safety
	/// Must be executed in ring 0. The new paging hierarchy must map the
	/// currently executing code and stack at the same linear addresses.
	#[inline(always)]
	pub unsafe fn store(self) {
		// SAFETY: Caller upholds the requirements.
		unsafe { write_raw(self.0) }
	}
}

#[cfg(target_arch = "x86_64")]
impl Cr3Pcid {
	/// Reads CR3 as its PCID layout.
	#[inline(always)]
	#[must_use]
	pub fn load() -> Self {
		Self(read_raw())
	}

	/// Writes CR3, switching the address space and PCID.
	///
	/// # Safety
	/// Must be executed in ring 0 with `CR4.PCIDE = 1`. The new paging
	/// hierarchy must map the currently executing code and stack.
	#[inline(always)]
	pub unsafe fn store(self) {
		// SAFETY: Caller upholds the requirements.
		unsafe { write_raw(self.0) }
	}
}

/// Reads the raw value of CR3.
#[cfg(target_arch = "x86_64")]
#[inline(always)]
fn read_raw() -> u64 {
	let cr3: u64;
	// SAFETY: Reading CR3 has no side effects.
	unsafe {
		core::arch::asm!("mov {}, cr3", out(reg) cr3, options(nostack, nomem, preserves_flags));
	}
	cr3
}

/// Writes the raw value of CR3.
///
/// Not `nomem`; the compiler must not move memory accesses across an
/// address space switch.
#[cfg(target_arch = "x86_64")]
#[inline(always)]
#[effect(write_reg = cr3)]
unsafe fn write_raw(value: u64) {
	// SAFETY: Caller upholds the requirements of `store()`.
	unsafe {
		core::arch::asm!("mov cr3, {}", in(reg) value, options(nostack, preserves_flags));
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn layout() {
		assert_eq!(Cr3::PWT_FLAG, 1 << 3);
		assert_eq!(Cr3::PCD_FLAG, 1 << 4);
		assert_eq!(Cr3::ADDRESS_OF_PAGE_DIRECTORY_BIT, 12);
		assert_eq!(Cr3::ADDRESS_OF_PAGE_DIRECTORY_MASK, (1 << 40) - 1);
		assert_eq!(Cr3Pcid::PCID_MASK, 0xFFF);
		assert_eq!(Cr3Pcid::NO_INVALIDATE_FLAG, 1 << 63);
	}

	#[test]
	fn address_round_trip() {
		let cr3 = Cr3::new().with_address_of_page_directory(0x1_2345).with_pcd(true);
		assert_eq!(cr3.bits(), 0x1234_5010);
		assert_eq!(cr3.page_directory_address(), 0x1234_5000);
		assert_eq!(cr3.reserved_bits(), 0);

		let pcid = Cr3Pcid::from_bits(cr3.bits());
		assert_eq!(pcid.pcid(), 0x10);
		let pcid = pcid.with_pcid(0x7);
		assert_eq!(pcid.pcid(), 0x7);
		assert_eq!(pcid.page_directory_address(), 0x1234_5000);
	}
}
