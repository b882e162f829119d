//! Fixed architectural sizes and shift exponents.

/// The size of a cache line, in bytes.
///
/// Architecturally this is reported by `CPUID.01H:EBX[15:8]`; every
/// Intel 64 processor to date reports 64.
pub const CACHE_LINE_SIZE: usize = 64;

/// The size of a 4 KiB page, in bytes.
pub const PAGE_SIZE: usize = 4096;
/// The shift exponent of a 4 KiB page.
pub const PAGE_SHIFT: u32 = 12;
/// The mask of the offset within a 4 KiB page.
pub const PAGE_MASK: u64 = (1 << PAGE_SHIFT) - 1;

/// The shift exponent of a 2 MiB page (4-level paging PDE).
pub const PAGE_2M_SHIFT: u32 = 21;
/// The size of a 2 MiB page, in bytes.
pub const PAGE_2M_SIZE: usize = 1 << PAGE_2M_SHIFT;

/// The shift exponent of a 1 GiB page (4-level paging PDPTE).
pub const PAGE_1G_SHIFT: u32 = 30;
/// The size of a 1 GiB page, in bytes.
pub const PAGE_1G_SIZE: usize = 1 << PAGE_1G_SHIFT;

/// The shift exponent of a 4 MiB page (32-bit paging PDE).
pub const PAGE_4M_SHIFT: u32 = 22;
/// The size of a 4 MiB page, in bytes.
pub const PAGE_4M_SIZE: usize = 1 << PAGE_4M_SHIFT;

/// The number of entries in a 4-level (and 5-level, and EPT) paging structure.
pub const ENTRIES_PER_TABLE: usize = 512;
/// The number of entries in a 32-bit paging structure.
pub const ENTRIES_PER_TABLE_32: usize = 1024;

/// The number of linear-address bits each 4-level paging structure translates.
pub const BITS_PER_LEVEL: u32 = 9;
/// The number of linear-address bits each 32-bit paging structure translates.
pub const BITS_PER_LEVEL_32: u32 = 10;

/// The size of a VMCS or VMXON region, in bytes.
pub const VMX_REGION_SIZE: usize = 4096;

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn page_sizes() {
		assert_eq!(PAGE_SIZE, 1 << PAGE_SHIFT);
		assert_eq!(PAGE_2M_SIZE, 0x20_0000);
		assert_eq!(PAGE_1G_SIZE, 0x4000_0000);
		assert_eq!(PAGE_4M_SIZE, 0x40_0000);
		assert_eq!(ENTRIES_PER_TABLE, 1 << BITS_PER_LEVEL);
		assert_eq!(ENTRIES_PER_TABLE_32, 1 << BITS_PER_LEVEL_32);
		assert_eq!(PAGE_2M_SHIFT, PAGE_SHIFT + BITS_PER_LEVEL);
		assert_eq!(PAGE_1G_SHIFT, PAGE_2M_SHIFT + BITS_PER_LEVEL);
		assert_eq!(PAGE_4M_SHIFT, PAGE_SHIFT + BITS_PER_LEVEL_32);
	}
}
