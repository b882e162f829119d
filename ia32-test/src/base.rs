#[cfg(feature = "mmio")]
use core::sync::atomic::{AtomicU64, Ordering};

/// The linear address at which the emission window's
/// physical page is currently mapped, minus the window's
/// physical address.
#[cfg(feature = "mmio")]
static MMIO_BASE: AtomicU64 = AtomicU64::new(0);

/// Sets the offset of the linear mapping through which
/// the emission window is reached.
///
/// # Safety
/// Caller must ensure that `base + 0xFEB0_0000` is mapped
/// uncacheable and that writes to it have no effect other
/// than event emission.
#[cfg_attr(not(feature = "mmio"), inline(always))]
#[cfg_attr(
	not(feature = "mmio"),
	expect(
		unused_variables,
		reason = "base is only used when the 'mmio' feature is enabled"
	)
)]
pub unsafe fn set_mmio_base(base: u64) {
	#[cfg(feature = "mmio")]
	{
		MMIO_BASE.store(base, Ordering::SeqCst);
	}
}

/// Gets the current offset of the emission window mapping.
#[cfg(feature = "mmio")]
pub fn get_mmio_base() -> u64 {
	MMIO_BASE.load(Ordering::SeqCst)
}
