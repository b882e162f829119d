//! Hardware random numbers (`RDRAND`, `RDSEED`).
//!
//! Both instructions report success in `CF`; a clear `CF` means no
//! entropy was available and the instruction should be retried. The
//! retry bound is supplied by the caller; [`RDRAND_RETRIES`] is the
//! bound recommended for `RDRAND`, after which failure indicates a
//! hardware problem. `RDSEED` can legitimately run dry under load and
//! usually warrants a larger bound with [`crate::asm::pause`] between
//! attempts, which [`rdseed`] performs.

#![expect(clippy::inline_always)]

use core::arch::asm;

/// The recommended retry bound for `RDRAND`.
pub const RDRAND_RETRIES: u32 = 10;

/// Failure to obtain a random value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
pub enum RandomError {
	/// `RDRAND` reported no data on every attempt.
	#[error("RDRAND returned no data after {0} attempts")]
	RdrandExhausted(u32),
	/// `RDSEED` reported no data on every attempt.
	#[error("RDSEED returned no data after {0} attempts")]
	RdseedExhausted(u32),
}

/// Operand widths supported by `RDRAND` and `RDSEED`.
pub trait RandomWord: private::Sealed + Sized {
	/// Executes `RDRAND` once.
	///
	/// # Safety
	/// Requires `CPUID.01H:ECX.RDRAND`.
	unsafe fn rdrand_step() -> Option<Self>;

	/// Executes `RDSEED` once.
	///
	/// # Safety
	/// Requires `CPUID.(EAX=07H,ECX=0):EBX.RDSEED`.
	unsafe fn rdseed_step() -> Option<Self>;
}

mod private {
	/// Restricts [`super::RandomWord`] to the supported widths.
	pub trait Sealed {}
}

/// Implements [`RandomWord`] for one width.
macro_rules! random_word {
	($ty:ty, $rdrand:literal, $rdseed:literal) => {
		impl private::Sealed for $ty {}

		impl RandomWord for $ty {
			#[inline(always)]
			unsafe fn rdrand_step() -> Option<Self> {
				let value: $ty;
				let ok: u8;
				// SAFETY: Offloaded to the caller.
				unsafe {
					asm!(
						$rdrand,
						"setc {ok}",
						value = out(reg) value,
						ok = out(reg_byte) ok,
						options(nomem, nostack),
					);
				}
				(ok != 0).then_some(value)
			}

			#[inline(always)]
			unsafe fn rdseed_step() -> Option<Self> {
				let value: $ty;
				let ok: u8;
				// SAFETY: Offloaded to the caller.
				unsafe {
					asm!(
						$rdseed,
						"setc {ok}",
						value = out(reg) value,
						ok = out(reg_byte) ok,
						options(nomem, nostack),
					);
				}
				(ok != 0).then_some(value)
			}
		}
	};
}

random_word!(u16, "rdrand {value:x}", "rdseed {value:x}");
random_word!(u32, "rdrand {value:e}", "rdseed {value:e}");
random_word!(u64, "rdrand {value}", "rdseed {value}");

/// Returns a random value from the DRBG, trying up to `retries` times.
///
/// # Safety
/// Requires `CPUID.01H:ECX.RDRAND`.
#[inline]
pub unsafe fn rdrand<T: RandomWord>(retries: u32) -> Result<T, RandomError> {
	for _ in 0..retries {
		// SAFETY: Offloaded to the caller.
		if let Some(value) = unsafe { T::rdrand_step() } {
			return Ok(value);
		}
	}
	Err(RandomError::RdrandExhausted(retries))
}

/// Returns a random seed from the entropy source, trying up to
/// `retries` times and pausing between attempts.
///
/// # Safety
/// Requires `CPUID.(EAX=07H,ECX=0):EBX.RDSEED`.
#[inline]
pub unsafe fn rdseed<T: RandomWord>(retries: u32) -> Result<T, RandomError> {
	for _ in 0..retries {
		// SAFETY: Offloaded to the caller.
		if let Some(value) = unsafe { T::rdseed_step() } {
			return Ok(value);
		}
		crate::asm::pause();
	}
	Err(RandomError::RdseedExhausted(retries))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn zero_retries_fail() {
		// SAFETY: No instruction is executed.
		let result = unsafe { rdrand::<u64>(0) };
		assert_eq!(result, Err(RandomError::RdrandExhausted(0)));
		assert_eq!(
			std::format!("{}", RandomError::RdseedExhausted(3)),
			"RDSEED returned no data after 3 attempts"
		);
	}

	#[test]
	fn rdrand_widths() {
		if !std::arch::is_x86_feature_detected!("rdrand") {
			return;
		}
		// SAFETY: Support was just checked.
		unsafe {
			assert!(rdrand::<u16>(RDRAND_RETRIES).is_ok());
			assert!(rdrand::<u32>(RDRAND_RETRIES).is_ok());
			assert!(rdrand::<u64>(RDRAND_RETRIES).is_ok());
		}
	}

	#[test]
	fn rdseed_widths() {
		if !std::arch::is_x86_feature_detected!("rdseed") {
			return;
		}
		// SAFETY: Support was just checked.
		unsafe {
			assert!(rdseed::<u16>(10_000).is_ok());
			assert!(rdseed::<u32>(10_000).is_ok());
			assert!(rdseed::<u64>(10_000).is_ok());
		}
	}
}
