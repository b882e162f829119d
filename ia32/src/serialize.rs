//! Instruction-stream serialization.
//!
//! [`serialize`] guarantees that every instruction before it has
//! completed (including its memory and flag effects) before any
//! instruction after it begins. The instruction used is chosen at
//! build time:
//!
//! | Feature            | Instruction  | Notes                      |
//! |--------------------|--------------|----------------------------|
//! | `serialize-clts`   | `CLTS`       | Ring 0 only; clears `CR0.TS` |
//! | `serialize-lfence` | `LFENCE`     | Dispatch-serializing only  |
//! | (neither)          | `MOV SS, SS` | Valid in every ring        |
//!
//! Other policies are available at runtime through [`Serializer`].

/// A way to serialize the instruction stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Serializer {
	/// `CLTS`; cheapest in ring 0. Clears `CR0.TS`.
	Clts,
	/// Reload SS with its current value; valid in every ring.
	MovSs,
	/// `LFENCE`; waits for prior instructions to complete locally, but
	/// does not drain the store buffer.
	Lfence,
	/// `CPUID` leaf 0; always available, but may exit to a hypervisor.
	Cpuid,
	/// The dedicated `SERIALIZE` instruction
	/// (`CPUID.(EAX=07H,ECX=0):EDX.SERIALIZE`).
	Serialize,
}

impl Serializer {
	/// The serializer selected by the crate features.
	#[cfg(feature = "serialize-clts")]
	pub const DEFAULT: Self = Self::Clts;
	/// The serializer selected by the crate features.
	#[cfg(feature = "serialize-lfence")]
	pub const DEFAULT: Self = Self::Lfence;
	/// The serializer selected by the crate features.
	#[cfg(not(any(feature = "serialize-clts", feature = "serialize-lfence")))]
	pub const DEFAULT: Self = Self::MovSs;

	/// Returns whether the serializer may only be used in ring 0.
	#[must_use]
	pub const fn requires_ring0(self) -> bool {
		matches!(self, Self::Clts)
	}

	/// Serializes the instruction stream.
	///
	/// # Safety
	/// [`Serializer::Clts`] must be executed in ring 0.
	/// [`Serializer::Serialize`] requires processor support.
	#[cfg(target_arch = "x86_64")]
	#[inline]
	pub unsafe fn execute(self) {
		match self {
			// SAFETY: Offloaded to the caller.
			Self::Clts => unsafe { crate::reg::clts() },
			Self::MovSs => {
				// SAFETY: SS is reloaded with the selector it already holds.
				unsafe {
					core::arch::asm!(
						"mov {sel:x}, ss",
						"mov ss, {sel:x}",
						sel = out(reg) _,
						options(nostack, preserves_flags),
					);
				}
			}
			Self::Lfence => crate::asm::lfence(),
			Self::Cpuid => {
				let _ = crate::cpuid::cpuid(0, 0);
			}
			// SAFETY: Offloaded to the caller.
			Self::Serialize => unsafe {
				core::arch::asm!(".byte 0x0F, 0x01, 0xE8", options(nostack, preserves_flags));
			},
		}
	}
}

impl Default for Serializer {
	fn default() -> Self {
		Self::DEFAULT
	}
}

/// Serializes the instruction stream with [`Serializer::DEFAULT`].
///
/// Enabling `serialize-clts` asserts that every caller runs in ring 0.
#[cfg(target_arch = "x86_64")]
#[inline]
pub fn serialize() {
	// SAFETY: The default is never `Serialize`; `Clts` is only selected
	// SAFETY: when the build opts into ring-0-only serialization.
	unsafe { Serializer::DEFAULT.execute() }
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn default_policy() {
		assert_eq!(Serializer::default(), Serializer::DEFAULT);
		#[cfg(not(any(feature = "serialize-clts", feature = "serialize-lfence")))]
		assert_eq!(Serializer::DEFAULT, Serializer::MovSs);
		assert!(Serializer::Clts.requires_ring0());
		assert!(!Serializer::MovSs.requires_ring0());
	}

	#[test]
	#[cfg(all(target_arch = "x86_64", not(feature = "serialize-clts")))]
	fn serializes_in_user_mode() {
		serialize();
		// SAFETY: Neither requires ring 0.
		unsafe {
			Serializer::MovSs.execute();
			Serializer::Lfence.execute();
			Serializer::Cpuid.execute();
		}
	}
}
