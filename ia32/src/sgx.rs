//! SGX instruction leaf functions.
//!
//! `ENCLS`, `ENCLU` and `ENCLV` select their operation through `EAX`.
//! A VMM can intercept individual `ENCLS`/`ENCLV` leaves through the
//! ENCLS-/ENCLV-exiting bitmaps, indexed by these values.

/// Declares a leaf enumeration with raw conversions.
macro_rules! leaves {
	($(#[$meta:meta])* $name:ident { $($(#[$vmeta:meta])* $variant:ident = $value:literal,)* }) => {
		$(#[$meta])*
		#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
		#[repr(u32)]
		pub enum $name {
			$($(#[$vmeta])* $variant = $value,)*
		}

		impl $name {
			/// Decodes a leaf number.
			#[must_use]
			pub const fn from_raw(leaf: u32) -> Option<Self> {
				match leaf {
					$($value => Some(Self::$variant),)*
					_ => None,
				}
			}

			/// Returns the leaf number.
			#[must_use]
			pub const fn raw(self) -> u32 {
				self as u32
			}

			/// Returns the bit selecting this leaf in an exiting bitmap.
			#[must_use]
			pub const fn exiting_bit(self) -> u64 {
				1 << (self as u32)
			}
		}
	};
}

leaves! {
	/// Supervisor (ring 0) leaf functions of `ENCLS`.
	EnclsLeaf {
		/// Create an enclave.
		ECreate = 0x00,
		/// Add a page.
		EAdd = 0x01,
		/// Initialize an enclave.
		EInit = 0x02,
		/// Remove a page.
		ERemove = 0x03,
		/// Read from a debug enclave.
		EDbgRd = 0x04,
		/// Write to a debug enclave.
		EDbgWr = 0x05,
		/// Extend the measurement with 256 bytes of a page.
		EExtend = 0x06,
		/// Load an evicted page as blocked.
		ELdB = 0x07,
		/// Load an evicted page as unblocked.
		ELdU = 0x08,
		/// Block a page in preparation for eviction.
		EBlock = 0x09,
		/// Add a version array page.
		EPa = 0x0A,
		/// Evict a page.
		EWb = 0x0B,
		/// Activate blocking tracking.
		ETrack = 0x0C,
		/// Add a page to an initialized enclave.
		EAug = 0x0D,
		/// Restrict page permissions.
		EModPr = 0x0E,
		/// Change a page's type.
		EModT = 0x0F,
		/// Read EPCM information.
		ERdInfo = 0x10,
		/// Tracking for oversubscription.
		ETrackC = 0x11,
		/// Concurrent `ELDB`.
		ELdBC = 0x12,
		/// Concurrent `ELDU`.
		ELdUC = 0x13,
		/// Update the SVN after a microcode update.
		EUpdateSvn = 0x18,
	}
}

leaves! {
	/// User (ring 3) leaf functions of `ENCLU`.
	EncluLeaf {
		/// Create a cryptographic report.
		EReport = 0x00,
		/// Derive a key.
		EGetKey = 0x01,
		/// Enter an enclave.
		EEnter = 0x02,
		/// Resume an interrupted enclave.
		EResume = 0x03,
		/// Exit an enclave.
		EExit = 0x04,
		/// Accept a change to a page.
		EAccept = 0x05,
		/// Extend page permissions.
		EModPe = 0x06,
		/// Accept and copy into a pending page.
		EAcceptCopy = 0x07,
		/// Verify a TDX report.
		EVerifyReport2 = 0x08,
		/// Decrement `TCS.CSSA`.
		EDecCssa = 0x09,
	}
}

leaves! {
	/// VMM leaf functions of `ENCLV` (oversubscription).
	EnclvLeaf {
		/// Decrement a virtual child count.
		EDecVirtChild = 0x00,
		/// Increment a virtual child count.
		EIncVirtChild = 0x01,
		/// Set the enclave context.
		ESetContext = 0x02,
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn leaves_decode() {
		assert_eq!(EnclsLeaf::from_raw(0x0D), Some(EnclsLeaf::EAug));
		assert_eq!(EnclsLeaf::from_raw(0x14), None);
		assert_eq!(EnclsLeaf::EUpdateSvn.raw(), 0x18);
		assert_eq!(EncluLeaf::from_raw(2), Some(EncluLeaf::EEnter));
		assert_eq!(EnclvLeaf::from_raw(3), None);
	}

	#[test]
	fn exiting_bitmap() {
		assert_eq!(EnclsLeaf::ECreate.exiting_bit(), 1);
		assert_eq!(EnclsLeaf::EUpdateSvn.exiting_bit(), 1 << 24);
	}
}
