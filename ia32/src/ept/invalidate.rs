//! `INVEPT` and `INVVPID` operands.

use super::Eptp;
use crate::msr::EptVpidCap;

/// The scope of an `INVEPT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u64)]
pub enum InveptType {
	/// Mappings derived from the descriptor's EPT pointer.
	SingleContext = 1,
	/// Mappings derived from every EPT pointer.
	AllContexts   = 2,
}

impl InveptType {
	/// Returns whether a processor reporting `cap` supports this type.
	#[must_use]
	pub const fn is_supported(self, cap: EptVpidCap) -> bool {
		cap.invept()
			&& match self {
				Self::SingleContext => cap.invept_single_context(),
				Self::AllContexts => cap.invept_all_context(),
			}
	}
}

/// The scope of an `INVVPID`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u64)]
pub enum InvvpidType {
	/// Mappings of the descriptor's linear address tagged with its VPID.
	IndividualAddress             = 0,
	/// Mappings tagged with the descriptor's VPID.
	SingleContext                 = 1,
	/// Mappings tagged with any VPID other than 0.
	AllContexts                   = 2,
	/// Non-global mappings tagged with the descriptor's VPID.
	SingleContextRetainingGlobals = 3,
}

impl InvvpidType {
	/// Returns whether a processor reporting `cap` supports this type.
	#[must_use]
	pub const fn is_supported(self, cap: EptVpidCap) -> bool {
		cap.invvpid()
			&& match self {
				Self::IndividualAddress => cap.invvpid_individual_address(),
				Self::SingleContext => cap.invvpid_single_context(),
				Self::AllContexts => cap.invvpid_all_context(),
				Self::SingleContextRetainingGlobals => {
					cap.invvpid_single_context_retaining_globals()
				}
			}
	}
}

/// The 128-bit `INVEPT` descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(C, align(16))]
pub struct InveptDescriptor {
	/// The EPT pointer whose mappings are invalidated.
	eptp:     u64,
	/// Must be zero.
	reserved: u64,
}

static_assertions::const_assert_eq!(core::mem::size_of::<InveptDescriptor>(), 16);

impl InveptDescriptor {
	/// Creates a descriptor for `eptp`.
	#[must_use]
	pub const fn new(eptp: Eptp) -> Self {
		Self {
			eptp:     eptp.bits(),
			reserved: 0,
		}
	}

	/// Creates a descriptor for [`InveptType::AllContexts`], which
	/// ignores the EPT pointer.
	#[must_use]
	pub const fn all_contexts() -> Self {
		Self::new(Eptp::new())
	}

	/// Returns the EPT pointer.
	#[must_use]
	pub const fn eptp(&self) -> Eptp {
		Eptp::from_bits(self.eptp)
	}
}

/// The 128-bit `INVVPID` descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(C, align(16))]
pub struct InvvpidDescriptor {
	/// The VPID whose mappings are invalidated.
	vpid:           u16,
	/// Must be zero.
	reserved:       [u16; 3],
	/// The linear address, for [`InvvpidType::IndividualAddress`].
	linear_address: u64,
}

static_assertions::const_assert_eq!(core::mem::size_of::<InvvpidDescriptor>(), 16);

impl InvvpidDescriptor {
	/// Creates a descriptor for `vpid` and `linear_address`.
	///
	/// The address is only consulted by [`InvvpidType::IndividualAddress`]
	/// and must then be canonical.
	#[must_use]
	pub const fn new(vpid: u16, linear_address: u64) -> Self {
		Self {
			vpid,
			reserved: [0; 3],
			linear_address,
		}
	}

	/// Creates a descriptor covering every address of `vpid`.
	#[must_use]
	pub const fn context(vpid: u16) -> Self {
		Self::new(vpid, 0)
	}

	/// Returns the VPID.
	#[must_use]
	pub const fn vpid(&self) -> u16 {
		self.vpid
	}

	/// Returns the linear address.
	#[must_use]
	pub const fn linear_address(&self) -> u64 {
		self.linear_address
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::memtype::MemoryType;

	/// Reads a descriptor back as two quadwords.
	fn qwords<T>(descriptor: &T) -> [u64; 2] {
		assert_eq!(core::mem::size_of::<T>(), 16);
		// SAFETY: Both descriptors are 16 bytes of plain integers.
		unsafe { core::ptr::from_ref(descriptor).cast::<[u64; 2]>().read() }
	}

	#[test]
	fn invept_layout() {
		let eptp = Eptp::for_root(0x5000, 4, MemoryType::WriteBack);
		let desc = InveptDescriptor::new(eptp);
		assert_eq!(qwords(&desc), [eptp.bits(), 0]);
		assert_eq!(desc.eptp(), eptp);
		assert_eq!(qwords(&InveptDescriptor::all_contexts()), [0, 0]);
	}

	#[test]
	fn invvpid_layout() {
		let desc = InvvpidDescriptor::new(0x1234, 0xFFFF_8000_0000_1000);
		assert_eq!(qwords(&desc), [0x1234, 0xFFFF_8000_0000_1000]);
		assert_eq!(desc.vpid(), 0x1234);
		assert_eq!(qwords(&InvvpidDescriptor::context(7)), [7, 0]);
	}

	#[test]
	fn type_support() {
		let cap = EptVpidCap::new()
			.with_invept(true)
			.with_invept_all_context(true)
			.with_invvpid(true)
			.with_invvpid_single_context(true);
		assert!(InveptType::AllContexts.is_supported(cap));
		assert!(!InveptType::SingleContext.is_supported(cap));
		assert!(InvvpidType::SingleContext.is_supported(cap));
		assert!(!InvvpidType::IndividualAddress.is_supported(cap));
		assert!(!InveptType::AllContexts.is_supported(cap.with_invept(false)));
		assert_eq!(InvvpidType::SingleContextRetainingGlobals as u64, 3);
	}
}
