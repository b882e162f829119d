//! VMCS and VMXON region layouts.

use ia32_macro::bitstruct;

use crate::{consts::VMX_REGION_SIZE, msr::VmxBasic};

bitstruct! {
	/// The first 32 bits of a VMCS region.
	pub struct VmcsHeader(u32) {
		/// VMCS revision identifier, from [`VmxBasic::revision_id()`].
		pub revision_id[30:0] => as u32,
		/// The VMCS is a shadow VMCS.
		pub shadow[31] => as bool,
	}
}

/// The reasons the processor records in the abort indicator after a VMX abort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum VmxAbort {
	/// Saving guest MSRs failed.
	SaveGuestMsrs    = 1,
	/// Host-state checking failed.
	HostCheck        = 2,
	/// The current VMCS was corrupted.
	VmcsCorrupted    = 3,
	/// Loading host MSRs failed.
	LoadHostMsrs     = 4,
	/// A machine-check event occurred during the VM exit.
	MachineCheck     = 5,
	/// The host address-space size control was clear while in IA-32e mode.
	HostAddressSpace = 6,
}

impl VmxAbort {
	/// Decodes a raw abort indicator.
	#[must_use]
	pub const fn from_raw(value: u32) -> Option<Self> {
		match value {
			1 => Some(Self::SaveGuestMsrs),
			2 => Some(Self::HostCheck),
			3 => Some(Self::VmcsCorrupted),
			4 => Some(Self::LoadHostMsrs),
			5 => Some(Self::MachineCheck),
			6 => Some(Self::HostAddressSpace),
			_ => None,
		}
	}
}

/// A 4 KiB VMCS region.
///
/// Only the header and the abort indicator have an architectural
/// layout; the rest must only be accessed with `VMREAD`/`VMWRITE`
/// once the region has been made current with `VMPTRLD`.
#[repr(C, align(4096))]
pub struct VmcsRegion {
	/// Revision identifier and shadow flag.
	header:          VmcsHeader,
	/// Non-zero after a VMX abort.
	abort_indicator: u32,
	/// Implementation-specific data.
	data:            [u8; VMX_REGION_SIZE - 8],
}

static_assertions::const_assert_eq!(core::mem::size_of::<VmcsRegion>(), VMX_REGION_SIZE);
static_assertions::const_assert_eq!(core::mem::align_of::<VmcsRegion>(), VMX_REGION_SIZE);

impl VmcsRegion {
	/// Creates a zeroed region stamped with `revision_id`.
	#[must_use]
	pub const fn new(revision_id: u32) -> Self {
		Self {
			header:          VmcsHeader::new().with_revision_id(revision_id),
			abort_indicator: 0,
			data:            [0; VMX_REGION_SIZE - 8],
		}
	}

	/// Creates a zeroed shadow VMCS region stamped with `revision_id`.
	#[must_use]
	pub const fn new_shadow(revision_id: u32) -> Self {
		let mut this = Self::new(revision_id);
		this.header = this.header.with_shadow(true);
		this
	}

	/// Creates a region stamped with the revision reported by `basic`.
	#[must_use]
	pub const fn for_processor(basic: VmxBasic) -> Self {
		Self::new(basic.revision_id())
	}

	/// Returns the region's header.
	#[must_use]
	pub const fn header(&self) -> VmcsHeader {
		self.header
	}

	/// Returns whether the region may be used on a processor reporting `basic`.
	#[must_use]
	pub const fn matches(&self, basic: VmxBasic) -> bool {
		self.header.revision_id() == basic.revision_id()
	}

	/// Returns the raw VMX-abort indicator.
	///
	/// The processor writes it directly to memory, so the read is volatile.
	#[must_use]
	pub fn abort_indicator(&self) -> u32 {
		// SAFETY: The reference guarantees the field is valid for reads.
		unsafe { (&raw const self.abort_indicator).read_volatile() }
	}

	/// Returns the decoded VMX-abort reason, if an abort occurred.
	#[must_use]
	pub fn abort(&self) -> Option<VmxAbort> {
		VmxAbort::from_raw(self.abort_indicator())
	}
}

/// A 4 KiB VMXON region.
///
/// Bit 31 of the revision identifier must be zero.
#[repr(C, align(4096))]
pub struct VmxonRegion {
	/// Revision identifier.
	revision_id: u32,
	/// Implementation-specific data.
	data:        [u8; VMX_REGION_SIZE - 4],
}

static_assertions::const_assert_eq!(core::mem::size_of::<VmxonRegion>(), VMX_REGION_SIZE);

impl VmxonRegion {
	/// Creates a zeroed region stamped with `revision_id`.
	#[must_use]
	pub const fn new(revision_id: u32) -> Self {
		Self {
			revision_id: revision_id & VmcsHeader::REVISION_ID_MASK,
			data:        [0; VMX_REGION_SIZE - 4],
		}
	}

	/// Creates a region stamped with the revision reported by `basic`.
	#[must_use]
	pub const fn for_processor(basic: VmxBasic) -> Self {
		Self::new(basic.revision_id())
	}

	/// Returns the region's revision identifier.
	#[must_use]
	pub const fn revision_id(&self) -> u32 {
		self.revision_id
	}

	/// Returns whether the region may be used on a processor reporting `basic`.
	#[must_use]
	pub const fn matches(&self, basic: VmxBasic) -> bool {
		self.revision_id == basic.revision_id()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn vmcs_header() {
		let basic = VmxBasic::from_bits(0x00DA_1000_0000_0004);
		let vmcs = VmcsRegion::for_processor(basic);
		assert_eq!(vmcs.header().bits(), 4);
		assert!(vmcs.matches(basic));
		assert_eq!(vmcs.abort_indicator(), 0);
		assert_eq!(vmcs.abort(), None);

		let shadow = VmcsRegion::new_shadow(4);
		assert_eq!(shadow.header().bits(), 0x8000_0004);
		assert!(shadow.matches(basic));
		assert!(!VmcsRegion::new(5).matches(basic));
	}

	#[test]
	fn vmxon_revision_bit31_clear() {
		let vmxon = VmxonRegion::new(0x8000_0004);
		assert_eq!(vmxon.revision_id(), 4);
		assert!(vmxon.matches(VmxBasic::new().with_revision_id(4)));
		assert_eq!(core::mem::align_of::<VmxonRegion>(), 4096);
	}

	#[test]
	fn abort_reasons() {
		assert_eq!(VmxAbort::from_raw(3), Some(VmxAbort::VmcsCorrupted));
		assert_eq!(VmxAbort::from_raw(0), None);
		assert_eq!(VmxAbort::from_raw(7), None);
	}
}
