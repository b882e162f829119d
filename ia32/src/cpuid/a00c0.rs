//! Implements the CPUID 00:0 lookup structure, _Basic Information_.

use ia32_macro::bitstruct;

use super::cpuid_leaf;

bitstruct! {
	/// Gets the `eax` register values for the CPUID `eax=00` leaf.
	pub struct Eax(u32) {
		/// Maximum input value for basic CPUID information.
		pub max_cpuid_input_value[31:0] => as u32,
	}
}

bitstruct! {
	/// Gets the `ebx` register values for the CPUID `eax=00` leaf.
	pub struct Ebx(u32) {
		/// Vendor identification string, bytes 0-3 (`"Genu"` on Intel).
		pub vendor_0[31:0] => as u32,
	}
}

bitstruct! {
	/// Gets the `ecx` register values for the CPUID `eax=00` leaf.
	pub struct Ecx(u32) {
		/// Vendor identification string, bytes 8-11 (`"ntel"` on Intel).
		pub vendor_2[31:0] => as u32,
	}
}

bitstruct! {
	/// Gets the `edx` register values for the CPUID `eax=00` leaf.
	pub struct Edx(u32) {
		/// Vendor identification string, bytes 4-7 (`"ineI"` on Intel).
		pub vendor_1[31:0] => as u32,
	}
}

cpuid_leaf! {
	/// Basic Information: the maximum basic leaf and the vendor string.
	CpuidA00C0 = (0x00, 0x00)
}

/// The processor vendor, as identified by leaf 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Vendor {
	/// `GenuineIntel`
	Intel,
	/// `AuthenticAMD`
	Amd,
	/// `HygonGenuine`
	Hygon,
	/// Any other vendor string.
	Other,
}

impl CpuidA00C0 {
	/// Returns the 12-byte vendor identification string.
	#[must_use]
	pub const fn vendor_bytes(&self) -> [u8; 12] {
		let b = self.ebx.vendor_0().to_le_bytes();
		let d = self.edx.vendor_1().to_le_bytes();
		let c = self.ecx.vendor_2().to_le_bytes();
		[
			b[0], b[1], b[2], b[3], d[0], d[1], d[2], d[3], c[0], c[1], c[2], c[3],
		]
	}

	/// Returns the processor vendor.
	#[must_use]
	pub fn vendor(&self) -> Vendor {
		match &self.vendor_bytes() {
			b"GenuineIntel" => Vendor::Intel,
			b"AuthenticAMD" => Vendor::Amd,
			b"HygonGenuine" => Vendor::Hygon,
			_ => Vendor::Other,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::cpuid::{CpuidLeaf, CpuidResult};

	#[test]
	fn decodes_intel_vendor() {
		let leaf = CpuidA00C0::from_result(CpuidResult {
			eax: 0x1B,
			ebx: u32::from_le_bytes(*b"Genu"),
			ecx: u32::from_le_bytes(*b"ntel"),
			edx: u32::from_le_bytes(*b"ineI"),
		});
		assert_eq!(leaf.eax.max_cpuid_input_value(), 0x1B);
		assert_eq!(&leaf.vendor_bytes(), b"GenuineIntel");
		assert_eq!(leaf.vendor(), Vendor::Intel);
	}

	#[test]
	#[cfg(target_arch = "x86_64")]
	fn host_vendor_is_printable() {
		let leaf = CpuidA00C0::get().unwrap();
		assert!(leaf.vendor_bytes().iter().all(u8::is_ascii_graphic));
	}
}
