//! The interrupt command register.

use ia32_macro::bitstruct;

bitstruct! {
	/// The interrupt command register.
	///
	/// In xAPIC mode it is written as two 32-bit halves, high first
	/// (writing the low half sends the IPI); in x2APIC mode it is the
	/// single 64-bit `IA32_X2APIC_ICR` MSR.
	pub struct Icr(u64) {
		/// The vector to deliver (the start page for a SIPI).
		pub vector[7:0] => as u8,
		/// How the IPI is delivered.
		pub delivery_mode[10:8] => enum DeliveryMode(u8) {
			/// Deliver `vector` to the destination.
			Fixed = 0,
			/// Deliver `vector` to the lowest-priority destination.
			LowestPriority = 1,
			/// System management interrupt.
			Smi = 2,
			/// Non-maskable interrupt.
			Nmi = 4,
			/// INIT.
			Init = 5,
			/// Start-up IPI.
			StartUp = 6,
			/// External interrupt (LVT entries only).
			ExtInt = 7,
		},
		/// The destination is a logical, rather than physical, APIC ID.
		pub logical_destination[11] => as bool,
		/// The previous IPI has not been accepted yet (xAPIC only).
		pub delivery_pending[12] => as bool,
		/// Assert rather than de-assert (INIT level de-assert only).
		pub assert[14] => as bool,
		/// Level-triggered (INIT level de-assert only).
		pub level_triggered[15] => as bool,
		/// A destination shorthand that overrides the destination field.
		pub shorthand[19:18] => enum DestinationShorthand(u8) {
			/// Use the destination field.
			None = 0,
			/// The issuing processor.
			ToSelf = 1,
			/// Every processor, including the issuer.
			AllIncludingSelf = 2,
			/// Every processor except the issuer.
			AllExcludingSelf = 3,
		},
		/// The destination. xAPIC mode uses only bits `[63:56]`.
		pub destination[63:32] => as u32,
	}
}

impl Icr {
	/// Returns the 8-bit xAPIC destination.
	#[must_use]
	pub const fn xapic_destination(self) -> u8 {
		(self.destination() >> 24) as u8
	}

	/// Returns a copy targeting the 8-bit xAPIC destination `id`.
	#[must_use]
	pub const fn with_xapic_destination(self, id: u8) -> Self {
		self.with_destination((id as u32) << 24)
	}

	/// Returns the low half, as written to [`super::regs::ICR_LOW`].
	#[must_use]
	pub const fn low(self) -> u32 {
		self.bits() as u32
	}

	/// Returns the high half, as written to [`super::regs::ICR_HIGH`].
	#[must_use]
	pub const fn high(self) -> u32 {
		(self.bits() >> 32) as u32
	}

	/// A fixed IPI of `vector` to the physical destination `destination`.
	#[must_use]
	pub const fn fixed(vector: u8, destination: u32) -> Self {
		Self::new()
			.with_vector(vector)
			.with_delivery_mode(DeliveryMode::Fixed)
			.with_destination(destination)
	}

	/// An INIT IPI (level assert) to the physical destination `destination`.
	#[must_use]
	pub const fn init(destination: u32) -> Self {
		Self::new()
			.with_delivery_mode(DeliveryMode::Init)
			.with_assert(true)
			.with_level_triggered(true)
			.with_destination(destination)
	}

	/// An INIT level de-assert to the physical destination `destination`.
	#[must_use]
	pub const fn init_deassert(destination: u32) -> Self {
		Self::new()
			.with_delivery_mode(DeliveryMode::Init)
			.with_level_triggered(true)
			.with_destination(destination)
	}

	/// A start-up IPI, beginning execution at physical address
	/// `page << 12`, to the physical destination `destination`.
	#[must_use]
	pub const fn startup(page: u8, destination: u32) -> Self {
		Self::new()
			.with_vector(page)
			.with_delivery_mode(DeliveryMode::StartUp)
			.with_destination(destination)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn init_sipi_sequence() {
		let init = Icr::init(0).with_xapic_destination(3);
		assert_eq!(init.low(), 0x0000_C500);
		assert_eq!(init.high(), 0x0300_0000);
		assert_eq!(init.xapic_destination(), 3);

		assert_eq!(Icr::init_deassert(0).low(), 0x0000_8500);

		let sipi = Icr::startup(0x08, 0).with_xapic_destination(3);
		assert_eq!(sipi.low(), 0x0000_0608);
		assert_eq!(sipi.delivery_mode(), Some(DeliveryMode::StartUp));
	}

	#[test]
	fn shorthand_and_x2apic_destination() {
		let ipi = Icr::fixed(0x40, 0x1_0002).with_shorthand(DestinationShorthand::AllExcludingSelf);
		assert_eq!(ipi.bits(), 0x0001_0002_000C_0040);
		assert_eq!(ipi.shorthand(), DestinationShorthand::AllExcludingSelf);
		assert_eq!(Icr::from_bits(0x300).delivery_mode(), None);
		assert_eq!(Icr::from_bits(0x300).delivery_mode_raw(), 3);
	}
}
