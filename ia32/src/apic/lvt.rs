//! Local vector table entries and the other local APIC records.

use ia32_macro::bitstruct;

use super::{DeliveryMode, regs};

bitstruct! {
	/// A local vector table entry.
	///
	/// All seven LVT registers share this layout; fields a register
	/// does not implement are reserved in it (`timer_mode` only exists
	/// in the timer entry, `pin_polarity`, `remote_irr` and
	/// `level_triggered` only in LINT0/LINT1).
	pub struct LvtEntry(u32) {
		/// The interrupt vector.
		pub vector[7:0] => as u8,
		/// The delivery mode; see [`DeliveryMode`].
		pub delivery_mode_raw[10:8] => as u8,
		/// An interrupt is pending delivery.
		pub delivery_pending[12] => as bool,
		/// The input pin is active low.
		pub pin_polarity[13] => as bool,
		/// A level-triggered interrupt has been accepted and awaits EOI.
		pub remote_irr[14] => as bool,
		/// The input pin is level-triggered.
		pub level_triggered[15] => as bool,
		/// The interrupt is masked.
		pub masked[16] => as bool,
		/// The timer mode.
		pub timer_mode[18:17] => enum TimerMode(u8) {
			/// Count down once from the initial count.
			OneShot = 0,
			/// Reload from the initial count.
			Periodic = 1,
			/// Fire when the TSC reaches `IA32_TSC_DEADLINE`.
			TscDeadline = 2,
		},
	}
}

impl LvtEntry {
	/// Returns the delivery mode, if it is a recognized one.
	#[must_use]
	pub const fn delivery_mode(self) -> Option<DeliveryMode> {
		DeliveryMode::from_raw(self.delivery_mode_raw())
	}

	/// Returns a copy with the given delivery mode.
	#[must_use]
	pub const fn with_delivery_mode(self, mode: DeliveryMode) -> Self {
		self.with_delivery_mode_raw(mode as u8)
	}
}

/// The seven local vector table registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lvt {
	/// Corrected machine-check interrupts.
	Cmci,
	/// The APIC timer.
	Timer,
	/// The thermal sensor.
	Thermal,
	/// Performance-monitoring counter overflow.
	PerformanceCounter,
	/// The LINT0 pin.
	Lint0,
	/// The LINT1 pin.
	Lint1,
	/// Internal APIC errors.
	Error,
}

impl Lvt {
	/// Returns the register's xAPIC offset.
	#[must_use]
	pub const fn offset(self) -> u32 {
		match self {
			Self::Cmci => regs::LVT_CMCI,
			Self::Timer => regs::LVT_TIMER,
			Self::Thermal => regs::LVT_THERMAL,
			Self::PerformanceCounter => regs::LVT_PMC,
			Self::Lint0 => regs::LVT_LINT0,
			Self::Lint1 => regs::LVT_LINT1,
			Self::Error => regs::LVT_ERROR,
		}
	}
}

bitstruct! {
	/// The local APIC version register.
	pub struct ApicVersion(u32) {
		/// The version (`0x1X` for an integrated APIC).
		pub version[7:0] => as u8,
		/// The number of LVT entries, minus one.
		pub max_lvt_entry[23:16] => as u8,
		/// EOI-broadcast suppression is supported.
		pub eoi_broadcast_suppression[24] => as bool,
	}
}

impl ApicVersion {
	/// Returns the number of LVT entries.
	#[must_use]
	pub const fn lvt_entries(self) -> u32 {
		self.max_lvt_entry() as u32 + 1
	}
}

bitstruct! {
	/// The spurious-interrupt vector register.
	pub struct SpuriousVector(u32) {
		/// The vector delivered for spurious interrupts.
		pub vector[7:0] => as u8,
		/// The APIC is software-enabled.
		pub software_enable[8] => as bool,
		/// Focus-processor checking is disabled.
		pub focus_disable[9] => as bool,
		/// EOIs of level-triggered interrupts are not broadcast to I/O APICs.
		pub eoi_broadcast_suppression[12] => as bool,
	}
}

bitstruct! {
	/// The task, processor or arbitration priority register.
	///
	/// Interrupts are grouped into priority classes of 16 vectors
	/// (vector bits 7:4).
	pub struct TaskPriority(u32) {
		/// The priority sub-class.
		pub sub_class[3:0] => as u8,
		/// The priority class, matching `CR8[3:0]`.
		pub class[7:4] => as u8,
	}
}

bitstruct! {
	/// The error status register.
	///
	/// Write it (with any value) before reading to latch the current errors.
	pub struct ErrorStatus(u32) {
		/// A sent message failed its checksum (P6/Pentium only).
		pub send_checksum[0] => as bool,
		/// A received message failed its checksum (P6/Pentium only).
		pub receive_checksum[1] => as bool,
		/// A sent message was not accepted (P6/Pentium only).
		pub send_accept[2] => as bool,
		/// A received message was not accepted (P6/Pentium only).
		pub receive_accept[3] => as bool,
		/// A lowest-priority IPI was sent while unsupported.
		pub redirectable_ipi[4] => as bool,
		/// An illegal vector was sent.
		pub send_illegal_vector[5] => as bool,
		/// An illegal vector was received.
		pub receive_illegal_vector[6] => as bool,
		/// A reserved register was accessed (x2APIC: non-existent MSR).
		pub illegal_register_address[7] => as bool,
	}
}

/// The APIC timer clock divider (divide configuration register).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum TimerDivide {
	/// Divide by 2.
	Div2   = 0b0000,
	/// Divide by 4.
	Div4   = 0b0001,
	/// Divide by 8.
	Div8   = 0b0010,
	/// Divide by 16.
	Div16  = 0b0011,
	/// Divide by 32.
	Div32  = 0b1000,
	/// Divide by 64.
	Div64  = 0b1001,
	/// Divide by 128.
	Div128 = 0b1010,
	/// Divide by 1.
	Div1   = 0b1011,
}

impl TimerDivide {
	/// Decodes the divide configuration register; bit 2 and bits
	/// above 3 are ignored.
	#[must_use]
	pub const fn from_raw(value: u32) -> Self {
		match value & 0b1011 {
			0b0000 => Self::Div2,
			0b0001 => Self::Div4,
			0b0010 => Self::Div8,
			0b0011 => Self::Div16,
			0b1000 => Self::Div32,
			0b1001 => Self::Div64,
			0b1010 => Self::Div128,
			_ => Self::Div1,
		}
	}

	/// Returns the divisor.
	#[must_use]
	pub const fn divisor(self) -> u32 {
		match self {
			Self::Div1 => 1,
			Self::Div2 => 2,
			Self::Div4 => 4,
			Self::Div8 => 8,
			Self::Div16 => 16,
			Self::Div32 => 32,
			Self::Div64 => 64,
			Self::Div128 => 128,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn timer_entry() {
		let timer = LvtEntry::new()
			.with_vector(0x20)
			.with_timer_mode(TimerMode::Periodic);
		assert_eq!(timer.bits(), 0x0002_0020);
		assert_eq!(timer.timer_mode(), Some(TimerMode::Periodic));
		assert_eq!(LvtEntry::from_bits(0x0006_0000).timer_mode(), None);
		assert!(LvtEntry::from_bits(0x0001_0000).masked());
	}

	#[test]
	fn lint_entry() {
		let lint0 = LvtEntry::new()
			.with_delivery_mode(DeliveryMode::ExtInt)
			.with_level_triggered(true);
		assert_eq!(lint0.bits(), 0x0000_8700);
		assert_eq!(lint0.delivery_mode(), Some(DeliveryMode::ExtInt));
		assert_eq!(LvtEntry::from_bits(0x300).delivery_mode(), None);
	}

	#[test]
	fn lvt_offsets() {
		assert_eq!(Lvt::Timer.offset(), 0x320);
		assert_eq!(Lvt::Cmci.offset(), 0x2F0);
		assert_eq!(Lvt::Error.offset(), 0x370);
	}

	#[test]
	fn version_and_svr() {
		let version = ApicVersion::from_bits(0x0105_0014);
		assert_eq!(version.version(), 0x14);
		assert_eq!(version.lvt_entries(), 6);
		assert!(version.eoi_broadcast_suppression());

		let svr = SpuriousVector::new().with_vector(0xFF).with_software_enable(true);
		assert_eq!(svr.bits(), 0x1FF);
	}

	#[test]
	fn divider() {
		assert_eq!(TimerDivide::from_raw(0b1011), TimerDivide::Div1);
		assert_eq!(TimerDivide::from_raw(0b1111), TimerDivide::Div1);
		assert_eq!(TimerDivide::from_raw(0b0110), TimerDivide::Div8);
		assert_eq!(TimerDivide::Div16.divisor(), 16);
		for raw in [0b0000, 0b0001, 0b0010, 0b0011, 0b1000, 0b1001, 0b1010, 0b1011] {
			assert_eq!(TimerDivide::from_raw(raw) as u32, raw);
		}
	}

	#[test]
	fn priority_class() {
		let tpr = TaskPriority::new().with_class(0xE);
		assert_eq!(tpr.bits(), 0xE0);
		assert_eq!(TaskPriority::from_bits(0x5A).class(), 5);
	}
}
