//! Memory-mapped (xAPIC) local APIC access.

use ia32_type::Volatile;

use super::{
	ApicVersion, ErrorStatus, Icr, Lvt, LvtEntry, SpuriousVector, TaskPriority, TimerDivide, regs,
};

/// A single 32-bit register, padded to its 16-byte slot.
#[repr(C, align(16))]
struct Register(Volatile<u32>);

/// The number of register slots in the xAPIC register page.
const REGISTER_SLOTS: usize = 64;

/// The xAPIC register block, up to and including the self-IPI register.
#[repr(C)]
struct RegisterBlock([Register; REGISTER_SLOTS]);

static_assertions::const_assert_eq!(core::mem::size_of::<RegisterBlock>(), 1024);

/// A memory-mapped local APIC.
///
/// Every accessor performs exactly one volatile access per register.
pub struct LocalApic<'a> {
	/// The register block.
	regs: &'a RegisterBlock,
}

impl<'a> LocalApic<'a> {
	/// Wraps the register page mapped at `base`.
	///
	/// Returns `None` if `base` is null or not 16-byte aligned.
	///
	/// # Safety
	/// `base` must point to the local APIC register page (or memory
	/// emulating it), mapped uncacheable and valid for `'a`.
	#[must_use]
	pub unsafe fn new(base: *mut u8) -> Option<Self> {
		let block = base.cast::<RegisterBlock>();
		if !block.is_aligned() {
			return None;
		}
		// SAFETY: Validity for `'a` is guaranteed by the caller;
		// SAFETY: `as_ref` handles the null case.
		unsafe { block.as_ref() }.map(|regs| Self { regs })
	}

	/// Returns the register at the byte `offset`.
	#[inline]
	fn register(&self, offset: u32) -> &Volatile<u32> {
		debug_assert!(offset & 0xF == 0, "misaligned APIC register offset");
		&self.regs.0[(offset >> 4) as usize].0
	}

	/// Reads the register at the byte `offset` (see [`regs`]).
	#[must_use]
	pub fn read(&self, offset: u32) -> u32 {
		self.register(offset).get()
	}

	/// Writes the register at the byte `offset` (see [`regs`]).
	pub fn write(&self, offset: u32, value: u32) {
		self.register(offset).set(value);
	}

	/// Returns the 8-bit xAPIC ID.
	#[must_use]
	pub fn id(&self) -> u8 {
		(self.read(regs::ID) >> 24) as u8
	}

	/// Returns the version register.
	#[must_use]
	pub fn version(&self) -> ApicVersion {
		ApicVersion::from_bits(self.read(regs::VERSION))
	}

	/// Returns the task priority.
	#[must_use]
	pub fn task_priority(&self) -> TaskPriority {
		TaskPriority::from_bits(self.read(regs::TPR))
	}

	/// Sets the task priority.
	pub fn set_task_priority(&self, tpr: TaskPriority) {
		self.write(regs::TPR, tpr.bits());
	}

	/// Returns the processor priority.
	#[must_use]
	pub fn processor_priority(&self) -> TaskPriority {
		TaskPriority::from_bits(self.read(regs::PPR))
	}

	/// Signals the end of the interrupt currently being serviced.
	pub fn eoi(&self) {
		self.write(regs::EOI, 0);
	}

	/// Returns the spurious-interrupt vector register.
	#[must_use]
	pub fn spurious_vector(&self) -> SpuriousVector {
		SpuriousVector::from_bits(self.read(regs::SIVR))
	}

	/// Sets the spurious-interrupt vector register.
	pub fn set_spurious_vector(&self, svr: SpuriousVector) {
		self.write(regs::SIVR, svr.bits());
	}

	/// Latches and returns the error status.
	#[must_use]
	pub fn error_status(&self) -> ErrorStatus {
		self.write(regs::ESR, 0);
		ErrorStatus::from_bits(self.read(regs::ESR))
	}

	/// Returns whether `vector` is in service.
	#[must_use]
	pub fn is_in_service(&self, vector: u8) -> bool {
		self.vector_bit(regs::ISR, vector)
	}

	/// Returns whether `vector` has been requested.
	#[must_use]
	pub fn is_requested(&self, vector: u8) -> bool {
		self.vector_bit(regs::IRR, vector)
	}

	/// Returns whether `vector` was accepted as level-triggered.
	#[must_use]
	pub fn is_level_triggered(&self, vector: u8) -> bool {
		self.vector_bit(regs::TMR, vector)
	}

	/// Reads one bit of the ISR, TMR or IRR.
	fn vector_bit(&self, base: u32, vector: u8) -> bool {
		let (offset, bit) = regs::vector_bank(base, vector);
		self.read(offset) & (1 << bit) != 0
	}

	/// Returns a local vector table entry.
	#[must_use]
	pub fn lvt(&self, lvt: Lvt) -> LvtEntry {
		LvtEntry::from_bits(self.read(lvt.offset()))
	}

	/// Sets a local vector table entry.
	pub fn set_lvt(&self, lvt: Lvt, entry: LvtEntry) {
		self.write(lvt.offset(), entry.bits());
	}

	/// Sends an inter-processor interrupt.
	///
	/// The high half is written first; writing the low half sends it.
	pub fn send_ipi(&self, icr: Icr) {
		self.write(regs::ICR_HIGH, icr.high());
		self.write(regs::ICR_LOW, icr.low());
	}

	/// Returns whether the last IPI is still pending acceptance.
	#[must_use]
	pub fn ipi_pending(&self) -> bool {
		Icr::from_bits(u64::from(self.read(regs::ICR_LOW))).delivery_pending()
	}

	/// Spins until the last IPI has been accepted.
	pub fn wait_for_ipi(&self) {
		while self.ipi_pending() {
			core::hint::spin_loop();
		}
	}

	/// Returns the timer divider.
	#[must_use]
	pub fn timer_divide(&self) -> TimerDivide {
		TimerDivide::from_raw(self.read(regs::TIMER_DIVIDE_CONFIGURATION))
	}

	/// Sets the timer divider.
	pub fn set_timer_divide(&self, divide: TimerDivide) {
		self.write(regs::TIMER_DIVIDE_CONFIGURATION, divide as u32);
	}

	/// Sets the timer's initial count, (re)starting it. Zero stops the timer.
	pub fn set_timer_initial_count(&self, count: u32) {
		self.write(regs::TIMER_INITIAL_COUNT, count);
	}

	/// Returns the timer's current count.
	#[must_use]
	pub fn timer_current_count(&self) -> u32 {
		self.read(regs::TIMER_CURRENT_COUNT)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::apic::{DeliveryMode, TimerMode};

	/// A zeroed stand-in for the register page.
	#[repr(C, align(4096))]
	struct Page([u32; 1024]);

	fn with_apic(f: impl FnOnce(&LocalApic<'_>, *const u32)) {
		let mut page = Page([0; 1024]);
		let base = page.0.as_mut_ptr();
		// SAFETY: `page` outlives the accessor and is only accessed through it.
		let apic = unsafe { LocalApic::new(base.cast()) }.unwrap();
		f(&apic, base);
	}

	/// Reads the raw word at a byte offset of the stand-in page.
	fn raw(base: *const u32, offset: u32) -> u32 {
		// SAFETY: Offsets used in the tests are within the page.
		unsafe { base.add(offset as usize / 4).read_volatile() }
	}

	#[test]
	fn rejects_bad_base() {
		// SAFETY: Rejected before any access.
		assert!(unsafe { LocalApic::new(core::ptr::null_mut()) }.is_none());
		let mut page = Page([0; 1024]);
		// SAFETY: Rejected before any access.
		let misaligned = unsafe { page.0.as_mut_ptr().cast::<u8>().add(4) };
		// SAFETY: Rejected before any access.
		assert!(unsafe { LocalApic::new(misaligned) }.is_none());
	}

	#[test]
	fn register_offsets() {
		with_apic(|apic, base| {
			apic.write(regs::ID, 0x0500_0000);
			assert_eq!(apic.id(), 5);
			assert_eq!(raw(base, 0x20), 0x0500_0000);

			apic.set_spurious_vector(SpuriousVector::new().with_vector(0xFF).with_software_enable(true));
			assert_eq!(raw(base, 0xF0), 0x1FF);
			assert!(apic.spurious_vector().software_enable());

			apic.set_task_priority(TaskPriority::new().with_class(2));
			assert_eq!(raw(base, 0x80), 0x20);
		});
	}

	#[test]
	fn ipi_writes_high_then_low() {
		with_apic(|apic, base| {
			apic.send_ipi(Icr::init(0).with_xapic_destination(1));
			assert_eq!(raw(base, 0x310), 0x0100_0000);
			assert_eq!(raw(base, 0x300), 0x0000_C500);
			assert!(!apic.ipi_pending());
			apic.wait_for_ipi();
		});
	}

	#[test]
	fn lvt_and_timer() {
		with_apic(|apic, base| {
			let entry = LvtEntry::new()
				.with_vector(0x30)
				.with_timer_mode(TimerMode::Periodic)
				.with_delivery_mode(DeliveryMode::Fixed);
			apic.set_lvt(Lvt::Timer, entry);
			assert_eq!(raw(base, 0x320), 0x0002_0030);
			assert_eq!(apic.lvt(Lvt::Timer), entry);

			apic.set_timer_divide(TimerDivide::Div16);
			assert_eq!(raw(base, 0x3E0), 0b0011);
			assert_eq!(apic.timer_divide(), TimerDivide::Div16);

			apic.set_timer_initial_count(1000);
			assert_eq!(raw(base, 0x380), 1000);
			assert_eq!(apic.timer_current_count(), 0);
		});
	}

	#[test]
	fn vector_banks() {
		with_apic(|apic, base| {
			apic.write(regs::ISR + 0x10, 1 << 1);
			assert!(apic.is_in_service(0x21));
			assert!(!apic.is_in_service(0x20));
			apic.write(regs::IRR + 0x70, 1 << 31);
			assert!(apic.is_requested(0xFF));
			assert!(!apic.is_level_triggered(0xFF));
			assert_eq!(raw(base, 0x270), 0x8000_0000);
		});
	}
}
