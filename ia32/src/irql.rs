//! Interrupt request levels on top of the CR8 task-priority register.
//!
//! An [`Irql`] is a CR8 priority class (0-15); external interrupts
//! whose vector class is at or below the current level are held
//! pending. The named levels follow the common Windows convention for
//! 64-bit kernels and carry no architectural meaning beyond their value.
//!
//! All operations go through a [`TaskPriority`] implementation, which on
//! `x86_64` is [`Cr8Priority`]. [`Irql::NO_INTERRUPTS`] is not a CR8
//! value; it is entered and left through `RFLAGS.IF` alone, via an
//! [`InterruptMask`].

use crate::reg::Rflags;

/// An interrupt request level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[repr(transparent)]
pub struct Irql(u8);

impl Irql {
	/// Normal thread execution; all interrupts are deliverable.
	pub const PASSIVE: Self = Self(0);
	/// Asynchronous procedure calls are masked.
	pub const APC: Self = Self(1);
	/// The scheduler (and everything below it) is masked.
	pub const DISPATCH: Self = Self(2);
	/// Corrected machine-check interrupts.
	pub const CMCI: Self = Self(5);
	/// The clock interrupt.
	pub const CLOCK: Self = Self(13);
	/// Inter-processor interrupts.
	pub const IPI: Self = Self(14);
	/// Power-failure notifications.
	pub const POWER: Self = Self(14);
	/// The profiling interrupt.
	pub const PROFILE: Self = Self(15);
	/// All external interrupts are masked by priority.
	pub const HIGH: Self = Self(15);
	/// Pseudo-level reported when `RFLAGS.IF` is clear; not storable in CR8.
	pub const NO_INTERRUPTS: Self = Self(16);

	/// Creates a level from a raw value, if it is at most [`Irql::NO_INTERRUPTS`].
	#[must_use]
	pub const fn new(level: u8) -> Option<Self> {
		if level <= Self::NO_INTERRUPTS.0 {
			Some(Self(level))
		} else {
			None
		}
	}

	/// Returns the raw level.
	#[must_use]
	pub const fn level(self) -> u8 {
		self.0
	}

	/// Returns the value to store in `CR8.TPR`.
	///
	/// [`Irql::NO_INTERRUPTS`] saturates to [`Irql::HIGH`].
	#[must_use]
	pub const fn tpr(self) -> u8 {
		if self.0 > Self::HIGH.0 {
			Self::HIGH.0
		} else {
			self.0
		}
	}
}

/// Combines the current level with the interrupt flag.
///
/// Returns [`Irql::NO_INTERRUPTS`] when `flags.IF` is clear and
/// `current` otherwise.
#[must_use]
pub const fn effective_irql(flags: Rflags, current: Irql) -> Irql {
	if flags.interrupt_enable() {
		current
	} else {
		Irql::NO_INTERRUPTS
	}
}

/// The maskable-interrupt enable flag (`RFLAGS.IF`).
pub trait InterruptMask {
	/// Returns whether maskable interrupts are enabled.
	fn interrupts_enabled(&self) -> bool;

	/// Disables maskable interrupts.
	///
	/// # Safety
	/// Must be executed in ring 0 (or at `CPL <= IOPL`).
	unsafe fn disable_interrupts(&self);

	/// Enables maskable interrupts.
	///
	/// # Safety
	/// Must be executed in ring 0 (or at `CPL <= IOPL`). Interrupt
	/// handlers must be ready.
	unsafe fn enable_interrupts(&self);
}

/// A task-priority register.
///
/// Levels stored through this trait are at most [`Irql::HIGH`];
/// [`IrqlGuard::raise`] handles [`Irql::NO_INTERRUPTS`] through the
/// [`InterruptMask`] supertrait instead.
pub trait TaskPriority: InterruptMask {
	/// Returns the current level.
	fn irql(&self) -> Irql;

	/// Sets the current level.
	///
	/// # Safety
	/// Must be executed in ring 0. Lowering the level may immediately
	/// deliver pending interrupts. `irql` must not exceed [`Irql::HIGH`].
	unsafe fn set_irql(&self, irql: Irql);

	/// Raises the level to `irql`, returning the previous level.
	///
	/// `irql` must not be below the current level; this is checked in
	/// debug builds only.
	///
	/// # Safety
	/// See [`TaskPriority::set_irql`].
	unsafe fn raise_irql(&self, irql: Irql) -> Irql {
		let previous = self.irql();
		debug_assert!(
			irql >= previous,
			"raise_irql: {irql:?} is below the current level {previous:?}"
		);
		// SAFETY: Offloaded to the caller.
		unsafe { self.set_irql(irql) };
		previous
	}

	/// Lowers the level to `irql` unconditionally.
	///
	/// # Safety
	/// See [`TaskPriority::set_irql`].
	unsafe fn lower_irql(&self, irql: Irql) {
		// SAFETY: Offloaded to the caller.
		unsafe { self.set_irql(irql) };
	}
}

/// What an [`IrqlGuard`] puts back on drop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Restore {
	/// The task priority.
	Level(Irql),
	/// The interrupt flag, which was set if `true`.
	InterruptFlag(bool),
}

/// Raises the level for its lifetime, restoring the previous state on drop.
///
/// Raising to [`Irql::NO_INTERRUPTS`] only clears `RFLAGS.IF` and leaves
/// the task priority untouched; on drop `IF` is set again only if it
/// was set before.
#[must_use = "the level is restored as soon as the guard is dropped"]
pub struct IrqlGuard<'a, P: TaskPriority + ?Sized> {
	/// The register the level was raised on.
	priority: &'a P,
	/// The effective level before the guard was created.
	previous: Irql,
	/// The state to restore.
	restore:  Restore,
}

impl<'a, P: TaskPriority + ?Sized> IrqlGuard<'a, P> {
	/// Raises `priority` to `irql`.
	///
	/// # Safety
	/// See [`TaskPriority::raise_irql`]. Guards must be dropped in
	/// reverse order of creation.
	pub unsafe fn raise(priority: &'a P, irql: Irql) -> Self {
		if irql == Irql::NO_INTERRUPTS {
			let enabled = priority.interrupts_enabled();
			// SAFETY: Offloaded to the caller.
			unsafe { priority.disable_interrupts() };
			let previous = if enabled {
				priority.irql()
			} else {
				Irql::NO_INTERRUPTS
			};
			return Self {
				priority,
				previous,
				restore: Restore::InterruptFlag(enabled),
			};
		}

		// SAFETY: Offloaded to the caller.
		let previous = unsafe { priority.raise_irql(irql) };
		Self {
			priority,
			previous,
			restore: Restore::Level(previous),
		}
	}

	/// Returns the effective level before the guard was created.
	#[must_use]
	pub fn previous(&self) -> Irql {
		self.previous
	}
}

impl<P: TaskPriority + ?Sized> Drop for IrqlGuard<'_, P> {
	fn drop(&mut self) {
		// SAFETY: The guard was created under the same requirements.
		unsafe {
			match self.restore {
				Restore::Level(irql) => self.priority.lower_irql(irql),
				Restore::InterruptFlag(true) => self.priority.enable_interrupts(),
				Restore::InterruptFlag(false) => {}
			}
		}
	}
}

/// Masks maskable interrupts for its lifetime.
///
/// Saves `RFLAGS.IF` and clears it; on drop the flag is set again only
/// if it was set before. The task priority is not touched.
#[must_use = "interrupts are restored as soon as the guard is dropped"]
pub struct NoInterruptsGuard<'a, M: InterruptMask + ?Sized> {
	/// The flag that was cleared.
	mask:               &'a M,
	/// Whether interrupts were enabled.
	interrupts_enabled: bool,
}

impl<'a, M: InterruptMask + ?Sized> NoInterruptsGuard<'a, M> {
	/// Masks interrupts through `mask`.
	///
	/// # Safety
	/// See [`InterruptMask::disable_interrupts`]. Guards must be
	/// dropped in reverse order of creation.
	pub unsafe fn new(mask: &'a M) -> Self {
		let interrupts_enabled = mask.interrupts_enabled();
		// SAFETY: Offloaded to the caller.
		unsafe { mask.disable_interrupts() };
		Self {
			mask,
			interrupts_enabled,
		}
	}

	/// Returns whether interrupts are enabled again on drop.
	#[must_use]
	pub fn restores_interrupts(&self) -> bool {
		self.interrupts_enabled
	}
}

impl<M: InterruptMask + ?Sized> Drop for NoInterruptsGuard<'_, M> {
	fn drop(&mut self) {
		if self.interrupts_enabled {
			// SAFETY: The guard was created under the same requirements.
			unsafe { self.mask.enable_interrupts() };
		}
	}
}

/// The processor's `RFLAGS.IF`.
#[cfg(target_arch = "x86_64")]
#[derive(Debug, Clone, Copy, Default)]
pub struct InterruptFlag;

#[cfg(target_arch = "x86_64")]
impl InterruptMask for InterruptFlag {
	fn interrupts_enabled(&self) -> bool {
		Rflags::load().interrupt_enable()
	}

	unsafe fn disable_interrupts(&self) {
		// SAFETY: Offloaded to the caller.
		unsafe { crate::asm::cli() };
	}

	unsafe fn enable_interrupts(&self) {
		// SAFETY: Offloaded to the caller.
		unsafe { crate::asm::sti() };
	}
}

#[cfg(target_arch = "x86_64")]
impl NoInterruptsGuard<'static, InterruptFlag> {
	/// Masks the processor's interrupts.
	///
	/// # Safety
	/// Must be executed in ring 0. Guards must be dropped in reverse
	/// order of creation.
	pub unsafe fn disable() -> Self {
		// SAFETY: Offloaded to the caller.
		unsafe { Self::new(&InterruptFlag) }
	}
}

/// The processor's CR8 register.
#[cfg(target_arch = "x86_64")]
#[derive(Debug, Clone, Copy, Default)]
pub struct Cr8Priority;

#[cfg(target_arch = "x86_64")]
impl InterruptMask for Cr8Priority {
	fn interrupts_enabled(&self) -> bool {
		InterruptFlag.interrupts_enabled()
	}

	unsafe fn disable_interrupts(&self) {
		// SAFETY: Offloaded to the caller.
		unsafe { InterruptFlag.disable_interrupts() };
	}

	unsafe fn enable_interrupts(&self) {
		// SAFETY: Offloaded to the caller.
		unsafe { InterruptFlag.enable_interrupts() };
	}
}

#[cfg(target_arch = "x86_64")]
impl TaskPriority for Cr8Priority {
	fn irql(&self) -> Irql {
		Irql(crate::reg::Cr8::load().tpr())
	}

	unsafe fn set_irql(&self, irql: Irql) {
		debug_assert!(irql <= Irql::HIGH, "{irql:?} cannot be stored in CR8");
		// SAFETY: Offloaded to the caller.
		unsafe { crate::reg::Cr8::new().with_tpr(irql.tpr()).store() };
	}
}

/// Returns the current level from CR8.
///
/// Reading CR8 faults outside of ring 0.
#[cfg(target_arch = "x86_64")]
#[must_use]
pub fn get_irql() -> Irql {
	Cr8Priority.irql()
}

/// Sets CR8 to `irql`.
///
/// # Safety
/// See [`TaskPriority::set_irql`].
#[cfg(target_arch = "x86_64")]
pub unsafe fn set_irql(irql: Irql) {
	// SAFETY: Offloaded to the caller.
	unsafe { Cr8Priority.set_irql(irql) };
}

/// Raises CR8 to `irql`, returning the previous level.
///
/// # Safety
/// See [`TaskPriority::raise_irql`].
#[cfg(target_arch = "x86_64")]
pub unsafe fn raise_irql(irql: Irql) -> Irql {
	// SAFETY: Offloaded to the caller.
	unsafe { Cr8Priority.raise_irql(irql) }
}

/// Lowers CR8 to `irql`.
///
/// # Safety
/// See [`TaskPriority::lower_irql`].
#[cfg(target_arch = "x86_64")]
pub unsafe fn lower_irql(irql: Irql) {
	// SAFETY: Offloaded to the caller.
	unsafe { Cr8Priority.lower_irql(irql) };
}

/// Returns the current level, or [`Irql::NO_INTERRUPTS`] if
/// interrupts are disabled.
#[cfg(target_arch = "x86_64")]
#[must_use]
pub fn get_effective_irql() -> Irql {
	effective_irql(Rflags::load(), get_irql())
}

#[cfg(test)]
mod tests {
	use core::cell::Cell;

	use super::*;

	/// An in-memory task-priority register and interrupt flag.
	#[derive(Default)]
	struct Mock {
		/// The stored level.
		tpr:        Cell<u8>,
		/// The interrupt flag.
		interrupts: Cell<bool>,
		/// Number of times the flag was set.
		sti_count:  Cell<u32>,
	}

	impl Mock {
		/// Creates a register at `level` with the flag set to `interrupts`.
		fn with(level: Irql, interrupts: bool) -> Self {
			Self {
				tpr:        Cell::new(level.level()),
				interrupts: Cell::new(interrupts),
				sti_count:  Cell::new(0),
			}
		}
	}

	impl InterruptMask for Mock {
		fn interrupts_enabled(&self) -> bool {
			self.interrupts.get()
		}

		unsafe fn disable_interrupts(&self) {
			self.interrupts.set(false);
		}

		unsafe fn enable_interrupts(&self) {
			self.interrupts.set(true);
			self.sti_count.set(self.sti_count.get() + 1);
		}
	}

	impl TaskPriority for Mock {
		fn irql(&self) -> Irql {
			Irql(self.tpr.get())
		}

		unsafe fn set_irql(&self, irql: Irql) {
			assert!(irql <= Irql::HIGH, "{irql:?} cannot be stored in CR8");
			self.tpr.set(irql.level());
		}
	}

	#[test]
	fn levels() {
		assert!(Irql::PASSIVE < Irql::DISPATCH);
		assert!(Irql::HIGH < Irql::NO_INTERRUPTS);
		assert_eq!(Irql::new(16), Some(Irql::NO_INTERRUPTS));
		assert_eq!(Irql::new(17), None);
		assert_eq!(Irql::NO_INTERRUPTS.tpr(), 15);
		assert_eq!(Irql::DISPATCH.tpr(), 2);
	}

	#[test]
	fn raise_and_lower() {
		let tpr = Mock::default();
		// SAFETY: Not a hardware register.
		unsafe {
			assert_eq!(tpr.raise_irql(Irql::DISPATCH), Irql::PASSIVE);
			assert_eq!(tpr.irql(), Irql::DISPATCH);
			assert_eq!(tpr.raise_irql(Irql::DISPATCH), Irql::DISPATCH);
			tpr.lower_irql(Irql::APC);
		}
		assert_eq!(tpr.irql(), Irql::APC);
	}

	#[test]
	#[cfg(debug_assertions)]
	#[should_panic(expected = "below the current level")]
	fn raise_below_current_panics() {
		let tpr = Mock::with(Irql::CLOCK, true);
		// SAFETY: Not a hardware register.
		unsafe {
			tpr.raise_irql(Irql::APC);
		}
	}

	#[test]
	fn guards_nest() {
		let tpr = Mock::default();
		{
			// SAFETY: Not a hardware register.
			let outer = unsafe { IrqlGuard::raise(&tpr, Irql::DISPATCH) };
			assert_eq!(outer.previous(), Irql::PASSIVE);
			{
				// SAFETY: Not a hardware register.
				let _inner = unsafe { IrqlGuard::raise(&tpr, Irql::HIGH) };
				assert_eq!(tpr.irql(), Irql::HIGH);
			}
			assert_eq!(tpr.irql(), Irql::DISPATCH);
		}
		assert_eq!(tpr.irql(), Irql::PASSIVE);
	}

	#[test]
	fn effective_level() {
		let enabled = Rflags::new().with_interrupt_enable(true);
		assert_eq!(effective_irql(enabled, Irql::APC), Irql::APC);
		assert_eq!(effective_irql(Rflags::new(), Irql::APC), Irql::NO_INTERRUPTS);
	}

	#[test]
	fn no_interrupts_leaves_priority_alone() {
		let tpr = Mock::with(Irql::DISPATCH, true);
		{
			// SAFETY: Not a hardware register.
			let guard = unsafe { IrqlGuard::raise(&tpr, Irql::NO_INTERRUPTS) };
			assert_eq!(guard.previous(), Irql::DISPATCH);
			assert!(!tpr.interrupts_enabled());
			assert_eq!(tpr.irql(), Irql::DISPATCH);
		}
		assert!(tpr.interrupts_enabled());
		assert_eq!(tpr.irql(), Irql::DISPATCH);
		assert_eq!(tpr.sti_count.get(), 1);
	}

	#[test]
	fn no_interrupts_keeps_flag_clear() {
		let tpr = Mock::with(Irql::PASSIVE, false);
		{
			// SAFETY: Not a hardware register.
			let guard = unsafe { IrqlGuard::raise(&tpr, Irql::NO_INTERRUPTS) };
			assert_eq!(guard.previous(), Irql::NO_INTERRUPTS);
			assert!(!tpr.interrupts_enabled());
		}
		assert!(!tpr.interrupts_enabled());
		assert_eq!(tpr.sti_count.get(), 0);
	}

	#[test]
	fn no_interrupts_guard_restores_flag() {
		let flag = Mock::with(Irql::APC, true);
		{
			// SAFETY: Not a hardware register.
			let outer = unsafe { NoInterruptsGuard::new(&flag) };
			assert!(outer.restores_interrupts());
			assert!(!flag.interrupts_enabled());
			{
				// SAFETY: Not a hardware register.
				let inner = unsafe { NoInterruptsGuard::new(&flag) };
				assert!(!inner.restores_interrupts());
			}
			assert!(!flag.interrupts_enabled());
			assert_eq!(flag.sti_count.get(), 0);
		}
		assert!(flag.interrupts_enabled());
		assert_eq!(flag.sti_count.get(), 1);
		assert_eq!(flag.irql(), Irql::APC);
	}

	#[test]
	fn priority_guard_inside_no_interrupts() {
		let tpr = Mock::with(Irql::PASSIVE, true);
		{
			// SAFETY: Not a hardware register.
			let _masked = unsafe { IrqlGuard::raise(&tpr, Irql::NO_INTERRUPTS) };
			{
				// SAFETY: Not a hardware register.
				let _high = unsafe { IrqlGuard::raise(&tpr, Irql::HIGH) };
				assert_eq!(tpr.irql(), Irql::HIGH);
			}
			assert_eq!(tpr.irql(), Irql::PASSIVE);
			assert!(!tpr.interrupts_enabled());
		}
		assert!(tpr.interrupts_enabled());
	}
}
