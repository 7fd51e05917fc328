//! Processor IRQ exception hook.
//!
//! The IRQ vector of the runtime calls [on_irq], which forwards to the [Dispatch] entry that
//! was registered during setup.
use core::cell::Cell;

use critical_section::Mutex;

use crate::intc::Dispatch;

static IRQ_ENTRY: Mutex<Cell<Option<&'static dyn Dispatch>>> = Mutex::new(Cell::new(None));

pub trait ExceptionControl {
    /// Route the processor IRQ exception to `entry`.
    fn register_irq_entry(&mut self, entry: &'static dyn Dispatch);

    /// Unmask IRQ exceptions on the processor.
    fn enable_irq(&mut self);
}

/// Install the [Dispatch] entry used by [on_irq]. Replaces any previous entry.
pub fn set_irq_entry(entry: &'static dyn Dispatch) {
    critical_section::with(|cs| IRQ_ENTRY.borrow(cs).set(Some(entry)));
}

pub fn irq_entry_installed() -> bool {
    critical_section::with(|cs| IRQ_ENTRY.borrow(cs).get().is_some())
}

/// Run the registered IRQ entry. Returns [false] if no entry was installed yet, in which case
/// the caller is responsible for acknowledging the interrupt.
///
/// The entry is invoked outside of a critical section.
pub fn on_irq() -> bool {
    let entry = critical_section::with(|cs| IRQ_ENTRY.borrow(cs).get());
    match entry {
        Some(entry) => {
            entry.dispatch();
            true
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    extern crate std;
    use core::sync::atomic::{AtomicU32, Ordering};
    use std::boxed::Box;

    use super::*;

    struct CountingDispatch(AtomicU32);

    impl Dispatch for CountingDispatch {
        fn dispatch(&self) {
            self.0.fetch_add(1, Ordering::Relaxed);
        }
    }

    // Single test because the entry is process global.
    #[test]
    fn irq_is_forwarded_to_installed_entry() {
        let first: &'static CountingDispatch =
            Box::leak(Box::new(CountingDispatch(AtomicU32::new(0))));
        let second: &'static CountingDispatch =
            Box::leak(Box::new(CountingDispatch(AtomicU32::new(0))));
        set_irq_entry(first);
        assert!(irq_entry_installed());
        assert!(on_irq());
        assert!(on_irq());
        set_irq_entry(second);
        assert!(on_irq());
        assert_eq!(first.0.load(Ordering::Relaxed), 2);
        assert_eq!(second.0.load(Ordering::Relaxed), 1);
    }
}
