//! # Simple logging providers
//!
//! Blocking logger on top of the console [UartTx]. The firmware logs from thread mode and from
//! the IRQ handler, so every record is written inside a critical section.
use core::sync::atomic::AtomicBool;

static LOGGER_INIT_DONE: AtomicBool = AtomicBool::new(false);

/// Blocking UART loggers.
pub mod uart_blocking {
    use super::*;
    use core::cell::RefCell;
    use embedded_io::Write as _;

    use critical_section::Mutex;
    use log::{LevelFilter, set_logger, set_max_level};

    use crate::uart::UartTx;

    pub struct UartLoggerBlocking(Mutex<RefCell<Option<UartTx>>>);

    static UART_LOGGER_BLOCKING: UartLoggerBlocking =
        UartLoggerBlocking(Mutex::new(RefCell::new(None)));

    /// Initialize the logger with a blocking UART instance.
    ///
    /// This is a blocking logger which performs a write inside a critical section. This logger is
    /// thread-safe, but interrupts will be disabled while the logger is writing to the UART.
    /// Calling this more than once has no effect.
    pub fn init_with_locks(uart: UartTx, level: LevelFilter) {
        if LOGGER_INIT_DONE.swap(true, core::sync::atomic::Ordering::Relaxed) {
            return;
        }
        critical_section::with(|cs| {
            UART_LOGGER_BLOCKING.0.borrow(cs).replace(Some(uart));
        });
        // The init flag guarantees that no other logger was installed through this module.
        let _ = set_logger(&UART_LOGGER_BLOCKING);
        set_max_level(level);
    }

    impl log::Log for UartLoggerBlocking {
        fn enabled(&self, _metadata: &log::Metadata) -> bool {
            true
        }

        fn log(&self, record: &log::Record) {
            critical_section::with(|cs| {
                let mut opt_uart = self.0.borrow(cs).borrow_mut();
                if let Some(uart) = opt_uart.as_mut() {
                    let _ = writeln!(uart, "{} - {}\r", record.level(), record.args());
                }
            })
        }

        fn flush(&self) {
            critical_section::with(|cs| {
                if let Some(uart) = self.0.borrow(cs).borrow_mut().as_mut() {
                    uart.flush();
                }
            });
        }
    }

    /// Flush the logger instance.
    pub fn flush() {
        log::Log::flush(&UART_LOGGER_BLOCKING);
    }
}
