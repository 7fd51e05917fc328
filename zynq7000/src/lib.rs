//! # Peripheral access for the Zybo button/LED counter firmware
//!
//! Register blocks of the AMD Zynq 7000 processing system which the firmware touches (GIC and
//! the PS console UART) together with the AXI GPIO soft IP which the reference hardware design
//! places in the programmable logic.
#![no_std]
#![cfg_attr(docsrs, feature(doc_cfg))]

use core::sync::atomic::{AtomicBool, Ordering};

pub mod axi_gpio;
pub mod gic;
pub mod mpcore;
pub mod uart;

static PERIPHERALS_TAKEN: AtomicBool = AtomicBool::new(false);

/// Singleton for the processing system peripherals used by the firmware.
///
/// The AXI GPIO block is not part of this structure: its presence and address depend on the
/// loaded bitstream, so it is resolved through a device table instead.
///
/// The GIC is not part of it either. The interrupt controller resolves its register blocks from
/// a device table, and the IRQ entry reaches the CPU interface through its fixed address.
pub struct PsPeripherals {
    pub uart_1: uart::MmioUart<'static>,
}

impl PsPeripherals {
    /// Returns all peripherals once. Subsequent calls return [None].
    pub fn take() -> Option<Self> {
        if PERIPHERALS_TAKEN.swap(true, Ordering::Relaxed) {
            return None;
        }
        // Safety: the taken flag guarantees this is the only safe handout.
        Some(unsafe { Self::steal() })
    }

    /// Unconditionally creates the peripheral instances.
    ///
    /// # Safety
    ///
    /// Circumvents the singleton check. The caller must ensure no other owner accesses the
    /// same register blocks concurrently.
    pub unsafe fn steal() -> Self {
        unsafe {
            Self {
                uart_1: uart::Uart::new_mmio_fixed_1(),
            }
        }
    }
}
