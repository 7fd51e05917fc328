//! # Interrupt driven button/LED counter for the Zybo board
//!
//! Button presses on channel 2 of an AXI GPIO block raise an interrupt. Each interrupt adds the
//! raw button value to a running count which is mirrored to the LEDs on channel 1.
//!
//! The counter logic is written against small capability traits:
//!
//! - [gpio::GpioPort] and [gpio::GpioProvider] for the GPIO block
//! - [intc::InterruptController] for the interrupt controller and its handler table
//! - [exception::ExceptionControl] for the processor IRQ exception
//!
//! [zynq] implements them for the Zynq7000 using the HAL, which is what the firmware uses.
//!
//! ## Usage
//!
//! ```ignore
//! static COUNTER: BtnLedCounter<AxiGpio> = BtnLedCounter::new(CounterConfig::ZYBO);
//! static GIC: ScuGic = ScuGic::new(config::GIC_DEVICES);
//!
//! let mut gpio = AxiGpioProvider::new(config::AXI_GPIO_DEVICES);
//! setup(&COUNTER, &mut gpio, &GIC, &mut CortexA9Exceptions)?;
//! ```
#![no_std]

pub mod config;
pub mod counter;
pub mod exception;
pub mod gpio;
pub mod intc;
pub mod setup;
pub mod zynq;

#[cfg(test)]
mod sim;

pub use config::CounterConfig;
pub use counter::{BtnLedCounter, Diagnostics, EventOutcome, SpuriousPolicy};
pub use setup::{SetupError, setup};
