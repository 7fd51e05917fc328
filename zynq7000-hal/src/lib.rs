//! # HAL subset for the AMD Zynq 7000 SoC family
//!
//! Hardware abstraction on top of the register blocks of the [zynq7000] crate: the generic
//! interrupt controller, the AXI GPIO soft IP, a console UART transmitter and a blocking
//! logger built on it.
#![no_std]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod axi_gpio;
pub mod gic;
pub mod log;
pub mod uart;

pub use zynq7000 as pac;
