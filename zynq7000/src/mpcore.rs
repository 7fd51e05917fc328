//! Application Processing Unit (mpcore) base addresses.
//!
//! Based on p.1483 of the Zynq-7000 TRM. Only the GIC blocks are used by this crate; the SCU,
//! timers and watchdogs live in the same 8 KiB window.

pub const MPCORE_BASE_ADDR: usize = 0xF8F0_0000;
pub const GICC_BASE_ADDR: usize = MPCORE_BASE_ADDR + 0x100;
pub const GICD_BASE_ADDR: usize = MPCORE_BASE_ADDR + 0x1000;
