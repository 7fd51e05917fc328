//! # AXI GPIO register module.
//!
//! Register map of the AMD/Xilinx AXI GPIO soft IP (PG144) which is instantiated in the
//! programmable logic. The block provides up to two channels, each with a data and a
//! tri-state (direction) register, and an interrupt block which latches input changes.
use static_assertions::const_assert_eq;

/// Base address assigned to `axi_gpio_0` by the default Vivado address editor.
pub const AXI_GPIO_0_BASE_ADDR: usize = 0x4120_0000;

/// Global interrupt enable register (GIER).
#[bitbybit::bitfield(u32, default = 0x0, debug)]
pub struct GlobalInterruptEnable {
    /// Master enable for the `ip2intc_irpt` output.
    #[bit(31, rw)]
    enable: bool,
}

/// Layout shared by the IP interrupt status (ISR) and enable (IER) registers.
///
/// The status register is toggle-on-write: writing a one to a set bit clears it.
#[bitbybit::bitfield(u32, default = 0x0, debug)]
pub struct ChannelInterrupts {
    #[bit(1, rw)]
    channel_2: bool,
    #[bit(0, rw)]
    channel_1: bool,
}

impl ChannelInterrupts {
    pub const CHANNEL_1_MASK: u32 = 1 << 0;
    pub const CHANNEL_2_MASK: u32 = 1 << 1;
}

/// AXI GPIO register block.
#[derive(derive_mmio::Mmio)]
#[repr(C)]
pub struct AxiGpio {
    /// Channel 1 data register.
    data_1: u32,
    /// Channel 1 tri-state control. A set bit configures the pin as an input.
    tri_1: u32,
    /// Channel 2 data register.
    data_2: u32,
    /// Channel 2 tri-state control.
    tri_2: u32,

    _reserved_0: [u32; 0x43],

    /// Global interrupt enable register.
    gier: GlobalInterruptEnable,
    /// IP interrupt status register.
    #[mmio(PureRead, Write)]
    isr: ChannelInterrupts,

    _reserved_1: u32,

    /// IP interrupt enable register.
    ier: ChannelInterrupts,
}

const_assert_eq!(core::mem::offset_of!(AxiGpio, gier), 0x11C);
const_assert_eq!(core::mem::offset_of!(AxiGpio, isr), 0x120);
const_assert_eq!(core::mem::offset_of!(AxiGpio, ier), 0x128);
const_assert_eq!(core::mem::size_of::<AxiGpio>(), 0x12C);
