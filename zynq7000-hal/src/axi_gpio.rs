//! # AXI GPIO driver
//!
//! Driver for the AXI GPIO soft IP placed in the programmable logic. One device provides one or
//! two channels, each up to 32 bits wide. Every channel has its own direction mask and data
//! register, while the interrupt block is shared: it latches input changes per channel into
//! the interrupt status register and drives a single level-sensitive line towards the GIC.
//!
//! Device instances are described by [AxiGpioConfig] entries which mirror the hardware
//! description exported by the FPGA tooling. [lookup_config] resolves a device ID to its entry.
use zynq7000::axi_gpio::{
    AxiGpio as AxiGpioRegs, ChannelInterrupts, GlobalInterruptEnable, MmioAxiGpio,
};

/// Static description of one AXI GPIO instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxiGpioConfig {
    pub device_id: u16,
    pub base_addr: usize,
    pub interrupt_present: bool,
    pub is_dual: bool,
}

/// Find the configuration entry for a device ID.
pub fn lookup_config(table: &[AxiGpioConfig], device_id: u16) -> Option<&AxiGpioConfig> {
    table.iter().find(|cfg| cfg.device_id == device_id)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    One = 1,
    Two = 2,
}

impl Channel {
    /// Bit of this channel inside the interrupt status and enable registers.
    #[inline]
    pub const fn interrupt_mask(self) -> u32 {
        match self {
            Channel::One => ChannelInterrupts::CHANNEL_1_MASK,
            Channel::Two => ChannelInterrupts::CHANNEL_2_MASK,
        }
    }
}

pub struct AxiGpio {
    regs: MmioAxiGpio<'static>,
    dual: bool,
}

// Safety: the driver is the only owner of its register block.
unsafe impl Send for AxiGpio {}

impl AxiGpio {
    /// Create a driver around an MMIO register block.
    ///
    /// Accesses to channel 2 of a single-channel device are ignored and reads return 0.
    pub const fn new(regs: MmioAxiGpio<'static>, dual: bool) -> Self {
        Self { regs, dual }
    }

    /// Create a driver for the device described by `config`.
    ///
    /// # Safety
    ///
    /// `config.base_addr` must point to an AXI GPIO instance of the loaded bitstream and no other
    /// driver may be created for the same instance.
    pub unsafe fn new_from_config(config: &AxiGpioConfig) -> Self {
        Self::new(
            unsafe { AxiGpioRegs::new_mmio_at(config.base_addr) },
            config.is_dual,
        )
    }

    #[inline]
    pub const fn is_dual(&self) -> bool {
        self.dual
    }

    #[inline]
    pub fn regs(&mut self) -> &mut MmioAxiGpio<'static> {
        &mut self.regs
    }

    /// Set the direction mask of a channel. Set bits are inputs, cleared bits are outputs.
    pub fn set_direction(&mut self, channel: Channel, input_mask: u32) {
        match channel {
            Channel::One => self.regs.write_tri_1(input_mask),
            Channel::Two if self.dual => self.regs.write_tri_2(input_mask),
            Channel::Two => (),
        }
    }

    pub fn direction(&mut self, channel: Channel) -> u32 {
        match channel {
            Channel::One => self.regs.read_tri_1(),
            Channel::Two if self.dual => self.regs.read_tri_2(),
            Channel::Two => 0,
        }
    }

    /// Discrete read of the complete data register of a channel.
    pub fn read(&mut self, channel: Channel) -> u32 {
        match channel {
            Channel::One => self.regs.read_data_1(),
            Channel::Two if self.dual => self.regs.read_data_2(),
            Channel::Two => 0,
        }
    }

    /// Discrete write of the complete data register of a channel. Bits configured as inputs
    /// are not driven.
    pub fn write(&mut self, channel: Channel, value: u32) {
        match channel {
            Channel::One => self.regs.write_data_1(value),
            Channel::Two if self.dual => self.regs.write_data_2(value),
            Channel::Two => (),
        }
    }

    /// Unmask the channel interrupts selected by `mask`.
    pub fn enable_interrupts(&mut self, mask: u32) {
        self.regs
            .modify_ier(|v| ChannelInterrupts::new_with_raw_value(v.raw_value() | mask));
    }

    /// Mask the channel interrupts selected by `mask`.
    pub fn disable_interrupts(&mut self, mask: u32) {
        self.regs
            .modify_ier(|v| ChannelInterrupts::new_with_raw_value(v.raw_value() & !mask));
    }

    pub fn enabled_interrupts(&mut self) -> u32 {
        self.regs.read_ier().raw_value()
    }

    /// Pending channel interrupts. Bits latch even when the channel interrupt is masked.
    pub fn interrupt_status(&mut self) -> u32 {
        self.regs.read_isr().raw_value()
    }

    /// Acknowledge pending channel interrupts selected by `mask`.
    ///
    /// The status register is toggle-on-write, so only bits which are currently set are
    /// written back.
    pub fn clear_interrupts(&mut self, mask: u32) {
        let pending = self.regs.read_isr().raw_value();
        self.regs
            .write_isr(ChannelInterrupts::new_with_raw_value(pending & mask));
    }

    /// Let the interrupt block drive the interrupt line.
    pub fn enable_global_interrupt(&mut self) {
        self.regs
            .write_gier(GlobalInterruptEnable::builder().with_enable(true).build());
    }

    pub fn disable_global_interrupt(&mut self) {
        self.regs.write_gier(GlobalInterruptEnable::DEFAULT);
    }

    pub fn is_global_interrupt_enabled(&mut self) -> bool {
        self.regs.read_gier().enable()
    }
}
