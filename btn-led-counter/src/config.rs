//! Board configuration of the Zybo reference design.
//!
//! The device tables mirror the hardware description exported together with the bitstream.
use zynq7000::{axi_gpio::AXI_GPIO_0_BASE_ADDR, mpcore};
use zynq7000_hal::{axi_gpio::AxiGpioConfig, gic::SpiInterrupt};

use crate::{counter::SpuriousPolicy, gpio::Channel};

pub const GPIO_DEVICE_ID: u16 = 0;
pub const INTC_DEVICE_ID: u16 = 0;

/// GIC interrupt ID of the AXI GPIO interrupt output, wired to `IRQ_F2P[0]`.
pub const GPIO_INTERRUPT_LINE: u16 = SpiInterrupt::Pl0 as u16;

pub const LED_CHANNEL: Channel = Channel::One;
pub const BTN_CHANNEL: Channel = Channel::Two;

/// Interrupt status/enable bit of the button channel.
pub const BTN_INTERRUPT_MASK: u32 = BTN_CHANNEL.interrupt_mask();

/// All LED pins are outputs.
pub const LED_DIRECTION_MASK: u32 = 0x00;
/// The low 8 button pins are inputs.
pub const BTN_DIRECTION_MASK: u32 = 0xFF;

pub const AXI_GPIO_DEVICES: &[AxiGpioConfig] = &[AxiGpioConfig {
    device_id: GPIO_DEVICE_ID,
    base_addr: AXI_GPIO_0_BASE_ADDR,
    interrupt_present: true,
    is_dual: true,
}];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GicDeviceConfig {
    pub device_id: u16,
    pub gicc_base_addr: usize,
    pub gicd_base_addr: usize,
}

pub const GIC_DEVICES: &[GicDeviceConfig] = &[GicDeviceConfig {
    device_id: INTC_DEVICE_ID,
    gicc_base_addr: mpcore::GICC_BASE_ADDR,
    gicd_base_addr: mpcore::GICD_BASE_ADDR,
}];

pub fn lookup_gic_config(table: &[GicDeviceConfig], device_id: u16) -> Option<&GicDeviceConfig> {
    table.iter().find(|cfg| cfg.device_id == device_id)
}

/// Everything the setup sequence and the event handler need to know about the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CounterConfig {
    pub gpio_device_id: u16,
    pub intc_device_id: u16,
    pub interrupt_line: u16,
    pub led_channel: Channel,
    pub btn_channel: Channel,
    pub led_direction_mask: u32,
    pub btn_direction_mask: u32,
    pub btn_interrupt_mask: u32,
    pub spurious_policy: SpuriousPolicy,
}

impl CounterConfig {
    pub const ZYBO: Self = Self {
        gpio_device_id: GPIO_DEVICE_ID,
        intc_device_id: INTC_DEVICE_ID,
        interrupt_line: GPIO_INTERRUPT_LINE,
        led_channel: LED_CHANNEL,
        btn_channel: BTN_CHANNEL,
        led_direction_mask: LED_DIRECTION_MASK,
        btn_direction_mask: BTN_DIRECTION_MASK,
        btn_interrupt_mask: BTN_INTERRUPT_MASK,
        spurious_policy: SpuriousPolicy::LeaveDisabled,
    };

    pub const fn with_spurious_policy(mut self, policy: SpuriousPolicy) -> Self {
        self.spurious_policy = policy;
        self
    }
}

impl Default for CounterConfig {
    fn default() -> Self {
        Self::ZYBO
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zybo_constants() {
        let cfg = CounterConfig::default();
        assert_eq!(cfg.interrupt_line, 61);
        assert_eq!(cfg.btn_interrupt_mask, 0b10);
        assert_eq!(cfg.led_channel, Channel::One);
        assert_eq!(cfg.btn_channel, Channel::Two);
        assert_eq!(cfg.spurious_policy, SpuriousPolicy::LeaveDisabled);
    }

    #[test]
    fn gic_lookup() {
        let gic = lookup_gic_config(GIC_DEVICES, INTC_DEVICE_ID).unwrap();
        assert_eq!(gic.gicc_base_addr, 0xF8F0_0100);
        assert_eq!(gic.gicd_base_addr, 0xF8F0_1000);
        assert!(lookup_gic_config(GIC_DEVICES, 1).is_none());
    }

    #[test]
    fn gpio_table_describes_dual_channel_device() {
        let gpio = AXI_GPIO_DEVICES[0];
        assert_eq!(gpio.base_addr, 0x4120_0000);
        assert!(gpio.is_dual);
        assert!(gpio.interrupt_present);
    }
}
