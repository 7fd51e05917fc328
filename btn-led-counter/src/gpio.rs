//! GPIO port capability.
//!
//! A port is one physical GPIO device with two independently directioned channels and a
//! device-wide interrupt block. The counter only talks to this trait, the Zynq binding lives
//! in [crate::zynq].
pub use zynq7000_hal::axi_gpio::Channel;

pub trait GpioPort {
    /// Set the direction mask of a channel. Set bits are inputs.
    fn set_direction(&mut self, channel: Channel, input_mask: u32);

    /// Discrete read of the current bit pattern of a channel.
    fn read(&mut self, channel: Channel) -> u32;

    /// Discrete write of a complete bit pattern to a channel.
    fn write(&mut self, channel: Channel, value: u32);

    fn interrupt_enable(&mut self, mask: u32);

    fn interrupt_disable(&mut self, mask: u32);

    fn interrupt_global_enable(&mut self);

    fn interrupt_global_disable(&mut self);

    /// Pending-interrupt bitmask.
    fn interrupt_status(&mut self) -> u32;

    /// Enabled-interrupt bitmask.
    fn interrupt_enabled(&mut self) -> u32;

    /// Acknowledge the pending interrupts selected by `mask`.
    fn interrupt_clear(&mut self, mask: u32);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum GpioInitError {
    #[error("GPIO device {0} not found")]
    DeviceNotFound(u16),
    #[error("GPIO device {0} only provides one channel")]
    NotDualChannel(u16),
    #[error("GPIO device {0} has no interrupt output")]
    NoInterrupt(u16),
    #[error("GPIO device {0} was already initialized")]
    AlreadyInitialized(u16),
}

/// Resolves a device identifier to an initialized [GpioPort].
pub trait GpioProvider {
    type Port: GpioPort;

    fn initialize(&mut self, device_id: u16) -> Result<Self::Port, GpioInitError>;
}
