//! Zynq7000 implementations of the GPIO, interrupt controller and exception capabilities.
use core::cell::RefCell;

use critical_section::Mutex;
use zynq7000::gic::{GicCpuInterface, GicDistributor};
use zynq7000_hal::{
    axi_gpio::{AxiGpio, AxiGpioConfig, lookup_config},
    gic::{GicConfigurator, GicInterruptHelper, SpiInterrupt, TargetCpu},
};

use crate::{
    config::{GicDeviceConfig, lookup_gic_config},
    exception::{self, ExceptionControl},
    gpio::{Channel, GpioInitError, GpioPort, GpioProvider},
    intc::{Dispatch, HandlerTable, IntcError, InterruptController, IrqHandler},
};

impl GpioPort for AxiGpio {
    #[inline]
    fn set_direction(&mut self, channel: Channel, input_mask: u32) {
        AxiGpio::set_direction(self, channel, input_mask);
    }

    #[inline]
    fn read(&mut self, channel: Channel) -> u32 {
        AxiGpio::read(self, channel)
    }

    #[inline]
    fn write(&mut self, channel: Channel, value: u32) {
        AxiGpio::write(self, channel, value);
    }

    #[inline]
    fn interrupt_enable(&mut self, mask: u32) {
        self.enable_interrupts(mask);
    }

    #[inline]
    fn interrupt_disable(&mut self, mask: u32) {
        self.disable_interrupts(mask);
    }

    #[inline]
    fn interrupt_global_enable(&mut self) {
        self.enable_global_interrupt();
    }

    #[inline]
    fn interrupt_global_disable(&mut self) {
        self.disable_global_interrupt();
    }

    #[inline]
    fn interrupt_status(&mut self) -> u32 {
        AxiGpio::interrupt_status(self)
    }

    #[inline]
    fn interrupt_enabled(&mut self) -> u32 {
        self.enabled_interrupts()
    }

    #[inline]
    fn interrupt_clear(&mut self, mask: u32) {
        self.clear_interrupts(mask);
    }
}

/// Hands out dual channel AXI GPIO drivers with an interrupt output from a device table.
///
/// Every device can only be initialized once. Device IDs must be below 32.
pub struct AxiGpioProvider {
    devices: &'static [AxiGpioConfig],
    taken: u32,
}

impl AxiGpioProvider {
    pub const fn new(devices: &'static [AxiGpioConfig]) -> Self {
        Self { devices, taken: 0 }
    }
}

impl GpioProvider for AxiGpioProvider {
    type Port = AxiGpio;

    fn initialize(&mut self, device_id: u16) -> Result<AxiGpio, GpioInitError> {
        let config = lookup_config(self.devices, device_id)
            .ok_or(GpioInitError::DeviceNotFound(device_id))?;
        let bit = 1u32
            .checked_shl(device_id as u32)
            .ok_or(GpioInitError::DeviceNotFound(device_id))?;
        if !config.is_dual {
            return Err(GpioInitError::NotDualChannel(device_id));
        }
        if !config.interrupt_present {
            return Err(GpioInitError::NoInterrupt(device_id));
        }
        if self.taken & bit != 0 {
            return Err(GpioInitError::AlreadyInitialized(device_id));
        }
        self.taken |= bit;
        // Safety: the device table describes the loaded bitstream and the taken mask ensures a
        // single driver per instance.
        Ok(unsafe { AxiGpio::new_from_config(config) })
    }
}

fn spi_line(line: u16) -> Result<SpiInterrupt, IntcError> {
    u8::try_from(line)
        .ok()
        .and_then(|raw| SpiInterrupt::try_from(raw).ok())
        .ok_or(IntcError::InvalidLine(line))
}

struct GicState {
    gic: GicConfigurator,
    helper: GicInterruptHelper,
}

// Safety: single core, all accesses go through the critical section mutex of [ScuGic].
unsafe impl Send for GicState {}

/// GIC of the Cortex-A9 MPCore with a table of `&'static dyn IrqHandler` callbacks.
///
/// Lines are shared peripheral interrupt IDs. They are routed to CPU0 when enabled.
pub struct ScuGic {
    devices: &'static [GicDeviceConfig],
    state: Mutex<RefCell<Option<GicState>>>,
    handlers: Mutex<RefCell<HandlerTable>>,
}

impl ScuGic {
    pub const fn new(devices: &'static [GicDeviceConfig]) -> Self {
        Self {
            devices,
            state: Mutex::new(RefCell::new(None)),
            handlers: Mutex::new(RefCell::new(HandlerTable::new())),
        }
    }

    pub fn is_initialized(&self) -> bool {
        critical_section::with(|cs| self.state.borrow_ref(cs).is_some())
    }

    fn with_gic<R>(&self, f: impl FnOnce(&mut GicState) -> R) -> Result<R, IntcError> {
        critical_section::with(|cs| {
            let mut guard = self.state.borrow_ref_mut(cs);
            let state = guard.as_mut().ok_or(IntcError::NotInitialized)?;
            Ok(f(state))
        })
    }
}

impl Dispatch for ScuGic {
    fn dispatch(&self) {
        let Ok(info) = self.with_gic(|state| state.helper.acknowledge_interrupt()) else {
            return;
        };
        let handler = info.interrupt().raw_id().and_then(|id| {
            critical_section::with(|cs| self.handlers.borrow_ref(cs).handler(id as u16))
        });
        match handler {
            Some(handler) => handler.on_interrupt(),
            None => log::warn!("no handler for interrupt {:?}", info.interrupt()),
        }
        let _ = self.with_gic(|state| state.helper.end_of_interrupt(info));
    }
}

impl InterruptController for ScuGic {
    fn initialize(&self, device_id: u16) -> Result<(), IntcError> {
        let config = lookup_gic_config(self.devices, device_id)
            .ok_or(IntcError::DeviceNotFound(device_id))?;
        // Safety: the addresses come from the device table of the processing system.
        let state = unsafe {
            GicState {
                gic: GicConfigurator::new_with_init(
                    GicCpuInterface::new_mmio_at(config.gicc_base_addr),
                    GicDistributor::new_mmio_at(config.gicd_base_addr),
                ),
                helper: GicInterruptHelper::new_at(config.gicc_base_addr),
            }
        };
        critical_section::with(|cs| *self.state.borrow_ref_mut(cs) = Some(state));
        log::debug!("GIC {} initialized", device_id);
        Ok(())
    }

    fn connect(&self, line: u16, handler: &'static dyn IrqHandler) -> Result<(), IntcError> {
        if !self.is_initialized() {
            return Err(IntcError::NotInitialized);
        }
        // Only lines which can be enabled later are accepted.
        spi_line(line)?;
        critical_section::with(|cs| self.handlers.borrow_ref_mut(cs).register(line, handler))
    }

    fn disconnect(&self, line: u16) -> Result<(), IntcError> {
        critical_section::with(|cs| self.handlers.borrow_ref_mut(cs).unregister(line))
    }

    fn enable(&self, line: u16) -> Result<(), IntcError> {
        let spi = spi_line(line)?;
        self.with_gic(|state| {
            state.gic.set_spi_interrupt_cpu_target(spi, TargetCpu::Cpu0);
            state.gic.enable_spi_interrupt(spi);
        })
    }

    fn disable(&self, line: u16) -> Result<(), IntcError> {
        let spi = spi_line(line)?;
        self.with_gic(|state| state.gic.disable_spi_interrupt(spi))
    }

    fn enable_delivery(&self) -> Result<(), IntcError> {
        self.with_gic(|state| state.gic.enable())
    }
}

/// IRQ exception control of the Cortex-A9 core.
pub struct CortexA9Exceptions;

impl ExceptionControl for CortexA9Exceptions {
    fn register_irq_entry(&mut self, entry: &'static dyn Dispatch) {
        exception::set_irq_entry(entry);
    }

    fn enable_irq(&mut self) {
        // Safety: called once at the end of setup, outside of any critical section.
        unsafe { GicConfigurator::enable_interrupts() };
    }
}
