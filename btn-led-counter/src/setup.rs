//! One-shot bring-up of the GPIO port, the interrupt controller and the processor IRQ path.
use crate::{
    counter::BtnLedCounter,
    exception::ExceptionControl,
    gpio::{GpioInitError, GpioPort, GpioProvider},
    intc::{IntcError, InterruptController},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SetupError {
    #[error("GPIO initialization failed: {0}")]
    GpioInit(GpioInitError),
    #[error("interrupt controller initialization failed: {0}")]
    IntcInit(IntcError),
    #[error("connecting the button handler failed: {0}")]
    Connect(IntcError),
    #[error("enabling the GPIO interrupt line failed: {0}")]
    EnableLine(IntcError),
    #[error("enabling interrupt delivery failed: {0}")]
    EnableDelivery(IntcError),
}

impl SetupError {
    /// Non-zero exit status, the number of the setup step that failed.
    pub const fn status_code(&self) -> i32 {
        match self {
            SetupError::GpioInit(_) => 1,
            SetupError::IntcInit(_) => 4,
            SetupError::Connect(_) => 5,
            SetupError::EnableLine(_) => 8,
            SetupError::EnableDelivery(_) => 9,
        }
    }
}

/// Bring up the button counter.
///
/// The first failing step aborts the sequence. Steps which already ran are not rolled back.
/// No interrupt can reach the handler before the controller delivers interrupts and the
/// processor has IRQs unmasked, which are the final two actions.
pub fn setup<G, P, I, E>(
    ctx: &'static BtnLedCounter<G>,
    gpio: &mut P,
    intc: &'static I,
    exceptions: &mut E,
) -> Result<(), SetupError>
where
    G: GpioPort + Send + 'static,
    P: GpioProvider<Port = G>,
    I: InterruptController + 'static,
    E: ExceptionControl,
{
    let cfg = *ctx.config();

    let mut port = gpio
        .initialize(cfg.gpio_device_id)
        .map_err(SetupError::GpioInit)?;
    port.set_direction(cfg.led_channel, cfg.led_direction_mask);
    port.set_direction(cfg.btn_channel, cfg.btn_direction_mask);
    if ctx.attach(port).is_some() {
        log::warn!("replaced previously attached GPIO port");
    }
    log::debug!("GPIO device {} initialized", cfg.gpio_device_id);

    intc.initialize(cfg.intc_device_id).map_err(SetupError::IntcInit)?;
    intc.connect(cfg.interrupt_line, ctx).map_err(SetupError::Connect)?;
    log::debug!("button handler connected to line {}", cfg.interrupt_line);

    ctx.with_gpio(|port| {
        port.interrupt_enable(cfg.btn_interrupt_mask);
        port.interrupt_global_enable();
    });

    intc.enable(cfg.interrupt_line).map_err(SetupError::EnableLine)?;
    intc.enable_delivery().map_err(SetupError::EnableDelivery)?;
    exceptions.register_irq_entry(intc);
    exceptions.enable_irq();
    log::info!("button counter running on line {}", cfg.interrupt_line);
    Ok(())
}
