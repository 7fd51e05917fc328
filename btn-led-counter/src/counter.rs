//! Button event counter.
//!
//! Every accepted button interrupt adds the raw button sample to a running total which is then
//! written to the LED channel. The handler masks the button interrupt on entry and only unmasks
//! it again after the pending bit was acknowledged, so invocations never overlap.
use core::cell::RefCell;

use critical_section::Mutex;

use crate::{config::CounterConfig, gpio::GpioPort, intc::IrqHandler};

/// What to do with the button interrupt if the handler runs without its pending bit set.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum SpuriousPolicy {
    /// The button interrupt stays masked. No further button events are delivered.
    #[default]
    LeaveDisabled,
    /// Unmask the button interrupt again before returning.
    Reenable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOutcome {
    Counted { sample: u32, count: u32 },
    /// The button channel had no pending interrupt.
    Spurious,
    /// No GPIO port attached yet.
    Detached,
}

/// Snapshot of the counter and the button interrupt state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Diagnostics {
    pub count: u32,
    pub leds: u32,
    pub pending: u32,
    pub enabled: u32,
}

struct State<G> {
    gpio: Option<G>,
    count: u32,
}

/// Handler context. Intended to live in a `static` so it can be registered as a
/// `&'static dyn IrqHandler`.
pub struct BtnLedCounter<G> {
    config: CounterConfig,
    state: Mutex<RefCell<State<G>>>,
}

impl<G: GpioPort> BtnLedCounter<G> {
    pub const fn new(config: CounterConfig) -> Self {
        Self {
            config,
            state: Mutex::new(RefCell::new(State {
                gpio: None,
                count: 0,
            })),
        }
    }

    #[inline]
    pub const fn config(&self) -> &CounterConfig {
        &self.config
    }

    /// Hand the GPIO port to the handler. Returns the previously attached port.
    pub fn attach(&self, gpio: G) -> Option<G> {
        critical_section::with(|cs| self.state.borrow_ref_mut(cs).gpio.replace(gpio))
    }

    pub fn detach(&self) -> Option<G> {
        critical_section::with(|cs| self.state.borrow_ref_mut(cs).gpio.take())
    }

    /// Run `f` with the attached port. Returns [None] if no port is attached.
    pub fn with_gpio<R>(&self, f: impl FnOnce(&mut G) -> R) -> Option<R> {
        critical_section::with(|cs| self.state.borrow_ref_mut(cs).gpio.as_mut().map(f))
    }

    pub fn count(&self) -> u32 {
        critical_section::with(|cs| self.state.borrow_ref(cs).count)
    }

    pub fn diagnostics(&self) -> Option<Diagnostics> {
        let led_channel = self.config.led_channel;
        let mask = self.config.btn_interrupt_mask;
        critical_section::with(|cs| {
            let mut state = self.state.borrow_ref_mut(cs);
            let count = state.count;
            let gpio = state.gpio.as_mut()?;
            Some(Diagnostics {
                count,
                leds: gpio.read(led_channel),
                pending: gpio.interrupt_status() & mask,
                enabled: gpio.interrupt_enabled() & mask,
            })
        })
    }

    /// Service one button interrupt.
    pub fn handle_event(&self) -> EventOutcome {
        let cfg = &self.config;
        critical_section::with(|cs| {
            let mut state = self.state.borrow_ref_mut(cs);
            let State { gpio, count } = &mut *state;
            let Some(gpio) = gpio.as_mut() else {
                log::warn!("button interrupt without attached GPIO port");
                return EventOutcome::Detached;
            };
            let mask = cfg.btn_interrupt_mask;
            gpio.interrupt_disable(mask);
            if gpio.interrupt_status() & mask != mask {
                log::warn!("spurious button interrupt, policy {:?}", cfg.spurious_policy);
                if cfg.spurious_policy == SpuriousPolicy::Reenable {
                    gpio.interrupt_enable(mask);
                }
                return EventOutcome::Spurious;
            }
            let sample = gpio.read(cfg.btn_channel);
            *count = count.wrapping_add(sample);
            gpio.write(cfg.led_channel, *count);
            gpio.interrupt_clear(mask);
            gpio.interrupt_enable(mask);
            log::trace!("button sample {:#x}, count {}", sample, *count);
            EventOutcome::Counted {
                sample,
                count: *count,
            }
        })
    }
}

impl<G: GpioPort + Send> IrqHandler for BtnLedCounter<G> {
    fn on_interrupt(&self) {
        self.handle_event();
    }
}
