//! Interrupt controller capability and the line to handler table.
//!
//! Handlers are registered as `&'static dyn IrqHandler` keyed by their line identifier. The
//! controller's [Dispatch] implementation is what the processor IRQ entry ends up calling.
use core::fmt;

/// Number of interrupt lines a [HandlerTable] can hold.
pub const MAX_LINES: usize = zynq7000_hal::gic::NUM_OF_INTERRUPTS;

/// Callback invoked in interrupt context when its line asserts. Must not block.
pub trait IrqHandler: Sync {
    fn on_interrupt(&self);
}

/// Top-level interrupt entry: acknowledge the pending interrupt, run the handler registered
/// for its line and signal the end of the interrupt.
pub trait Dispatch: Sync {
    fn dispatch(&self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum IntcError {
    #[error("interrupt controller {0} not found")]
    DeviceNotFound(u16),
    #[error("interrupt controller is not initialized")]
    NotInitialized,
    #[error("invalid interrupt line {0}")]
    InvalidLine(u16),
    #[error("interrupt line {0} already has a handler")]
    LineInUse(u16),
}

pub trait InterruptController: Dispatch {
    fn initialize(&self, device_id: u16) -> Result<(), IntcError>;

    /// Register `handler` for `line`. A line can only have one handler.
    fn connect(&self, line: u16, handler: &'static dyn IrqHandler) -> Result<(), IntcError>;

    fn disconnect(&self, line: u16) -> Result<(), IntcError>;

    /// Forward assertions of `line` to the CPU.
    fn enable(&self, line: u16) -> Result<(), IntcError>;

    fn disable(&self, line: u16) -> Result<(), IntcError>;

    /// Start distributing interrupts to the CPU interface.
    fn enable_delivery(&self) -> Result<(), IntcError>;
}

pub struct HandlerTable {
    slots: [Option<&'static dyn IrqHandler>; MAX_LINES],
}

impl HandlerTable {
    pub const fn new() -> Self {
        Self {
            slots: [None; MAX_LINES],
        }
    }

    pub fn register(
        &mut self,
        line: u16,
        handler: &'static dyn IrqHandler,
    ) -> Result<(), IntcError> {
        let slot = self
            .slots
            .get_mut(line as usize)
            .ok_or(IntcError::InvalidLine(line))?;
        if slot.is_some() {
            return Err(IntcError::LineInUse(line));
        }
        *slot = Some(handler);
        Ok(())
    }

    /// Remove the handler of a line. Removing from an empty line is not an error.
    pub fn unregister(&mut self, line: u16) -> Result<(), IntcError> {
        let slot = self
            .slots
            .get_mut(line as usize)
            .ok_or(IntcError::InvalidLine(line))?;
        *slot = None;
        Ok(())
    }

    pub fn handler(&self, line: u16) -> Option<&'static dyn IrqHandler> {
        self.slots.get(line as usize).copied().flatten()
    }

    pub fn is_connected(&self, line: u16) -> bool {
        self.handler(line).is_some()
    }

    pub fn connected_lines(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }
}

impl Default for HandlerTable {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for HandlerTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerTable")
            .field("connected_lines", &self.connected_lines())
            .finish()
    }
}
