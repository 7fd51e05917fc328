//! Simulated Zybo board for host tests.
//!
//! [SimBoard] models the AXI GPIO register state and records every access in a journal shared
//! with [SimIntc] and [SimExceptions], so tests can check the order of operations across all
//! three capabilities.
extern crate std;

use core::sync::atomic::{AtomicU32, Ordering};
use std::{
    boxed::Box,
    sync::{Arc, Mutex as StdMutex, MutexGuard},
    vec::Vec,
};

use crate::{
    exception::ExceptionControl,
    gpio::{Channel, GpioInitError, GpioPort, GpioProvider},
    intc::{Dispatch, HandlerTable, IntcError, InterruptController, IrqHandler},
};

const LINE: u16 = crate::config::GPIO_INTERRUPT_LINE;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GpioOp {
    SetDirection(Channel, u32),
    Read(Channel),
    Write(Channel, u32),
    InterruptEnable(u32),
    InterruptDisable(u32),
    GlobalEnable,
    GlobalDisable,
    InterruptStatus,
    InterruptEnabled,
    InterruptClear(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardOp {
    GpioInit(u16),
    Gpio(GpioOp),
    IntcInit(u16),
    Connect(u16),
    Disconnect(u16),
    EnableLine(u16),
    DisableLine(u16),
    EnableDelivery,
    Dispatch(u16),
    RegisterIrqEntry,
    EnableIrq,
}

#[derive(Default)]
struct Regs {
    data: [u32; 2],
    tri: [u32; 2],
    ier: u32,
    isr: u32,
    gier: bool,
    journal: Vec<BoardOp>,
}

fn idx(channel: Channel) -> usize {
    channel as usize - 1
}

#[derive(Clone, Default)]
pub struct SimBoard {
    regs: Arc<StdMutex<Regs>>,
}

impl SimBoard {
    pub fn new() -> Self {
        Self::default()
    }

    fn regs(&self) -> MutexGuard<'_, Regs> {
        self.regs.lock().unwrap()
    }

    pub fn record(&self, op: BoardOp) {
        self.regs().journal.push(op);
    }

    pub fn gpio(&self) -> SimGpio {
        SimGpio {
            board: self.clone(),
            on_read: None,
        }
    }

    /// Button state changes and the channel 2 interrupt latches.
    pub fn latch_button(&self, value: u32) {
        let mut regs = self.regs();
        regs.data[1] = value;
        regs.isr |= Channel::Two.interrupt_mask();
    }

    /// Button state changes without an interrupt being latched.
    pub fn set_button(&self, value: u32) {
        self.regs().data[1] = value;
    }

    pub fn latch_channel_one(&self) {
        self.regs().isr |= Channel::One.interrupt_mask();
    }

    pub fn leds(&self) -> u32 {
        self.regs().data[0]
    }

    pub fn direction(&self, channel: Channel) -> u32 {
        self.regs().tri[idx(channel)]
    }

    pub fn pending(&self) -> u32 {
        self.regs().isr
    }

    pub fn enabled(&self) -> u32 {
        self.regs().ier
    }

    pub fn global_enabled(&self) -> bool {
        self.regs().gier
    }

    /// Level of the GPIO interrupt output.
    pub fn irq_asserted(&self) -> bool {
        let regs = self.regs();
        regs.gier && (regs.isr & regs.ier) != 0
    }

    pub fn ops(&self) -> Vec<BoardOp> {
        self.regs().journal.clone()
    }

    /// GPIO accesses only.
    pub fn journal(&self) -> Vec<GpioOp> {
        self.regs()
            .journal
            .iter()
            .filter_map(|op| match op {
                BoardOp::Gpio(op) => Some(*op),
                _ => None,
            })
            .collect()
    }

    pub fn clear_journal(&self) {
        self.regs().journal.clear();
    }
}

type Hook = Arc<dyn Fn() + Send + Sync>;

pub struct SimGpio {
    board: SimBoard,
    on_read: Option<Hook>,
}

impl SimGpio {
    fn access<R>(&mut self, op: GpioOp, f: impl FnOnce(&mut Regs) -> R) -> R {
        let mut regs = self.board.regs();
        regs.journal.push(BoardOp::Gpio(op));
        f(&mut *regs)
    }
}

impl GpioPort for SimGpio {
    fn set_direction(&mut self, channel: Channel, input_mask: u32) {
        self.access(GpioOp::SetDirection(channel, input_mask), |r| {
            r.tri[idx(channel)] = input_mask
        });
    }

    fn read(&mut self, channel: Channel) -> u32 {
        let value = self.access(GpioOp::Read(channel), |r| r.data[idx(channel)]);
        // Runs without the register lock held, the hook may touch the board.
        if let Some(hook) = &self.on_read {
            hook();
        }
        value
    }

    fn write(&mut self, channel: Channel, value: u32) {
        self.access(GpioOp::Write(channel, value), |r| r.data[idx(channel)] = value);
    }

    fn interrupt_enable(&mut self, mask: u32) {
        self.access(GpioOp::InterruptEnable(mask), |r| r.ier |= mask);
    }

    fn interrupt_disable(&mut self, mask: u32) {
        self.access(GpioOp::InterruptDisable(mask), |r| r.ier &= !mask);
    }

    fn interrupt_global_enable(&mut self) {
        self.access(GpioOp::GlobalEnable, |r| r.gier = true);
    }

    fn interrupt_global_disable(&mut self) {
        self.access(GpioOp::GlobalDisable, |r| r.gier = false);
    }

    fn interrupt_status(&mut self) -> u32 {
        self.access(GpioOp::InterruptStatus, |r| r.isr)
    }

    fn interrupt_enabled(&mut self) -> u32 {
        self.access(GpioOp::InterruptEnabled, |r| r.ier)
    }

    fn interrupt_clear(&mut self, mask: u32) {
        self.access(GpioOp::InterruptClear(mask), |r| r.isr &= !mask);
    }
}

pub struct SimProvider {
    board: SimBoard,
    fail: Option<GpioInitError>,
    on_read: Option<Hook>,
}

impl SimProvider {
    pub fn new(board: &SimBoard) -> Self {
        Self {
            board: board.clone(),
            fail: None,
            on_read: None,
        }
    }

    pub fn failing(board: &SimBoard, error: GpioInitError) -> Self {
        Self {
            fail: Some(error),
            ..Self::new(board)
        }
    }

    /// Run `hook` right after every data read of the provided port.
    pub fn with_read_hook(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_read = Some(Arc::new(hook));
        self
    }
}

impl GpioProvider for SimProvider {
    type Port = SimGpio;

    fn initialize(&mut self, device_id: u16) -> Result<SimGpio, GpioInitError> {
        self.board.record(BoardOp::GpioInit(device_id));
        if let Some(error) = self.fail {
            return Err(error);
        }
        if device_id != crate::config::GPIO_DEVICE_ID {
            return Err(GpioInitError::DeviceNotFound(device_id));
        }
        Ok(SimGpio {
            board: self.board.clone(),
            on_read: self.on_read.clone(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntcStep {
    Init,
    Connect,
    Enable,
    Delivery,
}

#[derive(Default)]
struct IntcState {
    initialized: bool,
    delivery: bool,
    enabled_lines: Vec<u16>,
    table: HandlerTable,
}

/// Interrupt controller with one level sensitive line wired to the simulated GPIO output.
pub struct SimIntc {
    board: SimBoard,
    fail: Option<(IntcStep, IntcError)>,
    state: StdMutex<IntcState>,
    depth: AtomicU32,
    max_depth: AtomicU32,
    dispatched: AtomicU32,
}

impl SimIntc {
    pub fn new(board: &SimBoard) -> &'static Self {
        Self::build(board, None)
    }

    pub fn failing_at(board: &SimBoard, step: IntcStep, error: IntcError) -> &'static Self {
        Self::build(board, Some((step, error)))
    }

    fn build(board: &SimBoard, fail: Option<(IntcStep, IntcError)>) -> &'static Self {
        Box::leak(Box::new(Self {
            board: board.clone(),
            fail,
            state: StdMutex::new(IntcState::default()),
            depth: AtomicU32::new(0),
            max_depth: AtomicU32::new(0),
            dispatched: AtomicU32::new(0),
        }))
    }

    fn check(&self, step: IntcStep) -> Result<(), IntcError> {
        match self.fail {
            Some((fail_step, error)) if fail_step == step => Err(error),
            _ => Ok(()),
        }
    }

    fn state(&self) -> MutexGuard<'_, IntcState> {
        self.state.lock().unwrap()
    }

    /// Whether the CPU would see a pending IRQ right now.
    pub fn irq_pending(&self) -> bool {
        let state = self.state();
        state.delivery && state.enabled_lines.contains(&LINE) && self.board.irq_asserted()
    }

    pub fn is_connected(&self, line: u16) -> bool {
        self.state().table.is_connected(line)
    }

    pub fn is_line_enabled(&self, line: u16) -> bool {
        self.state().enabled_lines.contains(&line)
    }

    /// Run the handler of `line` regardless of the line state.
    pub fn invoke_handler(&self, line: u16) {
        let handler = self.state().table.handler(line);
        if let Some(handler) = handler {
            self.run(line, handler);
        }
    }

    fn run(&self, line: u16, handler: &'static dyn IrqHandler) {
        self.board.record(BoardOp::Dispatch(line));
        self.dispatched.fetch_add(1, Ordering::SeqCst);
        let depth = self.depth.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_depth.fetch_max(depth, Ordering::SeqCst);
        handler.on_interrupt();
        self.depth.fetch_sub(1, Ordering::SeqCst);
    }

    pub fn max_depth(&self) -> u32 {
        self.max_depth.load(Ordering::SeqCst)
    }

    pub fn dispatched(&self) -> u32 {
        self.dispatched.load(Ordering::SeqCst)
    }
}

impl Dispatch for SimIntc {
    fn dispatch(&self) {
        if !self.irq_pending() {
            // Spurious, nothing to acknowledge.
            return;
        }
        let handler = self.state().table.handler(LINE);
        if let Some(handler) = handler {
            self.run(LINE, handler);
        }
    }
}

impl InterruptController for SimIntc {
    fn initialize(&self, device_id: u16) -> Result<(), IntcError> {
        self.board.record(BoardOp::IntcInit(device_id));
        self.check(IntcStep::Init)?;
        self.state().initialized = true;
        Ok(())
    }

    fn connect(&self, line: u16, handler: &'static dyn IrqHandler) -> Result<(), IntcError> {
        self.board.record(BoardOp::Connect(line));
        self.check(IntcStep::Connect)?;
        let mut state = self.state();
        if !state.initialized {
            return Err(IntcError::NotInitialized);
        }
        state.table.register(line, handler)
    }

    fn disconnect(&self, line: u16) -> Result<(), IntcError> {
        self.board.record(BoardOp::Disconnect(line));
        self.state().table.unregister(line)
    }

    fn enable(&self, line: u16) -> Result<(), IntcError> {
        self.board.record(BoardOp::EnableLine(line));
        self.check(IntcStep::Enable)?;
        let mut state = self.state();
        if !state.enabled_lines.contains(&line) {
            state.enabled_lines.push(line);
        }
        Ok(())
    }

    fn disable(&self, line: u16) -> Result<(), IntcError> {
        self.board.record(BoardOp::DisableLine(line));
        self.state().enabled_lines.retain(|l| *l != line);
        Ok(())
    }

    fn enable_delivery(&self) -> Result<(), IntcError> {
        self.board.record(BoardOp::EnableDelivery);
        self.check(IntcStep::Delivery)?;
        self.state().delivery = true;
        Ok(())
    }
}

/// Processor exception state. Keeps the IRQ entry local so parallel tests do not share it.
pub struct SimExceptions {
    board: SimBoard,
    entry: Option<&'static dyn Dispatch>,
    irq_enabled: bool,
}

impl SimExceptions {
    pub fn new(board: &SimBoard) -> Self {
        Self {
            board: board.clone(),
            entry: None,
            irq_enabled: false,
        }
    }

    pub fn irq_enabled(&self) -> bool {
        self.irq_enabled
    }

    pub fn has_entry(&self) -> bool {
        self.entry.is_some()
    }

    /// Take the IRQ exception if IRQs are unmasked. Returns whether the entry ran.
    pub fn take_irq(&self) -> bool {
        match self.entry {
            Some(entry) if self.irq_enabled => {
                entry.dispatch();
                true
            }
            _ => false,
        }
    }
}

impl ExceptionControl for SimExceptions {
    fn register_irq_entry(&mut self, entry: &'static dyn Dispatch) {
        self.board.record(BoardOp::RegisterIrqEntry);
        self.entry = Some(entry);
    }

    fn enable_irq(&mut self) {
        self.board.record(BoardOp::EnableIrq);
        self.irq_enabled = true;
    }
}
