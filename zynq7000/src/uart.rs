//! PS UART register module.
//!
//! The console UART is configured by the first stage boot loader. Only the control, status
//! and FIFO registers carry typed layouts, the remaining registers are plain words.

pub const UART_1_BASE: usize = 0xE000_1000;

#[bitbybit::bitfield(u32, debug)]
pub struct Control {
    /// Stop transmitter break.
    #[bit(8, rw)]
    stopbrk: bool,
    /// Start transmitter break.
    #[bit(7, rw)]
    startbrk: bool,
    /// Restart receiver timeout counter.
    #[bit(6, rw)]
    rstto: bool,
    /// TX disable. If this is 1, TX is disabled, regardless of TXEN.
    #[bit(5, rw)]
    tx_dis: bool,
    /// TX enable. TX will be enabled if this bit is 1 and the TXDIS is 0.
    #[bit(4, rw)]
    tx_en: bool,
    /// RX disable. If this is 1, RX is disabled, regardless of RXEN.
    #[bit(3, rw)]
    rx_dis: bool,
    /// RX enable. RX will be enabled if this bit is 1 and the RXDIS is 0.
    #[bit(2, rw)]
    rx_en: bool,
    /// TX soft reset.
    #[bit(1, rw)]
    tx_rst: bool,
    /// RX soft reset.
    #[bit(0, rw)]
    rx_rst: bool,
}

/// Channel status register.
#[bitbybit::bitfield(u32, debug)]
pub struct Status {
    #[bit(14, r)]
    tx_near_full: bool,
    /// Transmitter state machine active.
    #[bit(11, r)]
    tx_active: bool,
    /// Receiver state machine active.
    #[bit(10, r)]
    rx_active: bool,
    #[bit(4, r)]
    tx_full: bool,
    #[bit(3, r)]
    tx_empty: bool,
    #[bit(2, r)]
    rx_full: bool,
    #[bit(1, r)]
    rx_empty: bool,
}

#[bitbybit::bitfield(u32, debug)]
pub struct Fifo {
    #[bits(0..=7, rw)]
    fifo: u8,
}

#[derive(derive_mmio::Mmio)]
#[repr(C)]
pub struct Uart {
    /// Control Register
    cr: Control,
    /// Mode register
    mr: u32,
    /// Interrupt enable register
    #[mmio(Write)]
    ier: u32,
    /// Interrupt disable register
    #[mmio(Write)]
    idr: u32,
    /// Interrupt mask register, showing enabled interrupts.
    #[mmio(PureRead)]
    imr: u32,
    /// Interrupt status register
    #[mmio(PureRead, Write)]
    isr: u32,
    /// Baudgen register
    baudgen: u32,
    /// RX timeout register
    rx_tout: u32,
    /// RX FIFO trigger level register
    rx_fifo_trigger: u32,
    /// Modem control register
    modem_cr: u32,
    /// Modem status register
    modem_sr: u32,
    /// Channel status register
    #[mmio(PureRead)]
    sr: Status,
    /// FIFO register
    #[mmio(Read, Write)]
    fifo: Fifo,
    /// Baud rate divider register
    baud_rate_div: u32,
    /// Flow control delay register
    flow_delay: u32,

    _reserved: [u32; 2],

    /// TX fifo trigger level
    tx_fifo_trigger: u32,
}

static_assertions::const_assert_eq!(core::mem::size_of::<Uart>(), 0x48);

impl Uart {
    /// Create a new UART MMIO instance for uart1 at address 0xE000_1000.
    ///
    /// # Safety
    ///
    /// This API can be used to potentially create a driver to the same peripheral structure
    /// from multiple threads. The user must ensure that concurrent accesses are safe and do not
    /// interfere with each other.
    pub const unsafe fn new_mmio_fixed_1() -> MmioUart<'static> {
        unsafe { Self::new_mmio_at(UART_1_BASE) }
    }
}
