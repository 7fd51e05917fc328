//! # Console UART transmitter
//!
//! Transmit-only driver for a PS UART which was already configured by the first stage boot
//! loader or the `ps7_init` script (baud rate, character format and MIO routing). This is the
//! same contract the vendor standalone BSP relies on for its console output.
use core::convert::Infallible;

use zynq7000::uart::{Fifo, MmioUart};

pub struct UartTx {
    regs: MmioUart<'static>,
}

// Safety: the driver is the only owner of its register block.
unsafe impl Send for UartTx {}

impl UartTx {
    /// Take over a pre-configured UART and make sure its transmitter is enabled.
    pub fn new_preconfigured(mut regs: MmioUart<'static>) -> Self {
        regs.modify_cr(|mut val| {
            val.set_tx_en(true);
            val.set_tx_dis(false);
            val
        });
        Self { regs }
    }

    #[inline]
    pub const fn regs(&mut self) -> &mut MmioUart<'static> {
        &mut self.regs
    }

    #[inline]
    pub fn write_fifo(&mut self, word: u8) -> nb::Result<(), Infallible> {
        if self.regs.read_sr().tx_full() {
            return Err(nb::Error::WouldBlock);
        }
        self.write_fifo_unchecked(word);
        Ok(())
    }

    #[inline]
    pub fn write_fifo_unchecked(&mut self, word: u8) {
        self.regs.write_fifo(Fifo::new_with_raw_value(word as u32));
    }

    /// Blocks until the TX FIFO is drained.
    pub fn flush(&mut self) {
        while !self.regs.read_sr().tx_empty() {}
    }
}

impl embedded_io::ErrorType for UartTx {
    type Error = Infallible;
}

impl embedded_io::Write for UartTx {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        if buf.is_empty() {
            return Ok(0);
        }
        // Block for the first byte only, then write as much as fits into the FIFO.
        nb::block!(self.write_fifo(buf[0]))?;
        let mut written = 1;
        for &byte in &buf[1..] {
            if self.write_fifo(byte).is_err() {
                break;
            }
            written += 1;
        }
        Ok(written)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        UartTx::flush(self);
        Ok(())
    }
}

impl core::fmt::Write for UartTx {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        for &byte in s.as_bytes() {
            nb::block!(self.write_fifo(byte)).map_err(|_| core::fmt::Error)?;
        }
        Ok(())
    }
}
