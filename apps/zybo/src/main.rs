//! Button/LED counter for the Zybo board.
//!
//! Every press of the buttons on channel 2 of `axi_gpio_0` adds the button value to a counter
//! which is shown on the LEDs of channel 1. Logging goes to UART1, which was configured by the
//! FSBL.
#![no_std]
#![no_main]

use core::panic::PanicInfo;

use btn_led_counter::{
    BtnLedCounter, CounterConfig, config, exception,
    zynq::{AxiGpioProvider, CortexA9Exceptions, ScuGic},
};
use cortex_ar::asm::{nop, wfi};
use embedded_io::Write;
use log::{error, info};
use zynq7000_hal::{axi_gpio::AxiGpio, gic::GicInterruptHelper, uart::UartTx};

use zynq7000_rt as _;

static COUNTER: BtnLedCounter<AxiGpio> = BtnLedCounter::new(CounterConfig::ZYBO);
static GIC: ScuGic = ScuGic::new(config::GIC_DEVICES);

/// Entry point (not called like a normal main function)
#[unsafe(no_mangle)]
pub extern "C" fn boot_core(cpu_id: u32) -> ! {
    if cpu_id != 0 {
        panic!("unexpected CPU ID {}", cpu_id);
    }
    main();
}

#[unsafe(export_name = "main")]
pub fn main() -> ! {
    // The GIC register blocks are owned by the controller instance, only the UART is used
    // from here.
    let Some(dp) = zynq7000::PsPeripherals::take() else {
        halt();
    };
    let mut uart = UartTx::new_preconfigured(dp.uart_1);
    uart.write_all(b"-- Zybo button/LED counter --\n\r").ok();
    zynq7000_hal::log::uart_blocking::init_with_locks(uart, log::LevelFilter::Info);

    let mut gpio = AxiGpioProvider::new(config::AXI_GPIO_DEVICES);
    if let Err(e) = btn_led_counter::setup(&COUNTER, &mut gpio, &GIC, &mut CortexA9Exceptions) {
        error!("setup failed: {e} (status {})", e.status_code());
        zynq7000_hal::log::uart_blocking::flush();
        halt();
    }

    let mut last_count = 0;
    loop {
        wfi();
        if let Some(diag) = COUNTER.diagnostics()
            && diag.count != last_count
        {
            last_count = diag.count;
            info!("count: {} (leds {:#04x})", diag.count, diag.leds);
        }
    }
}

fn halt() -> ! {
    loop {
        nop();
    }
}

#[unsafe(no_mangle)]
pub extern "C" fn _irq_handler() {
    if !exception::on_irq() {
        // Setup did not get far enough to install the controller. Complete the interrupt so
        // the CPU interface is not left waiting.
        let mut gic_helper = GicInterruptHelper::new();
        let irq_info = gic_helper.acknowledge_interrupt();
        gic_helper.end_of_interrupt(irq_info);
    }
}

#[unsafe(no_mangle)]
pub extern "C" fn _abort_handler() {
    halt();
}

#[unsafe(no_mangle)]
pub extern "C" fn _undefined_handler() {
    halt();
}

#[unsafe(no_mangle)]
pub extern "C" fn _prefetch_handler() {
    halt();
}

/// Panic handler
#[panic_handler]
fn panic(info: &PanicInfo) -> ! {
    error!("Panic: {info:?}");
    loop {}
}
