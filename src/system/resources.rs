//! Hardware Resource Management
//!
//! Groups the board's peripherals by concern so each demo binary can hand
//! them to the right subsystem without fighting over the `Peripherals`
//! struct:
//! - WiFi: the CYW43439 radio pins (PIO-driven SPI on the fixed Pico W pins)
//! - Console: UART0 on GP0/GP1, the serial terminal all demos talk over
//! - Flash: the flash peripheral plus a DMA channel for async access
//! - Watchdog: used by the shell's `reboot` command

use assign_resources::assign_resources;
use embassy_rp::bind_interrupts;
use embassy_rp::peripherals::{self, PIO0, UART0};
use embassy_rp::pio::InterruptHandler as PioInterruptHandler;
use embassy_rp::uart::BufferedInterruptHandler;

assign_resources! {
    /// CYW43439 WiFi radio (fixed wiring on the Pico 2 W)
    wifi: WifiResources {
        pwr_pin: PIN_23,
        cs_pin: PIN_25,
        pio: PIO0,
        dio_pin: PIN_24,
        clk_pin: PIN_29,
        dma: DMA_CH0,
    },
    /// Serial console on UART0
    console: ConsoleResources {
        uart: UART0,
        tx_pin: PIN_0,
        rx_pin: PIN_1,
    },
    /// On-chip flash for the persistent store
    flash: FlashResources {
        flash: FLASH,
        dma: DMA_CH1,
    },
    /// Watchdog, used to reboot from the shell
    watchdog: WatchdogResources {
        watchdog: WATCHDOG,
    },
}

bind_interrupts!(pub struct Irqs {
    PIO0_IRQ_0 => PioInterruptHandler<PIO0>;
    UART0_IRQ => BufferedInterruptHandler<UART0>;
});
