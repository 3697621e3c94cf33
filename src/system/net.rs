//! WiFi and Network Bringup
//!
//! Owns the CYW43439 radio and the embassy-net stack. [`start`] powers the
//! radio, spawns the driver and net tasks and returns the stack plus the
//! radio control handle; [`join`] associates with an access point and waits
//! for DHCP, blinking the onboard LED to show progress.

use cyw43::{Control, JoinOptions};
use cyw43_firmware::{CYW43_43439A0, CYW43_43439A0_CLM};
use cyw43_pio::{PioSpi, RM2_CLOCK_DIVIDER};
use defmt::{info, warn, Format};
use embassy_executor::Spawner;
use embassy_net::{Config, Ipv4Address, Stack, StackResources};
use embassy_rp::gpio::{Level, Output};
use embassy_rp::peripherals::{DMA_CH0, PIO0};
use embassy_rp::pio::Pio;
use embassy_time::{Duration, Timer};
use nanorand::{Rng, WyRand};
use static_cell::StaticCell;

use crate::system::event::{self, Events};
use crate::system::resources::{Irqs, WifiResources};
use crate::system::state::{WifiStatus, SYSTEM_STATE};

/// Errors from [`join`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Format)]
pub enum JoinError {
    /// Association or authentication failed
    Join,
    /// Associated but DHCP never completed
    Dhcp,
}

#[embassy_executor::task]
async fn cyw43_task(
    runner: cyw43::Runner<'static, Output<'static>, PioSpi<'static, PIO0, 0, DMA_CH0>>,
) -> ! {
    runner.run().await
}

#[embassy_executor::task]
async fn net_task(mut runner: embassy_net::Runner<'static, cyw43::NetDriver<'static>>) -> ! {
    runner.run().await
}

/// Powers the radio and brings up the network stack with DHCP.
pub async fn start(r: WifiResources, spawner: Spawner) -> (Stack<'static>, Control<'static>) {
    let pwr = Output::new(r.pwr_pin, Level::Low);
    let cs = Output::new(r.cs_pin, Level::High);
    let mut pio = Pio::new(r.pio, Irqs);
    let spi = PioSpi::new(
        &mut pio.common,
        pio.sm0,
        RM2_CLOCK_DIVIDER,
        pio.irq0,
        cs,
        r.dio_pin,
        r.clk_pin,
        r.dma,
    );

    static STATE: StaticCell<cyw43::State> = StaticCell::new();
    let state = STATE.init(cyw43::State::new());
    let (net_device, mut control, runner) = cyw43::new(state, pwr, spi, CYW43_43439A0).await;
    spawner.spawn(cyw43_task(runner)).unwrap();

    control.init(CYW43_43439A0_CLM).await;
    control
        .set_power_management(cyw43::PowerManagementMode::PowerSave)
        .await;

    let config = Config::dhcpv4(Default::default());
    let mut rng = WyRand::new_seed(embassy_time::Instant::now().as_ticks());
    let seed = rng.generate::<u64>();

    static RESOURCES: StaticCell<StackResources<8>> = StaticCell::new();
    let (stack, runner) = embassy_net::new(
        net_device,
        config,
        RESOURCES.init(StackResources::new()),
        seed,
    );
    spawner.spawn(net_task(runner)).unwrap();

    (stack, control)
}

/// Joins the given access point and waits for a DHCP lease.
///
/// Blink codes on the onboard LED: slow double blink while connecting,
/// fast five blinks on success, slow triple blink on failure.
pub async fn join(
    control: &mut Control<'static>,
    stack: Stack<'static>,
    ssid: &str,
    password: &str,
) -> Result<Ipv4Address, JoinError> {
    info!("joining {}", ssid);
    {
        let mut state = SYSTEM_STATE.lock().await;
        state.wifi = WifiStatus::Joining;
        state.ssid.clear();
        let _ = state.ssid.push_str(ssid);
    }
    let mut attempts = 0u8;
    loop {
        blink(control, 2, 300, 300).await;
        match control
            .join(ssid, JoinOptions::new(password.as_bytes()))
            .await
        {
            Ok(()) => break,
            Err(err) => {
                attempts += 1;
                warn!("join failed, status {}", err.status);
                if attempts >= 3 {
                    blink(control, 3, 500, 500).await;
                    SYSTEM_STATE.lock().await.wifi = WifiStatus::Down;
                    return Err(JoinError::Join);
                }
            }
        }
    }

    info!("associated, waiting for DHCP");
    let mut waited_ms: u32 = 0;
    let ip = loop {
        if let Some(config) = stack.config_v4() {
            break config.address.address();
        }
        if waited_ms >= 15_000 {
            blink(control, 3, 500, 500).await;
            SYSTEM_STATE.lock().await.wifi = WifiStatus::Down;
            return Err(JoinError::Dhcp);
        }
        Timer::after_millis(100).await;
        waited_ms += 100;
    };

    blink(control, 5, 80, 80).await;
    event::send(Events::WifiUp(ip)).await;
    Ok(ip)
}

/// Blinks the onboard LED, which hangs off the radio chip.
pub async fn blink(control: &mut Control<'static>, times: u8, on_ms: u64, off_ms: u64) {
    for _ in 0..times {
        control.gpio_set(0, true).await;
        Timer::after(Duration::from_millis(on_ms)).await;
        control.gpio_set(0, false).await;
        Timer::after(Duration::from_millis(off_ms)).await;
    }
}
