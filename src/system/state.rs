//! System State Management
//!
//! Single shared snapshot of what the firmware is currently doing. Tasks
//! update it as events come in and the shell reads it for `sysinfo`, `ipa`
//! and `ps`. Guarded by an async mutex so readers never see a half-updated
//! snapshot.

use core::ops::DerefMut;

use defmt::Format;
use embassy_net::Ipv4Address;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::mutex::Mutex;
use embassy_time::Instant;
use heapless::{String, Vec};

/// Global system state protected by a mutex
pub static SYSTEM_STATE: Mutex<CriticalSectionRawMutex, SystemState> =
    Mutex::new(SystemState::new());

/// WiFi link status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Format)]
pub enum WifiStatus {
    /// Radio up, not associated
    Down,
    /// Join in progress
    Joining,
    /// Associated and DHCP complete
    Up,
}

/// A long-running service registered for `ps`
#[derive(Debug, Clone, Format)]
pub struct Service {
    /// Task name as shown by `ps`
    pub name: &'static str,
    /// When the task was spawned
    pub started: Instant,
}

/// Current operational state of the system
#[derive(Debug, Clone, Format)]
pub struct SystemState {
    /// WiFi link status
    pub wifi: WifiStatus,
    /// SSID of the joined network, empty when down
    pub ssid: String<32>,
    /// Address handed out by DHCP, if any
    pub ip: Option<Ipv4Address>,
    /// Whether the wall clock has been set from NTP
    pub time_synced: bool,
    /// Whether the HTTP server is accepting connections
    pub httpd_running: bool,
    /// Requests served since the HTTP server last started
    pub requests_served: u32,
    /// Registered background services
    pub services: Vec<Service, 4>,
}

impl SystemState {
    const fn new() -> Self {
        Self {
            wifi: WifiStatus::Down,
            ssid: String::new(),
            ip: None,
            time_synced: false,
            httpd_running: false,
            requests_served: 0,
            services: Vec::new(),
        }
    }
}

/// Registers a background task so it shows up in `ps`.
pub async fn register_service(name: &'static str) {
    let mut state = SYSTEM_STATE.lock().await;
    let state = state.deref_mut();
    if state.services.iter().any(|s| s.name == name) {
        return;
    }
    let _ = state.services.push(Service {
        name,
        started: Instant::now(),
    });
}
