//! Event System
//!
//! Central channel through which tasks announce state changes. The
//! orchestrator consumes events, updates [`super::state`] and writes the
//! system log.

use defmt::Format;
use embassy_net::Ipv4Address;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;

/// Channel for system-wide events
pub static EVENT_CHANNEL: Channel<CriticalSectionRawMutex, Events, 10> = Channel::new();

/// Waits for the next event. Consumed by the orchestrator only.
pub async fn wait() -> Events {
    EVENT_CHANNEL.receive().await
}

/// Queues an event for the orchestrator.
pub async fn send(event: Events) {
    EVENT_CHANNEL.send(event).await;
}

/// System events announced by the various tasks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Format)]
pub enum Events {
    /// WiFi joined and DHCP finished
    WifiUp(Ipv4Address),
    /// WiFi link lost or left
    WifiDown,
    /// Wall clock set from an NTP response
    TimeSynced,
    /// HTTP server started accepting connections
    HttpServerStarted,
    /// HTTP server stopped
    HttpServerStopped,
    /// HTTP server answered one request
    HttpRequestServed,
}
