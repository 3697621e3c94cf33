//! NTP Client
//!
//! Minimal SNTP: one 48-byte request to `pool.ntp.org`, read the transmit
//! timestamp out of the reply, anchor the wall clock. [`sync_task`] repeats
//! this hourly and can be kicked early (after joining a network or from the
//! settings menu).

use defmt::{info, warn, Format};
use embassy_futures::select::{select, Either};
use embassy_net::dns::DnsQueryType;
use embassy_net::udp::{PacketMetadata, UdpSocket};
use embassy_net::{IpAddress, Stack};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use embassy_time::{with_timeout, Duration, Timer};

use crate::system::clock::{self, NTP_UNIX_DELTA};
use crate::system::event::{self, Events};
use crate::system::state;

/// NTP pool hostname
pub const NTP_SERVER: &str = "pool.ntp.org";

/// Seconds between periodic syncs
const SYNC_INTERVAL_SECS: u64 = 3600;

/// Wakes [`sync_task`] for an immediate sync.
pub static NTP_KICK: Signal<CriticalSectionRawMutex, ()> = Signal::new();

/// Errors from a single NTP exchange
#[derive(Debug, Clone, Copy, PartialEq, Eq, Format)]
pub enum NtpError {
    /// Hostname did not resolve
    Dns,
    /// Socket bind or send failed
    Send,
    /// No reply within the timeout
    Timeout,
    /// Reply too short or malformed
    BadPacket,
}

/// Builds a client request packet: version 3, mode 3, everything else zero.
pub fn build_request() -> [u8; 48] {
    let mut packet = [0u8; 48];
    packet[0] = 0x1b;
    packet
}

/// Extracts the transmit timestamp (seconds since 1900) from a reply.
pub fn parse_transmit_secs(packet: &[u8]) -> Option<u32> {
    if packet.len() < 48 {
        return None;
    }
    let secs = u32::from_be_bytes([packet[40], packet[41], packet[42], packet[43]]);
    if secs == 0 {
        return None;
    }
    Some(secs)
}

/// Performs one NTP exchange and returns the current unix time.
pub async fn query(stack: Stack<'static>) -> Result<i64, NtpError> {
    let addrs = stack
        .dns_query(NTP_SERVER, DnsQueryType::A)
        .await
        .map_err(|_| NtpError::Dns)?;
    let addr: IpAddress = *addrs.first().ok_or(NtpError::Dns)?;

    let mut rx_meta = [PacketMetadata::EMPTY; 4];
    let mut rx_buffer = [0; 128];
    let mut tx_meta = [PacketMetadata::EMPTY; 4];
    let mut tx_buffer = [0; 128];
    let mut socket = UdpSocket::new(
        stack,
        &mut rx_meta,
        &mut rx_buffer,
        &mut tx_meta,
        &mut tx_buffer,
    );
    socket.bind(12345).map_err(|_| NtpError::Send)?;

    let request = build_request();
    let mut reply = [0u8; 48];

    // One retry; pool servers drop the odd packet
    for _ in 0..2 {
        socket
            .send_to(&request, (addr, 123))
            .await
            .map_err(|_| NtpError::Send)?;

        match with_timeout(Duration::from_secs(2), socket.recv_from(&mut reply)).await {
            Ok(Ok((n, _))) => {
                let secs = parse_transmit_secs(&reply[..n]).ok_or(NtpError::BadPacket)?;
                return Ok(secs as i64 - NTP_UNIX_DELTA as i64);
            }
            Ok(Err(_)) => return Err(NtpError::BadPacket),
            Err(_) => continue,
        }
    }
    Err(NtpError::Timeout)
}

/// Syncs the wall clock now, returning whether it succeeded.
pub async fn sync_now(stack: Stack<'static>) -> Result<(), NtpError> {
    let unix = query(stack).await?;
    clock::set_unix_time(unix);
    event::send(Events::TimeSynced).await;
    Ok(())
}

/// Background task: sync on start, then hourly or whenever kicked.
#[embassy_executor::task]
pub async fn sync_task(stack: Stack<'static>) {
    state::register_service("ntp-sync").await;
    loop {
        if stack.config_v4().is_some() {
            match sync_now(stack).await {
                Ok(()) => info!("ntp sync ok"),
                Err(e) => warn!("ntp sync failed: {}", e),
            }
        }
        match select(
            Timer::after(Duration::from_secs(SYNC_INTERVAL_SECS)),
            NTP_KICK.wait(),
        )
        .await
        {
            Either::First(_) => {}
            Either::Second(_) => info!("ntp sync requested"),
        }
    }
}
