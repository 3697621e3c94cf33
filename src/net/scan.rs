//! TCP Port Scanner
//!
//! Connect scans against hosts on the local network: a port counts as open
//! when a TCP connect succeeds within the probe timeout. Used by the shell's
//! `nmap` command and the standalone scanner demo, which accepts
//! `SCAN <ip> <start>-<end>` commands over TCP.

use defmt::Format;
use embassy_net::tcp::TcpSocket;
use embassy_net::{IpAddress, Ipv4Address, Stack};
use embassy_time::{with_timeout, Duration};

/// Well-known ports probed by the quick scan
pub const COMMON_PORTS: [(u16, &str); 15] = [
    (21, "ftp"),
    (22, "ssh"),
    (23, "telnet"),
    (25, "smtp"),
    (53, "dns"),
    (80, "http"),
    (110, "pop3"),
    (143, "imap"),
    (443, "https"),
    (445, "smb"),
    (3306, "mysql"),
    (3389, "rdp"),
    (5432, "postgresql"),
    (8080, "http-alt"),
    (8443, "https-alt"),
];

/// Service name for a well-known port, or "unknown".
pub fn service_name(port: u16) -> &'static str {
    COMMON_PORTS
        .iter()
        .find(|(p, _)| *p == port)
        .map(|(_, name)| *name)
        .unwrap_or("unknown")
}

/// A parsed scan request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Format)]
pub struct ScanRequest {
    pub target: Ipv4Address,
    pub start_port: u16,
    pub end_port: u16,
}

/// Why a scan command was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Format)]
pub enum ScanParseError {
    /// Line does not start with SCAN
    NotScan,
    /// Missing ip or port-range argument
    MissingArgs,
    /// Target is not a dotted-quad IPv4 address
    BadAddress,
    /// Range is not `<start>-<end>` with 1 <= start <= end <= 65535
    BadRange,
}

/// Parses a dotted-quad IPv4 address.
pub fn parse_ipv4(s: &str) -> Option<Ipv4Address> {
    let mut octets = [0u8; 4];
    let mut count = 0;
    for part in s.split('.') {
        if count == 4 || part.is_empty() || part.len() > 3 {
            return None;
        }
        octets[count] = part.parse().ok()?;
        count += 1;
    }
    if count != 4 {
        return None;
    }
    Some(Ipv4Address::new(octets[0], octets[1], octets[2], octets[3]))
}

/// Parses a `SCAN <ip> <start>-<end>` command line.
pub fn parse_scan_command(line: &str) -> Result<ScanRequest, ScanParseError> {
    let mut parts = line.trim().split_whitespace();
    match parts.next() {
        Some(word) if word.eq_ignore_ascii_case("SCAN") => {}
        _ => return Err(ScanParseError::NotScan),
    }
    let target = parts
        .next()
        .ok_or(ScanParseError::MissingArgs)
        .and_then(|s| parse_ipv4(s).ok_or(ScanParseError::BadAddress))?;
    let range = parts.next().ok_or(ScanParseError::MissingArgs)?;

    let (start, end) = range.split_once('-').ok_or(ScanParseError::BadRange)?;
    let start_port: u16 = start.parse().map_err(|_| ScanParseError::BadRange)?;
    let end_port: u16 = end.parse().map_err(|_| ScanParseError::BadRange)?;
    if start_port == 0 || start_port > end_port {
        return Err(ScanParseError::BadRange);
    }

    Ok(ScanRequest {
        target,
        start_port,
        end_port,
    })
}

/// Probes one port. `true` means a TCP connect succeeded in time.
pub async fn probe(
    stack: Stack<'static>,
    target: Ipv4Address,
    port: u16,
    timeout: Duration,
) -> bool {
    let mut rx_buffer = [0; 64];
    let mut tx_buffer = [0; 64];
    let mut socket = TcpSocket::new(stack, &mut rx_buffer, &mut tx_buffer);

    let open = matches!(
        with_timeout(timeout, socket.connect((IpAddress::Ipv4(target), port))).await,
        Ok(Ok(()))
    );
    if open {
        socket.close();
    }
    open
}
