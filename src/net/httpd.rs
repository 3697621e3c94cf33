//! HTTP Server
//!
//! Serves files from the flash file store on port 80. GET only; the path
//! `/` maps to `index.html`. The server can be toggled at runtime from the
//! shell (`localhost` / `stopweb`) without tearing down the task.

use core::fmt::Write as FmtWrite;
use core::sync::atomic::{AtomicBool, Ordering};

use defmt::{info, warn};
use embassy_net::tcp::TcpSocket;
use embassy_net::Stack;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use embassy_time::{with_timeout, Duration};
use embedded_io_async::Write;
use heapless::String;

use crate::system::event::{self, Events};
use crate::system::fs;
use crate::system::log;
use crate::system::state;

/// Listening port
pub const PORT: u16 = 80;

static ENABLED: AtomicBool = AtomicBool::new(false);
static WAKE: Signal<CriticalSectionRawMutex, ()> = Signal::new();

/// Starts accepting connections.
pub fn enable() {
    ENABLED.store(true, Ordering::Relaxed);
    WAKE.signal(());
}

/// Stops accepting connections after the current one finishes.
pub fn disable() {
    ENABLED.store(false, Ordering::Relaxed);
}

/// Whether the server is currently accepting connections.
pub fn is_enabled() -> bool {
    ENABLED.load(Ordering::Relaxed)
}

/// Outcome of parsing an HTTP request line
#[derive(Debug, Clone, Copy, PartialEq, Eq, defmt::Format)]
pub enum Request<'a> {
    /// A well-formed GET with its path
    Get(&'a str),
    /// Well-formed, but not a GET
    BadMethod,
    /// Not a request line at all
    Malformed,
}

/// Parses the first line of an HTTP request.
pub fn parse_request_line(line: &str) -> Request<'_> {
    let mut parts = line.split_whitespace();
    let (method, path) = match (parts.next(), parts.next()) {
        (Some(m), Some(p)) => (m, p),
        _ => return Request::Malformed,
    };
    if !path.starts_with('/') {
        return Request::Malformed;
    }
    if method != "GET" {
        return Request::BadMethod;
    }
    Request::Get(path)
}

/// Maps a request path to a file name in the store.
pub fn resolve_path(path: &str) -> &str {
    match path {
        "/" => "index.html",
        other => other.trim_start_matches('/'),
    }
}

/// Content type by file extension.
pub fn mime_type(name: &str) -> &'static str {
    let ext = name.rsplit('.').next().unwrap_or("");
    match ext {
        "html" | "htm" => "text/html",
        "css" => "text/css",
        "js" => "application/javascript",
        "json" => "application/json",
        "ico" => "image/x-icon",
        "svg" => "image/svg+xml",
        "txt" => "text/plain",
        _ => "application/octet-stream",
    }
}

const NOT_FOUND_BODY: &str = "<html><body><h1>404 Not Found</h1>\
<p>No such file in the flash store.</p></body></html>";

/// Server task. Runs forever; [`enable`] and [`disable`] gate the accept
/// loop.
#[embassy_executor::task]
pub async fn serve(stack: Stack<'static>) {
    state::register_service("httpd").await;
    let mut rx_buffer = [0; 1024];
    let mut tx_buffer = [0; 2048];

    loop {
        if !is_enabled() {
            WAKE.wait().await;
            continue;
        }
        event::send(Events::HttpServerStarted).await;
        info!("httpd listening on port {}", PORT);

        while is_enabled() {
            let mut socket = TcpSocket::new(stack, &mut rx_buffer, &mut tx_buffer);
            socket.set_timeout(Some(Duration::from_secs(10)));

            // Short accept window so a disable is noticed promptly
            match with_timeout(Duration::from_secs(1), socket.accept(PORT)).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    warn!("accept failed: {:?}", e);
                    continue;
                }
                Err(_) => continue,
            }

            handle_connection(&mut socket).await;
            socket.close();
        }

        event::send(Events::HttpServerStopped).await;
        info!("httpd stopped");
    }
}

async fn handle_connection(socket: &mut TcpSocket<'_>) {
    let mut buf = [0u8; 512];
    let n = match socket.read(&mut buf).await {
        Ok(0) => return,
        Ok(n) => n,
        Err(e) => {
            warn!("read failed: {:?}", e);
            return;
        }
    };

    let request = core::str::from_utf8(&buf[..n]).unwrap_or("");
    let line = request.lines().next().unwrap_or("");

    match parse_request_line(line) {
        Request::Get(path) => {
            let name = resolve_path(path);
            match fs::read(name).await {
                Ok(record) => {
                    send_file(socket, mime_type(name), &record.data).await;
                    log::record_fmt(format_args!(
                        "http: served {} ({} bytes)",
                        name,
                        record.data.len()
                    ));
                    event::send(Events::HttpRequestServed).await;
                }
                Err(fs::FsError::NotFound) => {
                    send_error(socket, "404 Not Found", NOT_FOUND_BODY).await;
                    log::record_fmt(format_args!("http: {} not found", name));
                    event::send(Events::HttpRequestServed).await;
                }
                Err(_) => {
                    send_error(socket, "500 Internal Server Error", "flash read failed").await;
                    log::record_fmt(format_args!("http: {} read failed", name));
                }
            }
        }
        Request::BadMethod => {
            send_error(socket, "405 Method Not Allowed", "GET only").await;
        }
        Request::Malformed => {
            send_error(socket, "400 Bad Request", "malformed request").await;
        }
    }
    let _ = socket.flush().await;
}

async fn send_file(socket: &mut TcpSocket<'_>, mime: &str, body: &[u8]) {
    let mut header: String<256> = String::new();
    let _ = write!(
        header,
        "HTTP/1.1 200 OK\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        mime,
        body.len()
    );
    if socket.write_all(header.as_bytes()).await.is_ok() {
        let _ = socket.write_all(body).await;
    }
}

async fn send_error(socket: &mut TcpSocket<'_>, status: &str, body: &str) {
    let mut response: String<512> = String::new();
    let _ = write!(
        response,
        "HTTP/1.1 {}\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        body.len(),
        body
    );
    let _ = socket.write_all(response.as_bytes()).await;
}
