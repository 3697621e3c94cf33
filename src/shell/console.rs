//! Serial Console
//!
//! Line-oriented terminal over UART0. Wraps the buffered uart halves with
//! formatted printing, line editing (backspace, optional masking for
//! passwords) and single-key polling for the games.

use core::fmt;
use core::fmt::Write as FmtWrite;

use embassy_rp::uart::{BufferedUart, BufferedUartRx, BufferedUartTx, Config as UartConfig};
use embassy_time::{with_timeout, Duration};
use embedded_io_async::{Read, Write};
use heapless::String;
use static_cell::StaticCell;

use crate::system::resources::{ConsoleResources, Irqs};

/// ANSI escape sequences used by the shell and the games
pub mod ansi {
    pub const CLEAR: &str = "\x1b[2J\x1b[H";
    pub const HOME: &str = "\x1b[H";
    pub const HIDE_CURSOR: &str = "\x1b[?25l";
    pub const SHOW_CURSOR: &str = "\x1b[?25h";
    pub const RESET: &str = "\x1b[0m";
    pub const BOLD: &str = "\x1b[1m";
    pub const RED: &str = "\x1b[31m";
    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const CYAN: &str = "\x1b[36m";
}

/// The serial terminal
pub struct Console {
    tx: BufferedUartTx,
    rx: BufferedUartRx,
}

impl Console {
    /// Brings up UART0 at 115200 baud.
    pub fn new(r: ConsoleResources) -> Self {
        static TX_BUF: StaticCell<[u8; 256]> = StaticCell::new();
        static RX_BUF: StaticCell<[u8; 256]> = StaticCell::new();
        let uart = BufferedUart::new(
            r.uart,
            r.tx_pin,
            r.rx_pin,
            Irqs,
            TX_BUF.init([0; 256]),
            RX_BUF.init([0; 256]),
            UartConfig::default(),
        );
        let (tx, rx) = uart.split();
        Self { tx, rx }
    }

    /// Writes a string as-is.
    pub async fn write(&mut self, s: &str) {
        let _ = self.tx.write_all(s.as_bytes()).await;
    }

    /// Writes formatted text. Output longer than the scratch buffer is
    /// truncated.
    pub async fn print(&mut self, args: fmt::Arguments<'_>) {
        let mut buf: String<512> = String::new();
        let _ = buf.write_fmt(args);
        self.write(&buf).await;
    }

    /// Writes formatted text followed by CRLF.
    pub async fn println(&mut self, args: fmt::Arguments<'_>) {
        self.print(args).await;
        self.write("\r\n").await;
    }

    /// Clears the terminal and homes the cursor.
    pub async fn clear_screen(&mut self) {
        self.write(ansi::CLEAR).await;
    }

    /// Blocks until a key arrives.
    pub async fn read_key(&mut self) -> u8 {
        let mut byte = [0u8; 1];
        loop {
            match self.rx.read(&mut byte).await {
                Ok(1..) => return byte[0],
                _ => continue,
            }
        }
    }

    /// Waits up to `timeout` for a key.
    pub async fn poll_key(&mut self, timeout: Duration) -> Option<u8> {
        match with_timeout(timeout, self.read_key()).await {
            Ok(key) => Some(key),
            Err(_) => None,
        }
    }

    /// Reads one line with editing. Backspace works; when `masked`, input
    /// echoes as `*`. Input beyond the capacity is dropped.
    pub async fn read_line<const N: usize>(&mut self, masked: bool) -> String<N> {
        let mut line: String<N> = String::new();
        loop {
            let key = self.read_key().await;
            match key {
                b'\r' | b'\n' => {
                    self.write("\r\n").await;
                    return line;
                }
                0x08 | 0x7f => {
                    if line.pop().is_some() {
                        self.write("\x08 \x08").await;
                    }
                }
                0x20..=0x7e => {
                    if line.push(key as char).is_ok() {
                        if masked {
                            self.write("*").await;
                        } else {
                            let _ = self.tx.write_all(&[key]).await;
                        }
                    }
                }
                _ => {}
            }
        }
    }
}

/// Formatted print to a [`Console`], usable only in async context.
#[macro_export]
macro_rules! cprint {
    ($console:expr, $($arg:tt)*) => {
        $console.print(::core::format_args!($($arg)*)).await
    };
}

/// Formatted line print to a [`Console`], usable only in async context.
#[macro_export]
macro_rules! cprintln {
    ($console:expr) => {
        $console.write("\r\n").await
    };
    ($console:expr, $($arg:tt)*) => {
        $console.println(::core::format_args!($($arg)*)).await
    };
}
