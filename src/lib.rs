//! Shared runtime for the Pico 2 W demo firmwares.
//!
//! Each binary under `src/bin/` is an independent demo; this library holds
//! the pieces they share: peripheral grouping, WiFi/network bringup, the
//! wall clock, flash persistence, the serial console and the small apps.

#![no_std]

/// System core modules
pub mod system;
/// Network services (NTP, HTTP, port scanning)
pub mod net;
/// Serial console and command shell
pub mod shell;
/// Demo applications (games and utilities)
pub mod apps;
