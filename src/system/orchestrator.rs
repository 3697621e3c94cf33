//! Orchestrator
//!
//! Consumes events from [`super::event`], folds them into the shared
//! [`super::state`] and records each transition in the system log. Keeping
//! all state mutation here means the other tasks only ever announce what
//! happened.

use core::fmt::Write;
use core::ops::DerefMut;

use heapless::String;

use crate::system::clock;
use crate::system::event::{wait, Events};
use crate::system::log;
use crate::system::state::{WifiStatus, SYSTEM_STATE};

#[embassy_executor::task]
pub async fn orchestrate() {
    loop {
        let event = wait().await;
        process_event(event).await;
    }
}

async fn process_event(event: Events) {
    let mut state = SYSTEM_STATE.lock().await;
    let state = state.deref_mut();

    match event {
        Events::WifiUp(ip) => {
            state.wifi = WifiStatus::Up;
            state.ip = Some(ip);
            let mut line: String<96> = String::new();
            let _ = write!(line, "wifi up, ip {}", ip);
            log::record(&line);
        }
        Events::WifiDown => {
            state.wifi = WifiStatus::Down;
            state.ip = None;
            state.ssid.clear();
            log::record("wifi down");
        }
        Events::TimeSynced => {
            state.time_synced = true;
            if let Some(t) = clock::now_local() {
                let mut line: String<96> = String::new();
                let _ = write!(line, "clock synced, {:02}:{:02}:{:02}", t.hour, t.min, t.sec);
                log::record(&line);
            } else {
                log::record("clock synced");
            }
        }
        Events::HttpServerStarted => {
            state.httpd_running = true;
            state.requests_served = 0;
            log::record("http server started on port 80");
        }
        Events::HttpServerStopped => {
            state.httpd_running = false;
            log::record("http server stopped");
        }
        Events::HttpRequestServed => {
            state.requests_served += 1;
        }
    }
}
