//! Countdown Timer
//!
//! Counts down on a single console line, cancels on any key, rings the
//! terminal bell when done.

use embassy_time::Duration;
use heapless::String;

use crate::cprintln;
use crate::shell::console::Console;

/// Longest accepted countdown
const MAX_SECS: u32 = 6 * 3600;

/// Prompts for a duration and runs the countdown.
pub async fn run(console: &mut Console) {
    console.print(format_args!("seconds: ")).await;
    let line: String<8> = console.read_line(false).await;
    let secs = match line.trim().parse::<u32>() {
        Ok(n) if n >= 1 && n <= MAX_SECS => n,
        _ => {
            cprintln!(console, "need a number between 1 and {}", MAX_SECS);
            return;
        }
    };

    for remaining in (1..=secs).rev() {
        console
            .print(format_args!(
                "\r  {:02}:{:02}:{:02} remaining (any key cancels)  ",
                remaining / 3600,
                remaining / 60 % 60,
                remaining % 60
            ))
            .await;
        // The key poll doubles as the one second tick
        if console.poll_key(Duration::from_secs(1)).await.is_some() {
            cprintln!(console);
            cprintln!(console, "cancelled");
            return;
        }
    }

    cprintln!(console);
    for _ in 0..5 {
        console.write("\x07").await;
        embassy_time::Timer::after_millis(200).await;
    }
    cprintln!(console, "time's up!");
}
