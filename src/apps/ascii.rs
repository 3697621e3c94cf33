//! ASCII Art Renderer
//!
//! Renders a short line of text in the same 5-row block font the clock
//! uses. Letters, digits and spaces only; anything else renders blank.

use heapless::String;

use crate::apps::bigclock::DIGITS;
use crate::cprintln;
use crate::shell::console::Console;

/// Longest input rendered
pub const TEXT_MAX: usize = 20;

/// Rows for one character. Unknown characters come back blank.
pub fn glyph(c: char) -> [&'static str; 5] {
    if let Some(d) = c.to_digit(10) {
        return DIGITS[d as usize];
    }
    match c.to_ascii_uppercase() {
        'A' => [" ### ", "#   #", "#####", "#   #", "#   #"],
        'B' => ["#### ", "#   #", "#### ", "#   #", "#### "],
        'C' => [" ####", "#    ", "#    ", "#    ", " ####"],
        'D' => ["#### ", "#   #", "#   #", "#   #", "#### "],
        'E' => ["#####", "#    ", "#### ", "#    ", "#####"],
        'F' => ["#####", "#    ", "#### ", "#    ", "#    "],
        'G' => [" ####", "#    ", "#  ##", "#   #", " ### "],
        'H' => ["#   #", "#   #", "#####", "#   #", "#   #"],
        'I' => ["#####", "  #  ", "  #  ", "  #  ", "#####"],
        'J' => ["#####", "   # ", "   # ", "#  # ", " ##  "],
        'K' => ["#   #", "#  # ", "###  ", "#  # ", "#   #"],
        'L' => ["#    ", "#    ", "#    ", "#    ", "#####"],
        'M' => ["#   #", "## ##", "# # #", "#   #", "#   #"],
        'N' => ["#   #", "##  #", "# # #", "#  ##", "#   #"],
        'O' => [" ### ", "#   #", "#   #", "#   #", " ### "],
        'P' => ["#### ", "#   #", "#### ", "#    ", "#    "],
        'Q' => [" ### ", "#   #", "#   #", "#  # ", " ## #"],
        'R' => ["#### ", "#   #", "#### ", "#  # ", "#   #"],
        'S' => [" ####", "#    ", " ### ", "    #", "#### "],
        'T' => ["#####", "  #  ", "  #  ", "  #  ", "  #  "],
        'U' => ["#   #", "#   #", "#   #", "#   #", " ### "],
        'V' => ["#   #", "#   #", "#   #", " # # ", "  #  "],
        'W' => ["#   #", "#   #", "# # #", "## ##", "#   #"],
        'X' => ["#   #", " # # ", "  #  ", " # # ", "#   #"],
        'Y' => ["#   #", " # # ", "  #  ", "  #  ", "  #  "],
        'Z' => ["#####", "   # ", "  #  ", " #   ", "#####"],
        '!' => ["  #  ", "  #  ", "  #  ", "     ", "  #  "],
        '?' => [" ### ", "#   #", "  ## ", "     ", "  #  "],
        _ => ["     "; 5],
    }
}

/// Prompts for text and prints it as block letters.
pub async fn run(console: &mut Console) {
    console.print(format_args!("text (up to {} chars): ", TEXT_MAX)).await;
    let text: String<TEXT_MAX> = console.read_line(false).await;
    if text.is_empty() {
        return;
    }
    cprintln!(console);
    for row in 0..5 {
        let mut line: String<128> = String::new();
        for c in text.chars() {
            let _ = line.push_str(glyph(c)[row]);
            let _ = line.push(' ');
        }
        cprintln!(console, "{}", line);
    }
    cprintln!(console);
}
