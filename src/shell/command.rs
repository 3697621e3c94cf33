//! Command Parsing
//!
//! Turns a raw console line into a [`Command`]. Parsing is separate from
//! execution so it stays plain data in, plain data out.

/// A parsed shell command
#[derive(Debug, Clone, Copy, PartialEq, Eq, defmt::Format)]
pub enum Command<'a> {
    Help,
    Neofetch,
    Sysinfo,
    Time,
    ViewLog,
    Clear,
    Reboot,
    Ls,
    Cat(&'a str),
    Nano(&'a str),
    Make(&'a str),
    Delete(&'a str),
    ShowSpace,
    ShowRam,
    Wifi,
    Ipa,
    Nmap,
    Timer,
    Todo,
    Ascii,
    Tetris,
    Snake,
    Localhost,
    StopWeb,
    CreateWeb,
    Settings,
    Ps,
    /// Known command used without its required argument
    Usage(&'static str),
    /// Anything unrecognised, with the word that was typed
    Unknown(&'a str),
}

/// Parses one console line. Returns `None` for a blank line.
pub fn parse(line: &str) -> Option<Command<'_>> {
    let mut parts = line.trim().split_whitespace();
    let word = parts.next()?;
    let arg = parts.next();

    let command = match word {
        "help" => Command::Help,
        "neofetch" => Command::Neofetch,
        "sysinfo" => Command::Sysinfo,
        "time" | "date" => Command::Time,
        "viewlog" => Command::ViewLog,
        "clear" => Command::Clear,
        "reboot" => Command::Reboot,
        "ls" | "dir" => Command::Ls,
        "cat" => match arg {
            Some(name) => Command::Cat(name),
            None => Command::Usage("cat <file>"),
        },
        "nano" | "edit" => match arg {
            Some(name) => Command::Nano(name),
            None => Command::Usage("nano <file>"),
        },
        "make" | "touch" => match arg {
            Some(name) => Command::Make(name),
            None => Command::Usage("make <file>"),
        },
        "delete" | "rm" => match arg {
            Some(name) => Command::Delete(name),
            None => Command::Usage("delete <file>"),
        },
        "showspace" | "df" => Command::ShowSpace,
        "showram" | "free" => Command::ShowRam,
        "wifi" => Command::Wifi,
        "ipa" | "ifconfig" => Command::Ipa,
        "nmap" => Command::Nmap,
        "timer" => Command::Timer,
        "todo" => Command::Todo,
        "ascii" => Command::Ascii,
        "tetris" => Command::Tetris,
        "snake" => Command::Snake,
        "localhost" => Command::Localhost,
        "stopweb" => Command::StopWeb,
        "createweb" => Command::CreateWeb,
        "setting" | "settings" => Command::Settings,
        "ps" => Command::Ps,
        other => Command::Unknown(other),
    };
    Some(command)
}

/// Help text shown by the `help` command
pub const HELP_TEXT: &[(&str, &str)] = &[
    ("help", "list available commands"),
    ("neofetch", "system summary with logo"),
    ("sysinfo", "hardware and runtime details"),
    ("time", "current date and time"),
    ("viewlog", "recent system log entries"),
    ("clear", "clear the screen"),
    ("reboot", "restart the board"),
    ("ls", "list files in the flash store"),
    ("cat <file>", "print a file"),
    ("nano <file>", "write a file (line editor)"),
    ("make <file>", "create an empty file"),
    ("delete <file>", "remove a file"),
    ("showspace", "flash store usage"),
    ("showram", "RAM usage"),
    ("wifi", "join a wireless network"),
    ("ipa", "show the network address"),
    ("nmap", "scan a host for open ports"),
    ("timer", "countdown timer"),
    ("todo", "todo list"),
    ("ascii", "render text as ascii art"),
    ("tetris", "play tetris"),
    ("snake", "play snake"),
    ("localhost", "start the web server"),
    ("stopweb", "stop the web server"),
    ("createweb", "install the sample web page"),
    ("setting", "clock and storage settings"),
    ("ps", "running background services"),
];
