/// ANSI color helper utilities for terminal output.
use crate::core::urgency::Urgency;

pub const RESET: &str = "\x1b[0m";

pub const GREY: &str = "\x1b[90m";
pub const WHITE: &str = "\x1b[37m";

pub const RED: &str = "\x1b[31m";
pub const GREEN: &str = "\x1b[32m";

pub const YELLOW: &str = "\x1b[33m";
pub const BLUE: &str = "\x1b[34m";
pub const CYAN: &str = "\x1b[36m";
pub const MAGENTA: &str = "\x1b[35m";

pub const BRIGHT_RED: &str = "\x1b[91m";
pub const BRIGHT_GREEN: &str = "\x1b[92m";
pub const BRIGHT_YELLOW: &str = "\x1b[93m";

/// Urgency color; `dark_mode` picks the bright variants.
pub fn urgency_color(u: Urgency, dark_mode: bool) -> &'static str {
    match (u, dark_mode) {
        (Urgency::Green, false) => GREEN,
        (Urgency::Orange, false) => YELLOW,
        (Urgency::Red, false) => RED,
        (Urgency::Green, true) => BRIGHT_GREEN,
        (Urgency::Orange, true) => BRIGHT_YELLOW,
        (Urgency::Red, true) => BRIGHT_RED,
    }
}

pub fn colorize_urgency(u: Urgency, text: &str, dark_mode: bool) -> String {
    format!("{}{}{}", urgency_color(u, dark_mode), text, RESET)
}

/// Grey out placeholders ("" or "--"), leave anything else untouched.
pub fn colorize_optional(value: &str) -> String {
    if value.trim().is_empty() || value.trim() == "--" {
        format!("{GREY}{value}{RESET}")
    } else {
        value.to_string()
    }
}
