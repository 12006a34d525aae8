//! User-facing status lines. Warnings and errors go to stderr so that
//! exported data piped through stdout stays clean.

use ansi_term::Colour::{Blue, Green, Red, Yellow};
use ansi_term::Style;
use std::fmt;
use std::io::{self, BufRead, Write};

const ICON_INFO: &str = "ℹ️";
const ICON_OK: &str = "✅";
const ICON_WARN: &str = "⚠️";
const ICON_ERR: &str = "❌";

pub fn info<T: fmt::Display>(msg: T) {
    println!("{} {}", Blue.bold().paint(ICON_INFO), msg);
}

pub fn success<T: fmt::Display>(msg: T) {
    println!("{} {}", Green.bold().paint(ICON_OK), msg);
}

pub fn warning<T: fmt::Display>(msg: T) {
    eprintln!("{} {}", Yellow.bold().paint(ICON_WARN), msg);
}

pub fn error<T: fmt::Display>(msg: T) {
    eprintln!("{} {}", Red.bold().paint(ICON_ERR), msg);
}

pub fn header<T: fmt::Display>(msg: T) {
    let line = format!("====================== {}", msg);
    println!("{}\n", Blue.bold().paint(line));
}

pub fn label<T: fmt::Display>(name: &str, value: T) {
    println!("{} {}", Style::new().bold().paint(format!("{name}:")), value);
}

/// Print `question` and read one line from stdin. EOF yields `None`.
pub fn prompt(question: &str) -> io::Result<Option<String>> {
    print!("{question}");
    io::stdout().flush()?;

    let mut line = String::new();
    let n = io::stdin().lock().read_line(&mut line)?;
    if n == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

/// Yes/no confirmation; anything but `y`/`yes` is a no.
pub fn confirm(question: &str) -> io::Result<bool> {
    Ok(prompt(&format!("{question} [y/N] "))?
        .is_some_and(|a| matches!(a.to_lowercase().as_str(), "y" | "yes")))
}
