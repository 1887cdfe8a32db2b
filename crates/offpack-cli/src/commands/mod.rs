pub mod download;
pub mod history;
pub mod package;
pub mod settings;
pub mod source;
pub mod status;

use anyhow::Result;
use std::io::{BufRead, Write};

/// Ask a yes/no question on stdout, anything but `y` answers no
pub fn confirm(prompt: &str) -> Result<bool> {
    print!("{prompt} [y/N] ");
    std::io::stdout().flush()?;

    let mut input = String::new();
    std::io::stdin().lock().read_line(&mut input)?;

    Ok(input.trim().eq_ignore_ascii_case("y"))
}

pub fn format_timestamp(at: time::OffsetDateTime) -> String {
    let format =
        time::macros::format_description!("[year]-[month]-[day] [hour]:[minute]:[second] UTC");
    let at = at.to_offset(time::UtcOffset::UTC);
    at.format(format).unwrap_or_else(|_| at.to_string())
}
