//! Device settings file.
//!
//! Line oriented, in this order:
//!
//! ```text
//! <wifi ssid>
//! <wifi password>
//! <gmt offset, -12..=14>
//! <date format: dmy | ymd | mdy>
//! <address>
//! <address>
//! ...
//! ```

use core::str::FromStr;
use std::collections::VecDeque;

pub const SETTINGS_FILE_NAME: &str = "settings.txt";

/// Longer console lines are discarded
const MAX_LINE_BYTES: usize = 256;

/// Order of day, month and year in the "Updated" line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateFormat {
    #[default]
    Dmy,
    Ymd,
    Mdy,
}

impl DateFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            DateFormat::Dmy => "dmy",
            DateFormat::Ymd => "ymd",
            DateFormat::Mdy => "mdy",
        }
    }
}

impl FromStr for DateFormat {
    type Err = SettingsError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "dmy" => Ok(DateFormat::Dmy),
            "ymd" => Ok(DateFormat::Ymd),
            "mdy" => Ok(DateFormat::Mdy),
            _ => Err(SettingsError::InvalidDateFormat(raw.trim().to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsError {
    /// Fewer than the four mandatory lines
    TooFewLines(usize),
    InvalidGmtOffset(String),
    InvalidDateFormat(String),
}

impl core::fmt::Display for SettingsError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            SettingsError::TooFewLines(found) => write!(
                f,
                "Settings file is malformed: {} lines, at least 4 required",
                found
            ),
            SettingsError::InvalidGmtOffset(raw) => {
                write!(f, "GMT offset must be an integer between -12 and +14, got {:?}", raw)
            }
            SettingsError::InvalidDateFormat(raw) => {
                write!(f, "Date format must be one of dmy, ymd, mdy, got {:?}", raw)
            }
        }
    }
}

impl std::error::Error for SettingsError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub wifi_ssid: String,
    pub wifi_password: String,
    /// Whole hours east of UTC
    pub gmt_offset: i8,
    pub date_format: DateFormat,
    pub addresses: Vec<String>,
}

impl Settings {
    pub fn parse(text: &str) -> Result<Self, SettingsError> {
        let lines: Vec<&str> = text.lines().collect();
        if lines.len() < 4 {
            return Err(SettingsError::TooFewLines(lines.len()));
        }

        Ok(Self {
            wifi_ssid: lines[0].trim().to_string(),
            wifi_password: lines[1].trim().to_string(),
            gmt_offset: parse_gmt_offset(lines[2])?,
            date_format: lines[3].parse()?,
            addresses: lines[4..]
                .iter()
                .map(|line| line.trim())
                .filter(|line| !line.is_empty())
                .map(str::to_string)
                .collect(),
        })
    }

    /// File representation, readable by [`Settings::parse`]
    pub fn to_file_contents(&self) -> String {
        let mut out = format!(
            "{}\n{}\n{}\n{}\n",
            self.wifi_ssid,
            self.wifi_password,
            self.gmt_offset,
            self.date_format.as_str()
        );
        for address in &self.addresses {
            out.push_str(address);
            out.push('\n');
        }
        out
    }

    /// Offset in seconds east of UTC
    pub fn utc_offset_secs(&self) -> i32 {
        i32::from(self.gmt_offset) * 3600
    }

    /// Human-readable listing with the password masked
    pub fn summary(&self) -> Vec<String> {
        vec![
            format!("WIFI_SSID: {}", self.wifi_ssid),
            format!("WIFI_PASSWORD: {}", masked(&self.wifi_password)),
            format!("GMT_OFFSET: {:+}", self.gmt_offset),
            format!("DATE_FORMAT: {}", self.date_format.as_str()),
            format!("ADDRESSES: {}", self.addresses.join(", ")),
        ]
    }
}

/// Interactive first-boot setup
///
/// `ask` shows a prompt and returns the line typed back; `say` prints a
/// line. Invalid offsets and date formats are asked again. Returns `None`
/// when the user declines to save.
pub fn provision<A, S>(mut ask: A, mut say: S) -> Option<Settings>
where
    A: FnMut(&str) -> String,
    S: FnMut(&str),
{
    let wifi_ssid = ask("Enter WiFi SSID: ").trim().to_string();
    let wifi_password = ask("Enter WiFi Password: ").trim().to_string();

    let gmt_offset = loop {
        match parse_gmt_offset(&ask("Enter GMT Offset (e.g. +10, -6): ")) {
            Ok(offset) => break offset,
            Err(err) => say(&err.to_string()),
        }
    };

    let date_format = loop {
        match ask("Enter Date Format (dmy, ymd, mdy): ").parse::<DateFormat>() {
            Ok(format) => break format,
            Err(err) => say(&err.to_string()),
        }
    };

    say("Enter addresses, one per line. Leave blank to finish:");
    let mut addresses = Vec::new();
    loop {
        let address = ask("Address: ").trim().to_string();
        if address.is_empty() {
            break;
        }
        addresses.push(address);
    }

    let settings = Settings {
        wifi_ssid,
        wifi_password,
        gmt_offset,
        date_format,
        addresses,
    };
    say("Settings to be saved:");
    for line in settings.summary() {
        say(&line);
    }

    loop {
        match ask("Save settings? (yes/y or no/n): ")
            .trim()
            .to_ascii_lowercase()
            .as_str()
        {
            "yes" | "y" => return Some(settings),
            "no" | "n" => return None,
            _ => say("Please answer yes, y, no or n"),
        }
    }
}

/// Splits raw console bytes into lines
///
/// Reads may end mid-line or carry several lines at once; completed lines
/// queue up until taken. `\r` is ignored and non-printable bytes are
/// dropped from each line.
#[derive(Debug, Default)]
pub struct LineAssembler {
    partial: Vec<u8>,
    ready: VecDeque<String>,
}

impl LineAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            match byte {
                b'\n' => {
                    let line: String = String::from_utf8_lossy(&self.partial)
                        .chars()
                        .filter(|ch| ch.is_ascii_graphic() || *ch == ' ')
                        .collect();
                    self.partial.clear();
                    self.ready.push_back(line.trim().to_string());
                }
                b'\r' => {}
                _ => {
                    self.partial.push(byte);
                    if self.partial.len() > MAX_LINE_BYTES {
                        self.partial.clear();
                    }
                }
            }
        }
    }

    /// Oldest completed line, empty lines included
    pub fn next_line(&mut self) -> Option<String> {
        self.ready.pop_front()
    }
}

/// Integer hours in `-12..=14`, with or without a leading `+`
pub fn parse_gmt_offset(raw: &str) -> Result<i8, SettingsError> {
    let trimmed = raw.trim();
    let digits = trimmed.strip_prefix('+').unwrap_or(trimmed);
    match digits.parse::<i8>() {
        Ok(offset) if (-12..=14).contains(&offset) => Ok(offset),
        _ => Err(SettingsError::InvalidGmtOffset(trimmed.to_string())),
    }
}

/// Secret replaced by asterisks for console echo
pub fn masked(secret: &str) -> String {
    if secret.is_empty() {
        return String::from("(none)");
    }
    "*".repeat(secret.chars().count().min(8))
}
