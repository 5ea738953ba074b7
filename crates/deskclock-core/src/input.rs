//! Input adapter support.
//!
//! The engine never parses raw text. Front ends turn keystrokes into
//! [`Command`]s and field text into validated integers here before calling
//! `confirm_*`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::InputError;

/// One editable field of a timer or alarm form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Hour,
    Minute,
    Second,
}

impl Field {
    /// Largest value the field accepts.
    pub fn max(self) -> u32 {
        match self {
            Field::Hour => 23,
            Field::Minute | Field::Second => 59,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Field::Hour => "hour",
            Field::Minute => "minute",
            Field::Second => "second",
        })
    }
}

/// Which value pair a form gathers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormKind {
    /// `MM:SS`
    Timer,
    /// `HH:MM`
    Alarm,
}

impl FormKind {
    pub fn fields(self) -> (Field, Field) {
        match self {
            FormKind::Timer => (Field::Minute, Field::Second),
            FormKind::Alarm => (Field::Hour, Field::Minute),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FormKind::Timer => "MM:SS",
            FormKind::Alarm => "HH:MM",
        }
    }
}

/// Pre-filled values shown when a form opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputForm {
    pub kind: FormKind,
    pub first: u32,
    pub second: u32,
}

impl InputForm {
    pub fn timer(minutes: u32, seconds: u32) -> Self {
        Self {
            kind: FormKind::Timer,
            first: minutes,
            second: seconds,
        }
    }

    pub fn alarm(hour: u32, minute: u32) -> Self {
        Self {
            kind: FormKind::Alarm,
            first: hour,
            second: minute,
        }
    }

    /// Pre-filled text, e.g. `10:00`.
    pub fn placeholder(&self) -> String {
        format!("{:02}:{:02}", self.first, self.second)
    }
}

/// Validate one field: digits only, at most two of them, within range.
pub fn parse_field(text: &str, field: Field) -> Result<u32, InputError> {
    let text = text.trim();
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(InputError::NotNumeric { field });
    }
    if text.len() > 2 {
        return Err(InputError::TooLong { field });
    }
    let value: u32 = text
        .parse()
        .map_err(|_| InputError::NotNumeric { field })?;
    if value > field.max() {
        return Err(InputError::OutOfRange {
            field,
            value,
            max: field.max(),
        });
    }
    Ok(value)
}

/// Validate an `AA:BB` entry for the given form.
///
/// The first failing field is reported.
pub fn parse_pair(text: &str, kind: FormKind) -> Result<(u32, u32), InputError> {
    let (first_field, second_field) = kind.fields();
    let Some((a, b)) = text.trim().split_once(':') else {
        return Err(InputError::Malformed(text.trim().to_string()));
    };
    let a = parse_field(a, first_field)?;
    let b = parse_field(b, second_field)?;
    Ok((a, b))
}

/// A user command surfaced by an input adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    RequestTimer,
    RequestAlarm,
    /// Text for the currently open form, validated by the runtime.
    Entry(String),
    /// Confirm the open form's pre-filled values unchanged.
    Accept,
    Cancel,
    Stop,
    Quit,
    /// Cancels an open form, quits otherwise.
    Escape,
}

impl Command {
    /// Map a line of terminal input onto a command.
    ///
    /// A blank line accepts the open form as shown. Returns `None` for
    /// unrecognised input.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        match line {
            "" => Some(Command::Accept),
            "t" | "T" | "timer" => Some(Command::RequestTimer),
            "a" | "A" | "alarm" => Some(Command::RequestAlarm),
            "s" | "S" | "stop" => Some(Command::Stop),
            "c" | "C" | "cancel" => Some(Command::Cancel),
            "q" | "Q" | "quit" => Some(Command::Quit),
            "esc" | "escape" | "\u{1b}" => Some(Command::Escape),
            _ if line.contains(':') || line.bytes().all(|b| b.is_ascii_digit()) => {
                Some(Command::Entry(line.to_string()))
            }
            _ => None,
        }
    }
}
