//! Special-day reminders read from a local JSON file.
//!
//! The file maps `MM-DD` keys to events:
//!
//! ```json
//! {"03-08": {"year": 1990, "remind": 3, "type": "birthday", "event": "Anna's birthday"}}
//! ```
//!
//! Today's event is printed when present, followed by upcoming events whose
//! `remind` window (in days) already covers today.

use chrono::{Datelike, Days, NaiveDate};
use serde::Deserialize;
use std::{
    collections::HashMap,
    fs,
    io::{self, Write},
    path::Path,
};

use crate::lookup::ResourceError;

/// How many days ahead reminders are looked up.
const LOOKAHEAD_DAYS: u64 = 9;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EventMetadata {
    pub year: i32,
    #[serde(default)]
    pub remind: u64,
    #[serde(rename = "type", default)]
    pub kind: String,
    pub event: String,
}

pub type Events = HashMap<String, EventMetadata>;

pub fn load_events(path: &Path) -> Result<Events, ResourceError> {
    let text = fs::read_to_string(path).map_err(|source| ResourceError::Io {
        path: path.display().to_string(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| ResourceError::Json {
        origin: path.display().to_string(),
        source,
    })
}

/// `MM-DD` of `date` shifted by `offset` days; non-positive offsets are ignored.
pub fn month_day(date: NaiveDate, offset: i64) -> String {
    let date = u64::try_from(offset)
        .ok()
        .and_then(|days| date.checked_add_days(Days::new(days)))
        .unwrap_or(date);
    date.format("%m-%d").to_string()
}

fn matches_filter(meta: &EventMetadata, filter: &str) -> bool {
    filter.is_empty() || meta.kind == filter
}

pub fn format_events(events: &Events, filter: &str, today: NaiveDate) -> String {
    let mut output = String::new();

    if let Some(meta) = events.get(&month_day(today, 0)).filter(|m| matches_filter(m, filter)) {
        output.push_str(&format!(
            "Today is {} {} {}: {} [{} year(s)]\n",
            today.day(),
            today.format("%B"),
            today.year(),
            meta.event,
            today.year() - meta.year,
        ));
    }

    for i in 1..=LOOKAHEAD_DAYS {
        let Some(date) = today.checked_add_days(Days::new(i)) else {
            break;
        };
        let key = date.format("%m-%d").to_string();
        let due = events.get(&key).filter(|m| i <= m.remind && matches_filter(m, filter));
        if let Some(meta) = due {
            output.push_str(&format!(
                "In {i} day(s) will be {}-{key}: {} [{} year(s)]\n",
                date.year(),
                meta.event,
                date.year() - meta.year,
            ));
        }
    }

    if output.is_empty() {
        output.push_str("No events today.\nNo reminders today.\n");
    }
    output
}

pub fn run<W: Write>(out: &mut W, path: &Path, filter: &str, today: NaiveDate) -> io::Result<()> {
    let output = match load_events(path) {
        Ok(events) => format_events(&events, filter, today),
        Err(e) => format!("Error: {e}\n"),
    };
    out.write_all(output.as_bytes())
}
