//! Static lookup tables used for formatting and validation.
//!
//! Both tables are parsed again on every invocation, either from a configured file
//! or from the copy bundled into the binary.

use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fs, path::Path};
use thiserror::Error;

const BUNDLED_CONDITIONS_CSV: &str = include_str!("../resources/conditions.csv");
const BUNDLED_CURRENCY_JSON: &str = include_str!("../resources/currencies.json");

#[derive(Debug, Error)]
pub enum ResourceError {
    #[error("Unable to read resource file \"{path}\": {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Unable to parse \"{origin}\" as CSV: {source}")]
    Csv {
        origin: String,
        #[source]
        source: csv::Error,
    },

    #[error("Unable to parse \"{origin}\" as JSON: {source}")]
    Json {
        origin: String,
        #[source]
        source: serde_json::Error,
    },
}

fn read_resource(path: Option<&Path>, bundled: &'static str) -> Result<(String, String), ResourceError> {
    match path {
        Some(path) => {
            let text = fs::read_to_string(path).map_err(|source| ResourceError::Io {
                path: path.display().to_string(),
                source,
            })?;
            Ok((path.display().to_string(), text))
        }
        None => Ok(("<bundled>".to_string(), bundled.to_string())),
    }
}

/// Weather condition rows: code, day text, night text, icon id, emoji.
///
/// The header row, if any, is kept as an ordinary row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmojiTable {
    rows: Vec<Vec<String>>,
}

impl EmojiTable {
    pub fn new(rows: Vec<Vec<String>>) -> Self {
        Self { rows }
    }

    pub fn load(path: Option<&Path>) -> Result<Self, ResourceError> {
        let (origin, text) = read_resource(path, BUNDLED_CONDITIONS_CSV)?;
        Self::parse(&text).map_err(|source| ResourceError::Csv { origin, source })
    }

    pub fn parse(text: &str) -> Result<Self, csv::Error> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(text.as_bytes());

        let rows = reader
            .records()
            .map(|record| record.map(|r| r.iter().map(str::to_string).collect()))
            .collect::<Result<Vec<Vec<String>>, _>>()?;

        Ok(Self { rows })
    }

    /// Emoji of the first row whose code column equals `code` as text, or "".
    pub fn find_emoji(&self, code: i64) -> &str {
        let code = code.to_string();
        self.rows
            .iter()
            .find(|row| row.first().is_some_and(|c| *c == code))
            .and_then(|row| row.get(4))
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Metadata of one currency, as published by currencyapi.com.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrencyInfo {
    pub symbol: String,
    pub name: String,
    pub symbol_native: String,
    pub decimal_digits: u32,
    pub rounding: f64,
    pub code: String,
    pub name_plural: String,
}

/// Supported currencies keyed by their three-letter code.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CurrencyDetails {
    entries: HashMap<String, CurrencyInfo>,
}

impl CurrencyDetails {
    pub fn new(entries: HashMap<String, CurrencyInfo>) -> Self {
        Self { entries }
    }

    pub fn load(path: Option<&Path>) -> Result<Self, ResourceError> {
        let (origin, text) = read_resource(path, BUNDLED_CURRENCY_JSON)?;
        let entries = serde_json::from_str(&text)
            .map_err(|source| ResourceError::Json { origin, source })?;
        Ok(Self { entries })
    }

    pub fn contains(&self, code: &str) -> bool {
        self.entries.contains_key(code)
    }

    pub fn get(&self, code: &str) -> Option<&CurrencyInfo> {
        self.entries.get(code)
    }

    /// Display symbol of `code`, empty when the code is unknown.
    pub fn symbol(&self, code: &str) -> &str {
        self.entries.get(code).map(|info| info.symbol.as_str()).unwrap_or("")
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
