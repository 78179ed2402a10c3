use serde::Deserialize;
use std::{
    collections::HashMap,
    io::{self, Write},
    path::PathBuf,
};

use crate::{
    integration::IntegrationId,
    lookup::CurrencyDetails,
    transport::{FetchResult, ProviderRequest, Transport, fetch},
};

/// Conversion of one base currency into a comma-separated list of targets.
#[derive(Debug, Clone)]
pub struct CurrencyConfig {
    pub from: String,
    pub to: String,
    pub token: String,
}

impl CurrencyConfig {
    /// Target codes, uppercased, in the order the user gave them.
    pub fn targets(&self) -> Vec<String> {
        self.to.to_uppercase().split(',').map(str::to_string).collect()
    }

    pub fn base(&self) -> String {
        self.from.to_uppercase()
    }
}

/// Latest rates relative to the requested base currency.
///
/// Rates are collected into a map at parse time, keyed by the exact code the
/// provider used.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "RawLatest")]
pub struct CurrencyRates {
    pub last_updated_at: Option<String>,
    rates: HashMap<String, f64>,
}

impl CurrencyRates {
    pub fn new(rates: HashMap<String, f64>) -> Self {
        Self { last_updated_at: None, rates }
    }

    /// Rate for `code`; case-sensitive, `0.0` when the provider did not return it.
    pub fn rate(&self, code: &str) -> f64 {
        self.rates.get(code).copied().unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

#[derive(Deserialize)]
struct RawLatest {
    #[serde(default)]
    meta: Option<RawMeta>,
    data: HashMap<String, RawRate>,
}

#[derive(Deserialize)]
struct RawMeta {
    #[serde(default)]
    last_updated_at: Option<serde_json::Value>,
}

// currencyapi.com v3 nests `{code, value}`; older responses carry the bare number
#[derive(Deserialize)]
#[serde(untagged)]
enum RawRate {
    Plain(f64),
    Detailed { value: f64 },
}

impl From<RawLatest> for CurrencyRates {
    fn from(raw: RawLatest) -> Self {
        let last_updated_at = raw.meta.and_then(|m| m.last_updated_at).map(|v| match v {
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        });

        let rates = raw
            .data
            .into_iter()
            .map(|(code, rate)| {
                let value = match rate {
                    RawRate::Plain(v) | RawRate::Detailed { value: v } => v,
                };
                (code, value)
            })
            .collect();

        Self { last_updated_at, rates }
    }
}

/// One line per unsupported code: every target in order, then the base.
pub fn validate_inputs(details: &CurrencyDetails, to: &str, from: &str) -> String {
    let to = to.to_uppercase();
    let from = from.to_uppercase();

    to.split(',')
        .chain(std::iter::once(from.as_str()))
        .filter(|code| !details.contains(code))
        .map(|code| format!("Value \"{code}\" is not recognized as supported currency\n"))
        .collect()
}

pub fn get_rate(rates: &CurrencyRates, code: &str) -> f64 {
    rates.rate(code)
}

pub fn format_conversion(
    rates: &CurrencyRates,
    details: &CurrencyDetails,
    config: &CurrencyConfig,
) -> String {
    let mut output = format!("1 {}", details.symbol(&config.base()));
    for code in config.targets() {
        output.push_str(&format!(" = {:.6} {}", get_rate(rates, &code), details.symbol(&code)));
    }
    output.push('\n');
    output
}

#[derive(Debug)]
pub struct CurrencyService<'a> {
    transport: &'a dyn Transport,
    base_url: String,
    details_json: Option<PathBuf>,
}

impl<'a> CurrencyService<'a> {
    pub fn new(
        transport: &'a dyn Transport,
        base_url: impl Into<String>,
        details_json: Option<PathBuf>,
    ) -> Self {
        Self { transport, base_url: base_url.into(), details_json }
    }

    pub async fn request(&self, config: &CurrencyConfig) -> FetchResult<CurrencyRates> {
        let request = ProviderRequest::new(IntegrationId::Currency, &self.base_url, "/latest")
            .query("apikey", config.token.as_str())
            .query("base_currency", config.base());

        let result: FetchResult<CurrencyRates> = fetch(self.transport, &request).await;
        if let FetchResult::Success(rates) = &result {
            tracing::debug!(
                base = %config.base(),
                rates = rates.len(),
                last_updated_at = rates.last_updated_at.as_deref().unwrap_or("unknown"),
                "currency rates received"
            );
        }
        result
    }

    pub async fn run<W: Write>(&self, out: &mut W, config: &CurrencyConfig) -> io::Result<()> {
        let details = match CurrencyDetails::load(self.details_json.as_deref()) {
            Ok(details) => details,
            Err(e) => return writeln!(out, "Error: {e}"),
        };

        let validation = validate_inputs(&details, &config.to, &config.from);
        if !validation.is_empty() {
            return writeln!(out, "{validation}");
        }

        let output = match self.request(config).await {
            FetchResult::Success(rates) => format_conversion(&rates, &details, config),
            FetchResult::Failed { message, .. } => format!("Error: {message}"),
        };

        out.write_all(output.as_bytes())
    }
}
