use serde::Deserialize;
use std::{
    io::{self, Write},
    path::PathBuf,
};

use crate::{
    integration::IntegrationId,
    lookup::EmojiTable,
    transport::{FetchResult, ProviderRequest, Transport, fetch},
};

/// Current conditions for one city, from WeatherAPI.com.
#[derive(Debug, Clone)]
pub struct WeatherConfig {
    pub city: String,
    pub token: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WeatherReport {
    pub location: WeatherLocation,
    pub current: CurrentConditions,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WeatherLocation {
    pub name: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub country: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CurrentConditions {
    pub temp_c: f64,
    pub feelslike_c: f64,
    pub wind_kph: f64,
    pub wind_dir: String,
    pub pressure_mb: f64,
    pub humidity: i64,
    pub uv: f64,
    pub condition: Condition,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Condition {
    pub text: String,
    pub code: i64,
}

#[derive(Debug)]
pub struct WeatherService<'a> {
    transport: &'a dyn Transport,
    base_url: String,
    conditions_csv: Option<PathBuf>,
}

impl<'a> WeatherService<'a> {
    pub fn new(
        transport: &'a dyn Transport,
        base_url: impl Into<String>,
        conditions_csv: Option<PathBuf>,
    ) -> Self {
        Self { transport, base_url: base_url.into(), conditions_csv }
    }

    pub async fn request(&self, config: &WeatherConfig) -> FetchResult<WeatherReport> {
        let request = ProviderRequest::new(IntegrationId::Weather, &self.base_url, "/current.json")
            .query("key", config.token.as_str())
            .query("q", config.city.as_str())
            .query("aqi", "no");

        fetch(self.transport, &request).await
    }

    /// Emoji for a condition code; a table that fails to load yields no emoji.
    pub fn emoji(&self, code: i64) -> String {
        match EmojiTable::load(self.conditions_csv.as_deref()) {
            Ok(table) => table.find_emoji(code).to_string(),
            Err(e) => {
                tracing::warn!(error = %e, "weather conditions table unavailable");
                String::new()
            }
        }
    }

    pub async fn run<W: Write>(&self, out: &mut W, config: &WeatherConfig) -> io::Result<()> {
        let output = match self.request(config).await {
            FetchResult::Success(report) => {
                let emoji = self.emoji(report.current.condition.code);
                format_report(&report, &emoji)
            }
            FetchResult::Failed { message, .. } => format!("Error: {message}"),
        };

        out.write_all(output.as_bytes())
    }
}

pub fn kph_to_mps(kph: f64) -> f64 {
    kph * 1000.0 / 3600.0
}

pub fn format_report(report: &WeatherReport, emoji: &str) -> String {
    let c = &report.current;
    format!(
        "{}: {} {}, t {:.1}C (feels like {:.1}C), wind {} {:.2} km/h ({:.1} m/s), pressure {:.1} mb, humidity {}, UV {:.1}\n",
        report.location.name,
        emoji,
        c.condition.text,
        c.temp_c,
        c.feelslike_c,
        c.wind_dir,
        c.wind_kph,
        kph_to_mps(c.wind_kph),
        c.pressure_mb,
        c.humidity,
        c.uv,
    )
}
