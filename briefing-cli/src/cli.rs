use std::{io, path::PathBuf};

use anyhow::Context;
use briefing_core::{
    Config, CurrencyConfig, CurrencyService, HttpTransport, IntegrationId, JokesConfig,
    JokesService, NewsConfig, NewsService, WeatherConfig, WeatherService,
    config::{CurrencySection, EventsSection, JokesSection, NewsSection, WeatherSection},
    events,
};
use clap::{ArgAction, Args, Parser, Subcommand, builder::BoolishValueParser};
use inquire::{Password, PasswordDisplayMode};

const DEFAULT_CITY: &str = "Amsterdam";
const DEFAULT_FROM: &str = "EUR";
const DEFAULT_TO: &str = "USD";
const DEFAULT_LANGUAGE: &str = "en";
const DEFAULT_SOURCE: &str = "google-news-en";
const DEFAULT_LIMIT: i64 = 100;
const DEFAULT_EVENTS_FILE: &str = "events.json";

/// Top-level CLI struct.
///
/// Every option can also come from a `BRIEFING_*` environment variable or the
/// config file; an explicit flag always wins.
#[derive(Debug, Parser)]
#[command(name = "briefing", version, about = "Weather, currency rates, jokes and news in your terminal")]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace). RUST_LOG overrides it.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file to use instead of ./briefing.toml or the platform config file.
    #[arg(long, global = true, env = "BRIEFING_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Current weather information in the given city.
    Weather(WeatherArgs),

    /// Currency rate for the given currencies using the specified base currency.
    Currency(CurrencyArgs),

    /// A random short joke.
    Jokes(JokesArgs),

    /// Top news for the given date, language and source.
    News(NewsArgs),

    /// Check if today is a special day, and list upcoming reminders.
    Events(EventsArgs),

    /// Store the API token of an integration in the config file.
    Configure {
        /// Integration name: weather, currency, jokes or news.
        integration: String,
    },
}

#[derive(Debug, Args)]
pub struct WeatherArgs {
    /// City name [default: Amsterdam]
    #[arg(long, env = "BRIEFING_WEATHER_CITY")]
    pub city: Option<String>,

    /// WeatherAPI.com key
    #[arg(long, env = "BRIEFING_WEATHER_TOKEN", hide_env_values = true)]
    pub token: Option<String>,
}

impl WeatherArgs {
    pub fn resolve(self, file: &WeatherSection) -> WeatherConfig {
        WeatherConfig {
            city: pick(self.city, &file.city, DEFAULT_CITY),
            token: pick(self.token, &file.token, ""),
        }
    }
}

#[derive(Debug, Args)]
pub struct CurrencyArgs {
    /// Base currency code [default: EUR]
    #[arg(long, env = "BRIEFING_CURRENCY_FROM")]
    pub from: Option<String>,

    /// Target currency codes, comma-separated [default: USD]
    #[arg(long, env = "BRIEFING_CURRENCY_TO")]
    pub to: Option<String>,

    /// currencyapi.com key
    #[arg(long, env = "BRIEFING_CURRENCY_TOKEN", hide_env_values = true)]
    pub token: Option<String>,
}

impl CurrencyArgs {
    pub fn resolve(self, file: &CurrencySection) -> CurrencyConfig {
        CurrencyConfig {
            from: pick(self.from, &file.from, DEFAULT_FROM),
            to: pick(self.to, &file.to, DEFAULT_TO),
            token: pick(self.token, &file.token, ""),
        }
    }
}

#[derive(Debug, Args)]
pub struct JokesArgs {
    /// Prefix the joke with a laughing emoji
    #[arg(
        long,
        env = "BRIEFING_JOKES_EMOJI",
        num_args = 0..=1,
        default_missing_value = "true",
        value_parser = BoolishValueParser::new()
    )]
    pub emoji: Option<bool>,

    /// RapidAPI key for JokeAPI
    #[arg(long, env = "BRIEFING_JOKES_TOKEN", hide_env_values = true)]
    pub token: Option<String>,
}

impl JokesArgs {
    pub fn resolve(self, file: &JokesSection) -> JokesConfig {
        JokesConfig {
            emoji: self.emoji.or(file.emoji).unwrap_or(false),
            token: pick(self.token, &file.token, ""),
        }
    }
}

#[derive(Debug, Args)]
pub struct NewsArgs {
    /// Oldest publication date, e.g. 2024-05-01
    #[arg(long, env = "BRIEFING_NEWS_DATE")]
    pub date: Option<String>,

    /// Article language [default: en]
    #[arg(long, env = "BRIEFING_NEWS_LANGUAGE")]
    pub language: Option<String>,

    /// NewsAPI source id [default: google-news-en]
    #[arg(long, env = "BRIEFING_NEWS_SOURCE")]
    pub source: Option<String>,

    /// Maximum number of articles; 0 or less prints all [default: 100]
    #[arg(long, env = "BRIEFING_NEWS_LIMIT", allow_negative_numbers = true)]
    pub limit: Option<i64>,

    /// Print Markdown-style blocks
    #[arg(
        long,
        env = "BRIEFING_NEWS_MARKUP",
        num_args = 0..=1,
        default_missing_value = "true",
        value_parser = BoolishValueParser::new()
    )]
    pub markup: Option<bool>,

    /// NewsAPI key
    #[arg(long, env = "BRIEFING_NEWS_TOKEN", hide_env_values = true)]
    pub token: Option<String>,
}

impl NewsArgs {
    pub fn resolve(self, file: &NewsSection) -> NewsConfig {
        NewsConfig {
            date: pick(self.date, &file.date, ""),
            language: pick(self.language, &file.language, DEFAULT_LANGUAGE),
            source: pick(self.source, &file.source, DEFAULT_SOURCE),
            limit: self.limit.or(file.limit).unwrap_or(DEFAULT_LIMIT),
            markup: self.markup.or(file.markup).unwrap_or(false),
            token: pick(self.token, &file.token, ""),
        }
    }
}

#[derive(Debug, Args)]
pub struct EventsArgs {
    /// JSON file with events keyed by MM-DD [default: events.json]
    #[arg(short, long, env = "BRIEFING_EVENTS_FILE")]
    pub events: Option<PathBuf>,

    /// Only show events of this type, e.g. birthday
    #[arg(short, long, env = "BRIEFING_EVENTS_FILTER")]
    pub filter: Option<String>,
}

impl EventsArgs {
    pub fn resolve(self, file: &EventsSection) -> (PathBuf, String) {
        let path = self
            .events
            .or_else(|| file.file.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_EVENTS_FILE));
        (path, pick(self.filter, &file.filter, ""))
    }
}

/// Flag or env value, then config file value, then the built-in default.
fn pick(arg: Option<String>, file: &Option<String>, default: &str) -> String {
    arg.or_else(|| file.clone()).unwrap_or_else(|| default.to_string())
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let explicit = self.config;
        let mut out = io::stdout();

        match self.command {
            Command::Configure { integration } => {
                let id = IntegrationId::try_from(integration.as_str())?;
                configure(id, explicit)?;
            }
            Command::Events(args) => {
                let config = Config::discover(explicit.as_deref())?;
                let (path, filter) = args.resolve(&config.events);
                let today = chrono::Local::now().date_naive();
                events::run(&mut out, &path, &filter, today)?;
            }
            Command::Weather(args) => {
                let config = Config::discover(explicit.as_deref())?;
                let request = args.resolve(&config.weather);
                let base_url = config.endpoints.base_url(IntegrationId::Weather);
                let conditions_csv = config.resources.conditions_csv.clone();
                let transport = http_transport()?;
                WeatherService::new(&transport, base_url, conditions_csv)
                    .run(&mut out, &request)
                    .await?;
            }
            Command::Currency(args) => {
                let config = Config::discover(explicit.as_deref())?;
                let request = args.resolve(&config.currency);
                let base_url = config.endpoints.base_url(IntegrationId::Currency);
                let currency_json = config.resources.currency_json.clone();
                let transport = http_transport()?;
                CurrencyService::new(&transport, base_url, currency_json)
                    .run(&mut out, &request)
                    .await?;
            }
            Command::Jokes(args) => {
                let config = Config::discover(explicit.as_deref())?;
                let request = args.resolve(&config.jokes);
                let transport = http_transport()?;
                JokesService::new(&transport, config.endpoints.base_url(IntegrationId::Jokes))
                    .run(&mut out, &request)
                    .await?;
            }
            Command::News(args) => {
                let config = Config::discover(explicit.as_deref())?;
                let request = args.resolve(&config.news);
                let transport = http_transport()?;
                NewsService::new(&transport, config.endpoints.base_url(IntegrationId::News))
                    .run(&mut out, &request)
                    .await?;
            }
        }

        Ok(())
    }
}

fn http_transport() -> anyhow::Result<HttpTransport> {
    HttpTransport::new().context("Failed to initialize HTTP client")
}

/// Prompt for a token and store it in the explicit config file, or the platform one.
fn configure(id: IntegrationId, explicit: Option<PathBuf>) -> anyhow::Result<()> {
    let path = match explicit {
        Some(path) => path,
        None => Config::config_file_path()?,
    };

    let mut config = if path.exists() { Config::load_from(&path)? } else { Config::default() };

    let token = Password::new(&format!("API token for {}:", id.label()))
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("Failed to read token")?;

    config.upsert_token(id, token.trim().to_string());
    config.save_to(&path)?;

    tracing::info!(integration = %id, path = %path.display(), "token saved");
    println!("Saved {id} token to {}", path.display());
    Ok(())
}
