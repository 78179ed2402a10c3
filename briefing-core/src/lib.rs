//! Core library for the `briefing` CLI.
//!
//! This crate defines:
//! - Configuration (provider endpoints, tokens, per-command settings)
//! - A single-request HTTP pipeline with a tri-state result
//! - Lookup tables for weather emoji and currency metadata
//! - The weather, currency, jokes and news integrations, plus local event reminders
//!
//! It is used by `briefing-cli`, but can also be reused by other binaries or services.

pub mod config;
pub mod events;
pub mod integration;
pub mod lookup;
pub mod transport;

pub use config::{Config, Endpoints, ResourcePaths};
pub use integration::{
    IntegrationId,
    currency::{CurrencyConfig, CurrencyService},
    jokes::{JokesConfig, JokesService},
    news::{NewsConfig, NewsService},
    weather::{WeatherConfig, WeatherService},
};
pub use lookup::{CurrencyDetails, EmojiTable, ResourceError};
pub use transport::{FetchResult, HttpTransport, RawResponse, Transport, TransportError};
