use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::integration::IntegrationId;

/// Name of the config file looked up in the working directory before the platform one.
pub const LOCAL_CONFIG_FILE: &str = "briefing.toml";

/// Base URLs of every provider.
///
/// Example TOML:
/// [endpoints]
/// weather = "http://api.weatherapi.com/v1"
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub weather: String,
    pub currency: String,
    pub jokes: String,
    pub news: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            weather: "http://api.weatherapi.com/v1".to_string(),
            currency: "https://api.currencyapi.com/v3".to_string(),
            jokes: "https://jokeapi-v2.p.rapidapi.com/joke".to_string(),
            news: "https://newsapi.org/v2".to_string(),
        }
    }
}

impl Endpoints {
    pub fn base_url(&self, id: IntegrationId) -> &str {
        match id {
            IntegrationId::Weather => &self.weather,
            IntegrationId::Currency => &self.currency,
            IntegrationId::Jokes => &self.jokes,
            IntegrationId::News => &self.news,
        }
    }
}

/// Optional overrides for the lookup tables; `None` means the bundled copy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourcePaths {
    pub conditions_csv: Option<PathBuf>,
    pub currency_json: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherSection {
    pub token: Option<String>,
    pub city: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurrencySection {
    pub token: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JokesSection {
    pub token: Option<String>,
    pub emoji: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewsSection {
    pub token: Option<String>,
    pub date: Option<String>,
    pub language: Option<String>,
    pub source: Option<String>,
    pub limit: Option<i64>,
    pub markup: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventsSection {
    pub file: Option<PathBuf>,
    pub filter: Option<String>,
}

/// Top-level configuration stored on disk.
///
/// Every value is optional: command-line flags and `BRIEFING_*` environment
/// variables take precedence, built-in defaults apply when nothing is set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub endpoints: Endpoints,
    pub resources: ResourcePaths,
    pub weather: WeatherSection,
    pub currency: CurrencySection,
    pub jokes: JokesSection,
    pub news: NewsSection,
    pub events: EventsSection,
}

impl Config {
    /// Load config from the platform directory, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }

        Self::load_from(&path)
    }

    /// Load config from an explicit file. A missing file is an error here.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        tracing::debug!(path = %path.display(), "loaded config file");
        Ok(cfg)
    }

    /// Pick the config file: explicit path, then `briefing.toml` in the working
    /// directory, then the platform config file.
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load_from(path);
        }

        let local = Path::new(LOCAL_CONFIG_FILE);
        if local.is_file() {
            return Self::load_from(local);
        }

        Self::load()
    }

    /// Save config to `path`, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the platform config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "briefing", "briefing-cli")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Set or replace the token of one integration.
    pub fn upsert_token(&mut self, id: IntegrationId, token: String) {
        let slot = match id {
            IntegrationId::Weather => &mut self.weather.token,
            IntegrationId::Currency => &mut self.currency.token,
            IntegrationId::Jokes => &mut self.jokes.token,
            IntegrationId::News => &mut self.news.token,
        };
        *slot = Some(token);
    }

    /// Returns the stored token of an integration, if present.
    pub fn token(&self, id: IntegrationId) -> Option<&str> {
        match id {
            IntegrationId::Weather => self.weather.token.as_deref(),
            IntegrationId::Currency => self.currency.token.as_deref(),
            IntegrationId::Jokes => self.jokes.token.as_deref(),
            IntegrationId::News => self.news.token.as_deref(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_gives_defaults() {
        let cfg: Config = toml::from_str("").expect("empty config must parse");
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.endpoints.base_url(IntegrationId::News), "https://newsapi.org/v2");
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let cfg: Config = toml::from_str(
            r#"
            [endpoints]
            weather = "http://localhost:9000/v1"

            [news]
            limit = 5
            markup = true
            "#,
        )
        .expect("config must parse");

        assert_eq!(cfg.endpoints.weather, "http://localhost:9000/v1");
        assert_eq!(cfg.endpoints.currency, Endpoints::default().currency);
        assert_eq!(cfg.news.limit, Some(5));
        assert_eq!(cfg.news.markup, Some(true));
        assert_eq!(cfg.news.language, None);
    }

    #[test]
    fn upsert_token_sets_only_that_integration() {
        let mut cfg = Config::default();

        cfg.upsert_token(IntegrationId::Jokes, "JOKE_KEY".into());

        assert_eq!(cfg.token(IntegrationId::Jokes), Some("JOKE_KEY"));
        assert_eq!(cfg.token(IntegrationId::Weather), None);

        cfg.upsert_token(IntegrationId::Jokes, "OTHER".into());
        assert_eq!(cfg.token(IntegrationId::Jokes), Some("OTHER"));
    }

    #[test]
    fn save_and_load_from_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.upsert_token(IntegrationId::Currency, "CUR_KEY".into());
        cfg.currency.to = Some("EUR,GBP".into());
        cfg.save_to(&path).expect("save must succeed");

        let loaded = Config::load_from(&path).expect("load must succeed");
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn discover_prefers_explicit_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("custom.toml");
        fs::write(&path, "[weather]\ncity = \"Oslo\"\n").expect("write");

        let cfg = Config::discover(Some(&path)).expect("discover must succeed");
        assert_eq!(cfg.weather.city.as_deref(), Some("Oslo"));
    }

    #[test]
    fn load_from_missing_file_errors() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = Config::load_from(&dir.path().join("absent.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn load_from_invalid_toml_errors() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("bad.toml");
        fs::write(&path, "[news]\nlimit = \"ten\"\n").expect("write");

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }
}
