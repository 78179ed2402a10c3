use std::convert::TryFrom;

pub mod currency;
pub mod jokes;
pub mod news;
pub mod weather;

/// One of the third-party services the tool talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntegrationId {
    Weather,
    Currency,
    Jokes,
    News,
}

impl IntegrationId {
    pub fn as_str(&self) -> &'static str {
        match self {
            IntegrationId::Weather => "weather",
            IntegrationId::Currency => "currency",
            IntegrationId::Jokes => "jokes",
            IntegrationId::News => "news",
        }
    }

    /// Capitalized name used at the start of user-facing messages.
    pub fn label(&self) -> &'static str {
        match self {
            IntegrationId::Weather => "Weather",
            IntegrationId::Currency => "Currency",
            IntegrationId::Jokes => "Jokes",
            IntegrationId::News => "News",
        }
    }

    pub const fn all() -> &'static [IntegrationId] {
        &[
            IntegrationId::Weather,
            IntegrationId::Currency,
            IntegrationId::Jokes,
            IntegrationId::News,
        ]
    }
}

impl std::fmt::Display for IntegrationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for IntegrationId {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        match lower.as_str() {
            "weather" => Ok(IntegrationId::Weather),
            "currency" => Ok(IntegrationId::Currency),
            "jokes" => Ok(IntegrationId::Jokes),
            "news" => Ok(IntegrationId::News),
            _ => Err(anyhow::anyhow!(
                "Unknown integration '{value}'. Supported integrations: weather, currency, jokes, news."
            )),
        }
    }
}
