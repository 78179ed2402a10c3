use serde::Deserialize;
use std::io::{self, Write};

use crate::{
    integration::IntegrationId,
    transport::{FetchResult, ProviderRequest, Transport, fetch},
};

const RAPIDAPI_HOST: &str = "jokeapi-v2.p.rapidapi.com";
const LAUGHING_EMOJI: &str = ":rolling_on_the_floor_laughing:";

#[derive(Debug, Clone)]
pub struct JokesConfig {
    pub emoji: bool,
    pub token: String,
}

/// A single-part joke from JokeAPI. Only `joke` is required.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Joke {
    #[serde(default)]
    pub error: bool,
    #[serde(default)]
    pub category: String,
    #[serde(default, rename = "type")]
    pub kind: String,
    pub joke: String,
    #[serde(default)]
    pub flags: JokeFlags,
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub safe: bool,
    #[serde(default)]
    pub lang: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct JokeFlags {
    pub nsfw: bool,
    pub religious: bool,
    pub racist: bool,
    pub sexist: bool,
    pub political: bool,
    pub explicit: bool,
}

pub fn format_joke(joke: &Joke, emoji: bool) -> String {
    if emoji {
        format!("{LAUGHING_EMOJI} {}\n", joke.joke)
    } else {
        format!("{}\n", joke.joke)
    }
}

#[derive(Debug)]
pub struct JokesService<'a> {
    transport: &'a dyn Transport,
    base_url: String,
}

impl<'a> JokesService<'a> {
    pub fn new(transport: &'a dyn Transport, base_url: impl Into<String>) -> Self {
        Self { transport, base_url: base_url.into() }
    }

    pub async fn request(&self, config: &JokesConfig) -> FetchResult<Joke> {
        let request = ProviderRequest::new(IntegrationId::Jokes, &self.base_url, "/Any")
            .query("format", "json")
            .query("type", "single")
            .query("blacklistFlags", "nsfw,racist")
            .header("x-rapidapi-host", RAPIDAPI_HOST)
            .header("x-rapidapi-key", config.token.as_str());

        fetch(self.transport, &request).await
    }

    pub async fn run<W: Write>(&self, out: &mut W, config: &JokesConfig) -> io::Result<()> {
        let output = match self.request(config).await {
            FetchResult::Success(joke) => format_joke(&joke, config.emoji),
            FetchResult::Failed { message, .. } => format!("Error: {message}"),
        };

        out.write_all(output.as_bytes())
    }
}
