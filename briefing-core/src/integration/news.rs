use serde::Deserialize;
use std::io::{self, Write};

use crate::{
    integration::IntegrationId,
    transport::{FetchResult, ProviderRequest, Transport, fetch},
};

/// NewsAPI never returns more than this many articles per page.
const MAX_PAGE_SIZE: i64 = 100;

#[derive(Debug, Clone)]
pub struct NewsConfig {
    pub date: String,
    pub language: String,
    pub source: String,
    /// Maximum number of articles to print; zero or negative prints all of them.
    pub limit: i64,
    pub markup: bool,
    pub token: String,
}

/// Top headlines page. `articles` is required so an error body is not read as an empty page.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Headlines {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub total_results: i64,
    pub articles: Vec<Article>,
}

/// NewsAPI sends `null` for missing fields, hence the options.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Article {
    pub source: ArticleSource,
    pub author: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    pub url_to_image: Option<String>,
    pub published_at: Option<String>,
    pub content: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ArticleSource {
    pub id: Option<String>,
    pub name: Option<String>,
}

impl Article {
    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or("")
    }

    pub fn description(&self) -> &str {
        self.description.as_deref().unwrap_or("")
    }

    pub fn url(&self) -> &str {
        self.url.as_deref().unwrap_or("")
    }
}

/// First `limit` articles in provider order; all of them when `limit <= 0`.
pub fn truncate(articles: &[Article], limit: i64) -> &[Article] {
    match usize::try_from(limit) {
        Ok(n) if n > 0 => &articles[..n.min(articles.len())],
        _ => articles,
    }
}

pub fn format_article(article: &Article, markup: bool) -> String {
    if markup {
        format!("[link]({}) {}\n>{}\n", article.url(), article.title(), article.description())
    } else {
        format!("{}\n{}\nMore at {}\n\n", article.title(), article.description(), article.url())
    }
}

pub fn format_headlines(headlines: &Headlines, config: &NewsConfig) -> String {
    truncate(&headlines.articles, config.limit)
        .iter()
        .map(|a| format_article(a, config.markup))
        .collect()
}

#[derive(Debug)]
pub struct NewsService<'a> {
    transport: &'a dyn Transport,
    base_url: String,
}

impl<'a> NewsService<'a> {
    pub fn new(transport: &'a dyn Transport, base_url: impl Into<String>) -> Self {
        Self { transport, base_url: base_url.into() }
    }

    pub async fn request(&self, config: &NewsConfig) -> FetchResult<Headlines> {
        let mut request = ProviderRequest::new(IntegrationId::News, &self.base_url, "/top-headlines")
            .query("language", config.language.as_str());
        if !config.date.is_empty() {
            request = request.query("from", config.date.as_str());
        }
        request = request.query("sortBy", "popularity");
        if !config.source.is_empty() {
            request = request.query("sources", config.source.as_str());
        }
        // the free plan ignores paging, the limit is applied again when printing
        if config.limit > 0 {
            request = request.query("pageSize", config.limit.min(MAX_PAGE_SIZE).to_string());
        }
        let request = request.query("page", "1").query("apiKey", config.token.as_str());

        let result: FetchResult<Headlines> = fetch(self.transport, &request).await;
        if let FetchResult::Success(headlines) = &result {
            tracing::debug!(
                total_results = headlines.total_results,
                returned = headlines.articles.len(),
                "headlines received"
            );
        }
        result
    }

    pub async fn run<W: Write>(&self, out: &mut W, config: &NewsConfig) -> io::Result<()> {
        let output = match self.request(config).await {
            FetchResult::Success(headlines) => format_headlines(&headlines, config),
            FetchResult::Failed { message, .. } => format!("Error: {message}"),
        };

        out.write_all(output.as_bytes())
    }
}
