//! Quote dataset sources.
//!
//! A dataset is a JSON array of `{ "id": <int>, "message": <string> }`
//! records with strictly ascending ids. It is read once, when the store is
//! first initialized.

use std::path::{Path, PathBuf};

use reqwest::Client;
use tracing::debug;
use url::Url;

use crate::error::LoadError;
use crate::quote::QuoteSeed;

const BUILTIN_QUOTES: &str = include_str!("../assets/quotes.json");
const USER_AGENT: &str = "dailyquote";

/// Anything that can produce the ordered quote dataset.
#[allow(async_fn_in_trait)]
pub trait DatasetSource {
    async fn fetch(&self) -> Result<Vec<QuoteSeed>, LoadError>;
}

/// Parse and check a dataset body.
///
/// # Errors
/// Returns [`LoadError::Parse`] for invalid JSON and [`LoadError::Malformed`]
/// for an empty dataset or ids that are not strictly ascending.
pub fn parse_dataset(body: &str) -> Result<Vec<QuoteSeed>, LoadError> {
    let seeds: Vec<QuoteSeed> = serde_json::from_str(body)?;
    if seeds.is_empty() {
        return Err(LoadError::Malformed("dataset contains no quotes".into()));
    }
    for pair in seeds.windows(2) {
        if pair[1].id <= pair[0].id {
            return Err(LoadError::Malformed(format!(
                "ids must be strictly ascending, found {} after {}",
                pair[1].id, pair[0].id
            )));
        }
    }
    Ok(seeds)
}

/// The dataset compiled into this crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinDataset;

impl DatasetSource for BuiltinDataset {
    async fn fetch(&self) -> Result<Vec<QuoteSeed>, LoadError> {
        parse_dataset(BUILTIN_QUOTES)
    }
}

/// A dataset held in memory.
#[derive(Debug, Clone, Default)]
pub struct StaticDataset {
    seeds: Vec<QuoteSeed>,
}

impl StaticDataset {
    pub fn new(seeds: Vec<QuoteSeed>) -> Self {
        Self { seeds }
    }
}

impl DatasetSource for StaticDataset {
    async fn fetch(&self) -> Result<Vec<QuoteSeed>, LoadError> {
        Ok(self.seeds.clone())
    }
}

/// A dataset read from a local JSON file.
#[derive(Debug, Clone)]
pub struct FileDataset {
    path: PathBuf,
}

impl FileDataset {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DatasetSource for FileDataset {
    async fn fetch(&self) -> Result<Vec<QuoteSeed>, LoadError> {
        let body = std::fs::read_to_string(&self.path).map_err(|source| LoadError::Read {
            path: self.path.clone(),
            source,
        })?;
        let seeds = parse_dataset(&body)?;
        debug!(path = %self.path.display(), count = seeds.len(), "read dataset file");
        Ok(seeds)
    }
}

/// A dataset fetched over HTTP(S).
#[derive(Debug, Clone)]
pub struct HttpDataset {
    url: Url,
    client: Client,
}

impl HttpDataset {
    /// # Errors
    /// Returns [`LoadError::InvalidSource`] unless `url` is an http(s) URL.
    pub fn new(url: &str) -> Result<Self, LoadError> {
        let url = Url::parse(url).map_err(|_| LoadError::InvalidSource(url.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(LoadError::InvalidSource(url.to_string()));
        }
        Ok(Self {
            url,
            client: Client::new(),
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

impl DatasetSource for HttpDataset {
    async fn fetch(&self) -> Result<Vec<QuoteSeed>, LoadError> {
        let response = self
            .client
            .get(self.url.clone())
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(LoadError::Status {
                url: self.url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        let seeds = parse_dataset(&body)?;
        debug!(url = %self.url, count = seeds.len(), "fetched dataset");
        Ok(seeds)
    }
}

/// Dataset selected from a configuration string.
#[derive(Debug, Clone)]
pub enum Dataset {
    Builtin(BuiltinDataset),
    File(FileDataset),
    Http(HttpDataset),
}

impl Dataset {
    /// Interpret `source`: `builtin`, an http(s) URL, or a file path.
    ///
    /// # Errors
    /// Returns [`LoadError::InvalidSource`] for an empty source or a URL that
    /// cannot be parsed.
    pub fn from_source(source: &str) -> Result<Self, LoadError> {
        let source = source.trim();
        if source.is_empty() {
            return Err(LoadError::InvalidSource(String::new()));
        }
        if source.eq_ignore_ascii_case("builtin") {
            return Ok(Self::Builtin(BuiltinDataset));
        }
        if source.starts_with("http://") || source.starts_with("https://") {
            return HttpDataset::new(source).map(Self::Http);
        }
        Ok(Self::File(FileDataset::new(source)))
    }
}

impl DatasetSource for Dataset {
    async fn fetch(&self) -> Result<Vec<QuoteSeed>, LoadError> {
        match self {
            Self::Builtin(d) => d.fetch().await,
            Self::File(d) => d.fetch().await,
            Self::Http(d) => d.fetch().await,
        }
    }
}
