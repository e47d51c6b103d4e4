//! `fetch_directory`: the single entry point consumers browse through.

use anyhow::Context;
use reqwest::{Client, Url};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::classification::ClassificationIndex;
use crate::config::Config;
use crate::entry::DirectoryEntry;
use crate::error::ArchiveError;
use crate::listing::parse_listing;
use crate::source::{ArchiveRoots, Source};

/// Routes folder URLs to the live listing scraper or the classification
/// taxonomy and returns a uniform entry list.
pub struct ArchiveClient {
    http: Client,
    roots: ArchiveRoots,
    index: Arc<ClassificationIndex>,
}

impl ArchiveClient {
    pub fn new(http: Client, roots: ArchiveRoots, index: Arc<ClassificationIndex>) -> Self {
        Self { http, roots, index }
    }

    /// Build the HTTP client and dataset from the loaded config.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let http = Client::builder()
            .user_agent(config.client.user_agent.clone())
            .timeout(Duration::from_secs(config.client.timeout_secs))
            .build()
            .context("failed to build reqwest client")?;

        let index = match &config.archive.dataset {
            Some(path) => ClassificationIndex::from_file(path)?,
            None => ClassificationIndex::bundled(),
        };

        Ok(Self::new(
            http,
            ArchiveRoots::from(&config.archive),
            Arc::new(index),
        ))
    }

    pub fn roots(&self) -> &ArchiveRoots {
        &self.roots
    }

    pub fn index(&self) -> &ClassificationIndex {
        &self.index
    }

    pub fn source_for(&self, url: &str) -> Source {
        self.roots.source_for(url)
    }

    /// List the folder at `url`.
    ///
    /// Never fails: transport and status errors are logged and surface as an
    /// empty folder.
    pub async fn fetch_directory(&self, url: &str) -> Vec<DirectoryEntry> {
        match self.try_fetch_directory(url).await {
            Ok(entries) => entries,
            Err(e) => {
                warn!("[archive] listing {} unavailable: {}", url, e);
                Vec::new()
            }
        }
    }

    /// As [`fetch_directory`](Self::fetch_directory), but reports why a live
    /// listing could not be loaded.
    pub async fn try_fetch_directory(&self, url: &str) -> Result<Vec<DirectoryEntry>, ArchiveError> {
        match self.source_for(url) {
            Source::Classification(segments) => {
                debug!("[archive] classification {:?}", segments);
                Ok(self.index.query(&self.roots.classification, &segments))
            }
            Source::Scrape(url) => self.scrape(&url).await,
        }
    }

    async fn scrape(&self, url: &str) -> Result<Vec<DirectoryEntry>, ArchiveError> {
        let parsed = Url::parse(url).map_err(|e| ArchiveError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        debug!("[archive] GET {}", url);
        let response = self
            .http
            .get(parsed)
            .header("Accept", "text/html")
            .send()
            .await
            .map_err(|source| ArchiveError::Transport {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ArchiveError::Status {
                url: url.to_string(),
                status,
            });
        }

        let html = response.text().await.map_err(|source| ArchiveError::Body {
            url: url.to_string(),
            source,
        })?;

        Ok(parse_listing(&html, url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> ArchiveClient {
        ArchiveClient::new(
            Client::new(),
            ArchiveRoots::new(
                "http://127.0.0.1:9/kirtan/",
                "http://127.0.0.1:9/ragiwise/",
                "http://127.0.0.1:9/classification/",
            ),
            Arc::new(ClassificationIndex::from_text(
                "h\nBhai A,Mon,One.mp3,https://host/One.mp3,Tin Pehar\n\
                 Bhai B,Tue,Two.mp3,https://host/Two.mp3,Tin Pehar\n",
            )),
        )
    }

    #[tokio::test]
    async fn test_classification_is_served_without_network() {
        let client = client();
        let entries = client
            .fetch_directory("http://127.0.0.1:9/classification/Tin%20Pehar")
            .await;
        let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Bhai A", "Bhai B"]);
    }

    #[tokio::test]
    async fn test_invalid_url_is_soft_failure() {
        let client = client();
        assert!(client.fetch_directory("not a url").await.is_empty());
        assert!(matches!(
            client.try_fetch_directory("not a url").await,
            Err(ArchiveError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn test_from_config_with_missing_dataset_fails() {
        let mut config = Config::default();
        config.archive.dataset = Some("/definitely/not/here.csv".into());
        assert!(ArchiveClient::from_config(&config).is_err());
    }

    #[test]
    fn test_from_config_uses_configured_roots() {
        let client = ArchiveClient::from_config(&Config::default()).unwrap();
        assert_eq!(client.roots().ragiwise, "https://sgpc.net/ragiwise/");
        assert!(!client.index().records().is_empty());
    }
}
