use serde::{Deserialize, Serialize};

use crate::codec::decode_segment;
use crate::config::ArchiveConfig;

/// The three browsing roots the resolver is configured with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveRoots {
    pub kirtan: String,
    pub ragiwise: String,
    pub classification: String,
}

impl ArchiveRoots {
    pub fn new(
        kirtan: impl Into<String>,
        ragiwise: impl Into<String>,
        classification: impl Into<String>,
    ) -> Self {
        Self {
            kirtan: kirtan.into(),
            ragiwise: ragiwise.into(),
            classification: classification.into(),
        }
    }

    /// Decide once, at the boundary, where `url` is served from.
    pub fn source_for(&self, url: &str) -> Source {
        let root = self.classification.trim_end_matches('/');

        let rest = match url.strip_prefix(root) {
            Some("") => Some(""),
            Some(rest) if rest.starts_with('/') => Some(rest),
            _ => None,
        };

        match rest {
            Some(rest) => Source::Classification(
                rest.split('/')
                    .filter(|s| !s.is_empty())
                    .map(decode_segment)
                    .collect(),
            ),
            None => Source::Scrape(url.to_string()),
        }
    }
}

impl From<&ArchiveConfig> for ArchiveRoots {
    fn from(config: &ArchiveConfig) -> Self {
        Self::new(
            config.kirtan_base.clone(),
            config.ragiwise_base.clone(),
            config.classification_base.clone(),
        )
    }
}

impl Default for ArchiveRoots {
    fn default() -> Self {
        Self::from(&ArchiveConfig::default())
    }
}

/// Where a folder listing comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// Live directory-listing page at this URL.
    Scrape(String),
    /// In-memory taxonomy; decoded path segments below the classification root.
    Classification(Vec<String>),
}
