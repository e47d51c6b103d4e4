//! Favorites persistence.
//!
//! A JSON array of `{ id, title, type, url, date }` where `type` is one of
//! `live`, `local`, `remote` and `date` is epoch milliseconds. Listed newest
//! first. A missing file is an empty list.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::PathBuf;
use tokio::sync::Mutex;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FavoriteKind {
    /// The live stream.
    Live,
    /// A clip saved on this device.
    Local,
    /// An archive track.
    Remote,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FavoriteItem {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: FavoriteKind,
    pub url: String,
    pub date: i64,
}

pub struct FavoritesStore {
    path: PathBuf,
    // Serializes read-modify-write cycles on the file
    lock: Mutex<()>,
}

impl FavoritesStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            lock: Mutex::new(()),
        }
    }

    #[cfg(test)]
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    pub async fn list(&self) -> anyhow::Result<Vec<FavoriteItem>> {
        let _guard = self.lock.lock().await;
        let mut items = self.read_all().await?;
        items.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(items)
    }

    /// Add a favorite. Re-adding a URL returns the existing item.
    pub async fn add(
        &self,
        title: &str,
        kind: FavoriteKind,
        url: &str,
    ) -> anyhow::Result<FavoriteItem> {
        let _guard = self.lock.lock().await;
        let mut items = self.read_all().await?;

        if let Some(existing) = items.iter().find(|f| f.url == url) {
            return Ok(existing.clone());
        }

        let date = chrono::Utc::now().timestamp_millis();
        let item = FavoriteItem {
            id: make_id(date, url),
            title: title.to_string(),
            kind,
            url: url.to_string(),
            date,
        };
        items.push(item.clone());
        self.write_all(&items).await?;
        info!("[favorites] added {} ({})", item.title, item.id);
        Ok(item)
    }

    /// Remove by id. Returns false when nothing matched.
    pub async fn remove(&self, id: &str) -> anyhow::Result<bool> {
        let _guard = self.lock.lock().await;
        let mut items = self.read_all().await?;
        let before = items.len();
        items.retain(|f| f.id != id);
        if items.len() == before {
            return Ok(false);
        }
        self.write_all(&items).await?;
        info!("[favorites] removed {}", id);
        Ok(true)
    }

    async fn read_all(&self) -> anyhow::Result<Vec<FavoriteItem>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(e).with_context(|| format!("reading {}", self.path.display()))
            }
        };
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&content)
            .with_context(|| format!("parsing favorites {}", self.path.display()))
    }

    async fn write_all(&self, items: &[FavoriteItem]) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_string_pretty(items)?;
        tokio::fs::write(&self.path, json)
            .await
            .with_context(|| format!("writing {}", self.path.display()))
    }
}

/// Short id: hex hash of timestamp + url.
fn make_id(date_millis: i64, url: &str) -> String {
    let mut h = DefaultHasher::new();
    date_millis.hash(&mut h);
    url.hash(&mut h);
    format!("{:016x}", h.finish())
}
