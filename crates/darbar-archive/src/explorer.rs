//! Browsing session over an [`ArchiveClient`].
//!
//! Holds the current tab, folder, sorted entries, back-history and search
//! filter. Loads race freely; each one takes a ticket from a monotonically
//! increasing counter and its result is applied only if no newer load has
//! started since (last request wins). History changes travel with the
//! result, so a superseded navigation leaves no trace. Tickets are drawn
//! while holding the state lock, so the history a load was planned against
//! is the history it is applied to.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::archive::ArchiveClient;
use crate::entry::{sort_entries, DirectoryEntry};
use crate::source::ArchiveRoots;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tab {
    /// Chronological archive.
    Years,
    /// Archive grouped by performer.
    Ragis,
    /// Duty-type taxonomy.
    Classification,
}

impl Tab {
    pub const ALL: [Tab; 3] = [Tab::Years, Tab::Ragis, Tab::Classification];

    pub fn root<'a>(&self, roots: &'a ArchiveRoots) -> &'a str {
        match self {
            Self::Years => &roots.kirtan,
            Self::Ragis => &roots.ragiwise,
            Self::Classification => &roots.classification,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Years => "By Year",
            Self::Ragis => "By Ragi",
            Self::Classification => "Classification",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "years" | "year" | "y" => Some(Self::Years),
            "ragis" | "ragi" | "r" => Some(Self::Ragis),
            "classification" | "c" => Some(Self::Classification),
            _ => None,
        }
    }
}

/// Clonable snapshot of the session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplorerView {
    pub tab: Tab,
    pub current_url: String,
    /// Sorted, unfiltered listing of `current_url`.
    pub entries: Vec<DirectoryEntry>,
    pub history: Vec<String>,
    pub filter: String,
    pub loading: bool,
    /// Bumped on every state change.
    pub rev: u64,
}

impl ExplorerView {
    /// Entries passing the current filter, in display order.
    pub fn visible(&self) -> Vec<&DirectoryEntry> {
        self.entries
            .iter()
            .filter(|e| e.matches(&self.filter))
            .collect()
    }

    /// Every playable track of the current listing.
    pub fn playlist(&self) -> Vec<DirectoryEntry> {
        self.entries.iter().filter(|e| e.is_audio).cloned().collect()
    }

    pub fn can_go_back(&self) -> bool {
        !self.history.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum LoadOutcome {
    Applied { entries: usize },
    /// A newer load started before this one finished; its result was dropped.
    Superseded,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayRequest {
    pub track: DirectoryEntry,
    pub playlist: Vec<DirectoryEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Selection {
    Opened { outcome: LoadOutcome },
    Play(PlayRequest),
}

enum HistoryOp {
    Reset,
    Push(String),
    Pop,
    Keep,
}

pub struct Explorer {
    client: Arc<ArchiveClient>,
    state: Arc<RwLock<ExplorerView>>,
    latest: AtomicU64,
}

impl Explorer {
    /// New session positioned at `tab`'s root. Nothing is loaded until the
    /// first navigation call.
    pub fn new(client: Arc<ArchiveClient>, tab: Tab) -> Self {
        let view = ExplorerView {
            tab,
            current_url: tab.root(client.roots()).to_string(),
            entries: Vec::new(),
            history: Vec::new(),
            filter: String::new(),
            loading: false,
            rev: 1,
        };
        Self {
            client,
            state: Arc::new(RwLock::new(view)),
            latest: AtomicU64::new(0),
        }
    }

    pub async fn snapshot(&self) -> ExplorerView {
        self.state.read().await.clone()
    }

    /// Switch tab and load its root, clearing history and filter.
    pub async fn select_tab(&self, tab: Tab) -> LoadOutcome {
        let ticket = self.next_ticket();
        let root = tab.root(self.client.roots()).to_string();
        info!("[explorer] tab {:?}", tab);
        self.load(ticket, root, tab, HistoryOp::Reset).await
    }

    /// Descend into the folder at `url`.
    pub async fn open(&self, url: &str) -> LoadOutcome {
        let (ticket, current, tab) = {
            let s = self.state.read().await;
            (self.next_ticket(), s.current_url.clone(), s.tab)
        };
        self.load(ticket, url.to_string(), tab, HistoryOp::Push(current))
            .await
    }

    /// Return to the previous folder. `None` when there is no history.
    pub async fn back(&self) -> Option<LoadOutcome> {
        let (ticket, previous, tab) = {
            let s = self.state.read().await;
            let previous = s.history.last().cloned()?;
            (self.next_ticket(), previous, s.tab)
        };
        Some(self.load(ticket, previous, tab, HistoryOp::Pop).await)
    }

    /// Reload the current folder.
    pub async fn refresh(&self) -> LoadOutcome {
        let (ticket, current, tab) = {
            let s = self.state.read().await;
            (self.next_ticket(), s.current_url.clone(), s.tab)
        };
        self.load(ticket, current, tab, HistoryOp::Keep).await
    }

    /// Act on the `index`-th visible entry: open a folder or hand back a
    /// track together with the folder's playlist.
    pub async fn select(&self, index: usize) -> Option<Selection> {
        let view = self.snapshot().await;
        let entry = view.visible().get(index).map(|e| (*e).clone())?;

        if entry.is_audio {
            return Some(Selection::Play(PlayRequest {
                track: entry,
                playlist: view.playlist(),
            }));
        }
        let outcome = self.open(&entry.url).await;
        Some(Selection::Opened { outcome })
    }

    pub async fn set_filter(&self, query: &str) {
        let mut s = self.state.write().await;
        s.filter = query.trim().to_string();
        s.rev += 1;
    }

    fn next_ticket(&self) -> u64 {
        self.latest.fetch_add(1, Ordering::SeqCst) + 1
    }

    async fn load(&self, ticket: u64, url: String, tab: Tab, op: HistoryOp) -> LoadOutcome {
        {
            let mut s = self.state.write().await;
            if self.latest.load(Ordering::SeqCst) == ticket {
                s.loading = true;
                s.rev += 1;
            }
        }

        let mut entries = self.client.fetch_directory(&url).await;
        sort_entries(&mut entries);

        let mut s = self.state.write().await;
        if self.latest.load(Ordering::SeqCst) != ticket {
            debug!("[explorer] dropping stale listing #{} for {}", ticket, url);
            return LoadOutcome::Superseded;
        }

        match op {
            HistoryOp::Reset => s.history.clear(),
            HistoryOp::Push(previous) => s.history.push(previous),
            HistoryOp::Pop => {
                s.history.pop();
            }
            HistoryOp::Keep => {}
        }

        let count = entries.len();
        s.tab = tab;
        s.current_url = url;
        s.entries = entries;
        s.filter.clear();
        s.loading = false;
        s.rev += 1;
        debug!("[explorer] applied listing #{} ({} entries)", ticket, count);
        LoadOutcome::Applied { entries: count }
    }
}
