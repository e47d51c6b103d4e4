use serde::{Deserialize, Serialize};

use crate::codec::decode_segment;

/// One row of a folder view, whichever source produced it.
///
/// Files always carry a real, directly fetchable URL; folders carry a
/// browsing URL. The archive only holds mp3 audio and folders, so
/// `is_file == is_audio` for every entry built through the constructors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryEntry {
    pub name: String,
    pub url: String,
    pub is_file: bool,
    pub is_audio: bool,
}

impl DirectoryEntry {
    pub fn folder(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            is_file: false,
            is_audio: false,
        }
    }

    pub fn track(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            is_file: true,
            is_audio: true,
        }
    }

    /// Human-readable label: percent-decoded, first `.mp3` (any case) dropped.
    pub fn display_name(&self) -> String {
        let mut name = decode_segment(&self.name);
        // ASCII lowering keeps byte offsets aligned with `name`
        if let Some(at) = name.to_ascii_lowercase().find(".mp3") {
            name.replace_range(at..at + ".mp3".len(), "");
        }
        name
    }

    /// Case-insensitive substring match on the display name. Empty matches all.
    pub fn matches(&self, query: &str) -> bool {
        if query.is_empty() {
            return true;
        }
        self.display_name()
            .to_lowercase()
            .contains(&query.to_lowercase())
    }
}

/// True for names the archive serves as playable audio.
pub fn is_audio_name(name: &str) -> bool {
    name.to_lowercase().ends_with(".mp3")
}

/// Presentation order: folders first, then by display name ignoring case.
pub fn sort_entries(entries: &mut [DirectoryEntry]) {
    entries.sort_by_cached_key(|e| (e.is_file, e.display_name().to_lowercase(), e.name.clone()));
}
