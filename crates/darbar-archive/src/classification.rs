//! Duty-type / performer taxonomy over the bundled classification dataset.
//!
//! ## Dataset
//!
//!   performer,day,name,url,dutyType
//!
//! The first line is a header. `name` may itself contain commas, so rows are
//! anchored on the first absolute URL token: everything between `day` and the
//! URL is the name, the token after the URL is the duty type. Rows without a
//! URL are dropped.
//!
//! ## Navigation
//!
//!   <root>/                    duty types, led by the "all tracks" pseudo-duty
//!   <root>/<duty>              performers on that duty (or every track)
//!   <root>/<duty>/<performer>  that performer's tracks
//!
//! Segments are percent-encoded. Track URLs come straight from the dataset and
//! are already real paths.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::OnceLock;
use tracing::{debug, info};

use crate::codec::encode_segment;
use crate::entry::DirectoryEntry;

/// Pseudo-duty whose selection lists every track in the dataset.
pub const ALL_TRACKS_LABEL: &str = "All Kirtan Hazris";

const BUNDLED_DATASET: &str = include_str!("../data/classified_ragi_duties.csv");

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationRecord {
    pub performer: String,
    pub day: String,
    pub track_name: String,
    pub track_url: String,
    pub duty_type: String,
}

/// Parse the whole dataset. Malformed rows are skipped, never fatal.
pub fn parse_records(text: &str) -> Vec<ClassificationRecord> {
    let mut records = Vec::new();
    let mut dropped = 0usize;

    for line in text.lines().skip(1) {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match parse_row(line) {
            Some(record) => records.push(record),
            None => {
                dropped += 1;
                debug!("[classification] dropping row without url: {}", line);
            }
        }
    }

    if dropped > 0 {
        debug!("[classification] {} malformed rows dropped", dropped);
    }
    records
}

fn parse_row(line: &str) -> Option<ClassificationRecord> {
    let fields: Vec<&str> = line.split(',').collect();
    let url_idx = fields.iter().skip(2).position(|f| looks_like_url(f))? + 2;

    Some(ClassificationRecord {
        performer: fields[0].trim().to_string(),
        day: fields[1].trim().to_string(),
        track_name: fields[2..url_idx].join(",").trim().to_string(),
        track_url: fields[url_idx].trim().to_string(),
        duty_type: fields
            .get(url_idx + 1)
            .map(|f| f.trim().to_string())
            .unwrap_or_default(),
    })
}

fn looks_like_url(field: &str) -> bool {
    let field = field.trim();
    field.starts_with("http://") || field.starts_with("https://")
}

/// Lazily parsed, immutable record set plus the taxonomy derived from it.
///
/// Construct once at startup and share behind an `Arc`; the first call to
/// [`records`](Self::records) parses, later calls return the same slice.
pub struct ClassificationIndex {
    text: String,
    records: OnceLock<Vec<ClassificationRecord>>,
}

impl ClassificationIndex {
    /// Index over the dataset compiled into the crate.
    pub fn bundled() -> Self {
        Self::from_text(BUNDLED_DATASET)
    }

    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            records: OnceLock::new(),
        }
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading classification dataset {}", path.display()))?;
        Ok(Self::from_text(text))
    }

    pub fn records(&self) -> &[ClassificationRecord] {
        self.records.get_or_init(|| {
            let records = parse_records(&self.text);
            info!("[classification] loaded {} records", records.len());
            records
        })
    }

    /// Distinct, non-empty duty types, sorted.
    pub fn duty_types(&self) -> Vec<&str> {
        self.records()
            .iter()
            .map(|r| r.duty_type.as_str())
            .filter(|d| !d.is_empty())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Distinct, non-empty performers on `duty_type`, sorted.
    pub fn performers(&self, duty_type: &str) -> Vec<&str> {
        self.records()
            .iter()
            .filter(|r| r.duty_type == duty_type)
            .map(|r| r.performer.as_str())
            .filter(|p| !p.is_empty())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Entries for the folder `segments` (decoded) below `root_url`.
    pub fn query(&self, root_url: &str, segments: &[String]) -> Vec<DirectoryEntry> {
        let root = format!("{}/", root_url.trim_end_matches('/'));

        match segments {
            [] => std::iter::once(ALL_TRACKS_LABEL)
                .chain(self.duty_types())
                .map(|duty| DirectoryEntry::folder(duty, format!("{}{}", root, encode_segment(duty))))
                .collect(),
            [duty] if duty == ALL_TRACKS_LABEL => self
                .records()
                .iter()
                .map(record_entry)
                .collect(),
            [duty] => self
                .performers(duty)
                .into_iter()
                .map(|performer| {
                    DirectoryEntry::folder(
                        performer,
                        format!(
                            "{}{}/{}",
                            root,
                            encode_segment(duty),
                            encode_segment(performer)
                        ),
                    )
                })
                .collect(),
            [duty, performer, ..] => self
                .records()
                .iter()
                .filter(|r| &r.duty_type == duty && &r.performer == performer)
                .map(record_entry)
                .collect(),
        }
    }
}

impl Default for ClassificationIndex {
    fn default() -> Self {
        Self::bundled()
    }
}

fn record_entry(record: &ClassificationRecord) -> DirectoryEntry {
    DirectoryEntry::track(record.track_name.clone(), record.track_url.clone())
}
