//! Directory-listing HTML parsing

use scraper::{Html, Selector};
use tracing::debug;

use crate::entry::{is_audio_name, DirectoryEntry};
use crate::paths::{child_folder_url, to_file_url};

/// Items of the listing container, in document order.
const LISTING_ITEMS: &str = "#directory-listing li";
const PARENT_MARKER: &str = "..";

/// Extract entries from a listing page fetched from `base_url`.
///
/// Each `li` carries `data-name` and `data-href`. Items missing either, and
/// the parent-directory item, are skipped. Anything not named `*.mp3` is a
/// folder. An unexpected page shape yields an empty list, same as an empty
/// folder.
pub fn parse_listing(html: &str, base_url: &str) -> Vec<DirectoryEntry> {
    let document = Html::parse_document(html);

    let mut entries = Vec::new();
    let Some(selector) = Selector::parse(LISTING_ITEMS).ok() else {
        return entries;
    };

    for item in document.select(&selector) {
        let element = item.value();
        let (Some(name), Some(href)) = (element.attr("data-name"), element.attr("data-href"))
        else {
            continue;
        };
        if name.is_empty() || href.is_empty() || name == PARENT_MARKER {
            continue;
        }

        let entry = if is_audio_name(name) {
            DirectoryEntry::track(name, to_file_url(base_url, name))
        } else {
            DirectoryEntry::folder(name, child_folder_url(base_url, href))
        };
        entries.push(entry);
    }

    debug!("parsed {} entries from listing {}", entries.len(), base_url);
    entries
}
