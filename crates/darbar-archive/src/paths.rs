//! Browsing URLs vs. real resource paths.
//!
//! The origin lists a folder either by path (`base/2025/January`) or through a
//! flat base with a `dir` query (`base/?dir=2025/January`). Folder navigation
//! keeps whichever form the listing used; files must always be addressed by
//! their real path, since the static file server ignores the query.

use reqwest::Url;

use crate::codec::{decode_segment, encode_segment};

/// Collapse a browsing URL into the real hierarchical path.
///
/// The `dir` pair may sit anywhere in the query; every other pair is dropped,
/// since the static file server ignores the query.
pub fn to_real_path(browsing_url: &str) -> String {
    let Some((base, query)) = browsing_url.split_once('?') else {
        return browsing_url.trim_end_matches('/').to_string();
    };
    let base = base.trim_end_matches('/');

    match dir_param(query) {
        Some(dir) if !dir.trim_matches('/').is_empty() => {
            format!("{}/{}", base, encode_dir(dir.trim_matches('/')))
        }
        _ => base.to_string(),
    }
}

/// Fetchable URL of `filename` inside the folder at `folder_url`.
pub fn to_file_url(folder_url: &str, filename: &str) -> String {
    format!("{}/{}", to_real_path(folder_url), encode_segment(filename))
}

/// Browsing URL of the subfolder `href` listed under `current_url`.
///
/// A query-form listing stays in query form for plain relative hrefs;
/// everything else resolves as a standard relative reference.
pub fn child_folder_url(current_url: &str, href: &str) -> String {
    let base = match Url::parse(current_url) {
        Ok(url) => url,
        Err(_) => return fallback_join(current_url, href),
    };

    let current_dir = base
        .query()
        .and_then(dir_param)
        .filter(|dir| !dir.is_empty());

    match current_dir {
        Some(dir) if is_plain_relative(href) => {
            let next_dir = format!("{}/{}", dir.trim_end_matches('/'), href);
            let dir_pair = format!("dir={}", encode_dir(&next_dir));
            let query = base
                .query()
                .unwrap_or_default()
                .split('&')
                .map(|pair| {
                    if pair == "dir" || pair.starts_with("dir=") {
                        dir_pair.clone()
                    } else {
                        pair.to_string()
                    }
                })
                .collect::<Vec<_>>()
                .join("&");
            let mut next = base;
            next.set_query(Some(&query));
            next.to_string()
        }
        _ => base
            .join(href)
            .map(|url| url.to_string())
            .unwrap_or_else(|_| fallback_join(current_url, href)),
    }
}

/// Decoded value of the first `dir` pair of a raw query string.
fn dir_param(query: &str) -> Option<String> {
    query
        .split('&')
        .find_map(|pair| match pair.split_once('=') {
            Some(("dir", value)) => Some(value),
            None if pair == "dir" => Some(""),
            _ => None,
        })
        .map(|raw| decode_segment(&raw.replace('+', " ")))
}

/// Encode each segment of a decoded folder chain; `/` stays literal.
fn encode_dir(dir: &str) -> String {
    dir.split('/').map(encode_segment).collect::<Vec<_>>().join("/")
}

fn is_plain_relative(href: &str) -> bool {
    !href.starts_with('?') && !href.starts_with("http") && !href.starts_with('/')
}

fn fallback_join(base: &str, href: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), href)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_real_path_from_query_form() {
        assert_eq!(
            to_real_path("https://host/kirtan/?dir=2025/January"),
            "https://host/kirtan/2025/January"
        );
        assert_eq!(
            to_real_path("https://host/kirtan?dir=2025"),
            "https://host/kirtan/2025"
        );
    }

    #[test]
    fn test_real_path_is_idempotent_on_path_form() {
        assert_eq!(to_real_path("https://host/kirtan/2025"), "https://host/kirtan/2025");
        assert_eq!(to_real_path("https://host/kirtan/2025///"), "https://host/kirtan/2025");
        let once = to_real_path("https://host/kirtan/?dir=2025");
        assert_eq!(to_real_path(&once), once);
    }

    #[test]
    fn test_file_url_uses_real_path_and_encoded_name() {
        let folder = "https://host/kirtan/?dir=2025/January";
        let name = "Asa Di Vaar (02;00).mp3";
        let url = to_file_url(folder, name);
        assert_eq!(
            url,
            "https://host/kirtan/2025/January/Asa%20Di%20Vaar%20%2802%3B00%29.mp3"
        );
        assert!(url.starts_with(&format!("{}/", to_real_path(folder))));
        assert!(url.ends_with(&encode_segment(name)));
        assert!(!url.contains("?dir="));
    }

    #[test]
    fn test_child_keeps_query_form() {
        assert_eq!(
            child_folder_url("https://host/kirtan/?dir=2025/", "January"),
            "https://host/kirtan/?dir=2025/January"
        );
        assert_eq!(
            child_folder_url("https://host/kirtan/?dir=2025", "New Folder"),
            "https://host/kirtan/?dir=2025/New%20Folder"
        );
    }

    #[test]
    fn test_child_keeps_other_query_pairs() {
        assert_eq!(
            child_folder_url("https://host/kirtan/?sort=name&dir=2025", "May"),
            "https://host/kirtan/?sort=name&dir=2025/May"
        );
    }

    #[test]
    fn test_child_reencodes_reserved_characters_in_dir() {
        let url = child_folder_url("https://host/ragiwise/?dir=Bhai%20A%20%26%20Party", "2024");
        assert_eq!(url, "https://host/ragiwise/?dir=Bhai%20A%20%26%20Party/2024");
        let dir = Url::parse(&url)
            .unwrap()
            .query_pairs()
            .find(|(k, _)| k == "dir")
            .map(|(_, v)| v.into_owned());
        assert_eq!(dir.as_deref(), Some("Bhai A & Party/2024"));
        assert_eq!(
            to_file_url(&url, "x.mp3"),
            "https://host/ragiwise/Bhai%20A%20%26%20Party/2024/x.mp3"
        );

        let url = child_folder_url("https://host/kirtan/?dir=C%2B%2B%20100%25", "May");
        assert_eq!(url, "https://host/kirtan/?dir=C%2B%2B%20100%25/May");
        let dir = Url::parse(&url)
            .unwrap()
            .query_pairs()
            .find(|(k, _)| k == "dir")
            .map(|(_, v)| v.into_owned());
        assert_eq!(dir.as_deref(), Some("C++ 100%/May"));
    }

    #[test]
    fn test_child_encodes_reserved_characters_in_href() {
        assert_eq!(
            child_folder_url("https://host/kirtan/?dir=2025", "Rock & Roll+1"),
            "https://host/kirtan/?dir=2025/Rock%20%26%20Roll%2B1"
        );
    }

    #[test]
    fn test_real_path_finds_dir_anywhere_in_query() {
        assert_eq!(
            to_real_path("https://host/kirtan/?sort=name&dir=2025/May"),
            "https://host/kirtan/2025/May"
        );
        let folder = child_folder_url("https://host/kirtan/?sort=name&dir=2025", "May");
        assert_eq!(
            to_file_url(&folder, "x.mp3"),
            "https://host/kirtan/2025/May/x.mp3"
        );
        // Form-encoded spaces
        assert_eq!(
            to_real_path("https://host/kirtan/?dir=Bhai+A"),
            "https://host/kirtan/Bhai%20A"
        );
    }

    #[test]
    fn test_real_path_drops_query_without_dir() {
        assert_eq!(to_real_path("https://host/kirtan/?sort=name"), "https://host/kirtan");
        assert_eq!(to_real_path("https://host/kirtan/?dir="), "https://host/kirtan");
    }

    #[test]
    fn test_child_query_href_resolves_against_base() {
        assert_eq!(
            child_folder_url("https://host/kirtan/", "?dir=2025"),
            "https://host/kirtan/?dir=2025"
        );
        assert_eq!(
            child_folder_url("https://host/kirtan/?dir=2025", "?dir=2025/March"),
            "https://host/kirtan/?dir=2025/March"
        );
    }

    #[test]
    fn test_child_path_form_resolves_relative() {
        assert_eq!(
            child_folder_url("https://host/ragiwise/Bhai%20X/", "2024/"),
            "https://host/ragiwise/Bhai%20X/2024/"
        );
        assert_eq!(
            child_folder_url("https://host/ragiwise/Bhai%20X/", "/kirtan/"),
            "https://host/kirtan/"
        );
    }

    #[test]
    fn test_child_fallback_for_unparseable_base() {
        assert_eq!(child_folder_url("/api/sgpc/kirtan/", "2025"), "/api/sgpc/kirtan/2025");
    }
}
