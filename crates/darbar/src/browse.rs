//! Line-driven archive browser on stdin/stdout.

use darbar_archive::explorer::{Explorer, ExplorerView, LoadOutcome, Selection, Tab};
use std::fmt::Write as _;
use tokio::io::{AsyncBufReadExt, BufReader};

const HELP: &str = "\
  <n>        open folder / play track n
  b          back
  /<query>   filter this folder (bare / clears)
  t <tab>    switch tab: years, ragis, classification
  r          refresh
  h          help
  q          quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowseCommand {
    /// Zero-based index into the visible entries.
    Select(usize),
    Back,
    Filter(String),
    ClearFilter,
    Tab(Tab),
    Refresh,
    Help,
    Quit,
}

pub fn parse_command(line: &str) -> Option<BrowseCommand> {
    let line = line.trim();
    if let Some(query) = line.strip_prefix('/') {
        let query = query.trim();
        return Some(if query.is_empty() {
            BrowseCommand::ClearFilter
        } else {
            BrowseCommand::Filter(query.to_string())
        });
    }
    if let Some(tab) = line.strip_prefix("t ") {
        return Tab::from_name(tab).map(BrowseCommand::Tab);
    }
    match line {
        "b" | "back" => Some(BrowseCommand::Back),
        "r" | "refresh" => Some(BrowseCommand::Refresh),
        "h" | "help" | "?" => Some(BrowseCommand::Help),
        "q" | "quit" | "exit" => Some(BrowseCommand::Quit),
        _ => match line.parse::<usize>() {
            Ok(n) if n > 0 => Some(BrowseCommand::Select(n - 1)),
            _ => None,
        },
    }
}

pub fn render_view(view: &ExplorerView) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "── {} ── {}", view.tab.label(), view.current_url);
    if !view.filter.is_empty() {
        let _ = writeln!(out, "filter: {}", view.filter);
    }

    let visible = view.visible();
    if visible.is_empty() {
        let _ = writeln!(
            out,
            "  {}",
            if view.filter.is_empty() { "Empty Directory" } else { "No results found" }
        );
    }
    for (i, entry) in visible.iter().enumerate() {
        let marker = if entry.is_audio { "♪" } else { "▸" };
        let _ = writeln!(out, "{:>4}  {} {}", i + 1, marker, entry.display_name());
    }
    out
}

pub async fn run(explorer: &Explorer, tab: Tab) -> anyhow::Result<()> {
    explorer.select_tab(tab).await;
    println!("{}", render_view(&explorer.snapshot().await));
    println!("h for help");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let Some(command) = parse_command(&line) else {
            if !line.trim().is_empty() {
                println!("? unknown command, h for help");
            }
            continue;
        };

        match command {
            BrowseCommand::Quit => break,
            BrowseCommand::Help => {
                println!("{}", HELP);
                continue;
            }
            BrowseCommand::Back => {
                if explorer.back().await.is_none() {
                    println!("already at the top");
                    continue;
                }
            }
            BrowseCommand::Refresh => {
                explorer.refresh().await;
            }
            BrowseCommand::Tab(tab) => {
                explorer.select_tab(tab).await;
            }
            BrowseCommand::Filter(query) => explorer.set_filter(&query).await,
            BrowseCommand::ClearFilter => explorer.set_filter("").await,
            BrowseCommand::Select(index) => match explorer.select(index).await {
                None => {
                    println!("no entry {}", index + 1);
                    continue;
                }
                Some(Selection::Play(request)) => {
                    println!("▶ {}", request.track.display_name());
                    println!("  {}", request.track.url);
                    println!("  playlist: {} tracks", request.playlist.len());
                    continue;
                }
                Some(Selection::Opened {
                    outcome: LoadOutcome::Superseded,
                }) => continue,
                Some(Selection::Opened { .. }) => {}
            },
        }

        println!("{}", render_view(&explorer.snapshot().await));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use darbar_archive::DirectoryEntry;

    #[test]
    fn test_parse_command() {
        assert_eq!(parse_command("3"), Some(BrowseCommand::Select(2)));
        assert_eq!(parse_command("0"), None);
        assert_eq!(parse_command(" b "), Some(BrowseCommand::Back));
        assert_eq!(
            parse_command("/asa di"),
            Some(BrowseCommand::Filter("asa di".to_string()))
        );
        assert_eq!(parse_command("/"), Some(BrowseCommand::ClearFilter));
        assert_eq!(
            parse_command("t ragis"),
            Some(BrowseCommand::Tab(Tab::Ragis))
        );
        assert_eq!(parse_command("t nowhere"), None);
        assert_eq!(parse_command("q"), Some(BrowseCommand::Quit));
        assert_eq!(parse_command("what"), None);
    }

    fn view(entries: Vec<DirectoryEntry>, filter: &str) -> ExplorerView {
        ExplorerView {
            tab: Tab::Years,
            current_url: "https://host/kirtan/".to_string(),
            entries,
            history: Vec::new(),
            filter: filter.to_string(),
            loading: false,
            rev: 1,
        }
    }

    #[test]
    fn test_render_numbers_visible_entries() {
        let out = render_view(&view(
            vec![
                DirectoryEntry::folder("2025", "https://host/kirtan/?dir=2025"),
                DirectoryEntry::track("Asa%20Di%20Vaar.mp3", "https://host/kirtan/a.mp3"),
            ],
            "",
        ));
        assert!(out.contains("   1  ▸ 2025"));
        assert!(out.contains("   2  ♪ Asa Di Vaar"));
    }

    #[test]
    fn test_render_empty_states() {
        assert!(render_view(&view(vec![], "")).contains("Empty Directory"));
        let out = render_view(&view(vec![DirectoryEntry::folder("2025", "u")], "zzz"));
        assert!(out.contains("No results found"));
        assert!(out.contains("filter: zzz"));
    }
}
