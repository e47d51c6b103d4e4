mod browse;
mod favorites;
mod http;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use darbar_archive::config::Config;
use darbar_archive::entry::sort_entries;
use darbar_archive::explorer::{Explorer, Tab};
use darbar_archive::ArchiveClient;
use favorites::{FavoriteKind, FavoritesStore};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "darbar", version, about = "Browse and play the Darbar Sahib kirtan archive")]
struct Cli {
    /// Config file (defaults to ~/.config/darbar/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the browsing roots and the live stream URL
    Roots,
    /// List one folder
    Ls {
        /// Folder URL; defaults to the root of --tab
        url: Option<String>,
        #[arg(long, value_enum, default_value_t = TabArg::Years)]
        tab: TabArg,
        /// Only show entries whose name contains this
        #[arg(long)]
        filter: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Interactive browser on stdin
    Browse {
        #[arg(long, value_enum, default_value_t = TabArg::Years)]
        tab: TabArg,
    },
    /// Serve the JSON API
    Serve {
        #[arg(long)]
        bind: Option<String>,
        #[arg(long)]
        port: Option<u16>,
    },
    /// Manage favorites
    Favorites {
        #[command(subcommand)]
        action: FavoritesCommand,
    },
}

#[derive(Subcommand)]
enum FavoritesCommand {
    List,
    Add {
        url: String,
        title: String,
        #[arg(long, value_enum, default_value_t = FavoriteKind::Remote)]
        kind: FavoriteKind,
    },
    Remove {
        id: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum TabArg {
    Years,
    Ragis,
    Classification,
}

impl From<TabArg> for Tab {
    fn from(arg: TabArg) -> Self {
        match arg {
            TabArg::Years => Tab::Years,
            TabArg::Ragis => Tab::Ragis,
            TabArg::Classification => Tab::Classification,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let data_dir = darbar_archive::platform::data_dir();
    std::fs::create_dir_all(&data_dir)?;
    let log_path = data_dir.join("darbar.log");

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    // Allow RUST_LOG override; keep connection-level DEBUG from the HTTP
    // client internals out of the log.
    let log_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        "info,darbar=debug,darbar_archive=debug,hyper_util=warn,reqwest=warn,hyper=warn"
            .to_string()
    });
    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_env_filter(log_filter.as_str())
        .with_ansi(false)
        .init();

    eprintln!("darbar log: {}", log_path.display());
    tracing::info!("darbar starting…");

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let client = Arc::new(ArchiveClient::from_config(&config)?);
    let favorites = Arc::new(FavoritesStore::new(config.paths.favorites_file.clone()));

    match cli.command {
        Command::Roots => {
            let roots = client.roots();
            println!("years           {}", roots.kirtan);
            println!("ragis           {}", roots.ragiwise);
            println!("classification  {}", roots.classification);
            println!("live            {}", config.stream.url);
        }

        Command::Ls {
            url,
            tab,
            filter,
            json,
        } => {
            let url = url.unwrap_or_else(|| Tab::from(tab).root(client.roots()).to_string());
            let mut entries = client.fetch_directory(&url).await;
            sort_entries(&mut entries);
            if let Some(query) = filter.as_deref() {
                entries.retain(|e| e.matches(query));
            }

            if json {
                println!("{}", serde_json::to_string_pretty(&entries)?);
            } else if entries.is_empty() {
                println!("(empty)");
            } else {
                for entry in &entries {
                    let marker = if entry.is_audio { "♪" } else { "▸" };
                    println!("{} {}", marker, entry.display_name());
                    println!("    {}", entry.url);
                }
            }
        }

        Command::Browse { tab } => {
            let explorer = Explorer::new(client, tab.into());
            browse::run(&explorer, tab.into()).await?;
        }

        Command::Serve { bind, port } => {
            if !config.http.enabled {
                anyhow::bail!("HTTP API is disabled in {}", Config::config_path().display());
            }
            let explorer = Arc::new(Explorer::new(client.clone(), Tab::Years));
            explorer.select_tab(Tab::Years).await;

            let state = http::HttpState {
                client,
                explorer,
                favorites,
                stream_url: config.stream.url.clone(),
            };
            let server = http::start_server(
                bind.unwrap_or(config.http.bind_address.clone()),
                port.unwrap_or(config.http.port),
                state,
            );
            server.await.context("HTTP server task failed")?;
        }

        Command::Favorites { action } => match action {
            FavoritesCommand::List => {
                let items = favorites.list().await?;
                if items.is_empty() {
                    println!("no favorites yet");
                }
                for item in items {
                    let when = chrono::DateTime::from_timestamp_millis(item.date)
                        .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
                        .unwrap_or_default();
                    println!("{}  {:?}  {}  {}", item.id, item.kind, when, item.title);
                    println!("    {}", item.url);
                }
            }
            FavoritesCommand::Add { url, title, kind } => {
                let item = favorites.add(&title, kind, &url).await?;
                println!("{}", item.id);
            }
            FavoritesCommand::Remove { id } => {
                if !favorites.remove(&id).await? {
                    println!("no favorite with id {}", id);
                }
            }
        },
    }

    Ok(())
}
