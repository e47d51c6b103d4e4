//! Remote kirtan archive resolver.
//!
//! Turns the origin's HTML directory listings and the bundled duty-type
//! classification dataset into one navigable catalog of folders and playable
//! tracks. [`archive::ArchiveClient::fetch_directory`] is the entry point;
//! [`explorer::Explorer`] layers a browsing session on top of it.

pub mod archive;
pub mod classification;
pub mod codec;
pub mod config;
pub mod entry;
pub mod error;
pub mod explorer;
pub mod listing;
pub mod paths;
pub mod platform;
pub mod source;

pub use archive::ArchiveClient;
pub use entry::DirectoryEntry;
pub use error::ArchiveError;
pub use source::{ArchiveRoots, Source};
