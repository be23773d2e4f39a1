//! yt-mp3 - A Rust CLI tool for turning online videos into MP3 files
//!
//! This library validates that `yt-dlp` and `ffmpeg` are installed, builds the
//! `yt-dlp` invocation that extracts and transcodes the audio track, and locates
//! the resulting files in the output directory.

use std::path::PathBuf;

pub mod cli;
pub mod config;
pub mod downloader;
pub mod process;
pub mod utils;
pub mod validator;

pub use cli::Cli;
pub use config::Config;
pub use downloader::{Downloader, YtDlpDownloader};
pub use process::{CommandChecker, CommandExecutor, CommandInvocation, SystemChecker, SystemExecutor};
pub use validator::{Dependency, DependencyValidator};

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error types specific to the converter
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("{tool} not found, please install it first: {hint}")]
    DependencyMissing {
        tool: &'static str,
        hint: &'static str,
    },

    #[error("failed to create output directory {}: {source}", path.display())]
    DirectoryCreation {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("download failed: {0}")]
    DownloadFailed(#[source] std::io::Error),

    #[error("failed to look up output files matching {pattern}: {source}")]
    FileLookup {
        pattern: String,
        #[source]
        source: std::io::Error,
    },
}
