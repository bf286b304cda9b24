use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::history::UploadRecord;
use crate::uploader::HistoryView;

/// Upload photos to Imgur and keep a history of the links
#[derive(Debug, Parser)]
#[command(name = "imgur-photo-uploader")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to a custom config.json
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Directory holding the upload history
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Upload one or more images and record their links
    Upload {
        /// Image files to upload
        #[arg(required = true, value_name = "PATH")]
        paths: Vec<PathBuf>,

        /// JPEG quality used when converting (1-100)
        #[arg(short, long)]
        quality: Option<u8>,
    },

    /// List uploaded images, newest first
    List {
        /// Print the raw history document
        #[arg(long)]
        json: bool,
    },

    /// Remove an upload from the history by its key
    Remove {
        /// Upload key (epoch milliseconds) as shown by `list`
        key: i64,
    },

    /// Download the image behind a history entry
    Fetch {
        /// Upload key (epoch milliseconds) as shown by `list`
        key: i64,

        /// Where to write the image
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,
    },

    /// Show the effective configuration
    Config,
}

/// Map a configured level name onto a `log` filter. Unknown names mean `info`.
pub fn log_level_filter(level: &str) -> log::LevelFilter {
    level.parse().unwrap_or(log::LevelFilter::Info)
}

/// One history line: `<key>  <date>  <url>`.
pub fn format_record(record: &UploadRecord) -> String {
    format!("{}  {}  {}", record.uploaded_at, record.display_date(), record.url)
}

/// Prints the history to stdout on every update after the initial load.
#[derive(Debug, Default)]
pub struct ConsoleView {
    loaded: bool,
}

impl HistoryView for ConsoleView {
    fn render(&mut self, uploads: &[UploadRecord]) {
        if !self.loaded {
            self.loaded = true;
            return;
        }

        println!("History ({} upload(s)):", uploads.len());
        for record in uploads {
            println!("  {}", format_record(record));
        }
    }
}
