//! Persisted upload history.
//!
//! The history is a single JSON document, `{ "uploads": [...] }`, newest
//! upload first. Every mutation rewrites the whole file before returning.

use chrono::{Local, TimeZone};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::errors::{AppError, AppResult};

/// One successful upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadRecord {
    /// Epoch milliseconds at record creation. Doubles as the record key.
    #[serde(rename = "uploadDate")]
    pub uploaded_at: i64,
    pub url: String,
}

impl UploadRecord {
    pub fn new(uploaded_at: i64, url: impl Into<String>) -> Self {
        Self {
            uploaded_at,
            url: url.into(),
        }
    }

    /// `dd/mm/yyyy at HH:MM` in the local time zone.
    pub fn display_date(&self) -> String {
        self.format_date(&Local)
            .unwrap_or_else(|| self.uploaded_at.to_string())
    }

    pub fn format_date<Tz>(&self, tz: &Tz) -> Option<String>
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        tz.timestamp_millis_opt(self.uploaded_at)
            .single()
            .map(|dt| dt.format("%d/%m/%Y at %H:%M").to_string())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryState {
    pub uploads: Vec<UploadRecord>,
}

impl HistoryState {
    pub fn len(&self) -> usize {
        self.uploads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.uploads.is_empty()
    }

    pub fn find(&self, key: i64) -> Option<&UploadRecord> {
        self.uploads.iter().find(|r| r.uploaded_at == key)
    }
}

/// Current wall-clock time in epoch milliseconds.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// File-backed history. Single process, single writer.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    path: PathBuf,
}

impl HistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the history file. A missing or unreadable file gives an empty history.
    pub fn load(&self) -> HistoryState {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::debug!("No history file at {}, starting empty", self.path.display());
                return HistoryState::default();
            }
            Err(e) => {
                log::warn!(
                    "Failed to read history file {}: {}. Starting with empty history.",
                    self.path.display(),
                    e
                );
                return HistoryState::default();
            }
        };

        match serde_json::from_str::<HistoryState>(&contents) {
            Ok(state) => {
                log::debug!(
                    "Loaded {} upload(s) from {}",
                    state.len(),
                    self.path.display()
                );
                state
            }
            Err(e) => {
                log::warn!(
                    "Failed to parse history file {}: {}. Starting with empty history.",
                    self.path.display(),
                    e
                );
                HistoryState::default()
            }
        }
    }

    /// Overwrite the history file with `state`.
    pub fn save(&self, state: &HistoryState) -> AppResult<()> {
        let json = serde_json::to_string(state)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| self.write_failed(e))?;
            }
        }

        // No temp-file rename: a crash mid-write can leave a truncated file,
        // which load() then treats as an empty history.
        fs::write(&self.path, json).map_err(|e| self.write_failed(e))?;

        log::debug!("Saved {} upload(s) to {}", state.len(), self.path.display());
        Ok(())
    }

    /// Prepend a record stamped with the current time and persist.
    pub fn record_upload(&self, state: &HistoryState, url: &str) -> AppResult<HistoryState> {
        self.record_upload_at(state, url, now_millis())
    }

    pub fn record_upload_at(
        &self,
        state: &HistoryState,
        url: &str,
        uploaded_at: i64,
    ) -> AppResult<HistoryState> {
        let mut next = state.clone();
        next.uploads.insert(0, UploadRecord::new(uploaded_at, url));
        self.save(&next)?;

        log::info!("Recorded upload {} ({})", uploaded_at, url);
        Ok(next)
    }

    /// Drop every record keyed by `key` and persist.
    pub fn remove(&self, state: &HistoryState, key: i64) -> AppResult<HistoryState> {
        let mut next = state.clone();
        next.uploads.retain(|r| r.uploaded_at != key);
        self.save(&next)?;

        let removed = state.len() - next.len();
        if removed == 0 {
            log::debug!("No upload with key {} to remove", key);
        } else {
            log::info!("Removed {} upload(s) with key {}", removed, key);
        }
        Ok(next)
    }

    fn write_failed(&self, e: std::io::Error) -> AppError {
        log::error!("Failed to write history file {}: {}", self.path.display(), e);
        AppError::storage(&self.path, e)
    }
}
