pub mod cli;
pub mod config;
pub mod errors;
pub mod history;
pub mod image_processor;
pub mod security;
pub mod uploader;

pub use errors::{AppError, AppResult};
pub use history::{HistoryState, HistoryStore, UploadRecord};
pub use uploader::{HistoryView, ImgurClient, UploadCoordinator, UploadEvent};
