use regex::Regex;
use std::path::Path;
use crate::errors::{AppError, AppResult};

/// Imgur rejects anonymous image uploads above this size.
pub const MAX_UPLOAD_SIZE: u64 = 20 * 1024 * 1024;

pub struct InputValidator;

impl InputValidator {
    pub fn validate_client_id(client_id: &str) -> AppResult<()> {
        let trimmed = client_id.trim();

        if trimmed.is_empty() {
            return Err(AppError::validation("client_id", "Imgur client id cannot be empty"));
        }

        let id_pattern = Regex::new(r"^[a-zA-Z0-9]+$").unwrap();
        if !id_pattern.is_match(trimmed) {
            return Err(AppError::validation(
                "client_id",
                "Imgur client id contains invalid characters",
            ));
        }

        Ok(())
    }

    pub fn validate_file_path(path: &str) -> AppResult<()> {
        if path.trim().is_empty() {
            return Err(AppError::validation("file_path", "File path cannot be empty"));
        }

        let path_obj = Path::new(path);

        if let Some(extension) = path_obj.extension() {
            let ext = extension.to_string_lossy().to_lowercase();
            if !matches!(ext.as_str(), "png" | "jpg" | "jpeg" | "webp" | "gif" | "bmp") {
                return Err(AppError::invalid_file_type(path));
            }
        } else {
            return Err(AppError::validation("file_path", "File must have an extension"));
        }

        if !path_obj.exists() {
            return Err(AppError::file_not_found(path));
        }

        if !path_obj.is_file() {
            return Err(AppError::validation("file_path", "Path is not a file"));
        }

        Ok(())
    }

    pub fn validate_image_file(file_path: &str) -> AppResult<()> {
        Self::validate_file_path(file_path)?;

        if FileSystemGuard::get_file_size(file_path)? > MAX_UPLOAD_SIZE {
            return Err(AppError::file_too_large(file_path));
        }

        Ok(())
    }

    pub fn validate_quality(quality: u8) -> AppResult<()> {
        if quality == 0 || quality > 100 {
            return Err(AppError::validation(
                "quality",
                "Quality must be between 1 and 100",
            ));
        }
        Ok(())
    }
}

// File system helpers
pub struct FileSystemGuard;

impl FileSystemGuard {
    pub fn get_file_size(path: &str) -> AppResult<u64> {
        let metadata = std::fs::metadata(path)?;
        Ok(metadata.len())
    }
}
