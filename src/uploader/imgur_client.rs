use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::image_processor;
use crate::security::InputValidator;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use super::multipart::MultipartBody;

#[derive(Debug, Deserialize)]
struct ImgurResponse {
    data: Option<ImgurData>,
}

#[derive(Debug, Deserialize)]
struct ImgurData {
    link: Option<String>,
    error: Option<serde_json::Value>,
}

/// Anonymous Imgur image upload client.
#[derive(Debug, Clone)]
pub struct ImgurClient {
    client: Client,
    endpoint: String,
    client_id: String,
}

impl ImgurClient {
    pub fn new(client_id: &str, endpoint: &str, timeout: Option<Duration>) -> AppResult<Self> {
        InputValidator::validate_client_id(client_id)?;

        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            endpoint: endpoint.to_string(),
            client_id: client_id.trim().to_string(),
        })
    }

    pub fn from_config(config: &Config) -> AppResult<Self> {
        if config.client_id.is_empty() {
            return Err(AppError::Config(
                "No Imgur client id. Build with IMGUR_CLIENT_ID or set client_id in config.json"
                    .to_string(),
            ));
        }

        Self::new(
            &config.client_id,
            &config.endpoint,
            config.request_timeout_secs.map(Duration::from_secs),
        )
    }

    /// Upload encoded image bytes and return the shareable link.
    pub async fn upload(&self, image: &[u8]) -> AppResult<String> {
        if image.is_empty() {
            return Err(AppError::validation("image", "Image payload is empty"));
        }

        let body = MultipartBody::for_image(image);
        let content_type = body.content_type();
        log::debug!(
            "Uploading {} bytes to {} (boundary {})",
            image.len(),
            self.endpoint,
            body.boundary()
        );

        let response = self
            .client
            .post(&self.endpoint)
            .header(AUTHORIZATION, format!("Client-ID {}", self.client_id))
            .header(CONTENT_TYPE, content_type)
            .body(body.into_bytes())
            .send()
            .await?;

        let status = response.status();
        let response_text = response.text().await?;

        if !status.is_success() {
            let message = extract_error_message(&response_text);
            log::warn!(
                "Imgur rejected upload with status {}: {}",
                status,
                message.as_deref().unwrap_or("no message")
            );
            return Err(AppError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let link = extract_link(&response_text)?;
        log::info!("Uploaded image to {}", link);
        Ok(link)
    }

    /// Convert an image file to JPEG and upload it.
    pub async fn upload_file(&self, file_path: &str, quality: u8) -> AppResult<String> {
        // Decoding and re-encoding is CPU-bound; keep it off the async workers.
        let path = file_path.to_string();
        let jpeg = tokio::task::spawn_blocking(move || image_processor::load_as_jpeg(&path, quality))
            .await
            .map_err(|e| AppError::Internal(format!("Image conversion task failed: {}", e)))??;

        self.upload(&jpeg).await
    }

    /// Download a previously uploaded image, e.g. for a history thumbnail.
    pub async fn fetch_image(&self, url: &str) -> AppResult<Vec<u8>> {
        let response = self.client.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            log::warn!("Fetching {} failed with status {}", url, status);
            return Err(AppError::Api {
                status: status.as_u16(),
                message: None,
            });
        }

        let bytes = response.bytes().await?;
        log::debug!("Fetched {} bytes from {}", bytes.len(), url);
        Ok(bytes.to_vec())
    }
}

/// Pull `data.link` out of a successful Imgur response body.
pub fn extract_link(response_data: &str) -> AppResult<String> {
    let parsed: ImgurResponse = serde_json::from_str(response_data).map_err(|e| {
        log::debug!(
            "Unparsable Imgur response (first 200 chars): {}",
            response_data.chars().take(200).collect::<String>()
        );
        AppError::parse(format!("response is not valid JSON: {}", e))
    })?;

    parsed
        .data
        .and_then(|data| data.link)
        .ok_or_else(|| AppError::parse("response has no data.link"))
}

/// Imgur reports failures as `data.error`, either a string or `{ "message": ... }`.
fn extract_error_message(response_data: &str) -> Option<String> {
    let parsed: ImgurResponse = serde_json::from_str(response_data).ok()?;
    match parsed.data?.error? {
        serde_json::Value::String(message) => Some(message),
        serde_json::Value::Object(map) => map
            .get("message")
            .and_then(|m| m.as_str())
            .map(str::to_string),
        _ => None,
    }
}
