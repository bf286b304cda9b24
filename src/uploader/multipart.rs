use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// Form field Imgur reads the image from.
pub const IMAGE_FIELD: &str = "image";

/// A `multipart/form-data` body carrying one base64 text field.
#[derive(Debug, Clone)]
pub struct MultipartBody {
    boundary: String,
    field: String,
    value: String,
}

impl MultipartBody {
    /// Wrap `image` as the base64 `image` field, with a boundary derived from
    /// the current time. `-` is outside the base64 alphabet, so the boundary
    /// can never occur inside the payload.
    pub fn for_image(image: &[u8]) -> Self {
        Self::with_boundary(image, time_boundary())
    }

    pub fn with_boundary(image: &[u8], boundary: impl Into<String>) -> Self {
        Self {
            boundary: boundary.into(),
            field: IMAGE_FIELD.to_string(),
            value: STANDARD.encode(image),
        }
    }

    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    pub fn into_bytes(self) -> Vec<u8> {
        let mut body = String::with_capacity(self.value.len() + 128);
        body.push_str(&format!("--{}\r\n", self.boundary));
        body.push_str(&format!(
            "Content-Disposition: form-data; name=\"{}\"\r\n\r\n",
            self.field
        ));
        body.push_str(&self.value);
        body.push_str(&format!("\r\n--{}--\r\n", self.boundary));
        body.into_bytes()
    }
}

fn time_boundary() -> String {
    format!("Boundary-{}", chrono::Utc::now().timestamp_millis())
}
