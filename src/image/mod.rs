//! Image retrieval and encoding
//!
//! Fetches the chosen image's bytes, encodes them as a self-contained data URL
//! tagged with their MIME type, and hands the result to the attachment store.

pub mod fetcher;
pub mod materializer;
pub mod mock;

pub use fetcher::HttpImageFetcher;
pub use materializer::materialize;
pub use mock::MockImageSource;

use crate::{Error, Result};
use async_trait::async_trait;
use base64::Engine as _;
use image::ImageFormat;

/// Raw bytes of a remote image plus the MIME type the server declared.
#[derive(Debug, Clone)]
pub struct FetchedImage {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
}

#[async_trait]
pub trait ImageSource: Send + Sync {
    async fn fetch(&self, locator: &str) -> Result<FetchedImage>;
}

/// Image bytes encoded as a `data:` URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddedImage {
    mime: String,
    data_url: String,
}

impl EmbeddedImage {
    /// Fails on empty bodies and on bytes that are not a recognizable image.
    pub fn encode(bytes: &[u8], declared_mime: Option<&str>) -> Result<Self> {
        if bytes.is_empty() {
            return Err(Error::Encoding("Image body is empty".to_string()));
        }

        let format = image::guess_format(bytes)
            .map_err(|e| Error::Encoding(format!("Unrecognized image data: {}", e)))?;

        let mime = declared_mime
            .map(|m| m.split(';').next().unwrap_or(m).trim().to_ascii_lowercase())
            .filter(|m| m.starts_with("image/"))
            .unwrap_or_else(|| format.to_mime_type().to_string());

        let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
        let data_url = format!("data:{};base64,{}", mime, encoded);

        Ok(Self { mime, data_url })
    }

    pub fn mime(&self) -> &str {
        &self.mime
    }

    pub fn data_url(&self) -> &str {
        &self.data_url
    }

    /// Recover the raw bytes for stores that persist files.
    pub fn decode(&self) -> Result<Vec<u8>> {
        let (_, payload) = self
            .data_url
            .split_once(";base64,")
            .ok_or_else(|| Error::Encoding("Malformed data URL".to_string()))?;

        base64::engine::general_purpose::STANDARD
            .decode(payload)
            .map_err(|e| Error::Encoding(format!("Failed to decode base64 image: {}", e)))
    }

    pub fn extension(&self) -> &'static str {
        ImageFormat::from_mime_type(&self.mime)
            .and_then(|format| format.extensions_str().first().copied())
            .unwrap_or("png")
    }

    /// Unique file name such as `20261016-<uuid>.png`.
    pub fn file_name(&self) -> String {
        format!(
            "{}-{}.{}",
            chrono::Utc::now().format("%Y%m%d"),
            uuid::Uuid::new_v4(),
            self.extension()
        )
    }
}
