use super::{FetchedImage, ImageSource};
use crate::{Error, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// A 1x1 PNG.
pub const TINY_PNG: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, // PNG signature
    0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44, 0x52, // IHDR chunk
    0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, // 1x1 pixel
    0x08, 0x02, 0x00, 0x00, 0x00, 0x90, 0x77, 0x53, 0xDE, 0x00, 0x00, 0x00, 0x0C, 0x49, 0x44,
    0x41, // IDAT chunk
    0x54, 0x08, 0x99, 0x63, 0xF8, 0xCF, 0xC0, 0x00, 0x00, 0x00, 0x01, 0x00, 0x01, 0xE2, 0x25,
    0x00, 0xBC, 0x00, 0x00, 0x00, 0x00, 0x49, 0x45, 0x4E, // IEND chunk
    0x44, 0xAE, 0x42, 0x60, 0x82,
];

#[derive(Clone)]
pub struct MockImageSource {
    images: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    fetched: Arc<Mutex<Vec<String>>>,
    should_fail: Arc<Mutex<bool>>,
}

impl MockImageSource {
    pub fn new() -> Self {
        Self {
            images: Arc::new(Mutex::new(HashMap::new())),
            fetched: Arc::new(Mutex::new(Vec::new())),
            should_fail: Arc::new(Mutex::new(false)),
        }
    }

    pub fn with_image(self, locator: &str, bytes: Vec<u8>) -> Self {
        self.images
            .lock()
            .unwrap()
            .insert(locator.to_string(), bytes);
        self
    }

    pub fn with_failure(self, should_fail: bool) -> Self {
        *self.should_fail.lock().unwrap() = should_fail;
        self
    }

    pub fn get_fetched(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }
}

impl Default for MockImageSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImageSource for MockImageSource {
    async fn fetch(&self, locator: &str) -> Result<FetchedImage> {
        self.fetched.lock().unwrap().push(locator.to_string());

        if *self.should_fail.lock().unwrap() {
            return Err(Error::Retrieval("Mock failure".to_string()));
        }

        // Unknown locators serve the tiny PNG
        let bytes = self
            .images
            .lock()
            .unwrap()
            .get(locator)
            .cloned()
            .unwrap_or_else(|| TINY_PNG.to_vec());

        Ok(FetchedImage {
            bytes,
            content_type: Some("image/png".to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_image_source_records_fetches() {
        let source = MockImageSource::new().with_image("https://img/1", vec![1, 2, 3]);

        let custom = source.fetch("https://img/1").await.unwrap();
        assert_eq!(custom.bytes, vec![1, 2, 3]);

        let default = source.fetch("https://img/2").await.unwrap();
        assert_eq!(default.bytes, TINY_PNG.to_vec());

        assert_eq!(source.get_fetched(), vec!["https://img/1", "https://img/2"]);
    }

    #[tokio::test]
    async fn test_mock_image_source_failure() {
        let source = MockImageSource::new().with_failure(true);
        assert!(source.fetch("https://img/1").await.is_err());
    }
}
