use super::{FetchedImage, ImageSource};
use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use std::time::Duration;

/// Downloads candidate images over HTTP, optionally through a CORS proxy.
pub struct HttpImageFetcher {
    client: Client,
    proxy: Option<String>,
    timeout: Duration,
}

impl HttpImageFetcher {
    pub fn new() -> Self {
        Self::new_with_client(Client::new())
    }

    pub fn new_with_client(client: Client) -> Self {
        Self {
            client,
            proxy: None,
            timeout: Duration::from_secs(60),
        }
    }

    /// Route every fetch through `{proxy}/{locator}`.
    pub fn with_proxy(mut self, proxy: String) -> Self {
        self.proxy = Some(proxy.trim_end_matches('/').to_string());
        self
    }

    fn request_url(&self, locator: &str) -> String {
        match &self.proxy {
            Some(proxy) => format!("{}/{}", proxy, locator),
            None => locator.to_string(),
        }
    }
}

impl Default for HttpImageFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImageSource for HttpImageFetcher {
    async fn fetch(&self, locator: &str) -> Result<FetchedImage> {
        let url = self.request_url(locator);
        tracing::debug!("Fetching image from {}", url);

        let response = self
            .client
            .get(&url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to fetch image {}: {}", url, e);
                Error::Retrieval(e.to_string())
            })?;

        if !response.status().is_success() {
            let status = response.status();
            tracing::error!("Image fetch failed (status {}) for {}", status, url);
            return Err(Error::Retrieval(format!(
                "status {} while fetching {}",
                status, locator
            )));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::Retrieval(format!("Failed to read image body: {}", e)))?
            .to_vec();

        Ok(FetchedImage {
            bytes,
            content_type,
        })
    }
}
