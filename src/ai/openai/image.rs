use super::client::OpenAiHttpClient;
use super::types::{ImageGenerationRequest, ImageGenerationResponse};
use crate::ai::ImageGenerationService;
use crate::models::{ImageCandidate, Prompt};
use crate::settings::GenerationParameters;
use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::Url;
use std::time::Duration;

const GENERATIONS_PATH: &str = "/v1/images/generations";

pub struct OpenAiImageClient {
    http: OpenAiHttpClient,
}

impl OpenAiImageClient {
    pub fn new() -> Self {
        Self::new_with_client(reqwest::Client::new())
    }

    pub fn new_with_client(client: reqwest::Client) -> Self {
        Self {
            http: OpenAiHttpClient::new_with_client(Duration::from_secs(120), client),
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.http = self.http.with_base_url(base_url);
        self
    }
}

impl Default for OpenAiImageClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Keep well-formed locators, at most `limit` of them.
fn candidates_from(response: ImageGenerationResponse, limit: usize) -> Vec<ImageCandidate> {
    response
        .data
        .into_iter()
        .filter_map(|item| item.url)
        .filter(|url| match Url::parse(url) {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!("Skipping malformed image URL {:?}: {}", url, e);
                false
            }
        })
        .take(limit)
        .map(ImageCandidate::new)
        .collect()
}

#[async_trait]
impl ImageGenerationService for OpenAiImageClient {
    async fn generate_batch(
        &self,
        prompt: &Prompt,
        params: &GenerationParameters,
    ) -> Result<Vec<ImageCandidate>> {
        let credential = params.credential().ok_or(Error::MissingCredential)?;

        let request = ImageGenerationRequest {
            prompt: prompt.as_str().to_string(),
            n: params.batch_size,
            size: params.size(),
        };

        tracing::info!(
            "Requesting {} image(s) at {} from OpenAI",
            request.n,
            request.size
        );

        let response: ImageGenerationResponse =
            match self.http.post(GENERATIONS_PATH, credential, &request).await {
                Ok(response) => response,
                Err(Error::ServiceStatus { status, .. }) => {
                    tracing::warn!("OpenAI returned status {}, no images to offer", status);
                    return Ok(Vec::new());
                }
                Err(e) => return Err(e),
            };

        let candidates = candidates_from(response, params.batch_size as usize);
        tracing::info!("Received {} option(s)", candidates.len());
        Ok(candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn params(batch_size: u32) -> GenerationParameters {
        GenerationParameters::new(batch_size, 512, 512, "sk-test")
    }

    fn prompt(text: &str) -> Prompt {
        Prompt::trimmed(text).unwrap()
    }

    #[tokio::test]
    async fn test_generate_batch_sends_documented_request() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/images/generations"))
            .and(header("Authorization", "Bearer sk-test"))
            .and(body_json(serde_json::json!({
                "prompt": "a red fox",
                "n": 3,
                "size": "512x512"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "created": 1,
                "data": [
                    { "url": "https://images.example.com/1.png" },
                    { "url": "https://images.example.com/2.png" },
                    { "url": "https://images.example.com/3.png" }
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = OpenAiImageClient::new().with_base_url(server.uri());
        let batch = client
            .generate_batch(&prompt("a red fox"), &params(3))
            .await
            .unwrap();

        assert_eq!(
            batch,
            vec![
                ImageCandidate::new("https://images.example.com/1.png"),
                ImageCandidate::new("https://images.example.com/2.png"),
                ImageCandidate::new("https://images.example.com/3.png"),
            ]
        );
    }

    #[tokio::test]
    async fn test_generate_batch_empty_data() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/images/generations"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "data": [] })),
            )
            .mount(&server)
            .await;

        let client = OpenAiImageClient::new().with_base_url(server.uri());
        let batch = client
            .generate_batch(&prompt("a red fox"), &params(3))
            .await
            .unwrap();

        assert!(batch.is_empty());
    }

    #[tokio::test]
    async fn test_generate_batch_non_success_is_empty() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/images/generations"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": { "message": "Your request was rejected by our safety system" }
            })))
            .mount(&server)
            .await;

        let client = OpenAiImageClient::new().with_base_url(server.uri());
        let batch = client
            .generate_batch(&prompt("a red fox"), &params(3))
            .await
            .unwrap();

        assert!(batch.is_empty());
    }

    #[tokio::test]
    async fn test_generate_batch_caps_and_filters_locators() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/images/generations"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [
                    { "url": "not a url" },
                    { "b64_json": "AAAA" },
                    { "url": "https://images.example.com/1.png" },
                    { "url": "https://images.example.com/2.png" },
                    { "url": "https://images.example.com/3.png" }
                ]
            })))
            .mount(&server)
            .await;

        let client = OpenAiImageClient::new().with_base_url(server.uri());
        let batch = client
            .generate_batch(&prompt("a red fox"), &params(2))
            .await
            .unwrap();

        assert_eq!(batch.len(), 2);
        assert_eq!(batch[0].locator(), "https://images.example.com/1.png");
        assert_eq!(batch[1].locator(), "https://images.example.com/2.png");
    }

    #[tokio::test]
    async fn test_generate_batch_unparseable_body_is_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/images/generations"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
            .mount(&server)
            .await;

        let client = OpenAiImageClient::new().with_base_url(server.uri());
        let err = client
            .generate_batch(&prompt("a red fox"), &params(1))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::ImageService(_)));
    }

    #[tokio::test]
    async fn test_generate_batch_requires_credential() {
        let client = OpenAiImageClient::new().with_base_url("http://127.0.0.1:9".to_string());
        let no_key = GenerationParameters::new(1, 512, 512, "");

        let err = client
            .generate_batch(&prompt("a red fox"), &no_key)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::MissingCredential));
    }
}
