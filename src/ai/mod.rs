//! Image generation service integration
//!
//! Requests batches of candidate images for a prompt. The OpenAI Images API
//! is the only provider; the trait exists so the pipeline can run on mocks.

pub mod mock;
pub mod openai;

pub use mock::MockImageGenerationClient;
pub use openai::OpenAiImageClient;

use crate::models::{ImageCandidate, Prompt};
use crate::settings::GenerationParameters;
use crate::Result;
use async_trait::async_trait;

#[async_trait]
pub trait ImageGenerationService: Send + Sync {
    /// One round-trip to the service. An empty batch means "nothing to offer".
    async fn generate_batch(
        &self,
        prompt: &Prompt,
        params: &GenerationParameters,
    ) -> Result<Vec<ImageCandidate>>;
}
