use super::ImageGenerationService;
use crate::models::{ImageCandidate, Prompt};
use crate::settings::GenerationParameters;
use crate::{Error, Result};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Serves queued batches in order, then empty batches once the queue runs out.
#[derive(Clone)]
pub struct MockImageGenerationClient {
    batches: Arc<Mutex<VecDeque<Vec<String>>>>,
    prompts: Arc<Mutex<Vec<String>>>,
    call_count: Arc<Mutex<usize>>,
    should_fail: Arc<Mutex<bool>>,
}

impl MockImageGenerationClient {
    pub fn new() -> Self {
        Self {
            batches: Arc::new(Mutex::new(VecDeque::new())),
            prompts: Arc::new(Mutex::new(Vec::new())),
            call_count: Arc::new(Mutex::new(0)),
            should_fail: Arc::new(Mutex::new(false)),
        }
    }

    pub fn with_batch(self, locators: &[&str]) -> Self {
        self.batches
            .lock()
            .unwrap()
            .push_back(locators.iter().map(|l| l.to_string()).collect());
        self
    }

    pub fn with_failure(self, should_fail: bool) -> Self {
        *self.should_fail.lock().unwrap() = should_fail;
        self
    }

    pub fn get_call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }

    pub fn get_prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

impl Default for MockImageGenerationClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImageGenerationService for MockImageGenerationClient {
    async fn generate_batch(
        &self,
        prompt: &Prompt,
        params: &GenerationParameters,
    ) -> Result<Vec<ImageCandidate>> {
        *self.call_count.lock().unwrap() += 1;
        self.prompts.lock().unwrap().push(prompt.to_string());

        if *self.should_fail.lock().unwrap() {
            return Err(Error::ImageService("Mock failure".to_string()));
        }

        let batch = self.batches.lock().unwrap().pop_front().unwrap_or_default();
        Ok(batch
            .into_iter()
            .take(params.batch_size as usize)
            .map(ImageCandidate::new)
            .collect())
    }
}
