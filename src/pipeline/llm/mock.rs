use std::cell::RefCell;
use std::collections::VecDeque;

use super::types::LlmClient;
use super::LlmError;
use crate::pipeline::extraction::EncodedImage;

/// Mock LLM client for testing. Replies from a queue, then repeats a default.
pub struct MockLlmClient {
    default_response: String,
    queued: RefCell<VecDeque<String>>,
    prompts: RefCell<Vec<String>>,
    image_counts: RefCell<Vec<usize>>,
    fail_status: Option<u16>,
}

impl MockLlmClient {
    pub fn new(response: &str) -> Self {
        Self {
            default_response: response.to_string(),
            queued: RefCell::new(VecDeque::new()),
            prompts: RefCell::new(Vec::new()),
            image_counts: RefCell::new(Vec::new()),
            fail_status: None,
        }
    }

    /// Replies returned in order before falling back to the default.
    pub fn with_responses(mut self, responses: Vec<String>) -> Self {
        self.queued = RefCell::new(responses.into());
        self
    }

    /// Every call fails with an API error carrying `status`.
    pub fn failing(status: u16) -> Self {
        let mut client = Self::new("");
        client.fail_status = Some(status);
        client
    }

    pub fn call_count(&self) -> usize {
        self.prompts.borrow().len()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.borrow().clone()
    }

    pub fn image_counts(&self) -> Vec<usize> {
        self.image_counts.borrow().clone()
    }
}

impl LlmClient for MockLlmClient {
    fn generate(&self, prompt: &str, images: &[EncodedImage]) -> Result<String, LlmError> {
        self.prompts.borrow_mut().push(prompt.to_string());
        self.image_counts.borrow_mut().push(images.len());

        if let Some(status) = self.fail_status {
            return Err(LlmError::Api {
                status,
                body: "mock failure".into(),
            });
        }

        Ok(self
            .queued
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| self.default_response.clone()))
    }

    fn model_name(&self) -> &str {
        "mock"
    }
}
