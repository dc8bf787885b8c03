//! Test doubles shared across unit and integration tests.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::error::LlmError;
use crate::llm::{AskOptions, LlmProvider};

/// Scripted LLM provider. Returns a canned response (or always fails) and
/// counts calls so tests can assert rotation and fallback behavior.
pub struct MockLlm {
    key: String,
    model_id: String,
    label: String,
    response: String,
    fail: bool,
    calls: AtomicUsize,
    last_prompt: Mutex<String>,
}

impl MockLlm {
    pub fn new(key: &str) -> Self {
        Self {
            key: key.to_string(),
            model_id: format!("mock/{}", key),
            label: format!("Mock {}", key),
            response: "ok".to_string(),
            fail: false,
            calls: AtomicUsize::new(0),
            last_prompt: Mutex::new(String::new()),
        }
    }

    pub fn respond_with(mut self, response: &str) -> Self {
        self.response = response.to_string();
        self
    }

    pub fn fail_always(mut self) -> Self {
        self.fail = true;
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_prompt(&self) -> String {
        self.last_prompt
            .lock()
            .map(|p| p.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl LlmProvider for MockLlm {
    fn key(&self) -> &str {
        &self.key
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }

    fn label(&self) -> &str {
        &self.label
    }

    async fn complete(&self, prompt: &str, _options: &AskOptions) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut last) = self.last_prompt.lock() {
            *last = prompt.to_string();
        }
        if self.fail {
            return Err(LlmError::Provider {
                provider: self.model_id.clone(),
                message: "scripted failure".to_string(),
            });
        }
        Ok(self.response.clone())
    }
}
