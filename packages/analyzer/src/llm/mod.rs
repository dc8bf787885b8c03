//! Unified LLM gateway over multiple providers.
//!
//! Requests route through three cheap OpenRouter models (one per vendor),
//! falling back to the direct Gemini API when only a Google key is set.
//! Rotation across providers is best-effort round robin on a shared atomic
//! counter; a failed call retries once per remaining provider before giving
//! up. Callers receive an empty string on total failure and must treat it
//! as "no signal".
//!
//! Call logging is per run: each [`Gateway`] owns a [`CallSink`] drained
//! exactly once at run finalization, so concurrent runs never interleave
//! logs.

pub mod json;
pub mod prompts;

use async_trait::async_trait;
use futures::future::join_all;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::error::LlmError;
use crate::types::LlmCallLog;
use openrouter_client::{ChatRequest, GeminiClient, Message, OpenRouterClient};

const GEMINI_DIRECT_MODEL: &str = "gemini-2.0-flash";

/// Per-call options with the defaults most scorers want.
#[derive(Debug, Clone)]
pub struct AskOptions {
    /// Provider key ("gpt", "claude", "gemini") to pin; rotate when unset
    pub preferred_provider: Option<String>,
    pub max_tokens: u32,
    pub temperature: f32,
    /// What the call is for, recorded in the call log
    pub purpose: String,
}

impl Default for AskOptions {
    fn default() -> Self {
        Self {
            preferred_provider: None,
            max_tokens: 1024,
            temperature: 0.3,
            purpose: String::new(),
        }
    }
}

impl AskOptions {
    pub fn purpose(purpose: impl Into<String>) -> Self {
        Self {
            purpose: purpose.into(),
            ..Default::default()
        }
    }

    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.preferred_provider = Some(provider.into());
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

/// One LLM backend. Implementations are pure transports; rotation, fallback
/// and logging live in the [`Gateway`].
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Short rotation key ("gpt", "claude", "gemini").
    fn key(&self) -> &str;

    /// Full routed model id.
    fn model_id(&self) -> &str;

    /// Human-readable label for call logs.
    fn label(&self) -> &str;

    async fn complete(&self, prompt: &str, options: &AskOptions) -> Result<String, LlmError>;
}

/// Provider backed by an OpenRouter-routed model.
pub struct OpenRouterProvider {
    client: OpenRouterClient,
    key: &'static str,
    model_id: &'static str,
    label: &'static str,
}

#[async_trait]
impl LlmProvider for OpenRouterProvider {
    fn key(&self) -> &str {
        self.key
    }

    fn model_id(&self) -> &str {
        self.model_id
    }

    fn label(&self) -> &str {
        self.label
    }

    async fn complete(&self, prompt: &str, options: &AskOptions) -> Result<String, LlmError> {
        let request = ChatRequest::new(self.model_id)
            .message(Message::user(prompt))
            .max_tokens(options.max_tokens)
            .temperature(options.temperature);
        let response = self
            .client
            .chat_completion(request)
            .await
            .map_err(|e| LlmError::Provider {
                provider: self.model_id.to_string(),
                message: e.to_string(),
            })?;
        Ok(response.content.trim().to_string())
    }
}

/// Provider backed by the direct Gemini API, used when no OpenRouter key
/// is configured.
pub struct GeminiDirectProvider {
    client: GeminiClient,
}

#[async_trait]
impl LlmProvider for GeminiDirectProvider {
    fn key(&self) -> &str {
        "gemini"
    }

    fn model_id(&self) -> &str {
        "gemini-direct"
    }

    fn label(&self) -> &str {
        "Gemini 2.0 Flash (Direct)"
    }

    async fn complete(&self, prompt: &str, options: &AskOptions) -> Result<String, LlmError> {
        let text = self
            .client
            .generate_content(
                GEMINI_DIRECT_MODEL,
                prompt,
                Some(options.max_tokens),
                Some(options.temperature),
            )
            .await
            .map_err(|e| LlmError::Provider {
                provider: "gemini-direct".to_string(),
                message: e.to_string(),
            })?;
        Ok(text.trim().to_string())
    }
}

/// The provider pool and rotation counter shared across concurrent runs.
pub struct ProviderSet {
    providers: Vec<Arc<dyn LlmProvider>>,
    rotation: AtomicUsize,
}

impl ProviderSet {
    /// Build from environment credentials, loading a `.env` file first when
    /// one is present. An OpenRouter key enables the three routed models;
    /// otherwise a Google key enables direct Gemini; with neither, the set
    /// is empty and LLM features degrade to static modes.
    pub fn from_env() -> Arc<Self> {
        dotenvy::dotenv().ok();
        let openrouter_key = non_empty_env("OPENROUTER_API_KEY");
        let google_key = non_empty_env("GOOGLE_API_KEY");

        let providers: Vec<Arc<dyn LlmProvider>> = if let Some(key) = openrouter_key {
            let client = OpenRouterClient::new(key);
            // Stored in rotation order.
            vec![
                Arc::new(OpenRouterProvider {
                    client: client.clone(),
                    key: "gemini",
                    model_id: "google/gemini-2.0-flash-001",
                    label: "Gemini 2.0 Flash",
                }),
                Arc::new(OpenRouterProvider {
                    client: client.clone(),
                    key: "gpt",
                    model_id: "openai/gpt-4o-mini",
                    label: "GPT-4o Mini",
                }),
                Arc::new(OpenRouterProvider {
                    client,
                    key: "claude",
                    model_id: "anthropic/claude-3.5-haiku",
                    label: "Claude 3.5 Haiku",
                }),
            ]
        } else if let Some(key) = google_key {
            vec![Arc::new(GeminiDirectProvider {
                client: GeminiClient::new(key),
            })]
        } else {
            warn!("no LLM API key found, set OPENROUTER_API_KEY or GOOGLE_API_KEY");
            Vec::new()
        };

        Arc::new(Self {
            providers,
            rotation: AtomicUsize::new(0),
        })
    }

    /// Build from explicit providers. Used by tests with mock providers.
    pub fn from_providers(providers: Vec<Arc<dyn LlmProvider>>) -> Arc<Self> {
        Arc::new(Self {
            providers,
            rotation: AtomicUsize::new(0),
        })
    }

    pub fn is_available(&self) -> bool {
        !self.providers.is_empty()
    }

    pub fn provider_count(&self) -> usize {
        self.providers.len()
    }

    /// New per-run gateway with its own empty call sink.
    pub fn gateway(self: &Arc<Self>) -> Gateway {
        Gateway {
            set: Arc::clone(self),
            sink: CallSink::new(),
        }
    }

    fn pick(&self, preferred: Option<&str>) -> Option<Arc<dyn LlmProvider>> {
        if self.providers.is_empty() {
            return None;
        }
        if let Some(key) = preferred {
            if let Some(provider) = self.providers.iter().find(|p| p.key() == key) {
                return Some(Arc::clone(provider));
            }
        }
        let n = self.rotation.fetch_add(1, Ordering::Relaxed);
        Some(Arc::clone(&self.providers[n % self.providers.len()]))
    }
}

/// Per-run collector of LLM call logs.
#[derive(Clone, Default)]
pub struct CallSink {
    logs: Arc<Mutex<Vec<LlmCallLog>>>,
}

impl CallSink {
    pub fn new() -> Self {
        Self::default()
    }

    async fn record(
        &self,
        provider: &dyn LlmProvider,
        purpose: &str,
        prompt: &str,
        response: &str,
        status: &str,
        duration_ms: u64,
    ) {
        let mut logs = self.logs.lock().await;
        logs.push(LlmCallLog {
            model: provider.label().to_string(),
            model_id: provider.model_id().to_string(),
            purpose: purpose.to_string(),
            prompt: truncate(prompt, 500),
            response: truncate(response, 2000),
            status: status.to_string(),
            duration_ms,
        });
    }

    /// Drain all collected logs. Called exactly once at run finalization.
    pub async fn drain(&self) -> Vec<LlmCallLog> {
        std::mem::take(&mut *self.logs.lock().await)
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// A run-scoped handle on the provider set: rotation and fallback policy,
/// plus call logging into this run's sink.
#[derive(Clone)]
pub struct Gateway {
    set: Arc<ProviderSet>,
    sink: CallSink,
}

impl Gateway {
    pub fn is_available(&self) -> bool {
        self.set.is_available()
    }

    pub fn provider_count(&self) -> usize {
        self.set.provider_count()
    }

    pub fn sink(&self) -> &CallSink {
        &self.sink
    }

    /// Send a prompt to one provider (preferred or next in rotation),
    /// falling back through the remaining providers on failure. Returns an
    /// empty string when every provider fails or none is configured.
    pub async fn ask(&self, prompt: &str, options: AskOptions) -> String {
        let Some(primary) = self.set.pick(options.preferred_provider.as_deref()) else {
            return String::new();
        };

        match self.call_one(primary.as_ref(), prompt, &options, false).await {
            Some(text) => text,
            None => self.retry_with_next(primary.as_ref(), prompt, &options).await,
        }
    }

    async fn retry_with_next(
        &self,
        failed: &dyn LlmProvider,
        prompt: &str,
        options: &AskOptions,
    ) -> String {
        for provider in &self.set.providers {
            if provider.model_id() == failed.model_id() {
                continue;
            }
            if let Some(text) = self.call_one(provider.as_ref(), prompt, options, true).await {
                info!(model = provider.model_id(), "fallback provider succeeded");
                return text;
            }
        }
        String::new()
    }

    async fn call_one(
        &self,
        provider: &dyn LlmProvider,
        prompt: &str,
        options: &AskOptions,
        is_retry: bool,
    ) -> Option<String> {
        let purpose = if is_retry {
            format!("{} (retry)", options.purpose)
        } else {
            options.purpose.clone()
        };
        let start = Instant::now();
        info!(
            model = provider.model_id(),
            purpose = %purpose,
            prompt_chars = prompt.len(),
            "llm request"
        );

        match provider.complete(prompt, options).await {
            Ok(text) => {
                let duration_ms = start.elapsed().as_millis() as u64;
                info!(
                    model = provider.model_id(),
                    duration_ms,
                    response_chars = text.len(),
                    "llm response"
                );
                self.sink
                    .record(provider, &purpose, prompt, &text, "success", duration_ms)
                    .await;
                Some(text)
            }
            Err(e) => {
                let duration_ms = start.elapsed().as_millis() as u64;
                warn!(model = provider.model_id(), error = %e, "llm call failed");
                self.sink
                    .record(provider, &purpose, prompt, &e.to_string(), "error", duration_ms)
                    .await;
                None
            }
        }
    }

    /// Ask the same prompt to every configured provider in parallel.
    /// Returns (provider key, response) pairs, skipping empty responses.
    /// Used by AI-visibility probes to test across vendors.
    pub async fn ask_many(&self, prompt: &str, purpose: &str) -> Vec<(String, String)> {
        if !self.is_available() {
            return Vec::new();
        }

        let calls = self.set.providers.iter().map(|provider| {
            let options = AskOptions::purpose(purpose).with_provider(provider.key().to_string());
            async move {
                let response = self.ask(prompt, options).await;
                (provider.key().to_string(), response)
            }
        });

        join_all(calls)
            .await
            .into_iter()
            .filter(|(_, response)| !response.is_empty())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockLlm;

    #[tokio::test]
    async fn test_rotation_cycles_providers() {
        let a = Arc::new(MockLlm::new("gemini").respond_with("from gemini"));
        let b = Arc::new(MockLlm::new("gpt").respond_with("from gpt"));
        let set = ProviderSet::from_providers(vec![a.clone(), b.clone()]);
        let gateway = set.gateway();

        for _ in 0..4 {
            gateway.ask("hello", AskOptions::default()).await;
        }
        assert_eq!(a.call_count(), 2);
        assert_eq!(b.call_count(), 2);
    }

    #[tokio::test]
    async fn test_preferred_provider_pins() {
        let a = Arc::new(MockLlm::new("gemini").respond_with("g"));
        let b = Arc::new(MockLlm::new("gpt").respond_with("x"));
        let set = ProviderSet::from_providers(vec![a.clone(), b.clone()]);
        let gateway = set.gateway();

        let text = gateway
            .ask("hi", AskOptions::default().with_provider("gpt"))
            .await;
        assert_eq!(text, "x");
        assert_eq!(a.call_count(), 0);
        assert_eq!(b.call_count(), 1);
    }

    #[tokio::test]
    async fn test_fallback_to_next_provider() {
        let failing = Arc::new(MockLlm::new("gemini").fail_always());
        let working = Arc::new(MockLlm::new("gpt").respond_with("rescued"));
        let set = ProviderSet::from_providers(vec![failing.clone(), working.clone()]);
        let gateway = set.gateway();

        let text = gateway
            .ask("hi", AskOptions::default().with_provider("gemini"))
            .await;
        assert_eq!(text, "rescued");

        let logs = gateway.sink().drain().await;
        assert_eq!(logs.len(), 2);
        assert_eq!(logs[0].status, "error");
        assert_eq!(logs[1].status, "success");
        assert!(logs[1].purpose.ends_with("(retry)"));
    }

    #[tokio::test]
    async fn test_empty_when_unavailable() {
        let set = ProviderSet::from_providers(vec![]);
        let gateway = set.gateway();
        assert!(!gateway.is_available());
        assert_eq!(gateway.ask("hi", AskOptions::default()).await, "");
        assert!(gateway.ask_many("hi", "probe").await.is_empty());
    }

    #[tokio::test]
    async fn test_ask_many_fans_out() {
        let a = Arc::new(MockLlm::new("gemini").respond_with("one"));
        let b = Arc::new(MockLlm::new("gpt").respond_with("two"));
        let c = Arc::new(MockLlm::new("claude").respond_with("three"));
        let set = ProviderSet::from_providers(vec![a, b, c]);
        let gateway = set.gateway();

        let responses = gateway.ask_many("probe text", "visibility_probe").await;
        assert_eq!(responses.len(), 3);
        let keys: Vec<&str> = responses.iter().map(|(k, _)| k.as_str()).collect();
        assert!(keys.contains(&"gemini"));
        assert!(keys.contains(&"gpt"));
        assert!(keys.contains(&"claude"));
    }

    #[tokio::test]
    async fn test_sink_drains_once() {
        let a = Arc::new(MockLlm::new("gemini").respond_with("ok"));
        let set = ProviderSet::from_providers(vec![a]);
        let gateway = set.gateway();

        gateway
            .ask("hi", AskOptions::purpose("entity_analysis"))
            .await;
        let logs = gateway.sink().drain().await;
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].purpose, "entity_analysis");
        assert!(gateway.sink().drain().await.is_empty());
    }

    #[tokio::test]
    async fn test_prompt_truncated_in_log() {
        let a = Arc::new(MockLlm::new("gemini").respond_with("ok"));
        let set = ProviderSet::from_providers(vec![a]);
        let gateway = set.gateway();

        let long_prompt = "x".repeat(2000);
        gateway.ask(&long_prompt, AskOptions::default()).await;
        let logs = gateway.sink().drain().await;
        assert_eq!(logs[0].prompt.chars().count(), 500);
    }
}
