//! Deterministic provider for tests

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use stratum_domain::traits::LlmProvider;
use thiserror::Error;

/// Errors produced by [`MockProvider`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MockError {
    /// Injected failure
    #[error("Mock error: {0}")]
    Injected(String),
}

#[derive(Debug, Default)]
struct MockState {
    responses: HashMap<String, String>,
    errors: HashMap<String, String>,
    fail_all: Option<String>,
    delay: Option<Duration>,
    last_prompt: Option<String>,
}

/// Mock LLM provider for deterministic testing
///
/// Returns pre-configured responses without any network calls. Clones share
/// state, so a test can keep a handle while the oracle owns another.
///
/// # Examples
///
/// ```
/// use stratum_oracle::MockProvider;
/// use stratum_domain::traits::LlmProvider;
///
/// let provider = MockProvider::new("[]");
/// provider.add_response("special", "[{\"action\": \"dismiss\"}]");
///
/// assert_eq!(provider.generate("anything").unwrap(), "[]");
/// assert!(provider.generate("special").unwrap().contains("dismiss"));
/// assert_eq!(provider.call_count(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct MockProvider {
    default_response: String,
    state: Arc<Mutex<MockState>>,
    call_count: Arc<AtomicUsize>,
}

impl MockProvider {
    /// Create a provider with a fixed response for all prompts
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            default_response: response.into(),
            state: Arc::new(Mutex::new(MockState::default())),
            call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Create a provider whose every call fails
    pub fn failing(message: impl Into<String>) -> Self {
        let provider = Self::default();
        provider.state().fail_all = Some(message.into());
        provider
    }

    /// Respond with `response` when the prompt contains `needle`
    pub fn add_response(&self, needle: impl Into<String>, response: impl Into<String>) {
        self.state().responses.insert(needle.into(), response.into());
    }

    /// Fail when the prompt contains `needle`
    pub fn add_error(&self, needle: impl Into<String>, message: impl Into<String>) {
        self.state().errors.insert(needle.into(), message.into());
    }

    /// Sleep this long before answering
    pub fn with_delay(self, delay: Duration) -> Self {
        self.state().delay = Some(delay);
        self
    }

    /// Number of generate calls so far
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Reset the call count
    pub fn reset_call_count(&self) {
        self.call_count.store(0, Ordering::SeqCst);
    }

    /// The most recent prompt received
    pub fn last_prompt(&self) -> Option<String> {
        self.state().last_prompt.clone()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        // A panicking test thread must not wedge every other clone
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new("[]")
    }
}

impl LlmProvider for MockProvider {
    type Error = MockError;

    fn generate(&self, prompt: &str) -> Result<String, Self::Error> {
        self.call_count.fetch_add(1, Ordering::SeqCst);

        let (delay, outcome) = {
            let mut state = self.state();
            state.last_prompt = Some(prompt.to_string());

            let outcome = if let Some(message) = &state.fail_all {
                Err(MockError::Injected(message.clone()))
            } else if let Some(message) = find(&state.errors, prompt) {
                Err(MockError::Injected(message))
            } else {
                Ok(find(&state.responses, prompt).unwrap_or_else(|| self.default_response.clone()))
            };
            (state.delay, outcome)
        };

        if let Some(delay) = delay {
            std::thread::sleep(delay);
        }
        outcome
    }

    fn generate_structured(&self, prompt: &str, _schema: &str) -> Result<String, Self::Error> {
        self.generate(prompt)
    }
}

/// Longest needle contained in the prompt wins, so lookups are deterministic
fn find(table: &HashMap<String, String>, prompt: &str) -> Option<String> {
    table
        .iter()
        .filter(|(needle, _)| prompt.contains(needle.as_str()))
        .max_by_key(|(needle, _)| needle.len())
        .map(|(_, value)| value.clone())
}
