//! LLM-backed decision oracle

use crate::instructions::{decision_schema, CURATOR_INSTRUCTIONS, OUTPUT_FORMAT_REMINDER};
use crate::OracleError;
use std::fmt::Display;
use stratum_domain::traits::{DecisionOracle, LlmProvider, ReviewRequest};

/// Decision oracle that asks a language model for structured decisions
///
/// The prompt is the curator instructions, the rendered review payload and
/// an output-format reminder. The raw reply is returned untouched; decoding
/// belongs to the promotion engine.
///
/// # Examples
///
/// ```
/// use stratum_oracle::{LlmOracle, MockProvider};
/// use stratum_domain::traits::{DecisionOracle, ReviewRequest};
///
/// let oracle = LlmOracle::new(MockProvider::new("[]"));
/// let request = ReviewRequest {
///     task_id: "t1".to_string(),
///     entries: vec![],
///     canonical: vec![],
///     rendered: "nothing to review".to_string(),
/// };
/// assert_eq!(oracle.review(&request).unwrap(), "[]");
/// ```
pub struct LlmOracle<P> {
    provider: P,
    schema: String,
}

impl<P> LlmOracle<P>
where
    P: LlmProvider,
    P::Error: Display,
{
    /// Wrap a provider
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            schema: decision_schema(),
        }
    }

    /// The wrapped provider
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Full prompt for a review request
    pub fn build_prompt(&self, request: &ReviewRequest) -> String {
        format!(
            "{}\n\n{}\n\n{}",
            CURATOR_INSTRUCTIONS, request.rendered, OUTPUT_FORMAT_REMINDER
        )
    }
}

impl<P> DecisionOracle for LlmOracle<P>
where
    P: LlmProvider,
    P::Error: Display,
{
    type Error = OracleError;

    fn review(&self, request: &ReviewRequest) -> Result<String, OracleError> {
        let prompt = self.build_prompt(request);
        tracing::debug!(
            "Requesting review of {} entries for task {} ({} prompt chars)",
            request.entries.len(),
            request.task_id,
            prompt.len()
        );

        let response = self
            .provider
            .generate_structured(&prompt, &self.schema)
            .map_err(|e| OracleError::Provider(e.to_string()))?;

        if response.trim().is_empty() {
            return Err(OracleError::EmptyResponse);
        }
        Ok(response)
    }
}
