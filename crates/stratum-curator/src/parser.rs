//! Decode oracle output into decisions

use crate::error::{CuratorError, DecisionError};
use serde::Deserialize;
use serde_json::Value;
use stratum_domain::{CanonicalKey, Confidence, Decision, EntryId};
use tracing::warn;

/// Namespace used when a promote decision names none
pub const DEFAULT_NAMESPACE: &str = "facts";

/// Reason used when a dismiss decision gives none
pub const DEFAULT_DISMISS_REASON: &str = "low quality or task-specific";

/// Wire shape of one decision, before validation
#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
enum RawDecision {
    #[serde(alias = "promote_to_canon")]
    Promote {
        entry_id: String,
        #[serde(default)]
        namespace: Option<String>,
        #[serde(default)]
        key: Option<String>,
        #[serde(default)]
        confidence: Option<f64>,
    },

    FlagConflict {
        #[serde(alias = "buffer_id", alias = "low_trust_id")]
        entry_id: String,
        #[serde(alias = "canon_id")]
        canonical_key: String,
        #[serde(default)]
        reason: String,
    },

    #[serde(alias = "dismiss_buffer_entry")]
    Dismiss {
        entry_id: String,
        #[serde(default)]
        reason: Option<String>,
    },
}

/// Decode an oracle response
///
/// Accepts a JSON array of decisions, the same array inside a markdown code
/// block, or an object wrapping it as `{"decisions": [...]}`. Each element
/// is decoded on its own: a bad element becomes a
/// [`DecisionError::Malformed`] entry and the rest still decode.
///
/// # Errors
///
/// [`CuratorError::MalformedResponse`] when the payload as a whole is not a
/// decision list.
pub fn parse_decisions(
    response: &str,
    default_confidence: f64,
) -> Result<Vec<Result<Decision, DecisionError>>, CuratorError> {
    let items = decision_array(response)?;

    let decisions = items
        .into_iter()
        .enumerate()
        .map(|(idx, item)| {
            decode(item, default_confidence).map_err(|e| {
                warn!("Skipping malformed decision {}: {}", idx, e);
                DecisionError::Malformed(format!("decision {}: {}", idx, e))
            })
        })
        .collect();
    Ok(decisions)
}

fn decision_array(response: &str) -> Result<Vec<Value>, CuratorError> {
    let body = extract_json(response);

    let value: Value = match serde_json::from_str(body) {
        Ok(value) => value,
        // Prose around a bare array: fall back to the outermost brackets
        Err(first) => match (body.find('['), body.rfind(']')) {
            (Some(start), Some(end)) if start < end => serde_json::from_str(&body[start..=end])
                .map_err(|_| CuratorError::MalformedResponse(format!("JSON parse error: {}", first)))?,
            _ => {
                return Err(CuratorError::MalformedResponse(format!(
                    "JSON parse error: {}",
                    first
                )))
            }
        },
    };

    match value {
        Value::Array(items) => Ok(items),
        Value::Object(mut map) => match map.remove("decisions") {
            Some(Value::Array(items)) => Ok(items),
            _ => Err(CuratorError::MalformedResponse(
                "Expected a JSON array of decisions".to_string(),
            )),
        },
        _ => Err(CuratorError::MalformedResponse(
            "Expected a JSON array of decisions".to_string(),
        )),
    }
}

/// Strip a markdown code fence if the response carries one
fn extract_json(response: &str) -> &str {
    let trimmed = response.trim();
    let Some(open) = trimmed.find("```") else {
        return trimmed;
    };
    let after_fence = &trimmed[open + 3..];
    // Skip the info string (e.g. "json") up to the end of the line
    let body_start = after_fence.find('\n').map(|i| i + 1).unwrap_or(after_fence.len());
    let body = &after_fence[body_start..];
    match body.find("```") {
        Some(close) => body[..close].trim(),
        None => body.trim(),
    }
}

fn decode(item: Value, default_confidence: f64) -> Result<Decision, String> {
    let raw: RawDecision = serde_json::from_value(item).map_err(|e| e.to_string())?;

    match raw {
        RawDecision::Promote {
            entry_id,
            namespace,
            key,
            confidence,
        } => {
            let id = EntryId::parse(&entry_id)?;
            let namespace = namespace.unwrap_or_else(|| DEFAULT_NAMESPACE.to_string());
            let key = key.unwrap_or_else(|| entry_id.trim().to_string());
            let target = CanonicalKey::new(namespace, key)?;
            let confidence = Confidence::new(confidence.unwrap_or(default_confidence))?;
            Ok(Decision::Promote {
                entry_id: id,
                target,
                confidence,
            })
        }
        RawDecision::FlagConflict {
            entry_id,
            canonical_key,
            reason,
        } => {
            let canonical_key = canonical_key.trim().to_string();
            if canonical_key.is_empty() {
                return Err("flag_conflict needs a canonical_key".to_string());
            }
            Ok(Decision::FlagConflict {
                entry_id: EntryId::parse(&entry_id)?,
                canonical_key,
                reason,
            })
        }
        RawDecision::Dismiss { entry_id, reason } => Ok(Decision::Dismiss {
            entry_id: EntryId::parse(&entry_id)?,
            reason: reason
                .filter(|r| !r.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_DISMISS_REASON.to_string()),
        }),
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: decoding arbitrary text never panics
        #[test]
        fn test_parse_never_panics(response in ".{0,200}") {
            let _ = parse_decisions(&response, 0.7);
        }

        /// Property: a promote's confidence survives decoding when in range
        #[test]
        fn test_confidence_in_range_is_kept(value in 0.0f64..=1.0) {
            let id = EntryId::new();
            let response = format!(
                r#"[{{"action": "promote", "entry_id": "{}", "key": "k", "confidence": {}}}]"#,
                id, value
            );
            let results = parse_decisions(&response, 0.7).unwrap();
            match &results[0] {
                Ok(Decision::Promote { confidence, .. }) => {
                    prop_assert!((confidence.value() - value).abs() < 1e-9)
                }
                other => return Err(TestCaseError::fail(format!("unexpected {:?}", other))),
            }
        }
    }
}
