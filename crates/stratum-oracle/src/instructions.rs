//! Curator instructions and the decision output contract

use serde_json::json;

/// Standing instructions given to the curating model
pub const CURATOR_INSTRUCTIONS: &str = "\
You are the curator of a shared knowledge store.

Your only job is to decide which low-trust claims become canonical facts.
Canonical knowledge is the permanent record: it is never overwritten, so only
promote claims you would stake that record on. When unsure, dismiss.

Promote a claim only if every one of these holds:
  - it is specific and factual, not speculative
  - it does not contradict an existing canonical entry
  - its confidence is at least 0.6, or it comes from a reliable source
    such as web_search or user_input
  - it is worth keeping beyond the current task

Conflicts:
  - if a claim contradicts a canonical entry, use flag_conflict
  - never promote a conflicting claim, even if you believe it is correct
  - disputes are settled by a human, not by you
  - promoting to a key that already exists is rejected; flag it instead

Dismiss a claim if any of these holds:
  - it is speculative, vague or opinion
  - it only matters for the current task
  - its confidence is below 0.4 and its source is weak
  - the canonical layer already records it

Give exactly one decision per claim, referring to claims by their id.";

/// Appended after the review payload
pub const OUTPUT_FORMAT_REMINDER: &str = "\
Respond with a JSON array and nothing else. Each element is one of:
  {\"action\": \"promote\", \"entry_id\": \"<id>\", \"namespace\": \"<ns>\", \"key\": \"<key>\", \"confidence\": 0.0-1.0}
  {\"action\": \"flag_conflict\", \"entry_id\": \"<id>\", \"canonical_key\": \"<ns>/<key>\", \"reason\": \"<why>\"}
  {\"action\": \"dismiss\", \"entry_id\": \"<id>\", \"reason\": \"<why>\"}";

/// JSON schema of the decision list, for providers with structured output
pub fn decision_schema() -> String {
    json!({
        "type": "array",
        "items": {
            "type": "object",
            "required": ["action", "entry_id"],
            "properties": {
                "action": {
                    "type": "string",
                    "enum": ["promote", "flag_conflict", "dismiss"]
                },
                "entry_id": { "type": "string" },
                "namespace": { "type": "string" },
                "key": { "type": "string" },
                "confidence": { "type": "number", "minimum": 0.0, "maximum": 1.0 },
                "canonical_key": { "type": "string" },
                "reason": { "type": "string" }
            }
        }
    })
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_is_valid_json() {
        let schema: serde_json::Value = serde_json::from_str(&decision_schema()).unwrap();
        assert_eq!(schema["type"], "array");
        assert_eq!(schema["items"]["properties"]["action"]["enum"][1], "flag_conflict");
    }

    #[test]
    fn test_reminder_lists_every_action() {
        for action in ["promote", "flag_conflict", "dismiss"] {
            assert!(OUTPUT_FORMAT_REMINDER.contains(action));
        }
    }
}
