//! Best-effort JSON extraction from model completions.
//!
//! Models wrap the scenario document in prose more often than not; the
//! contract is "first `{` to last `}` must parse". Callers substitute a
//! fallback document when extraction fails, so a completion with no JSON in
//! it is not an error at this layer.

/// Slice the candidate JSON object out of a completion, if any.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&text[start..=end])
}

/// Extract and parse the embedded JSON object from a completion.
pub fn extract_scenario_json(text: &str) -> Option<serde_json::Value> {
    let candidate = extract_json_object(text)?;
    serde_json::from_str(candidate).ok()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_object_between_braces() {
        let text = "Here is your scenario:\n{\"scenario_name\": \"X\"}\nEnjoy!";
        assert_eq!(extract_json_object(text), Some("{\"scenario_name\": \"X\"}"));
    }

    #[test]
    fn spans_first_open_to_last_close() {
        let text = r#"{"a": {"b": 1}} trailing {"c": 2}"#;
        // greedy: first '{' to last '}', even across prose
        assert_eq!(
            extract_json_object(text),
            Some(r#"{"a": {"b": 1}} trailing {"c": 2}"#)
        );
        // which therefore fails to parse
        assert!(extract_scenario_json(text).is_none());
    }

    #[test]
    fn no_braces_is_none() {
        assert!(extract_json_object("no json here").is_none());
        assert!(extract_json_object("").is_none());
    }

    #[test]
    fn reversed_braces_is_none() {
        assert!(extract_json_object("} backwards {").is_none());
    }

    #[test]
    fn parses_valid_scenario() {
        let text = "```json\n{\"scenario_name\": \"DB Outage\", \"purpose\": \"test\"}\n```";
        let value = extract_scenario_json(text).unwrap();
        assert_eq!(value["scenario_name"], "DB Outage");
    }

    #[test]
    fn invalid_json_is_none() {
        assert!(extract_scenario_json("{not json}").is_none());
    }
}
