use crate::error::Result;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Scenario
// ---------------------------------------------------------------------------

/// A chaos-engineering scenario document: the unit of work for one
/// generation run. Field names match the external scenario JSON produced by
/// the generative collaborator; the struct is never mutated after parsing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(rename = "scenario_name", default = "default_scenario_name")]
    pub name: String,

    #[serde(default)]
    pub purpose: String,

    /// Explicit service hints, authoritative over free-text inference.
    #[serde(default)]
    pub target_services: Vec<String>,

    #[serde(default)]
    pub execution_steps: Vec<String>,

    #[serde(default)]
    pub expected_results: Vec<String>,

    #[serde(default)]
    pub recovery_steps: Vec<String>,
}

fn default_scenario_name() -> String {
    "ChaosTest".to_string()
}

impl Scenario {
    pub fn from_json(data: &str) -> Result<Self> {
        Ok(serde_json::from_str(data)?)
    }

    /// Identifier-safe form of the scenario name used in generated source:
    /// spaces and hyphens stripped, everything else kept as written.
    pub fn safe_name(&self) -> String {
        self.name.replace([' ', '-'], "")
    }

    /// Lowercase storage identifier derived from the name: alphanumerics
    /// kept, runs of anything else collapsed to single hyphens.
    pub fn slug(&self) -> String {
        let mut out = String::with_capacity(self.name.len());
        for c in self.name.to_lowercase().chars() {
            if c.is_ascii_alphanumeric() {
                out.push(c);
            } else if !out.ends_with('-') && !out.is_empty() {
                out.push('-');
            }
        }
        let trimmed = out.trim_end_matches('-');
        if trimmed.is_empty() {
            "chaostest".to_string()
        } else {
            trimmed.to_string()
        }
    }

    /// Serialize the whole document to a single text blob for free-text
    /// pattern inference. Serialization of this struct cannot fail, so an
    /// empty blob stands in rather than an error path.
    pub fn to_search_blob(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Minimal substitute document used when the generative collaborator
    /// returns text with no parseable JSON object in it.
    pub fn fallback(generated_text: &str) -> Self {
        Scenario {
            name: "Generated Scenario".to_string(),
            purpose: "Automatically generated chaos scenario".to_string(),
            target_services: Vec::new(),
            execution_steps: vec![generated_text.to_string()],
            expected_results: vec!["Verify the system tolerates the injected fault".to_string()],
            recovery_steps: vec!["Restore the system to steady state".to_string()],
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_full_document() {
        let json = r#"{
            "scenario_name": "Order Service Failure",
            "purpose": "Validate checkout resilience",
            "target_services": ["Lambda"],
            "execution_steps": ["inject latency"],
            "expected_results": ["orders retried"],
            "recovery_steps": ["remove fault"]
        }"#;
        let s = Scenario::from_json(json).unwrap();
        assert_eq!(s.name, "Order Service Failure");
        assert_eq!(s.target_services, vec!["Lambda"]);
    }

    #[test]
    fn missing_name_defaults() {
        let s = Scenario::from_json(r#"{"purpose": "x"}"#).unwrap();
        assert_eq!(s.name, "ChaosTest");
    }

    #[test]
    fn safe_name_strips_spaces_and_hyphens() {
        let mut s = Scenario::from_json("{}").unwrap();
        s.name = "Order Service-Failure".to_string();
        assert_eq!(s.safe_name(), "OrderServiceFailure");
    }

    #[test]
    fn slug_is_lowercase_hyphenated() {
        let mut s = Scenario::from_json("{}").unwrap();
        s.name = "Order  Service Failure!".to_string();
        assert_eq!(s.slug(), "order-service-failure");
    }

    #[test]
    fn slug_never_empty() {
        let mut s = Scenario::from_json("{}").unwrap();
        s.name = "---".to_string();
        assert_eq!(s.slug(), "chaostest");
    }

    #[test]
    fn search_blob_contains_nested_fields() {
        let s = Scenario::from_json(
            r#"{"scenario_name": "T", "execution_steps": ["stop the database"]}"#,
        )
        .unwrap();
        assert!(s.to_search_blob().contains("stop the database"));
    }

    #[test]
    fn fallback_keeps_generated_text() {
        let s = Scenario::fallback("model said something unparseable");
        assert_eq!(s.name, "Generated Scenario");
        assert_eq!(s.execution_steps.len(), 1);
        assert!(s.execution_steps[0].contains("unparseable"));
    }
}
