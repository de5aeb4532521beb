use serde::{Deserialize, Serialize};

/// Protocol version constant the Anthropic-on-Bedrock request body requires.
pub const ANTHROPIC_VERSION: &str = "bedrock-2023-05-31";

// ---------------------------------------------------------------------------
// InvokeConfig
// ---------------------------------------------------------------------------

/// Everything needed to invoke a model: runtime endpoint, model identifier,
/// and sampling parameters. Mirrors the prompt-template document stored
/// alongside scenarios.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvokeConfig {
    pub endpoint: String,
    pub model_id: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

fn default_max_tokens() -> u32 {
    2048
}

fn default_temperature() -> f32 {
    0.7
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub(crate) struct InvokeRequest<'a> {
    pub anthropic_version: &'static str,
    pub max_tokens: u32,
    pub temperature: f32,
    pub messages: Vec<MessageParam<'a>>,
}

#[derive(Debug, Serialize)]
pub(crate) struct MessageParam<'a> {
    pub role: &'static str,
    pub content: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct InvokeResponse {
    #[serde(default)]
    pub content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ContentBlock {
    #[serde(default)]
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_body_shape() {
        let req = InvokeRequest {
            anthropic_version: ANTHROPIC_VERSION,
            max_tokens: 100,
            temperature: 0.5,
            messages: vec![MessageParam {
                role: "user",
                content: "generate a scenario",
            }],
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["anthropic_version"], "bedrock-2023-05-31");
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"], "generate a scenario");
    }

    #[test]
    fn response_tolerates_missing_fields() {
        let resp: InvokeResponse = serde_json::from_str("{}").unwrap();
        assert!(resp.content.is_empty());
        let resp: InvokeResponse =
            serde_json::from_str(r#"{"content": [{"type": "text", "text": "hi"}]}"#).unwrap();
        assert_eq!(resp.content[0].text, "hi");
    }

    #[test]
    fn invoke_config_defaults() {
        let cfg: InvokeConfig = serde_json::from_str(
            r#"{"endpoint": "http://localhost:9000", "model_id": "anthropic.claude-3-haiku-20240307-v1:0"}"#,
        )
        .unwrap();
        assert_eq!(cfg.max_tokens, 2048);
        assert!((cfg.temperature - 0.7).abs() < f32::EPSILON);
    }
}
