use crate::error::BedrockAgentError;
use crate::types::{
    ContentBlock, InvokeConfig, InvokeRequest, InvokeResponse, MessageParam, ANTHROPIC_VERSION,
};
use crate::Result;

/// Client for a Bedrock-style model runtime endpoint.
///
/// `POST {endpoint}/model/{model_id}/invoke` with an Anthropic messages
/// body; the completion is the concatenated text of the response content
/// blocks.
pub struct ModelClient {
    http: reqwest::blocking::Client,
    config: InvokeConfig,
}

impl ModelClient {
    pub fn new(config: InvokeConfig) -> Self {
        Self {
            http: reqwest::blocking::Client::new(),
            config,
        }
    }

    pub fn invoke(&self, prompt: &str) -> Result<String> {
        let url = format!(
            "{}/model/{}/invoke",
            self.config.endpoint.trim_end_matches('/'),
            self.config.model_id
        );
        let body = InvokeRequest {
            anthropic_version: ANTHROPIC_VERSION,
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
            messages: vec![MessageParam {
                role: "user",
                content: prompt,
            }],
        };

        tracing::debug!(model = %self.config.model_id, "invoking model runtime");
        let response = self.http.post(&url).json(&body).send()?;

        let status = response.status();
        if !status.is_success() {
            // Preserve the collaborator's error body verbatim.
            let body = response.text().unwrap_or_default();
            return Err(BedrockAgentError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: InvokeResponse = serde_json::from_str(&response.text()?)?;
        let text = parsed
            .content
            .iter()
            .map(|ContentBlock { text }| text.as_str())
            .collect::<Vec<_>>()
            .join("");
        if text.is_empty() {
            return Err(BedrockAgentError::EmptyCompletion);
        }
        Ok(text)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
