use thiserror::Error;

#[derive(Debug, Error)]
pub enum BedrockAgentError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("model runtime returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("failed to parse model response: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("model returned an empty completion")]
    EmptyCompletion,
}
