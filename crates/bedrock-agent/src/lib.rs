//! `bedrock-agent` — client for the generative-text collaborator.
//!
//! Wraps a Bedrock-style model runtime endpoint: build the Anthropic
//! messages request body, invoke the model, and extract the scenario JSON
//! from the free-text completion on a best-effort basis. The caller decides
//! what to do when no JSON comes back; this crate never fabricates a
//! scenario on its own.

pub mod client;
pub mod error;
pub mod extract;
pub mod types;

pub use client::ModelClient;
pub use error::BedrockAgentError;
pub use extract::{extract_json_object, extract_scenario_json};
pub use types::InvokeConfig;

/// Convenience `Result` alias for this crate.
pub type Result<T> = std::result::Result<T, BedrockAgentError>;
