use thiserror::Error;

#[derive(Debug, Error)]
pub enum FaultlineError {
    #[error("not initialized: run 'faultline init'")]
    NotInitialized,

    #[error("no scenario document provided")]
    MissingScenario,

    #[error("scenario not found: {0}")]
    ScenarioNotFound(String),

    #[error("artifact not found: {0}")]
    ArtifactNotFound(String),

    #[error("unknown service tag: {0}")]
    UnknownService(String),

    #[error("invalid artifact key '{0}'")]
    InvalidKey(String),

    #[error("experiment action '{action}' references missing target '{target}'")]
    DanglingTarget { action: String, target: String },

    #[error("aws cli not found: install awscli and ensure 'aws' is on PATH")]
    AwsCliNotFound,

    #[error("deployment failed ({code}): {message}")]
    Deploy { code: String, message: String },

    #[error("stack '{stack}' did not reach a terminal state within {attempts} attempts")]
    DeployTimeout { stack: String, attempts: u32 },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, FaultlineError>;
