//! Error types for the deployer

use thiserror::Error;

/// Configuration problems detected before any network call is made
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("deploy target required: set `service-id` (with `render-api-key`) or `deploy-hook`")]
    MissingDeployTarget,

    #[error("`service-id` was supplied without `render-api-key`; direct API deploys need credentials")]
    MissingApiKey,

    #[error("failed to extract service identifier from deploy hook: {0}")]
    InvalidDeployHook(String),

    #[error("`image-url` is required")]
    MissingImage,

    #[error("`wait-for-deployment` requires `render-api-key` and a service identifier")]
    WaitRequiresCredentials,

    #[error("input `{input}` does not meet the YAML 1.2 core schema boolean: {value:?}")]
    InvalidBoolean { input: &'static str, value: String },

    #[error("`max-wait-time` must be a whole number of seconds, got {0:?}")]
    InvalidMaxWait(String),

    #[error("`max-wait-time` must be at least {minimum} seconds, got {value}")]
    MaxWaitTooSmall { value: u64, minimum: u64 },

    #[error("API base URL is not a valid http(s) base: {0:?}")]
    InvalidApiBaseUrl(String),

    #[error("`render-api-key` contains characters that cannot be sent in a header")]
    InvalidApiKey,
}

/// Main error type for a deploy run
#[derive(Error, Debug)]
pub enum DeployError {
    #[error("Invalid configuration: {0}")]
    Validation(#[from] ValidationError),

    #[error("Failed to trigger deploy: {}", describe(.status, .message))]
    Trigger { status: Option<u16>, message: String },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Failed to retrieve deploy: {}", describe(.status, .message))]
    QueryFailed { status: Option<u16>, message: String },

    #[error("Max wait time of {max_wait_secs} seconds exceeded (last status: {last_status})")]
    TimedOut { max_wait_secs: u64, last_status: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

fn describe(status: &Option<u16>, message: &str) -> String {
    match status {
        Some(status) => format!("{} - {}", status, message),
        None => message.to_string(),
    }
}
