//! Error types shared by the gateway and its callers.

use thiserror::Error;

/// Failure of a single request to the model provider.
///
/// Empty results are not errors: a reply without text is `""` and a reply
/// without an image part is `None`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// No API key was found in the environment when the call was made.
    #[error("no API key configured (set {env})")]
    MissingCredentials { env: String },

    /// Connection, TLS or body read failure.
    #[error("transport error: {0}")]
    Transport(String),

    /// Non-success HTTP status. `body` is truncated.
    #[error("gemini error {status}: {body}")]
    Status { status: u16, body: String },

    /// The provider answered but the payload did not have the expected shape.
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl GatewayError {
    /// Authentication or quota problems, as opposed to transport or payload ones.
    pub fn is_auth(&self) -> bool {
        match self {
            GatewayError::MissingCredentials { .. } => true,
            GatewayError::Status { status, .. } => matches!(status, 401 | 403 | 429),
            _ => false,
        }
    }
}

impl From<serde_json::Error> for GatewayError {
    fn from(err: serde_json::Error) -> Self {
        GatewayError::Malformed(err.to_string())
    }
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid settings file: {0}")]
    Parse(#[from] serde_json::Error),
}
