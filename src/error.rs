// Error types: one enum per layer. Configuration problems are detected
// before any network activity; transport problems describe a single HTTP
// exchange; deploy errors are what the orchestrator reports at the end.

use std::path::PathBuf;
use thiserror::Error;

/// Startup validation failures. All of them halt the run before a single
/// request is sent.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("admin API key not set (expected GHOST_ADMIN_API_KEY=<id>:<secret>)")]
    MissingCredential,

    #[error("malformed admin API key: {reason}")]
    MalformedCredential { reason: String },

    #[error("admin API secret is not valid hex: {0}")]
    InvalidSecret(#[from] hex::FromHexError),

    #[error("invalid site URL '{url}': {reason}")]
    InvalidSiteUrl { url: String, reason: String },

    #[error("site URL is still the placeholder '{0}', set GHOST_URL or --site-url")]
    PlaceholderSiteUrl(String),
}

/// Outcome of a single request/response exchange that did not yield a
/// usable JSON body. Remote failures (status >= 400 with a JSON body) are
/// *not* errors at this layer; see `ApiResponse::is_failure`.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("network error: {0}")]
    Network(String),

    #[error("failed to parse response (status {status}): {body}")]
    Protocol { status: u16, body: String },

    #[error("invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),
}

/// Terminal failure of a deployment run.
#[derive(Error, Debug)]
pub enum DeployError {
    #[error("theme archive not found at {}", .path.display())]
    ArtifactMissing { path: PathBuf },

    #[error("failed to read {}: {source}", .path.display())]
    FileNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}")]
    Network(String),

    #[error("upload failed{}: {detail}", status_suffix(.status))]
    UploadFailed { status: Option<u16>, detail: String },

    #[error("activation failed{}: {detail}", status_suffix(.status))]
    ActivationFailed { status: Option<u16>, detail: String },

    #[error("unexpected response: {0}")]
    MalformedResponse(String),
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" (status {s})")).unwrap_or_default()
}

pub type Result<T> = std::result::Result<T, DeployError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_failure_message_includes_status() {
        let err = DeployError::UploadFailed {
            status: Some(401),
            detail: r#"{"errors":[]}"#.into(),
        };
        assert_eq!(err.to_string(), r#"upload failed (status 401): {"errors":[]}"#);
    }

    #[test]
    fn activation_failure_without_status() {
        let err = DeployError::ActivationFailed {
            status: None,
            detail: "boom".into(),
        };
        assert_eq!(err.to_string(), "activation failed: boom");
    }
}
