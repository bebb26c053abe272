use thiserror::Error;

/// Failures reported by a [`crate::camera::CameraRuntime`] or one of its
/// tracks.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CameraError {
    #[error("{0}")]
    PermissionDenied(String),
    #[error("permission query unavailable: {0}")]
    QueryUnavailable(String),
    #[error("no video input devices")]
    NoDevices,
    #[error("capability not supported: {0}")]
    Unsupported(&'static str),
    #[error("camera failure: {0}")]
    Device(String),
}

/// Errors surfaced by the Fieldnotes HTTP API client.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("{0} not found")]
    NotFound(String),
    #[error("Unauthorized - please sign in again")]
    Unauthorized,
    #[error("{message}")]
    Api { status: u16, message: String },
    #[error("invalid server URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Empty response from server")]
    EmptyResponse,
}

impl ClientError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::NotFound(_))
    }
}

/// Capture-loop failures.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("cannot {action} while {state:?}")]
    InvalidTransition {
        action: &'static str,
        state: crate::controller::ScanState,
    },
    #[error(transparent)]
    Camera(#[from] CameraError),
}
