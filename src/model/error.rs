//! Error types for reelfeed.
//!
//! This module defines the error taxonomy using `thiserror`. Boundary errors compose into
//! [`AppError`] via `From`, so shell code can propagate them with `?`.
//!
//! # Error Hierarchy
//!
//! - [`AppError`] - Top-level application error
//!   - [`CaptureError`] - Capture device failures (permission denial, recording)
//!   - [`GenerationError`] - Generation service failures (HTTP, malformed response, timeout)
//!   - [`FlowError`] - Create-flow transitions rejected by the current state
//!   - `std::io::Error` - Terminal/TUI failures
//!
//! # Recovery Strategy
//!
//! Capture and generation errors are **non-fatal**: they are caught at the call site,
//! logged, and turned into an inert UI state or a user-visible notice. None is retried
//! automatically. `GenerationError::EntityNotFound` is the one error with a dedicated
//! recovery branch: it asks the user to re-enter the API credential.
//! Terminal errors are fatal and propagate to `main`.

use thiserror::Error;

/// Top-level application error encompassing all failure modes.
#[derive(Debug, Error)]
pub enum AppError {
    /// Capture device failure.
    #[error("Capture failed: {0}")]
    Capture(#[from] CaptureError),

    /// Generation service failure.
    #[error("Generation failed: {0}")]
    Generation(#[from] GenerationError),

    /// Create flow refused a transition.
    #[error("Create flow: {0}")]
    Flow(#[from] FlowError),

    /// Terminal or TUI rendering error.
    ///
    /// **Recovery**: Attempt graceful terminal cleanup, then exit.
    #[error("Terminal error: {0}")]
    Terminal(#[from] std::io::Error),
}

/// Errors at the capture device boundary.
#[derive(Debug, Error)]
pub enum CaptureError {
    /// The host refused the capture permission grant.
    ///
    /// **Recovery**: Show a blocking notice and stay in camera-live without a stream.
    #[error("Capture permission denied: {reason}")]
    PermissionDenied {
        /// Host-provided reason.
        reason: String,
    },

    /// No capture device is configured or present.
    #[error("No capture device available")]
    DeviceUnavailable,

    /// The capture session failed while recording.
    #[error("Recording failed: {0}")]
    Recording(String),

    /// Underlying I/O failure reading the device.
    #[error("Capture I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CaptureError {
    /// Whether this error should be surfaced as a permission notice.
    pub fn is_denial(&self) -> bool {
        matches!(
            self,
            CaptureError::PermissionDenied { .. } | CaptureError::DeviceUnavailable
        )
    }
}

/// Errors at the generation service boundary.
///
/// Covers both of the taxonomy's service branches: generation-failure (the call
/// fails or returns nothing usable) and malformed-response (an expected field is
/// absent).
#[derive(Debug, Error)]
pub enum GenerationError {
    /// The service reported "Requested entity was not found."
    ///
    /// **Recovery**: Prompt the user to re-select the API credential.
    #[error("Requested entity was not found")]
    EntityNotFound,

    /// No API credential is configured for this session.
    #[error("No API key configured")]
    MissingCredential,

    /// The service answered with a non-success status.
    #[error("Service returned HTTP {status}: {message}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Error message from the response body.
        message: String,
    },

    /// Transport-level failure (DNS, TLS, connection reset).
    #[error("Network error: {0}")]
    Network(String),

    /// A required field was absent or the payload did not parse.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// A polling operation did not complete within its time budget.
    #[error("Generation timed out after {waited_secs}s")]
    Timeout {
        /// Total time spent waiting between status checks.
        waited_secs: u64,
    },

    /// The operation was cancelled before completion.
    #[error("Generation cancelled")]
    Cancelled,

    /// The service completed but produced no usable media.
    #[error("Service returned no result")]
    NoResult,
}

impl GenerationError {
    /// Recognize the credential-reselection trigger inside a raw service message.
    pub fn from_service_message(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        if message.contains("Requested entity was not found") {
            GenerationError::EntityNotFound
        } else {
            GenerationError::Http { status, message }
        }
    }

    /// Whether recovering from this error requires a new credential.
    pub fn requests_credential(&self) -> bool {
        matches!(
            self,
            GenerationError::EntityNotFound | GenerationError::MissingCredential
        )
    }
}

/// Create-flow transitions that the current state does not allow.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlowError {
    /// Closing or switching is blocked while recording or generating.
    #[error("Create flow is busy ({0})")]
    Busy(&'static str),

    /// The requested action has no meaning in the current state.
    #[error("Cannot {action} while {state}")]
    InvalidTransition {
        /// Attempted action.
        action: &'static str,
        /// Current state name.
        state: &'static str,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_not_found_message_is_recognized() {
        let err = GenerationError::from_service_message(
            404,
            "Requested entity was not found.",
        );
        assert!(matches!(err, GenerationError::EntityNotFound));
        assert!(err.requests_credential());
    }

    #[test]
    fn other_messages_stay_http_errors() {
        let err = GenerationError::from_service_message(500, "backend exploded");
        match err {
            GenerationError::Http { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "backend exploded");
            }
            other => panic!("Expected Http error, got {other:?}"),
        }
    }

    #[test]
    fn capture_denial_classification() {
        let denied = CaptureError::PermissionDenied {
            reason: "user refused".to_string(),
        };
        assert!(denied.is_denial());
        assert!(CaptureError::DeviceUnavailable.is_denial());
        assert!(!CaptureError::Recording("x".to_string()).is_denial());
    }

    #[test]
    fn boundary_errors_convert_into_app_error() {
        let app: AppError = GenerationError::Cancelled.into();
        assert!(matches!(app, AppError::Generation(_)));
        let app: AppError = FlowError::Busy("recording").into();
        assert!(matches!(app, AppError::Flow(_)));
    }

    #[test]
    fn flow_error_display_names_state() {
        let err = FlowError::InvalidTransition {
            action: "post",
            state: "camera-live",
        };
        assert_eq!(err.to_string(), "Cannot post while camera-live");
    }
}
