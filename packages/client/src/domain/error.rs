//! Domain error types.

use thiserror::Error;

/// Local validation failures. No request is issued when one of these occurs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please enter a message")]
    EmptyMessage,

    #[error("Message is {len} characters long; the limit is {max}")]
    MessageTooLong { len: usize, max: usize },

    #[error("No active session. Please start a new session.")]
    MissingSession,

    #[error("Still waiting for a reply")]
    AwaitingResponse,

    #[error("Session ended. Start a new session to continue.")]
    SessionEnded,

    #[error("Can't {action} while {phase}")]
    WrongPhase {
        action: &'static str,
        phase: &'static str,
    },

    #[error("Unknown persona '{0}'")]
    UnknownPersona(String),

    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),
}

/// Failures talking to the bar backend.
///
/// A timeout is reported separately but handled exactly like a transport failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    #[error("Connection failed: {0}")]
    Transport(String),

    #[error("Request timed out")]
    Timeout,

    #[error("{}", describe_http(.status, .detail))]
    Http { status: u16, detail: Option<String> },

    #[error("Unexpected response: {0}")]
    Decode(String),
}

fn describe_http(status: &u16, detail: &Option<String>) -> String {
    match detail {
        Some(detail) if !detail.is_empty() => detail.clone(),
        _ => format!("HTTP {}", status),
    }
}

/// Failures reading or writing the persisted anonymous identifier.
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("Identity store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Stored identity is invalid: {0}")]
    Invalid(#[from] ValidationError),
}
