//! Value objects: validated newtypes for identifiers and message text.

use uuid::Uuid;

use super::error::ValidationError;

/// Maximum number of characters in one message typed by the visitor.
pub const MAX_MESSAGE_CHARS: usize = 500;

/// Typed text longer than this is shown with a warning counter.
pub const CHAR_WARNING_ABOVE: usize = 400;

/// Typed text longer than this is shown with a danger counter.
pub const CHAR_DANGER_ABOVE: usize = 450;

/// Pseudonymous visitor identity, generated once and persisted locally.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AnonymousId(String);

impl AnonymousId {
    pub fn new(value: String) -> Result<Self, ValidationError> {
        let trimmed = value.trim();
        if trimmed.is_empty() || trimmed.chars().any(char::is_whitespace) {
            return Err(ValidationError::InvalidIdentifier(value));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Generate a fresh random identity.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

/// Chat session identifier handed out by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(value: String) -> Result<Self, ValidationError> {
        if value.trim().is_empty() {
            return Err(ValidationError::InvalidIdentifier(value));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

/// Text typed by the visitor: trimmed, non-empty, at most [`MAX_MESSAGE_CHARS`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageText(String);

impl MessageText {
    pub fn new(raw: &str) -> Result<Self, ValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyMessage);
        }
        let len = trimmed.chars().count();
        if len > MAX_MESSAGE_CHARS {
            return Err(ValidationError::MessageTooLong {
                len,
                max: MAX_MESSAGE_CHARS,
            });
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}
