//! Port to the bar backend.
//!
//! The backend decides admission, picks who answers and tracks session limits.
//! The client only sees the results below.

use async_trait::async_trait;

use super::{
    error::GatewayError,
    persona::Persona,
    value_object::{AnonymousId, SessionId},
};

/// One onboarding turn sent to the bouncer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OnboardingRequest {
    pub anonymous_id: AnonymousId,
    /// `None` on the opening turn.
    pub message: Option<String>,
    /// Transcript of every reply so far, sent from the second turn on.
    pub context: Option<Vec<String>>,
}

/// The bouncer's answer to one onboarding turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OnboardingVerdict {
    pub message: String,
    pub approved: bool,
    pub continue_onboarding: bool,
}

/// Result of opening a chat session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOpened {
    pub session_id: SessionId,
    pub weather: Option<String>,
    pub available: Vec<Persona>,
}

/// One outgoing chat message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatRequest {
    pub session_id: SessionId,
    pub content: String,
    pub selected: Option<Persona>,
    /// Only set on the synthetic entry message.
    pub onboarding_context: Option<Vec<String>>,
}

/// Session status as reported by the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStatus {
    Active,
    Ended,
    Other(String),
}

impl SessionStatus {
    pub fn from_wire(value: &str) -> Self {
        match value {
            "active" => SessionStatus::Active,
            "ended" => SessionStatus::Ended,
            other => SessionStatus::Other(other.to_string()),
        }
    }
}

/// A persona's answer plus the session counters that came with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatReply {
    /// Name of whoever answered. Kept as text so an unknown speaker still shows up.
    pub agent: String,
    pub message: String,
    pub available: Vec<Persona>,
    pub muted: Vec<Persona>,
    pub message_count: u32,
    pub message_limit: Option<u32>,
    pub status: SessionStatus,
    pub timestamp: Option<String>,
}

/// Remote calls the interaction controller can issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiCall {
    Onboard(OnboardingRequest),
    StartSession(AnonymousId),
    SendMessage(ChatRequest),
}

/// Bar backend gateway trait
///
/// UseCase 層はこの trait に依存し、HTTP 実装には依存しない。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BarGateway: Send + Sync {
    /// `POST /api/onboard`
    async fn onboard(&self, request: OnboardingRequest) -> Result<OnboardingVerdict, GatewayError>;

    /// `POST /session/start`
    async fn start_session(
        &self,
        anonymous_id: AnonymousId,
    ) -> Result<SessionOpened, GatewayError>;

    /// `POST /message`
    async fn send_message(&self, request: ChatRequest) -> Result<ChatReply, GatewayError>;
}
