//! Conversion logic between DTOs and domain types.

use crate::domain::{
    ChatReply, ChatRequest, GatewayError, OnboardingRequest, OnboardingVerdict, Persona,
    SessionId, SessionOpened, SessionStatus,
};

use super::http as dto;

// ========================================
// Domain → DTO
// ========================================

impl From<OnboardingRequest> for dto::OnboardRequestDto {
    fn from(request: OnboardingRequest) -> Self {
        Self {
            anonymous_id: request.anonymous_id.into_string(),
            message: request.message,
            context: request
                .context
                .map(|responses| dto::OnboardingContextDto { responses }),
        }
    }
}

impl From<ChatRequest> for dto::MessageRequestDto {
    fn from(request: ChatRequest) -> Self {
        Self {
            session_id: request.session_id.into_string(),
            content: request.content,
            selected_agent: request.selected.map(|p| p.as_str().to_string()),
            onboarding_context: request
                .onboarding_context
                .map(|responses| dto::OnboardingContextDto { responses }),
        }
    }
}

// ========================================
// DTO → Domain
// ========================================

impl From<dto::OnboardResponseDto> for OnboardingVerdict {
    fn from(dto: dto::OnboardResponseDto) -> Self {
        Self {
            message: dto.message,
            approved: dto.approved,
            continue_onboarding: dto.continue_onboarding,
        }
    }
}

impl TryFrom<dto::SessionStartResponseDto> for SessionOpened {
    type Error = GatewayError;

    fn try_from(dto: dto::SessionStartResponseDto) -> Result<Self, Self::Error> {
        let session_id =
            SessionId::new(dto.session_id).map_err(|e| GatewayError::Decode(e.to_string()))?;
        Ok(Self {
            session_id,
            weather: dto.weather,
            available: parse_personas(&dto.available_agents),
        })
    }
}

impl From<dto::MessageResponseDto> for ChatReply {
    fn from(dto: dto::MessageResponseDto) -> Self {
        Self {
            available: parse_personas(&dto.agents_available),
            muted: parse_personas(&dto.agents_muted),
            status: SessionStatus::from_wire(&dto.session_status),
            agent: dto.agent,
            message: dto.message,
            message_count: dto.message_count,
            message_limit: dto.message_limit,
            timestamp: dto.timestamp,
        }
    }
}

/// Parse persona names reported by the backend, skipping unknown ones.
pub fn parse_personas(names: &[String]) -> Vec<Persona> {
    names
        .iter()
        .filter_map(|name| match name.parse::<Persona>() {
            Ok(persona) => Some(persona),
            Err(e) => {
                tracing::warn!("{}; ignoring", e);
                None
            }
        })
        .collect()
}
