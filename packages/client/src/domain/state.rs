//! Client session state.
//!
//! The named states of the interaction are one tagged [`Phase`] value, so
//! combinations like "inside but never approved" cannot be represented.
//! The old boolean views (`is_inside`, `is_approved`, ...) are derived from it.

use std::collections::BTreeSet;

use super::{
    persona::Persona,
    value_object::{AnonymousId, SessionId},
};

/// Reported message count at which the session is over.
pub const MESSAGE_LIMIT: u32 = 30;

/// Reported message count at which the "last call" notice is shown.
pub const LAST_CALL_AT: u32 = 25;

/// Where the onboarding dialogue currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnboardingTurn {
    /// First request sent, no answer yet.
    Opening,
    /// The bouncer asked something; the reply surface is open.
    AwaitingReply,
    /// A reply was sent and is being judged.
    Judging,
}

/// Progress of the walk from the door to the bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryStep {
    StartingSession,
    /// Session open; the synthetic "entered" message is in flight.
    Greeting { session_id: SessionId },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    NotStarted,
    Onboarding { turn: OnboardingTurn },
    Rejected,
    ApprovedOutside,
    Entering { step: EntryStep },
    ChatActive { session_id: SessionId, awaiting: bool },
    ChatEnded { session_id: SessionId },
}

impl Phase {
    /// Short human description, used in notices and logs.
    pub fn describe(&self) -> &'static str {
        match self {
            Phase::NotStarted => "outside the door",
            Phase::Onboarding { .. } => "talking to the bouncer",
            Phase::Rejected => "turned away",
            Phase::ApprovedOutside => "waiting at the open door",
            Phase::Entering { .. } => "walking in",
            Phase::ChatActive { .. } => "inside the bar",
            Phase::ChatEnded { .. } => "at closing time",
        }
    }
}

/// Everything the client knows about the current visit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSession {
    pub anonymous_id: AnonymousId,
    pub phase: Phase,
    pub selected_persona: Option<Persona>,
    pub muted_personas: BTreeSet<Persona>,
    pub available_personas: BTreeSet<Persona>,
    pub message_count: u32,
    pub message_limit: u32,
    pub onboarding_responses: Vec<String>,
}

impl ClientSession {
    pub fn new(anonymous_id: AnonymousId) -> Self {
        Self {
            anonymous_id,
            phase: Phase::NotStarted,
            selected_persona: None,
            muted_personas: BTreeSet::new(),
            available_personas: Persona::ALL.into_iter().collect(),
            message_count: 0,
            message_limit: MESSAGE_LIMIT,
            onboarding_responses: Vec::new(),
        }
    }

    pub fn onboarding_in_progress(&self) -> bool {
        matches!(self.phase, Phase::Onboarding { .. })
    }

    pub fn is_approved(&self) -> bool {
        matches!(
            self.phase,
            Phase::ApprovedOutside
                | Phase::Entering { .. }
                | Phase::ChatActive { .. }
                | Phase::ChatEnded { .. }
        )
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self.phase, Phase::Rejected)
    }

    pub fn is_inside(&self) -> bool {
        matches!(
            self.phase,
            Phase::Entering {
                step: EntryStep::Greeting { .. }
            } | Phase::ChatActive { .. }
                | Phase::ChatEnded { .. }
        )
    }

    /// True while a request is in flight.
    pub fn is_processing(&self) -> bool {
        matches!(
            self.phase,
            Phase::Onboarding {
                turn: OnboardingTurn::Opening | OnboardingTurn::Judging
            } | Phase::Entering { .. }
                | Phase::ChatActive { awaiting: true, .. }
        )
    }

    pub fn session_id(&self) -> Option<&SessionId> {
        match &self.phase {
            Phase::Entering {
                step: EntryStep::Greeting { session_id },
            }
            | Phase::ChatActive { session_id, .. }
            | Phase::ChatEnded { session_id } => Some(session_id),
            _ => None,
        }
    }

    /// Personas that may currently be addressed.
    pub fn selectable_personas(&self) -> BTreeSet<Persona> {
        self.available_personas
            .difference(&self.muted_personas)
            .copied()
            .collect()
    }
}
