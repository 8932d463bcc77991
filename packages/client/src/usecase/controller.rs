//! UseCase: visitor interaction
//!
//! `InteractionController` owns the [`ClientSession`] and is the only place it
//! changes. Two ways to drive it:
//!
//! - [`InteractionController::dispatch`] applies one event and hands back the
//!   intents, leaving any [`Intent::Call`] for the caller to run with
//!   [`perform`]. The terminal runner uses this so input typed while a request
//!   is pending still reaches the state machine.
//! - The operation methods (`begin_onboarding`, `send_chat_message`, ...) run
//!   calls to completion and return only the render / notice intents.

use std::{collections::VecDeque, sync::Arc};

use crate::domain::{
    AnonymousId, ApiCall, BarGateway, ClientSession, Event, IdentityError, IdentityStore, Intent, Notice,
    NoticeLevel, Persona, ValidationError, machine::transition,
};

pub struct InteractionController {
    session: ClientSession,
    /// BarGateway（バックエンド通信の抽象化）
    gateway: Arc<dyn BarGateway>,
    /// IdentityStore（匿名 ID 永続化の抽象化）
    identity: Arc<dyn IdentityStore>,
}

impl InteractionController {
    /// Load (or create) the anonymous identity and start outside the door.
    pub fn new(
        gateway: Arc<dyn BarGateway>,
        identity: Arc<dyn IdentityStore>,
    ) -> Result<Self, IdentityError> {
        let anonymous_id = identity.load_or_create()?;
        tracing::info!("Visiting as {}", anonymous_id.as_str());
        Ok(Self {
            session: ClientSession::new(anonymous_id),
            gateway,
            identity,
        })
    }

    pub fn session(&self) -> &ClientSession {
        &self.session
    }

    pub fn gateway(&self) -> Arc<dyn BarGateway> {
        Arc::clone(&self.gateway)
    }

    /// Apply one event. A local validation failure becomes a warning notice.
    pub fn dispatch(&mut self, event: Event) -> Vec<Intent> {
        match transition(&mut self.session, event) {
            Ok(intents) => intents,
            Err(e) => vec![rejected(e)],
        }
    }

    /// What typed text means right now: an answer for the bouncer while
    /// onboarding, a chat message otherwise.
    pub fn event_for_text(&self, text: &str) -> Event {
        if self.session.onboarding_in_progress() {
            Event::OnboardingReplySubmitted(text.to_string())
        } else {
            Event::ChatMessageSubmitted(text.to_string())
        }
    }

    /// Apply `event` and run every call it leads to, one at a time.
    pub async fn run(&mut self, event: Event) -> Vec<Intent> {
        let mut pending: VecDeque<Intent> = self.dispatch(event).into();
        let mut output = Vec::new();
        while let Some(intent) = pending.pop_front() {
            match intent {
                Intent::Call(call) => {
                    let completion = perform(self.gateway.as_ref(), call).await;
                    pending.extend(self.dispatch(completion));
                }
                other => output.push(other),
            }
        }
        output
    }

    pub async fn begin_onboarding(&mut self) -> Vec<Intent> {
        self.run(Event::KnockRequested).await
    }

    pub async fn submit_onboarding_reply(&mut self, text: &str) -> Vec<Intent> {
        self.run(Event::OnboardingReplySubmitted(text.to_string()))
            .await
    }

    pub async fn enter_chat(&mut self) -> Vec<Intent> {
        self.run(Event::EnterRequested).await
    }

    pub async fn send_chat_message(&mut self, text: &str) -> Vec<Intent> {
        self.run(Event::ChatMessageSubmitted(text.to_string())).await
    }

    pub fn select_persona(&mut self, persona: Persona) -> Vec<Intent> {
        self.dispatch(Event::PersonaClicked(persona))
    }

    pub fn deselect_persona(&mut self) -> Vec<Intent> {
        self.dispatch(Event::PersonaCleared)
    }

    /// Throw away the stored identity and start over as a stranger.
    ///
    /// The backend is not told that the old identity or session is abandoned.
    pub fn reset_client_identity(&mut self) -> Result<Vec<Intent>, IdentityError> {
        if self.session.is_processing() {
            return Ok(vec![rejected(ValidationError::AwaitingResponse)]);
        }
        // save overwrites; on failure the old identity stays current
        let anonymous_id = AnonymousId::generate();
        self.identity.save(&anonymous_id)?;
        tracing::info!("Identity reset; now visiting as {}", anonymous_id.as_str());
        Ok(self.dispatch(Event::IdentityReset(anonymous_id)))
    }
}

fn rejected(error: ValidationError) -> Intent {
    tracing::debug!("Rejected locally: {}", error);
    Intent::Notify(Notice::new(NoticeLevel::Warning, error.to_string()))
}

/// Run one gateway call and turn its outcome into the matching event.
pub async fn perform(gateway: &dyn BarGateway, call: ApiCall) -> Event {
    match call {
        ApiCall::Onboard(request) => match gateway.onboard(request).await {
            Ok(verdict) => Event::OnboardingAnswered(verdict),
            Err(e) => {
                tracing::warn!("Onboarding request failed: {}", e);
                Event::OnboardingFailed(e)
            }
        },
        ApiCall::StartSession(anonymous_id) => match gateway.start_session(anonymous_id).await {
            Ok(opened) => Event::SessionStarted(opened),
            Err(e) => {
                tracing::warn!("Failed to start session: {}", e);
                Event::SessionStartFailed(e)
            }
        },
        ApiCall::SendMessage(request) => match gateway.send_message(request).await {
            Ok(reply) => Event::ChatReplied(reply),
            Err(e) => {
                tracing::warn!("Failed to send message: {}", e);
                Event::ChatFailed(e)
            }
        },
    }
}
