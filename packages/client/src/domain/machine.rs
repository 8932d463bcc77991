//! Interaction state machine.
//!
//! [`transition`] is pure: it takes the current [`ClientSession`] and one
//! [`Event`] (user input or a network completion), updates the session and
//! returns the [`Intent`]s the caller must carry out. Network work is
//! described by [`Intent::Call`]; everything else is for the renderer.
//!
//! Local validation failures come back as `Err` and leave the session untouched.

use super::{
    error::{GatewayError, ValidationError},
    gateway::{
        ApiCall, ChatReply, ChatRequest, OnboardingRequest, OnboardingVerdict, SessionOpened,
        SessionStatus,
    },
    persona::Persona,
    state::{ClientSession, EntryStep, LAST_CALL_AT, MESSAGE_LIMIT, OnboardingTurn, Phase},
    value_object::{AnonymousId, MessageText},
};

/// Content of the synthetic message sent right after walking in.
pub const ENTRY_MESSAGE: &str = "*enters the bar*";

pub const REJECTION_NOTICE: &str = "The bouncer isn't letting you in tonight.";
pub const APPROVED_NOTICE: &str = "The door swings open. Type /enter to step inside.";
pub const LAST_CALL_NOTICE: &str = "Last call! Five messages remaining.";
pub const SESSION_ENDED_NOTICE: &str = "Session ended. Start a new session to continue.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    // user input
    KnockRequested,
    OnboardingReplySubmitted(String),
    EnterRequested,
    ChatMessageSubmitted(String),
    PersonaClicked(Persona),
    PersonaCleared,
    /// The identity store already holds the new identity.
    IdentityReset(AnonymousId),

    // network completions
    OnboardingAnswered(OnboardingVerdict),
    OnboardingFailed(GatewayError),
    SessionStarted(SessionOpened),
    SessionStartFailed(GatewayError),
    ChatReplied(ChatReply),
    ChatFailed(GatewayError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Speaker {
    Visitor,
    Bouncer,
    /// A persona (or an unknown speaker) named by the backend.
    Agent(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bubble {
    pub speaker: Speaker,
    pub text: String,
    /// Backend timestamp (RFC 3339) when one was reported.
    pub timestamp: Option<String>,
}

impl Bubble {
    pub fn visitor(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::Visitor,
            text: text.into(),
            timestamp: None,
        }
    }

    pub fn bouncer(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::Bouncer,
            text: text.into(),
            timestamp: None,
        }
    }

    pub fn agent(agent: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::Agent(agent.into()),
            text: text.into(),
            timestamp: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scene {
    Exterior,
    Interior,
}

/// Snapshot of the persona bar after a change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonaBar {
    pub available: Vec<Persona>,
    pub muted: Vec<Persona>,
    pub selected: Option<Persona>,
}

impl PersonaBar {
    pub fn of(session: &ClientSession) -> Self {
        Self {
            available: session.available_personas.iter().copied().collect(),
            muted: session.muted_personas.iter().copied().collect(),
            selected: session.selected_persona,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Render {
    Bubble(Bubble),
    ReplySurface { visible: bool },
    Scene(Scene),
    Weather(String),
    ClearConversation,
    Input { enabled: bool },
    Personas(PersonaBar),
    Counter { count: u32, limit: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// Transient status line shown to the visitor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

impl Notice {
    pub fn new(level: NoticeLevel, text: impl Into<String>) -> Self {
        Self {
            level,
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Call(ApiCall),
    Render(Render),
    Notify(Notice),
}

fn render(r: Render) -> Intent {
    Intent::Render(r)
}

fn notify(level: NoticeLevel, text: impl Into<String>) -> Intent {
    Intent::Notify(Notice::new(level, text))
}

/// Apply `event` to `session`.
pub fn transition(
    session: &mut ClientSession,
    event: Event,
) -> Result<Vec<Intent>, ValidationError> {
    let from = session.phase.describe();
    let intents = match event {
        Event::KnockRequested => begin_onboarding(session)?,
        Event::OnboardingReplySubmitted(text) => submit_onboarding_reply(session, &text)?,
        Event::OnboardingAnswered(verdict) => onboarding_answered(session, verdict),
        Event::OnboardingFailed(error) => onboarding_failed(session, error),
        Event::EnterRequested => enter_chat(session)?,
        Event::SessionStarted(opened) => session_started(session, opened),
        Event::SessionStartFailed(error) => session_start_failed(session, error),
        Event::ChatMessageSubmitted(text) => send_chat_message(session, &text)?,
        Event::ChatReplied(reply) => chat_replied(session, reply),
        Event::ChatFailed(error) => chat_failed(session, error),
        Event::PersonaClicked(persona) => select_persona(session, persona),
        Event::PersonaCleared => deselect_persona(session),
        Event::IdentityReset(id) => reset_identity(session, id)?,
    };
    let to = session.phase.describe();
    if from != to {
        tracing::debug!("Phase changed: {} -> {}", from, to);
    }
    Ok(intents)
}

fn begin_onboarding(session: &mut ClientSession) -> Result<Vec<Intent>, ValidationError> {
    match session.phase {
        Phase::NotStarted => {}
        Phase::Onboarding { .. } => {
            return Err(ValidationError::WrongPhase {
                action: "knock again",
                phase: "already talking to the bouncer",
            });
        }
        _ => {
            return Err(ValidationError::WrongPhase {
                action: "knock",
                phase: session.phase.describe(),
            });
        }
    }

    session.phase = Phase::Onboarding {
        turn: OnboardingTurn::Opening,
    };
    Ok(vec![
        render(Render::Input { enabled: false }),
        Intent::Call(ApiCall::Onboard(OnboardingRequest {
            anonymous_id: session.anonymous_id.clone(),
            message: None,
            context: None,
        })),
    ])
}

fn submit_onboarding_reply(
    session: &mut ClientSession,
    raw: &str,
) -> Result<Vec<Intent>, ValidationError> {
    match session.phase {
        Phase::Onboarding {
            turn: OnboardingTurn::AwaitingReply,
        } => {}
        Phase::Onboarding { .. } => return Err(ValidationError::AwaitingResponse),
        _ => {
            return Err(ValidationError::WrongPhase {
                action: "answer the bouncer",
                phase: session.phase.describe(),
            });
        }
    }
    let text = MessageText::new(raw)?.into_string();

    session.onboarding_responses.push(text.clone());
    session.phase = Phase::Onboarding {
        turn: OnboardingTurn::Judging,
    };
    Ok(vec![
        render(Render::Bubble(Bubble::visitor(text.clone()))),
        render(Render::Input { enabled: false }),
        Intent::Call(ApiCall::Onboard(OnboardingRequest {
            anonymous_id: session.anonymous_id.clone(),
            message: Some(text),
            context: Some(session.onboarding_responses.clone()),
        })),
    ])
}

fn onboarding_answered(session: &mut ClientSession, verdict: OnboardingVerdict) -> Vec<Intent> {
    if !matches!(
        session.phase,
        Phase::Onboarding {
            turn: OnboardingTurn::Opening | OnboardingTurn::Judging
        }
    ) {
        tracing::warn!(
            "Ignoring onboarding answer received while {}",
            session.phase.describe()
        );
        return Vec::new();
    }

    let mut intents = vec![render(Render::Bubble(Bubble::bouncer(verdict.message)))];
    if verdict.approved {
        tracing::info!("Onboarding approved");
        session.phase = Phase::ApprovedOutside;
        intents.push(render(Render::ReplySurface { visible: false }));
        intents.push(notify(NoticeLevel::Success, APPROVED_NOTICE));
    } else if verdict.continue_onboarding {
        session.phase = Phase::Onboarding {
            turn: OnboardingTurn::AwaitingReply,
        };
        intents.push(render(Render::ReplySurface { visible: true }));
        intents.push(render(Render::Input { enabled: true }));
    } else {
        tracing::info!("Onboarding rejected");
        session.phase = Phase::Rejected;
        intents.push(render(Render::ReplySurface { visible: false }));
        intents.push(render(Render::Input { enabled: false }));
        intents.push(notify(NoticeLevel::Error, REJECTION_NOTICE));
    }
    intents
}

fn onboarding_failed(session: &mut ClientSession, error: GatewayError) -> Vec<Intent> {
    match session.phase {
        Phase::Onboarding {
            turn: OnboardingTurn::Opening,
        } => {
            session.phase = Phase::NotStarted;
        }
        Phase::Onboarding {
            turn: OnboardingTurn::Judging,
        } => {
            // the reply never reached the bouncer
            session.onboarding_responses.pop();
            session.phase = Phase::Onboarding {
                turn: OnboardingTurn::AwaitingReply,
            };
        }
        _ => {
            tracing::warn!(
                "Ignoring onboarding failure received while {}: {}",
                session.phase.describe(),
                error
            );
            return Vec::new();
        }
    }

    let mut intents = Vec::new();
    if session.onboarding_in_progress() {
        intents.push(render(Render::ReplySurface { visible: true }));
        intents.push(render(Render::Input { enabled: true }));
    }
    intents.push(notify(NoticeLevel::Error, error.to_string()));
    intents
}

fn enter_chat(session: &mut ClientSession) -> Result<Vec<Intent>, ValidationError> {
    match session.phase {
        Phase::ApprovedOutside => {}
        Phase::Entering { .. } => return Err(ValidationError::AwaitingResponse),
        _ => {
            return Err(ValidationError::WrongPhase {
                action: "enter",
                phase: session.phase.describe(),
            });
        }
    }

    session.phase = Phase::Entering {
        step: EntryStep::StartingSession,
    };
    Ok(vec![
        render(Render::ReplySurface { visible: false }),
        render(Render::ClearConversation),
        render(Render::Scene(Scene::Interior)),
        render(Render::Input { enabled: false }),
        notify(NoticeLevel::Info, "Connecting..."),
        Intent::Call(ApiCall::StartSession(session.anonymous_id.clone())),
    ])
}

fn session_started(session: &mut ClientSession, opened: SessionOpened) -> Vec<Intent> {
    if session.phase
        != (Phase::Entering {
            step: EntryStep::StartingSession,
        })
    {
        tracing::warn!(
            "Ignoring session start received while {}",
            session.phase.describe()
        );
        return Vec::new();
    }

    let session_id = opened.session_id;
    tracing::info!("Chat session {} started", session_id.as_str());
    session.phase = Phase::Entering {
        step: EntryStep::Greeting {
            session_id: session_id.clone(),
        },
    };
    session.message_count = 0;
    session.message_limit = MESSAGE_LIMIT;
    session.muted_personas.clear();
    if !opened.available.is_empty() {
        session.available_personas = opened.available.into_iter().collect();
    }

    let mut intents = Vec::new();
    if let Some(weather) = opened.weather.filter(|w| !w.trim().is_empty()) {
        intents.push(render(Render::Weather(weather)));
    }
    intents.push(render(Render::Personas(PersonaBar::of(session))));
    intents.push(notify(NoticeLevel::Success, "Connected"));
    intents.push(Intent::Call(ApiCall::SendMessage(ChatRequest {
        session_id,
        content: ENTRY_MESSAGE.to_string(),
        selected: session.selected_persona,
        onboarding_context: Some(session.onboarding_responses.clone()),
    })));
    intents
}

fn session_start_failed(session: &mut ClientSession, error: GatewayError) -> Vec<Intent> {
    if session.phase
        != (Phase::Entering {
            step: EntryStep::StartingSession,
        })
    {
        tracing::warn!(
            "Ignoring session start failure received while {}: {}",
            session.phase.describe(),
            error
        );
        return Vec::new();
    }

    session.phase = Phase::ApprovedOutside;
    vec![
        render(Render::Scene(Scene::Exterior)),
        render(Render::Input { enabled: false }),
        notify(NoticeLevel::Error, error.to_string()),
    ]
}

fn send_chat_message(
    session: &mut ClientSession,
    raw: &str,
) -> Result<Vec<Intent>, ValidationError> {
    let text = MessageText::new(raw)?.into_string();
    let session_id = match &session.phase {
        Phase::ChatActive {
            session_id,
            awaiting: false,
        } => session_id.clone(),
        Phase::ChatActive { awaiting: true, .. }
        | Phase::Entering {
            step: EntryStep::Greeting { .. },
        } => return Err(ValidationError::AwaitingResponse),
        Phase::ChatEnded { .. } => return Err(ValidationError::SessionEnded),
        _ => return Err(ValidationError::MissingSession),
    };

    session.phase = Phase::ChatActive {
        session_id: session_id.clone(),
        awaiting: true,
    };
    Ok(vec![
        render(Render::Input { enabled: false }),
        // shown before the server confirms and never taken back
        render(Render::Bubble(Bubble::visitor(text.clone()))),
        Intent::Call(ApiCall::SendMessage(ChatRequest {
            session_id,
            content: text,
            selected: session.selected_persona,
            onboarding_context: None,
        })),
    ])
}

fn chat_replied(session: &mut ClientSession, reply: ChatReply) -> Vec<Intent> {
    let session_id = match &session.phase {
        Phase::ChatActive {
            session_id,
            awaiting: true,
        }
        | Phase::Entering {
            step: EntryStep::Greeting { session_id },
        } => session_id.clone(),
        _ => {
            tracing::warn!(
                "Ignoring chat reply received while {}",
                session.phase.describe()
            );
            return Vec::new();
        }
    };

    let mut bubble = Bubble::agent(reply.agent, reply.message);
    bubble.timestamp = reply.timestamp;
    let mut intents = vec![render(Render::Bubble(bubble))];

    if !reply.available.is_empty() {
        session.available_personas = reply.available.into_iter().collect();
    }
    session.muted_personas = reply.muted.into_iter().collect();
    if let Some(selected) = session.selected_persona
        && !session.selectable_personas().contains(&selected)
    {
        tracing::debug!("Clearing selection of muted persona {}", selected);
        session.selected_persona = None;
    }
    intents.push(render(Render::Personas(PersonaBar::of(session))));

    if reply.message_count < session.message_count {
        tracing::warn!(
            "Backend reported message count {} below {}; keeping {}",
            reply.message_count,
            session.message_count,
            session.message_count
        );
    } else {
        session.message_count = reply.message_count;
    }
    if let Some(limit) = reply.message_limit {
        session.message_limit = limit;
    }
    intents.push(render(Render::Counter {
        count: session.message_count,
        limit: session.message_limit,
    }));

    if session.message_count >= MESSAGE_LIMIT || reply.status == SessionStatus::Ended {
        tracing::info!(
            "Chat session {} ended at {} messages",
            session_id.as_str(),
            session.message_count
        );
        session.phase = Phase::ChatEnded { session_id };
        intents.push(render(Render::Input { enabled: false }));
        intents.push(notify(NoticeLevel::Warning, SESSION_ENDED_NOTICE));
    } else {
        session.phase = Phase::ChatActive {
            session_id,
            awaiting: false,
        };
        intents.push(render(Render::Input { enabled: true }));
    }

    if reply.message_count == LAST_CALL_AT {
        intents.push(notify(NoticeLevel::Warning, LAST_CALL_NOTICE));
    }
    intents
}

fn chat_failed(session: &mut ClientSession, error: GatewayError) -> Vec<Intent> {
    match &session.phase {
        Phase::ChatActive {
            session_id,
            awaiting: true,
        } => {
            session.phase = Phase::ChatActive {
                session_id: session_id.clone(),
                awaiting: false,
            };
            vec![
                render(Render::Input { enabled: true }),
                notify(NoticeLevel::Error, format!("Error: {}", error)),
            ]
        }
        Phase::Entering {
            step: EntryStep::Greeting { session_id },
        } => {
            // inside with a session but without a greeting
            session.phase = Phase::ChatActive {
                session_id: session_id.clone(),
                awaiting: false,
            };
            vec![
                render(Render::Input { enabled: true }),
                notify(
                    NoticeLevel::Error,
                    format!("Nobody greeted you at the bar: {}", error),
                ),
            ]
        }
        _ => {
            tracing::warn!(
                "Ignoring chat failure received while {}: {}",
                session.phase.describe(),
                error
            );
            Vec::new()
        }
    }
}

fn select_persona(session: &mut ClientSession, persona: Persona) -> Vec<Intent> {
    if !session.selectable_personas().contains(&persona) {
        tracing::debug!("{} is not at the bar or is muted; selection ignored", persona);
        return Vec::new();
    }

    if session.selected_persona == Some(persona) {
        session.selected_persona = None;
        return vec![render(Render::Personas(PersonaBar::of(session)))];
    }

    session.selected_persona = Some(persona);
    vec![
        render(Render::Personas(PersonaBar::of(session))),
        notify(NoticeLevel::Info, format!("Selected: {}", persona.tag())),
    ]
}

fn deselect_persona(session: &mut ClientSession) -> Vec<Intent> {
    if session.selected_persona.take().is_none() {
        return Vec::new();
    }
    vec![render(Render::Personas(PersonaBar::of(session)))]
}

fn reset_identity(
    session: &mut ClientSession,
    id: AnonymousId,
) -> Result<Vec<Intent>, ValidationError> {
    if session.is_processing() {
        return Err(ValidationError::AwaitingResponse);
    }

    *session = ClientSession::new(id);
    Ok(vec![
        render(Render::ClearConversation),
        render(Render::ReplySurface { visible: false }),
        render(Render::Scene(Scene::Exterior)),
        render(Render::Input { enabled: false }),
        render(Render::Personas(PersonaBar::of(session))),
        notify(NoticeLevel::Info, "Identity reset. You're a stranger here again."),
    ])
}
