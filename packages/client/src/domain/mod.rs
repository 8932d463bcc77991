//! Domain layer: the visitor's session and the rules that move it along.
//!
//! Nothing here performs I/O. The gateway and identity store are traits
//! implemented by the infrastructure layer.

pub mod error;
pub mod gateway;
pub mod identity;
pub mod machine;
pub mod persona;
pub mod state;
pub mod value_object;

pub use error::{GatewayError, IdentityError, ValidationError};
pub use gateway::{
    ApiCall, BarGateway, ChatReply, ChatRequest, OnboardingRequest, OnboardingVerdict,
    SessionOpened, SessionStatus,
};
pub use identity::IdentityStore;
pub use machine::{Bubble, Event, Intent, Notice, NoticeLevel, PersonaBar, Render, Scene, Speaker};
pub use persona::Persona;
pub use state::{ClientSession, EntryStep, OnboardingTurn, Phase};
pub use value_object::{
    AnonymousId, CHAR_DANGER_ABOVE, CHAR_WARNING_ABOVE, MAX_MESSAGE_CHARS, MessageText, SessionId,
};
