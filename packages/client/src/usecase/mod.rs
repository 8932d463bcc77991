//! UseCase 層: the interaction controller and the gateway call runner.

pub mod controller;

pub use controller::{InteractionController, perform};
