//! Terminal UI: command parsing, formatting and the interactive loop.

pub mod command;
pub mod formatter;
pub mod notice;
pub mod renderer;
pub mod runner;

pub use runner::run_client;
