//! Terminal client for Le Pale Blue Dot.
//!
//! A visitor knocks, convinces the bouncer, steps inside and talks to the
//! personas at the bar. All conversation logic runs on the backend; this
//! crate tracks where the visitor is and what the screen should show.

pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod ui;
pub mod usecase;
