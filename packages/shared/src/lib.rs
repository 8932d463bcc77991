//! Utilities shared by the Le Pale Blue Dot packages.

pub mod logger;
pub mod time;
