//! Data Transfer Objects (DTOs) for the bar backend.
//!
//! - `http`: JSON request / response bodies
//! - `conversion`: DTO ⇄ domain conversion

pub mod conversion;
pub mod http;
