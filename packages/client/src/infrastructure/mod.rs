//! Infrastructure layer: HTTP access to the bar backend and local identity storage.

pub mod dto;
pub mod gateway;
pub mod identity;
