//! API endpoint handlers.

pub mod health;
pub mod requirements;
pub mod survey;
