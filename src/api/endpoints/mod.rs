//! API endpoint handlers.

pub mod analyze;
pub mod credential;
pub mod health;
pub mod page;
pub mod session;
