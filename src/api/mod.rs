//! HTTP surface for the demo page.
//!
//! Serves the single page at `/` and a small JSON API under `/api/` that
//! drives the `SessionOrchestrator`:
//! - `GET /api/health`
//! - `GET /api/session` (snapshot the page polls)
//! - `POST /api/analyze` (the trigger)
//! - `PUT` / `DELETE /api/credential` (analytics token)

pub mod endpoints;
pub mod error;
pub mod router;
pub mod server;
pub mod types;

pub use router::app_router;
pub use server::{start_server, AppServer, ServerError};
pub use types::ApiContext;
