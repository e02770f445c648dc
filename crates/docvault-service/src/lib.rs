//! # docvault-service
//!
//! The application service layer: document lifecycle operations over the
//! event log with read-through caching and queued admission, and the
//! user directory whose deletions are gated by the cross-service saga.

pub mod context;
pub mod document;
pub mod user;

pub use context::RequestContext;
pub use document::DocumentService;
pub use user::UserService;
