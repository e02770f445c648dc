//! User directory and saga-gated deletion.

mod service;

pub use service::{User, UserService};
