//! # docvault-eventstore
//!
//! The append-only document event log and the pure projection engine that
//! folds event sequences into materialized [`document::Document`] state.

pub mod document;
pub mod log;
pub mod projection;

pub use document::Document;
pub use log::EventLog;
