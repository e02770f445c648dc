//! # docvault-admission
//!
//! The asynchronous upload admission pipeline: a concurrent queue of
//! pending uploads, a scan-status tracker for polling, and the background
//! scan worker that decides whether an upload ever becomes an event.

pub mod queue;
pub mod status;
pub mod worker;

pub use queue::{AdmissionQueue, PendingUpload};
pub use status::{ScanStatus, StatusTracker};
pub use worker::ScanWorker;
