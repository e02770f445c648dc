//! Domain events.
//!
//! Each event is an immutable fact about exactly one aggregate. Events are
//! appended to the event log and never mutated or removed afterwards; the
//! single exception is the right-to-erasure path of the deletion saga,
//! which is documented on `EventLog::remove_aggregate`.

pub mod document;

pub use document::{DocumentEvent, DocumentEventKind};
