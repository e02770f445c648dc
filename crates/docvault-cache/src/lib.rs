//! # docvault-cache
//!
//! Invalidate-on-write projection cache. The in-memory implementation
//! fronts the event log's fold results; any write to the log removes
//! every recorded key.

pub mod keys;
pub mod memory;

pub use memory::MemoryProjectionCache;
