//! Shared value types: typed identifiers and pagination.

pub mod id;
pub mod pagination;

pub use id::{DocumentId, EventId, SagaId, UserId};
pub use pagination::{PageRequest, PageResponse};
