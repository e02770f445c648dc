//! # docvault-saga
//!
//! The cross-service deletion saga: a two-phase prepare/commit protocol
//! between the user service and the document service, carried over two
//! named asynchronous queues. The user record is never deleted unless the
//! document side confirmed erasure within the bounded wait.

pub mod channel;
pub mod coordinator;
pub mod handler;
pub mod message;

pub use channel::MessageChannel;
pub use coordinator::SagaCoordinator;
pub use handler::DocumentEraseHandler;
pub use message::{DOCUMENT_TO_USER_QUEUE, SagaMessage, USER_TO_DOCUMENT_QUEUE};
