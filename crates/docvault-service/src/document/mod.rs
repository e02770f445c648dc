//! Document lifecycle service.

mod service;

pub use service::{DocumentService, UpdateDocumentRequest, UploadDocumentRequest};
