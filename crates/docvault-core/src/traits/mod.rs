//! Trait seams between the core pipeline and its collaborators.

pub mod cache;
pub mod scanner;
pub mod storage;

pub use cache::ProjectionCache;
pub use scanner::{ScanVerdict, VirusScanner};
pub use storage::BlobStorage;
