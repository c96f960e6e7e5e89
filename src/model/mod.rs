//! Data models for PGLabel.

mod blob;
mod store;

pub use blob::{Blob, BlobId};
pub use store::BlobStore;
