//! S3-compatible object storage access.
//!
//! The bucket is reached through the `object_store` crate, so tests can swap in
//! `object_store::memory::InMemory` while production talks to Tigris with
//! virtual-hosted-style addressing.

mod client;
mod error;

pub use client::ObjectStorage;
pub use error::{StorageError, StorageResult};
