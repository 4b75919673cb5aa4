//! Storage abstraction and implementations for Waypoint.
//!
//! This crate provides a trait-based read interface over project snapshots
//! with a JSON file reference implementation.

#![warn(missing_docs)]

pub mod trait_;
pub mod json_storage;

pub use trait_::{Storage, StorageError, Result};
pub use json_storage::JsonStorage;
