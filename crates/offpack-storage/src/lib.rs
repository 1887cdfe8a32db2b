//! Storage layer for offpack
//!
//! This crate provides:
//! - Key-value slot backends (file and in-memory)
//! - A coalescing background persister
//! - The state store owning the application state

pub mod error;
pub mod kv;
pub mod persist;
pub mod store;

pub use error::{Result, StorageError};
pub use kv::{FileStore, KeyValueStore, MemoryStore, default_data_dir};
pub use persist::Persister;
pub use store::{DEFAULT_STATE_KEY, StateStore};
