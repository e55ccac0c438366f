//! Reference adapters shipped with the domain crate.
//!
//! Durable adapters (the JSON flat-file store) live in their own crates.

pub mod memory_store;
