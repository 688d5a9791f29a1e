//! Persistence layer: entity definitions, the store abstraction, and the
//! in-process backend.

pub mod memory;
pub mod models;
pub mod store;
