//! Core types and service wiring for the Ecoleta collection-point directory.

/// Parsing helpers for delimited item-id filter strings.
pub mod filter;
/// In-memory store implementation for tests and demos.
pub mod memory;
/// Domain models and identifiers shared by all adapters.
pub mod model;
/// Traits describing the persistence interface.
pub mod ports;
/// High-level service facade used by front-ends.
pub mod service;

pub use filter::*;
pub use memory::*;
pub use model::*;
pub use ports::*;
pub use service::*;
