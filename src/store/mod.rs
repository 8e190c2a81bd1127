//! Store - camera and alert registries
//!
//! ## Responsibilities
//!
//! - Camera record inventory (single source of truth for camera status)
//! - Append-only alert log
//!
//! Persistent schema/querying lives behind this boundary; the registries are
//! process-local with concurrency-safe access and are rebuilt on restart.

mod alerts;
mod cameras;
mod types;

pub use alerts::AlertStore;
pub use cameras::CameraStore;
pub use types::*;
