//! Guardian Eye Camserver Library
//!
//! Camera fleet monitor: reachability probing, thumbnail capture, and
//! real-time alert fan-out over per-user WebSocket groups.
//!
//! ## Architecture (9 Components)
//!
//! 1. CameraStore / AlertStore - camera records and the append-only alert log
//! 2. UserDirectory - user existence lookups (account system boundary)
//! 3. ReachabilityProber - stream / bare-address probing with fallback
//! 4. ThumbnailCapturer - one-frame captures off the request path
//! 5. BlobStore - thumbnail image storage
//! 6. AlertGenerator - randomized background alert synthesis
//! 7. AlertBroadcaster - alert ownership resolution and publish
//! 8. AlertHub - per-user subscription groups (WebSocket fan-out)
//! 9. WebAPI - REST/WS endpoints

pub mod alert_generator;
pub mod alert_hub;
pub mod blob_store;
pub mod broadcast;
pub mod capture;
pub mod directory;
pub mod endpoint;
pub mod error;
pub mod models;
pub mod prober;
pub mod state;
pub mod store;
pub mod thumbnail;
pub mod web_api;

pub use error::{Error, Result};
pub use state::AppState;
