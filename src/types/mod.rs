//! Shared type definitions
//!
//! Wire types exchanged with the enhancement server.

pub mod events;
pub mod model;

pub use events::DownloadEvent;
pub use model::{ModelDescriptor, StatusResponse, SystemInfo};
