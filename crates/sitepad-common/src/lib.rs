//! Shared plumbing for the sitepad crates.
//!
//! Holds the pieces every other crate leans on: the error types, the
//! configuration file, the string-keyed slot storage that stands in for the
//! browser's `localStorage`, and the HTTP client seam used by the publisher.

pub mod config;
pub mod error;
pub mod http;
pub mod storage;
#[cfg(feature = "telemetry")]
pub mod telemetry;

pub use crate::config::Config;
pub use crate::error::{SerDeError, SitepadError, StorageError};
pub use crate::http::{HttpClient, HttpError, SitepadHttpClient};
pub use crate::storage::{FileSlotStore, MemorySlotStore, SlotStore};
