//! # CDX Recommendation Engine (cdx-rec)
//!
//! Turns a free-text or voice-transcribed content request into a ranked list
//! of catalog items, assigns each session to one of two competing ranking
//! strategies, and records every impression/click in an append-only event
//! store with funnel aggregation.
//!
//! **Pipeline:** voice normalization → query interpretation → experiment
//! assignment → strategy ranking → result assembly → impression logging.
//!
//! The HTTP transport and dashboard are external collaborators; they consume
//! [`engine::RecEngine`] and the shared types in `cdx-common`.

pub mod assign;
pub mod config;
pub mod engine;
pub mod error;
pub mod query;
pub mod rank;
pub mod store;
pub mod voice;

pub use config::RecConfig;
pub use engine::{DebugSnapshot, RecEngine};
pub use error::{Error, Result};
