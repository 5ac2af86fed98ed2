//! Core data model and engines for stream network processing
//!
//! This module holds the node data model, the node extractor, the proximity
//! indexes, and the association engine. Topology classifiers live in
//! [`crate::classifiers`] and operate on the [`NodeStore`] defined here.

mod association;
mod config;
mod error;
mod extractor;
mod index;
pub mod logging;
mod store;
mod types;

pub use association::*;
pub use config::*;
pub use error::*;
pub use extractor::*;
pub use index::*;
pub use logging::*;
pub use store::*;
pub use types::*;
