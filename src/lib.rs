//! tracklink - compact tracking-link codes
//!
//! Encodes a campaign id, up to five sub-parameters and a click id into a
//! short URL path segment and decodes it back.
//!
//! # Features
//! - **cli**: the `tracklink` command-line binary (default)
//!
//! # Architecture
//! - `codec`: base62 primitive
//! - `tracking`: parameter record, id tables, strategies, unified shortener
//! - `config`: static configuration (TOML + `TL__*` env)
//! - `system`: logging setup
//! - `cli`: command-line definitions and execution

pub mod cli;
pub mod codec;
pub mod config;
pub mod errors;
pub mod system;
pub mod tracking;

pub use errors::{Result, TracklinkError};
pub use tracking::{Strategy, TrackingParams, TrackingShortener};
