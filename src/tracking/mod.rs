//! Tracking-link short codes
//!
//! - `params`: the parameter record
//! - `tables`: campaign / sub-value / sequence id tables and their snapshot
//! - `sequential`, `compressed`, `hybrid`: the three wire strategies
//! - `shortener`: SMART selection, unified encode/decode and the decode cache
//! - `api`: string/map functions for collaborators
//! - `legacy`: whole-URL shorten/expand

pub mod api;
pub mod compressed;
pub mod hybrid;
pub mod legacy;
pub mod params;
pub mod sequential;
pub mod shortener;
pub mod strategy;
pub mod tables;

pub use api::{
    code_from_short_url, create_tracking_link, decode_tracking_url, encode_tracking_url,
    extract_tracking_params,
};
pub use legacy::{expand_url, shorten_url};
pub use params::TrackingParams;
pub use shortener::{ShortenerOptions, ShortenerStats, TrackingShortener};
pub use strategy::{CAMPAIGN_CAPACITY, CAMPAIGN_CODE_WIDTH, Strategy};
pub use tables::{RemapTables, TablesSnapshot};
