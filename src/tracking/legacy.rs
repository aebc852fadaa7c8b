//! Whole-URL compatibility layer
//!
//! Older callers hand over a complete landing URL with tracking values in the
//! query string and expect a complete short URL back. Query keys other than the
//! tracking fields travel in [`TrackingParams::extra`], which only the
//! SEQUENTIAL strategy preserves.

use url::Url;

use super::api::{SHORT_PATH_SEGMENT, code_from_short_url};
use super::params::{SUB_SLOTS, TrackingParams};
use super::shortener::TrackingShortener;
use super::strategy::Strategy;
use crate::errors::{Result, TracklinkError};

/// Redirect path rebuilt by [`expand_url`].
pub const CLICK_PATH: &str = "/v1/click";
/// URLs with at most this many query parameters get SEQUENTIAL codes.
pub const SEQUENTIAL_MAX_PARAMS: usize = 3;

/// `https://host/landing?campaign_id=..&sub1=..` → `https://host/s/<code>`.
///
/// # Errors
/// * the URL does not parse or has no host
/// * the query has no `campaign_id` (or `cid`)
pub fn shorten_url(shortener: &mut TrackingShortener, long_url: &str) -> Result<String> {
    let url = Url::parse(long_url)?;
    let origin = origin_of(&url)?;
    let params = params_from_query(&url)?;

    let total = url.query_pairs().count();
    let strategy = if total <= SEQUENTIAL_MAX_PARAMS {
        Strategy::Sequential
    } else {
        Strategy::Compressed
    };

    let code = shortener.encode(&params, strategy);
    Ok(format!("{}{}{}", origin, SHORT_PATH_SEGMENT, code))
}

/// `https://host/s/<code>` → `https://host/v1/click?campaign_id=..`.
///
/// Returns `Ok(None)` when the code does not decode.
pub fn expand_url(shortener: &TrackingShortener, short_url: &str) -> Result<Option<String>> {
    let url = Url::parse(short_url)?;
    let origin = origin_of(&url)?;
    let code = code_from_short_url(url.path()).ok_or_else(|| {
        TracklinkError::validation(format!("no short code in '{}'", short_url))
    })?;

    let Some(params) = shortener.decode(code) else {
        return Ok(None);
    };

    let mut target = Url::parse(&origin)?;
    target.set_path(CLICK_PATH);
    {
        let mut query = target.query_pairs_mut();
        query.append_pair("campaign_id", &params.campaign_id);
        for (i, sub) in params.subs().iter().enumerate() {
            if let Some(value) = sub {
                query.append_pair(&format!("sub{}", i + 1), value);
            }
        }
        if let Some(click_id) = &params.click_id {
            query.append_pair("click_id", click_id);
        }
        for (key, value) in &params.extra {
            query.append_pair(key, value);
        }
    }
    Ok(Some(target.into()))
}

fn origin_of(url: &Url) -> Result<String> {
    if url.host_str().is_none() {
        return Err(TracklinkError::validation(format!(
            "URL '{}' has no host",
            url
        )));
    }
    Ok(url.origin().ascii_serialization())
}

fn params_from_query(url: &Url) -> Result<TrackingParams> {
    let mut campaign_id = None;
    let mut params = TrackingParams::default();

    for (key, value) in url.query_pairs() {
        match &*key {
            "campaign_id" | "cid" => campaign_id = Some(value.into_owned()),
            "click_id" => params.click_id = Some(value.into_owned()),
            other => match sub_index(other) {
                Some(index) => params.set_sub(index, Some(value.into_owned())),
                None => {
                    params.extra.insert(other.to_string(), value.into_owned());
                }
            },
        }
    }

    params.campaign_id = campaign_id.ok_or_else(|| {
        TracklinkError::validation(format!("URL '{}' has no campaign_id parameter", url))
    })?;
    Ok(params)
}

fn sub_index(key: &str) -> Option<usize> {
    key.strip_prefix("sub")
        .and_then(|n| n.parse::<usize>().ok())
        .filter(|i| (1..=SUB_SLOTS).contains(i))
}
