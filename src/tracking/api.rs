//! Functional interface for collaborators
//!
//! Thin wrappers over [`TrackingShortener`] that speak in plain strings and
//! maps. The shortener is always passed in explicitly.

use std::collections::BTreeMap;

use super::params::TrackingParams;
use super::shortener::TrackingShortener;
use super::strategy::Strategy;

/// Path segment that precedes the code in tracking links.
pub const SHORT_PATH_SEGMENT: &str = "/s/";

/// Encode `params`; with no explicit strategy one is picked from the number of present fields.
pub fn encode_tracking_url(
    shortener: &mut TrackingShortener,
    params: &TrackingParams,
    strategy: Option<Strategy>,
) -> String {
    let strategy =
        strategy.unwrap_or_else(|| Strategy::auto_select(params.optional_field_count()));
    shortener.encode(params, strategy)
}

/// Decoded fields as a flat map; empty when the code does not decode.
pub fn decode_tracking_url(shortener: &TrackingShortener, short_code: &str) -> BTreeMap<String, String> {
    shortener
        .decode(short_code)
        .map(|params| params.to_map())
        .unwrap_or_default()
}

/// `"{base_url}/s/{code}"`.
pub fn create_tracking_link(
    shortener: &mut TrackingShortener,
    base_url: &str,
    params: &TrackingParams,
    strategy: Option<Strategy>,
) -> String {
    let code = encode_tracking_url(shortener, params, strategy);
    format!(
        "{}{}{}",
        base_url.trim_end_matches('/'),
        SHORT_PATH_SEGMENT,
        code
    )
}

/// Inverse of [`create_tracking_link`]; empty map if the URL carries no decodable code.
pub fn extract_tracking_params(
    shortener: &TrackingShortener,
    short_url: &str,
) -> BTreeMap<String, String> {
    code_from_short_url(short_url)
        .map(|code| decode_tracking_url(shortener, code))
        .unwrap_or_default()
}

/// The code after the last `/s/`, stopping at `?`, `#` or `/`.
pub fn code_from_short_url(short_url: &str) -> Option<&str> {
    let (_, tail) = short_url.rsplit_once(SHORT_PATH_SEGMENT)?;
    let code = tail.split(['?', '#', '/']).next()?;
    (!code.is_empty()).then_some(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_from_short_url() {
        assert_eq!(code_from_short_url("https://t.me/s/abc"), Some("abc"));
        assert_eq!(code_from_short_url("https://t.me/s/abc?x=1"), Some("abc"));
        assert_eq!(code_from_short_url("https://t.me/s/abc#frag"), Some("abc"));
        assert_eq!(code_from_short_url("https://t.me/s/"), None);
        assert_eq!(code_from_short_url("https://t.me/abc"), None);
    }

    #[test]
    fn test_auto_strategy_by_field_count() {
        let mut shortener = TrackingShortener::new();

        let two = TrackingParams::new("1").with_sub(1, "a").with_click_id("c");
        assert!(encode_tracking_url(&mut shortener, &two, None).starts_with('s'));

        let four = TrackingParams::new("1")
            .with_sub(1, "a")
            .with_sub(2, "b")
            .with_sub(3, "c")
            .with_sub(4, "d");
        assert!(encode_tracking_url(&mut shortener, &four, None).starts_with('c'));

        let five = four.clone().with_sub(5, "e");
        let code = encode_tracking_url(&mut shortener, &five, None);
        assert!(code.starts_with('h'));
        assert_eq!(code.len(), 10);
    }

    #[test]
    fn test_link_round_trip() {
        let mut shortener = TrackingShortener::new();
        let params = TrackingParams::new("9061").with_sub(1, "bot").with_click_id("k");

        let link = create_tracking_link(&mut shortener, "https://go.example.com/", &params, None);
        assert!(link.starts_with("https://go.example.com/s/s"));

        let fields = extract_tracking_params(&shortener, &link);
        assert_eq!(fields.get("campaign_id").map(String::as_str), Some("9061"));
        assert_eq!(fields.get("sub1").map(String::as_str), Some("bot"));
        assert_eq!(fields.get("click_id").map(String::as_str), Some("k"));
    }

    #[test]
    fn test_failures_give_empty_maps() {
        let shortener = TrackingShortener::new();
        assert!(decode_tracking_url(&shortener, "s1").is_empty());
        assert!(decode_tracking_url(&shortener, "").is_empty());
        assert!(extract_tracking_params(&shortener, "https://x.io/nothing").is_empty());
    }
}
