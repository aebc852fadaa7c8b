//! Unified encoder/decoder
//!
//! [`TrackingShortener`] owns the remapping tables and the decode cache. It is
//! a plain single-owner value: `encode` needs `&mut self`, and callers sharing
//! one instance between threads wrap it in their own lock.

use std::time::Duration;

use moka::sync::Cache;
use serde::Serialize;
use tracing::{debug, trace, warn};

use super::params::TrackingParams;
use super::strategy::{
    CAMPAIGN_CAPACITY, COMPRESSED_TAG, HYBRID_TAG, SEQUENTIAL_TAG, SHORT_CODE_LIMIT, Strategy,
};
use super::tables::{RemapTables, TablesSnapshot};
use super::{compressed, hybrid, sequential};
use crate::errors::Result;

type DecodeFn = fn(&RemapTables, &str) -> Option<TrackingParams>;

/// Fallback order when a code's first character is not a known tag.
const DECODERS: [(char, DecodeFn); 3] = [
    (SEQUENTIAL_TAG, sequential::decode_body),
    (COMPRESSED_TAG, compressed::decode_body),
    (HYBRID_TAG, hybrid::decode_body),
];

/// Construction-time knobs for the decode cache.
///
/// The default is unbounded with no expiry; long-running services with many
/// distinct codes should set a capacity or TTL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShortenerOptions {
    pub cache_max_capacity: Option<u64>,
    pub cache_ttl: Option<Duration>,
}

/// Table sizes and counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShortenerStats {
    pub campaigns: usize,
    pub sub_values: usize,
    pub sequences: usize,
    pub cached_codes: u64,
    pub next_campaign_id: u64,
    pub next_sub_id: u64,
    pub next_seq_id: u64,
    pub campaign_capacity: u64,
}

pub struct TrackingShortener {
    tables: RemapTables,
    decode_cache: Cache<String, TrackingParams>,
    options: ShortenerOptions,
}

impl Default for TrackingShortener {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TrackingShortener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrackingShortener")
            .field("campaigns", &self.tables.campaign_count())
            .field("sub_values", &self.tables.sub_value_count())
            .field("sequences", &self.tables.sequence_count())
            .field("options", &self.options)
            .finish()
    }
}

impl TrackingShortener {
    pub fn new() -> Self {
        Self::with_options(ShortenerOptions::default())
    }

    pub fn with_options(options: ShortenerOptions) -> Self {
        Self {
            tables: RemapTables::new(),
            decode_cache: build_cache(&options),
            options,
        }
    }

    /// Shortener whose tables come from an exported snapshot.
    pub fn from_snapshot(snapshot: TablesSnapshot, options: ShortenerOptions) -> Result<Self> {
        Ok(Self {
            tables: RemapTables::restore(snapshot)?,
            decode_cache: build_cache(&options),
            options,
        })
    }

    pub fn tables(&self) -> &RemapTables {
        &self.tables
    }

    pub fn options(&self) -> &ShortenerOptions {
        &self.options
    }

    /// Encode with `strategy`, cap the length and remember the code for decoding.
    ///
    /// COMPRESSED codes are cut at 120 characters, everything else at 10.
    /// A cut code may no longer decode outside this process.
    pub fn encode(&mut self, params: &TrackingParams, strategy: Strategy) -> String {
        let mut code = match strategy {
            Strategy::Sequential => sequential::encode(&mut self.tables, params),
            Strategy::Compressed => compressed::encode(&mut self.tables, params),
            Strategy::Hybrid => hybrid::encode(&mut self.tables, params),
            Strategy::Smart => self.encode_smart(params),
        };

        let limit = strategy.length_limit();
        if code.len() > limit {
            warn!(
                "{} code for campaign '{}' is {} chars, truncating to {}",
                strategy,
                params.campaign_id,
                code.len(),
                limit
            );
            code.truncate(limit);
        }

        let carried = self.carried_params(&code, params);
        self.decode_cache.insert(code.clone(), carried);
        debug!(
            "Encoded campaign '{}' with {} as {}",
            params.campaign_id, strategy, code
        );
        code
    }

    /// SEQUENTIAL for known tuples, HYBRID when every id fits, else COMPRESSED cut to 10 chars.
    ///
    /// The COMPRESSED fallback is truncated mid-blob and is normally not
    /// decodable from the tables alone.
    pub fn encode_smart(&mut self, params: &TrackingParams) -> String {
        if let Some(code) = sequential::existing_code(&self.tables, params)
            && code.len() <= SHORT_CODE_LIMIT
        {
            return code;
        }
        if let Some(code) = hybrid::encode_exact(&mut self.tables, params) {
            return code;
        }

        let mut code = compressed::encode(&mut self.tables, params);
        if code.len() > SHORT_CODE_LIMIT {
            warn!(
                "Smart fallback truncates compressed code for campaign '{}' from {} to {} chars",
                params.campaign_id,
                code.len(),
                SHORT_CODE_LIMIT
            );
            code.truncate(SHORT_CODE_LIMIT);
        }
        code
    }

    /// Decode any code; `None` when it is malformed or references unknown ids.
    pub fn decode(&self, code: &str) -> Option<TrackingParams> {
        if let Some(hit) = self.decode_cache.get(code) {
            trace!("Decode cache hit for {}", code);
            return Some(hit);
        }

        let decoded = self.decode_uncached(code)?;
        self.decode_cache.insert(code.to_string(), decoded.clone());
        Some(decoded)
    }

    fn decode_uncached(&self, code: &str) -> Option<TrackingParams> {
        let mut chars = code.chars();
        let tag = chars.next()?;
        let body = chars.as_str();

        if let Some(strategy) = Strategy::from_tag(tag) {
            return decoder_for(strategy)
                .and_then(|decode| decode(&self.tables, body));
        }

        debug!("Unrecognised tag '{}' in {}, trying every decoder", tag, code);
        DECODERS
            .iter()
            .find_map(|(_, decode)| decode(&self.tables, body))
    }

    /// Drop every memoised decode. Id tables are untouched.
    pub fn clear_cache(&self) {
        self.decode_cache.invalidate_all();
        self.decode_cache.run_pending_tasks();
        debug!("Decode cache cleared");
    }

    pub fn stats(&self) -> ShortenerStats {
        self.decode_cache.run_pending_tasks();
        ShortenerStats {
            campaigns: self.tables.campaign_count(),
            sub_values: self.tables.sub_value_count(),
            sequences: self.tables.sequence_count(),
            cached_codes: self.decode_cache.entry_count(),
            next_campaign_id: self.tables.next_campaign_id(),
            next_sub_id: self.tables.next_sub_id(),
            next_seq_id: self.tables.next_seq_id(),
            campaign_capacity: CAMPAIGN_CAPACITY,
        }
    }

    pub fn export_tables(&self) -> TablesSnapshot {
        self.tables.snapshot()
    }

    /// Replace all id tables with the snapshot and clear the decode cache.
    ///
    /// A rejected snapshot leaves the current tables and cache untouched.
    pub fn import_tables(&mut self, snapshot: TablesSnapshot) -> Result<()> {
        self.tables = RemapTables::restore(snapshot)?;
        self.clear_cache();
        debug!(
            "Imported tables: {} campaigns, {} sub values, {} sequences",
            self.tables.campaign_count(),
            self.tables.sub_value_count(),
            self.tables.sequence_count()
        );
        Ok(())
    }

    pub fn export_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.export_tables())?)
    }

    pub fn import_json(&mut self, json: &str) -> Result<()> {
        let snapshot: TablesSnapshot = serde_json::from_str(json)?;
        self.import_tables(snapshot)
    }

    /// What a decoder can recover from `code`: HYBRID loses the click id,
    /// COMPRESSED re-splits its pipe payload, only SEQUENTIAL keeps `extra`.
    fn carried_params(&self, code: &str, params: &TrackingParams) -> TrackingParams {
        match code.chars().next() {
            Some(SEQUENTIAL_TAG) => self
                .tables
                .sequence_of(params)
                .and_then(|seq| self.tables.params_for_sequence(seq))
                .cloned()
                .unwrap_or_else(|| params.clone()),
            Some(HYBRID_TAG) => params.wire_view(false),
            _ => compressed::wire_view(params),
        }
    }
}

fn decoder_for(strategy: Strategy) -> Option<DecodeFn> {
    let tag = strategy.tag()?;
    DECODERS
        .iter()
        .find(|(t, _)| *t == tag)
        .map(|(_, decode)| *decode)
}

fn build_cache(options: &ShortenerOptions) -> Cache<String, TrackingParams> {
    let mut builder = Cache::builder();
    if let Some(capacity) = options.cache_max_capacity {
        builder = builder.max_capacity(capacity);
    }
    if let Some(ttl) = options.cache_ttl {
        builder = builder.time_to_live(ttl);
    }
    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_params() -> TrackingParams {
        TrackingParams::new("9061")
            .with_sub(1, "telegram_bot_start")
            .with_sub(2, "telegram")
            .with_sub(3, "callback_offer")
            .with_sub(4, "aaa_4441")
            .with_sub(5, "premium_offer")
            .with_click_id("clk-001")
    }

    #[test]
    fn test_unified_round_trips() {
        let mut shortener = TrackingShortener::new();
        let params = full_params();

        for strategy in [Strategy::Sequential, Strategy::Compressed] {
            let code = shortener.encode(&params, strategy);
            assert_eq!(shortener.decode(&code), Some(params.clone()), "{}", strategy);
        }

        let code = shortener.encode(&params, Strategy::Hybrid);
        let decoded = shortener.decode(&code).unwrap();
        assert_eq!(decoded.subs(), params.subs());
        assert_eq!(decoded.click_id, None);
    }

    #[test]
    fn test_hybrid_cache_matches_fresh_decode() {
        let mut shortener = TrackingShortener::new();
        let code = shortener.encode(&full_params(), Strategy::Hybrid);
        let cached = shortener.decode(&code);
        shortener.clear_cache();
        assert_eq!(shortener.decode(&code), cached);
    }

    #[test]
    fn test_compressed_cache_matches_fresh_decode_with_pipes() {
        let mut shortener = TrackingShortener::new();
        let params = TrackingParams::new("1")
            .with_sub(1, "x|2:evil")
            .with_click_id("a|b");
        let code = shortener.encode(&params, Strategy::Compressed);

        let cached = shortener.decode(&code);
        shortener.clear_cache();
        let fresh = shortener.decode(&code);
        assert_eq!(cached, fresh);

        let fresh = fresh.unwrap();
        assert_eq!(fresh.sub1.as_deref(), Some("x"));
        assert_eq!(fresh.sub2.as_deref(), Some("evil"));
    }

    #[test]
    fn test_sequential_distinguishes_absent_from_empty() {
        let mut shortener = TrackingShortener::new();
        let absent = TrackingParams::new("1");
        let empty = TrackingParams::new("1").with_sub(1, "");
        let a = shortener.encode(&absent, Strategy::Sequential);
        let b = shortener.encode(&empty, Strategy::Sequential);
        assert_ne!(a, b);

        shortener.clear_cache();
        assert_eq!(shortener.decode(&a), Some(absent));
        assert_eq!(shortener.decode(&b), Some(empty));
    }

    #[test]
    fn test_import_rejects_overflowing_snapshot() {
        let mut shortener = TrackingShortener::new();
        let params = TrackingParams::new("keep");
        let code = shortener.encode(&params, Strategy::Sequential);

        let result = shortener
            .import_json(r#"{"campaign_map":{"x":18446744073709551615},"next_campaign_id":1}"#);
        assert!(matches!(result, Err(crate::errors::TracklinkError::Overflow(_))));

        shortener.clear_cache();
        assert_eq!(shortener.decode(&code), Some(params));
    }

    #[test]
    fn test_smart_prefers_existing_sequence() {
        let mut shortener = TrackingShortener::new();
        let params = TrackingParams::new("1").with_sub(1, "a");
        let seq = shortener.encode(&params, Strategy::Sequential);
        assert_eq!(shortener.encode(&params, Strategy::Smart), seq);
    }

    #[test]
    fn test_smart_uses_hybrid_for_new_tuples() {
        let mut shortener = TrackingShortener::new();
        let code = shortener.encode(&TrackingParams::new("1").with_sub(1, "a"), Strategy::Smart);
        assert!(code.starts_with('h'));
        assert_eq!(code.len(), 10);
    }

    #[test]
    fn test_smart_falls_back_to_truncated_compressed() {
        let mut shortener = TrackingShortener::new();
        let mut snapshot = TablesSnapshot::default();
        snapshot.next_sub_id = 100;
        shortener.import_tables(snapshot).unwrap();

        let code = shortener.encode_smart(&TrackingParams::new("1").with_sub(1, "new"));
        assert!(code.starts_with('c'));
        assert!(code.len() <= SHORT_CODE_LIMIT);
    }

    #[test]
    fn test_unknown_tag_tries_every_decoder() {
        let mut shortener = TrackingShortener::new();
        let params = TrackingParams::new("1").with_sub(1, "x");
        let code = shortener.encode(&params, Strategy::Sequential);
        shortener.clear_cache();

        // 标签字符损坏时仍按正文尝试
        let mangled = format!("S{}", &code[1..]);
        assert_eq!(shortener.decode(&mangled), Some(params));

        assert_eq!(shortener.decode("Zqqqq"), None);
        assert_eq!(shortener.decode(""), None);
    }

    #[test]
    fn test_known_tag_does_not_fall_through() {
        let mut shortener = TrackingShortener::new();
        shortener.encode(&TrackingParams::new("1"), Strategy::Sequential);
        shortener.clear_cache();
        // "h1" 不是合法的 hybrid 码，也不应该被当成 sequential
        assert_eq!(shortener.decode("h1"), None);
    }

    #[test]
    fn test_stats_counts_tables() {
        let mut shortener = TrackingShortener::new();
        shortener.encode(&TrackingParams::new("a").with_sub(1, "x"), Strategy::Hybrid);
        shortener.encode(&TrackingParams::new("b"), Strategy::Sequential);

        let stats = shortener.stats();
        assert_eq!(stats.campaigns, 1);
        assert_eq!(stats.sub_values, 1);
        assert_eq!(stats.sequences, 1);
        assert_eq!(stats.next_campaign_id, 2);
        assert_eq!(stats.campaign_capacity, 3844);
    }

    #[test]
    fn test_json_snapshot_round_trip() {
        let mut encoder = TrackingShortener::new();
        let code = encoder.encode(&full_params(), Strategy::Compressed);
        let json = encoder.export_json().unwrap();

        let mut decoder = TrackingShortener::new();
        decoder.import_json(&json).unwrap();
        assert_eq!(decoder.decode(&code), Some(full_params()));

        assert!(decoder.import_json("not json").is_err());
    }

    #[test]
    fn test_bounded_cache_options() {
        let options = ShortenerOptions {
            cache_max_capacity: Some(10),
            cache_ttl: Some(Duration::from_secs(60)),
        };
        let mut shortener = TrackingShortener::with_options(options.clone());
        assert_eq!(shortener.options(), &options);

        let params = TrackingParams::new("1");
        let code = shortener.encode(&params, Strategy::Sequential);
        assert_eq!(shortener.decode(&code), Some(params));
    }
}
