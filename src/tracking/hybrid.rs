//! HYBRID strategy (tag `h`)
//!
//! Fixed 10-character layout:
//!
//! ```text
//! h CC S S S S S KK
//! │ │  └─ 5 × 1-char sub-value ids ('0' = absent)
//! │ └─ 2-char campaign integer
//! └─ tag                         KK = 16-bit click-id hash
//! ```
//!
//! The click-id hash is not stored anywhere, so click ids never come back out
//! of a HYBRID code. Traffic that needs them should use SEQUENTIAL or COMPRESSED.

use tracing::warn;
use xxhash_rust::xxh64::xxh64;

use super::params::TrackingParams;
use super::strategy::{
    CAMPAIGN_CAPACITY, CAMPAIGN_CODE_WIDTH, CLICK_HASH_WIDTH, HYBRID_CODE_LEN, HYBRID_TAG,
    SUB_CAPACITY, SUB_CODE_WIDTH,
};
use super::tables::RemapTables;
use crate::codec::{decode_base62, encode_base62_fixed};

const CLICK_HASH_SEED: u64 = 0;
const ABSENT_DIGIT: u64 = 0;

/// Encode, wrapping campaign and sub ids that do not fit their fields.
pub fn encode(tables: &mut RemapTables, params: &TrackingParams) -> String {
    let (code, fits) = build(tables, params);
    if !fits {
        warn!(
            "Hybrid code {} for campaign '{}' wraps an id past its field width",
            code, params.campaign_id
        );
    }
    code
}

/// Encode only if every id fits its field without wrapping.
///
/// Ids are still assigned in the tables when this returns `None`.
pub fn encode_exact(tables: &mut RemapTables, params: &TrackingParams) -> Option<String> {
    let (code, fits) = build(tables, params);
    fits.then_some(code)
}

fn build(tables: &mut RemapTables, params: &TrackingParams) -> (String, bool) {
    let campaign = tables.campaign_id_for(&params.campaign_id);
    let mut fits = campaign < CAMPAIGN_CAPACITY;

    let mut code = String::with_capacity(HYBRID_CODE_LEN);
    code.push(HYBRID_TAG);
    code.push_str(&encode_base62_fixed(campaign, CAMPAIGN_CODE_WIDTH));

    for sub in params.subs() {
        let digit = match sub {
            Some(value) => {
                let id = tables.sub_id_for(value);
                fits &= id < SUB_CAPACITY;
                id
            }
            None => ABSENT_DIGIT,
        };
        code.push_str(&encode_base62_fixed(digit, SUB_CODE_WIDTH));
    }

    let click_hash = params.click_id.as_deref().map_or(0, click_hash);
    code.push_str(&encode_base62_fixed(click_hash, CLICK_HASH_WIDTH));
    (code, fits)
}

/// 16-bit hash of a click id.
pub fn click_hash(click_id: &str) -> u64 {
    xxh64(click_id.as_bytes(), CLICK_HASH_SEED) & 0xFFFF
}

/// Length is checked on the body, so anything but exactly 10 characters is absent.
pub fn decode(tables: &RemapTables, code: &str) -> Option<TrackingParams> {
    decode_body(tables, code.strip_prefix(HYBRID_TAG)?)
}

/// Decode the part after the tag character. The click id is always left unset.
pub(crate) fn decode_body(tables: &RemapTables, body: &str) -> Option<TrackingParams> {
    if body.len() != HYBRID_CODE_LEN - 1 || !body.is_ascii() {
        return None;
    }

    let (campaign_part, rest) = body.split_at(CAMPAIGN_CODE_WIDTH);
    let (subs_part, click_part) = rest.split_at(5 * SUB_CODE_WIDTH);

    let campaign = decode_base62(campaign_part).ok()?;
    let mut params = TrackingParams::new(tables.campaign_for(campaign)?);

    for (i, chunk) in subs_part.as_bytes().chunks(SUB_CODE_WIDTH).enumerate() {
        let digit = std::str::from_utf8(chunk).ok()?;
        let id = decode_base62(digit).ok()?;
        if id == ABSENT_DIGIT {
            continue;
        }
        params.set_sub(i + 1, tables.sub_value_for(id).map(str::to_string));
    }

    // 只校验字符合法，哈希不可逆
    decode_base62(click_part).ok()?;
    Some(params)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_and_length() {
        let mut tables = RemapTables::new();
        let params = TrackingParams::new("9061")
            .with_sub(1, "telegram")
            .with_sub(3, "offer");
        let code = encode(&mut tables, &params);

        assert_eq!(code.len(), 10);
        assert!(code.starts_with("h01"));
        // sub1 → 1, sub2 absent, sub3 → 2, sub4/5 absent, no click → 00
        assert_eq!(&code[3..], "1020000");
    }

    #[test]
    fn test_round_trip_drops_click_id() {
        let mut tables = RemapTables::new();
        let params = TrackingParams::new("7")
            .with_sub(1, "a")
            .with_sub(2, "b")
            .with_sub(3, "c")
            .with_sub(4, "d")
            .with_sub(5, "a")
            .with_click_id("click");
        let code = encode(&mut tables, &params);
        let decoded = decode(&tables, &code).unwrap();

        assert_eq!(decoded.campaign_id, "7");
        assert_eq!(decoded.subs(), params.subs());
        assert_eq!(decoded.click_id, None);
    }

    #[test]
    fn test_click_hash_changes_code() {
        let mut tables = RemapTables::new();
        let a = encode(&mut tables, &TrackingParams::new("1").with_click_id("one"));
        let b = encode(&mut tables, &TrackingParams::new("1").with_click_id("two"));
        assert_eq!(a[..8], b[..8]);
        assert_eq!(click_hash("one"), click_hash("one"));
        assert!(click_hash("one") <= 0xFFFF);
    }

    #[test]
    fn test_strict_length_and_tag() {
        let mut tables = RemapTables::new();
        let code = encode(&mut tables, &TrackingParams::new("1").with_sub(1, "x"));

        assert_eq!(decode(&tables, &code[..9]), None);
        assert_eq!(decode(&tables, &format!("{}0", code)), None);
        assert_eq!(decode(&tables, &format!("s{}", &code[1..])), None);
        assert_eq!(decode(&tables, "h01100-000"), None);
    }

    #[test]
    fn test_unknown_ids() {
        let mut tables = RemapTables::new();
        tables.campaign_id_for("known");

        assert_eq!(decode(&tables, "h020000000"), None);
        // sub id 5 was never assigned → that sub stays absent
        let decoded = decode(&tables, "h015000000").unwrap();
        assert_eq!(decoded.campaign_id, "known");
        assert_eq!(decoded.sub1, None);
    }

    #[test]
    fn test_encode_exact_rejects_wrapped_sub_ids() {
        let mut tables = RemapTables::new();
        for i in 0..SUB_CAPACITY {
            tables.sub_id_for(&format!("v{}", i));
        }
        let params = TrackingParams::new("1").with_sub(1, "fresh");
        assert_eq!(encode_exact(&mut tables, &params), None);
        assert_eq!(encode(&mut tables, &params).len(), HYBRID_CODE_LEN);

        let small = TrackingParams::new("1").with_sub(1, "v0");
        assert!(encode_exact(&mut tables, &small).is_some());
    }
}
