//! COMPRESSED strategy (tag `c`)
//!
//! Layout: `c` + 2-char campaign + base64url(zlib("1:v|2:v|...|k:click")) with
//! the `=` padding stripped. Campaign and every sub value survive, as does the
//! click id.

use std::iter;

use base64::Engine;
use base64::engine::general_purpose::{URL_SAFE, URL_SAFE_NO_PAD};
use miniz_oxide::deflate::compress_to_vec_zlib;
use miniz_oxide::inflate::decompress_to_vec_zlib_with_limit;
use tracing::debug;

use super::params::{SUB_SLOTS, TrackingParams};
use super::strategy::{CAMPAIGN_CODE_WIDTH, COMPRESSED_TAG};
use super::tables::RemapTables;
use crate::codec::{decode_base62, encode_base62_fixed};

/// zlib level 9
const COMPRESSION_LEVEL: u8 = 9;
/// Upper bound for inflated payloads; real payloads are a few hundred bytes.
const MAX_PAYLOAD_BYTES: usize = 64 * 1024;
const CLICK_KEY: &str = "k";

pub fn encode(tables: &mut RemapTables, params: &TrackingParams) -> String {
    let campaign = tables.campaign_id_for(&params.campaign_id);
    let payload = serialize_fields(params);
    let blob = URL_SAFE_NO_PAD.encode(compress_to_vec_zlib(payload.as_bytes(), COMPRESSION_LEVEL));

    let mut code = String::with_capacity(1 + CAMPAIGN_CODE_WIDTH + blob.len());
    code.push(COMPRESSED_TAG);
    code.push_str(&encode_base62_fixed(campaign, CAMPAIGN_CODE_WIDTH));
    code.push_str(&blob);
    code
}

pub fn decode(tables: &RemapTables, code: &str) -> Option<TrackingParams> {
    decode_body(tables, code.strip_prefix(COMPRESSED_TAG)?)
}

/// Decode the part after the tag character.
pub(crate) fn decode_body(tables: &RemapTables, body: &str) -> Option<TrackingParams> {
    if body.len() <= CAMPAIGN_CODE_WIDTH {
        return None;
    }
    let (campaign_part, blob) = body.split_at_checked(CAMPAIGN_CODE_WIDTH)?;
    let campaign = decode_base62(campaign_part).ok()?;
    let mut params = TrackingParams::new(tables.campaign_for(campaign)?);

    match inflate_blob(blob) {
        Some(payload) => {
            parse_fields(&payload, &mut params);
        }
        None => {
            // 解压失败时按未压缩的原始串解析
            debug!("Blob of compressed code did not inflate, parsing it as raw fields");
            if parse_fields(blob, &mut params) == 0 {
                return None;
            }
        }
    }
    Some(params)
}

/// The record a fresh decode of this tuple's code yields: fields re-split on `|`, no `extra`.
pub(crate) fn wire_view(params: &TrackingParams) -> TrackingParams {
    let mut carried = TrackingParams::new(params.campaign_id.clone());
    parse_fields(&serialize_fields(params), &mut carried);
    carried
}

/// `"{index}:{value}"` per present sub, `"k:{click}"`, joined by `|`.
pub fn serialize_fields(params: &TrackingParams) -> String {
    let mut segments: Vec<String> = params
        .subs()
        .iter()
        .enumerate()
        .filter_map(|(i, sub)| sub.map(|value| format!("{}:{}", i + 1, value)))
        .collect();
    if let Some(click_id) = &params.click_id {
        segments.push(format!("{}:{}", CLICK_KEY, click_id));
    }
    segments.join("|")
}

/// Fill subs and click id from a pipe string; returns how many fields were recognised.
///
/// Segments without `:` or with unknown keys are skipped.
pub fn parse_fields(payload: &str, params: &mut TrackingParams) -> usize {
    let mut found = 0;
    for segment in payload.split('|') {
        let Some((key, value)) = segment.split_once(':') else {
            continue;
        };
        if key == CLICK_KEY {
            params.click_id = Some(value.to_string());
            found += 1;
            continue;
        }
        if let Ok(index @ 1..=SUB_SLOTS) = key.parse::<usize>() {
            params.set_sub(index, Some(value.to_string()));
            found += 1;
        }
    }
    found
}

fn inflate_blob(blob: &str) -> Option<String> {
    let padding = (4 - blob.len() % 4) % 4;
    let padded: String = blob.chars().chain(iter::repeat_n('=', padding)).collect();
    let compressed = URL_SAFE.decode(padded).ok()?;
    let raw = decompress_to_vec_zlib_with_limit(&compressed, MAX_PAYLOAD_BYTES).ok()?;
    String::from_utf8(raw).ok()
}
