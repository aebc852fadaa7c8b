//! SEQUENTIAL strategy (tag `s`)
//!
//! `s` + base62(sequence). The table stores the complete parameter record, so
//! decoding is a direct lookup and every field (including `extra`) survives.

use super::params::TrackingParams;
use super::strategy::SEQUENTIAL_TAG;
use super::tables::RemapTables;
use crate::codec::{decode_base62, encode_base62};

pub fn encode(tables: &mut RemapTables, params: &TrackingParams) -> String {
    let seq = tables.sequence_for(params);
    code_for(seq)
}

/// Code of a tuple that already has a sequence, without assigning one.
pub fn existing_code(tables: &RemapTables, params: &TrackingParams) -> Option<String> {
    tables.sequence_of(params).map(code_for)
}

pub fn decode(tables: &RemapTables, code: &str) -> Option<TrackingParams> {
    decode_body(tables, code.strip_prefix(SEQUENTIAL_TAG)?)
}

/// Decode the part after the tag character.
pub(crate) fn decode_body(tables: &RemapTables, body: &str) -> Option<TrackingParams> {
    let seq = decode_base62(body).ok()?;
    tables.params_for_sequence(seq).cloned()
}

fn code_for(seq: u64) -> String {
    let mut code = String::with_capacity(12);
    code.push(SEQUENTIAL_TAG);
    code.push_str(&encode_base62(seq));
    code
}
