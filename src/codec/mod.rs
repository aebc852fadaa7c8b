//! Shared encoding primitives

pub mod base62;

pub use base62::{
    BASE62_ALPHABET, decode_base62, encode_base62, encode_base62_fixed, encode_base62_signed,
};
