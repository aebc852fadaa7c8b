//! Encoding strategies and wire-format constants

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumIter, EnumMessage, IntoEnumIterator};

/// Width of the campaign field in COMPRESSED and HYBRID codes.
pub const CAMPAIGN_CODE_WIDTH: usize = 2;
/// Distinct campaigns addressable before two-character campaign codes alias (62²).
pub const CAMPAIGN_CAPACITY: u64 = 3844;
/// Width of each sub-parameter digit in HYBRID codes.
pub const SUB_CODE_WIDTH: usize = 1;
/// Sub-value ids at or above this alias in HYBRID codes.
pub const SUB_CAPACITY: u64 = 62;
/// Width of the click-id hash in HYBRID codes.
pub const CLICK_HASH_WIDTH: usize = 2;
/// Total HYBRID code length.
pub const HYBRID_CODE_LEN: usize = 1 + CAMPAIGN_CODE_WIDTH + 5 * SUB_CODE_WIDTH + CLICK_HASH_WIDTH;

/// Length cap applied by the unified encoder to every strategy but COMPRESSED.
pub const SHORT_CODE_LIMIT: usize = 10;
/// Length cap applied by the unified encoder to COMPRESSED codes.
pub const COMPRESSED_CODE_LIMIT: usize = 120;

pub const SEQUENTIAL_TAG: char = 's';
pub const COMPRESSED_TAG: char = 'c';
pub const HYBRID_TAG: char = 'h';

/// 编码策略
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    EnumIter,
    AsRefStr,
    EnumMessage,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Strategy {
    #[strum(message = "Shortest code for repeated identical tuples")]
    Sequential,
    #[strum(message = "Deflate + base64url blob, fully reversible")]
    Compressed,
    #[strum(message = "Fixed 10 characters, click id is hashed")]
    Hybrid,
    #[default]
    #[strum(message = "Pick sequential, hybrid or compressed automatically")]
    Smart,
}

impl Strategy {
    /// Leading tag character of codes produced by this strategy. SMART has none.
    pub fn tag(self) -> Option<char> {
        match self {
            Self::Sequential => Some(SEQUENTIAL_TAG),
            Self::Compressed => Some(COMPRESSED_TAG),
            Self::Hybrid => Some(HYBRID_TAG),
            Self::Smart => None,
        }
    }

    /// Strategy that produced a code starting with `tag`.
    pub fn from_tag(tag: char) -> Option<Self> {
        Self::iter().find(|s| s.tag() == Some(tag))
    }

    /// Length ceiling enforced by the unified encoder.
    pub fn length_limit(self) -> usize {
        match self {
            Self::Compressed => COMPRESSED_CODE_LIMIT,
            _ => SHORT_CODE_LIMIT,
        }
    }

    /// Default strategy for the functional interface, by count of present optional fields.
    ///
    /// ≤2 → SEQUENTIAL, ≤4 → COMPRESSED, otherwise HYBRID.
    pub fn auto_select(optional_fields: usize) -> Self {
        match optional_fields {
            0..=2 => Self::Sequential,
            3..=4 => Self::Compressed,
            _ => Self::Hybrid,
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl std::str::FromStr for Strategy {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sequential" | "s" => Ok(Self::Sequential),
            "compressed" | "c" => Ok(Self::Compressed),
            "hybrid" | "h" => Ok(Self::Hybrid),
            "smart" => Ok(Self::Smart),
            _ => Err(format!(
                "Invalid strategy: '{}'. Valid: sequential, compressed, hybrid, smart",
                s
            )),
        }
    }
}
