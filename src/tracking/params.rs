//! Tracking parameter record

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Number of positional sub-parameter slots (`sub1`..`sub5`).
pub const SUB_SLOTS: usize = 5;

/// Structured identity of a 7-tuple: campaign, subs, click id.
pub type SequenceKey = (String, [Option<String>; SUB_SLOTS], Option<String>);

/// A campaign id, up to five positional sub-parameters and a click id.
///
/// `None` and `Some("")` are different values: absent fields are omitted from
/// every serialisation, empty ones are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackingParams {
    pub campaign_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub2: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub3: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub4: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub5: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub click_id: Option<String>,
    /// Only carried by the legacy whole-URL path; the short-code encoders ignore it.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, String>,
}

impl TrackingParams {
    pub fn new<S: Into<String>>(campaign_id: S) -> Self {
        Self {
            campaign_id: campaign_id.into(),
            ..Self::default()
        }
    }

    /// Set sub-parameter `index` (1-based). Indexes outside `1..=5` are ignored.
    pub fn with_sub<S: Into<String>>(mut self, index: usize, value: S) -> Self {
        self.set_sub(index, Some(value.into()));
        self
    }

    pub fn with_click_id<S: Into<String>>(mut self, click_id: S) -> Self {
        self.click_id = Some(click_id.into());
        self
    }

    pub fn with_extra<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Sub-parameter `index` (1-based).
    pub fn sub(&self, index: usize) -> Option<&str> {
        self.slot(index).and_then(|s| s.as_deref())
    }

    pub fn set_sub(&mut self, index: usize, value: Option<String>) {
        if let Some(slot) = self.slot_mut(index) {
            *slot = value;
        }
    }

    /// All five sub slots in order.
    pub fn subs(&self) -> [Option<&str>; SUB_SLOTS] {
        [
            self.sub1.as_deref(),
            self.sub2.as_deref(),
            self.sub3.as_deref(),
            self.sub4.as_deref(),
            self.sub5.as_deref(),
        ]
    }

    /// How many of sub1..sub5 and click_id are present.
    pub fn optional_field_count(&self) -> usize {
        self.subs().iter().filter(|s| s.is_some()).count() + usize::from(self.click_id.is_some())
    }

    /// Owned 7-tuple used to deduplicate SEQUENTIAL sequences. `extra` is not part of it.
    pub fn sequence_key(&self) -> SequenceKey {
        (
            self.campaign_id.clone(),
            [
                self.sub1.clone(),
                self.sub2.clone(),
                self.sub3.clone(),
                self.sub4.clone(),
                self.sub5.clone(),
            ],
            self.click_id.clone(),
        )
    }

    /// Pipe-joined 7-tuple, empty string for absent fields.
    ///
    /// Readable but ambiguous (`None` vs `""`, values containing `|`); only for logs.
    pub fn canonical_key(&self) -> String {
        let subs = self.subs();
        let mut parts: Vec<&str> = Vec::with_capacity(SUB_SLOTS + 2);
        parts.push(&self.campaign_id);
        parts.extend(subs.iter().map(|s| s.unwrap_or("")));
        parts.push(self.click_id.as_deref().unwrap_or(""));
        parts.join("|")
    }

    /// Copy without `extra` and, if `keep_click_id` is false, without the click id.
    pub(crate) fn wire_view(&self, keep_click_id: bool) -> Self {
        Self {
            campaign_id: self.campaign_id.clone(),
            sub1: self.sub1.clone(),
            sub2: self.sub2.clone(),
            sub3: self.sub3.clone(),
            sub4: self.sub4.clone(),
            sub5: self.sub5.clone(),
            click_id: if keep_click_id {
                self.click_id.clone()
            } else {
                None
            },
            extra: BTreeMap::new(),
        }
    }

    /// Flat string map of every present field, `extra` entries included.
    pub fn to_map(&self) -> BTreeMap<String, String> {
        let mut map = self.extra.clone();
        map.insert("campaign_id".to_string(), self.campaign_id.clone());
        for (i, sub) in self.subs().iter().enumerate() {
            if let Some(value) = sub {
                map.insert(format!("sub{}", i + 1), (*value).to_string());
            }
        }
        if let Some(click_id) = &self.click_id {
            map.insert("click_id".to_string(), click_id.clone());
        }
        map
    }

    fn slot(&self, index: usize) -> Option<&Option<String>> {
        match index {
            1 => Some(&self.sub1),
            2 => Some(&self.sub2),
            3 => Some(&self.sub3),
            4 => Some(&self.sub4),
            5 => Some(&self.sub5),
            _ => None,
        }
    }

    fn slot_mut(&mut self, index: usize) -> Option<&mut Option<String>> {
        match index {
            1 => Some(&mut self.sub1),
            2 => Some(&mut self.sub2),
            3 => Some(&mut self.sub3),
            4 => Some(&mut self.sub4),
            5 => Some(&mut self.sub5),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_and_accessors() {
        let params = TrackingParams::new("42")
            .with_sub(1, "telegram")
            .with_sub(3, "")
            .with_sub(9, "ignored")
            .with_click_id("abc");

        assert_eq!(params.sub(1), Some("telegram"));
        assert_eq!(params.sub(2), None);
        assert_eq!(params.sub(3), Some(""));
        assert_eq!(params.sub(9), None);
        assert_eq!(params.optional_field_count(), 3);
    }

    #[test]
    fn test_canonical_key_distinguishes_positions() {
        let a = TrackingParams::new("1").with_sub(1, "x");
        let b = TrackingParams::new("1").with_sub(2, "x");
        assert_eq!(a.canonical_key(), "1|x|||||");
        assert_ne!(a.canonical_key(), b.canonical_key());
    }

    #[test]
    fn test_sequence_key_keeps_absent_and_empty_apart() {
        let absent = TrackingParams::new("1");
        let empty = TrackingParams::new("1").with_sub(1, "");
        assert_eq!(absent.canonical_key(), empty.canonical_key());
        assert_ne!(absent.sequence_key(), empty.sequence_key());

        let left = TrackingParams::new("a|b").with_sub(1, "c");
        let right = TrackingParams::new("a").with_sub(1, "b|c");
        assert_eq!(left.canonical_key(), right.canonical_key());
        assert_ne!(left.sequence_key(), right.sequence_key());
    }

    #[test]
    fn test_serde_omits_absent_fields() {
        let params = TrackingParams::new("7").with_sub(2, "b");
        let json = serde_json::to_string(&params).unwrap();
        assert_eq!(json, r#"{"campaign_id":"7","sub2":"b"}"#);

        let back: TrackingParams = serde_json::from_str(&json).unwrap();
        assert_eq!(back, params);
    }

    #[test]
    fn test_to_map_includes_extra() {
        let params = TrackingParams::new("7")
            .with_sub(5, "e")
            .with_click_id("c")
            .with_extra("utm_source", "news");
        let map = params.to_map();
        assert_eq!(map.get("campaign_id").map(String::as_str), Some("7"));
        assert_eq!(map.get("sub5").map(String::as_str), Some("e"));
        assert_eq!(map.get("click_id").map(String::as_str), Some("c"));
        assert_eq!(map.get("utm_source").map(String::as_str), Some("news"));
        assert_eq!(map.len(), 4);
    }

    #[test]
    fn test_wire_view_drops_extra_and_optionally_click() {
        let params = TrackingParams::new("7")
            .with_click_id("c")
            .with_extra("k", "v");
        let lossy = params.wire_view(false);
        assert!(lossy.click_id.is_none());
        assert!(lossy.extra.is_empty());
        assert_eq!(params.wire_view(true).click_id.as_deref(), Some("c"));
    }
}
