//! Identifier remapping tables
//!
//! Campaign ids, sub-parameter values and whole parameter tuples get small
//! sequential integers the first time they are encoded. Ids are never
//! reassigned or evicted: codes already handed out must keep resolving.

use std::borrow::Borrow;
use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::params::{SequenceKey, TrackingParams};
use crate::errors::{Result, TracklinkError};
use super::strategy::CAMPAIGN_CAPACITY;

const FIRST_ID: u64 = 1;
/// Highest id or counter a snapshot may carry; ids stay representable as JSON i64.
pub const MAX_TABLE_ID: u64 = i64::MAX as u64;

fn first_id() -> u64 {
    FIRST_ID
}

/// Bidirectional key ↔ id map with a monotonically increasing counter.
#[derive(Debug, Clone)]
pub struct IdRegistry<K> {
    forward: HashMap<K, u64>,
    reverse: HashMap<u64, K>,
    next_id: u64,
}

impl<K> Default for IdRegistry<K> {
    fn default() -> Self {
        Self {
            forward: HashMap::new(),
            reverse: HashMap::new(),
            next_id: FIRST_ID,
        }
    }
}

impl<K: Eq + Hash + Clone> IdRegistry<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Existing id for `key`, or the next free one. The bool is true when a new id was assigned.
    pub fn get_or_assign<Q>(&mut self, key: &Q) -> (u64, bool)
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ToOwned<Owned = K> + ?Sized,
    {
        if let Some(&id) = self.forward.get(key) {
            return (id, false);
        }
        let id = self.next_id;
        // restore() caps counters at MAX_TABLE_ID, so this stays far from u64::MAX
        self.next_id += 1;
        let owned = key.to_owned();
        self.forward.insert(owned.clone(), id);
        self.reverse.insert(id, owned);
        (id, true)
    }

    pub fn id_of<Q>(&self, key: &Q) -> Option<u64>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.forward.get(key).copied()
    }

    pub fn resolve(&self, id: u64) -> Option<&K> {
        self.reverse.get(&id)
    }

    pub fn len(&self) -> usize {
        self.forward.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }

    pub fn next_id(&self) -> u64 {
        self.next_id
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, u64)> {
        self.forward.iter().map(|(k, &id)| (k, id))
    }

    /// Rebuild from `(key, id)` pairs. A counter at or below the highest id is raised past it.
    ///
    /// Fails when an id or the counter is above [`MAX_TABLE_ID`].
    fn rebuild<I>(entries: I, next_id: u64, table: &str) -> Result<Self>
    where
        I: IntoIterator<Item = (K, u64)>,
    {
        let mut registry = Self::default();
        let mut max_id = 0;
        for (key, id) in entries {
            max_id = max_id.max(id);
            registry.reverse.insert(id, key.clone());
            registry.forward.insert(key, id);
        }
        let floor = max_id
            .checked_add(1)
            .filter(|floor| *floor <= MAX_TABLE_ID)
            .ok_or_else(|| {
                TracklinkError::overflow(format!("{} contains id {} above the id limit", table, max_id))
            })?
            .max(FIRST_ID);
        if next_id > MAX_TABLE_ID {
            return Err(TracklinkError::overflow(format!(
                "{} counter {} is above the id limit {}",
                table, next_id, MAX_TABLE_ID
            )));
        }
        registry.next_id = if next_id < floor {
            if next_id != FIRST_ID || max_id != 0 {
                warn!(
                    "Snapshot counter for {} is stale ({} <= max id {}), raising to {}",
                    table, next_id, max_id, floor
                );
            }
            floor
        } else {
            next_id
        };
        Ok(registry)
    }
}

/// Plain snapshot of every id table and counter.
///
/// This is the exchange format between independently running encoder and
/// decoder processes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TablesSnapshot {
    #[serde(default)]
    pub seq_to_params: BTreeMap<u64, TrackingParams>,
    #[serde(default)]
    pub campaign_map: BTreeMap<String, u64>,
    #[serde(default)]
    pub sub_value_map: BTreeMap<u64, String>,
    #[serde(default = "first_id")]
    pub next_seq_id: u64,
    #[serde(default = "first_id")]
    pub next_campaign_id: u64,
    #[serde(default = "first_id")]
    pub next_sub_id: u64,
}

impl Default for TablesSnapshot {
    fn default() -> Self {
        Self {
            seq_to_params: BTreeMap::new(),
            campaign_map: BTreeMap::new(),
            sub_value_map: BTreeMap::new(),
            next_seq_id: FIRST_ID,
            next_campaign_id: FIRST_ID,
            next_sub_id: FIRST_ID,
        }
    }
}

/// The three id-assignment tables owned by one shortener.
#[derive(Debug, Clone, Default)]
pub struct RemapTables {
    campaigns: IdRegistry<String>,
    sub_values: IdRegistry<String>,
    sequences: IdRegistry<SequenceKey>,
    seq_params: HashMap<u64, TrackingParams>,
}

impl RemapTables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Campaign integer for `campaign_id`, assigning one on first sight.
    pub fn campaign_id_for(&mut self, campaign_id: &str) -> u64 {
        let (id, assigned) = self.campaigns.get_or_assign(campaign_id);
        if assigned {
            debug!("Assigned campaign integer {} to '{}'", id, campaign_id);
            if id >= CAMPAIGN_CAPACITY {
                warn!(
                    "Campaign integer {} exceeds the {} two-character codes; codes for '{}' will alias",
                    id, CAMPAIGN_CAPACITY, campaign_id
                );
            }
        }
        id
    }

    pub fn campaign_for(&self, id: u64) -> Option<&str> {
        self.campaigns.resolve(id).map(String::as_str)
    }

    /// Shared sub-value integer; identical values in different slots get one id.
    pub fn sub_id_for(&mut self, value: &str) -> u64 {
        let (id, assigned) = self.sub_values.get_or_assign(value);
        if assigned {
            debug!("Assigned sub-value integer {} to '{}'", id, value);
        }
        id
    }

    pub fn sub_value_for(&self, id: u64) -> Option<&str> {
        self.sub_values.resolve(id).map(String::as_str)
    }

    /// Sequence integer for the full 7-tuple, storing `params` on first sight.
    pub fn sequence_for(&mut self, params: &TrackingParams) -> u64 {
        let (id, assigned) = self.sequences.get_or_assign(&params.sequence_key());
        if assigned {
            debug!("Assigned sequence {} to '{}'", id, params.canonical_key());
            self.seq_params.insert(id, params.clone());
        }
        id
    }

    /// Sequence integer already assigned to this 7-tuple, if any.
    pub fn sequence_of(&self, params: &TrackingParams) -> Option<u64> {
        self.sequences.id_of(&params.sequence_key())
    }

    pub fn params_for_sequence(&self, id: u64) -> Option<&TrackingParams> {
        self.seq_params.get(&id)
    }

    pub fn campaign_count(&self) -> usize {
        self.campaigns.len()
    }

    pub fn sub_value_count(&self) -> usize {
        self.sub_values.len()
    }

    pub fn sequence_count(&self) -> usize {
        self.seq_params.len()
    }

    pub fn next_campaign_id(&self) -> u64 {
        self.campaigns.next_id()
    }

    pub fn next_sub_id(&self) -> u64 {
        self.sub_values.next_id()
    }

    pub fn next_seq_id(&self) -> u64 {
        self.sequences.next_id()
    }

    pub fn snapshot(&self) -> TablesSnapshot {
        TablesSnapshot {
            seq_to_params: self
                .seq_params
                .iter()
                .map(|(&id, params)| (id, params.clone()))
                .collect(),
            campaign_map: self
                .campaigns
                .iter()
                .map(|(cid, id)| (cid.clone(), id))
                .collect(),
            sub_value_map: self
                .sub_values
                .iter()
                .map(|(value, id)| (id, value.clone()))
                .collect(),
            next_seq_id: self.sequences.next_id(),
            next_campaign_id: self.campaigns.next_id(),
            next_sub_id: self.sub_values.next_id(),
        }
    }

    /// Replace every table with the snapshot's contents, rebuilding inverse maps.
    ///
    /// # Errors
    /// * an id or counter is above [`MAX_TABLE_ID`]
    pub fn restore(snapshot: TablesSnapshot) -> Result<Self> {
        let TablesSnapshot {
            seq_to_params,
            campaign_map,
            sub_value_map,
            next_seq_id,
            next_campaign_id,
            next_sub_id,
        } = snapshot;

        let sequences = IdRegistry::rebuild(
            seq_to_params
                .iter()
                .map(|(&id, params)| (params.sequence_key(), id)),
            next_seq_id,
            "seq_to_params",
        )?;

        Ok(Self {
            campaigns: IdRegistry::rebuild(campaign_map, next_campaign_id, "campaign_map")?,
            sub_values: IdRegistry::rebuild(
                sub_value_map.into_iter().map(|(id, value)| (value, id)),
                next_sub_id,
                "sub_value_map",
            )?,
            sequences,
            seq_params: seq_to_params.into_iter().collect(),
        })
    }
}
