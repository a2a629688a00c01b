//! Per-stream continuity state
//!
//! The registry maps each [`StreamKey`] to the counters accumulated for it.
//! Entries are created lazily on the first qualifying frame and are never
//! removed during a run. The registry has a single owner (the
//! [`ContinuityEngine`](crate::engine::ContinuityEngine)); readers work from
//! [`Snapshot`](crate::report::Snapshot)s instead of borrowing it.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use crate::continuity::classify;
use crate::types::{Classification, StreamKey};

/// Accumulated continuity state for one stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamState {
    /// Dotted rendering of the stream key
    pub label: String,
    /// Rolling counter of the most recent qualifying frame
    pub last_rolling: Option<u8>,
    /// Transitions that advanced by exactly one
    pub ok: u64,
    /// Transitions that skipped ahead
    pub missing: u64,
    /// Transitions that repeated the counter
    pub duplicate: u64,
    /// Transitions that went backwards
    pub late: u64,
    /// Sum of skipped counter values over all `missing` transitions
    pub lost_units: u64,
}

impl StreamState {
    /// Fresh state for a newly observed stream
    pub fn new(key: StreamKey) -> Self {
        Self {
            label: key.label(),
            last_rolling: None,
            ok: 0,
            missing: 0,
            duplicate: 0,
            late: 0,
            lost_units: 0,
        }
    }

    /// Classifies `rolling` against the last seen value, bumps the matching
    /// counter and remembers `rolling`.
    pub fn observe(&mut self, rolling: u8) -> Classification {
        let classification = classify(self.last_rolling, rolling);

        match classification {
            Classification::Initial => {}
            Classification::Ok => self.ok += 1,
            Classification::Missing { lost } => {
                self.missing += 1;
                self.lost_units += u64::from(lost);
            }
            Classification::Duplicate => self.duplicate += 1,
            Classification::Reordered => self.late += 1,
        }

        self.last_rolling = Some(rolling);
        classification
    }

    /// Number of classified transitions (every qualifying frame after the first)
    pub fn transitions(&self) -> u64 {
        self.ok + self.missing + self.duplicate + self.late
    }

    /// Whether the stream has seen no missing, duplicate or late transitions
    pub fn is_healthy(&self) -> bool {
        self.missing == 0 && self.duplicate == 0 && self.late == 0
    }
}

/// Map from stream identity to continuity state
#[derive(Debug, Default, Clone)]
pub struct StreamRegistry {
    streams: HashMap<StreamKey, StreamState>,
}

impl StreamRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one qualifying frame for `key` carrying `rolling`.
    ///
    /// An unseen key gets a fresh entry and the result is always
    /// [`Classification::Initial`]. Replaying the same frame counts twice.
    pub fn update(&mut self, key: StreamKey, rolling: u8) -> Classification {
        match self.streams.entry(key) {
            Entry::Occupied(mut entry) => entry.get_mut().observe(rolling),
            Entry::Vacant(entry) => entry.insert(StreamState::new(key)).observe(rolling),
        }
    }

    /// Last rolling value recorded for `key`
    pub fn last_rolling(&self, key: &StreamKey) -> Option<u8> {
        self.streams.get(key).and_then(|state| state.last_rolling)
    }

    /// State for `key`, if any frame was seen for it
    pub fn get(&self, key: &StreamKey) -> Option<&StreamState> {
        self.streams.get(key)
    }

    /// Iterate over all streams in unspecified order
    pub fn iter(&self) -> impl Iterator<Item = (&StreamKey, &StreamState)> {
        self.streams.iter()
    }

    /// Number of distinct streams observed
    pub fn len(&self) -> usize {
        self.streams.len()
    }

    /// Whether no stream has been observed yet
    pub fn is_empty(&self) -> bool {
        self.streams.is_empty()
    }
}
