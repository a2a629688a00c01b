//! Rolling counter transition classes

use std::ops::RangeInclusive;

/// Outcome of comparing a stream's rolling counter with its previous value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Classification {
    /// First packet seen for the stream; only initialises the counter
    Initial,

    /// Counter advanced by exactly one
    Ok,

    /// Counter skipped ahead; `lost` units never arrived
    Missing { lost: u8 },

    /// Counter repeated
    Duplicate,

    /// Counter went backwards.
    ///
    /// Unreachable with the modulo-256 distance used by
    /// [`classify`](crate::continuity::classify): the distance is corrected
    /// into `0..=255` before the sign is inspected, so a late packet shows up
    /// as `Missing` with a large `lost` count instead. Kept so that the
    /// counters and narration stay complete.
    Reordered,
}

impl Classification {
    /// Whether this transition marks the stream as broken
    pub fn is_anomaly(&self) -> bool {
        matches!(
            self,
            Classification::Missing { .. } | Classification::Duplicate | Classification::Reordered
        )
    }

    /// Counter values that were skipped when moving from `previous` to the
    /// value that produced this classification.
    ///
    /// The range is expressed in unwrapped arithmetic: `start` may exceed 255
    /// and each element should be reduced modulo 256 by the caller.
    pub fn lost_range(&self, previous: u8) -> Option<RangeInclusive<u16>> {
        match *self {
            Classification::Missing { lost } if lost > 0 => {
                let start = u16::from(previous) + 1;
                Some(start..=start + u16::from(lost) - 1)
            }
            _ => None,
        }
    }
}
