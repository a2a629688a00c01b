//! Continuity classifier for 8-bit rolling counters
//!
//! SVSI senders stamp every transport unit with a free-running 8-bit counter
//! that wraps from 255 to 0. Comparing each value with the previous one for
//! the same stream tells whether units were lost or repeated.

use crate::types::Classification;

/// Classifies the transition from `previous` to `current`.
///
/// The distance is `current - previous` corrected into `0..=255`:
///
/// | distance | result                           |
/// |----------|----------------------------------|
/// | 1        | [`Classification::Ok`]           |
/// | 0        | [`Classification::Duplicate`]    |
/// | > 1      | [`Classification::Missing`]      |
///
/// The correction happens before the sign is checked, so
/// [`Classification::Reordered`] is never produced; a late packet appears as a
/// large gap.
///
/// ```rust
/// use svsi_analyser::continuity::classify;
/// use svsi_analyser::types::Classification;
///
/// assert_eq!(classify(None, 7), Classification::Initial);
/// assert_eq!(classify(Some(255), 0), Classification::Ok);
/// assert_eq!(classify(Some(10), 250), Classification::Missing { lost: 239 });
/// ```
pub fn classify(previous: Option<u8>, current: u8) -> Classification {
    let Some(previous) = previous else {
        return Classification::Initial;
    };

    let mut diff = i16::from(current) - i16::from(previous);
    if diff < 0 {
        diff += 256;
    }

    if diff > 1 {
        Classification::Missing { lost: (diff - 1) as u8 }
    } else if diff == 0 {
        Classification::Duplicate
    } else if diff < 0 {
        Classification::Reordered
    } else {
        Classification::Ok
    }
}
