//! Aggregation and reporting over the stream registry
//!
//! A [`Snapshot`] is an owned copy of everything the reporter needs, taken
//! between two frames. Snapshots are cheap to share (`Arc<Snapshot>`) and are
//! what the driver publishes for live progress and the final verdict.
//!
//! The `Display` impls here produce the exact lines printed by the
//! command-line tool:
//!
//! ```text
//! Processing: 1200 packets.
//! Streams: 2, 1 broken streams (1 missing, 0 late, 1 duplicates)
//!
//! > 239.0.0.2 OK
//! > 239.0.0.10 (1 missing, 0 late, 1 duplicates)
//! ```

use std::cmp::Ordering;
use std::fmt;

use crate::engine::ContinuityEngine;
use crate::registry::StreamState;
use crate::types::StreamKey;

/// Verdict for one stream at snapshot time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamSummary {
    pub key: StreamKey,
    pub label: String,
    pub ok: u64,
    pub missing: u64,
    pub duplicate: u64,
    pub late: u64,
    pub lost_units: u64,
    pub healthy: bool,
}

impl StreamSummary {
    fn from_state(key: StreamKey, state: &StreamState) -> Self {
        Self {
            key,
            label: state.label.clone(),
            ok: state.ok,
            missing: state.missing,
            duplicate: state.duplicate,
            late: state.late,
            lost_units: state.lost_units,
            healthy: state.is_healthy(),
        }
    }
}

impl fmt::Display for StreamSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.healthy {
            write!(f, "> {} OK", self.label)
        } else {
            write!(
                f,
                "> {} ({} missing, {} late, {} duplicates)",
                self.label, self.missing, self.late, self.duplicate
            )
        }
    }
}

/// Run-wide totals folded over every stream
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Frames read from the capture, qualifying or not
    pub frames_seen: u64,
    /// Frames that passed the filter
    pub frames_classified: u64,
    pub stream_count: usize,
    /// Streams with at least one missing, duplicate or late transition
    pub broken_streams: usize,
    pub total_ok: u64,
    pub total_missing: u64,
    pub total_duplicate: u64,
    pub total_late: u64,
    /// Counter values skipped across every missing transition
    pub total_lost_units: u64,
}

impl RunStats {
    /// Whether every stream is healthy
    pub fn all_ok(&self) -> bool {
        self.broken_streams == 0
    }
}

/// Point-in-time copy of the engine's state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    /// One entry per stream, ordered by stream key
    pub streams: Vec<StreamSummary>,
    pub stats: RunStats,
}

impl Snapshot {
    /// Copy the current state out of `engine` without mutating it
    pub fn capture(engine: &ContinuityEngine) -> Self {
        let mut streams: Vec<StreamSummary> = engine
            .registry()
            .iter()
            .map(|(key, state)| StreamSummary::from_state(*key, state))
            .collect();
        streams.sort_by_key(|summary| summary.key);

        let stats = streams.iter().fold(
            RunStats {
                frames_seen: engine.frames_seen(),
                frames_classified: engine.frames_classified(),
                stream_count: streams.len(),
                ..RunStats::default()
            },
            |mut stats, summary| {
                if !summary.healthy {
                    stats.broken_streams += 1;
                }
                stats.total_ok += summary.ok;
                stats.total_missing += summary.missing;
                stats.total_duplicate += summary.duplicate;
                stats.total_late += summary.late;
                stats.total_lost_units += summary.lost_units;
                stats
            },
        );

        Self { streams, stats }
    }

    /// Per-stream verdicts in natural order of their labels
    pub fn final_report(&self) -> Vec<&StreamSummary> {
        let mut report: Vec<&StreamSummary> = self.streams.iter().collect();
        report.sort_by(|a, b| natural_cmp(&a.label, &b.label));
        report
    }

    /// Two-line progress block for live display
    pub fn progress(&self) -> Progress<'_> {
        Progress(&self.stats)
    }
}

/// Live progress block, rendered over two lines
#[derive(Debug, Clone, Copy)]
pub struct Progress<'a>(&'a RunStats);

impl Progress<'_> {
    /// `Processing: N packets.`
    pub fn frames_line(&self) -> String {
        format!("Processing: {} packets.", self.0.frames_seen)
    }

    /// `Streams: N OK` or the broken-stream breakdown
    pub fn streams_line(&self) -> String {
        let stats = self.0;
        if stats.all_ok() {
            format!("Streams: {} OK", stats.stream_count)
        } else {
            format!(
                "Streams: {}, {}",
                stats.stream_count,
                self.broken_summary().unwrap_or_default()
            )
        }
    }

    /// `B broken streams (m missing, l late, d duplicates)` when anything broke
    pub fn broken_summary(&self) -> Option<String> {
        let stats = self.0;
        (!stats.all_ok()).then(|| {
            format!(
                "{} broken streams ({} missing, {} late, {} duplicates)",
                stats.broken_streams, stats.total_missing, stats.total_late, stats.total_duplicate
            )
        })
    }
}

impl fmt::Display for Progress<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.frames_line())?;
        write!(f, "{}", self.streams_line())
    }
}

/// Compares strings so that embedded decimal numbers sort by value.
///
/// `"10.0.0.2"` sorts before `"10.0.0.10"`. Runs of ASCII digits are
/// compared numerically (ignoring leading zeros, shorter zero-padding first on
/// ties); everything else compares byte by byte.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    let (mut i, mut j) = (0, 0);

    while i < a.len() && j < b.len() {
        if a[i].is_ascii_digit() && b[j].is_ascii_digit() {
            let a_end = digit_run_end(a, i);
            let b_end = digit_run_end(b, j);
            let ordering = cmp_digit_runs(&a[i..a_end], &b[j..b_end]);
            if ordering != Ordering::Equal {
                return ordering;
            }
            i = a_end;
            j = b_end;
        } else {
            match a[i].cmp(&b[j]) {
                Ordering::Equal => {
                    i += 1;
                    j += 1;
                }
                ordering => return ordering,
            }
        }
    }

    (a.len() - i).cmp(&(b.len() - j))
}

fn digit_run_end(bytes: &[u8], start: usize) -> usize {
    bytes[start..].iter().position(|b| !b.is_ascii_digit()).map_or(bytes.len(), |n| start + n)
}

fn cmp_digit_runs(a: &[u8], b: &[u8]) -> Ordering {
    let trim = |run: &[u8]| -> usize { run.iter().position(|&d| d != b'0').unwrap_or(run.len()) };
    let (a_sig, b_sig) = (&a[trim(a)..], &b[trim(b)..]);

    a_sig
        .len()
        .cmp(&b_sig.len())
        .then_with(|| a_sig.cmp(b_sig))
        .then_with(|| a.len().cmp(&b.len()))
}
