//! Correlation engine
//!
//! One windowed-join primitive shared by every cross-stream metric:
//! given an anchor timestamp and a set of candidate identity keys, find
//! matching events in a target index within a signed time-offset window.
//! Both window endpoints are inclusive. Keys are tried in order and the
//! first key with any in-window event decides the outcome, so the opaque
//! URI always wins over the case-folded fallback when both are present.

use crate::events::ZonedTime;
use crate::timeline::TemporalIndex;
use chrono::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
    Both,
}

/// A non-negative span applied around an anchor timestamp.
#[derive(Debug, Clone, Copy)]
pub struct Window {
    pub span: Duration,
    pub direction: Direction,
}

impl Window {
    pub fn forward(span: Duration) -> Self {
        Self { span, direction: Direction::Forward }
    }

    pub fn backward(span: Duration) -> Self {
        Self { span, direction: Direction::Backward }
    }

    pub fn both(span: Duration) -> Self {
        Self { span, direction: Direction::Both }
    }

    /// Inclusive interval covered relative to `at`.
    pub fn bounds(&self, at: ZonedTime) -> (ZonedTime, ZonedTime) {
        match self.direction {
            Direction::Forward => (at, at + self.span),
            Direction::Backward => (at - self.span, at),
            Direction::Both => (at - self.span, at + self.span),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchPolicy {
    /// Boolean presence of any in-window match.
    Any,
    /// Earliest in-window match (used to compute a gap).
    First,
    /// Number of in-window matches.
    Count,
}

#[derive(Debug, Clone, Copy)]
pub enum CorrelationMatch<'a, E> {
    Presence(bool),
    First(Option<(ZonedTime, &'a E)>),
    Count(usize),
}

pub fn correlate<'a, E>(
    index: &TemporalIndex<'a, E>,
    keys: &[String],
    at: ZonedTime,
    window: Window,
    policy: MatchPolicy,
) -> CorrelationMatch<'a, E> {
    let (start, end) = window.bounds(at);
    for key in keys {
        let hits = index.in_range(key, start, end);
        if hits.is_empty() {
            continue;
        }
        return match policy {
            MatchPolicy::Any => CorrelationMatch::Presence(true),
            MatchPolicy::First => CorrelationMatch::First(hits.first().copied()),
            MatchPolicy::Count => CorrelationMatch::Count(hits.len()),
        };
    }
    match policy {
        MatchPolicy::Any => CorrelationMatch::Presence(false),
        MatchPolicy::First => CorrelationMatch::First(None),
        MatchPolicy::Count => CorrelationMatch::Count(0),
    }
}

/// `Any` policy as a plain bool.
pub fn any_within<'a, E>(
    index: &TemporalIndex<'a, E>,
    keys: &[String],
    at: ZonedTime,
    window: Window,
) -> bool {
    matches!(
        correlate(index, keys, at, window, MatchPolicy::Any),
        CorrelationMatch::Presence(true)
    )
}

/// `First` policy as the earliest match, if any.
pub fn first_within<'a, E>(
    index: &TemporalIndex<'a, E>,
    keys: &[String],
    at: ZonedTime,
    window: Window,
) -> Option<(ZonedTime, &'a E)> {
    match correlate(index, keys, at, window, MatchPolicy::First) {
        CorrelationMatch::First(hit) => hit,
        _ => None,
    }
}

/// `Count` policy as a plain count.
pub fn count_within<'a, E>(
    index: &TemporalIndex<'a, E>,
    keys: &[String],
    at: ZonedTime,
    window: Window,
) -> usize {
    match correlate(index, keys, at, window, MatchPolicy::Count) {
        CorrelationMatch::Count(n) => n,
        _ => 0,
    }
}
