//! Session reconstruction
//!
//! Pairs begin and end events sharing a correlation id into bounded
//! intervals. Duplicate emissions collapse to the earliest begin and the
//! latest end; pairs with non-positive duration (end logged before begin)
//! or implausibly long duration (over 24h, assumed orphaned) are dropped
//! silently.

use crate::events::{SessionEdge, SessionInterval, ZonedTime};
use chrono::Duration;
use std::collections::HashMap;

pub fn reconstruct_sessions<'a, I>(edges: I) -> Vec<SessionInterval>
where
    I: IntoIterator<Item = (&'a str, SessionEdge, ZonedTime)>,
{
    let mut bounds: HashMap<&'a str, (Option<ZonedTime>, Option<ZonedTime>)> = HashMap::new();
    for (id, edge, at) in edges {
        let entry = bounds.entry(id).or_insert((None, None));
        match edge {
            SessionEdge::Begin => {
                entry.0 = Some(entry.0.map_or(at, |prev| prev.min(at)));
            }
            SessionEdge::End => {
                entry.1 = Some(entry.1.map_or(at, |prev| prev.max(at)));
            }
        }
    }

    let mut sessions: Vec<SessionInterval> = bounds
        .into_values()
        .filter_map(|(begin, end)| {
            let (start, end) = (begin?, end?);
            let duration = end - start;
            if duration > Duration::zero() && duration < Duration::hours(24) {
                Some(SessionInterval { start, end })
            } else {
                None
            }
        })
        .collect();
    sessions.sort_by_key(|s| s.start);
    sessions
}

/// Derived interval statistics.
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionStats {
    pub count: usize,
    pub mean_minutes: f64,
    pub max_minutes: f64,
    pub total_hours: f64,
}

impl SessionStats {
    pub fn from_intervals(sessions: &[SessionInterval]) -> Self {
        if sessions.is_empty() {
            return Self::default();
        }
        let minutes: Vec<f64> = sessions.iter().map(|s| s.duration_minutes()).collect();
        let total: f64 = minutes.iter().sum();
        Self {
            count: sessions.len(),
            mean_minutes: total / sessions.len() as f64,
            max_minutes: minutes.iter().copied().fold(0.0, f64::max),
            total_hours: total / 60.0,
        }
    }
}
