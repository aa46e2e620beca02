//! Overview section: headline totals and the longest listening streak.

use crate::aggregate::{round1, sum_by};
use crate::events::PlayEvent;
use crate::report::models::{DateRange, Overview};
use chrono::NaiveDate;
use std::collections::BTreeSet;

/// Longest run of consecutive calendar days in `days`. The floor is 1:
/// a single active day is a streak of 1, and so is no activity at all.
fn longest_streak(days: &BTreeSet<NaiveDate>) -> u64 {
    let mut longest = 1u64;
    let mut current = 1u64;
    let mut prev: Option<NaiveDate> = None;
    for day in days {
        if let Some(p) = prev {
            if (*day - p).num_days() == 1 {
                current += 1;
                longest = longest.max(current);
            } else {
                current = 1;
            }
        }
        prev = Some(*day);
    }
    longest
}

pub fn overview(plays: &[PlayEvent]) -> Overview {
    let total_hours: f64 = plays.iter().map(|p| p.hours()).sum();

    let distinct = |field: fn(&PlayEvent) -> Option<&String>| -> u64 {
        plays.iter().filter_map(field).collect::<BTreeSet<_>>().len() as u64
    };

    let daily_ms = sum_by(plays.iter(), |p| p.date(), |p| p.ms_played as f64);
    let active_days: BTreeSet<NaiveDate> = daily_ms
        .into_iter()
        .filter(|(_, ms)| *ms > 0.0)
        .map(|(day, _)| day)
        .collect();

    let date_range = match (plays.first(), plays.last()) {
        (Some(first), Some(last)) => DateRange {
            start: first.date().to_string(),
            end: last.date().to_string(),
        },
        _ => DateRange::default(),
    };

    Overview {
        total_hours: round1(total_hours),
        total_plays: plays.len() as u64,
        unique_artists: distinct(|p| p.artist_name.as_ref()),
        unique_tracks: distinct(|p| p.track_name.as_ref()),
        unique_albums: distinct(|p| p.album_name.as_ref()),
        date_range,
        longest_streak: longest_streak(&active_days),
    }
}
