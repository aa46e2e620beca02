//! Playlist curation behavior from the technical mutation stream:
//! churn, regret, impulse-add timing and abandoned adds.

use crate::aggregate::{count_by, pct_of_counts, round1};
use crate::events::{self, MutationKind, PlayEvent, PlaylistMutationEvent, ZonedTime, DOW_NAMES};
use crate::metrics::track_lookup_keys;
use crate::report::models::{
    AbandonedTrack, ChurnWeek, CurationHeatmapCell, ImpulseAddBin, PlaylistCuration,
    PlaylistCurationMetrics,
};
use crate::timeline::TemporalIndex;
use chrono::Duration;
use std::collections::{BTreeMap, BTreeSet};

const REGRET_WINDOW_DAYS: i64 = 7;
const IMPULSE_BINS: [&str; 5] = ["<1h", "<1 day", "<1 week", "<1 month", "\u{2265}1 month"];

fn impulse_bin(gap: Duration) -> &'static str {
    if gap < Duration::hours(1) {
        IMPULSE_BINS[0]
    } else if gap < Duration::days(1) {
        IMPULSE_BINS[1]
    } else if gap < Duration::days(7) {
        IMPULSE_BINS[2]
    } else if gap < Duration::days(30) {
        IMPULSE_BINS[3]
    } else {
        IMPULSE_BINS[4]
    }
}

/// First stream of a track identity, primary URI path first.
fn first_stream<'a>(
    play_index: &TemporalIndex<'a, PlayEvent>,
    mutation: &PlaylistMutationEvent,
) -> Option<ZonedTime> {
    let keys = track_lookup_keys(
        Some(&mutation.track_uri),
        mutation.track_name.as_deref(),
        mutation.artist_name.as_deref(),
    );
    keys.iter()
        .find_map(|key| play_index.events_for(key).first())
        .map(|(ts, _)| *ts)
}

/// Any stream of a track identity at or after `at`.
fn streamed_at_or_after(
    play_index: &TemporalIndex<'_, PlayEvent>,
    mutation: &PlaylistMutationEvent,
    at: ZonedTime,
) -> bool {
    let keys = track_lookup_keys(
        Some(&mutation.track_uri),
        mutation.track_name.as_deref(),
        mutation.artist_name.as_deref(),
    );
    keys.iter().any(|key| play_index.first_at_or_after(key, at).is_some())
}

fn curation_metrics(
    mutations: &[&PlaylistMutationEvent],
    play_index: &TemporalIndex<'_, PlayEvent>,
) -> PlaylistCurationMetrics {
    if mutations.is_empty() {
        return PlaylistCurationMetrics::default();
    }

    let adds: Vec<&PlaylistMutationEvent> =
        mutations.iter().copied().filter(|m| m.kind == MutationKind::Add).collect();
    let total_adds = adds.len() as u64;
    let total_removes = mutations.len() as u64 - total_adds;

    let weekly_adds = count_by(
        mutations.iter().filter(|m| m.kind == MutationKind::Add),
        |m| events::week_key(&m.ts),
    );
    let weekly_removes = count_by(
        mutations.iter().filter(|m| m.kind == MutationKind::Remove),
        |m| events::week_key(&m.ts),
    );
    let weeks: BTreeSet<String> =
        weekly_adds.keys().chain(weekly_removes.keys()).cloned().collect();
    let churn_over_time: Vec<ChurnWeek> = weeks
        .iter()
        .map(|week| ChurnWeek {
            week: week.clone(),
            adds: weekly_adds.get(week).copied().unwrap_or(0),
            removes: weekly_removes.get(week).copied().unwrap_or(0),
        })
        .collect();
    let active_weeks = weeks.len() as u64;

    let cell_counts = count_by(mutations.iter(), |m| {
        (events::weekday_index(&m.ts), events::hour_of(&m.ts))
    });
    let mut curation_heatmap = Vec::with_capacity(7 * 24);
    for day in 0..7 {
        for hour in 0..24 {
            curation_heatmap.push(CurationHeatmapCell {
                day: DOW_NAMES[day].to_string(),
                day_index: day as u32,
                hour,
                count: cell_counts.get(&(day, hour)).copied().unwrap_or(0),
            });
        }
    }

    // Regret: per add, only the nearest following removal of the same
    // (track, playlist) counts, and only within the window.
    let mut removes_by_pair: BTreeMap<(&str, &str), Vec<ZonedTime>> = BTreeMap::new();
    for m in mutations.iter().filter(|m| m.kind == MutationKind::Remove) {
        removes_by_pair
            .entry((m.track_uri.as_str(), m.playlist_uri.as_str()))
            .or_default()
            .push(m.ts);
    }
    let mut regret_count = 0u64;
    for add in &adds {
        if let Some(removes) = removes_by_pair.get(&(add.track_uri.as_str(), add.playlist_uri.as_str()))
        {
            let idx = removes.partition_point(|ts| *ts < add.ts);
            if let Some(nearest) = removes.get(idx) {
                if *nearest - add.ts <= Duration::days(REGRET_WINDOW_DAYS) {
                    regret_count += 1;
                }
            }
        }
    }

    // Impulse-add timing: how long after first hearing a track it was
    // added. Adds of never-before-streamed tracks are not binned.
    let mut bin_counts: BTreeMap<&str, u64> = BTreeMap::new();
    for add in &adds {
        if let Some(first) = first_stream(play_index, add) {
            if first <= add.ts {
                *bin_counts.entry(impulse_bin(add.ts - first)).or_insert(0) += 1;
            }
        }
    }
    let impulse_add_timing = IMPULSE_BINS
        .iter()
        .map(|bin| ImpulseAddBin {
            bin: bin.to_string(),
            count: bin_counts.get(bin).copied().unwrap_or(0),
        })
        .collect();

    // Abandoned: the most recent add of the track has no stream at or
    // after it. The mutation table is timestamp-sorted, so the last add
    // seen per track is the latest.
    let mut latest_add: BTreeMap<&str, &PlaylistMutationEvent> = BTreeMap::new();
    for add in &adds {
        latest_add.insert(add.track_uri.as_str(), add);
    }
    let mut abandoned_examples = Vec::new();
    let mut abandoned_count = 0u64;
    for add in latest_add.values() {
        if !streamed_at_or_after(play_index, add, add.ts) {
            abandoned_count += 1;
            if abandoned_examples.len() < 10 {
                abandoned_examples.push(AbandonedTrack {
                    name: add.track_name.clone().unwrap_or_else(|| add.track_uri.clone()),
                    artist: add.artist_name.clone().unwrap_or_default(),
                });
            }
        }
    }
    let tracks_with_adds = latest_add.len() as u64;

    PlaylistCurationMetrics {
        total_adds,
        total_removes,
        adds_per_week: round1(total_adds as f64 / active_weeks.max(1) as f64),
        removes_per_week: round1(total_removes as f64 / active_weeks.max(1) as f64),
        churn_over_time,
        curation_heatmap,
        regret_count,
        regret_pct: round1(pct_of_counts(regret_count, total_adds)),
        impulse_add_timing,
        abandoned_count,
        abandoned_pct: round1(pct_of_counts(abandoned_count, tracks_with_adds)),
        abandoned_examples,
    }
}

pub fn playlist_curation(
    mutations: &[PlaylistMutationEvent],
    play_index: &TemporalIndex<'_, PlayEvent>,
) -> PlaylistCuration {
    let all: Vec<&PlaylistMutationEvent> = mutations.iter().collect();
    let user_only: Vec<&PlaylistMutationEvent> =
        mutations.iter().filter(|m| m.user_attributed).collect();
    PlaylistCuration {
        all: curation_metrics(&all, play_index),
        user_only: curation_metrics(&user_only, play_index),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::build_play_index;
    use crate::metrics::test_util::{play, zoned};

    fn mutation(
        ts: ZonedTime,
        playlist: &str,
        track: &str,
        kind: MutationKind,
        user: bool,
    ) -> PlaylistMutationEvent {
        PlaylistMutationEvent {
            ts,
            playlist_uri: playlist.to_string(),
            track_uri: track.to_string(),
            track_name: Some(format!("name-{}", track)),
            artist_name: Some("Artist".to_string()),
            kind,
            user_attributed: user,
            item_kind: "track".to_string(),
        }
    }

    #[test]
    fn test_regret_counts_nearest_removal_once() {
        // Add at T, removes at T+3d and T+10d: one regret, from the
        // nearest removal only.
        let mutations = vec![
            mutation(zoned(2024, 1, 1, 12, 0), "p", "u", MutationKind::Add, true),
            mutation(zoned(2024, 1, 4, 12, 0), "p", "u", MutationKind::Remove, true),
            mutation(zoned(2024, 1, 11, 12, 0), "p", "u", MutationKind::Remove, true),
        ];
        let plays: Vec<PlayEvent> = vec![];
        let index = build_play_index(&plays);
        let curation = playlist_curation(&mutations, &index);
        assert_eq!(curation.all.regret_count, 1);
        assert_eq!(curation.all.total_adds, 1);
        assert_eq!(curation.all.total_removes, 2);
    }

    #[test]
    fn test_remove_before_add_is_not_regret() {
        let mutations = vec![
            mutation(zoned(2024, 1, 4, 12, 0), "p", "u", MutationKind::Remove, true),
            mutation(zoned(2024, 1, 5, 12, 0), "p", "u", MutationKind::Add, true),
        ];
        let plays: Vec<PlayEvent> = vec![];
        let index = build_play_index(&plays);
        assert_eq!(playlist_curation(&mutations, &index).all.regret_count, 0);
    }

    #[test]
    fn test_regret_window_boundary() {
        // Removal eight days out is past the window.
        let mutations = vec![
            mutation(zoned(2024, 1, 1, 12, 0), "p", "u", MutationKind::Add, true),
            mutation(zoned(2024, 1, 9, 12, 0), "p", "u", MutationKind::Remove, true),
        ];
        let plays: Vec<PlayEvent> = vec![];
        let index = build_play_index(&plays);
        assert_eq!(playlist_curation(&mutations, &index).all.regret_count, 0);
    }

    #[test]
    fn test_abandoned_add_semantics() {
        let plays = vec![play(zoned(2024, 1, 1, 9, 0), 600_000, "heard", "Artist")];
        let heard_uri = plays[0].track_uri.clone().unwrap();
        let index = build_play_index(&plays);
        let mutations = vec![
            // Streamed long before its (re-)add, never after: abandoned.
            mutation(zoned(2024, 3, 1, 12, 0), "p", &heard_uri, MutationKind::Add, true),
            // Never streamed at all: abandoned.
            mutation(zoned(2024, 3, 2, 12, 0), "p", "never", MutationKind::Add, true),
        ];
        let curation = playlist_curation(&mutations, &index);
        assert_eq!(curation.all.abandoned_count, 2);
        assert_eq!(curation.all.abandoned_pct, 100.0);
        assert_eq!(curation.all.abandoned_examples.len(), 2);
    }

    #[test]
    fn test_add_then_stream_is_not_abandoned_and_bins_impulse() {
        let plays = vec![
            play(zoned(2024, 1, 1, 9, 0), 600_000, "liked", "Artist"),
            play(zoned(2024, 3, 5, 9, 0), 600_000, "liked", "Artist"),
        ];
        let uri = plays[0].track_uri.clone().unwrap();
        let index = build_play_index(&plays);
        // Added two hours after first hearing it.
        let mutations =
            vec![mutation(zoned(2024, 1, 1, 11, 0), "p", &uri, MutationKind::Add, true)];
        let curation = playlist_curation(&mutations, &index);
        assert_eq!(curation.all.abandoned_count, 0);
        let bins = &curation.all.impulse_add_timing;
        assert_eq!(bins.len(), 5);
        assert_eq!(bins[1].bin, "<1 day");
        assert_eq!(bins[1].count, 1);
    }

    #[test]
    fn test_user_only_partition() {
        let mutations = vec![
            mutation(zoned(2024, 1, 1, 12, 0), "p", "a", MutationKind::Add, true),
            mutation(zoned(2024, 1, 1, 13, 0), "p", "b", MutationKind::Add, false),
        ];
        let plays: Vec<PlayEvent> = vec![];
        let index = build_play_index(&plays);
        let curation = playlist_curation(&mutations, &index);
        assert_eq!(curation.all.total_adds, 2);
        assert_eq!(curation.user_only.total_adds, 1);
    }
}
