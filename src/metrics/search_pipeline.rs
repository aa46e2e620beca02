//! Search-to-listen pipeline: did a search turn into listening, how
//! fast, and which searches became obsessions.

use crate::aggregate::{mean, pct_of_counts, round1};
use crate::correlate::{any_within, Window};
use crate::events::{PlayEvent, SearchEvent, ZonedTime};
use crate::metrics::{artist_key, date_string, uri_key};
use crate::report::models::{SearchListenPipeline, SearchObsession};
use crate::timeline::TemporalIndex;
use chrono::Duration;
use std::collections::BTreeMap;

const IMPULSE_WINDOW_MINUTES: i64 = 5;

/// Lookup keys for a search: every interaction URI first, then the
/// case-folded query treated as an artist name.
fn search_keys(search: &SearchEvent) -> Vec<String> {
    let mut keys: Vec<String> =
        search.interaction_uris.iter().map(|u| uri_key(u)).collect();
    keys.push(artist_key(&search.query));
    keys
}

fn first_listen_after<'a>(
    index: &TemporalIndex<'a, PlayEvent>,
    keys: &[String],
    at: ZonedTime,
) -> Option<(ZonedTime, &'a PlayEvent)> {
    keys.iter().find_map(|key| index.first_at_or_after(key, at))
}

pub fn search_listen_pipeline(
    searches: Option<&[SearchEvent]>,
    play_index: &TemporalIndex<'_, PlayEvent>,
) -> SearchListenPipeline {
    let Some(searches) = searches else {
        return SearchListenPipeline::default();
    };
    if searches.is_empty() {
        return SearchListenPipeline::default();
    }

    let impulse_window = Window::forward(Duration::minutes(IMPULSE_WINDOW_MINUTES));
    let mut impulse_count = 0u64;
    let mut gaps_minutes: Vec<f64> = Vec::new();
    // Folded artist name -> (first search time, display name).
    let mut first_searched: BTreeMap<String, ZonedTime> = BTreeMap::new();

    for search in searches {
        let keys = search_keys(search);
        if any_within(play_index, &keys, search.ts, impulse_window) {
            impulse_count += 1;
        }
        if let Some((listen_ts, _)) = first_listen_after(play_index, &keys, search.ts) {
            // At-or-after matching keeps the gap non-negative by
            // construction; a same-instant listen is a zero gap.
            gaps_minutes.push((listen_ts - search.ts).num_seconds() as f64 / 60.0);
        }

        let folded = artist_key(&search.query);
        if play_index.contains_key(&folded) {
            let entry = first_searched.entry(folded).or_insert(search.ts);
            if search.ts < *entry {
                *entry = search.ts;
            }
        }
    }

    let mut obsessions: Vec<SearchObsession> = first_searched
        .into_iter()
        .filter_map(|(folded, first)| {
            let listens = play_index.events_for(&folded);
            let from = listens.partition_point(|(ts, _)| *ts < first);
            let hours: f64 = listens[from..].iter().map(|(_, p)| p.hours()).sum();
            if hours <= 0.0 {
                return None;
            }
            let name = listens
                .first()
                .and_then(|(_, p)| p.artist_name.clone())
                .unwrap_or_else(|| folded.trim_start_matches("artist:").to_string());
            Some(SearchObsession {
                name,
                hours: round1(hours),
                first_searched: date_string(&first),
            })
        })
        .collect();
    obsessions.sort_by(|a, b| {
        b.hours
            .partial_cmp(&a.hours)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.name.cmp(&b.name))
    });
    obsessions.truncate(10);

    SearchListenPipeline {
        search_to_obsession: obsessions,
        impulse_pct: round1(pct_of_counts(impulse_count, searches.len() as u64)),
        impulse_count,
        avg_gap_minutes: round1(mean(gaps_minutes)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::build_play_index;
    use crate::metrics::test_util::{play, zoned};

    fn search(ts: ZonedTime, query: &str, uris: Vec<String>) -> SearchEvent {
        SearchEvent {
            ts,
            query: query.to_string(),
            platform: "ANDROID".to_string(),
            interaction_uris: uris,
        }
    }

    #[test]
    fn test_impulse_case_folded_window() {
        // Stream of an "Artist X" track two minutes after searching
        // "artist x": an impulse. A second search ten minutes before a
        // stream is not.
        let plays = vec![
            play(zoned(2024, 1, 1, 12, 2), 600_000, "Song", "Artist X"),
            play(zoned(2024, 1, 1, 18, 10), 600_000, "Song", "Artist X"),
        ];
        let index = build_play_index(&plays);
        let searches = vec![
            search(zoned(2024, 1, 1, 12, 0), "artist x", vec![]),
            search(zoned(2024, 1, 1, 18, 0), "artist x", vec![]),
        ];
        let pipeline = search_listen_pipeline(Some(&searches), &index);
        assert_eq!(pipeline.impulse_count, 1);
        assert_eq!(pipeline.impulse_pct, 50.0);
    }

    #[test]
    fn test_gap_uses_interaction_uri_first() {
        let plays = vec![play(zoned(2024, 1, 1, 12, 30), 600_000, "Song", "Artist X")];
        let uri = plays[0].track_uri.clone().unwrap();
        let index = build_play_index(&plays);
        let searches = vec![search(zoned(2024, 1, 1, 12, 0), "unrelated words", vec![uri])];
        let pipeline = search_listen_pipeline(Some(&searches), &index);
        assert_eq!(pipeline.avg_gap_minutes, 30.0);
    }

    #[test]
    fn test_obsession_hours_from_first_search() {
        let plays = vec![
            // Before the first search: excluded from obsession hours.
            play(zoned(2024, 1, 1, 8, 0), 3_600_000, "Song", "Artist X"),
            play(zoned(2024, 1, 2, 12, 0), 3_600_000, "Song", "Artist X"),
            play(zoned(2024, 1, 3, 12, 0), 3_600_000, "Song", "Artist X"),
        ];
        let index = build_play_index(&plays);
        let searches = vec![
            search(zoned(2024, 1, 2, 9, 0), "Artist X", vec![]),
            // A later duplicate search must not move the anchor.
            search(zoned(2024, 1, 3, 9, 0), "artist x", vec![]),
        ];
        let pipeline = search_listen_pipeline(Some(&searches), &index);
        assert_eq!(pipeline.search_to_obsession.len(), 1);
        let obsession = &pipeline.search_to_obsession[0];
        assert_eq!(obsession.name, "Artist X");
        assert_eq!(obsession.hours, 2.0);
        assert_eq!(obsession.first_searched, "2024-01-02");
    }

    #[test]
    fn test_absent_searches_default() {
        let plays: Vec<PlayEvent> = vec![];
        let index = build_play_index(&plays);
        let pipeline = search_listen_pipeline(None, &index);
        assert_eq!(pipeline.impulse_count, 0);
        assert_eq!(pipeline.avg_gap_minutes, 0.0);
    }
}
