//! Playlist x streaming overlap: how much listening flows through
//! curated collections, and which playlists are effectively dead.

use crate::aggregate::{pct_of, round1};
use crate::events::{fold_key, LibrarySnapshot, PlayEvent, Playlist};
use crate::report::models::{
    DeadPlaylist, DiscoverWeeklyHitRate, PlaylistStreamEntry, PlaylistStreamOverlap,
};
use std::collections::{HashMap, HashSet};

const DEAD_PLAYLIST_MIN_TRACKS: usize = 5;
const DEAD_PLAYLIST_STREAMED_FRACTION: f64 = 0.10;
const DISCOVER_WEEKLY_NAME: &str = "Discover Weekly";

/// Play-hour sums under both identity paths.
struct PlayHours<'a> {
    by_uri: HashMap<&'a str, f64>,
    by_fold: HashMap<String, f64>,
}

impl<'a> PlayHours<'a> {
    fn build(plays: &'a [PlayEvent]) -> Self {
        let mut by_uri: HashMap<&'a str, f64> = HashMap::new();
        let mut by_fold: HashMap<String, f64> = HashMap::new();
        for play in plays.iter().filter(|p| p.is_music()) {
            if let Some(uri) = play.track_uri.as_deref() {
                *by_uri.entry(uri).or_insert(0.0) += play.hours();
            }
            if let (Some(name), Some(artist)) = (&play.track_name, &play.artist_name) {
                *by_fold.entry(fold_key(name, artist)).or_insert(0.0) += play.hours();
            }
        }
        Self { by_uri, by_fold }
    }

    /// Hours for a track identity: opaque URI first, case-folded pair as
    /// the fallback path.
    fn hours_for(&self, uri: Option<&str>, name: Option<&str>, artist: Option<&str>) -> Option<f64> {
        if let Some(uri) = uri {
            if let Some(h) = self.by_uri.get(uri) {
                return Some(*h);
            }
        }
        if let (Some(name), Some(artist)) = (name, artist) {
            return self.by_fold.get(&fold_key(name, artist)).copied();
        }
        None
    }
}

fn playlist_entry(playlist: &Playlist, hours: &PlayHours<'_>) -> PlaylistStreamEntry {
    // Deduplicate items by identity so a track listed twice in one
    // playlist contributes once.
    let mut seen: HashSet<String> = HashSet::new();
    let mut streamed = 0u64;
    let mut total_hours = 0.0;
    for item in &playlist.items {
        let identity = item
            .track_uri
            .clone()
            .or_else(|| match (&item.track_name, &item.artist_name) {
                (Some(n), Some(a)) => Some(fold_key(n, a)),
                _ => None,
            });
        let Some(identity) = identity else { continue };
        if !seen.insert(identity) {
            continue;
        }
        if let Some(h) = hours.hours_for(
            item.track_uri.as_deref(),
            item.track_name.as_deref(),
            item.artist_name.as_deref(),
        ) {
            streamed += 1;
            total_hours += h;
        }
    }
    PlaylistStreamEntry {
        name: playlist.name.clone(),
        hours: round1(total_hours),
        total_tracks: playlist.items.len() as u64,
        streamed_tracks: streamed,
    }
}

pub fn playlist_stream_overlap(
    playlists: Option<&[Playlist]>,
    library: Option<&LibrarySnapshot>,
    plays: &[PlayEvent],
) -> PlaylistStreamOverlap {
    if playlists.is_none() && library.is_none() {
        return PlaylistStreamOverlap::default();
    }

    let hours = PlayHours::build(plays);
    let total_music_hours: f64 = plays.iter().filter(|p| p.is_music()).map(|p| p.hours()).sum();

    let playlist_uris: HashSet<&str> = playlists
        .iter()
        .flat_map(|lists| lists.iter())
        .flat_map(|p| p.items.iter())
        .filter_map(|i| i.track_uri.as_deref())
        .collect();
    let playlist_folds: HashSet<String> = playlists
        .iter()
        .flat_map(|lists| lists.iter())
        .flat_map(|p| p.items.iter())
        .filter_map(|i| match (&i.track_name, &i.artist_name) {
            (Some(n), Some(a)) => Some(fold_key(n, a)),
            _ => None,
        })
        .collect();
    let library_uris: HashSet<&str> = library
        .iter()
        .flat_map(|l| l.tracks.iter())
        .map(|t| t.uri.as_str())
        .collect();
    let library_folds: HashSet<String> = library
        .iter()
        .flat_map(|l| l.tracks.iter())
        .filter(|t| !t.track.is_empty() && !t.artist.is_empty())
        .map(|t| fold_key(&t.track, &t.artist))
        .collect();

    let play_matches = |play: &PlayEvent, uris: &HashSet<&str>, folds: &HashSet<String>| -> bool {
        if let Some(uri) = play.track_uri.as_deref() {
            if uris.contains(uri) {
                return true;
            }
        }
        match (&play.track_name, &play.artist_name) {
            (Some(n), Some(a)) => folds.contains(&fold_key(n, a)),
            _ => false,
        }
    };

    let music = || plays.iter().filter(|p| p.is_music());
    let playlist_hours: f64 = music()
        .filter(|p| play_matches(p, &playlist_uris, &playlist_folds))
        .map(|p| p.hours())
        .sum();
    let library_stream_hours: f64 = music()
        .filter(|p| play_matches(p, &library_uris, &library_folds))
        .map(|p| p.hours())
        .sum();
    let combined_hours: f64 = music()
        .filter(|p| {
            play_matches(p, &playlist_uris, &playlist_folds)
                || play_matches(p, &library_uris, &library_folds)
        })
        .map(|p| p.hours())
        .sum();

    let library_streamed_tracks = library
        .iter()
        .flat_map(|l| l.tracks.iter())
        .filter(|t| {
            hours
                .hours_for(
                    Some(t.uri.as_str()),
                    (!t.track.is_empty()).then_some(t.track.as_str()),
                    (!t.artist.is_empty()).then_some(t.artist.as_str()),
                )
                .is_some()
        })
        .count() as u64;

    let mut entries: Vec<PlaylistStreamEntry> = playlists
        .iter()
        .flat_map(|lists| lists.iter())
        .map(|p| playlist_entry(p, &hours))
        .collect();

    let mut dead_playlists: Vec<DeadPlaylist> = entries
        .iter()
        .filter(|e| {
            e.total_tracks >= DEAD_PLAYLIST_MIN_TRACKS as u64
                && (e.streamed_tracks as f64) < (e.total_tracks as f64) * DEAD_PLAYLIST_STREAMED_FRACTION
        })
        .map(|e| DeadPlaylist {
            name: e.name.clone(),
            total_tracks: e.total_tracks,
            streamed_tracks: e.streamed_tracks,
        })
        .collect();
    dead_playlists.sort_by(|a, b| b.total_tracks.cmp(&a.total_tracks).then_with(|| a.name.cmp(&b.name)));

    let discover_weekly_hit_rate = playlists
        .iter()
        .flat_map(|lists| lists.iter())
        .find(|p| p.name == DISCOVER_WEEKLY_NAME)
        .map(|p| {
            let entry = playlist_entry(p, &hours);
            DiscoverWeeklyHitRate {
                playlist_name: entry.name,
                total_tracks: entry.total_tracks,
                hit_tracks: entry.streamed_tracks,
                hit_rate: round1(pct_of(entry.streamed_tracks as f64, entry.total_tracks as f64)),
            }
        });

    entries.sort_by(|a, b| {
        b.hours
            .partial_cmp(&a.hours)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.name.cmp(&b.name))
    });
    entries.truncate(10);

    PlaylistStreamOverlap {
        loyalty_score: round1(pct_of(playlist_hours, total_music_hours)),
        playlist_hours: round1(playlist_hours),
        library_loyalty_score: round1(pct_of(library_stream_hours, total_music_hours)),
        library_stream_hours: round1(library_stream_hours),
        library_total_tracks: library.map(|l| l.tracks.len() as u64).unwrap_or(0),
        library_streamed_tracks,
        combined_loyalty_score: round1(pct_of(combined_hours, total_music_hours)),
        combined_stream_hours: round1(combined_hours),
        most_played_playlists: entries,
        dead_playlists,
        discover_weekly_hit_rate,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::PlaylistItem;
    use crate::metrics::test_util::{play, zoned};

    fn item_for(play: &PlayEvent) -> PlaylistItem {
        PlaylistItem {
            added_at: None,
            track_uri: play.track_uri.clone(),
            track_name: play.track_name.clone(),
            artist_name: play.artist_name.clone(),
        }
    }

    fn named_item(name: &str, artist: &str) -> PlaylistItem {
        PlaylistItem {
            added_at: None,
            track_uri: Some(format!("spotify:track:{}-{}", name, artist)),
            track_name: Some(name.to_string()),
            artist_name: Some(artist.to_string()),
        }
    }

    #[test]
    fn test_loyalty_score() {
        let plays = vec![
            play(zoned(2024, 1, 1, 9, 0), 3_600_000, "In", "A"),
            play(zoned(2024, 1, 2, 9, 0), 3_600_000, "Out", "B"),
        ];
        let lists = vec![Playlist { name: "Mix".to_string(), items: vec![item_for(&plays[0])] }];
        let overlap = playlist_stream_overlap(Some(&lists), None, &plays);
        assert_eq!(overlap.loyalty_score, 50.0);
        assert_eq!(overlap.playlist_hours, 1.0);
        assert_eq!(overlap.most_played_playlists[0].streamed_tracks, 1);
        assert!(overlap.discover_weekly_hit_rate.is_none());
    }

    #[test]
    fn test_dead_playlist_detection() {
        let plays = vec![play(zoned(2024, 1, 1, 9, 0), 3_600_000, "Hit", "A")];
        let mut dead_items: Vec<PlaylistItem> =
            (0..10).map(|i| named_item(&format!("quiet{}", i), "Z")).collect();
        let live_items = vec![item_for(&plays[0])];
        let lists = vec![
            Playlist { name: "Dust".to_string(), items: dead_items.clone() },
            Playlist { name: "Live".to_string(), items: live_items },
        ];
        let overlap = playlist_stream_overlap(Some(&lists), None, &plays);
        assert_eq!(overlap.dead_playlists.len(), 1);
        assert_eq!(overlap.dead_playlists[0].name, "Dust");

        // One streamed track in ten is 10%, not under it: no longer dead.
        dead_items[0] = item_for(&plays[0]);
        let lists = vec![Playlist { name: "Dust".to_string(), items: dead_items }];
        let overlap = playlist_stream_overlap(Some(&lists), None, &plays);
        assert!(overlap.dead_playlists.is_empty());
    }

    #[test]
    fn test_discover_weekly_and_fold_fallback() {
        // The playlist item has a different URI than the play; the
        // case-folded identity still matches.
        let plays = vec![play(zoned(2024, 1, 1, 9, 0), 3_600_000, "Found", "A")];
        let mut item = named_item("FOUND", "a");
        item.track_uri = Some("spotify:track:different".to_string());
        let lists = vec![Playlist { name: "Discover Weekly".to_string(), items: vec![item] }];
        let overlap = playlist_stream_overlap(Some(&lists), None, &plays);
        let dw = overlap.discover_weekly_hit_rate.unwrap();
        assert_eq!(dw.hit_tracks, 1);
        assert_eq!(dw.hit_rate, 100.0);
    }

    #[test]
    fn test_absent_sources_default() {
        let plays = vec![play(zoned(2024, 1, 1, 9, 0), 3_600_000, "t", "A")];
        let overlap = playlist_stream_overlap(None, None, &plays);
        assert_eq!(overlap.loyalty_score, 0.0);
        assert!(overlap.most_played_playlists.is_empty());
    }
}
