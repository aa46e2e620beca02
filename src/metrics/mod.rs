//! Metrics catalog
//!
//! Each submodule computes one section of the summary document from the
//! shared normalized tables. Every section function is pure: it reads the
//! read-only tables (plus the shared play index) and returns its own
//! output slot, so sections can run in parallel.

mod api_latency;
mod behavior;
mod curation;
mod device_evolution;
mod library_health;
mod notifications;
mod overview;
mod playback_quality;
mod playlist_insights;
mod playlist_overlap;
mod search_behavior;
mod search_pipeline;
mod social;
mod time_series;
mod top_content;
mod wrapped;

pub use api_latency::api_latency;
pub use behavior::{
    avg_listen_minutes, content_type_split, country_breakdown, offline_vs_online,
    platform_breakdown, reason_breakdown, shuffle_over_time, skip_by_artist, skip_rate_over_time,
};
pub use curation::playlist_curation;
pub use device_evolution::device_evolution;
pub use library_health::library_health;
pub use notifications::push_notifications;
pub use overview::overview;
pub use playback_quality::playback_quality;
pub use playlist_insights::playlist_insights;
pub use playlist_overlap::playlist_stream_overlap;
pub use search_behavior::search_behavior;
pub use search_pipeline::search_listen_pipeline;
pub use social::social_sharing;
pub use time_series::{
    daily_listening, day_of_week, heatmap, hour_of_day, monthly_listening, yearly_listening,
};
pub use top_content::{
    artists_over_time, new_artist_discovery, top_albums, top_artists, top_podcasts, top_tracks,
};
pub use wrapped::wrapped_spotlight;

use crate::correlate::Window;
use crate::events::{fold_key, PlayEvent, ZonedTime};
use crate::timeline::TemporalIndex;

/// Identity keys, namespaced so the opaque URI, the case-folded
/// (title, artist) fallback, and the bare artist name never collide.
pub(crate) fn uri_key(uri: &str) -> String {
    format!("uri:{}", uri)
}

pub(crate) fn title_artist_key(title: &str, artist: &str) -> String {
    format!("fold:{}", fold_key(title, artist))
}

pub(crate) fn artist_key(artist: &str) -> String {
    format!("artist:{}", artist.trim().to_lowercase())
}

/// Keys a play event is reachable under in the shared play index.
pub(crate) fn play_index_keys(play: &PlayEvent) -> Vec<String> {
    let mut keys = Vec::with_capacity(3);
    if let Some(uri) = &play.track_uri {
        keys.push(uri_key(uri));
    }
    if let (Some(title), Some(artist)) = (&play.track_name, &play.artist_name) {
        keys.push(title_artist_key(title, artist));
    }
    if let Some(artist) = &play.artist_name {
        keys.push(artist_key(artist));
    }
    keys
}

pub(crate) fn build_play_index(plays: &[PlayEvent]) -> TemporalIndex<'_, PlayEvent> {
    TemporalIndex::build(plays, play_index_keys, |p| p.ts)
}

/// Candidate lookup keys for a track seen on the other side of a join:
/// primary URI first, then the case-folded fallback.
pub(crate) fn track_lookup_keys(
    uri: Option<&str>,
    title: Option<&str>,
    artist: Option<&str>,
) -> Vec<String> {
    let mut keys = Vec::with_capacity(2);
    if let Some(uri) = uri {
        keys.push(uri_key(uri));
    }
    if let (Some(title), Some(artist)) = (title, artist) {
        keys.push(title_artist_key(title, artist));
    }
    keys
}

/// Whether any play at all (regardless of identity) falls inside the
/// window around `at`. `plays` is the normalizer's timestamp-sorted table.
pub(crate) fn any_play_within(plays: &[PlayEvent], at: ZonedTime, window: Window) -> bool {
    let (start, end) = window.bounds(at);
    let lo = plays.partition_point(|p| p.ts < start);
    plays.get(lo).map(|p| p.ts <= end).unwrap_or(false)
}

pub(crate) fn date_string(ts: &ZonedTime) -> String {
    ts.format("%Y-%m-%d").to_string()
}

/// Fixture builders shared by the metric submodules' tests.
#[cfg(test)]
pub(crate) mod test_util {
    use crate::events::{ContentKind, PlayEvent, ZonedTime};
    use chrono::TimeZone;
    use chrono_tz::America::New_York;

    pub(crate) fn zoned(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> ZonedTime {
        New_York.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    pub(crate) fn play(ts: ZonedTime, ms: i64, track: &str, artist: &str) -> PlayEvent {
        PlayEvent {
            ts,
            ms_played: ms,
            track_uri: Some(format!("spotify:track:{}-{}", track, artist)),
            track_name: Some(track.to_string()),
            artist_name: Some(artist.to_string()),
            album_name: Some(format!("{} album", artist)),
            show_name: None,
            content_kind: ContentKind::Music,
            platform: "android".to_string(),
            country: "US".to_string(),
            offline: false,
            skipped: false,
            shuffle: false,
            reason_start: "clickrow".to_string(),
            reason_end: "trackdone".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_util::{play, zoned};
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_any_play_within_endpoint_inclusive() {
        let plays = vec![play(zoned(2024, 1, 1, 12, 5), 1000, "t", "a")];
        let anchor = zoned(2024, 1, 1, 12, 0);
        assert!(any_play_within(&plays, anchor, Window::forward(Duration::minutes(5))));
        assert!(!any_play_within(&plays, anchor, Window::forward(Duration::minutes(4))));
    }

    #[test]
    fn test_track_lookup_keys_order() {
        let keys = track_lookup_keys(Some("u1"), Some("Song"), Some("Artist"));
        assert_eq!(keys[0], "uri:u1");
        assert_eq!(keys[1], title_artist_key("song", "artist"));
        assert_eq!(track_lookup_keys(None, Some("Song"), None).len(), 0);
    }
}
