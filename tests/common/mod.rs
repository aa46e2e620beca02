//! Shared fixtures for the end-to-end pipeline tests: a synthetic
//! export directory built file by file in a temp dir.

use serde_json::{json, Value};
use std::path::Path;
use tempfile::TempDir;

pub struct TestExport {
    pub dir: TempDir,
}

impl TestExport {
    pub fn new() -> Self {
        Self { dir: TempDir::new().expect("create temp export dir") }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn write(&self, name: &str, value: &Value) -> &Self {
        std::fs::write(self.path().join(name), serde_json::to_string(value).unwrap())
            .expect("write export file");
        self
    }
}

/// A music play record in the canonical export schema.
pub fn play_record(ts: &str, ms_played: i64, track: &str, artist: &str) -> Value {
    json!({
        "ts": ts,
        "ms_played": ms_played,
        "master_metadata_track_name": track,
        "master_metadata_album_artist_name": artist,
        "master_metadata_album_album_name": format!("{} LP", artist),
        "spotify_track_uri": track_uri(track, artist),
        "platform": "android",
        "conn_country": "US",
        "offline": false,
        "skipped": false,
        "shuffle": false,
        "reason_start": "clickrow",
        "reason_end": "trackdone"
    })
}

pub fn track_uri(track: &str, artist: &str) -> String {
    format!("spotify:track:{}-{}", track.to_lowercase(), artist.to_lowercase())
}

pub fn search_record(time_with_marker: &str, query: &str, uris: &[&str]) -> Value {
    json!({
        "platform": "ANDROID",
        "searchTime": time_with_marker,
        "searchQuery": query,
        "searchInteractionURIs": uris
    })
}

pub fn playlist_item_record(ts: &str, playlist: &str, track: &str, artist: &str, op: &str) -> Value {
    json!({
        "timestampUtc": ts,
        "playlistUri": format!("spotify:playlist:{}", playlist),
        "trackUri": track_uri(track, artist),
        "trackName": track,
        "artistName": artist,
        "operation": op,
        "itemKind": "track",
        "clientPlatform": "android"
    })
}

/// Run the whole pipeline against the export directory and return the
/// serialized document.
pub fn run_pipeline(export: &TestExport) -> String {
    let raw = listening_stats::load_export(export.path()).expect("load export");
    let tables = listening_stats::normalize_export(raw, chrono_tz::America::New_York);
    let stats = listening_stats::assemble(&tables);
    serde_json::to_string(&stats).expect("serialize stats")
}

pub fn run_pipeline_value(export: &TestExport) -> Value {
    serde_json::from_str(&run_pipeline(export)).unwrap()
}
