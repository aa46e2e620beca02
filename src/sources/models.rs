//! Raw record shapes as they appear in the export files.
//!
//! These are the loader's deserialization targets only; everything is
//! optional here and validated once by the normalizer. Fields that need
//! lenient numeric/boolean coercion stay `serde_json::Value`.

use serde::Deserialize;
use serde_json::Value;

/// One row of `Streaming_History_Audio_*.json` / `Streaming_History_Video_*.json`.
#[derive(Debug, Clone, Deserialize)]
pub struct RawPlayRecord {
    pub ts: Option<String>,
    #[serde(default)]
    pub ms_played: Option<Value>,
    pub master_metadata_track_name: Option<String>,
    pub master_metadata_album_artist_name: Option<String>,
    pub master_metadata_album_album_name: Option<String>,
    pub episode_name: Option<String>,
    pub episode_show_name: Option<String>,
    pub audiobook_title: Option<String>,
    pub spotify_track_uri: Option<String>,
    pub platform: Option<String>,
    pub conn_country: Option<String>,
    #[serde(default)]
    pub offline: Option<Value>,
    #[serde(default)]
    pub skipped: Option<Value>,
    #[serde(default)]
    pub shuffle: Option<Value>,
    pub reason_start: Option<String>,
    pub reason_end: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawPlaylistsDocument {
    #[serde(default)]
    pub playlists: Vec<RawPlaylist>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawPlaylist {
    pub name: Option<String>,
    #[serde(default)]
    pub items: Vec<RawPlaylistItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawPlaylistItem {
    pub track: Option<RawPlaylistTrack>,
    #[serde(rename = "addedDate")]
    pub added_date: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawPlaylistTrack {
    #[serde(rename = "trackName")]
    pub track_name: Option<String>,
    #[serde(rename = "artistName")]
    pub artist_name: Option<String>,
    #[serde(rename = "albumName")]
    pub album_name: Option<String>,
    #[serde(rename = "trackUri")]
    pub track_uri: Option<String>,
}

/// One row of `SearchQueries*.json`. `search_time` carries a literal
/// time-zone suffix marker that the normalizer strips.
#[derive(Debug, Clone, Deserialize)]
pub struct RawSearchRecord {
    pub platform: Option<String>,
    #[serde(rename = "searchTime")]
    pub search_time: Option<String>,
    #[serde(rename = "searchQuery")]
    pub search_query: Option<String>,
    #[serde(rename = "searchInteractionURIs", default)]
    pub search_interaction_uris: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawLibraryDocument {
    #[serde(default)]
    pub tracks: Vec<RawLibraryTrack>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawLibraryTrack {
    pub artist: Option<String>,
    pub album: Option<String>,
    pub track: Option<String>,
    pub uri: Option<String>,
}

/// Year-in-review summary document (`Wrapped*.json`).
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawWrappedDocument {
    #[serde(rename = "yearlyMetrics")]
    pub yearly_metrics: Option<RawYearlyMetrics>,
    #[serde(rename = "topArtists", default)]
    pub top_artists: Vec<RawWrappedEntry>,
    #[serde(rename = "topTracks", default)]
    pub top_tracks: Vec<RawWrappedEntry>,
    #[serde(rename = "musicEvolution")]
    pub music_evolution: Option<RawMusicEvolution>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawYearlyMetrics {
    #[serde(rename = "totalHours")]
    pub total_hours: Option<f64>,
    #[serde(rename = "topPercentGlobally")]
    pub top_percent_globally: Option<f64>,
    #[serde(rename = "mostListenedDay")]
    pub most_listened_day: Option<String>,
    #[serde(rename = "mostListenedDayMinutes")]
    pub most_listened_day_minutes: Option<f64>,
    #[serde(rename = "distinctTracks")]
    pub distinct_tracks: Option<u64>,
    #[serde(rename = "uniqueArtists")]
    pub unique_artists: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawWrappedEntry {
    pub name: Option<String>,
    #[serde(rename = "playCount")]
    pub play_count: Option<u64>,
    #[serde(rename = "firstPlayed")]
    pub first_played: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawMusicEvolution {
    #[serde(default)]
    pub eras: Vec<RawEra>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawEra {
    #[serde(rename = "peakMonth")]
    pub peak_month: Option<String>,
    #[serde(rename = "peakMonthIndex")]
    pub peak_month_index: Option<u32>,
    pub genre: Option<String>,
    pub mood: Option<String>,
    pub descriptor: Option<String>,
    pub color: Option<String>,
    #[serde(default)]
    pub tracks: Vec<String>,
}

/// One row of any technical-log family file. The union of all family
/// attributes; the loader tags each batch with its family so the
/// normalizer knows which fields are required.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTechnicalRecord {
    pub timestamp_utc: Option<String>,
    // PlaylistItems
    pub playlist_uri: Option<String>,
    pub track_uri: Option<String>,
    pub track_name: Option<String>,
    pub artist_name: Option<String>,
    pub operation: Option<String>,
    pub item_kind: Option<String>,
    pub client_platform: Option<String>,
    // PlaybackErrors
    #[serde(default)]
    pub fatal: Option<Value>,
    // AudioStutters
    #[serde(default)]
    pub count: Option<Value>,
    // SocialSessions / PushNotifications
    pub session_id: Option<String>,
    pub kind: Option<String>,
    pub campaign_id: Option<String>,
    // Shares
    pub destination: Option<String>,
    pub entity_uri: Option<String>,
    pub entity_name: Option<String>,
    pub entity_artist: Option<String>,
    // ApiRequests
    pub endpoint: Option<String>,
    #[serde(default)]
    pub latency_ms: Option<Value>,
    #[serde(default)]
    pub status_code: Option<Value>,
    // CoreStreams
    pub bitrate: Option<String>,
    pub device_model: Option<String>,
    pub app_version: Option<String>,
    pub os_version: Option<String>,
}

/// Technical-log file families, one per filename stem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TechnicalFamily {
    PlaylistItems,
    PlaybackErrors,
    AudioStutters,
    Downloads,
    SocialSessions,
    Shares,
    PushNotifications,
    ApiRequests,
    CoreStreams,
}

impl TechnicalFamily {
    pub const ALL: [TechnicalFamily; 9] = [
        TechnicalFamily::PlaylistItems,
        TechnicalFamily::PlaybackErrors,
        TechnicalFamily::AudioStutters,
        TechnicalFamily::Downloads,
        TechnicalFamily::SocialSessions,
        TechnicalFamily::Shares,
        TechnicalFamily::PushNotifications,
        TechnicalFamily::ApiRequests,
        TechnicalFamily::CoreStreams,
    ];

    /// Filename stem; files match `<stem>*.json`.
    pub fn stem(&self) -> &'static str {
        match self {
            TechnicalFamily::PlaylistItems => "PlaylistItems",
            TechnicalFamily::PlaybackErrors => "PlaybackErrors",
            TechnicalFamily::AudioStutters => "AudioStutters",
            TechnicalFamily::Downloads => "Downloads",
            TechnicalFamily::SocialSessions => "SocialSessions",
            TechnicalFamily::Shares => "Shares",
            TechnicalFamily::PushNotifications => "PushNotifications",
            TechnicalFamily::ApiRequests => "ApiRequests",
            TechnicalFamily::CoreStreams => "CoreStreams",
        }
    }
}
