//! Canonical event model
//!
//! Every source family is normalized into one of these fixed event schemas
//! at the ingestion boundary; downstream code never re-checks field
//! presence on raw records.

use chrono::{DateTime, Datelike, NaiveDate, Timelike};
use chrono_tz::Tz;

/// Timestamp in the report's civil time zone. All cross-source comparisons
/// happen on this type; raw UTC strings never leave the normalizer.
pub type ZonedTime = DateTime<Tz>;

pub const MS_PER_HOUR: f64 = 3_600_000.0;

/// Case-fold a (title, artist) pair into the fallback identity key used
/// when an opaque URI is absent on one side of a match.
pub fn fold_key(title: &str, artist: &str) -> String {
    format!("{}\u{1f}{}", title.trim().to_lowercase(), artist.trim().to_lowercase())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ContentKind {
    Music,
    Podcast,
    Audiobook,
    Other,
}

/// A single playback of a piece of content. Immutable once normalized.
#[derive(Debug, Clone)]
pub struct PlayEvent {
    pub ts: ZonedTime,
    pub ms_played: i64,
    pub track_uri: Option<String>,
    pub track_name: Option<String>,
    pub artist_name: Option<String>,
    pub album_name: Option<String>,
    /// Podcast show name, when the play is an episode.
    pub show_name: Option<String>,
    pub content_kind: ContentKind,
    pub platform: String,
    pub country: String,
    pub offline: bool,
    pub skipped: bool,
    pub shuffle: bool,
    pub reason_start: String,
    pub reason_end: String,
}

impl PlayEvent {
    pub fn hours(&self) -> f64 {
        self.ms_played as f64 / MS_PER_HOUR
    }

    pub fn is_music(&self) -> bool {
        self.content_kind == ContentKind::Music
    }

    pub fn date(&self) -> NaiveDate {
        self.ts.date_naive()
    }
}

#[derive(Debug, Clone)]
pub struct SearchEvent {
    pub ts: ZonedTime,
    pub query: String,
    pub platform: String,
    pub interaction_uris: Vec<String>,
}

impl SearchEvent {
    /// A search that led to at least one interaction.
    pub fn is_meaningful(&self) -> bool {
        self.interaction_uris.iter().any(|u| !u.is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    Add,
    Remove,
}

/// A playlist item added or removed, from the technical log.
#[derive(Debug, Clone)]
pub struct PlaylistMutationEvent {
    pub ts: ZonedTime,
    pub playlist_uri: String,
    pub track_uri: String,
    pub track_name: Option<String>,
    pub artist_name: Option<String>,
    pub kind: MutationKind,
    /// Derived from the presence of a client-platform field on the record.
    pub user_attributed: bool,
    pub item_kind: String,
}

/// Playlist snapshot item. Identity of the parent playlist is its name;
/// name collisions stay distinct entries in encounter order.
#[derive(Debug, Clone)]
pub struct PlaylistItem {
    pub added_at: Option<ZonedTime>,
    pub track_uri: Option<String>,
    pub track_name: Option<String>,
    pub artist_name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Playlist {
    pub name: String,
    pub items: Vec<PlaylistItem>,
}

#[derive(Debug, Clone)]
pub struct LibraryTrack {
    pub uri: String,
    pub track: String,
    pub artist: String,
}

/// Point-in-time saved-track collection, not time-series.
#[derive(Debug, Clone, Default)]
pub struct LibrarySnapshot {
    pub tracks: Vec<LibraryTrack>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEdge {
    Begin,
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Received,
    Interacted,
}

/// Family-specific payload of a technical-log event.
#[derive(Debug, Clone)]
pub enum TechnicalPayload {
    Error {
        fatal: bool,
        track_uri: Option<String>,
    },
    Stutter {
        count: u32,
    },
    Download {
        track_uri: Option<String>,
    },
    SocialSession {
        session_id: String,
        edge: SessionEdge,
    },
    Share {
        destination: String,
        entity_uri: Option<String>,
        entity_name: Option<String>,
        entity_artist: Option<String>,
    },
    Notification {
        campaign_id: String,
        kind: NotificationKind,
    },
    ApiRequest {
        endpoint: String,
        operation: String,
        latency_ms: f64,
        status_code: u16,
    },
    CoreStream {
        bitrate: String,
        device_model: String,
        app_version: String,
        os_version: String,
    },
}

#[derive(Debug, Clone)]
pub struct TechnicalEvent {
    pub ts: ZonedTime,
    pub payload: TechnicalPayload,
}

/// Bounded interval reconstructed from a begin/end event pair.
#[derive(Debug, Clone, Copy)]
pub struct SessionInterval {
    pub start: ZonedTime,
    pub end: ZonedTime,
}

impl SessionInterval {
    pub fn duration_minutes(&self) -> f64 {
        (self.end - self.start).num_seconds() as f64 / 60.0
    }
}

/// Weekday labels in output order.
pub const DOW_NAMES: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

/// Calendar day key, `YYYY-MM-DD`.
pub fn day_key(ts: &ZonedTime) -> String {
    ts.format("%Y-%m-%d").to_string()
}

/// Calendar month key, `YYYY-MM`.
pub fn month_key(ts: &ZonedTime) -> String {
    ts.format("%Y-%m").to_string()
}

/// ISO week key: the week's Monday as `YYYY-MM-DD`.
pub fn week_key(ts: &ZonedTime) -> String {
    let date = ts.date_naive();
    let monday = date - chrono::Duration::days(date.weekday().num_days_from_monday() as i64);
    monday.format("%Y-%m-%d").to_string()
}

pub fn year_of(ts: &ZonedTime) -> i32 {
    ts.year()
}

pub fn hour_of(ts: &ZonedTime) -> u32 {
    ts.hour()
}

/// 0 = Monday .. 6 = Sunday.
pub fn weekday_index(ts: &ZonedTime) -> usize {
    ts.weekday().num_days_from_monday() as usize
}
