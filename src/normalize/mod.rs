//! Event normalizer
//!
//! Converts raw source records into the canonical event model, in one
//! validated pass. Rules:
//! - a record whose timestamp cannot be parsed is dropped;
//! - a record missing a required identity field is dropped;
//! - numeric coercion failures become zero, the record is kept;
//! - per-source parsed/dropped counts are kept for diagnostics only.
//!
//! All timestamps are interpreted as UTC (after stripping the known
//! bracketed suffix marker some exports append) and converted to the
//! configured report zone before anything downstream compares them.

use crate::events::{
    ContentKind, LibrarySnapshot, LibraryTrack, MutationKind, NotificationKind, PlayEvent,
    Playlist, PlaylistItem, PlaylistMutationEvent, SearchEvent, SessionEdge, TechnicalEvent,
    TechnicalPayload, ZonedTime,
};
use crate::sources::{RawExport, RawWrappedDocument, TechnicalFamily};
use chrono::{DateTime, NaiveDateTime, Utc};
use chrono_tz::Tz;
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::info;

lazy_static! {
    /// Trailing `[UTC]`-style zone markers that are not valid ISO-8601.
    static ref TS_SUFFIX: Regex = Regex::new(r"\s*\[[A-Za-z0-9_/+-]+\]\s*$").unwrap();
}

/// Parse an ISO-8601-like timestamp as UTC. Accepts RFC 3339 with `Z` or
/// an explicit offset, and bare `YYYY-MM-DD[T ]HH:MM:SS[.fff]`.
pub fn parse_utc(raw: &str) -> Option<DateTime<Utc>> {
    let cleaned = TS_SUFFIX.replace(raw.trim(), "");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(cleaned) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(cleaned, fmt) {
            return Some(naive.and_utc());
        }
    }
    None
}

fn parse_zoned(raw: &str, zone: Tz) -> Option<ZonedTime> {
    parse_utc(raw).map(|dt| dt.with_timezone(&zone))
}

fn coerce_i64(value: Option<&Value>) -> i64 {
    match value {
        Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)).unwrap_or(0),
        Some(Value::String(s)) => s.trim().parse::<i64>().unwrap_or(0),
        _ => 0,
    }
}

fn coerce_f64(value: Option<&Value>) -> f64 {
    match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    }
}

fn coerce_bool(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_i64().unwrap_or(0) != 0,
        Some(Value::String(s)) => matches!(s.to_ascii_lowercase().as_str(), "true" | "1"),
        _ => false,
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

fn or_unknown(value: Option<String>) -> String {
    non_empty(value).unwrap_or_else(|| "unknown".to_string())
}

/// Running parsed/dropped counts per source family. Informational only;
/// never fatal.
#[derive(Debug, Default)]
pub struct SourceDiagnostics {
    counts: BTreeMap<&'static str, (u64, u64)>,
}

impl SourceDiagnostics {
    fn parsed(&mut self, source: &'static str) {
        self.counts.entry(source).or_insert((0, 0)).0 += 1;
    }

    fn dropped(&mut self, source: &'static str) {
        self.counts.entry(source).or_insert((0, 0)).1 += 1;
    }

    pub fn parsed_count(&self, source: &str) -> u64 {
        self.counts.get(source).map(|c| c.0).unwrap_or(0)
    }

    pub fn dropped_count(&self, source: &str) -> u64 {
        self.counts.get(source).map(|c| c.1).unwrap_or(0)
    }

    pub fn log_summary(&self) {
        for (source, (parsed, dropped)) in &self.counts {
            info!("Normalized {}: {} parsed, {} dropped", source, parsed, dropped);
        }
    }
}

/// The shared, read-only event tables every metric reads.
#[derive(Debug, Default)]
pub struct EventTables {
    pub plays: Vec<PlayEvent>,
    pub searches: Option<Vec<SearchEvent>>,
    pub playlist_mutations: Vec<PlaylistMutationEvent>,
    pub technical: Vec<TechnicalEvent>,
    pub playlists: Option<Vec<Playlist>>,
    pub library: Option<LibrarySnapshot>,
    pub wrapped: Option<RawWrappedDocument>,
    pub diagnostics: SourceDiagnostics,
}

pub fn normalize_export(raw: RawExport, zone: Tz) -> EventTables {
    let mut diag = SourceDiagnostics::default();

    let mut plays: Vec<PlayEvent> = Vec::with_capacity(raw.plays.len());
    for record in raw.plays {
        let Some(ts) = record.ts.as_deref().and_then(|s| parse_zoned(s, zone)) else {
            diag.dropped("plays");
            continue;
        };
        let track_name = non_empty(record.master_metadata_track_name);
        let episode_name = non_empty(record.episode_name);
        let audiobook_title = non_empty(record.audiobook_title);
        // First-match precedence: track -> music, episode -> podcast,
        // audiobook -> audiobook, else other.
        let content_kind = if track_name.is_some() {
            ContentKind::Music
        } else if episode_name.is_some() {
            ContentKind::Podcast
        } else if audiobook_title.is_some() {
            ContentKind::Audiobook
        } else {
            ContentKind::Other
        };
        plays.push(PlayEvent {
            ts,
            ms_played: coerce_i64(record.ms_played.as_ref()),
            track_uri: non_empty(record.spotify_track_uri),
            track_name,
            artist_name: non_empty(record.master_metadata_album_artist_name),
            album_name: non_empty(record.master_metadata_album_album_name),
            show_name: non_empty(record.episode_show_name),
            content_kind,
            platform: or_unknown(record.platform),
            country: or_unknown(record.conn_country),
            offline: coerce_bool(record.offline.as_ref()),
            skipped: coerce_bool(record.skipped.as_ref()),
            shuffle: coerce_bool(record.shuffle.as_ref()),
            reason_start: or_unknown(record.reason_start),
            reason_end: or_unknown(record.reason_end),
        });
        diag.parsed("plays");
    }
    plays.sort_by_key(|p| p.ts);

    let searches = raw.searches.map(|records| {
        let mut searches: Vec<SearchEvent> = Vec::new();
        for record in records {
            let Some(ts) = record.search_time.as_deref().and_then(|s| parse_zoned(s, zone)) else {
                diag.dropped("searches");
                continue;
            };
            let Some(query) = non_empty(record.search_query) else {
                diag.dropped("searches");
                continue;
            };
            searches.push(SearchEvent {
                ts,
                query,
                platform: or_unknown(record.platform),
                interaction_uris: record
                    .search_interaction_uris
                    .into_iter()
                    .filter(|u| !u.trim().is_empty())
                    .collect(),
            });
            diag.parsed("searches");
        }
        searches.sort_by_key(|s| s.ts);
        searches
    });

    let playlists = raw.playlists.map(|lists| {
        lists
            .into_iter()
            .map(|list| Playlist {
                name: or_unknown(list.name),
                items: list
                    .items
                    .into_iter()
                    .map(|item| {
                        let track = item.track.unwrap_or(crate::sources::RawPlaylistTrack {
                            track_name: None,
                            artist_name: None,
                            album_name: None,
                            track_uri: None,
                        });
                        PlaylistItem {
                            added_at: item.added_date.as_deref().and_then(|s| parse_zoned(s, zone)),
                            track_uri: non_empty(track.track_uri),
                            track_name: non_empty(track.track_name),
                            artist_name: non_empty(track.artist_name),
                        }
                    })
                    .collect(),
            })
            .collect::<Vec<_>>()
    });

    let library = raw.library.map(|doc| LibrarySnapshot {
        tracks: doc
            .tracks
            .into_iter()
            .filter_map(|t| {
                let uri = non_empty(t.uri)?;
                Some(LibraryTrack {
                    uri,
                    track: non_empty(t.track).unwrap_or_default(),
                    artist: non_empty(t.artist).unwrap_or_default(),
                })
            })
            .collect(),
    });

    let mut playlist_mutations: Vec<PlaylistMutationEvent> = Vec::new();
    let mut technical: Vec<TechnicalEvent> = Vec::new();
    for (family, records) in raw.technical {
        let source = family.stem();
        for record in records {
            let Some(ts) = record.timestamp_utc.as_deref().and_then(|s| parse_zoned(s, zone))
            else {
                diag.dropped(source);
                continue;
            };
            match family {
                TechnicalFamily::PlaylistItems => {
                    let Some(track_uri) = non_empty(record.track_uri) else {
                        diag.dropped(source);
                        continue;
                    };
                    let kind = match record.operation.as_deref().map(str::to_ascii_lowercase) {
                        Some(ref op) if op == "add" => MutationKind::Add,
                        Some(ref op) if op == "remove" => MutationKind::Remove,
                        _ => {
                            diag.dropped(source);
                            continue;
                        }
                    };
                    playlist_mutations.push(PlaylistMutationEvent {
                        ts,
                        playlist_uri: or_unknown(record.playlist_uri),
                        track_uri,
                        track_name: non_empty(record.track_name),
                        artist_name: non_empty(record.artist_name),
                        kind,
                        user_attributed: non_empty(record.client_platform).is_some(),
                        item_kind: non_empty(record.item_kind)
                            .unwrap_or_else(|| "track".to_string()),
                    });
                    diag.parsed(source);
                }
                TechnicalFamily::PlaybackErrors => {
                    technical.push(TechnicalEvent {
                        ts,
                        payload: TechnicalPayload::Error {
                            fatal: coerce_bool(record.fatal.as_ref()),
                            track_uri: non_empty(record.track_uri),
                        },
                    });
                    diag.parsed(source);
                }
                TechnicalFamily::AudioStutters => {
                    // A stutter record denotes at least one stutter.
                    let count = match record.count.as_ref() {
                        Some(v) => coerce_i64(Some(v)).max(0) as u32,
                        None => 1,
                    };
                    technical.push(TechnicalEvent {
                        ts,
                        payload: TechnicalPayload::Stutter { count: count.max(1) },
                    });
                    diag.parsed(source);
                }
                TechnicalFamily::Downloads => {
                    technical.push(TechnicalEvent {
                        ts,
                        payload: TechnicalPayload::Download {
                            track_uri: non_empty(record.track_uri),
                        },
                    });
                    diag.parsed(source);
                }
                TechnicalFamily::SocialSessions => {
                    let Some(session_id) = non_empty(record.session_id) else {
                        diag.dropped(source);
                        continue;
                    };
                    let edge = match record.kind.as_deref().map(str::to_ascii_lowercase) {
                        Some(ref k) if k == "begin" => SessionEdge::Begin,
                        Some(ref k) if k == "end" => SessionEdge::End,
                        _ => {
                            diag.dropped(source);
                            continue;
                        }
                    };
                    technical.push(TechnicalEvent {
                        ts,
                        payload: TechnicalPayload::SocialSession { session_id, edge },
                    });
                    diag.parsed(source);
                }
                TechnicalFamily::Shares => {
                    technical.push(TechnicalEvent {
                        ts,
                        payload: TechnicalPayload::Share {
                            destination: or_unknown(record.destination),
                            entity_uri: non_empty(record.entity_uri),
                            entity_name: non_empty(record.entity_name),
                            entity_artist: non_empty(record.entity_artist),
                        },
                    });
                    diag.parsed(source);
                }
                TechnicalFamily::PushNotifications => {
                    let kind = match record.kind.as_deref().map(str::to_ascii_lowercase) {
                        Some(ref k) if k == "received" => NotificationKind::Received,
                        Some(ref k) if k == "interacted" => NotificationKind::Interacted,
                        _ => {
                            diag.dropped(source);
                            continue;
                        }
                    };
                    technical.push(TechnicalEvent {
                        ts,
                        payload: TechnicalPayload::Notification {
                            campaign_id: or_unknown(record.campaign_id),
                            kind,
                        },
                    });
                    diag.parsed(source);
                }
                TechnicalFamily::ApiRequests => {
                    technical.push(TechnicalEvent {
                        ts,
                        payload: TechnicalPayload::ApiRequest {
                            endpoint: or_unknown(record.endpoint),
                            operation: or_unknown(record.operation),
                            latency_ms: coerce_f64(record.latency_ms.as_ref()),
                            status_code: coerce_i64(record.status_code.as_ref())
                                .clamp(0, u16::MAX as i64) as u16,
                        },
                    });
                    diag.parsed(source);
                }
                TechnicalFamily::CoreStreams => {
                    technical.push(TechnicalEvent {
                        ts,
                        payload: TechnicalPayload::CoreStream {
                            bitrate: or_unknown(record.bitrate),
                            device_model: or_unknown(record.device_model),
                            app_version: or_unknown(record.app_version),
                            os_version: or_unknown(record.os_version),
                        },
                    });
                    diag.parsed(source);
                }
            }
        }
    }
    playlist_mutations.sort_by_key(|m| m.ts);
    technical.sort_by_key(|t| t.ts);

    EventTables {
        plays,
        searches,
        playlist_mutations,
        technical,
        playlists,
        library,
        wrapped: raw.wrapped,
        diagnostics: diag,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn test_parse_utc_variants() {
        assert!(parse_utc("2024-01-01T12:00:00Z").is_some());
        assert!(parse_utc("2024-01-01T12:00:00.123Z").is_some());
        assert!(parse_utc("2024-01-01T12:00:00+02:00").is_some());
        assert!(parse_utc("2024-01-01 12:00:00").is_some());
        assert!(parse_utc("2024-01-01T12:00:00").is_some());
        assert!(parse_utc("not a timestamp").is_none());
        assert!(parse_utc("").is_none());
    }

    #[test]
    fn test_parse_utc_strips_suffix_marker() {
        let with_marker = parse_utc("2024-01-01T12:00:00Z[UTC]").unwrap();
        let without = parse_utc("2024-01-01T12:00:00Z").unwrap();
        assert_eq!(with_marker, without);
    }

    #[test]
    fn test_zone_conversion() {
        // 2024-01-01T12:00:00Z is 07:00 in New York (EST, UTC-5)
        let ts = parse_zoned("2024-01-01T12:00:00Z", chrono_tz::America::New_York).unwrap();
        assert_eq!(ts.hour(), 7);
        // 2024-07-01T12:00:00Z is 08:00 in New York (EDT, UTC-4)
        let summer = parse_zoned("2024-07-01T12:00:00Z", chrono_tz::America::New_York).unwrap();
        assert_eq!(summer.hour(), 8);
    }

    #[test]
    fn test_coercions() {
        assert_eq!(coerce_i64(Some(&serde_json::json!(1500))), 1500);
        assert_eq!(coerce_i64(Some(&serde_json::json!("1500"))), 1500);
        assert_eq!(coerce_i64(Some(&serde_json::json!("garbage"))), 0);
        assert_eq!(coerce_i64(None), 0);
        assert!(coerce_bool(Some(&serde_json::json!(true))));
        assert!(coerce_bool(Some(&serde_json::json!("1"))));
        assert!(!coerce_bool(Some(&serde_json::json!("no"))));
        assert_eq!(coerce_f64(Some(&serde_json::json!(12.5))), 12.5);
    }

    #[test]
    fn test_content_kind_precedence_and_drops() {
        let raw = RawExport {
            plays: vec![
                serde_json::from_str(
                    r#"{"ts": "2024-01-01T12:00:00Z", "ms_played": 1000,
                        "master_metadata_track_name": "Song",
                        "episode_name": "Also set"}"#,
                )
                .unwrap(),
                serde_json::from_str(r#"{"ts": "2024-01-01T13:00:00Z", "episode_name": "Ep"}"#)
                    .unwrap(),
                serde_json::from_str(r#"{"ts": "bogus", "ms_played": 1000}"#).unwrap(),
                serde_json::from_str(r#"{"ts": "2024-01-01T14:00:00Z", "ms_played": "bad"}"#)
                    .unwrap(),
            ],
            ..Default::default()
        };
        let tables = normalize_export(raw, chrono_tz::America::New_York);
        assert_eq!(tables.plays.len(), 3);
        assert_eq!(tables.plays[0].content_kind, ContentKind::Music);
        assert_eq!(tables.plays[1].content_kind, ContentKind::Podcast);
        // Coercion failure keeps the record with zero value.
        assert_eq!(tables.plays[2].ms_played, 0);
        assert_eq!(tables.diagnostics.parsed_count("plays"), 3);
        assert_eq!(tables.diagnostics.dropped_count("plays"), 1);
    }
}
