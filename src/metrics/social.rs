//! Social listening sessions and sharing behavior.

use crate::aggregate::{count_by, round1};
use crate::events::{self, PlayEvent, TechnicalEvent, TechnicalPayload};
use crate::metrics::track_lookup_keys;
use crate::report::models::{
    ShareDestination, ShareMonth, ShareWorthyEntry, SocialSessionEntry, SocialSharing,
};
use crate::sessions::{reconstruct_sessions, SessionStats};
use crate::timeline::TemporalIndex;

pub fn social_sharing(
    technical: &[TechnicalEvent],
    play_index: &TemporalIndex<'_, PlayEvent>,
) -> SocialSharing {
    let edges = technical.iter().filter_map(|e| match &e.payload {
        TechnicalPayload::SocialSession { session_id, edge } => {
            Some((session_id.as_str(), *edge, e.ts))
        }
        _ => None,
    });
    let intervals = reconstruct_sessions(edges);
    let stats = SessionStats::from_intervals(&intervals);
    let sessions: Vec<SocialSessionEntry> = intervals
        .iter()
        .map(|s| SocialSessionEntry {
            start: s.start.to_rfc3339(),
            end: s.end.to_rfc3339(),
            duration_minutes: round1(s.duration_minutes()),
        })
        .collect();

    let shares: Vec<(&TechnicalEvent, &str, Option<&str>, Option<&str>, Option<&str>)> = technical
        .iter()
        .filter_map(|e| match &e.payload {
            TechnicalPayload::Share { destination, entity_uri, entity_name, entity_artist } => {
                Some((
                    e,
                    destination.as_str(),
                    entity_uri.as_deref(),
                    entity_name.as_deref(),
                    entity_artist.as_deref(),
                ))
            }
            _ => None,
        })
        .collect();

    let destination_counts = count_by(shares.iter(), |(_, dest, _, _, _)| dest.to_string());
    let mut share_destinations: Vec<ShareDestination> = destination_counts
        .into_iter()
        .map(|(destination, count)| ShareDestination { destination, count })
        .collect();
    share_destinations
        .sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.destination.cmp(&b.destination)));

    let share_over_time: Vec<ShareMonth> =
        count_by(shares.iter(), |(e, _, _, _, _)| events::month_key(&e.ts))
            .into_iter()
            .map(|(month, count)| ShareMonth { month, count })
            .collect();

    // How well-known a track was before it got shared: plays strictly
    // before the share timestamp.
    let mut share_worthy: Vec<ShareWorthyEntry> = shares
        .iter()
        .filter_map(|(event, _, uri, name, artist)| {
            let keys = track_lookup_keys(*uri, *name, *artist);
            if keys.is_empty() {
                return None;
            }
            let prior = keys
                .iter()
                .map(|key| {
                    let listens = play_index.events_for(key);
                    listens.partition_point(|(ts, _)| *ts < event.ts)
                })
                .find(|n| *n > 0)
                .unwrap_or(0) as u64;
            let display = match (name, artist) {
                (Some(n), a) => (n.to_string(), a.unwrap_or("").to_string()),
                (None, _) => ((*uri)?.to_string(), String::new()),
            };
            Some(ShareWorthyEntry {
                name: display.0,
                artist: display.1,
                prior_plays: prior,
            })
        })
        .collect();
    share_worthy.sort_by(|a, b| {
        b.prior_plays.cmp(&a.prior_plays).then_with(|| a.name.cmp(&b.name))
    });
    share_worthy.truncate(10);

    SocialSharing {
        total_social_sessions: stats.count as u64,
        avg_session_minutes: round1(stats.mean_minutes),
        longest_session_minutes: round1(stats.max_minutes),
        total_social_hours: round1(stats.total_hours),
        sessions,
        total_shares: shares.len() as u64,
        share_destinations,
        share_over_time,
        share_worthy_threshold: share_worthy,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{SessionEdge, ZonedTime};
    use crate::metrics::build_play_index;
    use crate::metrics::test_util::{play, zoned};

    fn session_edge(ts: ZonedTime, id: &str, edge: SessionEdge) -> TechnicalEvent {
        TechnicalEvent {
            ts,
            payload: TechnicalPayload::SocialSession {
                session_id: id.to_string(),
                edge,
            },
        }
    }

    fn share(ts: ZonedTime, dest: &str, name: Option<&str>, artist: Option<&str>) -> TechnicalEvent {
        TechnicalEvent {
            ts,
            payload: TechnicalPayload::Share {
                destination: dest.to_string(),
                entity_uri: None,
                entity_name: name.map(str::to_string),
                entity_artist: artist.map(str::to_string),
            },
        }
    }

    #[test]
    fn test_session_stats() {
        let technical = vec![
            session_edge(zoned(2024, 1, 1, 20, 0), "s1", SessionEdge::Begin),
            session_edge(zoned(2024, 1, 1, 21, 0), "s1", SessionEdge::End),
            session_edge(zoned(2024, 1, 2, 20, 0), "s2", SessionEdge::Begin),
            session_edge(zoned(2024, 1, 2, 20, 30), "s2", SessionEdge::End),
        ];
        let plays: Vec<PlayEvent> = vec![];
        let index = build_play_index(&plays);
        let social = social_sharing(&technical, &index);
        assert_eq!(social.total_social_sessions, 2);
        assert_eq!(social.avg_session_minutes, 45.0);
        assert_eq!(social.longest_session_minutes, 60.0);
        assert_eq!(social.total_social_hours, 1.5);
        assert_eq!(social.sessions.len(), 2);
    }

    #[test]
    fn test_share_worthy_counts_prior_plays_strictly_before() {
        let plays = vec![
            play(zoned(2024, 1, 1, 9, 0), 600_000, "Anthem", "Band"),
            play(zoned(2024, 1, 2, 9, 0), 600_000, "Anthem", "Band"),
            // At the share instant: not a prior play.
            play(zoned(2024, 1, 3, 9, 0), 600_000, "Anthem", "Band"),
        ];
        let index = build_play_index(&plays);
        let technical = vec![share(zoned(2024, 1, 3, 9, 0), "whatsapp", Some("Anthem"), Some("Band"))];
        let social = social_sharing(&technical, &index);
        assert_eq!(social.total_shares, 1);
        assert_eq!(social.share_worthy_threshold[0].prior_plays, 2);
        assert_eq!(social.share_destinations[0].destination, "whatsapp");
    }

    #[test]
    fn test_empty_defaults() {
        let plays: Vec<PlayEvent> = vec![];
        let index = build_play_index(&plays);
        let social = social_sharing(&[], &index);
        assert_eq!(social.total_social_sessions, 0);
        assert_eq!(social.avg_session_minutes, 0.0);
        assert!(social.share_destinations.is_empty());
    }
}
