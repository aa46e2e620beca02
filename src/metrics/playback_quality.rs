//! Playback quality and reliability from the technical log: bitrates,
//! errors, stutters, downloads and error-tolerance classification.

use crate::aggregate::{count_by, pct_of_counts, round1, sum_by};
use crate::correlate::{any_within, Window};
use crate::events::{self, PlayEvent, TechnicalEvent, TechnicalPayload};
use crate::metrics::uri_key;
use crate::report::models::{
    BitrateEntry, DownloadWeek, ErrorWeek, PlaybackQuality, StutterWeek,
};
use crate::timeline::TemporalIndex;
use chrono::Duration;

const RETRY_WINDOW_MINUTES: i64 = 10;

pub fn playback_quality(
    technical: &[TechnicalEvent],
    play_index: &TemporalIndex<'_, PlayEvent>,
) -> PlaybackQuality {
    let errors: Vec<(&TechnicalEvent, bool, Option<&str>)> = technical
        .iter()
        .filter_map(|e| match &e.payload {
            TechnicalPayload::Error { fatal, track_uri } => {
                Some((e, *fatal, track_uri.as_deref()))
            }
            _ => None,
        })
        .collect();
    let stutters: Vec<(&TechnicalEvent, u32)> = technical
        .iter()
        .filter_map(|e| match &e.payload {
            TechnicalPayload::Stutter { count } => Some((e, *count)),
            _ => None,
        })
        .collect();
    let downloads: Vec<&TechnicalEvent> = technical
        .iter()
        .filter(|e| matches!(e.payload, TechnicalPayload::Download { .. }))
        .collect();

    let bitrates = count_by(
        technical.iter().filter_map(|e| match &e.payload {
            TechnicalPayload::CoreStream { bitrate, .. } => Some(bitrate),
            _ => None,
        }),
        |b| (*b).clone(),
    );
    let mut bitrate_distribution: Vec<BitrateEntry> = bitrates
        .into_iter()
        .map(|(bitrate, count)| BitrateEntry { bitrate, count })
        .collect();
    bitrate_distribution
        .sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.bitrate.cmp(&b.bitrate)));

    let weekly_errors = count_by(errors.iter(), |(e, _, _)| events::week_key(&e.ts));
    let weekly_fatal =
        count_by(errors.iter().filter(|(_, fatal, _)| *fatal), |(e, _, _)| {
            events::week_key(&e.ts)
        });
    let error_over_time: Vec<ErrorWeek> = weekly_errors
        .iter()
        .map(|(week, total)| ErrorWeek {
            week: week.clone(),
            total: *total,
            fatal: weekly_fatal.get(week).copied().unwrap_or(0),
        })
        .collect();

    let weekly_stutters = sum_by(
        stutters.iter(),
        |(e, _)| events::week_key(&e.ts),
        |(_, count)| *count as f64,
    );
    let stutter_timeline: Vec<StutterWeek> = weekly_stutters
        .iter()
        .map(|(week, count)| StutterWeek { week: week.clone(), count: *count as u64 })
        .collect();
    let total_stutters: u64 = stutters.iter().map(|(_, c)| *c as u64).sum();

    let download_over_time: Vec<DownloadWeek> =
        count_by(downloads.iter(), |e| events::week_key(&e.ts))
            .into_iter()
            .map(|(week, downloads)| DownloadWeek { week, downloads })
            .collect();

    // Error tolerance: a retry is the same track streamed within the
    // window after the error; anything else, including errors with no
    // track identity, counts as a skip.
    let retry_window = Window::forward(Duration::minutes(RETRY_WINDOW_MINUTES));
    let mut retries = 0u64;
    let mut skips = 0u64;
    for (event, _, track_uri) in &errors {
        let retried = match track_uri {
            Some(uri) => any_within(play_index, &[uri_key(uri)], event.ts, retry_window),
            None => false,
        };
        if retried {
            retries += 1;
        } else {
            skips += 1;
        }
    }

    PlaybackQuality {
        bitrate_distribution,
        total_errors: errors.len() as u64,
        fatal_errors: errors.iter().filter(|(_, fatal, _)| *fatal).count() as u64,
        error_over_time,
        total_stutters,
        stutter_timeline,
        error_tolerance_retry_pct: round1(pct_of_counts(retries, retries + skips)),
        error_tolerance_retries: retries,
        error_tolerance_skips: skips,
        download_over_time,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::build_play_index;
    use crate::metrics::test_util::{play, zoned};
    use crate::events::ZonedTime;

    fn error(ts: ZonedTime, fatal: bool, uri: Option<&str>) -> TechnicalEvent {
        TechnicalEvent {
            ts,
            payload: TechnicalPayload::Error {
                fatal,
                track_uri: uri.map(str::to_string),
            },
        }
    }

    #[test]
    fn test_error_retry_vs_skip() {
        let plays = vec![
            play(zoned(2024, 1, 1, 12, 5), 600_000, "song", "Artist"),
            play(zoned(2024, 1, 2, 12, 30), 600_000, "other", "Artist"),
        ];
        let uri = plays[0].track_uri.clone().unwrap();
        let other_uri = plays[1].track_uri.clone().unwrap();
        let index = build_play_index(&plays);
        let technical = vec![
            // Same track streamed 5 minutes later: a retry.
            error(zoned(2024, 1, 1, 12, 0), false, Some(&uri)),
            // Same track but outside the 10-minute window: a skip.
            error(zoned(2024, 1, 2, 12, 0), true, Some(&other_uri)),
            // No track identity: an unresolved skip.
            error(zoned(2024, 1, 3, 12, 0), false, None),
        ];
        let quality = playback_quality(&technical, &index);
        assert_eq!(quality.error_tolerance_retries, 1);
        assert_eq!(quality.error_tolerance_skips, 2);
        assert!((quality.error_tolerance_retry_pct - 33.3).abs() < 0.01);
        assert_eq!(quality.total_errors, 3);
        assert_eq!(quality.fatal_errors, 1);
    }

    #[test]
    fn test_stutter_and_bitrate_aggregation() {
        let technical = vec![
            TechnicalEvent {
                ts: zoned(2024, 1, 1, 12, 0),
                payload: TechnicalPayload::Stutter { count: 3 },
            },
            TechnicalEvent {
                ts: zoned(2024, 1, 2, 12, 0),
                payload: TechnicalPayload::Stutter { count: 2 },
            },
            TechnicalEvent {
                ts: zoned(2024, 1, 1, 13, 0),
                payload: TechnicalPayload::CoreStream {
                    bitrate: "320".to_string(),
                    device_model: "m".to_string(),
                    app_version: "1".to_string(),
                    os_version: "14".to_string(),
                },
            },
        ];
        let plays: Vec<PlayEvent> = vec![];
        let index = build_play_index(&plays);
        let quality = playback_quality(&technical, &index);
        assert_eq!(quality.total_stutters, 5);
        // Both stutters land in the same ISO week.
        assert_eq!(quality.stutter_timeline.len(), 1);
        assert_eq!(quality.stutter_timeline[0].count, 5);
        assert_eq!(quality.bitrate_distribution[0].bitrate, "320");
    }

    #[test]
    fn test_empty_technical_defaults() {
        let plays: Vec<PlayEvent> = vec![];
        let index = build_play_index(&plays);
        let quality = playback_quality(&[], &index);
        assert_eq!(quality.total_errors, 0);
        assert_eq!(quality.error_tolerance_retry_pct, 0.0);
        assert!(quality.download_over_time.is_empty());
    }
}
