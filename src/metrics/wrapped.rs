//! Year-in-review spotlight: a passthrough normalization of the
//! export's own summary document.

use crate::report::models::{WrappedEra, WrappedSpotlight};
use crate::sources::RawWrappedDocument;

pub fn wrapped_spotlight(doc: Option<&RawWrappedDocument>) -> WrappedSpotlight {
    let Some(doc) = doc else {
        return WrappedSpotlight::default();
    };

    let metrics = doc.yearly_metrics.clone().unwrap_or_default();
    let top_track = doc.top_tracks.first();

    let eras = doc
        .music_evolution
        .as_ref()
        .map(|evolution| {
            evolution
                .eras
                .iter()
                .map(|era| WrappedEra {
                    peak_month: era.peak_month.clone().unwrap_or_default(),
                    peak_month_index: era.peak_month_index.unwrap_or(0),
                    genre: era.genre.clone().unwrap_or_default(),
                    mood: era.mood.clone().unwrap_or_default(),
                    descriptor: era.descriptor.clone().unwrap_or_default(),
                    color: era.color.clone().unwrap_or_default(),
                    tracks: era.tracks.clone(),
                })
                .collect()
        })
        .unwrap_or_default();

    WrappedSpotlight {
        total_hours: metrics.total_hours.unwrap_or(0.0),
        top_percent_globally: metrics.top_percent_globally.unwrap_or(0.0),
        most_listened_day: metrics.most_listened_day.unwrap_or_default(),
        most_listened_day_minutes: metrics.most_listened_day_minutes.unwrap_or(0.0),
        distinct_tracks: metrics.distinct_tracks.unwrap_or(0),
        unique_artists: metrics.unique_artists.unwrap_or(0),
        top_track_play_count: top_track.and_then(|t| t.play_count).unwrap_or(0),
        top_track_first_played: top_track
            .and_then(|t| t.first_played.clone())
            .unwrap_or_default(),
        eras,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_document_yields_default() {
        let spotlight = wrapped_spotlight(None);
        assert_eq!(spotlight.total_hours, 0.0);
        assert!(spotlight.eras.is_empty());
    }

    #[test]
    fn test_passthrough_normalization() {
        let doc: RawWrappedDocument = serde_json::from_str(
            r##"{
                "yearlyMetrics": {
                    "totalHours": 812.4,
                    "topPercentGlobally": 2.0,
                    "mostListenedDay": "2024-07-12",
                    "mostListenedDayMinutes": 402,
                    "distinctTracks": 1650,
                    "uniqueArtists": 540
                },
                "topTracks": [{"name": "One", "playCount": 112, "firstPlayed": "2024-02-03"}],
                "musicEvolution": {
                    "eras": [{
                        "peakMonth": "July",
                        "peakMonthIndex": 6,
                        "genre": "shoegaze",
                        "mood": "hazy",
                        "descriptor": "wall of sound",
                        "color": "#aa88ff",
                        "tracks": ["One", "Two"]
                    }]
                }
            }"##,
        )
        .unwrap();
        let spotlight = wrapped_spotlight(Some(&doc));
        assert_eq!(spotlight.total_hours, 812.4);
        assert_eq!(spotlight.top_track_play_count, 112);
        assert_eq!(spotlight.eras.len(), 1);
        assert_eq!(spotlight.eras[0].peak_month_index, 6);
        assert_eq!(spotlight.eras[0].tracks.len(), 2);
    }

    #[test]
    fn test_partial_document_fills_defaults() {
        let doc: RawWrappedDocument = serde_json::from_str(r#"{"topArtists": []}"#).unwrap();
        let spotlight = wrapped_spotlight(Some(&doc));
        assert_eq!(spotlight.most_listened_day, "");
        assert_eq!(spotlight.top_track_play_count, 0);
    }
}
