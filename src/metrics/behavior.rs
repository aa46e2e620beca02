//! Listening-behavior breakdowns: skips, reasons, shuffle, platform,
//! connectivity, country and content-type splits.

use crate::aggregate::{count_by, mean, pct_of_counts, round1, round2, sum_by, top_n};
use crate::events::{self, ContentKind, PlayEvent};
use crate::report::models::{
    ContentTypeSplit, CountryBreakdown, OfflineVsOnline, PlatformBreakdown, ReasonBreakdown,
    ReasonCount, ShuffleOverTime, SkipByArtist, SkipRateOverTime,
};
use std::collections::BTreeMap;

const MIN_PLAYS_FOR_SKIP_RATE: u64 = 20;

/// Skip rate per artist, restricted to artists with a meaningful play
/// volume and ranked by that volume.
pub fn skip_by_artist(plays: &[PlayEvent]) -> Vec<SkipByArtist> {
    let mut totals: BTreeMap<&String, (u64, u64)> = BTreeMap::new();
    for play in plays.iter().filter(|p| p.is_music()) {
        if let Some(artist) = &play.artist_name {
            let entry = totals.entry(artist).or_insert((0, 0));
            entry.0 += 1;
            if play.skipped {
                entry.1 += 1;
            }
        }
    }
    let volumes: BTreeMap<&String, u64> = totals
        .iter()
        .filter(|(_, (total, _))| *total >= MIN_PLAYS_FOR_SKIP_RATE)
        .map(|(artist, (total, _))| (*artist, *total))
        .collect();
    top_n(&volumes, 20)
        .into_iter()
        .map(|(artist, total)| {
            let skipped = totals[artist].1;
            SkipByArtist {
                name: artist.clone(),
                skip_rate: round1(pct_of_counts(skipped, total)),
                plays: total,
            }
        })
        .collect()
}

pub fn skip_rate_over_time(plays: &[PlayEvent]) -> Vec<SkipRateOverTime> {
    let totals = count_by(plays.iter(), |p| events::month_key(&p.ts));
    let skips = count_by(plays.iter().filter(|p| p.skipped), |p| events::month_key(&p.ts));
    totals
        .into_iter()
        .map(|(month, total)| SkipRateOverTime {
            skip_rate: round1(pct_of_counts(skips.get(&month).copied().unwrap_or(0), total)),
            month,
        })
        .collect()
}

pub fn reason_breakdown(plays: &[PlayEvent]) -> ReasonBreakdown {
    let to_sorted = |counts: BTreeMap<String, u64>| -> Vec<ReasonCount> {
        let mut entries: Vec<ReasonCount> = counts
            .into_iter()
            .map(|(reason, count)| ReasonCount { reason, count })
            .collect();
        entries.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.reason.cmp(&b.reason)));
        entries
    };
    ReasonBreakdown {
        start: to_sorted(count_by(plays.iter(), |p| p.reason_start.clone())),
        end: to_sorted(count_by(plays.iter(), |p| p.reason_end.clone())),
    }
}

pub fn shuffle_over_time(plays: &[PlayEvent]) -> Vec<ShuffleOverTime> {
    let totals = count_by(plays.iter(), |p| events::month_key(&p.ts));
    let shuffled = count_by(plays.iter().filter(|p| p.shuffle), |p| events::month_key(&p.ts));
    totals
        .into_iter()
        .map(|(month, total)| ShuffleOverTime {
            shuffle_rate: round1(pct_of_counts(shuffled.get(&month).copied().unwrap_or(0), total)),
            month,
        })
        .collect()
}

pub fn avg_listen_minutes(plays: &[PlayEvent]) -> f64 {
    round2(mean(plays.iter().map(|p| p.ms_played as f64 / 60_000.0)))
}

pub fn platform_breakdown(plays: &[PlayEvent]) -> Vec<PlatformBreakdown> {
    let sums = sum_by(plays.iter(), |p| p.platform.clone(), |p| p.hours());
    top_n(&sums, 10)
        .into_iter()
        .map(|(platform, hours)| PlatformBreakdown { platform, hours: round1(hours) })
        .collect()
}

pub fn offline_vs_online(plays: &[PlayEvent]) -> OfflineVsOnline {
    let offline: f64 = plays.iter().filter(|p| p.offline).map(|p| p.hours()).sum();
    let online: f64 = plays.iter().filter(|p| !p.offline).map(|p| p.hours()).sum();
    OfflineVsOnline {
        offline: round1(offline),
        online: round1(online),
    }
}

pub fn country_breakdown(plays: &[PlayEvent]) -> Vec<CountryBreakdown> {
    let sums = sum_by(plays.iter(), |p| p.country.clone(), |p| p.hours());
    top_n(&sums, 10)
        .into_iter()
        .map(|(country, hours)| CountryBreakdown { country, hours: round1(hours) })
        .collect()
}

/// Monthly hours split across content kinds; every kind is reported for
/// every month, zero-filled.
pub fn content_type_split(plays: &[PlayEvent]) -> Vec<ContentTypeSplit> {
    let sums = sum_by(
        plays.iter(),
        |p| (events::month_key(&p.ts), p.content_kind),
        |p| p.hours(),
    );
    let months: std::collections::BTreeSet<String> =
        sums.keys().map(|(month, _)| month.clone()).collect();
    months
        .into_iter()
        .map(|month| {
            let get = |kind: ContentKind| -> f64 {
                round2(sums.get(&(month.clone(), kind)).copied().unwrap_or(0.0))
            };
            ContentTypeSplit {
                music: get(ContentKind::Music),
                podcast: get(ContentKind::Podcast),
                audiobook: get(ContentKind::Audiobook),
                other: get(ContentKind::Other),
                month,
            }
        })
        .collect()
}
