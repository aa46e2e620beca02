//! Top-N rankings and discovery series over music plays.

use crate::aggregate::{round1, round2, sum_by, top_n};
use crate::events::{self, PlayEvent};
use crate::report::models::{
    ArtistsOverTime, NewArtistDiscovery, TopAlbum, TopArtist, TopPodcast, TopTrack,
};
use std::collections::{BTreeMap, BTreeSet};

const TOP_LIMIT: usize = 20;

fn music(plays: &[PlayEvent]) -> impl Iterator<Item = &PlayEvent> {
    plays.iter().filter(|p| p.is_music())
}

pub fn top_artists(plays: &[PlayEvent]) -> Vec<TopArtist> {
    let sums = sum_by(
        music(plays).filter(|p| p.artist_name.is_some()),
        |p| p.artist_name.clone().unwrap_or_default(),
        |p| p.hours(),
    );
    top_n(&sums, TOP_LIMIT)
        .into_iter()
        .map(|(name, hours)| TopArtist { name, hours: round1(hours) })
        .collect()
}

pub fn top_tracks(plays: &[PlayEvent]) -> Vec<TopTrack> {
    let sums = sum_by(
        music(plays).filter(|p| p.track_name.is_some()),
        |p| {
            (
                p.track_name.clone().unwrap_or_default(),
                p.artist_name.clone().unwrap_or_default(),
            )
        },
        |p| p.hours(),
    );
    top_n(&sums, TOP_LIMIT)
        .into_iter()
        .map(|((name, artist), hours)| TopTrack { name, artist, hours: round1(hours) })
        .collect()
}

pub fn top_albums(plays: &[PlayEvent]) -> Vec<TopAlbum> {
    let sums = sum_by(
        music(plays).filter(|p| p.album_name.is_some()),
        |p| {
            (
                p.album_name.clone().unwrap_or_default(),
                p.artist_name.clone().unwrap_or_default(),
            )
        },
        |p| p.hours(),
    );
    top_n(&sums, TOP_LIMIT)
        .into_iter()
        .map(|((name, artist), hours)| TopAlbum { name, artist, hours: round1(hours) })
        .collect()
}

/// Monthly hours for the ten most-played artists, over the sorted union
/// of months in which any of them was played.
pub fn artists_over_time(plays: &[PlayEvent]) -> ArtistsOverTime {
    let leaders: Vec<String> = top_artists(plays).into_iter().take(10).map(|a| a.name).collect();
    let leader_set: BTreeSet<&String> = leaders.iter().collect();

    let sums = sum_by(
        music(plays).filter(|p| p.artist_name.as_ref().is_some_and(|a| leader_set.contains(a))),
        |p| {
            (
                events::month_key(&p.ts),
                p.artist_name.clone().unwrap_or_default(),
            )
        },
        |p| p.hours(),
    );

    let months: Vec<String> = sums
        .keys()
        .map(|(month, _)| month.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let mut artists = BTreeMap::new();
    for name in leaders {
        let series: Vec<f64> = months
            .iter()
            .map(|m| round2(sums.get(&(m.clone(), name.clone())).copied().unwrap_or(0.0)))
            .collect();
        artists.insert(name, series);
    }
    ArtistsOverTime { months, artists }
}

pub fn top_podcasts(plays: &[PlayEvent]) -> Vec<TopPodcast> {
    let sums = sum_by(
        plays
            .iter()
            .filter(|p| p.content_kind == crate::events::ContentKind::Podcast)
            .filter(|p| p.show_name.is_some()),
        |p| p.show_name.clone().unwrap_or_default(),
        |p| p.hours(),
    );
    top_n(&sums, 10)
        .into_iter()
        .map(|(name, hours)| TopPodcast { name, hours: round1(hours) })
        .collect()
}

/// Count of artists first heard in each month. Relies on the play table
/// being timestamp-sorted so the first encounter wins.
pub fn new_artist_discovery(plays: &[PlayEvent]) -> Vec<NewArtistDiscovery> {
    let mut seen: BTreeSet<&String> = BTreeSet::new();
    let mut by_month: BTreeMap<String, u64> = BTreeMap::new();
    for play in music(plays) {
        if let Some(artist) = &play.artist_name {
            if seen.insert(artist) {
                *by_month.entry(events::month_key(&play.ts)).or_insert(0) += 1;
            }
        }
    }
    by_month
        .into_iter()
        .map(|(month, new_artists)| NewArtistDiscovery { month, new_artists })
        .collect()
}
