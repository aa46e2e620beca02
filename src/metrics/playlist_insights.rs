//! Playlist snapshot insights, with growth series from both the snapshot
//! add dates and the technical mutation stream.

use crate::aggregate::{count_by, round1, round2, top_n};
use crate::events::{self, MutationKind, Playlist, PlaylistMutationEvent};
use crate::report::models::{
    LargestPlaylist, PlaylistBySize, PlaylistDiversity, PlaylistGrowth, PlaylistInsights,
};
use std::collections::BTreeSet;

const MIN_TRACKS_FOR_DIVERSITY: usize = 5;

fn growth_from_mutations(mutations: &[PlaylistMutationEvent], user_only: bool) -> Vec<PlaylistGrowth> {
    count_by(
        mutations
            .iter()
            .filter(|m| m.kind == MutationKind::Add)
            .filter(|m| !user_only || m.user_attributed),
        |m| events::month_key(&m.ts),
    )
    .into_iter()
    .map(|(month, tracks)| PlaylistGrowth { month, tracks })
    .collect()
}

pub fn playlist_insights(
    playlists: Option<&[Playlist]>,
    mutations: &[PlaylistMutationEvent],
) -> PlaylistInsights {
    let Some(playlists) = playlists else {
        // The mutation-derived growth series come from the technical log
        // and survive a missing snapshot.
        return PlaylistInsights {
            growth_over_time_all: growth_from_mutations(mutations, false),
            growth_over_time_user_only: growth_from_mutations(mutations, true),
            ..PlaylistInsights::default()
        };
    };

    let total_tracks: u64 = playlists.iter().map(|p| p.items.len() as u64).sum();
    let largest = playlists
        .iter()
        .max_by_key(|p| p.items.len())
        .map(|p| LargestPlaylist {
            name: p.name.clone(),
            tracks: p.items.len() as u64,
        })
        .unwrap_or_default();

    let growth_over_time = count_by(
        playlists
            .iter()
            .flat_map(|p| p.items.iter())
            .filter_map(|item| item.added_at.as_ref()),
        |added| events::month_key(added),
    )
    .into_iter()
    .map(|(month, tracks)| PlaylistGrowth { month, tracks })
    .collect();

    // Size ranking keyed by encounter order so same-named playlists stay
    // distinct entries.
    let sizes: std::collections::BTreeMap<(usize, String), u64> = playlists
        .iter()
        .enumerate()
        .map(|(i, p)| ((i, p.name.clone()), p.items.len() as u64))
        .collect();
    let top_by_size = top_n(&sizes, 10)
        .into_iter()
        .map(|((_, name), tracks)| PlaylistBySize { name, tracks })
        .collect();

    let mut diversity: Vec<PlaylistDiversity> = playlists
        .iter()
        .filter(|p| p.items.len() >= MIN_TRACKS_FOR_DIVERSITY)
        .map(|p| {
            let unique_artists = p
                .items
                .iter()
                .filter_map(|item| item.artist_name.as_deref())
                .map(|a| a.trim().to_lowercase())
                .collect::<BTreeSet<_>>()
                .len() as u64;
            let total = p.items.len() as u64;
            PlaylistDiversity {
                name: p.name.clone(),
                diversity: round2(unique_artists as f64 / total.max(1) as f64),
                unique_artists,
                total_tracks: total,
            }
        })
        .collect();
    // Most homogeneous playlists first.
    diversity.sort_by(|a, b| {
        a.diversity
            .partial_cmp(&b.diversity)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.name.cmp(&b.name))
    });
    diversity.truncate(15);

    PlaylistInsights {
        total_playlists: playlists.len() as u64,
        total_tracks,
        avg_playlist_size: round1(total_tracks as f64 / playlists.len().max(1) as f64),
        largest_playlist: largest,
        growth_over_time,
        growth_over_time_all: growth_from_mutations(mutations, false),
        growth_over_time_user_only: growth_from_mutations(mutations, true),
        top_by_size,
        diversity,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::PlaylistItem;
    use crate::metrics::test_util::zoned;

    fn item(artist: &str, added: Option<crate::events::ZonedTime>) -> PlaylistItem {
        PlaylistItem {
            added_at: added,
            track_uri: Some(format!("spotify:track:{}", artist)),
            track_name: Some("t".to_string()),
            artist_name: Some(artist.to_string()),
        }
    }

    fn playlist(name: &str, items: Vec<PlaylistItem>) -> Playlist {
        Playlist { name: name.to_string(), items }
    }

    #[test]
    fn test_absent_source_yields_default() {
        let insights = playlist_insights(None, &[]);
        assert_eq!(insights.total_playlists, 0);
        assert!(insights.growth_over_time.is_empty());
    }

    #[test]
    fn test_totals_and_growth() {
        let added = zoned(2024, 1, 15, 12, 0);
        let lists = vec![
            playlist("Mix", vec![item("A", Some(added)), item("B", None)]),
            playlist("Small", vec![item("C", Some(zoned(2024, 2, 1, 12, 0)))]),
        ];
        let insights = playlist_insights(Some(&lists), &[]);
        assert_eq!(insights.total_playlists, 2);
        assert_eq!(insights.total_tracks, 3);
        assert_eq!(insights.avg_playlist_size, 1.5);
        assert_eq!(insights.largest_playlist.name, "Mix");
        assert_eq!(insights.growth_over_time.len(), 2);
        assert_eq!(insights.growth_over_time[0].month, "2024-01");
        assert_eq!(insights.growth_over_time[0].tracks, 1);
    }

    #[test]
    fn test_diversity_excludes_small_playlists() {
        let items: Vec<PlaylistItem> =
            ["A", "A", "B", "B", "C"].iter().map(|a| item(a, None)).collect();
        let lists = vec![
            playlist("Big", items),
            playlist("Tiny", vec![item("A", None)]),
        ];
        let insights = playlist_insights(Some(&lists), &[]);
        assert_eq!(insights.diversity.len(), 1);
        assert_eq!(insights.diversity[0].name, "Big");
        assert_eq!(insights.diversity[0].unique_artists, 3);
        assert_eq!(insights.diversity[0].diversity, 0.6);
    }
}
