//! Library health: saved-collection utilization against the play
//! history, plus collection-interaction trends from the mutation stream.

use crate::aggregate::{count_by, pct_of_counts, round1, top_n};
use crate::events::{self, fold_key, LibrarySnapshot, MutationKind, PlayEvent, PlaylistMutationEvent};
use crate::metrics::{title_artist_key, uri_key};
use crate::report::models::{
    LibraryArtistConcentration, LibraryCollectionInteractions,
    LibraryCollectionInteractionsMetrics, LibraryHealth, LibraryInteractionKind,
    LibraryInteractionMonth, LibraryInteractionWindow, UnsavedFavorite,
};
use crate::timeline::TemporalIndex;
use chrono::Duration;
use std::collections::{BTreeMap, BTreeSet, HashSet};

const FORGOTTEN_WINDOW_DAYS: i64 = 365;

fn interaction_metrics(
    mutations: &[PlaylistMutationEvent],
    user_only: bool,
) -> LibraryCollectionInteractionsMetrics {
    let subset: Vec<&PlaylistMutationEvent> = mutations
        .iter()
        .filter(|m| !user_only || m.user_attributed)
        .collect();
    if subset.is_empty() {
        return LibraryCollectionInteractionsMetrics::default();
    }

    let adds = subset.iter().filter(|m| m.kind == MutationKind::Add).count() as u64;
    let removes = subset.len() as u64 - adds;

    let monthly_adds = count_by(
        subset.iter().filter(|m| m.kind == MutationKind::Add),
        |m| events::month_key(&m.ts),
    );
    let monthly_removes = count_by(
        subset.iter().filter(|m| m.kind == MutationKind::Remove),
        |m| events::month_key(&m.ts),
    );
    let months: BTreeSet<String> =
        monthly_adds.keys().chain(monthly_removes.keys()).cloned().collect();
    let monthly_trend: Vec<LibraryInteractionMonth> = months
        .iter()
        .map(|month| {
            let a = monthly_adds.get(month).copied().unwrap_or(0);
            let r = monthly_removes.get(month).copied().unwrap_or(0);
            LibraryInteractionMonth {
                month: month.clone(),
                adds: a,
                removes: r,
                net: a as i64 - r as i64,
            }
        })
        .collect();

    let mut kinds: BTreeMap<&String, (u64, u64)> = BTreeMap::new();
    for m in &subset {
        let entry = kinds.entry(&m.item_kind).or_insert((0, 0));
        match m.kind {
            MutationKind::Add => entry.0 += 1,
            MutationKind::Remove => entry.1 += 1,
        }
    }
    let kind_breakdown = kinds
        .into_iter()
        .map(|(kind, (a, r))| LibraryInteractionKind {
            kind: kind.clone(),
            adds: a,
            removes: r,
            net: a as i64 - r as i64,
        })
        .collect();

    // Subset inherits the normalizer's timestamp order.
    let window = LibraryInteractionWindow {
        start: subset.first().map(|m| super::date_string(&m.ts)),
        end: subset.last().map(|m| super::date_string(&m.ts)),
    };

    LibraryCollectionInteractionsMetrics {
        total_adds: adds,
        total_removes: removes,
        net_change: adds as i64 - removes as i64,
        active_months: months.len() as u64,
        interaction_window: window,
        monthly_trend,
        kind_breakdown,
    }
}

pub fn library_health(
    library: Option<&LibrarySnapshot>,
    plays: &[PlayEvent],
    play_index: &TemporalIndex<'_, PlayEvent>,
    mutations: &[PlaylistMutationEvent],
) -> LibraryHealth {
    // The interaction trends depend on the mutation stream only, so they
    // survive a missing library snapshot.
    let collection_interactions = LibraryCollectionInteractions {
        supports_user_only: mutations.iter().any(|m| m.user_attributed),
        all: interaction_metrics(mutations, false),
        user_only: interaction_metrics(mutations, true),
    };

    let Some(library) = library else {
        return LibraryHealth {
            collection_interactions,
            ..LibraryHealth::default()
        };
    };

    let streamed_uris: HashSet<&str> =
        plays.iter().filter_map(|p| p.track_uri.as_deref()).collect();
    let library_uris: HashSet<&str> = library.tracks.iter().map(|t| t.uri.as_str()).collect();
    let library_folds: HashSet<String> = library
        .tracks
        .iter()
        .filter(|t| !t.track.is_empty() && !t.artist.is_empty())
        .map(|t| fold_key(&t.track, &t.artist))
        .collect();

    let utilized_count = library
        .tracks
        .iter()
        .filter(|t| streamed_uris.contains(t.uri.as_str()))
        .count() as u64;
    let library_size = library.tracks.len() as u64;

    // Heavily streamed tracks that were never saved; alternate releases
    // of saved tracks are merged away via the case-folded identity.
    let mut favorite_hours: BTreeMap<String, (String, String, f64)> = BTreeMap::new();
    for play in plays.iter().filter(|p| p.is_music()) {
        let (Some(name), Some(artist)) = (&play.track_name, &play.artist_name) else {
            continue;
        };
        if play.track_uri.as_deref().is_some_and(|u| library_uris.contains(u)) {
            continue;
        }
        let folded = fold_key(name, artist);
        if library_folds.contains(&folded) {
            continue;
        }
        let entry = favorite_hours
            .entry(folded)
            .or_insert_with(|| (name.clone(), artist.clone(), 0.0));
        entry.2 += play.hours();
    }
    let by_hours: BTreeMap<String, f64> =
        favorite_hours.iter().map(|(k, (_, _, h))| (k.clone(), *h)).collect();
    let unsaved_favorites = top_n(&by_hours, 10)
        .into_iter()
        .map(|(key, hours)| {
            let (name, artist, _) = &favorite_hours[&key];
            UnsavedFavorite {
                name: name.clone(),
                artist: artist.clone(),
                hours: round1(hours),
            }
        })
        .collect();

    // A save is forgotten when it has no stream in the 12 months ending
    // at the newest play in the export.
    let forgotten_saves = match plays.last() {
        Some(latest) => {
            let cutoff = latest.ts - Duration::days(FORGOTTEN_WINDOW_DAYS);
            library
                .tracks
                .iter()
                .filter(|t| {
                    let mut keys = vec![uri_key(&t.uri)];
                    if !t.track.is_empty() && !t.artist.is_empty() {
                        keys.push(title_artist_key(&t.track, &t.artist));
                    }
                    !keys
                        .iter()
                        .any(|k| play_index.first_at_or_after(k, cutoff).is_some())
                })
                .count() as u64
        }
        None => library_size,
    };

    let artist_counts = count_by(
        library.tracks.iter().filter(|t| !t.artist.is_empty()),
        |t| t.artist.clone(),
    );
    let artist_concentration = top_n(&artist_counts, 10)
        .into_iter()
        .map(|(name, count)| LibraryArtistConcentration { name, count })
        .collect();

    LibraryHealth {
        library_size,
        utilization_rate: round1(pct_of_counts(utilized_count, library_size)),
        utilized_count,
        unsaved_favorites,
        forgotten_saves,
        forgotten_saves_pct: round1(pct_of_counts(forgotten_saves, library_size)),
        artist_concentration,
        collection_interactions,
    }
}
