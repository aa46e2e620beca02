//! Summary assembler
//!
//! Invokes every catalog metric against the shared normalized tables and
//! merges the results into the consolidated document. Sections are
//! mutually independent: each reads the read-only tables and fills only
//! its own slot, so the groups run on the rayon pool and join at the
//! end. A section whose source is absent contributes its documented
//! default instead of aborting the others.

pub mod models;

pub use models::Stats;

use crate::metrics;
use crate::normalize::EventTables;

pub fn assemble(tables: &EventTables) -> Stats {
    let plays = &tables.plays;
    let play_index = metrics::build_play_index(plays);
    let playlists = tables.playlists.as_deref();
    let searches = tables.searches.as_deref();
    let library = tables.library.as_ref();

    let (((overview_group, tops_group), behavior_group), (account_group, technical_group)) =
        rayon::join(
            || {
                rayon::join(
                    || {
                        rayon::join(
                            || {
                                (
                                    metrics::overview(plays),
                                    metrics::daily_listening(plays),
                                    metrics::monthly_listening(plays),
                                    metrics::yearly_listening(plays),
                                    metrics::hour_of_day(plays),
                                    metrics::day_of_week(plays),
                                    metrics::heatmap(plays),
                                )
                            },
                            || {
                                (
                                    metrics::top_artists(plays),
                                    metrics::top_tracks(plays),
                                    metrics::top_albums(plays),
                                    metrics::artists_over_time(plays),
                                    metrics::top_podcasts(plays),
                                    metrics::new_artist_discovery(plays),
                                )
                            },
                        )
                    },
                    || {
                        (
                            metrics::skip_by_artist(plays),
                            metrics::skip_rate_over_time(plays),
                            metrics::reason_breakdown(plays),
                            metrics::shuffle_over_time(plays),
                            metrics::avg_listen_minutes(plays),
                            metrics::platform_breakdown(plays),
                            metrics::offline_vs_online(plays),
                            metrics::country_breakdown(plays),
                            metrics::content_type_split(plays),
                        )
                    },
                )
            },
            || {
                rayon::join(
                    || {
                        (
                            metrics::playlist_insights(playlists, &tables.playlist_mutations),
                            metrics::search_behavior(searches),
                            metrics::wrapped_spotlight(tables.wrapped.as_ref()),
                            metrics::library_health(
                                library,
                                plays,
                                &play_index,
                                &tables.playlist_mutations,
                            ),
                            metrics::playlist_stream_overlap(playlists, library, plays),
                            metrics::search_listen_pipeline(searches, &play_index),
                        )
                    },
                    || {
                        (
                            metrics::playlist_curation(&tables.playlist_mutations, &play_index),
                            metrics::playback_quality(&tables.technical, &play_index),
                            metrics::social_sharing(&tables.technical, &play_index),
                            metrics::device_evolution(&tables.technical),
                            metrics::api_latency(&tables.technical),
                            metrics::push_notifications(&tables.technical, plays),
                        )
                    },
                )
            },
        );

    let (overview, daily, monthly, yearly, hours, days, heat) = overview_group;
    let (top_artists, top_tracks, top_albums, artists_over_time, top_podcasts, discovery) =
        tops_group;
    let (
        skip_by_artist,
        skip_rate_over_time,
        reason_breakdown,
        shuffle_over_time,
        avg_listen_minutes,
        platform_breakdown,
        offline_vs_online,
        country_breakdown,
        content_type_split,
    ) = behavior_group;
    let (
        playlist_insights,
        search_behavior,
        wrapped,
        library_health,
        playlist_stream_overlap,
        search_listen_pipeline,
    ) = account_group;
    let (
        playlist_curation,
        playback_quality,
        social_sharing,
        device_evolution,
        api_latency,
        push_notifications,
    ) = technical_group;

    Stats {
        overview,
        daily_listening: daily,
        monthly_listening: monthly,
        yearly_listening: yearly,
        hour_of_day: hours,
        day_of_week: days,
        heatmap: heat,
        top_artists,
        top_tracks,
        top_albums,
        artists_over_time,
        skip_by_artist,
        skip_rate_over_time,
        reason_breakdown,
        shuffle_over_time,
        avg_listen_minutes,
        platform_breakdown,
        offline_vs_online,
        country_breakdown,
        content_type_split,
        top_podcasts,
        new_artist_discovery: discovery,
        playlist_insights,
        search_behavior,
        wrapped,
        library_health,
        playlist_stream_overlap,
        search_listen_pipeline,
        playlist_curation,
        playback_quality,
        social_sharing,
        device_evolution,
        api_latency,
        push_notifications,
    }
}
