//! Output document schema
//!
//! One struct per section of the consolidated summary document, shaped
//! exactly as the consuming dashboard expects. `Default` on a section is
//! its degraded-source shape: keys always present, empty vectors, zero
//! counts and rates.

use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize, Default)]
pub struct DateRange {
    pub start: String,
    pub end: String,
}

#[derive(Debug, Clone, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Overview {
    pub total_hours: f64,
    pub total_plays: u64,
    pub unique_artists: u64,
    pub unique_tracks: u64,
    pub unique_albums: u64,
    pub date_range: DateRange,
    pub longest_streak: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DailyListening {
    pub date: String,
    pub hours: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MonthlyListening {
    pub month: String,
    pub hours: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct YearlyListening {
    pub year: i32,
    pub hours: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct HourOfDay {
    pub hour: u32,
    pub hours: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DayOfWeek {
    pub day: String,
    pub hours: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeatmapCell {
    pub day: String,
    pub day_index: u32,
    pub hour: u32,
    pub hours: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TopArtist {
    pub name: String,
    pub hours: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TopTrack {
    pub name: String,
    pub artist: String,
    pub hours: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TopAlbum {
    pub name: String,
    pub artist: String,
    pub hours: f64,
}

#[derive(Debug, Clone, Serialize, Default)]
pub struct ArtistsOverTime {
    pub months: Vec<String>,
    pub artists: BTreeMap<String, Vec<f64>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkipByArtist {
    pub name: String,
    pub skip_rate: f64,
    pub plays: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkipRateOverTime {
    pub month: String,
    pub skip_rate: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReasonCount {
    pub reason: String,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize, Default)]
pub struct ReasonBreakdown {
    pub start: Vec<ReasonCount>,
    pub end: Vec<ReasonCount>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShuffleOverTime {
    pub month: String,
    pub shuffle_rate: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlatformBreakdown {
    pub platform: String,
    pub hours: f64,
}

#[derive(Debug, Clone, Serialize, Default)]
pub struct OfflineVsOnline {
    pub offline: f64,
    pub online: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CountryBreakdown {
    pub country: String,
    pub hours: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ContentTypeSplit {
    pub month: String,
    pub music: f64,
    pub podcast: f64,
    pub audiobook: f64,
    pub other: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TopPodcast {
    pub name: String,
    pub hours: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewArtistDiscovery {
    pub month: String,
    pub new_artists: u64,
}

// ---------------------------------------------------------------------------
// Account-data sections
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct PlaylistGrowth {
    pub month: String,
    pub tracks: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlaylistBySize {
    pub name: String,
    pub tracks: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistDiversity {
    pub name: String,
    pub diversity: f64,
    pub unique_artists: u64,
    pub total_tracks: u64,
}

#[derive(Debug, Clone, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct LargestPlaylist {
    pub name: String,
    pub tracks: u64,
}

#[derive(Debug, Clone, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistInsights {
    pub total_playlists: u64,
    pub total_tracks: u64,
    pub avg_playlist_size: f64,
    pub largest_playlist: LargestPlaylist,
    pub growth_over_time: Vec<PlaylistGrowth>,
    pub growth_over_time_all: Vec<PlaylistGrowth>,
    pub growth_over_time_user_only: Vec<PlaylistGrowth>,
    pub top_by_size: Vec<PlaylistBySize>,
    pub diversity: Vec<PlaylistDiversity>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchOverTime {
    pub month: String,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TopQuery {
    pub query: String,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchHourOfDay {
    pub hour: u32,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SearchBehavior {
    pub total_searches: u64,
    pub unique_queries: u64,
    pub avg_searches_per_day: f64,
    pub over_time: Vec<SearchOverTime>,
    pub top_queries: Vec<TopQuery>,
    pub hour_of_day: Vec<SearchHourOfDay>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WrappedEra {
    pub peak_month: String,
    pub peak_month_index: u32,
    pub genre: String,
    pub mood: String,
    pub descriptor: String,
    pub color: String,
    pub tracks: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct WrappedSpotlight {
    pub total_hours: f64,
    pub top_percent_globally: f64,
    pub most_listened_day: String,
    pub most_listened_day_minutes: f64,
    pub distinct_tracks: u64,
    pub unique_artists: u64,
    pub top_track_play_count: u64,
    pub top_track_first_played: String,
    pub eras: Vec<WrappedEra>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UnsavedFavorite {
    pub name: String,
    pub artist: String,
    pub hours: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct LibraryArtistConcentration {
    pub name: String,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct LibraryInteractionMonth {
    pub month: String,
    pub adds: u64,
    pub removes: u64,
    pub net: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct LibraryInteractionKind {
    pub kind: String,
    pub adds: u64,
    pub removes: u64,
    pub net: i64,
}

#[derive(Debug, Clone, Serialize, Default)]
pub struct LibraryInteractionWindow {
    pub start: Option<String>,
    pub end: Option<String>,
}

#[derive(Debug, Clone, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct LibraryCollectionInteractionsMetrics {
    pub total_adds: u64,
    pub total_removes: u64,
    pub net_change: i64,
    pub active_months: u64,
    pub interaction_window: LibraryInteractionWindow,
    pub monthly_trend: Vec<LibraryInteractionMonth>,
    pub kind_breakdown: Vec<LibraryInteractionKind>,
}

#[derive(Debug, Clone, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct LibraryCollectionInteractions {
    pub supports_user_only: bool,
    pub all: LibraryCollectionInteractionsMetrics,
    pub user_only: LibraryCollectionInteractionsMetrics,
}

#[derive(Debug, Clone, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct LibraryHealth {
    pub library_size: u64,
    pub utilization_rate: f64,
    pub utilized_count: u64,
    pub unsaved_favorites: Vec<UnsavedFavorite>,
    pub forgotten_saves: u64,
    pub forgotten_saves_pct: f64,
    pub artist_concentration: Vec<LibraryArtistConcentration>,
    pub collection_interactions: LibraryCollectionInteractions,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistStreamEntry {
    pub name: String,
    pub hours: f64,
    pub total_tracks: u64,
    pub streamed_tracks: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeadPlaylist {
    pub name: String,
    pub total_tracks: u64,
    pub streamed_tracks: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoverWeeklyHitRate {
    pub playlist_name: String,
    pub total_tracks: u64,
    pub hit_tracks: u64,
    pub hit_rate: f64,
}

#[derive(Debug, Clone, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistStreamOverlap {
    pub loyalty_score: f64,
    pub playlist_hours: f64,
    pub library_loyalty_score: f64,
    pub library_stream_hours: f64,
    pub library_total_tracks: u64,
    pub library_streamed_tracks: u64,
    pub combined_loyalty_score: f64,
    pub combined_stream_hours: f64,
    pub most_played_playlists: Vec<PlaylistStreamEntry>,
    pub dead_playlists: Vec<DeadPlaylist>,
    pub discover_weekly_hit_rate: Option<DiscoverWeeklyHitRate>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchObsession {
    pub name: String,
    pub hours: f64,
    pub first_searched: String,
}

#[derive(Debug, Clone, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SearchListenPipeline {
    pub search_to_obsession: Vec<SearchObsession>,
    pub impulse_pct: f64,
    pub impulse_count: u64,
    pub avg_gap_minutes: f64,
}

// ---------------------------------------------------------------------------
// Technical-log sections
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct ChurnWeek {
    pub week: String,
    pub adds: u64,
    pub removes: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurationHeatmapCell {
    pub day: String,
    pub day_index: u32,
    pub hour: u32,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImpulseAddBin {
    pub bin: String,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct AbandonedTrack {
    pub name: String,
    pub artist: String,
}

#[derive(Debug, Clone, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistCurationMetrics {
    pub total_adds: u64,
    pub total_removes: u64,
    pub adds_per_week: f64,
    pub removes_per_week: f64,
    pub churn_over_time: Vec<ChurnWeek>,
    pub curation_heatmap: Vec<CurationHeatmapCell>,
    pub regret_count: u64,
    pub regret_pct: f64,
    pub impulse_add_timing: Vec<ImpulseAddBin>,
    pub abandoned_count: u64,
    pub abandoned_pct: f64,
    pub abandoned_examples: Vec<AbandonedTrack>,
}

#[derive(Debug, Clone, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistCuration {
    pub all: PlaylistCurationMetrics,
    pub user_only: PlaylistCurationMetrics,
}

#[derive(Debug, Clone, Serialize)]
pub struct BitrateEntry {
    pub bitrate: String,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorWeek {
    pub week: String,
    pub total: u64,
    pub fatal: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct StutterWeek {
    pub week: String,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DownloadWeek {
    pub week: String,
    pub downloads: u64,
}

#[derive(Debug, Clone, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackQuality {
    pub bitrate_distribution: Vec<BitrateEntry>,
    pub total_errors: u64,
    pub fatal_errors: u64,
    pub error_over_time: Vec<ErrorWeek>,
    pub total_stutters: u64,
    pub stutter_timeline: Vec<StutterWeek>,
    pub error_tolerance_retry_pct: f64,
    pub error_tolerance_retries: u64,
    pub error_tolerance_skips: u64,
    pub download_over_time: Vec<DownloadWeek>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialSessionEntry {
    pub start: String,
    pub end: String,
    pub duration_minutes: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ShareDestination {
    pub destination: String,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ShareMonth {
    pub month: String,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareWorthyEntry {
    pub name: String,
    pub artist: String,
    pub prior_plays: u64,
}

#[derive(Debug, Clone, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SocialSharing {
    pub total_social_sessions: u64,
    pub avg_session_minutes: f64,
    pub longest_session_minutes: f64,
    pub total_social_hours: f64,
    pub sessions: Vec<SocialSessionEntry>,
    pub total_shares: u64,
    pub share_destinations: Vec<ShareDestination>,
    pub share_over_time: Vec<ShareMonth>,
    pub share_worthy_threshold: Vec<ShareWorthyEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct VersionEvent {
    pub date: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct OsVersionEvent {
    pub date: String,
    pub os: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceInfo {
    pub model: String,
    pub first_seen: String,
    pub last_seen: String,
    pub event_count: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiDeviceWeek {
    pub week: String,
    pub device_count: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionHour {
    pub hour: u32,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct DeviceEvolution {
    pub app_version_timeline: Vec<VersionEvent>,
    pub os_version_timeline: Vec<OsVersionEvent>,
    pub device_fingerprint: Vec<DeviceInfo>,
    pub multi_device_weekly: Vec<MultiDeviceWeek>,
    pub avg_devices_per_week: f64,
    pub session_hour_of_day: Vec<SessionHour>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LatencyWeek {
    pub week: String,
    pub avg: f64,
    pub p95: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct FeatureUsage {
    pub operation: String,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct EndpointEntry {
    pub endpoint: String,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorWeek {
    pub week: String,
    pub error_rate: f64,
    pub total: u64,
}

#[derive(Debug, Clone, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ApiLatency {
    pub median_latency: f64,
    pub latency_over_time: Vec<LatencyWeek>,
    pub feature_fingerprint: Vec<FeatureUsage>,
    pub endpoint_breakdown: Vec<EndpointEntry>,
    pub error_over_time: Vec<ApiErrorWeek>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationType {
    pub campaign_id: String,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PushNotifications {
    pub total_received: u64,
    pub total_interacted: u64,
    pub engagement_rate: f64,
    pub notification_types: Vec<NotificationType>,
    pub notification_driven_listening: u64,
    pub notification_driven_pct: f64,
}

// ---------------------------------------------------------------------------
// The consolidated document
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub overview: Overview,
    pub daily_listening: Vec<DailyListening>,
    pub monthly_listening: Vec<MonthlyListening>,
    pub yearly_listening: Vec<YearlyListening>,
    pub hour_of_day: Vec<HourOfDay>,
    pub day_of_week: Vec<DayOfWeek>,
    pub heatmap: Vec<HeatmapCell>,
    pub top_artists: Vec<TopArtist>,
    pub top_tracks: Vec<TopTrack>,
    pub top_albums: Vec<TopAlbum>,
    pub artists_over_time: ArtistsOverTime,
    pub skip_by_artist: Vec<SkipByArtist>,
    pub skip_rate_over_time: Vec<SkipRateOverTime>,
    pub reason_breakdown: ReasonBreakdown,
    pub shuffle_over_time: Vec<ShuffleOverTime>,
    pub avg_listen_minutes: f64,
    pub platform_breakdown: Vec<PlatformBreakdown>,
    pub offline_vs_online: OfflineVsOnline,
    pub country_breakdown: Vec<CountryBreakdown>,
    pub content_type_split: Vec<ContentTypeSplit>,
    pub top_podcasts: Vec<TopPodcast>,
    pub new_artist_discovery: Vec<NewArtistDiscovery>,
    // Account-data sections
    pub playlist_insights: PlaylistInsights,
    pub search_behavior: SearchBehavior,
    #[serde(rename = "wrapped2024")]
    pub wrapped: WrappedSpotlight,
    pub library_health: LibraryHealth,
    pub playlist_stream_overlap: PlaylistStreamOverlap,
    pub search_listen_pipeline: SearchListenPipeline,
    // Technical-log sections
    pub playlist_curation: PlaylistCuration,
    pub playback_quality: PlaybackQuality,
    pub social_sharing: SocialSharing,
    pub device_evolution: DeviceEvolution,
    pub api_latency: ApiLatency,
    pub push_notifications: PushNotifications,
}
