//! Device and app evolution from the core-stream telemetry.

use crate::aggregate::{count_by, hour_series, mean, round1};
use crate::events::{self, TechnicalEvent, TechnicalPayload, ZonedTime};
use crate::metrics::date_string;
use crate::report::models::{
    DeviceEvolution, DeviceInfo, MultiDeviceWeek, OsVersionEvent, SessionHour, VersionEvent,
};
use std::collections::{BTreeMap, BTreeSet, HashSet};

struct CoreStreamView<'a> {
    ts: ZonedTime,
    device_model: &'a str,
    app_version: &'a str,
    os_version: &'a str,
}

/// First date each new value appears, in chronological order. Relies on
/// the technical table being timestamp-sorted.
fn first_seen_timeline<'a, I>(events: I) -> Vec<(String, String)>
where
    I: IntoIterator<Item = (ZonedTime, &'a str)>,
{
    let mut seen: HashSet<&'a str> = HashSet::new();
    let mut timeline = Vec::new();
    for (ts, value) in events {
        if seen.insert(value) {
            timeline.push((date_string(&ts), value.to_string()));
        }
    }
    timeline
}

pub fn device_evolution(technical: &[TechnicalEvent]) -> DeviceEvolution {
    let streams: Vec<CoreStreamView<'_>> = technical
        .iter()
        .filter_map(|e| match &e.payload {
            TechnicalPayload::CoreStream { bitrate: _, device_model, app_version, os_version } => {
                Some(CoreStreamView {
                    ts: e.ts,
                    device_model,
                    app_version,
                    os_version,
                })
            }
            _ => None,
        })
        .collect();
    if streams.is_empty() {
        return DeviceEvolution::default();
    }

    let app_version_timeline = first_seen_timeline(streams.iter().map(|s| (s.ts, s.app_version)))
        .into_iter()
        .map(|(date, version)| VersionEvent { date, version })
        .collect();
    let os_version_timeline = first_seen_timeline(streams.iter().map(|s| (s.ts, s.os_version)))
        .into_iter()
        .map(|(date, os)| OsVersionEvent { date, os })
        .collect();

    let mut devices: BTreeMap<&str, (ZonedTime, ZonedTime, u64)> = BTreeMap::new();
    for s in &streams {
        let entry = devices.entry(s.device_model).or_insert((s.ts, s.ts, 0));
        entry.0 = entry.0.min(s.ts);
        entry.1 = entry.1.max(s.ts);
        entry.2 += 1;
    }
    let mut device_fingerprint: Vec<DeviceInfo> = devices
        .into_iter()
        .map(|(model, (first, last, count))| DeviceInfo {
            model: model.to_string(),
            first_seen: date_string(&first),
            last_seen: date_string(&last),
            event_count: count,
        })
        .collect();
    device_fingerprint
        .sort_by(|a, b| b.event_count.cmp(&a.event_count).then_with(|| a.model.cmp(&b.model)));

    let mut weekly_devices: BTreeMap<String, BTreeSet<&str>> = BTreeMap::new();
    for s in &streams {
        weekly_devices.entry(events::week_key(&s.ts)).or_default().insert(s.device_model);
    }
    let multi_device_weekly: Vec<MultiDeviceWeek> = weekly_devices
        .iter()
        .map(|(week, models)| MultiDeviceWeek {
            week: week.clone(),
            device_count: models.len() as u64,
        })
        .collect();
    let avg_devices_per_week =
        round1(mean(multi_device_weekly.iter().map(|w| w.device_count as f64)));

    let hourly = count_by(streams.iter(), |s| events::hour_of(&s.ts));
    let session_hour_of_day = hour_series(&hourly)
        .into_iter()
        .map(|(hour, count)| SessionHour { hour, count })
        .collect();

    DeviceEvolution {
        app_version_timeline,
        os_version_timeline,
        device_fingerprint,
        multi_device_weekly,
        avg_devices_per_week,
        session_hour_of_day,
    }
}
