//! Temporal index
//!
//! Organizes normalized events per entity key in timestamp order, backing
//! range and nearest-neighbor queries for correlation and session logic.
//! An event may be registered under several keys (opaque URI plus the
//! case-folded fallback identity); a key with no events yields an empty
//! slice, never an error.

use crate::events::ZonedTime;
use std::collections::HashMap;

pub struct TemporalIndex<'a, E> {
    entries: HashMap<String, Vec<(ZonedTime, &'a E)>>,
}

impl<'a, E> TemporalIndex<'a, E> {
    /// Build an index over `events`. `keys` returns every identity key an
    /// event should be reachable under; `ts` extracts its timestamp.
    pub fn build<KF, TF>(events: &'a [E], keys: KF, ts: TF) -> Self
    where
        KF: Fn(&E) -> Vec<String>,
        TF: Fn(&E) -> ZonedTime,
    {
        let mut entries: HashMap<String, Vec<(ZonedTime, &'a E)>> = HashMap::new();
        for event in events {
            let at = ts(event);
            for key in keys(event) {
                entries.entry(key).or_default().push((at, event));
            }
        }
        for list in entries.values_mut() {
            list.sort_by_key(|(at, _)| *at);
        }
        Self { entries }
    }

    pub fn events_for(&self, key: &str) -> &[(ZonedTime, &'a E)] {
        self.entries.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Earliest event with timestamp >= `at`.
    pub fn first_at_or_after(&self, key: &str, at: ZonedTime) -> Option<(ZonedTime, &'a E)> {
        let list = self.events_for(key);
        let idx = list.partition_point(|(ts, _)| *ts < at);
        list.get(idx).copied()
    }

    /// Latest event with timestamp <= `at`.
    pub fn last_at_or_before(&self, key: &str, at: ZonedTime) -> Option<(ZonedTime, &'a E)> {
        let list = self.events_for(key);
        let idx = list.partition_point(|(ts, _)| *ts <= at);
        idx.checked_sub(1).and_then(|i| list.get(i)).copied()
    }

    /// Events with `start <= ts <= end`, both endpoints inclusive.
    pub fn in_range(&self, key: &str, start: ZonedTime, end: ZonedTime) -> &[(ZonedTime, &'a E)] {
        let list = self.events_for(key);
        let lo = list.partition_point(|(ts, _)| *ts < start);
        let hi = list.partition_point(|(ts, _)| *ts <= end);
        &list[lo..hi]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono_tz::America::New_York;

    struct Item {
        key: String,
        ts: ZonedTime,
    }

    fn at(h: u32, m: u32) -> ZonedTime {
        New_York.with_ymd_and_hms(2024, 1, 1, h, m, 0).unwrap()
    }

    fn index(items: &[Item]) -> TemporalIndex<'_, Item> {
        TemporalIndex::build(items, |i| vec![i.key.clone()], |i| i.ts)
    }

    #[test]
    fn test_unknown_key_is_empty() {
        let items = vec![];
        let idx = index(&items);
        assert!(idx.events_for("nope").is_empty());
        assert!(idx.first_at_or_after("nope", at(1, 0)).is_none());
        assert!(idx.last_at_or_before("nope", at(1, 0)).is_none());
    }

    #[test]
    fn test_nearest_neighbor_queries() {
        let items = vec![
            Item { key: "a".into(), ts: at(10, 0) },
            Item { key: "a".into(), ts: at(12, 0) },
            Item { key: "a".into(), ts: at(14, 0) },
        ];
        let idx = index(&items);
        assert_eq!(idx.first_at_or_after("a", at(11, 0)).unwrap().0, at(12, 0));
        // At-or-after includes an exact hit.
        assert_eq!(idx.first_at_or_after("a", at(12, 0)).unwrap().0, at(12, 0));
        assert_eq!(idx.last_at_or_before("a", at(13, 0)).unwrap().0, at(12, 0));
        assert_eq!(idx.last_at_or_before("a", at(12, 0)).unwrap().0, at(12, 0));
        assert!(idx.first_at_or_after("a", at(15, 0)).is_none());
        assert!(idx.last_at_or_before("a", at(9, 0)).is_none());
    }

    #[test]
    fn test_in_range_inclusive_endpoints() {
        let items = vec![
            Item { key: "a".into(), ts: at(10, 0) },
            Item { key: "a".into(), ts: at(11, 0) },
            Item { key: "a".into(), ts: at(12, 0) },
        ];
        let idx = index(&items);
        let hits = idx.in_range("a", at(10, 0), at(12, 0));
        assert_eq!(hits.len(), 3);
        let hits = idx.in_range("a", at(10, 1), at(11, 59));
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn test_multiple_keys_per_event() {
        let items = vec![Item { key: "uri:1".into(), ts: at(10, 0) }];
        let idx = TemporalIndex::build(
            &items,
            |i| vec![i.key.clone(), "fold:song|artist".to_string()],
            |i| i.ts,
        );
        assert_eq!(idx.events_for("uri:1").len(), 1);
        assert_eq!(idx.events_for("fold:song|artist").len(), 1);
    }
}
