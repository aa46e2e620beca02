//! Search-behavior section: volumes, cadence and query rankings.

use crate::aggregate::{count_by, hour_series, round1, top_n};
use crate::events::{self, SearchEvent};
use crate::report::models::{SearchBehavior, SearchHourOfDay, SearchOverTime, TopQuery};
use std::collections::BTreeSet;

pub fn search_behavior(searches: Option<&[SearchEvent]>) -> SearchBehavior {
    let Some(searches) = searches else {
        return SearchBehavior::default();
    };
    if searches.is_empty() {
        return SearchBehavior::default();
    }

    let unique_queries = searches
        .iter()
        .map(|s| s.query.trim().to_lowercase())
        .collect::<BTreeSet<_>>()
        .len() as u64;

    let active_days = searches.iter().map(|s| s.ts.date_naive()).collect::<BTreeSet<_>>().len();

    let over_time = count_by(searches.iter(), |s| events::month_key(&s.ts))
        .into_iter()
        .map(|(month, count)| SearchOverTime { month, count })
        .collect();

    let query_counts = count_by(searches.iter(), |s| s.query.trim().to_lowercase());
    let top_queries = top_n(&query_counts, 15)
        .into_iter()
        .map(|(query, count)| TopQuery { query, count })
        .collect();

    let hourly = count_by(searches.iter(), |s| events::hour_of(&s.ts));
    let hour_of_day = hour_series(&hourly)
        .into_iter()
        .map(|(hour, count)| SearchHourOfDay { hour, count })
        .collect();

    SearchBehavior {
        total_searches: searches.len() as u64,
        unique_queries,
        avg_searches_per_day: round1(searches.len() as f64 / active_days.max(1) as f64),
        over_time,
        top_queries,
        hour_of_day,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::test_util::zoned;

    fn search(ts: crate::events::ZonedTime, query: &str) -> SearchEvent {
        SearchEvent {
            ts,
            query: query.to_string(),
            platform: "ANDROID".to_string(),
            interaction_uris: vec![],
        }
    }

    #[test]
    fn test_absent_or_empty_source() {
        assert_eq!(search_behavior(None).total_searches, 0);
        assert_eq!(search_behavior(Some(&[])).total_searches, 0);
        assert!(search_behavior(None).hour_of_day.is_empty());
    }

    #[test]
    fn test_search_aggregates() {
        let searches = vec![
            search(zoned(2024, 1, 1, 9, 0), "Radiohead"),
            search(zoned(2024, 1, 1, 9, 30), "radiohead"),
            search(zoned(2024, 1, 5, 22, 0), "muse"),
        ];
        let behavior = search_behavior(Some(&searches));
        assert_eq!(behavior.total_searches, 3);
        // Case-folded dedup merges the two Radiohead queries.
        assert_eq!(behavior.unique_queries, 2);
        // 3 searches over 2 active days.
        assert_eq!(behavior.avg_searches_per_day, 1.5);
        assert_eq!(behavior.top_queries[0].query, "radiohead");
        assert_eq!(behavior.top_queries[0].count, 2);
        assert_eq!(behavior.hour_of_day.len(), 24);
        assert_eq!(behavior.hour_of_day[9].count, 2);
        assert_eq!(behavior.over_time[0].count, 3);
    }
}
