//! API request experience: latency profile, feature fingerprint and
//! weekly error rates.

use crate::aggregate::{count_by, mean, pct_of_counts, percentile, round1, top_n};
use crate::events::{self, TechnicalEvent, TechnicalPayload, ZonedTime};
use crate::report::models::{ApiErrorWeek, ApiLatency, EndpointEntry, FeatureUsage, LatencyWeek};
use std::collections::BTreeMap;

struct RequestView<'a> {
    ts: ZonedTime,
    endpoint: &'a str,
    operation: &'a str,
    latency_ms: f64,
    status_code: u16,
}

pub fn api_latency(technical: &[TechnicalEvent]) -> ApiLatency {
    let requests: Vec<RequestView<'_>> = technical
        .iter()
        .filter_map(|e| match &e.payload {
            TechnicalPayload::ApiRequest { endpoint, operation, latency_ms, status_code } => {
                Some(RequestView {
                    ts: e.ts,
                    endpoint,
                    operation,
                    latency_ms: *latency_ms,
                    status_code: *status_code,
                })
            }
            _ => None,
        })
        .collect();
    if requests.is_empty() {
        return ApiLatency::default();
    }

    // Latency statistics ignore negative (clock-skewed) samples.
    let latencies: Vec<f64> =
        requests.iter().map(|r| r.latency_ms).filter(|l| *l >= 0.0).collect();

    let mut weekly_latencies: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    for r in &requests {
        if r.latency_ms >= 0.0 {
            weekly_latencies.entry(events::week_key(&r.ts)).or_default().push(r.latency_ms);
        }
    }
    let latency_over_time: Vec<LatencyWeek> = weekly_latencies
        .iter()
        .map(|(week, values)| LatencyWeek {
            week: week.clone(),
            avg: round1(mean(values.iter().copied())),
            p95: round1(percentile(values, 95.0)),
        })
        .collect();

    let operation_counts = count_by(requests.iter(), |r| r.operation.to_string());
    let mut feature_fingerprint: Vec<FeatureUsage> = operation_counts
        .into_iter()
        .map(|(operation, count)| FeatureUsage { operation, count })
        .collect();
    feature_fingerprint
        .sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.operation.cmp(&b.operation)));

    let endpoint_counts = count_by(requests.iter(), |r| r.endpoint.to_string());
    let endpoint_breakdown = top_n(&endpoint_counts, 15)
        .into_iter()
        .map(|(endpoint, count)| EndpointEntry { endpoint, count })
        .collect();

    let weekly_totals = count_by(requests.iter(), |r| events::week_key(&r.ts));
    let weekly_errors = count_by(
        requests.iter().filter(|r| r.status_code >= 400),
        |r| events::week_key(&r.ts),
    );
    let error_over_time: Vec<ApiErrorWeek> = weekly_totals
        .iter()
        .map(|(week, total)| ApiErrorWeek {
            week: week.clone(),
            error_rate: round1(pct_of_counts(
                weekly_errors.get(week).copied().unwrap_or(0),
                *total,
            )),
            total: *total,
        })
        .collect();

    ApiLatency {
        median_latency: round1(percentile(&latencies, 50.0)),
        latency_over_time,
        feature_fingerprint,
        endpoint_breakdown,
        error_over_time,
    }
}
