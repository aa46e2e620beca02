//! Push-notification engagement and notification-driven listening.

use crate::aggregate::{pct_of_counts, round1, count_by};
use crate::correlate::Window;
use crate::events::{NotificationKind, PlayEvent, TechnicalEvent, TechnicalPayload};
use crate::metrics::any_play_within;
use crate::report::models::{NotificationType, PushNotifications};
use chrono::Duration;

const DRIVEN_WINDOW_MINUTES: i64 = 30;

pub fn push_notifications(technical: &[TechnicalEvent], plays: &[PlayEvent]) -> PushNotifications {
    let notifications: Vec<(&TechnicalEvent, &str, NotificationKind)> = technical
        .iter()
        .filter_map(|e| match &e.payload {
            TechnicalPayload::Notification { campaign_id, kind } => {
                Some((e, campaign_id.as_str(), *kind))
            }
            _ => None,
        })
        .collect();
    if notifications.is_empty() {
        return PushNotifications::default();
    }

    let total_received =
        notifications.iter().filter(|(_, _, k)| *k == NotificationKind::Received).count() as u64;
    let interactions: Vec<&TechnicalEvent> = notifications
        .iter()
        .filter(|(_, _, k)| *k == NotificationKind::Interacted)
        .map(|(e, _, _)| *e)
        .collect();
    let total_interacted = interactions.len() as u64;

    let type_counts = count_by(notifications.iter(), |(_, campaign, _)| campaign.to_string());
    let mut notification_types: Vec<NotificationType> = type_counts
        .into_iter()
        .map(|(campaign_id, count)| NotificationType { campaign_id, count })
        .collect();
    notification_types
        .sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.campaign_id.cmp(&b.campaign_id)));

    // An interaction "drove" listening when any play starts within the
    // window after it.
    let window = Window::forward(Duration::minutes(DRIVEN_WINDOW_MINUTES));
    let driven = interactions
        .iter()
        .filter(|e| any_play_within(plays, e.ts, window))
        .count() as u64;

    PushNotifications {
        total_received,
        total_interacted,
        engagement_rate: round1(pct_of_counts(total_interacted, total_received)),
        notification_types,
        notification_driven_listening: driven,
        notification_driven_pct: round1(pct_of_counts(driven, total_interacted)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::ZonedTime;
    use crate::metrics::test_util::{play, zoned};

    fn notification(ts: ZonedTime, campaign: &str, kind: NotificationKind) -> TechnicalEvent {
        TechnicalEvent {
            ts,
            payload: TechnicalPayload::Notification {
                campaign_id: campaign.to_string(),
                kind,
            },
        }
    }

    #[test]
    fn test_engagement_and_driven_listening() {
        let plays = vec![play(zoned(2024, 1, 1, 12, 20), 600_000, "t", "A")];
        let technical = vec![
            notification(zoned(2024, 1, 1, 12, 0), "new-release", NotificationKind::Received),
            notification(zoned(2024, 1, 1, 12, 1), "new-release", NotificationKind::Interacted),
            notification(zoned(2024, 1, 2, 12, 0), "digest", NotificationKind::Received),
            // Interacted, but no play within 30 minutes.
            notification(zoned(2024, 1, 2, 12, 1), "digest", NotificationKind::Interacted),
        ];
        let push = push_notifications(&technical, &plays);
        assert_eq!(push.total_received, 2);
        assert_eq!(push.total_interacted, 2);
        assert_eq!(push.engagement_rate, 100.0);
        assert_eq!(push.notification_driven_listening, 1);
        assert_eq!(push.notification_driven_pct, 50.0);
        assert_eq!(push.notification_types.len(), 2);
    }

    #[test]
    fn test_no_notifications_defaults() {
        let push = push_notifications(&[], &[]);
        assert_eq!(push.total_received, 0);
        assert_eq!(push.engagement_rate, 0.0);
    }
}
