//! Advisory urgency signals for the kitchen worklist. Nothing here mutates orders.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::errors::Error;
use crate::orders::{Order, OrderStatus};

/// Delay class, declared in worklist order.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum DelayClass {
    /// Stuck in preparation past the bottleneck threshold
    Bottleneck,
    Critical,
    Warning,
    OnTime,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    Low,
    Medium,
    High,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, Eq, PartialEq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum NoteBadge {
    NoOnion,
    ExtraSpicy,
    Allergy,
    Vip,
    Urgent,
}

const NOTE_BADGES: &[(&str, NoteBadge)] = &[
    ("no onion", NoteBadge::NoOnion),
    ("extra spicy", NoteBadge::ExtraSpicy),
    ("allergy", NoteBadge::Allergy),
    ("vip", NoteBadge::Vip),
    ("urgent", NoteBadge::Urgent),
];

/// Minutes after which an order is flagged. Comparisons are strict and made
/// on the exact age, so 15m59s is past a 15 minute threshold.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, Eq, PartialEq)]
pub struct DelayThresholds {
    pub warning_minutes: i64,
    pub bottleneck_minutes: i64,
    pub critical_minutes: i64,
}

impl Default for DelayThresholds {
    fn default() -> Self {
        Self {
            warning_minutes: 15,
            bottleneck_minutes: 20,
            critical_minutes: 30,
        }
    }
}

impl DelayThresholds {
    /// Thresholds must be non-negative and escalate warning, bottleneck, critical.
    pub fn validate(&self) -> Result<(), Error> {
        if self.warning_minutes < 0 {
            return Err(Error::Validation {
                message: "warning threshold must not be negative".to_string(),
            });
        }
        if self.warning_minutes > self.bottleneck_minutes
            || self.bottleneck_minutes > self.critical_minutes
        {
            return Err(Error::Validation {
                message: format!(
                    "thresholds must satisfy warning <= bottleneck <= critical, got {}/{}/{}",
                    self.warning_minutes, self.bottleneck_minutes, self.critical_minutes
                ),
            });
        }
        Ok(())
    }

    fn exceeded(minutes: i64, age_seconds: i64) -> bool {
        age_seconds > minutes.saturating_mul(60)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, Eq, PartialEq)]
pub struct DelaySignal {
    pub order_id: String,
    /// Whole minutes, for display
    pub age_minutes: i64,
    pub age_seconds: i64,
    /// `None` once the kitchen is done with the order
    pub delay: Option<DelayClass>,
    pub urgency: Urgency,
    pub badges: Vec<NoteBadge>,
}

/// Every badge whose keyword appears in the notes, in table order.
pub fn note_badges(notes: &str) -> Vec<NoteBadge> {
    let lowered = notes.to_lowercase();
    NOTE_BADGES
        .iter()
        .filter(|(keyword, _)| lowered.contains(keyword))
        .map(|(_, badge)| *badge)
        .collect()
}

pub fn classify(order: &Order, now: DateTime<Utc>, thresholds: &DelayThresholds) -> DelaySignal {
    let age_seconds = (now - order.created_at).num_seconds().max(0);
    let past = |minutes: i64| DelayThresholds::exceeded(minutes, age_seconds);
    let badges = order.notes.as_deref().map(note_badges).unwrap_or_default();

    let delay = if !order.status.is_open() {
        None
    } else if order.status == OrderStatus::Preparing && past(thresholds.bottleneck_minutes) {
        Some(DelayClass::Bottleneck)
    } else if past(thresholds.critical_minutes) {
        Some(DelayClass::Critical)
    } else if past(thresholds.warning_minutes) {
        Some(DelayClass::Warning)
    } else {
        Some(DelayClass::OnTime)
    };

    let flagged = badges
        .iter()
        .any(|b| matches!(b, NoteBadge::Vip | NoteBadge::Urgent));
    let urgency = if order.priority || flagged || past(thresholds.critical_minutes) {
        Urgency::High
    } else if past(thresholds.warning_minutes) {
        Urgency::Medium
    } else {
        Urgency::Low
    };

    DelaySignal {
        order_id: order.id.clone(),
        age_minutes: age_seconds / 60,
        age_seconds,
        delay,
        urgency,
        badges,
    }
}

fn worklist_order(a: &DelaySignal, b: &DelaySignal) -> Ordering {
    a.delay
        .cmp(&b.delay)
        .then_with(|| b.age_seconds.cmp(&a.age_seconds))
        .then_with(|| a.order_id.cmp(&b.order_id))
}

/// Open orders ranked bottleneck, critical, warning, on time; oldest first within a class.
pub fn worklist(orders: &[Order], now: DateTime<Utc>, thresholds: &DelayThresholds) -> Vec<DelaySignal> {
    let mut signals: Vec<DelaySignal> = orders
        .iter()
        .map(|order| classify(order, now, thresholds))
        .filter(|signal| signal.delay.is_some())
        .collect();
    signals.sort_by(worklist_order);
    signals
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-05-01T13:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn aged(id: &str, minutes: i64, status: OrderStatus) -> Order {
        Order {
            id: id.to_string(),
            status,
            created_at: now() - Duration::minutes(minutes),
            ..Default::default()
        }
    }

    #[test]
    fn test_preparing_past_twenty_minutes_is_bottleneck() {
        let signal = classify(&aged("O1", 25, OrderStatus::Preparing), now(), &DelayThresholds::default());
        assert_eq!(signal.delay, Some(DelayClass::Bottleneck));
        assert_eq!(signal.urgency, Urgency::Medium);
    }

    #[test]
    fn test_bottleneck_ranks_above_and_ready_is_excluded() {
        let orders = vec![
            aged("late-ready", 40, OrderStatus::Ready),
            aged("stuck", 25, OrderStatus::Preparing),
        ];
        let list = worklist(&orders, now(), &DelayThresholds::default());
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].order_id, "stuck");
    }

    #[test]
    fn test_age_thresholds() {
        let t = DelayThresholds::default();
        assert_eq!(classify(&aged("a", 31, OrderStatus::Placed), now(), &t).delay, Some(DelayClass::Critical));
        assert_eq!(classify(&aged("b", 16, OrderStatus::Placed), now(), &t).delay, Some(DelayClass::Warning));
        assert_eq!(classify(&aged("c", 15, OrderStatus::Placed), now(), &t).delay, Some(DelayClass::OnTime));
        // a placed order is never a bottleneck, nobody has started it
        assert_eq!(classify(&aged("d", 25, OrderStatus::Placed), now(), &t).delay, Some(DelayClass::Warning));
        assert_eq!(classify(&aged("e", 90, OrderStatus::Served), now(), &t).delay, None);
    }

    #[test]
    fn test_partial_minutes_count_towards_thresholds() {
        let t = DelayThresholds::default();
        let mut order = aged("O1", 15, OrderStatus::Placed);
        order.created_at = order.created_at - Duration::seconds(59);

        let signal = classify(&order, now(), &t);
        assert_eq!(signal.age_minutes, 15);
        assert_eq!(signal.age_seconds, 15 * 60 + 59);
        assert_eq!(signal.delay, Some(DelayClass::Warning));
        assert_eq!(signal.urgency, Urgency::Medium);

        order.status = OrderStatus::Preparing;
        order.created_at = now() - Duration::minutes(20) - Duration::seconds(1);
        assert_eq!(classify(&order, now(), &t).delay, Some(DelayClass::Bottleneck));
    }

    #[test]
    fn test_future_timestamps_count_as_fresh() {
        let order = aged("O1", -5, OrderStatus::Placed);
        let signal = classify(&order, now(), &DelayThresholds::default());
        assert_eq!(signal.age_seconds, 0);
        assert_eq!(signal.delay, Some(DelayClass::OnTime));
    }

    #[test]
    fn test_threshold_validation() {
        assert!(DelayThresholds::default().validate().is_ok());

        let flat = DelayThresholds {
            warning_minutes: 10,
            bottleneck_minutes: 10,
            critical_minutes: 10,
        };
        assert!(flat.validate().is_ok());

        let negative = DelayThresholds {
            warning_minutes: -1,
            ..Default::default()
        };
        assert!(matches!(negative.validate(), Err(Error::Validation { .. })));

        let inverted = DelayThresholds {
            bottleneck_minutes: 40,
            ..Default::default()
        };
        assert!(matches!(inverted.validate(), Err(Error::Validation { .. })));

        let early_bottleneck = DelayThresholds {
            bottleneck_minutes: 10,
            ..Default::default()
        };
        assert!(matches!(early_bottleneck.validate(), Err(Error::Validation { .. })));
    }

    #[test]
    fn test_urgency_from_flags_and_notes() {
        let t = DelayThresholds::default();
        let mut order = aged("O1", 2, OrderStatus::Placed);
        assert_eq!(classify(&order, now(), &t).urgency, Urgency::Low);

        order.notes = Some("VIP guest, No Onion please".to_string());
        let signal = classify(&order, now(), &t);
        assert_eq!(signal.urgency, Urgency::High);
        assert_eq!(signal.badges, vec![NoteBadge::NoOnion, NoteBadge::Vip]);

        order.notes = None;
        order.priority = true;
        assert_eq!(classify(&order, now(), &t).urgency, Urgency::High);

        assert_eq!(classify(&aged("O2", 45, OrderStatus::Placed), now(), &t).urgency, Urgency::High);
    }

    #[test]
    fn test_worklist_sorts_by_class_then_age() {
        let orders = vec![
            aged("fresh", 3, OrderStatus::Placed),
            aged("warn-young", 17, OrderStatus::Placed),
            aged("critical", 35, OrderStatus::Placed),
            aged("bottleneck", 22, OrderStatus::Preparing),
            aged("warn-old", 19, OrderStatus::Placed),
            aged("fresher", 1, OrderStatus::Preparing),
        ];
        let ids: Vec<String> = worklist(&orders, now(), &DelayThresholds::default())
            .into_iter()
            .map(|s| s.order_id)
            .collect();
        assert_eq!(
            ids,
            vec!["bottleneck", "critical", "warn-old", "warn-young", "fresh", "fresher"]
        );
    }

    #[test]
    fn test_equal_age_ties_break_on_id() {
        let orders = vec![aged("b", 5, OrderStatus::Placed), aged("a", 5, OrderStatus::Placed)];
        let list = worklist(&orders, now(), &DelayThresholds::default());
        assert_eq!(list[0].order_id, "a");
    }
}
