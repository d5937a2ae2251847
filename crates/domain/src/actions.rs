//! Action handlers for kitchen terminals.
//!
//! `apply_action` is the optimistic local update over a polled snapshot;
//! `perform` sends the same action to the order service. Neither lets a
//! failure escape: the caller gets a [`Notice`] to show instead.

use chrono::{DateTime, Utc};
use cqrs_es::Aggregate;
use derive_new::new;
use serde::{Deserialize, Serialize};

use crate::errors::Error;
use crate::orders::{Command, Order, Services};
use crate::service::OrderService;

#[derive(new, Clone, Debug, Serialize, Deserialize, Eq, PartialEq)]
pub struct Action {
    pub order_id: String,
    pub command: Command,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Warning,
}

/// Transient message for the terminal that issued an action.
#[derive(Clone, Debug, Serialize, Deserialize, Eq, PartialEq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl From<&Error> for Notice {
    fn from(error: &Error) -> Self {
        let level = match error {
            Error::NotFound { .. } => NoticeLevel::Info,
            _ => NoticeLevel::Warning,
        };
        Self {
            level,
            message: error.to_string(),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ActionOutcome {
    pub orders: Vec<Order>,
    /// Number of events the action produced; zero for no-ops and rejections
    pub changed: usize,
    pub notice: Option<Notice>,
}

/// Applies `action` to a snapshot and returns the next snapshot.
///
/// Rejected actions leave the snapshot untouched. A `PlaceOrder` must carry
/// the same id the action targets.
pub fn apply_action(
    snapshot: &[Order],
    action: &Action,
    services: &Services,
    now: DateTime<Utc>,
) -> ActionOutcome {
    let mut orders = snapshot.to_vec();

    if let Command::PlaceOrder { id, .. } = &action.command {
        if *id != action.order_id {
            let error = Error::Validation {
                message: format!(
                    "Order id {} does not match action target {}",
                    id, action.order_id
                ),
            };
            return rejected(orders, &action.command, &error);
        }
    }

    let position = orders.iter().position(|o| o.id == action.order_id);

    let current = match (position, &action.command) {
        (Some(index), _) => orders[index].clone(),
        (None, Command::PlaceOrder { .. }) => Order::default(),
        (None, _) => {
            let error = Error::NotFound {
                entity: format!("Order {}", action.order_id),
            };
            return rejected(orders, &action.command, &error);
        }
    };

    let events = match current.decide(action.command.clone(), services, now) {
        Ok(events) => events,
        Err(error) => return rejected(orders, &action.command, &error),
    };

    let changed = events.len();
    let mut next = current;
    for event in events {
        next.apply(event);
    }

    match position {
        Some(index) => orders[index] = next,
        None => orders.push(next),
    }

    ActionOutcome {
        orders,
        changed,
        notice: None,
    }
}

fn rejected(orders: Vec<Order>, command: &Command, error: &Error) -> ActionOutcome {
    tracing::warn!("{} rejected locally: {}", command.name(), error);
    ActionOutcome {
        orders,
        changed: 0,
        notice: Some(Notice::from(error)),
    }
}

/// Sends an action to the order service, folding any failure into a notice.
pub async fn perform(service: &dyn OrderService, action: Action) -> Option<Notice> {
    match service.execute(&action.order_id, action.command).await {
        Ok(()) => None,
        Err(error) => Some(Notice::from(&error)),
    }
}
