use chrono::{DateTime, Utc};
use cqrs_es::DomainEvent;
use serde::{Deserialize, Serialize};

use super::aggregate::{Item, OrderType};
use super::status::ItemStatus;
use crate::stations::Station;

#[derive(Clone, Debug, Serialize, Deserialize, Eq, PartialEq)]
#[serde(tag = "type")]
pub enum Event {
    OrderPlaced {
        id: String,
        order_type: OrderType,
        table_number: Option<u32>,
        customer_name: Option<String>,
        notes: Option<String>,
        priority: bool,
        items: Vec<Item>,
        created_at: DateTime<Utc>,
    },

    ItemStatusChanged {
        id: String,
        item_id: String,
        station: Station,
        from: ItemStatus,
        to: ItemStatus,
        updated_at: DateTime<Utc>,
    },

    PriorityChanged {
        id: String,
        priority: bool,
        updated_at: DateTime<Utc>,
    },

    OrderServed {
        id: String,
        by: Station,
        updated_at: DateTime<Utc>,
    },

    OrderCancelled {
        id: String,
        updated_at: DateTime<Utc>,
    },
}

impl DomainEvent for Event {
    fn event_type(&self) -> String {
        match self {
            Event::OrderPlaced { .. } => "Order:Placed".to_string(),
            Event::ItemStatusChanged { .. } => "Order:ItemStatusChanged".to_string(),
            Event::PriorityChanged { .. } => "Order:PriorityChanged".to_string(),
            Event::OrderServed { .. } => "Order:Served".to_string(),
            Event::OrderCancelled { .. } => "Order:Cancelled".to_string(),
        }
    }

    fn event_version(&self) -> String {
        "1.0".to_string()
    }
}
