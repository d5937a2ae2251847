use serde::{Deserialize, Serialize};

use super::aggregate::OrderType;
use crate::stations::Station;

/// Line item as it arrives from the ordering flow. `station` is routed from
/// the name when absent.
#[derive(Clone, Debug, Serialize, Deserialize, Eq, PartialEq)]
pub struct NewItem {
    pub id: String,
    pub name: String,
    pub quantity: u32,
    pub price: u64,
    pub station: Option<Station>,
}

#[derive(Clone, Debug, Serialize, Deserialize, Eq, PartialEq)]
pub enum Command {
    /// Open a ticket with every item pending
    PlaceOrder {
        id: String,
        order_type: OrderType,
        table_number: Option<u32>,
        customer_name: Option<String>,
        notes: Option<String>,
        priority: bool,
        items: Vec<NewItem>,
    },

    /// PENDING -> PREPARING for one item
    StartItem { item_id: String },

    /// Mark one item ready, from either PENDING or PREPARING
    CompleteItem { item_id: String },

    /// Manual correction: step one item back
    RevertItem { item_id: String },

    /// Start every pending item the station acts on
    StartStationItems { station: Station },

    /// Complete every unfinished item the station acts on
    FinishStationItems { station: Station },

    SetPriority { priority: bool },

    /// Hand a ready order over; issued by the supervisor or the finishing station
    ServeOrder { by: Station },

    CancelOrder,
}

impl Command {
    /// Short name used in logs and notices.
    pub fn name(&self) -> &'static str {
        match self {
            Command::PlaceOrder { .. } => "PlaceOrder",
            Command::StartItem { .. } => "StartItem",
            Command::CompleteItem { .. } => "CompleteItem",
            Command::RevertItem { .. } => "RevertItem",
            Command::StartStationItems { .. } => "StartStationItems",
            Command::FinishStationItems { .. } => "FinishStationItems",
            Command::SetPriority { .. } => "SetPriority",
            Command::ServeOrder { .. } => "ServeOrder",
            Command::CancelOrder => "CancelOrder",
        }
    }
}
