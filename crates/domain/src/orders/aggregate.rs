use async_trait::async_trait;
use chrono::{DateTime, Utc};
use cqrs_es::Aggregate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::errors::Error;
use crate::stations::{Station, StationRouter};

use super::status::{derive_order_status, ItemStatus, OrderStatus};
use super::{Command, Event};

/// How the order leaves the kitchen
#[derive(Clone, Copy, Debug, Serialize, Deserialize, Eq, PartialEq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderType {
    DineIn,
    Delivery,
    #[serde(alias = "TAKEAWAY")]
    Parcel,
}

impl Default for OrderType {
    fn default() -> Self {
        Self::DineIn
    }
}

/// Order aggregate
#[derive(Clone, Debug, Default, Serialize, Deserialize, Eq, PartialEq)]
pub struct Order {
    pub id: String,
    pub order_type: OrderType,
    #[serde(default)]
    pub table_number: Option<u32>,
    #[serde(default)]
    pub customer_name: Option<String>,
    pub status: OrderStatus,
    pub items: Vec<Item>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub priority: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, Deserialize, Eq, PartialEq)]
pub struct Item {
    pub id: String,
    pub name: String,
    pub quantity: u32,
    /// Minor currency units
    pub price: u64,
    pub station: Station,
    pub status: ItemStatus,
}

pub const AGGREGATE_TYPE: &str = "Order";

#[derive(Clone, Debug)]
pub struct Services {
    pub router: StationRouter,
    /// Station allowed to serve a ready order besides the supervisor
    pub finishing_station: Station,
}

impl Default for Services {
    fn default() -> Self {
        Self {
            router: StationRouter::default(),
            finishing_station: Station::Prep,
        }
    }
}

#[async_trait]
impl Aggregate for Order {
    type Command = Command;
    type Event = Event;
    type Error = Error;
    type Services = Services;

    fn aggregate_type() -> String {
        AGGREGATE_TYPE.to_string()
    }

    async fn handle(
        &self,
        command: Self::Command,
        services: &Self::Services,
    ) -> Result<Vec<Self::Event>, Self::Error> {
        self.decide(command, services, Utc::now())
    }

    fn apply(&mut self, event: Self::Event) {
        match event {
            Event::OrderPlaced {
                id,
                order_type,
                table_number,
                customer_name,
                notes,
                priority,
                items,
                created_at,
            } => {
                self.id = id;
                self.order_type = order_type;
                self.table_number = table_number;
                self.customer_name = customer_name;
                self.notes = notes;
                self.priority = priority;
                self.items = items;
                self.created_at = created_at;
                self.updated_at = created_at;
                self.status = OrderStatus::Placed;
            }

            Event::ItemStatusChanged { item_id, to, updated_at, .. } => {
                if let Some(item) = self.items.iter_mut().find(|i| i.id == item_id) {
                    item.status = to;
                }
                self.updated_at = updated_at;
            }

            Event::PriorityChanged { priority, updated_at, .. } => {
                self.priority = priority;
                self.updated_at = updated_at;
            }

            Event::OrderServed { updated_at, .. } => {
                self.status = OrderStatus::Served;
                self.updated_at = updated_at;
            }

            Event::OrderCancelled { updated_at, .. } => {
                self.status = OrderStatus::Cancelled;
                self.updated_at = updated_at;
            }
        }

        self.status = derive_order_status(self.status, self.items.iter().map(|i| i.status));
    }
}

impl Order {
    /// Decides which events a command produces against the current state.
    ///
    /// Re-issuing a start or finish against items that already moved on yields
    /// no events rather than an error, so actions computed from a stale poll
    /// stay harmless.
    pub fn decide(
        &self,
        command: Command,
        services: &Services,
        now: DateTime<Utc>,
    ) -> Result<Vec<Event>, Error> {
        match command {
            Command::PlaceOrder {
                id,
                order_type,
                table_number,
                customer_name,
                notes,
                priority,
                items,
            } => {
                self.validate_new()?;
                let items = validate_items(items, &services.router)?;
                if id.trim().is_empty() {
                    return Err(Error::Validation {
                        message: "Order id must not be blank".to_string(),
                    });
                }

                Ok(vec![Event::OrderPlaced {
                    id,
                    order_type,
                    table_number,
                    customer_name,
                    notes,
                    priority,
                    items,
                    created_at: now,
                }])
            }

            Command::StartItem { item_id } => {
                self.validate_active("StartItem")?;
                let item = self.find_item(&item_id)?;
                match item.status {
                    ItemStatus::Pending => {
                        Ok(vec![self.item_changed(item, ItemStatus::Preparing, now)])
                    }
                    ItemStatus::Preparing => Ok(vec![]),
                    ItemStatus::Completed => {
                        Err(Error::transition(item.status, ItemStatus::Preparing))
                    }
                }
            }

            Command::CompleteItem { item_id } => {
                self.validate_active("CompleteItem")?;
                let item = self.find_item(&item_id)?;
                match item.status {
                    ItemStatus::Completed => Ok(vec![]),
                    _ => Ok(vec![self.item_changed(item, ItemStatus::Completed, now)]),
                }
            }

            Command::RevertItem { item_id } => {
                self.validate_active("RevertItem")?;
                let item = self.find_item(&item_id)?;
                let to = match item.status {
                    ItemStatus::Completed => ItemStatus::Preparing,
                    ItemStatus::Preparing => ItemStatus::Pending,
                    ItemStatus::Pending => {
                        return Err(Error::transition(item.status, "previous status"))
                    }
                };
                Ok(vec![self.item_changed(item, to, now)])
            }

            Command::StartStationItems { station } => {
                self.validate_active("StartStationItems")?;
                Ok(self
                    .items
                    .iter()
                    .filter(|i| station.acts_on(i.station) && i.status == ItemStatus::Pending)
                    .map(|i| self.item_changed(i, ItemStatus::Preparing, now))
                    .collect())
            }

            Command::FinishStationItems { station } => {
                self.validate_active("FinishStationItems")?;
                Ok(self
                    .items
                    .iter()
                    .filter(|i| station.acts_on(i.station) && i.status != ItemStatus::Completed)
                    .map(|i| self.item_changed(i, ItemStatus::Completed, now))
                    .collect())
            }

            Command::SetPriority { priority } => {
                self.validate_active("SetPriority")?;
                if self.priority == priority {
                    return Ok(vec![]);
                }
                Ok(vec![Event::PriorityChanged {
                    id: self.id.clone(),
                    priority,
                    updated_at: now,
                }])
            }

            Command::ServeOrder { by } => {
                self.validate_existing()?;
                if self.status != OrderStatus::Ready {
                    return Err(Error::transition(self.status, OrderStatus::Served));
                }
                if !by.is_supervisor() && by != services.finishing_station {
                    return Err(Error::Forbidden {
                        reason: format!("station {by} cannot serve orders"),
                    });
                }

                Ok(vec![Event::OrderServed {
                    id: self.id.clone(),
                    by,
                    updated_at: now,
                }])
            }

            Command::CancelOrder => {
                self.validate_existing()?;
                if self.status.is_terminal() {
                    return Err(Error::transition(self.status, OrderStatus::Cancelled));
                }

                Ok(vec![Event::OrderCancelled {
                    id: self.id.clone(),
                    updated_at: now,
                }])
            }
        }
    }

    pub fn item(&self, item_id: &str) -> Option<&Item> {
        self.items.iter().find(|i| i.id == item_id)
    }

    /// Table number for dine-in, customer name otherwise, falling back to the id.
    pub fn label(&self) -> String {
        match (self.order_type, self.table_number, &self.customer_name) {
            (OrderType::DineIn, Some(table), _) => format!("Table {table}"),
            (_, _, Some(name)) => name.clone(),
            _ => self.id.clone(),
        }
    }

    fn item_changed(&self, item: &Item, to: ItemStatus, now: DateTime<Utc>) -> Event {
        Event::ItemStatusChanged {
            id: self.id.clone(),
            item_id: item.id.clone(),
            station: item.station,
            from: item.status,
            to,
            updated_at: now,
        }
    }

    fn find_item(&self, item_id: &str) -> Result<&Item, Error> {
        self.item(item_id).ok_or_else(|| Error::NotFound {
            entity: format!("Item {item_id}"),
        })
    }

    fn validate_new(&self) -> Result<(), Error> {
        if !self.id.is_empty() {
            return Err(Error::Uniqueness { field: "id".to_string() });
        }
        Ok(())
    }

    fn validate_existing(&self) -> Result<(), Error> {
        if self.id.is_empty() {
            return Err(Error::NotFound { entity: AGGREGATE_TYPE.to_string() });
        }
        Ok(())
    }

    fn validate_active(&self, action: &str) -> Result<(), Error> {
        self.validate_existing()?;
        if self.status.is_terminal() {
            return Err(Error::transition(self.status, action));
        }
        Ok(())
    }
}

fn validate_items(
    items: Vec<super::commands::NewItem>,
    router: &StationRouter,
) -> Result<Vec<Item>, Error> {
    if items.is_empty() {
        return Err(Error::Validation {
            message: "Cannot place an order without items".to_string(),
        });
    }

    let mut seen = HashSet::new();
    items
        .into_iter()
        .map(|item| {
            if item.name.trim().is_empty() {
                return Err(Error::Validation {
                    message: format!("Item {} has no name", item.id),
                });
            }
            if item.quantity == 0 {
                return Err(Error::Validation {
                    message: format!("Item {} must have a positive quantity", item.name),
                });
            }
            if !seen.insert(item.id.clone()) {
                return Err(Error::Uniqueness { field: "item_id".to_string() });
            }

            Ok(Item {
                station: item.station.unwrap_or_else(|| router.route(&item.name)),
                id: item.id,
                name: item.name,
                quantity: item.quantity,
                price: item.price,
                status: ItemStatus::Pending,
            })
        })
        .collect()
}
