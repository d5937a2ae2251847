//! The order service the kitchen talks to, and an in-process implementation
//! backed by the event-sourced order aggregate.

use async_trait::async_trait;
use cqrs_es::AggregateError;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::broadcast;
use ulid::Ulid;

use crate::errors::Error;
use crate::event::DomainEvent;
use crate::orders::cqrs::{self, OrderCqrs};
use crate::orders::{Command, ItemStatus, Order, OrderBoard, OrderStatus, PlaceOrderInput, Services};
use crate::stations::Station;

#[async_trait]
pub trait OrderService: Send + Sync {
    /// Current snapshot of every known order.
    async fn list_orders(&self) -> Result<Vec<Order>, Error>;

    /// Accepts a ticket from the ordering flow and returns its id.
    async fn place_order(&self, input: PlaceOrderInput) -> Result<String, Error>;

    async fn execute(&self, order_id: &str, command: Command) -> Result<(), Error>;

    /// Only the explicit transitions can be requested; the rest are derived
    /// from the items.
    async fn update_order_status(
        &self,
        order_id: &str,
        status: OrderStatus,
        by: Station,
    ) -> Result<(), Error> {
        let command = match status {
            OrderStatus::Served => Command::ServeOrder { by },
            OrderStatus::Cancelled => Command::CancelOrder,
            derived => {
                return Err(Error::Validation {
                    message: format!("{derived} is derived from item statuses"),
                })
            }
        };
        self.execute(order_id, command).await
    }

    async fn update_item_status(
        &self,
        order_id: &str,
        item_id: &str,
        status: ItemStatus,
    ) -> Result<(), Error> {
        let item_id = item_id.to_string();
        let command = match status {
            ItemStatus::Preparing => Command::StartItem { item_id },
            ItemStatus::Completed => Command::CompleteItem { item_id },
            ItemStatus::Pending => Command::RevertItem { item_id },
        };
        self.execute(order_id, command).await
    }

    async fn start_station_items(&self, order_id: &str, station: Station) -> Result<(), Error> {
        self.execute(order_id, Command::StartStationItems { station }).await
    }

    async fn finish_station_items(&self, order_id: &str, station: Station) -> Result<(), Error> {
        self.execute(order_id, Command::FinishStationItems { station }).await
    }

    async fn set_priority(&self, order_id: &str, priority: bool) -> Result<(), Error> {
        self.execute(order_id, Command::SetPriority { priority }).await
    }

    /// Deliver/serve action for a ready order.
    async fn notify_ready(&self, order_id: &str, by: Station) -> Result<(), Error> {
        self.execute(order_id, Command::ServeOrder { by }).await
    }
}

/// Order service running the aggregate in memory; committed events are
/// published to `subscribe()` receivers.
#[derive(Clone)]
pub struct LocalOrderService {
    cqrs: Arc<OrderCqrs>,
    board: OrderBoard,
    events: broadcast::Sender<DomainEvent>,
}

impl LocalOrderService {
    pub fn new(services: Services, event_capacity: usize) -> Self {
        let (events, _) = broadcast::channel(event_capacity.max(1));
        let board = cqrs::init_board();
        let cqrs = cqrs::init(board.clone(), events.clone(), services);
        Self { cqrs, board, events }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DomainEvent> {
        self.events.subscribe()
    }

    async fn dispatch(&self, order_id: &str, command: Command) -> Result<(), Error> {
        let name = command.name();
        let mut metadata = HashMap::new();
        metadata.insert("command_id".to_string(), Ulid::new().to_string());

        self.cqrs
            .execute_with_metadata(order_id, command, metadata)
            .await
            .map_err(|e| match e {
                AggregateError::UserError(e) => e,
                other => Error::Unavailable { message: other.to_string() },
            })
            .inspect_err(|e| tracing::warn!("{} rejected for {}: {}", name, order_id, e))?;

        tracing::info!("{} applied to {}", name, order_id);
        Ok(())
    }
}

#[async_trait]
impl OrderService for LocalOrderService {
    async fn list_orders(&self) -> Result<Vec<Order>, Error> {
        let board = self.board.read().await;
        let mut orders: Vec<Order> = board.values().map(|view| view.order.clone()).collect();
        orders.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(orders)
    }

    async fn place_order(&self, input: PlaceOrderInput) -> Result<String, Error> {
        let (id, command) = input.into_command();
        self.dispatch(&id, command).await?;
        Ok(id)
    }

    async fn execute(&self, order_id: &str, command: Command) -> Result<(), Error> {
        if matches!(command, Command::PlaceOrder { .. }) {
            return Err(Error::Validation {
                message: "orders are placed through place_order".to_string(),
            });
        }
        self.dispatch(order_id, command).await
    }
}
