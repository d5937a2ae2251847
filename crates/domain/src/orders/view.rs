use async_trait::async_trait;
use cqrs_es::{Aggregate, EventEnvelope, View as CqrsView};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::{Order, AGGREGATE_TYPE};

#[derive(Clone, Debug, Default, Serialize, Deserialize, Eq, PartialEq)]
pub struct View {
    pub aggregate_type: String,
    pub command_id: String,
    pub id: String,
    pub order: Order,
}

impl CqrsView<Order> for View {
    fn update(&mut self, event: &EventEnvelope<Order>) {
        self.id.clone_from(&event.aggregate_id);
        self.aggregate_type = AGGREGATE_TYPE.to_string();
        self.command_id = event
            .metadata
            .get("command_id")
            .cloned()
            .unwrap_or_default();
        self.order.apply(event.payload.clone());
    }
}

/// In-memory read model of every order, keyed by order id.
pub type OrderBoard = Arc<RwLock<HashMap<String, View>>>;

/// Keeps the order board current as events are committed.
pub struct Query {
    board: OrderBoard,
}

impl Query {
    pub fn new(board: OrderBoard) -> Self {
        Self { board }
    }
}

#[async_trait]
impl cqrs_es::Query<Order> for Query {
    async fn dispatch(&self, order_id: &str, events: &[EventEnvelope<Order>]) {
        let mut board = self.board.write().await;
        let view = board.entry(order_id.to_string()).or_default();
        for event in events {
            view.update(event);
        }
        tracing::debug!(order_id, status = %view.order.status, "order view updated");
    }
}
