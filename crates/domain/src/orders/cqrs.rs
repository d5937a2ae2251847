use cqrs_es::{mem_store::MemStore, CqrsFramework, Query as CqrsQuery};
use std::sync::Arc;
use tokio::sync::broadcast;

use super::{Order, OrderBoard, Query, Services};
use crate::event::DomainEvent;
use crate::publisher::Publisher;

pub type OrderCqrs = CqrsFramework<Order, MemStore<Order>>;

pub fn init(
    board: OrderBoard,
    events: broadcast::Sender<DomainEvent>,
    services: Services,
) -> Arc<OrderCqrs> {
    let store: MemStore<Order> = MemStore::default();

    let queries: Vec<Box<dyn CqrsQuery<Order>>> = vec![
        Box::new(Query::new(board)),
        Box::new(Publisher::<Order>::new(events)),
    ];

    Arc::new(CqrsFramework::new(store, queries, services))
}

pub fn init_board() -> OrderBoard {
    OrderBoard::default()
}
