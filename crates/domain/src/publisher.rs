//! Forwards committed events to displays over a broadcast channel.

use async_trait::async_trait;
use cqrs_es::{Aggregate, EventEnvelope, Query};
use std::marker::PhantomData;
use tokio::sync::broadcast;

use crate::event::DomainEvent;

pub struct Publisher<A> {
    tx: broadcast::Sender<DomainEvent>,
    _aggregate: PhantomData<fn() -> A>,
}

impl<A: Aggregate> Publisher<A> {
    pub fn new(tx: broadcast::Sender<DomainEvent>) -> Self {
        Self {
            tx,
            _aggregate: PhantomData,
        }
    }
}

#[async_trait]
impl<A: Aggregate> Query<A> for Publisher<A> {
    async fn dispatch(&self, aggregate_id: &str, events: &[EventEnvelope<A>]) {
        for envelope in events {
            let event = match DomainEvent::from_envelope(envelope) {
                Ok(event) => event,
                Err(e) => {
                    tracing::error!("Failed to encode event for {}: {}", aggregate_id, e);
                    continue;
                }
            };

            tracing::info!("Publishing {} for {}", event.event_type, event.id);

            // nobody listening is fine; displays catch up on the next poll
            if self.tx.send(event).is_err() {
                tracing::debug!("No subscribers for {}", aggregate_id);
            }
        }
    }
}
