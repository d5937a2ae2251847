//! Fixed-interval refresh of the order snapshot.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{self, MissedTickBehavior};

use crate::orders::Order;
use crate::service::OrderService;

pub struct Poller {
    service: Arc<dyn OrderService>,
    interval: Duration,
    last_good: Vec<Order>,
    failures: u32,
}

impl Poller {
    pub fn new(service: Arc<dyn OrderService>, interval: Duration) -> Self {
        Self {
            service,
            interval,
            last_good: Vec::new(),
            failures: 0,
        }
    }

    /// Consecutive failed polls since the last successful one.
    pub fn failures(&self) -> u32 {
        self.failures
    }

    /// Polls once. An unreachable service leaves the last known good
    /// snapshot in place.
    pub async fn refresh(&mut self) -> &[Order] {
        match self.service.list_orders().await {
            Ok(orders) => {
                if self.failures > 0 {
                    tracing::info!(
                        "Order service reachable again after {} failed polls",
                        self.failures
                    );
                }
                tracing::debug!("Polled {} orders", orders.len());
                self.failures = 0;
                self.last_good = orders;
            }
            Err(e) if e.is_transient() => {
                self.failures += 1;
                tracing::warn!(
                    "Poll failed ({} in a row), keeping {} known orders: {}",
                    self.failures,
                    self.last_good.len(),
                    e
                );
            }
            Err(e) => {
                self.failures += 1;
                tracing::error!(
                    "Order service rejected the poll, keeping {} known orders: {}",
                    self.last_good.len(),
                    e
                );
            }
        }
        &self.last_good
    }

    /// Publishes a snapshot every tick until every receiver is dropped.
    pub async fn run(mut self, tx: watch::Sender<Vec<Order>>) {
        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;
            let snapshot = self.refresh().await.to_vec();
            if tx.send(snapshot).is_err() {
                tracing::info!("No displays left, stopping poller");
                break;
            }
        }
    }
}
