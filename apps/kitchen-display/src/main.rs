use anyhow::Context;
use chrono::Utc;
use kitchen_domain::{
    batch::{batches, BatchAction},
    delay::worklist,
    orders::{Event, Order, PlaceOrderInput},
    poller::Poller,
    DomainEvent, KitchenConfig, LocalOrderService, OrderService,
};
use std::{path::Path, sync::Arc};
use tokio::sync::{broadcast, watch};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(false)
        .without_time()
        .init();

    let config = KitchenConfig::from_env()?;
    tracing::info!(
        "Kitchen display for {} polling every {}s",
        config.station,
        config.poll_interval.as_secs()
    );

    let service = LocalOrderService::new(config.services(), config.event_capacity);
    let notifications = service.subscribe();

    if let Some(path) = &config.seed_file {
        seed(&service, path).await?;
    }

    let (tx, rx) = watch::channel(Vec::new());
    let service: Arc<dyn OrderService> = Arc::new(service);
    tokio::spawn(Poller::new(service, config.poll_interval).run(tx));
    tokio::spawn(log_notifications(notifications));

    tokio::select! {
        _ = render_loop(rx, &config) => {}
        result = tokio::signal::ctrl_c() => {
            result?;
            tracing::info!("Shutting down");
        }
    }

    Ok(())
}

// Place the tickets listed in the seed file
async fn seed(service: &LocalOrderService, path: &Path) -> anyhow::Result<()> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading seed file {}", path.display()))?;
    let inputs: Vec<PlaceOrderInput> = serde_json::from_str(&raw)
        .with_context(|| format!("parsing seed file {}", path.display()))?;

    tracing::info!("Seeding {} orders", inputs.len());

    for input in inputs {
        if let Err(e) = service.place_order(input).await {
            tracing::warn!("Skipping seed order: {}", e);
        }
    }

    Ok(())
}

async fn render_loop(mut rx: watch::Receiver<Vec<Order>>, config: &KitchenConfig) {
    while rx.changed().await.is_ok() {
        let orders = rx.borrow_and_update().clone();
        render(&orders, config);
    }
}

fn render(orders: &[Order], config: &KitchenConfig) {
    let board = batches(orders, config.station);
    tracing::info!("{} open batches at {}", board.len(), config.station);

    for group in &board {
        tracing::info!(
            "  {} x{} [{}{}] pending {} / preparing {} / done {} across {} orders",
            group.name,
            group.total,
            group.station,
            if group.actionable { "" } else { ", view only" },
            group.pending_count,
            group.preparing_count,
            group.completed_count,
            group.target_orders(BatchAction::Finish).len()
        );
    }

    for signal in worklist(orders, Utc::now(), &config.thresholds) {
        let label = orders
            .iter()
            .find(|o| o.id == signal.order_id)
            .map(Order::label)
            .unwrap_or_else(|| signal.order_id.clone());

        tracing::info!(
            "  {} {:?} {}m urgency {:?} {:?}",
            label,
            signal.delay,
            signal.age_minutes,
            signal.urgency,
            signal.badges
        );
    }
}

async fn log_notifications(mut rx: broadcast::Receiver<DomainEvent>) {
    loop {
        match rx.recv().await {
            Ok(event) => match event.decode::<Order>() {
                Ok(Event::OrderServed { id, by, .. }) => {
                    tracing::info!("Order {} served by {}", id, by)
                }
                Ok(Event::OrderCancelled { id, .. }) => tracing::info!("Order {} cancelled", id),
                Ok(Event::PriorityChanged { id, priority: true, .. }) => {
                    tracing::info!("Order {} flagged as priority", id)
                }
                Ok(_) => tracing::debug!("Received event: {} for {}", event.event_type, event.id),
                Err(e) => tracing::warn!("Undecodable event {}: {}", event.event_type, e),
            },
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!("Notification feed lagged, {} events skipped", skipped);
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}
