//! Kitchen display domain: order and item status machine, station routing,
//! batch aggregation and delay classification.

/// Snapshot action handlers
pub mod actions;

/// Batch view
pub mod batch;

/// Runtime configuration
pub mod config;

/// Delay and priority classifier
pub mod delay;

/// Domain errors
pub mod errors;

/// Domain events wrapper
pub mod event;

/// Order aggregate
pub mod orders;

/// Snapshot refresh loop
pub mod poller;

/// Event broadcast
pub mod publisher;

/// Order service
pub mod service;

/// Stations and routing
pub mod stations;

pub use config::KitchenConfig;
pub use errors::Error;
pub use event::DomainEvent;
pub use service::{LocalOrderService, OrderService};
pub use stations::{Station, StationRouter};
