/// Order aggregate
pub mod aggregate;

/// Commands
pub mod commands;

/// Events
pub mod events;

/// Input DTOs
pub mod inputs;

/// Order and item statuses
pub mod status;

/// View (read model)
pub mod view;

/// CQRS setup
pub mod cqrs;

pub use aggregate::{Item, Order, OrderType, Services, AGGREGATE_TYPE};
pub use commands::{Command, NewItem};
pub use events::Event;
pub use inputs::{NewItemInput, PlaceOrderInput};
pub use status::{derive_order_status, ItemStatus, OrderStatus};
pub use view::{OrderBoard, Query, View};
