use serde::{Deserialize, Serialize};
use std::fmt;

/// Order workflow status. Everything but `Served` and `Cancelled` is derived
/// from the item statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// No item has left the queue yet
    #[serde(alias = "NEW")]
    Placed,
    /// At least one item is being (or has been) worked on
    #[serde(alias = "COOKING")]
    Preparing,
    /// Every item is completed, waiting for the serve/deliver action
    Ready,
    /// Handed over to the guest or the rider
    #[serde(alias = "COMPLETED")]
    Served,
    Cancelled,
}

impl OrderStatus {
    /// No transition is legal once an order is terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Served | Self::Cancelled)
    }

    /// Orders the kitchen still has work on.
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Placed | Self::Preparing)
    }
}

impl Default for OrderStatus {
    fn default() -> Self {
        Self::Placed
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Placed => write!(f, "PLACED"),
            Self::Preparing => write!(f, "PREPARING"),
            Self::Ready => write!(f, "READY"),
            Self::Served => write!(f, "SERVED"),
            Self::Cancelled => write!(f, "CANCELLED"),
        }
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PLACED" | "NEW" => Ok(Self::Placed),
            "PREPARING" | "COOKING" => Ok(Self::Preparing),
            "READY" => Ok(Self::Ready),
            "SERVED" | "COMPLETED" => Ok(Self::Served),
            "CANCELLED" => Ok(Self::Cancelled),
            _ => Err(format!("Invalid order status: {s}")),
        }
    }
}

/// Line item status, ordered by progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemStatus {
    Pending,
    Preparing,
    Completed,
}

impl Default for ItemStatus {
    fn default() -> Self {
        Self::Pending
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "PENDING"),
            Self::Preparing => write!(f, "PREPARING"),
            Self::Completed => write!(f, "COMPLETED"),
        }
    }
}

impl std::str::FromStr for ItemStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PENDING" => Ok(Self::Pending),
            "PREPARING" => Ok(Self::Preparing),
            "COMPLETED" => Ok(Self::Completed),
            _ => Err(format!("Invalid item status: {s}")),
        }
    }
}

/// Recomputes the order status from its items.
///
/// Terminal statuses stick. An order that has started never falls back to
/// `Placed`, even if a manual correction returns every item to the queue.
pub fn derive_order_status<I>(current: OrderStatus, item_statuses: I) -> OrderStatus
where
    I: IntoIterator<Item = ItemStatus>,
{
    if current.is_terminal() {
        return current;
    }

    let mut any = false;
    let mut all_completed = true;
    let mut any_started = false;
    for status in item_statuses {
        any = true;
        all_completed &= status == ItemStatus::Completed;
        any_started |= status != ItemStatus::Pending;
    }

    if any && all_completed {
        OrderStatus::Ready
    } else if any_started || current != OrderStatus::Placed {
        OrderStatus::Preparing
    } else {
        OrderStatus::Placed
    }
}
