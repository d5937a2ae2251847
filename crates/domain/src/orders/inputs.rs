use serde::{Deserialize, Serialize};
use ulid::Ulid;

use super::aggregate::OrderType;
use super::commands::{Command, NewItem};
use crate::stations::Station;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlaceOrderInput {
    /// Upstream id, generated when absent
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub order_type: OrderType,
    #[serde(default)]
    pub table_number: Option<u32>,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub priority: bool,
    pub items: Vec<NewItemInput>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NewItemInput {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    pub quantity: u32,
    #[serde(default)]
    pub price: u64,
    #[serde(default)]
    pub station: Option<Station>,
}

impl PlaceOrderInput {
    /// Builds the aggregate id and the `PlaceOrder` command, assigning ULIDs
    /// to anything the ordering flow left unnamed.
    pub fn into_command(self) -> (String, Command) {
        let id = self.id.unwrap_or_else(|| Ulid::new().to_string());
        let items = self
            .items
            .into_iter()
            .map(|item| NewItem {
                id: item.id.unwrap_or_else(|| Ulid::new().to_string()),
                name: item.name,
                quantity: item.quantity,
                price: item.price,
                station: item.station,
            })
            .collect();

        let command = Command::PlaceOrder {
            id: id.clone(),
            order_type: self.order_type,
            table_number: self.table_number,
            customer_name: self.customer_name,
            notes: self.notes,
            priority: self.priority,
            items,
        };
        (id, command)
    }
}
