//! Cross-order production totals per station, so identical dishes can be cooked together.

use derive_new::new;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::orders::{Command, ItemStatus, Order};
use crate::stations::Station;

/// One order line backing a batch.
#[derive(new, Clone, Debug, Serialize, Deserialize, Eq, PartialEq)]
pub struct BatchInstance {
    pub order_id: String,
    pub item_id: String,
    pub status: ItemStatus,
    pub quantity: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize, Eq, PartialEq)]
pub struct BatchGroup {
    pub name: String,
    pub station: Station,
    /// Whether the viewing station may start or finish this batch. Unclassified
    /// dishes on a station board are shown for reference only.
    pub actionable: bool,
    pub total: u64,
    pub pending_count: u64,
    pub preparing_count: u64,
    pub completed_count: u64,
    pub instances: Vec<BatchInstance>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BatchAction {
    Start,
    Finish,
}

impl BatchGroup {
    fn new(name: String, station: Station, actionable: bool) -> Self {
        Self {
            name,
            station,
            actionable,
            total: 0,
            pending_count: 0,
            preparing_count: 0,
            completed_count: 0,
            instances: Vec::new(),
        }
    }

    fn add(&mut self, instance: BatchInstance) {
        let quantity = u64::from(instance.quantity);
        self.total += quantity;
        match instance.status {
            ItemStatus::Pending => self.pending_count += quantity,
            ItemStatus::Preparing => self.preparing_count += quantity,
            ItemStatus::Completed => self.completed_count += quantity,
        }
        self.instances.push(instance);
    }

    pub fn has_outstanding_work(&self) -> bool {
        self.pending_count > 0 || self.preparing_count > 0
    }

    /// Distinct orders a batch action has to be sent to, in first-seen order.
    pub fn target_orders(&self, action: BatchAction) -> Vec<String> {
        let mut seen = BTreeSet::new();
        self.instances
            .iter()
            .filter(|i| match action {
                BatchAction::Start => i.status == ItemStatus::Pending,
                BatchAction::Finish => i.status != ItemStatus::Completed,
            })
            .filter(|i| seen.insert(i.order_id.as_str()))
            .map(|i| i.order_id.clone())
            .collect()
    }

    /// Order-scoped bulk commands for the batch. These flush the station's
    /// whole queue in each target order, not just this dish. View-only groups
    /// produce no commands.
    pub fn commands(&self, action: BatchAction) -> Vec<(String, Command)> {
        if !self.actionable {
            return Vec::new();
        }
        self.target_orders(action)
            .into_iter()
            .map(|order_id| {
                let command = match action {
                    BatchAction::Start => Command::StartStationItems { station: self.station },
                    BatchAction::Finish => Command::FinishStationItems { station: self.station },
                };
                (order_id, command)
            })
            .collect()
    }
}

/// Builds the batch board for `viewer` from a snapshot.
///
/// Only open orders contribute. Groups are keyed by dish name and item
/// station: a specific station sees its own dishes plus the unclassified
/// (`Station::All`) bucket, the latter as view-only groups; the supervisor
/// sees and acts on everything. Groups with nothing pending or preparing are
/// dropped, the rest are sorted largest first.
pub fn batches(orders: &[Order], viewer: Station) -> Vec<BatchGroup> {
    let mut groups: BTreeMap<(String, Station), BatchGroup> = BTreeMap::new();

    for order in orders.iter().filter(|o| o.status.is_open()) {
        for item in order.items.iter().filter(|i| viewer.sees(i.station)) {
            let station = item.station;
            groups
                .entry((item.name.clone(), station))
                .or_insert_with(|| {
                    BatchGroup::new(item.name.clone(), station, viewer.acts_on(station))
                })
                .add(BatchInstance::new(
                    order.id.clone(),
                    item.id.clone(),
                    item.status,
                    item.quantity,
                ));
        }
    }

    let mut shown: Vec<BatchGroup> = groups
        .into_values()
        .filter(BatchGroup::has_outstanding_work)
        .collect();
    // BTreeMap already yields (name, station) ascending; stable sort keeps that for ties
    shown.sort_by(|a, b| b.total.cmp(&a.total));
    shown
}
