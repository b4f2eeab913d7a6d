use std::collections::HashMap;

use tracing::warn;

use crate::domain::{Order, OrderBuckets, OrderId, OrderStatus};

/// The order list from one successful poll, keyed by id.
///
/// A malformed page may list the same id twice: the last occurrence wins and keeps the
/// position of the first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderSnapshot {
    orders: Vec<Order>,
    index: HashMap<OrderId, usize>,
}

impl OrderSnapshot {
    pub fn from_orders(orders: Vec<Order>) -> Self {
        let mut snapshot = Self::default();
        for order in orders {
            if snapshot.index.contains_key(&order.order_id) {
                warn!(order_id = order.order_id, "Duplicate order in poll result, keeping last");
            }
            snapshot.upsert(order);
        }
        snapshot
    }

    pub fn get(&self, order_id: OrderId) -> Option<&Order> {
        self.index.get(&order_id).map(|&pos| &self.orders[pos])
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    /// Replaces the stored order with the same id, or appends it.
    pub fn upsert(&mut self, order: Order) {
        match self.index.get(&order.order_id) {
            Some(&pos) => self.orders[pos] = order,
            None => {
                self.index.insert(order.order_id, self.orders.len());
                self.orders.push(order);
            }
        }
    }

    pub fn buckets(&self) -> OrderBuckets {
        OrderBuckets::from_orders(&self.orders)
    }
}

/// A status transition worth telling the user about.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusChanged {
    pub order_id: OrderId,
    pub previous: Option<OrderStatus>,
    pub status: OrderStatus,
}

/// Compares `current` against the previous poll.
///
/// `previous == None` means no poll has succeeded yet: that result is the baseline and
/// nothing is reported. Once a terminal status (Completed, Cancelled) has been seen, later
/// changes to that order are ignored.
pub fn status_changes(previous: Option<&OrderSnapshot>, current: &OrderSnapshot) -> Vec<StatusChanged> {
    let Some(previous) = previous else {
        return Vec::new();
    };

    let mut changes = Vec::new();
    for order in current.orders() {
        let before = previous.get(order.order_id).map(|o| &o.status);
        match before {
            Some(old) if *old == order.status => continue,
            Some(old) if old.is_terminal() => {
                warn!(
                    order_id = order.order_id,
                    from = %old,
                    to = %order.status,
                    "Order left a terminal status, not notifying"
                );
                continue;
            }
            _ => {}
        }
        if order.status.is_notify_worthy() {
            changes.push(StatusChanged {
                order_id: order.order_id,
                previous: before.cloned(),
                status: order.status.clone(),
            });
        }
    }
    changes
}
