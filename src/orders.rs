//! Order records and the in-memory order store.
//!
//! Orders are loaded once at startup from a CSV snapshot and live in memory
//! for the process lifetime. The only mutation is the guarded cancel; no
//! writes ever go back to disk.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::{Arc, RwLock};
use thiserror::Error;

/// Order lifecycle status. The only permitted transition is
/// `processing -> canceled`; `shipped` and `canceled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Processing,
    Shipped,
    Canceled,
}

impl OrderStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Canceled => "canceled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single order. Ids are kept as strings to preserve formatting
/// (leading zeros included).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub order_id: String,
    pub status: OrderStatus,
    pub item: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum OrderError {
    #[error("order {0} not found")]
    NotFound(String),
    /// Cancel was attempted on an order whose status is terminal.
    /// Carries the unchanged current status.
    #[error("order cannot be canceled while {status}")]
    InvalidTransition { status: OrderStatus },
}

/// Failure to read the startup snapshot. Fatal: the process exits rather
/// than serving an empty or partial order table.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("failed to read order snapshot: {0}")]
    Csv(#[from] csv::Error),
}

/// In-memory order table. Cheap to clone; all clones share one table.
/// The store owns its locking: reads take the read guard, the cancel
/// mutation takes the write guard, which serializes concurrent cancels
/// on the same id.
#[derive(Clone)]
pub struct OrderStore {
    orders: Arc<RwLock<HashMap<String, Order>>>,
}

impl OrderStore {
    /// Read the CSV snapshot once and build the store. Rows must carry
    /// `order_id,status,item`; an unknown status fails the load. On
    /// duplicate ids the first row wins.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SnapshotError> {
        let mut reader = csv::Reader::from_path(path)?;
        let mut orders = HashMap::new();
        for row in reader.deserialize() {
            let order: Order = row?;
            orders.entry(order.order_id.clone()).or_insert(order);
        }
        Ok(Self {
            orders: Arc::new(RwLock::new(orders)),
        })
    }

    /// Build a store from literal orders, bypassing the CSV snapshot.
    #[cfg(test)]
    pub fn seeded(orders: impl IntoIterator<Item = Order>) -> Self {
        let orders = orders
            .into_iter()
            .map(|o| (o.order_id.clone(), o))
            .collect();
        Self {
            orders: Arc::new(RwLock::new(orders)),
        }
    }

    /// Current snapshot of a single order. Read-only, no side effects.
    pub fn get(&self, order_id: &str) -> Option<Order> {
        self.orders.read().unwrap().get(order_id).cloned()
    }

    /// Cancel an order if it is still `processing`. Terminal statuses fail
    /// with `InvalidTransition` and leave the record untouched.
    pub fn cancel(&self, order_id: &str) -> Result<Order, OrderError> {
        let mut orders = self.orders.write().unwrap();
        let order = orders
            .get_mut(order_id)
            .ok_or_else(|| OrderError::NotFound(order_id.to_string()))?;
        match order.status {
            OrderStatus::Processing => {
                order.status = OrderStatus::Canceled;
                Ok(order.clone())
            }
            status => Err(OrderError::InvalidTransition { status }),
        }
    }

    pub fn len(&self) -> usize {
        self.orders.read().unwrap().len()
    }

    #[allow(dead_code)] // Counterpart to len()
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
