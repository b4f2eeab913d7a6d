use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::{timestamp, RecipeId};

/// Backend-assigned order identifier.
pub type OrderId = i64;

/// Lifecycle state of an order.
///
/// The backend is inconsistent about casing (`pending` vs `Processing`), so parsing is
/// case-insensitive. Serialization uses the spelling the backend expects.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OrderStatus {
    Pending,
    Processing,
    Completed,
    Cancelled,
    /// Anything the backend sends that we do not recognise.
    Other(String),
}

impl OrderStatus {
    pub fn as_str(&self) -> &str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "Processing",
            OrderStatus::Completed => "Completed",
            OrderStatus::Cancelled => "Cancelled",
            OrderStatus::Other(raw) => raw,
        }
    }

    /// Statuses that trigger a user notification when newly observed.
    pub fn is_notify_worthy(&self) -> bool {
        matches!(self, OrderStatus::Processing | OrderStatus::Completed | OrderStatus::Cancelled)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }
}

impl OrderStatus {
    pub fn from_raw(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pending" => OrderStatus::Pending,
            "processing" | "progressing" => OrderStatus::Processing,
            "completed" => OrderStatus::Completed,
            "cancelled" | "canceled" => OrderStatus::Cancelled,
            _ => OrderStatus::Other(raw.to_string()),
        }
    }
}

impl FromStr for OrderStatus {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_raw(s))
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for OrderStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for OrderStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(OrderStatus::from_raw(&raw))
    }
}

/// A placed order as reported by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub order_id: OrderId,
    pub recipe_id: RecipeId,
    #[serde(default)]
    pub recipe_name: Option<String>,
    pub status: OrderStatus,
    #[serde(with = "timestamp")]
    pub ordered_time: DateTime<Utc>,
    #[serde(default, with = "timestamp::option")]
    pub completed_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub instruction: Option<String>,
}

impl Order {
    pub fn new(order_id: OrderId, recipe_id: RecipeId, status: OrderStatus) -> Self {
        Self {
            order_id,
            recipe_id,
            recipe_name: None,
            status,
            ordered_time: Utc::now(),
            completed_time: None,
            instruction: None,
        }
    }

    /// Name to show in notifications, falling back to the order number.
    pub fn display_name(&self) -> String {
        match &self.recipe_name {
            Some(name) if !name.is_empty() => name.clone(),
            _ => format!("Order #{}", self.order_id),
        }
    }
}

/// One page of `GET /Order/all`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderPage {
    #[serde(default)]
    pub orders: Vec<Order>,
}

/// Body of `POST /Order/create-and-send-to-queue`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    pub recipe_id: RecipeId,
    pub location_id: i64,
    pub robot_id: i64,
    #[serde(with = "timestamp")]
    pub ordered_time: DateTime<Utc>,
    pub status: OrderStatus,
    pub instruction: Option<String>,
}

/// Body of `PUT /Order/update-order-status`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdate {
    pub order_id: OrderId,
    pub status: OrderStatus,
}

/// Orders partitioned by status, in the order the backend listed them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderBuckets {
    pub pending: Vec<Order>,
    pub processing: Vec<Order>,
    pub completed: Vec<Order>,
    pub cancelled: Vec<Order>,
}

impl OrderBuckets {
    /// Orders with an unrecognised status are left out.
    pub fn from_orders<'a>(orders: impl IntoIterator<Item = &'a Order>) -> Self {
        let mut buckets = Self::default();
        for order in orders {
            match order.status {
                OrderStatus::Pending => buckets.pending.push(order.clone()),
                OrderStatus::Processing => buckets.processing.push(order.clone()),
                OrderStatus::Completed => buckets.completed.push(order.clone()),
                OrderStatus::Cancelled => buckets.cancelled.push(order.clone()),
                OrderStatus::Other(_) => {}
            }
        }
        buckets
    }

    pub fn bucket(&self, status: &OrderStatus) -> &[Order] {
        match status {
            OrderStatus::Pending => &self.pending,
            OrderStatus::Processing => &self.processing,
            OrderStatus::Completed => &self.completed,
            OrderStatus::Cancelled => &self.cancelled,
            OrderStatus::Other(_) => &[],
        }
    }

    pub fn len(&self) -> usize {
        self.pending.len() + self.processing.len() + self.completed.len() + self.cancelled.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
