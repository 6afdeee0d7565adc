use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderTrackingQuery {
    pub order_id: String,
    pub email: String,
}

impl OrderTrackingQuery {
    /// Both fields must be non-blank; nothing else is checked.
    pub fn validate(&self) -> DomainResult<()> {
        for (field, value) in [("order_id", &self.order_id), ("email", &self.email)] {
            if value.trim().is_empty() {
                return Err(DomainError::EmptyField { field });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShipmentStatus {
    Processing,
    Shipped,
    Delivered,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub name: String,
    pub quantity: u32,
    pub price: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineStage {
    pub status: String,
    pub date: String,
    pub time: String,
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingInfo {
    pub order_id: String,
    pub status: ShipmentStatus,
    pub estimated_delivery: String,
    pub items: Vec<LineItem>,
    pub timeline: Vec<TimelineStage>,
}

impl TrackingInfo {
    /// Canned tracking result. Only the order id is taken from the caller.
    pub fn mock(order_id: &str) -> Self {
        Self {
            order_id: order_id.to_string(),
            status: ShipmentStatus::Shipped,
            estimated_delivery: "2024-01-15".to_string(),
            items: vec![
                item("Premium Leather iPhone Case", 1, 1299),
                item("Wireless Fast Charging Pad", 1, 899),
            ],
            timeline: vec![
                stage("Order Placed", "2024-01-10", "10:30 AM", true),
                stage("Processing", "2024-01-11", "2:15 PM", true),
                stage("Shipped", "2024-01-12", "9:45 AM", true),
                stage("Out for Delivery", "2024-01-15", "Expected", false),
                stage("Delivered", "2024-01-15", "Expected", false),
            ],
        }
    }

    pub fn total(&self) -> u32 {
        self.items
            .iter()
            .map(|item| item.price.saturating_mul(item.quantity))
            .sum()
    }
}

fn item(name: &str, quantity: u32, price: u32) -> LineItem {
    LineItem {
        name: name.to_string(),
        quantity,
        price,
    }
}

fn stage(status: &str, date: &str, time: &str, completed: bool) -> TimelineStage {
    TimelineStage {
        status: status.to_string(),
        date: date.to_string(),
        time: time.to_string(),
        completed,
    }
}
