use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::value_objects::OrderStatus;

// ============================================================================
// Order Commands - Represent user intent
// ============================================================================

/// One product and how many of it the customer wants
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrderLine {
    pub product_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Clone)]
pub struct PlaceOrder {
    pub user_id: Uuid,
    pub lines: Vec<OrderLine>,
    /// Explicit shipping address; defaults to the user's first address
    pub ship_to: Option<Uuid>,
    pub status: OrderStatus,
    /// Placement time; defaults to now
    pub placed_at: Option<DateTime<Utc>>,
}

impl PlaceOrder {
    pub fn new(user_id: Uuid) -> Self {
        Self {
            user_id,
            lines: Vec::new(),
            ship_to: None,
            status: OrderStatus::Pending,
            placed_at: None,
        }
    }

    pub fn line(mut self, product_id: Uuid, quantity: i32) -> Self {
        self.lines.push(OrderLine {
            product_id,
            quantity,
        });
        self
    }
}
