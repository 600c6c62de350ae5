use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use super::errors::OrderError;
use super::reference::ReferenceGenerator;
use super::value_objects::{OrderItem, OrderStatus, ReferenceCode};
use crate::domain::catalog::Product;
use crate::domain::identity::Address;
use crate::domain::money;

// ============================================================================
// Order Aggregate
// ============================================================================
//
// An Order and its OrderItems form one consistency boundary. The total is
// computed once, from the item snapshots, when the aggregate is built. Owner,
// shipping address, items and total are only reachable through accessors so
// they cannot drift from what the builder validated.
//
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Order {
    pub id: Uuid,
    user_id: Uuid,
    address_id: Uuid,
    pub reference: ReferenceCode,
    pub created_at: DateTime<Utc>,
    pub status: OrderStatus,
    total: Decimal,
    items: Vec<OrderItem>,
}

impl Order {
    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    /// Always one of the owning user's addresses
    pub fn address_id(&self) -> Uuid {
        self.address_id
    }

    pub fn total(&self) -> Decimal {
        self.total
    }

    pub fn items(&self) -> &[OrderItem] {
        &self.items
    }
}

/// One requested line with the price snapshot taken from the catalog
#[derive(Debug, Clone, PartialEq)]
pub struct LineRequest {
    pub product_id: Uuid,
    pub unit_price: Decimal,
    pub quantity: i32,
}

// ============================================================================
// Order Builder
// ============================================================================

/// Assembles an [`Order`] for one user from their addresses and requested lines.
///
/// `build` borrows the builder, so the same request can be rebuilt with a
/// fresh reference after a storage-level collision.
#[derive(Debug, Clone)]
pub struct OrderBuilder<'a> {
    user_id: Uuid,
    addresses: &'a [Address],
    ship_to: Option<Uuid>,
    status: OrderStatus,
    lines: Vec<LineRequest>,
}

impl<'a> OrderBuilder<'a> {
    pub fn new(user_id: Uuid, addresses: &'a [Address]) -> Self {
        Self {
            user_id,
            addresses,
            ship_to: None,
            status: OrderStatus::Pending,
            lines: Vec::new(),
        }
    }

    /// Ship to a specific address instead of the user's first one
    pub fn ship_to(mut self, address_id: Uuid) -> Self {
        self.ship_to = Some(address_id);
        self
    }

    pub fn status(mut self, status: OrderStatus) -> Self {
        self.status = status;
        self
    }

    /// Add a line using an explicit price snapshot
    pub fn line(mut self, product_id: Uuid, unit_price: Decimal, quantity: i32) -> Self {
        self.lines.push(LineRequest {
            product_id,
            unit_price,
            quantity,
        });
        self
    }

    /// Add a line snapshotting the product's current catalog price
    pub fn product(self, product: &Product, quantity: i32) -> Self {
        self.line(product.id, product.price, quantity)
    }

    /// Resolve the shipping address, failing when the user has none
    pub fn shipping_address(&self) -> Result<&'a Address, OrderError> {
        let user_id = self.user_id;
        let mut owned = self.addresses.iter().filter(move |a| a.user_id == user_id);

        match self.ship_to {
            Some(address_id) => {
                if self.addresses.iter().all(|a| a.user_id != user_id) {
                    return Err(OrderError::NoShippingAddress { user_id });
                }
                owned
                    .find(|a| a.id == address_id)
                    .ok_or(OrderError::AddressNotOwned { address_id, user_id })
            }
            None => owned.next().ok_or(OrderError::NoShippingAddress { user_id }),
        }
    }

    fn validate_lines(&self) -> Result<(), OrderError> {
        if self.lines.is_empty() {
            return Err(OrderError::EmptyItems);
        }

        for line in &self.lines {
            if line.quantity <= 0 {
                return Err(OrderError::InvalidQuantity {
                    product_id: line.product_id,
                    quantity: line.quantity,
                });
            }
            let negative = line.unit_price.is_sign_negative() && !line.unit_price.is_zero();
            if negative || money::check_storable(line.unit_price).is_err() {
                return Err(OrderError::InvalidUnitPrice {
                    product_id: line.product_id,
                    unit_price: line.unit_price,
                });
            }
        }

        Ok(())
    }

    /// Validate the request and produce a complete aggregate.
    ///
    /// Pure: nothing is persisted and the builder can be reused.
    pub fn build(
        &self,
        references: &dyn ReferenceGenerator,
        now: DateTime<Utc>,
    ) -> Result<Order, OrderError> {
        let address = self.shipping_address()?;
        self.validate_lines()?;

        let order_id = Uuid::now_v7();

        let items: Vec<OrderItem> = self
            .lines
            .iter()
            .map(|line| OrderItem {
                id: Uuid::now_v7(),
                order_id,
                product_id: line.product_id,
                quantity: line.quantity,
                unit_price: line.unit_price,
            })
            .collect();

        let total = items.iter().try_fold(Decimal::ZERO, |acc, item| {
            item.line_total()
                .and_then(|line_total| acc.checked_add(line_total))
                .ok_or(OrderError::TotalOverflow)
        })?;
        if total > money::max_stored_amount() {
            return Err(OrderError::TotalOverflow);
        }

        Ok(Order {
            id: order_id,
            user_id: self.user_id,
            address_id: address.id,
            reference: references.next_reference(now),
            created_at: now,
            status: self.status,
            total,
            items,
        })
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
