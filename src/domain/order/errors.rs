use rust_decimal::Decimal;
use uuid::Uuid;

use super::value_objects::ReferenceCode;
use crate::storage::StorageError;
use crate::utils::IsTransient;

// ============================================================================
// Order Business Rule Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    #[error("User {user_id} has no shipping address")]
    NoShippingAddress { user_id: Uuid },

    #[error("Address {address_id} does not belong to user {user_id}")]
    AddressNotOwned { address_id: Uuid, user_id: Uuid },

    #[error("Order items cannot be empty")]
    EmptyItems,

    #[error("Invalid quantity {quantity} for product {product_id}")]
    InvalidQuantity { product_id: Uuid, quantity: i32 },

    #[error("Unit price {unit_price} for product {product_id} cannot be stored")]
    InvalidUnitPrice { product_id: Uuid, unit_price: Decimal },

    #[error("Product not found: {0}")]
    ProductNotFound(Uuid),

    #[error("Order total exceeds the storable range")]
    TotalOverflow,

    #[error("Order reference already taken: {0}")]
    DuplicateReference(ReferenceCode),

    #[error("Order storage failed: {0}")]
    Storage(#[source] StorageError),
}

impl OrderError {
    /// Short label used for metrics and logs
    pub fn kind(&self) -> &'static str {
        match self {
            OrderError::NoShippingAddress { .. } => "no_shipping_address",
            OrderError::AddressNotOwned { .. } => "address_not_owned",
            OrderError::EmptyItems => "empty_items",
            OrderError::InvalidQuantity { .. } => "invalid_quantity",
            OrderError::InvalidUnitPrice { .. } => "invalid_unit_price",
            OrderError::ProductNotFound(_) => "product_not_found",
            OrderError::TotalOverflow => "total_overflow",
            OrderError::DuplicateReference(_) => "duplicate_reference",
            OrderError::Storage(_) => "storage",
        }
    }
}

impl From<StorageError> for OrderError {
    fn from(error: StorageError) -> Self {
        match error {
            StorageError::DuplicateReference(code) => {
                OrderError::DuplicateReference(ReferenceCode(code))
            }
            other => OrderError::Storage(other),
        }
    }
}

/// A reference collision is the only failure worth rebuilding the order for
impl IsTransient for OrderError {
    fn is_transient(&self) -> bool {
        matches!(self, OrderError::DuplicateReference(_))
    }
}
