use rust_decimal::Decimal;

use crate::domain::money::MoneyError;

// ============================================================================
// Catalog Business Rule Errors
// ============================================================================

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum CatalogError {
    #[error("Category name cannot be empty")]
    EmptyCategoryName,

    #[error("Category name {0:?} produces an empty slug")]
    EmptySlug(String),

    #[error("Product name cannot be empty")]
    EmptyProductName,

    #[error("Product price cannot be negative: {0}")]
    NegativePrice(Decimal),

    #[error("Product price cannot be stored: {0}")]
    UnstorablePrice(#[from] MoneyError),
}
