use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::error::ErrorKind;
use uuid::Uuid;

use crate::domain::catalog::{Category, Product};
use crate::domain::identity::{Address, User};
use crate::domain::order::Order;

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

// ============================================================================
// Storage Ports
// ============================================================================
//
// Persistence is split by concern. Each adapter (Postgres, in-memory)
// implements all three traits over one backing store so a single value can be
// shared as `Arc<dyn OrderStore>`, `Arc<dyn CatalogStore>` and so on.
//
// ============================================================================

/// Constraint names the Postgres schema declares
pub const ORDERS_REFERENCE_KEY: &str = "orders_reference_key";
pub const USERS_EMAIL_KEY: &str = "users_email_key";
pub const CATEGORIES_SLUG_KEY: &str = "categories_slug_key";

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("order reference already exists: {0}")]
    DuplicateReference(String),

    #[error("email already registered: {0}")]
    DuplicateEmail(String),

    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),

    #[error("related resource not found")]
    InvalidReference,

    #[error("invalid data")]
    InvalidData,

    #[error("record not found")]
    NotFound,

    #[error("storage error")]
    Sql(#[source] sqlx::Error),

    #[error("migration failed")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl StorageError {
    /// Classify a unique violation by the constraint it hit
    fn unique_violation(constraint: Option<&str>, value: String) -> Self {
        match constraint {
            Some(ORDERS_REFERENCE_KEY) => StorageError::DuplicateReference(value),
            Some(USERS_EMAIL_KEY) => StorageError::DuplicateEmail(value),
            Some(other) => StorageError::UniqueViolation(other.to_string()),
            None => StorageError::UniqueViolation(value),
        }
    }
}

impl From<sqlx::Error> for StorageError {
    fn from(error: sqlx::Error) -> Self {
        let Some(db_error) = error.as_database_error() else {
            return match error {
                sqlx::Error::RowNotFound => StorageError::NotFound,
                other => StorageError::Sql(other),
            };
        };

        match db_error.kind() {
            ErrorKind::UniqueViolation => {
                let constraint = db_error.constraint().map(str::to_string);
                StorageError::unique_violation(constraint.as_deref(), db_error.message().to_string())
            }
            ErrorKind::ForeignKeyViolation => StorageError::InvalidReference,
            ErrorKind::CheckViolation | ErrorKind::NotNullViolation => StorageError::InvalidData,
            _ => StorageError::Sql(error),
        }
    }
}

/// Everything placing an order needs from storage
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Persist the order and all of its items atomically
    async fn save_order(&self, order: &Order) -> Result<(), StorageError>;

    /// Addresses owned by the user, oldest first
    async fn find_user_addresses(&self, user_id: Uuid) -> Result<Vec<Address>, StorageError>;

    async fn find_product_price(&self, product_id: Uuid) -> Result<Option<Decimal>, StorageError>;
}

#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn insert_category(&self, category: &Category) -> Result<(), StorageError>;

    async fn insert_product(&self, product: &Product) -> Result<(), StorageError>;

    async fn find_product(&self, product_id: Uuid) -> Result<Option<Product>, StorageError>;

    /// Whole catalog, oldest product first
    async fn list_products(&self) -> Result<Vec<Product>, StorageError>;

    async fn update_product_price(
        &self,
        product_id: Uuid,
        price: Decimal,
    ) -> Result<(), StorageError>;
}

#[async_trait]
pub trait IdentityStore: Send + Sync {
    async fn insert_user(&self, user: &User) -> Result<(), StorageError>;

    async fn insert_address(&self, address: &Address) -> Result<(), StorageError>;
}
