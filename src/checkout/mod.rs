use async_trait::async_trait;
use serde::Serialize;
use uuid::Uuid;

use crate::domain::money::{Currency, MoneyError};
use crate::storage::StorageError;

pub mod service;
pub mod stripe;

pub use service::{CallbackUrls, CheckoutService};
pub use stripe::{StripeConfig, StripeGateway};

// ============================================================================
// Checkout Gateway Port
// ============================================================================
//
// A hosted payment page for a single item. The gateway is called once per
// request; failures are reported to the caller and never retried here.
//
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutRequest {
    /// Price in the currency's minor unit (cents for EUR)
    pub amount_minor_units: i64,
    pub currency: Currency,
    pub description: String,
    pub success_url: String,
    pub cancel_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckoutSession {
    pub id: String,
    /// Where the customer is sent to pay
    pub redirect_url: String,
}

#[derive(Debug, thiserror::Error)]
pub enum CheckoutError {
    #[error("Payment gateway unavailable: {0}")]
    Unavailable(String),

    #[error("Payment gateway rejected the request: {status} - {message}")]
    Rejected { status: u16, message: String },

    #[error("Product not found: {0}")]
    ProductNotFound(Uuid),

    #[error("Invalid checkout amount: {0}")]
    InvalidAmount(#[from] MoneyError),

    #[error("Invalid gateway configuration: {0}")]
    Configuration(String),

    #[error("Checkout storage failed: {0}")]
    Storage(#[from] StorageError),
}

impl CheckoutError {
    /// Short label used for metrics and logs
    pub fn kind(&self) -> &'static str {
        match self {
            CheckoutError::Unavailable(_) => "unavailable",
            CheckoutError::Rejected { .. } => "rejected",
            CheckoutError::ProductNotFound(_) => "product_not_found",
            CheckoutError::InvalidAmount(_) => "invalid_amount",
            CheckoutError::Configuration(_) => "configuration",
            CheckoutError::Storage(_) => "storage",
        }
    }
}

#[async_trait]
pub trait CheckoutGateway: Send + Sync {
    async fn create_session(&self, request: &CheckoutRequest) -> Result<CheckoutSession, CheckoutError>;
}
