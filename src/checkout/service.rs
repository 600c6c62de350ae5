use std::sync::Arc;
use uuid::Uuid;

use super::{CheckoutError, CheckoutGateway, CheckoutRequest, CheckoutSession};
use crate::domain::money::{to_minor_units, Currency};
use crate::storage::CatalogStore;

pub const SUCCESS_PATH: &str = "/payment/success";
pub const CANCEL_PATH: &str = "/payment/cancel";

/// Absolute URLs the gateway sends the customer back to
#[derive(Debug, Clone, PartialEq)]
pub struct CallbackUrls {
    pub success: String,
    pub cancel: String,
}

impl CallbackUrls {
    pub fn from_base(base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        Self {
            success: format!("{base}{SUCCESS_PATH}"),
            cancel: format!("{base}{CANCEL_PATH}"),
        }
    }
}

/// Starts a one-item payment for a catalog product
pub struct CheckoutService {
    catalog: Arc<dyn CatalogStore>,
    gateway: Arc<dyn CheckoutGateway>,
    currency: Currency,
    urls: CallbackUrls,
}

impl CheckoutService {
    pub fn new(
        catalog: Arc<dyn CatalogStore>,
        gateway: Arc<dyn CheckoutGateway>,
        currency: Currency,
        urls: CallbackUrls,
    ) -> Self {
        Self {
            catalog,
            gateway,
            currency,
            urls,
        }
    }

    pub async fn start_checkout(&self, product_id: Uuid) -> Result<CheckoutSession, CheckoutError> {
        let product = self
            .catalog
            .find_product(product_id)
            .await?
            .ok_or(CheckoutError::ProductNotFound(product_id))?;

        let request = CheckoutRequest {
            amount_minor_units: to_minor_units(product.price, self.currency)?,
            currency: self.currency,
            description: product.name,
            success_url: self.urls.success.clone(),
            cancel_url: self.urls.cancel.clone(),
        };

        let session = self.gateway.create_session(&request).await?;

        tracing::info!(
            product_id = %product_id,
            session_id = %session.id,
            amount = request.amount_minor_units,
            currency = %request.currency,
            "Checkout session created"
        );

        Ok(session)
    }
}
