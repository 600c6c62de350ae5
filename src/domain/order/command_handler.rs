use chrono::Utc;
use std::sync::Arc;

use crate::metrics::Metrics;
use crate::storage::OrderStore;
use crate::utils::{retry_on_transient, RetryConfig};

use super::aggregate::{Order, OrderBuilder};
use super::commands::PlaceOrder;
use super::errors::OrderError;
use super::reference::ReferenceGenerator;

// ============================================================================
// Place Order Handler
// ============================================================================
//
// Orchestrates: Command → Address lookup → Price snapshots → Builder → Store
//
// A reference collision reported by the store rebuilds the aggregate once
// with a fresh reference. Every other failure is returned as is.
//
// ============================================================================

pub struct PlaceOrderHandler {
    store: Arc<dyn OrderStore>,
    references: Arc<dyn ReferenceGenerator>,
    metrics: Arc<Metrics>,
}

impl PlaceOrderHandler {
    pub fn new(
        store: Arc<dyn OrderStore>,
        references: Arc<dyn ReferenceGenerator>,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self {
            store,
            references,
            metrics,
        }
    }

    /// Build and persist an order, returning the saved aggregate
    pub async fn handle(&self, command: PlaceOrder) -> Result<Order, OrderError> {
        match self.place(command).await {
            Ok(order) => {
                self.metrics.record_order_placed(order.status.as_str(), order.total());
                tracing::info!(
                    order_id = %order.id,
                    reference = %order.reference,
                    total = %order.total(),
                    items = order.items().len(),
                    "Order placed"
                );
                Ok(order)
            }
            Err(error) => {
                self.metrics.record_order_failure(error.kind());
                tracing::warn!(error = %error, kind = error.kind(), "Order not placed");
                Err(error)
            }
        }
    }

    async fn place(&self, command: PlaceOrder) -> Result<Order, OrderError> {
        let addresses = self.store.find_user_addresses(command.user_id).await?;

        let mut builder = OrderBuilder::new(command.user_id, &addresses).status(command.status);
        if let Some(address_id) = command.ship_to {
            builder = builder.ship_to(address_id);
        }

        // Fail before touching the catalog when there is nowhere to ship
        builder.shipping_address()?;

        for line in &command.lines {
            let price = self
                .store
                .find_product_price(line.product_id)
                .await?
                .ok_or(OrderError::ProductNotFound(line.product_id))?;
            builder = builder.line(line.product_id, price, line.quantity);
        }

        let placed_at = command.placed_at.unwrap_or_else(Utc::now);
        let builder = &builder;
        let this = self;

        retry_on_transient(RetryConfig::single_retry(), move |attempt| async move {
            let order = builder.build(this.references.as_ref(), placed_at)?;

            match this.store.save_order(&order).await.map_err(OrderError::from) {
                Ok(()) => Ok(order),
                Err(error @ OrderError::DuplicateReference(_)) => {
                    this.metrics.record_reference_collision();
                    tracing::warn!(
                        attempt = attempt,
                        reference = %order.reference,
                        "Order reference collision"
                    );
                    Err(error)
                }
                Err(error) => Err(error),
            }
        })
        .await
        .into_result()
    }
}
