use actix_web::http::{header, StatusCode};
use actix_web::{web, App, HttpResponse, HttpServer, Responder, ResponseError};
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use crate::checkout::{CheckoutError, CheckoutService};
use crate::database;
use crate::metrics::Metrics;
use crate::storage::CatalogStore;

// ============================================================================
// HTTP Surface
// ============================================================================
//
// GET /products               catalog as JSON
// GET /checkout/{product_id}  303 to the payment page
// GET /payment/success        JSON confirmation
// GET /payment/cancel         JSON confirmation
// GET /health                 liveness, plus database ping when pooled
// GET /metrics                Prometheus text format
//
// ============================================================================

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<dyn CatalogStore>,
    pub checkout: Arc<CheckoutService>,
    pub metrics: Arc<Metrics>,
    pub db: Option<PgPool>,
}

impl ResponseError for CheckoutError {
    fn status_code(&self) -> StatusCode {
        match self {
            CheckoutError::ProductNotFound(_) => StatusCode::NOT_FOUND,
            CheckoutError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            CheckoutError::Rejected { .. } => StatusCode::BAD_GATEWAY,
            CheckoutError::InvalidAmount(_)
            | CheckoutError::Configuration(_)
            | CheckoutError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "error": self.kind(),
            "message": self.to_string(),
        }))
    }
}

/// Register every route; the caller provides `AppState` as app data
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/products", web::get().to(products_handler))
        .route("/checkout/{product_id}", web::get().to(checkout_handler))
        .route("/payment/success", web::get().to(payment_success_handler))
        .route("/payment/cancel", web::get().to(payment_cancel_handler))
        .route("/health", web::get().to(health_handler))
        .route("/metrics", web::get().to(metrics_handler));
}

/// Start the storefront HTTP server
pub async fn start_http_server(state: AppState, addr: &str) -> std::io::Result<()> {
    tracing::info!("Starting storefront on http://{}", addr);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(state.clone()))
            .configure(configure)
    })
    .bind(addr)?
    .run()
    .await
}

async fn products_handler(state: web::Data<AppState>) -> impl Responder {
    match state.catalog.list_products().await {
        Ok(products) => HttpResponse::Ok().json(products),
        Err(e) => {
            tracing::error!(error = %e, "Failed to list products");
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "storage",
                "message": "Catalog unavailable"
            }))
        }
    }
}

async fn checkout_handler(
    state: web::Data<AppState>,
    product_id: web::Path<Uuid>,
) -> Result<HttpResponse, CheckoutError> {
    let product_id = product_id.into_inner();

    let session = state.checkout.start_checkout(product_id).await.map_err(|e| {
        tracing::warn!(product_id = %product_id, error = %e, "Checkout failed");
        e
    })?;

    Ok(HttpResponse::SeeOther()
        .insert_header((header::LOCATION, session.redirect_url))
        .finish())
}

async fn payment_success_handler() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "success",
        "message": "Payment completed"
    }))
}

async fn payment_cancel_handler() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "cancelled",
        "message": "Payment cancelled"
    }))
}

async fn health_handler(state: web::Data<AppState>) -> impl Responder {
    if let Some(pool) = &state.db {
        if let Err(e) = database::health_check(pool).await {
            tracing::error!(error = %e, "Database health check failed");
            return HttpResponse::ServiceUnavailable().json(serde_json::json!({
                "status": "unhealthy",
                "service": "storefront"
            }));
        }
    }

    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": "storefront"
    }))
}

async fn metrics_handler(state: web::Data<AppState>) -> impl Responder {
    match state.metrics.encode() {
        Ok(buffer) => HttpResponse::Ok()
            .content_type("text/plain; version=0.0.4")
            .body(buffer),
        Err(e) => {
            tracing::error!(error = %e, "Failed to encode metrics");
            HttpResponse::InternalServerError().finish()
        }
    }
}
