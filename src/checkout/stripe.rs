//! Stripe Checkout adapter.
//!
//! Creates hosted checkout sessions through the Stripe REST API. Calls go
//! through a circuit breaker so a failing Stripe fails fast instead of holding
//! request handlers for the full timeout.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::StatusCode;
use serde::Deserialize;
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::{CheckoutError, CheckoutGateway, CheckoutRequest, CheckoutSession};
use crate::metrics::Metrics;
use crate::utils::{CircuitBreaker, CircuitBreakerConfig, CircuitBreakerError};

const SESSIONS_PATH: &str = "/v1/checkout/sessions";

#[derive(Debug, Clone)]
pub struct StripeConfig {
    pub secret_key: String,
    /// Scheme and host, without a trailing path
    pub api_base: String,
    pub timeout: Duration,
}

impl StripeConfig {
    pub fn new(secret_key: impl Into<String>, api_base: impl Into<String>) -> Self {
        Self {
            secret_key: secret_key.into(),
            api_base: api_base.into(),
            timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Debug, Deserialize)]
struct SessionResponse {
    id: String,
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

pub struct StripeGateway {
    client: reqwest::Client,
    sessions_url: String,
    circuit_breaker: CircuitBreaker,
    metrics: Arc<Metrics>,
}

impl StripeGateway {
    /// Create a new Stripe client.
    ///
    /// # Errors
    ///
    /// Returns error if the key is not a valid header value or the HTTP
    /// client fails to build.
    pub fn new(config: &StripeConfig, metrics: Arc<Metrics>) -> Result<Self, CheckoutError> {
        let mut headers = HeaderMap::new();
        let auth_value = format!("Bearer {}", config.secret_key);
        let mut auth_value = HeaderValue::from_str(&auth_value)
            .map_err(|e| CheckoutError::Configuration(format!("Invalid API key format: {e}")))?;
        auth_value.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth_value);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| CheckoutError::Configuration(e.to_string()))?;

        let cb_config = CircuitBreakerConfig {
            failure_threshold: 5,
            timeout: Duration::from_secs(30),
            success_threshold: 2,
        };

        Ok(Self {
            client,
            sessions_url: format!("{}{SESSIONS_PATH}", config.api_base.trim_end_matches('/')),
            circuit_breaker: CircuitBreaker::new("stripe", cb_config),
            metrics,
        })
    }

    #[cfg(test)]
    fn with_breaker(mut self, config: CircuitBreakerConfig) -> Self {
        self.circuit_breaker = CircuitBreaker::new("stripe", config);
        self
    }

    fn form(request: &CheckoutRequest) -> Vec<(&'static str, String)> {
        vec![
            ("mode", "payment".to_string()),
            ("payment_method_types[0]", "card".to_string()),
            ("success_url", request.success_url.clone()),
            ("cancel_url", request.cancel_url.clone()),
            ("line_items[0][quantity]", "1".to_string()),
            (
                "line_items[0][price_data][currency]",
                request.currency.code().to_string(),
            ),
            (
                "line_items[0][price_data][unit_amount]",
                request.amount_minor_units.to_string(),
            ),
            (
                "line_items[0][price_data][product_data][name]",
                request.description.clone(),
            ),
        ]
    }

    /// Outer error: Stripe is unhealthy and the breaker should count it.
    /// Inner error: Stripe answered and refused this particular request.
    async fn post_session(
        &self,
        request: &CheckoutRequest,
    ) -> Result<Result<CheckoutSession, CheckoutError>, CheckoutError> {
        let response = self
            .client
            .post(&self.sessions_url)
            .form(&Self::form(request))
            .send()
            .await
            .map_err(|e| CheckoutError::Unavailable(e.to_string()))?;

        let status = response.status();

        if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
            return Err(CheckoutError::Unavailable(format!("Stripe returned {status}")));
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .ok()
                .and_then(|e| e.error.message)
                .unwrap_or(body);
            return Ok(Err(CheckoutError::Rejected {
                status: status.as_u16(),
                message,
            }));
        }

        let session: SessionResponse = response
            .json()
            .await
            .map_err(|e| CheckoutError::Unavailable(format!("Unreadable Stripe response: {e}")))?;

        let redirect_url = session.url.ok_or_else(|| {
            CheckoutError::Unavailable(format!("Stripe session {} has no url", session.id))
        })?;

        Ok(Ok(CheckoutSession {
            id: session.id,
            redirect_url,
        }))
    }

    pub async fn get_circuit_breaker_state(&self) -> crate::utils::CircuitState {
        self.circuit_breaker.get_state().await
    }
}

#[async_trait]
impl CheckoutGateway for StripeGateway {
    async fn create_session(&self, request: &CheckoutRequest) -> Result<CheckoutSession, CheckoutError> {
        let started = Instant::now();

        let result = match self.circuit_breaker.call(self.post_session(request)).await {
            Ok(answer) => answer,
            Err(CircuitBreakerError::CircuitOpen) => {
                tracing::error!("Circuit breaker open - Stripe unavailable");
                Err(CheckoutError::Unavailable("circuit breaker open".to_string()))
            }
            Err(CircuitBreakerError::OperationFailed(e)) => {
                tracing::error!(error = %e, "Failed to create Stripe checkout session");
                Err(e)
            }
        };

        self.metrics
            .update_circuit_breaker_state(self.circuit_breaker.get_state().await);
        let outcome = match &result {
            Ok(_) => "created",
            Err(e) => e.kind(),
        };
        self.metrics
            .record_checkout(outcome, started.elapsed().as_secs_f64());

        result
    }
}
