//! Runtime configuration from CLI flags, environment and `.env`

use clap::Args;

use crate::checkout::CallbackUrls;
use crate::domain::money::Currency;

#[derive(Debug, Clone, Args)]
pub struct AppConfig {
    /// `PostgreSQL` connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    pub database_url: String,

    /// Maximum number of pooled database connections
    #[arg(long, env = "DATABASE_MAX_CONNECTIONS", default_value_t = 5)]
    pub max_connections: u32,

    /// Server host address
    #[arg(short = 'H', long, env = "SERVER_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Server port
    #[arg(short, long, env = "SERVER_PORT", default_value_t = 8080)]
    pub port: u16,

    /// Externally reachable base URL, used for payment callbacks
    #[arg(long, env = "PUBLIC_BASE_URL", default_value = "http://localhost:8080")]
    pub public_base_url: String,

    /// Stripe secret API key; required by `serve`
    #[arg(long, env = "STRIPE_SECRET_KEY", hide_env_values = true)]
    pub stripe_secret_key: Option<String>,

    #[arg(long, env = "STRIPE_API_BASE", default_value = "https://api.stripe.com")]
    pub stripe_api_base: String,

    /// Currency products are charged in
    #[arg(long, env = "CHECKOUT_CURRENCY", default_value = "eur")]
    pub currency: Currency,
}

impl AppConfig {
    /// Get the socket address for binding
    #[must_use]
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    #[must_use]
    pub fn callback_urls(&self) -> CallbackUrls {
        CallbackUrls::from_base(&self.public_base_url)
    }
}
