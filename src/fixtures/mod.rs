//! Demo data seeding.
//!
//! Fills an empty store with users, addresses, categories, products and paid
//! orders. Orders go through [`PlaceOrderHandler`] so they get the same
//! validation, totals and reference codes as real ones.

use chrono::Utc;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::domain::catalog::{CatalogError, Category, NewProduct, Product, Slugger};
use crate::domain::identity::{Address, Email, IdentityError, NewUser, PasswordHasher, Role, User};
use crate::domain::order::{OrderError, OrderStatus, PlaceOrder, PlaceOrderHandler};
use crate::storage::{CatalogStore, IdentityStore, StorageError};

pub mod data;

pub const DEMO_PASSWORD: &str = "password";

/// How much demo data to create
#[derive(Debug, Clone)]
pub struct SeedPlan {
    pub users: usize,
    pub min_addresses: usize,
    pub max_addresses: usize,
    pub products: usize,
    pub orders: usize,
    pub max_lines: usize,
    pub max_quantity: i32,
}

impl Default for SeedPlan {
    fn default() -> Self {
        Self {
            users: 5,
            min_addresses: 1,
            max_addresses: 2,
            products: 30,
            orders: 10,
            max_lines: 4,
            max_quantity: 3,
        }
    }
}

/// Result of a seeding run
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SeedReport {
    pub users: usize,
    pub addresses: usize,
    pub categories: usize,
    pub products: usize,
    pub orders: usize,
    /// Orders not created because the chosen user had no address
    pub skipped_no_address: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("invalid user data: {0}")]
    Identity(#[from] IdentityError),

    #[error("invalid catalog data: {0}")]
    Catalog(#[from] CatalogError),

    #[error("seeding storage failed: {0}")]
    Storage(#[from] StorageError),

    #[error("seeding order failed: {0}")]
    Order(#[from] OrderError),
}

pub struct Seeder {
    identity: Arc<dyn IdentityStore>,
    catalog: Arc<dyn CatalogStore>,
    orders: Arc<PlaceOrderHandler>,
    hasher: Arc<dyn PasswordHasher>,
    slugger: Arc<dyn Slugger>,
    rng: StdRng,
}

impl Seeder {
    pub fn new(
        identity: Arc<dyn IdentityStore>,
        catalog: Arc<dyn CatalogStore>,
        orders: Arc<PlaceOrderHandler>,
        hasher: Arc<dyn PasswordHasher>,
        slugger: Arc<dyn Slugger>,
    ) -> Self {
        Self {
            identity,
            catalog,
            orders,
            hasher,
            slugger,
            rng: StdRng::from_entropy(),
        }
    }

    /// Make runs reproducible
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub async fn run(&mut self, plan: &SeedPlan) -> Result<SeedReport, SeedError> {
        let mut report = SeedReport::default();

        let addresses = self.seed_users(plan, &mut report).await?;
        let categories = self.seed_categories(&mut report).await?;
        let products = self.seed_products(plan, &categories, &mut report).await?;
        self.seed_orders(plan, &addresses, &products, &mut report).await?;

        info!(
            users = report.users,
            addresses = report.addresses,
            categories = report.categories,
            products = report.products,
            orders = report.orders,
            skipped_no_address = report.skipped_no_address,
            "Demo data seeded"
        );
        Ok(report)
    }

    /// Returns each user's address ids, in user creation order
    async fn seed_users(
        &mut self,
        plan: &SeedPlan,
        report: &mut SeedReport,
    ) -> Result<Vec<(Uuid, Vec<Uuid>)>, SeedError> {
        let now = Utc::now();
        let mut seeded = Vec::with_capacity(plan.users);

        for index in 0..plan.users {
            let first_name = data::first_name(&mut self.rng);
            let last_name = data::last_name(&mut self.rng);
            let email = data::email(&mut self.rng, &first_name, &last_name, index);

            let user = User::register(
                NewUser {
                    email: Email::new(email),
                    first_name,
                    last_name,
                    password: DEMO_PASSWORD.to_string(),
                    roles: BTreeSet::from([Role::user()]),
                    created_at: data::within_last_year(&mut self.rng, now),
                },
                self.hasher.as_ref(),
            )?;
            self.identity.insert_user(&user).await?;
            report.users += 1;

            let max_addresses = plan.max_addresses.max(plan.min_addresses);
            let count = self.rng.gen_range(plan.min_addresses..=max_addresses);
            let mut address_ids = Vec::with_capacity(count);
            for _ in 0..count {
                let input = data::address(&mut self.rng, &user.full_name());
                let address = Address::new(user.id, input)?;
                self.identity.insert_address(&address).await?;
                address_ids.push(address.id);
                report.addresses += 1;
            }

            debug!(user_id = %user.id, email = user.email.as_str(), addresses = count, "Seeded user");
            seeded.push((user.id, address_ids));
        }

        Ok(seeded)
    }

    async fn seed_categories(&mut self, report: &mut SeedReport) -> Result<Vec<Uuid>, SeedError> {
        let mut ids = Vec::with_capacity(data::CATEGORY_NAMES.len());

        for name in data::CATEGORY_NAMES {
            let category = Category::new(name, self.slugger.as_ref())?;
            self.catalog.insert_category(&category).await?;
            debug!(slug = %category.slug, "Seeded category");
            ids.push(category.id);
            report.categories += 1;
        }

        Ok(ids)
    }

    async fn seed_products(
        &mut self,
        plan: &SeedPlan,
        categories: &[Uuid],
        report: &mut SeedReport,
    ) -> Result<Vec<Uuid>, SeedError> {
        let now = Utc::now();
        let mut ids = Vec::with_capacity(plan.products);

        for _ in 0..plan.products {
            let product = Product::new(NewProduct {
                category_id: categories.choose(&mut self.rng).copied(),
                name: data::words(&mut self.rng, 3),
                description: data::paragraph(&mut self.rng),
                price: data::price(&mut self.rng),
                stock: data::stock(&mut self.rng),
                created_at: data::this_year(&mut self.rng, now),
            })?;
            self.catalog.insert_product(&product).await?;
            ids.push(product.id);
            report.products += 1;
        }

        Ok(ids)
    }

    async fn seed_orders(
        &mut self,
        plan: &SeedPlan,
        users: &[(Uuid, Vec<Uuid>)],
        products: &[Uuid],
        report: &mut SeedReport,
    ) -> Result<(), SeedError> {
        if users.is_empty() || products.is_empty() {
            return Ok(());
        }

        let now = Utc::now();

        for _ in 0..plan.orders {
            let Some((user_id, address_ids)) = users.choose(&mut self.rng) else {
                break;
            };

            let mut command = PlaceOrder::new(*user_id);
            command.status = OrderStatus::Paid;
            command.placed_at = Some(data::this_year(&mut self.rng, now));
            command.ship_to = address_ids.choose(&mut self.rng).copied();

            let lines = self.rng.gen_range(1..=plan.max_lines.max(1));
            for _ in 0..lines {
                if let Some(product_id) = products.choose(&mut self.rng) {
                    let quantity = self.rng.gen_range(1..=plan.max_quantity.max(1));
                    command = command.line(*product_id, quantity);
                }
            }

            match self.orders.handle(command).await {
                Ok(_) => report.orders += 1,
                Err(OrderError::NoShippingAddress { user_id }) => {
                    warn!(user_id = %user_id, "Skipping demo order for user without address");
                    report.skipped_no_address += 1;
                }
                Err(error) => return Err(error.into()),
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::AsciiSlugger;
    use crate::domain::order::StampedReferenceGenerator;
    use crate::metrics::Metrics;
    use crate::storage::MemoryStore;

    struct PlainHasher;

    impl PasswordHasher for PlainHasher {
        fn hash(&self, plain: &str) -> Result<String, IdentityError> {
            Ok(format!("plain:{plain}"))
        }

        fn verify(&self, plain: &str, hash: &str) -> bool {
            hash == format!("plain:{plain}")
        }
    }

    fn seeder(store: Arc<MemoryStore>, metrics: Arc<Metrics>) -> Seeder {
        let handler = PlaceOrderHandler::new(
            store.clone(),
            Arc::new(StampedReferenceGenerator::new()),
            metrics,
        );
        Seeder::new(
            store.clone(),
            store,
            Arc::new(handler),
            Arc::new(PlainHasher),
            Arc::new(AsciiSlugger),
        )
        .with_seed(2024)
    }

    #[tokio::test]
    async fn test_default_plan_seeds_everything() {
        let store = Arc::new(MemoryStore::new());
        let metrics = Arc::new(Metrics::new().unwrap());

        let report = seeder(store.clone(), metrics)
            .run(&SeedPlan::default())
            .await
            .unwrap();

        assert_eq!(report.users, 5);
        assert!((5..=10).contains(&report.addresses));
        assert_eq!(report.categories, 5);
        assert_eq!(report.products, 30);
        assert_eq!(report.orders, 10);
        assert_eq!(report.skipped_no_address, 0);

        assert_eq!(store.user_count().await, 5);
        assert_eq!(store.product_count().await, 30);
        assert_eq!(store.order_count().await, 10);
        let items = store.order_item_count().await;
        assert!((10..=40).contains(&items));
    }

    #[tokio::test]
    async fn test_users_without_address_are_counted_not_fatal() {
        let store = Arc::new(MemoryStore::new());
        let metrics = Arc::new(Metrics::new().unwrap());
        let plan = SeedPlan {
            min_addresses: 0,
            max_addresses: 0,
            ..SeedPlan::default()
        };

        let report = seeder(store.clone(), metrics.clone()).run(&plan).await.unwrap();

        assert_eq!(report.addresses, 0);
        assert_eq!(report.orders, 0);
        assert_eq!(report.skipped_no_address, 10);
        assert_eq!(store.order_count().await, 0);
        assert_eq!(
            metrics
                .order_build_failures
                .with_label_values(&["no_shipping_address"])
                .get(),
            10
        );
    }

    #[tokio::test]
    async fn test_seeded_orders_are_paid_and_consistent() {
        let store = Arc::new(MemoryStore::new());
        let metrics = Arc::new(Metrics::new().unwrap());

        seeder(store.clone(), metrics.clone())
            .run(&SeedPlan::default())
            .await
            .unwrap();

        assert_eq!(metrics.orders_placed.with_label_values(&["PAID"]).get(), 10);
    }
}
