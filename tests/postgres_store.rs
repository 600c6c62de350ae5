//! `PgStore` against a throwaway Postgres container.
//!
//! These need Docker: `cargo test --test postgres_store -- --ignored`.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use std::collections::BTreeSet;
use testcontainers::runners::AsyncRunner;
use testcontainers::ContainerAsync;
use testcontainers_modules::postgres::Postgres as PostgresImage;
use uuid::Uuid;

use storefront::database;
use storefront::domain::catalog::{NewProduct, Product};
use storefront::domain::identity::{
    Address, Email, IdentityError, NewAddress, NewUser, PasswordHasher, User,
};
use storefront::domain::order::{OrderBuilder, ReferenceCode, ReferenceGenerator};
use storefront::storage::{CatalogStore, IdentityStore, OrderStore, PgStore, StorageError};

struct PlainHasher;

impl PasswordHasher for PlainHasher {
    fn hash(&self, plain: &str) -> Result<String, IdentityError> {
        Ok(format!("plain:{plain}"))
    }

    fn verify(&self, plain: &str, hash: &str) -> bool {
        hash == format!("plain:{plain}")
    }
}

struct FixedReference(&'static str);

impl ReferenceGenerator for FixedReference {
    fn next_reference(&self, _now: DateTime<Utc>) -> ReferenceCode {
        ReferenceCode(self.0.to_string())
    }
}

/// Migrated database; the container lives as long as this value
struct TestDb {
    store: PgStore,
    _container: ContainerAsync<PostgresImage>,
}

impl TestDb {
    async fn new() -> Self {
        let container = PostgresImage::default()
            .start()
            .await
            .expect("Failed to start PostgreSQL container");
        let port = container
            .get_host_port_ipv4(5432)
            .await
            .expect("Failed to get container port");
        let host = std::env::var("TESTCONTAINERS_HOST_OVERRIDE")
            .unwrap_or_else(|_| "localhost".to_string());

        let pool = PgPool::connect(&format!("postgres://postgres:postgres@{host}:{port}/postgres"))
            .await
            .expect("Failed to connect to test database");
        database::migrate(&pool)
            .await
            .expect("Failed to run migrations");

        Self {
            store: PgStore::new(pool),
            _container: container,
        }
    }

    async fn count(&self, table: &str) -> i64 {
        sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(self.store.pool())
            .await
            .unwrap()
    }

    async fn user(&self, email: &str) -> (User, Address) {
        let user = User::register(
            NewUser {
                email: Email::new(email),
                first_name: "Manon".to_string(),
                last_name: "Girard".to_string(),
                password: "password".to_string(),
                roles: BTreeSet::new(),
                created_at: Utc::now(),
            },
            &PlainHasher,
        )
        .unwrap();
        self.store.insert_user(&user).await.unwrap();

        let address = Address::new(
            user.id,
            NewAddress {
                full_name: user.full_name(),
                street: "5 rue Gambetta".to_string(),
                city: "Toulouse".to_string(),
                postal_code: "31000".to_string(),
                country: "France".to_string(),
            },
        )
        .unwrap();
        self.store.insert_address(&address).await.unwrap();

        (user, address)
    }

    async fn product(&self, price: Decimal) -> Product {
        let product = Product::new(NewProduct {
            category_id: None,
            name: "casque audio".to_string(),
            description: "Un casque.".to_string(),
            price,
            stock: 8,
            created_at: Utc::now(),
        })
        .unwrap();
        self.store.insert_product(&product).await.unwrap();
        product
    }
}

#[tokio::test]
#[ignore = "needs Docker"]
async fn test_order_and_items_saved_together() {
    let db = TestDb::new().await;
    let (user, address) = db.user("manon@example.fr").await;
    let product = db.product(Decimal::new(7999, 2)).await;
    let addresses = vec![address];

    let order = OrderBuilder::new(user.id, &addresses)
        .product(&product, 2)
        .build(&FixedReference("CMD-PG-1"), Utc::now())
        .unwrap();
    db.store.save_order(&order).await.unwrap();

    let stored_total: Decimal = sqlx::query_scalar("SELECT total FROM orders WHERE id = $1")
        .bind(order.id)
        .fetch_one(db.store.pool())
        .await
        .unwrap();
    let item_sum: Decimal =
        sqlx::query_scalar("SELECT SUM(quantity * unit_price) FROM order_items WHERE order_id = $1")
            .bind(order.id)
            .fetch_one(db.store.pool())
            .await
            .unwrap();

    assert_eq!(stored_total, Decimal::new(15998, 2));
    assert_eq!(stored_total, item_sum);
    assert_eq!(db.count("order_items").await, 1);
}

#[tokio::test]
#[ignore = "needs Docker"]
async fn test_failing_item_rolls_back_the_order() {
    let db = TestDb::new().await;
    let (user, address) = db.user("manon@example.fr").await;
    let product = db.product(Decimal::ONE).await;
    let addresses = vec![address];

    let order = OrderBuilder::new(user.id, &addresses)
        .product(&product, 1)
        .line(Uuid::new_v4(), Decimal::ONE, 1)
        .build(&FixedReference("CMD-PG-2"), Utc::now())
        .unwrap();

    assert!(matches!(
        db.store.save_order(&order).await,
        Err(StorageError::InvalidReference)
    ));
    assert_eq!(db.count("orders").await, 0);
    assert_eq!(db.count("order_items").await, 0);
}

#[tokio::test]
#[ignore = "needs Docker"]
async fn test_duplicate_reference_reported_with_code() {
    let db = TestDb::new().await;
    let (user, address) = db.user("manon@example.fr").await;
    let product = db.product(Decimal::ONE).await;
    let addresses = vec![address];
    let builder = OrderBuilder::new(user.id, &addresses).product(&product, 1);

    let first = builder.build(&FixedReference("CMD-PG-3"), Utc::now()).unwrap();
    let second = builder.build(&FixedReference("CMD-PG-3"), Utc::now()).unwrap();
    db.store.save_order(&first).await.unwrap();

    assert!(matches!(
        db.store.save_order(&second).await,
        Err(StorageError::DuplicateReference(code)) if code == "CMD-PG-3"
    ));
    assert_eq!(db.count("orders").await, 1);
    assert_eq!(db.count("order_items").await, 1);
}

#[tokio::test]
#[ignore = "needs Docker"]
async fn test_address_of_another_user_rejected() {
    let db = TestDb::new().await;
    let (buyer, _) = db.user("manon@example.fr").await;
    let (_, foreign) = db.user("hugo@example.fr").await;
    let product = db.product(Decimal::ONE).await;

    let claimed = vec![Address {
        user_id: buyer.id,
        ..foreign
    }];
    let order = OrderBuilder::new(buyer.id, &claimed)
        .product(&product, 1)
        .build(&FixedReference("CMD-PG-4"), Utc::now())
        .unwrap();

    assert!(matches!(
        db.store.save_order(&order).await,
        Err(StorageError::InvalidReference)
    ));
    assert_eq!(db.count("orders").await, 0);
}

#[tokio::test]
#[ignore = "needs Docker"]
async fn test_email_unique_regardless_of_case() {
    let db = TestDb::new().await;
    db.user("Manon@Example.fr").await;

    let again = User::register(
        NewUser {
            email: Email::new("manon@example.fr"),
            first_name: "Manon".to_string(),
            last_name: "Bis".to_string(),
            password: "password".to_string(),
            roles: BTreeSet::new(),
            created_at: Utc::now(),
        },
        &PlainHasher,
    )
    .unwrap();

    assert!(matches!(
        db.store.insert_user(&again).await,
        Err(StorageError::DuplicateEmail(email)) if email == "manon@example.fr"
    ));
    assert_eq!(db.count("users").await, 1);
}

#[tokio::test]
#[ignore = "needs Docker"]
async fn test_products_listed_oldest_first() {
    let db = TestDb::new().await;
    let first = db.product(Decimal::new(1000, 2)).await;
    let second = db.product(Decimal::new(2000, 2)).await;

    let listed = db.store.list_products().await.unwrap();

    assert_eq!(
        listed.iter().map(|p| p.id).collect::<Vec<_>>(),
        vec![first.id, second.id]
    );
    assert_eq!(listed[1].price, Decimal::new(2000, 2));
}
