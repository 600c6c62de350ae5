use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{CatalogStore, IdentityStore, OrderStore, StorageError, CATEGORIES_SLUG_KEY};
use crate::domain::catalog::{Category, Product};
use crate::domain::identity::{Address, User};
use crate::domain::order::{Order, ReferenceCode};

// ============================================================================
// In-Memory Store
// ============================================================================
//
// Enforces the same keys and constraints as the Postgres schema. Every write
// validates first and mutates only once all checks pass, so a failed
// `save_order` leaves no order and no items behind.
//
// ============================================================================

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    /// Insertion order is the address order callers see
    addresses: Vec<Address>,
    categories: HashMap<Uuid, Category>,
    products: HashMap<Uuid, Product>,
    orders: HashMap<Uuid, Order>,
    references: HashMap<ReferenceCode, Uuid>,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn order_count(&self) -> usize {
        self.tables.read().await.orders.len()
    }

    pub async fn order_item_count(&self) -> usize {
        self.tables
            .read()
            .await
            .orders
            .values()
            .map(|order| order.items().len())
            .sum()
    }

    pub async fn find_order_by_reference(&self, reference: &ReferenceCode) -> Option<Order> {
        let tables = self.tables.read().await;
        tables
            .references
            .get(reference)
            .and_then(|id| tables.orders.get(id))
            .cloned()
    }

    pub async fn user_count(&self) -> usize {
        self.tables.read().await.users.len()
    }

    pub async fn product_count(&self) -> usize {
        self.tables.read().await.products.len()
    }
}

#[async_trait]
impl OrderStore for MemoryStore {
    async fn save_order(&self, order: &Order) -> Result<(), StorageError> {
        let mut tables = self.tables.write().await;

        if tables.references.contains_key(&order.reference) {
            return Err(StorageError::DuplicateReference(order.reference.to_string()));
        }
        if tables.orders.contains_key(&order.id) {
            return Err(StorageError::UniqueViolation("orders_pkey".to_string()));
        }
        // Same rule as the composite (address_id, user_id) foreign key
        let ships_to_own_address = tables
            .addresses
            .iter()
            .any(|a| a.id == order.address_id() && a.user_id == order.user_id());
        if !tables.users.contains_key(&order.user_id()) || !ships_to_own_address {
            return Err(StorageError::InvalidReference);
        }
        for item in order.items() {
            if !tables.products.contains_key(&item.product_id) {
                return Err(StorageError::InvalidReference);
            }
            if item.quantity <= 0 {
                return Err(StorageError::InvalidData);
            }
        }

        tables.references.insert(order.reference.clone(), order.id);
        tables.orders.insert(order.id, order.clone());
        Ok(())
    }

    async fn find_user_addresses(&self, user_id: Uuid) -> Result<Vec<Address>, StorageError> {
        Ok(self
            .tables
            .read()
            .await
            .addresses
            .iter()
            .filter(|address| address.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn find_product_price(&self, product_id: Uuid) -> Result<Option<Decimal>, StorageError> {
        Ok(self
            .tables
            .read()
            .await
            .products
            .get(&product_id)
            .map(|product| product.price))
    }
}

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn insert_category(&self, category: &Category) -> Result<(), StorageError> {
        let mut tables = self.tables.write().await;

        if tables.categories.values().any(|c| c.slug == category.slug) {
            return Err(StorageError::UniqueViolation(CATEGORIES_SLUG_KEY.to_string()));
        }

        tables.categories.insert(category.id, category.clone());
        Ok(())
    }

    async fn insert_product(&self, product: &Product) -> Result<(), StorageError> {
        let mut tables = self.tables.write().await;

        if let Some(category_id) = product.category_id {
            if !tables.categories.contains_key(&category_id) {
                return Err(StorageError::InvalidReference);
            }
        }

        tables.products.insert(product.id, product.clone());
        Ok(())
    }

    async fn find_product(&self, product_id: Uuid) -> Result<Option<Product>, StorageError> {
        Ok(self.tables.read().await.products.get(&product_id).cloned())
    }

    async fn list_products(&self) -> Result<Vec<Product>, StorageError> {
        let mut products: Vec<Product> =
            self.tables.read().await.products.values().cloned().collect();
        products.sort_by_key(|product| (product.created_at, product.id));
        Ok(products)
    }

    async fn update_product_price(
        &self,
        product_id: Uuid,
        price: Decimal,
    ) -> Result<(), StorageError> {
        let mut tables = self.tables.write().await;
        let product = tables
            .products
            .get_mut(&product_id)
            .ok_or(StorageError::NotFound)?;

        product.reprice(price).map_err(|_| StorageError::InvalidData)
    }
}

#[async_trait]
impl IdentityStore for MemoryStore {
    async fn insert_user(&self, user: &User) -> Result<(), StorageError> {
        let mut tables = self.tables.write().await;

        if tables.users.values().any(|u| u.email == user.email) {
            return Err(StorageError::DuplicateEmail(user.email.as_str().to_string()));
        }

        tables.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn insert_address(&self, address: &Address) -> Result<(), StorageError> {
        let mut tables = self.tables.write().await;

        if !tables.users.contains_key(&address.user_id) {
            return Err(StorageError::InvalidReference);
        }

        tables.addresses.push(address.clone());
        Ok(())
    }
}
