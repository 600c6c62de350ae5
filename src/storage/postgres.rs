use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::postgres::PgRow;
use sqlx::{FromRow, PgPool, Postgres, Row};
use uuid::Uuid;

use super::{CatalogStore, IdentityStore, OrderStore, StorageError};
use crate::domain::catalog::{Category, Product};
use crate::domain::identity::{Address, User};
use crate::domain::order::Order;

// ============================================================================
// Postgres Store
// ============================================================================

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl<'r> FromRow<'r, PgRow> for Address {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            full_name: row.try_get("full_name")?,
            street: row.try_get("street")?,
            city: row.try_get("city")?,
            postal_code: row.try_get("postal_code")?,
            country: row.try_get("country")?,
        })
    }
}

impl<'r> FromRow<'r, PgRow> for Product {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let stock: i32 = row.try_get("stock")?;
        let stock = u32::try_from(stock).map_err(|e| sqlx::Error::ColumnDecode {
            index: "stock".to_string(),
            source: Box::new(e),
        })?;

        Ok(Self {
            id: row.try_get("id")?,
            category_id: row.try_get("category_id")?,
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            price: row.try_get("price")?,
            stock,
            created_at: row.try_get("created_at")?,
        })
    }
}

fn stock_column(stock: u32) -> Result<i32, StorageError> {
    i32::try_from(stock).map_err(|_| StorageError::InvalidData)
}

#[async_trait]
impl OrderStore for PgStore {
    async fn save_order(&self, order: &Order) -> Result<(), StorageError> {
        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query(
            "INSERT INTO orders (id, user_id, address_id, reference, total, status, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(order.id)
        .bind(order.user_id())
        .bind(order.address_id())
        .bind(order.reference.as_str())
        .bind(order.total())
        .bind(order.status.as_str())
        .bind(order.created_at)
        .execute(&mut *tx)
        .await;

        if let Err(error) = inserted {
            return Err(match StorageError::from(error) {
                StorageError::DuplicateReference(_) => {
                    StorageError::DuplicateReference(order.reference.to_string())
                }
                other => other,
            });
        }

        for item in order.items() {
            sqlx::query(
                "INSERT INTO order_items (id, order_id, product_id, quantity, unit_price)
                 VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(item.id)
            .bind(item.order_id)
            .bind(item.product_id)
            .bind(item.quantity)
            .bind(item.unit_price)
            .execute(&mut *tx)
            .await?;
        }

        // Dropping the transaction without commit rolls everything back
        tx.commit().await?;

        tracing::debug!(
            order_id = %order.id,
            reference = %order.reference,
            items = order.items().len(),
            "Order persisted"
        );

        Ok(())
    }

    async fn find_user_addresses(&self, user_id: Uuid) -> Result<Vec<Address>, StorageError> {
        sqlx::query_as::<Postgres, Address>(
            "SELECT id, user_id, full_name, street, city, postal_code, country
             FROM addresses WHERE user_id = $1 ORDER BY id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Into::into)
    }

    async fn find_product_price(&self, product_id: Uuid) -> Result<Option<Decimal>, StorageError> {
        sqlx::query_scalar::<Postgres, Decimal>("SELECT price FROM products WHERE id = $1")
            .bind(product_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Into::into)
    }
}

#[async_trait]
impl CatalogStore for PgStore {
    async fn insert_category(&self, category: &Category) -> Result<(), StorageError> {
        sqlx::query("INSERT INTO categories (id, name, slug) VALUES ($1, $2, $3)")
            .bind(category.id)
            .bind(&category.name)
            .bind(category.slug.as_str())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn insert_product(&self, product: &Product) -> Result<(), StorageError> {
        sqlx::query(
            "INSERT INTO products (id, category_id, name, description, price, stock, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(product.id)
        .bind(product.category_id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price)
        .bind(stock_column(product.stock)?)
        .bind(product.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_product(&self, product_id: Uuid) -> Result<Option<Product>, StorageError> {
        sqlx::query_as::<Postgres, Product>(
            "SELECT id, category_id, name, description, price, stock, created_at
             FROM products WHERE id = $1",
        )
        .bind(product_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Into::into)
    }

    async fn list_products(&self) -> Result<Vec<Product>, StorageError> {
        sqlx::query_as::<Postgres, Product>(
            "SELECT id, category_id, name, description, price, stock, created_at
             FROM products ORDER BY created_at, id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(Into::into)
    }

    async fn update_product_price(
        &self,
        product_id: Uuid,
        price: Decimal,
    ) -> Result<(), StorageError> {
        let result = sqlx::query("UPDATE products SET price = $2 WHERE id = $1")
            .bind(product_id)
            .bind(price)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl IdentityStore for PgStore {
    async fn insert_user(&self, user: &User) -> Result<(), StorageError> {
        let roles: Vec<String> = user.roles.iter().map(|role| role.0.clone()).collect();

        sqlx::query(
            "INSERT INTO users (id, email, roles, password, first_name, last_name,
                                created_at, last_login_at, reset_token)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(user.id)
        .bind(user.email.as_str())
        .bind(&roles)
        .bind(&user.password_hash)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(user.created_at())
        .bind(user.last_login_at)
        .bind(&user.reset_token)
        .execute(&self.pool)
        .await
        .map_err(|error| match StorageError::from(error) {
            StorageError::DuplicateEmail(_) => StorageError::DuplicateEmail(user.email.as_str().to_string()),
            other => other,
        })?;
        Ok(())
    }

    async fn insert_address(&self, address: &Address) -> Result<(), StorageError> {
        sqlx::query(
            "INSERT INTO addresses (id, user_id, full_name, street, city, postal_code, country)
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(address.id)
        .bind(address.user_id)
        .bind(&address.full_name)
        .bind(&address.street)
        .bind(&address.city)
        .bind(&address.postal_code)
        .bind(&address.country)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stock_column_rejects_out_of_range() {
        assert_eq!(stock_column(100).unwrap(), 100);
        assert!(matches!(stock_column(u32::MAX), Err(StorageError::InvalidData)));
    }
}
