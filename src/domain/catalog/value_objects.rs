use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::CatalogError;
use super::slug::Slugger;
use crate::domain::money;

// ============================================================================
// Catalog Value Objects
// ============================================================================

/// URL-safe category key, unique across categories
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Slug(pub String);

impl Slug {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Slug {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub slug: Slug,
}

impl Category {
    /// Create a category whose slug is derived from its name
    pub fn new(name: impl Into<String>, slugger: &dyn Slugger) -> Result<Self, CatalogError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(CatalogError::EmptyCategoryName);
        }

        let slug = slugger.slug(&name);
        if slug.as_str().is_empty() {
            return Err(CatalogError::EmptySlug(name));
        }

        Ok(Self {
            id: Uuid::now_v7(),
            name,
            slug,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub category_id: Option<Uuid>,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub stock: u32,
    pub created_at: DateTime<Utc>,
}

/// Catalog input for a product that does not exist yet
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub category_id: Option<Uuid>,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub stock: u32,
    pub created_at: DateTime<Utc>,
}

impl Product {
    pub fn new(input: NewProduct) -> Result<Self, CatalogError> {
        if input.name.trim().is_empty() {
            return Err(CatalogError::EmptyProductName);
        }
        validate_price(input.price)?;

        Ok(Self {
            id: Uuid::now_v7(),
            category_id: input.category_id,
            name: input.name,
            description: input.description,
            price: input.price,
            stock: input.stock,
            created_at: input.created_at,
        })
    }

    /// Change the catalog price; existing order items keep their snapshot
    pub fn reprice(&mut self, price: Decimal) -> Result<(), CatalogError> {
        validate_price(price)?;
        self.price = price;
        Ok(())
    }
}

fn validate_price(price: Decimal) -> Result<(), CatalogError> {
    if price.is_sign_negative() && !price.is_zero() {
        return Err(CatalogError::NegativePrice(price));
    }
    money::check_storable(price)?;
    Ok(())
}
