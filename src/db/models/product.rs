//! Product Model
//!
//! Catalog entry. Stock is only ever mutated by order creation (conditional
//! decrement) and order cancellation (increment).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// Physical dimensions (advisory, admin dashboard only)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Dimensions {
    pub length: Decimal,
    pub width: Decimal,
    pub height: Decimal,
}

/// Product entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: Option<RecordId>,
    pub name: String,
    pub image: String,
    pub brand: String,
    pub category: String,
    pub description: String,
    pub price: Decimal,
    pub count_in_stock: i64,
    pub sku: Option<String>,
    pub weight: Option<Decimal>,
    pub dimensions: Option<Dimensions>,
    pub rating: Decimal,
    pub num_reviews: i64,
}

/// Create product payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductCreate {
    pub name: String,
    pub image: String,
    pub brand: String,
    pub category: String,
    pub description: String,
    pub price: Decimal,
    pub count_in_stock: i64,
    pub sku: Option<String>,
    pub weight: Option<Decimal>,
    pub dimensions: Option<Dimensions>,
}

impl ProductCreate {
    pub fn into_product(self) -> Product {
        Product {
            id: None,
            name: self.name,
            image: self.image,
            brand: self.brand,
            category: self.category,
            description: self.description,
            price: self.price,
            count_in_stock: self.count_in_stock,
            sku: self.sku,
            weight: self.weight,
            dimensions: self.dimensions,
            rating: Decimal::ZERO,
            num_reviews: 0,
        }
    }
}
