//! Product Repository

use super::{BaseRepository, RepoError, RepoResult, parse_record_id};
use crate::db::models::{Product, ProductCreate};
use surrealdb::{RecordId, Surreal};
use surrealdb::engine::local::Db;

const PRODUCT_TABLE: &str = "product";

#[derive(Clone)]
pub struct ProductRepository {
    base: BaseRepository,
}

impl ProductRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn create(&self, data: ProductCreate) -> RepoResult<Product> {
        let created: Option<Product> = self
            .base
            .db()
            .create(PRODUCT_TABLE)
            .content(data.into_product())
            .await?;
        created.ok_or_else(|| RepoError::Database("Failed to create product".to_string()))
    }

    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Product>> {
        let Some(record_id) = parse_record_id(PRODUCT_TABLE, id) else {
            return Ok(None);
        };
        let product: Option<Product> = self.base.db().select(record_id).await?;
        Ok(product)
    }

    pub async fn find_all(&self) -> RepoResult<Vec<Product>> {
        let products: Vec<Product> = self
            .base
            .db()
            .query("SELECT * FROM product ORDER BY name")
            .await?
            .take(0)?;
        Ok(products)
    }

    /// Conditionally decrement stock: succeeds only while enough units
    /// remain, so two concurrent orders cannot drive the count negative.
    ///
    /// Returns `false` (without mutating) when stock is insufficient.
    pub async fn try_decrement_stock(&self, product: &RecordId, qty: i64) -> RepoResult<bool> {
        let updated: Vec<Product> = self
            .base
            .db()
            .query("UPDATE $product SET count_in_stock -= $qty WHERE count_in_stock >= $qty RETURN AFTER")
            .bind(("product", product.clone()))
            .bind(("qty", qty))
            .await?
            .take(0)?;
        Ok(!updated.is_empty())
    }

    /// Return units to stock (order cancellation, checkout compensation).
    pub async fn restock(&self, product: &RecordId, qty: i64) -> RepoResult<()> {
        self.base
            .db()
            .query("UPDATE $product SET count_in_stock += $qty")
            .bind(("product", product.clone()))
            .bind(("qty", qty))
            .await?
            .check()?;
        Ok(())
    }
}
