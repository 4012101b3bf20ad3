//! Shared fixtures for the integration tests: an in-memory database plus
//! seeded products and users.

#![allow(dead_code)]

use rust_decimal::Decimal;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use storefront_server::auth::CurrentUser;
use storefront_server::db::DbService;
use storefront_server::db::models::{
    Product, ProductCreate, Role, ShippingAddress, User, UserCreate,
};
use storefront_server::db::repository::{ProductRepository, UserRepository};
use storefront_server::orders::CheckoutPayload;

pub async fn memory_db() -> Surreal<Db> {
    DbService::memory()
        .await
        .expect("in-memory database")
        .db
}

pub async fn seed_product(db: &Surreal<Db>, name: &str, price: Decimal, stock: i64) -> Product {
    ProductRepository::new(db.clone())
        .create(ProductCreate {
            name: name.to_string(),
            image: format!("/images/{name}.jpg"),
            brand: "Acme".to_string(),
            category: "Gadgets".to_string(),
            description: format!("{name} description"),
            price,
            count_in_stock: stock,
            sku: None,
            weight: None,
            dimensions: None,
        })
        .await
        .expect("seed product")
}

pub async fn seed_user(db: &Surreal<Db>, name: &str, email: &str, role: Role) -> User {
    UserRepository::new(db.clone())
        .create(UserCreate {
            name: name.to_string(),
            email: email.to_string(),
            role,
        })
        .await
        .expect("seed user")
}

pub async fn stock_of(db: &Surreal<Db>, product: &Product) -> i64 {
    let id = product.id.as_ref().expect("product id").to_string();
    ProductRepository::new(db.clone())
        .find_by_id(&id)
        .await
        .expect("stock lookup")
        .expect("product exists")
        .count_in_stock
}

pub fn shipping_address() -> ShippingAddress {
    ShippingAddress {
        address: "1 Main St".to_string(),
        city: "Springfield".to_string(),
        postal_code: "12345".to_string(),
        country: "USA".to_string(),
    }
}

/// Checkout payload for `(product, qty)` pairs, priced from the catalog rows.
pub fn checkout(items: &[(&Product, i64)]) -> CheckoutPayload {
    use storefront_server::db::models::OrderItemInput;

    let order_items: Vec<OrderItemInput> = items
        .iter()
        .map(|(p, qty)| OrderItemInput {
            product: p.id.as_ref().expect("product id").to_string(),
            name: p.name.clone(),
            image: p.image.clone(),
            price: p.price,
            qty: *qty,
        })
        .collect();
    let items_price: Decimal = items
        .iter()
        .map(|(p, qty)| p.price * Decimal::from(*qty))
        .sum();

    CheckoutPayload {
        order_items,
        shipping_address: shipping_address(),
        payment_method: "PayPal".to_string(),
        tax_price: Decimal::ZERO,
        shipping_price: Decimal::ZERO,
        total_price: items_price,
    }
}

pub fn as_caller(user: &User) -> CurrentUser {
    CurrentUser {
        id: user.id.as_ref().expect("user id").to_string(),
        name: user.name.clone(),
        email: user.email.clone(),
        role: user.role,
    }
}

pub fn admin_caller() -> CurrentUser {
    CurrentUser {
        id: "user:admin".to_string(),
        name: "Admin".to_string(),
        email: "admin@example.com".to_string(),
        role: Role::Admin,
    }
}
