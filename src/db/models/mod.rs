//! Entity and payload models stored in SurrealDB.

pub mod delivery_route;
pub mod order;
pub mod product;
pub mod user;

pub use delivery_route::{
    DeliveryRoute, RouteCreate, RouteStop, RouteStopInput, RouteStatus, RouteUpdate, StopStatus,
};
pub use order::{
    Order, OrderItem, OrderItemInput, OrderOwner, OrderStatus, PaymentResult, ShippingAddress,
};
pub use product::{Dimensions, Product, ProductCreate};
pub use user::{Role, User, UserCreate};
