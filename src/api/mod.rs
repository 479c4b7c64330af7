//! HTTP API handlers
//!
//! Thin request/response mapping over the service components. Per the
//! degradation policy, read endpoints answer with empty/zero/default bodies
//! rather than hard failures; only a malformed request earns a 400.

pub mod health;
pub mod products;
pub mod users;

pub use health::health_routes;
pub use products::product_routes;
pub use users::user_routes;
