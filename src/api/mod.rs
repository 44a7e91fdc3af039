//! HTTP API layer

pub mod handlers;
pub mod pages;
pub mod routes;

pub use handlers::AppState;
pub use routes::{create_routes, RouterBuilder};
