pub mod client;
mod handlers;

use axum::Router;

use crate::state::AppState;

pub use client::CatalogClient;

pub fn router() -> Router<AppState> {
    handlers::catalog_routes()
}
