use axum::{routing::post, Router};

pub mod cart;
pub mod orders;
pub mod products;
pub mod system;

/// Router for all `/api` endpoints (user-scoped).
pub fn router() -> Router {
    Router::new()
        .nest("/products", products::router())
        .nest("/cart", cart::router())
        .nest("/orders", orders::router())
        .route("/flash-sale/:product_id/purchase", post(orders::flash_sale_purchase))
}
