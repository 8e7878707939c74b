use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};

use flashcart_core::ProductId;

use crate::app::services::{blocking, AppServices};
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_products))
        .route("/search", get(search_products))
        .route("/:id", get(get_product))
        .route("/:id/purchase", post(purchase_product))
        .route("/:id/stock", put(update_stock))
}

pub async fn list_products(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::PageQuery>,
) -> axum::response::Response {
    let page = query.to_request();
    match blocking(&services, move |s| Ok(s.inventory().list(page))).await {
        Ok(page) => (StatusCode::OK, Json(page)).into_response(),
        Err(resp) => resp,
    }
}

pub async fn search_products(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::SearchQuery>,
) -> axum::response::Response {
    let filter = match query.to_filter() {
        Ok(f) => f,
        Err(resp) => return resp,
    };
    let page = query.to_page();

    match blocking(&services, move |s| Ok(s.inventory().search(&filter, page))).await {
        Ok(page) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "data": page,
                "query": query.q,
                "category": query.category,
            })),
        )
            .into_response(),
        Err(resp) => resp,
    }
}

pub async fn get_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let product_id: ProductId = match errors::parse_id(&id, "product") {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match blocking(&services, move |s| s.inventory().get(product_id)).await {
        Ok(product) => (StatusCode::OK, Json(product)).into_response(),
        Err(resp) => resp,
    }
}

/// Direct purchase through the protected decrement.
pub async fn purchase_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<dto::PurchaseRequest>,
) -> axum::response::Response {
    let product_id: ProductId = match errors::parse_id(&id, "product") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let quantity = body.quantity;

    match blocking(&services, move |s| s.inventory().decrement_stock(product_id, quantity)).await {
        Ok(product) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "message": "purchase successful",
                "product_id": product_id,
                "quantity": quantity,
                "stock": product.stock,
            })),
        )
            .into_response(),
        Err(resp) => resp,
    }
}

/// Administrative stock overwrite.
pub async fn update_stock(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<dto::UpdateStockRequest>,
) -> axum::response::Response {
    let product_id: ProductId = match errors::parse_id(&id, "product") {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match blocking(&services, move |s| s.inventory().set_stock(product_id, body.stock)).await {
        Ok(change) => (StatusCode::OK, Json(change)).into_response(),
        Err(resp) => resp,
    }
}
