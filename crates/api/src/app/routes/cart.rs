use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{post, put},
    Json, Router,
};

use flashcart_cart::NewCartItem;
use flashcart_core::{DomainError, ProductId};

use crate::app::services::{blocking, AppServices};
use crate::app::{dto, errors};
use crate::context::UserContext;

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_cart).get(get_cart))
        .route("/items", post(add_item).delete(clear_cart))
        .route("/items/:product_id", put(update_item))
}

fn no_cart() -> axum::response::Response {
    errors::json_error(StatusCode::NOT_FOUND, "not_found", "cart not found")
}

pub async fn create_cart(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
) -> axum::response::Response {
    match blocking(&services, move |s| Ok(s.carts().create(user.user_id()))).await {
        Ok(cart) => (
            StatusCode::CREATED,
            Json(serde_json::json!({
                "cart_id": cart.id,
                "user_id": cart.user_id,
                "version": cart.version,
            })),
        )
            .into_response(),
        Err(resp) => resp,
    }
}

pub async fn get_cart(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
) -> axum::response::Response {
    match blocking(&services, move |s| Ok(s.carts().get_by_user_id(user.user_id()))).await {
        Ok(Some(cart)) => (StatusCode::OK, Json(serde_json::json!({ "data": dto::cart_to_json(&cart) }))).into_response(),
        Ok(None) => no_cart(),
        Err(resp) => resp,
    }
}

/// Add (or merge) a product into the user's current cart.
///
/// The line snapshots the live catalog price and name; the requested quantity
/// must be in stock at the time of the add.
pub async fn add_item(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
    Query(mode): Query<dto::ModeQuery>,
    Json(body): Json<dto::AddToCartRequest>,
) -> axum::response::Response {
    let strategy = match mode.strategy() {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    let write_mode = strategy.cart_write_mode(mode.expected_version());
    let product_id = ProductId::new(body.product_id);

    let added = blocking(&services, move |s| {
        let Some(cart) = s.carts().get_by_user_id(user.user_id()) else {
            return Ok(None);
        };
        let product = s.inventory().get(product_id)?;
        if !product.has_stock_for(body.quantity) {
            return Err(DomainError::InsufficientStock {
                product_id,
                requested: body.quantity,
                available: product.stock,
            });
        }
        let line = NewCartItem {
            product_id,
            quantity: body.quantity,
            price: product.price,
            name: product.name,
        };
        s.carts().add_item(cart.id, write_mode, &line).map(Some)
    })
    .await;

    match added {
        Ok(Some(cart)) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "message": "item added to cart",
                "cart": dto::cart_to_json(&cart),
                "mode": strategy,
            })),
        )
            .into_response(),
        Ok(None) => no_cart(),
        Err(resp) => resp,
    }
}

/// Set the quantity of a line already in the user's cart.
pub async fn update_item(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
    Path(product_id): Path<String>,
    Query(mode): Query<dto::ModeQuery>,
    Json(body): Json<dto::UpdateCartItemRequest>,
) -> axum::response::Response {
    let product_id: ProductId = match errors::parse_id(&product_id, "product") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let strategy = match mode.strategy() {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    let write_mode = strategy.cart_write_mode(mode.expected_version());

    let updated = blocking(&services, move |s| {
        let Some(cart) = s.carts().get_by_user_id(user.user_id()) else {
            return Ok(None);
        };
        s.carts()
            .update_item_quantity(cart.id, write_mode, product_id, body.quantity)
            .map(Some)
    })
    .await;

    match updated {
        Ok(Some(cart)) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "message": "cart item updated",
                "cart": dto::cart_to_json(&cart),
                "mode": strategy,
            })),
        )
            .into_response(),
        Ok(None) => no_cart(),
        Err(resp) => resp,
    }
}

pub async fn clear_cart(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
) -> axum::response::Response {
    let cleared = blocking(&services, move |s| match s.carts().get_by_user_id(user.user_id()) {
        Some(cart) => s.carts().clear(cart.id).map(Some),
        None => Ok(None),
    })
    .await;

    match cleared {
        Ok(Some(cart)) => (StatusCode::OK, Json(serde_json::json!({ "data": dto::cart_to_json(&cart) }))).into_response(),
        Ok(None) => no_cart(),
        Err(resp) => resp,
    }
}
