use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use flashcart_checkout::CheckoutRequest;
use flashcart_core::{CartId, DomainError, OrderId, ProductId};

use crate::app::services::{blocking, AppServices};
use crate::app::{dto, errors};
use crate::context::UserContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_orders).post(create_order))
        .route("/stats", get(stats))
        .route("/:id", get(get_order))
}

/// Check out a cart with the strategy named by `?mode=`.
pub async fn create_order(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
    Query(mode): Query<dto::ModeQuery>,
    Json(body): Json<dto::CreateOrderRequest>,
) -> axum::response::Response {
    let strategy = match mode.strategy() {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    let cart_id: CartId = match errors::parse_id(&body.cart_id, "cart") {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    let request = CheckoutRequest {
        cart_id,
        user_id: user.user_id(),
        shipping_address: body.shipping_address,
        payment_method: body.payment_method,
    };

    match blocking(&services, move |s| s.checkout.create_order(strategy.checkout(), &request)).await {
        Ok(order) => (
            StatusCode::CREATED,
            Json(serde_json::json!({
                "order": order,
                "mode": strategy,
            })),
        )
            .into_response(),
        Err(resp) => resp,
    }
}

pub async fn list_orders(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
) -> axum::response::Response {
    match blocking(&services, move |s| Ok(s.checkout.orders_for_user(user.user_id()))).await {
        Ok(orders) => (StatusCode::OK, Json(serde_json::json!({ "data": orders }))).into_response(),
        Err(resp) => resp,
    }
}

pub async fn get_order(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let order_id: OrderId = match errors::parse_id(&id, "order") {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    let found = blocking(&services, move |s| {
        let order = s.checkout.order(order_id)?;
        if order.user_id != user.user_id() {
            return Err(DomainError::Unauthorized);
        }
        Ok(order)
    })
    .await;

    match found {
        Ok(order) => (StatusCode::OK, Json(order)).into_response(),
        Err(resp) => resp,
    }
}

pub async fn stats(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match blocking(&services, |s| Ok(s.checkout.stats())).await {
        Ok(stats) => Json(serde_json::json!({ "stats": stats })).into_response(),
        Err(resp) => resp,
    }
}

/// `POST /api/flash-sale/:product_id/purchase?quantity=N`
pub async fn flash_sale_purchase(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
    Path(product_id): Path<String>,
    Query(query): Query<dto::FlashSaleQuery>,
) -> axum::response::Response {
    let product_id: ProductId = match errors::parse_id(&product_id, "product") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let quantity = query.quantity.unwrap_or(1);

    let purchased = blocking(&services, move |s| {
        s.checkout.flash_sale_purchase(product_id, quantity, user.user_id())
    })
    .await;

    match purchased {
        Ok(order) => (
            StatusCode::CREATED,
            Json(serde_json::json!({
                "message": "flash sale purchase successful",
                "order": order,
            })),
        )
            .into_response(),
        Err(resp) => resp,
    }
}
