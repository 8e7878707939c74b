use std::sync::Arc;

use axum::{extract::Extension, response::IntoResponse, Json};
use chrono::Utc;

use crate::app::services::{blocking, AppServices};

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": Utc::now().timestamp(),
    }))
}

pub async fn metrics(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    let counts = blocking(&services, |s| {
        Ok((s.checkout.stats(), s.inventory().len(), s.carts().len()))
    })
    .await;

    match counts {
        Ok((checkout, catalog_size, carts)) => Json(serde_json::json!({
            "process": services.clock.snapshot(),
            "checkout": checkout,
            "catalog_size": catalog_size,
            "carts": carts,
        }))
        .into_response(),
        Err(resp) => resp,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    use axum::http::StatusCode;
    use flashcart_core::{DelayPolicy, DelaySite, ProductId};

    use crate::app::services::build_services;
    use crate::config::Config;

    #[tokio::test]
    async fn metrics_wait_for_a_slow_stock_write_off_the_runtime() {
        let config = Config {
            delays: DelayPolicy::none().with(DelaySite::StockWrite, Duration::from_millis(200)),
            ..Config::for_tests()
        };
        let services = Arc::new(build_services(&config));

        let writer = {
            let services = Arc::clone(&services);
            std::thread::spawn(move || services.inventory().decrement_stock(ProductId::new(1), 1))
        };
        // Let the writer take the catalog lock.
        std::thread::sleep(Duration::from_millis(20));

        let started = Instant::now();
        let pending = tokio::spawn(metrics(Extension(Arc::clone(&services))));
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(started.elapsed() < Duration::from_millis(150));
        assert!(!pending.is_finished());

        let response = pending.await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        writer.join().unwrap().unwrap();
    }
}
