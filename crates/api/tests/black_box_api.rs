use flashcart_api::config::Config;
use reqwest::StatusCode;
use serde_json::{json, Value};

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        // Same router as prod, small undelayed catalog, ephemeral port.
        let app = flashcart_api::app::build_app(&Config::for_tests());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn create_cart(client: &reqwest::Client, srv: &TestServer, user: u64) -> String {
    let res = client
        .post(srv.url(&format!("/api/cart?user_id={user}")))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["version"], 1);
    body["cart_id"].as_str().unwrap().to_string()
}

async fn add_item(
    client: &reqwest::Client,
    srv: &TestServer,
    user: u64,
    query: &str,
    product_id: u64,
    quantity: u32,
) -> reqwest::Response {
    client
        .post(srv.url(&format!("/api/cart/items?user_id={user}&{query}")))
        .json(&json!({ "product_id": product_id, "quantity": quantity }))
        .send()
        .await
        .unwrap()
}

#[tokio::test]
async fn health_and_metrics_are_public() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client.get(srv.url("/health")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["status"], "healthy");

    let body: Value = client.get(srv.url("/metrics")).send().await.unwrap().json().await.unwrap();
    assert_eq!(body["catalog_size"], 50);
    assert_eq!(body["checkout"]["total_orders"], 0);
}

#[tokio::test]
async fn products_are_paged_searched_and_looked_up() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let page: Value = client
        .get(srv.url("/api/products?page=2&limit=10"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(page["items"].as_array().unwrap().len(), 10);
    assert_eq!(page["items"][0]["id"], 11);
    assert_eq!(page["total"], 50);
    assert_eq!(page["has_prev"], true);

    let found: Value = client
        .get(srv.url("/api/products/search?category=Books&q=product"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let items = found["data"]["items"].as_array().unwrap();
    assert!(!items.is_empty());
    assert!(items.iter().all(|p| p["category"] == "Books"));

    let res = client.get(srv.url("/api/products/3")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let product: Value = res.json().await.unwrap();
    assert_eq!(product["stock"], 4);

    let res = client.get(srv.url("/api/products/9999")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let res = client.get(srv.url("/api/products/abc")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn repeated_adds_merge_into_one_line() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    create_cart(&client, &srv, 7).await;

    assert_eq!(add_item(&client, &srv, 7, "mode=safe", 3, 1).await.status(), StatusCode::OK);
    let res = add_item(&client, &srv, 7, "mode=safe", 3, 2).await;
    assert_eq!(res.status(), StatusCode::OK);

    let body: Value = client
        .get(srv.url("/api/cart"))
        .header("X-User-ID", "7")
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let items = body["data"]["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["product_id"], 3);
    assert_eq!(items[0]["quantity"], 3);
    assert_eq!(body["data"]["version"], 3);
}

#[tokio::test]
async fn stale_optimistic_add_conflicts() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    create_cart(&client, &srv, 8).await;

    let res = add_item(&client, &srv, 8, "mode=optimistic&version=1", 5, 1).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["cart"]["version"], 2);
    assert_eq!(body["mode"], "optimistic");

    let res = add_item(&client, &srv, 8, "mode=optimistic&version=1", 5, 1).await;
    assert_eq!(res.status(), StatusCode::CONFLICT);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "version_conflict");
    assert_eq!(body["retry"], "immediately");
}

#[tokio::test]
async fn cart_errors_map_to_statuses() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client.get(srv.url("/api/cart?user_id=42")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    create_cart(&client, &srv, 42).await;
    let res = add_item(&client, &srv, 42, "mode=safe", 3, 500).await;
    assert_eq!(res.status(), StatusCode::CONFLICT);

    let res = add_item(&client, &srv, 42, "mode=sideways", 3, 1).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = client
        .put(srv.url("/api/cart/items/9?user_id=42"))
        .json(&json!({ "quantity": 2 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "item_not_found");

    let res = client.get(srv.url("/api/cart?user_id=bob")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn checkout_creates_a_pending_order_for_the_owner_only() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let cart_id = create_cart(&client, &srv, 9).await;
    assert_eq!(add_item(&client, &srv, 9, "mode=safe", 5, 2).await.status(), StatusCode::OK);

    let res = client
        .post(srv.url("/api/orders?user_id=10"))
        .json(&json!({ "cart_id": cart_id }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = client
        .post(srv.url("/api/orders?user_id=9&mode=batch"))
        .json(&json!({ "cart_id": cart_id, "address": "1 Main St", "payment_method": "card" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["order"]["status"], "pending");
    assert_eq!(body["order"]["total"], 1200);
    assert_eq!(body["mode"], "batch");
    let order_id = body["order"]["id"].as_str().unwrap().to_string();

    let product: Value = client.get(srv.url("/api/products/5")).send().await.unwrap().json().await.unwrap();
    assert_eq!(product["stock"], 4);

    let orders: Value = client.get(srv.url("/api/orders?user_id=9")).send().await.unwrap().json().await.unwrap();
    assert_eq!(orders["data"].as_array().unwrap().len(), 1);

    let res = client.get(srv.url(&format!("/api/orders/{order_id}?user_id=9"))).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let res = client.get(srv.url(&format!("/api/orders/{order_id}?user_id=10"))).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let stats: Value = client.get(srv.url("/api/orders/stats")).send().await.unwrap().json().await.unwrap();
    assert_eq!(stats["stats"]["total_orders"], 1);
}

#[tokio::test]
async fn empty_cart_checkout_is_a_bad_request() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let cart_id = create_cart(&client, &srv, 11).await;

    let res = client
        .post(srv.url("/api/orders?user_id=11"))
        .json(&json!({ "cart_id": cart_id }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "empty_cart");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn flash_sale_never_oversells() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .put(srv.url("/api/products/1/stock"))
        .json(&json!({ "stock": 10 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let change: Value = res.json().await.unwrap();
    assert_eq!(change["new_stock"], 10);

    let attempts = (0..15u64).map(|user| {
        let client = client.clone();
        let url = srv.url("/api/flash-sale/1/purchase?quantity=1");
        async move {
            client
                .post(url)
                .header("X-User-ID", (100 + user).to_string())
                .send()
                .await
                .unwrap()
                .status()
        }
    });
    let handles: Vec<_> = attempts.map(tokio::spawn).collect();

    let mut created = 0;
    let mut conflicts = 0;
    for handle in handles {
        match handle.await.unwrap() {
            StatusCode::CREATED => created += 1,
            StatusCode::CONFLICT => conflicts += 1,
            other => panic!("unexpected status {other}"),
        }
    }
    assert_eq!((created, conflicts), (10, 5));

    let stats: Value = client.get(srv.url("/api/orders/stats")).send().await.unwrap().json().await.unwrap();
    assert_eq!(stats["stats"]["total_orders"], 10);
    assert_eq!(stats["stats"]["failed_orders"], 5);

    let product: Value = client.get(srv.url("/api/products/1")).send().await.unwrap().json().await.unwrap();
    assert_eq!(product["stock"], 0);
}
