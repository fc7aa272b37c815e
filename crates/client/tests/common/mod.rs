//! In-process mock of the catalog service for client integration tests.

use std::sync::{Arc, Mutex};

use almirah_core::product::{Category, Product};
use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;

/// One multipart field as received by the mock.
#[derive(Debug, Clone)]
pub struct ReceivedField {
    pub name: String,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

#[derive(Default)]
pub struct MockState {
    pub products: Mutex<Vec<Product>>,
    pub next_id: Mutex<i64>,
    /// When set, `GET /products` answers with this status.
    pub list_status: Mutex<Option<StatusCode>>,
    /// When set, `GET /products` answers 200 with this raw body.
    pub list_body: Mutex<Option<String>>,
    /// When set, `POST /products` answers with this status and body.
    pub create_failure: Mutex<Option<(StatusCode, String)>>,
    /// When set, `DELETE /products/{id}` answers with this status.
    pub delete_status: Mutex<Option<StatusCode>>,
    pub received: Mutex<Vec<Vec<ReceivedField>>>,
    pub last_query: Mutex<Option<String>>,
}

impl MockState {
    pub fn with_products(products: Vec<Product>) -> Arc<Self> {
        let next = products.iter().map(|p| p.id).max().unwrap_or(0) + 1;
        Arc::new(Self {
            products: Mutex::new(products),
            next_id: Mutex::new(next),
            ..Default::default()
        })
    }
}

pub fn product(id: i64, name: &str) -> Product {
    Product {
        id,
        name: name.to_string(),
        description: None,
        price: 20.0,
        discount_price: None,
        image_url: format!("/static/images/{id}.png"),
        category: Category::Men,
        brand: "Almirah".to_string(),
        rating: 0.0,
    }
}

/// Serve the mock on an ephemeral port and return its base URL.
pub async fn spawn(state: Arc<MockState>) -> String {
    let app = Router::new()
        .route("/products", get(list).post(create))
        .route("/products/{id}", axum::routing::delete(delete_one))
        .route("/static/images/{file}", get(image))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

#[derive(Deserialize)]
struct ListQuery {
    category: Option<String>,
}

async fn list(State(state): State<Arc<MockState>>, Query(query): Query<ListQuery>) -> Response {
    if let Some(status) = *state.list_status.lock().unwrap() {
        return status.into_response();
    }
    if let Some(body) = state.list_body.lock().unwrap().clone() {
        return ([("content-type", "application/json")], body).into_response();
    }
    *state.last_query.lock().unwrap() = query.category.clone();
    let products: Vec<Product> = state
        .products
        .lock()
        .unwrap()
        .iter()
        .filter(|p| query.category.as_deref().map_or(true, |c| p.category.as_str() == c))
        .cloned()
        .collect();
    Json(products).into_response()
}

async fn create(State(state): State<Arc<MockState>>, mut multipart: Multipart) -> Response {
    let mut fields = Vec::new();
    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let data = field.bytes().await.unwrap().to_vec();
        fields.push(ReceivedField {
            name,
            file_name,
            content_type,
            data,
        });
    }
    state.received.lock().unwrap().push(fields.clone());

    if let Some((status, body)) = state.create_failure.lock().unwrap().clone() {
        return (status, body).into_response();
    }

    let text = |key: &str| {
        fields
            .iter()
            .find(|f| f.name == key)
            .map(|f| String::from_utf8_lossy(&f.data).into_owned())
    };

    let id = {
        let mut next = state.next_id.lock().unwrap();
        let id = *next;
        *next += 1;
        id
    };
    let created = Product {
        id,
        name: text("name").unwrap_or_default(),
        description: text("description"),
        price: text("price").and_then(|p| p.parse().ok()).unwrap_or_default(),
        discount_price: text("discount_price").and_then(|p| p.parse().ok()),
        image_url: format!("/static/images/{id}.png"),
        category: Category::from(text("category").unwrap_or_default()),
        brand: text("brand").unwrap_or_default(),
        rating: 0.0,
    };
    state.products.lock().unwrap().push(created.clone());
    (StatusCode::CREATED, Json(created)).into_response()
}

async fn delete_one(State(state): State<Arc<MockState>>, Path(id): Path<i64>) -> Response {
    if let Some(status) = *state.delete_status.lock().unwrap() {
        return status.into_response();
    }
    let mut products = state.products.lock().unwrap();
    let before = products.len();
    products.retain(|p| p.id != id);
    if products.len() == before {
        return (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({ "detail": "Product not found" })),
        )
            .into_response();
    }
    Json(serde_json::json!({ "message": "Product deleted successfully" })).into_response()
}

async fn image(Path(file): Path<String>) -> Response {
    if file.starts_with("missing") {
        return StatusCode::NOT_FOUND.into_response();
    }
    ([("content-type", "image/png")], vec![0u8; 4]).into_response()
}
