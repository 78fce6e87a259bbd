use axum::body::Body;
use axum::http::Request;
use fila_core::FilaConfig;
use fila_web::{create_router, AppState};

pub async fn app() -> (axum::Router, AppState) {
    let pool = fila_db::init_memory_pool().await.expect("pool");
    let state = AppState::new(pool, &FilaConfig::default());
    (create_router(state.clone()), state)
}

pub async fn read_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json")
}

pub fn json_request(
    method: &str,
    uri: &str,
    tenant: Option<&str>,
    body: serde_json::Value,
) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(tenant) = tenant {
        builder = builder.header("x-tenant-id", tenant);
    }
    builder.body(Body::from(body.to_string())).expect("request")
}

pub fn get_request(uri: &str, tenant: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(tenant) = tenant {
        builder = builder.header("x-tenant-id", tenant);
    }
    builder.body(Body::empty()).expect("request")
}
