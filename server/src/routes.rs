use std::{sync::Arc, time::Instant};

use axum::{
    extract::Request,
    http::{header, HeaderMap},
    middleware::{self, Next},
    response::Response,
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use tokio::sync::Mutex;

use crate::resource::{self, Items, Lists, Resource};
use crate::store::Store;

/// Shared state handed to every handler
///
/// The store is the only shared mutable resource; a request holds the lock
/// for the statements it runs.
#[derive(Clone)]
pub struct AppState {
    store: Arc<Mutex<Store>>,
}

impl AppState {
    pub fn new(store: Store) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
        }
    }

    pub fn store(&self) -> &Mutex<Store> {
        &self.store
    }
}

/// The whole HTTP API, rooted at `/api/`
pub fn app(store: Store) -> Router {
    Router::new()
        .route("/api/", get(api_root))
        .merge(resource_routes::<Lists>())
        .merge(resource_routes::<Items>())
        .layer(middleware::from_fn(log_request))
        .with_state(AppState::new(store))
}

fn resource_routes<R: Resource>() -> Router<AppState> {
    Router::new()
        .route(
            &format!("/api/{}/", R::PREFIX),
            get(resource::list_all::<R>)
                .post(resource::create::<R>)
                .fallback(resource::method_not_allowed),
        )
        .route(
            &format!("/api/{}/{{id}}/", R::PREFIX),
            get(resource::retrieve::<R>)
                .put(resource::update::<R>)
                .patch(resource::partial_update::<R>)
                .delete(resource::destroy::<R>)
                .fallback(resource::method_not_allowed),
        )
}

/// Links to each collection, absolute when the request names its host
async fn api_root(headers: HeaderMap) -> Json<Value> {
    let base = headers
        .get(header::HOST)
        .and_then(|host| host.to_str().ok())
        .map(|host| format!("http://{}", host))
        .unwrap_or_default();

    Json(json!({
        (Lists::PREFIX): format!("{}/api/{}/", base, Lists::PREFIX),
        (Items::PREFIX): format!("{}/api/{}/", base, Items::PREFIX),
    }))
}

async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    let started = Instant::now();

    let response = next.run(request).await;

    tracing::info!(
        %method,
        %path,
        status = response.status().as_u16(),
        latency_us = started.elapsed().as_micros() as u64,
        "handled request"
    );
    response
}
