//! HTTP route definitions.
//!
//! ```text
//! GET    /health                    liveness + database ping
//! POST   /carts                     start a cart session
//! GET    /carts/{id}                cart view (consumes the status message)
//! DELETE /carts/{id}                drop a cart session
//! POST   /carts/{id}/items          add a line          → 303 cart view
//! PUT    /carts/{id}/items          set a line quantity → 303 cart view
//! POST   /carts/{id}/confirm        checkout            → 303 cart view
//! POST   /carts/{id}/cancel         leave checkout      → 303 /inventory
//! GET    /inventory                 stock listing
//! GET    /cart-items                persisted cart items (?userId=)
//! POST   /cart-items
//! GET    /cart-items/{id}
//! PUT    /cart-items/{id}
//! DELETE /cart-items/{id}
//! ```

pub mod cart;
pub mod cart_items;
pub mod inventory;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Router,
};

use crate::state::AppState;

/// All application routes, before state and middleware are attached.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/carts", post(cart::create))
        .route("/carts/{id}", get(cart::show).delete(cart::discard))
        .route("/carts/{id}/items", post(cart::add_item).put(cart::update_item))
        .route("/carts/{id}/confirm", post(cart::confirm))
        .route("/carts/{id}/cancel", post(cart::cancel))
        .route("/inventory", get(inventory::index))
        .route("/cart-items", get(cart_items::index).post(cart_items::create))
        .route(
            "/cart-items/{id}",
            get(cart_items::show)
                .put(cart_items::update)
                .delete(cart_items::delete),
        )
}

/// Reports `ok` while the database answers.
async fn health(State(state): State<AppState>) -> (StatusCode, &'static str) {
    if state.db().health_check().await {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "database unavailable")
    }
}

#[cfg(test)]
pub(crate) mod test_client {
    use axum::{
        body::{to_bytes, Body},
        http::{header, HeaderMap, Method, Request, StatusCode},
        Router,
    };
    use serde_json::Value;
    use tower::ServiceExt;

    pub struct TestResponse {
        pub status: StatusCode,
        pub headers: HeaderMap,
        pub body: Vec<u8>,
    }

    impl TestResponse {
        pub fn json(&self) -> Value {
            serde_json::from_slice(&self.body).unwrap()
        }

        pub fn location(&self) -> &str {
            self.headers
                .get(header::LOCATION)
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
        }
    }

    pub async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = app
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let headers = response.headers().clone();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap().to_vec();

        TestResponse {
            status,
            headers,
            body,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_client::send;
    use crate::build_router;
    use crate::state::test_support::state_with;
    use axum::http::{Method, StatusCode};
    use basket_core::CommitPolicy;

    #[tokio::test]
    async fn test_health() {
        let state = state_with(&[], CommitPolicy::PerItem).await;
        let app = build_router(state.clone());

        let response = send(&app, Method::GET, "/health", None).await;
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.body, b"ok");

        state.db().close().await;
        let response = send(&app, Method::GET, "/health", None).await;
        assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let app = build_router(state_with(&[], CommitPolicy::PerItem).await);

        let response = send(&app, Method::GET, "/nope", None).await;
        assert_eq!(response.status, StatusCode::NOT_FOUND);
    }
}
