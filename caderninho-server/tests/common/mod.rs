//! Shared harness: in-memory database, bootstrap admin, router driven by `oneshot`

#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use caderninho_server::core::build_router;
use caderninho_server::db::DbService;
use caderninho_server::db::repository::user;
use caderninho_server::{Config, ServerState};
use http::{Method, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use shared::models::UserRole;
use tower::ServiceExt;

pub struct TestApp {
    pub state: ServerState,
    pub router: Router,
    pub admin_token: String,
    pub employee_token: String,
}

impl TestApp {
    pub async fn new() -> Self {
        let db = DbService::in_memory().await.expect("in-memory database");
        let state = ServerState::with_db(Config::for_tests(), db);
        state.bootstrap_admin().await.expect("bootstrap admin");

        let admin = user::find_by_username(&state.pool, "admin")
            .await
            .unwrap()
            .expect("admin exists");
        let employee = user::create(
            &state.pool,
            "joana",
            "not-a-real-hash",
            "Joana",
            UserRole::Employee,
        )
        .await
        .unwrap();

        let jwt = state.get_jwt_service();
        let admin_token = jwt
            .generate_token(admin.id, &admin.username, UserRole::Admin)
            .unwrap();
        let employee_token = jwt
            .generate_token(employee.id, &employee.username, UserRole::Employee)
            .unwrap();

        Self {
            router: build_router(state.clone()),
            state,
            admin_token,
            employee_token,
        }
    }

    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Method::GET, uri, Some(&self.employee_token), None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, Some(&self.employee_token), Some(body))
            .await
    }

    pub async fn put(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::PUT, uri, Some(&self.employee_token), Some(body))
            .await
    }

    pub async fn admin_delete(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Method::DELETE, uri, Some(&self.admin_token), None).await
    }

    pub async fn customer(&self, name: &str) -> i64 {
        let (status, body) = self.post("/api/customers", json!({ "name": name })).await;
        assert_eq!(status, StatusCode::OK, "{body}");
        body["id"].as_i64().unwrap()
    }

    pub async fn product(&self, name: &str, price: f64, stock: Option<i64>) -> i64 {
        let (status, body) = self
            .post(
                "/api/products",
                json!({ "name": name, "price": price, "stock_quantity": stock }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        body["id"].as_i64().unwrap()
    }

    pub async fn order(&self, customer_id: i64, items: &[(i64, i64)]) -> Value {
        let items: Vec<Value> = items
            .iter()
            .map(|(product_id, quantity)| json!({ "product_id": product_id, "quantity": quantity }))
            .collect();
        let (status, body) = self
            .post(
                "/api/orders",
                json!({ "customer_id": customer_id, "items": items }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        body
    }

    pub async fn debt_of(&self, customer_id: i64) -> f64 {
        let (status, body) = self.get(&format!("/api/customers/{customer_id}")).await;
        assert_eq!(status, StatusCode::OK, "{body}");
        body["debt"].as_f64().unwrap()
    }
}
