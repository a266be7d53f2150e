//! # Credit Ledger Backend
//!
//! Backend of a savings and credit association: people register and receive
//! a consumer code, request credit and make payments; administrators decide
//! credit, confirm payments and register monthly fees.
//!
//! ## Architecture
//!
//! ```text
//! IO Layer (REST API, handlers, mappers)
//!     ↓
//! Domain Layer (services, business rules)
//!     ↓
//! Storage Layer (JSON record store)
//! ```
//!
//! The store handle is created once by [`initialize_backend`] and injected
//! into every service; there is no global state.

pub mod config;
pub mod domain;
pub mod io;
pub mod storage;

use anyhow::Result;
use axum::{http::Method, Router};
use log::info;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::config::Config;
use crate::domain::{CreditService, MemberService, NotificationService, PaymentService, SettingsService};
use crate::storage::JsonConnection;

/// Main application state that holds all services
#[derive(Clone)]
pub struct AppState {
    pub member_service: MemberService<JsonConnection>,
    pub credit_service: CreditService<JsonConnection>,
    pub payment_service: PaymentService<JsonConnection>,
    pub notification_service: NotificationService<JsonConnection>,
    pub settings_service: SettingsService<JsonConnection>,
    /// Direct store access for the maintenance endpoint
    pub connection: JsonConnection,
    pub backup_dir: PathBuf,
}

impl AppState {
    /// Wire every service onto one store handle.
    pub fn new(connection: JsonConnection, backup_dir: PathBuf) -> Self {
        let shared_connection = Arc::new(connection.clone());

        let member_service = MemberService::new(shared_connection.clone());
        let settings_service = SettingsService::new(shared_connection.clone(), member_service.clone());
        let notification_service = NotificationService::new(shared_connection.clone(), member_service.clone());
        let credit_service = CreditService::new(
            shared_connection.clone(),
            member_service.clone(),
            settings_service.clone(),
            notification_service.clone(),
        );
        let payment_service = PaymentService::new(
            shared_connection,
            member_service.clone(),
            credit_service.clone(),
            notification_service.clone(),
        );

        Self {
            member_service,
            credit_service,
            payment_service,
            notification_service,
            settings_service,
            connection,
            backup_dir,
        }
    }
}

/// Initialize the backend with all required services
pub async fn initialize_backend(config: &Config) -> Result<AppState> {
    info!("Opening store {}", config.store_path.display());
    let connection = JsonConnection::open(&config.store_path, &config.admin_password).await?;

    info!("Setting up application state");
    Ok(AppState::new(connection, config.backup_dir.clone()))
}

/// Create the Axum router with all routes configured
pub fn create_router(app_state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any);

    let api_routes = Router::new()
        .nest("/auth", io::auth_apis::router())
        .nest("/members", io::member_apis::router())
        .nest("/credits", io::credit_apis::router())
        .nest("/admin", io::credit_apis::admin_router())
        .nest("/payments", io::payment_apis::router())
        .nest("/notifications", io::notification_apis::router())
        .nest("/settings", io::settings_apis::router())
        .nest("/debug", io::debug_apis::router());

    Router::new()
        .nest("/api", api_routes)
        .layer(cors)
        .with_state(app_state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::member::SEEDED_ADMIN_CODE;
    use crate::storage::json::test_utils::{TestEnvironment, TEST_ADMIN_PASSWORD};
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::util::ServiceExt;

    async fn setup_test() -> (TestEnvironment, Router) {
        let env = TestEnvironment::new().await.expect("Failed to create test store");
        let state = AppState::new(env.connection.clone(), env.base_path.join("backups"));
        (env, create_router(state))
    }

    async fn send(router: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn admin_id(router: &Router) -> String {
        let (status, body) = send(
            router,
            "POST",
            "/api/auth/admin-login",
            Some(json!({"consumer_code": SEEDED_ADMIN_CODE, "password": TEST_ADMIN_PASSWORD})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        body["member"]["id"].as_str().unwrap().to_string()
    }

    async fn register(router: &Router, name: &str) -> Value {
        let (status, body) = send(
            router,
            "POST",
            "/api/auth/register",
            Some(json!({"name": name, "password": "secret123"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        body["member"].clone()
    }

    #[tokio::test]
    async fn test_register_and_login() {
        let (_env, router) = setup_test().await;
        let member = register(&router, "Joana Matos").await;
        let code = member["consumer_code"].as_str().unwrap();
        assert!(code.starts_with("PPD"));
        assert!(member.get("password_hash").is_none());

        let (status, body) = send(
            &router,
            "POST",
            "/api/auth/login",
            Some(json!({"consumer_code": code, "password": "secret123"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["is_admin"], json!(false));

        let lookup = format!("/api/members/lookup?consumer_code={}", code.to_lowercase());
        let (status, body) = send(&router, "GET", &lookup, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], member["id"]);

        let (status, _) = send(&router, "GET", "/api/members/lookup?consumer_code=PPDNOPE", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = send(
            &router,
            "POST",
            "/api/auth/login",
            Some(json!({"consumer_code": code, "password": "wrong-password"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body["error"].is_string());

        let (status, _) = send(
            &router,
            "POST",
            "/api/auth/admin-login",
            Some(json!({"consumer_code": code, "password": "secret123"})),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_malformed_requests_are_bad_requests() {
        let (_env, router) = setup_test().await;

        let (status, body) = send(&router, "POST", "/api/auth/register", Some(json!({"name": "No Password"}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());

        let (status, body) = send(
            &router,
            "POST",
            "/api/auth/register",
            Some(json!({"name": "Al", "password": "secret123"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("Name"));

        let (status, _) = send(&router, "GET", "/api/credits", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(&router, "GET", "/api/payments/monthly", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_credit_workflow_over_http() {
        let (_env, router) = setup_test().await;
        let admin_id = admin_id(&router).await;
        let member = register(&router, "Joana Matos").await;
        let member_id = member["id"].as_str().unwrap().to_string();

        let (status, body) = send(
            &router,
            "POST",
            &format!("/api/members/{}/membership", member_id),
            Some(json!({"admin_id": admin_id, "is_member": true})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["member"]["is_member"], json!(true));

        let (status, body) = send(
            &router,
            "POST",
            "/api/credits",
            Some(json!({"member_id": member_id, "amount": 1000.0})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["credit"]["status"], json!("requested"));
        assert_eq!(body["credit"]["total"], json!(1150.0));
        let credit_id = body["credit"]["id"].as_str().unwrap().to_string();

        let decision = json!({"credit_id": credit_id, "admin_id": member_id, "approved": true});
        let (status, _) = send(&router, "POST", "/api/credits/approve", Some(decision)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let decision = json!({"credit_id": credit_id, "admin_id": admin_id, "approved": true});
        let (status, body) = send(&router, "POST", "/api/credits/approve", Some(decision.clone())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["credit"]["status"], json!("approved"));

        let (status, _) = send(&router, "POST", "/api/credits/approve", Some(decision)).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, body) = send(
            &router,
            "POST",
            "/api/payments/monthly",
            Some(json!({"member_id": member_id, "amount": 1150.0, "admin_id": admin_id})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["previous_debt"], json!(1150.0));
        assert_eq!(body["new_balance"], json!(0.0));

        let (status, body) = send(&router, "GET", &format!("/api/credits/{}", credit_id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], json!("paid"));

        let (status, body) = send(
            &router,
            "GET",
            &format!("/api/notifications?member_id={}", member_id),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(!body["notifications"].as_array().unwrap().is_empty());

        let (status, _) = send(&router, "GET", "/api/credits/credit::missing", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_settings_and_debug_endpoints() {
        let (env, router) = setup_test().await;
        let admin_id = admin_id(&router).await;

        let (status, body) = send(&router, "GET", "/api/settings", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["settings"].as_array().unwrap().len(), 4);

        let (status, body) = send(
            &router,
            "PUT",
            "/api/settings/interest_rate_members",
            Some(json!({"admin_id": admin_id, "value": "0.12"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["setting"]["value"], json!("0.12"));

        let (status, body) = send(&router, "POST", "/api/debug", Some(json!({"action": "stats"}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["stats"]["total_members"], json!(1));

        let (status, body) = send(&router, "POST", "/api/debug", Some(json!({"action": "backup"}))).await;
        assert_eq!(status, StatusCode::OK);
        let backup_path = body["backup_path"].as_str().unwrap();
        assert!(backup_path.starts_with(env.base_path.join("backups").to_str().unwrap()));

        let (status, _) = send(&router, "POST", "/api/debug", Some(json!({"action": "reset"}))).await;
        assert_eq!(status, StatusCode::OK);
        let (_, body) = send(&router, "GET", "/api/settings", None).await;
        assert_eq!(body["settings"][0]["value"], json!("0.15"));
    }
}
