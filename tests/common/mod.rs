#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
};
use chrono::Duration;
use serde_json::Value;
use tower::ServiceExt;

use todo_gate::app::build_router;
use todo_gate::config::{AppEnv, Config};
use todo_gate::middleware::auth::RoutePolicy;
use todo_gate::repos::{InMemoryUserRepo, NewUser, UserRepo};
use todo_gate::services::audit::{AdminAudit, MemoryAuditSink};
use todo_gate::services::auth::password::hash_password;
use todo_gate::services::auth::{AccountService, Identity, SigningKey, TokenCodec, UserRole};
use todo_gate::services::users::UserService;
use todo_gate::state::AppState;

pub const PASSWORD: &str = "Aa123456";

pub struct TestApp {
    pub router: Router,
    pub codec: Arc<TokenCodec>,
    pub audit: Arc<MemoryAuditSink>,
    pub repo: Arc<InMemoryUserRepo>,
}

pub fn config() -> Config {
    Config {
        addr: "127.0.0.1:0".parse().unwrap(),
        app_env: AppEnv::Development,
        cors_allowed_origins: vec![],
        jwt_secret_key: None,
        access_token_ttl_seconds: 30 * 60,
        http_body_limit_bytes: 64 * 1024,
        http_timeout_seconds: 5,
    }
}

pub fn codec() -> Arc<TokenCodec> {
    let key = SigningKey::from_bytes(vec![7u8; 32]).unwrap();
    Arc::new(TokenCodec::new(&key, Duration::minutes(30)))
}

pub fn state(
    codec: Arc<TokenCodec>,
    repo: Arc<InMemoryUserRepo>,
    audit: Arc<MemoryAuditSink>,
) -> AppState {
    AppState::new(
        codec.clone(),
        RoutePolicy::default(),
        AccountService::new(repo.clone(), codec),
        UserService::new(repo),
        AdminAudit::new(audit),
    )
}

pub fn test_app() -> TestApp {
    let codec = codec();
    let repo = Arc::new(InMemoryUserRepo::new());
    let audit = Arc::new(MemoryAuditSink::new());

    let state = state(codec.clone(), repo.clone(), audit.clone());
    let router = build_router(state, &config()).unwrap();

    TestApp {
        router,
        codec,
        audit,
        repo,
    }
}

impl TestApp {
    pub fn bearer(&self, user_id: i64, email: &str, role: UserRole) -> String {
        let token = self
            .codec
            .issue(&Identity::new(user_id, email, role))
            .unwrap();
        format!("Bearer {token}")
    }

    pub async fn seed_user(&self, email: &str, role: UserRole) -> i64 {
        self.repo
            .insert(NewUser {
                email: email.to_string(),
                password_hash: hash_password(PASSWORD),
                role,
            })
            .await
            .unwrap()
            .id
    }

    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        auth: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(auth) = auth {
            builder = builder.header(header::AUTHORIZATION, auth);
        }
        let req = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let res = self.router.clone().oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }
}

pub fn error_code(body: &Value) -> &str {
    body["error"]["code"].as_str().unwrap_or_default()
}
