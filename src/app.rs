/*
 * Responsibility
 * - Config読み込み → 依存生成 (signing key / codec / repo / services) → Router 組み立て
 * - Middleware の適用 (/api/v1 に認証, 全体に HTTP 共通 layer)
 * - axum::serve() で起動
 */
use std::{panic, process, sync::Arc};

use anyhow::Result;
use axum::Router;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api::v1::{self, BindingError};
use crate::config::Config;
use crate::middleware::{
    auth::{RoutePolicy, access},
    http,
};
use crate::repos::InMemoryUserRepo;
use crate::services::audit::{AdminAudit, TracingAuditSink};
use crate::services::auth::{AccountService, build_token_codec};
use crate::services::users::UserService;
use crate::state::AppState;

fn init_tracing() {
    // RUST_LOG=info,todo_gate=debug,admin_audit=info cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        tracing::error!(?info, "panic");

        // development: fail fast / production: default hook, keep serving
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env()?;
    init_panic_hook(!config.app_env.is_production());

    info!(
        "starting API in {:?} mode on {}",
        config.app_env, config.addr
    );

    let state = build_state(&config)?;
    let app = build_router(state, &config)?;

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

/// Process-level services, built once and shared through `AppState`.
pub fn build_state(config: &Config) -> Result<AppState> {
    let codec = build_token_codec(config)?;
    let repo = Arc::new(InMemoryUserRepo::new());

    Ok(AppState::new(
        codec.clone(),
        RoutePolicy::default(),
        AccountService::new(repo.clone(), codec),
        UserService::new(repo),
        AdminAudit::new(Arc::new(TracingAuditSink)),
    ))
}

/// Fails with `BindingError` before anything is served if a route declaration
/// is inconsistent.
pub fn build_router(state: AppState, config: &Config) -> Result<Router, BindingError> {
    let v1 = v1::router(&state)?;
    let v1 = access::apply(v1, state.clone());

    let router = Router::new().nest("/api/v1", v1).with_state(state);
    Ok(http::apply(router, config))
}
