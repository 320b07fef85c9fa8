/*
 * Responsibility
 * - v1 の URL 構造を定義 (path は /api/v1 からの相対)
 * - 全 route を RouteRegistry 経由で登録し、identity 注入 / audit の宣言を handler の引数と起動時に照合する
 * - 認証の適用範囲 (Public / Protected / AdminOnly) は RoutePolicy が path で決める
 */
use axum::Router;

use crate::api::v1::{
    handlers::{admin, auth, health, users},
    registry::{BindingError, RouteDecl, RouteRegistry},
};
use crate::state::AppState;

pub fn router(state: &AppState) -> Result<Router<AppState>, BindingError> {
    let registry = RouteRegistry::new(state.routes.clone(), state.audit.clone())
        .register(RouteDecl::get("/health"), health::health)?
        // auth (Public)
        .register(RouteDecl::post("/auth/signup"), auth::signup)?
        .register(RouteDecl::post("/auth/signin"), auth::signin)?
        // users (Protected)
        .register(RouteDecl::get("/users/me").inject_identity(), users::me)?
        .register(RouteDecl::get("/users/{user_id}"), users::get_user)?
        .register(
            RouteDecl::put("/users").inject_identity(),
            users::change_password,
        )?
        // admin (AdminOnly, audited)
        .register(
            RouteDecl::patch("/admin/users/{user_id}/role")
                .inject_identity()
                .audited(),
            admin::change_role,
        )?
        .register(
            RouteDecl::delete("/admin/users/{user_id}")
                .inject_identity()
                .audited(),
            admin::delete_user,
        )?;

    Ok(registry.into_router())
}
