/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 *   - token codec / route 分類 / account・user service / audit wrapper
 * - Clone 前提で持つ (内部は Arc/Clone cheap)
 */
use std::sync::Arc;

use crate::middleware::auth::RoutePolicy;
use crate::services::audit::AdminAudit;
use crate::services::auth::{AccountService, TokenCodec};
use crate::services::users::UserService;

#[derive(Clone)]
pub struct AppState {
    pub codec: Arc<TokenCodec>,
    pub routes: Arc<RoutePolicy>,
    pub accounts: AccountService,
    pub users: UserService,
    pub audit: AdminAudit,
}

impl AppState {
    pub fn new(
        codec: Arc<TokenCodec>,
        routes: RoutePolicy,
        accounts: AccountService,
        users: UserService,
        audit: AdminAudit,
    ) -> Self {
        Self {
            codec,
            routes: Arc::new(routes),
            accounts,
            users,
            audit,
        }
    }
}
