/*
 * Responsibility
 * - Handler から見える「リクエスト単位の認証コンテキスト」の型
 * - middleware が検証して request extensions に格納し、handler はこの型だけを受け取る
 *
 * Notes
 * - token の検証ロジックは middleware/services 側の責務
 * - リクエストごとに生成され、他のリクエストと共有されない
 */
use crate::services::auth::identity::Identity;

/// Per-request container for the verified identity.
///
/// - public routes carry an anonymous context (no identity)
/// - protected / admin routes always carry the identity the middleware verified
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    identity: Option<Identity>,
}

impl RequestContext {
    pub fn anonymous() -> Self {
        Self { identity: None }
    }

    pub fn authenticated(identity: Identity) -> Self {
        Self {
            identity: Some(identity),
        }
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }
}
