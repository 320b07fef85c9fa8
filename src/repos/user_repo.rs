/*
 * Responsibility
 * - user record の lookup / 保存 (signup/signin と admin 操作が使う)
 * - 永続化方式はこの trait の裏に閉じ込める (今は in-memory 実装のみ)
 */
use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::repos::error::RepoError;
use crate::services::auth::identity::{Identity, UserRole};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub id: i64,
    pub email: String,
    pub password_hash: String,
    pub role: UserRole,
}

impl UserRecord {
    pub fn identity(&self) -> Identity {
        Identity::new(self.id, self.email.clone(), self.role)
    }
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub role: UserRole,
}

#[async_trait]
pub trait UserRepo: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, RepoError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<UserRecord>, RepoError>;

    /// Fails with `RepoError::Conflict` when the email is already taken.
    async fn insert(&self, user: NewUser) -> Result<UserRecord, RepoError>;

    /// Returns `None` when no such user exists.
    async fn update_password(
        &self,
        id: i64,
        password_hash: String,
    ) -> Result<Option<UserRecord>, RepoError>;

    async fn update_role(&self, id: i64, role: UserRole) -> Result<Option<UserRecord>, RepoError>;

    async fn delete(&self, id: i64) -> Result<bool, RepoError>;
}

#[derive(Debug, Default)]
struct Table {
    next_id: i64,
    rows: HashMap<i64, UserRecord>,
}

#[derive(Debug, Default)]
pub struct InMemoryUserRepo {
    table: RwLock<Table>,
}

impl InMemoryUserRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepo for InMemoryUserRepo {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, RepoError> {
        let table = self.table.read().await;
        Ok(table.rows.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<UserRecord>, RepoError> {
        Ok(self.table.read().await.rows.get(&id).cloned())
    }

    async fn insert(&self, user: NewUser) -> Result<UserRecord, RepoError> {
        let mut table = self.table.write().await;
        if table.rows.values().any(|u| u.email == user.email) {
            return Err(RepoError::Conflict("email already registered"));
        }

        table.next_id += 1;
        let row = UserRecord {
            id: table.next_id,
            email: user.email,
            password_hash: user.password_hash,
            role: user.role,
        };
        table.rows.insert(row.id, row.clone());
        Ok(row)
    }

    async fn update_password(
        &self,
        id: i64,
        password_hash: String,
    ) -> Result<Option<UserRecord>, RepoError> {
        let mut table = self.table.write().await;
        Ok(table.rows.get_mut(&id).map(|row| {
            row.password_hash = password_hash;
            row.clone()
        }))
    }

    async fn update_role(&self, id: i64, role: UserRole) -> Result<Option<UserRecord>, RepoError> {
        let mut table = self.table.write().await;
        Ok(table.rows.get_mut(&id).map(|row| {
            row.role = role;
            row.clone()
        }))
    }

    async fn delete(&self, id: i64) -> Result<bool, RepoError> {
        Ok(self.table.write().await.rows.remove(&id).is_some())
    }
}
