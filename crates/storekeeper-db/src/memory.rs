//! In-memory credential store
//!
//! Backs tests and development runs without a PostgreSQL instance. Same
//! uniqueness and not-found semantics as the PostgreSQL store.

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::models::{NewUser, Role, UserRecord, UserUpdate};
use crate::UserStore;

/// In-process user store keyed by id
#[derive(Default)]
pub struct MemoryUserStore {
    users: DashMap<Uuid, UserRecord>,
    roles: DashMap<Role, ()>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn id_for_email(&self, email: &str) -> Option<Uuid> {
        self.users
            .iter()
            .find(|entry| entry.value().email == email)
            .map(|entry| *entry.key())
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_email(&self, email: &str) -> DbResult<Option<UserRecord>> {
        Ok(self
            .id_for_email(email)
            .and_then(|id| self.users.get(&id).map(|u| u.clone())))
    }

    async fn find_by_id(&self, id: Uuid) -> DbResult<Option<UserRecord>> {
        Ok(self.users.get(&id).map(|u| u.clone()))
    }

    async fn exists_by_email(&self, email: &str) -> DbResult<bool> {
        Ok(self.id_for_email(email).is_some())
    }

    async fn create(&self, user: NewUser) -> DbResult<UserRecord> {
        if self.id_for_email(&user.email).is_some() {
            return Err(DbError::Duplicate(format!(
                "User with email {} already exists",
                user.email
            )));
        }

        for role in &user.roles {
            self.roles.insert(*role, ());
        }

        let now = Utc::now();
        let record = UserRecord {
            id: Uuid::new_v4(),
            email: user.email,
            password_hash: user.password_hash,
            first_name: user.first_name,
            last_name: user.last_name,
            gender: user.gender,
            birth_date: user.birth_date,
            enabled: user.enabled,
            roles: user.roles,
            created_at: now,
            updated_at: now,
        };
        self.users.insert(record.id, record.clone());
        Ok(record)
    }

    async fn list(&self) -> DbResult<Vec<UserRecord>> {
        let mut users: Vec<UserRecord> = self.users.iter().map(|e| e.value().clone()).collect();
        users.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(users)
    }

    async fn update(&self, id: Uuid, update: UserUpdate) -> DbResult<UserRecord> {
        let mut entry = self
            .users
            .get_mut(&id)
            .ok_or_else(|| DbError::NotFound(format!("User with id {} not found", id)))?;

        for role in &update.roles {
            self.roles.insert(*role, ());
        }

        let user = entry.value_mut();
        user.email = update.email;
        user.first_name = update.first_name;
        user.last_name = update.last_name;
        user.gender = update.gender;
        user.birth_date = update.birth_date;
        user.enabled = update.enabled;
        user.roles = update.roles;
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    async fn delete(&self, id: Uuid) -> DbResult<()> {
        self.users
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| DbError::NotFound(format!("User with id {} not found", id)))
    }

    async fn ensure_role(&self, role: Role) -> DbResult<()> {
        self.roles.insert(role, ());
        Ok(())
    }

    async fn ping(&self) -> DbResult<()> {
        Ok(())
    }
}
