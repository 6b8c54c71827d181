//! Storekeeper Credential Store
//!
//! Persistence for principals (users) and their role assignments. The auth
//! core reads principals through the [`UserStore`] trait; mutation happens
//! only through explicit user-management operations.
//!
//! Two implementations are provided:
//!
//! - [`PgUserStore`]: PostgreSQL-backed store for production
//! - [`MemoryUserStore`]: in-process store for tests and development

pub mod config;
pub mod error;
pub mod memory;
pub mod models;
pub mod postgres;

pub use config::StoreConfig;
pub use error::{DbError, DbResult};
pub use memory::MemoryUserStore;
pub use models::{Gender, NewUser, Role, UserRecord, UserUpdate};
pub use postgres::PgUserStore;

use async_trait::async_trait;
use uuid::Uuid;

/// Lookup and mutation interface for principals.
///
/// Lookups may block on I/O (PostgreSQL); callers treat them as cancellable
/// external calls. Credential verification itself never goes through here.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Find a principal by its unique identifier (email).
    async fn find_by_email(&self, email: &str) -> DbResult<Option<UserRecord>>;

    /// Find a principal by id.
    async fn find_by_id(&self, id: Uuid) -> DbResult<Option<UserRecord>>;

    /// Whether a principal with the given email exists.
    async fn exists_by_email(&self, email: &str) -> DbResult<bool>;

    /// Create a new principal. Fails with [`DbError::Duplicate`] when the
    /// email is already taken.
    async fn create(&self, user: NewUser) -> DbResult<UserRecord>;

    /// List all principals.
    async fn list(&self) -> DbResult<Vec<UserRecord>>;

    /// Replace profile data, role set and enabled flag of an existing
    /// principal. Fails with [`DbError::NotFound`] for an unknown id.
    async fn update(&self, id: Uuid, update: UserUpdate) -> DbResult<UserRecord>;

    /// Delete a principal. Fails with [`DbError::NotFound`] for an unknown id.
    async fn delete(&self, id: Uuid) -> DbResult<()>;

    /// Register a role in the role set, creating it on first use.
    /// Role names are unique; registering an existing role is a no-op.
    async fn ensure_role(&self, role: Role) -> DbResult<()>;

    /// Readiness probe against the underlying storage.
    async fn ping(&self) -> DbResult<()>;
}
