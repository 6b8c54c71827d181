//! PostgreSQL credential store

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::FromRow;
use tracing::info;
use uuid::Uuid;

use crate::config::StoreConfig;
use crate::error::{DbError, DbResult};
use crate::models::{Gender, NewUser, Role, UserRecord, UserUpdate};
use crate::UserStore;

const USER_COLUMNS: &str = "id, email, password_hash, first_name, last_name, \
     gender, birth_date, enabled, roles, created_at, updated_at";

/// PostgreSQL-backed user store
pub struct PgUserStore {
    pool: PgPool,
}

/// Raw row shape; gender and role names are decoded into their closed enums
/// before leaving this module.
#[derive(FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    password_hash: String,
    first_name: String,
    last_name: String,
    gender: String,
    birth_date: NaiveDate,
    enabled: bool,
    roles: Vec<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for UserRecord {
    type Error = DbError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let gender = row.gender.parse::<Gender>().map_err(DbError::Decode)?;
        let roles = row
            .roles
            .iter()
            .map(|name| name.parse::<Role>().map_err(DbError::Decode))
            .collect::<Result<_, _>>()?;

        Ok(UserRecord {
            id: row.id,
            email: row.email,
            password_hash: row.password_hash,
            first_name: row.first_name,
            last_name: row.last_name,
            gender,
            birth_date: row.birth_date,
            enabled: row.enabled,
            roles,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl PgUserStore {
    /// Connect to PostgreSQL
    pub async fn connect(config: &StoreConfig) -> DbResult<Self> {
        info!("Connecting to PostgreSQL: {}", config.postgres_url_masked());

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(std::time::Duration::from_secs(config.acquire_timeout_secs))
            .connect(&config.postgres_url)
            .await
            .map_err(|e| DbError::Connection(format!("PostgreSQL: {}", e)))?;

        info!("Connected to PostgreSQL");
        Ok(Self { pool })
    }

    /// Run schema migrations
    pub async fn migrate(&self) -> DbResult<()> {
        info!("Running database migrations...");
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| DbError::Migration(e.to_string()))?;
        info!("Migrations complete");
        Ok(())
    }

    fn role_names(roles: &std::collections::HashSet<Role>) -> Vec<String> {
        let mut names: Vec<String> = roles.iter().map(|r| r.as_str().to_string()).collect();
        names.sort();
        names
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_email(&self, email: &str) -> DbResult<Option<UserRecord>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE email = $1",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        row.map(UserRecord::try_from).transpose()
    }

    async fn find_by_id(&self, id: Uuid) -> DbResult<Option<UserRecord>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE id = $1",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(UserRecord::try_from).transpose()
    }

    async fn exists_by_email(&self, email: &str) -> DbResult<bool> {
        let exists: (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
                .bind(email)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists.0)
    }

    async fn create(&self, user: NewUser) -> DbResult<UserRecord> {
        for role in &user.roles {
            self.ensure_role(*role).await?;
        }

        let row = sqlx::query_as::<_, UserRow>(&format!(
            "INSERT INTO users \
                 (email, password_hash, first_name, last_name, gender, birth_date, enabled, roles) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {}",
            USER_COLUMNS
        ))
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(user.gender.as_str())
        .bind(user.birth_date)
        .bind(user.enabled)
        .bind(Self::role_names(&user.roles))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e {
                if db_err.constraint() == Some("users_email_key") {
                    return DbError::Duplicate(format!(
                        "User with email {} already exists",
                        user.email
                    ));
                }
            }
            DbError::Query(e)
        })?;

        row.try_into()
    }

    async fn list(&self) -> DbResult<Vec<UserRecord>> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users ORDER BY created_at",
            USER_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(UserRecord::try_from).collect()
    }

    async fn update(&self, id: Uuid, update: UserUpdate) -> DbResult<UserRecord> {
        for role in &update.roles {
            self.ensure_role(*role).await?;
        }

        let row = sqlx::query_as::<_, UserRow>(&format!(
            "UPDATE users SET \
                 email = $2, first_name = $3, last_name = $4, gender = $5, \
                 birth_date = $6, enabled = $7, roles = $8, updated_at = now() \
             WHERE id = $1 \
             RETURNING {}",
            USER_COLUMNS
        ))
        .bind(id)
        .bind(&update.email)
        .bind(&update.first_name)
        .bind(&update.last_name)
        .bind(update.gender.as_str())
        .bind(update.birth_date)
        .bind(update.enabled)
        .bind(Self::role_names(&update.roles))
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::NotFound(format!("User with id {} not found", id)))?;

        row.try_into()
    }

    async fn delete(&self, id: Uuid) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound(format!("User with id {} not found", id)));
        }
        Ok(())
    }

    async fn ensure_role(&self, role: Role) -> DbResult<()> {
        sqlx::query("INSERT INTO roles (name) VALUES ($1) ON CONFLICT (name) DO NOTHING")
            .bind(role.as_str())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn ping(&self) -> DbResult<()> {
        sqlx::query("SELECT 1").fetch_one(&self.pool).await?;
        Ok(())
    }
}
