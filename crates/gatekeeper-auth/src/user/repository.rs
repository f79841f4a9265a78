//! `SQLite`-backed user store.

use sqlx::Row;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions, SqliteRow};
use tracing::{debug, info};

use super::model::{CreateUserOverwriteOptions, LoginType, User, UserMeta};
use super::store::{StoreError, UserStore};

/// Repository for local accounts.
pub struct SqliteUserStore {
    pool: SqlitePool,
}

impl SqliteUserStore {
    /// Create a new store with the given database path.
    ///
    /// Creates the database and tables if they don't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database connection fails or schema creation fails.
    pub async fn new(database_path: &str) -> Result<Self, StoreError> {
        let url = format!("sqlite:{database_path}?mode=rwc");
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&url)
            .await?;

        let store = Self { pool };
        store.initialize().await?;
        Ok(store)
    }

    /// Create an in-memory store for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the database connection fails or schema creation fails.
    pub async fn in_memory() -> Result<Self, StoreError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;

        let store = Self { pool };
        store.initialize().await?;
        Ok(store)
    }

    /// Initialize database schema.
    async fn initialize(&self) -> Result<(), StoreError> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                lower_name TEXT NOT NULL UNIQUE,
                email TEXT NOT NULL COLLATE NOCASE UNIQUE,
                passwd TEXT NOT NULL,
                login_type INTEGER NOT NULL,
                login_source INTEGER NOT NULL DEFAULT 0,
                login_name TEXT NOT NULL DEFAULT '',
                is_active INTEGER NOT NULL DEFAULT 0,
                initial_ip TEXT,
                initial_user_agent TEXT,
                created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE INDEX IF NOT EXISTS idx_users_login
                ON users (login_type, login_source, login_name)
            ",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Find the account linked to an external login.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn get_by_login(
        &self,
        login_type: LoginType,
        login_source: i64,
        login_name: &str,
    ) -> Result<Option<User>, StoreError> {
        let row = sqlx::query(
            r"
            SELECT id, name, lower_name, email, login_type, login_source, login_name, is_active
            FROM users
            WHERE login_type = ? AND login_source = ? AND login_name = ?
            ",
        )
        .bind(login_type.as_i64())
        .bind(login_source)
        .bind(login_name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(row_to_user))
    }

    /// Find an account by name, ignoring case.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn get_by_name(&self, name: &str) -> Result<Option<User>, StoreError> {
        let row = sqlx::query(
            r"
            SELECT id, name, lower_name, email, login_type, login_source, login_name, is_active
            FROM users
            WHERE lower_name = ?
            ",
        )
        .bind(name.to_lowercase())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(row_to_user))
    }

    /// Count stored accounts.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn count(&self) -> Result<i64, StoreError> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get("n"))
    }
}

impl UserStore for SqliteUserStore {
    /// Inserts the account.
    ///
    /// Passwords are never written: accounts from external sources verify
    /// remotely, so the column holds an empty placeholder.
    async fn create_user(
        &self,
        user: &mut User,
        meta: &UserMeta,
        overwrite: &CreateUserOverwriteOptions,
    ) -> Result<(), StoreError> {
        if user.name.is_empty() || user.name.chars().any(char::is_whitespace) {
            return Err(StoreError::InvalidName(user.name.clone()));
        }

        if let Some(is_active) = overwrite.is_active {
            user.is_active = is_active;
        }
        user.lower_name = user.name.to_lowercase();

        let db_password_placeholder = "";
        let result = sqlx::query(
            r"
            INSERT INTO users (
                name, lower_name, email, passwd,
                login_type, login_source, login_name, is_active,
                initial_ip, initial_user_agent
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ",
        )
        .bind(&user.name)
        .bind(&user.lower_name)
        .bind(&user.email)
        .bind(db_password_placeholder)
        .bind(user.login_type.as_i64())
        .bind(user.login_source)
        .bind(&user.login_name)
        .bind(user.is_active)
        .bind(meta.initial_ip.as_deref())
        .bind(meta.initial_user_agent.as_deref())
        .execute(&self.pool)
        .await
        .map_err(|err| classify_insert_error(err, user))?;

        let id = result.last_insert_rowid();
        user.id = Some(id);
        info!(user_id = id, name = %user.name, "created local user");
        Ok(())
    }
}

fn classify_insert_error(err: sqlx::Error, user: &User) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err
        && db_err.is_unique_violation()
    {
        debug!(error = %db_err, "unique constraint rejected new user");
        if db_err.message().contains("users.email") {
            return StoreError::EmailTaken(user.email.clone());
        }
        return StoreError::NameTaken(user.name.clone());
    }
    StoreError::Database(err)
}

/// Convert a database row to a User.
fn row_to_user(row: &SqliteRow) -> User {
    User {
        id: Some(row.get("id")),
        name: row.get("name"),
        lower_name: row.get("lower_name"),
        email: row.get("email"),
        passwd: String::new(),
        login_type: LoginType::from_i64(row.get("login_type")),
        login_source: row.get("login_source"),
        login_name: row.get("login_name"),
        is_active: row.get("is_active"),
    }
}
