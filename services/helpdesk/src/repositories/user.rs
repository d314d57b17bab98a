//! User repository for database operations

use anyhow::Result;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};
use sqlx::{PgPool, Row, postgres::PgRow};
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::models::{NewUser, PublicUser, User};
use crate::policy::{AdminSeed, TICKET_ADMIN_ROLE};

/// Errors from user creation. The duplicate-username case is surfaced on
/// its own so the API can attach it to the `username` field.
#[derive(Error, Debug)]
pub enum CreateUserError {
    #[error("a user with that username already exists")]
    UsernameTaken,
    #[error(transparent)]
    Database(sqlx::Error),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<sqlx::Error> for CreateUserError {
    fn from(err: sqlx::Error) -> Self {
        // 23505 = unique_violation; the constraint backs up the pre-insert
        // username check against concurrent registrations.
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.code().as_deref() == Some("23505") {
                return CreateUserError::UsernameTaken;
            }
        }
        CreateUserError::Database(err)
    }
}

/// User repository
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

fn user_from_row(row: &PgRow) -> User {
    User {
        id: row.get("id"),
        username: row.get("username"),
        email: row.get("email"),
        password_hash: row.get("password_hash"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

impl UserRepository {
    /// Create a new user repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Register a new user.
    ///
    /// Inserts the user, its empty profile, and any seeded role grant in a
    /// single transaction, so a reader can never observe a user without a
    /// profile. The username is checked before the insert and the unique
    /// constraint catches the remaining race.
    pub async fn create(
        &self,
        new_user: &NewUser,
        admin_seed: &AdminSeed,
    ) -> Result<User, CreateUserError> {
        info!("Creating new user: {}", new_user.username);

        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE username = $1)")
            .bind(&new_user.username)
            .fetch_one(&self.pool)
            .await?;

        if exists {
            return Err(CreateUserError::UsernameTaken);
        }

        let salt = SaltString::generate(&mut rand::thread_rng());
        let argon2 = Argon2::default();
        let password_hash = argon2
            .hash_password(new_user.password.as_bytes(), &salt)
            .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?
            .to_string();

        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(
            r#"
            INSERT INTO users (username, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, username, email, password_hash, created_at, updated_at
            "#,
        )
        .bind(&new_user.username)
        .bind(new_user.email.as_deref().unwrap_or(""))
        .bind(&password_hash)
        .fetch_one(&mut *tx)
        .await?;

        let user = user_from_row(&row);

        sqlx::query("INSERT INTO profiles (user_id) VALUES ($1)")
            .bind(user.id)
            .execute(&mut *tx)
            .await?;

        if admin_seed.includes(&user.username) {
            sqlx::query(
                r#"
                INSERT INTO user_roles (user_id, role_id)
                SELECT $1, id FROM roles WHERE name = $2
                "#,
            )
            .bind(user.id)
            .bind(TICKET_ADMIN_ROLE)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(user)
    }

    /// Find a user by username
    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let row = sqlx::query(
            r#"
            SELECT id, username, email, password_hash, created_at, updated_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(user_from_row))
    }

    /// Find a user by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let row = sqlx::query(
            r#"
            SELECT id, username, email, password_hash, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(user_from_row))
    }

    /// Verify a user's password
    pub async fn verify_password(&self, user: &User, password: &str) -> Result<bool> {
        let parsed_hash = PasswordHash::new(&user.password_hash)
            .map_err(|e| anyhow::anyhow!("Failed to parse password hash: {}", e))?;

        let argon2 = Argon2::default();
        let result = argon2.verify_password(password.as_bytes(), &parsed_hash);

        Ok(result.is_ok())
    }

    /// List all users as their public projection. A missing profile must
    /// not break the listing, so profile fields fall back to empty strings.
    pub async fn list_public(&self) -> Result<Vec<PublicUser>> {
        let rows = sqlx::query(
            r#"
            SELECT u.id, u.username, u.email,
                   COALESCE(p.department, '') AS department,
                   COALESCE(p.access_level, '') AS access_level
            FROM users u
            LEFT JOIN profiles p ON p.user_id = u.id
            ORDER BY u.username
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let users = rows
            .into_iter()
            .map(|row| PublicUser {
                id: row.get("id"),
                username: row.get("username"),
                email: row.get("email"),
                department: row.get("department"),
                access_level: row.get("access_level"),
            })
            .collect();

        Ok(users)
    }
}
