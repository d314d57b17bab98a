//! Profile repository for database operations

use anyhow::Result;
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use crate::models::{Profile, ProfilePatch};

/// Profile repository
#[derive(Clone)]
pub struct ProfileRepository {
    pool: PgPool,
}

fn profile_from_row(row: &PgRow) -> Profile {
    Profile {
        id: row.get("id"),
        user_id: row.get("user_id"),
        contact: row.get("contact"),
        department: row.get("department"),
        real_name: row.get("real_name"),
        access_level: row.get("access_level"),
        project_access_level: row.get("project_access_level"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

impl ProfileRepository {
    /// Create a new profile repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find the profile owned by a user. Callers must not assume the row
    /// exists even though registration always creates it.
    pub async fn find_by_user(&self, user_id: Uuid) -> Result<Option<Profile>> {
        let row = sqlx::query(
            r#"
            SELECT id, user_id, contact, department, real_name,
                   access_level, project_access_level, created_at, updated_at
            FROM profiles
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(profile_from_row))
    }

    /// Partially update the profile owned by a user. Absent patch fields
    /// keep their stored values; `user_id` and `id` never change.
    pub async fn update(&self, user_id: Uuid, patch: &ProfilePatch) -> Result<Option<Profile>> {
        let row = sqlx::query(
            r#"
            UPDATE profiles
            SET contact = COALESCE($2, contact),
                department = COALESCE($3, department),
                real_name = COALESCE($4, real_name),
                access_level = COALESCE($5, access_level),
                project_access_level = COALESCE($6, project_access_level),
                updated_at = now()
            WHERE user_id = $1
            RETURNING id, user_id, contact, department, real_name,
                      access_level, project_access_level, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(patch.contact.as_deref())
        .bind(patch.department.as_deref())
        .bind(patch.real_name.as_deref())
        .bind(patch.access_level.as_deref())
        .bind(patch.project_access_level.as_deref())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(profile_from_row))
    }
}
