//! Profile model and related payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Profile entity, exactly one per user
#[derive(Debug, Clone, FromRow)]
pub struct Profile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub contact: String,
    pub department: String,
    pub real_name: String,
    pub access_level: String,
    pub project_access_level: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Profile view returned to the owning user
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub id: Uuid,
    pub user: Uuid,
    pub contact: String,
    pub department: String,
    pub real_name: String,
    pub access_level: String,
    pub project_access_level: String,
}

impl From<Profile> for ProfileResponse {
    fn from(profile: Profile) -> Self {
        ProfileResponse {
            id: profile.id,
            user: profile.user_id,
            contact: profile.contact,
            department: profile.department,
            real_name: profile.real_name,
            access_level: profile.access_level,
            project_access_level: profile.project_access_level,
        }
    }
}

/// Partial profile update. `user` and `id` are immutable; unknown keys in
/// the request body are dropped during deserialization.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfilePatch {
    pub contact: Option<String>,
    pub department: Option<String>,
    pub real_name: Option<String>,
    pub access_level: Option<String>,
    pub project_access_level: Option<String>,
}

impl ProfilePatch {
    /// True when no updatable field is present
    pub fn is_empty(&self) -> bool {
        self.contact.is_none()
            && self.department.is_none()
            && self.real_name.is_none()
            && self.access_level.is_none()
            && self.project_access_level.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patch_ignores_user_and_id() {
        let patch: ProfilePatch = serde_json::from_str(
            r#"{"department": "Sales", "user": "11111111-1111-1111-1111-111111111111", "id": 7}"#,
        )
        .unwrap();

        assert_eq!(patch.department.as_deref(), Some("Sales"));
        assert!(patch.contact.is_none());
        assert!(!patch.is_empty());
    }

    #[test]
    fn test_empty_patch() {
        let patch: ProfilePatch = serde_json::from_str("{}").unwrap();
        assert!(patch.is_empty());
    }
}
