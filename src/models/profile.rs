// Copyright (c) CrowdPulse Team
// SPDX-License-Identifier: Apache-2.0

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::models::text_enum;
use crate::schema::profiles;

text_enum! {
    /// Platform role, used to route admin-facing notifications.
    ProfileRole {
        User => "USER",
        Admin => "ADMIN",
        SeniorAdmin => "SENIOR_ADMIN",
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = profiles)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Profile {
    pub id: i64,
    pub username: String,
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub is_private: bool,
    pub role: ProfileRole,
    // Denormalized social graph statistics, clamped at zero
    pub followers_count: i32,
    pub following_count: i32,
    pub posts_count: i32,
    pub suspended_until: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    /// Name shown in notification copy.
    pub fn visible_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.username)
    }

    pub fn is_admin(&self) -> bool {
        matches!(self.role, ProfileRole::Admin | ProfileRole::SeniorAdmin)
    }
}

#[derive(Debug, Clone, Insertable, Serialize, Deserialize)]
#[diesel(table_name = profiles)]
pub struct NewProfile {
    pub username: String,
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub is_private: bool,
    #[serde(default = "default_role")]
    pub role: ProfileRole,
}

fn default_role() -> ProfileRole {
    ProfileRole::User
}

/// Partial update: only the provided fields overwrite.
#[derive(Debug, Clone, Default, AsChangeset, Serialize, Deserialize)]
#[diesel(table_name = profiles)]
pub struct UpdateProfile {
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub is_private: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_text() {
        assert_eq!(ProfileRole::SeniorAdmin.as_str(), "SENIOR_ADMIN");
        assert_eq!(
            "SENIOR_ADMIN".parse::<ProfileRole>().unwrap(),
            ProfileRole::SeniorAdmin
        );
        assert!("OWNER".parse::<ProfileRole>().is_err());
    }
}
