// Copyright (c) CrowdPulse Team
// SPDX-License-Identifier: Apache-2.0

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::models::text_enum;
use crate::schema::follows;

text_enum! {
    /// State of a directed follow edge. NONE is implicit (no row).
    FollowStatus {
        Active => "ACTIVE",
        Pending => "PENDING",
        Blocked => "BLOCKED",
        Muted => "MUTED",
    }
}

impl FollowStatus {
    /// Only ACTIVE edges contribute to follower/following counts.
    pub fn counts_as_following(&self) -> bool {
        matches!(self, FollowStatus::Active)
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = follows)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Follow {
    pub id: i64,
    pub follower_id: i64,
    pub following_id: i64,
    pub status: FollowStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = follows)]
pub struct NewFollow {
    pub follower_id: i64,
    pub following_id: i64,
    pub status: FollowStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_active_edges_count() {
        assert!(FollowStatus::Active.counts_as_following());
        assert!(!FollowStatus::Pending.counts_as_following());
        assert!(!FollowStatus::Blocked.counts_as_following());
        assert!(!FollowStatus::Muted.counts_as_following());
    }
}
