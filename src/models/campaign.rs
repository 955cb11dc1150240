// Copyright (c) CrowdPulse Team
// SPDX-License-Identifier: Apache-2.0

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::models::text_enum;
use crate::schema::campaigns;

text_enum! {
    /// Campaign lifecycle state.
    CampaignStatus {
        Draft => "DRAFT",
        UnderReview => "UNDER_REVIEW",
        Active => "ACTIVE",
        Paused => "PAUSED",
        Completed => "COMPLETED",
        Cancelled => "CANCELLED",
    }
}

impl CampaignStatus {
    /// Whether the state machine permits moving to `target`.
    pub fn can_transition_to(&self, target: CampaignStatus) -> bool {
        use CampaignStatus::*;
        matches!(
            (self, target),
            (Draft, UnderReview)
                | (UnderReview, Active)
                | (UnderReview, Cancelled)
                | (Active, Paused)
                | (Paused, Active)
                | (Active, Completed)
                | (Active, Cancelled)
        )
    }

    pub fn valid_transitions(&self) -> Vec<CampaignStatus> {
        use CampaignStatus::*;
        [Draft, UnderReview, Active, Paused, Completed, Cancelled]
            .into_iter()
            .filter(|t| self.can_transition_to(*t))
            .collect()
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = campaigns)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Campaign {
    pub id: i64,
    pub creator_id: i64,
    pub title: String,
    pub description: String,
    pub goal_amount: BigDecimal,
    pub current_amount: BigDecimal,
    pub currency: String,
    pub donor_count: i32,
    pub updates_count: i32,
    pub milestones_count: i32,
    pub status: CampaignStatus,
    pub is_verified: bool,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: DateTime<Utc>,
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Campaign {
    pub fn goal_reached(&self) -> bool {
        self.current_amount >= self.goal_amount
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = campaigns)]
pub struct NewCampaign {
    pub creator_id: i64,
    pub title: String,
    pub description: String,
    pub goal_amount: BigDecimal,
    pub currency: String,
    pub status: CampaignStatus,
    pub end_date: DateTime<Utc>,
}

/// Status/verification changes applied by the ledger. Progress arithmetic goes
/// through the store's atomic operations instead.
#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = campaigns)]
pub struct CampaignChanges {
    pub status: Option<CampaignStatus>,
    pub is_verified: Option<bool>,
    pub start_date: Option<DateTime<Utc>>,
    pub rejection_reason: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifecycle_transitions_follow_the_state_machine() {
        use CampaignStatus::*;
        assert!(Draft.can_transition_to(UnderReview));
        assert!(UnderReview.can_transition_to(Active));
        assert!(UnderReview.can_transition_to(Cancelled));
        assert!(Active.can_transition_to(Paused));
        assert!(Paused.can_transition_to(Active));
        assert!(Active.can_transition_to(Completed));

        assert!(!Draft.can_transition_to(Active));
        assert!(!Completed.can_transition_to(Active));
        assert!(!Cancelled.can_transition_to(UnderReview));
        assert!(!Paused.can_transition_to(Completed));
    }

    #[test]
    fn terminal_states_have_no_exits() {
        assert!(CampaignStatus::Completed.valid_transitions().is_empty());
        assert!(CampaignStatus::Cancelled.valid_transitions().is_empty());
    }
}
