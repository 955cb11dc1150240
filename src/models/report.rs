// Copyright (c) CrowdPulse Team
// SPDX-License-Identifier: Apache-2.0

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::models::content_ref::{ReportTarget, TargetKind};
use crate::models::text_enum;
use crate::schema::reports;

text_enum! {
    /// Moderation report lifecycle.
    ReportStatus {
        Pending => "PENDING",
        UnderReview => "UNDER_REVIEW",
        Resolved => "RESOLVED",
        Dismissed => "DISMISSED",
        Escalated => "ESCALATED",
    }
}

impl ReportStatus {
    /// Resolved, dismissed and escalated reports accept no further decisions.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ReportStatus::Resolved | ReportStatus::Dismissed | ReportStatus::Escalated
        )
    }
}

text_enum! {
    /// Why the content was reported.
    ReportReason {
        Spam => "SPAM",
        Harassment => "HARASSMENT",
        HateSpeech => "HATE_SPEECH",
        Violence => "VIOLENCE",
        NudityOrSexualContent => "NUDITY_OR_SEXUAL_CONTENT",
        SelfHarm => "SELF_HARM",
        Misinformation => "MISINFORMATION",
        ScamOrFraud => "SCAM_OR_FRAUD",
        IntellectualPropertyViolation => "INTELLECTUAL_PROPERTY_VIOLATION",
        InappropriateContent => "INAPPROPRIATE_CONTENT",
        FakeCampaign => "FAKE_CAMPAIGN",
        MisuseOfFunds => "MISUSE_OF_FUNDS",
        Other => "OTHER",
    }
}

text_enum! {
    /// Action taken when a report is resolved.
    ReportAction {
        ContentRemoved => "CONTENT_REMOVED",
        WarningIssued => "WARNING_ISSUED",
        AccountSuspended => "ACCOUNT_SUSPENDED",
        NoAction => "NO_ACTION",
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = reports)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Report {
    pub id: i64,
    pub reporter_id: i64,
    pub target_type: TargetKind,
    pub target_id: i64,
    pub reason: ReportReason,
    pub details: Option<String>,
    pub status: ReportStatus,
    pub resolved_by: Option<i64>,
    pub action_taken: Option<ReportAction>,
    pub resolution_note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub resolved_at: Option<DateTime<Utc>>,
}

impl Report {
    pub fn target(&self) -> ReportTarget {
        ReportTarget::from_kind(self.target_type, self.target_id)
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = reports)]
pub struct NewReport {
    pub reporter_id: i64,
    pub target_type: TargetKind,
    pub target_id: i64,
    pub reason: ReportReason,
    pub details: Option<String>,
    pub status: ReportStatus,
}

#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = reports)]
pub struct ReportChanges {
    pub status: Option<ReportStatus>,
    pub resolved_by: Option<i64>,
    pub action_taken: Option<ReportAction>,
    pub resolution_note: Option<String>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub resolved_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_states_are_terminal() {
        assert!(ReportStatus::Resolved.is_terminal());
        assert!(ReportStatus::Dismissed.is_terminal());
        assert!(ReportStatus::Escalated.is_terminal());
        assert!(!ReportStatus::Pending.is_terminal());
        assert!(!ReportStatus::UnderReview.is_terminal());
    }

    #[test]
    fn reasons_round_trip_through_text() {
        assert_eq!(
            "MISUSE_OF_FUNDS".parse::<ReportReason>().unwrap(),
            ReportReason::MisuseOfFunds
        );
        assert_eq!(ReportReason::HateSpeech.as_str(), "HATE_SPEECH");
    }
}
