// Copyright (c) CrowdPulse Team
// SPDX-License-Identifier: Apache-2.0

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use crate::models::content_ref::ContentRef;
use crate::models::report::ReportAction;

/// Notification intent recorded in the outbox by the engines.
///
/// An event names the action that happened and who was involved; the
/// dispatcher resolves it into zero or more delivered notifications (actor
/// names, fan-out to donors or admins, self-action suppression). Events are
/// serialized into the outbox as tagged JSON, so variants may gain fields
/// but must never be renamed while old entries can still be pending.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NotificationEvent {
    FollowRequested {
        follower_id: i64,
        target_id: i64,
    },
    FollowerAdded {
        follower_id: i64,
        target_id: i64,
    },
    FollowAccepted {
        approver_id: i64,
        requester_id: i64,
    },
    ContentLiked {
        actor_id: i64,
        owner_id: i64,
        content: ContentRef,
    },
    CommentAdded {
        actor_id: i64,
        recipient_id: i64,
        content: ContentRef,
        comment_id: i64,
        is_reply: bool,
    },
    DonationReceived {
        donor_id: i64,
        creator_id: i64,
        campaign_id: i64,
        amount: BigDecimal,
        currency: String,
        anonymous: bool,
    },
    DonationRefunded {
        donor_id: i64,
        campaign_id: i64,
        amount: BigDecimal,
        currency: String,
        reason: String,
    },
    GoalReached {
        creator_id: i64,
        campaign_id: i64,
    },
    CampaignApproved {
        creator_id: i64,
        campaign_id: i64,
    },
    CampaignRejected {
        creator_id: i64,
        campaign_id: i64,
        reason: String,
    },
    /// Fans out to every distinct settled donor of the campaign.
    CampaignUpdatePosted {
        campaign_id: i64,
        author_id: i64,
        update_id: i64,
        title: String,
        milestone: bool,
    },
    WithdrawalApproved {
        requester_id: i64,
        withdrawal_id: i64,
        campaign_id: i64,
    },
    WithdrawalRejected {
        requester_id: i64,
        withdrawal_id: i64,
        campaign_id: i64,
        reason: String,
    },
    WithdrawalCompleted {
        requester_id: i64,
        withdrawal_id: i64,
        campaign_id: i64,
    },
    WithdrawalFailed {
        requester_id: i64,
        withdrawal_id: i64,
        campaign_id: i64,
        reason: String,
    },
    BankAccountVerified {
        owner_id: i64,
        masked_account: String,
    },
    /// Fans out to every ADMIN profile.
    ReportSubmitted {
        report_id: i64,
    },
    /// Fans out to every SENIOR_ADMIN profile.
    ReportEscalated {
        report_id: i64,
    },
    ReportResolved {
        reporter_id: i64,
        report_id: i64,
        action: ReportAction,
    },
    ReportDismissed {
        reporter_id: i64,
        report_id: i64,
    },
    AccountWarning {
        recipient_id: i64,
        reason: String,
    },
    AccountSuspended {
        recipient_id: i64,
        days: i64,
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_round_trip_through_tagged_json() {
        let event = NotificationEvent::ContentLiked {
            actor_id: 3,
            owner_id: 7,
            content: ContentRef::Reel(21),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["kind"], "content_liked");
        assert_eq!(json["content"]["type"], "REEL");
        let back: NotificationEvent = serde_json::from_value(json).unwrap();
        assert_eq!(back, event);
    }

    #[test]
    fn donation_amounts_survive_serialization() {
        let event = NotificationEvent::DonationReceived {
            donor_id: 1,
            creator_id: 2,
            campaign_id: 3,
            amount: "25.50".parse::<BigDecimal>().unwrap(),
            currency: "USD".into(),
            anonymous: false,
        };
        let json = serde_json::to_string(&event).unwrap();
        let back: NotificationEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }
}
