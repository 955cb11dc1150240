// Copyright (c) CrowdPulse Team
// SPDX-License-Identifier: Apache-2.0

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::models::content_ref::TargetKind;
use crate::models::text_enum;
use crate::schema::{notification_outbox, notifications};

text_enum! {
    /// What the notification is about; drives the message template.
    NotificationType {
        LikePost => "LIKE_POST",
        LikeReel => "LIKE_REEL",
        LikeCampaign => "LIKE_CAMPAIGN",
        CommentPost => "COMMENT_POST",
        CommentReel => "COMMENT_REEL",
        CommentCampaign => "COMMENT_CAMPAIGN",
        CommentReply => "COMMENT_REPLY",
        Follow => "FOLLOW",
        FollowRequest => "FOLLOW_REQUEST",
        FollowAccepted => "FOLLOW_ACCEPTED",
        DonationReceived => "DONATION_RECEIVED",
        DonationRefunded => "DONATION_REFUNDED",
        CampaignGoalReached => "CAMPAIGN_GOAL_REACHED",
        CampaignApproved => "CAMPAIGN_APPROVED",
        CampaignRejected => "CAMPAIGN_REJECTED",
        CampaignUpdate => "CAMPAIGN_UPDATE",
        CampaignMilestone => "CAMPAIGN_MILESTONE",
        WithdrawalApproved => "WITHDRAWAL_APPROVED",
        WithdrawalRejected => "WITHDRAWAL_REJECTED",
        WithdrawalCompleted => "WITHDRAWAL_COMPLETED",
        WithdrawalFailed => "WITHDRAWAL_FAILED",
        BankAccountVerified => "BANK_ACCOUNT_VERIFIED",
        AccountWarning => "ACCOUNT_WARNING",
        AccountSuspended => "ACCOUNT_SUSPENDED",
        AdminActionRequired => "ADMIN_ACTION_REQUIRED",
        ReportResolved => "REPORT_RESOLVED",
        ReportDismissed => "REPORT_DISMISSED",
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = notifications)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Notification {
    pub id: i64,
    pub recipient_id: i64,
    pub actor_id: Option<i64>,
    pub notification_type: NotificationType,
    pub message: String,
    pub target_type: Option<TargetKind>,
    pub target_id: Option<i64>,
    pub campaign_id: Option<i64>,
    pub action_url: Option<String>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
    pub read_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = notifications)]
pub struct NewNotification {
    pub recipient_id: i64,
    pub actor_id: Option<i64>,
    pub notification_type: NotificationType,
    pub message: String,
    pub target_type: Option<TargetKind>,
    pub target_id: Option<i64>,
    pub campaign_id: Option<i64>,
    pub action_url: Option<String>,
}

text_enum! {
    /// Outbox entry status: pending until dispatched, failed once retries
    /// are exhausted (or the payload is undeliverable).
    OutboxStatus {
        Pending => "PENDING",
        Dispatched => "DISPATCHED",
        Failed => "FAILED",
    }
}

/// Notification intent appended by engines and drained by the dispatcher
/// worker. The event payload is the serialized `NotificationEvent`.
#[derive(Debug, Clone, Queryable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = notification_outbox)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OutboxEntry {
    pub id: i64,
    pub event: serde_json::Value,
    pub status: OutboxStatus,
    pub attempts: i32,
    pub last_error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub dispatched_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = notification_outbox)]
pub struct NewOutboxEntry {
    pub event: serde_json::Value,
    pub status: OutboxStatus,
}
