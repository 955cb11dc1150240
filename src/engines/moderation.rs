// Copyright (c) CrowdPulse Team
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{info, warn};

use crate::config::ModerationConfig;
use crate::error::{ServiceError, ServiceResult};
use crate::models::campaign::{CampaignChanges, CampaignStatus};
use crate::models::content_ref::{ContentRef, ReportTarget};
use crate::models::profile::Profile;
use crate::models::report::{
    NewReport, Report, ReportAction, ReportChanges, ReportReason, ReportStatus,
};
use crate::notifications::event::NotificationEvent;
use crate::stores::{CampaignStore, ContentStore, IdentityStore, NotificationStore, ReportStore};

/// Report intake and resolution.
///
/// Resolution actions are delegated to the component that owns the target:
/// posts, reels and comments go back to the content store, campaigns to the
/// campaign store, suspensions to the identity store. The engine never
/// reimplements a removal, it only routes the decision.
pub struct ModerationEngine {
    identity: Arc<dyn IdentityStore>,
    content: Arc<dyn ContentStore>,
    campaigns: Arc<dyn CampaignStore>,
    reports: Arc<dyn ReportStore>,
    outbox: Arc<dyn NotificationStore>,
    config: ModerationConfig,
}

impl ModerationEngine {
    pub fn new(
        identity: Arc<dyn IdentityStore>,
        content: Arc<dyn ContentStore>,
        campaigns: Arc<dyn CampaignStore>,
        reports: Arc<dyn ReportStore>,
        outbox: Arc<dyn NotificationStore>,
        config: ModerationConfig,
    ) -> Self {
        Self {
            identity,
            content,
            campaigns,
            reports,
            outbox,
            config,
        }
    }

    /// Files a report. One report per reporter per target, regardless of the
    /// reason given the second time around.
    pub async fn submit_report(
        &self,
        reporter_id: i64,
        target: ReportTarget,
        reason: ReportReason,
        details: Option<String>,
    ) -> ServiceResult<Report> {
        self.require_profile(reporter_id).await?;
        self.target_owner(&target).await?;
        if self
            .reports
            .find_by_reporter_and_target(reporter_id, &target)
            .await?
            .is_some()
        {
            return Err(ServiceError::already_exists(
                "target already reported by this user",
            ));
        }

        let report = self
            .reports
            .create_report(NewReport {
                reporter_id,
                target_type: target.kind(),
                target_id: target.id(),
                reason,
                details,
                status: ReportStatus::Pending,
            })
            .await?;
        self.enqueue(NotificationEvent::ReportSubmitted {
            report_id: report.id,
        })
        .await;
        Ok(report)
    }

    pub async fn get_report(&self, id: i64) -> ServiceResult<Report> {
        self.require_report(id).await
    }

    pub async fn list_by_status(
        &self,
        status: ReportStatus,
        limit: i64,
        offset: i64,
    ) -> ServiceResult<Vec<Report>> {
        self.reports.list_by_status(status, limit, offset).await
    }

    /// Claims a pending report for review. Optional: a report can be
    /// resolved, dismissed or escalated straight from PENDING.
    pub async fn begin_review(&self, admin_id: i64, report_id: i64) -> ServiceResult<Report> {
        self.require_admin(admin_id).await?;
        let report = self.require_report(report_id).await?;
        if report.status != ReportStatus::Pending {
            return Err(ServiceError::invalid_state("report is not pending"));
        }
        self.reports
            .update_report(
                report_id,
                ReportChanges {
                    status: Some(ReportStatus::UnderReview),
                    reviewed_at: Some(Utc::now()),
                    ..Default::default()
                },
            )
            .await
    }

    /// Resolves a report by executing `action` against the target, then
    /// closing the report. The action runs first: if it fails, the report
    /// stays open for another attempt.
    pub async fn resolve(
        &self,
        admin_id: i64,
        report_id: i64,
        action: ReportAction,
        note: Option<String>,
    ) -> ServiceResult<Report> {
        self.require_admin(admin_id).await?;
        let report = self.require_report(report_id).await?;
        if report.status.is_terminal() {
            return Err(ServiceError::invalid_state("report is already closed"));
        }

        self.apply_action(&report, action, note.as_deref()).await?;

        let resolved = self
            .reports
            .update_report(
                report_id,
                ReportChanges {
                    status: Some(ReportStatus::Resolved),
                    resolved_by: Some(admin_id),
                    action_taken: Some(action),
                    resolution_note: note,
                    resolved_at: Some(Utc::now()),
                    ..Default::default()
                },
            )
            .await?;
        info!(
            report_id,
            action = action.as_str(),
            resolved_by = admin_id,
            "report resolved"
        );
        self.enqueue(NotificationEvent::ReportResolved {
            reporter_id: report.reporter_id,
            report_id,
            action,
        })
        .await;
        Ok(resolved)
    }

    pub async fn dismiss(&self, admin_id: i64, report_id: i64) -> ServiceResult<Report> {
        self.require_admin(admin_id).await?;
        let report = self.require_report(report_id).await?;
        if report.status.is_terminal() {
            return Err(ServiceError::invalid_state("report is already closed"));
        }
        let dismissed = self
            .reports
            .update_report(
                report_id,
                ReportChanges {
                    status: Some(ReportStatus::Dismissed),
                    resolved_by: Some(admin_id),
                    resolved_at: Some(Utc::now()),
                    ..Default::default()
                },
            )
            .await?;
        self.enqueue(NotificationEvent::ReportDismissed {
            reporter_id: report.reporter_id,
            report_id,
        })
        .await;
        Ok(dismissed)
    }

    /// Hands the report to the senior admin tier. The dispatcher routes the
    /// escalation notification by role.
    pub async fn escalate(&self, admin_id: i64, report_id: i64) -> ServiceResult<Report> {
        self.require_admin(admin_id).await?;
        let report = self.require_report(report_id).await?;
        if report.status.is_terminal() {
            return Err(ServiceError::invalid_state("report is already closed"));
        }
        let escalated = self
            .reports
            .update_report(
                report_id,
                ReportChanges {
                    status: Some(ReportStatus::Escalated),
                    ..Default::default()
                },
            )
            .await?;
        self.enqueue(NotificationEvent::ReportEscalated { report_id }).await;
        Ok(escalated)
    }

    async fn apply_action(
        &self,
        report: &Report,
        action: ReportAction,
        note: Option<&str>,
    ) -> ServiceResult<()> {
        match action {
            ReportAction::NoAction => Ok(()),
            ReportAction::ContentRemoved => self.remove_target(report, note).await,
            ReportAction::WarningIssued => {
                let owner_id = self.target_owner(&report.target()).await?;
                self.enqueue(NotificationEvent::AccountWarning {
                    recipient_id: owner_id,
                    reason: self.sanction_reason(report, note),
                })
                .await;
                Ok(())
            }
            ReportAction::AccountSuspended => {
                let owner_id = self.target_owner(&report.target()).await?;
                let days = self.config.suspension_days;
                self.identity
                    .suspend(owner_id, Utc::now() + Duration::days(days))
                    .await?;
                self.enqueue(NotificationEvent::AccountSuspended {
                    recipient_id: owner_id,
                    days,
                    reason: self.sanction_reason(report, note),
                })
                .await;
                Ok(())
            }
        }
    }

    /// Removal is dispatched to whichever store owns the target kind.
    async fn remove_target(&self, report: &Report, note: Option<&str>) -> ServiceResult<()> {
        match report.target() {
            ReportTarget::Post(id) => {
                let post = self
                    .content
                    .get_post(id)
                    .await?
                    .ok_or_else(|| ServiceError::not_found(format!("post {}", id)))?;
                self.content.remove_post(id).await?;
                self.identity.adjust_posts_count(post.author_id, -1).await?;
                Ok(())
            }
            ReportTarget::Reel(id) => {
                let removed = self.content.remove_reel(id).await?;
                if !removed {
                    return Err(ServiceError::not_found(format!("reel {}", id)));
                }
                Ok(())
            }
            ReportTarget::Comment(id) => {
                let comment = self
                    .content
                    .get_comment(id)
                    .await?
                    .ok_or_else(|| ServiceError::not_found(format!("comment {}", id)))?;
                if comment.is_deleted {
                    return Err(ServiceError::invalid_state("comment is already deleted"));
                }
                self.content.soft_delete_comment(id).await?;
                match comment.target {
                    ContentRef::Post(post_id) => {
                        self.content.adjust_post_comment_count(post_id, -1).await?
                    }
                    ContentRef::Reel(reel_id) => {
                        self.content.adjust_reel_comment_count(reel_id, -1).await?
                    }
                    ContentRef::Campaign(_) => {}
                }
                if let Some(parent_id) = comment.parent_comment_id {
                    if let Err(e) = self.content.adjust_comment_reply_count(parent_id, -1).await {
                        warn!(parent_id, "failed to drop reply count: {}", e);
                    }
                }
                Ok(())
            }
            ReportTarget::Campaign(id) => {
                self.require_campaign(id).await?;
                self.campaigns
                    .update_campaign(
                        id,
                        CampaignChanges {
                            status: Some(CampaignStatus::Cancelled),
                            rejection_reason: note.map(str::to_string),
                            ..Default::default()
                        },
                    )
                    .await?;
                Ok(())
            }
            ReportTarget::Profile(_) => Err(ServiceError::invalid_argument(
                "a profile cannot be removed, suspend the account instead",
            )),
        }
    }

    /// Resolves who owns the reported target, proving it exists.
    async fn target_owner(&self, target: &ReportTarget) -> ServiceResult<i64> {
        match *target {
            ReportTarget::Post(id) => Ok(self
                .content
                .get_post(id)
                .await?
                .ok_or_else(|| ServiceError::not_found(format!("post {}", id)))?
                .author_id),
            ReportTarget::Reel(id) => Ok(self
                .content
                .get_reel(id)
                .await?
                .ok_or_else(|| ServiceError::not_found(format!("reel {}", id)))?
                .author_id),
            ReportTarget::Comment(id) => Ok(self
                .content
                .get_comment(id)
                .await?
                .ok_or_else(|| ServiceError::not_found(format!("comment {}", id)))?
                .author_id),
            ReportTarget::Campaign(id) => Ok(self.require_campaign(id).await?),
            ReportTarget::Profile(id) => {
                self.require_profile(id).await?;
                Ok(id)
            }
        }
    }

    fn sanction_reason(&self, report: &Report, note: Option<&str>) -> String {
        note.map(str::to_string)
            .unwrap_or_else(|| report.reason.as_str().to_string())
    }

    async fn require_campaign(&self, id: i64) -> ServiceResult<i64> {
        Ok(self
            .campaigns
            .get_campaign(id)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("campaign {}", id)))?
            .creator_id)
    }

    async fn require_report(&self, id: i64) -> ServiceResult<Report> {
        self.reports
            .get_report(id)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("report {}", id)))
    }

    async fn require_profile(&self, id: i64) -> ServiceResult<()> {
        self.identity
            .get_profile(id)
            .await?
            .map(|_| ())
            .ok_or_else(|| ServiceError::not_found(format!("profile {}", id)))
    }

    async fn require_admin(&self, id: i64) -> ServiceResult<Profile> {
        let profile = self
            .identity
            .get_profile(id)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("profile {}", id)))?;
        if !profile.is_admin() {
            return Err(ServiceError::unauthorized("admin role required"));
        }
        Ok(profile)
    }

    async fn enqueue(&self, event: NotificationEvent) {
        if let Err(e) = self.outbox.enqueue(&event).await {
            warn!("failed to enqueue notification event: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::content::NewComment;
    use crate::testutil::TestApp;

    #[tokio::test]
    async fn duplicate_reports_by_the_same_reporter_are_rejected() {
        let app = TestApp::new();
        let ada = app.profile("ada").await;
        let grace = app.profile("grace").await;
        let henry = app.profile("henry").await;
        let post = app.post(ada).await;

        app.moderation
            .submit_report(grace, ReportTarget::Post(post.id), ReportReason::Spam, None)
            .await
            .unwrap();

        // A different reason does not make it a different report.
        let err = app
            .moderation
            .submit_report(
                grace,
                ReportTarget::Post(post.id),
                ReportReason::Harassment,
                None,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::AlreadyExists(_)));

        // Another reporter may still flag the same target.
        app.moderation
            .submit_report(henry, ReportTarget::Post(post.id), ReportReason::Spam, None)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn reports_require_an_existing_target() {
        let app = TestApp::new();
        let grace = app.profile("grace").await;
        let err = app
            .moderation
            .submit_report(grace, ReportTarget::Post(999), ReportReason::Spam, None)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));

        let err = app
            .moderation
            .submit_report(grace, ReportTarget::Profile(999), ReportReason::Spam, None)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn submission_notifies_the_admin_tier() {
        let app = TestApp::new();
        let ada = app.profile("ada").await;
        let grace = app.profile("grace").await;
        let admin = app.admin("root").await;
        let post = app.post(ada).await;

        let report = app
            .moderation
            .submit_report(grace, ReportTarget::Post(post.id), ReportReason::Spam, None)
            .await
            .unwrap();
        assert_eq!(report.status, ReportStatus::Pending);

        app.drain().await;
        let inbox = app.inbox(admin).await;
        assert_eq!(inbox[0].message, "New report requires review");
        assert_eq!(
            inbox[0].action_url.as_deref(),
            Some(format!("/admin/reports/{}", report.id).as_str())
        );
    }

    #[tokio::test]
    async fn review_claims_are_admin_only_and_pending_only() {
        let app = TestApp::new();
        let ada = app.profile("ada").await;
        let grace = app.profile("grace").await;
        let admin = app.admin("root").await;
        let post = app.post(ada).await;
        let report = app
            .moderation
            .submit_report(grace, ReportTarget::Post(post.id), ReportReason::Spam, None)
            .await
            .unwrap();

        let err = app.moderation.begin_review(grace, report.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::Unauthorized(_)));

        let claimed = app.moderation.begin_review(admin, report.id).await.unwrap();
        assert_eq!(claimed.status, ReportStatus::UnderReview);
        assert!(claimed.reviewed_at.is_some());

        let err = app.moderation.begin_review(admin, report.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidState(_)));
    }

    #[tokio::test]
    async fn resolution_closes_the_report_and_notifies_the_reporter() {
        let app = TestApp::new();
        let ada = app.profile("ada").await;
        let grace = app.profile("grace").await;
        let admin = app.admin("root").await;
        let post = app.post(ada).await;
        let report = app
            .moderation
            .submit_report(grace, ReportTarget::Post(post.id), ReportReason::Spam, None)
            .await
            .unwrap();

        let resolved = app
            .moderation
            .resolve(admin, report.id, ReportAction::NoAction, None)
            .await
            .unwrap();
        assert_eq!(resolved.status, ReportStatus::Resolved);
        assert_eq!(resolved.resolved_by, Some(admin));
        assert_eq!(resolved.action_taken, Some(ReportAction::NoAction));
        assert!(resolved.resolved_at.is_some());

        app.drain().await;
        let inbox = app.inbox(grace).await;
        assert_eq!(
            inbox[0].message,
            "Your report has been resolved. Action taken: NO_ACTION"
        );

        let err = app
            .moderation
            .resolve(admin, report.id, ReportAction::NoAction, None)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidState(_)));
    }

    #[tokio::test]
    async fn content_removal_routes_posts_to_the_content_store() {
        let app = TestApp::new();
        let ada = app.profile("ada").await;
        let grace = app.profile("grace").await;
        let admin = app.admin("root").await;
        let post = app.post(ada).await;
        assert_eq!(app.posts_count(ada).await, 1);

        let report = app
            .moderation
            .submit_report(grace, ReportTarget::Post(post.id), ReportReason::Spam, None)
            .await
            .unwrap();
        app.moderation
            .resolve(admin, report.id, ReportAction::ContentRemoved, None)
            .await
            .unwrap();

        assert!(app.content.get_post(post.id).await.unwrap().is_none());
        assert_eq!(app.posts_count(ada).await, 0);
    }

    #[tokio::test]
    async fn content_removal_soft_deletes_comments_and_cancels_campaigns() {
        let app = TestApp::new();
        let ada = app.profile("ada").await;
        let grace = app.profile("grace").await;
        let admin = app.admin("root").await;

        let reel = app.reel(ada).await;
        let comment = app
            .engagement
            .create_comment(NewComment {
                author_id: grace,
                target: ContentRef::Reel(reel.id),
                parent_comment_id: None,
                body: "rude".into(),
            })
            .await
            .unwrap();
        let report = app
            .moderation
            .submit_report(
                ada,
                ReportTarget::Comment(comment.id),
                ReportReason::Harassment,
                None,
            )
            .await
            .unwrap();
        app.moderation
            .resolve(admin, report.id, ReportAction::ContentRemoved, None)
            .await
            .unwrap();
        let comment = app.content.get_comment(comment.id).await.unwrap().unwrap();
        assert!(comment.is_deleted);
        assert_eq!(
            app.engagement.get_reel(reel.id).await.unwrap().comments_count,
            0
        );

        let campaign = app.active_campaign(ada, 1000).await;
        let report = app
            .moderation
            .submit_report(
                grace,
                ReportTarget::Campaign(campaign.id),
                ReportReason::FakeCampaign,
                None,
            )
            .await
            .unwrap();
        app.moderation
            .resolve(
                admin,
                report.id,
                ReportAction::ContentRemoved,
                Some("fabricated story".into()),
            )
            .await
            .unwrap();
        let campaign = app.campaigns.get_campaign(campaign.id).await.unwrap().unwrap();
        assert_eq!(campaign.status, CampaignStatus::Cancelled);
        assert_eq!(campaign.rejection_reason.as_deref(), Some("fabricated story"));
    }

    #[tokio::test]
    async fn profiles_cannot_be_content_removed() {
        let app = TestApp::new();
        let ada = app.profile("ada").await;
        let grace = app.profile("grace").await;
        let admin = app.admin("root").await;
        let report = app
            .moderation
            .submit_report(
                grace,
                ReportTarget::Profile(ada),
                ReportReason::Harassment,
                None,
            )
            .await
            .unwrap();

        let err = app
            .moderation
            .resolve(admin, report.id, ReportAction::ContentRemoved, None)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidArgument(_)));

        // The failed action left the report open for another decision.
        let report = app.moderation.get_report(report.id).await.unwrap();
        assert_eq!(report.status, ReportStatus::Pending);
    }

    #[tokio::test]
    async fn warnings_reach_the_target_owner() {
        let app = TestApp::new();
        let ada = app.profile("ada").await;
        let grace = app.profile("grace").await;
        let admin = app.admin("root").await;
        let post = app.post(ada).await;
        let report = app
            .moderation
            .submit_report(
                grace,
                ReportTarget::Post(post.id),
                ReportReason::Harassment,
                None,
            )
            .await
            .unwrap();

        app.moderation
            .resolve(
                admin,
                report.id,
                ReportAction::WarningIssued,
                Some("keep it civil".into()),
            )
            .await
            .unwrap();

        app.drain().await;
        let inbox = app.inbox(ada).await;
        assert_eq!(inbox[0].message, "You have received a warning: keep it civil");
        // The post itself is untouched.
        assert!(app.content.get_post(post.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn suspension_stamps_the_profile_and_notifies() {
        let app = TestApp::new();
        let ada = app.profile("ada").await;
        let grace = app.profile("grace").await;
        let admin = app.admin("root").await;
        let report = app
            .moderation
            .submit_report(
                grace,
                ReportTarget::Profile(ada),
                ReportReason::Harassment,
                None,
            )
            .await
            .unwrap();

        app.moderation
            .resolve(admin, report.id, ReportAction::AccountSuspended, None)
            .await
            .unwrap();

        let profile = app.identity.get_profile(ada).await.unwrap().unwrap();
        let until = profile.suspended_until.expect("suspension timestamp");
        let days_out = until.signed_duration_since(Utc::now()).num_days();
        assert!((6..=7).contains(&days_out), "suspended {} days out", days_out);

        app.drain().await;
        let inbox = app.inbox(ada).await;
        assert_eq!(
            inbox[0].message,
            "Your account has been suspended for 7 days. Reason: HARASSMENT"
        );
    }

    #[tokio::test]
    async fn dismissal_and_escalation_are_terminal() {
        let app = TestApp::new();
        let ada = app.profile("ada").await;
        let grace = app.profile("grace").await;
        let henry = app.profile("henry").await;
        let admin = app.admin("root").await;
        let senior = app.senior_admin("chief").await;
        let post = app.post(ada).await;

        let report = app
            .moderation
            .submit_report(grace, ReportTarget::Post(post.id), ReportReason::Spam, None)
            .await
            .unwrap();
        let dismissed = app.moderation.dismiss(admin, report.id).await.unwrap();
        assert_eq!(dismissed.status, ReportStatus::Dismissed);

        let err = app.moderation.escalate(admin, report.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidState(_)));

        let second = app
            .moderation
            .submit_report(henry, ReportTarget::Post(post.id), ReportReason::Violence, None)
            .await
            .unwrap();
        let escalated = app.moderation.escalate(admin, second.id).await.unwrap();
        assert_eq!(escalated.status, ReportStatus::Escalated);

        app.drain().await;
        let reporter_inbox = app.inbox(grace).await;
        assert_eq!(
            reporter_inbox[0].message,
            "Your report has been reviewed and dismissed"
        );
        let senior_inbox = app.inbox(senior).await;
        assert_eq!(senior_inbox[0].message, "Escalated report requires review");
    }
}
