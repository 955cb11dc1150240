// Copyright (c) CrowdPulse Team
// SPDX-License-Identifier: Apache-2.0

use futures::future::try_join_all;
use std::sync::Arc;
use tracing::debug;

use crate::error::ServiceResult;
use crate::models::content_ref::{ContentKind, ReportTarget, TargetKind};
use crate::models::notification::{NewNotification, NotificationType};
use crate::models::profile::ProfileRole;
use crate::notifications::event::NotificationEvent;
use crate::notifications::templates;
use crate::stores::{CampaignStore, IdentityStore, NotificationStore};

/// Resolves outbox events into delivered notifications.
///
/// The dispatcher owns every delivery policy: actor display names (with a
/// "Someone" fallback when the profile is gone), suppression of self-actions,
/// and the fan-outs that turn one event into many rows (campaign updates to
/// donors, report events to admins). Engines never build notification rows
/// themselves.
pub struct NotificationDispatcher {
    identity: Arc<dyn IdentityStore>,
    campaigns: Arc<dyn CampaignStore>,
    notifications: Arc<dyn NotificationStore>,
}

impl NotificationDispatcher {
    pub fn new(
        identity: Arc<dyn IdentityStore>,
        campaigns: Arc<dyn CampaignStore>,
        notifications: Arc<dyn NotificationStore>,
    ) -> Self {
        Self {
            identity,
            campaigns,
            notifications,
        }
    }

    /// Dispatches one event, returning how many notifications were delivered.
    /// Zero is a valid outcome (self-action, or fan-out with no recipients).
    pub async fn dispatch(&self, event: &NotificationEvent) -> ServiceResult<usize> {
        match event {
            NotificationEvent::FollowRequested {
                follower_id,
                target_id,
            } => {
                let actor = self.actor_name(*follower_id).await?;
                self.deliver(NewNotification {
                    recipient_id: *target_id,
                    actor_id: Some(*follower_id),
                    notification_type: NotificationType::FollowRequest,
                    message: templates::follow_requested(&actor),
                    target_type: Some(TargetKind::Profile),
                    target_id: Some(*follower_id),
                    campaign_id: None,
                    action_url: Some(templates::profile_url(*follower_id)),
                })
                .await
            }
            NotificationEvent::FollowerAdded {
                follower_id,
                target_id,
            } => {
                let actor = self.actor_name(*follower_id).await?;
                self.deliver(NewNotification {
                    recipient_id: *target_id,
                    actor_id: Some(*follower_id),
                    notification_type: NotificationType::Follow,
                    message: templates::follower_added(&actor),
                    target_type: Some(TargetKind::Profile),
                    target_id: Some(*follower_id),
                    campaign_id: None,
                    action_url: Some(templates::profile_url(*follower_id)),
                })
                .await
            }
            NotificationEvent::FollowAccepted {
                approver_id,
                requester_id,
            } => {
                let actor = self.actor_name(*approver_id).await?;
                self.deliver(NewNotification {
                    recipient_id: *requester_id,
                    actor_id: Some(*approver_id),
                    notification_type: NotificationType::FollowAccepted,
                    message: templates::follow_accepted(&actor),
                    target_type: Some(TargetKind::Profile),
                    target_id: Some(*approver_id),
                    campaign_id: None,
                    action_url: Some(templates::profile_url(*approver_id)),
                })
                .await
            }
            NotificationEvent::ContentLiked {
                actor_id,
                owner_id,
                content,
            } => {
                let actor = self.actor_name(*actor_id).await?;
                let notification_type = match content.kind() {
                    ContentKind::Post => NotificationType::LikePost,
                    ContentKind::Reel => NotificationType::LikeReel,
                    ContentKind::Campaign => NotificationType::LikeCampaign,
                };
                let campaign_id = match content.kind() {
                    ContentKind::Campaign => Some(content.id()),
                    _ => None,
                };
                self.deliver(NewNotification {
                    recipient_id: *owner_id,
                    actor_id: Some(*actor_id),
                    notification_type,
                    message: templates::content_liked(&actor, content.noun()),
                    target_type: Some(ReportTarget::from(*content).kind()),
                    target_id: Some(content.id()),
                    campaign_id,
                    action_url: campaign_id.map(templates::campaign_url),
                })
                .await
            }
            NotificationEvent::CommentAdded {
                actor_id,
                recipient_id,
                content,
                comment_id,
                is_reply,
            } => {
                let actor = self.actor_name(*actor_id).await?;
                let (notification_type, message) = if *is_reply {
                    (
                        NotificationType::CommentReply,
                        templates::comment_reply(&actor),
                    )
                } else {
                    let notification_type = match content.kind() {
                        ContentKind::Post => NotificationType::CommentPost,
                        ContentKind::Reel => NotificationType::CommentReel,
                        ContentKind::Campaign => NotificationType::CommentCampaign,
                    };
                    (
                        notification_type,
                        templates::comment_added(&actor, content.noun()),
                    )
                };
                let campaign_id = match content.kind() {
                    ContentKind::Campaign => Some(content.id()),
                    _ => None,
                };
                let new = NewNotification {
                    recipient_id: *recipient_id,
                    actor_id: Some(*actor_id),
                    notification_type,
                    message,
                    target_type: Some(TargetKind::Comment),
                    target_id: Some(*comment_id),
                    campaign_id,
                    action_url: campaign_id.map(templates::campaign_url),
                };
                // Reply chains notify even when someone replies under their
                // own comment; only top-level self-comments stay silent.
                if *is_reply {
                    self.notifications.insert_notification(new).await?;
                    Ok(1)
                } else {
                    self.deliver(new).await
                }
            }
            NotificationEvent::DonationReceived {
                donor_id,
                creator_id,
                campaign_id,
                amount,
                currency,
                anonymous,
            } => {
                let (actor_id, message) = if *anonymous {
                    (None, templates::donation_received_anonymous(amount, currency))
                } else {
                    let actor = self.actor_name(*donor_id).await?;
                    (
                        Some(*donor_id),
                        templates::donation_received(&actor, amount, currency),
                    )
                };
                self.deliver(NewNotification {
                    recipient_id: *creator_id,
                    actor_id,
                    notification_type: NotificationType::DonationReceived,
                    message,
                    target_type: Some(TargetKind::Campaign),
                    target_id: Some(*campaign_id),
                    campaign_id: Some(*campaign_id),
                    action_url: Some(templates::campaign_url(*campaign_id)),
                })
                .await
            }
            NotificationEvent::DonationRefunded {
                donor_id,
                campaign_id,
                reason,
                ..
            } => {
                self.deliver(NewNotification {
                    recipient_id: *donor_id,
                    actor_id: None,
                    notification_type: NotificationType::DonationRefunded,
                    message: templates::donation_refunded(reason),
                    target_type: Some(TargetKind::Campaign),
                    target_id: Some(*campaign_id),
                    campaign_id: Some(*campaign_id),
                    action_url: Some(templates::campaign_url(*campaign_id)),
                })
                .await
            }
            NotificationEvent::GoalReached {
                creator_id,
                campaign_id,
            } => {
                self.deliver(NewNotification {
                    recipient_id: *creator_id,
                    actor_id: None,
                    notification_type: NotificationType::CampaignGoalReached,
                    message: templates::goal_reached(),
                    target_type: Some(TargetKind::Campaign),
                    target_id: Some(*campaign_id),
                    campaign_id: Some(*campaign_id),
                    action_url: Some(templates::campaign_url(*campaign_id)),
                })
                .await
            }
            NotificationEvent::CampaignApproved {
                creator_id,
                campaign_id,
            } => {
                self.deliver(NewNotification {
                    recipient_id: *creator_id,
                    actor_id: None,
                    notification_type: NotificationType::CampaignApproved,
                    message: templates::campaign_approved(),
                    target_type: Some(TargetKind::Campaign),
                    target_id: Some(*campaign_id),
                    campaign_id: Some(*campaign_id),
                    action_url: Some(templates::campaign_url(*campaign_id)),
                })
                .await
            }
            NotificationEvent::CampaignRejected {
                creator_id,
                campaign_id,
                reason,
            } => {
                self.deliver(NewNotification {
                    recipient_id: *creator_id,
                    actor_id: None,
                    notification_type: NotificationType::CampaignRejected,
                    message: templates::campaign_rejected(reason),
                    target_type: Some(TargetKind::Campaign),
                    target_id: Some(*campaign_id),
                    campaign_id: Some(*campaign_id),
                    action_url: Some(templates::campaign_url(*campaign_id)),
                })
                .await
            }
            NotificationEvent::CampaignUpdatePosted {
                campaign_id,
                author_id,
                update_id,
                title,
                milestone,
            } => {
                let donors = self.campaigns.distinct_completed_donors(*campaign_id).await?;
                let (notification_type, message) = if *milestone {
                    (
                        NotificationType::CampaignMilestone,
                        templates::campaign_milestone(title),
                    )
                } else {
                    (
                        NotificationType::CampaignUpdate,
                        templates::campaign_update(title),
                    )
                };
                let deliveries = donors.into_iter().map(|donor_id| {
                    self.deliver(NewNotification {
                        recipient_id: donor_id,
                        actor_id: Some(*author_id),
                        notification_type,
                        message: message.clone(),
                        target_type: Some(TargetKind::Campaign),
                        target_id: Some(*campaign_id),
                        campaign_id: Some(*campaign_id),
                        action_url: Some(templates::campaign_update_url(*campaign_id, *update_id)),
                    })
                });
                let delivered: usize = try_join_all(deliveries).await?.into_iter().sum();
                debug!(
                    campaign_id,
                    update_id, delivered, "campaign update fanned out to donors"
                );
                Ok(delivered)
            }
            NotificationEvent::WithdrawalApproved {
                requester_id,
                campaign_id,
                ..
            } => {
                self.deliver(NewNotification {
                    recipient_id: *requester_id,
                    actor_id: None,
                    notification_type: NotificationType::WithdrawalApproved,
                    message: templates::withdrawal_approved(),
                    target_type: Some(TargetKind::Campaign),
                    target_id: Some(*campaign_id),
                    campaign_id: Some(*campaign_id),
                    action_url: Some(templates::campaign_url(*campaign_id)),
                })
                .await
            }
            NotificationEvent::WithdrawalRejected {
                requester_id,
                campaign_id,
                reason,
                ..
            } => {
                self.deliver(NewNotification {
                    recipient_id: *requester_id,
                    actor_id: None,
                    notification_type: NotificationType::WithdrawalRejected,
                    message: templates::withdrawal_rejected(reason),
                    target_type: Some(TargetKind::Campaign),
                    target_id: Some(*campaign_id),
                    campaign_id: Some(*campaign_id),
                    action_url: Some(templates::campaign_url(*campaign_id)),
                })
                .await
            }
            NotificationEvent::WithdrawalCompleted {
                requester_id,
                campaign_id,
                ..
            } => {
                self.deliver(NewNotification {
                    recipient_id: *requester_id,
                    actor_id: None,
                    notification_type: NotificationType::WithdrawalCompleted,
                    message: templates::withdrawal_completed(),
                    target_type: Some(TargetKind::Campaign),
                    target_id: Some(*campaign_id),
                    campaign_id: Some(*campaign_id),
                    action_url: Some(templates::campaign_url(*campaign_id)),
                })
                .await
            }
            NotificationEvent::WithdrawalFailed {
                requester_id,
                campaign_id,
                reason,
                ..
            } => {
                self.deliver(NewNotification {
                    recipient_id: *requester_id,
                    actor_id: None,
                    notification_type: NotificationType::WithdrawalFailed,
                    message: templates::withdrawal_failed(reason),
                    target_type: Some(TargetKind::Campaign),
                    target_id: Some(*campaign_id),
                    campaign_id: Some(*campaign_id),
                    action_url: Some(templates::campaign_url(*campaign_id)),
                })
                .await
            }
            NotificationEvent::BankAccountVerified {
                owner_id,
                masked_account,
            } => {
                self.deliver(NewNotification {
                    recipient_id: *owner_id,
                    actor_id: None,
                    notification_type: NotificationType::BankAccountVerified,
                    message: templates::bank_account_verified(masked_account),
                    target_type: None,
                    target_id: None,
                    campaign_id: None,
                    action_url: None,
                })
                .await
            }
            NotificationEvent::ReportSubmitted { report_id } => {
                self.notify_role(
                    ProfileRole::Admin,
                    templates::report_submitted(),
                    *report_id,
                )
                .await
            }
            NotificationEvent::ReportEscalated { report_id } => {
                self.notify_role(
                    ProfileRole::SeniorAdmin,
                    templates::report_escalated(),
                    *report_id,
                )
                .await
            }
            NotificationEvent::ReportResolved {
                reporter_id,
                report_id: _,
                action,
            } => {
                self.deliver(NewNotification {
                    recipient_id: *reporter_id,
                    actor_id: None,
                    notification_type: NotificationType::ReportResolved,
                    message: templates::report_resolved(*action),
                    target_type: None,
                    target_id: None,
                    campaign_id: None,
                    action_url: None,
                })
                .await
            }
            NotificationEvent::ReportDismissed {
                reporter_id,
                report_id: _,
            } => {
                self.deliver(NewNotification {
                    recipient_id: *reporter_id,
                    actor_id: None,
                    notification_type: NotificationType::ReportDismissed,
                    message: templates::report_dismissed(),
                    target_type: None,
                    target_id: None,
                    campaign_id: None,
                    action_url: None,
                })
                .await
            }
            NotificationEvent::AccountWarning { recipient_id, reason } => {
                self.deliver(NewNotification {
                    recipient_id: *recipient_id,
                    actor_id: None,
                    notification_type: NotificationType::AccountWarning,
                    message: templates::account_warning(reason),
                    target_type: None,
                    target_id: None,
                    campaign_id: None,
                    action_url: None,
                })
                .await
            }
            NotificationEvent::AccountSuspended {
                recipient_id,
                days,
                reason,
            } => {
                self.deliver(NewNotification {
                    recipient_id: *recipient_id,
                    actor_id: None,
                    notification_type: NotificationType::AccountSuspended,
                    message: templates::account_suspended(*days, reason),
                    target_type: None,
                    target_id: None,
                    campaign_id: None,
                    action_url: None,
                })
                .await
            }
        }
    }

    async fn actor_name(&self, actor_id: i64) -> ServiceResult<String> {
        Ok(self
            .identity
            .get_profile(actor_id)
            .await?
            .map(|p| p.visible_name().to_string())
            .unwrap_or_else(|| "Someone".to_string()))
    }

    /// Inserts the row unless it would notify the actor about their own
    /// action.
    async fn deliver(&self, new: NewNotification) -> ServiceResult<usize> {
        if new.actor_id == Some(new.recipient_id) {
            return Ok(0);
        }
        self.notifications.insert_notification(new).await?;
        Ok(1)
    }

    async fn notify_role(
        &self,
        role: ProfileRole,
        message: String,
        report_id: i64,
    ) -> ServiceResult<usize> {
        let recipients = self.identity.list_by_role(role).await?;
        let deliveries = recipients.into_iter().map(|recipient| {
            self.deliver(NewNotification {
                recipient_id: recipient.id,
                actor_id: None,
                notification_type: NotificationType::AdminActionRequired,
                message: message.clone(),
                target_type: None,
                target_id: None,
                campaign_id: None,
                action_url: Some(templates::admin_report_url(report_id)),
            })
        });
        let delivered: usize = try_join_all(deliveries).await?.into_iter().sum();
        debug!(report_id, delivered, role = role.as_str(), "report routed to moderators");
        Ok(delivered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::campaign::{CampaignStatus, NewCampaign};
    use crate::models::content_ref::ContentRef;
    use crate::models::donation::{DonationChanges, DonationStatus, NewDonation};
    use crate::models::profile::NewProfile;
    use crate::stores::{InMemoryCampaignStore, InMemoryIdentityStore, InMemoryNotificationStore};
    use bigdecimal::BigDecimal;
    use chrono::Utc;

    struct Fixture {
        identity: Arc<InMemoryIdentityStore>,
        campaigns: Arc<InMemoryCampaignStore>,
        notifications: Arc<InMemoryNotificationStore>,
        dispatcher: NotificationDispatcher,
    }

    fn fixture() -> Fixture {
        let identity = Arc::new(InMemoryIdentityStore::new());
        let campaigns = Arc::new(InMemoryCampaignStore::new());
        let notifications = Arc::new(InMemoryNotificationStore::new());
        let dispatcher = NotificationDispatcher::new(
            identity.clone(),
            campaigns.clone(),
            notifications.clone(),
        );
        Fixture {
            identity,
            campaigns,
            notifications,
            dispatcher,
        }
    }

    fn profile(username: &str) -> NewProfile {
        NewProfile {
            username: username.into(),
            display_name: None,
            bio: None,
            avatar_url: None,
            is_private: false,
            role: ProfileRole::User,
        }
    }

    #[tokio::test]
    async fn self_actions_are_suppressed() {
        let fx = fixture();
        let ada = fx.identity.create_profile(profile("ada")).await.unwrap();
        let delivered = fx
            .dispatcher
            .dispatch(&NotificationEvent::FollowerAdded {
                follower_id: ada.id,
                target_id: ada.id,
            })
            .await
            .unwrap();
        assert_eq!(delivered, 0);
        assert!(fx.notifications.all_notifications().await.is_empty());
    }

    #[tokio::test]
    async fn replying_under_your_own_comment_still_notifies() {
        let fx = fixture();
        let ada = fx.identity.create_profile(profile("ada")).await.unwrap();
        let delivered = fx
            .dispatcher
            .dispatch(&NotificationEvent::CommentAdded {
                actor_id: ada.id,
                recipient_id: ada.id,
                content: ContentRef::Post(9),
                comment_id: 42,
                is_reply: true,
            })
            .await
            .unwrap();
        assert_eq!(delivered, 1);
        let inbox = fx
            .notifications
            .list_for_recipient(ada.id, 10, 0)
            .await
            .unwrap();
        assert_eq!(inbox[0].message, "ada replied to your comment");
        assert_eq!(inbox[0].notification_type, NotificationType::CommentReply);

        // A plain top-level self-comment is still suppressed.
        let delivered = fx
            .dispatcher
            .dispatch(&NotificationEvent::CommentAdded {
                actor_id: ada.id,
                recipient_id: ada.id,
                content: ContentRef::Post(9),
                comment_id: 43,
                is_reply: false,
            })
            .await
            .unwrap();
        assert_eq!(delivered, 0);
    }

    #[tokio::test]
    async fn missing_actor_falls_back_to_someone() {
        let fx = fixture();
        let owner = fx.identity.create_profile(profile("owner")).await.unwrap();
        let delivered = fx
            .dispatcher
            .dispatch(&NotificationEvent::ContentLiked {
                actor_id: 999,
                owner_id: owner.id,
                content: ContentRef::Post(5),
            })
            .await
            .unwrap();
        assert_eq!(delivered, 1);
        let inbox = fx
            .notifications
            .list_for_recipient(owner.id, 10, 0)
            .await
            .unwrap();
        assert_eq!(inbox[0].message, "Someone liked your post");
        assert_eq!(inbox[0].notification_type, NotificationType::LikePost);
    }

    #[tokio::test]
    async fn display_name_is_preferred_over_username() {
        let fx = fixture();
        let mut new = profile("ada");
        new.display_name = Some("Ada Lovelace".into());
        let ada = fx.identity.create_profile(new).await.unwrap();
        let owner = fx.identity.create_profile(profile("owner")).await.unwrap();
        fx.dispatcher
            .dispatch(&NotificationEvent::FollowerAdded {
                follower_id: ada.id,
                target_id: owner.id,
            })
            .await
            .unwrap();
        let inbox = fx
            .notifications
            .list_for_recipient(owner.id, 10, 0)
            .await
            .unwrap();
        assert_eq!(inbox[0].message, "Ada Lovelace started following you");
        assert_eq!(inbox[0].action_url.as_deref(), Some("/profiles/1"));
    }

    #[tokio::test]
    async fn campaign_update_fans_out_to_distinct_settled_donors() {
        let fx = fixture();
        let creator = fx.identity.create_profile(profile("creator")).await.unwrap();
        let donor = fx.identity.create_profile(profile("donor")).await.unwrap();
        let lurker = fx.identity.create_profile(profile("lurker")).await.unwrap();
        let campaign = fx
            .campaigns
            .create_campaign(NewCampaign {
                creator_id: creator.id,
                title: "Well".into(),
                description: "Water".into(),
                goal_amount: BigDecimal::from(1000),
                currency: "USD".into(),
                status: CampaignStatus::Active,
                end_date: Utc::now() + chrono::Duration::days(30),
            })
            .await
            .unwrap();

        // Two settled donations from the same donor count once; the pending
        // one from the lurker and the creator's own settled donation never
        // produce a row.
        for donor_id in [donor.id, donor.id, creator.id] {
            let donation = fx
                .campaigns
                .create_donation(NewDonation {
                    campaign_id: campaign.id,
                    donor_id,
                    amount: BigDecimal::from(10),
                    currency: "USD".into(),
                    is_anonymous: false,
                    message: None,
                    status: DonationStatus::Pending,
                })
                .await
                .unwrap();
            fx.campaigns
                .update_donation(
                    donation.id,
                    DonationChanges {
                        status: Some(DonationStatus::Completed),
                        ..Default::default()
                    },
                )
                .await
                .unwrap();
        }
        fx.campaigns
            .create_donation(NewDonation {
                campaign_id: campaign.id,
                donor_id: lurker.id,
                amount: BigDecimal::from(10),
                currency: "USD".into(),
                is_anonymous: false,
                message: None,
                status: DonationStatus::Pending,
            })
            .await
            .unwrap();

        let delivered = fx
            .dispatcher
            .dispatch(&NotificationEvent::CampaignUpdatePosted {
                campaign_id: campaign.id,
                author_id: creator.id,
                update_id: 77,
                title: "Drilling started".into(),
                milestone: false,
            })
            .await
            .unwrap();
        assert_eq!(delivered, 1);
        let inbox = fx
            .notifications
            .list_for_recipient(donor.id, 10, 0)
            .await
            .unwrap();
        assert_eq!(
            inbox[0].message,
            "New update posted for campaign: Drilling started"
        );
        assert_eq!(
            inbox[0].action_url.as_deref(),
            Some(format!("/campaigns/{}/updates/77", campaign.id).as_str())
        );
    }

    #[tokio::test]
    async fn reports_route_to_the_matching_admin_tier() {
        let fx = fixture();
        let mut admin = profile("mod");
        admin.role = ProfileRole::Admin;
        let admin = fx.identity.create_profile(admin).await.unwrap();
        let mut senior = profile("senior");
        senior.role = ProfileRole::SeniorAdmin;
        let senior = fx.identity.create_profile(senior).await.unwrap();

        let delivered = fx
            .dispatcher
            .dispatch(&NotificationEvent::ReportSubmitted { report_id: 5 })
            .await
            .unwrap();
        assert_eq!(delivered, 1);
        assert_eq!(
            fx.notifications.unread_count(admin.id).await.unwrap(),
            1
        );
        assert_eq!(fx.notifications.unread_count(senior.id).await.unwrap(), 0);

        let delivered = fx
            .dispatcher
            .dispatch(&NotificationEvent::ReportEscalated { report_id: 5 })
            .await
            .unwrap();
        assert_eq!(delivered, 1);
        let inbox = fx
            .notifications
            .list_for_recipient(senior.id, 10, 0)
            .await
            .unwrap();
        assert_eq!(inbox[0].message, "Escalated report requires review");
        assert_eq!(inbox[0].action_url.as_deref(), Some("/admin/reports/5"));
    }

    #[tokio::test]
    async fn anonymous_donations_hide_the_donor() {
        let fx = fixture();
        let creator = fx.identity.create_profile(profile("creator")).await.unwrap();
        let donor = fx.identity.create_profile(profile("donor")).await.unwrap();
        fx.dispatcher
            .dispatch(&NotificationEvent::DonationReceived {
                donor_id: donor.id,
                creator_id: creator.id,
                campaign_id: 3,
                amount: "25.50".parse().unwrap(),
                currency: "USD".into(),
                anonymous: true,
            })
            .await
            .unwrap();
        let inbox = fx
            .notifications
            .list_for_recipient(creator.id, 10, 0)
            .await
            .unwrap();
        assert_eq!(
            inbox[0].message,
            "Someone donated 25.50 USD to your campaign anonymously"
        );
        assert_eq!(inbox[0].actor_id, None);
    }
}
