// Copyright (c) CrowdPulse Team
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;
use tracing::warn;

use crate::error::{ServiceError, ServiceResult};
use crate::models::follow::{Follow, FollowStatus, NewFollow};
use crate::notifications::event::NotificationEvent;
use crate::stores::{FollowStore, IdentityStore, NotificationStore};

/// Follow/block/mute state machine plus the follower/following counters on
/// profiles.
///
/// The follow edge is authoritative; counters on the two profiles are
/// denormalized and adjusted on every transition into or out of ACTIVE. A
/// counter adjustment that fails leaves a drift the clamp repairs on the next
/// opposite transition, never a crash.
pub struct SocialGraphEngine {
    identity: Arc<dyn IdentityStore>,
    follows: Arc<dyn FollowStore>,
    outbox: Arc<dyn NotificationStore>,
}

impl SocialGraphEngine {
    pub fn new(
        identity: Arc<dyn IdentityStore>,
        follows: Arc<dyn FollowStore>,
        outbox: Arc<dyn NotificationStore>,
    ) -> Self {
        Self {
            identity,
            follows,
            outbox,
        }
    }

    /// Follows a profile. Public targets get an ACTIVE edge immediately;
    /// private targets get a PENDING request instead.
    pub async fn follow(&self, follower_id: i64, following_id: i64) -> ServiceResult<Follow> {
        if follower_id == following_id {
            return Err(ServiceError::invalid_argument("cannot follow yourself"));
        }
        self.require_profile(follower_id).await?;
        let target = self
            .identity
            .get_profile(following_id)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("profile {}", following_id)))?;
        if self.follows.get(follower_id, following_id).await?.is_some() {
            return Err(ServiceError::already_exists(
                "follow relationship already exists",
            ));
        }

        if target.is_private {
            let follow = self
                .follows
                .insert(NewFollow {
                    follower_id,
                    following_id,
                    status: FollowStatus::Pending,
                })
                .await?;
            self.enqueue(NotificationEvent::FollowRequested {
                follower_id,
                target_id: following_id,
            })
            .await;
            return Ok(follow);
        }

        let follow = self
            .follows
            .insert(NewFollow {
                follower_id,
                following_id,
                status: FollowStatus::Active,
            })
            .await?;
        self.identity
            .adjust_followers_count(following_id, 1)
            .await?;
        self.identity.adjust_following_count(follower_id, 1).await?;
        self.enqueue(NotificationEvent::FollowerAdded {
            follower_id,
            target_id: following_id,
        })
        .await;
        Ok(follow)
    }

    /// Approves a pending follow request aimed at `approver_id`.
    pub async fn approve(&self, approver_id: i64, requester_id: i64) -> ServiceResult<Follow> {
        let edge = self
            .follows
            .get(requester_id, approver_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("follow request"))?;
        if edge.status != FollowStatus::Pending {
            return Err(ServiceError::invalid_state("follow request is not pending"));
        }
        let follow = self
            .follows
            .set_status(requester_id, approver_id, FollowStatus::Active)
            .await?;
        self.identity.adjust_followers_count(approver_id, 1).await?;
        self.identity
            .adjust_following_count(requester_id, 1)
            .await?;
        self.enqueue(NotificationEvent::FollowAccepted {
            approver_id,
            requester_id,
        })
        .await;
        Ok(follow)
    }

    /// Rejects a pending follow request; the edge is removed without ever
    /// having counted.
    pub async fn reject(&self, approver_id: i64, requester_id: i64) -> ServiceResult<()> {
        let edge = self
            .follows
            .get(requester_id, approver_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("follow request"))?;
        if edge.status != FollowStatus::Pending {
            return Err(ServiceError::invalid_state("follow request is not pending"));
        }
        self.follows.delete(requester_id, approver_id).await?;
        Ok(())
    }

    /// Removes the edge whatever its status; counters move only when an
    /// ACTIVE edge is removed.
    pub async fn unfollow(&self, follower_id: i64, following_id: i64) -> ServiceResult<()> {
        let edge = self
            .follows
            .get(follower_id, following_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("follow relationship"))?;
        self.follows.delete(follower_id, following_id).await?;
        if edge.status == FollowStatus::Active {
            self.identity
                .adjust_followers_count(following_id, -1)
                .await?;
            self.identity
                .adjust_following_count(follower_id, -1)
                .await?;
        }
        Ok(())
    }

    /// Blocks a profile: removes the edges in both directions (adjusting
    /// counters for each previously ACTIVE one) and records a BLOCKED edge
    /// from blocker to blocked. Blocking never notifies anyone.
    pub async fn block(&self, blocker_id: i64, blocked_id: i64) -> ServiceResult<Follow> {
        if blocker_id == blocked_id {
            return Err(ServiceError::invalid_argument("cannot block yourself"));
        }
        self.require_profile(blocker_id).await?;
        self.require_profile(blocked_id).await?;

        let outgoing = self.follows.get(blocker_id, blocked_id).await?;
        let incoming = self.follows.get(blocked_id, blocker_id).await?;
        if let Some(edge) = &outgoing {
            if edge.status == FollowStatus::Blocked {
                return Err(ServiceError::already_exists("profile is already blocked"));
            }
        }

        for edge in [outgoing, incoming].into_iter().flatten() {
            self.follows
                .delete(edge.follower_id, edge.following_id)
                .await?;
            if edge.status == FollowStatus::Active {
                self.identity
                    .adjust_followers_count(edge.following_id, -1)
                    .await?;
                self.identity
                    .adjust_following_count(edge.follower_id, -1)
                    .await?;
            }
        }

        self.follows
            .insert(NewFollow {
                follower_id: blocker_id,
                following_id: blocked_id,
                status: FollowStatus::Blocked,
            })
            .await
    }

    /// Removes a block. Only a BLOCKED edge qualifies.
    pub async fn unblock(&self, blocker_id: i64, blocked_id: i64) -> ServiceResult<()> {
        let edge = self
            .follows
            .get(blocker_id, blocked_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("block"))?;
        if edge.status != FollowStatus::Blocked {
            return Err(ServiceError::invalid_state("profile is not blocked"));
        }
        self.follows.delete(blocker_id, blocked_id).await?;
        Ok(())
    }

    /// Mutes an active follow: the edge survives but stops counting.
    pub async fn mute(&self, follower_id: i64, following_id: i64) -> ServiceResult<Follow> {
        let edge = self
            .follows
            .get(follower_id, following_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("follow relationship"))?;
        if edge.status != FollowStatus::Active {
            return Err(ServiceError::invalid_state(
                "only an active follow can be muted",
            ));
        }
        let follow = self
            .follows
            .set_status(follower_id, following_id, FollowStatus::Muted)
            .await?;
        self.identity
            .adjust_followers_count(following_id, -1)
            .await?;
        self.identity
            .adjust_following_count(follower_id, -1)
            .await?;
        Ok(follow)
    }

    /// Restores a muted follow to ACTIVE.
    pub async fn unmute(&self, follower_id: i64, following_id: i64) -> ServiceResult<Follow> {
        let edge = self
            .follows
            .get(follower_id, following_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("follow relationship"))?;
        if edge.status != FollowStatus::Muted {
            return Err(ServiceError::invalid_state("follow is not muted"));
        }
        let follow = self
            .follows
            .set_status(follower_id, following_id, FollowStatus::Active)
            .await?;
        self.identity
            .adjust_followers_count(following_id, 1)
            .await?;
        self.identity.adjust_following_count(follower_id, 1).await?;
        Ok(follow)
    }

    pub async fn followers(
        &self,
        profile_id: i64,
        limit: i64,
        offset: i64,
    ) -> ServiceResult<Vec<Follow>> {
        self.follows.list_followers(profile_id, limit, offset).await
    }

    pub async fn following(
        &self,
        profile_id: i64,
        limit: i64,
        offset: i64,
    ) -> ServiceResult<Vec<Follow>> {
        self.follows.list_following(profile_id, limit, offset).await
    }

    async fn require_profile(&self, id: i64) -> ServiceResult<()> {
        self.identity
            .get_profile(id)
            .await?
            .map(|_| ())
            .ok_or_else(|| ServiceError::not_found(format!("profile {}", id)))
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
    use crate::testutil::TestApp;

    #[tokio::test]
    async fn self_follow_is_rejected() {
        let app = TestApp::new();
        let ada = app.profile("ada").await;
        let err = app.social.follow(ada, ada).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn following_a_public_profile_activates_and_notifies() {
        let app = TestApp::new();
        let ada = app.profile("ada").await;
        let grace = app.profile("grace").await;

        let follow = app.social.follow(ada, grace).await.unwrap();
        assert_eq!(follow.status, FollowStatus::Active);
        assert_eq!(app.followers_count(grace).await, 1);
        assert_eq!(app.following_count(ada).await, 1);

        app.drain().await;
        let inbox = app.inbox(grace).await;
        assert_eq!(inbox.len(), 1);
        assert_eq!(inbox[0].message, "ada started following you");
    }

    #[tokio::test]
    async fn following_twice_is_rejected() {
        let app = TestApp::new();
        let ada = app.profile("ada").await;
        let grace = app.profile("grace").await;
        app.social.follow(ada, grace).await.unwrap();
        let err = app.social.follow(ada, grace).await.unwrap_err();
        assert!(matches!(err, ServiceError::AlreadyExists(_)));
    }

    #[tokio::test]
    async fn private_profiles_get_a_pending_request() {
        let app = TestApp::new();
        let ada = app.profile("ada").await;
        let vera = app.private_profile("vera").await;

        let follow = app.social.follow(ada, vera).await.unwrap();
        assert_eq!(follow.status, FollowStatus::Pending);
        assert_eq!(app.followers_count(vera).await, 0);
        assert_eq!(app.following_count(ada).await, 0);

        app.drain().await;
        let inbox = app.inbox(vera).await;
        assert_eq!(inbox[0].message, "ada requested to follow you");
    }

    #[tokio::test]
    async fn approving_a_request_activates_and_counts() {
        let app = TestApp::new();
        let ada = app.profile("ada").await;
        let vera = app.private_profile("vera").await;
        app.social.follow(ada, vera).await.unwrap();

        let follow = app.social.approve(vera, ada).await.unwrap();
        assert_eq!(follow.status, FollowStatus::Active);
        assert_eq!(app.followers_count(vera).await, 1);
        assert_eq!(app.following_count(ada).await, 1);

        app.drain().await;
        let inbox = app.inbox(ada).await;
        assert_eq!(inbox[0].message, "vera accepted your follow request");

        // Approving again is no longer a pending request.
        let err = app.social.approve(vera, ada).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidState(_)));
    }

    #[tokio::test]
    async fn rejecting_a_request_removes_the_edge_silently() {
        let app = TestApp::new();
        let ada = app.profile("ada").await;
        let vera = app.private_profile("vera").await;
        app.social.follow(ada, vera).await.unwrap();

        app.social.reject(vera, ada).await.unwrap();
        assert!(app.follows.get(ada, vera).await.unwrap().is_none());

        let err = app.social.approve(vera, ada).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));

        // Rejection never notifies the requester.
        app.drain().await;
        assert!(app.inbox(ada).await.is_empty());
    }

    #[tokio::test]
    async fn unfollow_decrements_only_for_active_edges() {
        let app = TestApp::new();
        let ada = app.profile("ada").await;
        let grace = app.profile("grace").await;
        let vera = app.private_profile("vera").await;

        app.social.follow(ada, grace).await.unwrap();
        app.social.unfollow(ada, grace).await.unwrap();
        assert_eq!(app.followers_count(grace).await, 0);
        assert_eq!(app.following_count(ada).await, 0);

        // Withdrawing a pending request moves no counters.
        app.social.follow(ada, vera).await.unwrap();
        app.social.unfollow(ada, vera).await.unwrap();
        assert_eq!(app.followers_count(vera).await, 0);

        let err = app.social.unfollow(ada, grace).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn blocking_removes_both_directions_and_their_counts() {
        let app = TestApp::new();
        let ada = app.profile("ada").await;
        let grace = app.profile("grace").await;
        app.social.follow(ada, grace).await.unwrap();
        app.social.follow(grace, ada).await.unwrap();

        app.social.block(ada, grace).await.unwrap();
        assert_eq!(app.followers_count(ada).await, 0);
        assert_eq!(app.followers_count(grace).await, 0);
        assert_eq!(app.following_count(ada).await, 0);
        assert_eq!(app.following_count(grace).await, 0);

        let edge = app.follows.get(ada, grace).await.unwrap().unwrap();
        assert_eq!(edge.status, FollowStatus::Blocked);
        assert!(app.follows.get(grace, ada).await.unwrap().is_none());

        // The blocker cannot follow while their own BLOCKED edge exists.
        let err = app.social.follow(ada, grace).await.unwrap_err();
        assert!(matches!(err, ServiceError::AlreadyExists(_)));

        // Blocking twice is rejected.
        let err = app.social.block(ada, grace).await.unwrap_err();
        assert!(matches!(err, ServiceError::AlreadyExists(_)));

        // Nobody is notified about blocks.
        app.drain().await;
        assert!(app
            .inbox(grace)
            .await
            .iter()
            .all(|n| !n.message.contains("block")));
    }

    #[tokio::test]
    async fn unblock_requires_a_blocked_edge() {
        let app = TestApp::new();
        let ada = app.profile("ada").await;
        let grace = app.profile("grace").await;
        app.social.follow(ada, grace).await.unwrap();

        let err = app.social.unblock(ada, grace).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidState(_)));

        app.social.block(ada, grace).await.unwrap();
        app.social.unblock(ada, grace).await.unwrap();
        assert!(app.follows.get(ada, grace).await.unwrap().is_none());

        let err = app.social.unblock(ada, grace).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn mute_keeps_the_edge_but_moves_the_counters() {
        let app = TestApp::new();
        let ada = app.profile("ada").await;
        let grace = app.profile("grace").await;
        app.social.follow(ada, grace).await.unwrap();

        let follow = app.social.mute(ada, grace).await.unwrap();
        assert_eq!(follow.status, FollowStatus::Muted);
        assert_eq!(app.followers_count(grace).await, 0);
        assert_eq!(app.following_count(ada).await, 0);

        // Muting twice is an invalid state.
        let err = app.social.mute(ada, grace).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidState(_)));

        let follow = app.social.unmute(ada, grace).await.unwrap();
        assert_eq!(follow.status, FollowStatus::Active);
        assert_eq!(app.followers_count(grace).await, 1);
        assert_eq!(app.following_count(ada).await, 1);
    }

    #[tokio::test]
    async fn follower_lists_only_carry_active_edges() {
        let app = TestApp::new();
        let ada = app.profile("ada").await;
        let grace = app.profile("grace").await;
        let vera = app.profile("vera").await;
        app.social.follow(ada, grace).await.unwrap();
        app.social.follow(vera, grace).await.unwrap();
        app.social.mute(vera, grace).await.unwrap();

        let followers = app.social.followers(grace, 10, 0).await.unwrap();
        assert_eq!(followers.len(), 1);
        assert_eq!(followers[0].follower_id, ada);
    }
}
