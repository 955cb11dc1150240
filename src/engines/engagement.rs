// Copyright (c) CrowdPulse Team
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;
use tracing::warn;

use crate::error::{ServiceError, ServiceResult};
use crate::models::content::{Comment, NewComment, NewPost, NewReel, Post, Reel};
use crate::models::content_ref::ContentRef;
use crate::models::like::{Like, NewLike};
use crate::notifications::event::NotificationEvent;
use crate::stores::{CampaignStore, ContentStore, IdentityStore, LikeStore, NotificationStore};

/// Likes and comments across the relational and document stores.
///
/// The Like row in Postgres is authoritative; the `likes_count` field on the
/// post or reel document is a denormalized cache adjusted right after the row
/// write. Campaigns carry no cached like counter at all, their count is
/// derived by query. The two writes are not atomic with each other, which is
/// why every counter adjustment clamps at zero instead of trusting exact
/// bookkeeping.
pub struct EngagementEngine {
    identity: Arc<dyn IdentityStore>,
    content: Arc<dyn ContentStore>,
    likes: Arc<dyn LikeStore>,
    campaigns: Arc<dyn CampaignStore>,
    outbox: Arc<dyn NotificationStore>,
}

impl EngagementEngine {
    pub fn new(
        identity: Arc<dyn IdentityStore>,
        content: Arc<dyn ContentStore>,
        likes: Arc<dyn LikeStore>,
        campaigns: Arc<dyn CampaignStore>,
        outbox: Arc<dyn NotificationStore>,
    ) -> Self {
        Self {
            identity,
            content,
            likes,
            campaigns,
            outbox,
        }
    }

    pub async fn create_post(&self, new: NewPost) -> ServiceResult<Post> {
        self.require_profile(new.author_id).await?;
        let post = self.content.create_post(new).await?;
        self.identity.adjust_posts_count(post.author_id, 1).await?;
        Ok(post)
    }

    pub async fn get_post(&self, id: i64) -> ServiceResult<Post> {
        self.content
            .get_post(id)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("post {}", id)))
    }

    pub async fn create_reel(&self, new: NewReel) -> ServiceResult<Reel> {
        self.require_profile(new.author_id).await?;
        self.content.create_reel(new).await
    }

    pub async fn get_reel(&self, id: i64) -> ServiceResult<Reel> {
        self.content
            .get_reel(id)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("reel {}", id)))
    }

    /// Likes a post, reel or campaign. The relational Like row is written
    /// first; the cached counter on the document follows. Campaigns skip the
    /// counter step, see [`campaign_like_count`](Self::campaign_like_count).
    pub async fn like_content(&self, user_id: i64, content: ContentRef) -> ServiceResult<Like> {
        self.require_profile(user_id).await?;
        let owner_id = self.content_owner(content).await?;
        if owner_id == user_id {
            return Err(ServiceError::invalid_argument(
                "cannot like your own content",
            ));
        }

        let like = self.likes.insert(NewLike::new(user_id, content)).await?;
        match content {
            ContentRef::Post(id) => self.content.adjust_post_like_count(id, 1).await?,
            ContentRef::Reel(id) => self.content.adjust_reel_like_count(id, 1).await?,
            ContentRef::Campaign(_) => {}
        }
        self.enqueue(NotificationEvent::ContentLiked {
            actor_id: user_id,
            owner_id,
            content,
        })
        .await;
        Ok(like)
    }

    /// Removes a like. No notification is produced for the reversal.
    pub async fn unlike_content(&self, user_id: i64, content: ContentRef) -> ServiceResult<()> {
        let removed = self.likes.delete(user_id, content).await?;
        if !removed {
            return Err(ServiceError::not_found("like"));
        }
        match content {
            ContentRef::Post(id) => self.content.adjust_post_like_count(id, -1).await?,
            ContentRef::Reel(id) => self.content.adjust_reel_like_count(id, -1).await?,
            ContentRef::Campaign(_) => {}
        }
        Ok(())
    }

    /// Campaigns store no denormalized like counter; the count is always a
    /// live query against the like rows.
    pub async fn campaign_like_count(&self, campaign_id: i64) -> ServiceResult<i64> {
        self.campaigns
            .get_campaign(campaign_id)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("campaign {}", campaign_id)))?;
        self.likes.count_for(ContentRef::Campaign(campaign_id)).await
    }

    /// Creates a comment, bumping the target's comment counter and, for a
    /// reply, the parent comment's reply counter. A dangling parent id is
    /// tolerated: the comment is still created and the notification falls
    /// back to the content owner.
    pub async fn create_comment(&self, new: NewComment) -> ServiceResult<Comment> {
        self.require_profile(new.author_id).await?;
        let owner_id = self.content_owner(new.target).await?;

        let parent = match new.parent_comment_id {
            Some(parent_id) => {
                let found = self.content.get_comment(parent_id).await?;
                if found.is_none() {
                    warn!(parent_id, "parent comment is gone, keeping the reply anyway");
                }
                found
            }
            None => None,
        };
        if let Some(parent) = &parent {
            if parent.target != new.target {
                return Err(ServiceError::invalid_argument(
                    "parent comment belongs to a different target",
                ));
            }
        }

        let comment = self.content.create_comment(new).await?;
        match comment.target {
            ContentRef::Post(id) => self.content.adjust_post_comment_count(id, 1).await?,
            ContentRef::Reel(id) => self.content.adjust_reel_comment_count(id, 1).await?,
            ContentRef::Campaign(_) => {}
        }
        if let Some(parent) = &parent {
            if let Err(e) = self.content.adjust_comment_reply_count(parent.id, 1).await {
                warn!(parent_id = parent.id, "failed to bump reply count: {}", e);
            }
        }

        let recipient_id = parent.as_ref().map(|p| p.author_id).unwrap_or(owner_id);
        self.enqueue(NotificationEvent::CommentAdded {
            actor_id: comment.author_id,
            recipient_id,
            content: comment.target,
            comment_id: comment.id,
            is_reply: parent.is_some(),
        })
        .await;
        Ok(comment)
    }

    /// Soft-deletes a comment. Author-only; the document stays behind with
    /// `is_deleted` set so existing reply chains keep their anchor.
    pub async fn delete_comment(&self, user_id: i64, comment_id: i64) -> ServiceResult<()> {
        let comment = self
            .content
            .get_comment(comment_id)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("comment {}", comment_id)))?;
        if comment.author_id != user_id {
            return Err(ServiceError::unauthorized(
                "only the author can delete a comment",
            ));
        }
        if comment.is_deleted {
            return Err(ServiceError::invalid_state("comment is already deleted"));
        }

        self.content.soft_delete_comment(comment_id).await?;
        match comment.target {
            ContentRef::Post(id) => self.content.adjust_post_comment_count(id, -1).await?,
            ContentRef::Reel(id) => self.content.adjust_reel_comment_count(id, -1).await?,
            ContentRef::Campaign(_) => {}
        }
        if let Some(parent_id) = comment.parent_comment_id {
            if let Err(e) = self.content.adjust_comment_reply_count(parent_id, -1).await {
                warn!(parent_id, "failed to drop reply count: {}", e);
            }
        }
        Ok(())
    }

    /// Comment likes are a bare counter on the document: no Like row, no
    /// duplicate detection, and no notification. Decrements clamp at zero.
    pub async fn like_comment(&self, comment_id: i64) -> ServiceResult<()> {
        self.require_live_comment(comment_id).await?;
        self.content.adjust_comment_like_count(comment_id, 1).await
    }

    pub async fn unlike_comment(&self, comment_id: i64) -> ServiceResult<()> {
        self.require_live_comment(comment_id).await?;
        self.content.adjust_comment_like_count(comment_id, -1).await
    }

    pub async fn list_comments(
        &self,
        target: ContentRef,
        limit: i64,
        offset: i64,
    ) -> ServiceResult<Vec<Comment>> {
        self.content.list_comments(target, limit, offset).await
    }

    /// Resolves who owns the referenced content, proving it exists along the
    /// way.
    async fn content_owner(&self, content: ContentRef) -> ServiceResult<i64> {
        match content {
            ContentRef::Post(id) => Ok(self
                .content
                .get_post(id)
                .await?
                .ok_or_else(|| ServiceError::not_found(format!("post {}", id)))?
                .author_id),
            ContentRef::Reel(id) => Ok(self
                .content
                .get_reel(id)
                .await?
                .ok_or_else(|| ServiceError::not_found(format!("reel {}", id)))?
                .author_id),
            ContentRef::Campaign(id) => Ok(self
                .campaigns
                .get_campaign(id)
                .await?
                .ok_or_else(|| ServiceError::not_found(format!("campaign {}", id)))?
                .creator_id),
        }
    }

    async fn require_live_comment(&self, comment_id: i64) -> ServiceResult<()> {
        let comment = self
            .content
            .get_comment(comment_id)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("comment {}", comment_id)))?;
        if comment.is_deleted {
            return Err(ServiceError::not_found(format!("comment {}", comment_id)));
        }
        Ok(())
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

    fn comment_on(author_id: i64, target: ContentRef) -> NewComment {
        NewComment {
            author_id,
            target,
            parent_comment_id: None,
            body: "great shot".to_string(),
        }
    }

    #[tokio::test]
    async fn creating_a_post_bumps_the_author_counter() {
        let app = TestApp::new();
        let ada = app.profile("ada").await;
        app.post(ada).await;
        app.post(ada).await;
        assert_eq!(app.posts_count(ada).await, 2);

        let err = app
            .engagement
            .create_post(NewPost {
                author_id: 99,
                caption: "ghost".into(),
                media_urls: vec![],
                is_public: true,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn self_like_is_rejected() {
        let app = TestApp::new();
        let ada = app.profile("ada").await;
        let post = app.post(ada).await;
        let err = app
            .engagement
            .like_content(ada, ContentRef::Post(post.id))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidArgument(_)));
        assert_eq!(app.engagement.get_post(post.id).await.unwrap().likes_count, 0);
    }

    #[tokio::test]
    async fn liking_missing_content_is_not_found() {
        let app = TestApp::new();
        let grace = app.profile("grace").await;
        let err = app
            .engagement
            .like_content(grace, ContentRef::Post(404))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn liking_bumps_the_counter_and_notifies_the_owner() {
        let app = TestApp::new();
        let ada = app.profile("ada").await;
        let grace = app.profile("grace").await;
        let post = app.post(ada).await;

        app.engagement
            .like_content(grace, ContentRef::Post(post.id))
            .await
            .unwrap();
        assert_eq!(app.engagement.get_post(post.id).await.unwrap().likes_count, 1);

        assert_eq!(app.drain().await, 1);
        let inbox = app.inbox(ada).await;
        assert_eq!(inbox[0].message, "grace liked your post");
    }

    #[tokio::test]
    async fn duplicate_like_is_rejected() {
        let app = TestApp::new();
        let ada = app.profile("ada").await;
        let grace = app.profile("grace").await;
        let reel = app.reel(ada).await;

        app.engagement
            .like_content(grace, ContentRef::Reel(reel.id))
            .await
            .unwrap();
        let err = app
            .engagement
            .like_content(grace, ContentRef::Reel(reel.id))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::AlreadyExists(_)));
        assert_eq!(app.engagement.get_reel(reel.id).await.unwrap().likes_count, 1);
    }

    #[tokio::test]
    async fn unliking_restores_the_counter_and_missing_like_is_not_found() {
        let app = TestApp::new();
        let ada = app.profile("ada").await;
        let grace = app.profile("grace").await;
        let post = app.post(ada).await;

        app.engagement
            .like_content(grace, ContentRef::Post(post.id))
            .await
            .unwrap();
        app.engagement
            .unlike_content(grace, ContentRef::Post(post.id))
            .await
            .unwrap();
        assert_eq!(app.engagement.get_post(post.id).await.unwrap().likes_count, 0);

        let err = app
            .engagement
            .unlike_content(grace, ContentRef::Post(post.id))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn campaign_likes_are_counted_by_query() {
        let app = TestApp::new();
        let ada = app.profile("ada").await;
        let grace = app.profile("grace").await;
        let henry = app.profile("henry").await;
        let campaign = app.active_campaign(ada, 1000).await;

        app.engagement
            .like_content(grace, ContentRef::Campaign(campaign.id))
            .await
            .unwrap();
        app.engagement
            .like_content(henry, ContentRef::Campaign(campaign.id))
            .await
            .unwrap();
        assert_eq!(
            app.engagement.campaign_like_count(campaign.id).await.unwrap(),
            2
        );

        // Creators cannot like their own campaign either.
        let err = app
            .engagement
            .like_content(ada, ContentRef::Campaign(campaign.id))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn commenting_bumps_the_count_and_notifies_the_owner() {
        let app = TestApp::new();
        let ada = app.profile("ada").await;
        let grace = app.profile("grace").await;
        let post = app.post(ada).await;

        app.engagement
            .create_comment(comment_on(grace, ContentRef::Post(post.id)))
            .await
            .unwrap();
        assert_eq!(
            app.engagement.get_post(post.id).await.unwrap().comments_count,
            1
        );

        app.drain().await;
        let inbox = app.inbox(ada).await;
        assert_eq!(inbox[0].message, "grace commented on your post");
    }

    #[tokio::test]
    async fn replies_notify_the_parent_author_and_bump_reply_count() {
        let app = TestApp::new();
        let ada = app.profile("ada").await;
        let grace = app.profile("grace").await;
        let henry = app.profile("henry").await;
        let post = app.post(ada).await;

        let parent = app
            .engagement
            .create_comment(comment_on(grace, ContentRef::Post(post.id)))
            .await
            .unwrap();
        app.engagement
            .create_comment(NewComment {
                author_id: henry,
                target: ContentRef::Post(post.id),
                parent_comment_id: Some(parent.id),
                body: "agreed".to_string(),
            })
            .await
            .unwrap();

        let parent = app.content.get_comment(parent.id).await.unwrap().unwrap();
        assert_eq!(parent.reply_count, 1);
        assert_eq!(
            app.engagement.get_post(post.id).await.unwrap().comments_count,
            2
        );

        assert_eq!(app.drain().await, 2);
        let inbox = app.inbox(grace).await;
        assert_eq!(inbox[0].message, "henry replied to your comment");
    }

    #[tracing_test::traced_test]
    #[tokio::test]
    async fn a_dangling_parent_falls_back_to_the_content_owner() {
        let app = TestApp::new();
        let ada = app.profile("ada").await;
        let grace = app.profile("grace").await;
        let post = app.post(ada).await;

        let comment = app
            .engagement
            .create_comment(NewComment {
                author_id: grace,
                target: ContentRef::Post(post.id),
                parent_comment_id: Some(999),
                body: "hello?".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(comment.parent_comment_id, Some(999));
        assert_eq!(
            app.engagement.get_post(post.id).await.unwrap().comments_count,
            1
        );
        assert!(logs_contain("parent comment is gone"));

        app.drain().await;
        let inbox = app.inbox(ada).await;
        assert_eq!(inbox[0].message, "grace commented on your post");
    }

    #[tokio::test]
    async fn the_parent_must_belong_to_the_same_target() {
        let app = TestApp::new();
        let ada = app.profile("ada").await;
        let grace = app.profile("grace").await;
        let first = app.post(ada).await;
        let second = app.post(ada).await;

        let parent = app
            .engagement
            .create_comment(comment_on(grace, ContentRef::Post(first.id)))
            .await
            .unwrap();
        let err = app
            .engagement
            .create_comment(NewComment {
                author_id: grace,
                target: ContentRef::Post(second.id),
                parent_comment_id: Some(parent.id),
                body: "lost reply".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn deleting_a_comment_is_author_only_and_reverses_the_counters() {
        let app = TestApp::new();
        let ada = app.profile("ada").await;
        let grace = app.profile("grace").await;
        let henry = app.profile("henry").await;
        let post = app.post(ada).await;

        let parent = app
            .engagement
            .create_comment(comment_on(grace, ContentRef::Post(post.id)))
            .await
            .unwrap();
        let reply = app
            .engagement
            .create_comment(NewComment {
                author_id: henry,
                target: ContentRef::Post(post.id),
                parent_comment_id: Some(parent.id),
                body: "same".to_string(),
            })
            .await
            .unwrap();

        let err = app
            .engagement
            .delete_comment(grace, reply.id)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Unauthorized(_)));

        app.engagement.delete_comment(henry, reply.id).await.unwrap();
        assert_eq!(
            app.engagement.get_post(post.id).await.unwrap().comments_count,
            1
        );
        let parent = app.content.get_comment(parent.id).await.unwrap().unwrap();
        assert_eq!(parent.reply_count, 0);

        let err = app
            .engagement
            .delete_comment(henry, reply.id)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidState(_)));
    }

    #[tokio::test]
    async fn comment_likes_skip_dedup_and_clamp_at_zero() {
        let app = TestApp::new();
        let ada = app.profile("ada").await;
        let grace = app.profile("grace").await;
        let post = app.post(ada).await;
        let comment = app
            .engagement
            .create_comment(comment_on(grace, ContentRef::Post(post.id)))
            .await
            .unwrap();

        app.engagement.like_comment(comment.id).await.unwrap();
        app.engagement.like_comment(comment.id).await.unwrap();
        let fetched = app.content.get_comment(comment.id).await.unwrap().unwrap();
        assert_eq!(fetched.like_count, 2);

        for _ in 0..3 {
            app.engagement.unlike_comment(comment.id).await.unwrap();
        }
        let fetched = app.content.get_comment(comment.id).await.unwrap().unwrap();
        assert_eq!(fetched.like_count, 0);

        let err = app.engagement.like_comment(404).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }
}
