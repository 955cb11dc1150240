// Copyright (c) CrowdPulse Team
// SPDX-License-Identifier: Apache-2.0

//! Document-store boundary. Posts, reels and comments live in a document
//! database with single-document atomic writes; the trait below is the whole
//! contract the engines rely on. The in-memory implementation stands in for
//! the external document database and backs the tests.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::error::{ServiceError, ServiceResult};
use crate::models::content::{Comment, NewComment, NewPost, NewReel, Post, Reel};
use crate::models::content_ref::ContentRef;

/// Post/Reel/Comment documents with embedded denormalized counters.
///
/// Counter adjustments are atomic per document and clamp at zero on
/// decrement; they are the only mutation path for counters so a missed or
/// replayed adjustment can never corrupt anything beyond the cached count.
#[async_trait]
pub trait ContentStore: Send + Sync {
    async fn create_post(&self, new: NewPost) -> ServiceResult<Post>;
    async fn get_post(&self, id: i64) -> ServiceResult<Option<Post>>;
    async fn remove_post(&self, id: i64) -> ServiceResult<bool>;
    async fn adjust_post_like_count(&self, id: i64, delta: i64) -> ServiceResult<()>;
    async fn adjust_post_comment_count(&self, id: i64, delta: i64) -> ServiceResult<()>;

    async fn create_reel(&self, new: NewReel) -> ServiceResult<Reel>;
    async fn get_reel(&self, id: i64) -> ServiceResult<Option<Reel>>;
    async fn remove_reel(&self, id: i64) -> ServiceResult<bool>;
    async fn adjust_reel_like_count(&self, id: i64, delta: i64) -> ServiceResult<()>;
    async fn adjust_reel_comment_count(&self, id: i64, delta: i64) -> ServiceResult<()>;

    async fn create_comment(&self, new: NewComment) -> ServiceResult<Comment>;
    async fn get_comment(&self, id: i64) -> ServiceResult<Option<Comment>>;
    async fn soft_delete_comment(&self, id: i64) -> ServiceResult<()>;
    async fn adjust_comment_like_count(&self, id: i64, delta: i64) -> ServiceResult<()>;
    async fn adjust_comment_reply_count(&self, id: i64, delta: i64) -> ServiceResult<()>;
    async fn list_comments(
        &self,
        target: ContentRef,
        limit: i64,
        offset: i64,
    ) -> ServiceResult<Vec<Comment>>;
}

#[derive(Default)]
struct ContentState {
    next_id: i64,
    posts: HashMap<i64, Post>,
    reels: HashMap<i64, Reel>,
    comments: HashMap<i64, Comment>,
}

impl ContentState {
    fn allocate_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// In-memory document store.
#[derive(Default)]
pub struct InMemoryContentStore {
    state: RwLock<ContentState>,
}

impl InMemoryContentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn clamped(value: i64, delta: i64) -> i64 {
    (value + delta).max(0)
}

#[async_trait]
impl ContentStore for InMemoryContentStore {
    async fn create_post(&self, new: NewPost) -> ServiceResult<Post> {
        let mut state = self.state.write().await;
        let id = state.allocate_id();
        let now = Utc::now();
        let post = Post {
            id,
            author_id: new.author_id,
            caption: new.caption,
            media_urls: new.media_urls,
            is_public: new.is_public,
            likes_count: 0,
            comments_count: 0,
            shares_count: 0,
            created_at: now,
            updated_at: now,
        };
        state.posts.insert(id, post.clone());
        Ok(post)
    }

    async fn get_post(&self, id: i64) -> ServiceResult<Option<Post>> {
        Ok(self.state.read().await.posts.get(&id).cloned())
    }

    async fn remove_post(&self, id: i64) -> ServiceResult<bool> {
        Ok(self.state.write().await.posts.remove(&id).is_some())
    }

    async fn adjust_post_like_count(&self, id: i64, delta: i64) -> ServiceResult<()> {
        let mut state = self.state.write().await;
        let post = state
            .posts
            .get_mut(&id)
            .ok_or_else(|| ServiceError::not_found(format!("post {}", id)))?;
        post.likes_count = clamped(post.likes_count, delta);
        post.updated_at = Utc::now();
        Ok(())
    }

    async fn adjust_post_comment_count(&self, id: i64, delta: i64) -> ServiceResult<()> {
        let mut state = self.state.write().await;
        let post = state
            .posts
            .get_mut(&id)
            .ok_or_else(|| ServiceError::not_found(format!("post {}", id)))?;
        post.comments_count = clamped(post.comments_count, delta);
        post.updated_at = Utc::now();
        Ok(())
    }

    async fn create_reel(&self, new: NewReel) -> ServiceResult<Reel> {
        let mut state = self.state.write().await;
        let id = state.allocate_id();
        let now = Utc::now();
        let reel = Reel {
            id,
            author_id: new.author_id,
            video_url: new.video_url,
            caption: new.caption,
            duration_seconds: new.duration_seconds,
            likes_count: 0,
            comments_count: 0,
            view_count: 0,
            created_at: now,
            updated_at: now,
        };
        state.reels.insert(id, reel.clone());
        Ok(reel)
    }

    async fn get_reel(&self, id: i64) -> ServiceResult<Option<Reel>> {
        Ok(self.state.read().await.reels.get(&id).cloned())
    }

    async fn remove_reel(&self, id: i64) -> ServiceResult<bool> {
        Ok(self.state.write().await.reels.remove(&id).is_some())
    }

    async fn adjust_reel_like_count(&self, id: i64, delta: i64) -> ServiceResult<()> {
        let mut state = self.state.write().await;
        let reel = state
            .reels
            .get_mut(&id)
            .ok_or_else(|| ServiceError::not_found(format!("reel {}", id)))?;
        reel.likes_count = clamped(reel.likes_count, delta);
        reel.updated_at = Utc::now();
        Ok(())
    }

    async fn adjust_reel_comment_count(&self, id: i64, delta: i64) -> ServiceResult<()> {
        let mut state = self.state.write().await;
        let reel = state
            .reels
            .get_mut(&id)
            .ok_or_else(|| ServiceError::not_found(format!("reel {}", id)))?;
        reel.comments_count = clamped(reel.comments_count, delta);
        reel.updated_at = Utc::now();
        Ok(())
    }

    async fn create_comment(&self, new: NewComment) -> ServiceResult<Comment> {
        let mut state = self.state.write().await;
        let id = state.allocate_id();
        let now = Utc::now();
        let comment = Comment {
            id,
            author_id: new.author_id,
            target: new.target,
            parent_comment_id: new.parent_comment_id,
            body: new.body,
            like_count: 0,
            reply_count: 0,
            is_deleted: false,
            created_at: now,
            updated_at: now,
        };
        state.comments.insert(id, comment.clone());
        Ok(comment)
    }

    async fn get_comment(&self, id: i64) -> ServiceResult<Option<Comment>> {
        Ok(self.state.read().await.comments.get(&id).cloned())
    }

    async fn soft_delete_comment(&self, id: i64) -> ServiceResult<()> {
        let mut state = self.state.write().await;
        let comment = state
            .comments
            .get_mut(&id)
            .ok_or_else(|| ServiceError::not_found(format!("comment {}", id)))?;
        comment.is_deleted = true;
        comment.updated_at = Utc::now();
        Ok(())
    }

    async fn adjust_comment_like_count(&self, id: i64, delta: i64) -> ServiceResult<()> {
        let mut state = self.state.write().await;
        let comment = state
            .comments
            .get_mut(&id)
            .ok_or_else(|| ServiceError::not_found(format!("comment {}", id)))?;
        comment.like_count = clamped(comment.like_count, delta);
        comment.updated_at = Utc::now();
        Ok(())
    }

    async fn adjust_comment_reply_count(&self, id: i64, delta: i64) -> ServiceResult<()> {
        let mut state = self.state.write().await;
        let comment = state
            .comments
            .get_mut(&id)
            .ok_or_else(|| ServiceError::not_found(format!("comment {}", id)))?;
        comment.reply_count = clamped(comment.reply_count, delta);
        comment.updated_at = Utc::now();
        Ok(())
    }

    async fn list_comments(
        &self,
        target: ContentRef,
        limit: i64,
        offset: i64,
    ) -> ServiceResult<Vec<Comment>> {
        let state = self.state.read().await;
        let mut found: Vec<Comment> = state
            .comments
            .values()
            .filter(|c| c.target == target && !c.is_deleted)
            .cloned()
            .collect();
        found.sort_by_key(|c| c.id);
        Ok(found
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(author_id: i64) -> NewPost {
        NewPost {
            author_id,
            caption: "sunset".to_string(),
            media_urls: vec![],
            is_public: true,
        }
    }

    #[tokio::test]
    async fn counter_adjustments_clamp_at_zero() {
        let store = InMemoryContentStore::new();
        let created = store.create_post(post(1)).await.unwrap();

        store.adjust_post_like_count(created.id, 2).await.unwrap();
        store.adjust_post_like_count(created.id, -5).await.unwrap();

        let fetched = store.get_post(created.id).await.unwrap().unwrap();
        assert_eq!(fetched.likes_count, 0);
    }

    #[tokio::test]
    async fn soft_delete_keeps_the_document() {
        let store = InMemoryContentStore::new();
        let comment = store
            .create_comment(NewComment {
                author_id: 2,
                target: ContentRef::Post(10),
                parent_comment_id: None,
                body: "nice".to_string(),
            })
            .await
            .unwrap();

        store.soft_delete_comment(comment.id).await.unwrap();

        let fetched = store.get_comment(comment.id).await.unwrap().unwrap();
        assert!(fetched.is_deleted);
        assert!(store
            .list_comments(ContentRef::Post(10), 10, 0)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn adjusting_a_missing_document_reports_not_found() {
        let store = InMemoryContentStore::new();
        let err = store.adjust_post_like_count(99, 1).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }
}
