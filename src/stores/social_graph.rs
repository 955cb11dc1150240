// Copyright (c) CrowdPulse Team
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use std::sync::Arc;

use crate::db::Database;
use crate::error::{ServiceError, ServiceResult};
use crate::models::content_ref::ContentRef;
use crate::models::follow::{Follow, FollowStatus, NewFollow};
use crate::models::like::{Like, NewLike};
use crate::schema::{follows, likes};

/// Follow edge persistence. One row per ordered (follower, following) pair.
#[async_trait]
pub trait FollowStore: Send + Sync {
    async fn get(&self, follower_id: i64, following_id: i64) -> ServiceResult<Option<Follow>>;
    async fn insert(&self, new: NewFollow) -> ServiceResult<Follow>;
    async fn set_status(
        &self,
        follower_id: i64,
        following_id: i64,
        status: FollowStatus,
    ) -> ServiceResult<Follow>;
    /// Returns true when an edge was actually removed.
    async fn delete(&self, follower_id: i64, following_id: i64) -> ServiceResult<bool>;
    async fn count_active_followers(&self, profile_id: i64) -> ServiceResult<i64>;
    async fn count_active_following(&self, profile_id: i64) -> ServiceResult<i64>;
    async fn list_followers(
        &self,
        profile_id: i64,
        limit: i64,
        offset: i64,
    ) -> ServiceResult<Vec<Follow>>;
    async fn list_following(
        &self,
        profile_id: i64,
        limit: i64,
        offset: i64,
    ) -> ServiceResult<Vec<Follow>>;
}

/// Like edge persistence, polymorphic over post/reel/campaign targets.
#[async_trait]
pub trait LikeStore: Send + Sync {
    async fn find(&self, user_id: i64, content: ContentRef) -> ServiceResult<Option<Like>>;
    async fn insert(&self, new: NewLike) -> ServiceResult<Like>;
    /// Returns true when a like was actually removed.
    async fn delete(&self, user_id: i64, content: ContentRef) -> ServiceResult<bool>;
    /// Authoritative like count derived from the edge set.
    async fn count_for(&self, content: ContentRef) -> ServiceResult<i64>;
}

pub struct PgFollowStore {
    db: Arc<Database>,
}

impl PgFollowStore {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl FollowStore for PgFollowStore {
    async fn get(&self, follower_id: i64, following_id: i64) -> ServiceResult<Option<Follow>> {
        let mut conn = self.db.get_connection().await?;
        let edge = follows::table
            .filter(follows::follower_id.eq(follower_id))
            .filter(follows::following_id.eq(following_id))
            .first::<Follow>(&mut conn)
            .await
            .optional()?;
        Ok(edge)
    }

    async fn insert(&self, new: NewFollow) -> ServiceResult<Follow> {
        let mut conn = self.db.get_connection().await?;
        let edge = diesel::insert_into(follows::table)
            .values(&new)
            .get_result::<Follow>(&mut conn)
            .await
            .map_err(|e| match e {
                diesel::result::Error::DatabaseError(
                    diesel::result::DatabaseErrorKind::UniqueViolation,
                    _,
                ) => ServiceError::already_exists("follow relationship already exists"),
                other => other.into(),
            })?;
        Ok(edge)
    }

    async fn set_status(
        &self,
        follower_id: i64,
        following_id: i64,
        status: FollowStatus,
    ) -> ServiceResult<Follow> {
        let mut conn = self.db.get_connection().await?;
        let edge = diesel::update(
            follows::table
                .filter(follows::follower_id.eq(follower_id))
                .filter(follows::following_id.eq(following_id)),
        )
        .set((follows::status.eq(status), follows::updated_at.eq(Utc::now())))
        .get_result::<Follow>(&mut conn)
        .await
        .map_err(|e| match e {
            diesel::result::Error::NotFound => ServiceError::not_found("follow relationship"),
            other => other.into(),
        })?;
        Ok(edge)
    }

    async fn delete(&self, follower_id: i64, following_id: i64) -> ServiceResult<bool> {
        let mut conn = self.db.get_connection().await?;
        let removed = diesel::delete(
            follows::table
                .filter(follows::follower_id.eq(follower_id))
                .filter(follows::following_id.eq(following_id)),
        )
        .execute(&mut conn)
        .await?;
        Ok(removed > 0)
    }

    async fn count_active_followers(&self, profile_id: i64) -> ServiceResult<i64> {
        let mut conn = self.db.get_connection().await?;
        let count = follows::table
            .filter(follows::following_id.eq(profile_id))
            .filter(follows::status.eq(FollowStatus::Active))
            .count()
            .get_result::<i64>(&mut conn)
            .await?;
        Ok(count)
    }

    async fn count_active_following(&self, profile_id: i64) -> ServiceResult<i64> {
        let mut conn = self.db.get_connection().await?;
        let count = follows::table
            .filter(follows::follower_id.eq(profile_id))
            .filter(follows::status.eq(FollowStatus::Active))
            .count()
            .get_result::<i64>(&mut conn)
            .await?;
        Ok(count)
    }

    async fn list_followers(
        &self,
        profile_id: i64,
        limit: i64,
        offset: i64,
    ) -> ServiceResult<Vec<Follow>> {
        let mut conn = self.db.get_connection().await?;
        let edges = follows::table
            .filter(follows::following_id.eq(profile_id))
            .filter(follows::status.eq(FollowStatus::Active))
            .order(follows::created_at.desc())
            .limit(limit)
            .offset(offset)
            .load::<Follow>(&mut conn)
            .await?;
        Ok(edges)
    }

    async fn list_following(
        &self,
        profile_id: i64,
        limit: i64,
        offset: i64,
    ) -> ServiceResult<Vec<Follow>> {
        let mut conn = self.db.get_connection().await?;
        let edges = follows::table
            .filter(follows::follower_id.eq(profile_id))
            .filter(follows::status.eq(FollowStatus::Active))
            .order(follows::created_at.desc())
            .limit(limit)
            .offset(offset)
            .load::<Follow>(&mut conn)
            .await?;
        Ok(edges)
    }
}

pub struct PgLikeStore {
    db: Arc<Database>,
}

impl PgLikeStore {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl LikeStore for PgLikeStore {
    async fn find(&self, user_id: i64, content: ContentRef) -> ServiceResult<Option<Like>> {
        let mut conn = self.db.get_connection().await?;
        let like = likes::table
            .filter(likes::user_id.eq(user_id))
            .filter(likes::content_type.eq(content.kind()))
            .filter(likes::content_id.eq(content.id()))
            .first::<Like>(&mut conn)
            .await
            .optional()?;
        Ok(like)
    }

    async fn insert(&self, new: NewLike) -> ServiceResult<Like> {
        let mut conn = self.db.get_connection().await?;
        let like = diesel::insert_into(likes::table)
            .values(&new)
            .get_result::<Like>(&mut conn)
            .await
            .map_err(|e| match e {
                diesel::result::Error::DatabaseError(
                    diesel::result::DatabaseErrorKind::UniqueViolation,
                    _,
                ) => ServiceError::already_exists("content already liked"),
                other => other.into(),
            })?;
        Ok(like)
    }

    async fn delete(&self, user_id: i64, content: ContentRef) -> ServiceResult<bool> {
        let mut conn = self.db.get_connection().await?;
        let removed = diesel::delete(
            likes::table
                .filter(likes::user_id.eq(user_id))
                .filter(likes::content_type.eq(content.kind()))
                .filter(likes::content_id.eq(content.id())),
        )
        .execute(&mut conn)
        .await?;
        Ok(removed > 0)
    }

    async fn count_for(&self, content: ContentRef) -> ServiceResult<i64> {
        let mut conn = self.db.get_connection().await?;
        let count = likes::table
            .filter(likes::content_type.eq(content.kind()))
            .filter(likes::content_id.eq(content.id()))
            .count()
            .get_result::<i64>(&mut conn)
            .await?;
        Ok(count)
    }
}
