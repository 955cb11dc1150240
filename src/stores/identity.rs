// Copyright (c) CrowdPulse Team
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use std::sync::Arc;

use crate::db::Database;
use crate::error::{ServiceError, ServiceResult};
use crate::models::profile::{NewProfile, Profile, ProfileRole, UpdateProfile};
use crate::schema::profiles;

/// Profile persistence. Leaf dependency: every other component reads
/// profiles, the social graph engine adjusts the denormalized counts.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    async fn create_profile(&self, new: NewProfile) -> ServiceResult<Profile>;
    async fn get_profile(&self, id: i64) -> ServiceResult<Option<Profile>>;
    /// Partial update: only the provided fields overwrite.
    async fn update_profile(&self, id: i64, changes: UpdateProfile) -> ServiceResult<Profile>;
    /// Clamped at zero on decrement.
    async fn adjust_followers_count(&self, id: i64, delta: i32) -> ServiceResult<()>;
    async fn adjust_following_count(&self, id: i64, delta: i32) -> ServiceResult<()>;
    async fn adjust_posts_count(&self, id: i64, delta: i32) -> ServiceResult<()>;
    async fn suspend(&self, id: i64, until: DateTime<Utc>) -> ServiceResult<()>;
    async fn list_by_role(&self, role: ProfileRole) -> ServiceResult<Vec<Profile>>;
}

/// Postgres-backed identity store.
pub struct PgIdentityStore {
    db: Arc<Database>,
}

impl PgIdentityStore {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Clamped counter arithmetic pushed down to the database so concurrent
    /// adjustments never race through a read-modify-write.
    async fn adjust_count(&self, id: i64, column: &str, delta: i32) -> ServiceResult<()> {
        let mut conn = self.db.get_connection().await?;
        let stmt = format!(
            "UPDATE profiles SET {col} = GREATEST(0, {col} + $1) WHERE id = $2",
            col = column
        );
        diesel::sql_query(stmt)
            .bind::<diesel::sql_types::Int4, _>(delta)
            .bind::<diesel::sql_types::Int8, _>(id)
            .execute(&mut conn)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl IdentityStore for PgIdentityStore {
    async fn create_profile(&self, new: NewProfile) -> ServiceResult<Profile> {
        let mut conn = self.db.get_connection().await?;
        let profile = diesel::insert_into(profiles::table)
            .values(&new)
            .get_result::<Profile>(&mut conn)
            .await
            .map_err(|e| match e {
                diesel::result::Error::DatabaseError(
                    diesel::result::DatabaseErrorKind::UniqueViolation,
                    _,
                ) => ServiceError::already_exists(format!(
                    "username {} is already taken",
                    new.username
                )),
                other => other.into(),
            })?;
        Ok(profile)
    }

    async fn get_profile(&self, id: i64) -> ServiceResult<Option<Profile>> {
        let mut conn = self.db.get_connection().await?;
        let profile = profiles::table
            .find(id)
            .first::<Profile>(&mut conn)
            .await
            .optional()?;
        Ok(profile)
    }

    async fn update_profile(&self, id: i64, changes: UpdateProfile) -> ServiceResult<Profile> {
        // An all-None changeset is a no-op read, not a diesel error.
        if changes.display_name.is_none()
            && changes.bio.is_none()
            && changes.avatar_url.is_none()
            && changes.is_private.is_none()
        {
            return self
                .get_profile(id)
                .await?
                .ok_or_else(|| ServiceError::not_found(format!("profile {}", id)));
        }
        let mut conn = self.db.get_connection().await?;
        let profile = diesel::update(profiles::table.find(id))
            .set(&changes)
            .get_result::<Profile>(&mut conn)
            .await
            .map_err(|e| match e {
                diesel::result::Error::NotFound => {
                    ServiceError::not_found(format!("profile {}", id))
                }
                other => other.into(),
            })?;
        Ok(profile)
    }

    async fn adjust_followers_count(&self, id: i64, delta: i32) -> ServiceResult<()> {
        self.adjust_count(id, "followers_count", delta).await
    }

    async fn adjust_following_count(&self, id: i64, delta: i32) -> ServiceResult<()> {
        self.adjust_count(id, "following_count", delta).await
    }

    async fn adjust_posts_count(&self, id: i64, delta: i32) -> ServiceResult<()> {
        self.adjust_count(id, "posts_count", delta).await
    }

    async fn suspend(&self, id: i64, until: DateTime<Utc>) -> ServiceResult<()> {
        let mut conn = self.db.get_connection().await?;
        diesel::update(profiles::table.find(id))
            .set(profiles::suspended_until.eq(Some(until)))
            .execute(&mut conn)
            .await?;
        Ok(())
    }

    async fn list_by_role(&self, role: ProfileRole) -> ServiceResult<Vec<Profile>> {
        let mut conn = self.db.get_connection().await?;
        let found = profiles::table
            .filter(profiles::role.eq(role))
            .order(profiles::id.asc())
            .load::<Profile>(&mut conn)
            .await?;
        Ok(found)
    }
}
