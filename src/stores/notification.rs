// Copyright (c) CrowdPulse Team
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use std::sync::Arc;

use crate::db::Database;
use crate::error::{ServiceError, ServiceResult};
use crate::models::notification::{
    NewNotification, NewOutboxEntry, Notification, OutboxEntry, OutboxStatus,
};
use crate::notifications::event::NotificationEvent;
use crate::schema::{notification_outbox, notifications};

/// Outbox plus delivered-notification persistence.
///
/// Engines append intents with `enqueue` after their authoritative write; the
/// dispatch worker drains them with `fetch_pending` and records the outcome.
/// Entries are fetched in insertion order so notifications for one entity are
/// delivered in the order the actions happened.
#[async_trait]
pub trait NotificationStore: Send + Sync {
    async fn enqueue(&self, event: &NotificationEvent) -> ServiceResult<i64>;
    async fn fetch_pending(&self, limit: i64, max_attempts: i32) -> ServiceResult<Vec<OutboxEntry>>;
    async fn mark_dispatched(&self, id: i64) -> ServiceResult<()>;
    /// Bumps the attempt counter and records the error; flips the entry to
    /// FAILED once `max_attempts` is exhausted.
    async fn record_failure(&self, id: i64, error: &str, max_attempts: i32) -> ServiceResult<()>;

    async fn insert_notification(&self, new: NewNotification) -> ServiceResult<Notification>;
    async fn list_for_recipient(
        &self,
        recipient_id: i64,
        limit: i64,
        offset: i64,
    ) -> ServiceResult<Vec<Notification>>;
    async fn unread_count(&self, recipient_id: i64) -> ServiceResult<i64>;
    async fn mark_read(&self, id: i64, recipient_id: i64) -> ServiceResult<bool>;
    async fn mark_all_read(&self, recipient_id: i64) -> ServiceResult<usize>;
}

pub struct PgNotificationStore {
    db: Arc<Database>,
}

impl PgNotificationStore {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl NotificationStore for PgNotificationStore {
    async fn enqueue(&self, event: &NotificationEvent) -> ServiceResult<i64> {
        let payload = serde_json::to_value(event)
            .map_err(|e| ServiceError::database(format!("serialize outbox event: {}", e)))?;
        let mut conn = self.db.get_connection().await?;
        let entry = diesel::insert_into(notification_outbox::table)
            .values(&NewOutboxEntry {
                event: payload,
                status: OutboxStatus::Pending,
            })
            .get_result::<OutboxEntry>(&mut conn)
            .await?;
        Ok(entry.id)
    }

    async fn fetch_pending(&self, limit: i64, max_attempts: i32) -> ServiceResult<Vec<OutboxEntry>> {
        let mut conn = self.db.get_connection().await?;
        let pending = notification_outbox::table
            .filter(notification_outbox::status.eq(OutboxStatus::Pending))
            .filter(notification_outbox::attempts.lt(max_attempts))
            .order(notification_outbox::id.asc())
            .limit(limit)
            .load::<OutboxEntry>(&mut conn)
            .await?;
        Ok(pending)
    }

    async fn mark_dispatched(&self, id: i64) -> ServiceResult<()> {
        let mut conn = self.db.get_connection().await?;
        diesel::update(notification_outbox::table.find(id))
            .set((
                notification_outbox::status.eq(OutboxStatus::Dispatched),
                notification_outbox::dispatched_at.eq(Utc::now()),
            ))
            .execute(&mut conn)
            .await?;
        Ok(())
    }

    async fn record_failure(&self, id: i64, error: &str, max_attempts: i32) -> ServiceResult<()> {
        let mut conn = self.db.get_connection().await?;
        let entry = diesel::update(notification_outbox::table.find(id))
            .set((
                notification_outbox::attempts.eq(notification_outbox::attempts + 1),
                notification_outbox::last_error.eq(error),
            ))
            .get_result::<OutboxEntry>(&mut conn)
            .await
            .map_err(|e| match e {
                diesel::result::Error::NotFound => {
                    ServiceError::not_found(format!("outbox entry {}", id))
                }
                other => other.into(),
            })?;
        if entry.attempts >= max_attempts {
            diesel::update(notification_outbox::table.find(id))
                .set(notification_outbox::status.eq(OutboxStatus::Failed))
                .execute(&mut conn)
                .await?;
        }
        Ok(())
    }

    async fn insert_notification(&self, new: NewNotification) -> ServiceResult<Notification> {
        let mut conn = self.db.get_connection().await?;
        let notification = diesel::insert_into(notifications::table)
            .values(&new)
            .get_result::<Notification>(&mut conn)
            .await?;
        Ok(notification)
    }

    async fn list_for_recipient(
        &self,
        recipient_id: i64,
        limit: i64,
        offset: i64,
    ) -> ServiceResult<Vec<Notification>> {
        let mut conn = self.db.get_connection().await?;
        let found = notifications::table
            .filter(notifications::recipient_id.eq(recipient_id))
            .order(notifications::created_at.desc())
            .limit(limit)
            .offset(offset)
            .load::<Notification>(&mut conn)
            .await?;
        Ok(found)
    }

    async fn unread_count(&self, recipient_id: i64) -> ServiceResult<i64> {
        let mut conn = self.db.get_connection().await?;
        let count = notifications::table
            .filter(notifications::recipient_id.eq(recipient_id))
            .filter(notifications::is_read.eq(false))
            .count()
            .get_result::<i64>(&mut conn)
            .await?;
        Ok(count)
    }

    async fn mark_read(&self, id: i64, recipient_id: i64) -> ServiceResult<bool> {
        let mut conn = self.db.get_connection().await?;
        let changed = diesel::update(
            notifications::table
                .find(id)
                .filter(notifications::recipient_id.eq(recipient_id))
                .filter(notifications::is_read.eq(false)),
        )
        .set((
            notifications::is_read.eq(true),
            notifications::read_at.eq(Utc::now()),
        ))
        .execute(&mut conn)
        .await?;
        Ok(changed > 0)
    }

    async fn mark_all_read(&self, recipient_id: i64) -> ServiceResult<usize> {
        let mut conn = self.db.get_connection().await?;
        let changed = diesel::update(
            notifications::table
                .filter(notifications::recipient_id.eq(recipient_id))
                .filter(notifications::is_read.eq(false)),
        )
        .set((
            notifications::is_read.eq(true),
            notifications::read_at.eq(Utc::now()),
        ))
        .execute(&mut conn)
        .await?;
        Ok(changed)
    }
}
