// Copyright (c) CrowdPulse Team
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::{debug, error, info, warn};

use crate::config::DispatcherConfig;
use crate::error::ServiceResult;
use crate::metrics;
use crate::notifications::dispatcher::NotificationDispatcher;
use crate::notifications::event::NotificationEvent;
use crate::stores::NotificationStore;

/// Polls the outbox and hands pending events to the dispatcher.
///
/// A failed dispatch leaves the entry pending with its attempt counter
/// bumped; the entry is retried on later polls until `max_attempts` is
/// exhausted, at which point it is parked as FAILED. A payload that no longer
/// deserializes is undeliverable and burns its attempts the same way.
pub struct DispatcherWorker {
    dispatcher: Arc<NotificationDispatcher>,
    outbox: Arc<dyn NotificationStore>,
    poll_interval: Duration,
    batch_size: i64,
    max_attempts: i32,
}

impl DispatcherWorker {
    pub fn new(
        dispatcher: Arc<NotificationDispatcher>,
        outbox: Arc<dyn NotificationStore>,
        config: &DispatcherConfig,
    ) -> Self {
        Self {
            dispatcher,
            outbox,
            poll_interval: Duration::from_millis(config.poll_interval_ms),
            batch_size: config.batch_size,
            max_attempts: config.max_attempts,
        }
    }

    /// Processes one batch of pending entries. Returns how many entries were
    /// dispatched; entries that failed stay behind for the next poll.
    pub async fn drain_once(&self) -> ServiceResult<usize> {
        let pending = self
            .outbox
            .fetch_pending(self.batch_size, self.max_attempts)
            .await?;
        let mut dispatched = 0;
        for entry in pending {
            match serde_json::from_value::<NotificationEvent>(entry.event.clone()) {
                Ok(event) => match self.dispatcher.dispatch(&event).await {
                    Ok(delivered) => {
                        self.outbox.mark_dispatched(entry.id).await?;
                        metrics::OUTBOX_DISPATCHED.inc();
                        metrics::NOTIFICATIONS_DELIVERED.inc_by(delivered as u64);
                        dispatched += 1;
                    }
                    Err(e) => {
                        warn!(entry_id = entry.id, "dispatch failed: {}", e);
                        metrics::OUTBOX_FAILURES.inc();
                        self.outbox
                            .record_failure(entry.id, &e.to_string(), self.max_attempts)
                            .await?;
                    }
                },
                Err(e) => {
                    error!(entry_id = entry.id, "undeliverable outbox payload: {}", e);
                    metrics::OUTBOX_FAILURES.inc();
                    self.outbox
                        .record_failure(
                            entry.id,
                            &format!("undeliverable payload: {}", e),
                            self.max_attempts,
                        )
                        .await?;
                }
            }
        }
        Ok(dispatched)
    }

    /// Runs until the shutdown channel fires. The final drain before exit
    /// flushes whatever the last actions enqueued.
    pub async fn run(self, mut shutdown: oneshot::Receiver<()>) {
        info!(
            poll_interval_ms = self.poll_interval.as_millis() as u64,
            batch_size = self.batch_size,
            "notification dispatcher started"
        );
        let mut ticker = tokio::time::interval(self.poll_interval);
        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    if let Err(e) = self.drain_once().await {
                        error!("final outbox drain failed: {}", e);
                    }
                    info!("notification dispatcher shut down");
                    break;
                }
                _ = ticker.tick() => {
                    match self.drain_once().await {
                        Ok(0) => {}
                        Ok(n) => debug!(dispatched = n, "outbox drained"),
                        Err(e) => error!("outbox drain failed: {}", e),
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::notification::OutboxStatus;
    use crate::models::profile::{NewProfile, ProfileRole};
    use crate::stores::{
        IdentityStore, InMemoryCampaignStore, InMemoryIdentityStore, InMemoryNotificationStore,
    };
    use tokio_test::assert_ok;

    fn worker_fixture() -> (
        Arc<InMemoryIdentityStore>,
        Arc<InMemoryNotificationStore>,
        DispatcherWorker,
    ) {
        let identity = Arc::new(InMemoryIdentityStore::new());
        let campaigns = Arc::new(InMemoryCampaignStore::new());
        let notifications = Arc::new(InMemoryNotificationStore::new());
        let dispatcher = Arc::new(NotificationDispatcher::new(
            identity.clone(),
            campaigns,
            notifications.clone(),
        ));
        let config = DispatcherConfig {
            poll_interval_ms: 10,
            batch_size: 50,
            max_attempts: 3,
        };
        let worker = DispatcherWorker::new(dispatcher, notifications.clone(), &config);
        (identity, notifications, worker)
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

    #[test_log::test(tokio::test)]
    async fn drain_marks_entries_dispatched_and_delivers() {
        let (identity, notifications, worker) = worker_fixture();
        let ada = identity.create_profile(profile("ada")).await.unwrap();
        let grace = identity.create_profile(profile("grace")).await.unwrap();
        notifications
            .enqueue(&NotificationEvent::FollowerAdded {
                follower_id: ada.id,
                target_id: grace.id,
            })
            .await
            .unwrap();

        assert_eq!(worker.drain_once().await.unwrap(), 1);
        assert_eq!(notifications.unread_count(grace.id).await.unwrap(), 1);
        let entries = notifications.all_outbox_entries().await;
        assert_eq!(entries[0].status, OutboxStatus::Dispatched);
        assert!(entries[0].dispatched_at.is_some());

        // A second drain finds nothing.
        assert_eq!(worker.drain_once().await.unwrap(), 0);
    }

    #[test_log::test(tokio::test)]
    async fn undeliverable_payload_is_parked_after_max_attempts() {
        let (_identity, notifications, worker) = worker_fixture();
        // Stands in for an event written by a newer, since rolled back,
        // deploy: the payload no longer deserializes.
        let id = notifications
            .enqueue_raw(serde_json::json!({"kind": "no_such_event"}))
            .await;

        for _ in 0..3 {
            assert_eq!(worker.drain_once().await.unwrap(), 0);
        }

        let entries = notifications.all_outbox_entries().await;
        assert_eq!(entries[0].id, id);
        assert_eq!(entries[0].status, OutboxStatus::Failed);
        assert_eq!(entries[0].attempts, 3);
        assert!(entries[0]
            .last_error
            .as_deref()
            .unwrap()
            .contains("undeliverable payload"));

        // Parked entries are never fetched again.
        assert_eq!(worker.drain_once().await.unwrap(), 0);
    }

    #[test_log::test(tokio::test)]
    async fn shutdown_flushes_the_outbox_before_exit() {
        let (identity, notifications, worker) = worker_fixture();
        let ada = identity.create_profile(profile("ada")).await.unwrap();
        let grace = identity.create_profile(profile("grace")).await.unwrap();
        notifications
            .enqueue(&NotificationEvent::FollowerAdded {
                follower_id: ada.id,
                target_id: grace.id,
            })
            .await
            .unwrap();

        let (tx, rx) = oneshot::channel();
        let handle = tokio::spawn(worker.run(rx));
        tx.send(()).unwrap();
        tokio_test::assert_ok!(handle.await);

        assert_eq!(notifications.unread_count(grace.id).await.unwrap(), 1);
        let entries = notifications.all_outbox_entries().await;
        assert_eq!(entries[0].status, OutboxStatus::Dispatched);
    }
}
