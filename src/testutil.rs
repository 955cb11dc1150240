// Copyright (c) CrowdPulse Team
// SPDX-License-Identifier: Apache-2.0

//! Shared test fixture: every engine wired to in-memory stores, with a
//! dispatcher worker for draining the outbox synchronously.

use std::sync::Arc;

use bigdecimal::BigDecimal;
use chrono::{Duration, Utc};

use crate::config::{DispatcherConfig, FeeConfig, ModerationConfig};
use crate::engines::{CampaignLedger, EngagementEngine, ModerationEngine, SocialGraphEngine};
use crate::models::campaign::{Campaign, CampaignStatus, NewCampaign};
use crate::models::content::{NewPost, NewReel, Post, Reel};
use crate::models::notification::Notification;
use crate::models::profile::{NewProfile, ProfileRole};
use crate::notifications::{DispatcherWorker, NotificationDispatcher};
use crate::payments::SimulatedGateway;
use crate::stores::{
    CampaignStore, IdentityStore, InMemoryCampaignStore, InMemoryContentStore,
    InMemoryFollowStore, InMemoryIdentityStore, InMemoryLikeStore, InMemoryNotificationStore,
    InMemoryReportStore, NotificationStore,
};

pub(crate) struct TestApp {
    pub identity: Arc<InMemoryIdentityStore>,
    pub follows: Arc<InMemoryFollowStore>,
    pub likes: Arc<InMemoryLikeStore>,
    pub content: Arc<InMemoryContentStore>,
    pub campaigns: Arc<InMemoryCampaignStore>,
    pub reports: Arc<InMemoryReportStore>,
    pub notifications: Arc<InMemoryNotificationStore>,
    pub gateway: Arc<SimulatedGateway>,
    pub social: SocialGraphEngine,
    pub engagement: EngagementEngine,
    pub ledger: CampaignLedger,
    pub moderation: ModerationEngine,
    worker: DispatcherWorker,
}

impl TestApp {
    pub fn new() -> Self {
        let identity = Arc::new(InMemoryIdentityStore::new());
        let follows = Arc::new(InMemoryFollowStore::new());
        let likes = Arc::new(InMemoryLikeStore::new());
        let content = Arc::new(InMemoryContentStore::new());
        let campaigns = Arc::new(InMemoryCampaignStore::new());
        let reports = Arc::new(InMemoryReportStore::new());
        let notifications = Arc::new(InMemoryNotificationStore::new());
        let gateway = Arc::new(SimulatedGateway::new());

        let social = SocialGraphEngine::new(
            identity.clone(),
            follows.clone(),
            notifications.clone(),
        );
        let engagement = EngagementEngine::new(
            identity.clone(),
            content.clone(),
            likes.clone(),
            campaigns.clone(),
            notifications.clone(),
        );
        let ledger = CampaignLedger::new(
            identity.clone(),
            campaigns.clone(),
            gateway.clone(),
            notifications.clone(),
            FeeConfig::default(),
        );
        let moderation = ModerationEngine::new(
            identity.clone(),
            content.clone(),
            campaigns.clone(),
            reports.clone(),
            notifications.clone(),
            ModerationConfig { suspension_days: 7 },
        );

        let dispatcher = Arc::new(NotificationDispatcher::new(
            identity.clone(),
            campaigns.clone(),
            notifications.clone(),
        ));
        let worker = DispatcherWorker::new(
            dispatcher,
            notifications.clone(),
            &DispatcherConfig {
                poll_interval_ms: 10,
                batch_size: 100,
                max_attempts: 3,
            },
        );

        Self {
            identity,
            follows,
            likes,
            content,
            campaigns,
            reports,
            notifications,
            gateway,
            social,
            engagement,
            ledger,
            moderation,
            worker,
        }
    }

    async fn create_profile(&self, username: &str, is_private: bool, role: ProfileRole) -> i64 {
        self.identity
            .create_profile(NewProfile {
                username: username.into(),
                display_name: None,
                bio: None,
                avatar_url: None,
                is_private,
                role,
            })
            .await
            .expect("create profile")
            .id
    }

    pub async fn profile(&self, username: &str) -> i64 {
        self.create_profile(username, false, ProfileRole::User).await
    }

    pub async fn private_profile(&self, username: &str) -> i64 {
        self.create_profile(username, true, ProfileRole::User).await
    }

    pub async fn admin(&self, username: &str) -> i64 {
        self.create_profile(username, false, ProfileRole::Admin).await
    }

    pub async fn senior_admin(&self, username: &str) -> i64 {
        self.create_profile(username, false, ProfileRole::SeniorAdmin)
            .await
    }

    pub async fn followers_count(&self, id: i64) -> i32 {
        self.identity
            .get_profile(id)
            .await
            .expect("get profile")
            .expect("profile exists")
            .followers_count
    }

    pub async fn following_count(&self, id: i64) -> i32 {
        self.identity
            .get_profile(id)
            .await
            .expect("get profile")
            .expect("profile exists")
            .following_count
    }

    pub async fn posts_count(&self, id: i64) -> i32 {
        self.identity
            .get_profile(id)
            .await
            .expect("get profile")
            .expect("profile exists")
            .posts_count
    }

    /// Drains the outbox through the dispatcher once.
    pub async fn drain(&self) -> usize {
        self.worker.drain_once().await.expect("drain outbox")
    }

    /// Delivered notifications for a recipient, newest first.
    pub async fn inbox(&self, recipient_id: i64) -> Vec<Notification> {
        self.notifications
            .list_for_recipient(recipient_id, 100, 0)
            .await
            .expect("list notifications")
    }

    pub async fn post(&self, author_id: i64) -> Post {
        self.engagement
            .create_post(NewPost {
                author_id,
                caption: "hello".into(),
                media_urls: vec![],
                is_public: true,
            })
            .await
            .expect("create post")
    }

    pub async fn reel(&self, author_id: i64) -> Reel {
        self.engagement
            .create_reel(NewReel {
                author_id,
                video_url: "https://cdn.example/clip.mp4".into(),
                caption: "clip".into(),
                duration_seconds: 30,
            })
            .await
            .expect("create reel")
    }

    /// Inserts an ACTIVE campaign directly, skipping the review flow.
    pub async fn active_campaign(&self, creator_id: i64, goal: i64) -> Campaign {
        self.campaigns
            .create_campaign(NewCampaign {
                creator_id,
                title: "Clean water".into(),
                description: "A well for the village".into(),
                goal_amount: BigDecimal::from(goal),
                currency: "USD".into(),
                status: CampaignStatus::Active,
                end_date: Utc::now() + Duration::days(30),
            })
            .await
            .expect("create campaign")
    }

    /// Adds and verifies a bank account through the ledger.
    pub async fn verified_account(&self, owner_id: i64) -> i64 {
        let account = self
            .ledger
            .add_bank_account(
                owner_id,
                crate::models::bank_account::NewBankAccount {
                    owner_id,
                    account_holder_name: "Account Holder".into(),
                    account_number: "000123456789".into(),
                    bank_name: "First Example Bank".into(),
                    routing_number: Some("110000000".into()),
                    currency: "USD".into(),
                    is_primary: false,
                },
            )
            .await
            .expect("add bank account");
        self.ledger
            .verify_bank_account(
                owner_id,
                account.id,
                "https://docs.example/statement.pdf".into(),
            )
            .await
            .expect("verify bank account");
        account.id
    }
}
