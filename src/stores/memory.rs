// Copyright (c) CrowdPulse Team
// SPDX-License-Identifier: Apache-2.0

//! In-memory store implementations mirroring the Postgres semantics,
//! including uniqueness violations and count clamping. The engine test
//! suites run entirely against these.

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::error::{ServiceError, ServiceResult};
use crate::models::bank_account::{BankAccount, BankAccountChanges, NewBankAccount};
use crate::models::campaign::{Campaign, CampaignChanges, CampaignStatus, NewCampaign};
use crate::models::campaign_update::{CampaignUpdate, NewCampaignUpdate};
use crate::models::content_ref::{ContentRef, ReportTarget};
use crate::models::donation::{Donation, DonationChanges, DonationStatus, NewDonation};
use crate::models::follow::{Follow, FollowStatus, NewFollow};
use crate::models::like::{Like, NewLike};
use crate::models::notification::{
    NewNotification, Notification, OutboxEntry, OutboxStatus,
};
use crate::models::profile::{NewProfile, Profile, ProfileRole, UpdateProfile};
use crate::models::report::{NewReport, Report, ReportChanges, ReportStatus};
use crate::models::withdrawal::{NewWithdrawal, Withdrawal, WithdrawalChanges};
use crate::notifications::event::NotificationEvent;
use crate::stores::campaign::CampaignStore;
use crate::stores::identity::IdentityStore;
use crate::stores::moderation::ReportStore;
use crate::stores::notification::NotificationStore;
use crate::stores::social_graph::{FollowStore, LikeStore};

fn clamped(value: i32, delta: i32) -> i32 {
    (value + delta).max(0)
}

// ---------------------------------------------------------------------------
// Identity

#[derive(Default)]
struct IdentityState {
    next_id: i64,
    profiles: HashMap<i64, Profile>,
}

impl IdentityState {
    fn allocate_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Default)]
pub struct InMemoryIdentityStore {
    state: RwLock<IdentityState>,
}

impl InMemoryIdentityStore {
    pub fn new() -> Self {
        Self::default()
    }

    async fn adjust(&self, id: i64, apply: impl FnOnce(&mut Profile)) -> ServiceResult<()> {
        let mut state = self.state.write().await;
        let profile = state
            .profiles
            .get_mut(&id)
            .ok_or_else(|| ServiceError::not_found(format!("profile {}", id)))?;
        apply(profile);
        profile.updated_at = Utc::now();
        Ok(())
    }
}

#[async_trait]
impl IdentityStore for InMemoryIdentityStore {
    async fn create_profile(&self, new: NewProfile) -> ServiceResult<Profile> {
        let mut state = self.state.write().await;
        if state.profiles.values().any(|p| p.username == new.username) {
            return Err(ServiceError::already_exists(format!(
                "username {} is already taken",
                new.username
            )));
        }
        let id = state.allocate_id();
        let now = Utc::now();
        let profile = Profile {
            id,
            username: new.username,
            display_name: new.display_name,
            bio: new.bio,
            avatar_url: new.avatar_url,
            is_private: new.is_private,
            role: new.role,
            followers_count: 0,
            following_count: 0,
            posts_count: 0,
            suspended_until: None,
            created_at: now,
            updated_at: now,
        };
        state.profiles.insert(id, profile.clone());
        Ok(profile)
    }

    async fn get_profile(&self, id: i64) -> ServiceResult<Option<Profile>> {
        let state = self.state.read().await;
        Ok(state.profiles.get(&id).cloned())
    }

    async fn update_profile(&self, id: i64, changes: UpdateProfile) -> ServiceResult<Profile> {
        let mut state = self.state.write().await;
        let profile = state
            .profiles
            .get_mut(&id)
            .ok_or_else(|| ServiceError::not_found(format!("profile {}", id)))?;
        if let Some(display_name) = changes.display_name {
            profile.display_name = Some(display_name);
        }
        if let Some(bio) = changes.bio {
            profile.bio = Some(bio);
        }
        if let Some(avatar_url) = changes.avatar_url {
            profile.avatar_url = Some(avatar_url);
        }
        if let Some(is_private) = changes.is_private {
            profile.is_private = is_private;
        }
        profile.updated_at = Utc::now();
        Ok(profile.clone())
    }

    async fn adjust_followers_count(&self, id: i64, delta: i32) -> ServiceResult<()> {
        self.adjust(id, |p| p.followers_count = clamped(p.followers_count, delta))
            .await
    }

    async fn adjust_following_count(&self, id: i64, delta: i32) -> ServiceResult<()> {
        self.adjust(id, |p| p.following_count = clamped(p.following_count, delta))
            .await
    }

    async fn adjust_posts_count(&self, id: i64, delta: i32) -> ServiceResult<()> {
        self.adjust(id, |p| p.posts_count = clamped(p.posts_count, delta))
            .await
    }

    async fn suspend(&self, id: i64, until: DateTime<Utc>) -> ServiceResult<()> {
        self.adjust(id, |p| p.suspended_until = Some(until)).await
    }

    async fn list_by_role(&self, role: ProfileRole) -> ServiceResult<Vec<Profile>> {
        let state = self.state.read().await;
        let mut found: Vec<Profile> = state
            .profiles
            .values()
            .filter(|p| p.role == role)
            .cloned()
            .collect();
        found.sort_by_key(|p| p.id);
        Ok(found)
    }
}

// ---------------------------------------------------------------------------
// Social graph

#[derive(Default)]
struct FollowState {
    next_id: i64,
    follows: HashMap<i64, Follow>,
}

#[derive(Default)]
pub struct InMemoryFollowStore {
    state: RwLock<FollowState>,
}

impl InMemoryFollowStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FollowStore for InMemoryFollowStore {
    async fn get(&self, follower_id: i64, following_id: i64) -> ServiceResult<Option<Follow>> {
        let state = self.state.read().await;
        Ok(state
            .follows
            .values()
            .find(|f| f.follower_id == follower_id && f.following_id == following_id)
            .cloned())
    }

    async fn insert(&self, new: NewFollow) -> ServiceResult<Follow> {
        let mut state = self.state.write().await;
        if state
            .follows
            .values()
            .any(|f| f.follower_id == new.follower_id && f.following_id == new.following_id)
        {
            return Err(ServiceError::already_exists(
                "follow relationship already exists",
            ));
        }
        state.next_id += 1;
        let now = Utc::now();
        let follow = Follow {
            id: state.next_id,
            follower_id: new.follower_id,
            following_id: new.following_id,
            status: new.status,
            created_at: now,
            updated_at: now,
        };
        state.follows.insert(follow.id, follow.clone());
        Ok(follow)
    }

    async fn set_status(
        &self,
        follower_id: i64,
        following_id: i64,
        status: FollowStatus,
    ) -> ServiceResult<Follow> {
        let mut state = self.state.write().await;
        let follow = state
            .follows
            .values_mut()
            .find(|f| f.follower_id == follower_id && f.following_id == following_id)
            .ok_or_else(|| ServiceError::not_found("follow relationship"))?;
        follow.status = status;
        follow.updated_at = Utc::now();
        Ok(follow.clone())
    }

    async fn delete(&self, follower_id: i64, following_id: i64) -> ServiceResult<bool> {
        let mut state = self.state.write().await;
        let id = state
            .follows
            .values()
            .find(|f| f.follower_id == follower_id && f.following_id == following_id)
            .map(|f| f.id);
        Ok(match id {
            Some(id) => state.follows.remove(&id).is_some(),
            None => false,
        })
    }

    async fn count_active_followers(&self, profile_id: i64) -> ServiceResult<i64> {
        let state = self.state.read().await;
        Ok(state
            .follows
            .values()
            .filter(|f| f.following_id == profile_id && f.status == FollowStatus::Active)
            .count() as i64)
    }

    async fn count_active_following(&self, profile_id: i64) -> ServiceResult<i64> {
        let state = self.state.read().await;
        Ok(state
            .follows
            .values()
            .filter(|f| f.follower_id == profile_id && f.status == FollowStatus::Active)
            .count() as i64)
    }

    async fn list_followers(
        &self,
        profile_id: i64,
        limit: i64,
        offset: i64,
    ) -> ServiceResult<Vec<Follow>> {
        let state = self.state.read().await;
        let mut found: Vec<Follow> = state
            .follows
            .values()
            .filter(|f| f.following_id == profile_id && f.status == FollowStatus::Active)
            .cloned()
            .collect();
        found.sort_by_key(|f| std::cmp::Reverse(f.id));
        Ok(found
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }

    async fn list_following(
        &self,
        profile_id: i64,
        limit: i64,
        offset: i64,
    ) -> ServiceResult<Vec<Follow>> {
        let state = self.state.read().await;
        let mut found: Vec<Follow> = state
            .follows
            .values()
            .filter(|f| f.follower_id == profile_id && f.status == FollowStatus::Active)
            .cloned()
            .collect();
        found.sort_by_key(|f| std::cmp::Reverse(f.id));
        Ok(found
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }
}

#[derive(Default)]
struct LikeState {
    next_id: i64,
    likes: HashMap<i64, Like>,
}

#[derive(Default)]
pub struct InMemoryLikeStore {
    state: RwLock<LikeState>,
}

impl InMemoryLikeStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LikeStore for InMemoryLikeStore {
    async fn find(&self, user_id: i64, content: ContentRef) -> ServiceResult<Option<Like>> {
        let state = self.state.read().await;
        Ok(state
            .likes
            .values()
            .find(|l| {
                l.user_id == user_id
                    && l.content_type == content.kind()
                    && l.content_id == content.id()
            })
            .cloned())
    }

    async fn insert(&self, new: NewLike) -> ServiceResult<Like> {
        let mut state = self.state.write().await;
        if state.likes.values().any(|l| {
            l.user_id == new.user_id
                && l.content_type == new.content_type
                && l.content_id == new.content_id
        }) {
            return Err(ServiceError::already_exists("content already liked"));
        }
        state.next_id += 1;
        let like = Like {
            id: state.next_id,
            user_id: new.user_id,
            content_type: new.content_type,
            content_id: new.content_id,
            created_at: Utc::now(),
        };
        state.likes.insert(like.id, like.clone());
        Ok(like)
    }

    async fn delete(&self, user_id: i64, content: ContentRef) -> ServiceResult<bool> {
        let mut state = self.state.write().await;
        let id = state
            .likes
            .values()
            .find(|l| {
                l.user_id == user_id
                    && l.content_type == content.kind()
                    && l.content_id == content.id()
            })
            .map(|l| l.id);
        Ok(match id {
            Some(id) => state.likes.remove(&id).is_some(),
            None => false,
        })
    }

    async fn count_for(&self, content: ContentRef) -> ServiceResult<i64> {
        let state = self.state.read().await;
        Ok(state
            .likes
            .values()
            .filter(|l| l.content_type == content.kind() && l.content_id == content.id())
            .count() as i64)
    }
}

// ---------------------------------------------------------------------------
// Campaign ledger

#[derive(Default)]
struct CampaignState {
    next_id: i64,
    campaigns: HashMap<i64, Campaign>,
    donations: HashMap<i64, Donation>,
    withdrawals: HashMap<i64, Withdrawal>,
    bank_accounts: HashMap<i64, BankAccount>,
    updates: HashMap<i64, CampaignUpdate>,
}

impl CampaignState {
    fn allocate_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Default)]
pub struct InMemoryCampaignStore {
    state: RwLock<CampaignState>,
}

impl InMemoryCampaignStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CampaignStore for InMemoryCampaignStore {
    async fn create_campaign(&self, new: NewCampaign) -> ServiceResult<Campaign> {
        let mut state = self.state.write().await;
        let id = state.allocate_id();
        let now = Utc::now();
        let campaign = Campaign {
            id,
            creator_id: new.creator_id,
            title: new.title,
            description: new.description,
            goal_amount: new.goal_amount,
            current_amount: BigDecimal::from(0),
            currency: new.currency,
            donor_count: 0,
            updates_count: 0,
            milestones_count: 0,
            status: new.status,
            is_verified: false,
            start_date: None,
            end_date: new.end_date,
            rejection_reason: None,
            created_at: now,
            updated_at: now,
        };
        state.campaigns.insert(id, campaign.clone());
        Ok(campaign)
    }

    async fn get_campaign(&self, id: i64) -> ServiceResult<Option<Campaign>> {
        let state = self.state.read().await;
        Ok(state.campaigns.get(&id).cloned())
    }

    async fn update_campaign(&self, id: i64, changes: CampaignChanges) -> ServiceResult<Campaign> {
        let mut state = self.state.write().await;
        let campaign = state
            .campaigns
            .get_mut(&id)
            .ok_or_else(|| ServiceError::not_found(format!("campaign {}", id)))?;
        if let Some(status) = changes.status {
            campaign.status = status;
        }
        if let Some(is_verified) = changes.is_verified {
            campaign.is_verified = is_verified;
        }
        if let Some(start_date) = changes.start_date {
            campaign.start_date = Some(start_date);
        }
        if let Some(reason) = changes.rejection_reason {
            campaign.rejection_reason = Some(reason);
        }
        campaign.updated_at = Utc::now();
        Ok(campaign.clone())
    }

    async fn compare_and_set_status(
        &self,
        id: i64,
        from: CampaignStatus,
        to: CampaignStatus,
    ) -> ServiceResult<bool> {
        let mut state = self.state.write().await;
        match state.campaigns.get_mut(&id) {
            Some(campaign) if campaign.status == from => {
                campaign.status = to;
                campaign.updated_at = Utc::now();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn apply_donation(&self, id: i64, amount: &BigDecimal) -> ServiceResult<Campaign> {
        let mut state = self.state.write().await;
        let campaign = state
            .campaigns
            .get_mut(&id)
            .ok_or_else(|| ServiceError::not_found(format!("campaign {}", id)))?;
        campaign.current_amount = &campaign.current_amount + amount;
        campaign.donor_count += 1;
        campaign.updated_at = Utc::now();
        Ok(campaign.clone())
    }

    async fn reverse_donation(
        &self,
        id: i64,
        amount: &BigDecimal,
        decrement_donor: bool,
    ) -> ServiceResult<Campaign> {
        let mut state = self.state.write().await;
        let campaign = state
            .campaigns
            .get_mut(&id)
            .ok_or_else(|| ServiceError::not_found(format!("campaign {}", id)))?;
        campaign.current_amount = &campaign.current_amount - amount;
        if decrement_donor {
            campaign.donor_count = clamped(campaign.donor_count, -1);
        }
        campaign.updated_at = Utc::now();
        Ok(campaign.clone())
    }

    async fn debit_withdrawal(&self, id: i64, amount: &BigDecimal) -> ServiceResult<Campaign> {
        let mut state = self.state.write().await;
        let campaign = state
            .campaigns
            .get_mut(&id)
            .ok_or_else(|| ServiceError::not_found(format!("campaign {}", id)))?;
        campaign.current_amount = &campaign.current_amount - amount;
        campaign.updated_at = Utc::now();
        Ok(campaign.clone())
    }

    async fn create_donation(&self, new: NewDonation) -> ServiceResult<Donation> {
        let mut state = self.state.write().await;
        let id = state.allocate_id();
        let donation = Donation {
            id,
            campaign_id: new.campaign_id,
            donor_id: new.donor_id,
            amount: new.amount,
            currency: new.currency,
            is_anonymous: new.is_anonymous,
            message: new.message,
            status: new.status,
            transaction_id: None,
            refund_id: None,
            refunded_amount: BigDecimal::from(0),
            failure_reason: None,
            created_at: Utc::now(),
            completed_at: None,
            refunded_at: None,
        };
        state.donations.insert(id, donation.clone());
        Ok(donation)
    }

    async fn get_donation(&self, id: i64) -> ServiceResult<Option<Donation>> {
        let state = self.state.read().await;
        Ok(state.donations.get(&id).cloned())
    }

    async fn update_donation(&self, id: i64, changes: DonationChanges) -> ServiceResult<Donation> {
        let mut state = self.state.write().await;
        let donation = state
            .donations
            .get_mut(&id)
            .ok_or_else(|| ServiceError::not_found(format!("donation {}", id)))?;
        if let Some(status) = changes.status {
            donation.status = status;
        }
        if let Some(transaction_id) = changes.transaction_id {
            donation.transaction_id = Some(transaction_id);
        }
        if let Some(refund_id) = changes.refund_id {
            donation.refund_id = Some(refund_id);
        }
        if let Some(refunded_amount) = changes.refunded_amount {
            donation.refunded_amount = refunded_amount;
        }
        if let Some(failure_reason) = changes.failure_reason {
            donation.failure_reason = Some(failure_reason);
        }
        if let Some(completed_at) = changes.completed_at {
            donation.completed_at = Some(completed_at);
        }
        if let Some(refunded_at) = changes.refunded_at {
            donation.refunded_at = Some(refunded_at);
        }
        Ok(donation.clone())
    }

    async fn compare_and_set_donation_status(
        &self,
        id: i64,
        from: DonationStatus,
        to: DonationStatus,
    ) -> ServiceResult<bool> {
        let mut state = self.state.write().await;
        match state.donations.get_mut(&id) {
            Some(donation) if donation.status == from => {
                donation.status = to;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn list_donations(
        &self,
        campaign_id: i64,
        limit: i64,
        offset: i64,
    ) -> ServiceResult<Vec<Donation>> {
        let state = self.state.read().await;
        let mut found: Vec<Donation> = state
            .donations
            .values()
            .filter(|d| d.campaign_id == campaign_id)
            .cloned()
            .collect();
        found.sort_by_key(|d| std::cmp::Reverse(d.id));
        Ok(found
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }

    async fn distinct_completed_donors(&self, campaign_id: i64) -> ServiceResult<Vec<i64>> {
        let state = self.state.read().await;
        let mut donors: Vec<i64> = state
            .donations
            .values()
            .filter(|d| {
                d.campaign_id == campaign_id
                    && matches!(
                        d.status,
                        DonationStatus::Completed | DonationStatus::PartiallyRefunded
                    )
            })
            .map(|d| d.donor_id)
            .collect();
        donors.sort_unstable();
        donors.dedup();
        Ok(donors)
    }

    async fn create_withdrawal(&self, new: NewWithdrawal) -> ServiceResult<Withdrawal> {
        let mut state = self.state.write().await;
        let id = state.allocate_id();
        let withdrawal = Withdrawal {
            id,
            campaign_id: new.campaign_id,
            requester_id: new.requester_id,
            bank_account_id: new.bank_account_id,
            amount: new.amount,
            platform_fee: new.platform_fee,
            gateway_fee: new.gateway_fee,
            net_amount: new.net_amount,
            currency: new.currency,
            status: new.status,
            transfer_id: None,
            failure_reason: None,
            rejection_reason: None,
            requested_at: Utc::now(),
            processed_at: None,
        };
        state.withdrawals.insert(id, withdrawal.clone());
        Ok(withdrawal)
    }

    async fn get_withdrawal(&self, id: i64) -> ServiceResult<Option<Withdrawal>> {
        let state = self.state.read().await;
        Ok(state.withdrawals.get(&id).cloned())
    }

    async fn update_withdrawal(
        &self,
        id: i64,
        changes: WithdrawalChanges,
    ) -> ServiceResult<Withdrawal> {
        let mut state = self.state.write().await;
        let withdrawal = state
            .withdrawals
            .get_mut(&id)
            .ok_or_else(|| ServiceError::not_found(format!("withdrawal {}", id)))?;
        if let Some(status) = changes.status {
            withdrawal.status = status;
        }
        if let Some(transfer_id) = changes.transfer_id {
            withdrawal.transfer_id = Some(transfer_id);
        }
        if let Some(failure_reason) = changes.failure_reason {
            withdrawal.failure_reason = Some(failure_reason);
        }
        if let Some(rejection_reason) = changes.rejection_reason {
            withdrawal.rejection_reason = Some(rejection_reason);
        }
        if let Some(processed_at) = changes.processed_at {
            withdrawal.processed_at = Some(processed_at);
        }
        Ok(withdrawal.clone())
    }

    async fn list_withdrawals(
        &self,
        campaign_id: i64,
        limit: i64,
        offset: i64,
    ) -> ServiceResult<Vec<Withdrawal>> {
        let state = self.state.read().await;
        let mut found: Vec<Withdrawal> = state
            .withdrawals
            .values()
            .filter(|w| w.campaign_id == campaign_id)
            .cloned()
            .collect();
        found.sort_by_key(|w| std::cmp::Reverse(w.id));
        Ok(found
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }

    async fn create_bank_account(&self, new: NewBankAccount) -> ServiceResult<BankAccount> {
        let mut state = self.state.write().await;
        let id = state.allocate_id();
        let now = Utc::now();
        let account = BankAccount {
            id,
            owner_id: new.owner_id,
            account_holder_name: new.account_holder_name,
            account_number: new.account_number,
            bank_name: new.bank_name,
            routing_number: new.routing_number,
            currency: new.currency,
            is_primary: new.is_primary,
            is_verified: false,
            is_active: true,
            verification_document_url: None,
            verified_at: None,
            created_at: now,
            updated_at: now,
        };
        state.bank_accounts.insert(id, account.clone());
        Ok(account)
    }

    async fn get_bank_account(&self, id: i64) -> ServiceResult<Option<BankAccount>> {
        let state = self.state.read().await;
        Ok(state.bank_accounts.get(&id).cloned())
    }

    async fn list_bank_accounts(&self, owner_id: i64) -> ServiceResult<Vec<BankAccount>> {
        let state = self.state.read().await;
        let mut found: Vec<BankAccount> = state
            .bank_accounts
            .values()
            .filter(|a| a.owner_id == owner_id && a.is_active)
            .cloned()
            .collect();
        found.sort_by_key(|a| a.id);
        Ok(found)
    }

    async fn count_bank_accounts(&self, owner_id: i64) -> ServiceResult<i64> {
        let state = self.state.read().await;
        Ok(state
            .bank_accounts
            .values()
            .filter(|a| a.owner_id == owner_id && a.is_active)
            .count() as i64)
    }

    async fn update_bank_account(
        &self,
        id: i64,
        changes: BankAccountChanges,
    ) -> ServiceResult<BankAccount> {
        let mut state = self.state.write().await;
        let account = state
            .bank_accounts
            .get_mut(&id)
            .ok_or_else(|| ServiceError::not_found(format!("bank account {}", id)))?;
        if let Some(account_holder_name) = changes.account_holder_name {
            account.account_holder_name = account_holder_name;
        }
        if let Some(bank_name) = changes.bank_name {
            account.bank_name = bank_name;
        }
        if let Some(routing_number) = changes.routing_number {
            account.routing_number = Some(routing_number);
        }
        if let Some(is_primary) = changes.is_primary {
            account.is_primary = is_primary;
        }
        if let Some(is_verified) = changes.is_verified {
            account.is_verified = is_verified;
        }
        if let Some(is_active) = changes.is_active {
            account.is_active = is_active;
        }
        if let Some(url) = changes.verification_document_url {
            account.verification_document_url = Some(url);
        }
        if let Some(verified_at) = changes.verified_at {
            account.verified_at = Some(verified_at);
        }
        account.updated_at = Utc::now();
        Ok(account.clone())
    }

    async fn set_primary_bank_account(&self, owner_id: i64, account_id: i64) -> ServiceResult<()> {
        let mut state = self.state.write().await;
        for account in state.bank_accounts.values_mut() {
            if account.owner_id == owner_id {
                account.is_primary = account.id == account_id;
                account.updated_at = Utc::now();
            }
        }
        Ok(())
    }

    async fn delete_bank_account(&self, id: i64) -> ServiceResult<bool> {
        let mut state = self.state.write().await;
        Ok(state.bank_accounts.remove(&id).is_some())
    }

    async fn create_update(&self, new: NewCampaignUpdate) -> ServiceResult<CampaignUpdate> {
        let mut state = self.state.write().await;
        let id = state.allocate_id();
        let update = CampaignUpdate {
            id,
            campaign_id: new.campaign_id,
            author_id: new.author_id,
            title: new.title,
            body: new.body,
            is_milestone: new.is_milestone,
            created_at: Utc::now(),
        };
        state.updates.insert(id, update.clone());
        if let Some(campaign) = state.campaigns.get_mut(&new.campaign_id) {
            campaign.updates_count += 1;
            if new.is_milestone {
                campaign.milestones_count += 1;
            }
            campaign.updated_at = Utc::now();
        }
        Ok(update)
    }

    async fn list_updates(
        &self,
        campaign_id: i64,
        limit: i64,
        offset: i64,
    ) -> ServiceResult<Vec<CampaignUpdate>> {
        let state = self.state.read().await;
        let mut found: Vec<CampaignUpdate> = state
            .updates
            .values()
            .filter(|u| u.campaign_id == campaign_id)
            .cloned()
            .collect();
        found.sort_by_key(|u| std::cmp::Reverse(u.id));
        Ok(found
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }
}

// ---------------------------------------------------------------------------
// Moderation

#[derive(Default)]
struct ReportState {
    next_id: i64,
    reports: HashMap<i64, Report>,
}

#[derive(Default)]
pub struct InMemoryReportStore {
    state: RwLock<ReportState>,
}

impl InMemoryReportStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ReportStore for InMemoryReportStore {
    async fn create_report(&self, new: NewReport) -> ServiceResult<Report> {
        let mut state = self.state.write().await;
        if state.reports.values().any(|r| {
            r.reporter_id == new.reporter_id
                && r.target_type == new.target_type
                && r.target_id == new.target_id
        }) {
            return Err(ServiceError::already_exists(
                "target already reported by this user",
            ));
        }
        state.next_id += 1;
        let report = Report {
            id: state.next_id,
            reporter_id: new.reporter_id,
            target_type: new.target_type,
            target_id: new.target_id,
            reason: new.reason,
            details: new.details,
            status: new.status,
            resolved_by: None,
            action_taken: None,
            resolution_note: None,
            created_at: Utc::now(),
            reviewed_at: None,
            resolved_at: None,
        };
        state.reports.insert(report.id, report.clone());
        Ok(report)
    }

    async fn get_report(&self, id: i64) -> ServiceResult<Option<Report>> {
        let state = self.state.read().await;
        Ok(state.reports.get(&id).cloned())
    }

    async fn find_by_reporter_and_target(
        &self,
        reporter_id: i64,
        target: &ReportTarget,
    ) -> ServiceResult<Option<Report>> {
        let state = self.state.read().await;
        Ok(state
            .reports
            .values()
            .find(|r| {
                r.reporter_id == reporter_id
                    && r.target_type == target.kind()
                    && r.target_id == target.id()
            })
            .cloned())
    }

    async fn update_report(&self, id: i64, changes: ReportChanges) -> ServiceResult<Report> {
        let mut state = self.state.write().await;
        let report = state
            .reports
            .get_mut(&id)
            .ok_or_else(|| ServiceError::not_found(format!("report {}", id)))?;
        if let Some(status) = changes.status {
            report.status = status;
        }
        if let Some(resolved_by) = changes.resolved_by {
            report.resolved_by = Some(resolved_by);
        }
        if let Some(action_taken) = changes.action_taken {
            report.action_taken = Some(action_taken);
        }
        if let Some(resolution_note) = changes.resolution_note {
            report.resolution_note = Some(resolution_note);
        }
        if let Some(reviewed_at) = changes.reviewed_at {
            report.reviewed_at = Some(reviewed_at);
        }
        if let Some(resolved_at) = changes.resolved_at {
            report.resolved_at = Some(resolved_at);
        }
        Ok(report.clone())
    }

    async fn list_by_status(
        &self,
        status: ReportStatus,
        limit: i64,
        offset: i64,
    ) -> ServiceResult<Vec<Report>> {
        let state = self.state.read().await;
        let mut found: Vec<Report> = state
            .reports
            .values()
            .filter(|r| r.status == status)
            .cloned()
            .collect();
        found.sort_by_key(|r| r.id);
        Ok(found
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }
}

// ---------------------------------------------------------------------------
// Notifications

#[derive(Default)]
struct NotificationState {
    next_id: i64,
    outbox: HashMap<i64, OutboxEntry>,
    notifications: HashMap<i64, Notification>,
}

impl NotificationState {
    fn allocate_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Default)]
pub struct InMemoryNotificationStore {
    state: RwLock<NotificationState>,
}

impl InMemoryNotificationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Test helper: every notification delivered so far, in insertion order.
    pub async fn all_notifications(&self) -> Vec<Notification> {
        let state = self.state.read().await;
        let mut found: Vec<Notification> = state.notifications.values().cloned().collect();
        found.sort_by_key(|n| n.id);
        found
    }

    /// Test helper: outbox entries regardless of status, in insertion order.
    pub async fn all_outbox_entries(&self) -> Vec<OutboxEntry> {
        let state = self.state.read().await;
        let mut found: Vec<OutboxEntry> = state.outbox.values().cloned().collect();
        found.sort_by_key(|e| e.id);
        found
    }

    /// Test helper: enqueue an arbitrary payload, bypassing event
    /// serialization. Used to exercise the undeliverable-payload path.
    pub async fn enqueue_raw(&self, payload: serde_json::Value) -> i64 {
        let mut state = self.state.write().await;
        let id = state.allocate_id();
        let entry = OutboxEntry {
            id,
            event: payload,
            status: OutboxStatus::Pending,
            attempts: 0,
            last_error: None,
            created_at: Utc::now(),
            dispatched_at: None,
        };
        state.outbox.insert(id, entry);
        id
    }
}

#[async_trait]
impl NotificationStore for InMemoryNotificationStore {
    async fn enqueue(&self, event: &NotificationEvent) -> ServiceResult<i64> {
        let payload = serde_json::to_value(event)
            .map_err(|e| ServiceError::database(format!("serialize outbox event: {}", e)))?;
        let mut state = self.state.write().await;
        let id = state.allocate_id();
        let entry = OutboxEntry {
            id,
            event: payload,
            status: OutboxStatus::Pending,
            attempts: 0,
            last_error: None,
            created_at: Utc::now(),
            dispatched_at: None,
        };
        state.outbox.insert(id, entry);
        Ok(id)
    }

    async fn fetch_pending(&self, limit: i64, max_attempts: i32) -> ServiceResult<Vec<OutboxEntry>> {
        let state = self.state.read().await;
        let mut pending: Vec<OutboxEntry> = state
            .outbox
            .values()
            .filter(|e| e.status == OutboxStatus::Pending && e.attempts < max_attempts)
            .cloned()
            .collect();
        pending.sort_by_key(|e| e.id);
        pending.truncate(limit as usize);
        Ok(pending)
    }

    async fn mark_dispatched(&self, id: i64) -> ServiceResult<()> {
        let mut state = self.state.write().await;
        if let Some(entry) = state.outbox.get_mut(&id) {
            entry.status = OutboxStatus::Dispatched;
            entry.dispatched_at = Some(Utc::now());
        }
        Ok(())
    }

    async fn record_failure(&self, id: i64, error: &str, max_attempts: i32) -> ServiceResult<()> {
        let mut state = self.state.write().await;
        let entry = state
            .outbox
            .get_mut(&id)
            .ok_or_else(|| ServiceError::not_found(format!("outbox entry {}", id)))?;
        entry.attempts += 1;
        entry.last_error = Some(error.to_string());
        if entry.attempts >= max_attempts {
            entry.status = OutboxStatus::Failed;
        }
        Ok(())
    }

    async fn insert_notification(&self, new: NewNotification) -> ServiceResult<Notification> {
        let mut state = self.state.write().await;
        let id = state.allocate_id();
        let notification = Notification {
            id,
            recipient_id: new.recipient_id,
            actor_id: new.actor_id,
            notification_type: new.notification_type,
            message: new.message,
            target_type: new.target_type,
            target_id: new.target_id,
            campaign_id: new.campaign_id,
            action_url: new.action_url,
            is_read: false,
            created_at: Utc::now(),
            read_at: None,
        };
        state.notifications.insert(id, notification.clone());
        Ok(notification)
    }

    async fn list_for_recipient(
        &self,
        recipient_id: i64,
        limit: i64,
        offset: i64,
    ) -> ServiceResult<Vec<Notification>> {
        let state = self.state.read().await;
        let mut found: Vec<Notification> = state
            .notifications
            .values()
            .filter(|n| n.recipient_id == recipient_id)
            .cloned()
            .collect();
        found.sort_by_key(|n| std::cmp::Reverse(n.id));
        Ok(found
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }

    async fn unread_count(&self, recipient_id: i64) -> ServiceResult<i64> {
        let state = self.state.read().await;
        Ok(state
            .notifications
            .values()
            .filter(|n| n.recipient_id == recipient_id && !n.is_read)
            .count() as i64)
    }

    async fn mark_read(&self, id: i64, recipient_id: i64) -> ServiceResult<bool> {
        let mut state = self.state.write().await;
        match state.notifications.get_mut(&id) {
            Some(n) if n.recipient_id == recipient_id && !n.is_read => {
                n.is_read = true;
                n.read_at = Some(Utc::now());
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn mark_all_read(&self, recipient_id: i64) -> ServiceResult<usize> {
        let mut state = self.state.write().await;
        let mut changed = 0;
        for n in state.notifications.values_mut() {
            if n.recipient_id == recipient_id && !n.is_read {
                n.is_read = true;
                n.read_at = Some(Utc::now());
                changed += 1;
            }
        }
        Ok(changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn duplicate_username_is_rejected() {
        let store = InMemoryIdentityStore::new();
        store
            .create_profile(NewProfile {
                username: "ada".into(),
                display_name: None,
                bio: None,
                avatar_url: None,
                is_private: false,
                role: ProfileRole::User,
            })
            .await
            .unwrap();
        let err = store
            .create_profile(NewProfile {
                username: "ada".into(),
                display_name: None,
                bio: None,
                avatar_url: None,
                is_private: false,
                role: ProfileRole::User,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::AlreadyExists(_)));
    }

    #[tokio::test]
    async fn follower_count_clamps_at_zero() {
        let store = InMemoryIdentityStore::new();
        let profile = store
            .create_profile(NewProfile {
                username: "ada".into(),
                display_name: None,
                bio: None,
                avatar_url: None,
                is_private: false,
                role: ProfileRole::User,
            })
            .await
            .unwrap();
        store.adjust_followers_count(profile.id, -5).await.unwrap();
        let profile = store.get_profile(profile.id).await.unwrap().unwrap();
        assert_eq!(profile.followers_count, 0);
    }

    #[tokio::test]
    async fn outbox_failure_flips_to_failed_after_max_attempts() {
        let store = InMemoryNotificationStore::new();
        let id = store
            .enqueue(&NotificationEvent::GoalReached {
                creator_id: 1,
                campaign_id: 2,
            })
            .await
            .unwrap();
        store.record_failure(id, "boom", 2).await.unwrap();
        assert_eq!(store.fetch_pending(10, 2).await.unwrap().len(), 1);
        store.record_failure(id, "boom again", 2).await.unwrap();
        assert!(store.fetch_pending(10, 2).await.unwrap().is_empty());
        let entries = store.all_outbox_entries().await;
        assert_eq!(entries[0].status, OutboxStatus::Failed);
        assert_eq!(entries[0].attempts, 2);
        assert_eq!(entries[0].last_error.as_deref(), Some("boom again"));
    }

    #[tokio::test]
    async fn reversing_a_donation_can_go_negative_but_donor_count_cannot() {
        let store = InMemoryCampaignStore::new();
        let campaign = store
            .create_campaign(NewCampaign {
                creator_id: 1,
                title: "Well".into(),
                description: "Water".into(),
                goal_amount: BigDecimal::from(1000),
                currency: "USD".into(),
                status: CampaignStatus::Active,
                end_date: Utc::now() + chrono::Duration::days(30),
            })
            .await
            .unwrap();
        store
            .apply_donation(campaign.id, &BigDecimal::from(50))
            .await
            .unwrap();
        let after = store
            .reverse_donation(campaign.id, &BigDecimal::from(80), true)
            .await
            .unwrap();
        assert_eq!(after.current_amount, BigDecimal::from(-30));
        assert_eq!(after.donor_count, 0);
        let after = store
            .reverse_donation(campaign.id, &BigDecimal::from(1), true)
            .await
            .unwrap();
        assert_eq!(after.donor_count, 0);
    }
}
