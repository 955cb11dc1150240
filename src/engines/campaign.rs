// Copyright (c) CrowdPulse Team
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use bigdecimal::BigDecimal;
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use tracing::{info, warn};

use crate::config::FeeConfig;
use crate::error::{ServiceError, ServiceResult};
use crate::models::bank_account::{BankAccount, BankAccountChanges, NewBankAccount};
use crate::models::campaign::{Campaign, CampaignChanges, CampaignStatus, NewCampaign};
use crate::models::campaign_update::{CampaignUpdate, NewCampaignUpdate};
use crate::models::donation::{Donation, DonationChanges, DonationStatus, NewDonation};
use crate::models::profile::Profile;
use crate::models::withdrawal::{
    compute_fees, NewWithdrawal, Withdrawal, WithdrawalChanges, WithdrawalStatus,
};
use crate::notifications::event::NotificationEvent;
use crate::payments::PaymentGateway;
use crate::stores::{CampaignStore, IdentityStore, NotificationStore};

const MIN_GOAL: i64 = 100;
const MAX_GOAL: i64 = 10_000_000;
const MIN_PAYMENT: i64 = 1;
const MAX_CAMPAIGN_DAYS: i64 = 90;

/// Payload for opening a campaign. Validation happens in the ledger, not
/// here.
#[derive(Debug, Clone, Deserialize)]
pub struct CampaignDraft {
    pub creator_id: i64,
    pub title: String,
    pub description: String,
    pub goal_amount: BigDecimal,
    pub currency: String,
    pub end_date: DateTime<Utc>,
}

/// Campaign lifecycle, donations, refunds, withdrawals and bank accounts.
///
/// Money movement follows a strict order: the gateway call settles first,
/// then the campaign's running balance is adjusted through the store's atomic
/// operations. A gateway failure therefore never needs a compensating balance
/// write. The goal-reached transition rides a compare-and-set so two
/// donations crossing the goal together produce exactly one completion.
pub struct CampaignLedger {
    identity: Arc<dyn IdentityStore>,
    campaigns: Arc<dyn CampaignStore>,
    gateway: Arc<dyn PaymentGateway>,
    outbox: Arc<dyn NotificationStore>,
    fees: FeeConfig,
}

impl CampaignLedger {
    pub fn new(
        identity: Arc<dyn IdentityStore>,
        campaigns: Arc<dyn CampaignStore>,
        gateway: Arc<dyn PaymentGateway>,
        outbox: Arc<dyn NotificationStore>,
        fees: FeeConfig,
    ) -> Self {
        Self {
            identity,
            campaigns,
            gateway,
            outbox,
            fees,
        }
    }

    /// Opens a campaign in DRAFT. The goal must sit between 100 and
    /// 10,000,000 and the end date between 1 and 90 days out.
    pub async fn create_campaign(&self, draft: CampaignDraft) -> ServiceResult<Campaign> {
        self.require_profile(draft.creator_id).await?;
        if draft.goal_amount < BigDecimal::from(MIN_GOAL)
            || draft.goal_amount > BigDecimal::from(MAX_GOAL)
        {
            return Err(ServiceError::invalid_argument(format!(
                "goal amount must be between {} and {}",
                MIN_GOAL, MAX_GOAL
            )));
        }
        let runway = draft.end_date.signed_duration_since(Utc::now());
        if runway < Duration::days(1) || runway > Duration::days(MAX_CAMPAIGN_DAYS) {
            return Err(ServiceError::invalid_argument(format!(
                "campaign must end between 1 and {} days from now",
                MAX_CAMPAIGN_DAYS
            )));
        }
        self.campaigns
            .create_campaign(NewCampaign {
                creator_id: draft.creator_id,
                title: draft.title,
                description: draft.description,
                goal_amount: draft.goal_amount,
                currency: draft.currency,
                status: CampaignStatus::Draft,
                end_date: draft.end_date,
            })
            .await
    }

    pub async fn get_campaign(&self, id: i64) -> ServiceResult<Campaign> {
        self.require_campaign(id).await
    }

    /// Submits a draft for admin review.
    pub async fn publish(&self, creator_id: i64, campaign_id: i64) -> ServiceResult<Campaign> {
        let campaign = self.require_creator(creator_id, campaign_id).await?;
        if !campaign
            .status
            .can_transition_to(CampaignStatus::UnderReview)
        {
            return Err(ServiceError::invalid_state(
                "only a draft campaign can be published",
            ));
        }
        self.campaigns
            .update_campaign(
                campaign_id,
                CampaignChanges {
                    status: Some(CampaignStatus::UnderReview),
                    ..Default::default()
                },
            )
            .await
    }

    /// Admin approval: the campaign goes live, verified, with its start date
    /// stamped.
    pub async fn approve(&self, admin_id: i64, campaign_id: i64) -> ServiceResult<Campaign> {
        self.require_admin(admin_id).await?;
        let campaign = self.require_campaign(campaign_id).await?;
        if campaign.status != CampaignStatus::UnderReview {
            return Err(ServiceError::invalid_state("campaign is not under review"));
        }
        let campaign = self
            .campaigns
            .update_campaign(
                campaign_id,
                CampaignChanges {
                    status: Some(CampaignStatus::Active),
                    is_verified: Some(true),
                    start_date: Some(Utc::now()),
                    ..Default::default()
                },
            )
            .await?;
        self.enqueue(NotificationEvent::CampaignApproved {
            creator_id: campaign.creator_id,
            campaign_id,
        })
        .await;
        Ok(campaign)
    }

    /// Admin rejection cancels a campaign under review or already live.
    pub async fn reject(
        &self,
        admin_id: i64,
        campaign_id: i64,
        reason: String,
    ) -> ServiceResult<Campaign> {
        self.require_admin(admin_id).await?;
        let campaign = self.require_campaign(campaign_id).await?;
        if !campaign.status.can_transition_to(CampaignStatus::Cancelled) {
            return Err(ServiceError::invalid_state(format!(
                "cannot cancel a {} campaign",
                campaign.status.as_str()
            )));
        }
        let campaign = self
            .campaigns
            .update_campaign(
                campaign_id,
                CampaignChanges {
                    status: Some(CampaignStatus::Cancelled),
                    rejection_reason: Some(reason.clone()),
                    ..Default::default()
                },
            )
            .await?;
        self.enqueue(NotificationEvent::CampaignRejected {
            creator_id: campaign.creator_id,
            campaign_id,
            reason,
        })
        .await;
        Ok(campaign)
    }

    pub async fn pause(&self, creator_id: i64, campaign_id: i64) -> ServiceResult<Campaign> {
        let campaign = self.require_creator(creator_id, campaign_id).await?;
        if campaign.status != CampaignStatus::Active {
            return Err(ServiceError::invalid_state(
                "only an active campaign can be paused",
            ));
        }
        self.campaigns
            .update_campaign(
                campaign_id,
                CampaignChanges {
                    status: Some(CampaignStatus::Paused),
                    ..Default::default()
                },
            )
            .await
    }

    pub async fn resume(&self, creator_id: i64, campaign_id: i64) -> ServiceResult<Campaign> {
        let campaign = self.require_creator(creator_id, campaign_id).await?;
        if campaign.status != CampaignStatus::Paused {
            return Err(ServiceError::invalid_state(
                "only a paused campaign can be resumed",
            ));
        }
        self.campaigns
            .update_campaign(
                campaign_id,
                CampaignChanges {
                    status: Some(CampaignStatus::Active),
                    ..Default::default()
                },
            )
            .await
    }

    /// Creates a PENDING donation and settles it immediately. The returned
    /// donation reflects the settlement outcome.
    pub async fn donate(
        &self,
        donor_id: i64,
        campaign_id: i64,
        amount: BigDecimal,
        is_anonymous: bool,
        message: Option<String>,
    ) -> ServiceResult<Donation> {
        let campaign = self.require_campaign(campaign_id).await?;
        if campaign.status != CampaignStatus::Active {
            return Err(ServiceError::invalid_state(
                "campaign is not accepting donations",
            ));
        }
        if Utc::now() > campaign.end_date {
            return Err(ServiceError::invalid_state("campaign has ended"));
        }
        if amount < BigDecimal::from(MIN_PAYMENT) {
            return Err(ServiceError::invalid_argument(format!(
                "donation amount must be at least {}",
                MIN_PAYMENT
            )));
        }
        self.require_profile(donor_id).await?;

        let donation = self
            .campaigns
            .create_donation(NewDonation {
                campaign_id,
                donor_id,
                amount,
                currency: campaign.currency,
                is_anonymous,
                message,
                status: DonationStatus::Pending,
            })
            .await?;
        self.settle_donation(donation.id).await
    }

    /// Charges a pending donation and applies its progress to the campaign.
    ///
    /// The PENDING → PROCESSING step is a compare-and-set, so replaying a
    /// settlement that already ran (crash recovery, double submit) is a no-op
    /// rather than a double charge.
    pub async fn settle_donation(&self, donation_id: i64) -> ServiceResult<Donation> {
        let donation = self.require_donation(donation_id).await?;
        let claimed = self
            .campaigns
            .compare_and_set_donation_status(
                donation_id,
                DonationStatus::Pending,
                DonationStatus::Processing,
            )
            .await?;
        if !claimed {
            warn!(
                donation_id,
                status = donation.status.as_str(),
                "donation settlement replayed, nothing to do"
            );
            return Ok(donation);
        }

        let receipt = match self
            .gateway
            .charge(donation.donor_id, &donation.amount, &donation.currency)
            .await
        {
            Ok(receipt) => receipt,
            Err(e) => {
                self.campaigns
                    .update_donation(
                        donation_id,
                        DonationChanges {
                            status: Some(DonationStatus::Failed),
                            failure_reason: Some(e.to_string()),
                            ..Default::default()
                        },
                    )
                    .await?;
                return Err(e);
            }
        };

        let settled = self
            .campaigns
            .update_donation(
                donation_id,
                DonationChanges {
                    status: Some(DonationStatus::Completed),
                    transaction_id: Some(receipt.transaction_id),
                    completed_at: Some(Utc::now()),
                    ..Default::default()
                },
            )
            .await?;

        let campaign = self
            .campaigns
            .apply_donation(donation.campaign_id, &donation.amount)
            .await?;
        if campaign.goal_reached() {
            let flipped = self
                .campaigns
                .compare_and_set_status(
                    campaign.id,
                    CampaignStatus::Active,
                    CampaignStatus::Completed,
                )
                .await?;
            if flipped {
                info!(campaign_id = campaign.id, "campaign reached its goal");
                self.enqueue(NotificationEvent::GoalReached {
                    creator_id: campaign.creator_id,
                    campaign_id: campaign.id,
                })
                .await;
            }
        }
        self.enqueue(NotificationEvent::DonationReceived {
            donor_id: donation.donor_id,
            creator_id: campaign.creator_id,
            campaign_id: campaign.id,
            amount: donation.amount.clone(),
            currency: donation.currency.clone(),
            anonymous: donation.is_anonymous,
        })
        .await;
        Ok(settled)
    }

    /// Refunds a settled donation, fully when `amount` is None or partially
    /// otherwise. Progress is reversed by the refunded amount; the donor
    /// count only drops once the donation is fully refunded.
    pub async fn refund_donation(
        &self,
        donation_id: i64,
        reason: String,
        amount: Option<BigDecimal>,
    ) -> ServiceResult<Donation> {
        let donation = self.require_donation(donation_id).await?;
        if !donation.status.refundable() {
            return Err(ServiceError::invalid_argument("donation is not refundable"));
        }
        let remainder = donation.refundable_remainder();
        let refund_amount = amount.unwrap_or_else(|| remainder.clone());
        if refund_amount <= BigDecimal::from(0) {
            return Err(ServiceError::invalid_argument(
                "refund amount must be positive",
            ));
        }
        if refund_amount > remainder {
            return Err(ServiceError::invalid_argument(
                "refund amount exceeds the refundable remainder",
            ));
        }
        let transaction_id = donation.transaction_id.as_deref().ok_or_else(|| {
            ServiceError::invalid_state("donation has no settlement transaction")
        })?;

        let receipt = self.gateway.refund(transaction_id, &refund_amount).await?;
        let refunded_total = &donation.refunded_amount + &refund_amount;
        let fully_refunded = refunded_total >= donation.amount;
        let updated = self
            .campaigns
            .update_donation(
                donation_id,
                DonationChanges {
                    status: Some(if fully_refunded {
                        DonationStatus::Refunded
                    } else {
                        DonationStatus::PartiallyRefunded
                    }),
                    refund_id: Some(receipt.refund_id),
                    refunded_amount: Some(refunded_total),
                    refunded_at: fully_refunded.then(Utc::now),
                    ..Default::default()
                },
            )
            .await?;
        self.campaigns
            .reverse_donation(donation.campaign_id, &refund_amount, fully_refunded)
            .await?;
        self.enqueue(NotificationEvent::DonationRefunded {
            donor_id: donation.donor_id,
            campaign_id: donation.campaign_id,
            amount: refund_amount,
            currency: donation.currency.clone(),
            reason,
        })
        .await;
        Ok(updated)
    }

    pub async fn list_donations(
        &self,
        campaign_id: i64,
        limit: i64,
        offset: i64,
    ) -> ServiceResult<Vec<Donation>> {
        self.campaigns.list_donations(campaign_id, limit, offset).await
    }

    /// Requests a withdrawal. Every validation runs before anything is
    /// written: creator-only, verified active bank account owned by the
    /// requester, amount within the campaign balance. Fees are fixed at
    /// request time.
    pub async fn request_withdrawal(
        &self,
        requester_id: i64,
        campaign_id: i64,
        bank_account_id: i64,
        amount: BigDecimal,
    ) -> ServiceResult<Withdrawal> {
        let campaign = self.require_campaign(campaign_id).await?;
        if campaign.creator_id != requester_id {
            return Err(ServiceError::unauthorized(
                "only the creator can withdraw from a campaign",
            ));
        }
        let account = self.require_bank_account(bank_account_id).await?;
        if account.owner_id != requester_id {
            return Err(ServiceError::invalid_argument(
                "bank account does not belong to the requester",
            ));
        }
        if !account.is_verified {
            return Err(ServiceError::invalid_argument("bank account is not verified"));
        }
        if !account.is_active {
            return Err(ServiceError::invalid_argument("bank account is not active"));
        }
        if amount < BigDecimal::from(MIN_PAYMENT) {
            return Err(ServiceError::invalid_argument(format!(
                "withdrawal amount must be at least {}",
                MIN_PAYMENT
            )));
        }
        if amount > campaign.current_amount {
            return Err(ServiceError::invalid_argument(
                "withdrawal amount exceeds the campaign balance",
            ));
        }

        let fees = compute_fees(&amount, &self.fees);
        self.campaigns
            .create_withdrawal(NewWithdrawal {
                campaign_id,
                requester_id,
                bank_account_id,
                amount,
                platform_fee: fees.platform_fee,
                gateway_fee: fees.gateway_fee,
                net_amount: fees.net_amount,
                currency: campaign.currency,
                status: WithdrawalStatus::Pending,
            })
            .await
    }

    /// Approves a pending withdrawal and immediately attempts the transfer.
    ///
    /// The net amount goes out through the gateway; the campaign balance is
    /// debited by the gross amount only after the transfer succeeds, so a
    /// failed transfer leaves the funds where they were.
    pub async fn approve_withdrawal(
        &self,
        admin_id: i64,
        withdrawal_id: i64,
    ) -> ServiceResult<Withdrawal> {
        self.require_admin(admin_id).await?;
        let withdrawal = self.require_withdrawal(withdrawal_id).await?;
        if withdrawal.status != WithdrawalStatus::Pending {
            return Err(ServiceError::invalid_state("withdrawal is not pending"));
        }

        self.campaigns
            .update_withdrawal(
                withdrawal_id,
                WithdrawalChanges {
                    status: Some(WithdrawalStatus::Approved),
                    ..Default::default()
                },
            )
            .await?;
        self.enqueue(NotificationEvent::WithdrawalApproved {
            requester_id: withdrawal.requester_id,
            withdrawal_id,
            campaign_id: withdrawal.campaign_id,
        })
        .await;
        self.campaigns
            .update_withdrawal(
                withdrawal_id,
                WithdrawalChanges {
                    status: Some(WithdrawalStatus::Processing),
                    ..Default::default()
                },
            )
            .await?;

        let receipt = match self
            .gateway
            .transfer(
                withdrawal.bank_account_id,
                &withdrawal.net_amount,
                &withdrawal.currency,
            )
            .await
        {
            Ok(receipt) => receipt,
            Err(e) => {
                self.campaigns
                    .update_withdrawal(
                        withdrawal_id,
                        WithdrawalChanges {
                            status: Some(WithdrawalStatus::Failed),
                            failure_reason: Some(e.to_string()),
                            ..Default::default()
                        },
                    )
                    .await?;
                self.enqueue(NotificationEvent::WithdrawalFailed {
                    requester_id: withdrawal.requester_id,
                    withdrawal_id,
                    campaign_id: withdrawal.campaign_id,
                    reason: e.to_string(),
                })
                .await;
                return Err(e);
            }
        };

        let completed = self
            .campaigns
            .update_withdrawal(
                withdrawal_id,
                WithdrawalChanges {
                    status: Some(WithdrawalStatus::Completed),
                    transfer_id: Some(receipt.transfer_id),
                    processed_at: Some(Utc::now()),
                    ..Default::default()
                },
            )
            .await?;
        self.campaigns
            .debit_withdrawal(withdrawal.campaign_id, &withdrawal.amount)
            .await?;
        self.enqueue(NotificationEvent::WithdrawalCompleted {
            requester_id: withdrawal.requester_id,
            withdrawal_id,
            campaign_id: withdrawal.campaign_id,
        })
        .await;
        Ok(completed)
    }

    pub async fn reject_withdrawal(
        &self,
        admin_id: i64,
        withdrawal_id: i64,
        reason: String,
    ) -> ServiceResult<Withdrawal> {
        self.require_admin(admin_id).await?;
        let withdrawal = self.require_withdrawal(withdrawal_id).await?;
        if withdrawal.status != WithdrawalStatus::Pending {
            return Err(ServiceError::invalid_state("withdrawal is not pending"));
        }
        let rejected = self
            .campaigns
            .update_withdrawal(
                withdrawal_id,
                WithdrawalChanges {
                    status: Some(WithdrawalStatus::Rejected),
                    rejection_reason: Some(reason.clone()),
                    ..Default::default()
                },
            )
            .await?;
        self.enqueue(NotificationEvent::WithdrawalRejected {
            requester_id: withdrawal.requester_id,
            withdrawal_id,
            campaign_id: withdrawal.campaign_id,
            reason,
        })
        .await;
        Ok(rejected)
    }

    pub async fn list_withdrawals(
        &self,
        campaign_id: i64,
        limit: i64,
        offset: i64,
    ) -> ServiceResult<Vec<Withdrawal>> {
        self.campaigns
            .list_withdrawals(campaign_id, limit, offset)
            .await
    }

    /// Posts a progress update and fans it out to the campaign's donors
    /// through the dispatcher.
    pub async fn post_update(
        &self,
        author_id: i64,
        campaign_id: i64,
        title: String,
        body: String,
        is_milestone: bool,
    ) -> ServiceResult<CampaignUpdate> {
        let campaign = self.require_creator(author_id, campaign_id).await?;
        if !matches!(
            campaign.status,
            CampaignStatus::Active | CampaignStatus::Completed
        ) {
            return Err(ServiceError::invalid_state(
                "updates are only allowed on active or completed campaigns",
            ));
        }
        let update = self
            .campaigns
            .create_update(NewCampaignUpdate {
                campaign_id,
                author_id,
                title: title.clone(),
                body,
                is_milestone,
            })
            .await?;
        self.enqueue(NotificationEvent::CampaignUpdatePosted {
            campaign_id,
            author_id,
            update_id: update.id,
            title,
            milestone: is_milestone,
        })
        .await;
        Ok(update)
    }

    pub async fn list_updates(
        &self,
        campaign_id: i64,
        limit: i64,
        offset: i64,
    ) -> ServiceResult<Vec<CampaignUpdate>> {
        self.campaigns.list_updates(campaign_id, limit, offset).await
    }

    /// Registers a bank account. The owner's first account becomes primary
    /// automatically.
    pub async fn add_bank_account(
        &self,
        owner_id: i64,
        mut new: NewBankAccount,
    ) -> ServiceResult<BankAccount> {
        self.require_profile(owner_id).await?;
        new.owner_id = owner_id;
        new.is_primary = self.campaigns.count_bank_accounts(owner_id).await? == 0;
        self.campaigns.create_bank_account(new).await
    }

    /// Marks an account verified against the submitted document. Verification
    /// is one-way; a verified account can only be deactivated, never edited.
    pub async fn verify_bank_account(
        &self,
        owner_id: i64,
        account_id: i64,
        document_url: String,
    ) -> ServiceResult<BankAccount> {
        let account = self.require_owned_account(owner_id, account_id).await?;
        if account.is_verified {
            return Err(ServiceError::invalid_argument(
                "bank account is already verified",
            ));
        }
        let verified = self
            .campaigns
            .update_bank_account(
                account_id,
                BankAccountChanges {
                    is_verified: Some(true),
                    verification_document_url: Some(document_url),
                    verified_at: Some(Utc::now()),
                    ..Default::default()
                },
            )
            .await?;
        self.enqueue(NotificationEvent::BankAccountVerified {
            owner_id,
            masked_account: verified.masked_account_number(),
        })
        .await;
        Ok(verified)
    }

    pub async fn set_primary_bank_account(
        &self,
        owner_id: i64,
        account_id: i64,
    ) -> ServiceResult<()> {
        self.require_owned_account(owner_id, account_id).await?;
        self.campaigns
            .set_primary_bank_account(owner_id, account_id)
            .await
    }

    /// Edits holder name, bank name or routing number on an unverified
    /// account. Verified accounts are immutable.
    pub async fn update_bank_account(
        &self,
        owner_id: i64,
        account_id: i64,
        changes: BankAccountChanges,
    ) -> ServiceResult<BankAccount> {
        let account = self.require_owned_account(owner_id, account_id).await?;
        if account.is_verified {
            return Err(ServiceError::invalid_state(
                "verified bank accounts cannot be edited",
            ));
        }
        // Only the descriptive fields are caller-editable; verification and
        // primary flags have their own paths.
        let changes = BankAccountChanges {
            is_primary: None,
            is_verified: None,
            is_active: None,
            verification_document_url: None,
            verified_at: None,
            ..changes
        };
        // An all-None edit is a no-op, not a diesel error.
        if changes.account_holder_name.is_none()
            && changes.bank_name.is_none()
            && changes.routing_number.is_none()
        {
            return Ok(account);
        }
        self.campaigns.update_bank_account(account_id, changes).await
    }

    /// Removes an account. Verified accounts are deactivated in place so the
    /// withdrawal history keeps its reference; unverified ones are deleted.
    pub async fn remove_bank_account(&self, owner_id: i64, account_id: i64) -> ServiceResult<()> {
        let account = self.require_owned_account(owner_id, account_id).await?;
        if account.is_verified {
            self.campaigns
                .update_bank_account(
                    account_id,
                    BankAccountChanges {
                        is_active: Some(false),
                        ..Default::default()
                    },
                )
                .await?;
        } else {
            self.campaigns.delete_bank_account(account_id).await?;
        }
        Ok(())
    }

    pub async fn list_bank_accounts(&self, owner_id: i64) -> ServiceResult<Vec<BankAccount>> {
        self.campaigns.list_bank_accounts(owner_id).await
    }

    async fn require_campaign(&self, id: i64) -> ServiceResult<Campaign> {
        self.campaigns
            .get_campaign(id)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("campaign {}", id)))
    }

    async fn require_creator(&self, creator_id: i64, campaign_id: i64) -> ServiceResult<Campaign> {
        let campaign = self.require_campaign(campaign_id).await?;
        if campaign.creator_id != creator_id {
            return Err(ServiceError::unauthorized(
                "only the creator can manage a campaign",
            ));
        }
        Ok(campaign)
    }

    async fn require_donation(&self, id: i64) -> ServiceResult<Donation> {
        self.campaigns
            .get_donation(id)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("donation {}", id)))
    }

    async fn require_withdrawal(&self, id: i64) -> ServiceResult<Withdrawal> {
        self.campaigns
            .get_withdrawal(id)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("withdrawal {}", id)))
    }

    async fn require_bank_account(&self, id: i64) -> ServiceResult<BankAccount> {
        self.campaigns
            .get_bank_account(id)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("bank account {}", id)))
    }

    async fn require_owned_account(
        &self,
        owner_id: i64,
        account_id: i64,
    ) -> ServiceResult<BankAccount> {
        let account = self.require_bank_account(account_id).await?;
        if account.owner_id != owner_id {
            return Err(ServiceError::unauthorized(
                "bank account belongs to another profile",
            ));
        }
        Ok(account)
    }

    async fn require_profile(&self, id: i64) -> ServiceResult<()> {
        self.identity
            .get_profile(id)
            .await?
            .map(|_| ())
            .ok_or_else(|| ServiceError::not_found(format!("profile {}", id)))
    }

    async fn require_admin(&self, id: i64) -> ServiceResult<Profile> {
        let profile = self
            .identity
            .get_profile(id)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("profile {}", id)))?;
        if !profile.is_admin() {
            return Err(ServiceError::unauthorized("admin role required"));
        }
        Ok(profile)
    }

    async fn enqueue(&self, event: NotificationEvent) {
        if let Err(e) = self.outbox.enqueue(&event).await {
            warn!("failed to enqueue notification event: {}", e);
        }
    }
}
