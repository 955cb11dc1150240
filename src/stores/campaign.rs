// Copyright (c) CrowdPulse Team
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use std::sync::Arc;

use crate::db::Database;
use crate::error::{ServiceError, ServiceResult};
use crate::models::bank_account::{BankAccount, BankAccountChanges, NewBankAccount};
use crate::models::campaign::{Campaign, CampaignChanges, CampaignStatus, NewCampaign};
use crate::models::campaign_update::{CampaignUpdate, NewCampaignUpdate};
use crate::models::donation::{Donation, DonationChanges, DonationStatus, NewDonation};
use crate::models::withdrawal::{NewWithdrawal, Withdrawal, WithdrawalChanges};
use crate::schema::{bank_accounts, campaign_updates, campaigns, donations, withdrawals};

/// Campaign ledger persistence: campaigns plus their donations, withdrawals,
/// bank accounts and progress updates.
///
/// Financial arithmetic (progress apply/reverse, withdrawal debit) happens in
/// single atomic statements; status changes that must fire exactly once go
/// through `compare_and_set_status`.
#[async_trait]
pub trait CampaignStore: Send + Sync {
    async fn create_campaign(&self, new: NewCampaign) -> ServiceResult<Campaign>;
    async fn get_campaign(&self, id: i64) -> ServiceResult<Option<Campaign>>;
    async fn update_campaign(&self, id: i64, changes: CampaignChanges) -> ServiceResult<Campaign>;
    /// Atomically transition `from` → `to`; returns false when the campaign
    /// was no longer in `from` (another caller got there first).
    async fn compare_and_set_status(
        &self,
        id: i64,
        from: CampaignStatus,
        to: CampaignStatus,
    ) -> ServiceResult<bool>;
    /// current_amount += amount, donor_count += 1, atomically.
    async fn apply_donation(&self, id: i64, amount: &BigDecimal) -> ServiceResult<Campaign>;
    /// current_amount -= amount (no floor, a documented gap);
    /// donor_count -= 1 clamped at zero when `decrement_donor` is set.
    async fn reverse_donation(
        &self,
        id: i64,
        amount: &BigDecimal,
        decrement_donor: bool,
    ) -> ServiceResult<Campaign>;
    /// current_amount -= amount after a completed withdrawal transfer.
    async fn debit_withdrawal(&self, id: i64, amount: &BigDecimal) -> ServiceResult<Campaign>;

    async fn create_donation(&self, new: NewDonation) -> ServiceResult<Donation>;
    async fn get_donation(&self, id: i64) -> ServiceResult<Option<Donation>>;
    async fn update_donation(&self, id: i64, changes: DonationChanges) -> ServiceResult<Donation>;
    /// Atomically transition a donation `from` → `to`; false when missed.
    async fn compare_and_set_donation_status(
        &self,
        id: i64,
        from: DonationStatus,
        to: DonationStatus,
    ) -> ServiceResult<bool>;
    async fn list_donations(
        &self,
        campaign_id: i64,
        limit: i64,
        offset: i64,
    ) -> ServiceResult<Vec<Donation>>;
    /// Distinct donors with a settled donation, for update fan-out.
    async fn distinct_completed_donors(&self, campaign_id: i64) -> ServiceResult<Vec<i64>>;

    async fn create_withdrawal(&self, new: NewWithdrawal) -> ServiceResult<Withdrawal>;
    async fn get_withdrawal(&self, id: i64) -> ServiceResult<Option<Withdrawal>>;
    async fn update_withdrawal(
        &self,
        id: i64,
        changes: WithdrawalChanges,
    ) -> ServiceResult<Withdrawal>;
    async fn list_withdrawals(
        &self,
        campaign_id: i64,
        limit: i64,
        offset: i64,
    ) -> ServiceResult<Vec<Withdrawal>>;

    async fn create_bank_account(&self, new: NewBankAccount) -> ServiceResult<BankAccount>;
    async fn get_bank_account(&self, id: i64) -> ServiceResult<Option<BankAccount>>;
    async fn list_bank_accounts(&self, owner_id: i64) -> ServiceResult<Vec<BankAccount>>;
    async fn count_bank_accounts(&self, owner_id: i64) -> ServiceResult<i64>;
    async fn update_bank_account(
        &self,
        id: i64,
        changes: BankAccountChanges,
    ) -> ServiceResult<BankAccount>;
    /// Marks one account primary and unsets every other account of the same
    /// owner in the same transaction (the one-primary invariant).
    async fn set_primary_bank_account(&self, owner_id: i64, account_id: i64) -> ServiceResult<()>;
    async fn delete_bank_account(&self, id: i64) -> ServiceResult<bool>;

    /// Inserts the update and bumps the campaign's update/milestone counters.
    async fn create_update(&self, new: NewCampaignUpdate) -> ServiceResult<CampaignUpdate>;
    async fn list_updates(
        &self,
        campaign_id: i64,
        limit: i64,
        offset: i64,
    ) -> ServiceResult<Vec<CampaignUpdate>>;
}

pub struct PgCampaignStore {
    db: Arc<Database>,
}

impl PgCampaignStore {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CampaignStore for PgCampaignStore {
    async fn create_campaign(&self, new: NewCampaign) -> ServiceResult<Campaign> {
        let mut conn = self.db.get_connection().await?;
        let campaign = diesel::insert_into(campaigns::table)
            .values(&new)
            .get_result::<Campaign>(&mut conn)
            .await?;
        Ok(campaign)
    }

    async fn get_campaign(&self, id: i64) -> ServiceResult<Option<Campaign>> {
        let mut conn = self.db.get_connection().await?;
        let campaign = campaigns::table
            .find(id)
            .first::<Campaign>(&mut conn)
            .await
            .optional()?;
        Ok(campaign)
    }

    async fn update_campaign(&self, id: i64, changes: CampaignChanges) -> ServiceResult<Campaign> {
        let mut conn = self.db.get_connection().await?;
        let campaign = diesel::update(campaigns::table.find(id))
            .set(&changes)
            .get_result::<Campaign>(&mut conn)
            .await
            .map_err(|e| match e {
                diesel::result::Error::NotFound => {
                    ServiceError::not_found(format!("campaign {}", id))
                }
                other => other.into(),
            })?;
        Ok(campaign)
    }

    async fn compare_and_set_status(
        &self,
        id: i64,
        from: CampaignStatus,
        to: CampaignStatus,
    ) -> ServiceResult<bool> {
        let mut conn = self.db.get_connection().await?;
        let changed = diesel::update(
            campaigns::table
                .find(id)
                .filter(campaigns::status.eq(from)),
        )
        .set(campaigns::status.eq(to))
        .execute(&mut conn)
        .await?;
        Ok(changed > 0)
    }

    async fn apply_donation(&self, id: i64, amount: &BigDecimal) -> ServiceResult<Campaign> {
        let mut conn = self.db.get_connection().await?;
        let campaign = diesel::update(campaigns::table.find(id))
            .set((
                campaigns::current_amount.eq(campaigns::current_amount + amount.clone()),
                campaigns::donor_count.eq(campaigns::donor_count + 1),
            ))
            .get_result::<Campaign>(&mut conn)
            .await
            .map_err(|e| match e {
                diesel::result::Error::NotFound => {
                    ServiceError::not_found(format!("campaign {}", id))
                }
                other => other.into(),
            })?;
        Ok(campaign)
    }

    async fn reverse_donation(
        &self,
        id: i64,
        amount: &BigDecimal,
        decrement_donor: bool,
    ) -> ServiceResult<Campaign> {
        let mut conn = self.db.get_connection().await?;
        // No floor on current_amount: refunds after withdrawals can push the
        // balance negative, a known gap kept until the business picks a policy.
        let campaign = if decrement_donor {
            diesel::update(campaigns::table.find(id))
                .set((
                    campaigns::current_amount.eq(campaigns::current_amount - amount.clone()),
                    campaigns::donor_count
                        .eq(diesel::dsl::sql::<diesel::sql_types::Int4>(
                            "GREATEST(0, donor_count - 1)",
                        )),
                ))
                .get_result::<Campaign>(&mut conn)
                .await
        } else {
            diesel::update(campaigns::table.find(id))
                .set(campaigns::current_amount.eq(campaigns::current_amount - amount.clone()))
                .get_result::<Campaign>(&mut conn)
                .await
        }
        .map_err(|e| match e {
            diesel::result::Error::NotFound => ServiceError::not_found(format!("campaign {}", id)),
            other => other.into(),
        })?;
        Ok(campaign)
    }

    async fn debit_withdrawal(&self, id: i64, amount: &BigDecimal) -> ServiceResult<Campaign> {
        let mut conn = self.db.get_connection().await?;
        let campaign = diesel::update(campaigns::table.find(id))
            .set(campaigns::current_amount.eq(campaigns::current_amount - amount.clone()))
            .get_result::<Campaign>(&mut conn)
            .await
            .map_err(|e| match e {
                diesel::result::Error::NotFound => {
                    ServiceError::not_found(format!("campaign {}", id))
                }
                other => other.into(),
            })?;
        Ok(campaign)
    }

    async fn create_donation(&self, new: NewDonation) -> ServiceResult<Donation> {
        let mut conn = self.db.get_connection().await?;
        let donation = diesel::insert_into(donations::table)
            .values(&new)
            .get_result::<Donation>(&mut conn)
            .await?;
        Ok(donation)
    }

    async fn get_donation(&self, id: i64) -> ServiceResult<Option<Donation>> {
        let mut conn = self.db.get_connection().await?;
        let donation = donations::table
            .find(id)
            .first::<Donation>(&mut conn)
            .await
            .optional()?;
        Ok(donation)
    }

    async fn update_donation(&self, id: i64, changes: DonationChanges) -> ServiceResult<Donation> {
        let mut conn = self.db.get_connection().await?;
        let donation = diesel::update(donations::table.find(id))
            .set(&changes)
            .get_result::<Donation>(&mut conn)
            .await
            .map_err(|e| match e {
                diesel::result::Error::NotFound => {
                    ServiceError::not_found(format!("donation {}", id))
                }
                other => other.into(),
            })?;
        Ok(donation)
    }

    async fn compare_and_set_donation_status(
        &self,
        id: i64,
        from: DonationStatus,
        to: DonationStatus,
    ) -> ServiceResult<bool> {
        let mut conn = self.db.get_connection().await?;
        let changed = diesel::update(
            donations::table
                .find(id)
                .filter(donations::status.eq(from)),
        )
        .set(donations::status.eq(to))
        .execute(&mut conn)
        .await?;
        Ok(changed > 0)
    }

    async fn list_donations(
        &self,
        campaign_id: i64,
        limit: i64,
        offset: i64,
    ) -> ServiceResult<Vec<Donation>> {
        let mut conn = self.db.get_connection().await?;
        let found = donations::table
            .filter(donations::campaign_id.eq(campaign_id))
            .order(donations::created_at.desc())
            .limit(limit)
            .offset(offset)
            .load::<Donation>(&mut conn)
            .await?;
        Ok(found)
    }

    async fn distinct_completed_donors(&self, campaign_id: i64) -> ServiceResult<Vec<i64>> {
        let mut conn = self.db.get_connection().await?;
        let donors = donations::table
            .filter(donations::campaign_id.eq(campaign_id))
            .filter(donations::status.eq_any(vec![
                DonationStatus::Completed,
                DonationStatus::PartiallyRefunded,
            ]))
            .select(donations::donor_id)
            .distinct()
            .load::<i64>(&mut conn)
            .await?;
        Ok(donors)
    }

    async fn create_withdrawal(&self, new: NewWithdrawal) -> ServiceResult<Withdrawal> {
        let mut conn = self.db.get_connection().await?;
        let withdrawal = diesel::insert_into(withdrawals::table)
            .values(&new)
            .get_result::<Withdrawal>(&mut conn)
            .await?;
        Ok(withdrawal)
    }

    async fn get_withdrawal(&self, id: i64) -> ServiceResult<Option<Withdrawal>> {
        let mut conn = self.db.get_connection().await?;
        let withdrawal = withdrawals::table
            .find(id)
            .first::<Withdrawal>(&mut conn)
            .await
            .optional()?;
        Ok(withdrawal)
    }

    async fn update_withdrawal(
        &self,
        id: i64,
        changes: WithdrawalChanges,
    ) -> ServiceResult<Withdrawal> {
        let mut conn = self.db.get_connection().await?;
        let withdrawal = diesel::update(withdrawals::table.find(id))
            .set(&changes)
            .get_result::<Withdrawal>(&mut conn)
            .await
            .map_err(|e| match e {
                diesel::result::Error::NotFound => {
                    ServiceError::not_found(format!("withdrawal {}", id))
                }
                other => other.into(),
            })?;
        Ok(withdrawal)
    }

    async fn list_withdrawals(
        &self,
        campaign_id: i64,
        limit: i64,
        offset: i64,
    ) -> ServiceResult<Vec<Withdrawal>> {
        let mut conn = self.db.get_connection().await?;
        let found = withdrawals::table
            .filter(withdrawals::campaign_id.eq(campaign_id))
            .order(withdrawals::requested_at.desc())
            .limit(limit)
            .offset(offset)
            .load::<Withdrawal>(&mut conn)
            .await?;
        Ok(found)
    }

    async fn create_bank_account(&self, new: NewBankAccount) -> ServiceResult<BankAccount> {
        let mut conn = self.db.get_connection().await?;
        let account = diesel::insert_into(bank_accounts::table)
            .values(&new)
            .get_result::<BankAccount>(&mut conn)
            .await?;
        Ok(account)
    }

    async fn get_bank_account(&self, id: i64) -> ServiceResult<Option<BankAccount>> {
        let mut conn = self.db.get_connection().await?;
        let account = bank_accounts::table
            .find(id)
            .first::<BankAccount>(&mut conn)
            .await
            .optional()?;
        Ok(account)
    }

    async fn list_bank_accounts(&self, owner_id: i64) -> ServiceResult<Vec<BankAccount>> {
        let mut conn = self.db.get_connection().await?;
        let found = bank_accounts::table
            .filter(bank_accounts::owner_id.eq(owner_id))
            .filter(bank_accounts::is_active.eq(true))
            .order(bank_accounts::created_at.asc())
            .load::<BankAccount>(&mut conn)
            .await?;
        Ok(found)
    }

    async fn count_bank_accounts(&self, owner_id: i64) -> ServiceResult<i64> {
        let mut conn = self.db.get_connection().await?;
        let count = bank_accounts::table
            .filter(bank_accounts::owner_id.eq(owner_id))
            .filter(bank_accounts::is_active.eq(true))
            .count()
            .get_result::<i64>(&mut conn)
            .await?;
        Ok(count)
    }

    async fn update_bank_account(
        &self,
        id: i64,
        changes: BankAccountChanges,
    ) -> ServiceResult<BankAccount> {
        let mut conn = self.db.get_connection().await?;
        let account = diesel::update(bank_accounts::table.find(id))
            .set(&changes)
            .get_result::<BankAccount>(&mut conn)
            .await
            .map_err(|e| match e {
                diesel::result::Error::NotFound => {
                    ServiceError::not_found(format!("bank account {}", id))
                }
                other => other.into(),
            })?;
        Ok(account)
    }

    async fn set_primary_bank_account(&self, owner_id: i64, account_id: i64) -> ServiceResult<()> {
        let mut conn = self.db.get_connection().await?;
        conn.transaction::<_, diesel::result::Error, _>(|conn| {
            async move {
                diesel::update(
                    bank_accounts::table.filter(bank_accounts::owner_id.eq(owner_id)),
                )
                .set(bank_accounts::is_primary.eq(false))
                .execute(conn)
                .await?;

                diesel::update(bank_accounts::table.find(account_id))
                    .set(bank_accounts::is_primary.eq(true))
                    .execute(conn)
                    .await?;

                Ok(())
            }
            .scope_boxed()
        })
        .await?;
        Ok(())
    }

    async fn delete_bank_account(&self, id: i64) -> ServiceResult<bool> {
        let mut conn = self.db.get_connection().await?;
        let removed = diesel::delete(bank_accounts::table.find(id))
            .execute(&mut conn)
            .await?;
        Ok(removed > 0)
    }

    async fn create_update(&self, new: NewCampaignUpdate) -> ServiceResult<CampaignUpdate> {
        let mut conn = self.db.get_connection().await?;
        let update = conn
            .transaction::<_, diesel::result::Error, _>(|conn| {
                async move {
                    let update = diesel::insert_into(campaign_updates::table)
                        .values(&new)
                        .get_result::<CampaignUpdate>(conn)
                        .await?;

                    let bump = diesel::update(campaigns::table.find(new.campaign_id));
                    if new.is_milestone {
                        bump.set((
                            campaigns::updates_count.eq(campaigns::updates_count + 1),
                            campaigns::milestones_count.eq(campaigns::milestones_count + 1),
                        ))
                        .execute(conn)
                        .await?;
                    } else {
                        bump.set(campaigns::updates_count.eq(campaigns::updates_count + 1))
                            .execute(conn)
                            .await?;
                    }

                    Ok(update)
                }
                .scope_boxed()
            })
            .await?;
        Ok(update)
    }

    async fn list_updates(
        &self,
        campaign_id: i64,
        limit: i64,
        offset: i64,
    ) -> ServiceResult<Vec<CampaignUpdate>> {
        let mut conn = self.db.get_connection().await?;
        let found = campaign_updates::table
            .filter(campaign_updates::campaign_id.eq(campaign_id))
            .order(campaign_updates::created_at.desc())
            .limit(limit)
            .offset(offset)
            .load::<CampaignUpdate>(&mut conn)
            .await?;
        Ok(found)
    }
}
