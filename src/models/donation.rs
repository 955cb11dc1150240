// Copyright (c) CrowdPulse Team
// SPDX-License-Identifier: Apache-2.0

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::models::text_enum;
use crate::schema::donations;

text_enum! {
    /// Payment lifecycle of a donation.
    DonationStatus {
        Pending => "PENDING",
        Processing => "PROCESSING",
        Completed => "COMPLETED",
        Failed => "FAILED",
        Refunded => "REFUNDED",
        PartiallyRefunded => "PARTIALLY_REFUNDED",
    }
}

impl DonationStatus {
    pub fn can_transition_to(&self, target: DonationStatus) -> bool {
        use DonationStatus::*;
        matches!(
            (self, target),
            (Pending, Processing)
                | (Processing, Completed)
                | (Processing, Failed)
                | (Completed, Refunded)
                | (Completed, PartiallyRefunded)
                | (PartiallyRefunded, Refunded)
                | (PartiallyRefunded, PartiallyRefunded)
        )
    }

    /// Refunds are only accepted against settled, not-fully-refunded donations.
    pub fn refundable(&self) -> bool {
        matches!(
            self,
            DonationStatus::Completed | DonationStatus::PartiallyRefunded
        )
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = donations)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Donation {
    pub id: i64,
    pub campaign_id: i64,
    pub donor_id: i64,
    pub amount: BigDecimal,
    pub currency: String,
    pub is_anonymous: bool,
    pub message: Option<String>,
    pub status: DonationStatus,
    pub transaction_id: Option<String>,
    pub refund_id: Option<String>,
    pub refunded_amount: BigDecimal,
    pub failure_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub refunded_at: Option<DateTime<Utc>>,
}

impl Donation {
    pub fn refundable_remainder(&self) -> BigDecimal {
        &self.amount - &self.refunded_amount
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = donations)]
pub struct NewDonation {
    pub campaign_id: i64,
    pub donor_id: i64,
    pub amount: BigDecimal,
    pub currency: String,
    pub is_anonymous: bool,
    pub message: Option<String>,
    pub status: DonationStatus,
}

#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = donations)]
pub struct DonationChanges {
    pub status: Option<DonationStatus>,
    pub transaction_id: Option<String>,
    pub refund_id: Option<String>,
    pub refunded_amount: Option<BigDecimal>,
    pub failure_reason: Option<String>,
    pub completed_at: Option<DateTime<Utc>>,
    pub refunded_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settlement_path_is_one_way() {
        use DonationStatus::*;
        assert!(Pending.can_transition_to(Processing));
        assert!(Processing.can_transition_to(Completed));
        assert!(Processing.can_transition_to(Failed));
        assert!(!Failed.can_transition_to(Completed));
        assert!(!Refunded.can_transition_to(Completed));
        assert!(!Pending.can_transition_to(Completed));
    }

    #[test]
    fn only_settled_donations_are_refundable() {
        assert!(DonationStatus::Completed.refundable());
        assert!(DonationStatus::PartiallyRefunded.refundable());
        assert!(!DonationStatus::Pending.refundable());
        assert!(!DonationStatus::Refunded.refundable());
        assert!(!DonationStatus::Failed.refundable());
    }
}
