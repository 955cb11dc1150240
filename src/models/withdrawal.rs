// Copyright (c) CrowdPulse Team
// SPDX-License-Identifier: Apache-2.0

use bigdecimal::{BigDecimal, RoundingMode};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::FeeConfig;
use crate::models::text_enum;
use crate::schema::withdrawals;

text_enum! {
    /// Withdrawal request lifecycle.
    WithdrawalStatus {
        Pending => "PENDING",
        Approved => "APPROVED",
        Processing => "PROCESSING",
        Completed => "COMPLETED",
        Rejected => "REJECTED",
        Failed => "FAILED",
    }
}

impl WithdrawalStatus {
    pub fn can_transition_to(&self, target: WithdrawalStatus) -> bool {
        use WithdrawalStatus::*;
        matches!(
            (self, target),
            (Pending, Approved)
                | (Pending, Rejected)
                | (Approved, Processing)
                | (Processing, Completed)
                | (Processing, Failed)
        )
    }
}

/// Fee breakdown computed when a withdrawal is requested.
#[derive(Debug, Clone, PartialEq)]
pub struct WithdrawalFees {
    pub platform_fee: BigDecimal,
    pub gateway_fee: BigDecimal,
    pub net_amount: BigDecimal,
}

/// Deterministic fee computation: percentages come from configuration,
/// amounts are rounded half-up to two decimal places.
pub fn compute_fees(amount: &BigDecimal, fees: &FeeConfig) -> WithdrawalFees {
    let hundred = BigDecimal::from(100);
    let platform_fee = (amount * &fees.platform_fee_percent / &hundred)
        .with_scale_round(2, RoundingMode::HalfUp);
    let gateway_fee = (amount * &fees.gateway_fee_percent / &hundred)
        .with_scale_round(2, RoundingMode::HalfUp);
    let net_amount = (amount - &platform_fee - &gateway_fee).with_scale(2);
    WithdrawalFees {
        platform_fee,
        gateway_fee,
        net_amount,
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = withdrawals)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Withdrawal {
    pub id: i64,
    pub campaign_id: i64,
    pub requester_id: i64,
    pub bank_account_id: i64,
    pub amount: BigDecimal,
    pub platform_fee: BigDecimal,
    pub gateway_fee: BigDecimal,
    pub net_amount: BigDecimal,
    pub currency: String,
    pub status: WithdrawalStatus,
    pub transfer_id: Option<String>,
    pub failure_reason: Option<String>,
    pub rejection_reason: Option<String>,
    pub requested_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = withdrawals)]
pub struct NewWithdrawal {
    pub campaign_id: i64,
    pub requester_id: i64,
    pub bank_account_id: i64,
    pub amount: BigDecimal,
    pub platform_fee: BigDecimal,
    pub gateway_fee: BigDecimal,
    pub net_amount: BigDecimal,
    pub currency: String,
    pub status: WithdrawalStatus,
}

#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = withdrawals)]
pub struct WithdrawalChanges {
    pub status: Option<WithdrawalStatus>,
    pub transfer_id: Option<String>,
    pub failure_reason: Option<String>,
    pub rejection_reason: Option<String>,
    pub processed_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn fees_for_one_hundred_match_the_contract() {
        let fees = compute_fees(&BigDecimal::from(100), &FeeConfig::default());
        assert_eq!(fees.platform_fee, BigDecimal::from_str("5.00").unwrap());
        assert_eq!(fees.gateway_fee, BigDecimal::from_str("2.00").unwrap());
        assert_eq!(fees.net_amount, BigDecimal::from_str("93.00").unwrap());
    }

    #[test]
    fn odd_amounts_round_half_up_to_two_places() {
        // 33.33 -> platform 1.6665 rounds to 1.67, gateway 0.6666 rounds to 0.67
        let fees = compute_fees(
            &BigDecimal::from_str("33.33").unwrap(),
            &FeeConfig::default(),
        );
        assert_eq!(fees.platform_fee, BigDecimal::from_str("1.67").unwrap());
        assert_eq!(fees.gateway_fee, BigDecimal::from_str("0.67").unwrap());
        assert_eq!(fees.net_amount, BigDecimal::from_str("30.99").unwrap());
    }

    #[test]
    fn approval_gates_the_transfer_states() {
        use WithdrawalStatus::*;
        assert!(Pending.can_transition_to(Approved));
        assert!(Pending.can_transition_to(Rejected));
        assert!(Approved.can_transition_to(Processing));
        assert!(Processing.can_transition_to(Completed));
        assert!(Processing.can_transition_to(Failed));
        assert!(!Pending.can_transition_to(Completed));
        assert!(!Rejected.can_transition_to(Approved));
        assert!(!Completed.can_transition_to(Failed));
    }
}
