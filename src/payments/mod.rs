// Copyright (c) CrowdPulse Team
// SPDX-License-Identifier: Apache-2.0

//! Payment gateway boundary. The ledger engine only ever talks to the
//! [`PaymentGateway`] trait; the simulated implementation stands in for the
//! real processor in development and in tests.

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tracing::debug;

use crate::error::{ServiceError, ServiceResult};

#[derive(Debug, Clone)]
pub struct ChargeReceipt {
    pub transaction_id: String,
}

#[derive(Debug, Clone)]
pub struct RefundReceipt {
    pub refund_id: String,
}

#[derive(Debug, Clone)]
pub struct TransferReceipt {
    pub transfer_id: String,
}

/// External money movement. Every call can fail upstream; callers must
/// record the failure on their side before surfacing the error.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn charge(
        &self,
        donor_id: i64,
        amount: &BigDecimal,
        currency: &str,
    ) -> ServiceResult<ChargeReceipt>;

    async fn refund(
        &self,
        transaction_id: &str,
        amount: &BigDecimal,
    ) -> ServiceResult<RefundReceipt>;

    async fn transfer(
        &self,
        bank_account_id: i64,
        amount: &BigDecimal,
        currency: &str,
    ) -> ServiceResult<TransferReceipt>;
}

/// Deterministic stand-in gateway. Hands out sequential hex references and
/// can be flipped into a failing mode to exercise the error paths.
#[derive(Default)]
pub struct SimulatedGateway {
    counter: AtomicU64,
    failing: AtomicBool,
}

impl SimulatedGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn next_ref(&self, prefix: &str) -> String {
        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        format!("{}_{}", prefix, hex::encode(n.to_be_bytes()))
    }
}

#[async_trait]
impl PaymentGateway for SimulatedGateway {
    async fn charge(
        &self,
        donor_id: i64,
        amount: &BigDecimal,
        currency: &str,
    ) -> ServiceResult<ChargeReceipt> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(ServiceError::upstream("payment gateway declined the charge"));
        }
        let transaction_id = self.next_ref("txn");
        debug!(
            donor_id,
            %amount,
            currency,
            transaction_id,
            "simulated charge accepted"
        );
        Ok(ChargeReceipt { transaction_id })
    }

    async fn refund(
        &self,
        transaction_id: &str,
        amount: &BigDecimal,
    ) -> ServiceResult<RefundReceipt> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(ServiceError::upstream("payment gateway rejected the refund"));
        }
        let refund_id = self.next_ref("ref");
        debug!(transaction_id, %amount, refund_id, "simulated refund issued");
        Ok(RefundReceipt { refund_id })
    }

    async fn transfer(
        &self,
        bank_account_id: i64,
        amount: &BigDecimal,
        currency: &str,
    ) -> ServiceResult<TransferReceipt> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(ServiceError::upstream("payment gateway rejected the transfer"));
        }
        let transfer_id = self.next_ref("trf");
        debug!(
            bank_account_id,
            %amount,
            currency,
            transfer_id,
            "simulated transfer submitted"
        );
        Ok(TransferReceipt { transfer_id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn references_are_unique_and_prefixed() {
        let gateway = SimulatedGateway::new();
        let a = gateway
            .charge(1, &BigDecimal::from(10), "USD")
            .await
            .unwrap();
        let b = gateway
            .charge(1, &BigDecimal::from(10), "USD")
            .await
            .unwrap();
        assert!(a.transaction_id.starts_with("txn_"));
        assert_ne!(a.transaction_id, b.transaction_id);
    }

    #[tokio::test]
    async fn failing_mode_rejects_every_operation() {
        let gateway = SimulatedGateway::new();
        gateway.set_failing(true);
        assert!(gateway.charge(1, &BigDecimal::from(10), "USD").await.is_err());
        assert!(gateway.refund("txn_x", &BigDecimal::from(10)).await.is_err());
        assert!(gateway.transfer(1, &BigDecimal::from(10), "USD").await.is_err());
        gateway.set_failing(false);
        assert!(gateway.charge(1, &BigDecimal::from(10), "USD").await.is_ok());
    }
}
