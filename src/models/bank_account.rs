// Copyright (c) CrowdPulse Team
// SPDX-License-Identifier: Apache-2.0

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::schema::bank_accounts;

#[derive(Debug, Clone, Queryable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = bank_accounts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct BankAccount {
    pub id: i64,
    pub owner_id: i64,
    pub account_holder_name: String,
    // Raw account number stays server-side; callers get the masked form.
    #[serde(skip_serializing)]
    pub account_number: String,
    pub bank_name: String,
    #[serde(skip_serializing)]
    pub routing_number: Option<String>,
    pub currency: String,
    pub is_primary: bool,
    pub is_verified: bool,
    pub is_active: bool,
    pub verification_document_url: Option<String>,
    pub verified_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BankAccount {
    /// `****` plus the last four digits; short numbers mask entirely.
    pub fn masked_account_number(&self) -> String {
        mask_account_number(&self.account_number)
    }
}

pub fn mask_account_number(number: &str) -> String {
    if number.len() >= 4 {
        format!("****{}", &number[number.len() - 4..])
    } else {
        "****".to_string()
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = bank_accounts)]
pub struct NewBankAccount {
    pub owner_id: i64,
    pub account_holder_name: String,
    pub account_number: String,
    pub bank_name: String,
    pub routing_number: Option<String>,
    pub currency: String,
    pub is_primary: bool,
}

#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = bank_accounts)]
pub struct BankAccountChanges {
    pub account_holder_name: Option<String>,
    pub bank_name: Option<String>,
    pub routing_number: Option<String>,
    pub is_primary: Option<bool>,
    pub is_verified: Option<bool>,
    pub is_active: Option<bool>,
    pub verification_document_url: Option<String>,
    pub verified_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masking_keeps_only_the_last_four() {
        assert_eq!(mask_account_number("12345678"), "****5678");
        assert_eq!(mask_account_number("9876"), "****9876");
        assert_eq!(mask_account_number("123"), "****");
        assert_eq!(mask_account_number(""), "****");
    }
}
