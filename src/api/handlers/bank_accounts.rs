// Copyright (c) CrowdPulse Team
// SPDX-License-Identifier: Apache-2.0

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;

use crate::api::routes::result_to_response;
use crate::api::AppState;
use crate::models::bank_account::{BankAccountChanges, NewBankAccount};

#[derive(Debug, Deserialize)]
pub struct BankAccountPayload {
    pub owner_id: i64,
    pub account_holder_name: String,
    pub account_number: String,
    pub bank_name: String,
    pub routing_number: Option<String>,
    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_currency() -> String {
    "USD".to_string()
}

#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    pub owner_id: i64,
    pub document_url: String,
}

#[derive(Debug, Deserialize)]
pub struct OwnerAction {
    pub owner_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct BankAccountEdit {
    pub owner_id: i64,
    pub account_holder_name: Option<String>,
    pub bank_name: Option<String>,
    pub routing_number: Option<String>,
}

/// Register a bank account for withdrawals
pub async fn add_bank_account(
    State(state): State<AppState>,
    Json(req): Json<BankAccountPayload>,
) -> impl IntoResponse {
    let new = NewBankAccount {
        owner_id: req.owner_id,
        account_holder_name: req.account_holder_name,
        account_number: req.account_number,
        bank_name: req.bank_name,
        routing_number: req.routing_number,
        currency: req.currency,
        is_primary: false,
    };
    result_to_response(state.campaigns.add_bank_account(req.owner_id, new).await)
}

/// Verify an account against a submitted document
pub async fn verify_bank_account(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<VerifyRequest>,
) -> impl IntoResponse {
    result_to_response(
        state
            .campaigns
            .verify_bank_account(req.owner_id, id, req.document_url)
            .await,
    )
}

/// Make an account the owner's primary
pub async fn set_primary_bank_account(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<OwnerAction>,
) -> impl IntoResponse {
    result_to_response(
        state
            .campaigns
            .set_primary_bank_account(req.owner_id, id)
            .await,
    )
}

/// Edit an unverified account's details
pub async fn update_bank_account(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<BankAccountEdit>,
) -> impl IntoResponse {
    let changes = BankAccountChanges {
        account_holder_name: req.account_holder_name,
        bank_name: req.bank_name,
        routing_number: req.routing_number,
        ..Default::default()
    };
    result_to_response(
        state
            .campaigns
            .update_bank_account(req.owner_id, id, changes)
            .await,
    )
}

/// Remove an account; verified accounts are deactivated instead
pub async fn remove_bank_account(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<OwnerAction>,
) -> impl IntoResponse {
    result_to_response(state.campaigns.remove_bank_account(req.owner_id, id).await)
}

/// List a profile's bank accounts
pub async fn list_bank_accounts(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    result_to_response(state.campaigns.list_bank_accounts(id).await)
}
