// Copyright (c) CrowdPulse Team
// SPDX-License-Identifier: Apache-2.0

// Import diesel table macros
use diesel::allow_tables_to_appear_in_same_query;
use diesel::table;

table! {
    profiles (id) {
        id -> Int8,
        username -> Varchar,
        display_name -> Nullable<Varchar>,
        bio -> Nullable<Text>,
        avatar_url -> Nullable<Varchar>,
        is_private -> Bool,
        role -> Varchar,
        followers_count -> Int4,
        following_count -> Int4,
        posts_count -> Int4,
        suspended_until -> Nullable<Timestamptz>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

table! {
    follows (id) {
        id -> Int8,
        follower_id -> Int8,
        following_id -> Int8,
        status -> Varchar,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

table! {
    likes (id) {
        id -> Int8,
        user_id -> Int8,
        content_type -> Varchar,
        content_id -> Int8,
        created_at -> Timestamptz,
    }
}

table! {
    campaigns (id) {
        id -> Int8,
        creator_id -> Int8,
        title -> Varchar,
        description -> Text,
        goal_amount -> Numeric,
        current_amount -> Numeric,
        currency -> Varchar,
        donor_count -> Int4,
        updates_count -> Int4,
        milestones_count -> Int4,
        status -> Varchar,
        is_verified -> Bool,
        start_date -> Nullable<Timestamptz>,
        end_date -> Timestamptz,
        rejection_reason -> Nullable<Text>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

table! {
    donations (id) {
        id -> Int8,
        campaign_id -> Int8,
        donor_id -> Int8,
        amount -> Numeric,
        currency -> Varchar,
        is_anonymous -> Bool,
        message -> Nullable<Text>,
        status -> Varchar,
        transaction_id -> Nullable<Varchar>,
        refund_id -> Nullable<Varchar>,
        refunded_amount -> Numeric,
        failure_reason -> Nullable<Text>,
        created_at -> Timestamptz,
        completed_at -> Nullable<Timestamptz>,
        refunded_at -> Nullable<Timestamptz>,
    }
}

table! {
    bank_accounts (id) {
        id -> Int8,
        owner_id -> Int8,
        account_holder_name -> Varchar,
        account_number -> Varchar,
        bank_name -> Varchar,
        routing_number -> Nullable<Varchar>,
        currency -> Varchar,
        is_primary -> Bool,
        is_verified -> Bool,
        is_active -> Bool,
        verification_document_url -> Nullable<Varchar>,
        verified_at -> Nullable<Timestamptz>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

table! {
    withdrawals (id) {
        id -> Int8,
        campaign_id -> Int8,
        requester_id -> Int8,
        bank_account_id -> Int8,
        amount -> Numeric,
        platform_fee -> Numeric,
        gateway_fee -> Numeric,
        net_amount -> Numeric,
        currency -> Varchar,
        status -> Varchar,
        transfer_id -> Nullable<Varchar>,
        failure_reason -> Nullable<Text>,
        rejection_reason -> Nullable<Text>,
        requested_at -> Timestamptz,
        processed_at -> Nullable<Timestamptz>,
    }
}

table! {
    campaign_updates (id) {
        id -> Int8,
        campaign_id -> Int8,
        author_id -> Int8,
        title -> Varchar,
        body -> Text,
        is_milestone -> Bool,
        created_at -> Timestamptz,
    }
}

table! {
    reports (id) {
        id -> Int8,
        reporter_id -> Int8,
        target_type -> Varchar,
        target_id -> Int8,
        reason -> Varchar,
        details -> Nullable<Text>,
        status -> Varchar,
        resolved_by -> Nullable<Int8>,
        action_taken -> Nullable<Varchar>,
        resolution_note -> Nullable<Text>,
        created_at -> Timestamptz,
        reviewed_at -> Nullable<Timestamptz>,
        resolved_at -> Nullable<Timestamptz>,
    }
}

table! {
    notifications (id) {
        id -> Int8,
        recipient_id -> Int8,
        actor_id -> Nullable<Int8>,
        notification_type -> Varchar,
        message -> Text,
        target_type -> Nullable<Varchar>,
        target_id -> Nullable<Int8>,
        campaign_id -> Nullable<Int8>,
        action_url -> Nullable<Varchar>,
        is_read -> Bool,
        created_at -> Timestamptz,
        read_at -> Nullable<Timestamptz>,
    }
}

table! {
    notification_outbox (id) {
        id -> Int8,
        event -> Jsonb,
        status -> Varchar,
        attempts -> Int4,
        last_error -> Nullable<Text>,
        created_at -> Timestamptz,
        dispatched_at -> Nullable<Timestamptz>,
    }
}

// Allow joining the tables if needed
allow_tables_to_appear_in_same_query!(
    profiles,
    follows,
    likes,
    campaigns,
    donations,
    bank_accounts,
    withdrawals,
    campaign_updates,
    reports,
    notifications,
    notification_outbox,
);
