// Copyright (c) CrowdPulse Team
// SPDX-License-Identifier: Apache-2.0

mod handlers;
mod routes;

use crate::config::Config;
use crate::db::Database;
use crate::engines::{CampaignLedger, EngagementEngine, ModerationEngine, SocialGraphEngine};
use crate::stores::{IdentityStore, NotificationStore};
use anyhow::Result;
use axum::{
    routing::{delete, get, patch, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

/// Shared handles the handlers work through. Handlers never touch the
/// stores that sit below an engine; reads that have no business rules
/// (profiles, notifications) go straight to their store.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub identity: Arc<dyn IdentityStore>,
    pub social: Arc<SocialGraphEngine>,
    pub engagement: Arc<EngagementEngine>,
    pub campaigns: Arc<CampaignLedger>,
    pub moderation: Arc<ModerationEngine>,
    pub notifications: Arc<dyn NotificationStore>,
}

/// Start the API server
pub async fn start_api_server(state: AppState) -> Result<()> {
    let config = Config::get();

    // Set up CORS
    let cors = if config.api.enable_cors {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        CorsLayer::permissive()
    };

    // Create router with all routes
    let app = Router::new()
        // General routes
        .route("/health", get(handlers::health::health_check))
        .route("/metrics", get(handlers::metrics::get_metrics))
        // Profile routes
        .route("/api/profiles", post(handlers::profiles::create_profile))
        .route(
            "/api/profiles/:id",
            get(handlers::profiles::get_profile).patch(handlers::profiles::update_profile),
        )
        .route(
            "/api/profiles/:id/followers",
            get(handlers::profiles::get_profile_followers),
        )
        .route(
            "/api/profiles/:id/following",
            get(handlers::profiles::get_profile_following),
        )
        // Social graph actions
        .route("/api/social/follow", post(handlers::social::follow))
        .route("/api/social/unfollow", post(handlers::social::unfollow))
        .route("/api/social/approve", post(handlers::social::approve))
        .route("/api/social/reject", post(handlers::social::reject))
        .route("/api/social/block", post(handlers::social::block))
        .route("/api/social/unblock", post(handlers::social::unblock))
        .route("/api/social/mute", post(handlers::social::mute))
        .route("/api/social/unmute", post(handlers::social::unmute))
        // Content routes
        .route("/api/posts", post(handlers::engagement::create_post))
        .route("/api/posts/:id", get(handlers::engagement::get_post))
        .route("/api/reels", post(handlers::engagement::create_reel))
        .route("/api/reels/:id", get(handlers::engagement::get_reel))
        // Likes
        .route(
            "/api/likes",
            post(handlers::engagement::like_content).delete(handlers::engagement::unlike_content),
        )
        .route(
            "/api/campaigns/:id/likes",
            get(handlers::engagement::get_campaign_like_count),
        )
        // Comments
        .route(
            "/api/comments",
            post(handlers::engagement::create_comment).get(handlers::engagement::list_comments),
        )
        .route(
            "/api/comments/:id",
            delete(handlers::engagement::delete_comment),
        )
        .route(
            "/api/comments/:id/like",
            post(handlers::engagement::like_comment).delete(handlers::engagement::unlike_comment),
        )
        // Campaign routes
        .route("/api/campaigns", post(handlers::campaigns::create_campaign))
        .route("/api/campaigns/:id", get(handlers::campaigns::get_campaign))
        .route(
            "/api/campaigns/:id/publish",
            post(handlers::campaigns::publish_campaign),
        )
        .route(
            "/api/campaigns/:id/approve",
            post(handlers::campaigns::approve_campaign),
        )
        .route(
            "/api/campaigns/:id/reject",
            post(handlers::campaigns::reject_campaign),
        )
        .route(
            "/api/campaigns/:id/pause",
            post(handlers::campaigns::pause_campaign),
        )
        .route(
            "/api/campaigns/:id/resume",
            post(handlers::campaigns::resume_campaign),
        )
        // Donations
        .route(
            "/api/campaigns/:id/donations",
            post(handlers::campaigns::donate).get(handlers::campaigns::list_donations),
        )
        .route(
            "/api/donations/:id/refund",
            post(handlers::campaigns::refund_donation),
        )
        // Withdrawals
        .route(
            "/api/campaigns/:id/withdrawals",
            post(handlers::campaigns::request_withdrawal)
                .get(handlers::campaigns::list_withdrawals),
        )
        .route(
            "/api/withdrawals/:id/approve",
            post(handlers::campaigns::approve_withdrawal),
        )
        .route(
            "/api/withdrawals/:id/reject",
            post(handlers::campaigns::reject_withdrawal),
        )
        // Campaign updates
        .route(
            "/api/campaigns/:id/updates",
            post(handlers::campaigns::post_update).get(handlers::campaigns::list_updates),
        )
        // Bank accounts
        .route(
            "/api/bank-accounts",
            post(handlers::bank_accounts::add_bank_account),
        )
        .route(
            "/api/bank-accounts/:id",
            patch(handlers::bank_accounts::update_bank_account)
                .delete(handlers::bank_accounts::remove_bank_account),
        )
        .route(
            "/api/bank-accounts/:id/verify",
            post(handlers::bank_accounts::verify_bank_account),
        )
        .route(
            "/api/bank-accounts/:id/primary",
            post(handlers::bank_accounts::set_primary_bank_account),
        )
        .route(
            "/api/profiles/:id/bank-accounts",
            get(handlers::bank_accounts::list_bank_accounts),
        )
        // Moderation routes
        .route(
            "/api/reports",
            post(handlers::moderation::submit_report).get(handlers::moderation::list_reports),
        )
        .route("/api/reports/:id", get(handlers::moderation::get_report))
        .route(
            "/api/reports/:id/review",
            post(handlers::moderation::begin_review),
        )
        .route(
            "/api/reports/:id/resolve",
            post(handlers::moderation::resolve_report),
        )
        .route(
            "/api/reports/:id/dismiss",
            post(handlers::moderation::dismiss_report),
        )
        .route(
            "/api/reports/:id/escalate",
            post(handlers::moderation::escalate_report),
        )
        // Notification routes
        .route(
            "/api/profiles/:id/notifications",
            get(handlers::notifications::list_notifications),
        )
        .route(
            "/api/profiles/:id/notifications/unread-count",
            get(handlers::notifications::unread_count),
        )
        .route(
            "/api/profiles/:id/notifications/read-all",
            post(handlers::notifications::mark_all_read),
        )
        .route(
            "/api/notifications/:id/read",
            post(handlers::notifications::mark_read),
        )
        // Add state and middleware
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Get bind address
    let addr = format!("{}:{}", config.api.host, config.api.port).parse::<SocketAddr>()?;

    // Start server
    info!("Starting API server on {}", addr);
    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .await?;

    Ok(())
}
