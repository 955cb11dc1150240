// Copyright (c) CrowdPulse Team
// SPDX-License-Identifier: Apache-2.0

use anyhow::Result;
use dotenv::dotenv;
use std::sync::Arc;
use tokio::signal;
use tokio::sync::oneshot;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crowdpulse_backend::api::{self, AppState};
use crowdpulse_backend::config::Config;
use crowdpulse_backend::db::init_database;
use crowdpulse_backend::engines::{
    CampaignLedger, EngagementEngine, ModerationEngine, SocialGraphEngine,
};
use crowdpulse_backend::notifications::dispatcher::NotificationDispatcher;
use crowdpulse_backend::notifications::worker::DispatcherWorker;
use crowdpulse_backend::payments::SimulatedGateway;
use crowdpulse_backend::stores::{
    InMemoryContentStore, PgCampaignStore, PgFollowStore, PgIdentityStore, PgLikeStore,
    PgNotificationStore, PgReportStore,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file if present
    dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "info,crowdpulse_backend=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::init();
    info!("Initialized configuration");

    // Initialize database
    let db = Arc::new(init_database().await?);
    info!("Connected to database");

    // Relational stores share the pool; engagement content lives in the
    // document store (in-memory stand-in here).
    let identity = Arc::new(PgIdentityStore::new(db.clone()));
    let follows = Arc::new(PgFollowStore::new(db.clone()));
    let likes = Arc::new(PgLikeStore::new(db.clone()));
    let campaigns = Arc::new(PgCampaignStore::new(db.clone()));
    let reports = Arc::new(PgReportStore::new(db.clone()));
    let notifications = Arc::new(PgNotificationStore::new(db.clone()));
    let content = Arc::new(InMemoryContentStore::new());
    let gateway = Arc::new(SimulatedGateway::new());

    let social = Arc::new(SocialGraphEngine::new(
        identity.clone(),
        follows,
        notifications.clone(),
    ));
    let engagement = Arc::new(EngagementEngine::new(
        identity.clone(),
        content.clone(),
        likes,
        campaigns.clone(),
        notifications.clone(),
    ));
    let ledger = Arc::new(CampaignLedger::new(
        identity.clone(),
        campaigns.clone(),
        gateway,
        notifications.clone(),
        config.fees.clone(),
    ));
    let moderation = Arc::new(ModerationEngine::new(
        identity.clone(),
        content,
        campaigns.clone(),
        reports,
        notifications.clone(),
        config.moderation.clone(),
    ));

    // Prepare termination signal
    let (term_sender, term_receiver) = oneshot::channel();

    // Start the outbox dispatcher
    let dispatcher = Arc::new(NotificationDispatcher::new(
        identity.clone(),
        campaigns,
        notifications.clone(),
    ));
    let worker = DispatcherWorker::new(dispatcher, notifications.clone(), &config.dispatcher);
    let worker_handle = tokio::spawn(async move {
        worker.run(term_receiver).await;
        info!("Dispatcher worker stopped");
    });

    // Start API server
    let state = AppState {
        db,
        identity,
        social,
        engagement,
        campaigns: ledger,
        moderation,
        notifications,
    };
    let api_handle = tokio::spawn(async move {
        if let Err(e) = api::start_api_server(state).await {
            error!("API server error: {}", e);
        }
    });

    // Handle shutdown signals
    tokio::spawn(async move {
        match signal::ctrl_c().await {
            Ok(()) => {
                info!("Shutdown signal received, initiating graceful shutdown");
                let _ = term_sender.send(());
            }
            Err(e) => error!("Failed to listen for shutdown signal: {}", e),
        }
    });

    // Wait for all tasks to complete
    let _ = tokio::join!(worker_handle, api_handle);

    info!("CrowdPulse backend shutdown complete");
    Ok(())
}
