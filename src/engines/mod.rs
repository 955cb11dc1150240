// Copyright (c) CrowdPulse Team
// SPDX-License-Identifier: Apache-2.0

//! Business-rule engines layered over the stores. Each engine owns one
//! domain: the store write it performs first is authoritative, denormalized
//! counters follow, and the notification intent is appended to the outbox
//! last and best-effort.

pub mod campaign;
pub mod engagement;
pub mod moderation;
pub mod social_graph;

pub use campaign::CampaignLedger;
pub use engagement::EngagementEngine;
pub use moderation::ModerationEngine;
pub use social_graph::SocialGraphEngine;
