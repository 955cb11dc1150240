// Copyright (c) CrowdPulse Team
// SPDX-License-Identifier: Apache-2.0

pub mod bank_accounts;
pub mod campaigns;
pub mod engagement;
pub mod health;
pub mod metrics;
pub mod moderation;
pub mod notifications;
pub mod profiles;
pub mod social;
