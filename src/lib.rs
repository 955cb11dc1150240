// Copyright (c) CrowdPulse Team
// SPDX-License-Identifier: Apache-2.0

pub mod api;
pub mod config;
pub mod db;
pub mod engines;
pub mod error;
pub mod metrics;
pub mod models;
pub mod notifications;
pub mod payments;
pub mod schema;
pub mod stores;

#[cfg(test)]
pub(crate) mod testutil;
