// Copyright (c) CrowdPulse Team
// SPDX-License-Identifier: Apache-2.0

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::schema::campaign_updates;

#[derive(Debug, Clone, Queryable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = campaign_updates)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CampaignUpdate {
    pub id: i64,
    pub campaign_id: i64,
    pub author_id: i64,
    pub title: String,
    pub body: String,
    pub is_milestone: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = campaign_updates)]
pub struct NewCampaignUpdate {
    pub campaign_id: i64,
    pub author_id: i64,
    pub title: String,
    pub body: String,
    pub is_milestone: bool,
}
