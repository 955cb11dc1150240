// Copyright (c) CrowdPulse Team
// SPDX-License-Identifier: Apache-2.0

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::models::content_ref::{ContentKind, ContentRef};
use crate::schema::likes;

#[derive(Debug, Clone, Queryable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = likes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Like {
    pub id: i64,
    pub user_id: i64,
    pub content_type: ContentKind,
    pub content_id: i64,
    pub created_at: DateTime<Utc>,
}

impl Like {
    pub fn content(&self) -> ContentRef {
        ContentRef::from_kind(self.content_type, self.content_id)
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = likes)]
pub struct NewLike {
    pub user_id: i64,
    pub content_type: ContentKind,
    pub content_id: i64,
}

impl NewLike {
    pub fn new(user_id: i64, content: ContentRef) -> Self {
        NewLike {
            user_id,
            content_type: content.kind(),
            content_id: content.id(),
        }
    }
}
