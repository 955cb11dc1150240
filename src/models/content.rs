// Copyright (c) CrowdPulse Team
// SPDX-License-Identifier: Apache-2.0

//! Document-store entities. Posts, reels and comments live in the document
//! database, not in Postgres; their denormalized counters are mutated through
//! the content store's atomic adjust operations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::content_ref::ContentRef;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub author_id: i64,
    pub caption: String,
    pub media_urls: Vec<String>,
    pub is_public: bool,
    pub likes_count: i64,
    pub comments_count: i64,
    pub shares_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPost {
    pub author_id: i64,
    pub caption: String,
    #[serde(default)]
    pub media_urls: Vec<String>,
    #[serde(default = "default_public")]
    pub is_public: bool,
}

fn default_public() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reel {
    pub id: i64,
    pub author_id: i64,
    pub video_url: String,
    pub caption: String,
    pub duration_seconds: i32,
    pub likes_count: i64,
    pub comments_count: i64,
    pub view_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewReel {
    pub author_id: i64,
    pub video_url: String,
    pub caption: String,
    pub duration_seconds: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    pub author_id: i64,
    /// The post/reel/campaign this comment belongs to.
    pub target: ContentRef,
    pub parent_comment_id: Option<i64>,
    pub body: String,
    pub like_count: i64,
    pub reply_count: i64,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewComment {
    pub author_id: i64,
    pub target: ContentRef,
    pub parent_comment_id: Option<i64>,
    pub body: String,
}
