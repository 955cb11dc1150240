// Copyright (c) CrowdPulse Team
// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};

use crate::error::{ServiceError, ServiceResult};
use crate::models::text_enum;

text_enum! {
    /// Kind of content a like or comment points at.
    ContentKind {
        Post => "POST",
        Reel => "REEL",
        Campaign => "CAMPAIGN",
    }
}

text_enum! {
    /// Kind of entity a report (or notification) points at.
    TargetKind {
        Post => "POST",
        Reel => "REEL",
        Campaign => "CAMPAIGN",
        Comment => "COMMENT",
        Profile => "PROFILE",
    }
}

/// Reference to exactly one likeable/commentable entity.
///
/// Requests carry up to three optional ids; `from_parts` is the single place
/// that enforces the exactly-one-of rule, so the engines only ever see a
/// well-formed reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "id")]
pub enum ContentRef {
    #[serde(rename = "POST")]
    Post(i64),
    #[serde(rename = "REEL")]
    Reel(i64),
    #[serde(rename = "CAMPAIGN")]
    Campaign(i64),
}

impl ContentRef {
    pub fn from_parts(
        post_id: Option<i64>,
        reel_id: Option<i64>,
        campaign_id: Option<i64>,
    ) -> ServiceResult<Self> {
        let refs = [
            post_id.map(ContentRef::Post),
            reel_id.map(ContentRef::Reel),
            campaign_id.map(ContentRef::Campaign),
        ];
        let mut set = refs.into_iter().flatten();
        match (set.next(), set.next()) {
            (Some(one), None) => Ok(one),
            (None, _) => Err(ServiceError::invalid_argument(
                "exactly one of post_id, reel_id, campaign_id must be set",
            )),
            (Some(_), Some(_)) => Err(ServiceError::invalid_argument(
                "only one of post_id, reel_id, campaign_id may be set",
            )),
        }
    }

    pub fn from_kind(kind: ContentKind, id: i64) -> Self {
        match kind {
            ContentKind::Post => ContentRef::Post(id),
            ContentKind::Reel => ContentRef::Reel(id),
            ContentKind::Campaign => ContentRef::Campaign(id),
        }
    }

    pub fn kind(&self) -> ContentKind {
        match self {
            ContentRef::Post(_) => ContentKind::Post,
            ContentRef::Reel(_) => ContentKind::Reel,
            ContentRef::Campaign(_) => ContentKind::Campaign,
        }
    }

    pub fn id(&self) -> i64 {
        match self {
            ContentRef::Post(id) | ContentRef::Reel(id) | ContentRef::Campaign(id) => *id,
        }
    }

    /// Noun used in notification copy ("liked your post").
    pub fn noun(&self) -> &'static str {
        match self {
            ContentRef::Post(_) => "post",
            ContentRef::Reel(_) => "reel",
            ContentRef::Campaign(_) => "campaign",
        }
    }
}

/// Reference to exactly one reportable entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "id")]
pub enum ReportTarget {
    #[serde(rename = "POST")]
    Post(i64),
    #[serde(rename = "REEL")]
    Reel(i64),
    #[serde(rename = "CAMPAIGN")]
    Campaign(i64),
    #[serde(rename = "COMMENT")]
    Comment(i64),
    #[serde(rename = "PROFILE")]
    Profile(i64),
}

impl ReportTarget {
    pub fn from_parts(
        post_id: Option<i64>,
        reel_id: Option<i64>,
        campaign_id: Option<i64>,
        comment_id: Option<i64>,
        profile_id: Option<i64>,
    ) -> ServiceResult<Self> {
        let refs = [
            post_id.map(ReportTarget::Post),
            reel_id.map(ReportTarget::Reel),
            campaign_id.map(ReportTarget::Campaign),
            comment_id.map(ReportTarget::Comment),
            profile_id.map(ReportTarget::Profile),
        ];
        let mut set = refs.into_iter().flatten();
        match (set.next(), set.next()) {
            (Some(one), None) => Ok(one),
            (None, _) => Err(ServiceError::invalid_argument(
                "exactly one content reference must be set",
            )),
            (Some(_), Some(_)) => Err(ServiceError::invalid_argument(
                "only one content reference may be set",
            )),
        }
    }

    pub fn from_kind(kind: TargetKind, id: i64) -> Self {
        match kind {
            TargetKind::Post => ReportTarget::Post(id),
            TargetKind::Reel => ReportTarget::Reel(id),
            TargetKind::Campaign => ReportTarget::Campaign(id),
            TargetKind::Comment => ReportTarget::Comment(id),
            TargetKind::Profile => ReportTarget::Profile(id),
        }
    }

    pub fn kind(&self) -> TargetKind {
        match self {
            ReportTarget::Post(_) => TargetKind::Post,
            ReportTarget::Reel(_) => TargetKind::Reel,
            ReportTarget::Campaign(_) => TargetKind::Campaign,
            ReportTarget::Comment(_) => TargetKind::Comment,
            ReportTarget::Profile(_) => TargetKind::Profile,
        }
    }

    pub fn id(&self) -> i64 {
        match self {
            ReportTarget::Post(id)
            | ReportTarget::Reel(id)
            | ReportTarget::Campaign(id)
            | ReportTarget::Comment(id)
            | ReportTarget::Profile(id) => *id,
        }
    }
}

impl From<ContentRef> for ReportTarget {
    fn from(content: ContentRef) -> Self {
        match content {
            ContentRef::Post(id) => ReportTarget::Post(id),
            ContentRef::Reel(id) => ReportTarget::Reel(id),
            ContentRef::Campaign(id) => ReportTarget::Campaign(id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exactly_one_reference_is_required() {
        assert!(matches!(
            ContentRef::from_parts(None, None, None),
            Err(ServiceError::InvalidArgument(_))
        ));
        assert!(matches!(
            ContentRef::from_parts(Some(1), None, Some(2)),
            Err(ServiceError::InvalidArgument(_))
        ));
        assert_eq!(
            ContentRef::from_parts(None, Some(9), None).unwrap(),
            ContentRef::Reel(9)
        );
    }

    #[test]
    fn report_target_rejects_zero_and_multiple_references() {
        assert!(matches!(
            ReportTarget::from_parts(None, None, None, None, None),
            Err(ServiceError::InvalidArgument(_))
        ));
        assert!(matches!(
            ReportTarget::from_parts(Some(1), Some(2), None, None, None),
            Err(ServiceError::InvalidArgument(_))
        ));
        assert_eq!(
            ReportTarget::from_parts(None, None, None, Some(4), None).unwrap(),
            ReportTarget::Comment(4)
        );
    }

    #[test]
    fn content_ref_serializes_as_tagged_pair() {
        let json = serde_json::to_value(ContentRef::Campaign(12)).unwrap();
        assert_eq!(json, serde_json::json!({"type": "CAMPAIGN", "id": 12}));
        let back: ContentRef = serde_json::from_value(json).unwrap();
        assert_eq!(back, ContentRef::Campaign(12));
    }
}
