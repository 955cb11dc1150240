// Copyright (c) CrowdPulse Team
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use std::sync::Arc;

use crate::db::Database;
use crate::error::{ServiceError, ServiceResult};
use crate::models::content_ref::ReportTarget;
use crate::models::report::{NewReport, Report, ReportChanges, ReportStatus};
use crate::schema::reports;

/// Report persistence for the moderation workflow.
#[async_trait]
pub trait ReportStore: Send + Sync {
    async fn create_report(&self, new: NewReport) -> ServiceResult<Report>;
    async fn get_report(&self, id: i64) -> ServiceResult<Option<Report>>;
    /// A reporter may only have one open-or-closed report per target,
    /// regardless of the reason given.
    async fn find_by_reporter_and_target(
        &self,
        reporter_id: i64,
        target: &ReportTarget,
    ) -> ServiceResult<Option<Report>>;
    async fn update_report(&self, id: i64, changes: ReportChanges) -> ServiceResult<Report>;
    async fn list_by_status(
        &self,
        status: ReportStatus,
        limit: i64,
        offset: i64,
    ) -> ServiceResult<Vec<Report>>;
}

pub struct PgReportStore {
    db: Arc<Database>,
}

impl PgReportStore {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ReportStore for PgReportStore {
    async fn create_report(&self, new: NewReport) -> ServiceResult<Report> {
        let mut conn = self.db.get_connection().await?;
        let report = diesel::insert_into(reports::table)
            .values(&new)
            .get_result::<Report>(&mut conn)
            .await
            .map_err(|e| match e {
                diesel::result::Error::DatabaseError(
                    diesel::result::DatabaseErrorKind::UniqueViolation,
                    _,
                ) => ServiceError::already_exists("target already reported by this user"),
                other => other.into(),
            })?;
        Ok(report)
    }

    async fn get_report(&self, id: i64) -> ServiceResult<Option<Report>> {
        let mut conn = self.db.get_connection().await?;
        let report = reports::table
            .find(id)
            .first::<Report>(&mut conn)
            .await
            .optional()?;
        Ok(report)
    }

    async fn find_by_reporter_and_target(
        &self,
        reporter_id: i64,
        target: &ReportTarget,
    ) -> ServiceResult<Option<Report>> {
        let mut conn = self.db.get_connection().await?;
        let report = reports::table
            .filter(reports::reporter_id.eq(reporter_id))
            .filter(reports::target_type.eq(target.kind()))
            .filter(reports::target_id.eq(target.id()))
            .first::<Report>(&mut conn)
            .await
            .optional()?;
        Ok(report)
    }

    async fn update_report(&self, id: i64, changes: ReportChanges) -> ServiceResult<Report> {
        let mut conn = self.db.get_connection().await?;
        let report = diesel::update(reports::table.find(id))
            .set(&changes)
            .get_result::<Report>(&mut conn)
            .await
            .map_err(|e| match e {
                diesel::result::Error::NotFound => {
                    ServiceError::not_found(format!("report {}", id))
                }
                other => other.into(),
            })?;
        Ok(report)
    }

    async fn list_by_status(
        &self,
        status: ReportStatus,
        limit: i64,
        offset: i64,
    ) -> ServiceResult<Vec<Report>> {
        let mut conn = self.db.get_connection().await?;
        let found = reports::table
            .filter(reports::status.eq(status))
            .order(reports::created_at.asc())
            .limit(limit)
            .offset(offset)
            .load::<Report>(&mut conn)
            .await?;
        Ok(found)
    }
}
