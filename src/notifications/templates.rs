// Copyright (c) CrowdPulse Team
// SPDX-License-Identifier: Apache-2.0

//! Message copy and action URLs for delivered notifications. Kept in one
//! place so the wording is testable and the dispatcher stays declarative.

use bigdecimal::BigDecimal;

use crate::models::report::ReportAction;

pub fn follower_added(actor: &str) -> String {
    format!("{} started following you", actor)
}

pub fn follow_requested(actor: &str) -> String {
    format!("{} requested to follow you", actor)
}

pub fn follow_accepted(actor: &str) -> String {
    format!("{} accepted your follow request", actor)
}

pub fn content_liked(actor: &str, noun: &str) -> String {
    format!("{} liked your {}", actor, noun)
}

pub fn comment_added(actor: &str, noun: &str) -> String {
    format!("{} commented on your {}", actor, noun)
}

pub fn comment_reply(actor: &str) -> String {
    format!("{} replied to your comment", actor)
}

pub fn donation_received(actor: &str, amount: &BigDecimal, currency: &str) -> String {
    format!("{} donated {} {} to your campaign", actor, amount, currency)
}

pub fn donation_received_anonymous(amount: &BigDecimal, currency: &str) -> String {
    format!(
        "Someone donated {} {} to your campaign anonymously",
        amount, currency
    )
}

pub fn donation_refunded(reason: &str) -> String {
    format!("Your donation has been refunded. Reason: {}", reason)
}

pub fn goal_reached() -> String {
    "Congratulations! Your campaign reached its goal".to_string()
}

pub fn campaign_approved() -> String {
    "Your campaign has been approved and is now live".to_string()
}

pub fn campaign_rejected(reason: &str) -> String {
    format!("Your campaign was rejected. Reason: {}", reason)
}

pub fn campaign_update(title: &str) -> String {
    format!("New update posted for campaign: {}", title)
}

pub fn campaign_milestone(title: &str) -> String {
    format!("Campaign milestone reached: {}", title)
}

pub fn withdrawal_approved() -> String {
    "Your withdrawal request has been approved".to_string()
}

pub fn withdrawal_rejected(reason: &str) -> String {
    format!("Withdrawal rejected: {}", reason)
}

pub fn withdrawal_completed() -> String {
    "Your withdrawal has been completed successfully".to_string()
}

pub fn withdrawal_failed(reason: &str) -> String {
    format!("Withdrawal failed: {}", reason)
}

pub fn bank_account_verified(masked: &str) -> String {
    format!("Your bank account {} has been verified", masked)
}

pub fn report_submitted() -> String {
    "New report requires review".to_string()
}

pub fn report_escalated() -> String {
    "Escalated report requires review".to_string()
}

pub fn report_resolved(action: ReportAction) -> String {
    format!(
        "Your report has been resolved. Action taken: {}",
        action.as_str()
    )
}

pub fn report_dismissed() -> String {
    "Your report has been reviewed and dismissed".to_string()
}

pub fn account_warning(reason: &str) -> String {
    format!("You have received a warning: {}", reason)
}

pub fn account_suspended(days: i64, reason: &str) -> String {
    format!(
        "Your account has been suspended for {} days. Reason: {}",
        days, reason
    )
}

pub fn profile_url(profile_id: i64) -> String {
    format!("/profiles/{}", profile_id)
}

pub fn campaign_url(campaign_id: i64) -> String {
    format!("/campaigns/{}", campaign_id)
}

pub fn campaign_update_url(campaign_id: i64, update_id: i64) -> String {
    format!("/campaigns/{}/updates/{}", campaign_id, update_id)
}

pub fn admin_report_url(report_id: i64) -> String {
    format!("/admin/reports/{}", report_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn donation_copy_includes_amount_and_currency() {
        let amount = "25.50".parse::<BigDecimal>().unwrap();
        assert_eq!(
            donation_received("Ada", &amount, "USD"),
            "Ada donated 25.50 USD to your campaign"
        );
        assert_eq!(
            donation_received_anonymous(&amount, "EUR"),
            "Someone donated 25.50 EUR to your campaign anonymously"
        );
    }

    #[test]
    fn suspension_copy_names_days_and_reason() {
        assert_eq!(
            account_suspended(7, "spam"),
            "Your account has been suspended for 7 days. Reason: spam"
        );
    }

    #[test]
    fn urls_follow_the_frontend_routes() {
        assert_eq!(profile_url(4), "/profiles/4");
        assert_eq!(campaign_update_url(9, 12), "/campaigns/9/updates/12");
        assert_eq!(admin_report_url(3), "/admin/reports/3");
    }
}
