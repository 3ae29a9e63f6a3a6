//! Best-effort loading of whole dashboards.
//!
//! A dashboard shows several independent lists. They are fetched together
//! with `tokio::join!`; a list that fails is logged and shown empty while
//! the others still render.

use crate::{ApiError, KumuClient};
use kumu_core::money::Amount;
use kumu_core::schema::{
    Commission, InfluencerProfile, PendingInfluencer, PromoCode, Subscription, User,
    WithdrawalRequest,
};
use kumu_core::stats::{EarningsSummary, InfluencerStats, OverviewStats, WithdrawalQueueStats};
use serde::Serialize;
use tracing::warn;

/// The list on success, an empty vector (and a warning) on failure.
pub fn or_empty<T>(result: Result<Vec<T>, ApiError>, what: &str) -> Vec<T> {
    match result {
        Ok(items) => items,
        Err(err) => {
            warn!(list = what, error = %err, "fetch failed, showing empty list");
            Vec::new()
        }
    }
}

fn tracked<T>(
    result: Result<Vec<T>, ApiError>,
    what: &'static str,
    failed: &mut Vec<&'static str>,
) -> Vec<T> {
    if result.is_err() {
        failed.push(what);
    }
    or_empty(result, what)
}

/// Everything the admin dashboard shows.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminSnapshot {
    pub users: Vec<User>,
    pub subscriptions: Vec<Subscription>,
    pub promo_codes: Vec<PromoCode>,
    pub pending_influencers: Vec<PendingInfluencer>,
    pub withdrawals: Vec<WithdrawalRequest>,
    /// Lists that could not be fetched this round.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failed: Vec<&'static str>,
}

impl AdminSnapshot {
    pub async fn load(client: &KumuClient) -> Self {
        let (users, subscriptions, promo_codes, pending, withdrawals) = tokio::join!(
            client.users(),
            client.subscriptions(),
            client.promo_codes(),
            client.pending_influencers(),
            client.admin_withdrawals(),
        );
        let mut failed = Vec::new();
        Self {
            users: tracked(users, "users", &mut failed),
            subscriptions: tracked(subscriptions, "subscriptions", &mut failed),
            promo_codes: tracked(promo_codes, "promo codes", &mut failed),
            pending_influencers: tracked(pending, "pending influencers", &mut failed),
            withdrawals: tracked(withdrawals, "withdrawals", &mut failed),
            failed,
        }
    }

    #[must_use]
    pub fn overview(&self) -> OverviewStats {
        OverviewStats::compute(&self.users, &self.subscriptions, &self.promo_codes)
    }

    #[must_use]
    pub fn influencer_stats(&self) -> Vec<InfluencerStats> {
        InfluencerStats::aggregate(&self.promo_codes)
    }

    #[must_use]
    pub fn withdrawal_stats(&self) -> WithdrawalQueueStats {
        WithdrawalQueueStats::compute(&self.withdrawals)
    }
}

/// Everything the influencer dashboard shows.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InfluencerSnapshot {
    /// `None` when the profile could not be fetched.
    pub profile: Option<InfluencerProfile>,
    pub commissions: Vec<Commission>,
    pub withdrawals: Vec<WithdrawalRequest>,
    pub promo_codes: Vec<PromoCode>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failed: Vec<&'static str>,
}

impl InfluencerSnapshot {
    pub async fn load(client: &KumuClient) -> Self {
        let (profile, commissions, withdrawals, promo_codes) = tokio::join!(
            client.influencer_profile(),
            client.commissions(),
            client.influencer_withdrawals(),
            client.influencer_promo_codes(),
        );
        let mut failed = Vec::new();
        let profile = match profile {
            Ok(profile) => Some(profile),
            Err(err) => {
                warn!(error = %err, "profile fetch failed");
                failed.push("profile");
                None
            }
        };
        Self {
            profile,
            commissions: tracked(commissions, "commissions", &mut failed),
            withdrawals: tracked(withdrawals, "withdrawals", &mut failed),
            promo_codes: tracked(promo_codes, "promo codes", &mut failed),
            failed,
        }
    }

    #[must_use]
    pub fn earnings(&self) -> EarningsSummary {
        EarningsSummary::from_commissions(&self.commissions)
    }

    /// The profile's pending earnings; `None` when the profile failed to load.
    #[must_use]
    pub fn available_balance(&self) -> Option<Amount> {
        self.profile
            .as_ref()
            .map(InfluencerProfile::available_for_withdrawal)
    }
}
