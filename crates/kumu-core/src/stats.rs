//! # Stats Module
//!
//! Client-side aggregation over already-fetched lists.
//!
//! Everything here is a pure, single pass over borrowed data: no I/O, no
//! clocks, no floats. Money sums use [`Amount`]; rates are basis points.

use crate::money::Amount;
use crate::schema::{
    Commission, CommissionStatus, PromoCode, Subscription, User, WithdrawalRequest,
    WithdrawalStatus,
};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// Subscription list price the influencer screen prices discounts against.
pub const BASE_PRICE: Amount = Amount::from_hundredths(2099);

// =============================================================================
// INFLUENCER PERFORMANCE
// =============================================================================

/// Performance of one influencer across every code attributed to them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InfluencerStats {
    /// Display name as first seen.
    pub name: String,
    pub email: String,
    pub social_handle: String,
    pub total_codes: u64,
    pub active_codes: u64,
    pub total_uses: u64,
    /// Discount granted at [`BASE_PRICE`], times redemptions.
    pub total_discount: Amount,
    /// Mean per-code discount at [`BASE_PRICE`].
    pub average_discount: Amount,
    pub top_performing_code: Option<String>,
    /// Uses per code, as a percentage, in basis points.
    pub conversion_rate_bps: u64,
    pub promo_codes: Vec<PromoCode>,
    #[serde(skip)]
    top_uses: u64,
}

impl InfluencerStats {
    fn seed(name: &str, code: &PromoCode) -> Self {
        Self {
            name: name.to_string(),
            email: code.influencer_email.clone().unwrap_or_default(),
            social_handle: code.influencer_social_handle.clone().unwrap_or_default(),
            total_codes: 0,
            active_codes: 0,
            total_uses: 0,
            total_discount: Amount::ZERO,
            average_discount: Amount::ZERO,
            top_performing_code: None,
            conversion_rate_bps: 0,
            promo_codes: Vec::new(),
            top_uses: 0,
        }
    }

    fn absorb(&mut self, code: &PromoCode) {
        self.total_codes += 1;
        self.total_uses = self.total_uses.saturating_add(code.used_count);
        if code.is_active() {
            self.active_codes += 1;
        }
        let discount = code.discount_on(BASE_PRICE);
        self.total_discount = self
            .total_discount
            .saturating_add(discount.saturating_mul(code.used_count));
        if code.used_count > self.top_uses {
            self.top_uses = code.used_count;
            self.top_performing_code = Some(code.code.clone());
        }
        self.promo_codes.push(code.clone());
    }

    fn finish(&mut self) {
        let discounts: Amount = self
            .promo_codes
            .iter()
            .map(|code| code.discount_on(BASE_PRICE))
            .sum();
        self.average_discount = discounts.div_round(self.total_codes);
        self.conversion_rate_bps = conversion_rate_bps(self.total_uses, self.total_codes);
    }

    /// Group attributed codes by influencer, best performers first.
    ///
    /// Names are matched case-insensitively; the spelling of the first code
    /// seen is kept. Codes without an influencer are skipped. Ties keep
    /// first-seen order.
    #[must_use]
    pub fn aggregate(promo_codes: &[PromoCode]) -> Vec<InfluencerStats> {
        let mut index: HashMap<String, usize> = HashMap::new();
        let mut groups: Vec<InfluencerStats> = Vec::new();

        for code in promo_codes {
            let Some(name) = code.influencer() else {
                continue;
            };
            let slot = *index.entry(name.to_lowercase()).or_insert_with(|| {
                groups.push(InfluencerStats::seed(name, code));
                groups.len() - 1
            });
            if let Some(group) = groups.get_mut(slot) {
                group.absorb(code);
            }
        }

        for group in &mut groups {
            group.finish();
        }
        groups.sort_by(|a, b| b.total_uses.cmp(&a.total_uses));
        groups
    }

    #[must_use]
    pub fn tier(&self) -> PerformanceTier {
        PerformanceTier::for_uses(self.total_uses)
    }
}

/// `uses / codes` as a percentage, in basis points, rounded half up.
#[must_use]
pub fn conversion_rate_bps(uses: u64, codes: u64) -> u64 {
    if codes == 0 {
        return 0;
    }
    let numerator = u128::from(uses) * 100;
    let codes = u128::from(codes);
    u64::try_from((numerator + codes / 2) / codes).unwrap_or(u64::MAX)
}

/// Badge on the influencer tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PerformanceTier {
    TopPerformer,
    Good,
    NeedsImprovement,
}

impl PerformanceTier {
    #[must_use]
    pub const fn for_uses(uses: u64) -> Self {
        if uses >= 10 {
            PerformanceTier::TopPerformer
        } else if uses >= 5 {
            PerformanceTier::Good
        } else {
            PerformanceTier::NeedsImprovement
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            PerformanceTier::TopPerformer => "Top Performer",
            PerformanceTier::Good => "Good",
            PerformanceTier::NeedsImprovement => "Needs Improvement",
        }
    }
}

impl fmt::Display for PerformanceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Row of the dashboard's compact influencer tab: exact-name grouping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InfluencerTally {
    pub name: String,
    pub codes: u64,
    pub total_uses: u64,
}

impl InfluencerTally {
    /// One row per distinct influencer name, in first-seen order.
    #[must_use]
    pub fn by_exact_name(promo_codes: &[PromoCode]) -> Vec<InfluencerTally> {
        let mut rows: Vec<InfluencerTally> = Vec::new();
        for code in promo_codes {
            let Some(name) = code.influencer() else {
                continue;
            };
            match rows.iter_mut().find(|row| row.name == name) {
                Some(row) => {
                    row.codes += 1;
                    row.total_uses = row.total_uses.saturating_add(code.used_count);
                }
                None => rows.push(InfluencerTally {
                    name: name.to_string(),
                    codes: 1,
                    total_uses: code.used_count,
                }),
            }
        }
        rows
    }

    #[must_use]
    pub fn tier(&self) -> PerformanceTier {
        PerformanceTier::for_uses(self.total_uses)
    }
}

// =============================================================================
// ADMIN OVERVIEW
// =============================================================================

/// Headline numbers of the admin overview tab.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverviewStats {
    pub total_users: u64,
    pub total_subscriptions: u64,
    pub active_subscriptions: u64,
    pub total_revenue: Amount,
    pub total_promo_codes: u64,
    pub active_promo_codes: u64,
    pub total_promo_uses: u64,
    pub total_influencers: u64,
}

impl OverviewStats {
    #[must_use]
    pub fn compute(
        users: &[User],
        subscriptions: &[Subscription],
        promo_codes: &[PromoCode],
    ) -> Self {
        let mut influencers: Vec<&str> = promo_codes.iter().filter_map(PromoCode::influencer).collect();
        influencers.sort_unstable();
        influencers.dedup();

        Self {
            total_users: users.len() as u64,
            total_subscriptions: subscriptions.len() as u64,
            active_subscriptions: subscriptions.iter().filter(|s| s.is_active()).count() as u64,
            total_revenue: subscriptions.iter().map(|s| s.amount).sum(),
            total_promo_codes: promo_codes.len() as u64,
            active_promo_codes: promo_codes.iter().filter(|c| c.is_active()).count() as u64,
            total_promo_uses: promo_codes
                .iter()
                .fold(0u64, |sum, c| sum.saturating_add(c.used_count)),
            total_influencers: influencers.len() as u64,
        }
    }
}

// =============================================================================
// INFLUENCER EARNINGS
// =============================================================================

/// Commission totals per status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EarningsSummary {
    pub pending: Amount,
    pub approved: Amount,
    pub paid: Amount,
    pub total: Amount,
    pub count: u64,
}

impl EarningsSummary {
    #[must_use]
    pub fn from_commissions(commissions: &[Commission]) -> Self {
        commissions.iter().fold(Self::default(), |mut acc, c| {
            match c.status {
                CommissionStatus::Pending => acc.pending = acc.pending.saturating_add(c.amount),
                CommissionStatus::Approved => acc.approved = acc.approved.saturating_add(c.amount),
                CommissionStatus::Paid => acc.paid = acc.paid.saturating_add(c.amount),
                CommissionStatus::Other => {}
            }
            acc.total = acc.total.saturating_add(c.amount);
            acc.count += 1;
            acc
        })
    }

}

// =============================================================================
// WITHDRAWAL QUEUE
// =============================================================================

/// Count and sum for one withdrawal status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusBucket {
    pub count: u64,
    pub amount: Amount,
}

impl StatusBucket {
    fn add(&mut self, amount: Amount) {
        self.count += 1;
        self.amount = self.amount.saturating_add(amount);
    }
}

/// Per-status breakdown of the admin withdrawal queue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WithdrawalQueueStats {
    pub pending: StatusBucket,
    pub approved: StatusBucket,
    pub rejected: StatusBucket,
    pub paid: StatusBucket,
}

impl WithdrawalQueueStats {
    #[must_use]
    pub fn compute(withdrawals: &[WithdrawalRequest]) -> Self {
        let mut stats = Self::default();
        for w in withdrawals {
            let bucket = match w.status {
                WithdrawalStatus::Pending => &mut stats.pending,
                WithdrawalStatus::Approved => &mut stats.approved,
                WithdrawalStatus::Rejected => &mut stats.rejected,
                WithdrawalStatus::Paid => &mut stats.paid,
                WithdrawalStatus::Other => continue,
            };
            bucket.add(w.amount);
        }
        stats
    }

    #[must_use]
    pub fn bucket(&self, status: WithdrawalStatus) -> StatusBucket {
        match status {
            WithdrawalStatus::Pending => self.pending,
            WithdrawalStatus::Approved => self.approved,
            WithdrawalStatus::Rejected => self.rejected,
            WithdrawalStatus::Paid => self.paid,
            WithdrawalStatus::Other => StatusBucket::default(),
        }
    }

    /// Requests still waiting on an admin.
    #[must_use]
    pub fn awaiting_action(&self) -> u64 {
        self.pending.count + self.approved.count
    }
}
