//! Influencer-side entities: profiles, commissions, payouts and onboarding.

use crate::money::{self, Amount};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// =============================================================================
// STATUSES
// =============================================================================

/// State of an earned commission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommissionStatus {
    Pending,
    Approved,
    Paid,
    /// Any state this client does not know.
    #[serde(other)]
    Other,
}

impl CommissionStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            CommissionStatus::Pending => "pending",
            CommissionStatus::Approved => "approved",
            CommissionStatus::Paid => "paid",
            CommissionStatus::Other => "other",
        }
    }
}

impl fmt::Display for CommissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// State of a payout request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WithdrawalStatus {
    Pending,
    Approved,
    Rejected,
    Paid,
    #[serde(other)]
    Other,
}

impl WithdrawalStatus {
    pub const ALL: [WithdrawalStatus; 4] = [
        WithdrawalStatus::Pending,
        WithdrawalStatus::Approved,
        WithdrawalStatus::Rejected,
        WithdrawalStatus::Paid,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            WithdrawalStatus::Pending => "pending",
            WithdrawalStatus::Approved => "approved",
            WithdrawalStatus::Rejected => "rejected",
            WithdrawalStatus::Paid => "paid",
            WithdrawalStatus::Other => "other",
        }
    }

    /// Whether the request still holds funds (not rejected, not yet paid).
    #[must_use]
    pub const fn is_open(self) -> bool {
        matches!(self, WithdrawalStatus::Pending | WithdrawalStatus::Approved)
    }
}

impl fmt::Display for WithdrawalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WithdrawalStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == wanted)
            .ok_or_else(|| format!("Unknown withdrawal status: {}", s))
    }
}

/// Admin review state of an influencer account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Rejected,
    #[serde(other)]
    Other,
}

impl ApprovalStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            ApprovalStatus::Pending => "pending",
            ApprovalStatus::Approved => "approved",
            ApprovalStatus::Rejected => "rejected",
            ApprovalStatus::Other => "other",
        }
    }
}

impl fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// ENTITIES
// =============================================================================

/// Commission earned from one promo-code redemption.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Commission {
    pub id: String,
    #[serde(default)]
    pub promo_code_id: String,
    #[serde(default)]
    pub promo_code: String,
    pub amount: Amount,
    pub status: CommissionStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paid_at: Option<DateTime<Utc>>,
}

/// A payout request against accrued commission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawalRequest {
    pub id: String,
    /// Present on admin listings only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub influencer_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub influencer_name: Option<String>,
    pub amount: Amount,
    pub status: WithdrawalStatus,
    #[serde(default)]
    pub bank_account: String,
    #[serde(default)]
    pub bank_name: String,
    #[serde(default)]
    pub account_holder_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub routing_number: Option<String>,
    pub requested_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
}

impl WithdrawalRequest {
    /// Account number reduced to its last four digits.
    #[must_use]
    pub fn masked_account(&self) -> String {
        mask_account(&self.bank_account)
    }
}

/// Replace all but the last four characters with `*`.
#[must_use]
pub fn mask_account(account: &str) -> String {
    let chars: Vec<char> = account.chars().collect();
    let keep = chars.len().min(4);
    let hidden = chars.len() - keep;
    let mut masked = "*".repeat(hidden);
    masked.extend(&chars[hidden..]);
    masked
}

/// Payload of `POST /influencer/withdrawals`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewWithdrawal {
    pub amount: Amount,
    pub bank_account: String,
    pub bank_name: String,
    pub account_holder_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub routing_number: Option<String>,
}

/// Decision body for `PUT /admin/withdrawals/{id}/{action}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawalDecision {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
}

/// The signed-in influencer's own record with server-computed earnings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InfluencerProfile {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub social_handle: String,
    #[serde(default, deserialize_with = "money::lenient")]
    pub total_earnings: Amount,
    #[serde(default, deserialize_with = "money::lenient")]
    pub pending_earnings: Amount,
    #[serde(default, deserialize_with = "money::lenient")]
    pub paid_earnings: Amount,
    #[serde(default)]
    pub total_commissions: u64,
    #[serde(default)]
    pub active_commissions: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bank_account: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bank_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_holder_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ApprovalStatus>,
}

impl InfluencerProfile {
    /// What the influencer may withdraw: the server's pending earnings.
    #[must_use]
    pub fn available_for_withdrawal(&self) -> Amount {
        self.pending_earnings.max_zero()
    }
}

/// Payload of `PUT /influencer/profile`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub name: String,
    pub email: String,
    pub social_handle: String,
    pub bank_account: String,
    pub bank_name: String,
    pub account_holder_name: String,
}

impl ProfileUpdate {
    /// Prefill from the current profile; missing bank fields become empty.
    #[must_use]
    pub fn from_profile(profile: &InfluencerProfile) -> Self {
        Self {
            name: profile.name.clone(),
            email: profile.email.clone(),
            social_handle: profile.social_handle.clone(),
            bank_account: profile.bank_account.clone().unwrap_or_default(),
            bank_name: profile.bank_name.clone().unwrap_or_default(),
            account_holder_name: profile.account_holder_name.clone().unwrap_or_default(),
        }
    }
}

/// An influencer account awaiting (or past) admin review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingInfluencer {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub social_handle: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bank_account: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bank_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_holder_name: Option<String>,
    #[serde(default = "pending")]
    pub status: ApprovalStatus,
    pub created_at: DateTime<Utc>,
}

fn pending() -> ApprovalStatus {
    ApprovalStatus::Pending
}

/// Payload of `POST /influencer/register`.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InfluencerRegistration {
    pub name: String,
    pub email: String,
    pub password: String,
    pub social_handle: String,
    pub bank_account: String,
    pub bank_name: String,
    pub account_holder_name: String,
}

impl fmt::Debug for InfluencerRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InfluencerRegistration")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("social_handle", &self.social_handle)
            .field("bank_name", &self.bank_name)
            .finish()
    }
}
