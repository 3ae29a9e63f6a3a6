//! Admin-side entities: platform users and their subscriptions.

use crate::money::{self, Amount};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A registered app user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub is_email_verified: bool,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Badge text for the verification column.
    #[must_use]
    pub fn verification_label(&self) -> &'static str {
        if self.is_email_verified {
            "Verified"
        } else {
            "Pending"
        }
    }
}

/// Billing state of a subscription, mirroring the payment provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubscriptionStatus {
    Active,
    Trialing,
    PastDue,
    Canceled,
    Incomplete,
    IncompleteExpired,
    Unpaid,
    #[serde(other)]
    Other,
}

impl SubscriptionStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            SubscriptionStatus::Active => "ACTIVE",
            SubscriptionStatus::Trialing => "TRIALING",
            SubscriptionStatus::PastDue => "PAST_DUE",
            SubscriptionStatus::Canceled => "CANCELED",
            SubscriptionStatus::Incomplete => "INCOMPLETE",
            SubscriptionStatus::IncompleteExpired => "INCOMPLETE_EXPIRED",
            SubscriptionStatus::Unpaid => "UNPAID",
            SubscriptionStatus::Other => "OTHER",
        }
    }
}

impl fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A coaching subscription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub id: String,
    pub status: SubscriptionStatus,
    /// Decimal columns arrive as strings or numbers; anything else reads as zero.
    #[serde(default, deserialize_with = "money::lenient")]
    pub amount: Amount,
    #[serde(default)]
    pub currency: String,
    #[serde(default)]
    pub current_period_start: Option<DateTime<Utc>>,
    #[serde(default)]
    pub current_period_end: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Subscription {
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == SubscriptionStatus::Active
    }
}
