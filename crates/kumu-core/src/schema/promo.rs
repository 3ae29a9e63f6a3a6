//! Promo codes: the stored entity, the create/update payload and the
//! validation result.

use crate::money::Amount;
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Usage cap applied when a draft leaves it unset.
pub const DEFAULT_MAX_USES: u64 = 100;

/// Validity window of one-click preset codes.
pub const QUICK_CODE_VALIDITY_DAYS: i64 = 365;

/// How a promo code's `value` is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscountType {
    /// `value` is a percentage of the price.
    Percentage,
    /// `value` is a currency amount off the price.
    FixedAmount,
}

impl DiscountType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            DiscountType::Percentage => "percentage",
            DiscountType::FixedAmount => "fixed_amount",
        }
    }
}

impl fmt::Display for DiscountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DiscountType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "percentage" | "percent" | "%" => Ok(DiscountType::Percentage),
            "fixed_amount" | "fixed" | "amount" | "$" => Ok(DiscountType::FixedAmount),
            other => Err(format!(
                "Unknown discount type {:?} (expected percentage or fixed_amount)",
                other
            )),
        }
    }
}

/// Lifecycle state of a promo code, as reported by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromoStatus {
    Active,
    Inactive,
    Expired,
    /// Any state this client does not know.
    #[serde(other)]
    Other,
}

impl PromoStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            PromoStatus::Active => "active",
            PromoStatus::Inactive => "inactive",
            PromoStatus::Expired => "expired",
            PromoStatus::Other => "other",
        }
    }
}

impl fmt::Display for PromoStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A discount code with its usage counters and influencer attribution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromoCode {
    pub id: String,
    pub code: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub discount_type: DiscountType,
    pub value: Amount,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_amount: Option<Amount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_uses: Option<u64>,
    #[serde(default)]
    pub used_count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_from: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_until: Option<DateTime<Utc>>,
    pub status: PromoStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub influencer_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub influencer_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub influencer_social_handle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub influencer_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl PromoCode {
    /// Attributed influencer name. Blank names count as unattributed.
    #[must_use]
    pub fn influencer(&self) -> Option<&str> {
        self.influencer_name.as_deref().filter(|name| !name.is_empty())
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == PromoStatus::Active
    }

    /// Discount this code grants on `price`.
    #[must_use]
    pub fn discount_on(&self, price: Amount) -> Amount {
        match self.discount_type {
            DiscountType::Percentage => price.percent_of(self.value),
            DiscountType::FixedAmount => self.value,
        }
    }

    /// Redemptions left before the cap, if the code has one.
    #[must_use]
    pub fn remaining_uses(&self) -> Option<u64> {
        self.max_uses.map(|max| max.saturating_sub(self.used_count))
    }

    /// Human form of the value: `20%` or `$10.00`.
    #[must_use]
    pub fn value_label(&self) -> String {
        match self.discount_type {
            DiscountType::Percentage => {
                let text = self.value.to_string();
                let trimmed = text.strip_suffix(".00").unwrap_or(&text);
                format!("{}%", trimmed)
            }
            DiscountType::FixedAmount => crate::money::format_currency(self.value),
        }
    }
}

/// Payload for creating or replacing a promo code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromoCodeDraft {
    pub code: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub discount_type: DiscountType,
    pub value: Amount,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_amount: Option<Amount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_uses: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_from: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_until: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub influencer_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub influencer_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub influencer_social_handle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub influencer_notes: Option<String>,
}

impl PromoCodeDraft {
    /// A draft with the default usage cap and no validity window.
    #[must_use]
    pub fn new(
        code: impl Into<String>,
        name: impl Into<String>,
        discount_type: DiscountType,
        value: Amount,
    ) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            description: None,
            discount_type,
            value,
            minimum_amount: None,
            max_uses: Some(DEFAULT_MAX_USES),
            valid_from: None,
            valid_until: None,
            influencer_name: None,
            influencer_email: None,
            influencer_social_handle: None,
            influencer_notes: None,
        }
    }

    /// One-click preset: valid from `now` for a year, capped at 100 uses.
    #[must_use]
    pub fn quick(
        code: impl Into<String>,
        name: impl Into<String>,
        discount_type: DiscountType,
        value: Amount,
        now: DateTime<Utc>,
    ) -> Self {
        let mut draft = Self::new(code, name, discount_type, value);
        draft.valid_from = Some(now);
        draft.valid_until = now.checked_add_signed(TimeDelta::days(QUICK_CODE_VALIDITY_DAYS));
        draft
    }

    /// Prefill an edit form from an existing code.
    #[must_use]
    pub fn from_existing(code: &PromoCode) -> Self {
        Self {
            code: code.code.clone(),
            name: code.name.clone(),
            description: code.description.clone(),
            discount_type: code.discount_type,
            value: code.value,
            minimum_amount: code.minimum_amount,
            max_uses: Some(code.max_uses.unwrap_or(DEFAULT_MAX_USES)),
            valid_from: code.valid_from,
            valid_until: code.valid_until,
            influencer_name: code.influencer_name.clone(),
            influencer_email: code.influencer_email.clone(),
            influencer_social_handle: code.influencer_social_handle.clone(),
            influencer_notes: code.influencer_notes.clone(),
        }
    }
}

/// The two preset codes offered on the promo-code screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuickPreset {
    /// `QUICK20`: 20% off.
    Quick20,
    /// `SAVE10`: $10 off.
    Save10,
}

impl QuickPreset {
    #[must_use]
    pub fn draft(self, now: DateTime<Utc>) -> PromoCodeDraft {
        match self {
            QuickPreset::Quick20 => PromoCodeDraft::quick(
                "QUICK20",
                "Quick 20% Off",
                DiscountType::Percentage,
                Amount::from_units(20),
                now,
            ),
            QuickPreset::Save10 => PromoCodeDraft::quick(
                "SAVE10",
                "Save $10",
                DiscountType::FixedAmount,
                Amount::from_units(10),
                now,
            ),
        }
    }
}

impl FromStr for QuickPreset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "QUICK20" => Ok(QuickPreset::Quick20),
            "SAVE10" => Ok(QuickPreset::Save10),
            other => Err(format!("Unknown preset {:?} (expected QUICK20 or SAVE10)", other)),
        }
    }
}

/// Answer of `GET /promo-codes/validate/{code}?amount=…`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromoValidation {
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount: Option<Amount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_amount: Option<Amount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PromoValidation {
    /// Price after discount. Falls back to `price - discount` when the server
    /// omits `finalAmount`.
    #[must_use]
    pub fn final_price(&self, price: Amount) -> Amount {
        self.final_amount
            .unwrap_or_else(|| price.saturating_sub(self.discount.unwrap_or_default()))
    }
}
