//! # Schema Module
//!
//! One definition of every payload exchanged with the Kumu API.
//!
//! Field names follow the API's camelCase JSON. Money fields are [`Amount`],
//! which accepts numbers or numeric strings on the way in.
//!
//! [`Amount`]: crate::money::Amount

mod admin;
mod auth;
mod influencer;
mod promo;

pub use admin::{Subscription, SubscriptionStatus, User};
pub use auth::{ApiMessage, LoginRequest, LoginResponse, MessageText, PaymentVerification, Principal};
pub use influencer::{
    mask_account, ApprovalStatus, Commission, CommissionStatus, InfluencerProfile,
    InfluencerRegistration, NewWithdrawal, PendingInfluencer, ProfileUpdate, WithdrawalDecision,
    WithdrawalRequest, WithdrawalStatus,
};
pub use promo::{
    DiscountType, PromoCode, PromoCodeDraft, PromoStatus, PromoValidation, QuickPreset,
    DEFAULT_MAX_USES, QUICK_CODE_VALIDITY_DAYS,
};
