//! # Validation Module
//!
//! Field validators and the composite checks run before a payload is sent.
//!
//! The leaf validators in [`bank`] and [`form`] return `bool`. The composite
//! checks collect every failure into [`ValidationErrors`] so a caller can
//! show all problems at once, in field order.

pub mod bank;
pub mod form;

use crate::money::{self, Amount};
use crate::schema::{DiscountType, InfluencerRegistration, NewWithdrawal, PromoCodeDraft};
use serde::Serialize;
use std::fmt;

/// User-facing texts for failed checks.
pub mod messages {
    pub const REQUIRED: &str = "This field is required";
    pub const EMAIL: &str = "Please enter a valid email address";
    pub const PASSWORD: &str = "Password must be at least 8 characters";
    pub const PHONE: &str = "Please enter a valid phone number";
    pub const ROUTING_NUMBER: &str = "Please enter a valid 9-digit routing number";
    pub const ACCOUNT_NUMBER: &str = "Please enter a valid account number";
    pub const BANK_NAME: &str = "Please enter a valid bank name";
    pub const ACCOUNT_HOLDER_NAME: &str = "Please enter a valid account holder name";
    pub const PASSWORDS_DIFFER: &str = "Passwords do not match";
    pub const AMOUNT_POSITIVE: &str = "Amount must be greater than zero";
    pub const PERCENT_RANGE: &str = "Percentage discount cannot exceed 100";
    pub const MAX_USES: &str = "Max uses must be at least 1";
    pub const WITHDRAWAL_MINIMUM: &str = "Minimum withdrawal amount is $1.00";

    #[must_use]
    pub fn min_length(min: usize) -> String {
        format!("Must be at least {} characters", min)
    }

    #[must_use]
    pub fn max_length(max: usize) -> String {
        format!("Must be no more than {} characters", max)
    }

    #[must_use]
    pub fn over_balance(available: &str) -> String {
        format!("Amount exceeds available balance of {}", available)
    }
}

/// Smallest payout an influencer may request.
pub const MIN_WITHDRAWAL: Amount = Amount::from_units(1);

/// Minimum password length on the influencer sign-up form.
pub const REGISTRATION_PASSWORD_MIN: usize = 6;

/// One failed field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// Every failure of one composite check, in field order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.push(FieldError {
            field,
            message: message.into(),
        });
    }

    /// Record `message` for `field` unless `ok`.
    pub fn check(&mut self, ok: bool, field: &'static str, message: impl Into<String>) {
        if !ok {
            self.push(field, message);
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    /// First message recorded for `field`.
    #[must_use]
    pub fn for_field(&self, field: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    /// `Ok(())` when nothing failed.
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", error.field, error.message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

fn check_bank_fields(
    errors: &mut ValidationErrors,
    bank_account: &str,
    bank_name: &str,
    account_holder_name: &str,
) {
    errors.check(
        bank::account_number(bank_account),
        "bankAccount",
        messages::ACCOUNT_NUMBER,
    );
    errors.check(bank::bank_name(bank_name), "bankName", messages::BANK_NAME);
    errors.check(
        bank::account_holder_name(account_holder_name),
        "accountHolderName",
        messages::ACCOUNT_HOLDER_NAME,
    );
}

/// Pre-flight check of a payout request.
///
/// `available` is the balance the influencer may withdraw (the profile's
/// pending earnings); `None` when the profile could not be loaded, in which
/// case only the minimum is checked.
pub fn validate_withdrawal(
    request: &NewWithdrawal,
    available: Option<Amount>,
) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    if !request.amount.is_positive() {
        errors.push("amount", messages::AMOUNT_POSITIVE);
    } else if request.amount < MIN_WITHDRAWAL {
        errors.push("amount", messages::WITHDRAWAL_MINIMUM);
    } else if let Some(available) = available.filter(|a| request.amount > *a) {
        errors.push(
            "amount",
            messages::over_balance(&money::format_currency(available)),
        );
    }
    check_bank_fields(
        &mut errors,
        &request.bank_account,
        &request.bank_name,
        &request.account_holder_name,
    );
    if let Some(routing) = request.routing_number.as_deref().filter(|r| !r.is_empty()) {
        errors.check(
            bank::routing_number(routing),
            "routingNumber",
            messages::ROUTING_NUMBER,
        );
    }
    errors.into_result()
}

/// Pre-flight check of the influencer sign-up form.
///
/// Bank details are optional at sign-up; they are only checked when any of
/// them is filled in.
pub fn validate_registration(
    registration: &InfluencerRegistration,
    confirm_password: &str,
) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    errors.check(form::required(&registration.name), "name", messages::REQUIRED);
    errors.check(form::email(&registration.email), "email", messages::EMAIL);
    errors.check(
        form::min_length(&registration.password, REGISTRATION_PASSWORD_MIN),
        "password",
        messages::min_length(REGISTRATION_PASSWORD_MIN),
    );
    errors.check(
        registration.password == confirm_password,
        "confirmPassword",
        messages::PASSWORDS_DIFFER,
    );
    errors.check(
        form::required(&registration.social_handle),
        "socialHandle",
        messages::REQUIRED,
    );

    let any_bank = [
        &registration.bank_account,
        &registration.bank_name,
        &registration.account_holder_name,
    ]
    .iter()
    .any(|field| form::required(field));
    if any_bank {
        check_bank_fields(
            &mut errors,
            &registration.bank_account,
            &registration.bank_name,
            &registration.account_holder_name,
        );
    }
    errors.into_result()
}

/// Pre-flight check of a promo-code create/update payload.
pub fn validate_promo_draft(draft: &PromoCodeDraft) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    errors.check(form::required(&draft.code), "code", messages::REQUIRED);
    errors.check(form::required(&draft.name), "name", messages::REQUIRED);
    if !draft.value.is_positive() {
        errors.push("value", messages::AMOUNT_POSITIVE);
    } else if draft.discount_type == DiscountType::Percentage
        && draft.value > Amount::from_units(100)
    {
        errors.push("value", messages::PERCENT_RANGE);
    }
    if draft.max_uses == Some(0) {
        errors.push("maxUses", messages::MAX_USES);
    }
    if let Some(email) = draft.influencer_email.as_deref().filter(|e| !e.is_empty()) {
        errors.check(form::email(email), "influencerEmail", messages::EMAIL);
    }
    errors.into_result()
}
