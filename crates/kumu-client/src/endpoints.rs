//! URL table for the Kumu REST API.

use kumu_core::workflow::{ApprovalAction, WithdrawalAction};
use reqwest::Url;

/// Product id sent when asking the API to sync promo codes into a checkout.
pub const CHECKOUT_PRODUCT_ID: &str = "kumu-coaching-subscription";

/// Every URL the console calls, built from one base.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiEndpoints {
    base: String,
}

impl ApiEndpoints {
    /// Trailing slashes on `base` are dropped.
    pub fn new(base: impl Into<String>) -> Self {
        let base = base.into();
        let trimmed = base.trim_end_matches('/');
        Self {
            base: trimmed.to_string(),
        }
    }

    #[must_use]
    pub fn base(&self) -> &str {
        &self.base
    }

    fn join(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    /// Append `segments` to `parent`, percent-encoding each one so ids and
    /// codes containing `/`, `?` or `#` stay a single path segment.
    fn nested(parent: String, segments: &[&str]) -> String {
        let Ok(mut url) = Url::parse(&parent) else {
            return parent;
        };
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url.into()
    }

    // Admin

    #[must_use]
    pub fn admin_login(&self) -> String {
        self.join("/admin/login")
    }

    #[must_use]
    pub fn admin_users(&self) -> String {
        self.join("/admin/users")
    }

    #[must_use]
    pub fn admin_subscriptions(&self) -> String {
        self.join("/admin/subscriptions")
    }

    #[must_use]
    pub fn admin_withdrawals(&self) -> String {
        self.join("/admin/withdrawals")
    }

    #[must_use]
    pub fn admin_withdrawal_action(&self, id: &str, action: WithdrawalAction) -> String {
        Self::nested(self.admin_withdrawals(), &[id, action.path_segment()])
    }

    #[must_use]
    pub fn admin_influencers(&self) -> String {
        self.join("/admin/influencers")
    }

    #[must_use]
    pub fn admin_pending_influencers(&self) -> String {
        format!("{}/pending", self.admin_influencers())
    }

    #[must_use]
    pub fn admin_influencer_action(&self, id: &str, action: ApprovalAction) -> String {
        Self::nested(self.admin_influencers(), &[id, action.path_segment()])
    }

    // Promo codes

    #[must_use]
    pub fn promo_codes(&self) -> String {
        self.join("/promo-codes")
    }

    #[must_use]
    pub fn promo_code(&self, id: &str) -> String {
        Self::nested(self.promo_codes(), &[id])
    }

    /// Without the `amount` query; the client adds it.
    #[must_use]
    pub fn promo_code_validate(&self, code: &str) -> String {
        Self::nested(self.promo_codes(), &["validate", code])
    }

    // Influencer

    #[must_use]
    pub fn influencer_login(&self) -> String {
        self.join("/influencer/login")
    }

    #[must_use]
    pub fn influencer_register(&self) -> String {
        self.join("/influencer/register")
    }

    #[must_use]
    pub fn influencer_profile(&self) -> String {
        self.join("/influencer/profile")
    }

    #[must_use]
    pub fn influencer_commissions(&self) -> String {
        self.join("/influencer/commissions")
    }

    #[must_use]
    pub fn influencer_withdrawals(&self) -> String {
        self.join("/influencer/withdrawals")
    }

    #[must_use]
    pub fn influencer_promo_codes(&self) -> String {
        self.join("/influencer/promo-codes")
    }

    // Checkout

    #[must_use]
    pub fn stripe_checkout_session(&self) -> String {
        self.join("/stripe/create-checkout-session")
    }

    #[must_use]
    pub fn stripe_verify_payment(&self) -> String {
        self.join("/stripe/verify-payment")
    }

    /// Named endpoints in display order, for the config page.
    #[must_use]
    pub fn table(&self) -> Vec<(&'static str, String)> {
        vec![
            ("ADMIN_LOGIN", self.admin_login()),
            ("ADMIN_USERS", self.admin_users()),
            ("ADMIN_SUBSCRIPTIONS", self.admin_subscriptions()),
            ("ADMIN_WITHDRAWALS", self.admin_withdrawals()),
            ("ADMIN_INFLUENCERS", self.admin_influencers()),
            ("ADMIN_INFLUENCERS_PENDING", self.admin_pending_influencers()),
            ("PROMO_CODES", self.promo_codes()),
            (
                "PROMO_CODES_VALIDATE",
                format!("{}/validate/{{code}}", self.promo_codes()),
            ),
            ("INFLUENCER_LOGIN", self.influencer_login()),
            ("INFLUENCER_REGISTER", self.influencer_register()),
            ("INFLUENCER_PROFILE", self.influencer_profile()),
            ("INFLUENCER_COMMISSIONS", self.influencer_commissions()),
            ("INFLUENCER_WITHDRAWALS", self.influencer_withdrawals()),
            ("INFLUENCER_PROMO_CODES", self.influencer_promo_codes()),
            ("STRIPE_CHECKOUT_SESSION", self.stripe_checkout_session()),
            ("STRIPE_VERIFY_PAYMENT", self.stripe_verify_payment()),
        ]
    }
}
