//! # Kumu Client - The Kit
//!
//! Typed HTTP client for the Kumu coaching REST API.
//!
//! Every request the console makes goes through [`KumuClient`]. Calls return
//! `Result<T, ApiError>`; callers that only want a best-effort list use
//! [`or_empty`] or the concurrent [`AdminSnapshot`] / [`InfluencerSnapshot`]
//! loaders.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use kumu_client::KumuClient;
//! use kumu_core::schema::LoginRequest;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), kumu_client::ApiError> {
//!     let client = KumuClient::new("http://localhost:3005");
//!     let session = client
//!         .admin_login(&LoginRequest::new("admin@kumu.app", "secret"))
//!         .await?;
//!
//!     let client = client.with_session(session);
//!     for user in client.users().await? {
//!         println!("{} {}", user.email, user.verification_label());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Roles
//!
//! ```text
//! ┌──────────────┐  Bearer adminToken       ┌──────────────────────┐
//! │ admin        │ ───────────────────────► │ /admin/*             │
//! │ session      │                          │ /promo-codes         │
//! ├──────────────┤  Bearer influencerToken  ├──────────────────────┤
//! │ influencer   │ ───────────────────────► │ /influencer/*        │
//! │ session      │                          │                      │
//! ├──────────────┤  no token                ├──────────────────────┤
//! │ anonymous    │ ───────────────────────► │ logins, register,    │
//! │              │                          │ validate, verify     │
//! └──────────────┘                          └──────────────────────┘
//! ```

mod endpoints;
mod snapshot;

pub use endpoints::{ApiEndpoints, CHECKOUT_PRODUCT_ID};
pub use snapshot::{or_empty, AdminSnapshot, InfluencerSnapshot};

use kumu_core::money::Amount;
use kumu_core::schema::{
    ApiMessage, Commission, InfluencerProfile, InfluencerRegistration, LoginRequest,
    LoginResponse, NewWithdrawal, PaymentVerification, PendingInfluencer, ProfileUpdate,
    PromoCode, PromoCodeDraft, PromoValidation, Subscription, User, WithdrawalDecision,
    WithdrawalRequest,
};
use kumu_core::session::{Role, Session};
use kumu_core::validation::{self, ValidationErrors};
use kumu_core::workflow::{ApprovalAction, TransitionError, WithdrawalAction};
use reqwest::header::{HeaderValue, AUTHORIZATION};
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// Per-request timeout.
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

// =============================================================================
// ERROR TYPE
// =============================================================================

/// Errors from the Kumu API client.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport failure: connect, timeout, body read.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body did not match the expected shape.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Non-success status. `message` comes from the `{"message"}` body when
    /// present, otherwise the raw body text.
    #[error("Server error ({status}): {message}")]
    Status { status: u16, message: String },

    /// 401 or 403: the token is missing, expired or lacks the role.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The client holds no session for the role this call needs.
    #[error("Not logged in as {0}")]
    NotLoggedIn(Role),

    /// Pre-flight validation failed; nothing was sent.
    #[error("Invalid input: {0}")]
    Invalid(#[from] ValidationErrors),

    /// The record's status does not accept the decision; nothing was sent.
    #[error("{0}")]
    Transition(#[from] TransitionError),

    /// The token cannot be sent as a header value.
    #[error("Invalid header: {0}")]
    InvalidHeader(String),
}

impl ApiError {
    /// Classify a non-success response.
    #[must_use]
    pub fn from_response(status: StatusCode, body: &str) -> Self {
        let message = serde_json::from_str::<ApiMessage>(body)
            .map(|m| m.message.to_string())
            .unwrap_or_else(|_| body.trim().to_string());
        let message = if message.is_empty() {
            status
                .canonical_reason()
                .unwrap_or("no response body")
                .to_string()
        } else {
            message
        };
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ApiError::Unauthorized(message),
            _ => ApiError::Status {
                status: status.as_u16(),
                message,
            },
        }
    }

    /// Whether logging in again could fix this.
    #[must_use]
    pub fn needs_login(&self) -> bool {
        matches!(self, ApiError::Unauthorized(_) | ApiError::NotLoggedIn(_))
    }
}

// =============================================================================
// CLIENT
// =============================================================================

/// HTTP client for the Kumu API.
///
/// Holds at most one [`Session`]. Admin calls need an admin session,
/// influencer calls an influencer session; anonymous calls need none.
#[derive(Debug, Clone)]
pub struct KumuClient {
    endpoints: ApiEndpoints,
    client: reqwest::Client,
    session: Option<Session>,
}

/// HTTP client with `timeout` on every request.
///
/// Building only fails when the TLS backend cannot initialise; the fallback
/// client then has no timeout, so that case is logged.
fn http_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_else(|err| {
            warn!(error = %err, "HTTP client setup failed; requests run without a timeout");
            reqwest::Client::new()
        })
}

impl KumuClient {
    /// Create an anonymous client for `base_url` with a 30-second timeout.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            endpoints: ApiEndpoints::new(base_url),
            client: http_client(Duration::from_secs(REQUEST_TIMEOUT_SECS)),
            session: None,
        }
    }

    /// Attach a session. Replaces any previous one.
    #[must_use]
    pub fn with_session(mut self, session: Session) -> Self {
        self.session = Some(session);
        self
    }

    #[must_use]
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    #[must_use]
    pub fn endpoints(&self) -> &ApiEndpoints {
        &self.endpoints
    }

    fn authed(&self, role: Role, builder: RequestBuilder) -> Result<RequestBuilder, ApiError> {
        let session = self
            .session
            .as_ref()
            .filter(|s| s.role == role)
            .ok_or(ApiError::NotLoggedIn(role))?;
        let value = HeaderValue::from_str(&session.bearer())
            .map_err(|e| ApiError::InvalidHeader(e.to_string()))?;
        Ok(builder.header(AUTHORIZATION, value))
    }

    fn admin(&self, builder: RequestBuilder) -> Result<RequestBuilder, ApiError> {
        self.authed(Role::Admin, builder)
    }

    fn influencer(&self, builder: RequestBuilder) -> Result<RequestBuilder, ApiError> {
        self.authed(Role::Influencer, builder)
    }

    async fn body(builder: RequestBuilder) -> Result<String, ApiError> {
        let response = builder.send().await?;
        let status = response.status();
        let url = response.url().path().to_string();
        let body = response.text().await?;
        debug!(%status, path = %url, bytes = body.len(), "api response");
        if !status.is_success() {
            return Err(ApiError::from_response(status, &body));
        }
        Ok(body)
    }

    async fn json<T: DeserializeOwned>(builder: RequestBuilder) -> Result<T, ApiError> {
        let body = Self::body(builder).await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// For calls whose success body carries nothing the console uses.
    async fn unit(builder: RequestBuilder) -> Result<(), ApiError> {
        Self::body(builder).await.map(|_| ())
    }

    async fn login(&self, role: Role, url: String, request: &LoginRequest) -> Result<Session, ApiError> {
        let response: LoginResponse = Self::json(self.client.post(url).json(request)).await?;
        if let Some(user) = &response.user {
            debug!(role = %role, email = %user.email, "logged in");
        }
        Ok(Session::new(role, response.access_token))
    }

    // -------------------------------------------------------------------------
    // Admin
    // -------------------------------------------------------------------------

    /// `POST /admin/login`.
    pub async fn admin_login(&self, request: &LoginRequest) -> Result<Session, ApiError> {
        self.login(Role::Admin, self.endpoints.admin_login(), request)
            .await
    }

    pub async fn users(&self) -> Result<Vec<User>, ApiError> {
        Self::json(self.admin(self.client.get(self.endpoints.admin_users()))?).await
    }

    pub async fn subscriptions(&self) -> Result<Vec<Subscription>, ApiError> {
        Self::json(self.admin(self.client.get(self.endpoints.admin_subscriptions()))?).await
    }

    pub async fn promo_codes(&self) -> Result<Vec<PromoCode>, ApiError> {
        Self::json(self.admin(self.client.get(self.endpoints.promo_codes()))?).await
    }

    /// Validates the draft first; returns the stored code.
    pub async fn create_promo_code(&self, draft: &PromoCodeDraft) -> Result<PromoCode, ApiError> {
        validation::validate_promo_draft(draft)?;
        let request = self.client.post(self.endpoints.promo_codes()).json(draft);
        Self::json(self.admin(request)?).await
    }

    pub async fn update_promo_code(
        &self,
        id: &str,
        draft: &PromoCodeDraft,
    ) -> Result<PromoCode, ApiError> {
        validation::validate_promo_draft(draft)?;
        let request = self.client.put(self.endpoints.promo_code(id)).json(draft);
        Self::json(self.admin(request)?).await
    }

    pub async fn delete_promo_code(&self, id: &str) -> Result<(), ApiError> {
        Self::unit(self.admin(self.client.delete(self.endpoints.promo_code(id)))?).await
    }

    /// Check a code against `amount`. Needs no session.
    pub async fn validate_promo_code(
        &self,
        code: &str,
        amount: Amount,
    ) -> Result<PromoValidation, ApiError> {
        let request = self
            .client
            .get(self.endpoints.promo_code_validate(code))
            .query(&[("amount", amount.to_string())]);
        Self::json(request).await
    }

    /// Ask the API to push promo codes into the checkout product.
    pub async fn sync_stripe(&self) -> Result<(), ApiError> {
        let request = self
            .client
            .post(self.endpoints.stripe_checkout_session())
            .json(&serde_json::json!({ "productId": CHECKOUT_PRODUCT_ID }));
        Self::unit(self.admin(request)?).await
    }

    pub async fn pending_influencers(&self) -> Result<Vec<PendingInfluencer>, ApiError> {
        Self::json(self.admin(self.client.get(self.endpoints.admin_pending_influencers()))?)
            .await
    }

    /// Approve or reject an application. Refused locally unless it is pending.
    pub async fn review_influencer(
        &self,
        influencer: &PendingInfluencer,
        action: ApprovalAction,
    ) -> Result<(), ApiError> {
        influencer.status.can_apply(action)?;
        let url = self
            .endpoints
            .admin_influencer_action(&influencer.id, action);
        Self::unit(self.admin(self.client.put(url))?).await
    }

    pub async fn admin_withdrawals(&self) -> Result<Vec<WithdrawalRequest>, ApiError> {
        Self::json(self.admin(self.client.get(self.endpoints.admin_withdrawals()))?).await
    }

    /// Approve, reject or mark paid. Refused locally when the current status
    /// does not take `action`. `reason` is only sent with a rejection.
    pub async fn review_withdrawal(
        &self,
        withdrawal: &WithdrawalRequest,
        action: WithdrawalAction,
        reason: Option<String>,
    ) -> Result<(), ApiError> {
        withdrawal.status.can_apply(action)?;
        let decision = WithdrawalDecision {
            rejection_reason: reason.filter(|_| action == WithdrawalAction::Reject),
        };
        let url = self
            .endpoints
            .admin_withdrawal_action(&withdrawal.id, action);
        Self::unit(self.admin(self.client.put(url).json(&decision))?).await
    }

    // -------------------------------------------------------------------------
    // Influencer
    // -------------------------------------------------------------------------

    /// `POST /influencer/login`.
    pub async fn influencer_login(&self, request: &LoginRequest) -> Result<Session, ApiError> {
        self.login(Role::Influencer, self.endpoints.influencer_login(), request)
            .await
    }

    /// Sign up. Validates the form first; needs no session.
    pub async fn register_influencer(
        &self,
        registration: &InfluencerRegistration,
        confirm_password: &str,
    ) -> Result<(), ApiError> {
        validation::validate_registration(registration, confirm_password)?;
        let request = self
            .client
            .post(self.endpoints.influencer_register())
            .json(registration);
        Self::unit(request).await
    }

    pub async fn influencer_profile(&self) -> Result<InfluencerProfile, ApiError> {
        Self::json(self.influencer(self.client.get(self.endpoints.influencer_profile()))?).await
    }

    pub async fn update_influencer_profile(&self, update: &ProfileUpdate) -> Result<(), ApiError> {
        let request = self.client.put(self.endpoints.influencer_profile()).json(update);
        Self::unit(self.influencer(request)?).await
    }

    pub async fn commissions(&self) -> Result<Vec<Commission>, ApiError> {
        Self::json(self.influencer(self.client.get(self.endpoints.influencer_commissions()))?)
            .await
    }

    pub async fn influencer_withdrawals(&self) -> Result<Vec<WithdrawalRequest>, ApiError> {
        Self::json(self.influencer(self.client.get(self.endpoints.influencer_withdrawals()))?)
            .await
    }

    /// Request a payout. `available` caps the amount when known.
    pub async fn request_withdrawal(
        &self,
        withdrawal: &NewWithdrawal,
        available: Option<Amount>,
    ) -> Result<(), ApiError> {
        validation::validate_withdrawal(withdrawal, available)?;
        let request = self
            .client
            .post(self.endpoints.influencer_withdrawals())
            .json(withdrawal);
        Self::unit(self.influencer(request)?).await
    }

    pub async fn influencer_promo_codes(&self) -> Result<Vec<PromoCode>, ApiError> {
        Self::json(self.influencer(self.client.get(self.endpoints.influencer_promo_codes()))?)
            .await
    }

    // -------------------------------------------------------------------------
    // Checkout
    // -------------------------------------------------------------------------

    /// Details of a finished checkout. Needs no session.
    pub async fn verify_payment(&self, session_id: &str) -> Result<PaymentVerification, ApiError> {
        let request = self
            .client
            .get(self.endpoints.stripe_verify_payment())
            .query(&[("session_id", session_id)]);
        Self::json(request).await
    }
}
