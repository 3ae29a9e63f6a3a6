//! Integration tests for kumu-client.
//!
//! Uses wiremock to stand in for the Kumu REST API.

// Allow unwrap and panic in tests - these are standard for test code
#![allow(clippy::unwrap_used, clippy::panic)]

use kumu_client::{or_empty, AdminSnapshot, ApiError, InfluencerSnapshot, KumuClient};
use kumu_core::money::Amount;
use kumu_core::schema::{
    DiscountType, InfluencerRegistration, LoginRequest, NewWithdrawal, PendingInfluencer,
    PromoCodeDraft, WithdrawalRequest, WithdrawalStatus,
};
use kumu_core::session::{Role, Session};
use kumu_core::workflow::{ApprovalAction, WithdrawalAction};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// =============================================================================
// FIXTURES
// =============================================================================

fn admin(server: &MockServer) -> KumuClient {
    KumuClient::new(server.uri()).with_session(Session::new(Role::Admin, "admin-jwt"))
}

fn influencer(server: &MockServer) -> KumuClient {
    KumuClient::new(server.uri()).with_session(Session::new(Role::Influencer, "inf-jwt"))
}

fn promo_json(id: &str, code: &str, influencer: &str, uses: u64) -> serde_json::Value {
    json!({
        "id": id,
        "code": code,
        "name": code,
        "type": "percentage",
        "value": 10,
        "maxUses": 100,
        "usedCount": uses,
        "status": "active",
        "influencerName": influencer,
        "createdAt": "2024-01-01T00:00:00Z"
    })
}

fn withdrawal_json(id: &str, status: &str) -> serde_json::Value {
    json!({
        "id": id,
        "influencerName": "Sam Lee",
        "amount": "25.00",
        "status": status,
        "bankAccount": "000123456789",
        "bankName": "Chase",
        "accountHolderName": "Sam Lee",
        "requestedAt": "2024-05-01T09:30:00Z"
    })
}

fn withdrawal(id: &str, status: &str) -> WithdrawalRequest {
    serde_json::from_value(withdrawal_json(id, status)).unwrap()
}

fn pending_influencer(status: &str) -> PendingInfluencer {
    serde_json::from_value(json!({
        "id": "i1",
        "name": "Sam Lee",
        "email": "sam@kumu.app",
        "socialHandle": "@sam",
        "status": status,
        "createdAt": "2024-05-01T09:30:00Z"
    }))
    .unwrap()
}

// =============================================================================
// LOGIN
// =============================================================================

#[tokio::test]
async fn test_admin_login_returns_admin_session() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/admin/login"))
        .and(body_json(json!({"email": "admin@kumu.app", "password": "pw"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "jwt-123",
            "user": {"id": "u1", "email": "admin@kumu.app", "role": "ADMIN"}
        })))
        .mount(&server)
        .await;

    let client = KumuClient::new(server.uri());
    let session = client
        .admin_login(&LoginRequest::new("admin@kumu.app", "pw"))
        .await
        .unwrap();

    assert_eq!(session.role, Role::Admin);
    assert_eq!(session.token, "jwt-123");
}

#[tokio::test]
async fn test_influencer_login_bad_credentials() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/influencer/login"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"message": "Invalid credentials"})),
        )
        .mount(&server)
        .await;

    let err = KumuClient::new(server.uri())
        .influencer_login(&LoginRequest::new("sam@kumu.app", "nope"))
        .await
        .unwrap_err();

    match err {
        ApiError::Unauthorized(message) => assert_eq!(message, "Invalid credentials"),
        other => panic!("expected Unauthorized, got {:?}", other),
    }
}

// =============================================================================
// AUTHORIZATION
// =============================================================================

#[tokio::test]
async fn test_admin_calls_send_bearer_token() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/admin/users"))
        .and(header("authorization", "Bearer admin-jwt"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "u1", "email": "a@kumu.app", "role": "USER", "isEmailVerified": true,
             "createdAt": "2024-01-01T00:00:00Z"}
        ])))
        .mount(&server)
        .await;

    let users = admin(&server).users().await.unwrap();
    assert_eq!(users.len(), 1);
    assert!(users[0].is_email_verified);
}

#[tokio::test]
async fn test_missing_session_is_refused_locally() {
    let server = MockServer::start().await;

    let err = KumuClient::new(server.uri()).users().await.unwrap_err();
    assert!(matches!(err, ApiError::NotLoggedIn(Role::Admin)));
    assert!(err.needs_login());

    let err = admin(&server).commissions().await.unwrap_err();
    assert!(matches!(err, ApiError::NotLoggedIn(Role::Influencer)));

    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_plain_text_error_body_becomes_message() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/admin/subscriptions"))
        .respond_with(ResponseTemplate::new(502).set_body_string("Bad gateway\n"))
        .mount(&server)
        .await;

    let err = admin(&server).subscriptions().await.unwrap_err();
    match err {
        ApiError::Status { status, message } => {
            assert_eq!(status, 502);
            assert_eq!(message, "Bad gateway");
        }
        other => panic!("expected Status, got {:?}", other),
    }
}

// =============================================================================
// PROMO CODES
// =============================================================================

#[tokio::test]
async fn test_create_promo_code_posts_camel_case_draft() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/promo-codes"))
        .respond_with(ResponseTemplate::new(201).set_body_json(promo_json("p9", "SUMMER", "", 0)))
        .expect(1)
        .mount(&server)
        .await;

    let mut draft =
        PromoCodeDraft::new("SUMMER", "Summer", DiscountType::Percentage, Amount::from_units(10));
    draft.influencer_name = Some("Sam Lee".to_string());
    let created = admin(&server).create_promo_code(&draft).await.unwrap();
    assert_eq!(created.id, "p9");

    let requests = server.received_requests().await.unwrap();
    let sent: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(sent["type"], "percentage");
    assert_eq!(sent["maxUses"], 100);
    assert_eq!(sent["influencerName"], "Sam Lee");
}

#[tokio::test]
async fn test_invalid_promo_draft_is_not_sent() {
    let server = MockServer::start().await;

    let draft = PromoCodeDraft::new("", "Nothing", DiscountType::Percentage, Amount::from_units(120));
    let err = admin(&server).create_promo_code(&draft).await.unwrap_err();

    match err {
        ApiError::Invalid(errors) => {
            assert!(errors.for_field("code").is_some());
            assert!(errors.for_field("value").is_some());
        }
        other => panic!("expected Invalid, got {:?}", other),
    }
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_delete_promo_code() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/promo-codes/p1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    admin(&server).delete_promo_code("p1").await.unwrap();
}

#[tokio::test]
async fn test_validate_promo_code_is_anonymous_with_amount() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/promo-codes/validate/SAVE10"))
        .and(query_param("amount", "20.99"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "valid": true,
            "discount": 10,
            "finalAmount": 10.99
        })))
        .mount(&server)
        .await;

    let price = Amount::from_hundredths(2099);
    let result = KumuClient::new(server.uri())
        .validate_promo_code("SAVE10", price)
        .await
        .unwrap();

    assert!(result.valid);
    assert_eq!(result.final_price(price), Amount::from_hundredths(1099));
}

#[tokio::test]
async fn test_sync_stripe_sends_product_id() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/stripe/create-checkout-session"))
        .and(body_json(json!({"productId": "kumu-coaching-subscription"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"url": "https://x"})))
        .expect(1)
        .mount(&server)
        .await;

    admin(&server).sync_stripe().await.unwrap();
}

// =============================================================================
// REVIEW WORKFLOWS
// =============================================================================

#[tokio::test]
async fn test_reject_withdrawal_sends_reason() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/admin/withdrawals/w1/reject"))
        .and(body_json(json!({"rejectionReason": "Bank details mismatch"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "ok"})))
        .expect(1)
        .mount(&server)
        .await;

    admin(&server)
        .review_withdrawal(
            &withdrawal("w1", "pending"),
            WithdrawalAction::Reject,
            Some("Bank details mismatch".to_string()),
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn test_mark_paid_drops_reason() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/admin/withdrawals/w2/pay"))
        .and(body_json(json!({})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    admin(&server)
        .review_withdrawal(
            &withdrawal("w2", "approved"),
            WithdrawalAction::MarkPaid,
            Some("ignored".to_string()),
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn test_paying_a_pending_withdrawal_is_refused_locally() {
    let server = MockServer::start().await;

    let err = admin(&server)
        .review_withdrawal(&withdrawal("w3", "pending"), WithdrawalAction::MarkPaid, None)
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::Transition(_)));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_review_influencer() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/admin/influencers/i1/approve"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let client = admin(&server);
    client
        .review_influencer(&pending_influencer("pending"), ApprovalAction::Approve)
        .await
        .unwrap();

    let err = client
        .review_influencer(&pending_influencer("approved"), ApprovalAction::Reject)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Transition(_)));
}

// =============================================================================
// INFLUENCER SELF-SERVICE
// =============================================================================

#[tokio::test]
async fn test_request_withdrawal_checks_balance_first() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/influencer/withdrawals"))
        .and(header("authorization", "Bearer inf-jwt"))
        .respond_with(ResponseTemplate::new(201).set_body_json(withdrawal_json("w7", "pending")))
        .expect(1)
        .mount(&server)
        .await;

    let client = influencer(&server);
    let request = NewWithdrawal {
        amount: Amount::from_units(40),
        bank_account: "000123456789".to_string(),
        bank_name: "Chase".to_string(),
        account_holder_name: "Sam Lee".to_string(),
        routing_number: Some("021000021".to_string()),
    };

    let err = client
        .request_withdrawal(&request, Some(Amount::from_units(30)))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Invalid(_)));

    client
        .request_withdrawal(&request, Some(Amount::from_units(50)))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_register_validates_then_posts() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/influencer/register"))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(json!({"message": "Pending approval"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let registration = InfluencerRegistration {
        name: "Sam Lee".to_string(),
        email: "sam@kumu.app".to_string(),
        password: "secret1".to_string(),
        social_handle: "@sam".to_string(),
        ..InfluencerRegistration::default()
    };
    let client = KumuClient::new(server.uri());

    let err = client
        .register_influencer(&registration, "secret2")
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Invalid(_)));

    client
        .register_influencer(&registration, "secret1")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_verify_payment() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/stripe/verify-payment"))
        .and(query_param("session_id", "cs_test_1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "planName": "Kumu Coaching Monthly",
            "status": "active",
            "nextBillingDate": "2024-06-01T00:00:00Z"
        })))
        .mount(&server)
        .await;

    let verification = KumuClient::new(server.uri())
        .verify_payment("cs_test_1")
        .await
        .unwrap();
    assert_eq!(verification.plan_name.as_deref(), Some("Kumu Coaching Monthly"));
}

// =============================================================================
// SNAPSHOTS
// =============================================================================

#[tokio::test]
async fn test_admin_snapshot_degrades_each_list() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/promo-codes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            promo_json("p1", "A10", "A", 3),
            promo_json("p2", "B10", "B", 7),
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/admin/withdrawals"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            withdrawal_json("w1", "pending"),
            withdrawal_json("w2", "paid"),
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/admin/users"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"message": "boom"})))
        .mount(&server)
        .await;
    // subscriptions and pending influencers are unmocked: wiremock answers 404

    let snapshot = AdminSnapshot::load(&admin(&server)).await;

    assert!(snapshot.users.is_empty());
    assert!(snapshot.subscriptions.is_empty());
    assert!(snapshot.pending_influencers.is_empty());
    assert_eq!(snapshot.promo_codes.len(), 2);
    assert_eq!(snapshot.withdrawals.len(), 2);
    assert_eq!(
        snapshot.failed,
        vec!["users", "subscriptions", "pending influencers"]
    );

    let overview = snapshot.overview();
    assert_eq!(overview.total_promo_uses, 10);
    assert_eq!(overview.total_influencers, 2);
    assert_eq!(snapshot.influencer_stats()[0].name, "B");
    assert_eq!(snapshot.withdrawal_stats().pending.count, 1);
}

#[tokio::test]
async fn test_influencer_snapshot_without_server_is_empty() {
    // Nothing listens on port 9 (discard); every fetch fails fast.
    let client = KumuClient::new("http://127.0.0.1:9")
        .with_session(Session::new(Role::Influencer, "inf-jwt"));

    let snapshot = InfluencerSnapshot::load(&client).await;

    assert!(snapshot.profile.is_none());
    assert!(snapshot.commissions.is_empty());
    assert!(snapshot.withdrawals.is_empty());
    assert!(snapshot.promo_codes.is_empty());
    assert_eq!(snapshot.failed.len(), 4);
    assert_eq!(snapshot.available_balance(), None);
}

#[tokio::test]
async fn test_influencer_snapshot_balance_follows_pending_earnings() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/influencer/profile"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "i1", "name": "Sam Lee", "email": "sam@kumu.app",
            "totalEarnings": 54.5, "pendingEarnings": 50, "paidEarnings": null
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/influencer/commissions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "c1", "promoCodeId": "p1", "promoCode": "SAM10", "amount": 50,
             "status": "pending", "createdAt": "2024-02-01T00:00:00Z"},
            {"id": "c2", "promoCodeId": "p1", "promoCode": "SAM10", "amount": "4.50",
             "status": "clawed_back", "createdAt": "2024-02-02T00:00:00Z"}
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/influencer/withdrawals"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([withdrawal_json("w1", "pending")])),
        )
        .mount(&server)
        .await;

    let snapshot = InfluencerSnapshot::load(&influencer(&server)).await;

    // Commissions still pending do not block a payout
    assert_eq!(snapshot.available_balance(), Some(Amount::from_units(50)));
    assert_eq!(snapshot.commissions.len(), 2);
    assert_eq!(snapshot.earnings().pending, Amount::from_units(50));
    assert_eq!(snapshot.earnings().approved, Amount::ZERO);
    assert_eq!(snapshot.failed, vec!["promo codes"]);
}

#[test]
fn test_or_empty_passes_success_through() {
    let ok: Result<Vec<u8>, ApiError> = Ok(vec![1, 2]);
    assert_eq!(or_empty(ok, "bytes"), vec![1, 2]);

    let err: Result<Vec<u8>, ApiError> = Err(ApiError::NotLoggedIn(Role::Admin));
    assert!(or_empty(err, "bytes").is_empty());
}

#[test]
fn test_withdrawal_status_from_fixture() {
    assert_eq!(withdrawal("w", "approved").status, WithdrawalStatus::Approved);
}
