//! End-to-end authorization tests over the full middleware stack.

mod common;

use http::StatusCode;
use lifedrop_service::store::AccountStore;
use uuid::Uuid;

async fn registered_app() -> (common::TestApp, Uuid) {
    let app = common::build_app(1_000).await;

    let response = app
        .request(
            "POST",
            "/account/v1/register",
            Some(serde_json::json!({
                "email": "donor@example.org",
                "full_name": "Aria Donor",
                "gender": "female",
                "national_id": "3171234567890001",
                "country_iso_code": "ID",
                "dial_code": "+62",
                "phone_number": "81234567890",
            })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED);

    let account = app
        .store
        .as_ref()
        .find_by_email("donor@example.org")
        .await
        .unwrap()
        .expect("account registered");

    (app, account.id)
}

async fn activated_token(app: &common::TestApp, account_id: Uuid) -> String {
    app.seed_activation_code(account_id, "AB12CD").await;

    let response = app
        .request(
            "POST",
            "/account/v1/activate",
            Some(serde_json::json!({
                "code": "AB12CD",
                "password": "str0ng-Passw0rd",
            })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let response = app
        .request(
            "POST",
            "/auth/v1/authorize",
            Some(serde_json::json!({
                "email": "donor@example.org",
                "password": "str0ng-Passw0rd",
                "platform": "web",
            })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    response.body["data"]["access_token"]
        .as_str()
        .expect("access token")
        .to_string()
}

#[tokio::test]
async fn test_public_route_needs_no_token() {
    let app = common::build_app(1_000).await;
    let response = app.request("GET", "/health/v1/live", None, None).await;
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_protected_route_requires_header() {
    let app = common::build_app(1_000).await;

    let missing = app.request("GET", "/account/v1/self", None, None).await;
    assert_eq!(missing.status, StatusCode::UNAUTHORIZED);

    let garbage = app
        .request("GET", "/account/v1/self", None, Some("not-a-token"))
        .await;
    assert_eq!(garbage.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_authorize_rejected_before_activation() {
    let (app, _) = registered_app().await;

    let response = app
        .request(
            "POST",
            "/auth/v1/authorize",
            Some(serde_json::json!({
                "email": "donor@example.org",
                "password": "str0ng-Passw0rd",
                "platform": "web",
            })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_subject_without_grouping_is_forbidden() {
    let (app, account_id) = registered_app().await;
    let token = activated_token(&app, account_id).await;

    // Valid token, but no grouping rule: fail closed.
    let response = app
        .request("GET", "/account/v1/self", None, Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_full_donor_flow() {
    let (app, account_id) = registered_app().await;
    let token = activated_token(&app, account_id).await;

    let subject = account_id.to_string();
    app.engine
        .add_role_for_user(&subject, "donor", "region:east")
        .await
        .unwrap();
    app.engine
        .add_policy("donor", "*", "/account/v1/self", "GET")
        .await
        .unwrap();

    let response = app
        .request("GET", "/account/v1/self", None, Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.body["data"]["email"].as_str(),
        Some("donor@example.org")
    );
    // The digest never leaves the server; only the masked form does.
    assert_eq!(
        response.body["data"]["national_id_masked"].as_str(),
        Some("31****01")
    );
}

#[tokio::test]
async fn test_permission_revocation_denies_route() {
    let (app, account_id) = registered_app().await;
    let token = activated_token(&app, account_id).await;
    let subject = account_id.to_string();

    app.engine
        .add_role_for_user(&subject, "donor", "region:east")
        .await
        .unwrap();
    app.engine
        .add_policy("donor", "*", "/account/v1/self", "GET")
        .await
        .unwrap();
    assert_eq!(
        app.request("GET", "/account/v1/self", None, Some(&token))
            .await
            .status,
        StatusCode::OK
    );

    app.engine
        .remove_policy("donor", "*", "/account/v1/self", "GET")
        .await
        .unwrap();
    assert_eq!(
        app.request("GET", "/account/v1/self", None, Some(&token))
            .await
            .status,
        StatusCode::FORBIDDEN
    );
}

#[tokio::test]
async fn test_tampered_token_unauthorized() {
    let (app, account_id) = registered_app().await;
    let token = activated_token(&app, account_id).await;

    let mut tampered = token.clone();
    let flipped = if tampered.ends_with('A') { 'B' } else { 'A' };
    tampered.pop();
    tampered.push(flipped);

    let response = app
        .request("GET", "/account/v1/self", None, Some(&tampered))
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_validation_errors_are_bad_requests() {
    let app = common::build_app(1_000).await;

    let response = app
        .request(
            "POST",
            "/account/v1/register",
            Some(serde_json::json!({
                "email": "not-an-email",
                "full_name": "A",
                "gender": "female",
                "national_id": "123",
                "country_iso_code": "IDN",
                "dial_code": "+62",
                "phone_number": "81234567890",
            })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}
