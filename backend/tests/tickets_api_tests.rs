//! End-to-end tests for `/tickets` and `/tickets/types`.

#![cfg(feature = "http-server")]

mod support;

use axum::http::StatusCode;
use eventpass::db::TicketRepository;
use eventpass::models::TicketStatus;
use support::*;

// =========================================================
// GET /tickets/types
// =========================================================

#[tokio::test]
async fn ticket_types_require_token() {
    let app = TestApp::new();
    let (status, _) = app.get("/tickets/types", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn ticket_types_empty_catalog_is_ok() {
    let app = TestApp::new();
    let user = create_user(&app.repo);
    let token = app.sign_in(&user).await;

    let (status, body) = app.get("/tickets/types", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, serde_json::json!([]));
}

#[tokio::test]
async fn ticket_types_list_every_type() {
    let app = TestApp::new();
    let user = create_user(&app.repo);
    let token = app.sign_in(&user).await;
    let remote = create_ticket_type(&app.repo, true, false);
    let with_hotel = create_ticket_type(&app.repo, false, true);

    let (status, body) = app.get("/tickets/types", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);

    let types = body.as_array().unwrap();
    assert_eq!(types.len(), 2);
    assert_eq!(types[0]["id"], remote.id.value());
    assert_eq!(types[0]["isRemote"], true);
    assert_eq!(types[0]["includesHotel"], false);
    assert_eq!(types[1]["id"], with_hotel.id.value());
    assert_eq!(types[1]["price"], 35_000);
}

// =========================================================
// GET /tickets
// =========================================================

#[tokio::test]
async fn get_ticket_requires_token() {
    let app = TestApp::new();
    let (status, _) = app.get("/tickets", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn get_ticket_without_ticket_is_not_found() {
    let app = TestApp::new();
    let user = create_user(&app.repo);
    create_enrollment(&app.repo, &user);
    let token = app.sign_in(&user).await;

    let (status, _) = app.get("/tickets", Some(&token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn get_ticket_without_enrollment_is_not_found() {
    let app = TestApp::new();
    let user = create_user(&app.repo);
    let token = app.sign_in(&user).await;

    let (status, _) = app.get("/tickets", Some(&token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn get_ticket_returns_ticket_with_type() {
    let app = TestApp::new();
    let (user, ticket) = create_ticket_holder(&app.repo, TicketStatus::Paid, false, true);
    let token = app.sign_in(&user).await;

    let (status, body) = app.get("/tickets", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], ticket.id.value());
    assert_eq!(body["status"], "PAID");
    assert_eq!(body["ticketTypeId"], ticket.ticket_type_id.value());
    assert_eq!(body["enrollmentId"], ticket.enrollment_id.value());
    assert_eq!(body["TicketType"]["id"], ticket.ticket_type_id.value());
    assert_eq!(body["TicketType"]["includesHotel"], true);
}

#[tokio::test]
async fn get_ticket_returns_lowest_id_when_several_exist() {
    let app = TestApp::new();
    let (user, first) = create_ticket_holder(&app.repo, TicketStatus::Reserved, false, false);
    let other_type = create_ticket_type(&app.repo, true, false);
    create_ticket(&app.repo, first.enrollment_id, other_type.id, TicketStatus::Paid);
    let token = app.sign_in(&user).await;

    let (status, body) = app.get("/tickets", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], first.id.value());
    assert_eq!(body["status"], "RESERVED");
}

#[tokio::test]
async fn get_ticket_only_sees_own_tickets() {
    let app = TestApp::new();
    create_ticket_holder(&app.repo, TicketStatus::Paid, false, true);
    let stranger = create_user(&app.repo);
    create_enrollment(&app.repo, &stranger);
    let token = app.sign_in(&stranger).await;

    let (status, _) = app.get("/tickets", Some(&token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// =========================================================
// POST /tickets
// =========================================================

#[tokio::test]
async fn create_ticket_requires_token() {
    let app = TestApp::new();
    let (status, _) = app.post_json("/tickets", None, r#"{"ticketTypeId": 1}"#).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn create_ticket_rejects_invalid_bodies() {
    let app = TestApp::new();
    let user = create_user(&app.repo);
    create_enrollment(&app.repo, &user);
    let token = app.sign_in(&user).await;
    create_ticket_type(&app.repo, false, true);

    for body in [
        "",
        "{",
        "{}",
        r#"{"ticketTypeId": "1"}"#,
        r#"{"ticketTypeId": 1.5}"#,
        r#"{"ticketTypeId": null}"#,
        r#"{"ticketTypeId": 1, "status": "PAID"}"#,
        r#"[1]"#,
    ] {
        let (status, response) = app.post_json("/tickets", Some(&token), body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "body {:?}", body);
        assert_eq!(response["code"], "BAD_REQUEST");
    }

    assert!(app
        .repo
        .find_first_ticket_by_user(user.id)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn create_ticket_without_enrollment_is_not_found() {
    let app = TestApp::new();
    let user = create_user(&app.repo);
    let token = app.sign_in(&user).await;
    let ticket_type = create_ticket_type(&app.repo, false, true);

    let (status, _) = app
        .post_json(
            "/tickets",
            Some(&token),
            &format!(r#"{{"ticketTypeId": {}}}"#, ticket_type.id),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn create_ticket_with_unknown_type_is_not_found() {
    let app = TestApp::new();
    let user = create_user(&app.repo);
    create_enrollment(&app.repo, &user);
    let token = app.sign_in(&user).await;

    let (status, _) = app
        .post_json("/tickets", Some(&token), r#"{"ticketTypeId": 4242}"#)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(app
        .repo
        .find_first_ticket_by_user(user.id)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn create_ticket_reserves_ticket() {
    let app = TestApp::new();
    let user = create_user(&app.repo);
    let enrollment = create_enrollment(&app.repo, &user);
    let token = app.sign_in(&user).await;
    let ticket_type = create_ticket_type(&app.repo, false, true);

    let (status, body) = app
        .post_json(
            "/tickets",
            Some(&token),
            &format!(r#"{{"ticketTypeId": {}}}"#, ticket_type.id),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "RESERVED");
    assert_eq!(body["ticketTypeId"], ticket_type.id.value());
    assert_eq!(body["enrollmentId"], enrollment.enrollment.id.value());
    assert_eq!(body["TicketType"]["name"], ticket_type.name.as_str());

    let (status, fetched) = app.get("/tickets", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["id"], body["id"]);
}

#[tokio::test]
async fn reserved_ticket_does_not_unlock_hotels() {
    let app = TestApp::new();
    let user = create_user(&app.repo);
    create_enrollment(&app.repo, &user);
    let token = app.sign_in(&user).await;
    let ticket_type = create_ticket_type(&app.repo, false, true);
    create_hotel(&app.repo);

    let (status, _) = app
        .post_json(
            "/tickets",
            Some(&token),
            &format!(r#"{{"ticketTypeId": {}}}"#, ticket_type.id),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = app.get("/hotels", Some(&token)).await;
    assert_eq!(status, StatusCode::PAYMENT_REQUIRED);
}
