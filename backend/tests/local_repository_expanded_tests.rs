//! Expanded tests for LocalRepository.
//!
//! These tests cover concurrent access patterns, referential checks on the
//! seeding helpers, and session bookkeeping for the in-memory repository.

mod support;

use std::collections::HashSet;
use std::sync::Arc;

use eventpass::db::repositories::LocalRepository;
use eventpass::db::repository::{
    EnrollmentRepository, RepositoryError, SessionRepository, TicketRepository,
};
use eventpass::models::{EnrollmentId, HotelId, NewTicket, TicketStatus, TicketTypeId, UserId};
use support::*;

#[tokio::test]
async fn test_concurrent_ticket_creation_assigns_unique_ids() {
    let repo = Arc::new(LocalRepository::new());
    let ticket_type_id = create_ticket_type(&repo, false, true).id;

    let mut enrollments = Vec::new();
    for _ in 0..16 {
        let user = create_user(&repo);
        enrollments.push(create_enrollment(&repo, &user).enrollment.id);
    }

    let mut handles = Vec::new();
    for enrollment_id in enrollments {
        let repo = Arc::clone(&repo);
        handles.push(tokio::spawn(async move {
            repo.create_ticket(NewTicket {
                ticket_type_id,
                enrollment_id,
                status: TicketStatus::Reserved,
            })
            .await
        }));
    }

    let mut ids = HashSet::new();
    for handle in handles {
        let created = handle.await.unwrap().unwrap().unwrap();
        assert!(ids.insert(created.ticket.id));
    }
    assert_eq!(ids.len(), 16);
}

#[tokio::test]
async fn test_duplicate_tickets_are_allowed_and_first_is_stable() {
    let repo = LocalRepository::new();
    let user = create_user(&repo);
    let enrollment = create_enrollment(&repo, &user);
    let ticket_type = create_ticket_type(&repo, false, false);

    let first = create_ticket(&repo, enrollment.enrollment.id, ticket_type.id, TicketStatus::Paid);
    create_ticket(&repo, enrollment.enrollment.id, ticket_type.id, TicketStatus::Reserved);

    let by_user = repo.find_first_ticket_by_user(user.id).await.unwrap().unwrap();
    let by_enrollment = repo
        .find_ticket_by_enrollment(enrollment.enrollment.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(by_user.ticket.id, first.id);
    assert_eq!(by_enrollment.ticket.id, first.id);
}

#[tokio::test]
async fn test_enrollment_includes_address() {
    let repo = LocalRepository::new();
    let user = create_user(&repo);
    create_enrollment(&repo, &user);

    let found = repo.find_enrollment_by_user(user.id).await.unwrap().unwrap();
    let address = found.address.unwrap();
    assert_eq!(address.city, "Rio de Janeiro");
    assert_eq!(address.enrollment_id, found.enrollment.id);
}

#[tokio::test]
async fn test_enrollment_is_one_per_user() {
    let repo = LocalRepository::new();
    let user = create_user(&repo);
    create_enrollment(&repo, &user);

    let result = repo.insert_enrollment(eventpass::models::NewEnrollment {
        user_id: user.id,
        name: "Second".to_string(),
        cpf: "98765432100".to_string(),
        birthday: chrono::NaiveDate::from_ymd_opt(2000, 1, 1).unwrap(),
        phone: "(11) 90000-0000".to_string(),
        address: None,
    });
    assert!(matches!(result, Err(RepositoryError::Conflict { .. })));
}

#[test]
fn test_seeding_rejects_dangling_references() {
    let repo = LocalRepository::new();

    let ticket = repo.insert_ticket(NewTicket {
        ticket_type_id: TicketTypeId(1),
        enrollment_id: EnrollmentId(1),
        status: TicketStatus::Paid,
    });
    assert!(ticket.is_err());

    assert!(repo.insert_room(HotelId(1), "101", 2).is_err());
}

#[tokio::test]
async fn test_sessions_lookup_by_token() {
    let repo = LocalRepository::new();
    let user = create_user(&repo);

    let session = repo.create_session(user.id, "token-a").await.unwrap();
    let found = repo.find_session_by_token("token-a").await.unwrap().unwrap();
    assert_eq!(found.id, session.id);
    assert!(repo.find_session_by_token("token-b").await.unwrap().is_none());

    let duplicate = repo.create_session(user.id, "token-a").await;
    assert!(matches!(duplicate, Err(RepositoryError::Conflict { .. })));

    let orphan = repo.create_session(UserId(9999), "token-c").await;
    assert!(matches!(orphan, Err(RepositoryError::Conflict { .. })));
}

#[tokio::test]
async fn test_user_password_is_not_serialized() {
    let repo = LocalRepository::new();
    let user = create_user(&repo);

    let found = repo.find_user(user.id).await.unwrap().unwrap();
    let json = serde_json::to_value(&found).unwrap();
    assert!(json.get("password").is_none());
    assert_eq!(json["email"], found.email.as_str());
}
