#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use chrono::NaiveDate;
use eventpass::db::LocalRepository;
use eventpass::models::{
    EnrollmentId, EnrollmentWithAddress, Hotel, NewAddress, NewEnrollment, NewTicket,
    NewTicketType, Ticket, TicketStatus, TicketType, TicketTypeId, User,
};

static ENV_LOCK: Mutex<()> = Mutex::new(());
static EMAIL_SEQ: AtomicUsize = AtomicUsize::new(0);

/// Runs `f` with environment variables temporarily modified.
///
/// This is panic-safe (restores variables on unwind) and also serializes access to
/// process-global env vars to avoid flaky tests when Rust runs tests in parallel.
///
/// `changes` is a list of `(key, value)` pairs:
/// - `Some(v)` sets the variable to `v`
/// - `None` removes the variable
pub fn with_scoped_env<F, R>(changes: &[(&str, Option<&str>)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _lock = ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    let _guard = ScopedEnv::new(changes);
    f()
}

struct ScopedEnv {
    snapshot: Vec<(String, Option<String>)>,
}

impl ScopedEnv {
    fn new(changes: &[(&str, Option<&str>)]) -> Self {
        let keys: HashSet<&str> = changes.iter().map(|(k, _)| *k).collect();
        let snapshot = keys
            .into_iter()
            .map(|k| (k.to_string(), std::env::var(k).ok()))
            .collect::<Vec<_>>();

        for (k, v) in changes {
            match v {
                Some(val) => std::env::set_var(k, val),
                None => std::env::remove_var(k),
            }
        }

        Self { snapshot }
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        for (k, v) in self.snapshot.drain(..) {
            match v {
                Some(val) => std::env::set_var(&k, val),
                None => std::env::remove_var(&k),
            }
        }
    }
}

// =========================================================
// Fixtures
// =========================================================

pub fn create_user(repo: &LocalRepository) -> User {
    let n = EMAIL_SEQ.fetch_add(1, Ordering::SeqCst);
    repo.insert_user(format!("attendee{}@example.com", n), "hashed-password")
}

pub fn create_enrollment(repo: &LocalRepository, user: &User) -> EnrollmentWithAddress {
    repo.insert_enrollment(NewEnrollment {
        user_id: user.id,
        name: "Maria Silva".to_string(),
        cpf: "12345678909".to_string(),
        birthday: NaiveDate::from_ymd_opt(1995, 6, 15).unwrap(),
        phone: "(21) 98888-7777".to_string(),
        address: Some(NewAddress {
            cep: "22000-000".to_string(),
            street: "Avenida Atlantica".to_string(),
            city: "Rio de Janeiro".to_string(),
            state: "RJ".to_string(),
            number: "42".to_string(),
            neighborhood: "Copacabana".to_string(),
            address_detail: Some("apto 301".to_string()),
        }),
    })
    .unwrap()
}

pub fn create_ticket_type(repo: &LocalRepository, is_remote: bool, includes_hotel: bool) -> TicketType {
    repo.insert_ticket_type(NewTicketType {
        name: format!("remote={} hotel={}", is_remote, includes_hotel),
        price: 35_000,
        is_remote,
        includes_hotel,
    })
}

pub fn create_ticket(
    repo: &LocalRepository,
    enrollment_id: EnrollmentId,
    ticket_type_id: TicketTypeId,
    status: TicketStatus,
) -> Ticket {
    repo.insert_ticket(NewTicket {
        ticket_type_id,
        enrollment_id,
        status,
    })
    .unwrap()
}

/// Hotel with two rooms.
pub fn create_hotel(repo: &LocalRepository) -> Hotel {
    let hotel = repo.insert_hotel("Hotel Copacabana", "https://images.example.com/copa.jpg");
    repo.insert_room(hotel.id, "101", 2).unwrap();
    repo.insert_room(hotel.id, "102", 3).unwrap();
    hotel
}

/// Enrolled user holding one ticket with the given status and flags.
pub fn create_ticket_holder(
    repo: &LocalRepository,
    status: TicketStatus,
    is_remote: bool,
    includes_hotel: bool,
) -> (User, Ticket) {
    let user = create_user(repo);
    let enrollment = create_enrollment(repo, &user);
    let ticket_type = create_ticket_type(repo, is_remote, includes_hotel);
    let ticket = create_ticket(repo, enrollment.enrollment.id, ticket_type.id, status);
    (user, ticket)
}

// =========================================================
// HTTP harness
// =========================================================

#[cfg(feature = "http-server")]
pub use harness::*;

#[cfg(feature = "http-server")]
mod harness {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use axum::Router;
    use http_body_util::BodyExt;
    use serde_json::Value;
    use tower::ServiceExt;

    use eventpass::db::{FullRepository, LocalRepository};
    use eventpass::http::{create_router, AppState};
    use eventpass::models::User;
    use eventpass::services::{self, AuthService};

    pub const TEST_SECRET: &str = "integration-test-secret";

    pub struct TestApp {
        pub repo: Arc<LocalRepository>,
        pub state: AppState,
    }

    impl TestApp {
        pub fn new() -> Self {
            let repo = Arc::new(LocalRepository::new());
            let state = AppState::new(
                repo.clone() as Arc<dyn FullRepository>,
                AuthService::new(TEST_SECRET),
            );
            Self { repo, state }
        }

        pub fn router(&self) -> Router {
            create_router(self.state.clone())
        }

        /// Persist a session for `user` and return its bearer token.
        pub async fn sign_in(&self, user: &User) -> String {
            services::issue_session(self.repo.as_ref(), &self.state.auth, user.id)
                .await
                .unwrap()
                .token
        }

        pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
            let mut builder = Request::builder().method("GET").uri(uri);
            if let Some(token) = token {
                builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
            }
            self.send(builder.body(Body::empty()).unwrap()).await
        }

        pub async fn post_json(&self, uri: &str, token: Option<&str>, body: &str) -> (StatusCode, Value) {
            let mut builder = Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json");
            if let Some(token) = token {
                builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
            }
            self.send(builder.body(Body::from(body.to_string())).unwrap())
                .await
        }

        pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
            let response = self.router().oneshot(request).await.unwrap();
            let status = response.status();
            let bytes = response.into_body().collect().await.unwrap().to_bytes();
            let body = if bytes.is_empty() {
                Value::Null
            } else {
                serde_json::from_slice(&bytes).unwrap_or(Value::Null)
            };
            (status, body)
        }
    }
}
