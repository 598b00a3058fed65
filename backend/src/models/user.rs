use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::define_id_type;

define_id_type!(i32, UserId);
define_id_type!(i32, SessionId);
define_id_type!(i32, EnrollmentId);
define_id_type!(i32, AddressId);

/// A registered account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub email: String,
    /// Password hash; never leaves the process.
    #[serde(skip_serializing, default)]
    pub password: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A bearer token issued to a user. Tokens not backed by a session are rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: SessionId,
    pub user_id: UserId,
    pub token: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A user's registration for the event. At most one per user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Enrollment {
    pub id: EnrollmentId,
    pub name: String,
    pub cpf: String,
    pub birthday: NaiveDate,
    pub phone: String,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub id: AddressId,
    pub cep: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub number: String,
    pub neighborhood: String,
    pub address_detail: Option<String>,
    pub enrollment_id: EnrollmentId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Enrollment joined with its (optional) postal address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrollmentWithAddress {
    #[serde(flatten)]
    pub enrollment: Enrollment,
    #[serde(rename = "Address")]
    pub address: Option<Address>,
}

/// Input for seeding an enrollment.
#[derive(Debug, Clone)]
pub struct NewEnrollment {
    pub user_id: UserId,
    pub name: String,
    pub cpf: String,
    pub birthday: NaiveDate,
    pub phone: String,
    pub address: Option<NewAddress>,
}

#[derive(Debug, Clone)]
pub struct NewAddress {
    pub cep: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub number: String,
    pub neighborhood: String,
    pub address_detail: Option<String>,
}
