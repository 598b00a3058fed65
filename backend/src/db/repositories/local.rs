//! In-memory repository for tests and local development.
//!
//! All tables live behind one `RwLock`, so every trait method observes a
//! consistent snapshot and `create_ticket` is atomic with respect to other
//! writers. Seeding helpers stand in for the subsystems that own users,
//! enrollments and the hotel/ticket catalogs.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use tracing::debug;
use parking_lot::RwLock;

use crate::db::repository::{
    EnrollmentRepository, ErrorContext, FullRepository, HotelRepository, RepositoryError,
    RepositoryResult, SessionRepository, TicketRepository,
};
use crate::models::{
    Address, AddressId, Enrollment, EnrollmentId, EnrollmentWithAddress, Hotel, HotelCatalog,
    HotelId, HotelWithRooms, NewAddress, NewEnrollment, NewTicket, NewTicketType, Room, RoomId,
    Session, SessionId, Ticket, TicketId, TicketStatus, TicketType, TicketTypeId, TicketWithType,
    User, UserId,
};

/// Auto-increment counters, one per table.
#[derive(Debug, Default)]
struct Sequences {
    users: i32,
    sessions: i32,
    enrollments: i32,
    addresses: i32,
    ticket_types: i32,
    tickets: i32,
    hotels: i32,
    rooms: i32,
}

fn next(seq: &mut i32) -> i32 {
    *seq += 1;
    *seq
}

#[derive(Debug, Default)]
struct Tables {
    seq: Sequences,
    users: BTreeMap<UserId, User>,
    sessions: BTreeMap<SessionId, Session>,
    enrollments: BTreeMap<EnrollmentId, Enrollment>,
    addresses: BTreeMap<AddressId, Address>,
    ticket_types: BTreeMap<TicketTypeId, TicketType>,
    tickets: BTreeMap<TicketId, Ticket>,
    hotels: BTreeMap<HotelId, Hotel>,
    rooms: BTreeMap<RoomId, Room>,
}

impl Tables {
    fn enrollment_of(&self, user_id: UserId) -> Option<&Enrollment> {
        self.enrollments.values().find(|e| e.user_id == user_id)
    }

    /// Lowest-id ticket of `enrollment_id` joined with its type.
    fn first_ticket_of(&self, enrollment_id: EnrollmentId) -> RepositoryResult<Option<TicketWithType>> {
        let Some(ticket) = self
            .tickets
            .values()
            .find(|t| t.enrollment_id == enrollment_id)
        else {
            return Ok(None);
        };
        let ticket_type = self.ticket_types.get(&ticket.ticket_type_id).ok_or_else(|| {
            RepositoryError::internal_with_context(
                "ticket references a missing ticket type",
                ErrorContext::new("join_ticket_type")
                    .with_entity("ticket")
                    .with_entity_id(ticket.id),
            )
        })?;
        Ok(Some(TicketWithType {
            ticket: ticket.clone(),
            ticket_type: ticket_type.clone(),
        }))
    }
}

/// In-memory implementation of every repository trait.
#[derive(Debug, Default)]
pub struct LocalRepository {
    tables: RwLock<Tables>,
}

impl LocalRepository {
    pub fn new() -> Self {
        Self::default()
    }

    // ==================== Seeding ====================

    pub fn insert_user(&self, email: impl Into<String>, password_hash: impl Into<String>) -> User {
        let mut tables = self.tables.write();
        let now = Utc::now();
        let user = User {
            id: UserId(next(&mut tables.seq.users)),
            email: email.into(),
            password: password_hash.into(),
            created_at: now,
            updated_at: now,
        };
        tables.users.insert(user.id, user.clone());
        user
    }

    /// Register an enrollment (and its address) for an existing user.
    ///
    /// # Errors
    /// `Conflict` if the user is unknown or already enrolled.
    pub fn insert_enrollment(&self, input: NewEnrollment) -> RepositoryResult<EnrollmentWithAddress> {
        let mut tables = self.tables.write();
        let ctx = || {
            ErrorContext::new("insert_enrollment")
                .with_entity("user")
                .with_entity_id(input.user_id)
        };
        if !tables.users.contains_key(&input.user_id) {
            return Err(RepositoryError::conflict_with_context("user does not exist", ctx()));
        }
        if tables.enrollment_of(input.user_id).is_some() {
            return Err(RepositoryError::conflict_with_context("user is already enrolled", ctx()));
        }

        let now = Utc::now();
        let enrollment = Enrollment {
            id: EnrollmentId(next(&mut tables.seq.enrollments)),
            name: input.name,
            cpf: input.cpf,
            birthday: input.birthday,
            phone: input.phone,
            user_id: input.user_id,
            created_at: now,
            updated_at: now,
        };
        tables.enrollments.insert(enrollment.id, enrollment.clone());

        let address = input.address.map(|a| Address {
            id: AddressId(next(&mut tables.seq.addresses)),
            cep: a.cep,
            street: a.street,
            city: a.city,
            state: a.state,
            number: a.number,
            neighborhood: a.neighborhood,
            address_detail: a.address_detail,
            enrollment_id: enrollment.id,
            created_at: now,
            updated_at: now,
        });
        if let Some(ref a) = address {
            tables.addresses.insert(a.id, a.clone());
        }

        Ok(EnrollmentWithAddress {
            enrollment,
            address,
        })
    }

    pub fn insert_ticket_type(&self, input: NewTicketType) -> TicketType {
        let mut tables = self.tables.write();
        let now = Utc::now();
        let ticket_type = TicketType {
            id: TicketTypeId(next(&mut tables.seq.ticket_types)),
            name: input.name,
            price: input.price,
            is_remote: input.is_remote,
            includes_hotel: input.includes_hotel,
            created_at: now,
            updated_at: now,
        };
        tables.ticket_types.insert(ticket_type.id, ticket_type.clone());
        ticket_type
    }

    /// Insert a ticket in any status, bypassing the purchase flow.
    ///
    /// # Errors
    /// `Conflict` if the enrollment or ticket type does not exist.
    pub fn insert_ticket(&self, input: NewTicket) -> RepositoryResult<Ticket> {
        let mut tables = self.tables.write();
        if !tables.enrollments.contains_key(&input.enrollment_id) {
            return Err(RepositoryError::conflict_with_context(
                "enrollment does not exist",
                ErrorContext::new("insert_ticket")
                    .with_entity("enrollment")
                    .with_entity_id(input.enrollment_id),
            ));
        }
        if !tables.ticket_types.contains_key(&input.ticket_type_id) {
            return Err(RepositoryError::conflict_with_context(
                "ticket type does not exist",
                ErrorContext::new("insert_ticket")
                    .with_entity("ticket_type")
                    .with_entity_id(input.ticket_type_id),
            ));
        }
        Ok(Self::write_ticket(&mut *tables, input))
    }

    pub fn insert_hotel(&self, name: impl Into<String>, image: impl Into<String>) -> Hotel {
        let mut tables = self.tables.write();
        let now = Utc::now();
        let hotel = Hotel {
            id: HotelId(next(&mut tables.seq.hotels)),
            name: name.into(),
            image: image.into(),
            created_at: now,
            updated_at: now,
        };
        tables.hotels.insert(hotel.id, hotel.clone());
        hotel
    }

    /// # Errors
    /// `Conflict` if the hotel does not exist.
    pub fn insert_room(
        &self,
        hotel_id: HotelId,
        name: impl Into<String>,
        capacity: i32,
    ) -> RepositoryResult<Room> {
        let mut tables = self.tables.write();
        if !tables.hotels.contains_key(&hotel_id) {
            return Err(RepositoryError::conflict_with_context(
                "hotel does not exist",
                ErrorContext::new("insert_room")
                    .with_entity("hotel")
                    .with_entity_id(hotel_id),
            ));
        }
        let now = Utc::now();
        let room = Room {
            id: RoomId(next(&mut tables.seq.rooms)),
            name: name.into(),
            capacity,
            hotel_id,
            created_at: now,
            updated_at: now,
        };
        tables.rooms.insert(room.id, room.clone());
        Ok(room)
    }

    /// Populate a small catalog and one fully paid, hotel-eligible attendee.
    ///
    /// Returns the attendee's user id.
    pub fn seed_demo_data(&self) -> RepositoryResult<UserId> {
        let user = self.insert_user("attendee@example.com", "");
        let enrollment = self.insert_enrollment(NewEnrollment {
            user_id: user.id,
            name: "Demo Attendee".to_string(),
            cpf: "00000000000".to_string(),
            birthday: NaiveDate::from_ymd_opt(1990, 1, 1)
                .ok_or_else(|| RepositoryError::internal("invalid demo birthday"))?,
            phone: "(21) 99999-9999".to_string(),
            address: Some(NewAddress {
                cep: "20000-000".to_string(),
                street: "Rua das Flores".to_string(),
                city: "Rio de Janeiro".to_string(),
                state: "RJ".to_string(),
                number: "100".to_string(),
                neighborhood: "Centro".to_string(),
                address_detail: None,
            }),
        })?;

        self.insert_ticket_type(NewTicketType {
            name: "Online".to_string(),
            price: 10_000,
            is_remote: true,
            includes_hotel: false,
        });
        self.insert_ticket_type(NewTicketType {
            name: "Presencial".to_string(),
            price: 25_000,
            is_remote: false,
            includes_hotel: false,
        });
        let with_hotel = self.insert_ticket_type(NewTicketType {
            name: "Presencial + Hotel".to_string(),
            price: 60_000,
            is_remote: false,
            includes_hotel: true,
        });

        self.insert_ticket(NewTicket {
            ticket_type_id: with_hotel.id,
            enrollment_id: enrollment.enrollment.id,
            status: TicketStatus::Paid,
        })?;

        for (name, image) in [
            ("Driven Resort", "https://images.example.com/resort.jpg"),
            ("Driven Palace", "https://images.example.com/palace.jpg"),
        ] {
            let hotel = self.insert_hotel(name, image);
            for (number, capacity) in [("101", 1), ("102", 2), ("103", 3)] {
                self.insert_room(hotel.id, number, capacity)?;
            }
        }

        Ok(user.id)
    }

    fn write_ticket(tables: &mut Tables, input: NewTicket) -> Ticket {
        let now = Utc::now();
        let ticket = Ticket {
            id: TicketId(next(&mut tables.seq.tickets)),
            ticket_type_id: input.ticket_type_id,
            enrollment_id: input.enrollment_id,
            status: input.status,
            created_at: now,
            updated_at: now,
        };
        tables.tickets.insert(ticket.id, ticket.clone());
        ticket
    }
}

#[async_trait]
impl EnrollmentRepository for LocalRepository {
    async fn find_enrollment_by_user(
        &self,
        user_id: UserId,
    ) -> RepositoryResult<Option<EnrollmentWithAddress>> {
        let tables = self.tables.read();
        Ok(tables.enrollment_of(user_id).map(|enrollment| {
            let address = tables
                .addresses
                .values()
                .find(|a| a.enrollment_id == enrollment.id)
                .cloned();
            EnrollmentWithAddress {
                enrollment: enrollment.clone(),
                address,
            }
        }))
    }
}

#[async_trait]
impl HotelRepository for LocalRepository {
    async fn find_all_hotels(&self) -> RepositoryResult<HotelCatalog> {
        let tables = self.tables.read();
        let hotels: Vec<Hotel> = tables.hotels.values().cloned().collect();
        let count = hotels.len() as i64;
        Ok(HotelCatalog { hotels, count })
    }

    async fn find_hotel_with_rooms(
        &self,
        hotel_id: HotelId,
    ) -> RepositoryResult<Option<HotelWithRooms>> {
        let tables = self.tables.read();
        Ok(tables.hotels.get(&hotel_id).map(|hotel| HotelWithRooms {
            hotel: hotel.clone(),
            rooms: tables
                .rooms
                .values()
                .filter(|r| r.hotel_id == hotel_id)
                .cloned()
                .collect(),
        }))
    }
}

#[async_trait]
impl SessionRepository for LocalRepository {
    async fn find_user(&self, user_id: UserId) -> RepositoryResult<Option<User>> {
        Ok(self.tables.read().users.get(&user_id).cloned())
    }

    async fn find_session_by_token(&self, token: &str) -> RepositoryResult<Option<Session>> {
        Ok(self
            .tables
            .read()
            .sessions
            .values()
            .find(|s| s.token == token)
            .cloned())
    }

    async fn create_session(&self, user_id: UserId, token: &str) -> RepositoryResult<Session> {
        let mut tables = self.tables.write();
        if !tables.users.contains_key(&user_id) {
            return Err(RepositoryError::conflict_with_context(
                "user does not exist",
                ErrorContext::new("create_session")
                    .with_entity("user")
                    .with_entity_id(user_id),
            ));
        }
        if tables.sessions.values().any(|s| s.token == token) {
            return Err(RepositoryError::conflict_with_context(
                "session token already exists",
                ErrorContext::new("create_session").with_entity("session"),
            ));
        }
        let now = Utc::now();
        let session = Session {
            id: SessionId(next(&mut tables.seq.sessions)),
            user_id,
            token: token.to_string(),
            created_at: now,
            updated_at: now,
        };
        tables.sessions.insert(session.id, session.clone());
        Ok(session)
    }
}

#[async_trait]
impl TicketRepository for LocalRepository {
    async fn find_all_ticket_types(&self) -> RepositoryResult<Vec<TicketType>> {
        Ok(self.tables.read().ticket_types.values().cloned().collect())
    }

    async fn find_first_ticket_by_user(
        &self,
        user_id: UserId,
    ) -> RepositoryResult<Option<TicketWithType>> {
        let tables = self.tables.read();
        match tables.enrollment_of(user_id) {
            Some(enrollment) => tables.first_ticket_of(enrollment.id),
            None => Ok(None),
        }
    }

    async fn find_ticket_by_enrollment(
        &self,
        enrollment_id: EnrollmentId,
    ) -> RepositoryResult<Option<TicketWithType>> {
        self.tables.read().first_ticket_of(enrollment_id)
    }

    async fn create_ticket(&self, ticket: NewTicket) -> RepositoryResult<Option<TicketWithType>> {
        let mut tables = self.tables.write();
        let Some(ticket_type) = tables.ticket_types.get(&ticket.ticket_type_id).cloned() else {
            debug!(ticket_type_id = %ticket.ticket_type_id, "create_ticket: unknown ticket type");
            return Ok(None);
        };
        if !tables.enrollments.contains_key(&ticket.enrollment_id) {
            return Err(RepositoryError::conflict_with_context(
                "enrollment does not exist",
                ErrorContext::new("create_ticket")
                    .with_entity("enrollment")
                    .with_entity_id(ticket.enrollment_id),
            ));
        }
        let ticket = Self::write_ticket(&mut *tables, ticket);
        Ok(Some(TicketWithType {
            ticket,
            ticket_type,
        }))
    }
}

#[async_trait]
impl FullRepository for LocalRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        Ok(true)
    }
}
