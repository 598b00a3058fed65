//! Postgres repository implementation using Diesel.
//!
//! ## Features
//!
//! - Connection pooling with r2d2
//! - Automatic retry for transient failures
//! - Automatic migration execution
//! - Ticket creation and its type lookup in one transaction
//!
//! ## Configuration
//!
//! Environment variables:
//! - `DATABASE_URL` or `PG_DATABASE_URL`: Connection string (required)
//! - `PG_POOL_MAX`: Maximum pool size (default: 10)
//! - `PG_POOL_MIN`: Minimum pool size (default: 1)
//! - `PG_CONN_TIMEOUT_SEC`: Connection timeout in seconds (default: 30)
//! - `PG_IDLE_TIMEOUT_SEC`: Idle connection timeout in seconds (default: 600)
//! - `PG_MAX_RETRIES`: Maximum retry attempts for transient failures (default: 3)
//! - `PG_RETRY_DELAY_MS`: Initial retry delay in milliseconds (default: 100)

use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sql_query;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use std::time::Duration;
use tokio::task;

use crate::db::repository::{
    EnrollmentRepository, ErrorContext, FullRepository, HotelRepository, RepositoryError,
    RepositoryResult, SessionRepository, TicketRepository,
};
use crate::models::{
    EnrollmentId, EnrollmentWithAddress, Hotel, HotelCatalog, HotelId, HotelWithRooms, NewTicket,
    Room, Session, Ticket, TicketType, TicketWithType, User, UserId,
};

mod models;
mod schema;

use models::*;
use schema::*;

type PgPool = Pool<ConnectionManager<PgConnection>>;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("src/db/repositories/postgres/migrations");

/// Configuration for connecting to Postgres.
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    /// Database connection URL
    pub database_url: String,
    /// Maximum number of connections in the pool
    pub max_pool_size: u32,
    /// Minimum number of connections in the pool
    pub min_pool_size: u32,
    /// Connection timeout in seconds
    pub connection_timeout_sec: u64,
    /// Idle connection timeout in seconds
    pub idle_timeout_sec: u64,
    /// Maximum number of retry attempts for transient failures
    pub max_retries: u32,
    /// Initial retry delay in milliseconds (doubles with each retry)
    pub retry_delay_ms: u64,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            max_pool_size: 10,
            min_pool_size: 1,
            connection_timeout_sec: 30,
            idle_timeout_sec: 600,
            max_retries: 3,
            retry_delay_ms: 100,
        }
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

impl PostgresConfig {
    /// Create configuration from environment variables.
    ///
    /// Unparseable optional values fall back to their defaults.
    ///
    /// # Errors
    /// Returns an error if neither `DATABASE_URL` nor `PG_DATABASE_URL` is set.
    pub fn from_env() -> Result<Self, String> {
        let database_url = std::env::var("DATABASE_URL")
            .or_else(|_| std::env::var("PG_DATABASE_URL"))
            .map_err(|_| "DATABASE_URL or PG_DATABASE_URL must be set".to_string())?;

        let defaults = Self::default();
        Ok(Self {
            database_url,
            max_pool_size: env_or("PG_POOL_MAX", defaults.max_pool_size),
            min_pool_size: env_or("PG_POOL_MIN", defaults.min_pool_size),
            connection_timeout_sec: env_or("PG_CONN_TIMEOUT_SEC", defaults.connection_timeout_sec),
            idle_timeout_sec: env_or("PG_IDLE_TIMEOUT_SEC", defaults.idle_timeout_sec),
            max_retries: env_or("PG_MAX_RETRIES", defaults.max_retries),
            retry_delay_ms: env_or("PG_RETRY_DELAY_MS", defaults.retry_delay_ms),
        })
    }
}

/// Diesel-backed repository for Postgres.
#[derive(Clone, Debug)]
pub struct PostgresRepository {
    pool: PgPool,
    config: PostgresConfig,
}

impl PostgresRepository {
    /// Create a new repository and run pending migrations.
    ///
    /// Blocks while the pool connects; call from `spawn_blocking` inside a runtime.
    pub fn new(config: PostgresConfig) -> RepositoryResult<Self> {
        let manager = ConnectionManager::<PgConnection>::new(&config.database_url);

        let pool = Pool::builder()
            .max_size(config.max_pool_size)
            .min_idle(Some(config.min_pool_size))
            .connection_timeout(Duration::from_secs(config.connection_timeout_sec))
            .idle_timeout(Some(Duration::from_secs(config.idle_timeout_sec)))
            .test_on_check_out(true)
            .build(manager)
            .map_err(|e| {
                RepositoryError::connection_with_context(
                    e.to_string(),
                    ErrorContext::new("create_pool")
                        .with_details(format!("max_size={}", config.max_pool_size)),
                )
            })?;

        {
            let mut conn = pool.get().map_err(|e| {
                RepositoryError::connection_with_context(
                    e.to_string(),
                    ErrorContext::new("get_connection_for_migrations"),
                )
            })?;
            Self::run_migrations(&mut conn)?;
        }

        Ok(Self {
            pool,
            config,
        })
    }

    fn run_migrations(conn: &mut PgConnection) -> RepositoryResult<()> {
        conn.run_pending_migrations(MIGRATIONS).map_err(|e| {
            RepositoryError::internal_with_context(
                format!("Migration failed: {}", e),
                ErrorContext::new("run_migrations"),
            )
        })?;

        Ok(())
    }

    /// Execute a database operation on a blocking thread, retrying transient failures
    /// up to `max_retries` times with exponential backoff.
    async fn with_conn<T, F>(&self, f: F) -> RepositoryResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut PgConnection) -> RepositoryResult<T> + Send + 'static + Clone,
    {
        let pool = self.pool.clone();
        let max_retries = self.config.max_retries;
        let retry_delay_ms = self.config.retry_delay_ms;

        task::spawn_blocking(move || {
            let mut last_error = None;
            let mut retry_delay = Duration::from_millis(retry_delay_ms);

            for attempt in 0..=max_retries {
                if attempt > 0 {
                    std::thread::sleep(retry_delay);
                    retry_delay *= 2;
                }

                let mut conn = match pool.get() {
                    Ok(c) => c,
                    Err(e) => {
                        let err = RepositoryError::connection_with_context(
                            e.to_string(),
                            ErrorContext::new("get_connection")
                                .with_details(format!("attempt={}", attempt + 1)),
                        );
                        if attempt < max_retries {
                            last_error = Some(err);
                            continue;
                        }
                        return Err(err);
                    }
                };

                match f.clone()(&mut conn) {
                    Ok(result) => return Ok(result),
                    Err(e) if e.is_retryable() && attempt < max_retries => {
                        last_error = Some(e);
                        continue;
                    }
                    Err(e) => {
                        return Err(e);
                    }
                }
            }

            Err(last_error.unwrap_or_else(|| {
                RepositoryError::internal("Max retries exceeded with no error captured")
            }))
        })
        .await
        .map_err(|e| {
            RepositoryError::internal_with_context(
                format!("Task join error: {}", e),
                ErrorContext::new("spawn_blocking"),
            )
        })?
    }
}

fn map_diesel_error(err: diesel::result::Error) -> RepositoryError {
    RepositoryError::from(err)
}

fn join_ticket(row: (TicketRow, TicketTypeRow)) -> RepositoryResult<TicketWithType> {
    let (ticket, ticket_type) = row;
    Ok(TicketWithType {
        ticket: Ticket::try_from(ticket)?,
        ticket_type: TicketType::from(ticket_type),
    })
}

#[async_trait]
impl EnrollmentRepository for PostgresRepository {
    async fn find_enrollment_by_user(
        &self,
        user_id: UserId,
    ) -> RepositoryResult<Option<EnrollmentWithAddress>> {
        self.with_conn(move |conn| {
            let Some(enrollment) = enrollments::table
                .filter(enrollments::user_id.eq(user_id.value()))
                .select(EnrollmentRow::as_select())
                .first::<EnrollmentRow>(conn)
                .optional()
                .map_err(map_diesel_error)?
            else {
                return Ok(None);
            };

            let address = addresses::table
                .filter(addresses::enrollment_id.eq(enrollment.id))
                .order(addresses::id.asc())
                .select(AddressRow::as_select())
                .first::<AddressRow>(conn)
                .optional()
                .map_err(map_diesel_error)?;

            Ok(Some(EnrollmentWithAddress {
                enrollment: enrollment.into(),
                address: address.map(Into::into),
            }))
        })
        .await
    }
}

#[async_trait]
impl HotelRepository for PostgresRepository {
    async fn find_all_hotels(&self) -> RepositoryResult<HotelCatalog> {
        self.with_conn(|conn| {
            let rows = hotels::table
                .order(hotels::id.asc())
                .select(HotelRow::as_select())
                .load::<HotelRow>(conn)
                .map_err(map_diesel_error)?;
            let count = hotels::table
                .count()
                .get_result::<i64>(conn)
                .map_err(map_diesel_error)?;

            Ok(HotelCatalog {
                hotels: rows.into_iter().map(Hotel::from).collect(),
                count,
            })
        })
        .await
    }

    async fn find_hotel_with_rooms(
        &self,
        hotel_id: HotelId,
    ) -> RepositoryResult<Option<HotelWithRooms>> {
        self.with_conn(move |conn| {
            let Some(hotel) = hotels::table
                .find(hotel_id.value())
                .select(HotelRow::as_select())
                .first::<HotelRow>(conn)
                .optional()
                .map_err(map_diesel_error)?
            else {
                return Ok(None);
            };

            let rooms = rooms::table
                .filter(rooms::hotel_id.eq(hotel.id))
                .order(rooms::id.asc())
                .select(RoomRow::as_select())
                .load::<RoomRow>(conn)
                .map_err(map_diesel_error)?;

            Ok(Some(HotelWithRooms {
                hotel: hotel.into(),
                rooms: rooms.into_iter().map(Room::from).collect(),
            }))
        })
        .await
    }
}

#[async_trait]
impl SessionRepository for PostgresRepository {
    async fn find_user(&self, user_id: UserId) -> RepositoryResult<Option<User>> {
        self.with_conn(move |conn| {
            users::table
                .find(user_id.value())
                .select(UserRow::as_select())
                .first::<UserRow>(conn)
                .optional()
                .map(|row| row.map(User::from))
                .map_err(map_diesel_error)
        })
        .await
    }

    async fn find_session_by_token(&self, token: &str) -> RepositoryResult<Option<Session>> {
        let token = token.to_string();
        self.with_conn(move |conn| {
            sessions::table
                .filter(sessions::token.eq(&token))
                .select(SessionRow::as_select())
                .first::<SessionRow>(conn)
                .optional()
                .map(|row| row.map(Session::from))
                .map_err(map_diesel_error)
        })
        .await
    }

    async fn create_session(&self, user_id: UserId, token: &str) -> RepositoryResult<Session> {
        let row = NewSessionRow {
            user_id: user_id.value(),
            token: token.to_string(),
        };
        self.with_conn(move |conn| {
            diesel::insert_into(sessions::table)
                .values(&row)
                .returning(SessionRow::as_returning())
                .get_result::<SessionRow>(conn)
                .map(Session::from)
                .map_err(|e| map_diesel_error(e).with_operation("create_session"))
        })
        .await
    }
}

#[async_trait]
impl TicketRepository for PostgresRepository {
    async fn find_all_ticket_types(&self) -> RepositoryResult<Vec<TicketType>> {
        self.with_conn(|conn| {
            ticket_types::table
                .order(ticket_types::id.asc())
                .select(TicketTypeRow::as_select())
                .load::<TicketTypeRow>(conn)
                .map(|rows| rows.into_iter().map(TicketType::from).collect())
                .map_err(map_diesel_error)
        })
        .await
    }

    async fn find_first_ticket_by_user(
        &self,
        user_id: UserId,
    ) -> RepositoryResult<Option<TicketWithType>> {
        self.with_conn(move |conn| {
            tickets::table
                .inner_join(enrollments::table)
                .inner_join(ticket_types::table)
                .filter(enrollments::user_id.eq(user_id.value()))
                .order(tickets::id.asc())
                .select((TicketRow::as_select(), TicketTypeRow::as_select()))
                .first::<(TicketRow, TicketTypeRow)>(conn)
                .optional()
                .map_err(map_diesel_error)?
                .map(join_ticket)
                .transpose()
        })
        .await
    }

    async fn find_ticket_by_enrollment(
        &self,
        enrollment_id: EnrollmentId,
    ) -> RepositoryResult<Option<TicketWithType>> {
        self.with_conn(move |conn| {
            tickets::table
                .inner_join(ticket_types::table)
                .filter(tickets::enrollment_id.eq(enrollment_id.value()))
                .order(tickets::id.asc())
                .select((TicketRow::as_select(), TicketTypeRow::as_select()))
                .first::<(TicketRow, TicketTypeRow)>(conn)
                .optional()
                .map_err(map_diesel_error)?
                .map(join_ticket)
                .transpose()
        })
        .await
    }

    async fn create_ticket(&self, ticket: NewTicket) -> RepositoryResult<Option<TicketWithType>> {
        self.with_conn(move |conn| {
            conn.transaction::<_, RepositoryError, _>(|tx| {
                let Some(ticket_type) = ticket_types::table
                    .find(ticket.ticket_type_id.value())
                    .select(TicketTypeRow::as_select())
                    .first::<TicketTypeRow>(tx)
                    .optional()?
                else {
                    return Ok(None);
                };

                let inserted = diesel::insert_into(tickets::table)
                    .values(&NewTicketRow {
                        ticket_type_id: ticket.ticket_type_id.value(),
                        enrollment_id: ticket.enrollment_id.value(),
                        status: ticket.status.as_str().to_string(),
                    })
                    .returning(TicketRow::as_returning())
                    .get_result::<TicketRow>(tx)?;

                join_ticket((inserted, ticket_type)).map(Some)
            })
            .map_err(|e| e.with_operation("create_ticket"))
        })
        .await
    }
}

#[async_trait]
impl FullRepository for PostgresRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        self.with_conn(|conn| {
            sql_query("SELECT 1")
                .execute(conn)
                .map(|_| true)
                .map_err(map_diesel_error)
        })
        .await
    }
}
