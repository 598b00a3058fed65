//! Domain records shared by the repository, service and HTTP layers.
//!
//! Records serialize with camelCase field names; joined associations use the
//! capitalised relation name (`TicketType`, `Rooms`, `Address`) so the JSON
//! shape matches what web clients of the registration platform expect.

pub mod macros;
pub mod hotel;
pub mod ticket;
pub mod user;

pub use hotel::*;
pub use ticket::*;
pub use user::*;
