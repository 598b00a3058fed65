//! # EventPass Backend
//!
//! REST backend for an event-registration platform: attendees with an
//! enrollment can reserve tickets, and paid in-person tickets that bundle
//! lodging unlock the partner hotel catalog.
//!
//! ## Architecture
//!
//! The crate is organized into several logical modules:
//!
//! - [`models`]: Domain records (users, enrollments, tickets, hotels)
//! - [`db`]: Repository traits, storage backends and their factory
//! - [`services`]: Business rules (hotel eligibility, ticket reservation, sessions)
//! - [`http`]: Axum-based HTTP server, auth middleware and request handlers
//! - [`config`]: Server settings read from the environment

// Allow large error types - RepositoryError contains rich context for debugging
#![allow(clippy::result_large_err)]

pub mod config;
pub mod db;
pub mod models;
pub mod services;

#[cfg(feature = "http-server")]
pub mod http;
