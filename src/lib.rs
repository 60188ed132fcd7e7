//! # Roombook
//!
//! Room-booking backend: buildings, rooms, and bookings over an abstract
//! data store, with one non-trivial rule — no two bookings for the same
//! building's room may overlap. The overlap test is a closed-interval
//! comparison, so boundary-touching intervals conflict.
//!
//! ## Architecture
//!
//! The crate is organized into several logical modules:
//!
//! - [`models`]: Domain entities, write payloads, and the pure pieces of
//!   the availability rule
//! - [`db`]: Repository traits, the Postgres and in-memory backends,
//!   factory and configuration
//! - [`services`]: The Booking / Building / Room managers and the
//!   availability checker
//! - [`http`]: Axum-based REST API (behind the `http-server` feature)
//!
//! ## Concurrency
//!
//! Each operation performs its own store reads and at most one write. By
//! default the availability check and the booking insert are not atomic
//! with respect to concurrent requests; the `serializable_writes` option
//! routes booking writes through a store-level critical section for
//! deployments that want the stronger guarantee.

pub mod db;
pub mod models;
pub mod services;

#[cfg(feature = "http-server")]
pub mod http;
