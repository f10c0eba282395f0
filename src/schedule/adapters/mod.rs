//! Adapter implementations for the schedule repository port.
//!
//! - [`memory::InMemoryScheduleRepository`]: thread-safe in-memory storage
//!   for tests and embedding
//! - [`postgres::PostgresScheduleRepository`]: `PostgreSQL` persistence using
//!   Diesel ORM

pub mod memory;
pub mod postgres;
