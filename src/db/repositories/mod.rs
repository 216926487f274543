//! Repository implementations.
//!
//! - [`local`]: in-memory backend for unit testing and local development
//! - [`postgres`]: Diesel + Postgres backend with schema-per-tenant isolation

pub mod local;

#[cfg(feature = "postgres-repo")]
pub mod postgres;

pub use local::LocalRepository;

#[cfg(feature = "postgres-repo")]
pub use postgres::PostgresRepository;
