//! # Bookbay Scheduling Core
//!
//! Capacity-aware appointment scheduling engine for a multi-tenant booking
//! platform. Each tenant (a service business) lives in its own isolated
//! database schema; this crate owns slot generation, availability decisions,
//! and the tenant routing those decisions depend on.
//!
//! ## Features
//!
//! - **Slot Generation**: enumerate candidate booking windows on a
//!   configurable time grid, independent of service duration
//! - **Availability**: decide whether a candidate slot is bookable given
//!   concurrent bookings, active service bays ("posts"), and blackout windows
//! - **Tenant Routing**: resolve requests to a tenant and bind all storage
//!   access to that tenant's partition through an explicit session handle
//! - **Provisioning**: create and destroy tenant partitions idempotently
//! - **HTTP API**: RESTful endpoints for availability and tenant lifecycle
//!
//! ## Architecture
//!
//! The crate is organized into several logical modules:
//!
//! - [`models`]: domain records (bookings, posts, blackout windows) and
//!   time-interval primitives
//! - [`db`]: repository pattern and persistence layer (in-memory and
//!   Postgres backends)
//! - [`tenancy`]: tenant resolution, tenant-bound sessions, and partition
//!   lifecycle
//! - [`scheduler`]: slot generator, availability checker, and the scheduling
//!   facade external callers use
//! - [`http`]: axum-based HTTP server and request handlers

// Allow large error types - RepositoryError carries rich context for debugging
#![allow(clippy::result_large_err)]

pub mod db;
pub mod models;

pub mod scheduler;
pub mod tenancy;

#[cfg(feature = "http-server")]
pub mod http;
