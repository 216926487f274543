//! Capacity-aware slot scheduling.
//!
//! Three layers, leaves first: [`slots`] enumerates candidate intervals as a
//! pure function of the business window, [`availability`] decides whether one
//! candidate is bookable inside a tenant's partition, and [`facade`] composes
//! both with tenant routing into the operation external callers use.

pub mod availability;
pub mod facade;
pub mod slots;

pub use availability::{is_available, occupied_capacity};
pub use facade::{AvailableSlots, Scheduler, SchedulingError};
pub use slots::{candidate_slots, SlotGrid};

#[cfg(test)]
mod tests;
