//! Domain records and time primitives for the scheduling core.

pub mod records;
pub mod time;

pub use records::{
    BlockScope, BlockedSlot, Booking, BookingId, BookingStatus, BookingWindow, Master, MasterId,
    Post, PostId, Slot, Tenant, TenantId,
};
pub use time::TimeRange;
