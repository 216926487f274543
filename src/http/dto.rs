//! Data Transfer Objects for the HTTP API.
//!
//! Tenant responses deliberately omit `schema_name`; partition names are an
//! internal routing detail.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{Slot, Tenant};

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Status of the service
    pub status: String,
    /// Version of the API
    pub version: String,
    /// Storage connection status
    pub storage: String,
}

/// Query parameters for the slot listing endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct SlotsQuery {
    /// Service date (YYYY-MM-DD)
    pub date: NaiveDate,
    /// Requested service duration in minutes
    pub duration: u32,
    /// Opening time of the booking window (HH:MM)
    #[serde(default = "default_open")]
    pub open: String,
    /// Closing time of the booking window (HH:MM)
    #[serde(default = "default_close")]
    pub close: String,
    /// Grid step in minutes
    #[serde(default = "default_granularity")]
    pub granularity: u32,
    /// Restrict to one provider
    #[serde(default)]
    pub master_id: Option<i64>,
    /// Explicit tenant id, alternative to the `X-Tenant-ID` header
    #[serde(default)]
    pub tenant: Option<Uuid>,
}

fn default_open() -> String {
    "09:00".to_string()
}

fn default_close() -> String {
    "18:00".to_string()
}

/// Parse a wall-clock parameter, accepting `HH:MM` or `HH:MM:SS`.
pub fn parse_wall_clock(value: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .ok()
}

fn default_granularity() -> u32 {
    30
}

/// One bookable slot in a response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotDto {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl From<Slot> for SlotDto {
    fn from(slot: Slot) -> Self {
        Self {
            start: slot.start,
            end: slot.end,
        }
    }
}

/// Slot listing response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotsResponse {
    /// The date the slots were computed for
    pub date: NaiveDate,
    /// Bookable slots in window order
    pub slots: Vec<SlotDto>,
    /// Candidates omitted because their check could not complete
    pub failed_checks: usize,
}

/// Request body for registering a tenant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTenantRequest {
    /// Unique human-facing short name
    pub slug: String,
}

/// Tenant record as exposed over the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TenantDto {
    pub id: Uuid,
    pub slug: String,
    pub active: bool,
    pub can_book: bool,
}

impl From<Tenant> for TenantDto {
    fn from(tenant: Tenant) -> Self {
        Self {
            id: tenant.id.0,
            slug: tenant.slug,
            active: tenant.active,
            can_book: tenant.can_book,
        }
    }
}

/// Response for partition lifecycle operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LifecycleResponse {
    /// Tenant the operation applied to
    pub tenant_id: Uuid,
    /// Outcome description
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wall_clock_parsing() {
        assert_eq!(
            parse_wall_clock("09:30"),
            NaiveTime::from_hms_opt(9, 30, 0)
        );
        assert_eq!(
            parse_wall_clock("09:30:15"),
            NaiveTime::from_hms_opt(9, 30, 15)
        );
        assert!(parse_wall_clock("9am").is_none());
        assert!(parse_wall_clock("25:00").is_none());
    }

    #[test]
    fn tenant_dto_hides_partition_name() {
        let tenant = Tenant::new("acme");
        let dto = TenantDto::from(tenant.clone());
        let json = serde_json::to_value(&dto).unwrap();
        assert_eq!(json["slug"], "acme");
        assert!(json.get("schema_name").is_none());
        assert!(!json.to_string().contains(&tenant.schema_name));
    }

    #[test]
    fn slot_dto_serializes_wall_clock_times() {
        let dto = SlotDto {
            start: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            end: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
        };
        let json = serde_json::to_value(&dto).unwrap();
        assert_eq!(json["start"], "09:00:00");
        assert_eq!(json["end"], "10:00:00");
    }
}
