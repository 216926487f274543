//! HTTP handlers for the REST API.
//!
//! Each handler corresponds to an API endpoint and delegates to the
//! scheduler facade or the tenancy layer for business logic.

use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    Json,
};
use uuid::Uuid;

use super::dto::{
    parse_wall_clock, CreateTenantRequest, HealthResponse, LifecycleResponse, SlotDto,
    SlotsQuery, SlotsResponse, TenantDto,
};
use super::error::AppError;
use super::state::AppState;
use crate::models::{BookingWindow, MasterId, Tenant, TenantId};
use crate::tenancy::RequestContext;

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

/// Header carrying an explicit tenant id.
pub const TENANT_ID_HEADER: &str = "x-tenant-id";
/// Header carrying a signed tenant token.
pub const TENANT_TOKEN_HEADER: &str = "x-tenant-token";

// =============================================================================
// Health Check
// =============================================================================

/// GET /health
///
/// Health check endpoint to verify the service is running and storage is
/// reachable.
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    let storage = match state.repository.health_check().await {
        Ok(true) => "connected".to_string(),
        Ok(false) => "disconnected".to_string(),
        Err(_) => "error".to_string(),
    };

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: "v1".to_string(),
        storage,
    }))
}

// =============================================================================
// Availability
// =============================================================================

/// Build a tenant resolution context from request headers and query.
///
/// Identification sources, in the resolver's precedence order: the
/// `X-Tenant-ID` header or `tenant` query param (explicit), then the signed
/// `X-Tenant-Token` header. A malformed explicit id is rejected here rather
/// than silently falling through to the token.
fn request_context(headers: &HeaderMap, tenant_param: Option<Uuid>) -> Result<RequestContext, AppError> {
    let mut ctx = RequestContext::new();

    if let Some(value) = headers.get(TENANT_ID_HEADER) {
        let raw = value
            .to_str()
            .map_err(|_| AppError::BadRequest("Invalid X-Tenant-ID header".to_string()))?;
        let id = raw
            .parse::<Uuid>()
            .map_err(|_| AppError::BadRequest("Invalid X-Tenant-ID header".to_string()))?;
        ctx = ctx.with_explicit(TenantId(id));
    } else if let Some(id) = tenant_param {
        ctx = ctx.with_explicit(TenantId(id));
    }

    if let Some(value) = headers.get(TENANT_TOKEN_HEADER) {
        let token = value
            .to_str()
            .map_err(|_| AppError::BadRequest("Invalid X-Tenant-Token header".to_string()))?;
        ctx = ctx.with_token(token);
    }

    Ok(ctx)
}

/// GET /v1/slots
///
/// List bookable slots for a date, tenant resolved from the request.
pub async fn list_slots(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<SlotsQuery>,
) -> HandlerResult<SlotsResponse> {
    let ctx = request_context(&headers, query.tenant)?;

    let open = parse_wall_clock(&query.open)
        .ok_or_else(|| AppError::BadRequest("Invalid 'open' time, expected HH:MM".to_string()))?;
    let close = parse_wall_clock(&query.close)
        .ok_or_else(|| AppError::BadRequest("Invalid 'close' time, expected HH:MM".to_string()))?;
    if close <= open {
        return Err(AppError::BadRequest(
            "'close' must be after 'open'".to_string(),
        ));
    }

    let window = BookingWindow::new(open, close, query.granularity);
    let master = query.master_id.map(MasterId::new);

    let available = state
        .scheduler
        .list_available_slots(&ctx, query.date, query.duration, window, master)
        .await?;

    Ok(Json(SlotsResponse {
        date: query.date,
        slots: available.slots.into_iter().map(SlotDto::from).collect(),
        failed_checks: available.failed_checks,
    }))
}

// =============================================================================
// Tenant registration and partition lifecycle
// =============================================================================

/// POST /v1/tenants
///
/// Register a tenant in the shared registry. Does not provision a partition;
/// call the provision endpoint afterwards.
pub async fn create_tenant(
    State(state): State<AppState>,
    Json(request): Json<CreateTenantRequest>,
) -> Result<(axum::http::StatusCode, Json<TenantDto>), AppError> {
    if request.slug.trim().is_empty() {
        return Err(AppError::BadRequest("Tenant slug must not be empty".to_string()));
    }

    let tenant = Tenant::new(request.slug.trim());
    state.repository.insert_tenant(&tenant).await?;

    Ok((axum::http::StatusCode::CREATED, Json(tenant.into())))
}

/// POST /v1/tenants/{tenant_id}/provision
///
/// Create the tenant's empty storage partition. Idempotent.
pub async fn provision_tenant(
    State(state): State<AppState>,
    Path(tenant_id): Path<Uuid>,
) -> HandlerResult<LifecycleResponse> {
    let id = TenantId(tenant_id);
    state.provisioner.provision(id).await?;

    Ok(Json(LifecycleResponse {
        tenant_id,
        message: "Partition provisioned".to_string(),
    }))
}

/// DELETE /v1/tenants/{tenant_id}/partition
///
/// Destroy the tenant's partition and everything in it. Idempotent.
pub async fn deprovision_tenant(
    State(state): State<AppState>,
    Path(tenant_id): Path<Uuid>,
) -> HandlerResult<LifecycleResponse> {
    let id = TenantId(tenant_id);
    state.provisioner.deprovision(id).await?;

    Ok(Json(LifecycleResponse {
        tenant_id,
        message: "Partition removed".to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_prefers_header_over_query_param() {
        let header_id = Uuid::new_v4();
        let param_id = Uuid::new_v4();

        let mut headers = HeaderMap::new();
        headers.insert(TENANT_ID_HEADER, header_id.to_string().parse().unwrap());

        let ctx = request_context(&headers, Some(param_id)).unwrap();
        let resolver = crate::tenancy::TenantResolver::new();
        assert_eq!(resolver.resolve(&ctx).unwrap(), TenantId(header_id));
    }

    #[test]
    fn malformed_tenant_header_is_rejected() {
        let mut headers = HeaderMap::new();
        headers.insert(TENANT_ID_HEADER, "not-a-uuid".parse().unwrap());

        assert!(request_context(&headers, None).is_err());
    }
}
