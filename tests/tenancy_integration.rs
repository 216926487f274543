//! Tenant lifecycle and partition isolation tests.
//!
//! Provisioning, teardown, re-provisioning, and the guarantee that a session
//! bound to one partition can never observe another partition's data.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};

use bookbay::db::repositories::LocalRepository;
use bookbay::db::repository::{BookingRepository, FullRepository, TenantDirectory};
use bookbay::models::{Booking, BookingId, BookingStatus, Tenant, TenantId, TimeRange};
use bookbay::tenancy::{Provisioner, TenantError, TenantSession};

fn t(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 2).unwrap()
}

fn booking(start: NaiveTime, end: NaiveTime) -> Booking {
    Booking {
        id: BookingId::new(0),
        date: date(),
        start,
        end,
        status: BookingStatus::New,
        master_id: None,
        post_id: None,
    }
}

async fn registered_tenant(repo: &LocalRepository, slug: &str) -> Tenant {
    let tenant = Tenant::new(slug);
    repo.insert_tenant(&tenant).await.unwrap();
    tenant
}

#[tokio::test]
async fn provision_then_teardown_then_reprovision_yields_fresh_partition() {
    let repo = LocalRepository::new();
    let tenant = registered_tenant(&repo, "detailing-co").await;
    let session = TenantSession::bind(&tenant).unwrap();

    repo.provision(tenant.id).await.unwrap();
    repo.insert_booking(&session, &booking(t(9, 0), t(10, 0)))
        .await
        .unwrap();
    assert_eq!(repo.bookings_for_date(&session, date()).await.unwrap().len(), 1);

    repo.deprovision(tenant.id).await.unwrap();
    assert!(!repo.partition_exists(tenant.id).await.unwrap());

    // Re-provisioning must produce an empty partition, not resurrect data
    repo.provision(tenant.id).await.unwrap();
    assert!(repo.partition_exists(tenant.id).await.unwrap());
    assert!(repo.bookings_for_date(&session, date()).await.unwrap().is_empty());
}

#[tokio::test]
async fn provision_is_idempotent_and_preserves_data() {
    let repo = LocalRepository::new();
    let tenant = registered_tenant(&repo, "tyres-r-us").await;
    let session = TenantSession::bind(&tenant).unwrap();

    repo.provision(tenant.id).await.unwrap();
    repo.insert_booking(&session, &booking(t(9, 0), t(10, 0)))
        .await
        .unwrap();

    // A second provision call must not wipe the existing partition
    repo.provision(tenant.id).await.unwrap();
    assert_eq!(repo.bookings_for_date(&session, date()).await.unwrap().len(), 1);
}

#[tokio::test]
async fn deprovision_of_missing_partition_is_a_no_op() {
    let repo = LocalRepository::new();
    let tenant = registered_tenant(&repo, "quick-fit").await;
    repo.deprovision(tenant.id).await.unwrap();
    repo.deprovision(TenantId::new()).await.unwrap();
}

#[tokio::test]
async fn provisioning_an_unregistered_tenant_fails() {
    let repo = LocalRepository::new();
    let err = repo.provision(TenantId::new()).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn sessions_never_cross_partitions() {
    let repo = LocalRepository::new();
    let alpha = registered_tenant(&repo, "alpha").await;
    let beta = registered_tenant(&repo, "beta").await;
    repo.provision(alpha.id).await.unwrap();
    repo.provision(beta.id).await.unwrap();

    let alpha_session = TenantSession::bind(&alpha).unwrap();
    let beta_session = TenantSession::bind(&beta).unwrap();

    repo.insert_booking(&alpha_session, &booking(t(9, 0), t(10, 0)))
        .await
        .unwrap();

    let range = TimeRange::new(t(9, 0), t(10, 0)).unwrap();
    let seen_by_beta = repo
        .bookings_overlapping(&beta_session, date(), range, None)
        .await
        .unwrap();
    assert!(seen_by_beta.is_empty());

    let seen_by_alpha = repo
        .bookings_overlapping(&alpha_session, date(), range, None)
        .await
        .unwrap();
    assert_eq!(seen_by_alpha.len(), 1);
}

#[tokio::test]
async fn unprovisioned_partition_is_an_error_not_empty() {
    let repo = LocalRepository::new();
    let tenant = registered_tenant(&repo, "no-partition").await;
    let session = TenantSession::bind(&tenant).unwrap();

    let err = repo.bookings_for_date(&session, date()).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn duplicate_slug_is_rejected() {
    let repo = LocalRepository::new();
    registered_tenant(&repo, "the-garage").await;
    let dup = Tenant::new("the-garage");
    assert!(repo.insert_tenant(&dup).await.is_err());
}

#[tokio::test]
async fn provisioner_round_trip_through_the_coordinator() {
    let repo = Arc::new(LocalRepository::new());
    let tenant = registered_tenant(&repo, "coordinated").await;
    let provisioner = Provisioner::new(repo.clone() as Arc<dyn FullRepository>);

    provisioner.provision(tenant.id).await.unwrap();
    assert!(repo.partition_exists(tenant.id).await.unwrap());

    provisioner.deprovision(tenant.id).await.unwrap();
    assert!(!repo.partition_exists(tenant.id).await.unwrap());
}

#[tokio::test]
async fn provisioner_surfaces_unknown_tenant() {
    let repo = Arc::new(LocalRepository::new());
    let provisioner = Provisioner::new(repo as Arc<dyn FullRepository>);

    let err = provisioner.provision(TenantId::new()).await.unwrap_err();
    assert!(matches!(err, TenantError::Storage(_) | TenantError::UnknownTenant { .. }));
}
