//! Postgres repository implementation using Diesel.
//!
//! Tenant isolation is schema-per-tenant. The shared `public` schema holds
//! only the tenant registry; every tenant's working tables live in a schema
//! named after the tenant. Each tenant-scoped call runs inside a transaction
//! that first issues `SET LOCAL search_path` for the session's schema, so a
//! pooled connection can never leak a previous request's binding: the
//! search_path dies with the transaction.
//!
//! ## Features
//!
//! - Connection pooling with r2d2
//! - Automatic retry for transient failures
//! - Connection health monitoring
//! - Automatic migration execution for the shared registry
//!
//! ## Configuration
//!
//! Environment variables:
//! - `DATABASE_URL` or `PG_DATABASE_URL`: Connection string (required)
//! - `PG_POOL_MAX`: Maximum pool size (default: 10)
//! - `PG_POOL_MIN`: Minimum pool size (default: 1)
//! - `PG_CONN_TIMEOUT_SEC`: Connection timeout in seconds (default: 30)
//! - `PG_IDLE_TIMEOUT_SEC`: Idle connection timeout in seconds (default: 600)
//! - `PG_MAX_RETRIES`: Maximum retry attempts for transient failures (default: 3)
//! - `PG_RETRY_DELAY_MS`: Initial retry delay in milliseconds (default: 100)

use async_trait::async_trait;
use chrono::NaiveDate;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sql_query;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tokio::task;

use crate::db::repository::{
    BlackoutRepository, BookingRepository, CapacityRepository, ErrorContext, FullRepository,
    MasterRepository, RepositoryError, RepositoryResult, TenantDirectory,
};
use crate::models::{
    BlockedSlot, Booking, BookingId, BookingStatus, Master, MasterId, Post, PostId, Tenant,
    TenantId, TimeRange,
};
use crate::tenancy::session::{is_valid_schema_name, TenantSession};

mod models;
mod schema;

use models::*;

type PgPool = Pool<ConnectionManager<PgConnection>>;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("src/db/repositories/postgres/migrations");

/// DDL for one tenant's working tables. Executed with the new schema first in
/// the search_path, so every name lands inside the partition. Each statement
/// is `IF NOT EXISTS` to keep provisioning idempotent.
const PARTITION_TABLES_DDL: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id BIGSERIAL PRIMARY KEY,
    email VARCHAR NOT NULL UNIQUE,
    name VARCHAR NOT NULL,
    role VARCHAR NOT NULL DEFAULT 'staff'
);
CREATE TABLE IF NOT EXISTS clients (
    id BIGSERIAL PRIMARY KEY,
    name VARCHAR NOT NULL,
    phone VARCHAR,
    email VARCHAR
);
CREATE TABLE IF NOT EXISTS services (
    id BIGSERIAL PRIMARY KEY,
    title VARCHAR NOT NULL,
    duration_minutes INTEGER NOT NULL,
    price_cents BIGINT
);
CREATE TABLE IF NOT EXISTS settings (
    key VARCHAR PRIMARY KEY,
    value VARCHAR NOT NULL
);
CREATE TABLE IF NOT EXISTS masters (
    id BIGSERIAL PRIMARY KEY,
    name VARCHAR NOT NULL,
    active BOOLEAN NOT NULL DEFAULT TRUE
);
CREATE TABLE IF NOT EXISTS posts (
    id BIGSERIAL PRIMARY KEY,
    title VARCHAR NOT NULL,
    active BOOLEAN NOT NULL DEFAULT TRUE,
    specialization VARCHAR
);
CREATE TABLE IF NOT EXISTS bookings (
    id BIGSERIAL PRIMARY KEY,
    date DATE NOT NULL,
    start_time TIME NOT NULL,
    end_time TIME NOT NULL,
    status VARCHAR NOT NULL DEFAULT 'new',
    master_id BIGINT REFERENCES masters(id),
    post_id BIGINT REFERENCES posts(id)
);
CREATE INDEX IF NOT EXISTS bookings_date_idx ON bookings (date, start_time);
CREATE TABLE IF NOT EXISTS blocked_slots (
    id BIGSERIAL PRIMARY KEY,
    date_from DATE NOT NULL,
    date_to DATE NOT NULL,
    time_from TIME,
    time_to TIME,
    master_id BIGINT REFERENCES masters(id)
);
"#;

/// Configuration for connecting to Postgres.
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    /// Database connection URL
    pub database_url: String,
    /// Maximum number of connections in the pool
    pub max_pool_size: u32,
    /// Minimum number of connections in the pool
    pub min_pool_size: u32,
    /// Connection timeout in seconds
    pub connection_timeout_sec: u64,
    /// Idle connection timeout in seconds
    pub idle_timeout_sec: u64,
    /// Maximum number of retry attempts for transient failures
    pub max_retries: u32,
    /// Initial retry delay in milliseconds (doubles with each retry)
    pub retry_delay_ms: u64,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            max_pool_size: 10,
            min_pool_size: 1,
            connection_timeout_sec: 30,
            idle_timeout_sec: 600,
            max_retries: 3,
            retry_delay_ms: 100,
        }
    }
}

impl PostgresConfig {
    /// Create configuration from environment variables.
    pub fn from_env() -> Result<Self, String> {
        let database_url = std::env::var("DATABASE_URL")
            .or_else(|_| std::env::var("PG_DATABASE_URL"))
            .map_err(|_| "DATABASE_URL or PG_DATABASE_URL must be set".to_string())?;

        let max_pool_size = std::env::var("PG_POOL_MAX")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(10);

        let min_pool_size = std::env::var("PG_POOL_MIN")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(1);

        let connection_timeout_sec = std::env::var("PG_CONN_TIMEOUT_SEC")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(30);

        let idle_timeout_sec = std::env::var("PG_IDLE_TIMEOUT_SEC")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(600);

        let max_retries = std::env::var("PG_MAX_RETRIES")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(3);

        let retry_delay_ms = std::env::var("PG_RETRY_DELAY_MS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(100);

        Ok(Self {
            database_url,
            max_pool_size,
            min_pool_size,
            connection_timeout_sec,
            idle_timeout_sec,
            max_retries,
            retry_delay_ms,
        })
    }

    /// Create a new configuration with a database URL.
    pub fn with_url(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            ..Default::default()
        }
    }
}

/// Pool health statistics.
#[derive(Debug, Clone, Default)]
pub struct PoolStats {
    /// Number of connections currently in use
    pub connections_in_use: u32,
    /// Number of idle connections
    pub idle_connections: u32,
    /// Total number of connections in the pool
    pub total_connections: u32,
    /// Maximum pool size
    pub max_size: u32,
    /// Total successful queries executed
    pub total_queries: u64,
    /// Total failed queries
    pub failed_queries: u64,
    /// Total retried operations
    pub retried_operations: u64,
}

/// Diesel-backed repository for Postgres.
#[derive(Clone, Debug)]
pub struct PostgresRepository {
    pool: PgPool,
    config: PostgresConfig,
    // Metrics counters
    total_queries: std::sync::Arc<AtomicU64>,
    failed_queries: std::sync::Arc<AtomicU64>,
    retried_operations: std::sync::Arc<AtomicU64>,
}

impl PostgresRepository {
    /// Create a new repository and run pending registry migrations.
    pub fn new(config: PostgresConfig) -> RepositoryResult<Self> {
        let manager = ConnectionManager::<PgConnection>::new(&config.database_url);

        let pool = Pool::builder()
            .max_size(config.max_pool_size)
            .min_idle(Some(config.min_pool_size))
            .connection_timeout(Duration::from_secs(config.connection_timeout_sec))
            .idle_timeout(Some(Duration::from_secs(config.idle_timeout_sec)))
            .test_on_check_out(true) // Validate connections before use
            .build(manager)
            .map_err(|e| {
                RepositoryError::connection_with_context(
                    e.to_string(),
                    ErrorContext::new("create_pool")
                        .with_details(format!("max_size={}", config.max_pool_size)),
                )
            })?;

        // Run migrations once during initialization
        {
            let mut conn = pool.get().map_err(|e| {
                RepositoryError::connection_with_context(
                    e.to_string(),
                    ErrorContext::new("get_connection_for_migrations"),
                )
            })?;
            Self::run_migrations(&mut conn)?;
        }

        Ok(Self {
            pool,
            config,
            total_queries: std::sync::Arc::new(AtomicU64::new(0)),
            failed_queries: std::sync::Arc::new(AtomicU64::new(0)),
            retried_operations: std::sync::Arc::new(AtomicU64::new(0)),
        })
    }

    /// Run pending registry migrations.
    fn run_migrations(conn: &mut PgConnection) -> RepositoryResult<()> {
        conn.run_pending_migrations(MIGRATIONS).map_err(|e| {
            RepositoryError::internal_with_context(
                format!("Migration failed: {}", e),
                ErrorContext::new("run_migrations"),
            )
        })?;

        Ok(())
    }

    /// Execute a database operation with automatic retry for transient
    /// failures.
    async fn with_conn<T, F>(&self, f: F) -> RepositoryResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut PgConnection) -> RepositoryResult<T> + Send + 'static + Clone,
    {
        let pool = self.pool.clone();
        let max_retries = self.config.max_retries;
        let retry_delay_ms = self.config.retry_delay_ms;
        let total_queries = self.total_queries.clone();
        let failed_queries = self.failed_queries.clone();
        let retried_operations = self.retried_operations.clone();

        task::spawn_blocking(move || {
            let mut last_error = None;
            let mut retry_delay = Duration::from_millis(retry_delay_ms);

            for attempt in 0..=max_retries {
                if attempt > 0 {
                    retried_operations.fetch_add(1, Ordering::Relaxed);
                    std::thread::sleep(retry_delay);
                    retry_delay *= 2; // Exponential backoff
                }

                let mut conn = match pool.get() {
                    Ok(c) => c,
                    Err(e) => {
                        let err = RepositoryError::connection_with_context(
                            e.to_string(),
                            ErrorContext::new("get_connection")
                                .with_details(format!("attempt={}", attempt + 1))
                                .retryable(),
                        );
                        if attempt < max_retries {
                            last_error = Some(err);
                            continue;
                        }
                        failed_queries.fetch_add(1, Ordering::Relaxed);
                        return Err(err);
                    }
                };

                total_queries.fetch_add(1, Ordering::Relaxed);
                match f.clone()(&mut conn) {
                    Ok(result) => return Ok(result),
                    Err(e) if e.is_retryable() && attempt < max_retries => {
                        last_error = Some(e);
                        continue;
                    }
                    Err(e) => {
                        failed_queries.fetch_add(1, Ordering::Relaxed);
                        return Err(e);
                    }
                }
            }

            failed_queries.fetch_add(1, Ordering::Relaxed);
            Err(last_error.unwrap_or_else(|| {
                RepositoryError::internal("Max retries exceeded with no error captured")
            }))
        })
        .await
        .map_err(|e| {
            RepositoryError::internal_with_context(
                format!("Task join error: {}", e),
                ErrorContext::new("spawn_blocking"),
            )
        })?
    }

    /// Execute an operation bound to a tenant partition.
    ///
    /// The closure runs inside a transaction whose first statement is
    /// `SET LOCAL search_path TO <schema>, pg_catalog`; the binding cannot
    /// outlive the transaction, so it can never bleed into another request
    /// sharing the pooled connection.
    async fn with_tenant_conn<T, F>(&self, session: &TenantSession, f: F) -> RepositoryResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut PgConnection) -> RepositoryResult<T> + Send + 'static + Clone,
    {
        let schema = checked_schema(session)?;
        self.with_conn(move |conn| {
            conn.transaction(|conn| {
                sql_query(format!(
                    "SET LOCAL search_path TO {}, pg_catalog",
                    schema
                ))
                .execute(conn)?;
                f.clone()(conn)
            })
        })
        .await
    }

    /// Get pool health statistics.
    pub fn get_pool_stats(&self) -> PoolStats {
        let state = self.pool.state();
        PoolStats {
            connections_in_use: state.connections - state.idle_connections,
            idle_connections: state.idle_connections,
            total_connections: state.connections,
            max_size: self.config.max_pool_size,
            total_queries: self.total_queries.load(Ordering::Relaxed),
            failed_queries: self.failed_queries.load(Ordering::Relaxed),
            retried_operations: self.retried_operations.load(Ordering::Relaxed),
        }
    }

    /// Check if the database connection is healthy.
    pub async fn is_healthy(&self) -> bool {
        self.health_check().await.unwrap_or(false)
    }

    /// Get detailed health information: (is_healthy, latency_ms, error).
    pub async fn health_check_detailed(&self) -> (bool, Option<u64>, Option<String>) {
        let start = Instant::now();
        match self.health_check().await {
            Ok(true) => (true, Some(start.elapsed().as_millis() as u64), None),
            Ok(false) => (
                false,
                Some(start.elapsed().as_millis() as u64),
                Some("Health check returned false".to_string()),
            ),
            Err(e) => (
                false,
                Some(start.elapsed().as_millis() as u64),
                Some(e.to_string()),
            ),
        }
    }

    /// Fetch a tenant's registered partition name, or `None` when the tenant
    /// itself is not registered.
    async fn registered_schema(&self, id: TenantId) -> RepositoryResult<Option<String>> {
        use schema::tenants::dsl;
        self.with_conn(move |conn| {
            let name = dsl::tenants
                .filter(dsl::id.eq(id.0))
                .select(dsl::schema_name)
                .first::<String>(conn)
                .optional()?;
            Ok(name)
        })
        .await
    }
}

/// Validate a schema identifier before interpolating it into SQL.
fn checked_schema(session: &TenantSession) -> RepositoryResult<String> {
    let schema = session.schema();
    if !is_valid_schema_name(schema) {
        return Err(RepositoryError::validation(format!(
            "Refusing to bind malformed partition name: {}",
            schema
        )));
    }
    Ok(schema.to_string())
}

fn checked_schema_string(schema: &str) -> RepositoryResult<String> {
    if !is_valid_schema_name(schema) {
        return Err(RepositoryError::validation(format!(
            "Refusing malformed partition name: {}",
            schema
        )));
    }
    Ok(schema.to_string())
}

#[derive(QueryableByName)]
struct ExistsRow {
    #[diesel(sql_type = diesel::sql_types::Bool)]
    exists: bool,
}

#[async_trait]
impl TenantDirectory for PostgresRepository {
    async fn find_tenant(&self, id: TenantId) -> RepositoryResult<Option<Tenant>> {
        use schema::tenants::dsl;
        self.with_conn(move |conn| {
            let row = dsl::tenants
                .filter(dsl::id.eq(id.0))
                .first::<TenantRow>(conn)
                .optional()?;
            Ok(row.map(Tenant::from))
        })
        .await
    }

    async fn find_tenant_by_slug(&self, slug: &str) -> RepositoryResult<Option<Tenant>> {
        use schema::tenants::dsl;
        let slug = slug.to_string();
        self.with_conn(move |conn| {
            let row = dsl::tenants
                .filter(dsl::slug.eq(slug.clone()))
                .first::<TenantRow>(conn)
                .optional()?;
            Ok(row.map(Tenant::from))
        })
        .await
    }

    async fn list_tenants(&self) -> RepositoryResult<Vec<Tenant>> {
        use schema::tenants::dsl;
        self.with_conn(move |conn| {
            let rows = dsl::tenants
                .order(dsl::created_at.asc())
                .load::<TenantRow>(conn)?;
            Ok(rows.into_iter().map(Tenant::from).collect())
        })
        .await
    }

    async fn insert_tenant(&self, tenant: &Tenant) -> RepositoryResult<()> {
        let row = TenantRow::from(tenant);
        self.with_conn(move |conn| {
            diesel::insert_into(schema::tenants::table)
                .values(&row)
                .execute(conn)
                .map_err(|e| {
                    RepositoryError::from(e).with_operation("insert_tenant")
                })?;
            Ok(())
        })
        .await
    }

    async fn set_booking_capability(&self, id: TenantId, can_book: bool) -> RepositoryResult<()> {
        use schema::tenants::dsl;
        self.with_conn(move |conn| {
            let updated = diesel::update(dsl::tenants.filter(dsl::id.eq(id.0)))
                .set(dsl::can_book.eq(can_book))
                .execute(conn)?;
            if updated == 0 {
                return Err(RepositoryError::not_found_with_context(
                    "Tenant not registered",
                    ErrorContext::new("set_booking_capability").with_entity_id(id),
                ));
            }
            Ok(())
        })
        .await
    }

    async fn provision(&self, id: TenantId) -> RepositoryResult<()> {
        let schema_name = self.registered_schema(id).await?.ok_or_else(|| {
            RepositoryError::not_found_with_context(
                "Cannot provision unregistered tenant",
                ErrorContext::new("provision").with_entity_id(id),
            )
        })?;
        let schema_name = checked_schema_string(&schema_name)?;

        self.with_conn(move |conn| {
            conn.transaction(|conn| {
                sql_query(format!("CREATE SCHEMA IF NOT EXISTS {}", schema_name))
                    .execute(conn)?;
                sql_query(format!(
                    "SET LOCAL search_path TO {}, pg_catalog",
                    schema_name
                ))
                .execute(conn)?;
                conn.batch_execute(PARTITION_TABLES_DDL)
                    .map_err(RepositoryError::from)?;
                Ok(())
            })
        })
        .await
    }

    async fn deprovision(&self, id: TenantId) -> RepositoryResult<()> {
        let schema_name = match self.registered_schema(id).await? {
            Some(name) => checked_schema_string(&name)?,
            // Unknown tenant: nothing to tear down
            None => return Ok(()),
        };

        self.with_conn(move |conn| {
            sql_query(format!("DROP SCHEMA IF EXISTS {} CASCADE", schema_name))
                .execute(conn)?;
            Ok(())
        })
        .await
    }

    async fn partition_exists(&self, id: TenantId) -> RepositoryResult<bool> {
        let schema_name = match self.registered_schema(id).await? {
            Some(name) => name,
            None => return Ok(false),
        };

        self.with_conn(move |conn| {
            let row: ExistsRow = sql_query(
                "SELECT EXISTS(SELECT 1 FROM information_schema.schemata \
                 WHERE schema_name = $1) AS exists",
            )
            .bind::<diesel::sql_types::Text, _>(schema_name.clone())
            .get_result(conn)?;
            Ok(row.exists)
        })
        .await
    }
}

#[async_trait]
impl BookingRepository for PostgresRepository {
    async fn bookings_overlapping(
        &self,
        session: &TenantSession,
        date: NaiveDate,
        range: TimeRange,
        master: Option<MasterId>,
    ) -> RepositoryResult<Vec<Booking>> {
        use schema::bookings::dsl;
        self.with_tenant_conn(session, move |conn| {
            let mut query = dsl::bookings
                .filter(dsl::date.eq(date))
                .filter(dsl::status.eq_any(vec!["new", "confirmed"]))
                // Half-open intersection with [range.start, range.end)
                .filter(dsl::start_time.lt(range.end))
                .filter(dsl::end_time.gt(range.start))
                .into_boxed();
            if let Some(m) = master {
                query = query.filter(dsl::master_id.eq(m.0));
            }
            let rows = query.order(dsl::start_time.asc()).load::<BookingRow>(conn)?;
            rows.into_iter().map(Booking::try_from).collect()
        })
        .await
    }

    async fn bookings_for_date(
        &self,
        session: &TenantSession,
        date: NaiveDate,
    ) -> RepositoryResult<Vec<Booking>> {
        use schema::bookings::dsl;
        self.with_tenant_conn(session, move |conn| {
            let rows = dsl::bookings
                .filter(dsl::date.eq(date))
                .order(dsl::start_time.asc())
                .load::<BookingRow>(conn)?;
            rows.into_iter().map(Booking::try_from).collect()
        })
        .await
    }

    async fn insert_booking(
        &self,
        session: &TenantSession,
        booking: &Booking,
    ) -> RepositoryResult<Booking> {
        if booking.end <= booking.start {
            return Err(RepositoryError::validation(
                "Booking end must be after start",
            ));
        }
        let row = NewBookingRow::from(booking);
        self.with_tenant_conn(session, move |conn| {
            let stored: BookingRow = diesel::insert_into(schema::bookings::table)
                .values(&row)
                .get_result(conn)?;
            Booking::try_from(stored)
        })
        .await
    }

    async fn set_booking_status(
        &self,
        session: &TenantSession,
        id: BookingId,
        status: BookingStatus,
    ) -> RepositoryResult<()> {
        use schema::bookings::dsl;
        let status = status.to_string();
        let partition = session.schema().to_string();
        self.with_tenant_conn(session, move |conn| {
            let updated = diesel::update(dsl::bookings.filter(dsl::id.eq(id.0)))
                .set(dsl::status.eq(status.clone()))
                .execute(conn)?;
            if updated == 0 {
                return Err(RepositoryError::not_found_with_context(
                    "Booking not found",
                    ErrorContext::new("set_booking_status")
                        .with_entity("booking")
                        .with_entity_id(id.0)
                        .with_partition(partition.clone()),
                ));
            }
            Ok(())
        })
        .await
    }
}

#[async_trait]
impl CapacityRepository for PostgresRepository {
    async fn active_capacity(&self, session: &TenantSession) -> RepositoryResult<u32> {
        use schema::posts::dsl;
        self.with_tenant_conn(session, move |conn| {
            let count: i64 = dsl::posts
                .filter(dsl::active.eq(true))
                .count()
                .get_result(conn)?;
            Ok(count as u32)
        })
        .await
    }

    async fn list_posts(&self, session: &TenantSession) -> RepositoryResult<Vec<Post>> {
        use schema::posts::dsl;
        self.with_tenant_conn(session, move |conn| {
            let rows = dsl::posts.order(dsl::id.asc()).load::<PostRow>(conn)?;
            Ok(rows.into_iter().map(Post::from).collect())
        })
        .await
    }

    async fn insert_post(&self, session: &TenantSession, post: &Post) -> RepositoryResult<Post> {
        let row = NewPostRow {
            title: post.title.clone(),
            active: post.active,
            specialization: post.specialization.clone(),
        };
        self.with_tenant_conn(session, move |conn| {
            let stored: PostRow = diesel::insert_into(schema::posts::table)
                .values(&row)
                .get_result(conn)?;
            Ok(Post::from(stored))
        })
        .await
    }

    async fn set_post_active(
        &self,
        session: &TenantSession,
        id: PostId,
        active: bool,
    ) -> RepositoryResult<()> {
        use schema::posts::dsl;
        let partition = session.schema().to_string();
        self.with_tenant_conn(session, move |conn| {
            let updated = diesel::update(dsl::posts.filter(dsl::id.eq(id.0)))
                .set(dsl::active.eq(active))
                .execute(conn)?;
            if updated == 0 {
                return Err(RepositoryError::not_found_with_context(
                    "Post not found",
                    ErrorContext::new("set_post_active")
                        .with_entity("post")
                        .with_entity_id(id.0)
                        .with_partition(partition.clone()),
                ));
            }
            Ok(())
        })
        .await
    }
}

#[async_trait]
impl BlackoutRepository for PostgresRepository {
    async fn blackouts_for_date(
        &self,
        session: &TenantSession,
        date: NaiveDate,
    ) -> RepositoryResult<Vec<BlockedSlot>> {
        use schema::blocked_slots::dsl;
        self.with_tenant_conn(session, move |conn| {
            let rows = dsl::blocked_slots
                .filter(dsl::date_from.le(date))
                .filter(dsl::date_to.ge(date))
                .load::<BlockedSlotRow>(conn)?;
            rows.into_iter().map(BlockedSlot::try_from).collect()
        })
        .await
    }

    async fn insert_blackout(
        &self,
        session: &TenantSession,
        slot: &BlockedSlot,
    ) -> RepositoryResult<BlockedSlot> {
        if slot.date_to < slot.date_from {
            return Err(RepositoryError::validation(
                "Blackout date range is inverted",
            ));
        }
        let row = NewBlockedSlotRow::from(slot);
        self.with_tenant_conn(session, move |conn| {
            let stored: BlockedSlotRow = diesel::insert_into(schema::blocked_slots::table)
                .values(&row)
                .get_result(conn)?;
            BlockedSlot::try_from(stored)
        })
        .await
    }

    async fn remove_blackout(&self, session: &TenantSession, id: i64) -> RepositoryResult<()> {
        use schema::blocked_slots::dsl;
        self.with_tenant_conn(session, move |conn| {
            diesel::delete(dsl::blocked_slots.filter(dsl::id.eq(id))).execute(conn)?;
            Ok(())
        })
        .await
    }
}

#[async_trait]
impl MasterRepository for PostgresRepository {
    async fn list_masters(&self, session: &TenantSession) -> RepositoryResult<Vec<Master>> {
        use schema::masters::dsl;
        self.with_tenant_conn(session, move |conn| {
            let rows = dsl::masters.order(dsl::id.asc()).load::<MasterRow>(conn)?;
            Ok(rows.into_iter().map(Master::from).collect())
        })
        .await
    }

    async fn insert_master(
        &self,
        session: &TenantSession,
        master: &Master,
    ) -> RepositoryResult<Master> {
        let row = NewMasterRow {
            name: master.name.clone(),
            active: master.active,
        };
        self.with_tenant_conn(session, move |conn| {
            let stored: MasterRow = diesel::insert_into(schema::masters::table)
                .values(&row)
                .get_result(conn)?;
            Ok(Master::from(stored))
        })
        .await
    }
}

#[async_trait]
impl FullRepository for PostgresRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        self.with_conn(move |conn| {
            sql_query("SELECT 1").execute(conn)?;
            Ok(true)
        })
        .await
    }
}
