//! Diesel table definitions.
//!
//! `tenants` lives in the shared `public` schema. The other tables exist once
//! per tenant schema and are deliberately left unqualified: the repository
//! routes each query by setting `search_path` for the duration of the
//! transaction, so the same table macros serve every partition.

diesel::table! {
    /// Shared tenant registry (public schema).
    tenants (id) {
        id -> Uuid,
        slug -> Varchar,
        schema_name -> Varchar,
        active -> Bool,
        can_book -> Bool,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Capacity units, one row per service bay (tenant schema).
    posts (id) {
        id -> Int8,
        title -> Varchar,
        active -> Bool,
        specialization -> Nullable<Varchar>,
    }
}

diesel::table! {
    /// Providers (tenant schema).
    masters (id) {
        id -> Int8,
        name -> Varchar,
        active -> Bool,
    }
}

diesel::table! {
    /// Appointments (tenant schema).
    bookings (id) {
        id -> Int8,
        date -> Date,
        start_time -> Time,
        end_time -> Time,
        status -> Varchar,
        master_id -> Nullable<Int8>,
        post_id -> Nullable<Int8>,
    }
}

diesel::table! {
    /// Blackout windows (tenant schema).
    blocked_slots (id) {
        id -> Int8,
        date_from -> Date,
        date_to -> Date,
        time_from -> Nullable<Time>,
        time_to -> Nullable<Time>,
        master_id -> Nullable<Int8>,
    }
}
