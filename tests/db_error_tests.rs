//! Tests for db::repository error types and context.

use bookbay::db::repository::{ErrorContext, RepositoryError};

#[test]
fn test_error_context_new() {
    let ctx = ErrorContext::new("test_operation");
    assert_eq!(ctx.operation, Some("test_operation".to_string()));
    assert!(ctx.entity.is_none());
    assert!(ctx.entity_id.is_none());
    assert!(ctx.partition.is_none());
    assert!(ctx.details.is_none());
    assert!(!ctx.retryable);
}

#[test]
fn test_error_context_chaining() {
    let ctx = ErrorContext::new("insert_booking")
        .with_entity("booking")
        .with_entity_id(42)
        .with_partition("tenant_0123abcd")
        .with_details("timeout occurred")
        .retryable();

    assert_eq!(ctx.operation, Some("insert_booking".to_string()));
    assert_eq!(ctx.entity, Some("booking".to_string()));
    assert_eq!(ctx.entity_id, Some("42".to_string()));
    assert_eq!(ctx.partition, Some("tenant_0123abcd".to_string()));
    assert_eq!(ctx.details, Some("timeout occurred".to_string()));
    assert!(ctx.retryable);
}

#[test]
fn test_error_context_display() {
    let ctx = ErrorContext::new("bookings_overlapping")
        .with_entity("booking")
        .with_partition("tenant_0123abcd");

    let display = format!("{}", ctx);
    assert!(display.contains("operation=bookings_overlapping"));
    assert!(display.contains("entity=booking"));
    assert!(display.contains("partition=tenant_0123abcd"));
}

#[test]
fn test_connection_errors_are_retryable() {
    assert!(RepositoryError::connection("pool exhausted").is_retryable());
    assert!(RepositoryError::timeout("query timed out").is_retryable());
    assert!(!RepositoryError::query("syntax error").is_retryable());
    assert!(!RepositoryError::not_found("no such booking").is_retryable());
    assert!(!RepositoryError::validation("end before start").is_retryable());
}

#[test]
fn test_not_found_classification() {
    assert!(RepositoryError::not_found("missing").is_not_found());
    assert!(!RepositoryError::internal("boom").is_not_found());
}

#[test]
fn test_with_operation_updates_context() {
    let err = RepositoryError::query("bad sql").with_operation("list_posts");
    assert_eq!(err.context().operation, Some("list_posts".to_string()));
}

#[test]
fn test_error_display_includes_context() {
    let err = RepositoryError::not_found_with_context(
        "Tenant partition not provisioned",
        ErrorContext::new("active_capacity").with_partition("tenant_0123abcd"),
    );
    let display = format!("{}", err);
    assert!(display.contains("Tenant partition not provisioned"));
    assert!(display.contains("operation=active_capacity"));
}
