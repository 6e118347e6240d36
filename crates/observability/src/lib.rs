//! Tracing and structured logging (shared setup).

/// Initialize process-wide observability (tracing/logging).
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init();
}

/// Tracing configuration (filters, layers).
pub mod tracing;

/// Log target for audit-relevant events (privileged actions, denials).
pub const AUDIT_TARGET: &str = "audit";
