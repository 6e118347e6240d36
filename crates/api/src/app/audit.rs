use aerodesk_auth::AuditRecord;
use aerodesk_observability::AUDIT_TARGET;

use crate::state::AppState;

/// Best-effort audit write. The action being audited has already happened,
/// so a failed write is logged and never surfaces to the caller.
pub async fn record(state: &AppState, record: AuditRecord) {
    match state.audit.append(&record).await {
        Ok(()) => tracing::info!(
            target: AUDIT_TARGET,
            action = record.action.as_str(),
            actor_id = %record.actor_id,
            target_id = %record.target_id,
            ip = %record.ip_address,
            "audit record written"
        ),
        Err(e) => tracing::warn!(
            target: AUDIT_TARGET,
            action = record.action.as_str(),
            actor_id = %record.actor_id,
            target_id = %record.target_id,
            error = %e,
            "audit write failed"
        ),
    }
}
