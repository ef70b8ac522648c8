pub mod aggregator;
pub mod collector;
pub mod commit;
pub mod conditions;
pub mod engine;
pub mod error;
pub mod kinds;
pub mod traits;

pub use aggregator::{
    AggregationOutcome, CNI_COMPONENT, CniCheck, ComponentReadiness,
    ProbeSettings, aggregate,
};
pub use collector::{ComponentInstance, OwnerScope, collect};
pub use commit::{commit_status, prioritize_errors};
pub use conditions::{
    ConditionDecision, Notification, READY_COMPONENT_COUNT,
    reconcile_condition,
};
pub use engine::{PassOutcome, ReadinessEngine};
pub use error::{ReadinessError, ReadinessResult};
pub use kinds::{ObservedWorkload, WorkloadKind, WorkloadStatus};
pub use traits::{NotificationSink, Severity, StatusWriter, WorkloadLister};

use std::future::Future;
use tokio_util::sync::CancellationToken;

/// Race a collaborator call against the pass cancellation token. Dropping
/// the call future is what aborts the in-flight request.
pub(crate) async fn until_cancelled<T, F>(
    cancel: &CancellationToken,
    fut: F,
) -> ReadinessResult<T>
where
    F: Future<Output = ReadinessResult<T>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(ReadinessError::Cancelled),
        res = fut => res,
    }
}
