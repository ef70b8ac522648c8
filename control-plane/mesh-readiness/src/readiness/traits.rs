use async_trait::async_trait;

use super::error::ReadinessResult;
use super::kinds::{ObservedWorkload, WorkloadKind};
use crate::crd::mesh_control_plane::MeshControlPlaneStatus;

/// Read side of the cluster: lists child workloads of one kind.
#[async_trait]
pub trait WorkloadLister: Send + Sync {
    async fn list(
        &self,
        kind: WorkloadKind,
        namespace: &str,
        label_selector: &str,
    ) -> ReadinessResult<Vec<ObservedWorkload>>;
}

/// Durable status storage for the managed control plane.
#[async_trait]
pub trait StatusWriter: Send + Sync {
    async fn persist(&self, status: &MeshControlPlaneStatus)
    -> ReadinessResult<()>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    Normal,
    Warning,
}

/// Fire-and-forget notifications; delivery failures stay inside the sink.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn notify(&self, severity: Severity, reason: &str, message: &str);
}
