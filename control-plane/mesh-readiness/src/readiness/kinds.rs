use std::collections::BTreeMap;

use k8s_openapi::api::apps::v1::{
    DaemonSet, DaemonSetStatus, Deployment, DeploymentStatus, StatefulSet,
    StatefulSetStatus,
};

/// Child workload kinds whose readiness feeds the Ready condition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WorkloadKind {
    Deployment,
    StatefulSet,
    DaemonSet,
}

impl WorkloadKind {
    /// Collection order for a readiness pass.
    pub const ALL: [WorkloadKind; 3] = [
        WorkloadKind::Deployment,
        WorkloadKind::StatefulSet,
        WorkloadKind::DaemonSet,
    ];
}

impl std::fmt::Display for WorkloadKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WorkloadKind::Deployment => write!(f, "Deployment"),
            WorkloadKind::StatefulSet => write!(f, "StatefulSet"),
            WorkloadKind::DaemonSet => write!(f, "DaemonSet"),
        }
    }
}

/// Kind-specific status snapshot of one observed workload.
#[derive(Clone, Debug)]
pub enum WorkloadStatus {
    Deployment(DeploymentStatus),
    StatefulSet(StatefulSetStatus),
    DaemonSet(DaemonSetStatus),
}

impl WorkloadStatus {
    pub fn kind(&self) -> WorkloadKind {
        match self {
            WorkloadStatus::Deployment(_) => WorkloadKind::Deployment,
            WorkloadStatus::StatefulSet(_) => WorkloadKind::StatefulSet,
            WorkloadStatus::DaemonSet(_) => WorkloadKind::DaemonSet,
        }
    }

    pub fn is_ready(&self) -> bool {
        match self {
            WorkloadStatus::Deployment(s) => deployment_ready(s),
            WorkloadStatus::StatefulSet(s) => stateful_set_ready(s),
            WorkloadStatus::DaemonSet(s) => daemon_set_ready(s),
        }
    }
}

/// Ready only when an `Available` condition reports `True`.
pub fn deployment_ready(status: &DeploymentStatus) -> bool {
    status
        .conditions
        .as_ref()
        .and_then(|conds| conds.iter().find(|c| c.type_ == "Available"))
        .map(|c| c.status == "True")
        .unwrap_or(false)
}

pub fn stateful_set_ready(status: &StatefulSetStatus) -> bool {
    status.ready_replicas.unwrap_or(0) >= status.replicas
}

/// Scheduling counts are ignored; only unavailable pods matter.
pub fn daemon_set_ready(status: &DaemonSetStatus) -> bool {
    status.number_unavailable.unwrap_or(0) == 0
}

/// One child workload as returned by a list call.
#[derive(Clone, Debug)]
pub struct ObservedWorkload {
    pub name: Option<String>,
    pub labels: BTreeMap<String, String>,
    pub status: WorkloadStatus,
}

impl ObservedWorkload {
    pub fn label(&self, key: &str) -> Option<&str> {
        self.labels.get(key).map(String::as_str)
    }

    pub fn is_ready(&self) -> bool {
        self.status.is_ready()
    }
}

impl From<Deployment> for ObservedWorkload {
    fn from(d: Deployment) -> Self {
        ObservedWorkload {
            name: d.metadata.name,
            labels: d.metadata.labels.unwrap_or_default(),
            status: WorkloadStatus::Deployment(d.status.unwrap_or_default()),
        }
    }
}

impl From<StatefulSet> for ObservedWorkload {
    fn from(s: StatefulSet) -> Self {
        ObservedWorkload {
            name: s.metadata.name,
            labels: s.metadata.labels.unwrap_or_default(),
            status: WorkloadStatus::StatefulSet(s.status.unwrap_or_default()),
        }
    }
}

impl From<DaemonSet> for ObservedWorkload {
    fn from(ds: DaemonSet) -> Self {
        ObservedWorkload {
            name: ds.metadata.name,
            labels: ds.metadata.labels.unwrap_or_default(),
            status: WorkloadStatus::DaemonSet(ds.status.unwrap_or_default()),
        }
    }
}
