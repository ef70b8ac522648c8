#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use k8s_openapi::api::apps::v1::{
    DaemonSetStatus, DeploymentCondition, DeploymentStatus, StatefulSetStatus,
};
use mesh_readiness::crd::mesh_control_plane::MeshControlPlaneStatus;
use mesh_readiness::readiness::{
    CniCheck, NotificationSink, ObservedWorkload, OwnerScope, ProbeSettings,
    ReadinessEngine, ReadinessError, ReadinessResult, Severity, StatusWriter,
    WorkloadKind, WorkloadLister, WorkloadStatus,
};

pub const MESH_NS: &str = "istio-system";
pub const OPERATOR_NS: &str = "mesh-operator";
pub const OWNER_LABEL: &str = "mesh.oaas.io/owner";
pub const COMPONENT_LABEL: &str = "app.kubernetes.io/component";
pub const CNI_SELECTOR: &str = "mesh.oaas.io/cni=true";

fn labels(component: Option<&str>) -> BTreeMap<String, String> {
    let mut out = BTreeMap::new();
    out.insert(OWNER_LABEL.to_string(), MESH_NS.to_string());
    if let Some(c) = component {
        out.insert(COMPONENT_LABEL.to_string(), c.to_string());
    }
    out
}

pub fn deployment(
    name: &str,
    component: Option<&str>,
    available: bool,
) -> ObservedWorkload {
    ObservedWorkload {
        name: Some(name.into()),
        labels: labels(component),
        status: WorkloadStatus::Deployment(DeploymentStatus {
            conditions: Some(vec![DeploymentCondition {
                type_: "Available".into(),
                status: if available { "True" } else { "False" }.into(),
                ..Default::default()
            }]),
            ..Default::default()
        }),
    }
}

pub fn stateful_set(
    name: &str,
    component: Option<&str>,
    replicas: i32,
    ready: i32,
) -> ObservedWorkload {
    ObservedWorkload {
        name: Some(name.into()),
        labels: labels(component),
        status: WorkloadStatus::StatefulSet(StatefulSetStatus {
            replicas,
            ready_replicas: Some(ready),
            ..Default::default()
        }),
    }
}

pub fn daemon_set(
    name: &str,
    component: Option<&str>,
    unavailable: i32,
) -> ObservedWorkload {
    ObservedWorkload {
        name: Some(name.into()),
        labels: labels(component),
        status: WorkloadStatus::DaemonSet(DaemonSetStatus {
            number_unavailable: Some(unavailable),
            ..Default::default()
        }),
    }
}

pub fn list_error(kind: WorkloadKind, namespace: &str) -> ReadinessError {
    ReadinessError::List {
        kind,
        namespace: namespace.into(),
        message: "the server is currently unable to handle the request".into(),
    }
}

/// Lister answering from a fixed table keyed by (kind, namespace).
#[derive(Default)]
pub struct ScriptedLister {
    items: Mutex<HashMap<(WorkloadKind, String), Vec<ObservedWorkload>>>,
    failures: Mutex<HashMap<(WorkloadKind, String), ReadinessError>>,
    pub calls: Mutex<Vec<(WorkloadKind, String, String)>>,
}

impl ScriptedLister {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(
        self,
        kind: WorkloadKind,
        namespace: &str,
        items: Vec<ObservedWorkload>,
    ) -> Self {
        self.set(kind, namespace, items);
        self
    }

    pub fn set(
        &self,
        kind: WorkloadKind,
        namespace: &str,
        items: Vec<ObservedWorkload>,
    ) {
        self.items
            .lock()
            .unwrap()
            .insert((kind, namespace.to_string()), items);
    }

    pub fn fail(&self, kind: WorkloadKind, namespace: &str, err: ReadinessError) {
        self.failures
            .lock()
            .unwrap()
            .insert((kind, namespace.to_string()), err);
    }

    pub fn calls(&self) -> Vec<(WorkloadKind, String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl WorkloadLister for ScriptedLister {
    async fn list(
        &self,
        kind: WorkloadKind,
        namespace: &str,
        label_selector: &str,
    ) -> ReadinessResult<Vec<ObservedWorkload>> {
        self.calls.lock().unwrap().push((
            kind,
            namespace.to_string(),
            label_selector.to_string(),
        ));
        let key = (kind, namespace.to_string());
        if let Some(err) = self.failures.lock().unwrap().get(&key) {
            return Err(err.clone());
        }
        Ok(self
            .items
            .lock()
            .unwrap()
            .get(&key)
            .cloned()
            .unwrap_or_default())
    }
}

#[derive(Default)]
pub struct RecordingWriter {
    pub writes: Mutex<Vec<MeshControlPlaneStatus>>,
    pub fail_with: Mutex<Option<ReadinessError>>,
}

impl RecordingWriter {
    pub fn failing(err: ReadinessError) -> Self {
        Self {
            writes: Mutex::new(vec![]),
            fail_with: Mutex::new(Some(err)),
        }
    }

    pub fn count(&self) -> usize {
        self.writes.lock().unwrap().len()
    }

    pub fn last(&self) -> Option<MeshControlPlaneStatus> {
        self.writes.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl StatusWriter for RecordingWriter {
    async fn persist(
        &self,
        status: &MeshControlPlaneStatus,
    ) -> ReadinessResult<()> {
        if let Some(err) = self.fail_with.lock().unwrap().clone() {
            return Err(err);
        }
        self.writes.lock().unwrap().push(status.clone());
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingSink {
    pub events: Mutex<Vec<(Severity, String, String)>>,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<(Severity, String, String)> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationSink for RecordingSink {
    async fn notify(&self, severity: Severity, reason: &str, message: &str) {
        self.events.lock().unwrap().push((
            severity,
            reason.to_string(),
            message.to_string(),
        ));
    }
}

pub fn settings(cni_enabled: bool) -> ProbeSettings {
    ProbeSettings {
        scope: OwnerScope::for_namespace(MESH_NS, OWNER_LABEL),
        component_label: COMPONENT_LABEL.to_string(),
        cni: CniCheck {
            enabled: cni_enabled,
            namespace: OPERATOR_NS.to_string(),
            label_selector: CNI_SELECTOR.to_string(),
        },
    }
}

pub struct Harness {
    pub lister: Arc<ScriptedLister>,
    pub writer: Arc<RecordingWriter>,
    pub sink: Arc<RecordingSink>,
    pub engine: ReadinessEngine,
}

pub fn harness(
    lister: ScriptedLister,
    writer: RecordingWriter,
    cni_enabled: bool,
) -> Harness {
    let lister = Arc::new(lister);
    let writer = Arc::new(writer);
    let sink = Arc::new(RecordingSink::default());
    let engine = ReadinessEngine::new(
        lister.clone(),
        writer.clone(),
        sink.clone(),
        settings(cni_enabled),
    );
    Harness {
        lister,
        writer,
        sink,
        engine,
    }
}
