use async_trait::async_trait;
use k8s_openapi::api::apps::v1::{DaemonSet, Deployment, StatefulSet};
use kube::Client;
use kube::api::{Api, ListParams};
use tracing::trace;

use crate::readiness::{
    ObservedWorkload, ReadinessError, ReadinessResult, WorkloadKind,
    WorkloadLister,
};

/// Lists child workloads straight from the API server.
#[derive(Clone)]
pub struct KubeWorkloadLister {
    client: Client,
}

impl KubeWorkloadLister {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl WorkloadLister for KubeWorkloadLister {
    async fn list(
        &self,
        kind: WorkloadKind,
        namespace: &str,
        label_selector: &str,
    ) -> ReadinessResult<Vec<ObservedWorkload>> {
        let lp = ListParams::default().labels(label_selector);
        let items: Vec<ObservedWorkload> = match kind {
            WorkloadKind::Deployment => {
                let api: Api<Deployment> =
                    Api::namespaced(self.client.clone(), namespace);
                api.list(&lp)
                    .await
                    .map_err(|e| ReadinessError::list(kind, namespace, e))?
                    .into_iter()
                    .map(ObservedWorkload::from)
                    .collect()
            }
            WorkloadKind::StatefulSet => {
                let api: Api<StatefulSet> =
                    Api::namespaced(self.client.clone(), namespace);
                api.list(&lp)
                    .await
                    .map_err(|e| ReadinessError::list(kind, namespace, e))?
                    .into_iter()
                    .map(ObservedWorkload::from)
                    .collect()
            }
            WorkloadKind::DaemonSet => {
                let api: Api<DaemonSet> =
                    Api::namespaced(self.client.clone(), namespace);
                api.list(&lp)
                    .await
                    .map_err(|e| ReadinessError::list(kind, namespace, e))?
                    .into_iter()
                    .map(ObservedWorkload::from)
                    .collect()
            }
        };
        trace!(%kind, ns = %namespace, selector = %label_selector, count = items.len(), "lister: listed");
        Ok(items)
    }
}
