use tracing::{error, trace};

use super::error::{ReadinessError, ReadinessResult};
use super::kinds::{ObservedWorkload, WorkloadKind};
use super::traits::WorkloadLister;

/// Namespace plus ownership selector that limits collection to one managed
/// control plane.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OwnerScope {
    pub namespace: String,
    pub label_selector: String,
}

impl OwnerScope {
    /// Children are labelled `<owner_label>=<namespace>` by the installer.
    pub fn for_namespace(namespace: &str, owner_label: &str) -> Self {
        OwnerScope {
            namespace: namespace.to_string(),
            label_selector: format!("{}={}", owner_label, namespace),
        }
    }
}

/// A labelled child ready to be folded into the readiness map.
#[derive(Clone, Debug)]
pub struct ComponentInstance {
    pub component: String,
    pub name: String,
    pub workload: ObservedWorkload,
}

/// List every child of `kind` in scope and keep the ones carrying a
/// component label. Unlabelled children are logged and skipped.
#[tracing::instrument(level = "debug", skip_all, fields(ns = %scope.namespace, kind = %kind))]
pub async fn collect(
    lister: &dyn WorkloadLister,
    kind: WorkloadKind,
    scope: &OwnerScope,
    component_label: &str,
) -> ReadinessResult<Vec<ComponentInstance>> {
    let items = lister
        .list(kind, &scope.namespace, &scope.label_selector)
        .await?;

    let mut out = Vec::with_capacity(items.len());
    for workload in items {
        if workload.status.kind() != kind {
            return Err(ReadinessError::Extraction {
                kind,
                message: format!(
                    "list returned a {} item",
                    workload.status.kind()
                ),
            });
        }
        let name = workload.name.clone().ok_or_else(|| {
            ReadinessError::Accessor {
                kind,
                message: "object has no metadata.name".into(),
            }
        })?;
        match workload.label(component_label).map(str::to_string) {
            Some(component) => {
                trace!(%kind, %name, %component, "collect: child observed");
                out.push(ComponentInstance {
                    component,
                    name,
                    workload,
                });
            }
            None => {
                error!(
                    ns = %scope.namespace,
                    %kind,
                    %name,
                    label = %component_label,
                    "skipping resource for readiness check: resource has no component label"
                );
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::readiness::kinds::WorkloadStatus;
    use async_trait::async_trait;
    use k8s_openapi::api::apps::v1::{DaemonSetStatus, StatefulSetStatus};
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    const COMPONENT: &str = "app.kubernetes.io/component";

    struct OneShot {
        items: Vec<ObservedWorkload>,
        seen: Mutex<Vec<(WorkloadKind, String, String)>>,
    }

    #[async_trait]
    impl WorkloadLister for OneShot {
        async fn list(
            &self,
            kind: WorkloadKind,
            namespace: &str,
            label_selector: &str,
        ) -> ReadinessResult<Vec<ObservedWorkload>> {
            self.seen.lock().unwrap().push((
                kind,
                namespace.into(),
                label_selector.into(),
            ));
            Ok(self.items.clone())
        }
    }

    fn sts(name: Option<&str>, component: Option<&str>) -> ObservedWorkload {
        let mut labels = BTreeMap::new();
        if let Some(c) = component {
            labels.insert(COMPONENT.to_string(), c.to_string());
        }
        ObservedWorkload {
            name: name.map(Into::into),
            labels,
            status: WorkloadStatus::StatefulSet(StatefulSetStatus::default()),
        }
    }

    #[test]
    fn owner_scope_selects_by_namespace() {
        let scope = OwnerScope::for_namespace("istio-system", "mesh.oaas.io/owner");
        assert_eq!(scope.namespace, "istio-system");
        assert_eq!(scope.label_selector, "mesh.oaas.io/owner=istio-system");
    }

    #[tokio::test]
    async fn skips_unlabelled_children() {
        let lister = OneShot {
            items: vec![sts(Some("a-0"), Some("a")), sts(Some("stray"), None)],
            seen: Mutex::new(vec![]),
        };
        let scope = OwnerScope::for_namespace("ns1", "owner");
        let got = collect(&lister, WorkloadKind::StatefulSet, &scope, COMPONENT)
            .await
            .unwrap();
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].component, "a");
        assert_eq!(got[0].name, "a-0");
        let seen = lister.seen.lock().unwrap();
        assert_eq!(
            seen[0],
            (WorkloadKind::StatefulSet, "ns1".to_string(), "owner=ns1".to_string())
        );
    }

    #[tokio::test]
    #[tracing_test::traced_test]
    async fn unlabelled_child_is_logged() {
        let lister = OneShot {
            items: vec![sts(Some("orphan-0"), None)],
            seen: Mutex::new(vec![]),
        };
        let scope = OwnerScope::for_namespace("ns1", "owner");
        let got = collect(&lister, WorkloadKind::StatefulSet, &scope, COMPONENT)
            .await
            .unwrap();
        assert!(got.is_empty());
        assert!(logs_contain("resource has no component label"));
        assert!(logs_contain("orphan-0"));
    }

    #[tokio::test]
    async fn nameless_child_is_an_accessor_error() {
        let lister = OneShot {
            items: vec![sts(None, Some("a"))],
            seen: Mutex::new(vec![]),
        };
        let scope = OwnerScope::for_namespace("ns1", "owner");
        let err = collect(&lister, WorkloadKind::StatefulSet, &scope, COMPONENT)
            .await
            .unwrap_err();
        assert!(matches!(err, ReadinessError::Accessor { kind: WorkloadKind::StatefulSet, .. }));
    }

    #[tokio::test]
    async fn mismatched_kind_is_an_extraction_error() {
        let lister = OneShot {
            items: vec![ObservedWorkload {
                name: Some("cni-node".into()),
                labels: BTreeMap::new(),
                status: WorkloadStatus::DaemonSet(DaemonSetStatus::default()),
            }],
            seen: Mutex::new(vec![]),
        };
        let scope = OwnerScope::for_namespace("ns1", "owner");
        let err = collect(&lister, WorkloadKind::Deployment, &scope, COMPONENT)
            .await
            .unwrap_err();
        assert!(matches!(err, ReadinessError::Extraction { kind: WorkloadKind::Deployment, .. }));
    }
}
