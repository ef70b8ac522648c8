use std::collections::{BTreeMap, BTreeSet};

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::collector::{OwnerScope, collect};
use super::error::{ReadinessError, ReadinessResult};
use super::kinds::WorkloadKind;
use super::traits::WorkloadLister;
use super::until_cancelled;

/// Synthetic component standing for the cluster CNI DaemonSets.
pub const CNI_COMPONENT: &str = "cni";

/// Readiness per logical component, built fresh on every pass.
///
/// Instances are AND-reduced: the first instance of a component seeds its
/// entry and every later instance can only clear it. A component never
/// observed has no entry at all.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ComponentReadiness(BTreeMap<String, bool>);

impl ComponentReadiness {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, component: &str, ready: bool) {
        match self.0.get_mut(component) {
            Some(acc) => *acc = *acc && ready,
            None => {
                self.0.insert(component.to_string(), ready);
            }
        }
    }

    /// Overwrite a component regardless of what was folded before.
    pub fn set(&mut self, component: &str, ready: bool) {
        self.0.insert(component.to_string(), ready);
    }

    pub fn get(&self, component: &str) -> Option<bool> {
        self.0.get(component).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Split into (ready, unready) component names, both sorted.
    pub fn partition(&self) -> (BTreeSet<String>, BTreeSet<String>) {
        let mut ready = BTreeSet::new();
        let mut unready = BTreeSet::new();
        for (component, ok) in &self.0 {
            if *ok {
                ready.insert(component.clone());
            } else {
                unready.insert(component.clone());
            }
        }
        (ready, unready)
    }
}

impl FromIterator<(String, bool)> for ComponentReadiness {
    fn from_iter<T: IntoIterator<Item = (String, bool)>>(iter: T) -> Self {
        let mut out = ComponentReadiness::new();
        for (component, ready) in iter {
            out.record(&component, ready);
        }
        out
    }
}

/// Result of one aggregation pass. When `error` is set the map is partial
/// and must not be used to decide between True and False.
#[derive(Clone, Debug, Default)]
pub struct AggregationOutcome {
    pub readiness: ComponentReadiness,
    pub error: Option<ReadinessError>,
}

/// Cluster-scoped CNI check, evaluated in the operator namespace.
#[derive(Clone, Debug)]
pub struct CniCheck {
    pub enabled: bool,
    pub namespace: String,
    pub label_selector: String,
}

/// Everything a pass needs to know about where to look.
#[derive(Clone, Debug)]
pub struct ProbeSettings {
    pub scope: OwnerScope,
    pub component_label: String,
    pub cni: CniCheck,
}

/// Fold every owned child of every kind into a [`ComponentReadiness`], then
/// add the `cni` component. Stops at the first collector failure.
#[tracing::instrument(level = "debug", skip_all, fields(ns = %settings.scope.namespace))]
pub async fn aggregate(
    lister: &dyn WorkloadLister,
    settings: &ProbeSettings,
    cancel: &CancellationToken,
) -> AggregationOutcome {
    let mut readiness = ComponentReadiness::new();

    for kind in WorkloadKind::ALL {
        let collected = until_cancelled(
            cancel,
            collect(lister, kind, &settings.scope, &settings.component_label),
        )
        .await;
        let instances = match collected {
            Ok(list) => list,
            Err(error) => {
                warn!(%kind, %error, "aggregate: collection aborted");
                return AggregationOutcome {
                    readiness,
                    error: Some(error),
                };
            }
        };
        for inst in instances {
            let ready = inst.workload.is_ready();
            debug!(%kind, name = %inst.name, component = %inst.component, ready, "aggregate: fold");
            readiness.record(&inst.component, ready);
        }
    }

    match until_cancelled(cancel, cni_ready(lister, &settings.cni)).await {
        Ok(ready) => {
            readiness.set(CNI_COMPONENT, ready);
            AggregationOutcome {
                readiness,
                error: None,
            }
        }
        Err(error) => {
            readiness.set(CNI_COMPONENT, false);
            AggregationOutcome {
                readiness,
                error: Some(error),
            }
        }
    }
}

/// All CNI DaemonSets must be ready; zero of them counts as ready.
async fn cni_ready(
    lister: &dyn WorkloadLister,
    cni: &CniCheck,
) -> ReadinessResult<bool> {
    if !cni.enabled {
        return Ok(true);
    }
    let daemon_sets = lister
        .list(WorkloadKind::DaemonSet, &cni.namespace, &cni.label_selector)
        .await?;
    let mut all_ready = true;
    for ds in &daemon_sets {
        if ds.status.kind() != WorkloadKind::DaemonSet {
            return Err(ReadinessError::Extraction {
                kind: WorkloadKind::DaemonSet,
                message: format!("list returned a {} item", ds.status.kind()),
            });
        }
        all_ready = all_ready && ds.is_ready();
    }
    debug!(ns = %cni.namespace, count = daemon_sets.len(), all_ready, "aggregate: cni checked");
    Ok(all_ready)
}
