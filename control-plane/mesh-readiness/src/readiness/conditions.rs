use tracing::{debug, info};

use super::aggregator::AggregationOutcome;
use super::error::ReadinessError;
use super::traits::Severity;
use crate::crd::mesh_control_plane::{
    Condition, ConditionReason, ConditionStatus, ConditionType,
    MeshControlPlaneStatus,
};

/// Status annotation carrying "<ready>/<total>" components.
pub const READY_COMPONENT_COUNT: &str = "readyComponentCount";

pub const EVENT_REASON_READY: &str = "Ready";
pub const EVENT_REASON_NOT_READY: &str = "NotReady";

pub const MSG_COMPONENTS_READY: &str = "All component deployments are Available";
pub const MSG_COMPONENTS_NOT_READY: &str =
    "Some components are not fully available";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notification {
    pub severity: Severity,
    pub reason: &'static str,
    pub message: String,
}

/// What the reconciler decided for this pass.
#[derive(Clone, Debug)]
pub struct ConditionDecision {
    pub commit_required: bool,
    pub notification: Option<Notification>,
    pub error: Option<ReadinessError>,
}

/// Fold an aggregation outcome into the in-memory status.
///
/// Probe errors always force `Ready=Unknown` and a commit. Otherwise the
/// condition and the summary annotation are rewritten only when the status
/// flips; a pass that changes nothing leaves `status` untouched. A cancelled
/// pass also leaves it untouched and stays silent.
pub fn reconcile_condition(
    outcome: AggregationOutcome,
    status: &mut MeshControlPlaneStatus,
) -> ConditionDecision {
    if let Some(ReadinessError::Cancelled) = outcome.error {
        debug!("reconcile: pass cancelled; leaving status untouched");
        return ConditionDecision {
            commit_required: false,
            notification: None,
            error: Some(ReadinessError::Cancelled),
        };
    }

    if let Some(error) = outcome.error {
        let condition = Condition::new(
            ConditionType::Ready,
            ConditionStatus::Unknown,
            ConditionReason::ProbeError,
            format!("Error collecting ready state: {}", error),
        );
        let message = condition.message.clone().unwrap_or_default();
        status.set_condition(condition);
        return ConditionDecision {
            commit_required: true,
            notification: Some(Notification {
                severity: Severity::Warning,
                reason: EVENT_REASON_NOT_READY,
                message,
            }),
            error: Some(error),
        };
    }

    let (ready, unready) = outcome.readiness.partition();
    for component in &unready {
        info!(%component, "{} resources are not fully available", component);
    }

    let summary = format!("{}/{}", ready.len(), outcome.readiness.len());
    let current = status.condition(ConditionType::Ready).status;
    let mut decision = ConditionDecision {
        commit_required: false,
        notification: None,
        error: None,
    };
    if !unready.is_empty() {
        if current != ConditionStatus::False {
            status.set_condition(Condition::new(
                ConditionType::Ready,
                ConditionStatus::False,
                ConditionReason::ComponentsNotReady,
                MSG_COMPONENTS_NOT_READY,
            ));
            let names = unready.iter().cloned().collect::<Vec<_>>().join(", ");
            status.set_annotation(READY_COMPONENT_COUNT, summary);
            decision.commit_required = true;
            decision.notification = Some(Notification {
                severity: Severity::Warning,
                reason: EVENT_REASON_NOT_READY,
                message: format!(
                    "The following components are not fully available: [{}]",
                    names
                ),
            });
        }
    } else if current != ConditionStatus::True {
        status.set_condition(Condition::new(
            ConditionType::Ready,
            ConditionStatus::True,
            ConditionReason::ComponentsReady,
            MSG_COMPONENTS_READY,
        ));
        status.set_annotation(READY_COMPONENT_COUNT, summary);
        decision.commit_required = true;
        decision.notification = Some(Notification {
            severity: Severity::Normal,
            reason: EVENT_REASON_READY,
            message: MSG_COMPONENTS_READY.to_string(),
        });
    }

    decision
}
