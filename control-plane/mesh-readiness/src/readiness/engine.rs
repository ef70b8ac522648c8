use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};

use super::aggregator::{ProbeSettings, aggregate};
use super::commit::commit_status;
use super::conditions::reconcile_condition;
use super::error::ReadinessError;
use super::traits::{NotificationSink, StatusWriter, WorkloadLister};
use crate::crd::mesh_control_plane::MeshControlPlaneStatus;

/// What a single readiness pass did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PassOutcome {
    pub committed: bool,
    pub error: Option<ReadinessError>,
}

impl PassOutcome {
    pub fn into_result(self) -> Result<bool, ReadinessError> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(self.committed),
        }
    }
}

/// Probe → condition → commit for one managed control plane.
///
/// Callers must not run two passes for the same control plane at once.
pub struct ReadinessEngine {
    lister: Arc<dyn WorkloadLister>,
    writer: Arc<dyn StatusWriter>,
    sink: Arc<dyn NotificationSink>,
    settings: ProbeSettings,
    skip_status_update: bool,
}

impl ReadinessEngine {
    pub fn new(
        lister: Arc<dyn WorkloadLister>,
        writer: Arc<dyn StatusWriter>,
        sink: Arc<dyn NotificationSink>,
        settings: ProbeSettings,
    ) -> Self {
        ReadinessEngine {
            lister,
            writer,
            sink,
            settings,
            skip_status_update: false,
        }
    }

    /// Compute everything but never write status.
    pub fn with_skip_status_update(mut self, skip: bool) -> Self {
        self.skip_status_update = skip;
        self
    }

    pub fn settings(&self) -> &ProbeSettings {
        &self.settings
    }

    /// Run one pass against `status`, which holds the last persisted state
    /// and is updated in place.
    #[instrument(skip_all, fields(ns = %self.settings.scope.namespace))]
    pub async fn update_readiness(
        &self,
        status: &mut MeshControlPlaneStatus,
        cancel: &CancellationToken,
    ) -> PassOutcome {
        info!("Updating control plane readiness state");
        let outcome =
            aggregate(self.lister.as_ref(), &self.settings, cancel).await;
        let decision = reconcile_condition(outcome, status);

        if let Some(n) = &decision.notification {
            if cancel.is_cancelled() {
                debug!(reason = n.reason, "pass cancelled; notification dropped");
            } else {
                self.sink.notify(n.severity, n.reason, &n.message).await;
            }
        }

        let required = decision.commit_required && !self.skip_status_update;
        let (committed, error) = commit_status(
            self.writer.as_ref(),
            status,
            required,
            decision.error,
            cancel,
        )
        .await;
        info!(committed, failed = error.is_some(), "readiness pass complete");
        PassOutcome { committed, error }
    }
}
