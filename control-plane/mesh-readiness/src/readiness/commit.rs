use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

use super::error::{ReadinessError, ReadinessResult};
use super::traits::StatusWriter;
use super::until_cancelled;
use crate::crd::mesh_control_plane::MeshControlPlaneStatus;

/// Pick the error a pass reports when both the probe and the status write
/// may have failed. The probe error wins; a persist error only surfaces on
/// its own. A persist error that loses is logged here.
pub fn prioritize_errors(
    probe: Option<ReadinessError>,
    persist: Option<ReadinessError>,
) -> Option<ReadinessError> {
    match (probe, persist) {
        (Some(probe), Some(persist)) => {
            error!(error = %persist, "Error updating status");
            Some(probe)
        }
        (Some(probe), None) => Some(probe),
        (None, persist) => persist,
    }
}

/// Persist `status` when a commit is required. Returns whether a write
/// happened and the error the pass should report.
pub async fn commit_status(
    writer: &dyn StatusWriter,
    status: &MeshControlPlaneStatus,
    required: bool,
    probe_error: Option<ReadinessError>,
    cancel: &CancellationToken,
) -> (bool, Option<ReadinessError>) {
    if !required {
        debug!("commit: status unchanged; skipping write");
        return (false, probe_error);
    }
    let persisted: ReadinessResult<()> =
        until_cancelled(cancel, writer.persist(status)).await;
    let committed = persisted.is_ok();
    (committed, prioritize_errors(probe_error, persisted.err()))
}
