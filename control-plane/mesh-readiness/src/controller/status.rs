use async_trait::async_trait;
use kube::api::{Api, Patch, PatchParams};
use serde_json::json;
use tracing::trace;

use crate::crd::mesh_control_plane::{MeshControlPlane, MeshControlPlaneStatus};
use crate::readiness::{ReadinessError, ReadinessResult, StatusWriter};

/// Writes status through the `/status` subresource of one control plane.
pub struct KubeStatusWriter {
    api: Api<MeshControlPlane>,
    name: String,
}

impl KubeStatusWriter {
    pub fn new(api: Api<MeshControlPlane>, name: &str) -> Self {
        Self {
            api,
            name: name.to_string(),
        }
    }
}

#[async_trait]
impl StatusWriter for KubeStatusWriter {
    async fn persist(
        &self,
        status: &MeshControlPlaneStatus,
    ) -> ReadinessResult<()> {
        let patch = json!({ "status": status });
        trace!(name = %self.name, "status: patching");
        self.api
            .patch_status(&self.name, &PatchParams::default(), &Patch::Merge(&patch))
            .await
            .map_err(ReadinessError::persist)?;
        Ok(())
    }
}
