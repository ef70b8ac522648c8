use std::sync::Arc;

use futures_util::StreamExt;
use kube::{
    Client, Resource, ResourceExt,
    api::Api,
    runtime::{
        Controller, controller::Action, events::Recorder, watcher::Config,
    },
};
use tokio::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument};

use crate::config::ReadinessConfig;
use crate::crd::mesh_control_plane::MeshControlPlane;
use crate::readiness::{ReadinessEngine, ReadinessError};

pub mod events;
pub mod lister;
pub mod status;

pub use events::RecorderSink;
pub use lister::KubeWorkloadLister;
pub use status::KubeStatusWriter;

#[derive(thiserror::Error, Debug)]
pub enum ReconcileErr {
    #[error("readiness pass failed: {0}")]
    Readiness(#[from] ReadinessError),
}

#[derive(Clone)]
pub struct ControllerContext {
    pub client: Client,
    pub cfg: ReadinessConfig,
    pub recorder: Recorder,
    /// Cancelled on shutdown; each pass runs on a child token.
    pub shutdown: CancellationToken,
}

pub async fn run_controller(
    client: Client,
    cfg: ReadinessConfig,
    shutdown: CancellationToken,
) -> anyhow::Result<()> {
    let api: Api<MeshControlPlane> = Api::all(client.clone());
    let recorder =
        Recorder::new(client.clone(), cfg.event_reporter.clone().into());
    let ctx = Arc::new(ControllerContext {
        client,
        cfg,
        recorder,
        shutdown,
    });

    Controller::new(api, Config::default())
        .shutdown_on_signal()
        .run(reconcile, error_policy, ctx)
        .for_each(|res| async move {
            match res {
                Ok((obj_ref, action)) => {
                    info!(name = %obj_ref.name, "reconciled: requeue={:?}", action)
                }
                Err(e) => error!(error = ?e, "reconcile error"),
            }
        })
        .await;

    Ok(())
}

#[instrument(skip_all, fields(ns = %obj.namespace().unwrap_or_else(|| "default".into()), name = %obj.name_any()))]
async fn reconcile(
    obj: Arc<MeshControlPlane>,
    ctx: Arc<ControllerContext>,
) -> Result<Action, ReconcileErr> {
    let ns = obj.namespace().unwrap_or_else(|| "default".to_string());
    let name = obj.name_any();

    if obj.meta().deletion_timestamp.is_some() {
        debug!(%ns, %name, "reconcile: control plane deleting; skipping readiness");
        return Ok(Action::await_change());
    }

    let mcp_api: Api<MeshControlPlane> =
        Api::namespaced(ctx.client.clone(), &ns);
    let engine = ReadinessEngine::new(
        Arc::new(KubeWorkloadLister::new(ctx.client.clone())),
        Arc::new(KubeStatusWriter::new(mcp_api, &name)),
        Arc::new(RecorderSink::new(ctx.recorder.clone(), obj.object_ref(&()))),
        ctx.cfg.probe_settings(&ns),
    )
    .with_skip_status_update(ctx.cfg.skip_status_update);

    let mut status = obj.status.clone().unwrap_or_default();
    let cancel = ctx.shutdown.child_token();
    let committed = engine
        .update_readiness(&mut status, &cancel)
        .await
        .into_result()?;
    debug!(%ns, %name, committed, "reconcile: readiness pass done");

    Ok(Action::requeue(Duration::from_secs(ctx.cfg.requeue_secs)))
}

fn error_policy(
    _obj: Arc<MeshControlPlane>,
    error: &ReconcileErr,
    ctx: Arc<ControllerContext>,
) -> Action {
    debug!(%error, "error_policy: requeue");
    Action::requeue(Duration::from_secs(ctx.cfg.requeue_secs))
}
