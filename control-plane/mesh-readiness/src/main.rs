use envconfig::Envconfig;
use kube::Client;
use mesh_readiness::{
    config::ReadinessConfig, controller::run_controller, init_tracing,
};
use tokio_util::sync::CancellationToken;
use tracing::info;

#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    init_tracing("info");

    if let Err(e) = rustls::crypto::CryptoProvider::install_default(
        rustls::crypto::aws_lc_rs::default_provider(),
    ) {
        tracing::debug!(
            ?e,
            "CryptoProvider already installed or incompatible; proceeding"
        );
    }

    let cfg = ReadinessConfig::init_from_env()?.apply_profile_defaults();
    info!(?cfg, "Starting mesh readiness controller");

    let shutdown = CancellationToken::new();
    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("shutdown signal received; cancelling in-flight passes");
                shutdown.cancel();
            }
        });
    }

    let client = Client::try_default().await?;
    run_controller(client, cfg, shutdown).await
}
