use kube::core::CustomResourceExt;
use mesh_readiness::crd::mesh_control_plane::MeshControlPlane;

fn main() -> anyhow::Result<()> {
    let crd = MeshControlPlane::crd();
    println!("{}", serde_yaml::to_string(&crd)?);
    Ok(())
}
