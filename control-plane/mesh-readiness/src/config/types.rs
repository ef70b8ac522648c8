use envconfig::Envconfig;

use crate::readiness::{CniCheck, OwnerScope, ProbeSettings};

#[derive(Envconfig, Clone, Debug)]
pub struct ReadinessConfig {
    #[envconfig(from = "MESH_READINESS_PROFILE", default = "dev")]
    pub profile: String,

    /// Namespace the operator itself runs in; CNI DaemonSets live here.
    #[envconfig(from = "POD_NAMESPACE", default = "mesh-operator")]
    pub operator_namespace: String,

    #[envconfig(nested)]
    pub features: FeaturesConfig,

    #[envconfig(nested)]
    pub labels: LabelConfig,

    /// Compute readiness but never write status back.
    /// Env: MESH_SKIP_STATUS_UPDATE
    #[envconfig(from = "MESH_SKIP_STATUS_UPDATE", default = "false")]
    pub skip_status_update: bool,

    #[envconfig(from = "MESH_REQUEUE_SECS", default = "30")]
    pub requeue_secs: u64,

    #[envconfig(from = "MESH_EVENT_REPORTER", default = "mesh-readiness")]
    pub event_reporter: String,
}

#[derive(Envconfig, Clone, Debug, Default)]
pub struct FeaturesConfig {
    /// If Some, env explicitly set; otherwise, profile defaults apply
    #[envconfig(from = "MESH_FEATURES_CNI")]
    pub cni: Option<bool>,
}

#[derive(Envconfig, Clone, Debug)]
pub struct LabelConfig {
    #[envconfig(from = "MESH_OWNER_LABEL", default = "mesh.oaas.io/owner")]
    pub owner: String,
    #[envconfig(
        from = "MESH_COMPONENT_LABEL",
        default = "app.kubernetes.io/component"
    )]
    pub component: String,
    #[envconfig(from = "MESH_CNI_SELECTOR", default = "mesh.oaas.io/cni=true")]
    pub cni_selector: String,
}

impl ReadinessConfig {
    /// Apply profile → defaults mapping, while respecting explicit env overrides.
    ///
    /// - dev: cni=false
    /// - edge/full: cni=true
    pub fn apply_profile_defaults(mut self) -> Self {
        let def_cni = match self.profile.as_str() {
            "edge" | "full" | "prod" | "production" => true,
            _ /* dev */ => false,
        };
        if self.features.cni.is_none() {
            self.features.cni = Some(def_cni);
        }
        self
    }

    pub fn cni_enabled(&self) -> bool {
        self.features.cni.unwrap_or(false)
    }

    /// Probe settings for the control plane living in `namespace`.
    pub fn probe_settings(&self, namespace: &str) -> ProbeSettings {
        ProbeSettings {
            scope: OwnerScope::for_namespace(namespace, &self.labels.owner),
            component_label: self.labels.component.clone(),
            cni: CniCheck {
                enabled: self.cni_enabled(),
                namespace: self.operator_namespace.clone(),
                label_selector: self.labels.cni_selector.clone(),
            },
        }
    }
}
