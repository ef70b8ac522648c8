use std::collections::BTreeMap;

use chrono::Utc;
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(CustomResource, Deserialize, Serialize, Clone, Debug, JsonSchema, Default)]
#[kube(
    group = "mesh.oaas.io",
    version = "v1alpha1",
    kind = "MeshControlPlane",
    plural = "meshcontrolplanes",
    shortname = "mcp",
    namespaced,
    status = "MeshControlPlaneStatus"
)]
pub struct MeshControlPlaneSpec {
    /// Control plane release to install (e.g., "v2.6")
    pub version: Option<String>,
    /// Installation profiles layered onto the defaults
    pub profiles: Option<Vec<String>>,
}

#[derive(Deserialize, Serialize, Clone, Debug, JsonSchema, Default, PartialEq)]
pub struct MeshControlPlaneStatus {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conditions: Option<Vec<Condition>>,
    /// Free-form summary values (e.g., readyComponentCount = "3/4")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotations: Option<BTreeMap<String, String>>,
}

#[derive(Deserialize, Serialize, Clone, Debug, JsonSchema, PartialEq)]
pub struct Condition {
    #[serde(rename = "type")]
    pub type_: ConditionType,
    pub status: ConditionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<ConditionReason>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(
        rename = "lastTransitionTime",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_transition_time: Option<String>,
}

#[derive(Deserialize, Serialize, Clone, Copy, Debug, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub enum ConditionType {
    Ready,
    Installed,
    Reconciled,
    #[serde(other)]
    Unknown,
}

#[derive(Deserialize, Serialize, Clone, Copy, Debug, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub enum ConditionStatus {
    True,
    False,
    Unknown,
}

#[derive(Deserialize, Serialize, Clone, Copy, Debug, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub enum ConditionReason {
    ComponentsReady,
    ComponentsNotReady,
    ProbeError,
    #[serde(other)]
    Other,
}

impl Condition {
    pub fn new(
        type_: ConditionType,
        status: ConditionStatus,
        reason: ConditionReason,
        message: impl Into<String>,
    ) -> Self {
        Condition {
            type_,
            status,
            reason: Some(reason),
            message: Some(message.into()),
            last_transition_time: None,
        }
    }
}

impl MeshControlPlaneStatus {
    /// Current condition of the given type; a missing one reads as Unknown.
    pub fn condition(&self, type_: ConditionType) -> Condition {
        self.conditions
            .as_ref()
            .and_then(|conds| conds.iter().find(|c| c.type_ == type_))
            .cloned()
            .unwrap_or(Condition {
                type_,
                status: ConditionStatus::Unknown,
                reason: None,
                message: None,
                last_transition_time: None,
            })
    }

    /// Replace the condition with the same type wholesale. The transition
    /// time only moves when the status value changes.
    pub fn set_condition(&mut self, mut incoming: Condition) {
        let conds = self.conditions.get_or_insert_with(Vec::new);
        match conds.iter().position(|c| c.type_ == incoming.type_) {
            Some(idx) => {
                let prev = &conds[idx];
                if prev.status == incoming.status {
                    incoming.last_transition_time =
                        prev.last_transition_time.clone();
                } else {
                    incoming.last_transition_time =
                        Some(Utc::now().to_rfc3339());
                }
                conds[idx] = incoming;
            }
            None => {
                incoming.last_transition_time = Some(Utc::now().to_rfc3339());
                conds.push(incoming);
            }
        }
    }

    pub fn annotation(&self, key: &str) -> Option<&str> {
        self.annotations
            .as_ref()
            .and_then(|a| a.get(key))
            .map(String::as_str)
    }

    pub fn set_annotation(&mut self, key: &str, value: String) {
        self.annotations
            .get_or_insert_with(BTreeMap::new)
            .insert(key.to_string(), value);
    }
}
