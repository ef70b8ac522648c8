use async_trait::async_trait;
use k8s_openapi::api::core::v1::ObjectReference;
use kube::runtime::events::{Event, EventType, Recorder};
use tracing::debug;

use crate::readiness::{NotificationSink, Severity};

pub const ACTION_READINESS: &str = "UpdateReadiness";

/// Publishes readiness notifications as Kubernetes Events on the control
/// plane object. Publish failures are logged and dropped.
pub struct RecorderSink {
    recorder: Recorder,
    reference: ObjectReference,
}

impl RecorderSink {
    pub fn new(recorder: Recorder, reference: ObjectReference) -> Self {
        Self {
            recorder,
            reference,
        }
    }
}

fn event_type(severity: Severity) -> EventType {
    match severity {
        Severity::Normal => EventType::Normal,
        Severity::Warning => EventType::Warning,
    }
}

#[async_trait]
impl NotificationSink for RecorderSink {
    async fn notify(&self, severity: Severity, reason: &str, message: &str) {
        let res = self
            .recorder
            .publish(
                &Event {
                    type_: event_type(severity),
                    reason: reason.into(),
                    note: Some(message.into()),
                    action: ACTION_READINESS.into(),
                    secondary: None,
                },
                &self.reference,
            )
            .await;
        if let Err(e) = res {
            debug!(error = %e, %reason, "event publish failed; dropping");
        }
    }
}
