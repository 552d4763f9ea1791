//! Inbox routing
//!
//! Inbound activities are routed by their `type` label to a registered
//! `ActivityKernel`. Activity kinds without a kernel are acknowledged as
//! ignored rather than rejected.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use super::activity::{Activity, RemoteActor};
use super::types::ObjectClass;
use crate::error::{KernelError, Result};
use crate::metrics::{ACTIVITIES_RECEIVED_TOTAL, ERRORS_TOTAL};

/// Outcome of handling one activity
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchResult {
    /// A handler ran and reported this outcome
    Routed { class: ObjectClass, outcome: String },
    /// Accepted without running any handler
    Ignored(String),
    /// The resolved object type is in neither type table
    Unrecognized(String),
}

impl fmt::Display for DispatchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchResult::Routed { outcome, .. } => f.write_str(outcome),
            DispatchResult::Ignored(reason) => write!(f, "ok: {reason}."),
            DispatchResult::Unrecognized(label) => write!(f, "Unknown type {label}"),
        }
    }
}

/// Handler for one kind of inbound activity
#[async_trait]
pub trait ActivityKernel: Send + Sync {
    /// Activity `type` label this kernel is registered under.
    fn activity_type(&self) -> &str;

    async fn handle(&self, actor: &RemoteActor, activity: &Activity) -> Result<DispatchResult>;
}

/// Routes inbound activities to the kernel registered for their type
#[derive(Clone, Default)]
pub struct InboxKernel {
    kernels: HashMap<String, Arc<dyn ActivityKernel>>,
}

impl InboxKernel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a kernel, replacing any previous one for the same type.
    pub fn register(mut self, kernel: Arc<dyn ActivityKernel>) -> Self {
        self.kernels
            .insert(kernel.activity_type().to_string(), kernel);
        self
    }

    pub fn handles(&self, activity_type: &str) -> bool {
        self.kernels.contains_key(activity_type)
    }

    /// Dispatch a raw JSON activity
    ///
    /// # Arguments
    /// * `actor` - Actor authenticated by the transport layer
    /// * `activity` - Parsed JSON-LD activity
    ///
    /// # Errors
    /// Rejections apply to this activity only; the caller keeps processing
    /// its queue.
    pub async fn dispatch(
        &self,
        actor: &RemoteActor,
        activity: serde_json::Value,
    ) -> Result<DispatchResult> {
        let result = match Activity::from_value(activity) {
            Ok(activity) => self.dispatch_activity(actor, &activity).await,
            Err(error) => Err(error),
        };

        if let Err(error) = &result {
            ERRORS_TOTAL.with_label_values(&[error.error_type()]).inc();
            tracing::warn!(
                actor = %actor.uri(),
                error_type = error.error_type(),
                %error,
                "Rejected inbound activity"
            );
        }

        result
    }

    async fn dispatch_activity(
        &self,
        actor: &RemoteActor,
        activity: &Activity,
    ) -> Result<DispatchResult> {
        let activity_type = activity.activity_type().ok_or_else(|| {
            KernelError::MalformedActivity("Missing activity type".to_string())
        })?;

        let Some(kernel) = self.kernels.get(activity_type) else {
            ACTIVITIES_RECEIVED_TOTAL
                .with_label_values(&["unrecognized"])
                .inc();
            tracing::info!(
                actor = %actor.uri(),
                activity_type,
                "No kernel for activity type, ignoring"
            );
            return Ok(DispatchResult::Ignored(format!(
                "unrecognized activity type: {activity_type}"
            )));
        };

        ACTIVITIES_RECEIVED_TOTAL
            .with_label_values(&[activity_type])
            .inc();

        let result = kernel.handle(actor, activity).await?;
        tracing::debug!(
            actor = %actor.uri(),
            activity_id = activity.id.as_deref().unwrap_or_default(),
            activity_type,
            outcome = %result,
            "Activity dispatched"
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct FixedKernel;

    #[async_trait]
    impl ActivityKernel for FixedKernel {
        fn activity_type(&self) -> &str {
            "Like"
        }

        async fn handle(
            &self,
            _actor: &RemoteActor,
            _activity: &Activity,
        ) -> Result<DispatchResult> {
            Ok(DispatchResult::Ignored("liked".to_string()))
        }
    }

    fn actor() -> RemoteActor {
        RemoteActor::new("https://a.example/users/1")
    }

    #[tokio::test]
    async fn dispatch_routes_by_activity_type() {
        let inbox = InboxKernel::new().register(Arc::new(FixedKernel));
        assert!(inbox.handles("Like"));

        let result = inbox
            .dispatch(&actor(), json!({ "type": "Like", "object": "https://a.example/notes/1" }))
            .await
            .unwrap();
        assert_eq!(result, DispatchResult::Ignored("liked".to_string()));
        assert_eq!(result.to_string(), "ok: liked.");
    }

    #[tokio::test]
    async fn dispatch_ignores_unregistered_activity_types() {
        let inbox = InboxKernel::new();
        let result = inbox
            .dispatch(&actor(), json!({ "type": "Move", "object": "https://a.example/users/1" }))
            .await
            .unwrap();
        assert_eq!(
            result,
            DispatchResult::Ignored("unrecognized activity type: Move".to_string())
        );
    }

    #[tokio::test]
    async fn dispatch_rejects_missing_activity_type() {
        let inbox = InboxKernel::new().register(Arc::new(FixedKernel));
        let error = inbox
            .dispatch(&actor(), json!({ "object": "https://a.example/notes/1" }))
            .await
            .unwrap_err();
        assert!(matches!(error, KernelError::MalformedActivity(_)));
    }

    #[test]
    fn display_renders_status_strings() {
        assert_eq!(
            DispatchResult::Unrecognized("Tombstone".to_string()).to_string(),
            "Unknown type Tombstone"
        );
        assert_eq!(
            DispatchResult::Routed {
                class: ObjectClass::Post,
                outcome: "ok: deleted".to_string(),
            }
            .to_string(),
            "ok: deleted"
        );
    }
}
