//! Delete activity handling
//!
//! A Delete names its target either by bare URI or by an embedded object
//! (often a Tombstone). The target's former type decides whether the
//! note-deletion or actor-deletion handler runs:
//!
//! 1. Bare URI: unknown. The object is gone, so it is not re-fetched.
//! 2. Tombstone: first `formerType` label.
//! 3. Other embedded object: first `type` label.
//! 4. Still unknown and the target is the sender itself: `Person`.
//! 5. Still unknown: `Note`.

use std::sync::Arc;

use async_trait::async_trait;

use super::activity::{Activity, ActivityObject, RemoteActor};
use super::kernel::{ActivityKernel, DispatchResult};
use super::types::{ObjectClass, TypeRegistry};
use crate::config::{DeletePolicy, KernelConfig};
use crate::error::{KernelError, Result};
use crate::metrics::DELETE_DISPATCH_TOTAL;

/// Type assumed for a target that refers to its own sender.
pub const SELF_REFERENCE_TYPE: &str = "Person";
/// Type assumed when nothing else identifies the target.
pub const FALLBACK_TYPE: &str = "Note";

/// Executes deletions resolved by [`DeleteKernel`].
///
/// Implementations look the object up by URI in their own storage and must
/// be idempotent: peers resend the same Delete.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DeleteHandler: Send + Sync {
    async fn delete_note(&self, actor: &RemoteActor, object_uri: &str) -> anyhow::Result<String>;

    async fn delete_actor(&self, actor: &RemoteActor, object_uri: &str)
    -> anyhow::Result<String>;
}

/// Handler that acknowledges every deletion without touching storage.
#[derive(Debug, Clone, Copy, Default)]
pub struct SuppressedDeletes;

#[async_trait]
impl DeleteHandler for SuppressedDeletes {
    async fn delete_note(&self, _actor: &RemoteActor, _object_uri: &str) -> anyhow::Result<String> {
        Ok("ok: deleting note ignored.".to_string())
    }

    async fn delete_actor(
        &self,
        _actor: &RemoteActor,
        _object_uri: &str,
    ) -> anyhow::Result<String> {
        Ok("ok: deleting actor ignored.".to_string())
    }
}

/// Target of a Delete after identifier extraction and type resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteTarget {
    pub object_uri: String,
    pub resolved_type: String,
}

/// Extract the target URI and resolve its former type.
///
/// # Errors
/// `MalformedActivity` when no object identifier can be derived.
pub fn resolve_target(actor: &RemoteActor, activity: &Activity) -> Result<DeleteTarget> {
    let object_uri = activity.object_id()?;

    let declared = match &activity.object {
        Some(ActivityObject::Embedded(description)) if description.is_tombstone() => {
            description.former_type_label()
        }
        Some(ActivityObject::Embedded(description)) => description.type_label(),
        Some(ActivityObject::Uri(_)) | None => None,
    };

    let resolved_type = match declared {
        Some(label) => label,
        None if object_uri == actor.uri() => SELF_REFERENCE_TYPE,
        None => FALLBACK_TYPE,
    };

    Ok(DeleteTarget {
        object_uri: object_uri.to_string(),
        resolved_type: resolved_type.to_string(),
    })
}

/// Kernel for inbound Delete activities
#[derive(Clone)]
pub struct DeleteKernel {
    handler: Arc<dyn DeleteHandler>,
    registry: Arc<TypeRegistry>,
    policy: DeletePolicy,
}

impl DeleteKernel {
    pub fn new(
        handler: Arc<dyn DeleteHandler>,
        registry: TypeRegistry,
        policy: DeletePolicy,
    ) -> Self {
        Self {
            handler,
            registry: Arc::new(registry),
            policy,
        }
    }

    /// Build a kernel from the type tables and policy in `config`.
    pub fn from_config(config: &KernelConfig, handler: Arc<dyn DeleteHandler>) -> Result<Self> {
        let registry = TypeRegistry::from_config(&config.federation.types)?;
        Ok(Self::new(handler, registry, config.federation.delete.policy))
    }

    pub fn policy(&self) -> DeletePolicy {
        self.policy
    }

    /// Authorize, resolve and route one Delete activity.
    ///
    /// # Errors
    /// - `InvalidActor` if the activity claims another author
    /// - `MalformedActivity` if the target has no identifier
    /// - `Handler` if the deletion handler fails
    pub async fn dispatch(
        &self,
        actor: &RemoteActor,
        activity: &Activity,
    ) -> Result<DispatchResult> {
        activity.ensure_authored_by(actor)?;

        let target = resolve_target(actor, activity)?;

        let Some(class) = self.registry.classify(&target.resolved_type) else {
            DELETE_DISPATCH_TOTAL
                .with_label_values(&["unrecognized", "none"])
                .inc();
            tracing::info!(
                actor = %actor.uri(),
                object = %target.object_uri,
                resolved_type = %target.resolved_type,
                "Delete target has unrecognized type"
            );
            return Ok(DispatchResult::Unrecognized(target.resolved_type));
        };

        tracing::debug!(
            actor = %actor.uri(),
            actor_host = actor.host().as_deref().unwrap_or_default(),
            object = %target.object_uri,
            resolved_type = %target.resolved_type,
            object_class = class.as_str(),
            "Routing Delete"
        );

        if self.policy == DeletePolicy::Suppress {
            DELETE_DISPATCH_TOTAL
                .with_label_values(&["ignored", class.as_str()])
                .inc();
            return Ok(DispatchResult::Ignored(format!(
                "deleting {} ignored",
                class.as_str()
            )));
        }

        let outcome = match class {
            ObjectClass::Post => {
                self.handler
                    .delete_note(actor, &target.object_uri)
                    .await
            }
            ObjectClass::Actor => {
                self.handler
                    .delete_actor(actor, &target.object_uri)
                    .await
            }
        }
        .map_err(KernelError::Handler)?;

        DELETE_DISPATCH_TOTAL
            .with_label_values(&["routed", class.as_str()])
            .inc();
        Ok(DispatchResult::Routed { class, outcome })
    }
}

#[async_trait]
impl ActivityKernel for DeleteKernel {
    fn activity_type(&self) -> &str {
        "Delete"
    }

    async fn handle(&self, actor: &RemoteActor, activity: &Activity) -> Result<DispatchResult> {
        self.dispatch(actor, activity).await
    }
}
