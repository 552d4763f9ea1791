//! apkernel - inbound ActivityPub Delete dispatch
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 Transport (external)                         │
//! │  - HTTP signature verification                              │
//! │  - JSON parsing, queue consumption                          │
//! └─────────────────────────────────────────────────────────────┘
//!                              │ (RemoteActor, activity JSON)
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      InboxKernel                             │
//! │  - Routes by activity type                                  │
//! │  - DeleteKernel: authorize, resolve target type, route      │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 DeleteHandler (external)                     │
//! │  - delete_note / delete_actor                               │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - `federation`: Activity model, inbox routing, Delete kernel
//! - `config`: Configuration management
//! - `error`: Error types
//! - `metrics`: Prometheus instruments

pub mod config;
pub mod error;
pub mod federation;
pub mod metrics;

use std::sync::Arc;

/// Build the inbox with every kernel this crate provides.
///
/// Shared by the binary and integration tests so kernel registration stays
/// consistent.
pub fn build_inbox(
    config: &config::KernelConfig,
    delete_handler: Arc<dyn federation::DeleteHandler>,
) -> Result<federation::InboxKernel, error::KernelError> {
    let delete = federation::DeleteKernel::from_config(config, delete_handler)?;

    tracing::info!(
        policy = ?delete.policy(),
        "Delete kernel initialized"
    );
    if delete.policy() == config::DeletePolicy::Suppress {
        tracing::warn!("Delete activities are acknowledged without running deletion handlers");
    }

    Ok(federation::InboxKernel::new().register(Arc::new(delete)))
}
