//! ActivityPub federation module
//!
//! Handles:
//! - Inbound activity parsing
//! - Inbox routing by activity type
//! - Delete target resolution and dispatch
//! - Object type membership tables

mod activity;
mod delete;
mod kernel;
mod types;

pub use activity::{Activity, ActivityObject, ObjectDescription, OneOrMany, RemoteActor, TOMBSTONE};
pub use delete::{
    DeleteHandler, DeleteKernel, DeleteTarget, FALLBACK_TYPE, SELF_REFERENCE_TYPE,
    SuppressedDeletes, resolve_target,
};
pub use kernel::{ActivityKernel, DispatchResult, InboxKernel};
pub use types::{DEFAULT_ACTOR_TYPES, DEFAULT_POST_TYPES, ObjectClass, TypeRegistry};
