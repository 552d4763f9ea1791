//! Common test utilities for dispatch tests

use std::sync::{Arc, Mutex};

use apkernel::config::{
    DeleteConfig, DeletePolicy, FederationConfig, KernelConfig, LoggingConfig, TypeTableConfig,
};
use apkernel::federation::{DeleteHandler, InboxKernel, RemoteActor};
use async_trait::async_trait;

pub const ACTOR: &str = "https://a.example/users/1";

/// A deletion that reached the handler
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Deletion {
    Note(String),
    Actor(String),
}

/// Handler that records every call it receives
#[derive(Default)]
pub struct RecordingHandler {
    calls: Mutex<Vec<Deletion>>,
}

impl RecordingHandler {
    pub fn calls(&self) -> Vec<Deletion> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl DeleteHandler for RecordingHandler {
    async fn delete_note(&self, _actor: &RemoteActor, object_uri: &str) -> anyhow::Result<String> {
        self.calls
            .lock()
            .unwrap()
            .push(Deletion::Note(object_uri.to_string()));
        Ok(format!("deleted note {object_uri}"))
    }

    async fn delete_actor(
        &self,
        _actor: &RemoteActor,
        object_uri: &str,
    ) -> anyhow::Result<String> {
        self.calls
            .lock()
            .unwrap()
            .push(Deletion::Actor(object_uri.to_string()));
        Ok(format!("deleted actor {object_uri}"))
    }
}

pub fn test_config(policy: DeletePolicy) -> KernelConfig {
    KernelConfig {
        federation: FederationConfig {
            delete: DeleteConfig { policy },
            types: TypeTableConfig::default(),
        },
        logging: LoggingConfig {
            level: "info".to_string(),
            format: "pretty".to_string(),
        },
    }
}

/// Inbox wired to a fresh recording handler
pub fn test_inbox(policy: DeletePolicy) -> (InboxKernel, Arc<RecordingHandler>) {
    let handler = Arc::new(RecordingHandler::default());
    let inbox = apkernel::build_inbox(&test_config(policy), handler.clone()).unwrap();
    (inbox, handler)
}

pub fn actor() -> RemoteActor {
    RemoteActor::new(ACTOR)
}
