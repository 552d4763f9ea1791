//! apkernel binary entry point
//!
//! Replays one inbound activity through the inbox kernel:
//!
//! ```text
//! apkernel <authenticated-actor-uri> [activity.json]
//! ```
//!
//! The activity is read from stdin when no file is given. Executed
//! deletions are written to the audit log instead of a datastore.

use std::path::PathBuf;
use std::sync::Arc;

use apkernel::config;
use apkernel::federation::{DeleteHandler, RemoteActor};
use async_trait::async_trait;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Replay one inbound activity through the inbox kernel
#[derive(Parser, Debug)]
#[command(name = "apkernel")]
#[command(version)]
struct Cli {
    /// URI of the actor authenticated by the transport layer
    actor_uri: String,

    /// Activity JSON file (stdin when omitted)
    activity: Option<PathBuf>,
}

/// Deletion handler that records what would be deleted.
struct AuditLogHandler;

#[async_trait]
impl DeleteHandler for AuditLogHandler {
    async fn delete_note(&self, actor: &RemoteActor, object_uri: &str) -> anyhow::Result<String> {
        tracing::info!(actor = %actor.uri(), object = %object_uri, "Note deletion requested");
        Ok(format!("ok: note {object_uri} deletion recorded"))
    }

    async fn delete_actor(
        &self,
        actor: &RemoteActor,
        object_uri: &str,
    ) -> anyhow::Result<String> {
        tracing::info!(actor = %actor.uri(), object = %object_uri, "Actor deletion requested");
        Ok(format!("ok: actor {object_uri} deletion recorded"))
    }
}

/// Application entry point
///
/// # Setup
/// 1. Parse command line
/// 2. Load configuration from file and environment
/// 3. Initialize tracing/logging from `logging.*`
/// 4. Build the inbox kernel
/// 5. Read and dispatch the activity
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Parse command line
    let cli = Cli::parse();

    // 2. Load configuration
    let config = config::KernelConfig::load()?;

    // 3. Initialize tracing/logging
    if config.logging.is_json() {
        tracing_subscriber::registry()
            .with(config.logging.env_filter())
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(config.logging.env_filter())
            .with(tracing_subscriber::fmt::layer().pretty().with_writer(std::io::stderr))
            .init();
    }

    tracing::info!(
        policy = ?config.federation.delete.policy,
        post_types = config.federation.types.post.len(),
        actor_types = config.federation.types.actor.len(),
        "Configuration loaded"
    );

    // 4. Initialize metrics and inbox kernel
    apkernel::metrics::init_metrics();
    let inbox = apkernel::build_inbox(&config, Arc::new(AuditLogHandler))?;

    // 5. Read and dispatch activity
    let raw = match &cli.activity {
        Some(path) => tokio::fs::read_to_string(path).await?,
        None => std::io::read_to_string(std::io::stdin())?,
    };
    let activity: serde_json::Value = serde_json::from_str(&raw)?;

    let actor = RemoteActor::new(cli.actor_uri);
    let result = inbox.dispatch(&actor, activity).await?;
    println!("{result}");

    tracing::debug!(metrics = %apkernel::metrics::render(), "Dispatch metrics");

    Ok(())
}
