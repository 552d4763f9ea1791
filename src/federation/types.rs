//! Object type membership tables
//!
//! Deletion targets are routed by looking their resolved type label up in
//! two disjoint tables instead of branching on individual labels. New
//! federation object types are added through configuration.

use std::collections::HashSet;

use crate::config::TypeTableConfig;
use crate::error::{KernelError, Result};

/// Object types that are deleted as posts.
pub const DEFAULT_POST_TYPES: &[&str] = &[
    "Note", "Question", "Article", "Audio", "Document", "Image", "Page", "Video", "Event",
];

/// Object types that are deleted as actors.
pub const DEFAULT_ACTOR_TYPES: &[&str] =
    &["Person", "Service", "Group", "Organization", "Application"];

/// Which deletion handler a resolved type belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectClass {
    Post,
    Actor,
}

impl ObjectClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectClass::Post => "note",
            ObjectClass::Actor => "actor",
        }
    }
}

/// Post-like and actor-like type tables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeRegistry {
    post: HashSet<String>,
    actor: HashSet<String>,
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self {
            post: DEFAULT_POST_TYPES.iter().map(|s| s.to_string()).collect(),
            actor: DEFAULT_ACTOR_TYPES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl TypeRegistry {
    /// Build a registry from explicit tables.
    ///
    /// # Errors
    /// Returns `KernelError::Config` if a label is empty or appears in both
    /// tables.
    pub fn new<P, A>(post: P, actor: A) -> Result<Self>
    where
        P: IntoIterator,
        P::Item: Into<String>,
        A: IntoIterator,
        A::Item: Into<String>,
    {
        let post: HashSet<String> = post.into_iter().map(Into::into).collect();
        let actor: HashSet<String> = actor.into_iter().map(Into::into).collect();

        if post.iter().chain(actor.iter()).any(|label| label.trim().is_empty()) {
            return Err(KernelError::Config(
                "federation.types entries must not be empty".to_string(),
            ));
        }

        let mut overlap: Vec<&str> = post.intersection(&actor).map(String::as_str).collect();
        if !overlap.is_empty() {
            overlap.sort_unstable();
            return Err(KernelError::Config(format!(
                "federation.types.post and federation.types.actor overlap: {}",
                overlap.join(", ")
            )));
        }

        Ok(Self { post, actor })
    }

    pub fn from_config(config: &TypeTableConfig) -> Result<Self> {
        Self::new(config.post.iter().cloned(), config.actor.iter().cloned())
    }

    /// Add a post-like label.
    pub fn with_post_type(self, label: impl Into<String>) -> Result<Self> {
        let mut post = self.post;
        post.insert(label.into());
        Self::new(post, self.actor)
    }

    /// Add an actor-like label.
    pub fn with_actor_type(self, label: impl Into<String>) -> Result<Self> {
        let mut actor = self.actor;
        actor.insert(label.into());
        Self::new(self.post, actor)
    }

    /// Classify a resolved type label. Matching is case-sensitive.
    pub fn classify(&self, label: &str) -> Option<ObjectClass> {
        if self.post.contains(label) {
            Some(ObjectClass::Post)
        } else if self.actor.contains(label) {
            Some(ObjectClass::Actor)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_tables_classify_known_labels() {
        let registry = TypeRegistry::default();
        for label in DEFAULT_POST_TYPES {
            assert_eq!(registry.classify(label), Some(ObjectClass::Post));
        }
        for label in DEFAULT_ACTOR_TYPES {
            assert_eq!(registry.classify(label), Some(ObjectClass::Actor));
        }
        assert_eq!(registry.classify("Tombstone"), None);
        assert_eq!(registry.classify("note"), None);
    }

    #[test]
    fn new_types_are_added_as_data() {
        let registry = TypeRegistry::default()
            .with_post_type("ChatMessage")
            .unwrap()
            .with_actor_type("Bot")
            .unwrap();
        assert_eq!(registry.classify("ChatMessage"), Some(ObjectClass::Post));
        assert_eq!(registry.classify("Bot"), Some(ObjectClass::Actor));
    }

    #[test]
    fn overlapping_tables_are_rejected() {
        let error = TypeRegistry::default()
            .with_actor_type("Note")
            .expect_err("Note cannot be both post-like and actor-like");
        assert!(matches!(
            error,
            KernelError::Config(message) if message.contains("Note")
        ));
    }

    #[test]
    fn empty_labels_are_rejected() {
        assert!(TypeRegistry::new(["Note", " "], ["Person"]).is_err());
    }
}
