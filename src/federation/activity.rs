//! Inbound activity model
//!
//! Typed view over the loosely-shaped JSON that remote peers send.
//! Parsing is intentionally lenient about which optional fields are
//! present and strict about the shapes of the fields that are.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};

use crate::error::{KernelError, Result};

/// Type label carried by tombstoned objects.
pub const TOMBSTONE: &str = "Tombstone";

/// A JSON-LD property that may hold a single value or an array of values.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    /// First value, if any.
    pub fn first(&self) -> Option<&T> {
        match self {
            OneOrMany::One(value) => Some(value),
            OneOrMany::Many(values) => values.first(),
        }
    }
}

impl OneOrMany<String> {
    /// First label, treating an empty string as no label at all.
    pub fn first_label(&self) -> Option<&str> {
        self.first()
            .map(String::as_str)
            .filter(|label| !label.is_empty())
    }
}

/// Authenticated identity of the peer account that sent an activity.
///
/// Built by the transport layer after signature verification; the kernel
/// only ever reads the URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteActor {
    uri: String,
}

impl RemoteActor {
    pub fn new(uri: impl Into<String>) -> Self {
        Self { uri: uri.into() }
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Host part of the actor URI, for log fields.
    pub fn host(&self) -> Option<String> {
        url::Url::parse(&self.uri)
            .ok()
            .and_then(|url| url.host_str().map(str::to_ascii_lowercase))
    }
}

/// Embedded object description inside an activity's `object` field
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ObjectDescription {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<OneOrMany<String>>,
    #[serde(rename = "formerType", default)]
    pub former_type: Option<OneOrMany<String>>,
}

impl ObjectDescription {
    pub fn type_label(&self) -> Option<&str> {
        self.kind.as_ref().and_then(OneOrMany::first_label)
    }

    pub fn former_type_label(&self) -> Option<&str> {
        self.former_type.as_ref().and_then(OneOrMany::first_label)
    }

    pub fn is_tombstone(&self) -> bool {
        self.type_label() == Some(TOMBSTONE)
    }
}

/// The `object` of an activity: either a bare URI or an embedded description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivityObject {
    Uri(String),
    Embedded(ObjectDescription),
}

impl ActivityObject {
    /// Canonical identifier of the referenced object, independent of its type.
    pub fn id(&self) -> Option<&str> {
        let id = match self {
            ActivityObject::Uri(uri) => uri.as_str(),
            ActivityObject::Embedded(description) => description.id.as_deref()?,
        };
        (!id.is_empty()).then_some(id)
    }
}

impl<'de> Deserialize<'de> for ActivityObject {
    /// Only a JSON string or a JSON object is accepted. Arrays in
    /// particular are rejected rather than read positionally as a struct.
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match serde_json::Value::deserialize(deserializer)? {
            serde_json::Value::String(uri) => Ok(ActivityObject::Uri(uri)),
            value @ serde_json::Value::Object(_) => serde_json::from_value(value)
                .map(ActivityObject::Embedded)
                .map_err(D::Error::custom),
            other => Err(D::Error::custom(format!(
                "object must be a URI or an embedded object, got {other}"
            ))),
        }
    }
}

/// Keeps an explicit `null` distinguishable from an absent field.
fn deserialize_present<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<serde_json::Value>, D::Error>
where
    D: Deserializer<'de>,
{
    serde_json::Value::deserialize(deserializer).map(Some)
}

/// Inbound activity envelope
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Activity {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<OneOrMany<String>>,
    /// Kept as raw JSON: only an exact string match against the
    /// authenticated actor is accepted, any other shape (`null` included)
    /// is a mismatch.
    #[serde(default, deserialize_with = "deserialize_present")]
    pub actor: Option<serde_json::Value>,
    #[serde(default)]
    pub object: Option<ActivityObject>,
}

impl Activity {
    /// Parse an already-decoded JSON document.
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        if !value.is_object() {
            return Err(KernelError::MalformedActivity(
                "activity must be a JSON object".to_string(),
            ));
        }
        Ok(serde_json::from_value(value)?)
    }

    /// First `type` label of the activity itself (e.g. "Delete").
    pub fn activity_type(&self) -> Option<&str> {
        self.kind.as_ref().and_then(OneOrMany::first_label)
    }

    /// Reject the activity when it names an author other than `actor`.
    ///
    /// Comparison is exact string identity with no URI normalization.
    /// Only an absent `actor` field passes; an explicit `null` is rejected.
    pub fn ensure_authored_by(&self, actor: &RemoteActor) -> Result<()> {
        match &self.actor {
            None => Ok(()),
            Some(serde_json::Value::String(claimed)) if claimed == actor.uri() => Ok(()),
            Some(claimed) => Err(KernelError::InvalidActor {
                claimed: match claimed {
                    serde_json::Value::String(uri) => uri.clone(),
                    other => other.to_string(),
                },
                authenticated: actor.uri().to_string(),
            }),
        }
    }

    /// Canonical URI of the activity's target object.
    pub fn object_id(&self) -> Result<&str> {
        let object = self.object.as_ref().ok_or_else(|| {
            KernelError::MalformedActivity("activity has no object".to_string())
        })?;
        object.id().ok_or_else(|| {
            KernelError::MalformedActivity("object has no identifier".to_string())
        })
    }
}
