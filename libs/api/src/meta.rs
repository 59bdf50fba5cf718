//! Object identity shared by every API object.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Type identity of an API object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeMeta {
    /// API group/version, e.g. `v1`.
    #[serde(rename = "apiVersion", default)]
    pub api_version: String,

    /// Object kind, e.g. `Pod`.
    #[serde(default)]
    pub kind: String,
}

/// Instance identity of an API object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectMeta {
    /// Object name, unique within a namespace.
    pub name: String,

    /// Namespace the object lives in.
    #[serde(default)]
    pub namespace: String,

    /// Cluster-unique identifier, assigned on admission.
    #[serde(default)]
    pub uid: String,

    /// Free-form key/value labels.
    #[serde(default)]
    pub labels: HashMap<String, String>,

    /// When the object was created. `None` until observed.
    #[serde(rename = "creationTimestamp", default, skip_serializing_if = "Option::is_none")]
    pub creation_timestamp: Option<DateTime<Utc>>,
}

impl ObjectMeta {
    /// Path-style identity string: `namespace/name`.
    pub fn qualified_name(&self) -> String {
        format!("{}/{}", self.namespace, self.name)
    }
}
