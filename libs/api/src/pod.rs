//! Pod and Container objects plus their lifecycle enums.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::meta::{ObjectMeta, TypeMeta};

/// The declarative unit of scheduling: one sandbox plus its containers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Pod {
    #[serde(flatten)]
    pub type_meta: TypeMeta,

    pub metadata: ObjectMeta,

    #[serde(default)]
    pub spec: PodSpec,

    #[serde(default)]
    pub status: PodStatus,
}

impl Pod {
    /// A Pod value with identity filled in and the correct type tags.
    pub fn new(metadata: ObjectMeta) -> Self {
        Self {
            type_meta: TypeMeta {
                api_version: crate::API_VERSION.to_string(),
                kind: "Pod".to_string(),
            },
            metadata,
            spec: PodSpec::default(),
            status: PodStatus::default(),
        }
    }
}

/// Desired state of a Pod: an ordered sequence of containers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PodSpec {
    #[serde(default)]
    pub containers: Vec<Container>,
}

/// Observed state of a Pod.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PodStatus {
    #[serde(default)]
    pub phase: PodPhase,

    /// IP assigned to the Pod's sandbox, empty until networked.
    #[serde(rename = "podIP", default)]
    pub pod_ip: String,
}

/// A single container within a Pod.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Container {
    pub name: String,

    /// Image reference, e.g. `docker.io/library/nginx:1.27`.
    pub image: String,

    #[serde(default)]
    pub labels: HashMap<String, String>,

    /// Command to run; falls back to the node's default when empty.
    #[serde(default)]
    pub command: Vec<String>,

    /// Working directory; falls back to the node's default when empty.
    #[serde(rename = "workingDir", default)]
    pub working_dir: String,

    #[serde(default)]
    pub status: ContainerStatus,
}

/// Observed state of a container.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContainerStatus {
    #[serde(default)]
    pub state: ContainerState,

    /// When the runtime created the container. `None` until observed.
    #[serde(rename = "createdAt", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Pod lifecycle phase, derived from sandbox and container states.
///
/// Never set directly; [`PodPhase`] values are only produced by the kubelet's
/// state translation rules.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PodPhase {
    /// Sandbox or containers not fully materialized yet.
    #[default]
    Pending,
    /// Sandbox ready and every container running.
    Running,
    /// Every container exited with status zero.
    Succeeded,
    /// At least one container exited with a non-zero status.
    Failed,
    /// Observed states fit no other phase.
    Unknown,
}

impl fmt::Display for PodPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PodPhase::Pending => "Pending",
            PodPhase::Running => "Running",
            PodPhase::Succeeded => "Succeeded",
            PodPhase::Failed => "Failed",
            PodPhase::Unknown => "Unknown",
        };
        write!(f, "{}", s)
    }
}

/// Container lifecycle state.
///
/// Mirrors the runtime's container states one-to-one; `Unknown` is itself a
/// legitimate runtime state, distinct from an unmappable value (which is an
/// error, not a state).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContainerState {
    /// Created but not started.
    #[default]
    Created,
    /// Started and running.
    Running,
    /// Exited, exit code recorded by the runtime.
    Exited,
    /// The runtime could not determine the state.
    Unknown,
}

impl fmt::Display for ContainerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ContainerState::Created => "Created",
            ContainerState::Running => "Running",
            ContainerState::Exited => "Exited",
            ContainerState::Unknown => "Unknown",
        };
        write!(f, "{}", s)
    }
}
