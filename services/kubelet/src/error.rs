//! Error taxonomy for pod lifecycle operations.
//!
//! Every failure names the step at which it occurred. Nothing is retried and
//! nothing is swallowed here; retry and compensation policy belong to the
//! orchestration layer above.

use std::fmt;

use thiserror::Error;

/// The remote call a lifecycle operation was executing when it failed.
///
/// Per-container steps carry the container's position in the Pod spec and
/// its name, so partial failures are attributable to a specific container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    CreateSandbox,
    SandboxStatus,
    ListSandboxes,
    StopSandbox,
    RemoveSandbox,
    PullImage { index: usize, name: String },
    CreateContainer { index: usize, name: String },
    StartContainer { index: usize, name: String },
    ListContainers,
}

impl Step {
    /// Position of the affected container in the Pod spec, if this step
    /// operates on a single container.
    pub fn container_index(&self) -> Option<usize> {
        match self {
            Step::PullImage { index, .. }
            | Step::CreateContainer { index, .. }
            | Step::StartContainer { index, .. } => Some(*index),
            _ => None,
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::CreateSandbox => write!(f, "sandbox creation"),
            Step::SandboxStatus => write!(f, "sandbox status query"),
            Step::ListSandboxes => write!(f, "sandbox listing"),
            Step::StopSandbox => write!(f, "sandbox stop"),
            Step::RemoveSandbox => write!(f, "sandbox removal"),
            Step::PullImage { index, name } => {
                write!(f, "image pull for container {} ({})", index, name)
            }
            Step::CreateContainer { index, name } => {
                write!(f, "container creation for container {} ({})", index, name)
            }
            Step::StartContainer { index, name } => {
                write!(f, "container start for container {} ({})", index, name)
            }
            Step::ListContainers => write!(f, "container listing"),
        }
    }
}

/// Which runtime state enumeration produced an unmappable value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateKind {
    Sandbox,
    Container,
}

impl fmt::Display for StateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateKind::Sandbox => write!(f, "sandbox"),
            StateKind::Container => write!(f, "container"),
        }
    }
}

/// Errors from pod lifecycle operations.
#[derive(Debug, Error)]
pub enum KubeletError {
    /// The runtime endpoint could not be reached.
    #[error("failed to connect to runtime at {endpoint}: {source}")]
    Connection {
        endpoint: String,
        #[source]
        source: tonic::transport::Error,
    },

    /// A specific remote call was rejected or errored.
    #[error("{step} failed: {source}")]
    RuntimeCall {
        step: Step,
        #[source]
        source: tonic::Status,
    },

    /// The queried sandbox ID is unknown to the runtime.
    #[error("sandbox {id} not found")]
    SandboxNotFound { id: String },

    /// The runtime reported a state value the translator cannot classify.
    /// A defect signal, never folded into `PodPhase::Unknown`.
    #[error("runtime reported unmapped {kind} state value {value}")]
    UnmappedState { kind: StateKind, value: i32 },

    /// The caller's cancellation token fired before this step completed.
    #[error("operation cancelled at {step}")]
    Cancelled { step: Step },

    /// The Pod value is not usable as a runtime request.
    #[error("invalid pod: {0}")]
    InvalidPod(String),
}

/// Result alias for kubelet operations.
pub type Result<T> = std::result::Result<T, KubeletError>;

impl KubeletError {
    /// Classify a gRPC status for `step`, mapping NOT_FOUND on sandbox
    /// queries to the dedicated variant.
    pub(crate) fn from_status(step: Step, source: tonic::Status, sandbox_id: &str) -> Self {
        if source.code() == tonic::Code::NotFound
            && matches!(
                step,
                Step::SandboxStatus | Step::StopSandbox | Step::RemoveSandbox
            )
        {
            return KubeletError::SandboxNotFound {
                id: sandbox_id.to_string(),
            };
        }
        KubeletError::RuntimeCall { step, source }
    }
}
