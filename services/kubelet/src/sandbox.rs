//! Sandbox lifecycle against the runtime.
//!
//! One sandbox per Pod; its runtime-assigned ID is the correlation key for
//! every later status query and for all container creation inside it.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use krill_api::Pod;
use krill_runtime_proto::v1 as rt;
use tracing::debug;

use crate::error::{KubeletError, Result, Step};
use crate::runtime::RuntimeService;
use crate::translate;

/// Domain view of a sandbox's readiness.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SandboxReadiness {
    Ready,
    NotReady,
}

impl std::fmt::Display for SandboxReadiness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SandboxReadiness::Ready => write!(f, "Ready"),
            SandboxReadiness::NotReady => write!(f, "NotReady"),
        }
    }
}

/// Domain view of one entry from the runtime's sandbox list.
#[derive(Debug, Clone, PartialEq)]
pub struct SandboxSummary {
    pub id: String,
    pub name: String,
    pub namespace: String,
    pub uid: String,
    pub readiness: SandboxReadiness,
    pub created_at: Option<DateTime<Utc>>,
    pub labels: HashMap<String, String>,
}

/// Build the runtime sandbox configuration from a Pod's identity.
pub fn sandbox_config_for(pod: &Pod) -> Result<rt::PodSandboxConfig> {
    if pod.metadata.name.is_empty() {
        return Err(KubeletError::InvalidPod("pod has no name".to_string()));
    }
    Ok(rt::PodSandboxConfig {
        metadata: Some(rt::PodSandboxMetadata {
            name: pod.metadata.name.clone(),
            namespace: pod.metadata.namespace.clone(),
            uid: pod.metadata.uid.clone(),
            attempt: 0,
        }),
        hostname: String::new(),
        labels: pod.metadata.labels.clone(),
        annotations: HashMap::new(),
    })
}

/// Sandbox operations over one scoped runtime connection.
pub struct SandboxManager<'a, R: RuntimeService> {
    runtime: &'a R,
}

impl<'a, R: RuntimeService> SandboxManager<'a, R> {
    pub fn new(runtime: &'a R) -> Self {
        Self { runtime }
    }

    /// Issue exactly one sandbox creation call. No internal retry; retry is
    /// the caller's policy.
    pub async fn create(&self, config: rt::PodSandboxConfig) -> Result<String> {
        let name = config
            .metadata
            .as_ref()
            .map(|m| m.name.clone())
            .unwrap_or_default();
        let sandbox_id = self
            .runtime
            .run_pod_sandbox(config)
            .await
            .map_err(|status| KubeletError::RuntimeCall {
                step: Step::CreateSandbox,
                source: status,
            })?;
        debug!(pod = %name, sandbox_id = %sandbox_id, "Sandbox created");
        Ok(sandbox_id)
    }

    /// Query one sandbox's status.
    pub async fn status(&self, sandbox_id: &str) -> Result<rt::PodSandboxStatus> {
        self.runtime
            .pod_sandbox_status(sandbox_id)
            .await
            .map_err(|status| KubeletError::from_status(Step::SandboxStatus, status, sandbox_id))
    }

    /// Enumerate every sandbox on this node, translated to domain summaries.
    pub async fn list(&self) -> Result<Vec<SandboxSummary>> {
        let sandboxes = self
            .runtime
            .list_pod_sandboxes()
            .await
            .map_err(|status| KubeletError::RuntimeCall {
                step: Step::ListSandboxes,
                source: status,
            })?;
        sandboxes.iter().map(translate::summary_from_runtime).collect()
    }

    /// Stop a sandbox. Idempotent: an unknown ID counts as already stopped.
    pub async fn stop(&self, sandbox_id: &str) -> Result<()> {
        match self.runtime.stop_pod_sandbox(sandbox_id).await {
            Ok(()) => Ok(()),
            Err(status) if status.code() == tonic::Code::NotFound => Ok(()),
            Err(status) => Err(KubeletError::RuntimeCall {
                step: Step::StopSandbox,
                source: status,
            }),
        }
    }

    /// Remove a sandbox. Idempotent: an unknown ID counts as already removed.
    pub async fn remove(&self, sandbox_id: &str) -> Result<()> {
        match self.runtime.remove_pod_sandbox(sandbox_id).await {
            Ok(()) => Ok(()),
            Err(status) if status.code() == tonic::Code::NotFound => Ok(()),
            Err(status) => Err(KubeletError::RuntimeCall {
                step: Step::RemoveSandbox,
                source: status,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use krill_api::ObjectMeta;

    use super::*;

    #[test]
    fn test_sandbox_config_carries_identity_and_labels() {
        let mut pod = Pod::new(ObjectMeta {
            name: "web".to_string(),
            namespace: "default".to_string(),
            uid: "uid-1".to_string(),
            ..Default::default()
        });
        pod.metadata
            .labels
            .insert("app".to_string(), "web".to_string());

        let config = sandbox_config_for(&pod).unwrap();
        let metadata = config.metadata.unwrap();
        assert_eq!(metadata.name, "web");
        assert_eq!(metadata.namespace, "default");
        assert_eq!(metadata.uid, "uid-1");
        assert_eq!(config.labels.get("app").unwrap(), "web");
    }

    #[test]
    fn test_sandbox_config_rejects_unnamed_pod() {
        let pod = Pod::default();
        assert!(matches!(
            sandbox_config_for(&pod),
            Err(KubeletError::InvalidPod(_))
        ));
    }
}
