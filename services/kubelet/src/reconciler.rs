//! Pod lifecycle reconciliation.
//!
//! Drives the runtime through the full creation sequence for a Pod and
//! answers status queries by translating observed runtime state back into
//! the domain model.
//!
//! ## Contract
//!
//! Each operation is one sequential control flow over one scoped runtime
//! connection. Steps within `create_pod` are strictly ordered: one sandbox
//! creation, then pull, create, start per container, in spec order. On the
//! first failure the operation returns immediately with the failing step;
//! nothing already created is rolled back. Callers that want cleanup after a
//! partial failure invoke [`PodReconciler::teardown_pod`], which is
//! idempotent. Cancellation is checked before every step; a fired token
//! stops the sequence without cleanup for the same reason.

use krill_api::Pod;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::config::Config;
use crate::container::ContainerManager;
use crate::error::{KubeletError, Result, Step};
use crate::runtime::RuntimeConnector;
use crate::sandbox::{sandbox_config_for, SandboxManager, SandboxSummary};
use crate::translate;

/// Reconciles declarative Pods against the container runtime.
pub struct PodReconciler<C: RuntimeConnector> {
    connector: C,
    config: Config,
}

/// Run one step's future unless the caller's token has fired.
async fn guarded<T>(
    cancel: &CancellationToken,
    step: Step,
    fut: impl std::future::Future<Output = Result<T>>,
) -> Result<T> {
    if cancel.is_cancelled() {
        return Err(KubeletError::Cancelled { step });
    }
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(KubeletError::Cancelled { step }),
        result = fut => result,
    }
}

impl<C: RuntimeConnector> PodReconciler<C> {
    pub fn new(connector: C, config: Config) -> Self {
        Self { connector, config }
    }

    /// Bring a Pod into physical existence: create its sandbox, then pull,
    /// create, and start each declared container in spec order.
    ///
    /// Returns the runtime-assigned sandbox ID. The caller must retain it
    /// as the correlation key for later [`PodReconciler::pod_status`] and
    /// [`PodReconciler::teardown_pod`] calls.
    pub async fn create_pod(&self, pod: &Pod, cancel: &CancellationToken) -> Result<String> {
        let (runtime, image) = self.connector.connect().await?;
        let sandboxes = SandboxManager::new(&runtime);
        let containers = ContainerManager::new(&runtime, &image, &self.config);

        let sandbox_config = sandbox_config_for(pod)?;
        let sandbox_id = guarded(
            cancel,
            Step::CreateSandbox,
            sandboxes.create(sandbox_config.clone()),
        )
        .await?;
        info!(
            pod = %pod.metadata.qualified_name(),
            sandbox_id = %sandbox_id,
            "Sandbox created"
        );

        for (index, spec) in pod.spec.containers.iter().enumerate() {
            let pull_step = Step::PullImage {
                index,
                name: spec.name.clone(),
            };
            guarded(cancel, pull_step, containers.pull(index, spec)).await?;

            let create_step = Step::CreateContainer {
                index,
                name: spec.name.clone(),
            };
            let container_id = guarded(
                cancel,
                create_step,
                containers.create(&sandbox_id, &sandbox_config, index, spec),
            )
            .await?;

            let start_step = Step::StartContainer {
                index,
                name: spec.name.clone(),
            };
            guarded(
                cancel,
                start_step,
                containers.start(&container_id, index, spec),
            )
            .await?;

            info!(
                pod = %pod.metadata.qualified_name(),
                container = %spec.name,
                container_id = %container_id,
                "Container running"
            );
        }

        Ok(sandbox_id)
    }

    /// Observe the real state of the Pod behind `sandbox_id` and translate
    /// it into a fully populated domain Pod.
    pub async fn pod_status(
        &self,
        sandbox_id: &str,
        cancel: &CancellationToken,
    ) -> Result<Pod> {
        let (runtime, image) = self.connector.connect().await?;
        let sandboxes = SandboxManager::new(&runtime);
        let containers = ContainerManager::new(&runtime, &image, &self.config);

        let status = guarded(cancel, Step::SandboxStatus, sandboxes.status(sandbox_id)).await?;
        let listed = guarded(cancel, Step::ListContainers, containers.list(sandbox_id)).await?;

        translate::pod_from_runtime(&status, &listed)
    }

    /// Enumerate every sandbox on this node. Callers needing full Pod values
    /// follow up with [`PodReconciler::pod_status`] per entry.
    pub async fn list_pods(&self, cancel: &CancellationToken) -> Result<Vec<SandboxSummary>> {
        let (runtime, _image) = self.connector.connect().await?;
        let sandboxes = SandboxManager::new(&runtime);

        guarded(cancel, Step::ListSandboxes, sandboxes.list()).await
    }

    /// Tear down the Pod behind `sandbox_id`: stop the sandbox, then remove
    /// it. Idempotent, so the orchestration layer can invoke it after a
    /// partial `create_pod` failure without tracking how far creation got.
    pub async fn teardown_pod(
        &self,
        sandbox_id: &str,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let (runtime, _image) = self.connector.connect().await?;
        let sandboxes = SandboxManager::new(&runtime);

        guarded(cancel, Step::StopSandbox, sandboxes.stop(sandbox_id)).await?;
        guarded(cancel, Step::RemoveSandbox, sandboxes.remove(sandbox_id)).await?;

        warn!(sandbox_id = %sandbox_id, "Sandbox torn down");
        Ok(())
    }
}
