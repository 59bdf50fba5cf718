//! Capability interfaces onto the container runtime.
//!
//! The reconciler never touches a concrete client; it sees the runtime only
//! through these two narrow traits plus a connector that yields one scoped
//! connection per logical operation. Any implementation with the same
//! contract is substitutable: the gRPC stack in [`crate::grpc`], or a
//! recording fake in tests.

use async_trait::async_trait;
use krill_runtime_proto::v1 as rt;
use tonic::Status;

use crate::error::Result;

/// Sandbox and container lifecycle surface of the runtime.
///
/// Methods speak wire types and wire errors; classification into
/// [`crate::error::KubeletError`] happens in the managers that call them.
#[async_trait]
pub trait RuntimeService: Send + Sync {
    /// Create and start a sandbox, returning its runtime-assigned ID.
    async fn run_pod_sandbox(&self, config: rt::PodSandboxConfig) -> std::result::Result<String, Status>;

    /// Stop a sandbox's containers and reclaim its network resources.
    async fn stop_pod_sandbox(&self, sandbox_id: &str) -> std::result::Result<(), Status>;

    /// Remove a stopped sandbox.
    async fn remove_pod_sandbox(&self, sandbox_id: &str) -> std::result::Result<(), Status>;

    /// Query a sandbox's current status.
    async fn pod_sandbox_status(
        &self,
        sandbox_id: &str,
    ) -> std::result::Result<rt::PodSandboxStatus, Status>;

    /// Enumerate every sandbox known to the runtime on this node.
    async fn list_pod_sandboxes(&self) -> std::result::Result<Vec<rt::PodSandbox>, Status>;

    /// Register a container inside a sandbox, returning its ID.
    async fn create_container(
        &self,
        sandbox_id: &str,
        config: rt::ContainerConfig,
        sandbox_config: rt::PodSandboxConfig,
    ) -> std::result::Result<String, Status>;

    /// Transition a created container to running.
    async fn start_container(&self, container_id: &str) -> std::result::Result<(), Status>;

    /// List containers belonging to a sandbox.
    async fn list_containers(
        &self,
        sandbox_id: &str,
    ) -> std::result::Result<Vec<rt::Container>, Status>;
}

/// Image transfer surface of the runtime.
#[async_trait]
pub trait ImageService: Send + Sync {
    /// Fetch an image. Pulling an already-present image is a no-op success.
    async fn pull_image(&self, image: &str) -> std::result::Result<(), Status>;
}

/// Yields a connected pair of capability handles for one logical operation.
///
/// Implementations must not share mutable state across connections: the pair
/// returned here is owned by a single operation and dropped (releasing the
/// underlying socket) when that operation completes, on every exit path.
#[async_trait]
pub trait RuntimeConnector: Send + Sync {
    type Runtime: RuntimeService;
    type Image: ImageService;

    async fn connect(&self) -> Result<(Self::Runtime, Self::Image)>;
}
