//! gRPC-backed implementations of the runtime capability traits.
//!
//! Supports `unix:///path/to.sock` endpoints (the usual deployment, via a
//! tower connector over a Unix stream) and plain `http://` URLs (useful
//! against runtimes exposed over TCP in development).

use std::time::Duration;

use async_trait::async_trait;
use hyper_util::rt::TokioIo;
use krill_runtime_proto::v1 as rt;
use krill_runtime_proto::v1::{ImageServiceClient, RuntimeServiceClient};
use tokio::net::UnixStream;
use tonic::transport::{Channel, Endpoint, Uri};
use tonic::Status;
use tower::service_fn;
use tracing::debug;

use crate::config::Config;
use crate::error::{KubeletError, Result};
use crate::runtime::{ImageService, RuntimeConnector, RuntimeService};

/// Connects a fresh channel to the configured runtime endpoint for each
/// logical operation.
#[derive(Debug, Clone)]
pub struct GrpcConnector {
    endpoint: String,
    call_timeout: Duration,
}

impl GrpcConnector {
    pub fn new(config: &Config) -> Self {
        Self {
            endpoint: config.runtime_endpoint.clone(),
            call_timeout: config.call_timeout,
        }
    }

    async fn connect_channel(&self) -> Result<Channel> {
        let connection = |source| KubeletError::Connection {
            endpoint: self.endpoint.clone(),
            source,
        };

        debug!(endpoint = %self.endpoint, "Connecting to runtime");

        if let Some(path) = self.endpoint.strip_prefix("unix://") {
            let path = path.to_string();
            // The authority is required by the HTTP/2 layer but never used
            // for routing on a Unix socket.
            Endpoint::try_from("http://[::]:50051")
                .map_err(connection)?
                .timeout(self.call_timeout)
                .connect_with_connector(service_fn(move |_: Uri| {
                    let path = path.clone();
                    async move {
                        Ok::<_, std::io::Error>(TokioIo::new(UnixStream::connect(path).await?))
                    }
                }))
                .await
                .map_err(connection)
        } else {
            Endpoint::from_shared(self.endpoint.clone())
                .map_err(connection)?
                .timeout(self.call_timeout)
                .connect()
                .await
                .map_err(connection)
        }
    }
}

#[async_trait]
impl RuntimeConnector for GrpcConnector {
    type Runtime = GrpcRuntime;
    type Image = GrpcImage;

    async fn connect(&self) -> Result<(Self::Runtime, Self::Image)> {
        let channel = self.connect_channel().await?;
        Ok((
            GrpcRuntime {
                channel: channel.clone(),
            },
            GrpcImage { channel },
        ))
    }
}

/// Runtime lifecycle calls over an established channel.
#[derive(Debug, Clone)]
pub struct GrpcRuntime {
    channel: Channel,
}

impl GrpcRuntime {
    fn client(&self) -> RuntimeServiceClient {
        RuntimeServiceClient::new(self.channel.clone())
    }
}

#[async_trait]
impl RuntimeService for GrpcRuntime {
    async fn run_pod_sandbox(
        &self,
        config: rt::PodSandboxConfig,
    ) -> std::result::Result<String, Status> {
        let response = self
            .client()
            .run_pod_sandbox(rt::RunPodSandboxRequest {
                config: Some(config),
            })
            .await?;
        Ok(response.into_inner().pod_sandbox_id)
    }

    async fn stop_pod_sandbox(&self, sandbox_id: &str) -> std::result::Result<(), Status> {
        self.client()
            .stop_pod_sandbox(rt::StopPodSandboxRequest {
                pod_sandbox_id: sandbox_id.to_string(),
            })
            .await?;
        Ok(())
    }

    async fn remove_pod_sandbox(&self, sandbox_id: &str) -> std::result::Result<(), Status> {
        self.client()
            .remove_pod_sandbox(rt::RemovePodSandboxRequest {
                pod_sandbox_id: sandbox_id.to_string(),
            })
            .await?;
        Ok(())
    }

    async fn pod_sandbox_status(
        &self,
        sandbox_id: &str,
    ) -> std::result::Result<rt::PodSandboxStatus, Status> {
        let response = self
            .client()
            .pod_sandbox_status(rt::PodSandboxStatusRequest {
                pod_sandbox_id: sandbox_id.to_string(),
                verbose: false,
            })
            .await?;
        response
            .into_inner()
            .status
            .ok_or_else(|| Status::internal("runtime returned no sandbox status"))
    }

    async fn list_pod_sandboxes(&self) -> std::result::Result<Vec<rt::PodSandbox>, Status> {
        let response = self
            .client()
            .list_pod_sandbox(rt::ListPodSandboxRequest {})
            .await?;
        Ok(response.into_inner().items)
    }

    async fn create_container(
        &self,
        sandbox_id: &str,
        config: rt::ContainerConfig,
        sandbox_config: rt::PodSandboxConfig,
    ) -> std::result::Result<String, Status> {
        let response = self
            .client()
            .create_container(rt::CreateContainerRequest {
                pod_sandbox_id: sandbox_id.to_string(),
                config: Some(config),
                sandbox_config: Some(sandbox_config),
            })
            .await?;
        Ok(response.into_inner().container_id)
    }

    async fn start_container(&self, container_id: &str) -> std::result::Result<(), Status> {
        self.client()
            .start_container(rt::StartContainerRequest {
                container_id: container_id.to_string(),
            })
            .await?;
        Ok(())
    }

    async fn list_containers(
        &self,
        sandbox_id: &str,
    ) -> std::result::Result<Vec<rt::Container>, Status> {
        let response = self
            .client()
            .list_containers(rt::ListContainersRequest {
                filter: Some(rt::ContainerFilter {
                    pod_sandbox_id: sandbox_id.to_string(),
                }),
            })
            .await?;
        Ok(response.into_inner().containers)
    }
}

/// Image transfer calls over an established channel.
#[derive(Debug, Clone)]
pub struct GrpcImage {
    channel: Channel,
}

#[async_trait]
impl ImageService for GrpcImage {
    async fn pull_image(&self, image: &str) -> std::result::Result<(), Status> {
        ImageServiceClient::new(self.channel.clone())
            .pull_image(rt::PullImageRequest {
                image: Some(rt::ImageSpec {
                    image: image.to_string(),
                }),
            })
            .await?;
        Ok(())
    }
}
