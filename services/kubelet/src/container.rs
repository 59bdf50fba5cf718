//! Per-container lifecycle against the runtime: pull, create, start, list.

use krill_api::Container;
use krill_runtime_proto::v1 as rt;
use tracing::debug;

use crate::config::Config;
use crate::error::{KubeletError, Result, Step};
use crate::runtime::{ImageService, RuntimeService};

/// Container operations over one scoped runtime connection.
pub struct ContainerManager<'a, R: RuntimeService, I: ImageService> {
    runtime: &'a R,
    image: &'a I,
    config: &'a Config,
}

impl<'a, R: RuntimeService, I: ImageService> ContainerManager<'a, R, I> {
    pub fn new(runtime: &'a R, image: &'a I, config: &'a Config) -> Self {
        Self {
            runtime,
            image,
            config,
        }
    }

    /// Build the runtime container configuration for one container spec,
    /// applying the node's default command and working directory when the
    /// spec does not override them.
    pub fn container_config_for(&self, spec: &Container) -> rt::ContainerConfig {
        let command = if spec.command.is_empty() {
            self.config.default_command.clone()
        } else {
            spec.command.clone()
        };
        let working_dir = if spec.working_dir.is_empty() {
            self.config.default_working_dir.clone()
        } else {
            spec.working_dir.clone()
        };
        rt::ContainerConfig {
            metadata: Some(rt::ContainerMetadata {
                name: spec.name.clone(),
                attempt: 0,
            }),
            image: Some(rt::ImageSpec {
                image: spec.image.clone(),
            }),
            command,
            args: Vec::new(),
            working_dir,
            labels: spec.labels.clone(),
        }
    }

    /// Fetch the container's image. Re-issues the pull every time; no local
    /// pull cache is consulted.
    pub async fn pull(&self, index: usize, spec: &Container) -> Result<()> {
        self.image
            .pull_image(&spec.image)
            .await
            .map_err(|status| KubeletError::RuntimeCall {
                step: Step::PullImage {
                    index,
                    name: spec.name.clone(),
                },
                source: status,
            })?;
        debug!(container = %spec.name, image = %spec.image, "Image pulled");
        Ok(())
    }

    /// Register the container inside its Pod's sandbox.
    pub async fn create(
        &self,
        sandbox_id: &str,
        sandbox_config: &rt::PodSandboxConfig,
        index: usize,
        spec: &Container,
    ) -> Result<String> {
        let container_id = self
            .runtime
            .create_container(
                sandbox_id,
                self.container_config_for(spec),
                sandbox_config.clone(),
            )
            .await
            .map_err(|status| KubeletError::RuntimeCall {
                step: Step::CreateContainer {
                    index,
                    name: spec.name.clone(),
                },
                source: status,
            })?;
        debug!(container = %spec.name, container_id = %container_id, "Container created");
        Ok(container_id)
    }

    /// Transition a created container to running.
    pub async fn start(&self, container_id: &str, index: usize, spec: &Container) -> Result<()> {
        self.runtime
            .start_container(container_id)
            .await
            .map_err(|status| KubeletError::RuntimeCall {
                step: Step::StartContainer {
                    index,
                    name: spec.name.clone(),
                },
                source: status,
            })?;
        debug!(container = %spec.name, container_id = %container_id, "Container started");
        Ok(())
    }

    /// List the containers belonging to one sandbox.
    pub async fn list(&self, sandbox_id: &str) -> Result<Vec<rt::Container>> {
        self.runtime
            .list_containers(sandbox_id)
            .await
            .map_err(|status| KubeletError::RuntimeCall {
                step: Step::ListContainers,
                source: status,
            })
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use tonic::Status;

    use crate::runtime::RuntimeService;

    use super::*;

    // A runtime that rejects everything; only the config builder and error
    // annotation are under test here.
    struct RejectingRuntime;

    #[async_trait]
    impl RuntimeService for RejectingRuntime {
        async fn run_pod_sandbox(
            &self,
            _config: rt::PodSandboxConfig,
        ) -> std::result::Result<String, Status> {
            Err(Status::internal("rejected"))
        }

        async fn stop_pod_sandbox(&self, _id: &str) -> std::result::Result<(), Status> {
            Err(Status::internal("rejected"))
        }

        async fn remove_pod_sandbox(&self, _id: &str) -> std::result::Result<(), Status> {
            Err(Status::internal("rejected"))
        }

        async fn pod_sandbox_status(
            &self,
            _id: &str,
        ) -> std::result::Result<rt::PodSandboxStatus, Status> {
            Err(Status::internal("rejected"))
        }

        async fn list_pod_sandboxes(&self) -> std::result::Result<Vec<rt::PodSandbox>, Status> {
            Err(Status::internal("rejected"))
        }

        async fn create_container(
            &self,
            _sandbox_id: &str,
            _config: rt::ContainerConfig,
            _sandbox_config: rt::PodSandboxConfig,
        ) -> std::result::Result<String, Status> {
            Err(Status::internal("rejected"))
        }

        async fn start_container(&self, _id: &str) -> std::result::Result<(), Status> {
            Err(Status::internal("rejected"))
        }

        async fn list_containers(
            &self,
            _sandbox_id: &str,
        ) -> std::result::Result<Vec<rt::Container>, Status> {
            Err(Status::internal("rejected"))
        }
    }

    struct RejectingImages;

    #[async_trait]
    impl ImageService for RejectingImages {
        async fn pull_image(&self, _image: &str) -> std::result::Result<(), Status> {
            Err(Status::unavailable("registry down"))
        }
    }

    fn spec(name: &str) -> Container {
        Container {
            name: name.to_string(),
            image: "busybox:1.36".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_default_command_applied_when_spec_omits_one() {
        let config = Config::default();
        let manager = ContainerManager::new(&RejectingRuntime, &RejectingImages, &config);

        let built = manager.container_config_for(&spec("web"));
        assert_eq!(built.command, config.default_command);
        assert_eq!(built.working_dir, config.default_working_dir);
    }

    #[test]
    fn test_spec_command_overrides_default() {
        let config = Config::default();
        let manager = ContainerManager::new(&RejectingRuntime, &RejectingImages, &config);

        let mut custom = spec("web");
        custom.command = vec!["/app/server".to_string()];
        custom.working_dir = "/app".to_string();

        let built = manager.container_config_for(&custom);
        assert_eq!(built.command, vec!["/app/server".to_string()]);
        assert_eq!(built.working_dir, "/app");
        assert_eq!(built.metadata.unwrap().name, "web");
    }

    #[tokio::test]
    async fn test_pull_failure_names_container() {
        let config = Config::default();
        let manager = ContainerManager::new(&RejectingRuntime, &RejectingImages, &config);

        let err = manager.pull(2, &spec("sidecar")).await.unwrap_err();
        match err {
            KubeletError::RuntimeCall { step, .. } => {
                assert_eq!(step.container_index(), Some(2));
                assert!(step.to_string().contains("sidecar"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_create_failure_names_step() {
        let config = Config::default();
        let manager = ContainerManager::new(&RejectingRuntime, &RejectingImages, &config);
        let sandbox_config = rt::PodSandboxConfig::default();

        let err = manager
            .create("sb-1", &sandbox_config, 0, &spec("web"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            KubeletError::RuntimeCall {
                step: Step::CreateContainer { index: 0, .. },
                ..
            }
        ));
    }
}
