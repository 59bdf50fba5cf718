//! Translation between runtime-native state and the domain model.
//!
//! Every function here is pure and total over mapped inputs: a raw state
//! value outside the protocol's enumeration is an [`UnmappedState`] error,
//! never a silent default. This is the forward-compatibility guard for
//! protocol drift; `PodPhase::Unknown` remains reserved for state
//! combinations that are observable but fit no phase rule.
//!
//! [`UnmappedState`]: crate::error::KubeletError::UnmappedState

use chrono::DateTime;
use krill_api::{Container, ContainerState, ObjectMeta, Pod, PodPhase, TypeMeta};
use krill_runtime_proto::v1 as rt;

use crate::error::{KubeletError, Result, StateKind};
use crate::sandbox::{SandboxReadiness, SandboxSummary};

/// Map a raw runtime container state value to its domain counterpart.
pub fn container_state(value: i32) -> Result<ContainerState> {
    match rt::ContainerState::try_from(value) {
        Ok(rt::ContainerState::ContainerCreated) => Ok(ContainerState::Created),
        Ok(rt::ContainerState::ContainerRunning) => Ok(ContainerState::Running),
        Ok(rt::ContainerState::ContainerExited) => Ok(ContainerState::Exited),
        Ok(rt::ContainerState::ContainerUnknown) => Ok(ContainerState::Unknown),
        Err(_) => Err(KubeletError::UnmappedState {
            kind: StateKind::Container,
            value,
        }),
    }
}

/// Map a raw runtime sandbox state value to a readiness flag.
pub fn sandbox_readiness(value: i32) -> Result<SandboxReadiness> {
    match rt::PodSandboxState::try_from(value) {
        Ok(rt::PodSandboxState::SandboxReady) => Ok(SandboxReadiness::Ready),
        Ok(rt::PodSandboxState::SandboxNotready) => Ok(SandboxReadiness::NotReady),
        Err(_) => Err(KubeletError::UnmappedState {
            kind: StateKind::Sandbox,
            value,
        }),
    }
}

/// The Pod phase decision table.
///
/// Rules are evaluated in order; the first match wins:
/// 1. sandbox ready and every container running: `Running`
/// 2. sandbox not ready, or no containers yet, or any container still
///    created-not-started: `Pending`
/// 3. every container exited with code zero: `Succeeded`
/// 4. any container exited with a non-zero code: `Failed`
/// 5. anything else: `Unknown`
pub fn pod_phase(
    readiness: SandboxReadiness,
    containers: &[(ContainerState, i32)],
) -> PodPhase {
    let all_running = !containers.is_empty()
        && containers
            .iter()
            .all(|(state, _)| *state == ContainerState::Running);
    if readiness == SandboxReadiness::Ready && all_running {
        return PodPhase::Running;
    }

    if readiness == SandboxReadiness::NotReady
        || containers.is_empty()
        || containers
            .iter()
            .any(|(state, _)| *state == ContainerState::Created)
    {
        return PodPhase::Pending;
    }

    if containers
        .iter()
        .all(|(state, code)| *state == ContainerState::Exited && *code == 0)
    {
        return PodPhase::Succeeded;
    }

    if containers
        .iter()
        .any(|(state, code)| *state == ContainerState::Exited && *code != 0)
    {
        return PodPhase::Failed;
    }

    PodPhase::Unknown
}

/// Build a domain Container from a runtime container record.
pub fn container_from_runtime(container: &rt::Container) -> Result<Container> {
    let mut out = Container {
        name: container
            .metadata
            .as_ref()
            .map(|m| m.name.clone())
            .unwrap_or_default(),
        image: container
            .image
            .as_ref()
            .map(|i| i.image.clone())
            .unwrap_or_else(|| container.image_ref.clone()),
        labels: container.labels.clone(),
        ..Default::default()
    };
    out.status.state = container_state(container.state)?;
    if container.created_at != 0 {
        out.status.created_at = Some(DateTime::from_timestamp_nanos(container.created_at));
    }
    Ok(out)
}

/// Assemble a fully populated domain Pod from a sandbox status and the
/// sandbox's container list. Identity fields are echoed from the sandbox's
/// stored metadata, not re-supplied by the caller.
pub fn pod_from_runtime(
    status: &rt::PodSandboxStatus,
    containers: &[rt::Container],
) -> Result<Pod> {
    let readiness = sandbox_readiness(status.state)?;

    let mut spec_containers = Vec::with_capacity(containers.len());
    let mut states = Vec::with_capacity(containers.len());
    for container in containers {
        let mapped = container_from_runtime(container)?;
        states.push((mapped.status.state, container.exit_code));
        spec_containers.push(mapped);
    }

    let metadata = status.metadata.clone().unwrap_or_default();
    let mut pod = Pod {
        type_meta: TypeMeta {
            api_version: krill_api::API_VERSION.to_string(),
            kind: "Pod".to_string(),
        },
        metadata: ObjectMeta {
            name: metadata.name,
            namespace: metadata.namespace,
            uid: metadata.uid,
            labels: status.labels.clone(),
            creation_timestamp: (status.created_at != 0)
                .then(|| DateTime::from_timestamp_nanos(status.created_at)),
        },
        ..Default::default()
    };
    pod.spec.containers = spec_containers;
    pod.status.phase = pod_phase(readiness, &states);
    pod.status.pod_ip = status
        .network
        .as_ref()
        .map(|n| n.ip.clone())
        .unwrap_or_default();
    Ok(pod)
}

/// Build a domain sandbox summary from a runtime list entry.
pub fn summary_from_runtime(sandbox: &rt::PodSandbox) -> Result<SandboxSummary> {
    let metadata = sandbox.metadata.clone().unwrap_or_default();
    Ok(SandboxSummary {
        id: sandbox.id.clone(),
        name: metadata.name,
        namespace: metadata.namespace,
        uid: metadata.uid,
        readiness: sandbox_readiness(sandbox.state)?,
        created_at: (sandbox.created_at != 0)
            .then(|| DateTime::from_timestamp_nanos(sandbox.created_at)),
        labels: sandbox.labels.clone(),
    })
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[test]
    fn test_container_state_mapping_is_bijective() {
        assert_eq!(container_state(0).unwrap(), ContainerState::Created);
        assert_eq!(container_state(1).unwrap(), ContainerState::Running);
        assert_eq!(container_state(2).unwrap(), ContainerState::Exited);
        assert_eq!(container_state(3).unwrap(), ContainerState::Unknown);
    }

    #[test]
    fn test_container_state_out_of_range_is_unmapped() {
        let err = container_state(9).unwrap_err();
        assert!(matches!(
            err,
            KubeletError::UnmappedState {
                kind: StateKind::Container,
                value: 9
            }
        ));
    }

    #[test]
    fn test_sandbox_state_out_of_range_is_unmapped() {
        let err = sandbox_readiness(5).unwrap_err();
        assert!(matches!(
            err,
            KubeletError::UnmappedState {
                kind: StateKind::Sandbox,
                value: 5
            }
        ));
    }

    #[rstest]
    // Ready sandbox, all containers running.
    #[case(SandboxReadiness::Ready,
        vec![(ContainerState::Running, 0), (ContainerState::Running, 0)],
        PodPhase::Running)]
    // No containers created yet.
    #[case(SandboxReadiness::Ready, vec![], PodPhase::Pending)]
    // Sandbox not ready trumps container states.
    #[case(SandboxReadiness::NotReady,
        vec![(ContainerState::Running, 0)],
        PodPhase::Pending)]
    // A created-not-started container keeps the pod pending.
    #[case(SandboxReadiness::Ready,
        vec![(ContainerState::Running, 0), (ContainerState::Created, 0)],
        PodPhase::Pending)]
    // All exited zero.
    #[case(SandboxReadiness::Ready,
        vec![(ContainerState::Exited, 0), (ContainerState::Exited, 0)],
        PodPhase::Succeeded)]
    // One non-zero exit among running containers.
    #[case(SandboxReadiness::Ready,
        vec![(ContainerState::Running, 0), (ContainerState::Exited, 137)],
        PodPhase::Failed)]
    // Mixed running and exited-zero fits no rule.
    #[case(SandboxReadiness::Ready,
        vec![(ContainerState::Running, 0), (ContainerState::Exited, 0)],
        PodPhase::Unknown)]
    // A runtime-side Unknown container state fits no rule either.
    #[case(SandboxReadiness::Ready,
        vec![(ContainerState::Unknown, 0)],
        PodPhase::Unknown)]
    fn test_pod_phase_table(
        #[case] readiness: SandboxReadiness,
        #[case] containers: Vec<(ContainerState, i32)>,
        #[case] expected: PodPhase,
    ) {
        assert_eq!(pod_phase(readiness, &containers), expected);
    }

    fn runtime_container(name: &str, state: rt::ContainerState, exit_code: i32) -> rt::Container {
        rt::Container {
            id: format!("ctr-{name}"),
            pod_sandbox_id: "sb-1".to_string(),
            metadata: Some(rt::ContainerMetadata {
                name: name.to_string(),
                attempt: 0,
            }),
            image: Some(rt::ImageSpec {
                image: "busybox:1.36".to_string(),
            }),
            image_ref: "busybox:1.36".to_string(),
            state: state as i32,
            created_at: 1_700_000_000_000_000_000,
            labels: Default::default(),
            exit_code,
        }
    }

    fn runtime_status(state: rt::PodSandboxState) -> rt::PodSandboxStatus {
        rt::PodSandboxStatus {
            id: "sb-1".to_string(),
            metadata: Some(rt::PodSandboxMetadata {
                name: "web".to_string(),
                namespace: "default".to_string(),
                uid: "uid-1".to_string(),
                attempt: 0,
            }),
            state: state as i32,
            created_at: 1_700_000_000_000_000_000,
            network: Some(rt::PodSandboxNetworkStatus {
                ip: "10.0.0.7".to_string(),
            }),
            labels: [("app".to_string(), "web".to_string())].into(),
        }
    }

    #[test]
    fn test_pod_from_runtime_echoes_identity() {
        let status = runtime_status(rt::PodSandboxState::SandboxReady);
        let containers = vec![
            runtime_container("nginx", rt::ContainerState::ContainerRunning, 0),
        ];

        let pod = pod_from_runtime(&status, &containers).unwrap();
        assert_eq!(pod.type_meta.kind, "Pod");
        assert_eq!(pod.metadata.name, "web");
        assert_eq!(pod.metadata.namespace, "default");
        assert_eq!(pod.metadata.uid, "uid-1");
        assert_eq!(pod.status.pod_ip, "10.0.0.7");
        assert_eq!(pod.status.phase, PodPhase::Running);
        assert_eq!(pod.spec.containers.len(), 1);
        assert_eq!(pod.spec.containers[0].name, "nginx");
        assert_eq!(
            pod.spec.containers[0].status.state,
            ContainerState::Running
        );
        assert!(pod.spec.containers[0].status.created_at.is_some());
        assert!(pod.metadata.creation_timestamp.is_some());
    }

    #[test]
    fn test_pod_from_runtime_failed_container_fails_pod() {
        let status = runtime_status(rt::PodSandboxState::SandboxReady);
        let containers = vec![
            runtime_container("nginx", rt::ContainerState::ContainerRunning, 0),
            runtime_container("job", rt::ContainerState::ContainerExited, 2),
        ];

        let pod = pod_from_runtime(&status, &containers).unwrap();
        assert_eq!(pod.status.phase, PodPhase::Failed);
    }

    #[test]
    fn test_pod_from_runtime_unmapped_container_state_errors() {
        let status = runtime_status(rt::PodSandboxState::SandboxReady);
        let mut container = runtime_container("nginx", rt::ContainerState::ContainerRunning, 0);
        container.state = 42;

        let err = pod_from_runtime(&status, &[container]).unwrap_err();
        assert!(matches!(err, KubeletError::UnmappedState { .. }));
    }

    #[test]
    fn test_summary_from_runtime() {
        let sandbox = rt::PodSandbox {
            id: "sb-9".to_string(),
            metadata: Some(rt::PodSandboxMetadata {
                name: "web".to_string(),
                namespace: "prod".to_string(),
                uid: "uid-9".to_string(),
                attempt: 0,
            }),
            state: rt::PodSandboxState::SandboxNotready as i32,
            created_at: 0,
            labels: Default::default(),
        };

        let summary = summary_from_runtime(&sandbox).unwrap();
        assert_eq!(summary.id, "sb-9");
        assert_eq!(summary.namespace, "prod");
        assert_eq!(summary.readiness, SandboxReadiness::NotReady);
        assert!(summary.created_at.is_none());
    }
}
