//! # krill-api
//!
//! Domain object model for the krill platform.
//!
//! These are the declarative objects exchanged between the apiserver, the
//! kubelet, and the CLI. They carry no behavior beyond identity helpers;
//! lifecycle logic lives in the components that consume them.
//!
//! ## Design principles
//!
//! - Objects are plain serde values; YAML manifests and JSON API bodies use
//!   the same types.
//! - Status fields are only ever filled in from observed runtime state,
//!   never invented by producers of specs.
//! - Every runtime-native state has a distinct domain counterpart, so state
//!   translation is lossless in both directions.

mod meta;
mod pod;

pub use meta::{ObjectMeta, TypeMeta};
pub use pod::{
    Container, ContainerState, ContainerStatus, Pod, PodPhase, PodSpec, PodStatus,
};

/// API version tag stamped on objects produced by this workspace.
pub const API_VERSION: &str = "v1";
