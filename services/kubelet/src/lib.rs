//! krill Kubelet Library
//!
//! The kubelet runs on each node and turns declarative Pods into running
//! containers by driving a CRI-compatible runtime over gRPC.
//!
//! ## Architecture
//!
//! - **Reconciler**: Orchestrates the pod lifecycle as strictly ordered
//!   fail-fast sequences (sandbox, then pull/create/start per container)
//! - **Sandbox / Container Managers**: One-step-per-call wrappers over the
//!   runtime that attach step context to failures
//! - **Translate**: Pure mapping from raw runtime state to the domain model,
//!   including the pod phase decision table
//! - **Runtime Traits**: Capability interfaces over the runtime, implemented
//!   by gRPC clients in production and by fakes in tests
//!
//! ## Modules
//!
//! - `config`: Kubelet configuration from environment variables
//! - `error`: Error taxonomy with per-step attribution
//! - `grpc`: tonic-backed implementations of the runtime traits
//! - `reconciler`: Pod lifecycle orchestration

pub mod config;
pub mod container;
pub mod error;
pub mod grpc;
pub mod reconciler;
pub mod runtime;
pub mod sandbox;
pub mod translate;

// Re-export commonly used types
pub use config::Config;
pub use error::{KubeletError, Result, StateKind, Step};
pub use grpc::GrpcConnector;
pub use reconciler::PodReconciler;
pub use runtime::{ImageService, RuntimeConnector, RuntimeService};
pub use sandbox::{SandboxReadiness, SandboxSummary};
