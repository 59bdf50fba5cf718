//! # krill-runtime-proto
//!
//! Wire types and gRPC clients for the `runtime.v1` container runtime
//! protocol: the narrow RPC surface the kubelet drives to realize Pods,
//! covering sandbox lifecycle, container lifecycle, and image pulls.
//!
//! The message and client types live in [`v1`] and are maintained by hand in
//! prost-generated style, kept in sync with `proto/runtime.proto`. Avoiding
//! build-time codegen keeps `protoc` out of the build environment; the
//! protocol is small enough that drift is caught by the conformance tests in
//! this crate.

pub mod v1;
