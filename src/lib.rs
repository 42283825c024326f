//! stevedore - translate Docker Compose projects into Kubernetes manifests
//!
//! stevedore reads a compose file and emits equivalent Kubernetes
//! resources, with support for:
//!
//! - ReplicationController, Deployment, DaemonSet, and ReplicaSet
//!   workload manifests plus a Service endpoint per compose service
//! - JSON and YAML artifact output
//! - Helm-style chart packaging
//! - Listing, deleting, scaling, and submitting the converted resources
//!   against a cluster API

pub mod chart;
pub mod cluster;
pub mod compose;
pub mod convert;
pub mod error;
pub mod manifest;

pub use error::{Result, StevedoreError};
