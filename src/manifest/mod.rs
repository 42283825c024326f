//! Kubernetes manifest model
//!
//! Hand-rolled serde types for the resources the translation engine emits:
//! the shared pod machinery, the four workload envelopes, and the Service
//! network endpoint. Labels and selectors use `BTreeMap` so serialized
//! output is byte-stable across runs.

pub mod pod;
pub mod service;
pub mod workload;

pub use pod::{Container, EnvVar, ObjectMeta, PodSpec, PodTemplateSpec, RestartPolicy};
pub use service::{IntOrString, Service, ServicePort};
pub use workload::{DaemonSet, Deployment, ReplicaSet, ReplicationController, Scale};
