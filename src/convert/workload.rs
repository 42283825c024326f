//! Workload spec construction and envelope projection
//!
//! Every field shared by the four workload variants is populated once on
//! a [`WorkloadSpec`], then projected into the thin kind/spec envelopes.
//! This keeps the variants structurally incapable of disagreeing.

use rand::Rng;
use std::collections::BTreeMap;

use super::fields::{self, VolumeParse};
use crate::compose::config::ServiceConfig;
use crate::error::{Result, StevedoreError};
use crate::manifest::pod::{
    Container, ContainerPort, HostPathVolumeSource, ObjectMeta, PodSpec, PodTemplateSpec,
    RestartPolicy, SecurityContext, Volume, VolumeMount,
};
use crate::manifest::workload::{
    DaemonSet, DaemonSetSpec, Deployment, DeploymentSpec, LabelSelector, ReplicaSet,
    ReplicaSetSpec, ReplicationController, ReplicationControllerSpec, API_VERSION_CORE,
    API_VERSION_EXTENSIONS,
};

/// Label key selecting a service's pods
pub const SELECTOR_KEY: &str = "service";

/// Replica count applied at conversion time; scaling is a separate
/// post-conversion cluster operation
const CONVERT_REPLICAS: u32 = 1;

/// Selector tying every manifest of a service to its pods
pub fn selector(name: &str) -> BTreeMap<String, String> {
    BTreeMap::from([(SELECTOR_KEY.to_string(), name.to_string())])
}

/// Seed the selector label, then overlay the service's own labels
pub fn merged_labels(name: &str, labels: &BTreeMap<String, String>) -> BTreeMap<String, String> {
    let mut merged = selector(name);
    for (key, value) in labels {
        merged.insert(key.clone(), value.clone());
    }
    merged
}

/// One service's workload fields, populated once per conversion
#[derive(Debug, Clone)]
pub struct WorkloadSpec {
    name: String,
    labels: BTreeMap<String, String>,
    container: Container,
    volumes: Vec<Volume>,
    restart_policy: RestartPolicy,
}

impl WorkloadSpec {
    /// Build the shared workload fields from one service configuration
    ///
    /// The randomness source generates the synthetic volume-mount names;
    /// tests pass a seeded RNG.
    pub fn from_service(name: &str, service: &ServiceConfig, rng: &mut impl Rng) -> Result<Self> {
        let mut env = Vec::new();
        for entry in service.environment_entries() {
            env.push(fields::parse_env(&entry, name)?);
        }

        let command = service.command_tokens();
        let working_dir = service.working_dir.clone().filter(|dir| !dir.is_empty());

        let mut volume_mounts = Vec::new();
        let mut volumes = Vec::new();
        for entry in &service.volumes {
            match fields::parse_volume(entry) {
                VolumeParse::Mount(spec) => {
                    let volume_name = fields::volume_name(rng);
                    volume_mounts.push(VolumeMount {
                        name: volume_name.clone(),
                        read_only: spec.read_only,
                        mount_path: spec.container_path,
                    });
                    volumes.push(Volume {
                        name: volume_name,
                        host_path: HostPathVolumeSource {
                            path: spec.host_path,
                        },
                    });
                }
                VolumeParse::Skipped => {
                    tracing::warn!("Skipping volume '{}' for service {}: no host path", entry, name);
                }
            }
        }

        let security_context = service
            .privileged
            .unwrap_or(false)
            .then_some(SecurityContext { privileged: true });

        let mut ports = Vec::new();
        for entry in &service.ports {
            let spec = fields::parse_port(entry, name)?;
            ports.push(ContainerPort {
                container_port: spec.container,
            });
        }

        let labels = merged_labels(name, &service.label_map());
        let restart_policy = restart_policy(name, service.restart_policy())?;

        let container = Container {
            name: name.to_string(),
            image: service.image.clone().unwrap_or_default(),
            command,
            working_dir,
            env,
            ports,
            volume_mounts,
            security_context,
        };

        Ok(Self {
            name: name.to_string(),
            labels,
            container,
            volumes,
            restart_policy,
        })
    }

    /// Merged label set shared by every manifest of this service
    pub fn labels(&self) -> &BTreeMap<String, String> {
        &self.labels
    }

    fn metadata(&self) -> ObjectMeta {
        ObjectMeta::named(self.name.clone()).with_labels(self.labels.clone())
    }

    fn pod_template(&self) -> PodTemplateSpec {
        PodTemplateSpec {
            metadata: ObjectMeta::default().with_labels(self.labels.clone()),
            spec: PodSpec {
                containers: vec![self.container.clone()],
                volumes: self.volumes.clone(),
                restart_policy: Some(self.restart_policy),
            },
        }
    }

    pub fn to_replication_controller(&self) -> ReplicationController {
        ReplicationController {
            api_version: API_VERSION_CORE.to_string(),
            kind: "ReplicationController".to_string(),
            metadata: self.metadata(),
            spec: ReplicationControllerSpec {
                replicas: CONVERT_REPLICAS,
                selector: selector(&self.name),
                template: self.pod_template(),
            },
        }
    }

    pub fn to_deployment(&self) -> Deployment {
        Deployment {
            api_version: API_VERSION_EXTENSIONS.to_string(),
            kind: "Deployment".to_string(),
            metadata: self.metadata(),
            spec: DeploymentSpec {
                replicas: CONVERT_REPLICAS,
                selector: LabelSelector {
                    match_labels: selector(&self.name),
                },
                template: self.pod_template(),
            },
        }
    }

    pub fn to_daemon_set(&self) -> DaemonSet {
        DaemonSet {
            api_version: API_VERSION_EXTENSIONS.to_string(),
            kind: "DaemonSet".to_string(),
            metadata: self.metadata(),
            spec: DaemonSetSpec {
                template: self.pod_template(),
            },
        }
    }

    pub fn to_replica_set(&self) -> ReplicaSet {
        ReplicaSet {
            api_version: API_VERSION_EXTENSIONS.to_string(),
            kind: "ReplicaSet".to_string(),
            metadata: self.metadata(),
            spec: ReplicaSetSpec {
                replicas: CONVERT_REPLICAS,
                selector: LabelSelector {
                    match_labels: selector(&self.name),
                },
                template: self.pod_template(),
            },
        }
    }
}

fn restart_policy(service: &str, restart: &str) -> Result<RestartPolicy> {
    match restart {
        "" | "always" => Ok(RestartPolicy::Always),
        "no" => Ok(RestartPolicy::Never),
        "on-failure" => Ok(RestartPolicy::OnFailure),
        other => Err(StevedoreError::RestartPolicy {
            service: service.to_string(),
            policy: other.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::config::EnvironmentConfig;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn web_service() -> ServiceConfig {
        ServiceConfig {
            image: Some("nginx".to_string()),
            environment: Some(EnvironmentConfig::Array(vec!["PORT=8080".to_string()])),
            ports: vec!["80:8080".to_string()],
            volumes: vec!["/data:/var/data:rw".to_string()],
            ..Default::default()
        }
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    #[test]
    fn replication_controller_from_web_service() {
        let spec = WorkloadSpec::from_service("web", &web_service(), &mut rng()).unwrap();
        let rc = spec.to_replication_controller();

        assert_eq!(rc.kind, "ReplicationController");
        assert_eq!(rc.metadata.name.as_deref(), Some("web"));
        assert_eq!(rc.spec.replicas, 1);
        assert_eq!(rc.spec.selector.get("service").map(String::as_str), Some("web"));

        let pod = &rc.spec.template.spec;
        assert_eq!(pod.restart_policy, Some(RestartPolicy::Always));
        assert_eq!(pod.containers.len(), 1);

        let container = &pod.containers[0];
        assert_eq!(container.name, "web");
        assert_eq!(container.image, "nginx");
        assert_eq!(container.env.len(), 1);
        assert_eq!(container.env[0].name, "PORT");
        assert_eq!(container.env[0].value, "8080");
        assert_eq!(container.ports.len(), 1);
        assert_eq!(container.ports[0].container_port, 8080);

        assert_eq!(container.volume_mounts.len(), 1);
        assert!(!container.volume_mounts[0].read_only);
        assert_eq!(container.volume_mounts[0].mount_path, "/var/data");
        assert_eq!(pod.volumes.len(), 1);
        assert_eq!(pod.volumes[0].name, container.volume_mounts[0].name);
        assert_eq!(pod.volumes[0].host_path.path, "/data");
    }

    #[test]
    fn all_variants_share_pod_fields() {
        let mut service = web_service();
        service.working_dir = Some("/srv".to_string());
        service.labels = Some(crate::compose::config::LabelsConfig::Array(vec![
            "tier=frontend".to_string(),
        ]));
        let spec = WorkloadSpec::from_service("web", &service, &mut rng()).unwrap();

        let rc = spec.to_replication_controller();
        let templates = [
            rc.spec.template.clone(),
            spec.to_deployment().spec.template,
            spec.to_daemon_set().spec.template,
            spec.to_replica_set().spec.template,
        ];
        for template in &templates[1..] {
            assert_eq!(template, &templates[0]);
        }

        let metas = [
            rc.metadata.clone(),
            spec.to_deployment().metadata,
            spec.to_daemon_set().metadata,
            spec.to_replica_set().metadata,
        ];
        for meta in &metas[1..] {
            assert_eq!(meta, &metas[0]);
        }
        assert_eq!(metas[0].labels.get("tier").map(String::as_str), Some("frontend"));
        assert_eq!(metas[0].labels.get("service").map(String::as_str), Some("web"));
    }

    #[test]
    fn explicit_labels_overlay_the_selector_seed() {
        let mut labels = BTreeMap::new();
        labels.insert("service".to_string(), "override".to_string());
        let merged = merged_labels("web", &labels);
        assert_eq!(merged.get("service").map(String::as_str), Some("override"));
    }

    #[test]
    fn restart_policy_mapping() {
        for (literal, expected) in [
            ("", RestartPolicy::Always),
            ("always", RestartPolicy::Always),
            ("no", RestartPolicy::Never),
            ("on-failure", RestartPolicy::OnFailure),
        ] {
            assert_eq!(restart_policy("web", literal).unwrap(), expected);
        }
    }

    #[test]
    fn unknown_restart_policy_names_service_and_value() {
        let mut service = web_service();
        service.restart = Some("bogus".to_string());
        let err = WorkloadSpec::from_service("web", &service, &mut rng()).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("bogus"), "{}", message);
        assert!(message.contains("web"), "{}", message);
    }

    #[test]
    fn privileged_sets_security_context() {
        let mut service = web_service();
        service.privileged = Some(true);
        let spec = WorkloadSpec::from_service("web", &service, &mut rng()).unwrap();
        let rc = spec.to_replication_controller();
        let context = rc.spec.template.spec.containers[0]
            .security_context
            .expect("privileged service should carry a security context");
        assert!(context.privileged);

        let spec = WorkloadSpec::from_service("web", &web_service(), &mut rng()).unwrap();
        let rc = spec.to_replication_controller();
        assert!(rc.spec.template.spec.containers[0].security_context.is_none());
    }

    #[test]
    fn volume_names_match_between_mounts_and_volumes() {
        let mut service = web_service();
        service.volumes = vec![
            "/a:/mnt/a".to_string(),
            "/b:/mnt/b:rw".to_string(),
            "unbound".to_string(),
        ];
        let spec = WorkloadSpec::from_service("web", &service, &mut rng()).unwrap();
        let pod = spec.to_replication_controller().spec.template.spec;
        let mounts = &pod.containers[0].volume_mounts;

        // the entry without a host path is skipped
        assert_eq!(mounts.len(), 2);
        assert_eq!(pod.volumes.len(), 2);
        for (mount, volume) in mounts.iter().zip(&pod.volumes) {
            assert_eq!(mount.name, volume.name);
        }
        assert_ne!(mounts[0].name, mounts[1].name);
    }

    #[test]
    fn seeded_rng_makes_volume_names_deterministic() {
        let a = WorkloadSpec::from_service("web", &web_service(), &mut rng()).unwrap();
        let b = WorkloadSpec::from_service("web", &web_service(), &mut rng()).unwrap();
        assert_eq!(
            a.to_replication_controller(),
            b.to_replication_controller()
        );
    }
}
