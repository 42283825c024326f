//! Cluster operations
//!
//! The four operations share the compose service-name keyspace and split
//! into two error policies: `ps` and `up` tolerate individual misses,
//! `delete` and `scale` abort on the first failure.

pub mod client;
pub mod config;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::convert::output::{parse_artifact_name, ArtifactKind, Encoding};
use crate::error::{Result, StevedoreError};
use crate::manifest::service::Service;
use crate::manifest::workload::ReplicationController;
use self::client::ClusterClient;

/// Resource kinds an operation acts on
#[derive(Debug, Clone, Copy, Default)]
pub struct ResourceSelection {
    pub services: bool,
    pub controllers: bool,
}

impl ResourceSelection {
    /// An empty selection means both kinds
    pub fn or_both(self) -> Self {
        if !self.services && !self.controllers {
            Self {
                services: true,
                controllers: true,
            }
        } else {
            self
        }
    }
}

/// List the cluster state for the given service names
///
/// Lookups that miss are logged and skipped; listing continues with the
/// remaining names.
pub async fn ps(
    client: &ClusterClient,
    names: &[String],
    selection: ResourceSelection,
) -> Result<()> {
    if selection.services {
        println!("{:<20}{:<20}{:<20}{:<20}", "NAME", "CLUSTER IP", "PORTS", "SELECTORS");
        for name in names {
            match client.get_service(name).await {
                Ok(service) => println!("{}", format_service_row(&service)),
                Err(StevedoreError::NotFound(_)) => {
                    tracing::debug!("No service found for {}", name);
                }
                Err(err) => return Err(err),
            }
        }
    }

    if selection.controllers {
        println!(
            "{:<15}{:<15}{:<30}{:<10}{:<20}",
            "NAME", "CONTAINERS", "IMAGES", "REPLICAS", "SELECTORS"
        );
        for name in names {
            match client.get_controller(name).await {
                Ok(controller) => println!("{}", format_controller_row(&controller)),
                Err(StevedoreError::NotFound(_)) => {
                    tracing::debug!("No replication controller found for {}", name);
                }
                Err(err) => return Err(err),
            }
        }
    }

    Ok(())
}

fn format_service_row(service: &Service) -> String {
    let ports = service
        .spec
        .ports
        .iter()
        .map(|p| format!("{}({})", p.protocol, p.port))
        .collect::<Vec<_>>()
        .join(",");
    format!(
        "{:<20}{:<20}{:<20}{:<20}",
        service.metadata.name.as_deref().unwrap_or(""),
        service.spec.cluster_ip.as_deref().unwrap_or(""),
        ports,
        join_labels(&service.metadata.labels)
    )
}

fn format_controller_row(controller: &ReplicationController) -> String {
    let containers = &controller.spec.template.spec.containers;
    let names = containers.iter().map(|c| c.name.as_str()).collect::<Vec<_>>().join(",");
    let images = containers.iter().map(|c| c.image.as_str()).collect::<Vec<_>>().join(",");
    format!(
        "{:<15}{:<15}{:<30}{:<10}{:<20}",
        controller.metadata.name.as_deref().unwrap_or(""),
        names,
        images,
        controller.spec.replicas,
        join_labels(&controller.spec.selector)
    )
}

fn join_labels(labels: &BTreeMap<String, String>) -> String {
    labels
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join(",")
}

/// Delete resources for the given service names
///
/// An explicit name restricts the run to that service; any deletion
/// failure is fatal.
pub async fn delete(
    client: &ClusterClient,
    names: &[String],
    selection: ResourceSelection,
    only: Option<&str>,
) -> Result<()> {
    for name in names {
        if only.is_some_and(|only| only != name) {
            continue;
        }

        if selection.services {
            client.delete_service(name).await?;
            println!("Deleted service {}", name);
        }
        if selection.controllers {
            client.delete_controller(name).await?;
            println!("Deleted replication controller {}", name);
        }
    }

    Ok(())
}

/// Scale replication controllers to `replicas`
///
/// The target must be positive; this is checked before any cluster call.
/// Any fetch or update failure is fatal.
pub async fn scale(
    client: &ClusterClient,
    names: &[String],
    replicas: u32,
    only: Option<&str>,
) -> Result<()> {
    if replicas == 0 {
        return Err(StevedoreError::Scale);
    }

    for name in names {
        if only.is_some_and(|only| only != name) {
            continue;
        }

        let mut scale = client.get_scale(name).await?;
        scale.spec.replicas = replicas;
        let updated = client.update_scale(name, &scale).await?;
        println!("Scaling {} to: {}", name, updated.spec.replicas);
    }

    Ok(())
}

/// Artifacts found in a directory, split by submission phase
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ArtifactSet {
    pub services: Vec<(PathBuf, Encoding)>,
    pub controllers: Vec<(PathBuf, Encoding)>,
}

/// Scan a directory for generated artifacts
///
/// Only service and replication-controller artifacts are submitted by
/// `up`; other kinds and unrelated files are ignored.
pub fn scan_artifacts(dir: &Path) -> Result<ArtifactSet> {
    let mut set = ArtifactSet::default();

    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let file_name = entry.file_name();
        let Some(file) = file_name.to_str() else {
            continue;
        };
        let Some((_, kind, encoding)) = parse_artifact_name(file) else {
            continue;
        };
        match kind {
            ArtifactKind::Service => set.services.push((entry.path(), encoding)),
            ArtifactKind::ReplicationController => set.controllers.push((entry.path(), encoding)),
            _ => tracing::debug!("Ignoring artifact {}", file),
        }
    }

    set.services.sort_by(|a, b| a.0.cmp(&b.0));
    set.controllers.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(set)
}

/// Submit previously generated artifacts from `dir` to the cluster
///
/// Services go first so controller selectors resolve against existing
/// endpoints. A failure on one artifact is reported and the rest keep
/// going.
pub async fn up(client: &ClusterClient, dir: &Path) -> Result<()> {
    let set = scan_artifacts(dir)?;

    for (path, encoding) in &set.services {
        if let Err(err) = submit_service(client, path, *encoding).await {
            tracing::error!("Failed to submit {}: {}", path.display(), err);
        }
    }

    for (path, encoding) in &set.controllers {
        if let Err(err) = submit_controller(client, path, *encoding).await {
            tracing::error!("Failed to submit {}: {}", path.display(), err);
        }
    }

    Ok(())
}

async fn submit_service(client: &ClusterClient, path: &Path, encoding: Encoding) -> Result<()> {
    let content = std::fs::read_to_string(path)?;
    let service: Service = encoding.decode(&content)?;
    let created = client.create_service(&service).await?;
    println!(
        "Created service {}",
        created.metadata.name.as_deref().unwrap_or("")
    );
    Ok(())
}

async fn submit_controller(client: &ClusterClient, path: &Path, encoding: Encoding) -> Result<()> {
    let content = std::fs::read_to_string(path)?;
    let controller: ReplicationController = encoding.decode(&content)?;
    let created = client.create_controller(&controller).await?;
    println!(
        "Created replication controller {}",
        created.metadata.name.as_deref().unwrap_or("")
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::config::ClusterConfig;
    use crate::manifest::pod::{Container, ObjectMeta, PodSpec, PodTemplateSpec};
    use crate::manifest::service::{IntOrString, ServicePort, ServiceSpec};
    use crate::manifest::workload::ReplicationControllerSpec;
    use tempfile::tempdir;

    #[tokio::test]
    async fn scale_of_zero_fails_before_any_cluster_call() {
        // unroutable server: reaching it would error differently
        let client = ClusterClient::new(&ClusterConfig {
            server: "http://127.0.0.1:1".to_string(),
            namespace: "default".to_string(),
        })
        .unwrap();

        let err = scale(&client, &["web".to_string()], 0, None).await.unwrap_err();
        assert!(matches!(err, StevedoreError::Scale));
    }

    #[test]
    fn empty_selection_defaults_to_both() {
        let selection = ResourceSelection::default().or_both();
        assert!(selection.services);
        assert!(selection.controllers);

        let selection = ResourceSelection {
            services: true,
            controllers: false,
        }
        .or_both();
        assert!(!selection.controllers);
    }

    #[test]
    fn scan_splits_services_from_controllers() {
        let dir = tempdir().unwrap();
        for file in [
            "web-svc.json",
            "web-rc.json",
            "db-svc.yaml",
            "db-rc.yaml",
            "web-deployment.json",
            "README.md",
        ] {
            std::fs::write(dir.path().join(file), "{}").unwrap();
        }

        let set = scan_artifacts(dir.path()).unwrap();
        let services: Vec<_> = set
            .services
            .iter()
            .map(|(p, _)| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        let controllers: Vec<_> = set
            .controllers
            .iter()
            .map(|(p, _)| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();

        assert_eq!(services, vec!["db-svc.yaml", "web-svc.json"]);
        assert_eq!(controllers, vec!["db-rc.yaml", "web-rc.json"]);
    }

    #[test]
    fn service_row_formats_ports_and_selectors() {
        let service = Service {
            api_version: "v1".to_string(),
            kind: "Service".to_string(),
            metadata: ObjectMeta::named("web")
                .with_labels(BTreeMap::from([("service".to_string(), "web".to_string())])),
            spec: ServiceSpec {
                selector: BTreeMap::new(),
                ports: vec![ServicePort {
                    name: "80".to_string(),
                    port: 80,
                    protocol: "TCP".to_string(),
                    target_port: IntOrString::Int(8080),
                }],
                cluster_ip: Some("10.0.0.1".to_string()),
            },
        };

        let row = format_service_row(&service);
        assert!(row.contains("web"));
        assert!(row.contains("10.0.0.1"));
        assert!(row.contains("TCP(80)"));
        assert!(row.contains("service=web"));
    }

    #[test]
    fn controller_row_formats_containers_and_replicas() {
        let controller = ReplicationController {
            api_version: "v1".to_string(),
            kind: "ReplicationController".to_string(),
            metadata: ObjectMeta::named("web"),
            spec: ReplicationControllerSpec {
                replicas: 3,
                selector: BTreeMap::from([("service".to_string(), "web".to_string())]),
                template: PodTemplateSpec {
                    metadata: ObjectMeta::default(),
                    spec: PodSpec {
                        containers: vec![Container {
                            name: "web".to_string(),
                            image: "nginx".to_string(),
                            ..Default::default()
                        }],
                        ..Default::default()
                    },
                },
            },
        };

        let row = format_controller_row(&controller);
        assert!(row.contains("web"));
        assert!(row.contains("nginx"));
        assert!(row.contains('3'));
        assert!(row.contains("service=web"));
    }
}
