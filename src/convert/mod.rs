//! Compose-to-manifest conversion
//!
//! The orchestrator walks every service in the configuration, builds the
//! workload and endpoint manifests, and writes them as artifacts. A
//! mapping or write failure anywhere aborts the whole run; partial output
//! for a multi-service project is never acceptable.

pub mod endpoint;
pub mod fields;
pub mod output;
pub mod workload;

use rand::Rng;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::chart;
use crate::compose::config::ComposeConfig;
use crate::error::Result;
use crate::manifest::service::Service;
use self::output::{artifact_name, ArtifactKind, Encoding};
use self::workload::WorkloadSpec;

/// Which manifest variants a conversion run materializes
///
/// The replication controller and the endpoint are always produced.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConvertOptions {
    pub deployment: bool,
    pub daemon_set: bool,
    pub replica_set: bool,
    pub chart: bool,
    pub yaml: bool,
}

/// Cross-service state accumulated during a run
#[derive(Debug, Default)]
pub struct Conversion {
    /// Endpoint manifest per service name
    pub endpoints: BTreeMap<String, Service>,
    /// Names appearing as link targets across all services, deduplicated
    /// in first-seen order
    pub links: Vec<String>,
}

/// Conversion orchestrator
pub struct Converter {
    options: ConvertOptions,
    compose_file: PathBuf,
    out_dir: PathBuf,
}

impl Converter {
    pub fn new(options: ConvertOptions, compose_file: PathBuf, out_dir: PathBuf) -> Self {
        Self {
            options,
            compose_file,
            out_dir,
        }
    }

    /// Run-wide artifact encoding
    pub fn encoding(&self) -> Encoding {
        if self.options.yaml {
            Encoding::Yaml
        } else {
            Encoding::Json
        }
    }

    /// Convert every service in the configuration
    ///
    /// Services are processed in name order so repeated runs produce the
    /// same file set.
    pub fn run(&self, config: &ComposeConfig, rng: &mut impl Rng) -> Result<Conversion> {
        let mut conversion = Conversion::default();

        let mut names: Vec<&String> = config.services.keys().collect();
        names.sort();

        for name in &names {
            let service = &config.services[*name];
            let spec = WorkloadSpec::from_service(name, service, rng)?;

            self.write(name, ArtifactKind::ReplicationController, &spec.to_replication_controller())?;
            if self.options.deployment {
                self.write(name, ArtifactKind::Deployment, &spec.to_deployment())?;
            }
            if self.options.daemon_set {
                self.write(name, ArtifactKind::DaemonSet, &spec.to_daemon_set())?;
            }
            if self.options.replica_set {
                self.write(name, ArtifactKind::ReplicaSet, &spec.to_replica_set())?;
            }

            let endpoint = endpoint::build_endpoint(name, service)?;
            self.write(name, ArtifactKind::Service, &endpoint)?;
            conversion.endpoints.insert((*name).clone(), endpoint);

            for link in &service.links {
                let target = link.split_once(':').map(|(t, _)| t).unwrap_or(link);
                if !conversion.links.iter().any(|l| l == target) {
                    conversion.links.push(target.to_string());
                }
            }
        }

        if self.options.chart {
            for name in &names {
                chart::generate(&self.compose_file, name, &self.out_dir)?;
            }
        }

        Ok(conversion)
    }

    fn write<T: Serialize>(&self, service: &str, kind: ArtifactKind, manifest: &T) -> Result<()> {
        let encoding = self.encoding();
        let file = artifact_name(service, kind, encoding);
        let content = encoding.render(manifest)?;
        output::write_artifact(&self.out_dir, &file, &content)?;
        tracing::info!("Wrote {}", file);
        Ok(())
    }
}
