//! Manifest serialization and artifact naming

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;

use crate::error::Result;

/// Wire encoding for generated artifacts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Json,
    Yaml,
}

impl Encoding {
    /// File extension for this encoding
    pub fn extension(self) -> &'static str {
        match self {
            Encoding::Json => "json",
            Encoding::Yaml => "yaml",
        }
    }

    /// Encoding implied by a file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "json" => Some(Encoding::Json),
            "yaml" | "yml" => Some(Encoding::Yaml),
            _ => None,
        }
    }

    /// Render a manifest to this encoding
    pub fn render<T: Serialize>(self, value: &T) -> Result<String> {
        match self {
            Encoding::Json => Ok(serde_json::to_string_pretty(value)?),
            Encoding::Yaml => Ok(serde_yaml::to_string(value)?),
        }
    }

    /// Parse a manifest back from this encoding
    pub fn decode<T: DeserializeOwned>(self, content: &str) -> Result<T> {
        match self {
            Encoding::Json => Ok(serde_json::from_str(content)?),
            Encoding::Yaml => Ok(serde_yaml::from_str(content)?),
        }
    }
}

/// Manifest kinds written as artifacts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    ReplicationController,
    Deployment,
    DaemonSet,
    ReplicaSet,
    Service,
}

impl ArtifactKind {
    /// File-name suffix identifying this kind
    pub fn suffix(self) -> &'static str {
        match self {
            ArtifactKind::ReplicationController => "rc",
            ArtifactKind::Deployment => "deployment",
            ArtifactKind::DaemonSet => "daemonset",
            ArtifactKind::ReplicaSet => "replicaset",
            ArtifactKind::Service => "svc",
        }
    }

    /// Kind implied by a file-name suffix
    pub fn from_suffix(suffix: &str) -> Option<Self> {
        match suffix {
            "rc" => Some(ArtifactKind::ReplicationController),
            "deployment" => Some(ArtifactKind::Deployment),
            "daemonset" => Some(ArtifactKind::DaemonSet),
            "replicaset" => Some(ArtifactKind::ReplicaSet),
            "svc" => Some(ArtifactKind::Service),
            _ => None,
        }
    }
}

/// Artifact file name for a service and manifest kind
pub fn artifact_name(service: &str, kind: ArtifactKind, encoding: Encoding) -> String {
    format!("{}-{}.{}", service, kind.suffix(), encoding.extension())
}

/// Parse `<service>-<suffix>.<ext>` back into its parts
///
/// Files outside the naming convention yield `None`.
pub fn parse_artifact_name(file: &str) -> Option<(String, ArtifactKind, Encoding)> {
    let (stem, ext) = file.rsplit_once('.')?;
    let encoding = Encoding::from_extension(ext)?;
    let (service, suffix) = stem.rsplit_once('-')?;
    if service.is_empty() {
        return None;
    }
    let kind = ArtifactKind::from_suffix(suffix)?;
    Some((service.to_string(), kind, encoding))
}

/// Write one artifact; failures abort the run
pub fn write_artifact(dir: &Path, file: &str, content: &str) -> Result<()> {
    std::fs::write(dir.join(file), content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::config::ServiceConfig;
    use crate::convert::endpoint::build_endpoint;
    use crate::convert::workload::WorkloadSpec;
    use crate::manifest::service::Service;
    use crate::manifest::workload::ReplicationController;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn artifact_names_follow_the_convention() {
        assert_eq!(
            artifact_name("web", ArtifactKind::ReplicationController, Encoding::Json),
            "web-rc.json"
        );
        assert_eq!(
            artifact_name("web", ArtifactKind::DaemonSet, Encoding::Yaml),
            "web-daemonset.yaml"
        );
    }

    #[test]
    fn parse_artifact_name_round_trips() {
        assert_eq!(
            parse_artifact_name("web-svc.yaml"),
            Some(("web".to_string(), ArtifactKind::Service, Encoding::Yaml))
        );
        assert_eq!(
            parse_artifact_name("db-rc.json"),
            Some(("db".to_string(), ArtifactKind::ReplicationController, Encoding::Json))
        );
        // hyphenated service names keep everything before the last dash
        assert_eq!(
            parse_artifact_name("my-app-deployment.json"),
            Some(("my-app".to_string(), ArtifactKind::Deployment, Encoding::Json))
        );
    }

    #[test]
    fn unrelated_files_are_ignored() {
        for file in ["README.md", "web.json", "notes-rc.txt", "-rc.json", "compose.yaml"] {
            assert_eq!(parse_artifact_name(file), None, "{}", file);
        }
    }

    fn sample_service() -> ServiceConfig {
        ServiceConfig {
            image: Some("nginx".to_string()),
            ports: vec!["80:8080".to_string()],
            volumes: vec!["/data:/var/data:rw".to_string()],
            ..Default::default()
        }
    }

    #[test]
    fn controller_round_trips_both_encodings() {
        let mut rng = StdRng::seed_from_u64(1);
        let spec = WorkloadSpec::from_service("web", &sample_service(), &mut rng).unwrap();
        let rc = spec.to_replication_controller();

        for encoding in [Encoding::Json, Encoding::Yaml] {
            let rendered = encoding.render(&rc).unwrap();
            let decoded: ReplicationController = encoding.decode(&rendered).unwrap();
            assert_eq!(decoded, rc);
        }
    }

    #[test]
    fn endpoint_round_trips_both_encodings() {
        let endpoint = build_endpoint("web", &sample_service()).unwrap();

        for encoding in [Encoding::Json, Encoding::Yaml] {
            let rendered = encoding.render(&endpoint).unwrap();
            let decoded: Service = encoding.decode(&rendered).unwrap();
            assert_eq!(decoded, endpoint);
        }
    }

    #[test]
    fn encodings_are_interconvertible() {
        let endpoint = build_endpoint("web", &sample_service()).unwrap();
        let yaml = Encoding::Yaml.render(&endpoint).unwrap();
        let via_yaml: Service = Encoding::Yaml.decode(&yaml).unwrap();
        let json = Encoding::Json.render(&via_yaml).unwrap();
        let via_json: Service = Encoding::Json.decode(&json).unwrap();
        assert_eq!(via_json, endpoint);
    }
}
