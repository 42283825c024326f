//! Textual mini-format parsers shared by the manifest builders

use crate::error::{Result, StevedoreError};
use crate::manifest::pod::EnvVar;
use rand::Rng;

const NAME_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
const NAME_LEN: usize = 20;

/// Parsed `HOST:CONTAINER[:MODE]` volume entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeSpec {
    pub host_path: String,
    pub container_path: String,
    pub read_only: bool,
}

/// Outcome of parsing a volume entry
///
/// Entries without a `HOST:CONTAINER` separator name a named or anonymous
/// volume; those have no host path to bind and are skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VolumeParse {
    Mount(VolumeSpec),
    Skipped,
}

/// Split a volume entry into host path, container path, and access mode
///
/// Only a mode of exactly `rw` produces a read-write mount; any other
/// third segment, or no third segment, is read-only.
pub fn parse_volume(entry: &str) -> VolumeParse {
    let Some((host, rest)) = entry.split_once(':') else {
        return VolumeParse::Skipped;
    };
    let (container, read_only) = match rest.rsplit_once(':') {
        Some((path, mode)) => (path, mode != "rw"),
        None => (rest, true),
    };
    VolumeParse::Mount(VolumeSpec {
        host_path: host.trim().to_string(),
        container_path: container.trim().to_string(),
        read_only,
    })
}

/// Parsed port entry: the externally exposed port and the container port
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortSpec {
    pub exposed: u32,
    pub container: u32,
}

/// Split a `HOST:CONTAINER` or bare-port entry
pub fn parse_port(entry: &str, service: &str) -> Result<PortSpec> {
    let port_err = || StevedoreError::Port {
        service: service.to_string(),
        port: entry.to_string(),
    };

    match entry.split_once(':') {
        Some((exposed, container)) => {
            let exposed = exposed.trim().parse::<u32>().map_err(|_| port_err())?;
            let container = container.trim().parse::<u32>().map_err(|_| port_err())?;
            Ok(PortSpec { exposed, container })
        }
        None => {
            let port = entry.trim().parse::<u32>().map_err(|_| port_err())?;
            Ok(PortSpec {
                exposed: port,
                container: port,
            })
        }
    }
}

/// Split a `KEY=VALUE` or `KEY:VALUE` environment entry
///
/// The colon form additionally strips one pair of surrounding single
/// quotes from the value.
pub fn parse_env(entry: &str, service: &str) -> Result<EnvVar> {
    if let Some((name, value)) = entry.split_once('=') {
        return Ok(EnvVar {
            name: name.trim().to_string(),
            value: value.trim().to_string(),
        });
    }

    if let Some((name, value)) = entry.split_once(':') {
        let mut value = value.trim();
        if value.contains('\'') {
            value = value.trim_matches('\'');
        }
        return Ok(EnvVar {
            name: name.trim().to_string(),
            value: value.to_string(),
        });
    }

    Err(StevedoreError::EnvEntry {
        service: service.to_string(),
        entry: entry.to_string(),
    })
}

/// Generate a synthetic volume-mount name
///
/// 20 lowercase alphanumerics; collisions within a workload are
/// negligible at this length.
pub fn volume_name(rng: &mut impl Rng) -> String {
    (0..NAME_LEN)
        .map(|_| NAME_ALPHABET[rng.gen_range(0..NAME_ALPHABET.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn volume_defaults_to_read_only() {
        let parsed = parse_volume("/data:/var/data");
        assert_eq!(
            parsed,
            VolumeParse::Mount(VolumeSpec {
                host_path: "/data".to_string(),
                container_path: "/var/data".to_string(),
                read_only: true,
            })
        );
    }

    #[test]
    fn volume_rw_mode() {
        let VolumeParse::Mount(spec) = parse_volume("/data:/var/data:rw") else {
            panic!("expected a mount");
        };
        assert!(!spec.read_only);
        assert_eq!(spec.container_path, "/var/data");
    }

    #[test]
    fn volume_other_modes_are_read_only() {
        for entry in ["/data:/var/data:ro", "/data:/var/data:z"] {
            let VolumeParse::Mount(spec) = parse_volume(entry) else {
                panic!("expected a mount");
            };
            assert!(spec.read_only, "{} should be read-only", entry);
        }
    }

    #[test]
    fn volume_mode_follows_last_separator() {
        let VolumeParse::Mount(spec) = parse_volume("/a:/b:c:rw") else {
            panic!("expected a mount");
        };
        assert_eq!(spec.container_path, "/b:c");
        assert!(!spec.read_only);
    }

    #[test]
    fn volume_without_separator_is_skipped() {
        assert_eq!(parse_volume("named-volume"), VolumeParse::Skipped);
    }

    #[test]
    fn port_with_separator() {
        let spec = parse_port("80:8080", "web").unwrap();
        assert_eq!(spec.exposed, 80);
        assert_eq!(spec.container, 8080);
    }

    #[test]
    fn bare_port_maps_to_both() {
        let spec = parse_port("6379", "redis").unwrap();
        assert_eq!(spec.exposed, 6379);
        assert_eq!(spec.container, 6379);
    }

    #[test]
    fn invalid_port_names_the_service() {
        for entry in ["http", "80:http", "-1:80", "80:-1"] {
            let err = parse_port(entry, "web").unwrap_err();
            let message = err.to_string();
            assert!(message.contains("web"), "{}", message);
            assert!(message.contains(entry), "{}", message);
        }
    }

    #[test]
    fn env_equals_form() {
        let var = parse_env(" PORT = 8080 ", "web").unwrap();
        assert_eq!(var.name, "PORT");
        assert_eq!(var.value, "8080");
    }

    #[test]
    fn env_colon_form_strips_quotes() {
        let var = parse_env("MODE: 'fast'", "web").unwrap();
        assert_eq!(var.name, "MODE");
        assert_eq!(var.value, "fast");

        let var = parse_env("MODE: fast", "web").unwrap();
        assert_eq!(var.value, "fast");
    }

    #[test]
    fn env_without_separator_fails() {
        let err = parse_env("BROKEN", "web").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("BROKEN"));
        assert!(message.contains("web"));
    }

    #[test]
    fn volume_names_are_seedable() {
        let mut a = StdRng::seed_from_u64(7);
        let mut b = StdRng::seed_from_u64(7);
        let name = volume_name(&mut a);
        assert_eq!(name, volume_name(&mut b));
        assert_eq!(name.len(), 20);
        assert!(name.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
    }
}
