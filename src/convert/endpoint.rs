//! Network endpoint (Service) builder

use super::fields;
use super::workload::{merged_labels, selector};
use crate::compose::config::ServiceConfig;
use crate::error::Result;
use crate::manifest::pod::ObjectMeta;
use crate::manifest::service::{IntOrString, Service, ServicePort, ServiceSpec};
use crate::manifest::workload::API_VERSION_CORE;

/// Protocol applied to every generated service port
const PORT_PROTOCOL: &str = "TCP";

/// Build the endpoint manifest exposing a service's ports
///
/// Carries the same merged labels and selector as the workload manifests
/// for the same service name.
pub fn build_endpoint(name: &str, service: &ServiceConfig) -> Result<Service> {
    let mut ports = Vec::new();
    for entry in &service.ports {
        let spec = fields::parse_port(entry, name)?;
        ports.push(ServicePort {
            name: spec.exposed.to_string(),
            port: spec.exposed,
            protocol: PORT_PROTOCOL.to_string(),
            target_port: IntOrString::Int(spec.container),
        });
    }

    Ok(Service {
        api_version: API_VERSION_CORE.to_string(),
        kind: "Service".to_string(),
        metadata: ObjectMeta::named(name).with_labels(merged_labels(name, &service.label_map())),
        spec: ServiceSpec {
            selector: selector(name),
            ports,
            cluster_ip: None,
        },
    })
}
