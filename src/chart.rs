//! Chart packaging
//!
//! Wraps one service's generated artifacts in a Helm-style chart
//! skeleton. The conversion core treats this as a pass-through given the
//! compose file and the service name.

use std::path::Path;

use crate::convert::output::parse_artifact_name;
use crate::error::Result;

/// Generate a chart directory for one service and collect its artifacts
pub fn generate(compose_file: &Path, name: &str, dir: &Path) -> Result<()> {
    let chart_dir = dir.join(name);
    let templates = chart_dir.join("templates");
    std::fs::create_dir_all(&templates)?;

    let chart = format!(
        "name: {name}\n\
         description: A generated Helm Chart for {name} from {file}\n\
         version: 0.0.1\n\
         keywords:\n  - {name}\n",
        name = name,
        file = compose_file.display(),
    );
    std::fs::write(chart_dir.join("Chart.yaml"), chart)?;

    let readme = format!(
        "This chart was created by converting {} to a Helm chart.\n",
        compose_file.display()
    );
    std::fs::write(chart_dir.join("README.md"), readme)?;

    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let file_name = entry.file_name();
        let Some(file) = file_name.to_str() else {
            continue;
        };
        if let Some((service, _, _)) = parse_artifact_name(file) {
            if service == name {
                std::fs::copy(entry.path(), templates.join(file))?;
            }
        }
    }

    tracing::info!("Created chart {}", chart_dir.display());
    Ok(())
}
