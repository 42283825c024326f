//! stevedore - translate Docker Compose projects into Kubernetes manifests
//!
//! This is the main CLI entry point for stevedore.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use stevedore::cluster::{self, client::ClusterClient, config::ClusterConfig, ResourceSelection};
use stevedore::compose::ComposeParser;
use stevedore::convert::{ConvertOptions, Converter};
use stevedore::error::Result;
use tracing_subscriber::EnvFilter;

/// stevedore - compose to Kubernetes manifest translation
#[derive(Parser)]
#[command(name = "stevedore")]
#[command(version)]
#[command(about = "Translate Docker Compose projects into Kubernetes manifests", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Compose file (default: docker-compose.yml, or $COMPOSE_FILE)
    #[arg(short, long, global = true)]
    file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert the compose project into Kubernetes manifest files
    Convert {
        /// Generate a deployment resource file
        #[arg(short, long)]
        deployment: bool,
        /// Generate a daemonset resource file
        #[arg(long)]
        daemonset: bool,
        /// Generate a replicaset resource file
        #[arg(long)]
        replicaset: bool,
        /// Create a chart deployment
        #[arg(short, long)]
        chart: bool,
        /// Generate resource files in yaml format
        #[arg(short, long)]
        yaml: bool,
    },

    /// List converted resources active in the cluster
    Ps {
        /// List active services
        #[arg(long)]
        svc: bool,
        /// List active replication controllers
        #[arg(long)]
        rc: bool,
    },

    /// Remove instantiated services and replication controllers
    Delete {
        /// Remove active services
        #[arg(long)]
        svc: bool,
        /// Remove active replication controllers
        #[arg(long)]
        rc: bool,
        /// Name of the object to remove
        #[arg(long)]
        name: Option<String>,
    },

    /// Scale instantiated replication controllers
    Scale {
        /// New number of replicas
        #[arg(long)]
        scale: u32,
        /// A specific replication controller to scale
        #[arg(long)]
        rc: Option<String>,
    },

    /// Submit generated manifest files to the cluster
    Up,

    /// Configure the cluster API server
    Config {
        /// API server address
        #[arg(long)]
        server: Option<String>,
        /// Namespace to operate in
        #[arg(long)]
        namespace: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt().with_env_filter(filter).init();

    let compose_file = ComposeParser::resolve_file(cli.file);

    match cli.command {
        Commands::Convert {
            deployment,
            daemonset,
            replicaset,
            chart,
            yaml,
        } => {
            let mut config = ComposeParser::parse_file(&compose_file)?;
            ComposeParser::interpolate(&mut config, &std::env::vars().collect());
            ComposeParser::validate(&config)?;

            let options = ConvertOptions {
                deployment,
                daemon_set: daemonset,
                replica_set: replicaset,
                chart,
                yaml,
            };
            let converter = Converter::new(options, compose_file, std::env::current_dir()?);
            let conversion = converter.run(&config, &mut rand::thread_rng())?;
            tracing::debug!(
                "Converted {} services ({} link targets)",
                conversion.endpoints.len(),
                conversion.links.len()
            );
        }

        Commands::Ps { svc, rc } => {
            let names = service_names(&compose_file)?;
            let client = ClusterClient::new(&ClusterConfig::load())?;
            let selection = ResourceSelection {
                services: svc,
                controllers: rc,
            }
            .or_both();
            cluster::ps(&client, &names, selection).await?;
        }

        Commands::Delete { svc, rc, name } => {
            let names = service_names(&compose_file)?;
            let client = ClusterClient::new(&ClusterConfig::load())?;
            let selection = ResourceSelection {
                services: svc,
                controllers: rc,
            }
            .or_both();
            cluster::delete(&client, &names, selection, name.as_deref()).await?;
        }

        Commands::Scale { scale, rc } => {
            let names = service_names(&compose_file)?;
            let client = ClusterClient::new(&ClusterConfig::load())?;
            cluster::scale(&client, &names, scale, rc.as_deref()).await?;
        }

        Commands::Up => {
            let client = ClusterClient::new(&ClusterConfig::load())?;
            cluster::up(&client, &std::env::current_dir()?).await?;
        }

        Commands::Config { server, namespace } => {
            let mut config = ClusterConfig::load();
            if let Some(server) = server {
                config.server = server;
            }
            if let Some(namespace) = namespace {
                config.namespace = namespace;
            }
            config.save()?;
            println!(
                "Cluster API server set to {} (namespace {})",
                config.server, config.namespace
            );
        }
    }

    Ok(())
}

/// Sorted service names from the compose file; the operational commands
/// share the conversion's name keyspace
fn service_names(compose_file: &Path) -> Result<Vec<String>> {
    let config = ComposeParser::parse_file(compose_file)?;
    let mut names: Vec<String> = config.services.keys().cloned().collect();
    names.sort();
    Ok(names)
}
