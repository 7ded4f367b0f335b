//! `release-process` CLI entry-point.
//!
//! Available sub-commands:
//! - `serve`    — start the API server.
//! - `migrate`  — run pending database migrations.
//! - `validate` — check a create payload without provisioning anything.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use engine::{Collaborators, CreatePayload, PgRecordStore, ReleaseProcessOrchestrator};
use provisioning::http::{
    CiProxyBuilder, ClientConfig, CoverageClient, GithubWorkflow, RegistryClient,
    ReleaseTrackingClient,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "release-process",
    about = "Provisions and tears down repository release processes",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the REST API server.
    Serve {
        #[arg(long, env = "BIND_ADDRESS", default_value = "0.0.0.0:8080")]
        bind: SocketAddr,
        #[command(flatten)]
        database: DatabaseArgs,
        #[command(flatten)]
        clients: ClientArgs,
    },
    /// Run pending database migrations.
    Migrate {
        #[command(flatten)]
        database: DatabaseArgs,
    },
    /// Validate a create payload JSON file.
    Validate {
        /// Path to the payload JSON file.
        path: PathBuf,
    },
}

#[derive(Args)]
struct DatabaseArgs {
    #[arg(long, env = "DATABASE_URL")]
    database_url: String,
    #[arg(long, env = "DATABASE_MAX_CONNECTIONS", default_value_t = 10)]
    max_connections: u32,
}

#[derive(Args)]
struct ClientArgs {
    #[arg(long, env = "GITHUB_API_URL", default_value = "https://api.github.com")]
    github_api_url: String,
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    github_token: Option<String>,
    #[arg(long, env = "CI_PROXY_URL")]
    ci_proxy_url: String,
    #[arg(long, env = "COVERAGE_API_URL")]
    coverage_api_url: String,
    #[arg(long, env = "RELEASE_TRACKING_URL")]
    release_tracking_url: String,
    #[arg(long, env = "APP_REGISTRY_URL")]
    app_registry_url: String,
    /// Per-request timeout for every collaborator, in milliseconds.
    #[arg(long, env = "HTTP_TIMEOUT_MS", default_value_t = 2000)]
    http_timeout_ms: u64,
}

impl From<ClientArgs> for ClientConfig {
    fn from(args: ClientArgs) -> Self {
        Self {
            github_api_url: args.github_api_url,
            github_token: args.github_token,
            ci_proxy_url: args.ci_proxy_url,
            coverage_api_url: args.coverage_api_url,
            release_tracking_url: args.release_tracking_url,
            app_registry_url: args.app_registry_url,
            timeout: Duration::from_millis(args.http_timeout_ms),
        }
    }
}

fn collaborators(config: &ClientConfig) -> Result<Collaborators> {
    Ok(Collaborators {
        registry: Arc::new(RegistryClient::new(config).context("application registry client")?),
        workflow: Arc::new(GithubWorkflow::new(config).context("github client")?),
        builder: Arc::new(CiProxyBuilder::new(config).context("ci proxy client")?),
        coverage: Arc::new(CoverageClient::new(config).context("coverage client")?),
        tracking: Arc::new(
            ReleaseTrackingClient::new(config).context("release tracking client")?,
        ),
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve {
            bind,
            database,
            clients,
        } => {
            let pool = db::pool::create_pool(&database.database_url, database.max_connections)
                .await
                .context("failed to connect to database")?;
            let collaborators = collaborators(&clients.into())?;
            let orchestrator =
                ReleaseProcessOrchestrator::new(collaborators, Arc::new(PgRecordStore::new(pool)));

            info!("Starting API server on {bind}");
            api::serve(bind, api::AppState::new(orchestrator))
                .await
                .context("API server failed")?;
        }
        Command::Migrate { database } => {
            let pool = db::pool::create_pool(&database.database_url, 2)
                .await
                .context("failed to connect to database")?;
            db::pool::run_migrations(&pool)
                .await
                .context("migration failed")?;
            info!("Migrations applied successfully");
        }
        Command::Validate { path } => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("cannot read file {}", path.display()))?;
            let payload: CreatePayload =
                serde_json::from_str(&content).context("invalid JSON payload")?;

            match payload.into_configuration() {
                Ok(cfg) => {
                    println!(
                        "✅ Payload is valid: repository '{}', workflow {}, {} status check(s)",
                        cfg.id,
                        cfg.workflow_type,
                        cfg.required_status_checks.len()
                    );
                }
                Err(e) => {
                    eprintln!("❌ Validation failed: {e}");
                    std::process::exit(1);
                }
            }
        }
    }

    Ok(())
}
