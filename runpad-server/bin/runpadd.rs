use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::http::header::CONTENT_TYPE;
use axum::http::Method;
use clap::Parser;
use runpad_core::orchestra::Orchestra;
use runpad_core::pool::SandboxPool;
use runpad_core::runtime::{ContainerRuntime, DockerRuntime};
use runpad_core::store::VersionStore;
use runpad_server::config::Config;
use runpad_server::{route, state::AppState};
use tower_http::cors::{Any, CorsLayer};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// Arguments for the runpadd server binary.
#[derive(Debug, Parser)]
#[command(
    name = "runpadd",
    author,
    version,
    about = "Sandboxed code execution and snapshot service"
)]
struct RunpaddArgs {
    /// Path to the YAML configuration file
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,
}

//--------------------------------------------------------------------------------------------------
// Functions: Main
//--------------------------------------------------------------------------------------------------

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Parse command line arguments and load the configuration
    let args = RunpaddArgs::parse();
    let config = Arc::new(Config::load(&args.config)?);

    // The staging and persistent directories must exist before any sandbox
    // mounts them or any snapshot is written
    tokio::fs::create_dir_all(config.get_sandbox().get_staging_dir()).await?;
    tokio::fs::create_dir_all(config.get_storage().get_persist_dir()).await?;

    // Connect to Docker and pre-warm the sandbox pool; any failure here
    // aborts startup
    let runtime: Arc<dyn ContainerRuntime> = Arc::new(DockerRuntime::connect().await?);
    tracing::info!(
        "provisioning {} sandboxes from image {}",
        config.get_sandbox().get_max_sandboxes(),
        config.get_sandbox().get_image()
    );
    let pool = SandboxPool::provision(runtime.as_ref(), config.get_sandbox()).await?;

    let orchestra = Arc::new(Orchestra::new(
        runtime,
        pool,
        config.get_sandbox().clone(),
    ));
    let store = Arc::new(VersionStore::new(
        config.get_storage(),
        config.get_sandbox().get_file_extension(),
    ));

    // Create application state
    let state = AppState::new(config.clone(), orchestra, store);

    // Configure CORS for the browser frontend
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE])
        .allow_origin(Any);

    // Build application
    let app = route::create_router(state).layer(cors);

    // Start server
    let addr = config.addr();
    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
