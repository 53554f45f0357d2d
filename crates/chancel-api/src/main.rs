use chancel_core::Config;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    dotenvy::dotenv().ok();

    chancel_api::telemetry::init_telemetry();

    // Load and validate configuration
    let config = Config::from_env()?;
    config.validate()?;

    // Initialize the application (storage, services, routes). The storage
    // reachability probe runs in here and is fatal: a failure propagates out
    // of main and the process exits non-zero with the endpoint named.
    let (_state, router) = chancel_api::setup::initialize_app(config.clone()).await?;

    // Start the server
    chancel_api::setup::server::start_server(&config, router).await?;

    Ok(())
}
