use anyhow::Result;
use tokio::io::{stdin, stdout, BufReader};

use site_guardian::{
    app::GuardianApp,
    config::{self, AppConfig},
    infrastructure::{
        directories::{self, ResolvedPaths},
        logging, shutdown,
    },
};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let config = config::load_config()?;
    let paths = directories::ensure_directories(&config.directories)?;
    logging::init_tracing(&config, &paths)?;

    let outcome = serve(config, paths).await;
    if let Err(err) = &outcome {
        tracing::error!(target: "app", error = ?err, "site guardian failed");
    }
    logging::flush_tracing();
    outcome?;

    // The blocking stdin reader cannot be cancelled; exit without waiting on it.
    std::process::exit(0)
}

async fn serve(config: AppConfig, paths: ResolvedPaths) -> Result<()> {
    let shutdown = shutdown::Shutdown::new();
    shutdown::install_signal_handlers(shutdown.clone());

    let app = GuardianApp::initialize(
        config,
        paths,
        shutdown,
        BufReader::new(stdin()),
        stdout(),
    )
    .await?;
    app.run().await
}
