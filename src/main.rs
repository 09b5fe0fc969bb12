//! Chemviz - Main Entry Point
//!
//! Terminal client for the Chemical Equipment Parameter Visualizer

use anyhow::{Context, Result, bail};
use clap::Parser;

use chemviz_client::app::application::Application;
use chemviz_client::cli::shell::Shell;
use chemviz_client::cli::{Cli, Commands, render};
use chemviz_client::eventing::app_event::EventBus;
use chemviz_client::logging::init_logging;
use chemviz_client::services::CsvFile;
use chemviz_client::utils::config_store::{config_toml, load_config, save_config};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref()).context("loading config")?;
    let config = cli.apply_overrides(config);
    let _log_guard = init_logging(&config.log);

    if let Commands::Config { save } = cli.command() {
        print!("{}", config_toml(&config).context("rendering config")?);
        if *save {
            let path = save_config(cli.config.as_deref(), &config).context("saving config")?;
            println!("Saved to {}", path.display());
        }
        return Ok(());
    }

    tracing::info!("Starting Chemviz client against {}", config.api.base_url);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async {
        let (events, rx) = EventBus::new();
        let app = Application::new(config, events).context("creating HTTP client")?;

        match cli.command() {
            Commands::Shell => {
                let mut shell = Shell::new(app, rx);
                if let Some(credentials) = cli.credentials() {
                    let output = shell
                        .execute(chemviz_client::cli::shell::ShellCommand::Login(credentials))
                        .await;
                    println!("{}", output.trim_end());
                }
                shell.run().await?;
            }
            Commands::Upload { file } => {
                login(&app, &cli).await?;
                let file = CsvFile::read(file)
                    .await
                    .with_context(|| format!("reading {}", file.display()))?;
                app.select_file(file).map_err(|e| anyhow::anyhow!(e.user_message()))?;
                let outcome = app
                    .submit_upload()
                    .await
                    .map_err(|e| anyhow::anyhow!("Upload failed: {}", e.user_message()))?;
                println!("Uploaded dataset {}", outcome.dataset_id);
                let session = app.session();
                println!("{}", render::render_summary(session.summary.as_ref()));
                println!("{}", render::render_charts(&session.chart_data()));
                app.logout().await;
            }
            Commands::History => {
                login(&app, &cli).await?;
                app.refresh_history()
                    .await
                    .map_err(|e| anyhow::anyhow!("History failed: {}", e.user_message()))?;
                print!("{}", render::render_history(&app.history().state()));
                app.logout().await;
            }
            Commands::Config { .. } => {}
        }
        Ok(())
    })
}

async fn login(app: &Application, cli: &Cli) -> Result<()> {
    let Some(credentials) = cli.credentials() else {
        bail!("--username and --password (or CHEMVIZ_USERNAME / CHEMVIZ_PASSWORD) are required");
    };
    app.login(&credentials)
        .await
        .map_err(|e| anyhow::anyhow!("Login failed: {}", e.user_message()))
}
