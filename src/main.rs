use anyhow::Context;
use clap::Parser;
use cosmos_rs::{
    cli::Cli,
    config::CosmosConfig,
    http_server::{self, AppState},
    logging::{init_logging, LogConfig},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.generate_config {
        CosmosConfig::write_sample("cosmos-config.toml.example")?;
        println!("📝 サンプル設定ファイルを生成しました: cosmos-config.toml.example");
        return Ok(());
    }

    let mut config =
        CosmosConfig::load(cli.config.as_deref()).context("failed to load configuration")?;
    if let Some(bind) = cli.bind {
        config.server.bind_addr = bind;
    }
    if let Some(level) = cli.log_level {
        config.server.log_level = level;
    }

    let _log_guard = init_logging(&LogConfig::from_server_config(&config.server))?;
    tracing::info!(
        window_size = config.detector.window_size,
        z_score_threshold = config.detector.z_score_threshold,
        deviation_threshold = config.detector.deviation_threshold,
        max_readings = config.telemetry.max_readings,
        "configuration loaded"
    );

    let state = AppState::from_config(&config)?;
    http_server::serve(state, &config.server.bind_addr).await?;

    Ok(())
}
