//! CLI argument parsing for cosmos-rs

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "cosmos-rs")]
#[command(version)]
#[command(about = "Spacecraft telemetry service with sliding-window anomaly detection", long_about = None)]
pub struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long, value_name = "PATH", env = "COSMOS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Address to bind the HTTP server to (overrides server.bind_addr)
    #[arg(short, long, value_name = "ADDR")]
    pub bind: Option<String>,

    /// Log level or EnvFilter directive (overrides server.log_level)
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Write cosmos-config.toml.example and exit
    #[arg(long)]
    pub generate_config: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["cosmos-rs"]).unwrap();
        assert!(cli.bind.is_none());
        assert!(!cli.generate_config);
    }

    #[test]
    fn test_overrides() {
        let cli = Cli::try_parse_from([
            "cosmos-rs",
            "--config",
            "custom.toml",
            "--bind",
            "0.0.0.0:8080",
            "--log-level",
            "debug",
        ])
        .unwrap();

        assert_eq!(cli.config, Some(PathBuf::from("custom.toml")));
        assert_eq!(cli.bind.as_deref(), Some("0.0.0.0:8080"));
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
    }
}
