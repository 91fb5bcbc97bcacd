mod config;
mod tail;
mod web;

use std::path::Path;

use anyhow::Result;
use clap::Parser;

use config::Config;

#[derive(Parser, Debug)]
#[command(
    name = "logview",
    version,
    about = "Password-protected web viewer for application log files"
)]
struct Cli {
    /// Config file path (missing file means built-in defaults)
    #[arg(long, default_value = "./logview.toml")]
    config: String,

    /// Listening port (overrides config and environment)
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("logview=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    let mut config = Config::load(Path::new(&cli.config))?;
    config.apply_env(std::env::vars());
    if let Some(port) = cli.port {
        config.port = port;
    }

    print_summary(&config);

    web::server::start(config).await
}

/// Startup banner with the effective settings
fn print_summary(config: &Config) {
    println!(
        "Starting log viewer server on http://0.0.0.0:{}",
        config.port
    );
    println!("Username: {}", config.username);
    println!("Password: {}", config.password);
    println!();
    println!("Available endpoints:");
    for name in config.sources.keys() {
        println!("  - http://localhost:{}/logs-{}", config.port, name);
    }
}
