//! LightRAG gateway binary
//!
//! Run with: cargo run -p lightrag-gateway -- serve

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use lightrag_gateway::{
    bootstrap, launcher::WhichProbe, GatewayConfig, GatewayServer, LaunchPlan, LaunchStrategy,
    Launcher,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "lightrag-gateway", version, about = "Launch LightRAG or serve a minimal facade over it")]
struct Cli {
    /// TOML configuration file
    #[arg(long, short, global = true, env = "LIGHTRAG_GATEWAY_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP facade (status, health, query, insert)
    Serve,
    /// Start the native LightRAG server and wait for it to exit
    Launch {
        /// Override the configured launch strategy (auto, entry-point, module)
        #[arg(long)]
        strategy: Option<LaunchStrategy>,
    },
    /// Print the resolved launch plan as JSON without starting anything
    Plan {
        /// Override the configured launch strategy (auto, entry-point, module)
        #[arg(long)]
        strategy: Option<LaunchStrategy>,
    },
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lightrag_gateway=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn print_banner(title: &str, config: &GatewayConfig, port: u16) {
    println!("{}", "=".repeat(50));
    println!("  {}", title);
    println!("{}", "=".repeat(50));
    println!("  Working directory: {}", config.paths.working_dir.display());
    println!("  Log directory:     {}", config.paths.log_dir.display());
    println!("  Listening on port: {}", port);
    println!("{}", "=".repeat(50));
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    init_tracing();

    let cli = Cli::parse();
    let config = GatewayConfig::load(cli.config.as_deref())?;
    tracing::debug!("Configuration loaded: {:?}", config);

    match cli.command {
        Command::Serve => {
            bootstrap(&config)?;
            print_banner("LightRAG Facade", &config, config.server.port);

            let server = GatewayServer::new(config);
            println!("\nEndpoints:");
            println!("  GET  /        - Service status");
            println!("  GET  /health  - Health check");
            println!("  POST /query   - Query the knowledge base");
            println!("  POST /insert  - Insert text");
            println!("\nPress Ctrl+C to stop\n");

            server.start().await?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Launch { strategy } => {
            bootstrap(&config)?;
            let requested = strategy.unwrap_or(config.launch.strategy);
            let plan = LaunchPlan::resolve(&config, requested, &WhichProbe)?;
            print_banner("LightRAG Server (native)", &config, config.launch.port);

            match Launcher.run(&plan).await {
                Ok(()) => Ok(ExitCode::SUCCESS),
                Err(lightrag_gateway::Error::ProcessExit { program, code }) => {
                    tracing::error!("{} exited with {:?}", program, code);
                    let code = code
                        .and_then(|c| u8::try_from(c).ok())
                        .filter(|c| *c != 0)
                        .unwrap_or(1);
                    Ok(ExitCode::from(code))
                }
                Err(e) => Err(e.into()),
            }
        }
        Command::Plan { strategy } => {
            let requested = strategy.unwrap_or(config.launch.strategy);
            let plan = LaunchPlan::resolve(&config, requested, &WhichProbe)?;
            println!("{}", serde_json::to_string_pretty(&plan)?);
            Ok(ExitCode::SUCCESS)
        }
    }
}
