use clap::{Parser, Subcommand};
use std::io::Read;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "gemline")]
#[command(about = "LINE to Gemini chat relay", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show version
    Version,

    /// Run the gateway (GET /index, POST /callback). Requires LINE_CHANNEL_ACCESS_TOKEN, LINE_CHANNEL_SECRET and GEMINI_API_KEY (environment, .env, or config file).
    Gateway {
        /// Config file path (default: GEMLINE_CONFIG_PATH or ~/.gemline/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<PathBuf>,

        /// HTTP port (default from config or 5000)
        #[arg(long, short)]
        port: Option<u16>,
    },

    /// Print the X-Line-Signature for a request body (file, or stdin when omitted), for testing the callback with curl.
    Sign {
        /// Config file path (default: GEMLINE_CONFIG_PATH or ~/.gemline/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<PathBuf>,

        /// File containing the exact request body.
        #[arg(value_name = "FILE")]
        body: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match dotenvy::dotenv() {
        Ok(path) => log::debug!("loaded environment from {}", path.display()),
        Err(e) if e.not_found() => {}
        Err(e) => log::warn!("ignoring unreadable .env: {}", e),
    }

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Version) => {
            println!("gemline {}", env!("CARGO_PKG_VERSION"));
        }
        Some(Commands::Gateway { config, port }) => {
            if let Err(e) = run_gateway(config, port).await {
                log::error!("gateway failed: {:#}", e);
                std::process::exit(1);
            }
        }
        Some(Commands::Sign { config, body }) => {
            if let Err(e) = run_sign(config, body) {
                log::error!("sign failed: {:#}", e);
                std::process::exit(1);
            }
        }
        None => {
            println!("Run with --help for usage");
        }
    }
}

async fn run_gateway(config_path: Option<PathBuf>, port: Option<u16>) -> anyhow::Result<()> {
    let (mut config, path) = lib::config::load_config(config_path)?;
    log::debug!("using config {}", path.display());
    if let Some(p) = port {
        config.gateway.port = p;
    }
    log::info!(
        "starting gateway on {}:{}",
        config.gateway.bind,
        config.gateway.port
    );
    lib::gateway::run_gateway(config).await
}

fn run_sign(config_path: Option<PathBuf>, body_path: Option<PathBuf>) -> anyhow::Result<()> {
    let (config, _) = lib::config::load_config(config_path)?;
    let secret = lib::config::resolve_line_channel_secret(&config).ok_or_else(|| {
        anyhow::anyhow!(
            "missing required setting {}",
            lib::config::ENV_LINE_CHANNEL_SECRET
        )
    })?;
    println!("{}", sign_body(body_path.as_deref(), &secret)?);
    Ok(())
}

/// Signature of the body in `body_path`, or of stdin when no path is given.
fn sign_body(body_path: Option<&Path>, secret: &str) -> anyhow::Result<String> {
    use anyhow::Context;

    let body = match body_path {
        Some(p) => std::fs::read(p).with_context(|| format!("reading {}", p.display()))?,
        None => {
            let mut buf = Vec::new();
            std::io::stdin()
                .read_to_end(&mut buf)
                .context("reading body from stdin")?;
            buf
        }
    };
    Ok(lib::webhook::sign(&body, secret))
}
