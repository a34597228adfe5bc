use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use tiktok_insights::config::AppConfig;
use tiktok_insights::corpus::summary::summarize;
use tiktok_insights::corpus::Corpus;
use tiktok_insights::render::{render, Locale, RenderOptions};
use tiktok_insights::{server, visualization};
use tracing::info;
use tracing::Level;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[clap(author, version, about)]
struct Cli {
    #[clap(short, long, global = true)]
    log_level: Option<String>,
    /// YAML configuration file
    #[clap(short, long, global = true)]
    config: Option<PathBuf>,
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API
    Serve {
        #[clap(short, long)]
        port: Option<u16>,
        #[clap(short, long)]
        data_dir: Option<PathBuf>,
        #[clap(long)]
        static_dir: Option<PathBuf>,
        #[clap(long)]
        cors_origin: Option<String>,
    },
    /// Print dataset counts and statistics as JSON
    Summary {
        #[clap(short, long)]
        data_dir: Option<PathBuf>,
    },
    /// Generate a chart payload and print it as text
    Visualize {
        query: String,
        #[clap(short, long)]
        r#type: Option<String>,
        #[clap(long, default_value = "es-CL")]
        locale: String,
        #[clap(short, long)]
        data_dir: Option<PathBuf>,
        /// Print the raw payload instead of the rendered view
        #[clap(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();
    setup_logging(&args.log_level);

    let mut config = AppConfig::load(args.config.as_deref())?;

    match args.command {
        Commands::Serve {
            port,
            data_dir,
            static_dir,
            cors_origin,
        } => {
            if let Some(port) = port {
                config.port = port;
            }
            if let Some(dir) = data_dir {
                config.data_dir = dir;
            }
            if static_dir.is_some() {
                config.static_dir = static_dir;
            }
            if cors_origin.is_some() {
                config.cors_origin = cors_origin;
            }
            info!("Starting server on port {}", config.port);
            server::start_server(config).await?;
        }
        Commands::Summary { data_dir } => {
            let corpus = Corpus::load(&data_dir.unwrap_or(config.data_dir));
            println!("{}", serde_json::to_string_pretty(&summarize(&corpus))?);
        }
        Commands::Visualize {
            query,
            r#type,
            locale,
            data_dir,
            json,
        } => {
            let locale =
                Locale::parse(&locale).ok_or_else(|| anyhow!("unsupported locale '{}'", locale))?;
            let corpus = Corpus::load(&data_dir.unwrap_or(config.data_dir));
            let payload = visualization::generate(&corpus, &query, r#type.as_deref());
            if json {
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else {
                let options = RenderOptions {
                    locale,
                    ..Default::default()
                };
                print!("{}", render(&payload, &options));
            }
        }
    }

    Ok(())
}

/// `RUST_LOG` wins over `--log-level` when set.
fn setup_logging(log_level: &Option<String>) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_filter(log_level.as_deref())));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .without_time()
        .init();
}

/// Our own targets follow the requested level; HTTP plumbing stays at warn
/// unless tracing is asked for.
fn log_filter(log_level: Option<&str>) -> String {
    let level = match log_level.map(str::to_lowercase).as_deref() {
        Some("trace") => Level::TRACE,
        Some("debug") => Level::DEBUG,
        Some("warn") => Level::WARN,
        Some("error") => Level::ERROR,
        _ => Level::INFO,
    };
    let deps = if level == Level::TRACE { Level::TRACE } else { Level::WARN };

    format!(
        "handlebars=off,hyper={deps},reqwest={deps},tower_http={level},tiktok_insights={level},{level}"
    )
}
