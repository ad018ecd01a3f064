//! Bit-Plane Steganography CLI
//!
//! Command-line interface for analyzing images from disk and for running
//! the HTTP analysis service.

use bitplane_stego::{
    analysis::SummaryInput,
    config::FileConfig,
    extraction::{extract_plane, Channel, PLANE_COUNT},
    render::{encode_png, render_bit_plane, render_channel},
    Analyzer,
};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "bitplane-stego", version, about = "Bit-plane steganography analysis")]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract channels and bit planes and print the result as JSON
    Analyze {
        path: PathBuf,
        /// Pretty-print the JSON
        #[arg(long)]
        pretty: bool,
        /// Write the JSON here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print the plain-text LSB summary of an image
    Summary {
        path: PathBuf,
        /// Treat PATH as a saved analysis result instead of an image
        #[arg(long)]
        from_json: bool,
    },
    /// Render a channel or one of its bit planes as a PNG
    Render {
        path: PathBuf,
        #[arg(short, long)]
        channel: Channel,
        /// Bit plane 0-7; the raw channel when omitted
        #[arg(short, long)]
        plane: Option<u8>,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Run the HTTP analysis service (requires the `server` feature)
    Serve {
        /// Listen port, overriding the configuration file
        #[arg(short, long)]
        port: Option<u16>,
    },
}

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        error!("{}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> CliResult<()> {
    let config = match &cli.config {
        Some(path) => FileConfig::from_file(path)?,
        None => FileConfig::default(),
    }
    .with_env_overrides();

    let analyzer = Analyzer::from_config(&config);

    match cli.command {
        Commands::Analyze {
            path,
            pretty,
            output,
        } => {
            let result = analyzer.analyze_bytes(&file_name(&path), &std::fs::read(&path)?)?;
            let json = if pretty {
                serde_json::to_string_pretty(&result)?
            } else {
                serde_json::to_string(&result)?
            };
            match output {
                Some(out) => {
                    std::fs::write(&out, json)?;
                    info!("Wrote analysis to {}", out.display());
                }
                None => println!("{}", json),
            }
        }
        Commands::Summary { path, from_json } => {
            let summary = if from_json {
                let input: SummaryInput = serde_json::from_slice(&std::fs::read(&path)?)?;
                input.summarize(analyzer.thresholds())?
            } else {
                let result = analyzer.analyze_bytes(&file_name(&path), &std::fs::read(&path)?)?;
                analyzer.summarize(&result)?
            };
            print!("{}", summary);
        }
        Commands::Render {
            path,
            channel,
            plane,
            output,
        } => {
            let result = analyzer.analyze_bytes(&file_name(&path), &std::fs::read(&path)?)?;
            let matrix = result.rgb_channels.get(channel);
            let image = match plane {
                Some(p) if p >= PLANE_COUNT => {
                    return Err(format!("plane must be below {}, got {}", PLANE_COUNT, p).into())
                }
                Some(p) => render_bit_plane(&extract_plane(matrix, p))?,
                None => render_channel(matrix, channel)?,
            };
            std::fs::write(&output, encode_png(&image)?)?;
            info!("Rendered {} channel to {}", channel, output.display());
        }
        Commands::Serve { port } => serve(config, analyzer, port)?,
    }

    Ok(())
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(feature = "server")]
fn serve(mut config: FileConfig, analyzer: Analyzer, port: Option<u16>) -> CliResult<()> {
    use bitplane_stego::{
        ingest::{BlobStore, DirectoryStore, MemoryStore},
        processor::ProcessorClient,
        server::{ApiServer, AppState},
    };
    use std::sync::Arc;
    use std::time::Duration;

    if let Some(port) = port {
        config.server.port = port;
    }

    let store: Arc<dyn BlobStore> = match &config.store.root {
        Some(root) => {
            info!("Storing uploads under {}", root.display());
            Arc::new(DirectoryStore::open(root)?)
        }
        None => {
            info!("Storing uploads in memory");
            Arc::new(MemoryStore::new())
        }
    };

    let processor = match &config.server.processor_url {
        Some(url) => {
            info!("Forwarding uploads to processor at {}", url);
            Some(ProcessorClient::new(
                url,
                Duration::from_secs(config.server.processor_timeout_secs),
            )?)
        }
        None => None,
    };

    let state = AppState::new(analyzer, store, processor)?;
    let server = ApiServer::new(config.server, state);

    info!("Bit-Plane Steganography Analyzer v{}", bitplane_stego::VERSION);

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(server.run())?;
    Ok(())
}

#[cfg(not(feature = "server"))]
fn serve(_config: FileConfig, _analyzer: Analyzer, _port: Option<u16>) -> CliResult<()> {
    Err("this build does not include the HTTP service; rebuild with --features server".into())
}
