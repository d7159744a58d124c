use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use log::debug;

use anime_transform::{Pipeline, ProxySettings, QqClient, RecoveryFrame, TransformConfig};

/// Turn a photo into an anime picture with the QQ AI processor
#[derive(Debug, Parser)]
#[command(name = "anime-transform", version)]
struct Args {
    /// Source image file path
    #[arg(short, long)]
    image: PathBuf,

    /// Result image path
    #[arg(short, long)]
    output: PathBuf,

    /// QQ generation mode: DIFFERENT_DIMENSION_ME or AI_PAINTING_ANIME.
    /// AI_PAINTING_ANIME is for China only, DIFFERENT_DIMENSION_ME for other countries
    #[arg(short, long, default_value = "DIFFERENT_DIMENSION_ME")]
    mode: String,

    /// Proxy in the following format: http://user:password@ip:port (socks5://... for SOCKS)
    #[arg(short, long)]
    proxy: Option<String>,
}

async fn run(args: Args) -> anyhow::Result<PathBuf> {
    let config = TransformConfig::from_env()?;
    let proxy = args.proxy.as_deref().map(ProxySettings::parse).transpose()?;

    let frame = match config.marker_path {
        Some(ref path) => {
            let bytes = tokio::fs::read(path)
                .await
                .with_context(|| format!("Cannot read marker image {}", path.display()))?;
            RecoveryFrame::from_marker_bytes(&bytes)?
        }
        None => RecoveryFrame::builtin(),
    };

    let client = QqClient::new(config, proxy)?;
    let pipeline = Pipeline::new(client).with_recovery_frame(frame);

    let image = tokio::fs::read(&args.image)
        .await
        .with_context(|| format!("Cannot read image {}", args.image.display()))?;

    let result = pipeline.run(&image, &args.mode).await?;
    debug!("Result fetched from {} (recovered: {})", result.source_url, result.recovered);

    tokio::fs::write(&args.output, &result.bytes)
        .await
        .with_context(|| format!("Cannot write result to {}", args.output.display()))?;

    Ok(args.output)
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    match run(args).await {
        Ok(output) => {
            println!("Successfully downloaded transformed image to:\n{}", output.display());
        }
        Err(e) => {
            eprintln!("{:#}", e);
            std::process::exit(1);
        }
    }
}
