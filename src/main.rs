use aimage_creator::ai::OpenAiImageClient;
use aimage_creator::app::{App, AppServices};
use aimage_creator::cdn::{CdnClient, CdnConfig};
use aimage_creator::host::{
    AttachmentStore, DirectoryAttachmentStore, FileDocument, StderrAlerts, TerminalInteraction,
};
use aimage_creator::image::HttpImageFetcher;
use aimage_creator::models::DEFAULT_MARKER;
use aimage_creator::settings::EnvSettings;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "aimage-creator")]
#[command(about = "Generate an image with OpenAI and embed it in a markdown document")]
struct CliArgs {
    /// Markdown document to read the prompt from and insert the image into.
    #[arg(long, value_name = "PATH")]
    document: PathBuf,

    /// Directory for stored images when no CDN is configured (default: `media` beside the document).
    #[arg(long, value_name = "DIR")]
    attachments_dir: Option<PathBuf>,

    /// Proxy prefix for fetching generated images.
    #[arg(long, value_name = "URL")]
    cors_proxy: Option<String>,

    /// Base URL of the image generation API.
    #[arg(long, value_name = "URL")]
    api_base: Option<String>,

    /// Marker text that "from-preceding" looks for.
    #[arg(long, default_value = DEFAULT_MARKER)]
    marker: String,

    /// Maximum number of selection rounds (unlimited when omitted).
    #[arg(long, value_name = "N")]
    max_rounds: Option<NonZeroUsize>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Use the line before the marker as the prompt and replace the marker.
    FromPreceding,
    /// Ask for a prompt and insert at the marker (or at the end).
    ViaPrompt,
    /// Use the whole document as the prompt and append the image.
    SummaryImage,
}

async fn build_attachment_store(args: &CliArgs) -> Result<Box<dyn AttachmentStore>> {
    if let Some(config) = CdnConfig::from_env() {
        info!("Storing images in bucket {}", config.bucket);
        return Ok(Box::new(CdnClient::new(config).await?));
    }

    let document_dir = args
        .document
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();
    let (dir, prefix) = match &args.attachments_dir {
        Some(dir) => (dir.clone(), dir.to_string_lossy().to_string()),
        None => (document_dir.join("media"), "media".to_string()),
    };
    info!("Storing images in {}", dir.display());
    Ok(Box::new(DirectoryAttachmentStore::new(&dir, prefix)))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "aimage_creator=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = CliArgs::parse();

    let http_client = reqwest::Client::builder()
        .build()
        .context("Failed to build HTTP client")?;

    let mut generator = OpenAiImageClient::new_with_client(http_client.clone());
    if let Some(base) = &args.api_base {
        generator = generator.with_base_url(base.clone());
    }
    let mut images = HttpImageFetcher::new_with_client(http_client);
    if let Some(proxy) = &args.cors_proxy {
        images = images.with_proxy(proxy.clone());
    }

    let app = App::with_services(AppServices {
        settings: Box::new(EnvSettings::load()),
        generator: Box::new(generator),
        images: Box::new(images),
        documents: Box::new(FileDocument::new(&args.document, args.marker.clone())),
        interaction: Box::new(TerminalInteraction::new()),
        attachments: build_attachment_store(&args).await?,
        alerts: Box::new(StderrAlerts),
    })
    .with_marker(args.marker.clone())
    .with_max_rounds(args.max_rounds);

    let outcome = match args.command {
        Command::FromPreceding => app.image_from_preceding().await,
        Command::ViaPrompt => app.image_via_prompt().await,
        Command::SummaryImage => {
            let document_id = args.document.to_string_lossy().to_string();
            app.summary_image(&document_id).await
        }
    };

    if let Some(markup) = outcome.markup() {
        println!("{}", markup);
    }
    if outcome.is_failure() {
        std::process::exit(1);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{CliArgs, Command};
    use clap::Parser;

    #[test]
    fn test_parse_defaults() {
        let args = CliArgs::try_parse_from(["aimage-creator", "--document", "note.md", "via-prompt"])
            .unwrap();

        assert_eq!(args.marker, "{AImage Creator: from preceding}");
        assert!(args.max_rounds.is_none());
        assert!(matches!(args.command, Command::ViaPrompt));
    }

    #[test]
    fn test_parse_max_rounds_rejects_zero() {
        let result = CliArgs::try_parse_from([
            "aimage-creator",
            "--document",
            "note.md",
            "--max-rounds",
            "0",
            "from-preceding",
        ]);
        assert!(result.is_err());
    }
}
