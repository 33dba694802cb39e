//! AnyExtract CLI - ordered plain-text extraction from documents and wiki pages.

use anyextract::{Engine, ExtractionOptions, ExtractorConfig, ImageExtractionMethod, WikiExtractionOptions};
use anyhow::{Context as _, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "anyextract",
    version,
    about = "Extract ordered plain text from Office, OpenDocument, PDF, image and Confluence sources",
    after_help = "EXAMPLES:\n  \
                  anyextract extract report.docx\n  \
                  anyextract extract slides.pptx --images --method llm\n  \
                  anyextract extract https://example.com/files/budget.xlsx --auth-header \"Bearer $TOKEN\"\n  \
                  anyextract wiki 123456 --images --attachments\n  \
                  anyextract formats"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (TOML, YAML or JSON). Defaults to the nearest anyextract.toml
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract a local file or a URL
    Extract {
        /// File path or http(s) URL
        input: String,

        /// Authorization header value sent when downloading a URL
        #[arg(long)]
        auth_header: Option<String>,

        #[command(flatten)]
        images: ImageArgs,
    },

    /// Extract a Confluence page by ID
    Wiki {
        page_id: String,

        /// Download and extract view-file attachments
        #[arg(long, default_value_t = false)]
        attachments: bool,

        #[command(flatten)]
        images: ImageArgs,
    },

    /// List the MIME types with a registered adapter
    Formats,
}

#[derive(Args)]
struct ImageArgs {
    /// Describe embedded and standalone images
    #[arg(long, default_value_t = false)]
    images: bool,

    /// How images are turned into text
    #[arg(long, value_enum, default_value_t = Method::Ocr)]
    method: Method,

    /// Three-letter OCR language code
    #[arg(long, default_value = "eng")]
    language: String,
}

#[derive(Clone, Copy, ValueEnum)]
enum Method {
    Ocr,
    Llm,
}

impl ImageArgs {
    fn options(&self) -> ExtractionOptions {
        let method = match self.method {
            Method::Ocr => ImageExtractionMethod::Ocr,
            Method::Llm => ImageExtractionMethod::Llm,
        };
        ExtractionOptions {
            extract_images: self.images,
            image_extraction_method: method,
            language: self.language.clone(),
        }
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<ExtractorConfig> {
    let config = match path {
        Some(path) => ExtractorConfig::from_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => ExtractorConfig::discover()
            .context("Failed to discover anyextract.toml")?
            .unwrap_or_default(),
    };
    Ok(config.with_env_overrides())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "anyextract=debug" } else { "anyextract=warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(cli.config.as_ref())?;
    let engine = Engine::new(config).context("Failed to initialize the extraction engine")?;
    tracing::info!(
        mime_types = engine.list_registered_mime_types().len(),
        "extraction engine ready"
    );

    match cli.command {
        Commands::Extract {
            input,
            auth_header,
            images,
        } => {
            let options = images.options();
            let text = engine
                .parse(input.as_str(), auth_header.as_deref(), Some(&options))
                .await
                .with_context(|| format!("Failed to extract {}", input))?;
            println!("{}", text);
        }
        Commands::Wiki {
            page_id,
            attachments,
            images,
        } => {
            let options = WikiExtractionOptions {
                images: images.options(),
                extract_attachments: attachments,
            };
            let text = engine
                .parse_wiki_page(&page_id, &options)
                .await
                .with_context(|| format!("Failed to extract wiki page {}", page_id))?;
            println!("{}", text);
        }
        Commands::Formats => {
            for mime_type in engine.list_registered_mime_types() {
                println!("{}", mime_type);
            }
        }
    }

    Ok(())
}
