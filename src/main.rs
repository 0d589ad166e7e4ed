use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing::info;

use plugin_dna::analysis::model::PluginAnalysis;
use plugin_dna::analysis::AnalysisBuilder;
use plugin_dna::config::{Config, EmbeddingBackend};
use plugin_dna::embedding::{download, EmbeddingProvider, HashingEmbedder, SentenceEmbedder};
use plugin_dna::error::{ExtractError, Side};
use plugin_dna::output::terminal;
use plugin_dna::pipeline::{self, CompareOptions};

/// plugin-dna: fingerprint plugin packages and score how similar two are.
///
/// `extract` turns a package into a canonical analysis plus an embedding;
/// `compare` scores two extracted packages by embedding cosine and
/// SuperMinHash Jaccard estimate.
#[derive(Parser)]
#[command(name = "plugin-dna", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a plugin package and write its analysis and embedding
    Extract {
        /// Plugin package (.zip or .jar)
        input: PathBuf,

        /// Analysis file to write (the embedding goes to ./embedding/ next to it)
        output: PathBuf,

        /// Ignore cached artifacts and rebuild both
        #[arg(long)]
        refresh: bool,
    },

    /// Compare two analysis files
    Compare {
        left: PathBuf,
        right: PathBuf,

        /// SuperMinHash signature length (default: PLUGIN_DNA_MINHASH_COMPONENTS or 2048)
        #[arg(long)]
        components: Option<usize>,

        /// Bits kept per signature component (default: PLUGIN_DNA_MINHASH_BITS or 2)
        #[arg(long)]
        bits: Option<u32>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the similarity token set of an analysis file
    Tokens { analysis: PathBuf },

    /// Summarize an analysis file
    Show { analysis: PathBuf },

    /// Download the ONNX sentence embedding model (~90 MB)
    DownloadModel,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("plugin_dna=info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Extract {
            input,
            output,
            refresh,
        } => {
            let config = Config::load()?;
            let builder = AnalysisBuilder::new(config.own_code.clone());

            println!("Analyzing {}...", input.display());
            let outcome = pipeline::extract(
                &input,
                &output,
                &builder,
                || create_provider(&config),
                refresh,
            )
            .await
            .map_err(explain_extract_error)?;

            if outcome.analysis_cached {
                println!(
                    "{}",
                    "Analysis file already exists, reused it. Pass --refresh to rebuild.".dimmed()
                );
            }
            println!("  Analysis:  {}", outcome.analysis_path.display());
            println!("  Embedding: {}", outcome.embedding_path.display());
            println!(
                "{} {} parsed ({} method symbols, {} JARs)",
                "Done:".green().bold(),
                outcome.analysis.display_name(&file_label(&input)),
                outcome.analysis.plugin_dna.methods.len(),
                outcome.analysis.structure.jar_files.len()
            );
        }

        Commands::Compare {
            left,
            right,
            components,
            bits,
            json,
        } => {
            let config = Config::load()?;
            let options = CompareOptions {
                weights: config.weights,
                components: components.unwrap_or(config.minhash_components),
                bits_per_component: bits.unwrap_or(config.minhash_bits),
            };

            info!(left = %left.display(), right = %right.display(), "Comparing");
            let report =
                pipeline::compare(&left, &right, &options, || create_provider(&config)).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                terminal::display_comparison(&report);
            }
        }

        Commands::Tokens { analysis } => {
            let parsed = load_analysis(&analysis)?;
            terminal::display_tokens(&plugin_dna::tokens::tokenize(&parsed));
        }

        Commands::Show { analysis } => {
            let parsed = load_analysis(&analysis)?;
            terminal::display_analysis(&parsed, &file_label(&analysis));
        }

        Commands::DownloadModel => {
            let config = Config::load()?;
            let model_dir = &config.model_dir;

            println!("Downloading sentence embedding model...");
            println!("  Destination: {}", model_dir.display());

            download::download_model(model_dir).await?;

            println!("\n{}", "Model downloaded successfully.".bold());
            println!("You can now run `plugin-dna extract <input> <output>`.");
        }
    }

    Ok(())
}

/// Create an embedding provider based on the configured backend.
fn create_provider(config: &Config) -> Result<Box<dyn EmbeddingProvider>> {
    config.require_embedder()?;
    match config.embedding_backend {
        EmbeddingBackend::Onnx => {
            info!("Using local ONNX sentence embedder");
            let embedder =
                SentenceEmbedder::load(&download::embedding_model_dir(&config.model_dir))?;
            Ok(Box::new(embedder))
        }
        EmbeddingBackend::Hashing => {
            info!("Using hashing embedder");
            Ok(Box::new(HashingEmbedder::default()))
        }
    }
}

/// Single-file loaders don't have a left/right side; reuse the compare
/// loader for its error messages and drop the side.
fn load_analysis(path: &Path) -> Result<PluginAnalysis> {
    pipeline::compare::load_analysis(Side::Left, path).map_err(|e| match e {
        plugin_dna::error::CompareError::InvalidInput { path, reason, .. } => {
            anyhow::anyhow!("{} is invalid: {}", path.display(), reason)
        }
        other => other.into(),
    })
}

/// Add a hint for the two failures users hit most.
fn explain_extract_error(err: anyhow::Error) -> anyhow::Error {
    let hint = match err.downcast_ref::<ExtractError>() {
        Some(ExtractError::InputNotFound { .. }) => "Check the input path.",
        Some(ExtractError::ArchiveCorrupt { .. }) => {
            "The input is not a readable ZIP/JAR; no analysis file was written."
        }
        _ => return err,
    };
    err.context(hint)
}

fn file_label(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}
