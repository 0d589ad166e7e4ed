// Extraction pipeline: package on disk → analysis file → embedding file.
//
// Both artifacts are cache-first. An existing analysis file is trusted
// without opening the input at all, and an existing embedding file is
// trusted without loading a model. `refresh` deletes both before running.

use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::info;

use crate::analysis::model::PluginAnalysis;
use crate::analysis::AnalysisBuilder;
use crate::cache;
use crate::embedding::model::PluginEmbedding;
use crate::embedding::service::ensure_embedding;
use crate::embedding::traits::EmbeddingProvider;
use crate::error::ExtractError;

/// What an extraction run produced and whether it came from cache.
#[derive(Debug)]
pub struct ExtractOutcome {
    pub analysis: PluginAnalysis,
    pub embedding: PluginEmbedding,
    pub analysis_path: PathBuf,
    pub embedding_path: PathBuf,
    pub analysis_cached: bool,
    pub embedding_cached: bool,
}

/// Produce (or reuse) the analysis file at `output`.
///
/// On any failure no analysis file is written. Returns the analysis and
/// whether it was read from cache.
pub fn extract_analysis(
    input: &Path,
    output: &Path,
    builder: &AnalysisBuilder,
) -> Result<(PluginAnalysis, bool), ExtractError> {
    let cached = cache::load::<PluginAnalysis>(output).map_err(|source| ExtractError::Cache {
        path: output.to_path_buf(),
        source,
    })?;
    if let Some(analysis) = cached {
        info!(path = %output.display(), "Using cached analysis");
        return Ok((analysis, true));
    }

    let analysis = builder.analyze_path(input)?;
    cache::store(output, &analysis).map_err(|source| ExtractError::Cache {
        path: output.to_path_buf(),
        source,
    })?;
    Ok((analysis, false))
}

/// Run the full extraction for one package.
///
/// `provider_factory` is only called when the embedding actually needs to
/// be computed, so a fully cached run never loads a model.
pub async fn extract<F>(
    input: &Path,
    output: &Path,
    builder: &AnalysisBuilder,
    provider_factory: F,
    refresh: bool,
) -> Result<ExtractOutcome>
where
    F: FnOnce() -> Result<Box<dyn EmbeddingProvider>>,
{
    let embedding_path = cache::embedding_path_for(output);

    if refresh {
        cache::invalidate(output)?;
        cache::invalidate(&embedding_path)?;
    }

    let (analysis, analysis_cached) = extract_analysis(input, output, builder)?;

    let (embedding, embedding_cached) = match cache::load::<PluginEmbedding>(&embedding_path)? {
        Some(embedding) => {
            info!(path = %embedding_path.display(), "Using cached embedding");
            (embedding, true)
        }
        None => {
            let provider = provider_factory()?;
            let embedding = ensure_embedding(&embedding_path, &analysis, provider.as_ref()).await?;
            (embedding, false)
        }
    };

    Ok(ExtractOutcome {
        analysis,
        embedding,
        analysis_path: output.to_path_buf(),
        embedding_path,
        analysis_cached,
        embedding_cached,
    })
}
