// Analysis → PluginEmbedding, plus the cache-first wrapper around it.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, info};

use super::model::PluginEmbedding;
use super::traits::EmbeddingProvider;
use crate::analysis::model::PluginAnalysis;
use crate::cache;

/// Method symbols per embedded chunk. The chunk vectors are averaged, so a
/// package's method surface is covered in full rather than truncated.
pub const METHOD_CHUNK_SIZE: usize = 500;

/// Embed the three DNA fields of an analysis.
///
/// Blank text and an empty method set map to the zero vector, which scores
/// cosine 0 against anything rather than matching another blank field.
pub async fn embed_plugin(
    analysis: &PluginAnalysis,
    provider: &dyn EmbeddingProvider,
) -> Result<PluginEmbedding> {
    let dna = &analysis.plugin_dna;
    let dimension = provider.dimension();

    let keywords_text = dna.keywords.iter().map(String::as_str).collect::<Vec<_>>().join(" ");
    let keywords = embed_text(provider, &keywords_text)
        .await
        .context("Failed to embed keywords")?;

    let description = embed_text(provider, dna.description.as_deref().unwrap_or(""))
        .await
        .context("Failed to embed description")?;

    let methods: Vec<&str> = dna.methods.iter().map(String::as_str).collect();
    let chunks: Vec<String> = methods
        .chunks(METHOD_CHUNK_SIZE)
        .map(|chunk| chunk.join(" "))
        .collect();
    let methods = if chunks.is_empty() {
        vec![0.0; dimension]
    } else {
        let vectors = provider
            .embed_batch(&chunks)
            .await
            .context("Failed to embed method symbols")?;
        mean_embedding(&vectors, dimension)
    };

    debug!(
        dimension,
        method_chunks = chunks.len(),
        "Embedded plugin DNA"
    );

    Ok(PluginEmbedding {
        keywords,
        description,
        methods,
    })
}

async fn embed_text(provider: &dyn EmbeddingProvider, text: &str) -> Result<Vec<f64>> {
    if text.trim().is_empty() {
        return Ok(vec![0.0; provider.dimension()]);
    }
    provider.embed(text).await
}

/// Element-wise mean of several vectors. Zero vector when there are none.
pub fn mean_embedding(vectors: &[Vec<f64>], dimension: usize) -> Vec<f64> {
    let mut mean = vec![0.0_f64; dimension];
    if vectors.is_empty() {
        return mean;
    }

    for vector in vectors {
        for (slot, &val) in mean.iter_mut().zip(vector) {
            *slot += val;
        }
    }

    let n = vectors.len() as f64;
    for val in &mut mean {
        *val /= n;
    }
    mean
}

/// Return the embedding cached at `path`, or compute and store it.
/// A cached file is trusted as-is; the provider is not consulted.
pub async fn ensure_embedding(
    path: &Path,
    analysis: &PluginAnalysis,
    provider: &dyn EmbeddingProvider,
) -> Result<PluginEmbedding> {
    if let Some(cached) = cache::load::<PluginEmbedding>(path)? {
        info!(path = %path.display(), "Using cached embedding");
        return Ok(cached);
    }
    let embedding = embed_plugin(analysis, provider).await?;
    cache::store(path, &embedding)?;
    Ok(embedding)
}
