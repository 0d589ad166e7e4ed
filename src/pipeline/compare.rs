// Comparison pipeline: two analysis files → one ComparisonReport.
//
// Embeddings are read from the conventional `embedding/` sibling of each
// analysis file and derived (then cached) when missing. The token sets are
// rebuilt from the analyses every time; they are cheap and never stored.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::analysis::model::PluginAnalysis;
use crate::cache;
use crate::embedding::model::PluginEmbedding;
use crate::embedding::service::ensure_embedding;
use crate::embedding::traits::EmbeddingProvider;
use crate::error::{CompareError, Side};
use crate::similarity::superminhash::{DEFAULT_BITS_PER_COMPONENT, DEFAULT_COMPONENTS};
use crate::similarity::{embedding_similarity, EmbeddingSimilarity, SimilarityWeights, SuperMinHash};
use crate::tokens::tokenize;

/// Knobs for one comparison.
#[derive(Debug, Clone, Copy)]
pub struct CompareOptions {
    pub weights: SimilarityWeights,
    pub components: usize,
    pub bits_per_component: u32,
}

impl Default for CompareOptions {
    fn default() -> Self {
        Self {
            weights: SimilarityWeights::default(),
            components: DEFAULT_COMPONENTS,
            bits_per_component: DEFAULT_BITS_PER_COMPONENT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonReport {
    pub left: String,
    pub right: String,
    pub embedding: EmbeddingSimilarity,
    /// SuperMinHash Jaccard estimate over the token sets, as a similarity
    pub jaccard: f64,
    pub left_tokens: usize,
    pub right_tokens: usize,
    /// Exact size of the token intersection, for context next to the estimate
    pub shared_tokens: usize,
    pub components: usize,
    pub bits_per_component: u32,
}

/// Read and parse an analysis file, naming the side on failure.
pub fn load_analysis(side: Side, path: &Path) -> Result<PluginAnalysis, CompareError> {
    let invalid = |reason: String| CompareError::InvalidInput {
        side,
        path: path.to_path_buf(),
        reason,
    };
    if !path.exists() {
        return Err(invalid("file not found".to_string()));
    }
    let json = std::fs::read_to_string(path).map_err(|e| invalid(e.to_string()))?;
    serde_json::from_str(&json).map_err(|e| invalid(format!("not a plugin analysis: {e}")))
}

/// Compare two analysis files.
///
/// `provider_factory` is called at most once, and only if at least one
/// side has no cached embedding yet.
pub async fn compare<F>(
    left: &Path,
    right: &Path,
    options: &CompareOptions,
    provider_factory: F,
) -> Result<ComparisonReport>
where
    F: FnOnce() -> Result<Box<dyn EmbeddingProvider>>,
{
    options.weights.validate()?;
    let minhash = SuperMinHash::new(options.components, options.bits_per_component)?;

    let left_analysis = load_analysis(Side::Left, left)?;
    let right_analysis = load_analysis(Side::Right, right)?;

    let mut factory = Some(provider_factory);
    let mut provider: Option<Box<dyn EmbeddingProvider>> = None;
    let mut embeddings = Vec::with_capacity(2);

    for (side, path, analysis) in [
        (Side::Left, left, &left_analysis),
        (Side::Right, right, &right_analysis),
    ] {
        let embedding_path = cache::embedding_path_for(path);
        let cached = cache::load::<PluginEmbedding>(&embedding_path).map_err(|e| {
            CompareError::InvalidInput {
                side,
                path: embedding_path.clone(),
                reason: format!("{e:#}"),
            }
        })?;

        let embedding = match cached {
            Some(embedding) => embedding,
            None => {
                info!(%side, path = %embedding_path.display(), "No cached embedding, deriving it");
                if provider.is_none() {
                    if let Some(make) = factory.take() {
                        provider = Some(make()?);
                    }
                }
                let active = provider
                    .as_deref()
                    .context("Embedding provider is unavailable")?;
                ensure_embedding(&embedding_path, analysis, active)
                    .await
                    .with_context(|| format!("Failed to derive {side} embedding"))?
            }
        };
        embeddings.push(embedding);
    }

    let embedding = embedding_similarity(&embeddings[0], &embeddings[1], &options.weights)?;

    let left_tokens = tokenize(&left_analysis);
    let right_tokens = tokenize(&right_analysis);
    let left_signature = minhash.signature(&left_tokens);
    let right_signature = minhash.signature(&right_tokens);
    let jaccard = minhash.estimate_jaccard(&left_signature, &right_signature)?;

    let report = ComparisonReport {
        left: label_for(&left_analysis, left),
        right: label_for(&right_analysis, right),
        embedding,
        jaccard,
        left_tokens: left_tokens.len(),
        right_tokens: right_tokens.len(),
        shared_tokens: left_tokens.intersection(&right_tokens).count(),
        components: minhash.components(),
        bits_per_component: minhash.bits_per_component(),
    };

    info!(
        left = %report.left,
        right = %report.right,
        cosine = report.embedding.overall,
        jaccard = report.jaccard,
        "Compared plugins"
    );

    Ok(report)
}

fn label_for(analysis: &PluginAnalysis, path: &Path) -> String {
    let fallback = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    analysis.display_name(&fallback).to_string()
}
