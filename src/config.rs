use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::analysis::OwnCodeFilter;
use crate::similarity::superminhash::{DEFAULT_BITS_PER_COMPONENT, DEFAULT_COMPONENTS};
use crate::similarity::SimilarityWeights;

/// Which embedding provider to use.
#[derive(Debug, Clone, PartialEq)]
pub enum EmbeddingBackend {
    /// Local ONNX sentence transformer (default). Needs `download-model` once.
    Onnx,
    /// Feature hashing, no model files. Deterministic but purely lexical.
    Hashing,
}

/// Central configuration loaded from environment variables.
///
/// The .env file is loaded automatically at startup via dotenvy. Every
/// setting has a default, so an empty environment is a valid one.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory containing the ONNX model files
    pub model_dir: PathBuf,
    pub embedding_backend: EmbeddingBackend,
    /// SuperMinHash signature length
    pub minhash_components: usize,
    pub minhash_bits: u32,
    pub weights: SimilarityWeights,
    pub own_code: OwnCodeFilter,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from any key → value source. `load` uses the process
    /// environment; tests pass a map.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let embedding_backend = match lookup("PLUGIN_DNA_EMBEDDER").as_deref() {
            Some("hashing") => EmbeddingBackend::Hashing,
            // "onnx" or unset
            None | Some("onnx") => EmbeddingBackend::Onnx,
            Some(other) => anyhow::bail!(
                "PLUGIN_DNA_EMBEDDER must be `onnx` or `hashing`, got `{other}`"
            ),
        };

        let model_dir = lookup("PLUGIN_DNA_MODEL_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(crate::embedding::download::default_model_dir);

        let minhash_components = match lookup("PLUGIN_DNA_MINHASH_COMPONENTS") {
            Some(raw) => raw
                .trim()
                .parse()
                .with_context(|| format!("PLUGIN_DNA_MINHASH_COMPONENTS is not a number: {raw}"))?,
            None => DEFAULT_COMPONENTS,
        };

        let minhash_bits = match lookup("PLUGIN_DNA_MINHASH_BITS") {
            Some(raw) => raw
                .trim()
                .parse()
                .with_context(|| format!("PLUGIN_DNA_MINHASH_BITS is not a number: {raw}"))?,
            None => DEFAULT_BITS_PER_COMPONENT,
        };

        let weights = match lookup("PLUGIN_DNA_WEIGHTS") {
            Some(raw) => parse_weights(&raw)?,
            None => SimilarityWeights::default(),
        };

        let own_code = match lookup("PLUGIN_DNA_OWN_JAR_PATTERN") {
            Some(raw) if raw.trim().eq_ignore_ascii_case("none") => OwnCodeFilter::None,
            Some(raw) if !raw.trim().is_empty() => OwnCodeFilter::Pattern(raw.trim().to_string()),
            _ => OwnCodeFilter::DeclaredId,
        };

        Ok(Self {
            model_dir,
            embedding_backend,
            minhash_components,
            minhash_bits,
            weights,
            own_code,
        })
    }

    /// Validate that the chosen embedding backend has what it needs.
    /// For ONNX the model files must exist (or the user should run download-model).
    pub fn require_embedder(&self) -> Result<()> {
        match self.embedding_backend {
            EmbeddingBackend::Onnx => {
                if !crate::embedding::download::embedding_files_present(&self.model_dir) {
                    anyhow::bail!(
                        "Embedding model files not found in {}\n\
                         Run `plugin-dna download-model` to download them.\n\
                         Or set PLUGIN_DNA_EMBEDDER=hashing to embed without a model.",
                        self.model_dir.display()
                    );
                }
                Ok(())
            }
            EmbeddingBackend::Hashing => Ok(()),
        }
    }
}

/// Parse `keywords,description,methods`, e.g. `0.2,0.4,0.4`.
pub fn parse_weights(raw: &str) -> Result<SimilarityWeights> {
    let parts = raw
        .split(',')
        .map(|p| {
            p.trim()
                .parse::<f64>()
                .with_context(|| format!("PLUGIN_DNA_WEIGHTS has a non-numeric weight: `{p}`"))
        })
        .collect::<Result<Vec<_>>>()?;

    let [keywords, description, methods] = parts[..] else {
        anyhow::bail!(
            "PLUGIN_DNA_WEIGHTS needs three comma-separated weights \
             (keywords,description,methods), got {}",
            parts.len()
        );
    };

    let weights = SimilarityWeights {
        keywords,
        description,
        methods,
    };
    weights.validate()?;
    Ok(weights)
}
