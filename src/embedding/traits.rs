// Embedding provider trait, the seam between analysis text and vectors.
//
// The default implementation runs a local ONNX sentence transformer. The
// hashing provider needs no model files and is used by tests and by
// `PLUGIN_DNA_EMBEDDER=hashing`.

use anyhow::Result;
use async_trait::async_trait;

/// Maps text to a fixed-dimension vector. Implementations must be
/// deterministic: identical text always yields an identical vector.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Length of every vector this provider returns.
    fn dimension(&self) -> usize;

    /// Embed a single text.
    async fn embed(&self, text: &str) -> Result<Vec<f64>>;

    /// Embed several texts, returning vectors in the same order.
    /// Default implementation calls `embed` sequentially; providers can
    /// override for batching.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f64>>> {
        let mut vectors = Vec::with_capacity(texts.len());
        for text in texts {
            vectors.push(self.embed(text).await?);
        }
        Ok(vectors)
    }
}
