// Model-free embedding via the hashing trick.
//
// Every whitespace-separated token (lower-cased) is hashed into one of
// `dimension` buckets and adds +1 or -1 there, the sign taken from an
// independent hash bit. Texts sharing vocabulary get correlated vectors,
// which is all the cosine comparison needs. Fully deterministic and
// instant, so it backs tests and machines without the ONNX model.
//
// Vectors are persisted in the embedding cache, so the hash is SHA-256:
// buckets must not move between builds, platforms, or crate versions.

use anyhow::Result;
use async_trait::async_trait;
use sha2::{Digest, Sha256};

use super::onnx::EMBEDDING_DIM;
use super::traits::EmbeddingProvider;

pub struct HashingEmbedder {
    dimension: usize,
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self::new(EMBEDDING_DIM)
    }
}

impl HashingEmbedder {
    /// `dimension` is clamped to at least 1.
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
        }
    }

    /// Bucket from the first 8 digest bytes (big-endian), sign from the
    /// top bit of the ninth.
    fn bucket_and_sign(&self, token: &str) -> (usize, f64) {
        let digest = Sha256::digest(token.as_bytes());
        let mut head = [0u8; 8];
        head.copy_from_slice(&digest[..8]);
        let bucket = (u64::from_be_bytes(head) % self.dimension as u64) as usize;
        let sign = if digest[8] & 0x80 == 0 { 1.0 } else { -1.0 };
        (bucket, sign)
    }

    pub fn embed_sync(&self, text: &str) -> Vec<f64> {
        let mut vector = vec![0.0; self.dimension];
        for token in text.split_whitespace() {
            let (bucket, sign) = self.bucket_and_sign(&token.to_lowercase());
            vector[bucket] += sign;
        }
        vector
    }
}

#[async_trait]
impl EmbeddingProvider for HashingEmbedder {
    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed(&self, text: &str) -> Result<Vec<f64>> {
        Ok(self.embed_sync(text))
    }
}
