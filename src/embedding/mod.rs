// Dense embeddings of plugin DNA: providers, persisted model, and service.

pub mod download;
pub mod hashing;
pub mod model;
pub mod onnx;
pub mod service;
pub mod traits;

pub use hashing::HashingEmbedder;
pub use model::PluginEmbedding;
pub use onnx::SentenceEmbedder;
pub use service::{embed_plugin, ensure_embedding};
pub use traits::EmbeddingProvider;
