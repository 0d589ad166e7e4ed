// Pairwise similarity: weighted embedding cosine and set Jaccard estimate.

pub mod cosine;
pub mod superminhash;

pub use cosine::{cosine_similarity, embedding_similarity, EmbeddingSimilarity, SimilarityWeights};
pub use superminhash::{Signature, SuperMinHash};
