// Weighted cosine similarity over the three embedding fields.
//
// Each field is compared independently, then the three scores are combined
// with fixed weights. Description and method surface are weighted above
// keywords because keyword overlap (path fragments like "com", "lib") is
// coarse.

use serde::{Deserialize, Serialize};

use crate::embedding::model::PluginEmbedding;
use crate::error::CompareError;

/// Per-field weights. Must sum to 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimilarityWeights {
    pub keywords: f64,
    pub description: f64,
    pub methods: f64,
}

impl Default for SimilarityWeights {
    fn default() -> Self {
        Self {
            keywords: 0.2,
            description: 0.4,
            methods: 0.4,
        }
    }
}

impl SimilarityWeights {
    /// Reject weights that are negative or don't sum to 1.0.
    pub fn validate(&self) -> Result<(), CompareError> {
        let all = [self.keywords, self.description, self.methods];
        if all.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(CompareError::InvalidConfig(format!(
                "weights must be non-negative, got {all:?}"
            )));
        }
        let sum: f64 = all.iter().sum();
        if (sum - 1.0).abs() > 1e-6 {
            return Err(CompareError::InvalidConfig(format!(
                "weights must sum to 1.0, got {sum}"
            )));
        }
        Ok(())
    }
}

/// Cosine scores per field plus the weighted combination.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingSimilarity {
    pub keywords: f64,
    pub description: f64,
    pub methods: f64,
    pub overall: f64,
}

/// Cosine similarity in [-1, 1]. Exactly 0.0 when either vector has zero
/// norm. Callers must check dimensions first.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    debug_assert_eq!(a.len(), b.len());

    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f64>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        (dot / (norm_a * norm_b)).clamp(-1.0, 1.0)
    }
}

fn field_similarity(field: &'static str, a: &[f64], b: &[f64]) -> Result<f64, CompareError> {
    if a.len() != b.len() {
        return Err(CompareError::DimensionMismatch {
            field,
            left: a.len(),
            right: b.len(),
        });
    }
    Ok(cosine_similarity(a, b))
}

/// Compare two embeddings field by field and combine with `weights`.
pub fn embedding_similarity(
    a: &PluginEmbedding,
    b: &PluginEmbedding,
    weights: &SimilarityWeights,
) -> Result<EmbeddingSimilarity, CompareError> {
    let keywords = field_similarity("keywords", &a.keywords, &b.keywords)?;
    let description = field_similarity("description", &a.description, &b.description)?;
    let methods = field_similarity("methods", &a.methods, &b.methods)?;

    Ok(EmbeddingSimilarity {
        keywords,
        description,
        methods,
        overall: weights.keywords * keywords
            + weights.description * description
            + weights.methods * methods,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_identical() {
        let a = vec![1.0, 2.0, 3.0];
        assert!((cosine_similarity(&a, &a) - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_cosine_opposite_is_negative() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![-1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &b) + 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_cosine_orthogonal() {
        let a = vec![1.0, 0.0];
        let b = vec![0.0, 1.0];
        assert!(cosine_similarity(&a, &b).abs() < 1e-10);
    }

    #[test]
    fn test_cosine_zero_vector_is_exactly_zero() {
        let a = vec![0.0, 0.0, 0.0];
        let b = vec![1.0, 2.0, 3.0];
        assert_eq!(cosine_similarity(&a, &b), 0.0);
        assert_eq!(cosine_similarity(&b, &a), 0.0);
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
    }

    #[test]
    fn test_default_weights_valid() {
        assert!(SimilarityWeights::default().validate().is_ok());
    }

    #[test]
    fn test_weights_must_sum_to_one() {
        let w = SimilarityWeights {
            keywords: 0.5,
            description: 0.5,
            methods: 0.5,
        };
        assert!(matches!(w.validate(), Err(CompareError::InvalidConfig(_))));
    }

    #[test]
    fn test_negative_weight_rejected() {
        let w = SimilarityWeights {
            keywords: -0.2,
            description: 0.6,
            methods: 0.6,
        };
        assert!(w.validate().is_err());
    }

    #[test]
    fn test_weighted_combination() {
        let a = PluginEmbedding {
            keywords: vec![1.0, 0.0],
            description: vec![1.0, 0.0],
            methods: vec![1.0, 0.0],
        };
        let b = PluginEmbedding {
            keywords: vec![1.0, 0.0],
            description: vec![0.0, 1.0],
            methods: vec![1.0, 0.0],
        };
        let sim = embedding_similarity(&a, &b, &SimilarityWeights::default()).unwrap();
        assert!((sim.keywords - 1.0).abs() < 1e-10);
        assert!(sim.description.abs() < 1e-10);
        assert!((sim.overall - 0.6).abs() < 1e-10);
    }

    #[test]
    fn test_dimension_mismatch_names_field() {
        let a = PluginEmbedding {
            keywords: vec![1.0, 0.0],
            description: vec![1.0, 0.0],
            methods: vec![1.0, 0.0],
        };
        let mut b = a.clone();
        b.methods = vec![1.0, 0.0, 0.0];
        let err = embedding_similarity(&a, &b, &SimilarityWeights::default()).unwrap_err();
        assert!(matches!(
            err,
            CompareError::DimensionMismatch {
                field: "methods",
                left: 2,
                right: 3
            }
        ));
    }
}
