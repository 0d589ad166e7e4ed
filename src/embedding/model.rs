// Persisted embedding of one analyzed package.

use serde::{Deserialize, Serialize};

/// Three dense vectors, one per text field of the plugin DNA. All three
/// share the producing provider's dimension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginEmbedding {
    pub keywords: Vec<f64>,
    pub description: Vec<f64>,
    pub methods: Vec<f64>,
}

impl PluginEmbedding {
    /// Dimension of the keyword vector. A well-formed embedding uses the
    /// same dimension for every field.
    pub fn dimension(&self) -> usize {
        self.keywords.len()
    }
}
