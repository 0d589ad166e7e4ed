// Package analysis: the canonical record, its signature, and its builder.

pub mod builder;
pub mod dependencies;
pub mod model;
pub mod signature;

pub use builder::AnalysisBuilder;
pub use dependencies::OwnCodeFilter;
pub use model::PluginAnalysis;
