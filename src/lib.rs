// plugin-dna: fingerprinting and similarity scoring for plugin packages
//
// This is the library root. Extraction flows archive → classfile /
// descriptor → analysis; comparison flows analysis → tokens / embedding →
// similarity. `pipeline` wires the two flows to the on-disk cache.

pub mod analysis;
pub mod archive;
pub mod cache;
pub mod classfile;
pub mod config;
pub mod descriptor;
pub mod embedding;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod similarity;
pub mod tokens;
