//! Voice text canonicalization

pub mod normalize;
mod numbers;

pub use normalize::{NormalizationTable, Normalizer};
