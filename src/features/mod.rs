//! Feature vectors consumed by the compatibility classifier
//!
//! - `vector`: the ordered, named feature record
//! - `builder`: derivation of a vector from a pair of trait rows

pub mod builder;
pub mod vector;

pub use builder::{build_vector, BIO_STABILITY, FAMILY_FEATURE, GENOMIC_DIFFICULTY};
pub use vector::{FeatureValue, FeatureVector};
