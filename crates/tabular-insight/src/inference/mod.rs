//! Semantic type inference.
//!
//! - [`value`]: classifies a single rendered value
//! - [`column`]: votes over a seeded sample to type a whole column
//! - [`dates`]: the permissive date parser both of them rely on

pub mod column;
pub mod dates;
pub mod value;

pub use column::SemanticClassifier;
pub use dates::parse_date;
pub use value::{classify_cell, classify_value};
