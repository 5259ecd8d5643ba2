//! Pestiform Model - the pesticide tolerability classifier.
//!
//! The classifier is trained offline; this crate only loads the exported
//! artifact and evaluates it. See [`tree::DecisionTree`] for the format.

pub mod error;
pub mod tree;

pub use error::ModelError;
pub use tree::DecisionTree;

/// A fitted model mapping one feature row to a class label.
///
/// Implementations are immutable after construction and shared between
/// requests behind an `Arc`.
pub trait Classifier: Send + Sync {
    /// Width of the feature rows this model accepts.
    fn n_features(&self) -> usize;

    /// Predict the class label for one row.
    fn predict(&self, row: &[f64]) -> Result<i64, ModelError>;
}
