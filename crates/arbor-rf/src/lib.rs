//! Random Forest classification for decision boundary rendering.
//!
//! A hand-rolled Random Forest of CART decision trees: Gini/Entropy split
//! criteria, bootstrap sampling, per-tree depth caps, parallel training via
//! rayon, and averaged-probability prediction. Training is deterministic for
//! a fixed seed — per-tree RNGs are derived from a seeded ChaCha8 master RNG.

mod error;
mod forest;
mod node;
mod split;
mod tree;

pub use error::ForestError;
pub use forest::{ClassDistribution, ForestConfig, MaxFeatures, RandomForest};
pub use node::{Node, NodeId};
pub use split::SplitCriterion;
pub use tree::{DecisionTree, DecisionTreeConfig};
