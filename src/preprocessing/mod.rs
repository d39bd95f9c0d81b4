//! Data preparation stages.
//!
//! - [`Normalizer`]: deduplication, column pruning, derived features, null filtering
//! - [`ClassBalancer`]: majority-class downsampling
//! - [`CategoryEncoder`]: category string to integer code

mod balance;
mod encoder;
mod normalize;

pub use balance::{BalancedDataset, ClassBalancer, ClassCounts};
pub use encoder::CategoryEncoder;
pub use normalize::{
    ConcatColumns, FeatureDeriver, NormalizeSpec, NormalizeStats, Normalizer, PrefixColumn,
};
