//! reflbin-core: Data model and numeric primitives for reflectometry reduction.
//!
//! This crate provides the measurement record handed over by instrument
//! loaders, the column bundle used while combining points, the
//! Poisson-consistent average shared by merging and rebinning, and Q bin
//! edge construction.
//!

pub mod bundle;
pub mod combine;
pub mod config;
pub mod edges;
pub mod error;
pub mod intent;
pub mod poisson;
pub mod record;
pub mod resolution;
pub mod units;

pub use bundle::{Column, ColumnBundle};
pub use combine::{CombineStatistics, PointCombiner};
pub use config::{MergeConfig, MergeWeight, RebinConfig};
pub use edges::{linear_centers, BinEdges};
pub use error::{Error, Result};
pub use intent::{Intent, NormBasis};
pub use poisson::{poisson_average, PoissonAccumulator};
pub use record::{broadcast, Environment, MeasurementRecord};
