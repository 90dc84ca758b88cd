//! 🍇欢迎光临🍓
//!
//! 涵盖了本 crate 一系列常用的功能.

pub use crate::{Idx3d, Shape3d};

pub use crate::data::{FuncVolume, IndexMap, Mask, NiftiHeaderAttr, VoxelMatrix};

pub use crate::compcor::{extract_components, Component, ComponentSet};
pub use crate::normalize::{normalize, zscore, ZeroVariancePolicy};
pub use crate::seed::{seed_correlate, CorrelationMap};

#[cfg(feature = "rayon")]
pub use crate::seed::par_seed_correlate;

pub use crate::config::{CompCorConfig, SeedCorrConfig};
pub use crate::consts::{DEFAULT_COMPONENTS, TEXT_PRECISION};
pub use crate::error::{ConfigError, CoreError, CoreResult, IoError};
pub use crate::io::{corr_output_name, save_text_matrix, write_text_matrix};
pub use crate::stats::{fisher_z, pearson};
