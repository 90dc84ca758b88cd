#![warn(missing_docs)]

//! 核心库. 从 4D fMRI nifti 数据中提取掩膜内体素的时间序列, 并在其上完成
//! CompCor 噪声成分分解与种子点相关图计算.
//!
//! 该 crate 仅提供 `safe` 接口, 且所有数值操作都是无全局状态的纯函数.
//!
//! # 约定
//!
//! 1. 全库统一采用 "行 = 体素, 列 = 时间点" 的矩阵约定.
//! 2. 空间索引按 `(x, y, z)` 行优先展平: `flat = (x * Y + y) * Z + z`.
//! 3. 掩膜阈值为 `>= 1` 而不是 `!= 0`. 上游掩膜是整数标签,
//!   插值产生的微小正浮点值不能被当作选中.
//! 4. 可预期的错误 (形状不一致, 空掩膜, 秩不足等) 通过 `Result` 返回,
//!   不会 panic.
//!
//! # 开发计划
//!
//! ### 掩膜体素提取 ✅
//!
//! 4D 体数据 + 3D 掩膜 -> (体素 × 时间) 矩阵 + 展平索引表,
//! 并支持把逐体素结果散射回体空间.
//!
//! 实现位于 `bold-berry/src/data`.
//!
//! ### 逐行标准化 ✅
//!
//! 零方差行的处理方式是显式策略 (`ZeroVariancePolicy`), 而不是浮点运算的副产品.
//!
//! 实现位于 `bold-berry/src/normalize.rs`.
//!
//! ### CompCor 主成分 ✅
//!
//! 在较小的 Gram 形式上做对称特征分解, 输出白化后的成分时间序列及解释方差比例.
//!
//! 实现位于 `bold-berry/src/compcor`.
//!
//! ### 种子点相关图 ✅
//!
//! 种子 ∩ 脑掩膜 的平均时间序列作为参考, 计算脑掩膜内逐体素 Pearson 相关系数.
//! 额外提供 Fisher r-to-z 变换.
//!
//! 实现位于 `bold-berry/src/seed`.
//!
//! ### 持久化 ✅
//!
//! 成分矩阵以 12 位小数纯文本保存; 相关图以 `corr_<seed>_<func>.nii.gz` 命名保存.
//!
//! 实现位于 `bold-berry/src/io`.

/// 三维索引.
pub type Idx3d = (usize, usize, usize);

/// 三维空间形状 `(X, Y, Z)`.
pub type Shape3d = (usize, usize, usize);

/// 4D/3D nii 文件基础数据结构, 以及掩膜体素提取.
pub mod data;

pub mod compcor;
pub mod config;
pub mod consts;
pub mod error;
pub mod io;
pub mod normalize;
pub mod prelude;
pub mod seed;
pub mod stats;

pub use data::{FuncVolume, IndexMap, Mask, NiftiHeaderAttr, VoxelMatrix};

pub use compcor::{extract_components, Component, ComponentSet};
pub use config::{CompCorConfig, SeedCorrConfig};
pub use error::{ConfigError, CoreError, CoreResult, IoError};
pub use normalize::{normalize, ZeroVariancePolicy};
pub use seed::{seed_correlate, CorrelationMap};

#[cfg(feature = "rayon")]
pub use seed::par_seed_correlate;
