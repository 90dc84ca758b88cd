//! 运行时错误.

use crate::Shape3d;
use thiserror::Error;

/// 数值核心的运行时错误.
///
/// 所有核心操作都会快速失败并把错误原样交给调用方, 不重试, 也不替换默认值.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoreError {
    /// 成对输入的空间形状不一致.
    #[error("空间形状不一致: 期望 {expected:?}, 实际 {found:?}")]
    ShapeMismatch {
        /// 数据体的空间形状.
        expected: Shape3d,
        /// 掩膜的空间形状.
        found: Shape3d,
    },

    /// 掩膜没有选中任何体素.
    #[error("掩膜没有选中任何体素 (阈值 >= 1)")]
    EmptyMask,

    /// 种子与脑掩膜的交集为空.
    #[error("种子区域与脑掩膜没有交集")]
    EmptySeed,

    /// 请求的成分个数超过了可达到的秩.
    #[error("请求 {requested} 个成分, 但最多只能提取 {max} 个")]
    InsufficientRank {
        /// 请求的成分个数.
        requested: usize,
        /// `min(体素数, 时间点数)`.
        max: usize,
    },

    /// 成分个数必须为正.
    #[error("成分个数必须大于 0")]
    InvalidComponentCount,

    /// 时间序列方差为零. `row` 为 `None` 时代表种子参考序列.
    #[error("时间序列方差为零 (row = {row:?})")]
    DegenerateSeries {
        /// 体素矩阵中的行号.
        row: Option<usize>,
    },

    /// 特征分解未收敛.
    #[error("特征分解未收敛 (矩阵阶数 {order})")]
    Decomposition {
        /// 被分解的对称矩阵阶数.
        order: usize,
    },
}

/// 数值核心的运行结果.
pub type CoreResult<T> = Result<T, CoreError>;

/// 文件读写错误.
#[derive(Debug, Error)]
pub enum IoError {
    /// nifti 解析或写入失败.
    #[error("nifti 错误: {0}")]
    Nifti(#[from] nifti::NiftiError),

    /// 底层 I/O 错误.
    #[error("I/O 错误: {0}")]
    Io(#[from] std::io::Error),

    /// 不支持的数据维度.
    #[error("不支持的数据维度: {shape:?} (期望 {expected})")]
    Dimensionality {
        /// 实际读到的形状.
        shape: Vec<usize>,
        /// 期望的维度描述.
        expected: &'static str,
    },

    /// 数值核心报错.
    #[error(transparent)]
    Core(#[from] CoreError),
}

/// 配置校验错误.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// 必需的路径为空.
    #[error("缺少参数 `{0}`")]
    MissingPath(&'static str),

    /// 输入文件不存在.
    #[error("输入文件不存在: {0}")]
    NotFound(std::path::PathBuf),

    /// 输出目录不存在或不是目录.
    #[error("输出目录不可用: {0}")]
    NotADirectory(std::path::PathBuf),

    /// 成分个数必须为正.
    #[error("成分个数必须大于 0")]
    ZeroComponents,
}
