//! 通用常量.

/// 掩膜阈值. 体素值 `>= MASK_THRESHOLD` 即视为被选中.
pub const MASK_THRESHOLD: f32 = 1.0;

/// 成分矩阵文本文件的默认小数位数.
pub const TEXT_PRECISION: usize = 12;

/// `compcor` 默认提取的成分个数.
pub const DEFAULT_COMPONENTS: usize = 5;

/// 相关图输出文件名前缀.
pub const CORR_PREFIX: &str = "corr_";

/// 压缩 nifti 文件后缀.
pub const NII_GZ: &str = ".nii.gz";

/// 未压缩 nifti 文件后缀.
pub const NII: &str = ".nii";

/// Fisher z 变换前对 `|r|` 的截断上限, 保证输出有限.
pub const FISHER_R_CLIP: f64 = 1.0 - 1e-7;

/// 掩膜体素值是否代表 "选中"?
///
/// NaN 永远不被选中.
#[inline]
pub fn is_selected(v: f32) -> bool {
    v >= MASK_THRESHOLD
}
