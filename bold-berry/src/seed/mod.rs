//! 种子相关: 以种子区域的平均信号为参考, 计算脑内每个体素的 Pearson 相关系数.

use ndarray::{Array1, ArrayView1, Axis};

use crate::data::{FuncVolume, Mask, NiftiHeaderAttr, VoxelMatrix};
use crate::error::{CoreError, CoreResult};
use crate::stats::{is_degenerate, mean_std, pearson_centered};

mod map;

pub use map::CorrelationMap;

cfg_if::cfg_if! {
    if #[cfg(feature = "rayon")] {
        use rayon::iter::{IntoParallelIterator, ParallelIterator};
    }
}

/// 已去均值准备好的参考序列.
struct Reference {
    series: Array1<f64>,
    mean: f64,
}

impl Reference {
    /// 体素序列与参考序列的相关系数. 体素序列方差为零时返回 `None`.
    fn score(&self, s: ArrayView1<f64>) -> Option<f64> {
        let (mean, std) = mean_std(s);
        if is_degenerate(mean, std) {
            return None;
        }
        pearson_centered(s, mean, self.series.view(), self.mean)
    }
}

/// 以 `seed` 与 `brain` 交集内体素的平均时间序列为参考,
/// 计算 `brain` 内每个体素与参考的 Pearson 相关系数.
///
/// 方差为零的体素相关系数记为 0, 其展平索引记入 [`CorrelationMap::degenerate`].
///
/// # 错误
///
/// 1. 三者空间形状不一致时返回 `CoreError::ShapeMismatch`.
/// 2. `seed` 与 `brain` 的交集为空 (包括 `brain` 没有选中任何体素) 时返回 `CoreError::EmptySeed`.
/// 3. 参考序列方差为零时返回 `CoreError::DegenerateSeries { row: None }`.
pub fn seed_correlate(func: &FuncVolume, seed: &Mask, brain: &Mask) -> CoreResult<CorrelationMap> {
    let (matrix, reference) = prepare(func, seed, brain)?;
    let scores = matrix
        .data()
        .axis_iter(Axis(0))
        .map(|s| reference.score(s))
        .collect();
    Ok(assemble(func, &matrix, scores))
}

/// 借助 `rayon`, 并行地运行 [`seed_correlate`]. 结果与串行版本一致.
#[cfg(feature = "rayon")]
pub fn par_seed_correlate(
    func: &FuncVolume,
    seed: &Mask,
    brain: &Mask,
) -> CoreResult<CorrelationMap> {
    let (matrix, reference) = prepare(func, seed, brain)?;
    let scores = matrix
        .data()
        .axis_iter(Axis(0))
        .into_par_iter()
        .map(|s| reference.score(s))
        .collect();
    Ok(assemble(func, &matrix, scores))
}

/// 形状检查, 提取脑内体素并计算参考序列.
fn prepare(func: &FuncVolume, seed: &Mask, brain: &Mask) -> CoreResult<(VoxelMatrix, Reference)> {
    if seed.spatial_shape() != func.spatial_shape() {
        return Err(CoreError::ShapeMismatch {
            expected: func.spatial_shape(),
            found: seed.spatial_shape(),
        });
    }
    let matrix = VoxelMatrix::extract(func, brain).map_err(|e| match e {
        CoreError::EmptyMask => CoreError::EmptySeed,
        e => e,
    })?;

    let mut sum = Array1::<f64>::zeros(matrix.n_timepoints());
    let mut count = 0usize;
    for (row, pos) in matrix.index().positions().enumerate() {
        if seed.is_selected_at(pos) {
            sum += &matrix.row(row);
            count += 1;
        }
    }
    if count == 0 {
        return Err(CoreError::EmptySeed);
    }
    let series = sum / count as f64;

    let (mean, std) = mean_std(series.view());
    if is_degenerate(mean, std) {
        return Err(CoreError::DegenerateSeries { row: None });
    }
    log::debug!(
        "seed reference from {count} voxels, {} brain voxels",
        matrix.n_voxels()
    );
    Ok((matrix, Reference { series, mean }))
}

/// 将逐体素结果散射为相关图.
fn assemble(func: &FuncVolume, matrix: &VoxelMatrix, scores: Vec<Option<f64>>) -> CorrelationMap {
    let degenerate: Vec<usize> = matrix
        .index()
        .iter()
        .zip(&scores)
        .filter_map(|(flat, r)| r.is_none().then_some(flat))
        .collect();
    if !degenerate.is_empty() {
        log::warn!(
            "{} of {} voxels have zero variance, correlation set to 0",
            degenerate.len(),
            matrix.n_voxels()
        );
    }

    let data = matrix
        .index()
        .scatter(scores.into_iter().map(|r| r.unwrap_or(0.0) as f32), 0.0);
    CorrelationMap::new(func.header(), data, degenerate)
}
