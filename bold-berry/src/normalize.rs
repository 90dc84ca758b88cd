//! 逐行 (逐体素) 时间序列标准化.

use ndarray::{Array1, ArrayViewMut1, Axis};

use crate::error::{CoreError, CoreResult};
use crate::stats::{is_degenerate, mean_std};
use crate::VoxelMatrix;

/// 零方差 (常量) 时间序列的处理策略.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ZeroVariancePolicy {
    /// 该行整体置零. 默认策略.
    #[default]
    Zero,

    /// 遇到第一条零方差行即返回 `CoreError::DegenerateSeries`.
    Fail,

    /// 照常做 `(x - mean) / std`, 结果中的非有限值原样保留.
    Propagate,
}

/// 对 `matrix` 的每一行做 `(x - mean) / std` 标准化 (总体标准差, ddof = 0).
///
/// 矩阵被消费并原地修改后交还给调用方, 行序不变.
/// 零方差行的处理见 [`ZeroVariancePolicy`].
pub fn normalize(mut matrix: VoxelMatrix, policy: ZeroVariancePolicy) -> CoreResult<VoxelMatrix> {
    let mut degenerate = 0usize;
    for (row, series) in matrix.data_mut().axis_iter_mut(Axis(0)).enumerate() {
        if !normalize_row(series, policy) {
            if policy == ZeroVariancePolicy::Fail {
                return Err(CoreError::DegenerateSeries { row: Some(row) });
            }
            degenerate += 1;
        }
    }
    if degenerate > 0 {
        log::warn!(
            "{degenerate} of {} voxel series have zero variance ({policy:?})",
            matrix.n_voxels()
        );
    }
    Ok(matrix)
}

/// 对单条序列做标准化, 返回一条新序列. 零方差处理同 [`normalize`].
pub fn zscore(series: &Array1<f64>, policy: ZeroVariancePolicy) -> CoreResult<Array1<f64>> {
    let mut out = series.clone();
    if !normalize_row(out.view_mut(), policy) && policy == ZeroVariancePolicy::Fail {
        return Err(CoreError::DegenerateSeries { row: None });
    }
    Ok(out)
}

/// 原地标准化一行. 若该行方差为零则返回 `false`.
///
/// `ZeroVariancePolicy::Fail` 时零方差行保持原样, 由调用方报错.
fn normalize_row(mut s: ArrayViewMut1<f64>, policy: ZeroVariancePolicy) -> bool {
    let (mean, std) = mean_std(s.view());
    let ok = !is_degenerate(mean, std);
    match (ok, policy) {
        (true, _) | (false, ZeroVariancePolicy::Propagate) => {
            s.mapv_inplace(|v| (v - mean) / std);
        }
        (false, ZeroVariancePolicy::Zero) => s.fill(0.0),
        (false, ZeroVariancePolicy::Fail) => {}
    }
    ok
}
