//! 对称矩阵特征分解. 底层由 `nalgebra` 完成, 这里负责排序与 `ndarray` 互转.

use nalgebra::{DMatrix, SymmetricEigen};
use ndarray::{Array2, ArrayView2};

use crate::error::{CoreError, CoreResult};

/// 每阶允许的最大迭代次数.
const MAX_ITER_PER_ORDER: usize = 100;

/// 按特征值降序排列的特征分解结果.
pub(crate) struct SortedEigen {
    /// 特征值, 降序, 已截断到 `>= 0`.
    pub values: Vec<f64>,
    /// 第 `i` 列是 `values[i]` 对应的单位特征向量.
    pub vectors: Array2<f64>,
}

/// 分解半正定对称矩阵 `m`.
///
/// 特征值相等时保持分解算法给出的自然顺序 (稳定排序).
pub(crate) fn symmetric_desc(m: ArrayView2<f64>) -> CoreResult<SortedEigen> {
    let order = m.nrows();
    debug_assert_eq!(order, m.ncols());

    let dm = DMatrix::from_fn(order, order, |r, c| m[(r, c)]);
    let eig = SymmetricEigen::try_new(dm, f64::EPSILON, MAX_ITER_PER_ORDER * order.max(1))
        .ok_or(CoreError::Decomposition { order })?;

    let mut idx: Vec<usize> = (0..order).collect();
    idx.sort_by(|&a, &b| eig.eigenvalues[b].total_cmp(&eig.eigenvalues[a]));

    // 半正定矩阵的负特征值只可能来自舍入误差.
    let values = idx.iter().map(|&i| eig.eigenvalues[i].max(0.0)).collect();
    let vectors = Array2::from_shape_fn((order, order), |(r, c)| eig.eigenvectors[(r, idx[c])]);
    Ok(SortedEigen { values, vectors })
}

#[cfg(test)]
mod tests {
    use super::symmetric_desc;
    use ndarray::{arr2, Array1};

    #[test]
    fn test_sorted_desc() {
        let m = arr2(&[[2.0, 0.0, 0.0], [0.0, 5.0, 0.0], [0.0, 0.0, 1.0]]);
        let e = symmetric_desc(m.view()).unwrap();
        assert_eq!(e.values.len(), 3);
        assert!((e.values[0] - 5.0).abs() < 1e-12);
        assert!((e.values[1] - 2.0).abs() < 1e-12);
        assert!((e.values[2] - 1.0).abs() < 1e-12);
        assert!((e.vectors[(1, 0)].abs() - 1.0).abs() < 1e-12);
        assert!((e.vectors[(0, 1)].abs() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_eigen_equation() {
        let m = arr2(&[[4.0, 1.0, 0.5], [1.0, 3.0, 0.2], [0.5, 0.2, 1.0]]);
        let e = symmetric_desc(m.view()).unwrap();
        for (i, lambda) in e.values.iter().enumerate() {
            let v: Array1<f64> = e.vectors.column(i).to_owned();
            let mv = m.dot(&v);
            for (a, b) in mv.iter().zip(v.iter()) {
                assert!((a - lambda * b).abs() < 1e-9);
            }
            assert!((v.dot(&v) - 1.0).abs() < 1e-9);
        }
        assert!(e.values.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn test_clamp_negative() {
        let m = arr2(&[[0.0, 0.0], [0.0, -1e-18]]);
        let e = symmetric_desc(m.view()).unwrap();
        assert!(e.values.iter().all(|v| *v >= 0.0));
    }
}
