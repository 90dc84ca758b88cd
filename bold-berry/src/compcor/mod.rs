//! CompCor 成分提取: 对掩膜内体素时间序列做主成分分析.
//!
//! 观测为时间点, 特征为体素. 分解总是在两个 Gram 形式中较小的一个上进行:
//!
//! 1. `T <= V` 时分解 `T × T` 的时间 Gram 矩阵 `XᵀX`, 其特征向量即为时间方向的成分;
//! 2. 否则分解 `V × V` 的 `XXᵀ`, 再由 `Xᵀv / ‖Xᵀv‖` 得到时间方向的成分.
//!
//! 其中 `X` 为逐行去均值后的 (体素 × 时间) 矩阵. 两种形式的非零特征值相同.

use ndarray::{Array1, Array2, ArrayView1, Axis};

use crate::error::{CoreError, CoreResult};
use crate::VoxelMatrix;

mod eigen;

/// 范数低于该值的时间方向向量视为零向量 (对应零特征值).
const NULL_NORM: f64 = 1e-12;

/// 一个主成分.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Component {
    series: Array1<f64>,
    explained_variance_ratio: f64,
}

impl Component {
    /// 白化后的成分时间序列, 长度为时间点数, 样本方差 (ddof = 1) 为 1.
    #[inline]
    pub fn series(&self) -> ArrayView1<'_, f64> {
        self.series.view()
    }

    /// 该成分解释的方差占总方差的比例, 位于 `[0, 1]`.
    #[inline]
    pub fn explained_variance_ratio(&self) -> f64 {
        self.explained_variance_ratio
    }
}

/// 按解释方差降序排列的一组成分.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ComponentSet {
    components: Vec<Component>,
    n_timepoints: usize,
}

impl ComponentSet {
    /// 成分个数.
    #[inline]
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// 是否为空. 由 [`extract_components`] 得到的集合永远非空.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// 时间点个数.
    #[inline]
    pub fn n_timepoints(&self) -> usize {
        self.n_timepoints
    }

    /// 第 `i` 个成分. 越界时返回 `None`.
    #[inline]
    pub fn get(&self, i: usize) -> Option<&Component> {
        self.components.get(i)
    }

    /// 按解释方差降序迭代.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &Component> + '_ {
        self.components.iter()
    }

    /// 各成分的解释方差比例, 非增.
    pub fn explained_variance(&self) -> Vec<f64> {
        self.iter().map(|c| c.explained_variance_ratio).collect()
    }

    /// 回归量矩阵, 形状为 (时间点数 × 成分数), 第 `j` 列是第 `j` 个成分.
    pub fn to_regressors(&self) -> Array2<f64> {
        let mut out = Array2::zeros((self.n_timepoints, self.len()));
        for (mut col, c) in out.axis_iter_mut(Axis(1)).zip(self.iter()) {
            col.assign(&c.series);
        }
        out
    }
}

/// 从 `matrix` 中提取前 `n` 个主成分.
///
/// `matrix` 应当已由调用方标准化, 这里只去掉每个体素的时间均值, 不再缩放.
///
/// # 错误
///
/// 1. `n == 0` 时返回 `CoreError::InvalidComponentCount`.
/// 2. `n > min(体素数, 时间点数)` 时返回 `CoreError::InsufficientRank`.
/// 3. 特征分解未收敛时返回 `CoreError::Decomposition`.
pub fn extract_components(matrix: &VoxelMatrix, n: usize) -> CoreResult<ComponentSet> {
    let (v, t) = (matrix.n_voxels(), matrix.n_timepoints());
    if n == 0 {
        return Err(CoreError::InvalidComponentCount);
    }
    let max = v.min(t);
    if n > max {
        return Err(CoreError::InsufficientRank { requested: n, max });
    }

    let x = centered(matrix);
    let set = decompose(&x, n, t <= v)?;
    log::debug!(
        "extracted {n} components from {v} voxels x {t} timepoints, ratios {:?}",
        set.explained_variance()
    );
    Ok(set)
}

/// 逐行去掉时间均值.
fn centered(matrix: &VoxelMatrix) -> Array2<f64> {
    let mut x = matrix.data().to_owned();
    for mut row in x.axis_iter_mut(Axis(0)) {
        if let Some(mean) = row.mean() {
            row -= mean;
        }
    }
    x
}

/// 对已去均值的 `x` (体素 × 时间) 做分解.
///
/// `temporal` 为真时分解 `XᵀX`, 否则分解 `XXᵀ`.
fn decompose(x: &Array2<f64>, n: usize, temporal: bool) -> CoreResult<ComponentSet> {
    let t = x.ncols();
    let (values, time_vectors) = if temporal {
        let gram = x.t().dot(x);
        let eig = eigen::symmetric_desc(gram.view())?;
        let vectors = eig.vectors.slice(ndarray::s![.., ..n]).to_owned();
        (eig.values, vectors)
    } else {
        let gram = x.dot(&x.t());
        let eig = eigen::symmetric_desc(gram.view())?;
        let mut vectors = Array2::zeros((t, n));
        for (mut col, v) in vectors.axis_iter_mut(Axis(1)).zip(eig.vectors.axis_iter(Axis(1))) {
            let u = x.t().dot(&v);
            let norm = u.dot(&u).sqrt();
            if norm > NULL_NORM {
                col.assign(&(u / norm));
            }
        }
        (eig.values, vectors)
    };

    let trace: f64 = values.iter().sum();
    let scale = if t > 1 { ((t - 1) as f64).sqrt() } else { 1.0 };

    let components = time_vectors
        .axis_iter(Axis(1))
        .zip(&values)
        .map(|(u, &lambda)| {
            let mut series = u.to_owned();
            flip_sign(&mut series);
            series *= scale;
            let ratio = if trace > 0.0 { lambda / trace } else { 0.0 };
            Component {
                series,
                explained_variance_ratio: ratio,
            }
        })
        .collect();

    Ok(ComponentSet {
        components,
        n_timepoints: t,
    })
}

/// 使绝对值最大的分量为正. 并列时取第一个.
fn flip_sign(series: &mut Array1<f64>) {
    let pivot = series
        .iter()
        .fold(0.0_f64, |best, &v| if v.abs() > best.abs() { v } else { best });
    if pivot < 0.0 {
        series.mapv_inplace(|v| -v);
    }
}

#[cfg(test)]
mod tests {
    use super::{centered, decompose, extract_components, flip_sign};
    use crate::error::CoreError;
    use crate::normalize::{normalize, ZeroVariancePolicy};
    use crate::{FuncVolume, Mask, VoxelMatrix};
    use ndarray::{arr1, Array3, Array4};

    fn f64_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    /// 由 `V` 条等长序列构造体素矩阵, 体素沿 x 轴排布.
    fn matrix_of(series: &[Vec<f64>]) -> VoxelMatrix {
        let (v, t) = (series.len(), series[0].len());
        let func = FuncVolume::from_array(Array4::from_shape_fn((v, 1, 1, t), |(x, _, _, i)| {
            series[x][i] as f32
        }));
        let mask = Mask::from_array(Array3::ones((v, 1, 1)));
        VoxelMatrix::extract(&func, &mask).unwrap()
    }

    /// 共享线性趋势加少量噪声的 3 × 5 矩阵, 已标准化.
    fn trend() -> VoxelMatrix {
        let m = matrix_of(&[
            vec![1.0, 2.1, 2.9, 4.0, 5.1],
            vec![0.9, 2.0, 3.1, 3.9, 5.0],
            vec![1.1, 1.9, 3.0, 4.1, 4.9],
        ]);
        normalize(m, ZeroVariancePolicy::Zero).unwrap()
    }

    fn generic() -> VoxelMatrix {
        matrix_of(&[
            vec![0.3, -1.2, 2.5, 0.1, 1.7, -0.4],
            vec![1.9, 0.2, -0.7, 3.3, -2.1, 0.8],
            vec![-0.5, 2.2, 1.4, -1.8, 0.6, 2.9],
            vec![2.4, -0.9, 0.5, 1.1, -1.6, -2.3],
        ])
    }

    #[test]
    fn test_trend_dominates() {
        let set = extract_components(&trend(), 2).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.n_timepoints(), 5);
        let ratios = set.explained_variance();
        assert!(ratios[0] > 0.8, "ratios = {ratios:?}");
        assert!(ratios[0] >= ratios[1]);
    }

    #[test]
    fn test_component_count_checks() {
        let m = trend();
        assert_eq!(
            extract_components(&m, 0).unwrap_err(),
            CoreError::InvalidComponentCount
        );
        assert_eq!(
            extract_components(&m, 4).unwrap_err(),
            CoreError::InsufficientRank {
                requested: 4,
                max: 3
            }
        );
        assert_eq!(extract_components(&m, 3).unwrap().len(), 3);
    }

    #[test]
    fn test_rank_one() {
        let base = [1.0, -2.0, 0.5, 3.0, -1.0];
        let m = matrix_of(&[
            base.to_vec(),
            base.iter().map(|v| v * 2.0).collect(),
            base.iter().map(|v| v * -0.5 + 7.0).collect(),
        ]);
        let set = extract_components(&m, 3).unwrap();
        let ratios = set.explained_variance();
        assert!(f64_eq(ratios[0], 1.0));
        assert!(ratios[1].abs() < 1e-9 && ratios[2].abs() < 1e-9);
    }

    #[test]
    fn test_non_increasing_and_bounded() {
        let set = extract_components(&generic(), 4).unwrap();
        let ratios = set.explained_variance();
        assert!(ratios.windows(2).all(|w| w[0] >= w[1]));
        assert!(ratios.iter().all(|r| (0.0..=1.0).contains(r)));
        assert!(ratios.iter().sum::<f64>() <= 1.0 + 1e-12);
    }

    #[test]
    fn test_whitened_and_signed() {
        let set = extract_components(&generic(), 3).unwrap();
        for c in set.iter() {
            let s = c.series();
            let t = s.len() as f64;
            let mean = s.sum() / t;
            let var = s.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / (t - 1.0);
            assert!(mean.abs() < 1e-9);
            assert!(f64_eq(var, 1.0), "var = {var}");

            let pivot = s.iter().fold(0.0_f64, |b, &v| if v.abs() > b.abs() { v } else { b });
            assert!(pivot > 0.0);
        }
    }

    #[test]
    fn test_both_forms_agree() {
        let x = centered(&generic());
        let a = decompose(&x, 3, true).unwrap();
        let b = decompose(&x, 3, false).unwrap();
        for (ca, cb) in a.iter().zip(b.iter()) {
            assert!(f64_eq(ca.explained_variance_ratio(), cb.explained_variance_ratio()));
            for (u, v) in ca.series().iter().zip(cb.series().iter()) {
                assert!((u - v).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn test_regressors_layout() {
        let set = extract_components(&generic(), 2).unwrap();
        let reg = set.to_regressors();
        assert_eq!(reg.dim(), (6, 2));
        for (j, c) in set.iter().enumerate() {
            assert_eq!(reg.column(j), c.series());
        }
        assert_eq!(set.get(2), None);
    }

    #[test]
    fn test_single_timepoint() {
        let m = matrix_of(&[vec![3.0], vec![5.0]]);
        let set = extract_components(&m, 1).unwrap();
        assert_eq!(set.explained_variance(), vec![0.0]);
        assert_eq!(set.to_regressors().dim(), (1, 1));
    }

    #[test]
    fn test_flip_sign() {
        let mut s = arr1(&[0.5, -2.0, 1.0]);
        flip_sign(&mut s);
        assert_eq!(s.to_vec(), vec![-0.5, 2.0, -1.0]);
        let mut s = arr1(&[0.5, 2.0, -1.0]);
        flip_sign(&mut s);
        assert_eq!(s.to_vec(), vec![0.5, 2.0, -1.0]);
    }
}
