//! 掩膜体素提取: 4D 体数据 -> (体素 × 时间) 矩阵.

use ndarray::{Array1, Array2, Array3, ArrayView1, ArrayView2, ArrayViewMut2, Axis};

use super::index::{flatten, IndexMap};
use super::{FuncVolume, Mask, NiftiHeaderAttr};
use crate::consts::is_selected;
use crate::error::{CoreError, CoreResult};

/// 掩膜内体素的时间序列矩阵, 形状为 (选中体素数 × 时间点数), 以 `f64` 保存.
///
/// 第 `i` 行对应 `index().position(i)`. 矩阵与索引表封装在一起,
/// 外部只能原地修改矩阵数值, 不能改变行序.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "RawVoxelMatrix")
)]
pub struct VoxelMatrix {
    data: Array2<f64>,
    index: IndexMap,
}

/// 反序列化的中间形式. 行数必须与索引表长度一致.
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct RawVoxelMatrix {
    data: Array2<f64>,
    index: IndexMap,
}

#[cfg(feature = "serde")]
impl TryFrom<RawVoxelMatrix> for VoxelMatrix {
    type Error = &'static str;

    fn try_from(raw: RawVoxelMatrix) -> Result<Self, Self::Error> {
        if raw.data.nrows() != raw.index.len() {
            return Err("matrix rows do not match index map length");
        }
        Ok(Self {
            data: raw.data,
            index: raw.index,
        })
    }
}

impl VoxelMatrix {
    /// 用 `mask` 中值 `>= 1` 的体素提取 `volume` 的时间序列.
    ///
    /// # 错误
    ///
    /// 1. 空间形状不一致时返回 `CoreError::ShapeMismatch`.
    /// 2. 没有体素被选中时返回 `CoreError::EmptyMask`.
    pub fn extract(volume: &FuncVolume, mask: &Mask) -> CoreResult<Self> {
        Self::extract_intersection(volume, &[mask])
    }

    /// 提取被 `masks` 中 **每一个** 掩膜都选中的体素 (交集).
    ///
    /// `masks` 为空时视为没有选中任何体素.
    pub fn extract_intersection(volume: &FuncVolume, masks: &[&Mask]) -> CoreResult<Self> {
        let shape = volume.spatial_shape();
        for m in masks {
            if m.spatial_shape() != shape {
                return Err(CoreError::ShapeMismatch {
                    expected: shape,
                    found: m.spatial_shape(),
                });
            }
        }

        let flat: Vec<usize> = match masks.split_first() {
            None => Vec::new(),
            Some((first, rest)) => first
                .data()
                .indexed_iter()
                .filter(|(pos, v)| is_selected(**v) && rest.iter().all(|m| m.is_selected_at(*pos)))
                .map(|(pos, _)| flatten(shape, pos))
                .collect(),
        };
        if flat.is_empty() {
            return Err(CoreError::EmptyMask);
        }

        let index = IndexMap::new(shape, flat);
        let mut data = Array2::<f64>::zeros((index.len(), volume.len_t()));
        for (mut row, pos) in data.axis_iter_mut(Axis(0)).zip(index.positions()) {
            row.zip_mut_with(&volume.series_at(pos), |d, s| *d = *s as f64);
        }
        log::debug!(
            "extracted {} of {} voxels, {} timepoints",
            index.len(),
            volume.spatial_size(),
            volume.len_t()
        );

        Ok(Self { data, index })
    }

    /// 选中体素个数 (行数).
    #[inline]
    pub fn n_voxels(&self) -> usize {
        self.data.nrows()
    }

    /// 时间点个数 (列数).
    #[inline]
    pub fn n_timepoints(&self) -> usize {
        self.data.ncols()
    }

    /// 行号到空间位置的映射.
    #[inline]
    pub fn index(&self) -> &IndexMap {
        &self.index
    }

    /// 第 `row` 个体素的时间序列.
    ///
    /// 当 `row` 越界时 panic.
    #[inline]
    pub fn row(&self, row: usize) -> ArrayView1<'_, f64> {
        self.data.row(row)
    }

    /// 获得数据的一份不可变 shallow copy.
    #[inline]
    pub fn data(&self) -> ArrayView2<'_, f64> {
        self.data.view()
    }

    /// 获得数据的一份可变 shallow copy. 形状与行序不可改变.
    #[inline]
    pub fn data_mut(&mut self) -> ArrayViewMut2<'_, f64> {
        self.data.view_mut()
    }

    /// 消费自我, 获得底层矩阵与索引表.
    #[inline]
    pub fn into_parts(self) -> (Array2<f64>, IndexMap) {
        (self.data, self.index)
    }

    /// 每个时间点上所有体素的算术平均, 长度为时间点数.
    pub fn mean_series(&self) -> Array1<f64> {
        let n = self.n_voxels() as f64;
        self.data.sum_axis(Axis(0)) / n
    }

    /// 将第 `t` 个时间点散射回体空间, 未选中体素填 0.
    ///
    /// 当 `t` 越界时 panic.
    pub fn scatter_timepoint(&self, t: usize) -> Array3<f64> {
        self.index.scatter(self.data.column(t).iter().copied(), 0.0)
    }
}
