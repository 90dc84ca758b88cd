use std::path::Path;

use ndarray::{Array3, ArrayView3};
use nifti::NiftiHeader;

use crate::data::{nifti_dim, write_nifti, BoxedHeader, IoResult, NiftiHeaderAttr};
use crate::stats::fisher_z;
use crate::{Idx3d, Shape3d};

/// 种子相关图. 与功能像处于同一空间, 脑掩膜以外的体素为 0.
#[derive(Debug, Clone)]
pub struct CorrelationMap {
    header: BoxedHeader,
    data: Array3<f32>,
    degenerate: Vec<usize>,
}

impl NiftiHeaderAttr for CorrelationMap {
    #[inline]
    fn header(&self) -> &NiftiHeader {
        &self.header
    }

    #[inline]
    fn spatial_shape(&self) -> Shape3d {
        self.data.dim()
    }
}

impl CorrelationMap {
    /// 以功能像 header 为参考创建相关图. 空间仿射 (qform/sform, pixdim) 原样保留.
    ///
    /// header 被改写为 3D, 并去掉强度缩放与显示窗, 以便写出的数值即为相关系数.
    pub(crate) fn new(reference: &NiftiHeader, data: Array3<f32>, degenerate: Vec<usize>) -> Self {
        let mut header = Box::new(reference.clone());
        if let Ok(dim) = nifti_dim(data.shape()) {
            header.dim = dim;
        }
        header.scl_slope = 1.0;
        header.scl_inter = 0.0;
        header.cal_min = 0.0;
        header.cal_max = 0.0;
        Self {
            header,
            data,
            degenerate,
        }
    }

    /// 获得数据的一份不可变 shallow copy.
    #[inline]
    pub fn data(&self) -> ArrayView3<'_, f32> {
        self.data.view()
    }

    /// 消费自我, 获得底层数据.
    #[inline]
    pub fn into_data(self) -> Array3<f32> {
        self.data
    }

    /// `pos` 处的相关系数.
    ///
    /// 当 `pos` 越界时 panic.
    #[inline]
    pub fn get(&self, pos: Idx3d) -> f32 {
        self.data[pos]
    }

    /// 时间序列方差为零, 因而相关系数被记为 0 的体素的展平索引, 升序.
    #[inline]
    pub fn degenerate(&self) -> &[usize] {
        &self.degenerate
    }

    /// 返回 Fisher z 变换后的副本. `|r|` 先截断到 `1 - 1e-7`.
    pub fn fisher_z(&self) -> Self {
        Self {
            header: self.header.clone(),
            data: self.data.mapv(fisher_z),
            degenerate: self.degenerate.clone(),
        }
    }

    /// 将相关图写入 `path`. 扩展名为 `.nii.gz` 时自动压缩.
    ///
    /// 任一维度超出 nifti 的 `u16` 上限时返回 `IoError::Dimensionality`.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> IoResult<()> {
        write_nifti(path.as_ref(), &self.header, &self.data)
    }
}
