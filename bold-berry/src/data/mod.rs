use std::path::Path;

use ndarray::{
    Array, Array3, Array4, ArrayD, ArrayView, ArrayView1, Axis, Dimension, Ix3, Ix4, RemoveAxis,
};
use nifti::writer::WriterOptions;
use nifti::{IntoNdArray, NiftiHeader, NiftiObject, ReaderOptions};

use crate::consts::is_selected;
use crate::error::IoError;
use crate::{Idx3d, Shape3d};

mod index;
mod matrix;

pub use index::IndexMap;
pub use matrix::VoxelMatrix;

/// `NiftiHeader` 是栈上大对象, 移动该对象的开销很可观.
/// 因此我们将其分配到堆上.
pub(crate) type BoxedHeader = Box<NiftiHeader>;

/// 数据文件读写结果.
pub type IoResult<T> = Result<T, IoError>;

/// nii 文件 header 的共用属性.
///
/// header 对数值核心而言是不透明的: 它只被原样携带, 以便输出文件与输入处于同一空间.
pub trait NiftiHeaderAttr {
    /// 获取 header 部分.
    fn header(&self) -> &NiftiHeader;

    /// 获取空间形状 `(X, Y, Z)`.
    fn spatial_shape(&self) -> Shape3d;

    /// 获取空间体素个数.
    #[inline]
    fn spatial_size(&self) -> usize {
        let (x, y, z) = self.spatial_shape();
        x * y * z
    }

    /// 检查空间索引是否合法.
    #[inline]
    fn check(&self, (x0, y0, z0): &Idx3d) -> bool {
        let (x, y, z) = self.spatial_shape();
        *x0 < x && *y0 < y && *z0 < z
    }

    /// 获取单个体素分辨率, 以毫米为单位, 按 `[x, y, z]` 排列.
    #[inline]
    fn pix_dim(&self) -> [f64; 3] {
        let [_, x, y, z, ..] = self.header().pixdim;
        [x as f64, y as f64, z as f64]
    }

    /// 获取重复时间 (TR). 单位由 header 中的 `xyzt_units` 决定, 通常为秒.
    #[inline]
    fn repetition_time(&self) -> f64 {
        self.header().pixdim[4] as f64
    }

    /// 获取体素的实际体积值, 以立方毫米为单位.
    #[inline]
    fn voxel(&self) -> f64 {
        self.pix_dim().iter().product()
    }
}

/// 数据形状对应的 nifti `dim` 字段.
///
/// 维度超过 7 个或任一维度超出 `u16` 时返回 `IoError::Dimensionality`.
pub(crate) fn nifti_dim(shape: &[usize]) -> IoResult<[u16; 8]> {
    let err = || IoError::Dimensionality {
        shape: shape.to_vec(),
        expected: "at most 7 axes, each <= 65535",
    };
    let mut dim = [1; 8];
    dim[0] = u16::try_from(shape.len()).ok().filter(|n| *n <= 7).ok_or_else(err)?;
    for (d, &s) in dim[1..].iter_mut().zip(shape) {
        *d = u16::try_from(s).map_err(|_| err())?;
    }
    Ok(dim)
}

/// 以 `header` 为参考把 `data` 写入 `path`. `dim` 字段按 `data` 的实际形状重写.
pub(crate) fn write_nifti<D>(path: &Path, header: &NiftiHeader, data: &Array<f32, D>) -> IoResult<()>
where
    D: Dimension + RemoveAxis,
{
    let mut header = header.clone();
    header.dim = nifti_dim(data.shape())?;
    WriterOptions::new(path)
        .reference_header(&header)
        .write_nifti(data)?;
    log::debug!("saved {} with shape {:?}", path.display(), data.shape());
    Ok(())
}

/// 根据数据形状生成一个最小可用的 header.
///
/// 无法用 nifti 表示的形状保留默认 `dim`, 保存时才会报错.
fn header_for_shape(shape: &[usize]) -> BoxedHeader {
    let mut header = Box::<NiftiHeader>::default();
    if let Ok(dim) = nifti_dim(shape) {
        header.dim = dim;
    }
    for p in header.pixdim[1..].iter_mut().take(shape.len()) {
        *p = 1.0;
    }
    header.scl_slope = 1.0;
    header.scl_inter = 0.0;
    header
}

/// 读取 nii 文件, 返回 header 和 `(x, y, z, ...)` 排列的数据.
fn read_nifti(path: &Path) -> IoResult<(BoxedHeader, ArrayD<f32>)> {
    let obj = ReaderOptions::new().read_file(path)?;
    let header = Box::new(obj.header().clone());
    let data = obj.into_volume().into_ndarray::<f32>()?;
    log::debug!("loaded {} with shape {:?}", path.display(), data.shape());
    Ok((header, data))
}

/// 4D fMRI 功能像, 包括 header 和按 `(x, y, z, t)` 排列的数据. 采样值以 `f32` 保存.
#[derive(Debug, Clone)]
pub struct FuncVolume {
    header: BoxedHeader,
    data: Array4<f32>,
}

impl NiftiHeaderAttr for FuncVolume {
    #[inline]
    fn header(&self) -> &NiftiHeader {
        &self.header
    }

    #[inline]
    fn spatial_shape(&self) -> Shape3d {
        let (x, y, z, _) = self.data.dim();
        (x, y, z)
    }
}

impl FuncVolume {
    /// 打开 nii 文件格式的功能像. 3D 文件被视为只有一个时间点.
    pub fn open<P: AsRef<Path>>(path: P) -> IoResult<Self> {
        let (header, data) = read_nifti(path.as_ref())?;
        let data = match data.ndim() {
            3 => data.insert_axis(Axis(3)),
            4 => data,
            _ => {
                return Err(IoError::Dimensionality {
                    shape: data.shape().to_vec(),
                    expected: "3D or 4D",
                })
            }
        };
        let shape = data.shape().to_vec();
        let data = data
            .into_dimensionality::<Ix4>()
            .map_err(|_| IoError::Dimensionality {
                shape,
                expected: "3D or 4D",
            })?;

        // nifti 数据是 x 变化最快的列优先布局, 这里统一转换为行优先.
        let data = data.as_standard_layout().into_owned();
        Ok(Self { header, data })
    }

    /// 根据 `(x, y, z, t)` 排列的裸数据直接创建功能像. header 只填充维度信息.
    pub fn from_array(data: Array4<f32>) -> Self {
        let header = header_for_shape(data.shape());
        Self::with_header(header.as_ref(), data)
    }

    /// 根据已有 header 和 `(x, y, z, t)` 排列的裸数据创建功能像.
    ///
    /// header 不会被检查, 调用方需保证其描述的空间与 `data` 一致.
    pub fn with_header(header: &NiftiHeader, data: Array4<f32>) -> Self {
        let data = if data.is_standard_layout() {
            data
        } else {
            data.as_standard_layout().into_owned()
        };
        Self {
            header: Box::new(header.clone()),
            data,
        }
    }

    /// 时间点个数.
    #[inline]
    pub fn len_t(&self) -> usize {
        self.data.dim().3
    }

    /// 获取 `pos` 处体素的时间序列.
    ///
    /// 当 `pos` 越界时 panic.
    #[inline]
    pub fn series_at(&self, (x, y, z): Idx3d) -> ArrayView1<'_, f32> {
        self.data.slice(ndarray::s![x, y, z, ..])
    }

    /// 获得数据的一份不可变 shallow copy.
    #[inline]
    pub fn data(&self) -> ArrayView<'_, f32, Ix4> {
        self.data.view()
    }

    /// 以自身 header 为参考写入 `path`. 扩展名为 `.nii.gz` 时自动压缩.
    ///
    /// 任一维度超出 nifti 的 `u16` 上限时返回 `IoError::Dimensionality`.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> IoResult<()> {
        write_nifti(path.as_ref(), &self.header, &self.data)
    }
}

/// 3D 掩膜, 包括 header 和按 `(x, y, z)` 排列的数据.
///
/// 掩膜只读, 以 `f32` 保存原始值, 选中规则见 [`crate::consts::is_selected`].
#[derive(Debug, Clone)]
pub struct Mask {
    header: BoxedHeader,
    data: Array3<f32>,
}

impl NiftiHeaderAttr for Mask {
    #[inline]
    fn header(&self) -> &NiftiHeader {
        &self.header
    }

    #[inline]
    fn spatial_shape(&self) -> Shape3d {
        self.data.dim()
    }
}

impl Mask {
    /// 打开 nii 文件格式的掩膜. 仅含一帧的 4D 文件也被接受.
    pub fn open<P: AsRef<Path>>(path: P) -> IoResult<Self> {
        const EXPECTED: &str = "3D (or 4D with a single frame)";

        let (header, data) = read_nifti(path.as_ref())?;
        let shape = data.shape().to_vec();
        let data = match shape.len() {
            3 => data,
            4 if shape[3] == 1 => data.index_axis_move(Axis(3), 0),
            _ => {
                return Err(IoError::Dimensionality {
                    shape,
                    expected: EXPECTED,
                })
            }
        };
        let data = data
            .into_dimensionality::<Ix3>()
            .map_err(|_| IoError::Dimensionality {
                shape,
                expected: EXPECTED,
            })?;
        let data = data.as_standard_layout().into_owned();
        Ok(Self { header, data })
    }

    /// 根据 `(x, y, z)` 排列的裸数据直接创建掩膜. header 只填充维度信息.
    pub fn from_array(data: Array3<f32>) -> Self {
        let header = header_for_shape(data.shape());
        let data = if data.is_standard_layout() {
            data
        } else {
            data.as_standard_layout().into_owned()
        };
        Self { header, data }
    }

    /// 根据布尔数组创建掩膜. `true` 记为 1, `false` 记为 0.
    pub fn from_bool(data: Array3<bool>) -> Self {
        Self::from_array(data.mapv(|b| if b { 1.0 } else { 0.0 }))
    }

    /// `pos` 处体素是否被选中?
    ///
    /// 当 `pos` 越界时 panic.
    #[inline]
    pub fn is_selected_at(&self, pos: Idx3d) -> bool {
        is_selected(self.data[pos])
    }

    /// 被选中的体素个数.
    pub fn count(&self) -> usize {
        self.data.iter().filter(|v| is_selected(**v)).count()
    }

    /// 收集所有被选中体素的空间索引. 结果按行优先存储.
    pub fn selected_pos(&self) -> Vec<Idx3d> {
        self.data
            .indexed_iter()
            .filter_map(|(pos, v)| is_selected(*v).then_some(pos))
            .collect()
    }

    /// 获得数据的一份不可变 shallow copy.
    #[inline]
    pub fn data(&self) -> ArrayView<'_, f32, Ix3> {
        self.data.view()
    }

    /// 以自身 header 为参考写入 `path`. 扩展名为 `.nii.gz` 时自动压缩.
    ///
    /// 任一维度超出 nifti 的 `u16` 上限时返回 `IoError::Dimensionality`.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> IoResult<()> {
        write_nifti(path.as_ref(), &self.header, &self.data)
    }
}
