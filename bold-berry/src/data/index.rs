//! 体素矩阵行号与空间位置之间的映射.

use ndarray::Array3;

use crate::{Idx3d, Shape3d};

/// 体素矩阵每一行对应的展平空间索引, 按升序 (行优先光栅序) 排列.
///
/// 展平规则为 `flat = (x * Y + y) * Z + z`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "RawIndexMap")
)]
pub struct IndexMap {
    shape: Shape3d,
    flat: Vec<usize>,
}

/// 反序列化的中间形式, 经 [`check`] 校验后才转为 [`IndexMap`].
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct RawIndexMap {
    shape: Shape3d,
    flat: Vec<usize>,
}

#[cfg(feature = "serde")]
impl TryFrom<RawIndexMap> for IndexMap {
    type Error = &'static str;

    fn try_from(raw: RawIndexMap) -> Result<Self, Self::Error> {
        check(raw.shape, &raw.flat)?;
        Ok(Self {
            shape: raw.shape,
            flat: raw.flat,
        })
    }
}

/// 展平索引须非空, 严格升序, 且全部落在 `shape` 之内.
fn check((x, y, z): Shape3d, flat: &[usize]) -> Result<(), &'static str> {
    if flat.is_empty() {
        return Err("index map is empty");
    }
    if !flat.windows(2).all(|w| w[0] < w[1]) {
        return Err("flat indices are not strictly ascending");
    }
    match flat.last() {
        Some(&f) if f < x * y * z => Ok(()),
        _ => Err("flat index out of bounds"),
    }
}

impl IndexMap {
    /// 由空间形状和 **严格升序** 的展平索引构建.
    ///
    /// 仅在 crate 内部构建, 保证与体素矩阵的行同步.
    pub(crate) fn new(shape: Shape3d, flat: Vec<usize>) -> Self {
        debug_assert_eq!(check(shape, &flat), Ok(()));
        Self { shape, flat }
    }

    /// 空间形状 `(X, Y, Z)`.
    #[inline]
    pub fn shape(&self) -> Shape3d {
        self.shape
    }

    /// 被选中体素的个数, 即体素矩阵的行数.
    #[inline]
    pub fn len(&self) -> usize {
        self.flat.len()
    }

    /// 是否为空. 由掩膜提取得到的映射永远非空.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.flat.is_empty()
    }

    /// 获取展平索引切片.
    #[inline]
    pub fn as_slice(&self) -> &[usize] {
        &self.flat
    }

    /// 按行号迭代展平索引.
    #[inline]
    pub fn iter(&self) -> impl ExactSizeIterator<Item = usize> + '_ {
        self.flat.iter().copied()
    }

    /// 第 `row` 行对应的空间位置.
    ///
    /// 当 `row` 越界时 panic.
    #[inline]
    pub fn position(&self, row: usize) -> Idx3d {
        unflatten(self.shape, self.flat[row])
    }

    /// 按行号迭代空间位置.
    pub fn positions(&self) -> impl ExactSizeIterator<Item = Idx3d> + '_ {
        let shape = self.shape;
        self.flat.iter().map(move |&f| unflatten(shape, f))
    }

    /// 查找空间位置 `pos` 对应的行号. 未被选中时返回 `None`.
    pub fn row_of(&self, pos: Idx3d) -> Option<usize> {
        self.flat.binary_search(&flatten(self.shape, pos)).ok()
    }

    /// 将逐行结果散射回体空间. 未被选中的体素填充 `fill`.
    ///
    /// `values` 的长度必须等于 `self.len()`, 否则 panic.
    pub fn scatter<T, I>(&self, values: I, fill: T) -> Array3<T>
    where
        T: Clone,
        I: IntoIterator<Item = T>,
        I::IntoIter: ExactSizeIterator,
    {
        let values = values.into_iter();
        assert_eq!(values.len(), self.len(), "散射值个数与选中体素个数不一致");

        let mut out = Array3::from_elem(self.shape, fill);
        for (pos, v) in self.positions().zip(values) {
            out[pos] = v;
        }
        out
    }
}

/// `(x, y, z)` -> 展平索引.
#[inline]
pub(crate) fn flatten((_, ny, nz): Shape3d, (x, y, z): Idx3d) -> usize {
    (x * ny + y) * nz + z
}

/// 展平索引 -> `(x, y, z)`.
#[inline]
pub(crate) fn unflatten((_, ny, nz): Shape3d, flat: usize) -> Idx3d {
    let z = flat % nz;
    let rest = flat / nz;
    (rest / ny, rest % ny, z)
}
