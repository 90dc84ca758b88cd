//! 一维序列的基础统计量.

use ndarray::ArrayView1;
use num::Float;

use crate::consts::FISHER_R_CLIP;

/// 序列的算术平均与总体标准差 (ddof = 0).
///
/// 空序列返回 `(NaN, NaN)`.
pub fn mean_std<F: Float>(s: ArrayView1<F>) -> (F, F) {
    let n = match F::from(s.len()) {
        Some(n) if s.len() > 0 => n,
        _ => return (F::nan(), F::nan()),
    };
    let mean = s.iter().fold(F::zero(), |acc, &v| acc + v) / n;
    let var = s
        .iter()
        .fold(F::zero(), |acc, &v| acc + (v - mean) * (v - mean))
        / n;
    (mean, var.sqrt())
}

/// 标准差 `std` 是否应被视为零 (常量序列)?
///
/// 判据为相对的 `std <= eps * |mean|`, 因此 `std == 0` 总是退化, 而幅值很小但确有波动的序列不是.
/// 非有限值也视为退化.
#[inline]
pub fn is_degenerate<F: Float>(mean: F, std: F) -> bool {
    !std.is_finite() || !mean.is_finite() || std <= F::epsilon() * mean.abs()
}

/// 两条等长序列的 Pearson 相关系数, 结果截断到 `[-1, 1]`.
///
/// 任一序列方差为零 (或为空) 时相关系数无定义, 返回 `None`.
/// 长度不一致时 panic.
pub fn pearson(a: ArrayView1<f64>, b: ArrayView1<f64>) -> Option<f64> {
    assert_eq!(a.len(), b.len(), "相关计算要求两条序列等长");
    let (ma, sa) = mean_std(a);
    let (mb, sb) = mean_std(b);
    if a.is_empty() || is_degenerate(ma, sa) || is_degenerate(mb, sb) {
        return None;
    }
    pearson_centered(a, ma, b, mb)
}

/// 已知两条序列均值时的 Pearson 相关系数. 分母为零时返回 `None`.
pub(crate) fn pearson_centered(
    a: ArrayView1<f64>,
    ma: f64,
    b: ArrayView1<f64>,
    mb: f64,
) -> Option<f64> {
    let (mut sab, mut saa, mut sbb) = (0.0, 0.0, 0.0);
    for (&x, &y) in a.iter().zip(b.iter()) {
        let (dx, dy) = (x - ma, y - mb);
        sab += dx * dy;
        saa += dx * dx;
        sbb += dy * dy;
    }
    let denom = (saa * sbb).sqrt();
    if denom > 0.0 && denom.is_finite() {
        Some((sab / denom).clamp(-1.0, 1.0))
    } else {
        None
    }
}

/// Fisher r-to-z 变换 `0.5 * ln((1 + r) / (1 - r))`.
///
/// `|r|` 先截断到 `FISHER_R_CLIP`, 保证结果有限. NaN 原样返回.
pub fn fisher_z<F: Float>(r: F) -> F {
    if r.is_nan() {
        return r;
    }
    let clip = F::from(FISHER_R_CLIP).unwrap_or_else(F::one);
    let r = r.max(-clip).min(clip);
    let half = F::from(0.5).unwrap_or_else(F::one);
    half * ((F::one() + r) / (F::one() - r)).ln()
}
