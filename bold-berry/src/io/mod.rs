//! 结果文件: 成分文本矩阵与相关图命名.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use itertools::Itertools;
use ndarray::{ArrayView2, Axis};

use crate::consts::{CORR_PREFIX, NII, NII_GZ};
use crate::data::IoResult;

/// 将 `matrix` 以文本形式写入 `w`.
///
/// 每行一行, 列之间以单个空格分隔, 数值保留 `precision` 位小数, 末尾带换行.
pub fn write_text_matrix<W: Write>(
    mut w: W,
    matrix: ArrayView2<f64>,
    precision: usize,
) -> std::io::Result<()> {
    for row in matrix.axis_iter(Axis(0)) {
        let line = row.iter().map(|v| format!("{v:.precision$}")).join(" ");
        writeln!(w, "{line}")?;
    }
    w.flush()
}

/// 将 `matrix` 以文本形式写入文件 `path`. 已存在的文件会被覆盖.
pub fn save_text_matrix<P: AsRef<Path>>(
    path: P,
    matrix: ArrayView2<f64>,
    precision: usize,
) -> IoResult<()> {
    let path = path.as_ref();
    let file = File::create(path)?;
    write_text_matrix(BufWriter::new(file), matrix, precision)?;
    log::debug!("saved {:?} matrix to {}", matrix.dim(), path.display());
    Ok(())
}

/// 去掉 `.nii.gz` 或 `.nii` 扩展名后的文件名. 没有文件名时返回空串.
pub fn nifti_basename(path: &Path) -> &str {
    let name = path.file_name().and_then(|s| s.to_str()).unwrap_or("");
    name.strip_suffix(NII_GZ)
        .or_else(|| name.strip_suffix(NII))
        .unwrap_or(name)
}

/// 相关图输出文件名 `corr_<seed>_<func>.nii.gz`.
pub fn corr_output_name<P: AsRef<Path>, Q: AsRef<Path>>(seed: P, func: Q) -> String {
    format!(
        "{CORR_PREFIX}{}_{}{NII_GZ}",
        nifti_basename(seed.as_ref()),
        nifti_basename(func.as_ref())
    )
}

#[cfg(test)]
mod tests {
    use super::{corr_output_name, nifti_basename, save_text_matrix, write_text_matrix};
    use crate::consts::TEXT_PRECISION;
    use ndarray::arr2;
    use std::path::Path;

    #[test]
    fn test_write_text_matrix() {
        let m = arr2(&[[1.0, -0.5], [0.25, 2.0]]);
        let mut buf = Vec::new();
        write_text_matrix(&mut buf, m.view(), 3).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "1.000 -0.500\n0.250 2.000\n"
        );
    }

    #[test]
    fn test_default_precision() {
        let m = arr2(&[[1.0 / 3.0]]);
        let mut buf = Vec::new();
        write_text_matrix(&mut buf, m.view(), TEXT_PRECISION).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "0.333333333333\n");
    }

    #[test]
    fn test_save_text_matrix() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("comps.txt");
        let m = arr2(&[[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]);
        save_text_matrix(&path, m.view(), 1).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "1.0 2.0 3.0\n4.0 5.0 6.0\n");

        let missing = dir.path().join("no-such-dir").join("comps.txt");
        assert!(save_text_matrix(missing, m.view(), 1).is_err());
    }

    #[test]
    fn test_basename() {
        assert_eq!(nifti_basename(Path::new("/data/sub01/rest.nii.gz")), "rest");
        assert_eq!(nifti_basename(Path::new("pcc.nii")), "pcc");
        assert_eq!(nifti_basename(Path::new("a/b.txt")), "b.txt");
        assert_eq!(nifti_basename(Path::new("/")), "");
    }

    #[test]
    fn test_corr_output_name() {
        assert_eq!(
            corr_output_name("/rois/pcc.nii.gz", "/sub01/func/rest_bold.nii"),
            "corr_pcc_rest_bold.nii.gz"
        );
    }
}
