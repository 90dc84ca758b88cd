//! 运行结果报告.

use std::io::{self, Write};

use bold_berry::{CompCorConfig, ComponentSet};

/// 将成分集合的摘要写进 `w` 中.
fn describe_into<W: Write>(config: &CompCorConfig, set: &ComponentSet, w: &mut W) -> io::Result<()> {
    const S4: &str = "    ";

    writeln!(w, "CompCor `{}`:", config.mask.display())?;
    writeln!(w, "{S4}Timepoints: {}", set.n_timepoints())?;
    writeln!(w, "{S4}Components: {}", set.len())?;
    let mut total = 0.0;
    for (i, ratio) in set.explained_variance().into_iter().enumerate() {
        total += ratio;
        writeln!(w, "{S4}#{i}: {ratio:.6} (cumulative {total:.6})")?;
    }
    write!(w, "{S4}Output: {}", config.output.display())?;
    Ok(())
}

/// 在标准输出打印摘要.
pub fn report(config: &CompCorConfig, set: &ComponentSet) -> io::Result<()> {
    let mut buf = Vec::with_capacity(512);
    describe_into(config, set, &mut buf)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    utils::sep_to(&mut out)?;
    out.write_all(&buf)?;
    writeln!(out)?;
    utils::sep_to(&mut out)
}

#[cfg(test)]
mod tests {
    use super::describe_into;
    use bold_berry::{extract_components, CompCorConfig, FuncVolume, Mask, VoxelMatrix};
    use ndarray::{Array3, Array4};

    #[test]
    fn test_describe() {
        let func = FuncVolume::from_array(Array4::from_shape_fn((3, 1, 1, 4), |(x, _, _, t)| {
            ((x + 1) * t * t) as f32 + x as f32
        }));
        let mask = Mask::from_array(Array3::ones((3, 1, 1)));
        let m = VoxelMatrix::extract(&func, &mask).unwrap();
        let set = extract_components(&m, 2).unwrap();

        let config = CompCorConfig::new("f.nii.gz", "wm.nii.gz", "out.txt");
        let mut buf = Vec::new();
        describe_into(&config, &set, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("CompCor `wm.nii.gz`:"));
        assert!(text.contains("Components: 2"));
        assert!(text.contains("#1: "));
        assert!(text.ends_with("Output: out.txt"));
    }
}
