//! 程序运行函数.

use std::path::PathBuf;

use anyhow::Context;
use bold_berry::{par_seed_correlate, FuncVolume, Mask, SeedCorrConfig};
use log::info;

/// 实际运行, 返回相关图的输出路径.
pub fn run(config: &SeedCorrConfig) -> anyhow::Result<PathBuf> {
    config.validate()?;

    let open_mask = |p: &PathBuf| Mask::open(p).with_context(|| format!("loading {}", p.display()));
    let func = FuncVolume::open(&config.func)
        .with_context(|| format!("loading {}", config.func.display()))?;
    let seed = open_mask(&config.seed)?;
    let brain = open_mask(&config.mask)?;

    let map = par_seed_correlate(&func, &seed, &brain)?;
    drop(func);
    info!(
        "seed {} with {} voxels, {} zero-variance voxels",
        config.seed.display(),
        seed.count(),
        map.degenerate().len()
    );

    let map = if config.fisher_z { map.fisher_z() } else { map };
    let path = config.output_path();
    map.save(&path)
        .with_context(|| format!("writing {}", path.display()))?;
    info!("wrote {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::run;
    use bold_berry::{CoreError, FuncVolume, Mask, NiftiHeaderAttr, SeedCorrConfig};
    use ndarray::{Array3, Array4};
    use std::path::{Path, PathBuf};

    /// 2×2×2×4, 种子为 (0, 0, *).
    fn write_inputs(dir: &Path) -> [PathBuf; 3] {
        let func = FuncVolume::from_array(Array4::from_shape_fn((2, 2, 2, 4), |(x, y, z, t)| {
            let t = t as f32;
            match (x, y, z) {
                (1, 1, 1) => 4.0 - t,
                (1, 0, _) => (t * 7.0) % 3.0 + z as f32,
                _ => t + 1.0,
            }
        }));
        let seed = Mask::from_bool(Array3::from_shape_fn((2, 2, 2), |(x, y, _)| x == 0 && y == 0));
        let brain = Mask::from_array(Array3::ones((2, 2, 2)));

        let paths = [
            dir.join("rest.nii.gz"),
            dir.join("pcc.nii.gz"),
            dir.join("brain.nii.gz"),
        ];
        func.save(&paths[0]).unwrap();
        seed.save(&paths[1]).unwrap();
        brain.save(&paths[2]).unwrap();
        paths
    }

    #[test]
    fn test_run_default_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let [f, s, m] = write_inputs(dir.path());

        let path = run(&SeedCorrConfig::new(&f, &s, &m)).unwrap();
        assert_eq!(path, dir.path().join("corr_pcc_rest.nii.gz"));

        let map = Mask::open(&path).unwrap();
        assert_eq!(map.spatial_shape(), (2, 2, 2));
        assert!((map.data()[(0, 1, 0)] - 1.0).abs() < 1e-6);
        assert!((map.data()[(1, 1, 1)] + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_run_fisher_z() {
        let dir = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let [f, s, m] = write_inputs(dir.path());

        let config = SeedCorrConfig::new(&f, &s, &m)
            .with_output_dir(out.path())
            .with_fisher_z(true);
        let path = run(&config).unwrap();
        assert_eq!(path.parent(), Some(out.path()));

        let z = Mask::open(&path).unwrap();
        assert!(z.data().iter().all(|v| v.is_finite()));
        assert!(z.data()[(0, 1, 0)] > 5.0);
    }

    #[test]
    fn test_run_disjoint_seed() {
        let dir = tempfile::tempdir().unwrap();
        let [f, s, _] = write_inputs(dir.path());
        let brain = dir.path().join("half.nii.gz");
        Mask::from_bool(Array3::from_shape_fn((2, 2, 2), |(x, _, _)| x == 1))
            .save(&brain)
            .unwrap();

        let err = run(&SeedCorrConfig::new(&f, &s, &brain)).unwrap_err();
        assert_eq!(err.downcast_ref::<CoreError>(), Some(&CoreError::EmptySeed));
    }
}
