//! 程序运行函数.

use anyhow::Context;
use bold_berry::consts::TEXT_PRECISION;
use bold_berry::io::save_text_matrix;
use bold_berry::{
    extract_components, normalize, CompCorConfig, ComponentSet, FuncVolume, Mask, VoxelMatrix,
};
use log::info;

/// 实际运行.
///
/// 功能像在体素矩阵构建完成后立即释放, 之后只持有掩膜内的数据.
pub fn run(config: &CompCorConfig) -> anyhow::Result<ComponentSet> {
    config.validate()?;

    let matrix = {
        let func = FuncVolume::open(&config.func)
            .with_context(|| format!("loading {}", config.func.display()))?;
        let mask = Mask::open(&config.mask)
            .with_context(|| format!("loading {}", config.mask.display()))?;
        VoxelMatrix::extract(&func, &mask)?
    };
    info!(
        "{} voxels x {} timepoints in {}",
        matrix.n_voxels(),
        matrix.n_timepoints(),
        config.mask.display()
    );

    let matrix = normalize(matrix, config.zero_variance)?;
    let set = extract_components(&matrix, config.n_components)?;
    info!("explained variance: {:?}", set.explained_variance());

    save_text_matrix(&config.output, set.to_regressors().view(), TEXT_PRECISION)
        .with_context(|| format!("writing {}", config.output.display()))?;
    info!("wrote {} components to {}", set.len(), config.output.display());
    Ok(set)
}
