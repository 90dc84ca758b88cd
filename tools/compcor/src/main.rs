//! 从 4D 功能像的掩膜区域中提取 CompCor 噪声成分, 写成纯文本回归量矩阵.

use std::path::PathBuf;

use bold_berry::consts::DEFAULT_COMPONENTS;
use bold_berry::{CompCorConfig, ZeroVariancePolicy};
use clap::{Parser, ValueEnum};
use utils::LogArgs;

mod result;
mod runner;

/// 零方差体素的处理策略.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum ZeroVariance {
    /// 整行置零
    Zero,
    /// 直接报错
    Fail,
    /// 保留 NaN
    Propagate,
}

impl From<ZeroVariance> for ZeroVariancePolicy {
    fn from(z: ZeroVariance) -> Self {
        match z {
            ZeroVariance::Zero => Self::Zero,
            ZeroVariance::Fail => Self::Fail,
            ZeroVariance::Propagate => Self::Propagate,
        }
    }
}

/// CompCor: 掩膜内体素时间序列的主成分.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// 4D 功能像 (.nii / .nii.gz)
    func: PathBuf,

    /// 掩膜, 值 >= 1 的体素被选中
    mask: PathBuf,

    /// 成分文本矩阵输出路径 (每行一个时间点, 每列一个成分)
    output: PathBuf,

    /// 成分个数
    #[arg(default_value_t = DEFAULT_COMPONENTS)]
    n_components: usize,

    /// 标准化时零方差体素的处理策略
    #[arg(long, value_enum, default_value_t = ZeroVariance::Zero)]
    zero_variance: ZeroVariance,

    #[command(flatten)]
    log: LogArgs,
}

impl Cli {
    fn config(&self) -> CompCorConfig {
        CompCorConfig::new(&self.func, &self.mask, &self.output)
            .with_components(self.n_components)
            .with_zero_variance(self.zero_variance.into())
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    utils::init_logger(&cli.log)?;

    let config = cli.config();
    let set = runner::run(&config)?;

    if cli.log.verbose || cli.log.debug {
        result::report(&config, &set)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{Cli, ZeroVariance};
    use bold_berry::ZeroVariancePolicy;
    use clap::Parser;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["compcor", "f.nii.gz", "wm.nii.gz", "out.txt"]).unwrap();
        assert_eq!(cli.n_components, 5);
        assert_eq!(cli.zero_variance, ZeroVariance::Zero);
        assert!(!cli.log.verbose);

        let c = cli.config();
        assert_eq!(c.n_components, 5);
        assert_eq!(c.zero_variance, ZeroVariancePolicy::Zero);
    }

    #[test]
    fn test_flags() {
        let cli = Cli::try_parse_from([
            "compcor",
            "f.nii.gz",
            "wm.nii.gz",
            "out.txt",
            "3",
            "--zero-variance",
            "fail",
            "-v",
        ])
        .unwrap();
        assert_eq!(cli.n_components, 3);
        assert!(cli.log.verbose);
        assert_eq!(cli.config().zero_variance, ZeroVariancePolicy::Fail);

        assert!(Cli::try_parse_from(["compcor", "f.nii.gz", "wm.nii.gz"]).is_err());
        assert!(Cli::try_parse_from(["compcor", "f", "m", "o", "two"]).is_err());
    }
}
