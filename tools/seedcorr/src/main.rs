//! 计算种子点相关图, 以 `corr_<seed>_<func>.nii.gz` 命名写出.

use std::path::PathBuf;

use bold_berry::SeedCorrConfig;
use clap::Parser;
use utils::LogArgs;

mod runner;

/// 种子点相关: 脑内每个体素与种子平均信号的 Pearson 相关系数.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// 4D 功能像 (.nii / .nii.gz)
    func: PathBuf,

    /// 种子掩膜
    seed: PathBuf,

    /// 脑掩膜
    mask: PathBuf,

    /// 输出目录, 默认为功能像所在目录
    output_dir: Option<PathBuf>,

    /// 输出 Fisher z 变换后的相关图
    #[arg(long)]
    fisher_z: bool,

    #[command(flatten)]
    log: LogArgs,
}

impl Cli {
    fn config(&self) -> SeedCorrConfig {
        let config =
            SeedCorrConfig::new(&self.func, &self.seed, &self.mask).with_fisher_z(self.fisher_z);
        match &self.output_dir {
            Some(dir) => config.with_output_dir(dir),
            None => config,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    utils::init_logger(&cli.log)?;

    let path = runner::run(&cli.config())?;
    if cli.log.verbose || cli.log.debug {
        utils::sep();
        println!("Correlation map: {}", path.display());
        utils::sep();
    }
    Ok(())
}
